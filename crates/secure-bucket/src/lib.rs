//! Secure bucket provisioning
//!
//! `secure-bucket` describes object-storage buckets whose hardening follows
//! the deployment environment and whose access is granted through
//! statements derived from a declarative access model. It computes static
//! grants at provisioning time; it does not authorize requests at runtime.
//!
//! # Access model
//!
//! An [`AccessSpec`] names an [`AccessLevel`] or lists operations
//! explicitly. [`ActionCatalog`] maps each level to a fixed operation list.
//! [`Principals`] names a role, a group, or both. The
//! [`SecureResourcePolicyBuilder`] turns the pair into one `Allow`
//! statement per principal, scoped to the bucket and its objects, and
//! appends it to the bucket's policy document.
//!
//! Operation names and principal identifiers are taken verbatim. A typo
//! shows up only as an access-denied outcome once the grants are evaluated.
//!
//! # Example
//!
//! ```
//! use secure_bucket::{AccessLevel, AccessSpec, BucketProps, Environment, Principals, Stack};
//! use secure_bucket::region::StackEnv;
//!
//! let env = StackEnv::new("123456789012", "us-east-1").unwrap();
//! let mut stack = Stack::new("Analytics", env);
//!
//! let props = BucketProps {
//!     bucket_name: Some("analytics-data".to_owned()),
//!     environment: Environment::production(),
//!     access: AccessSpec::level(AccessLevel::ReadOnly),
//!     principals: Principals::role("arn:aws:iam::123456789012:role/analyst"),
//!     auto_delete_objects: false,
//! };
//! let bucket = stack.add_bucket("Data", &props).unwrap();
//!
//! assert!(bucket.hardening().versioned);
//! let stmt = &bucket.policy().statements()[0];
//! assert_eq!(stmt.actions(), ["s3:GetObject", "s3:ListBucket", "s3:GetBucketLocation"]);
//! assert_eq!(stmt.resources(), ["arn:aws:s3:::analytics-data", "arn:aws:s3:::analytics-data/*"]);
//!
//! let template = stack.synth().unwrap();
//! assert!(template.resource("DataPolicy").is_some());
//! ```
//!
//! # Modules
//!
//! - [`actions`]: access levels and the operation catalog
//! - [`builder`]: grant derivation and the [`ResourcePolicy`] seam
//! - [`grantee`]: role and group principals
//! - [`bucket`]: the hardened bucket descriptor
//! - [`stack`]: resource registry, function wiring, notifications and outputs
//! - [`template`]: synthesis into the provisioning template

#![allow(
    clippy::bool_assert_comparison, // I don't like `assert!(!expression)`. It's very misleading.
    clippy::module_name_repetitions,
    clippy::single_match_else,
)]

mod access;
mod environment;
mod error;

pub mod actions;
pub mod arn;
pub mod bucket;
pub mod builder;
pub mod function;
pub mod grantee;
pub mod notification;
pub mod region;
pub mod stack;
pub mod template;

pub use self::access::AccessSpec;
pub use self::actions::{AccessLevel, ActionCatalog, ParseAccessLevelError};
pub use self::bucket::{BucketProps, SecureBucket};
pub use self::builder::{ResourcePolicy, SecureResourcePolicyBuilder};
pub use self::environment::{Environment, PRODUCTION};
pub use self::error::{Error, Result};
pub use self::grantee::{GroupGrant, Grantee, Principals, RoleGrant};
pub use self::stack::Stack;
