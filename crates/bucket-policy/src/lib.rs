//! S3 bucket policy language
//!
//! `bucket-policy` models the subset of the IAM policy grammar used by S3
//! resource policies and function execution roles: a [`Policy`] document
//! holding an ordered list of [`Statement`]s, each with an [`Effect`], an
//! optional [`Principal`], actions, resources and an optional
//! [`Condition`] block.
//!
//! Serialization follows the AWS JSON shape (`Version`, `Statement`,
//! `Effect`, `Principal`, `Action`, `Resource`, `Condition`). Every map in
//! the model keeps insertion order, so serializing the same document twice
//! yields byte-identical output.
//!
//! # Example
//!
//! ```
//! use bucket_policy::{Condition, Policy, Principal, Statement};
//!
//! let statement = Statement::allow(
//!     ["s3:GetObject", "s3:ListBucket"],
//!     ["arn:aws:s3:::data", "arn:aws:s3:::data/*"],
//! )
//! .with_principal(Principal::Service("iam.amazonaws.com".to_owned()))
//! .with_condition(Condition::new().with("StringEquals", "aws:PrincipalTag/team", "data"));
//!
//! let mut policy = Policy::new();
//! policy.push(statement);
//!
//! let json = policy.to_json().unwrap();
//! assert!(json.starts_with(r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow""#));
//!
//! let parsed = Policy::from_json(&json).unwrap();
//! assert_eq!(parsed, policy);
//! ```

#![allow(
    clippy::bool_assert_comparison, // I don't like `assert!(!expression)`. It's very misleading.
    clippy::module_name_repetitions,
)]

mod condition;
mod error;
mod policy;
mod principal;
mod statement;

pub use self::condition::Condition;
pub use self::error::PolicyError;
pub use self::policy::{POLICY_VERSION, Policy};
pub use self::principal::Principal;
pub use self::statement::{Effect, Statement};
