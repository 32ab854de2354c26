//! A CSV upload bucket wired to a conversion function.
//!
//! The reference deployment of [`secure_bucket`]: one hardened bucket
//! granting `fullAccess` to the `developer` group, one function with
//! read/write access, triggered by `.csv` uploads under `uploads/`.
//!
//! # Example
//! ```
//! use csv_converter::{CsvConverterStack, StackConfig};
//!
//! let deployment = CsvConverterStack::build(&StackConfig::default()).unwrap();
//! let template = deployment.synth().unwrap();
//! assert!(template.output("BucketName").is_some());
//! ```

#![allow(clippy::bool_assert_comparison)]

mod config;
mod stack;

pub use self::config::{ConfigError, ConfigOverrides, StackConfig};
pub use self::stack::{BUCKET_NAME_ENV, BUCKET_NAME_OUTPUT, CsvConverterStack, DATA_BUCKET_ID, PROCESSOR_ID};
