//! Named access levels and the storage operations they grant.
//!
//! The tables in this module are the single source of the security
//! posture: every grant made by this crate draws its operation list from
//! here, unless the caller supplies a custom list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A predefined bundle of storage operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessLevel {
    ReadOnly,
    ReadWrite,
    FullAccess,
    DataProcessing,
}

impl AccessLevel {
    /// Every defined level, in declaration order.
    pub const ALL: [Self; 4] = [Self::ReadOnly, Self::ReadWrite, Self::FullAccess, Self::DataProcessing];

    /// Returns the `camelCase` name used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "readOnly",
            Self::ReadWrite => "readWrite",
            Self::FullAccess => "fullAccess",
            Self::DataProcessing => "dataProcessing",
        }
    }

    /// Shorthand for [`ActionCatalog::resolve`].
    #[must_use]
    pub const fn actions(self) -> &'static [&'static str] {
        ActionCatalog::resolve(self)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown access level name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown access level {0:?}, expected one of readOnly, readWrite, fullAccess, dataProcessing")]
pub struct ParseAccessLevelError(String);

impl FromStr for AccessLevel {
    type Err = ParseAccessLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ParseAccessLevelError(s.to_owned()))
    }
}

const READ_ONLY: &[&str] = &[
    "s3:GetObject",
    "s3:ListBucket",
    "s3:GetBucketLocation",
];

const READ_WRITE: &[&str] = &[
    "s3:GetObject",
    "s3:PutObject",
    "s3:ListBucket",
    "s3:GetBucketLocation",
];

const FULL_ACCESS: &[&str] = &[
    "s3:GetObject",
    "s3:PutObject",
    "s3:DeleteObject",
    "s3:ListBucket",
    "s3:GetBucketLocation",
    "s3:PutObjectAcl",
    "s3:GetObjectAcl",
];

const DATA_PROCESSING: &[&str] = &[
    "s3:GetObject",
    "s3:PutObject",
    "s3:ListBucket",
    "s3:GetBucketLocation",
    "s3:DeleteObject",
    "s3:GetObjectTagging",
    "s3:PutObjectTagging",
];

/// Operations granted to a principal that reads a bucket.
pub const BUCKET_READ_ACTIONS: &[&str] = &["s3:GetObject*", "s3:GetBucket*", "s3:List*"];

/// Operations granted to a principal that deletes objects.
pub const BUCKET_DELETE_ACTIONS: &[&str] = &["s3:DeleteObject*"];

/// Operations granted to a principal that writes objects.
pub const BUCKET_PUT_ACTIONS: &[&str] = &[
    "s3:PutObject",
    "s3:PutObjectLegalHold",
    "s3:PutObjectRetention",
    "s3:PutObjectTagging",
    "s3:PutObjectVersionTagging",
    "s3:Abort*",
];

/// Immutable lookup from access level to operation list.
#[derive(Debug, Clone, Copy)]
pub struct ActionCatalog;

impl ActionCatalog {
    /// Returns the ordered operation list for `level`.
    ///
    /// Total over [`AccessLevel`]; every list is non-empty.
    #[must_use]
    pub const fn resolve(level: AccessLevel) -> &'static [&'static str] {
        match level {
            AccessLevel::ReadOnly => READ_ONLY,
            AccessLevel::ReadWrite => READ_WRITE,
            AccessLevel::FullAccess => FULL_ACCESS,
            AccessLevel::DataProcessing => DATA_PROCESSING,
        }
    }

    /// Operations granted when a function is given read/write access to a bucket.
    #[must_use]
    pub fn function_read_write() -> Vec<&'static str> {
        [BUCKET_READ_ACTIONS, BUCKET_DELETE_ACTIONS, BUCKET_PUT_ACTIONS].concat()
    }
}
