//! Deployment target: account, region and ARN partition.

use std::fmt;

/// A validated region identifier.
///
/// Regions follow the pattern `{geo}-{location}-{number}` (e.g. `us-east-1`),
/// with special cases such as `us-gov-west-1` and `cn-north-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region(String);

/// Error type for invalid region strings.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid region {0:?}")]
pub struct RegionError(String);

impl Region {
    /// Creates a new `Region` from a string, validating the format.
    ///
    /// # Errors
    /// Returns `RegionError` if the region string doesn't match expected patterns.
    ///
    /// # Examples
    /// ```
    /// # use secure_bucket::region::Region;
    /// let region = Region::new("eu-west-2").unwrap();
    /// assert_eq!(region.as_str(), "eu-west-2");
    ///
    /// assert!(Region::new("invalid_region").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, RegionError> {
        if is_valid_region(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(RegionError(s.to_owned()))
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the ARN partition the region belongs to.
    #[must_use]
    pub fn partition(&self) -> Partition {
        if self.0.starts_with("cn-") {
            Partition::AwsCn
        } else if self.0.starts_with("us-gov-") {
            Partition::AwsUsGov
        } else {
            Partition::Aws
        }
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates a region string.
///
/// Lowercase letters, digits and single hyphens; must start with a letter
/// and must not end with a hyphen.
///
/// ```
/// # use secure_bucket::region::is_valid_region;
/// assert!(is_valid_region("us-east-1"));
/// assert!(is_valid_region("cn-north-1"));
/// assert!(!is_valid_region(""));
/// assert!(!is_valid_region("invalid region"));
/// ```
#[must_use]
pub fn is_valid_region(s: &str) -> bool {
    let bytes = s.as_bytes();

    let Some(first) = bytes.first() else {
        return false;
    };
    if !first.is_ascii_lowercase() {
        return false;
    }

    if !bytes.iter().all(|&b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-') {
        return false;
    }

    !(s.ends_with('-') || s.contains("--"))
}

/// ARN partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Aws,
    AwsCn,
    AwsUsGov,
}

impl Partition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::AwsCn => "aws-cn",
            Self::AwsUsGov => "aws-us-gov",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The account and region a stack deploys into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEnv {
    account: String,
    region: Region,
}

impl StackEnv {
    /// # Errors
    /// Returns `RegionError` if `region` is not a valid region identifier.
    pub fn new(account: impl Into<String>, region: &str) -> Result<Self, RegionError> {
        Ok(Self {
            account: account.into(),
            region: Region::new(region)?,
        })
    }

    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    #[must_use]
    pub fn partition(&self) -> Partition {
        self.region.partition()
    }
}
