use std::fmt;

use serde::{Deserialize, Serialize};

/// The identity a statement applies to.
///
/// Serialized as a single-entry map: `{"AWS": "<arn>"}` or `{"Service": "<service>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Principal {
    /// An account, user or role, identified by its ARN.
    #[serde(rename = "AWS")]
    Aws(String),

    /// A service principal such as `iam.amazonaws.com`.
    #[serde(rename = "Service")]
    Service(String),
}

impl Principal {
    /// Returns the identifier carried by the principal.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Aws(s) | Self::Service(s) => s,
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aws(arn) => write!(f, "AWS:{arn}"),
            Self::Service(service) => write!(f, "Service:{service}"),
        }
    }
}
