use std::fmt;

use serde::{Deserialize, Serialize};

/// The environment tag that turns on production hardening.
pub const PRODUCTION: &str = "prod";

/// Free-form deployment environment tag (`dev`, `staging`, `prod`, ...).
///
/// Only equality with [`PRODUCTION`] has any effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment(String);

impl Environment {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn production() -> Self {
        Self::new(PRODUCTION)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.0 == PRODUCTION
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new("dev")
    }
}

impl From<&str> for Environment {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_is_exact_match() {
        assert!(Environment::production().is_production());
        assert!(Environment::from("prod").is_production());
        assert!(!Environment::from("Prod").is_production());
        assert!(!Environment::from("production").is_production());
        assert!(!Environment::default().is_production());
    }
}
