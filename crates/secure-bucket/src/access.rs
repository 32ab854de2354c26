use crate::actions::{AccessLevel, ActionCatalog};

use serde::{Deserialize, Serialize};

/// What a grant should permit: a named level, an explicit operation list, or nothing.
///
/// A non-empty custom list always wins over the level. Custom entries are
/// passed through verbatim and never checked against a known vocabulary.
///
/// ```
/// use secure_bucket::{AccessLevel, AccessSpec};
///
/// let spec = AccessSpec::level(AccessLevel::FullAccess).with_custom(["s3:GetObject"]);
/// assert_eq!(spec.effective_actions(), ["s3:GetObject"]);
///
/// assert!(AccessSpec::default().effective_actions().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessSpec {
    /// Named access level, resolved through [`ActionCatalog`].
    pub level: Option<AccessLevel>,

    /// Explicit operation list. Takes precedence over `level` when non-empty.
    pub custom: Vec<String>,
}

impl AccessSpec {
    #[must_use]
    pub fn level(level: AccessLevel) -> Self {
        Self {
            level: Some(level),
            custom: Vec::new(),
        }
    }

    #[must_use]
    pub fn custom<I>(actions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::default().with_custom(actions)
    }

    #[must_use]
    pub fn with_custom<I>(mut self, actions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.custom = actions.into_iter().map(Into::into).collect();
        self
    }

    /// Resolves the operations this spec grants.
    #[must_use]
    pub fn effective_actions(&self) -> Vec<&str> {
        if !self.custom.is_empty() {
            return self.custom.iter().map(String::as_str).collect();
        }
        match self.level {
            Some(level) => ActionCatalog::resolve(level).to_vec(),
            None => Vec::new(),
        }
    }
}
