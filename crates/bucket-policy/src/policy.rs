use crate::error::PolicyError;
use crate::statement::Statement;

use serde::{Deserialize, Serialize};

/// The current policy language version.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Versions accepted by [`Policy::from_json`].
const SUPPORTED_VERSIONS: &[&str] = &[POLICY_VERSION, "2008-10-17"];

/// A policy document.
///
/// Statements can only be appended. Evaluation is an order-independent
/// union of allows, but the document keeps insertion order so that its
/// serialized form is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    version: String,
    statement: Vec<Statement>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            version: POLICY_VERSION.to_owned(),
            statement: Vec::new(),
        }
    }
}

impl Policy {
    /// Creates an empty document with the current version.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a statement.
    pub fn push(&mut self, statement: Statement) {
        self.statement.push(statement);
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statement
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statement.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statement.len()
    }

    /// Encodes the document as compact JSON.
    ///
    /// # Errors
    /// Returns [`PolicyError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, PolicyError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encodes the document as indented JSON.
    ///
    /// # Errors
    /// Returns [`PolicyError::Json`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, PolicyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a document from JSON.
    ///
    /// # Errors
    /// + Returns [`PolicyError::Json`] if the input is not a valid policy document.
    /// + Returns [`PolicyError::UnsupportedVersion`] if `Version` is unknown.
    pub fn from_json(s: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(s)?;
        if !SUPPORTED_VERSIONS.contains(&policy.version.as_str()) {
            return Err(PolicyError::UnsupportedVersion(policy.version));
        }
        Ok(policy)
    }
}

impl Extend<Statement> for Policy {
    fn extend<T: IntoIterator<Item = Statement>>(&mut self, iter: T) {
        self.statement.extend(iter);
    }
}
