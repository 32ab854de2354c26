use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A condition block: `{ operator: { key: value } }`.
///
/// Operators and keys keep insertion order. Values are compared by the
/// authorization engine at evaluation time, never by this crate.
///
/// ```
/// use bucket_policy::Condition;
///
/// let cond = Condition::new().with("StringEquals", "aws:PrincipalTag/team", "data");
/// assert_eq!(cond.get("StringEquals", "aws:PrincipalTag/team"), Some("data"));
/// assert_eq!(cond.get("StringLike", "aws:PrincipalTag/team"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition(IndexMap<String, IndexMap<String, String>>);

impl Condition {
    /// Creates an empty condition block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key = value` under `operator`, replacing a previous value for the same key.
    #[must_use]
    pub fn with(mut self, operator: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.entry(operator.into()).or_default().insert(key.into(), value.into());
        self
    }

    /// Looks up the value of `key` under `operator`.
    #[must_use]
    pub fn get(&self, operator: &str, key: &str) -> Option<&str> {
        self.0.get(operator)?.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(operator, key, value)` triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.0.iter().flat_map(|(op, entries)| {
            entries
                .iter()
                .map(move |(key, value)| (op.as_str(), key.as_str(), value.as_str()))
        })
    }
}
