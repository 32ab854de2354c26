use crate::condition::Condition;
use crate::principal::Principal;

use serde::{Deserialize, Deserializer, Serialize};

/// Whether a statement grants or denies the listed actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One rule of a policy document.
///
/// A statement is immutable once built: the `with_*` methods consume the
/// statement and return a new one, and there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sid: Option<String>,

    effect: Effect,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    principal: Option<Principal>,

    #[serde(deserialize_with = "one_or_many")]
    action: Vec<String>,

    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    resource: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<Condition>,
}

impl Statement {
    /// Creates a statement with the given effect, actions and resources.
    ///
    /// Action and resource strings are taken verbatim. Trust policies carry
    /// no resources; an empty resource list is left out of the JSON form.
    #[must_use]
    pub fn new<A, R>(effect: Effect, actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            sid: None,
            effect,
            principal: None,
            action: actions.into_iter().map(Into::into).collect(),
            resource: resources.into_iter().map(Into::into).collect(),
            condition: None,
        }
    }

    /// Creates an `Allow` statement.
    #[must_use]
    pub fn allow<A, R>(actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self::new(Effect::Allow, actions, resources)
    }

    #[must_use]
    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    #[must_use]
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Attaches a condition block. An empty block is dropped.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = (!condition.is_empty()).then_some(condition);
        self
    }

    #[must_use]
    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    #[must_use]
    pub fn effect(&self) -> Effect {
        self.effect
    }

    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    #[must_use]
    pub fn actions(&self) -> &[String] {
        &self.action
    }

    #[must_use]
    pub fn resources(&self) -> &[String] {
        &self.resource
    }

    #[must_use]
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

/// IAM accepts either a single string or an array of strings for `Action` and `Resource`.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}
