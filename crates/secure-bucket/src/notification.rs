use serde::{Deserialize, Serialize};

/// Bucket events a function can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "s3:ObjectCreated:*")]
    ObjectCreated,
    #[serde(rename = "s3:ObjectRemoved:*")]
    ObjectRemoved,
}

impl EventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ObjectCreated => "s3:ObjectCreated:*",
            Self::ObjectRemoved => "s3:ObjectRemoved:*",
        }
    }
}

/// Restricts a notification to keys with the given prefix and/or suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyFilter {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl KeyFilter {
    #[must_use]
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            suffix: Some(suffix.into()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefix.is_none() && self.suffix.is_none()
    }

    /// Filter rules in template order (`prefix`, then `suffix`).
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &str)> {
        let prefix = self.prefix.as_deref().map(|v| ("prefix", v));
        let suffix = self.suffix.as_deref().map(|v| ("suffix", v));
        prefix.into_iter().chain(suffix)
    }

    /// Whether an object key passes the filter.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        let prefix_ok = self.prefix.as_deref().is_none_or(|p| key.starts_with(p));
        let suffix_ok = self.suffix.as_deref().is_none_or(|s| key.ends_with(s));
        prefix_ok && suffix_ok
    }
}

/// Invoke a function when `event` happens on a key passing `filter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRule {
    pub event: EventType,
    pub function_arn: String,
    pub filter: KeyFilter,
}
