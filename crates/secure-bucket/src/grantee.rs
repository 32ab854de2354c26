//! Principals that receive grants.
//!
//! A role is named directly. A group has no native representation in a
//! resource policy, so a [`GroupGrant`] is expressed as a broad service
//! principal narrowed by a tag condition on the calling identity. Whether
//! that tag really reflects group membership depends entirely on how the
//! identity system tags its principals; this crate cannot check it.

use bucket_policy::{Condition, Principal};
use serde::{Deserialize, Serialize};

/// Service principal used for group grants.
pub const GROUP_SERVICE_PRINCIPAL: &str = "iam.amazonaws.com";

/// Condition operator used for the group tag check.
pub const GROUP_CONDITION_OPERATOR: &str = "StringEquals";

/// Tag on the calling identity that names its group.
pub const GROUP_TAG_KEY: &str = "aws:PrincipalTag/aws:iam:groupName";

/// A grant to a role, named by its identity string (usually an ARN).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    role_arn: String,
}

impl RoleGrant {
    #[must_use]
    pub fn new(role_arn: impl Into<String>) -> Self {
        Self {
            role_arn: role_arn.into(),
        }
    }

    #[must_use]
    pub fn role_arn(&self) -> &str {
        &self.role_arn
    }

    #[must_use]
    pub fn principal(&self) -> Principal {
        Principal::Aws(self.role_arn.clone())
    }
}

/// A grant to every identity whose group tag equals `group_name`.
///
/// The comparison is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupGrant {
    group_name: String,
}

impl GroupGrant {
    #[must_use]
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
        }
    }

    #[must_use]
    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    #[must_use]
    pub fn principal(&self) -> Principal {
        Principal::Service(GROUP_SERVICE_PRINCIPAL.to_owned())
    }

    /// The condition key and value that stand in for group membership.
    #[must_use]
    pub fn tag_condition(&self) -> (&'static str, &str) {
        (GROUP_TAG_KEY, &self.group_name)
    }

    #[must_use]
    pub fn condition(&self) -> Condition {
        let (key, value) = self.tag_condition();
        Condition::new().with(GROUP_CONDITION_OPERATOR, key, value)
    }
}

/// One principal to grant access to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grantee {
    Role(RoleGrant),
    Group(GroupGrant),
}

impl Grantee {
    #[must_use]
    pub fn principal(&self) -> Principal {
        match self {
            Self::Role(role) => role.principal(),
            Self::Group(group) => group.principal(),
        }
    }

    #[must_use]
    pub fn condition(&self) -> Option<Condition> {
        match self {
            Self::Role(_) => None,
            Self::Group(group) => Some(group.condition()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Role(_) => "role",
            Self::Group(_) => "group",
        }
    }
}

/// The principals supplied with a provisioning request. Both may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Principals {
    pub role_arn: Option<String>,
    pub group_name: Option<String>,
}

impl Principals {
    #[must_use]
    pub fn role(role_arn: impl Into<String>) -> Self {
        Self::default().with_role(role_arn)
    }

    #[must_use]
    pub fn group(group_name: impl Into<String>) -> Self {
        Self::default().with_group(group_name)
    }

    #[must_use]
    pub fn with_role(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    #[must_use]
    pub fn with_group(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    /// Whether no principal is supplied. An empty string counts as absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grantees().next().is_none()
    }

    /// Yields the supplied principals, role first. Empty identifiers are skipped.
    pub fn grantees(&self) -> impl Iterator<Item = Grantee> + '_ {
        let role = supplied(self.role_arn.as_deref()).map(|arn| Grantee::Role(RoleGrant::new(arn)));
        let group = supplied(self.group_name.as_deref()).map(|name| Grantee::Group(GroupGrant::new(name)));
        role.into_iter().chain(group)
    }
}

fn supplied(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
