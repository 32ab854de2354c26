//! A bucket with environment-driven hardening and derived access grants.

use crate::access::AccessSpec;
use crate::arn::{MAX_BUCKET_NAME_LEN, bucket_arn, physical_name};
use crate::builder::{ResourcePolicy, SecureResourcePolicyBuilder};
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::grantee::Principals;
use crate::notification::NotificationRule;
use crate::region::StackEnv;

use bucket_policy::{Policy, Statement};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tag set on buckets whose objects are emptied before the bucket is deleted.
pub const AUTO_DELETE_OBJECTS_TAG: &str = "aws-cdk:auto-delete-objects";

/// What happens to the bucket when it is removed from the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalPolicy {
    Retain,
    Destroy,
}

impl RemovalPolicy {
    /// The template's `DeletionPolicy` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retain => "Retain",
            Self::Destroy => "Delete",
        }
    }
}

/// Server-side encryption mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketEncryption {
    S3Managed,
}

impl BucketEncryption {
    #[must_use]
    pub const fn sse_algorithm(self) -> &'static str {
        match self {
            Self::S3Managed => "AES256",
        }
    }
}

/// Hardening settings derived from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hardening {
    pub encryption: BucketEncryption,
    pub versioned: bool,
    pub removal_policy: RemovalPolicy,
    pub auto_delete_objects: bool,
}

impl Hardening {
    /// Encryption is always on. Versioning and retention apply only in production.
    #[must_use]
    pub fn for_environment(environment: &Environment, auto_delete_objects: bool) -> Self {
        let prod = environment.is_production();
        Self {
            encryption: BucketEncryption::S3Managed,
            versioned: prod,
            removal_policy: if prod { RemovalPolicy::Retain } else { RemovalPolicy::Destroy },
            auto_delete_objects,
        }
    }
}

/// Creation parameters of a [`SecureBucket`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BucketProps {
    pub bucket_name: Option<String>,
    pub environment: Environment,
    pub access: AccessSpec,
    pub principals: Principals,
    pub auto_delete_objects: bool,
}

/// Descriptor of a hardened bucket and its resource policy.
#[derive(Debug, Clone)]
pub struct SecureBucket {
    logical_id: String,
    bucket_name: String,
    arn: String,
    hardening: Hardening,
    policy: Policy,
    tags: IndexMap<String, String>,
    notifications: Vec<NotificationRule>,
}

impl SecureBucket {
    /// Builds the bucket descriptor and attaches the grants described by `props`.
    ///
    /// # Errors
    /// Returns [`Error::AutoDeleteRequiresDestroy`] if `auto_delete_objects` is
    /// requested for a bucket that is retained on removal.
    pub fn new(logical_id: &str, props: &BucketProps, env: &StackEnv, stack_name: &str) -> Result<Self> {
        let hardening = Hardening::for_environment(&props.environment, props.auto_delete_objects);
        if hardening.auto_delete_objects && hardening.removal_policy != RemovalPolicy::Destroy {
            return Err(Error::AutoDeleteRequiresDestroy(logical_id.to_owned()));
        }

        let bucket_name = props
            .bucket_name
            .clone()
            .unwrap_or_else(|| physical_name(stack_name, logical_id, MAX_BUCKET_NAME_LEN));
        let arn = bucket_arn(env.partition(), &bucket_name);

        let mut tags = IndexMap::new();
        if hardening.auto_delete_objects {
            tags.insert(AUTO_DELETE_OBJECTS_TAG.to_owned(), "true".to_owned());
        }

        let mut bucket = Self {
            logical_id: logical_id.to_owned(),
            bucket_name,
            arn,
            hardening,
            policy: Policy::new(),
            tags,
            notifications: Vec::new(),
        };

        debug!(
            bucket = %bucket.bucket_name,
            environment = %props.environment,
            versioned = hardening.versioned,
            removal = hardening.removal_policy.as_str(),
            "creating secure bucket"
        );

        SecureResourcePolicyBuilder::attach_access(&mut bucket, &props.access, &props.principals);
        Ok(bucket)
    }

    #[must_use]
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    #[must_use]
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    #[must_use]
    pub fn arn(&self) -> &str {
        &self.arn
    }

    #[must_use]
    pub fn hardening(&self) -> &Hardening {
        &self.hardening
    }

    /// The bucket's resource policy document.
    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    #[must_use]
    pub fn tags(&self) -> &IndexMap<String, String> {
        &self.tags
    }

    #[must_use]
    pub fn notifications(&self) -> &[NotificationRule] {
        &self.notifications
    }

    /// Logical id of the bucket policy resource.
    #[must_use]
    pub fn policy_id(&self) -> String {
        format!("{}Policy", self.logical_id)
    }

    pub(crate) fn add_notification(&mut self, rule: NotificationRule) {
        self.notifications.push(rule);
    }
}

impl ResourcePolicy for SecureBucket {
    fn resource_arn(&self) -> &str {
        &self.arn
    }

    fn add_to_resource_policy(&mut self, statement: Statement) {
        self.policy.push(statement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::AccessLevel;

    fn env() -> StackEnv {
        StackEnv::new("123456789012", "us-east-1").unwrap()
    }

    #[test]
    fn dev_hardening() {
        let h = Hardening::for_environment(&Environment::from("dev"), false);
        assert_eq!(h.encryption, BucketEncryption::S3Managed);
        assert_eq!(h.versioned, false);
        assert_eq!(h.removal_policy, RemovalPolicy::Destroy);
        assert_eq!(h.auto_delete_objects, false);
    }

    #[test]
    fn prod_hardening() {
        let h = Hardening::for_environment(&Environment::production(), false);
        assert_eq!(h.encryption, BucketEncryption::S3Managed);
        assert_eq!(h.versioned, true);
        assert_eq!(h.removal_policy, RemovalPolicy::Retain);
    }

    #[test]
    fn hardening_is_independent_of_access() {
        let base = BucketProps {
            bucket_name: Some("b".to_owned()),
            environment: Environment::production(),
            ..Default::default()
        };
        let granted = BucketProps {
            access: AccessSpec::level(AccessLevel::FullAccess),
            principals: Principals::role("arn:role/r"),
            ..base.clone()
        };

        let a = SecureBucket::new("Data", &base, &env(), "S").unwrap();
        let b = SecureBucket::new("Data", &granted, &env(), "S").unwrap();
        assert_eq!(a.hardening(), b.hardening());
        assert!(a.policy().is_empty());
        assert_eq!(b.policy().len(), 1);
    }

    #[test]
    fn explicit_name_and_arn() {
        let props = BucketProps {
            bucket_name: Some("csv-data-123456789012-us-east-1".to_owned()),
            ..Default::default()
        };
        let bucket = SecureBucket::new("DataBucket", &props, &env(), "Stack").unwrap();
        assert_eq!(bucket.bucket_name(), "csv-data-123456789012-us-east-1");
        assert_eq!(bucket.arn(), "arn:aws:s3:::csv-data-123456789012-us-east-1");
        assert_eq!(bucket.policy_id(), "DataBucketPolicy");
    }

    #[test]
    fn derived_name() {
        let bucket = SecureBucket::new("DataBucket", &BucketProps::default(), &env(), "CsvConverterStack").unwrap();
        assert_eq!(bucket.bucket_name(), "csvconverterstack-databucket");
    }

    #[test]
    fn auto_delete_tag() {
        let props = BucketProps {
            auto_delete_objects: true,
            ..Default::default()
        };
        let bucket = SecureBucket::new("B", &props, &env(), "S").unwrap();
        assert_eq!(bucket.tags().get(AUTO_DELETE_OBJECTS_TAG).map(String::as_str), Some("true"));
        assert!(bucket.hardening().auto_delete_objects);
    }

    #[test]
    fn auto_delete_in_prod_is_rejected() {
        let props = BucketProps {
            environment: Environment::production(),
            auto_delete_objects: true,
            ..Default::default()
        };
        let err = SecureBucket::new("B", &props, &env(), "S").unwrap_err();
        assert!(matches!(err, Error::AutoDeleteRequiresDestroy(ref id) if id == "B"));
    }

    #[test]
    fn grants_are_scoped_to_this_bucket() {
        let props = BucketProps {
            bucket_name: Some("data".to_owned()),
            access: AccessSpec::level(AccessLevel::ReadOnly),
            principals: Principals::group("analysts"),
            ..Default::default()
        };
        let bucket = SecureBucket::new("B", &props, &env(), "S").unwrap();
        let stmt = &bucket.policy().statements()[0];
        assert_eq!(stmt.resources(), ["arn:aws:s3:::data", "arn:aws:s3:::data/*"]);
    }
}
