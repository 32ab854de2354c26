//! Declarative stack of resource descriptors.
//!
//! A [`Stack`] is built once, in a single synchronous pass, and then
//! synthesized into a [`Template`](crate::template::Template) for the
//! provisioning engine. Resources are addressed by logical id; every
//! cross-resource operation fails with [`Error::UnknownResource`] when the
//! target does not exist yet.

use crate::access::AccessSpec;
use crate::actions::ActionCatalog;
use crate::bucket::{BucketProps, SecureBucket};
use crate::builder::{ResourcePolicy, SecureResourcePolicyBuilder, resource_scope};
use crate::error::{Error, Result};
use crate::function::{Function, FunctionProps};
use crate::grantee::Principals;
use crate::notification::{EventType, KeyFilter, NotificationRule};
use crate::region::StackEnv;

use bucket_policy::Statement;
use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::debug;

/// Service principal that delivers bucket notifications.
pub const S3_SERVICE_PRINCIPAL: &str = "s3.amazonaws.com";

/// Permission for the storage service to invoke a function on behalf of one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokePermission {
    pub function_arn: String,
    pub principal: String,
    pub source_account: String,
    pub source_arn: String,
}

/// A resource registered in a stack.
#[derive(Debug, Clone)]
pub enum Resource {
    Bucket(SecureBucket),
    Function(Function),
    Permission(InvokePermission),
}

impl Resource {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bucket(_) => "bucket",
            Self::Function(_) => "function",
            Self::Permission(_) => "permission",
        }
    }

    /// Every logical id the resource occupies in a synthesized template.
    ///
    /// A bucket also owns `{id}Policy` and a function owns `{id}ServiceRole`,
    /// whether or not those are emitted.
    #[must_use]
    pub fn logical_ids(&self, logical_id: &str) -> Vec<String> {
        let derived = match self {
            Self::Bucket(b) => Some(b.policy_id()),
            Self::Function(f) => Some(f.role_id()),
            Self::Permission(_) => None,
        };
        std::iter::once(logical_id.to_owned()).chain(derived).collect()
    }
}

/// A named value exported from the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub value: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    env: StackEnv,
    resources: IndexMap<String, Resource>,
    outputs: IndexMap<String, Output>,
}

impl Stack {
    #[must_use]
    pub fn new(name: impl Into<String>, env: StackEnv) -> Self {
        Self {
            name: name.into(),
            env,
            resources: IndexMap::new(),
            outputs: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn env(&self) -> &StackEnv {
        &self.env
    }

    /// Resources in registration order.
    pub fn resources(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// Outputs in registration order.
    pub fn outputs(&self) -> impl Iterator<Item = (&str, &Output)> {
        self.outputs.iter().map(|(name, o)| (name.as_str(), o))
    }

    /// Creates a [`SecureBucket`] and registers it under `logical_id`.
    ///
    /// # Errors
    /// + [`Error::DuplicateLogicalId`] if the id or its `{id}Policy` form is taken.
    /// + [`Error::AutoDeleteRequiresDestroy`] if the props are contradictory.
    pub fn add_bucket(&mut self, logical_id: &str, props: &BucketProps) -> Result<&SecureBucket> {
        let bucket = SecureBucket::new(logical_id, props, &self.env, &self.name)?;
        self.insert(logical_id, Resource::Bucket(bucket))?;
        self.bucket(logical_id)
    }

    /// Registers a function under `logical_id`.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateLogicalId`] if the id or its `{id}ServiceRole` form is taken.
    pub fn add_function(&mut self, logical_id: &str, props: FunctionProps) -> Result<&Function> {
        let function = Function::new(logical_id, props, &self.env, &self.name);
        self.insert(logical_id, Resource::Function(function))?;
        self.function(logical_id)
    }

    /// # Errors
    /// Returns [`Error::UnknownResource`] or [`Error::WrongResourceKind`].
    pub fn bucket(&self, logical_id: &str) -> Result<&SecureBucket> {
        match self.get(logical_id)? {
            Resource::Bucket(b) => Ok(b),
            _ => Err(wrong_kind(logical_id, "bucket")),
        }
    }

    /// # Errors
    /// Returns [`Error::UnknownResource`] or [`Error::WrongResourceKind`].
    pub fn function(&self, logical_id: &str) -> Result<&Function> {
        match self.get(logical_id)? {
            Resource::Function(f) => Ok(f),
            _ => Err(wrong_kind(logical_id, "function")),
        }
    }

    /// Appends a statement to the resource policy of the bucket `logical_id`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownResource`] if no such resource exists, or
    /// [`Error::WrongResourceKind`] if it cannot carry a resource policy.
    pub fn add_to_resource_policy(&mut self, logical_id: &str, statement: Statement) -> Result {
        self.bucket_mut(logical_id)?.add_to_resource_policy(statement);
        Ok(())
    }

    /// Derives further grants for an existing bucket and attaches them.
    ///
    /// Returns the number of statements attached, which is zero when the
    /// spec resolves to no operations or no principal is given.
    ///
    /// # Errors
    /// Returns [`Error::UnknownResource`] or [`Error::WrongResourceKind`].
    pub fn attach_access(&mut self, logical_id: &str, access: &AccessSpec, principals: &Principals) -> Result<usize> {
        let bucket = self.bucket_mut(logical_id)?;
        Ok(SecureResourcePolicyBuilder::attach_access(bucket, access, principals))
    }

    /// Lets `function_id` read, write and delete objects in `bucket_id`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownResource`] or [`Error::WrongResourceKind`].
    pub fn grant_read_write(&mut self, bucket_id: &str, function_id: &str) -> Result {
        let bucket_arn = self.bucket(bucket_id)?.arn().to_owned();
        let statement = Statement::allow(ActionCatalog::function_read_write(), resource_scope(&bucket_arn));
        self.function_mut(function_id)?.add_to_role_policy(statement);
        debug!(bucket = bucket_id, function = function_id, "granted read/write");
        Ok(())
    }

    /// Invokes `function_id` whenever `event` happens in `bucket_id` on a key passing `filter`.
    ///
    /// # Errors
    /// + [`Error::UnknownResource`] or [`Error::WrongResourceKind`] for a bad target.
    /// + [`Error::DuplicateLogicalId`] if the permission id is held by another resource.
    pub fn add_event_notification(&mut self, bucket_id: &str, event: EventType, function_id: &str, filter: KeyFilter) -> Result {
        let function_arn = self.function(function_id)?.arn().to_owned();
        let bucket_arn = self.bucket(bucket_id)?.arn().to_owned();

        let permission_id = format!("{bucket_id}AllowBucketNotificationsTo{function_id}");
        if !matches!(self.resources.get(&permission_id), Some(Resource::Permission(_))) {
            let permission = InvokePermission {
                function_arn: function_arn.clone(),
                principal: S3_SERVICE_PRINCIPAL.to_owned(),
                source_account: self.env.account().to_owned(),
                source_arn: bucket_arn,
            };
            self.insert(&permission_id, Resource::Permission(permission))?;
        }

        debug!(bucket = bucket_id, function = function_id, event = event.as_str(), ?filter, "adding event notification");
        self.bucket_mut(bucket_id)?.add_notification(NotificationRule {
            event,
            function_arn,
            filter,
        });
        Ok(())
    }

    /// Exports a named value.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateOutput`] if `name` is already exported.
    pub fn add_output(&mut self, name: &str, value: impl Into<String>, description: Option<&str>) -> Result {
        match self.outputs.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(Error::DuplicateOutput(name.to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(Output {
                    value: value.into(),
                    description: description.map(str::to_owned),
                });
                Ok(())
            }
        }
    }

    fn get(&self, logical_id: &str) -> Result<&Resource> {
        self.resources
            .get(logical_id)
            .ok_or_else(|| Error::UnknownResource(logical_id.to_owned()))
    }

    fn get_mut(&mut self, logical_id: &str) -> Result<&mut Resource> {
        self.resources
            .get_mut(logical_id)
            .ok_or_else(|| Error::UnknownResource(logical_id.to_owned()))
    }

    fn bucket_mut(&mut self, logical_id: &str) -> Result<&mut SecureBucket> {
        match self.get_mut(logical_id)? {
            Resource::Bucket(b) => Ok(b),
            _ => Err(wrong_kind(logical_id, "bucket")),
        }
    }

    fn function_mut(&mut self, logical_id: &str) -> Result<&mut Function> {
        match self.get_mut(logical_id)? {
            Resource::Function(f) => Ok(f),
            _ => Err(wrong_kind(logical_id, "function")),
        }
    }

    fn ensure_vacant(&self, logical_id: &str, resource: &Resource) -> Result {
        let taken: Vec<String> = self.resources.iter().flat_map(|(id, r)| r.logical_ids(id)).collect();
        match resource.logical_ids(logical_id).into_iter().find(|id| taken.contains(id)) {
            Some(id) => Err(Error::DuplicateLogicalId(id)),
            None => Ok(()),
        }
    }

    fn insert(&mut self, logical_id: &str, resource: Resource) -> Result {
        self.ensure_vacant(logical_id, &resource)?;
        debug!(stack = %self.name, logical_id, kind = resource.kind(), "registering resource");
        self.resources.insert(logical_id.to_owned(), resource);
        Ok(())
    }
}

fn wrong_kind(logical_id: &str, expected: &'static str) -> Error {
    Error::WrongResourceKind {
        logical_id: logical_id.to_owned(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::AccessLevel;

    fn stack() -> Stack {
        Stack::new("TestStack", StackEnv::new("123456789012", "us-east-1").unwrap())
    }

    fn bucket_props() -> BucketProps {
        BucketProps {
            bucket_name: Some("data".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn duplicate_logical_id() {
        let mut s = stack();
        s.add_bucket("Data", &bucket_props()).unwrap();
        let err = s.add_function("Data", FunctionProps::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateLogicalId(ref id) if id == "Data"));
    }

    #[test]
    fn derived_ids_are_reserved() {
        let mut s = stack();
        s.add_bucket("Data", &bucket_props()).unwrap();
        let err = s.add_function("DataPolicy", FunctionProps::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateLogicalId(ref id) if id == "DataPolicy"));

        s.add_function("Proc", FunctionProps::default()).unwrap();
        let err = s.add_bucket("ProcServiceRole", &bucket_props()).unwrap_err();
        assert!(matches!(err, Error::DuplicateLogicalId(ref id) if id == "ProcServiceRole"));

        // the new resource's own derived id collides with an existing one
        let err = s.add_function("Data", FunctionProps::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateLogicalId(ref id) if id == "Data"));
        let mut s = stack();
        s.add_function("XPolicy", FunctionProps::default()).unwrap();
        let err = s.add_bucket("X", &bucket_props()).unwrap_err();
        assert!(matches!(err, Error::DuplicateLogicalId(ref id) if id == "XPolicy"));
        assert_eq!(s.resources().count(), 1);
    }

    #[test]
    fn permission_id_held_by_another_resource() {
        let mut s = stack();
        s.add_bucket("Data", &bucket_props()).unwrap();
        s.add_function("Fn", FunctionProps::default()).unwrap();
        s.add_bucket("DataAllowBucketNotificationsToFn", &BucketProps::default()).unwrap();
        let err = s
            .add_event_notification("Data", EventType::ObjectCreated, "Fn", KeyFilter::default())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateLogicalId(_)));
        assert!(s.bucket("Data").unwrap().notifications().is_empty());
    }

    #[test]
    fn attach_to_missing_resource_is_fatal() {
        let mut s = stack();
        let stmt = Statement::allow(["s3:GetObject"], ["arn:aws:s3:::data/*"]);
        let err = s.add_to_resource_policy("Missing", stmt).unwrap_err();
        assert!(matches!(err, Error::UnknownResource(ref id) if id == "Missing"));

        let err = s
            .attach_access("Missing", &AccessSpec::level(AccessLevel::ReadOnly), &Principals::role("r"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownResource(_)));
    }

    #[test]
    fn attach_to_function_is_rejected() {
        let mut s = stack();
        s.add_function("Fn", FunctionProps::default()).unwrap();
        let err = s
            .add_to_resource_policy("Fn", Statement::allow(["s3:GetObject"], ["*"]))
            .unwrap_err();
        assert!(matches!(err, Error::WrongResourceKind { expected: "bucket", .. }));
    }

    #[test]
    fn later_grants_append() {
        let mut s = stack();
        let props = BucketProps {
            access: AccessSpec::level(AccessLevel::ReadOnly),
            principals: Principals::role("arn:role/a"),
            ..bucket_props()
        };
        s.add_bucket("Data", &props).unwrap();

        let n = s
            .attach_access("Data", &AccessSpec::level(AccessLevel::ReadWrite), &Principals::group("ops"))
            .unwrap();
        assert_eq!(n, 1);

        let policy = s.bucket("Data").unwrap().policy();
        assert_eq!(policy.len(), 2);
        assert_eq!(policy.statements()[0].actions().len(), 3);
        assert_eq!(policy.statements()[1].actions().len(), 4);
    }

    #[test]
    fn grant_read_write_targets_function_role() {
        let mut s = stack();
        s.add_bucket("Data", &bucket_props()).unwrap();
        s.add_function("Fn", FunctionProps::default()).unwrap();
        s.grant_read_write("Data", "Fn").unwrap();

        let f = s.function("Fn").unwrap();
        let [stmt] = f.role_policy().statements() else {
            panic!("expected one statement");
        };
        assert!(stmt.principal().is_none());
        assert_eq!(stmt.resources(), ["arn:aws:s3:::data", "arn:aws:s3:::data/*"]);
        assert_eq!(stmt.actions(), ActionCatalog::function_read_write());

        assert!(s.bucket("Data").unwrap().policy().is_empty());
    }

    #[test]
    fn grant_read_write_requires_both_resources() {
        let mut s = stack();
        s.add_bucket("Data", &bucket_props()).unwrap();
        assert!(matches!(s.grant_read_write("Data", "Fn"), Err(Error::UnknownResource(_))));
        assert!(matches!(s.grant_read_write("Nope", "Fn"), Err(Error::UnknownResource(_))));
    }

    #[test]
    fn event_notification_adds_permission_once() {
        let mut s = stack();
        s.add_bucket("Data", &bucket_props()).unwrap();
        s.add_function("Fn", FunctionProps::default()).unwrap();
        s.add_event_notification("Data", EventType::ObjectCreated, "Fn", KeyFilter::new("uploads/", ".csv"))
            .unwrap();
        s.add_event_notification("Data", EventType::ObjectRemoved, "Fn", KeyFilter::default())
            .unwrap();

        let permissions: Vec<_> = s
            .resources()
            .filter_map(|(id, r)| match r {
                Resource::Permission(p) => Some((id, p)),
                _ => None,
            })
            .collect();
        let [(id, p)] = permissions.as_slice() else {
            panic!("expected one permission");
        };
        assert_eq!(*id, "DataAllowBucketNotificationsToFn");
        assert_eq!(p.principal, "s3.amazonaws.com");
        assert_eq!(p.source_arn, "arn:aws:s3:::data");
        assert_eq!(p.source_account, "123456789012");

        let rules = s.bucket("Data").unwrap().notifications();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].filter.prefix.as_deref(), Some("uploads/"));
        assert_eq!(rules[0].function_arn, s.function("Fn").unwrap().arn());
    }

    #[test]
    fn duplicate_output() {
        let mut s = stack();
        s.add_output("BucketName", "data", None).unwrap();
        let err = s.add_output("BucketName", "other", None).unwrap_err();
        assert!(matches!(err, Error::DuplicateOutput(_)));
        assert_eq!(s.outputs().count(), 1);
    }
}
