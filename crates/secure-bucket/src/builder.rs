//! Derivation of access grants and their attachment to a resource policy.

use crate::access::AccessSpec;
use crate::arn::objects_arn;
use crate::grantee::{Grantee, Principals};

use bucket_policy::Statement;
use tracing::debug;

/// A resource that owns a resource policy document.
pub trait ResourcePolicy {
    /// The resource identifier grants are scoped to.
    fn resource_arn(&self) -> &str;

    /// Appends `statement` to the resource's policy document.
    fn add_to_resource_policy(&mut self, statement: Statement);
}

/// The two identifiers every grant is scoped to: the bucket and all of its objects.
///
/// Bucket-level operations (`s3:ListBucket`, `s3:GetBucketLocation`) need
/// the bucket ARN; object operations need the wildcard.
#[must_use]
pub fn resource_scope(bucket_arn: &str) -> [String; 2] {
    [bucket_arn.to_owned(), objects_arn(bucket_arn)]
}

/// Turns an access spec and a set of principals into policy statements.
#[derive(Debug, Clone, Copy)]
pub struct SecureResourcePolicyBuilder;

impl SecureResourcePolicyBuilder {
    /// Builds one `Allow` statement per supplied principal, role first.
    ///
    /// Returns nothing when the spec resolves to no operations or when no
    /// principal is supplied.
    #[must_use]
    pub fn statements(access: &AccessSpec, principals: &Principals, bucket_arn: &str) -> Vec<Statement> {
        let actions = access.effective_actions();
        if actions.is_empty() {
            return Vec::new();
        }

        principals
            .grantees()
            .map(|grantee| Self::statement(&grantee, &actions, bucket_arn))
            .collect()
    }

    /// Derives the grants for `resource` and appends them to its policy document.
    ///
    /// Returns the number of statements attached.
    pub fn attach_access<R>(resource: &mut R, access: &AccessSpec, principals: &Principals) -> usize
    where
        R: ResourcePolicy + ?Sized,
    {
        let statements = Self::statements(access, principals, resource.resource_arn());
        let count = statements.len();
        for statement in statements {
            debug!(
                resource = resource.resource_arn(),
                principal = ?statement.principal(),
                actions = statement.actions().len(),
                "attaching access grant"
            );
            resource.add_to_resource_policy(statement);
        }
        count
    }

    fn statement(grantee: &Grantee, actions: &[&str], bucket_arn: &str) -> Statement {
        let statement = Statement::allow(actions.iter().copied(), resource_scope(bucket_arn)).with_principal(grantee.principal());
        match grantee.condition() {
            Some(condition) => statement.with_condition(condition),
            None => statement,
        }
    }
}
