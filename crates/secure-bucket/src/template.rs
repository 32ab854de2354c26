//! Template synthesis.
//!
//! The template is the only artifact handed to the provisioning engine. It
//! follows the `CloudFormation` layout (`Resources`, `Outputs`) and keeps
//! every map in insertion order, so identical stacks synthesize to
//! byte-identical JSON.

use crate::arn::managed_policy_arn;
use crate::bucket::SecureBucket;
use crate::error::{Error, Result};
use crate::function::Function;
use crate::stack::{InvokePermission, Output, Resource, Stack};

use bucket_policy::{Policy, Principal, Statement};
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

const LAMBDA_SERVICE_PRINCIPAL: &str = "lambda.amazonaws.com";
const LAMBDA_BASIC_EXECUTION_POLICY: &str = "service-role/AWSLambdaBasicExecutionRole";

/// A synthesized resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceTemplate {
    #[serde(rename = "Type")]
    pub kind: String,

    pub properties: Value,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ResourceTemplate {
    fn new(kind: &str, properties: Value) -> Self {
        Self {
            kind: kind.to_owned(),
            properties,
            depends_on: Vec::new(),
            update_replace_policy: None,
            deletion_policy: None,
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputTemplate {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The synthesized stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    resources: IndexMap<String, ResourceTemplate>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    outputs: IndexMap<String, OutputTemplate>,
}

impl Template {
    #[must_use]
    pub fn resource(&self, logical_id: &str) -> Option<&ResourceTemplate> {
        self.resources.get(logical_id)
    }

    pub fn resources(&self) -> impl Iterator<Item = (&str, &ResourceTemplate)> {
        self.resources.iter().map(|(id, r)| (id.as_str(), r))
    }

    #[must_use]
    pub fn output(&self, name: &str) -> Option<&OutputTemplate> {
        self.outputs.get(name)
    }

    /// # Errors
    /// Returns [`Error::Json`](crate::Error::Json) if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    /// Returns [`Error::Json`](crate::Error::Json) if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Stack {
    /// Synthesizes the stack into a template.
    ///
    /// # Errors
    /// Returns [`Error::Json`](crate::Error::Json) if a policy document cannot be encoded.
    pub fn synth(&self) -> Result<Template> {
        let mut resources = IndexMap::new();

        for (id, resource) in self.resources() {
            match resource {
                Resource::Bucket(bucket) => {
                    place(&mut resources, id.to_owned(), self.synth_bucket(bucket))?;
                    if !bucket.policy().is_empty() {
                        place(&mut resources, bucket.policy_id(), synth_bucket_policy(bucket)?)?;
                    }
                }
                Resource::Function(function) => {
                    place(&mut resources, function.role_id(), self.synth_role(function)?)?;
                    place(&mut resources, id.to_owned(), synth_function(function))?;
                }
                Resource::Permission(permission) => {
                    place(&mut resources, id.to_owned(), synth_permission(permission))?;
                }
            }
        }

        let outputs = self
            .outputs()
            .map(|(name, Output { value, description })| {
                let output = OutputTemplate {
                    value: value.clone(),
                    description: description.clone(),
                };
                (name.to_owned(), output)
            })
            .collect();

        debug!(stack = self.name(), resources = resources.len(), "synthesized template");
        Ok(Template { resources, outputs })
    }

    fn synth_bucket(&self, bucket: &SecureBucket) -> ResourceTemplate {
        let hardening = bucket.hardening();

        let mut properties = json!({
            "BucketName": bucket.bucket_name(),
            "BucketEncryption": {
                "ServerSideEncryptionConfiguration": [
                    { "ServerSideEncryptionByDefault": { "SSEAlgorithm": hardening.encryption.sse_algorithm() } }
                ]
            },
        });

        if hardening.versioned {
            properties["VersioningConfiguration"] = json!({ "Status": "Enabled" });
        }

        if !bucket.tags().is_empty() {
            let tags: Vec<Value> = bucket
                .tags()
                .iter()
                .map(|(key, value)| json!({ "Key": key, "Value": value }))
                .collect();
            properties["Tags"] = Value::Array(tags);
        }

        if !bucket.notifications().is_empty() {
            let configs: Vec<Value> = bucket
                .notifications()
                .iter()
                .map(|rule| {
                    let mut config = json!({ "Event": rule.event.as_str(), "Function": rule.function_arn });
                    if !rule.filter.is_empty() {
                        let rules: Vec<Value> = rule
                            .filter
                            .rules()
                            .map(|(name, value)| json!({ "Name": name, "Value": value }))
                            .collect();
                        config["Filter"] = json!({ "S3Key": { "Rules": rules } });
                    }
                    config
                })
                .collect();
            properties["NotificationConfiguration"] = json!({ "LambdaConfigurations": configs });
        }

        let mut template = ResourceTemplate::new("AWS::S3::Bucket", properties);
        template.update_replace_policy = Some(hardening.removal_policy.as_str().to_owned());
        template.deletion_policy = Some(hardening.removal_policy.as_str().to_owned());

        // Invoke permissions must exist before the notification configuration is applied.
        template.depends_on = self
            .resources()
            .filter_map(|(id, r)| match r {
                Resource::Permission(p) if p.source_arn == bucket.arn() => Some(id.to_owned()),
                _ => None,
            })
            .collect();

        template
    }

    fn synth_role(&self, function: &Function) -> Result<ResourceTemplate> {
        let mut trust = Policy::new();
        trust.push(
            Statement::allow(["sts:AssumeRole"], Vec::<String>::new())
                .with_principal(Principal::Service(LAMBDA_SERVICE_PRINCIPAL.to_owned())),
        );

        let mut properties = json!({
            "AssumeRolePolicyDocument": serde_json::to_value(&trust)?,
            "ManagedPolicyArns": [managed_policy_arn(self.env().partition(), LAMBDA_BASIC_EXECUTION_POLICY)],
        });

        if !function.role_policy().is_empty() {
            properties["Policies"] = json!([{
                "PolicyName": format!("{}DefaultPolicy", function.role_id()),
                "PolicyDocument": serde_json::to_value(function.role_policy())?,
            }]);
        }

        Ok(ResourceTemplate::new("AWS::IAM::Role", properties))
    }
}

/// Adds a resource to the template; a logical id is never reused.
fn place(resources: &mut IndexMap<String, ResourceTemplate>, logical_id: String, template: ResourceTemplate) -> Result {
    match resources.entry(logical_id) {
        Entry::Occupied(slot) => Err(Error::DuplicateLogicalId(slot.key().clone())),
        Entry::Vacant(slot) => {
            slot.insert(template);
            Ok(())
        }
    }
}

fn synth_bucket_policy(bucket: &SecureBucket) -> Result<ResourceTemplate> {
    let properties = json!({
        "Bucket": bucket.bucket_name(),
        "PolicyDocument": serde_json::to_value(bucket.policy())?,
    });
    Ok(ResourceTemplate::new("AWS::S3::BucketPolicy", properties))
}

fn synth_function(function: &Function) -> ResourceTemplate {
    let props = function.props();

    let mut properties = json!({
        "FunctionName": function.function_name(),
        "Runtime": props.runtime,
        "Handler": props.handler,
        "Timeout": props.timeout_secs,
        "Role": { "Fn::GetAtt": [function.role_id(), "Arn"] },
    });

    if !props.environment.is_empty() {
        properties["Environment"] = json!({ "Variables": props.environment });
    }

    let mut template = ResourceTemplate::new("AWS::Lambda::Function", properties);
    template.depends_on = vec![function.role_id()];
    template.metadata = Some(json!({ "aws:asset:path": props.code_path }));
    template
}

fn synth_permission(permission: &InvokePermission) -> ResourceTemplate {
    let properties = json!({
        "Action": "lambda:InvokeFunction",
        "FunctionName": permission.function_arn,
        "Principal": permission.principal,
        "SourceAccount": permission.source_account,
        "SourceArn": permission.source_arn,
    });
    ResourceTemplate::new("AWS::Lambda::Permission", properties)
}
