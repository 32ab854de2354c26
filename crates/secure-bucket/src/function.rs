use crate::arn::{MAX_FUNCTION_NAME_LEN, function_arn, physical_name};
use crate::region::StackEnv;

use bucket_policy::{Policy, Statement};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Settings of an event-triggered processing function.
///
/// The function body is opaque: it is referenced by `code_path` and
/// `handler` and packaged by the provisioning engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FunctionProps {
    pub function_name: Option<String>,
    pub runtime: String,
    pub handler: String,
    pub code_path: String,
    pub timeout_secs: u32,
    pub environment: IndexMap<String, String>,
}

impl Default for FunctionProps {
    fn default() -> Self {
        Self {
            function_name: None,
            runtime: "python3.9".to_owned(),
            handler: "index.handler".to_owned(),
            code_path: "lambda".to_owned(),
            timeout_secs: 3,
            environment: IndexMap::new(),
        }
    }
}

/// A function and the identity policy of its execution role.
#[derive(Debug, Clone)]
pub struct Function {
    logical_id: String,
    function_name: String,
    arn: String,
    props: FunctionProps,
    role_policy: Policy,
}

impl Function {
    #[must_use]
    pub fn new(logical_id: &str, props: FunctionProps, env: &StackEnv, stack_name: &str) -> Self {
        let function_name = props
            .function_name
            .clone()
            .unwrap_or_else(|| physical_name(stack_name, logical_id, MAX_FUNCTION_NAME_LEN));
        let arn = function_arn(env, &function_name);
        Self {
            logical_id: logical_id.to_owned(),
            function_name,
            arn,
            props,
            role_policy: Policy::new(),
        }
    }

    #[must_use]
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    #[must_use]
    pub fn arn(&self) -> &str {
        &self.arn
    }

    #[must_use]
    pub fn props(&self) -> &FunctionProps {
        &self.props
    }

    /// Logical id of the execution role.
    #[must_use]
    pub fn role_id(&self) -> String {
        format!("{}ServiceRole", self.logical_id)
    }

    #[must_use]
    pub fn role_policy(&self) -> &Policy {
        &self.role_policy
    }

    /// Appends an identity statement to the execution role.
    pub fn add_to_role_policy(&mut self, statement: Statement) {
        self.role_policy.push(statement);
    }
}
