use crate::config::StackConfig;

use secure_bucket::notification::{EventType, KeyFilter};
use secure_bucket::region::StackEnv;
use secure_bucket::template::Template;
use secure_bucket::{BucketProps, Result, Stack};

use tracing::info;

pub const DATA_BUCKET_ID: &str = "DataBucket";
pub const PROCESSOR_ID: &str = "CsvProcessor";
pub const BUCKET_NAME_OUTPUT: &str = "BucketName";

/// Environment variable through which the function learns its bucket.
pub const BUCKET_NAME_ENV: &str = "BUCKET_NAME";

/// Uploads land in a secure bucket; each new CSV object under the upload
/// prefix invokes the processor, which may read and write the bucket.
#[derive(Debug, Clone)]
pub struct CsvConverterStack {
    stack: Stack,
}

impl CsvConverterStack {
    /// Composes the deployment described by `config`.
    ///
    /// # Errors
    /// Returns an error if the region is invalid or the bucket settings
    /// are contradictory (auto-delete in production).
    pub fn build(config: &StackConfig) -> Result<Self> {
        let env = StackEnv::new(config.account.as_str(), &config.region)?;
        let mut stack = Stack::new(config.stack_name.as_str(), env);

        let props = BucketProps {
            bucket_name: Some(config.resolved_bucket_name()),
            environment: config.environment.clone(),
            access: config.access.clone(),
            principals: config.principals.clone(),
            auto_delete_objects: config.auto_delete_objects,
        };
        let bucket_name = stack.add_bucket(DATA_BUCKET_ID, &props)?.bucket_name().to_owned();

        let mut function = config.function.clone();
        function.environment.insert(BUCKET_NAME_ENV.to_owned(), bucket_name.clone());
        stack.add_function(PROCESSOR_ID, function)?;

        stack.grant_read_write(DATA_BUCKET_ID, PROCESSOR_ID)?;

        let filter = KeyFilter::new(config.upload_prefix.as_str(), config.upload_suffix.as_str());
        stack.add_event_notification(DATA_BUCKET_ID, EventType::ObjectCreated, PROCESSOR_ID, filter)?;

        stack.add_output(BUCKET_NAME_OUTPUT, bucket_name.as_str(), Some("The name of the S3 bucket"))?;

        info!(stack = %config.stack_name, bucket = %bucket_name, environment = %config.environment, "composed csv converter stack");
        Ok(Self { stack })
    }

    #[must_use]
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    #[must_use]
    pub fn into_stack(self) -> Stack {
        self.stack
    }

    /// Renders the provisioning template.
    ///
    /// # Errors
    /// Returns an error if a policy document fails to serialize.
    pub fn synth(&self) -> Result<Template> {
        self.stack.synth()
    }
}
