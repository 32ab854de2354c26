//! Stack configuration
//!
//! [`StackConfig`] carries every knob of the reference deployment. All
//! fields have defaults, so a configuration file only lists what it changes.
//!
//! # Example
//! ```
//! use csv_converter::StackConfig;
//!
//! let json = r#"{ "environment": "prod", "region": "eu-west-1", "autoDeleteObjects": false }"#;
//! let config = StackConfig::from_json(json).unwrap();
//! assert!(config.environment.is_production());
//! assert_eq!(config.region, "eu-west-1");
//! assert_eq!(config.stack_name, "CsvConverterStack");
//!
//! let deployment = csv_converter::CsvConverterStack::build(&config).unwrap();
//! assert!(deployment.stack().bucket("DataBucket").unwrap().hardening().versioned);
//! ```
//!
//! A retained `prod` bucket cannot auto-delete its objects, so a production
//! config must turn `autoDeleteObjects` off.

use secure_bucket::function::FunctionProps;
use secure_bucket::{AccessLevel, AccessSpec, Environment, Principals};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors raised while loading a [`StackConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reference deployment configuration.
///
/// Deserialization fills missing fields from [`StackConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct StackConfig {
    /// Stack name, used as the prefix of derived physical names.
    ///
    /// Default: `CsvConverterStack`
    pub stack_name: String,

    /// Target account id.
    ///
    /// Default: `000000000000`
    pub account: String,

    /// Target region.
    ///
    /// Default: `us-east-1`
    pub region: String,

    /// Deployment environment; `prod` turns on bucket hardening.
    ///
    /// Default: `dev`
    pub environment: Environment,

    /// Explicit bucket name.
    ///
    /// Default: `csv-data-{account}-{region}`
    pub bucket_name: Option<String>,

    /// Who may access the bucket.
    ///
    /// Default: the `developer` group
    pub principals: Principals,

    /// What the principals may do.
    ///
    /// Default: `fullAccess`
    pub access: AccessSpec,

    /// Empty the bucket when it is destroyed. Must be `false` in `prod`.
    ///
    /// Default: `true`
    pub auto_delete_objects: bool,

    /// Key prefix of uploads that trigger conversion.
    ///
    /// Default: `uploads/`
    pub upload_prefix: String,

    /// Key suffix of uploads that trigger conversion.
    ///
    /// Default: `.csv`
    pub upload_suffix: String,

    /// Conversion function settings.
    ///
    /// Default: `python3.9`, `index.handler`, 30 seconds, code in `lambda/converter`
    pub function: FunctionProps,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            stack_name: "CsvConverterStack".to_owned(),
            account: "000000000000".to_owned(),
            region: "us-east-1".to_owned(),
            environment: Environment::default(),
            bucket_name: None,
            principals: Principals::group("developer"),
            access: AccessSpec::level(AccessLevel::FullAccess),
            auto_delete_objects: true,
            upload_prefix: "uploads/".to_owned(),
            upload_suffix: ".csv".to_owned(),
            function: FunctionProps {
                timeout_secs: 30,
                code_path: "lambda/converter".to_owned(),
                ..FunctionProps::default()
            },
        }
    }
}

/// Values supplied on the command line, applied over a loaded config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub stack_name: Option<String>,
    pub account: Option<String>,
    pub region: Option<String>,
    pub environment: Option<String>,
    pub auto_delete_objects: Option<bool>,
}

impl StackConfig {
    /// Replaces every field for which `overrides` carries a value.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        let ConfigOverrides {
            stack_name,
            account,
            region,
            environment,
            auto_delete_objects,
        } = overrides;

        if let Some(stack_name) = stack_name {
            self.stack_name = stack_name;
        }
        if let Some(account) = account {
            self.account = account;
        }
        if let Some(region) = region {
            self.region = region;
        }
        if let Some(environment) = environment {
            self.environment = Environment::new(environment);
        }
        if let Some(auto_delete_objects) = auto_delete_objects {
            self.auto_delete_objects = auto_delete_objects;
        }
    }

    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    /// Returns an error if `json` is not a valid configuration document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Json {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!(path = %path.display(), stack = %config.stack_name, "loaded stack config");
        Ok(config)
    }

    /// The bucket name, derived from account and region unless set.
    #[must_use]
    pub fn resolved_bucket_name(&self) -> String {
        match &self.bucket_name {
            Some(name) => name.clone(),
            None => format!("csv-data-{}-{}", self.account, self.region),
        }
    }
}
