//! Lambda environment variables
//!
//! Loaded through `config::Environment` over an explicit variable map, so callers decide
//! whether the values come from the process or from a test fixture.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Task root used when `LAMBDA_TASK_ROOT` is unset
pub const DEFAULT_TASK_ROOT: &str = "/var/task";

/// Request body used when neither the command line nor `AWS_LAMBDA_CONTEXT` supply one
pub const DEFAULT_CONTEXT: &str = "{}";

/// Variables understood by the bootstrap
///
/// Field names are the lowercased variable names, as produced by `config::Environment`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LambdaEnvironment {
    pub lambda_task_root: Option<String>,
    pub aws_lambda_function_handler: Option<String>,
    pub aws_lambda_context: Option<String>,
    pub aws_lambda_function_name: Option<String>,
    pub aws_lambda_function_version: Option<String>,
    pub aws_lambda_function_memory_size: Option<u32>,
    pub aws_lambda_function_timeout: Option<u64>,
    pub aws_region: Option<String>,
    pub aws_default_region: Option<String>,
    pub aws_account_id: Option<String>,
    pub aws_lambda_log_group_name: Option<String>,
    pub aws_lambda_log_stream_name: Option<String>,
    pub aws_lambda_client_context: Option<String>,
    pub aws_lambda_cognito_identity: Option<String>,
}

impl LambdaEnvironment {
    /// Load from a variable map. Only `AWS_*` and `LAMBDA_*` entries are considered.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let relevant: config::Map<String, String> = vars
            .iter()
            .filter(|(key, _)| key.starts_with("AWS_") || key.starts_with("LAMBDA_"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let config = Config::builder()
            .add_source(Environment::default().source(Some(relevant)))
            .build()?;

        config.try_deserialize::<LambdaEnvironment>()
    }

    pub fn task_root(&self) -> PathBuf {
        PathBuf::from(
            self.lambda_task_root
                .as_deref()
                .unwrap_or(DEFAULT_TASK_ROOT),
        )
    }

    pub fn region(&self) -> &str {
        self.aws_region
            .as_deref()
            .or(self.aws_default_region.as_deref())
            .unwrap_or("us-east-1")
    }
}

/// The process environment, skipping entries that are not valid UTF-8
pub fn process_vars() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}
