//! Lambda context passed to the handler

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::context::InvocationContext;
use crate::function::FunctionConfig;
use crate::stream::LogAction;

/// Mobile client application, as sent in a client context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientApplication {
    #[serde(default)]
    pub installation_id: String,
    #[serde(default)]
    pub app_title: String,
    #[serde(default)]
    pub app_version_name: String,
    #[serde(default)]
    pub app_version_code: String,
    #[serde(default)]
    pub app_package_name: String,
}

/// Client context supplied by the caller (`AWS_LAMBDA_CLIENT_CONTEXT`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContext {
    #[serde(default)]
    pub client: Option<ClientApplication>,
    #[serde(default)]
    pub custom: HashMap<String, String>,
    #[serde(default, rename = "env")]
    pub environment: HashMap<String, String>,
}

/// Cognito identity of the caller (`AWS_LAMBDA_COGNITO_IDENTITY`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitoIdentity {
    #[serde(default)]
    pub cognito_identity_id: String,
    #[serde(default)]
    pub cognito_identity_pool_id: String,
}

/// Context object handed to the handler for the duration of the invocation
///
/// The ARN, client context and identity are computed on first access and cached.
pub struct LambdaContext {
    pub aws_request_id: String,
    pub function_name: String,
    pub function_version: String,
    pub memory_limit_in_mb: u32,
    pub log_group_name: String,
    pub log_stream_name: String,
    deadline: Instant,
    function: FunctionConfig,
    invoked_function_arn: OnceCell<String>,
    client_context_source: Option<String>,
    client_context: OnceCell<Option<ClientContext>>,
    identity_source: Option<String>,
    identity: OnceCell<Option<CognitoIdentity>>,
    environment: HashMap<String, String>,
    log_action: LogAction,
}

impl LambdaContext {
    pub fn new(context: &InvocationContext, log_action: LogAction) -> Self {
        let function = context.function().clone();

        Self {
            aws_request_id: context.request_id().to_string(),
            function_name: function.function_name.clone(),
            function_version: function.function_version.clone(),
            memory_limit_in_mb: function.memory_size,
            log_group_name: function.log_group_name.clone(),
            log_stream_name: function.log_stream_name.clone(),
            deadline: context.deadline(),
            function,
            invoked_function_arn: OnceCell::new(),
            client_context_source: context.client_context().map(str::to_string),
            client_context: OnceCell::new(),
            identity_source: context.cognito_identity().map(str::to_string),
            identity: OnceCell::new(),
            environment: context.environment().clone(),
            log_action,
        }
    }

    /// Time left before the configured timeout. Advisory only: nothing aborts the
    /// handler when it reaches zero.
    pub fn remaining_time(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Get remaining time in milliseconds
    pub fn get_remaining_time_in_millis(&self) -> u64 {
        u64::try_from(self.remaining_time().as_millis()).unwrap_or(u64::MAX)
    }

    pub fn invoked_function_arn(&self) -> &str {
        self.invoked_function_arn.get_or_init(|| self.function.arn())
    }

    pub fn client_context(&self) -> Option<&ClientContext> {
        self.client_context
            .get_or_init(|| parse_optional(self.client_context_source.as_deref(), "client context"))
            .as_ref()
    }

    pub fn identity(&self) -> Option<&CognitoIdentity> {
        self.identity
            .get_or_init(|| parse_optional(self.identity_source.as_deref(), "cognito identity"))
            .as_ref()
    }

    pub fn environment(&self) -> &HashMap<String, String> {
        &self.environment
    }

    /// Write a line to the diagnostic stream
    pub fn log(&self, text: &str) {
        (self.log_action)(text);
    }
}

impl std::fmt::Debug for LambdaContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LambdaContext")
            .field("aws_request_id", &self.aws_request_id)
            .field("function_name", &self.function_name)
            .field("function_version", &self.function_version)
            .field("memory_limit_in_mb", &self.memory_limit_in_mb)
            .finish_non_exhaustive()
    }
}

fn parse_optional<T: DeserializeOwned>(source: Option<&str>, what: &str) -> Option<T> {
    let raw = source?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "Ignoring malformed {}", what);
            None
        }
    }
}
