//! Invocation context construction
//!
//! Turns the positional arguments and the process environment into the handler
//! identifier, the task root and the [`InvocationContext`] for the single invocation
//! this process performs.

use bytes::Bytes;
use mocklambda_core::RequestId;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::environment::{LambdaEnvironment, DEFAULT_CONTEXT};
use crate::function::FunctionConfig;
use crate::stream::SharedBuffer;

/// Cap for deadlines that would not fit in an `Instant`
const MAX_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid Lambda environment")]
    Environment(#[from] config::ConfigError),

    #[error("Request body is not valid JSON")]
    MalformedBody(#[source] serde_json::Error),
}

/// Positional command line arguments, both optional
#[derive(Debug, Clone, Default)]
pub struct InvocationArgs {
    pub handler: Option<String>,
    pub body: Option<String>,
}

/// Metadata of the one invocation this process runs
///
/// The deadline is fixed when the context is created; elapsed and remaining time are
/// always computed from the clock.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    request_id: RequestId,
    function: FunctionConfig,
    started_at: Instant,
    deadline: Instant,
    payload: Bytes,
    output: SharedBuffer,
    client_context: Option<String>,
    cognito_identity: Option<String>,
    environment: HashMap<String, String>,
}

impl InvocationContext {
    pub fn new(function: FunctionConfig, payload: impl Into<Bytes>) -> Self {
        let started_at = Instant::now();
        let deadline = started_at
            .checked_add(function.timeout)
            .unwrap_or_else(|| started_at + MAX_TIMEOUT);

        Self {
            request_id: RequestId::new(),
            function,
            started_at,
            deadline,
            payload: payload.into(),
            output: SharedBuffer::new(),
            client_context: None,
            cognito_identity: None,
            environment: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn with_client_context(mut self, client_context: Option<String>) -> Self {
        self.client_context = client_context;
        self
    }

    #[must_use]
    pub fn with_cognito_identity(mut self, cognito_identity: Option<String>) -> Self {
        self.cognito_identity = cognito_identity;
        self
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn function(&self) -> &FunctionConfig {
        &self.function
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Sink the handler writes its response into; clones share the same buffer
    pub fn output(&self) -> SharedBuffer {
        self.output.clone()
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn client_context(&self) -> Option<&str> {
        self.client_context.as_deref()
    }

    pub fn cognito_identity(&self) -> Option<&str> {
        self.cognito_identity.as_deref()
    }

    pub fn environment(&self) -> &HashMap<String, String> {
        &self.environment
    }

    /// Time elapsed since the context was created
    pub fn duration(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining_time(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

/// Everything the harness needs to run the invocation
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub handler: String,
    pub task_root: PathBuf,
    pub context: InvocationContext,
}

impl InvocationRequest {
    /// Build the request from positional arguments and environment variables.
    ///
    /// Arguments win over `AWS_LAMBDA_FUNCTION_HANDLER` / `AWS_LAMBDA_CONTEXT`. A missing
    /// handler becomes the empty string and fails later, during resolution. A missing body
    /// becomes `{}`.
    pub fn build(args: InvocationArgs, vars: HashMap<String, String>) -> Result<Self, InputError> {
        let env = LambdaEnvironment::from_vars(&vars)?;

        let handler = args
            .handler
            .or_else(|| env.aws_lambda_function_handler.clone())
            .unwrap_or_default();
        let body = args
            .body
            .or_else(|| env.aws_lambda_context.clone())
            .unwrap_or_else(|| DEFAULT_CONTEXT.to_string());

        serde_json::from_str::<serde_json::Value>(&body).map_err(InputError::MalformedBody)?;

        let context = InvocationContext::new(FunctionConfig::from_environment(&env), body)
            .with_client_context(env.aws_lambda_client_context.clone())
            .with_cognito_identity(env.aws_lambda_cognito_identity.clone())
            .with_environment(vars);

        Ok(Self {
            handler,
            task_root: env.task_root(),
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_arguments_take_priority() {
        let args = InvocationArgs {
            handler: Some("Arg::Type::Method".to_string()),
            body: Some(r#"{"from":"args"}"#.to_string()),
        };
        let request = InvocationRequest::build(
            args,
            vars(&[
                ("AWS_LAMBDA_FUNCTION_HANDLER", "Env::Type::Method"),
                ("AWS_LAMBDA_CONTEXT", r#"{"from":"env"}"#),
            ]),
        )
        .unwrap();

        assert_eq!(request.handler, "Arg::Type::Method");
        assert_eq!(request.context.payload().as_ref(), br#"{"from":"args"}"#);
    }

    #[test]
    fn test_environment_fallback() {
        let request = InvocationRequest::build(
            InvocationArgs::default(),
            vars(&[
                ("AWS_LAMBDA_FUNCTION_HANDLER", "Env::Type::Method"),
                ("AWS_LAMBDA_CONTEXT", r#"{"from":"env"}"#),
                ("LAMBDA_TASK_ROOT", "/opt/task"),
            ]),
        )
        .unwrap();

        assert_eq!(request.handler, "Env::Type::Method");
        assert_eq!(request.context.payload().as_ref(), br#"{"from":"env"}"#);
        assert_eq!(request.task_root, PathBuf::from("/opt/task"));
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let request = InvocationRequest::build(InvocationArgs::default(), HashMap::new()).unwrap();

        assert_eq!(request.handler, "");
        assert_eq!(request.context.payload().as_ref(), b"{}");
        assert_eq!(request.task_root, PathBuf::from("/var/task"));
    }

    #[test]
    fn test_any_json_body_is_accepted() {
        for body in ["{}", "[]", "42", "\"text\"", "null", r#"{"a":{"b":[1,2]}}"#] {
            let args = InvocationArgs {
                handler: None,
                body: Some(body.to_string()),
            };
            assert!(InvocationRequest::build(args, HashMap::new()).is_ok(), "{body}");
        }
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        for body in ["", "{", "{key: value}", "not json"] {
            let args = InvocationArgs {
                handler: None,
                body: Some(body.to_string()),
            };
            let result = InvocationRequest::build(args, HashMap::new());
            assert!(matches!(result, Err(InputError::MalformedBody(_))), "{body}");
        }
    }

    #[test]
    fn test_invalid_environment_is_rejected() {
        let result = InvocationRequest::build(
            InvocationArgs::default(),
            vars(&[("AWS_LAMBDA_FUNCTION_TIMEOUT", "soon")]),
        );
        assert!(matches!(result, Err(InputError::Environment(_))));
    }

    #[test]
    fn test_deadline_and_remaining_time() {
        let function = FunctionConfig {
            timeout: Duration::from_secs(60),
            ..Default::default()
        };
        let context = InvocationContext::new(function, "{}");

        let remaining = context.remaining_time();
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining > Duration::from_secs(59));
        assert!(context.duration() < Duration::from_secs(1));
    }

    #[test]
    fn test_remaining_time_saturates_at_zero() {
        let function = FunctionConfig {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        let context = InvocationContext::new(function, "{}");
        assert_eq!(context.remaining_time(), Duration::ZERO);
    }

    #[test]
    fn test_output_sink_is_shared() {
        use std::io::Write;

        let context = InvocationContext::new(FunctionConfig::default(), "{}");
        context.output().write_all(b"response").unwrap();

        assert_eq!(context.output().contents(), "response");
        assert_eq!(context.clone().output().take(), Bytes::from_static(b"response"));
        assert_eq!(context.output().contents(), "");
    }

    #[test]
    fn test_environment_is_forwarded() {
        let request = InvocationRequest::build(
            InvocationArgs::default(),
            vars(&[("CUSTOM_SETTING", "on"), ("AWS_LAMBDA_CLIENT_CONTEXT", "{}")]),
        )
        .unwrap();

        assert_eq!(
            request.context.environment().get("CUSTOM_SETTING").map(String::as_str),
            Some("on")
        );
        assert_eq!(request.context.client_context(), Some("{}"));
        assert!(request.context.cognito_identity().is_none());
    }
}
