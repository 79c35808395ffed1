//! Function configuration

use chrono::Utc;
use std::time::Duration;
use uuid::Uuid;

use crate::environment::LambdaEnvironment;

/// Static description of the function being emulated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionConfig {
    pub function_name: String,
    pub function_version: String,
    pub memory_size: u32,
    pub timeout: Duration,
    pub region: String,
    pub account_id: String,
    pub log_group_name: String,
    pub log_stream_name: String,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self::from_environment(&LambdaEnvironment::default())
    }
}

impl FunctionConfig {
    /// Derive the configuration from the Lambda environment, falling back to the
    /// values a fresh function on the managed runtime would report
    pub fn from_environment(env: &LambdaEnvironment) -> Self {
        let function_name = env
            .aws_lambda_function_name
            .clone()
            .unwrap_or_else(|| "test".to_string());
        let function_version = env
            .aws_lambda_function_version
            .clone()
            .unwrap_or_else(|| "$LATEST".to_string());

        let log_group_name = env
            .aws_lambda_log_group_name
            .clone()
            .unwrap_or_else(|| format!("/aws/lambda/{function_name}"));
        let log_stream_name = env.aws_lambda_log_stream_name.clone().unwrap_or_else(|| {
            format!(
                "{}/[{}]{}",
                Utc::now().format("%Y/%m/%d"),
                function_version,
                Uuid::new_v4().simple()
            )
        });

        Self {
            memory_size: env.aws_lambda_function_memory_size.unwrap_or(1536),
            timeout: Duration::from_secs(env.aws_lambda_function_timeout.unwrap_or(300)),
            region: env.region().to_string(),
            account_id: env
                .aws_account_id
                .clone()
                .unwrap_or_else(|| "000000000000".to_string()),
            function_name,
            function_version,
            log_group_name,
            log_stream_name,
        }
    }

    /// Get function ARN
    pub fn arn(&self) -> String {
        format!(
            "arn:aws:lambda:{}:{}:function:{}",
            self.region, self.account_id, self.function_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FunctionConfig::default();
        assert_eq!(config.function_name, "test");
        assert_eq!(config.function_version, "$LATEST");
        assert_eq!(config.memory_size, 1536);
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.log_group_name, "/aws/lambda/test");
        assert!(config.log_stream_name.contains("/[$LATEST]"));
        assert_eq!(
            config.arn(),
            "arn:aws:lambda:us-east-1:000000000000:function:test"
        );
    }

    #[test]
    fn test_environment_overrides() {
        let env = LambdaEnvironment {
            aws_lambda_function_name: Some("orders".to_string()),
            aws_lambda_function_version: Some("3".to_string()),
            aws_lambda_function_memory_size: Some(512),
            aws_lambda_function_timeout: Some(15),
            aws_region: Some("eu-central-1".to_string()),
            aws_account_id: Some("123456789012".to_string()),
            aws_lambda_log_stream_name: Some("stream".to_string()),
            ..Default::default()
        };

        let config = FunctionConfig::from_environment(&env);
        assert_eq!(config.memory_size, 512);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.log_group_name, "/aws/lambda/orders");
        assert_eq!(config.log_stream_name, "stream");
        assert_eq!(
            config.arn(),
            "arn:aws:lambda:eu-central-1:123456789012:function:orders"
        );
    }

    #[test]
    fn test_empty_function_name_is_kept() {
        let env = LambdaEnvironment {
            aws_lambda_function_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(FunctionConfig::from_environment(&env).function_name, "");
    }
}
