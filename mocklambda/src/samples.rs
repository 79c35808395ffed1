//! Handlers linked into the binary
//!
//! `MockLambda.Samples` must be deployed under the task root (together with
//! `MockLambda.Samples.Common`) before its handlers resolve. `MockLambda.Serialization`
//! ships with the runtime and always resolves.

use anyhow::{anyhow, Context as _};
use mocklambda_runtime::{LambdaContext, Module, ModuleCatalog};
use serde::Serialize;
use std::io::{self, Read, Write};

pub const SAMPLES: &str = "MockLambda.Samples";
pub const SAMPLES_COMMON: &str = "MockLambda.Samples.Common";
pub const SERIALIZATION: &str = "MockLambda.Serialization";

const FUNCTIONS: &str = "MockLambda.Samples.Functions";

pub fn catalog() -> ModuleCatalog {
    ModuleCatalog::new()
        .with_module(
            Module::builder(SAMPLES)
                .depends_on(SAMPLES_COMMON)
                .depends_on(SERIALIZATION)
                .entry_point(format!("{FUNCTIONS}::Echo"), echo)
                .entry_point(format!("{FUNCTIONS}::Upper"), upper)
                .entry_point(format!("{FUNCTIONS}::Context"), describe_context)
                .entry_point(format!("{FUNCTIONS}::Fail"), fail)
                .entry_point(format!("{FUNCTIONS}::Panic"), |_, _, _| {
                    panic!("sample handler panicked on purpose")
                })
                .build(),
        )
        .with_module(Module::builder(SAMPLES_COMMON).build())
        .with_module(
            Module::builder(SERIALIZATION)
                .runtime_provided()
                .entry_point("Validate", validate)
                .build(),
        )
}

fn read_event(input: &mut dyn Read) -> anyhow::Result<serde_json::Value> {
    serde_json::from_reader(input).context("request body is not valid JSON")
}

fn echo(input: &mut dyn Read, output: &mut dyn Write, _: &LambdaContext) -> anyhow::Result<()> {
    io::copy(input, output)?;
    Ok(())
}

fn upper(input: &mut dyn Read, output: &mut dyn Write, context: &LambdaContext) -> anyhow::Result<()> {
    let event = read_event(input)?;
    let text = event
        .as_str()
        .ok_or_else(|| anyhow!("expected a JSON string, got {event}"))?;

    context.log(&format!("uppercasing {} characters", text.chars().count()));
    serde_json::to_writer(output, &text.to_uppercase())?;
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContextSummary<'a> {
    aws_request_id: &'a str,
    function_name: &'a str,
    function_version: &'a str,
    invoked_function_arn: &'a str,
    memory_limit_in_mb: u32,
    log_group_name: &'a str,
    log_stream_name: &'a str,
    remaining_time_in_millis: u64,
    has_client_context: bool,
    cognito_identity_id: Option<&'a str>,
}

fn describe_context(
    _: &mut dyn Read,
    output: &mut dyn Write,
    context: &LambdaContext,
) -> anyhow::Result<()> {
    let summary = ContextSummary {
        aws_request_id: &context.aws_request_id,
        function_name: &context.function_name,
        function_version: &context.function_version,
        invoked_function_arn: context.invoked_function_arn(),
        memory_limit_in_mb: context.memory_limit_in_mb,
        log_group_name: &context.log_group_name,
        log_stream_name: &context.log_stream_name,
        remaining_time_in_millis: context.get_remaining_time_in_millis(),
        has_client_context: context.client_context().is_some(),
        cognito_identity_id: context.identity().map(|i| i.cognito_identity_id.as_str()),
    };

    serde_json::to_writer(output, &summary)?;
    Ok(())
}

fn fail(input: &mut dyn Read, _: &mut dyn Write, _: &LambdaContext) -> anyhow::Result<()> {
    let event = read_event(input)?;
    let reason = event
        .get("reason")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("no reason given");

    Err(anyhow!("{reason}")).context("sample handler failed on purpose")
}

fn validate(input: &mut dyn Read, output: &mut dyn Write, _: &LambdaContext) -> anyhow::Result<()> {
    let event = read_event(input)?;
    serde_json::to_writer(output, &event)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_contents() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);

        let samples = catalog.get(SAMPLES).unwrap();
        assert!(!samples.is_runtime_provided());
        assert_eq!(samples.dependencies(), [SAMPLES_COMMON, SERIALIZATION]);
        for method in ["Echo", "Upper", "Context", "Fail", "Panic"] {
            assert!(samples.entry_point(&format!("{FUNCTIONS}::{method}")).is_some());
        }

        let serialization = catalog.get(SERIALIZATION).unwrap();
        assert!(serialization.is_runtime_provided());
        assert!(serialization.entry_point("Validate").is_some());
    }
}
