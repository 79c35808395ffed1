//! mocklambda - run a Lambda handler once, locally
//!
//! Resolves the handler, invokes it with the request body and prints the same
//! START/END/REPORT lines the managed runtime writes. Invocation failures are reported
//! on stderr; the exit code stays 0.

mod config;
mod samples;

use clap::Parser;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mocklambda_runtime::environment::process_vars;
use mocklambda_runtime::InvocationArgs;

#[derive(Parser, Debug)]
#[command(name = "mocklambda")]
#[command(about = "Run a Lambda handler once with a mock invocation context", long_about = None)]
struct Args {
    /// Handler identifier (Module::Type::method or Module::function).
    /// Falls back to AWS_LAMBDA_FUNCTION_HANDLER.
    #[arg(allow_hyphen_values = true)]
    handler: Option<String>,

    /// Request body as JSON. Falls back to AWS_LAMBDA_CONTEXT, then {}.
    #[arg(allow_hyphen_values = true)]
    body: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = crate::config::Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring invalid MOCKLAMBDA_* settings: {e}");
        crate::config::Config::default()
    });

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(false),
        )
        .init();

    let catalog = Arc::new(samples::catalog());
    tracing::debug!(modules = catalog.len(), "Loaded handler catalog");

    mocklambda_runtime::run(
        catalog,
        InvocationArgs {
            handler: args.handler,
            body: args.body,
        },
        process_vars(),
        io::stdout().lock(),
        io::stderr(),
    )?;

    Ok(())
}
