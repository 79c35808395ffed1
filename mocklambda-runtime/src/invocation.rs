//! Invocation harness
//!
//! Runs the resolved handler once and emits the START/END/REPORT lines around it.
//! Handler failures, including panics, become [`ExecutionOutcome::Failure`]; they never
//! escape the harness.

use bytes::Bytes;
use mocklambda_core::{ErrorReport, ErrorType};
use std::any::Any;
use std::io::{self, Cursor, Write};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::info;

use crate::context::InvocationContext;
use crate::handler::ResolvedHandler;
use crate::lambda_context::LambdaContext;
use crate::loader::ResolutionError;
use crate::memory;
use crate::report::{self, ReportMetrics};
use crate::stream::DiagnosticStream;

#[derive(Debug, Error)]
pub enum HandlerExecutionError {
    #[error(transparent)]
    Failed(#[from] anyhow::Error),

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Execution(#[from] HandlerExecutionError),
}

impl InvocationError {
    /// Full description written to the diagnostic stream
    pub fn report(&self) -> ErrorReport {
        match self {
            Self::Resolution(e @ ResolutionError::Malformed(_)) => {
                ErrorReport::from_error(ErrorType::MalformedHandlerName, e)
            }
            Self::Resolution(e) => ErrorReport::from_error(ErrorType::HandlerNotFound, e),
            Self::Execution(HandlerExecutionError::Failed(e)) => {
                ErrorReport::new(ErrorType::UnhandledError, e.to_string())
                    .with_causes(e.chain().skip(1).map(ToString::to_string))
            }
            Self::Execution(e @ HandlerExecutionError::Panicked(_)) => {
                ErrorReport::new(ErrorType::Panic, e.to_string())
            }
        }
    }
}

/// Result of the single invocation; exactly one variant per run
#[derive(Debug)]
pub enum ExecutionOutcome {
    Success { output: Bytes },
    Failure { error: InvocationError },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Drives one invocation against the output and diagnostic streams
pub struct Harness<W: Write> {
    stdout: W,
    diagnostics: DiagnosticStream,
}

impl<W: Write> Harness<W> {
    pub fn new(stdout: W, diagnostics: DiagnosticStream) -> Self {
        Self {
            stdout,
            diagnostics,
        }
    }

    /// Run the invocation and report it.
    ///
    /// A resolution failure is reported like a handler failure: the START, END and
    /// REPORT lines are still written. Only I/O errors on the streams are returned.
    pub fn invoke(
        &mut self,
        context: &InvocationContext,
        handler: Result<ResolvedHandler, ResolutionError>,
    ) -> io::Result<ExecutionOutcome> {
        let request_id = context.request_id().as_str();
        let function = context.function();

        self.diagnostics
            .line(&report::start_line(request_id, &function.function_version))?;

        let outcome = match handler {
            Ok(handler) => self.execute(&handler, context),
            Err(e) => ExecutionOutcome::Failure { error: e.into() },
        };

        let metrics = ReportMetrics::new(
            context.duration(),
            function.memory_size,
            memory::bytes_to_mb(memory::peak_resident_bytes()),
        );
        self.diagnostics.line(&report::end_line(request_id))?;
        self.diagnostics
            .line(&report::report_line(request_id, &metrics))?;

        info!(
            request_id = %request_id,
            success = outcome.is_success(),
            duration_ms = %metrics.duration_ms,
            "Invocation finished"
        );

        match &outcome {
            ExecutionOutcome::Success { output } => {
                self.stdout.write_all(output)?;
                self.stdout.write_all(b"\n")?;
                self.stdout.flush()?;
            }
            ExecutionOutcome::Failure { error } => {
                self.diagnostics.line(&error.report().to_string())?;
            }
        }

        Ok(outcome)
    }

    fn execute(&self, handler: &ResolvedHandler, context: &InvocationContext) -> ExecutionOutcome {
        let lambda_context = LambdaContext::new(context, self.diagnostics.log_action());
        let mut input = Cursor::new(context.payload().clone());
        let mut output = context.output();

        // Reported as Runtime.Panic after REPORT, not through the panic hook
        let previous_hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            handler.call(&mut input, &mut output, &lambda_context)
        }));
        panic::set_hook(previous_hook);

        let written = output.take();
        match result {
            Ok(Ok(())) => ExecutionOutcome::Success { output: written },
            Ok(Err(e)) => ExecutionOutcome::Failure {
                error: HandlerExecutionError::Failed(e).into(),
            },
            Err(payload) => ExecutionOutcome::Failure {
                error: HandlerExecutionError::Panicked(panic_message(payload.as_ref())).into(),
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
