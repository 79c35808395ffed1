//! Process-level bootstrap: context, resolution, invocation

use mocklambda_core::{ErrorReport, ErrorType};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;

use crate::context::{InvocationArgs, InvocationRequest};
use crate::handler::ModuleCatalog;
use crate::invocation::{ExecutionOutcome, Harness};
use crate::loader::{HandlerLocator, LoadContext, TaskRootResolver};
use crate::stream::DiagnosticStream;

/// Run the single invocation this process exists for.
///
/// Returns `Ok(None)` when the invocation input itself is invalid; the error has then
/// already been written to `stderr` and no log lines are emitted. Every other failure
/// is part of the returned outcome. `Err` means one of the streams could not be written.
pub fn run(
    catalog: Arc<ModuleCatalog>,
    args: InvocationArgs,
    vars: HashMap<String, String>,
    stdout: impl Write,
    stderr: impl Write + Send + 'static,
) -> io::Result<Option<ExecutionOutcome>> {
    let diagnostics = DiagnosticStream::new(stderr);

    let request = match InvocationRequest::build(args, vars) {
        Ok(request) => request,
        Err(e) => {
            diagnostics.line(&ErrorReport::from_error(ErrorType::InvalidInput, &e).to_string())?;
            return Ok(None);
        }
    };

    debug!(
        handler = %request.handler,
        task_root = %request.task_root.display(),
        request_id = %request.context.request_id(),
        "Resolved invocation input"
    );

    let resolver = Arc::new(TaskRootResolver::new(
        request.task_root.clone(),
        catalog.clone(),
    ));
    let locator = HandlerLocator::new(Arc::new(LoadContext::with_resolver(catalog, resolver)));
    let handler = locator.locate(&request.handler);

    let mut harness = Harness::new(stdout, diagnostics);
    harness.invoke(&request.context, handler).map(Some)
}
