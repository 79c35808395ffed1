//! Single-invocation Lambda bootstrap
//!
//! Resolves a handler from a module catalog, builds the invocation context from the
//! command line and environment, runs the handler once and reports the outcome using
//! the managed runtime's START/END/REPORT log lines.

pub mod bootstrap;
pub mod context;
pub mod environment;
pub mod function;
pub mod handler;
pub mod invocation;
pub mod lambda_context;
pub mod loader;
pub mod memory;
pub mod report;
pub mod stream;

pub use bootstrap::run;
pub use context::{InputError, InvocationArgs, InvocationContext, InvocationRequest};
pub use environment::LambdaEnvironment;
pub use function::FunctionConfig;
pub use handler::{HandlerFn, HandlerReference, Module, ModuleCatalog, ResolvedHandler};
pub use invocation::{ExecutionOutcome, Harness, HandlerExecutionError, InvocationError};
pub use lambda_context::{ClientApplication, ClientContext, CognitoIdentity, LambdaContext};
pub use loader::{HandlerLocator, LoadContext, ModuleResolver, ResolutionError, TaskRootResolver};
pub use stream::{DiagnosticStream, LogAction, SharedBuffer};
