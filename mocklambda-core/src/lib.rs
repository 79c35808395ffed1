//! Core types for mocklambda
//!
//! This crate provides the types shared between the runtime harness and the CLI.

pub mod error;
pub mod request_id;

pub use error::{ErrorReport, ErrorType};
pub use request_id::RequestId;
