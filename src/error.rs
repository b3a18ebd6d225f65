//! Runner and backend error types.

use thiserror::Error;

use crate::fault::Fault;

/// Errors surfaced by runners to their callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    #[error("invalid test class: {}", .errors.join("; "))]
    Initialization { errors: Vec<String> },

    #[error("no tests remain after filter: {filter}")]
    NoTestsRemain { filter: String },

    /// A fault escaped the class execution and could not be attributed to any test.
    #[error("class {class} failed: {fault}")]
    ClassFault {
        class: String,
        #[source]
        fault: Fault,
    },
}

/// Failure of an artifact, trace or sampling collaborator.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
