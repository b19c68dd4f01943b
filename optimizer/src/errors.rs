use miette::Diagnostic;
use thiserror::Error;

/// The three non-`SUCCESS_*` rows of the §4.6 response-handling table, context-free.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// `UNKNOWN`, reason `"timeout"` or `"canceled"`. The bound is reported `UNKNOWN` and
    /// execution continues (`spec.md` §7 `SolverTimeout`).
    #[error("solver exceeded its configured timeout")]
    Timeout,
    /// `UNKNOWN`, reason `"unknown"`. Counted separately from [`SolverError::Timeout`]
    /// (`spec.md` §7 `SolverFailure`).
    #[error("solver returned unknown for a reason other than timeout")]
    Failure,
    /// `UNKNOWN` with an unrecognized reason string. `spec.md` §7 documents this as a
    /// process-level abort; `SPEC_FULL.md` §6a.2/§11 redesigns it into a typed error so the
    /// embedding application decides how to terminate.
    #[error("solver returned an unrecognized unknown-reason: {reason}")]
    Abort { reason: String },
}

/// Wraps a [`SolverError`] with the query's name and, if available, source location — the
/// same "wrap with context at the boundary that has it" shape the reference workspace uses
/// for `ExecutionError::OperationError`.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
#[error("query {query_name:?} failed")]
pub struct BridgeError {
    pub query_name: String,
    #[source]
    pub source: SolverError,
}

impl BridgeError {
    pub fn new(query_name: impl Into<String>, source: SolverError) -> Self {
        Self { query_name: query_name.into(), source }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self.source, SolverError::Abort { .. })
    }
}
