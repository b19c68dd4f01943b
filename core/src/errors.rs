use miette::Diagnostic;
use thiserror::Error;

use precision_error_state::PropagationError;
use precision_optimizer::BridgeError;
use precision_report::ReportError;

/// Top-level error taxonomy for one wired-up analysis core, collecting the leaf errors of
/// every crate it drives (`SPEC_FULL.md` §7). A [`CoreError::MalformedExpression`] is
/// fatal to the affected error state; a [`CoreError::SolverAbort`] is fatal to the
/// affected bound request only — the embedding application decides whether either should
/// escalate further, per the `SolverAbort` redesign note in §11.
#[derive(Debug, Error, Diagnostic)]
pub enum CoreError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    MalformedExpression(#[from] PropagationError),

    /// The optimizer returned an unrecognized unknown-reason for either the feasibility
    /// check or the maximize call. `SolverTimeout`/`SolverFailure` are not represented
    /// here — those are reported as `BoundStatus::Unknown` and do not stop execution.
    #[error(transparent)]
    #[diagnostic(transparent)]
    SolverAbort(#[from] BridgeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Report(#[from] ReportError),
}
