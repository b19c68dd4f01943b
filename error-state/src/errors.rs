use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while propagating an error term through an instruction (§4.3) or while
/// resolving the error term of a value (§4.2).
///
/// Context-free: callers that have source-location information available (the decoder /
/// interpreter boundary, out of scope for this core) are expected to wrap this in their
/// own diagnostic type, the same two-tier shape the reference workspace uses for
/// `OperationError` → `ExecutionError`.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum PropagationError {
    /// §7: "an expression the propagator cannot handle". Fatal to the current error state.
    #[error(
        "malformed expression: error lookup on term {term:?} found neither a cached error \
         term nor a recognizable constant/read/concat-of-reads shape"
    )]
    MalformedExpression { term: precision_expr::ExprId },

    /// An opcode outside the algebra table of §4.3 (e.g. a comparison) was routed to
    /// `propagate` instead of being treated as producing no error.
    #[error("opcode {opcode:?} produces no error term and must not be propagated")]
    NoErrorForOpcode { opcode: crate::propagator::Opcode },
}

/// Non-fatal conditions surfaced by error memory (§4.4, §7 `UninitializedLoad`). These are
/// never returned as an `Err` from [`crate::memory::ErrorMemory::load`] — the call still
/// succeeds with a zero value/error pair — but are reported through `tracing` and kept
/// here as a typed enum so callers that want to count or assert on misses can match on it.
#[derive(Debug, Error, Diagnostic, Clone, Copy, PartialEq, Eq)]
pub enum MemoryMiss {
    #[error("load of uninitialized error-memory cell, modeled as zero error")]
    UninitializedLoad,
}
