//! The Error-Bound Optimizer Bridge half of the precision analysis core (`SPEC_FULL.md`
//! §1-2, components C5-C6): the bound request builder and the SMT optimizer bridge that
//! translates a query into integer- or real-domain SMT-LIB2, dispatches it through a
//! pluggable [`SolverBackend`], and decodes the extended-real per-input bounds.

pub mod bridge;
mod errors;
mod request;
mod translator;

pub use bridge::{Bound, BoundKind, Numeral, OptimizerBridge, QueryStatus, RawCheckResult, RawObjectiveResult, RawOptimizeResult, SolverBackend};
pub use errors::{BridgeError, SolverError};
pub use request::{BoundQuery, BoundRequestBuilder};
pub use translator::{Sort, Translator};
