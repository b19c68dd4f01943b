//! The Error-State Propagator half of the precision analysis core (`SPEC_FULL.md` §1-2,
//! components C2-C4): the error-array registry, the opcode->error-term algebra, and the
//! per-state error memory (value-store, declared-input-error, math-call records, and the
//! memcpy witness).
//!
//! Everything here is generic over [`precision_expr::ExpressionFactory`] so it never needs
//! to know whether terms come from a real interpreter's IR or the in-process
//! [`precision_expr::SharedArena`] used in tests.

pub mod errors;
mod memory;
mod propagator;
mod registry;
mod state;

pub use errors::{MemoryMiss, PropagationError};
pub use memory::{ErrorMemory, InstrSite, MathCallRecord, MemoryObjectId, StoredError};
pub use propagator::{ConstraintSink, ErrorPropagator, NullConstraintSink, Opcode, PropagationOutcome, VecConstraintSink};
pub use registry::ErrorArrayRegistry;
pub use state::{ErrorState, Phase};
