use precision_config::Configuration;
use precision_expr::ExpressionFactory;

use crate::memory::ErrorMemory;
use crate::propagator::ErrorPropagator;

/// The per-state propagation state machine of `spec.md` §4.3: `Fresh -> Tainted ->
/// Reported`. Transitions are one-way and reported back to the caller so
/// `precision-core` can log them via `tracing::info!` (`SPEC_FULL.md` §6a.1) — this crate
/// never installs a subscriber or logs the transition itself, only the fact that one
/// occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// No input error registered yet.
    Fresh,
    /// At least one `registerInputError` has occurred; propagation is active.
    Tainted,
    /// At least one `outputErrorBound` call has completed. Propagation remains allowed;
    /// only the reporter's write-on-request behavior changes.
    Reported,
}

/// Owns one execution state's error-propagation bookkeeping: the propagator (C3, with its
/// embedded error-array registry C2) and the error memory (C4), plus the `Fresh -> Tainted
/// -> Reported` phase.
///
/// Created when the interpreter forks a new execution state ([`ErrorState::fork`]) and
/// destroyed with it; all mutation happens from the single-threaded interpreter driving
/// the state (`spec.md` §5).
pub struct ErrorState<F: ExpressionFactory> {
    propagator: ErrorPropagator<F>,
    memory: ErrorMemory,
    phase: Phase,
}

impl<F: ExpressionFactory + Clone> ErrorState<F> {
    pub fn new(factory: F, config: Configuration) -> Self {
        Self { propagator: ErrorPropagator::new(factory, config), memory: ErrorMemory::new(), phase: Phase::Fresh }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn propagator(&self) -> &ErrorPropagator<F> {
        &self.propagator
    }

    pub fn propagator_mut(&mut self) -> &mut ErrorPropagator<F> {
        &mut self.propagator
    }

    pub fn memory(&self) -> &ErrorMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut ErrorMemory {
        &mut self.memory
    }

    /// Transitions `Fresh -> Tainted` the first time an input error is registered.
    /// Returns `true` iff this call caused the transition, so the caller can decide
    /// whether to log it.
    pub fn note_input_error_registered(&mut self) -> bool {
        if self.phase == Phase::Fresh {
            self.phase = Phase::Tainted;
            true
        } else {
            false
        }
    }

    /// Transitions to `Reported` the first time an `outputErrorBound` call completes.
    /// Idempotent; returns `true` only on the transition that actually moved the phase.
    pub fn note_bound_reported(&mut self) -> bool {
        if self.phase != Phase::Reported {
            self.phase = Phase::Reported;
            true
        } else {
            false
        }
    }

    /// Duplicates this error state for a forked execution state. Per `SPEC_FULL.md` §10
    /// point 1 (grounded on `original_source/lib/Core/ErrorState.h`'s copy constructor),
    /// this is a shallow copy of the per-state maps: the child gets its own
    /// `HashMap`s, independent from the parent from the moment of fork, while the
    /// underlying expression terms keep being shared through the immutable arena/DAG
    /// (Testable Property 5, `spec.md` §8).
    pub fn fork(&self) -> Self {
        Self { propagator: self.propagator.clone(), memory: self.memory.clone(), phase: self.phase }
    }
}

#[cfg(test)]
mod tests {
    use precision_expr::SharedArena;

    use super::*;
    use crate::memory::{InstrSite, MemoryObjectId};

    fn site() -> InstrSite {
        InstrSite { line: 1, function: "main".into() }
    }

    /// Testable Property 5 (`spec.md` §8): after forking, a store in the child is
    /// invisible to the parent's load at the same structural address.
    #[test]
    fn fork_independence_child_store_does_not_reach_parent() {
        let factory = SharedArena::new();
        let mut parent = ErrorState::new(factory.clone(), Configuration::default());
        let addr = factory.mk_constant(64, 32);
        let original_value = factory.mk_constant(7, 32);
        let original_error = factory.mk_constant(0, 32);
        parent.memory_mut().store_simple(
            MemoryObjectId(1),
            addr,
            original_value,
            original_error,
            original_value,
            &site(),
        );

        let mut child = parent.fork();
        let new_value = factory.mk_constant(99, 32);
        let new_error = factory.mk_constant(1, 32);
        child.memory_mut().store_simple(
            MemoryObjectId(1),
            addr,
            new_value,
            new_error,
            new_value,
            &site(),
        );

        let (parent_value, parent_error, parent_miss) = parent.memory_mut().load(&factory, addr, 32);
        assert_eq!(parent_value, original_value);
        assert_eq!(parent_error, original_error);
        assert!(parent_miss.is_none());

        let (child_value, child_error, _) = child.memory_mut().load(&factory, addr, 32);
        assert_eq!(child_value, new_value);
        assert_eq!(child_error, new_error);
    }

    /// The same independence holds for a fresh store the parent never saw (child adds a
    /// brand-new cell rather than overwriting one) and for phase, which is also copied by
    /// value rather than shared.
    #[test]
    fn fork_independence_new_child_cell_and_phase_are_not_shared() {
        let factory = SharedArena::new();
        let mut parent = ErrorState::new(factory.clone(), Configuration::default());
        parent.note_input_error_registered();
        assert_eq!(parent.phase(), Phase::Tainted);

        let mut child = parent.fork();
        assert_eq!(child.phase(), Phase::Tainted, "fork copies the phase at the time of the call");
        child.note_bound_reported();
        assert_eq!(child.phase(), Phase::Reported);
        assert_eq!(parent.phase(), Phase::Tainted, "the parent's phase is untouched by the child");

        let addr = factory.mk_constant(128, 32);
        let value = factory.mk_constant(3, 32);
        child.memory_mut().store_simple(MemoryObjectId(2), addr, value, value, value, &site());

        let (_, _, parent_miss) = parent.memory_mut().load(&factory, addr, 32);
        assert!(parent_miss.is_some(), "a cell stored only in the child is invisible to the parent");
    }
}
