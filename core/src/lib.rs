//! Facade wiring the six per-state/per-bound components (`SPEC_FULL.md` §2's crate
//! mapping) into the single entry point an embedding interpreter drives:
//! [`PrecisionCore`]. Every method here corresponds to one line of `spec.md` §2's data
//! flow paragraph or one of the three intrinsics in §6 — this crate adds no algebra of
//! its own, only orchestration, logging of the `Fresh -> Tainted -> Reported` transitions
//! (§6a.1), and the bridging between C4's authoritative load errors and C3's cache.

mod analysis;
mod errors;

use std::path::Path;

use precision_config::{Configuration, Domain};
use precision_error_state::{ErrorState, InstrSite, MemoryObjectId, Opcode, Phase, PropagationOutcome, VecConstraintSink};
use precision_expr::{Array, ExprId, ExpressionFactory};
use precision_optimizer::{Bound, BoundRequestBuilder, OptimizerBridge, QueryStatus, SolverBackend, Translator};
use precision_report::{BoundStatus, MathCallFormula, ReportedBound, ReportedInput, Reporter};

pub use analysis::{referenced_error_arrays, source_name_of};
pub use errors::CoreError;

/// One execution state's fully wired analysis core: the error-propagation state (C2-C4)
/// plus the optimizer bridge (C5-C6) and reporter (C7) it hands completed bound requests
/// to. Generic over the expression factory and the solver backend, exactly like
/// [`ErrorState`] and [`OptimizerBridge`] individually are.
pub struct PrecisionCore<F: ExpressionFactory + Clone, S: SolverBackend> {
    factory: F,
    config: Configuration,
    state: ErrorState<F>,
    bridge: OptimizerBridge<F, S>,
    reporter: Reporter,
    reported_bounds: Vec<ReportedBound>,
    scaling_constraints: Vec<ExprId>,
}

impl<F: ExpressionFactory + Clone, S: SolverBackend> PrecisionCore<F, S> {
    pub fn new(factory: F, config: Configuration, backend: S) -> Self {
        let state = ErrorState::new(factory.clone(), config);
        let bridge = OptimizerBridge::new(factory.clone(), backend, config);
        let reporter = Reporter::new(config.compute_real_solution());
        Self {
            factory,
            config,
            state,
            bridge,
            reporter,
            reported_bounds: Vec::new(),
            scaling_constraints: Vec::new(),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn state(&self) -> &ErrorState<F> {
        &self.state
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Constraints the `scaling` option (§4.3) asserted while propagating so far. The
    /// path-condition accumulator itself is out of scope (`spec.md` §1); the embedding
    /// interpreter is expected to drain these into it after every instruction.
    pub fn scaling_constraints(&self) -> &[ExprId] {
        &self.scaling_constraints
    }

    /// `klee_set_input_error(addr, rel_err)` (§6). `error` is the already-built error term
    /// for `rel_err` (see [`PrecisionCore::bound_error`]'s doc comment for why this core
    /// never decodes a raw double itself). Logs the `Fresh -> Tainted` transition exactly
    /// once.
    pub fn set_input_error(&mut self, addr: ExprId, error: ExprId) {
        self.state.memory_mut().declare_input_error(addr, error);
        if self.state.note_input_error_registered() {
            tracing::info!("error state transitioned Fresh -> Tainted");
        }
    }

    /// `load(addr, width)` (§4.4), then immediately seeds the propagator's cache with the
    /// authoritative `(value, error)` pair via
    /// [`precision_error_state::ErrorPropagator::record_error`] so a later `error_of` on
    /// the loaded value never falls back to lazily minting a registry read for it.
    pub fn load(&mut self, addr: ExprId, width: u32) -> (ExprId, ExprId) {
        let (value, error, _miss) = self.state.memory_mut().load(&self.factory, addr, width);
        self.state.propagator_mut().record_error(value, error);
        (value, error)
    }

    /// `storeSimple(base, addr, value, error, valueWithError, instr)` (§4.4).
    pub fn store(
        &mut self,
        owner: MemoryObjectId,
        addr: ExprId,
        value: ExprId,
        error: ExprId,
        value_with_error: ExprId,
        site: &InstrSite,
    ) {
        self.state.memory_mut().store_simple(owner, addr, value, error, value_with_error, site);
    }

    /// `klee_math_call(name, argv, argc)` (§6): mints the next math-call return variable
    /// name and registers the record under it, returning the name so the caller can bind
    /// the intrinsic's concrete return value to it.
    pub fn register_math_call(
        &mut self,
        function_name: impl Into<String>,
        argument_cells: Vec<ExprId>,
        site: InstrSite,
    ) -> String {
        let name = self.state.memory_mut().next_math_var_name();
        self.state.memory_mut().register_math_call(name.clone(), function_name, argument_cells, site);
        name
    }

    /// Propagates error through one instruction (§4.3). Any `scaling` constraint the call
    /// asserts is appended to [`PrecisionCore::scaling_constraints`] rather than pushed
    /// directly into a path-condition accumulator, since that collaborator is out of scope
    /// (`spec.md` §1).
    pub fn propagate(
        &mut self,
        opcode: Opcode,
        result: ExprId,
        operands: &[ExprId],
    ) -> Result<PropagationOutcome, CoreError> {
        let mut sink = VecConstraintSink::default();
        let outcome = self.state.propagator_mut().propagate(opcode, result, operands, &mut sink)?;
        self.scaling_constraints.extend(sink.0);
        Ok(outcome)
    }

    /// `klee_bound_error(name, value, bound_as_double)` (§6), wiring the Bound Request
    /// Builder (C5), the Optimizer Bridge (C6), and the Reporter's data model (C7) in one
    /// call. `bound_literal` is the raw double the intrinsic received; `bound_term` is its
    /// already-built expression-IR counterpart (decoding a double into a term at the error
    /// expression's width is the out-of-scope IR constructor's job, same resolution as
    /// `precision_optimizer::request::BoundRequestBuilder::build`'s `bound` parameter — see
    /// `DESIGN.md`). Carrying both avoids a lossy bit-decode round trip purely to print the
    /// bound literal the caller already has in hand.
    ///
    /// Per §7's propagation policy ("optimizer errors halt only the affected bound"), a
    /// `SolverTimeout`/`SolverFailure` from either solver call is caught here and reported
    /// as [`BoundStatus::Unknown`] rather than propagated; only [`CoreError::SolverAbort`]
    /// (an unrecognized unknown-reason) stops this call.
    #[allow(clippy::too_many_arguments)]
    pub fn bound_error(
        &mut self,
        name: impl Into<String>,
        value: ExprId,
        bound_literal: f64,
        bound_term: ExprId,
        path_constraints: Vec<ExprId>,
        source_file: Option<String>,
        source_line: u32,
    ) -> Result<ReportedBound, CoreError> {
        let name = name.into();
        let error_expr = self.state.propagator_mut().error_of(value)?;
        let objectives = referenced_error_arrays(&self.factory, error_expr);

        let mut constraints = path_constraints;
        constraints.extend(self.scaling_constraints.iter().copied());

        let query = BoundRequestBuilder::new().build(
            &self.factory,
            name.clone(),
            constraints,
            error_expr,
            bound_term,
            objectives,
        );

        let status = match self.bridge.check_feasibility(&query) {
            Ok(QueryStatus::Unsolvable) => Some(BoundStatus::Holds),
            Ok(QueryStatus::Solvable) => Some(BoundStatus::Violated),
            Err(e) if e.is_abort() => return Err(CoreError::from(e)),
            Err(e) => {
                tracing::warn!(query = %name, error = %e, "bound feasibility check did not resolve");
                None
            },
        };

        let inputs = match status {
            Some(_) => match self.bridge.maximize(&query) {
                Ok(raw) => raw
                    .into_iter()
                    .map(|(array, bound, rational)| self.to_reported_input(array, bound, rational))
                    .collect(),
                Err(e) if e.is_abort() => return Err(CoreError::from(e)),
                Err(e) => {
                    tracing::warn!(query = %name, error = %e, "bound maximize call did not resolve");
                    Vec::new()
                },
            },
            None => Vec::new(),
        };

        if self.state.note_bound_reported() {
            tracing::info!("error state transitioned to Reported");
        }

        let reported = ReportedBound {
            name,
            source_file,
            source_line,
            bound_literal,
            status: status.unwrap_or(BoundStatus::Unknown),
            inputs,
        };
        self.reported_bounds.push(reported.clone());
        Ok(reported)
    }

    /// Every bound reported so far through [`PrecisionCore::bound_error`], in call order —
    /// the accumulated input to the Reporter's `.errors`/`.reals` artifacts (§4.7).
    pub fn reported_bounds(&self) -> &[ReportedBound] {
        &self.reported_bounds
    }

    /// Writes `errors_path`'s `.errors` artifact and, when `-compute-real-solution` is set,
    /// `reals_path`'s `.reals` artifact, from every bound reported on this core so far.
    /// This is the one call site in the workspace that can produce
    /// [`CoreError::Report`]: everywhere else the reporter is only rendered in memory
    /// (`Reporter::render_errors`/`render_reals`), never written to disk.
    pub fn write_artifacts(&self, errors_path: &Path, reals_path: &Path) -> Result<(), CoreError> {
        self.reporter.write_errors(errors_path, &self.reported_bounds)?;
        self.reporter.write_reals(reals_path, &self.reported_bounds)?;
        Ok(())
    }

    /// Recovers a math-call formula for `array` when its source name matches a registered
    /// math-call return variable (§4.7), rendering argument cells through a scratch `Real`
    /// translator purely for human-readable display — never asserted against any solver.
    fn to_reported_input(&mut self, array: Array, bound: Bound, rational: Option<(i64, i64)>) -> ReportedInput {
        let math_call = source_name_of(&array)
            .and_then(|source_name| self.state.memory().math_call(source_name))
            .map(|record| {
                let mut translator = Translator::new(self.factory.clone(), Domain::Real);
                MathCallFormula {
                    function_name: record.function_name.clone(),
                    arguments: record.argument_cells.iter().map(|c| translator.render(*c)).collect(),
                }
            });
        ReportedInput { name: array.name().to_owned(), kind: bound.kind, value: bound.value, rational, math_call }
    }
}
