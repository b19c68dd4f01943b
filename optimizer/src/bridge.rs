use num_rational::Rational64;

use precision_config::{Configuration, Domain};
use precision_expr::{Array, ExpressionFactory};

use crate::errors::{BridgeError, SolverError};
use crate::request::BoundQuery;
use crate::translator::Translator;

// RAW SOLVER RESPONSE TYPES
// ================================================================================================

/// The result of a single solver `check`, before §4.6's response-handling table is applied.
/// This is the seam a forked-subprocess solver (`useForkedSolver`, `spec.md` §5) or an
/// in-process one plugs in at, via [`SolverBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCheckResult {
    Sat,
    Unsat,
    UnknownTimeout,
    UnknownCanceled,
    /// `reason == "unknown"` decodes to [`SolverError::Failure`]; any other string decodes
    /// to [`SolverError::Abort`].
    UnknownReason(String),
}

/// A decoded numeral as the solver returns it: the original falls back from
/// `Z3_get_numeral_int` to a numerator/denominator pair (`SPEC_FULL.md` §10 point 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numeral {
    Int(i64),
    Rational(i64, i64),
}

/// The raw `(infCoef, value, epsCoef)` triple for one maximize objective (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawObjectiveResult {
    pub inf_coef: i64,
    pub value: Numeral,
    pub eps_coef: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOptimizeResult {
    pub status: RawCheckResult,
    /// Same order as the objective symbols passed to [`SolverBackend::optimize`].
    pub objectives: Vec<RawObjectiveResult>,
}

/// The pluggable solver seam. A real implementation would fork (or talk to) an SMT
/// optimizer process (Z3, in the original); [`precision_test_utils::MockSolverBackend`]
/// scripts responses for tests without spawning anything.
pub trait SolverBackend {
    /// `0` means "no limit", already encoded as `u32::MAX` by
    /// [`Configuration::timeout_millis`].
    fn set_timeout_millis(&mut self, millis: u32);

    fn check_sat(&mut self, declarations: &[String], assertions: &[String]) -> RawCheckResult;

    fn optimize(
        &mut self,
        declarations: &[String],
        assertions: &[String],
        objectives: &[String],
        pareto: bool,
    ) -> RawOptimizeResult;
}

// DECODED RESULTS
// ================================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// SAT: the bound-violation query is satisfiable, i.e. the bound is violated.
    Solvable,
    /// UNSAT: the bound holds.
    Unsolvable,
}

/// The extended-real upper bound decoded for one input (§4.6's glossary entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Finite,
    Infinity,
    Epsilon,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub kind: BoundKind,
    pub value: f64,
}

impl Bound {
    fn finite(value: f64) -> Self {
        Self { kind: BoundKind::Finite, value }
    }

    fn infinity() -> Self {
        Self { kind: BoundKind::Infinity, value: 0.0 }
    }

    fn epsilon() -> Self {
        Self { kind: BoundKind::Epsilon, value: 0.0 }
    }
}

/// Per-input decode: `infCoef != 0 => INFINITY`, else `epsCoef != 0 => EPSILON`, else
/// `FINITE(numeric(value))` (§4.6).
fn decode_numeral(raw: RawObjectiveResult) -> Bound {
    if raw.inf_coef != 0 {
        return Bound::infinity();
    }
    if raw.eps_coef != 0 {
        return Bound::epsilon();
    }
    Bound::finite(numeric(raw.value))
}

/// Handles both integer and rational (numerator/denominator) numeral encodings
/// (`SPEC_FULL.md` §10 point 5).
fn numeric(value: Numeral) -> f64 {
    match value {
        Numeral::Int(i) => i as f64,
        Numeral::Rational(n, d) => {
            let r = Rational64::new(n, d);
            *r.numer() as f64 / *r.denom() as f64
        },
    }
}

fn decode_check(query_name: &str, raw: RawCheckResult) -> Result<QueryStatus, BridgeError> {
    match raw {
        RawCheckResult::Sat => Ok(QueryStatus::Solvable),
        RawCheckResult::Unsat => Ok(QueryStatus::Unsolvable),
        RawCheckResult::UnknownTimeout | RawCheckResult::UnknownCanceled => {
            Err(BridgeError::new(query_name, SolverError::Timeout))
        },
        RawCheckResult::UnknownReason(reason) if reason == "unknown" => {
            Err(BridgeError::new(query_name, SolverError::Failure))
        },
        RawCheckResult::UnknownReason(reason) => {
            Err(BridgeError::new(query_name, SolverError::Abort { reason }))
        },
    }
}

// OPTIMIZER BRIDGE
// ================================================================================================

/// The Optimizer Bridge (C6): translates a [`BoundQuery`] into SMT-LIB2 text in either
/// integer or real domain, issues the feasibility check and the maximize objectives as two
/// independent solver calls (`SPEC_FULL.md` §10 point 3/point 4 — the original's
/// `internalRunSolver` vs `internalRunOptimize`), and decodes the extended-real results.
pub struct OptimizerBridge<F: ExpressionFactory + Clone, S: SolverBackend> {
    config: Configuration,
    pareto_priority: bool,
    path_condition_translator: Translator<F>,
    error_bound_translator: Translator<F>,
    backend: S,
}

impl<F: ExpressionFactory + Clone, S: SolverBackend> OptimizerBridge<F, S> {
    /// Pareto priority is decided once at construction from
    /// [`Configuration::uniform_input_error`], matching the original's constructor-time
    /// `if (!UniformInputError) { ...set pareto... }` rather than a per-query decision
    /// (`SPEC_FULL.md` §10 point 3). The path-condition translator is always
    /// [`Domain::Real`], matching `Z3ErrorBuilder(false, ...)`; the error-bound translator
    /// uses the configured domain.
    pub fn new(factory: F, mut backend: S, config: Configuration) -> Self {
        backend.set_timeout_millis(config.timeout_millis());
        Self {
            pareto_priority: !config.uniform_input_error(),
            path_condition_translator: Translator::new(factory.clone(), Domain::Real),
            error_bound_translator: Translator::new(factory, config.domain()),
            backend,
            config,
        }
    }

    pub fn domain(&self) -> Domain {
        self.config.domain()
    }

    /// `Constraints(X) ∧ error(X) > b`: SAT means the bound is violated, UNSAT means it
    /// holds (§4.5).
    pub fn check_feasibility(&mut self, query: &BoundQuery) -> Result<QueryStatus, BridgeError> {
        let mut assertions: Vec<String> =
            query.constraints.iter().map(|c| self.path_condition_translator.render(*c)).collect();
        assertions.push(self.path_condition_translator.render(query.comparison));
        let declarations = self.path_condition_translator.declarations();

        if self.config.debug_precision() {
            tracing::debug!(query = %query.name, smt = ?assertions, "dispatching feasibility check");
        }

        let raw = self.backend.check_sat(&declarations, &assertions);
        self.path_condition_translator.clear_cache();
        decode_check(&query.name, raw)
    }

    /// Maximizes each objective array independently over `Constraints(X)` alone (no bound
    /// comparison — that is [`OptimizerBridge::check_feasibility`]'s job), returning one
    /// decoded [`Bound`] per input in `query.objectives` order, plus the raw
    /// numerator/denominator pair when the solver returned a rational numeral (for the
    /// `.reals` artifact, §4.7).
    ///
    /// Returns an empty vector without dispatching anything when
    /// [`Domain::is_enabled`] is `false`, matching "`none` disables this component
    /// entirely" (§4.6).
    pub fn maximize(
        &mut self,
        query: &BoundQuery,
    ) -> Result<Vec<(Array, Bound, Option<(i64, i64)>)>, BridgeError> {
        if !self.config.domain().is_enabled() {
            return Ok(Vec::new());
        }

        let assertions: Vec<String> =
            query.constraints.iter().map(|c| self.error_bound_translator.render(*c)).collect();
        let objective_symbols: Vec<String> = query
            .objectives
            .iter()
            .map(|array| {
                self.error_bound_translator.declare_raw(array.name());
                array.name().to_owned()
            })
            .collect();
        let declarations = self.error_bound_translator.declarations();

        if self.config.debug_precision() {
            tracing::debug!(
                query = %query.name,
                smt = ?assertions,
                objectives = ?objective_symbols,
                "dispatching error-bound optimization"
            );
        }

        let raw = self.backend.optimize(&declarations, &assertions, &objective_symbols, self.pareto_priority);
        self.error_bound_translator.clear_cache();

        let status = decode_check(&query.name, raw.status.clone())?;
        let bounds = match status {
            QueryStatus::Unsolvable => Vec::new(),
            QueryStatus::Solvable => raw
                .objectives
                .into_iter()
                .zip(query.objectives.iter().cloned())
                .map(|(obj, array)| {
                    let rational = match obj.value {
                        Numeral::Rational(n, d) => Some((n, d)),
                        Numeral::Int(_) => None,
                    };
                    (array, decode_numeral(obj), rational)
                })
                .collect(),
        };
        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use precision_expr::{Array, SharedArena};
    use precision_test_utils::MockSolverBackend;
    use rstest::rstest;

    use super::*;
    use crate::request::BoundRequestBuilder;

    fn query(factory: &SharedArena, objectives: Vec<Array>) -> BoundQuery {
        let error = factory.mk_constant(3, 32);
        let bound = factory.mk_constant(10, 32);
        BoundRequestBuilder::new().build(factory, "c", Vec::new(), error, bound, objectives)
    }

    /// `spec.md` §8 Scenario S3: with `uniformInputError == false` the bridge asks the
    /// solver for a Pareto-prioritized maximization; with `true` it asks for the plain
    /// combined one. The flag is decided once, at construction, from `Configuration`.
    #[rstest]
    #[case::uniform_off(false, true)]
    #[case::uniform_on(true, false)]
    fn maximize_passes_pareto_flag_from_uniform_input_error(
        #[case] uniform_input_error: bool,
        #[case] expected_pareto: bool,
    ) {
        let factory = SharedArena::new();
        let objective = Array::new("_fractional_error_a", 8);
        let q = query(&factory, vec![objective]);

        let backend = MockSolverBackend::new()
            .push_optimize_result(RawOptimizeResult { status: RawCheckResult::Sat, objectives: vec![] });
        let config = Configuration::new(Domain::Real).with_uniform_input_error(uniform_input_error);
        let mut bridge = OptimizerBridge::new(factory, backend, config);
        bridge.maximize(&q).unwrap();

        let (_, _, _, pareto) = bridge.backend.last_optimize_call().unwrap();
        assert_eq!(*pareto, expected_pareto);
    }

    #[test]
    fn maximize_skips_the_solver_entirely_when_domain_is_none() {
        let factory = SharedArena::new();
        let objective = Array::new("_fractional_error_a", 8);
        let q = query(&factory, vec![objective]);

        let backend = MockSolverBackend::new();
        let config = Configuration::new(Domain::None);
        let mut bridge = OptimizerBridge::new(factory, backend, config);
        let bounds = bridge.maximize(&q).unwrap();

        assert!(bounds.is_empty());
        assert_eq!(bridge.backend.optimize_call_count(), 0);
    }

    #[test]
    fn check_feasibility_decodes_sat_as_solvable_and_unsat_as_unsolvable() {
        let factory = SharedArena::new();
        let q = query(&factory, Vec::new());

        let backend = MockSolverBackend::new().push_check_result(RawCheckResult::Sat).push_check_result(RawCheckResult::Unsat);
        let config = Configuration::new(Domain::Real);
        let mut bridge = OptimizerBridge::new(factory, backend, config);

        assert_eq!(bridge.check_feasibility(&q).unwrap(), QueryStatus::Solvable);
        assert_eq!(bridge.check_feasibility(&q).unwrap(), QueryStatus::Unsolvable);
    }

    /// An unbounded objective (`infCoef != 0`) decodes to `BoundKind::Infinity` regardless
    /// of whatever numeral happens to sit in `value` (`spec.md` §8 Scenario S4).
    #[test]
    fn maximize_decodes_an_infinite_objective() {
        let factory = SharedArena::new();
        let objective = Array::new("_fractional_error_a", 8);
        let q = query(&factory, vec![objective]);

        let backend = MockSolverBackend::new().push_optimize_result(RawOptimizeResult {
            status: RawCheckResult::Sat,
            objectives: vec![RawObjectiveResult { inf_coef: 1, value: Numeral::Int(0), eps_coef: 0 }],
        });
        let config = Configuration::new(Domain::Real);
        let mut bridge = OptimizerBridge::new(factory, backend, config);
        let bounds = bridge.maximize(&q).unwrap();

        assert_eq!(bounds.len(), 1);
        assert_eq!(bounds[0].1.kind, BoundKind::Infinity);
    }

    #[test]
    fn check_feasibility_reports_timeout_as_a_solver_error_not_a_panic() {
        let factory = SharedArena::new();
        let q = query(&factory, Vec::new());

        let backend = MockSolverBackend::new().push_check_result(RawCheckResult::UnknownTimeout);
        let config = Configuration::new(Domain::Real);
        let mut bridge = OptimizerBridge::new(factory, backend, config);

        let err = bridge.check_feasibility(&q).unwrap_err();
        assert!(!err.is_abort());
    }

    #[test]
    fn maximize_decodes_a_rational_numeral_via_the_fallback_path() {
        let factory = SharedArena::new();
        let objective = Array::new("_fractional_error_a", 8);
        let q = query(&factory, vec![objective]);

        let backend = MockSolverBackend::new().push_optimize_result(RawOptimizeResult {
            status: RawCheckResult::Sat,
            objectives: vec![RawObjectiveResult { inf_coef: 0, value: Numeral::Rational(1, 4), eps_coef: 0 }],
        });
        let config = Configuration::new(Domain::Real);
        let mut bridge = OptimizerBridge::new(factory, backend, config);
        let bounds = bridge.maximize(&q).unwrap();

        assert_eq!(bounds[0].1.kind, BoundKind::Finite);
        assert!((bounds[0].1.value - 0.25).abs() < 1e-9);
        assert_eq!(bounds[0].2, Some((1, 4)));
    }
}
