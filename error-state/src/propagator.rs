use rustc_hash::FxHashMap;

use precision_config::Configuration;
use precision_expr::{ExprId, ExpressionFactory};

use crate::errors::PropagationError;
use crate::registry::ErrorArrayRegistry;

/// The instruction opcodes the interpreter may hand to [`ErrorPropagator::propagate`]
/// (§4.3's algebra table plus the comparison family it explicitly excludes). Comparisons
/// are value-producing but error-free — they collapse a pair of erroneous operands to an
/// exact boolean — so `propagate` rejects them with
/// [`PropagationError::NoErrorForOpcode`] instead of minting a meaningless error term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    UDiv,
    SDiv,
    FAdd,
    FSub,
    FMul,
    FDiv,
    ZExt,
    SExt,
    Trunc,
    Select,
    BitCast,
    Eq,
    Ult,
}

/// Accepts constraints the propagator needs to push into the path condition — the
/// `scaling` option's `scalingVar ≠ 0` assertion (§4.3) — without this crate owning the
/// path-condition accumulator itself (out of scope, `spec.md` §1).
pub trait ConstraintSink {
    fn assert(&mut self, constraint: ExprId);
}

/// A [`ConstraintSink`] that does nothing; used whenever `scaling` is disabled.
#[derive(Debug, Default)]
pub struct NullConstraintSink;

impl ConstraintSink for NullConstraintSink {
    fn assert(&mut self, _constraint: ExprId) {}
}

/// A [`ConstraintSink`] that records every asserted constraint, for tests.
#[derive(Debug, Default)]
pub struct VecConstraintSink(pub Vec<ExprId>);

impl ConstraintSink for VecConstraintSink {
    fn assert(&mut self, constraint: ExprId) {
        self.0.push(constraint);
    }
}

/// Outcome of a single [`ErrorPropagator::propagate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationOutcome {
    pub error_term: ExprId,
    /// Set when the `/ᵤ result` denominator guard (§4.3) fired: the result term was the
    /// literal zero of its width, so the numerator was returned unchanged.
    pub division_by_zero_modeled: bool,
}

/// The Error Propagator (C3): error lookup (§4.2) plus the opcode→error-term algebra
/// (§4.3), generic over the [`ExpressionFactory`] that actually builds terms.
pub struct ErrorPropagator<F: ExpressionFactory> {
    factory: F,
    registry: ErrorArrayRegistry,
    value_error_map: FxHashMap<ExprId, ExprId>,
    current_error: Option<ExprId>,
    scaling_var: Option<ExprId>,
    config: Configuration,
}

impl<F: ExpressionFactory + Clone> Clone for ErrorPropagator<F> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            registry: ErrorArrayRegistry::new(),
            value_error_map: self.value_error_map.clone(),
            current_error: self.current_error,
            scaling_var: self.scaling_var,
            config: self.config,
        }
    }
}

impl<F: ExpressionFactory> ErrorPropagator<F> {
    pub fn new(factory: F, config: Configuration) -> Self {
        Self {
            factory,
            registry: ErrorArrayRegistry::new(),
            value_error_map: FxHashMap::default(),
            current_error: None,
            scaling_var: None,
            config,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// The candidate error term a subsequent `klee_bound_error` call compares against its
    /// literal bound (§4.3's closing paragraph).
    pub fn current_error(&self) -> Option<ExprId> {
        self.current_error
    }

    pub fn registry(&mut self) -> &mut ErrorArrayRegistry {
        &mut self.registry
    }

    /// §4.2 Error Lookup.
    pub fn error_of(&mut self, value: ExprId) -> Result<ExprId, PropagationError> {
        if let Some(v) = self.as_constant_zero_error(value) {
            return Ok(v);
        }
        if let Some(&cached) = self.value_error_map.get(&value) {
            return Ok(cached);
        }
        if let Some(array) = self.factory.source_array_of(value) {
            let error_array = self.registry.error_array_for(&array);
            let zero_index = self.factory.mk_constant(0, 8);
            let error_term = self.factory.mk_read(error_array, zero_index);
            self.value_error_map.insert(value, error_term);
            return Ok(error_term);
        }
        Err(PropagationError::MalformedExpression { term: value })
    }

    /// Seeds the value→error cache directly with an authoritative error term, bypassing
    /// the registry/constant fallback in [`ErrorPropagator::error_of`]. This is how a
    /// memory load's `(value, error)` pair (C4, §4.4) enters the propagator's cache: the
    /// interpreter calls this once per load before using the loaded value as an operand,
    /// so a later `error_of` call on that same value term returns the memory-supplied
    /// error instead of lazily minting a fresh error-array read.
    pub fn record_error(&mut self, value: ExprId, error: ExprId) {
        self.value_error_map.insert(value, error);
    }

    fn as_constant_zero_error(&self, value: ExprId) -> Option<ExprId> {
        self.factory.as_constant(value).map(|_| {
            let width = self.factory.width_of(value);
            self.factory.mk_constant(0, width)
        })
    }

    /// §4.3 the opcode→error-term algebra, plus the `optimizeDivides`/`scaling` compile
    /// options and the division-by-zero guard.
    pub fn propagate(
        &mut self,
        opcode: Opcode,
        result: ExprId,
        operands: &[ExprId],
        constraints: &mut dyn ConstraintSink,
    ) -> Result<PropagationOutcome, PropagationError> {
        let outcome = match opcode {
            Opcode::Add => self.propagate_add_sub(result, operands, constraints, false)?,
            Opcode::Sub => self.propagate_add_sub(result, operands, constraints, false)?,
            Opcode::Mul => self.propagate_mul_div(result, operands, false)?,
            Opcode::UDiv => self.propagate_mul_div(result, operands, false)?,
            Opcode::SDiv => self.propagate_mul_div(result, operands, false)?,
            Opcode::FAdd => self.propagate_add_sub(result, operands, constraints, true)?,
            Opcode::FSub => self.propagate_add_sub(result, operands, constraints, true)?,
            Opcode::FMul => self.propagate_mul_div(result, operands, true)?,
            Opcode::FDiv => self.propagate_mul_div(result, operands, true)?,
            Opcode::ZExt => self.propagate_cast(result, operands, Cast::ZExt)?,
            Opcode::SExt => self.propagate_cast(result, operands, Cast::SExt)?,
            Opcode::Trunc => self.propagate_cast(result, operands, Cast::Trunc)?,
            Opcode::Select => self.propagate_select(result, operands)?,
            Opcode::BitCast => self.propagate_bitcast(result, operands)?,
            Opcode::Eq | Opcode::Ult => return Err(PropagationError::NoErrorForOpcode { opcode }),
        };
        tracing::trace!(
            opcode = ?opcode,
            operands = ?operands,
            result = ?result,
            error_term = ?outcome.error_term,
            division_by_zero_modeled = outcome.division_by_zero_modeled,
            "propagated error term"
        );
        self.value_error_map.insert(result, outcome.error_term);
        self.current_error = Some(outcome.error_term);
        Ok(outcome)
    }

    fn propagate_add_sub(
        &mut self,
        result: ExprId,
        operands: &[ExprId],
        constraints: &mut dyn ConstraintSink,
        with_ulp: bool,
    ) -> Result<PropagationOutcome, PropagationError> {
        let [l, r] = operands else {
            return Err(PropagationError::MalformedExpression { term: result });
        };
        let width = self.factory.width_of(result);
        let el = self.error_of(*l)?;
        let er = self.error_of(*r)?;
        let extended_l = self.factory.mk_zext(el, width);
        let extended_r = self.factory.mk_zext(er, width);
        let weighted_l = self.factory.mk_mul(extended_l, *l);
        let weighted_r = self.factory.mk_mul(extended_r, *r);
        let mut numerator = self.factory.mk_add(weighted_l, weighted_r);
        if with_ulp {
            let ulp = self.factory.mk_ulp(result);
            numerator = self.factory.mk_add(numerator, ulp);
        }
        self.finish_with_division(numerator, result, constraints)
    }

    fn propagate_mul_div(
        &mut self,
        result: ExprId,
        operands: &[ExprId],
        with_ulp: bool,
    ) -> Result<PropagationOutcome, PropagationError> {
        let [l, r] = operands else {
            return Err(PropagationError::MalformedExpression { term: result });
        };
        let width = self.factory.width_of(result);
        let el = self.error_of(*l)?;
        let er = self.error_of(*r)?;
        let extended_l = self.factory.mk_zext(el, width);
        let extended_r = self.factory.mk_zext(er, width);
        let mut error_term = self.factory.mk_add(extended_l, extended_r);
        if with_ulp {
            let ulp = self.factory.mk_ulp(result);
            error_term = self.factory.mk_add(error_term, ulp);
        }
        Ok(PropagationOutcome { error_term, division_by_zero_modeled: false })
    }

    /// Shared tail for add/sub/fadd/fsub: the `/ᵤ result` division, its zero guard, the
    /// `optimizeDivides` rewrite, and the `scaling` numerator multiplier.
    fn finish_with_division(
        &mut self,
        mut numerator: ExprId,
        result: ExprId,
        constraints: &mut dyn ConstraintSink,
    ) -> Result<PropagationOutcome, PropagationError> {
        if self.config.scaling() {
            let width = self.factory.width_of(numerator);
            if self.scaling_var.is_none() {
                let var = self.factory.mk_fresh_scaling_var(width);
                self.scaling_var = Some(var);
                let zero = self.factory.mk_constant(0, width);
                let eq_zero = self.factory.mk_eq(var, zero);
                constraints.assert(self.negate_bool(eq_zero));
            }
            let scaling_var = self.scaling_var.expect("set above");
            numerator = self.factory.mk_mul(numerator, scaling_var);
        }

        if self.factory.is_zero_constant(result) {
            return Ok(PropagationOutcome { error_term: numerator, division_by_zero_modeled: true });
        }

        if self.config.optimize_divides() {
            if let Some(constant) = self.factory.as_constant(result) {
                if constant > 0 && constant.is_power_of_two() {
                    let shift = constant.trailing_zeros();
                    let error_term = self.factory.mk_lshr(numerator, shift);
                    return Ok(PropagationOutcome { error_term, division_by_zero_modeled: false });
                }
            }
        }

        let error_term = self.factory.mk_udiv(numerator, result);
        Ok(PropagationOutcome { error_term, division_by_zero_modeled: false })
    }

    /// `scalingVar != 0` is built as `1 - (scalingVar == 0)`: `eq_expr` is a 1-bit value,
    /// so subtracting it from the constant `1` flips it without widening
    /// [`ExpressionFactory`] with a dedicated boolean-not constructor.
    fn negate_bool(&self, eq_expr: ExprId) -> ExprId {
        let one = self.factory.mk_constant(1, 1);
        self.factory.mk_sub(one, eq_expr)
    }

    fn propagate_cast(
        &mut self,
        result: ExprId,
        operands: &[ExprId],
        cast: Cast,
    ) -> Result<PropagationOutcome, PropagationError> {
        let [child] = operands else {
            return Err(PropagationError::MalformedExpression { term: result });
        };
        let child_error = self.error_of(*child)?;
        let width = self.factory.width_of(result);
        let error_term = match cast {
            Cast::ZExt => self.factory.mk_zext(child_error, width),
            Cast::SExt => self.factory.mk_sext(child_error, width),
            Cast::Trunc => self.factory.mk_trunc(child_error, width),
        };
        Ok(PropagationOutcome { error_term, division_by_zero_modeled: false })
    }

    fn propagate_select(
        &mut self,
        result: ExprId,
        operands: &[ExprId],
    ) -> Result<PropagationOutcome, PropagationError> {
        let [cond, if_true, if_false] = operands else {
            return Err(PropagationError::MalformedExpression { term: result });
        };
        let width = self.factory.width_of(result);
        let el = self.error_of(*if_true)?;
        let er = self.error_of(*if_false)?;
        let extended_l = self.factory.mk_zext(el, width);
        let extended_r = self.factory.mk_zext(er, width);
        let error_term = self.factory.mk_select(*cond, extended_l, extended_r);
        Ok(PropagationOutcome { error_term, division_by_zero_modeled: false })
    }

    fn propagate_bitcast(
        &mut self,
        result: ExprId,
        operands: &[ExprId],
    ) -> Result<PropagationOutcome, PropagationError> {
        let [child] = operands else {
            return Err(PropagationError::MalformedExpression { term: result });
        };
        let error_term = self.error_of(*child)?;
        let _ = result;
        Ok(PropagationOutcome { error_term, division_by_zero_modeled: false })
    }

    /// Used by [`crate::state::ErrorState::fork`]: the propagator's cache is part of the
    /// per-state structure that is copied by value (§3 "Error state lifecycle").
    pub(crate) fn snapshot_cache(&self) -> FxHashMap<ExprId, ExprId> {
        self.value_error_map.clone()
    }

    pub(crate) fn restore_cache(&mut self, cache: FxHashMap<ExprId, ExprId>) {
        self.value_error_map = cache;
    }
}

enum Cast {
    ZExt,
    SExt,
    Trunc,
}

#[cfg(test)]
mod tests {
    use precision_expr::{ExprKind, SharedArena};
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    /// Evaluates a term tree built by these tests against an explicit table of leaf
    /// values, so assertions can compare against a plain integer recomputation of the
    /// table's formula instead of matching on `ExprKind` shapes. Not a general expression
    /// evaluator — it panics on any shape these tests don't themselves build (floats,
    /// `ScalingVar`), which is fine since interpreting a real program's terms is out of
    /// scope (`spec.md` §1). `leaves` supplies the concrete value of every `Read` node (a
    /// symbolic input's value is never itself a constant `errorOf` would zero out).
    fn eval(factory: &SharedArena, id: ExprId, leaves: &FxHashMap<ExprId, u128>) -> u128 {
        if let Some(&v) = leaves.get(&id) {
            return v;
        }
        let width = factory.width_of(id);
        let masked = |v: u128| if width >= 128 { v } else { v & ((1u128 << width) - 1) };
        match factory.kind_of(id) {
            ExprKind::Constant(v) => v as u128,
            ExprKind::Add(l, r) => masked(eval(factory, l, leaves) + eval(factory, r, leaves)),
            ExprKind::Sub(l, r) => {
                masked(eval(factory, l, leaves).wrapping_sub(eval(factory, r, leaves)))
            },
            ExprKind::Mul(l, r) => masked(eval(factory, l, leaves) * eval(factory, r, leaves)),
            ExprKind::UDiv(l, r) => {
                let divisor = eval(factory, r, leaves);
                if divisor == 0 { 0 } else { eval(factory, l, leaves) / divisor }
            },
            ExprKind::ZExt(child) | ExprKind::SExt(child) | ExprKind::Trunc(child) => {
                masked(eval(factory, child, leaves))
            },
            ExprKind::LShr(value, shift) => eval(factory, value, leaves) >> shift,
            ExprKind::Select { cond, if_true, if_false } => {
                if eval(factory, cond, leaves) != 0 {
                    eval(factory, if_true, leaves)
                } else {
                    eval(factory, if_false, leaves)
                }
            },
            other => panic!("eval: unsupported test shape {other:?}"),
        }
    }

    fn propagator(config: Configuration) -> (SharedArena, ErrorPropagator<SharedArena>) {
        let factory = SharedArena::new();
        let prop = ErrorPropagator::new(factory.clone(), config);
        (factory, prop)
    }

    /// A fresh `width`-bit value term shaped like a load from a distinct symbolic input
    /// array (`errorOf` never zeroes these the way it does a `Constant`).
    fn value_term(factory: &SharedArena, name: &str, width: u32) -> ExprId {
        let array = precision_expr::Array::new(name, width);
        let index = factory.mk_constant(0, 8);
        factory.mk_read(array, index)
    }

    fn leaves(pairs: &[(ExprId, u128)]) -> FxHashMap<ExprId, u128> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn constant_zero_error_holds_for_any_constant() {
        let (factory, mut prop) = propagator(Configuration::default());
        for value in [0u64, 1, 255, u32::MAX as u64] {
            let c = factory.mk_constant(value, 32);
            let error = prop.error_of(c).unwrap();
            assert_eq!(factory.as_constant(error), Some(0), "errorOf(constant) must be zero");
        }
    }

    #[test]
    fn add_numerator_is_weighted_sum_divided_by_result() {
        let (factory, mut prop) = propagator(Configuration::default());
        let width = 32;
        let l = value_term(&factory, "l", width);
        let r = value_term(&factory, "r", width);
        let result = factory.mk_constant(150, width);
        prop.record_error(l, factory.mk_constant(3, width));
        prop.record_error(r, factory.mk_constant(2, width));

        let outcome =
            prop.propagate(Opcode::Add, result, &[l, r], &mut NullConstraintSink).unwrap();

        assert!(!outcome.division_by_zero_modeled);
        let leaves = leaves(&[(l, 100), (r, 50)]);
        assert_eq!(eval(&factory, outcome.error_term, &leaves), (3 * 100 + 2 * 50) / 150);
    }

    #[test]
    fn sub_reuses_add_numerator_error_magnitudes_add_not_cancel() {
        let (factory, mut prop) = propagator(Configuration::default());
        let width = 32;
        let l = value_term(&factory, "l", width);
        let r = value_term(&factory, "r", width);
        let result = factory.mk_constant(50, width);
        prop.record_error(l, factory.mk_constant(3, width));
        prop.record_error(r, factory.mk_constant(2, width));

        let outcome =
            prop.propagate(Opcode::Sub, result, &[l, r], &mut NullConstraintSink).unwrap();

        let leaves = leaves(&[(l, 100), (r, 50)]);
        assert_eq!(eval(&factory, outcome.error_term, &leaves), (3 * 100 + 2 * 50) / 50);
    }

    #[rstest]
    #[case::mul(Opcode::Mul)]
    #[case::udiv(Opcode::UDiv)]
    #[case::sdiv(Opcode::SDiv)]
    fn mul_and_div_error_term_is_plain_sum_of_operand_errors(#[case] opcode: Opcode) {
        let (factory, mut prop) = propagator(Configuration::default());
        let width = 32;
        let l = value_term(&factory, "l", width);
        let r = value_term(&factory, "r", width);
        let result = factory.mk_constant(50, width);
        prop.record_error(l, factory.mk_constant(3, width));
        prop.record_error(r, factory.mk_constant(2, width));
        let leaves = leaves(&[(l, 10), (r, 5)]);

        let outcome = prop.propagate(opcode, result, &[l, r], &mut NullConstraintSink).unwrap();
        assert_eq!(eval(&factory, outcome.error_term, &leaves), 5);
    }

    #[rstest]
    #[case::eq(Opcode::Eq)]
    #[case::ult(Opcode::Ult)]
    fn comparison_opcodes_report_no_error_term(#[case] opcode: Opcode) {
        let (factory, mut prop) = propagator(Configuration::default());
        let width = 32;
        let l = value_term(&factory, "l", width);
        let r = value_term(&factory, "r", width);
        let result = factory.mk_constant(1, 1);

        let err = prop.propagate(opcode, result, &[l, r], &mut NullConstraintSink).unwrap_err();
        assert_eq!(err, PropagationError::NoErrorForOpcode { opcode });
    }

    #[test]
    fn division_by_zero_result_returns_numerator_unchanged_and_is_modeled() {
        let (factory, mut prop) = propagator(Configuration::default());
        let width = 32;
        let l = value_term(&factory, "l", width);
        let r = value_term(&factory, "r", width);
        let zero_result = factory.mk_constant(0, width);
        prop.record_error(l, factory.mk_constant(3, width));
        prop.record_error(r, factory.mk_constant(2, width));

        let outcome =
            prop.propagate(Opcode::Add, zero_result, &[l, r], &mut NullConstraintSink).unwrap();

        assert!(outcome.division_by_zero_modeled);
        let leaves = leaves(&[(l, 100), (r, 50)]);
        assert_eq!(eval(&factory, outcome.error_term, &leaves), 3 * 100 + 2 * 50);
    }

    #[test]
    fn optimize_divides_rewrites_power_of_two_divisor_to_a_shift() {
        let config = Configuration::default().with_optimize_divides(true);
        let (factory, mut prop) = propagator(config);
        let width = 32;
        let l = value_term(&factory, "l", width);
        let r = value_term(&factory, "r", width);
        let result = factory.mk_constant(128, width); // power of two
        prop.record_error(l, factory.mk_constant(3, width));
        prop.record_error(r, factory.mk_constant(2, width));

        let outcome =
            prop.propagate(Opcode::Add, result, &[l, r], &mut NullConstraintSink).unwrap();

        assert!(matches!(factory.kind_of(outcome.error_term), ExprKind::LShr(..)));
        let leaves = leaves(&[(l, 100), (r, 28)]);
        assert_eq!(eval(&factory, outcome.error_term, &leaves), (3 * 100 + 2 * 28) >> 7);
    }

    #[test]
    fn scaling_asserts_scaling_var_nonzero_exactly_once() {
        let config = Configuration::default().with_scaling(true);
        let (factory, mut prop) = propagator(config);
        let width = 32;
        let l = value_term(&factory, "l", width);
        let r = value_term(&factory, "r", width);
        let result = factory.mk_constant(30, width);
        prop.record_error(l, factory.mk_constant(1, width));
        prop.record_error(r, factory.mk_constant(1, width));

        let mut sink = VecConstraintSink::default();
        prop.propagate(Opcode::Add, result, &[l, r], &mut sink).unwrap();
        assert_eq!(sink.0.len(), 1, "first propagate call mints the scaling var and asserts it");

        prop.propagate(Opcode::Add, result, &[l, r], &mut sink).unwrap();
        assert_eq!(sink.0.len(), 1, "the scaling var is reused, not re-asserted");
    }

    #[test]
    fn zext_sext_trunc_widen_or_narrow_the_child_error_term() {
        let (factory, mut prop) = propagator(Configuration::default());
        let child = value_term(&factory, "child", 8);
        let error = factory.mk_constant(7, 8);
        prop.record_error(child, error);

        let widened = factory.mk_constant(0, 32);
        let outcome =
            prop.propagate(Opcode::ZExt, widened, &[child], &mut NullConstraintSink).unwrap();
        assert_eq!(eval(&factory, outcome.error_term, &FxHashMap::default()), 7);
        assert_eq!(factory.width_of(outcome.error_term), 32);
    }

    #[test]
    fn select_picks_the_taken_branch_error_term() {
        let (factory, mut prop) = propagator(Configuration::default());
        let width = 32;
        let if_true = value_term(&factory, "if_true", width);
        let if_false = value_term(&factory, "if_false", width);
        prop.record_error(if_true, factory.mk_constant(11, width));
        prop.record_error(if_false, factory.mk_constant(22, width));
        let taken = factory.mk_constant(1, 1);
        let result = factory.mk_constant(1, width);

        let outcome = prop
            .propagate(Opcode::Select, result, &[taken, if_true, if_false], &mut NullConstraintSink)
            .unwrap();
        assert_eq!(eval(&factory, outcome.error_term, &FxHashMap::default()), 11);
    }

    /// Property 3 (`spec.md` §8): for concrete inputs `x, y` and relative perturbations
    /// `εx, εy` bounded by `±2⁻⁸`, the table's modeled `(v, e)` pair for add/sub/mul/udiv
    /// satisfies `|actual − v| ≤ e·v` up to the slack the first-order algebra itself admits
    /// (the dropped second-order `εx·εy` cross term for mul/udiv, bounded by `(2⁻⁸)²`).
    ///
    /// This mirrors the table in plain `f64` arithmetic rather than driving it through
    /// `ErrorPropagator` symbolically, since the formula being checked is a mathematical
    /// claim about relative-error accumulation, independent of how it is later rendered as
    /// bitvector terms.
    const EPS_BOUND: f64 = 1.0 / 256.0;
    const SECOND_ORDER_SLACK: f64 = EPS_BOUND * EPS_BOUND * 4.0;

    fn eps() -> impl Strategy<Value = f64> {
        -EPS_BOUND..EPS_BOUND
    }

    fn magnitude() -> impl Strategy<Value = f64> {
        1.0..1000.0
    }

    proptest! {
        #[test]
        fn add_sub_error_bound_holds(
            x in magnitude(), y in magnitude(),
            ex in eps(), ey in eps(),
        ) {
            let actual_x = x * (1.0 + ex);
            let actual_y = y * (1.0 + ey);

            let v_add = x + y;
            let e_add = (ex.abs() * x + ey.abs() * y) / v_add;
            let actual_add = actual_x + actual_y;
            prop_assert!((actual_add - v_add).abs() <= e_add * v_add + SECOND_ORDER_SLACK);

            let v_sub = x - y;
            prop_assume!(v_sub.abs() > 1e-3);
            let e_sub = (ex.abs() * x + ey.abs() * y) / v_sub;
            let actual_sub = actual_x - actual_y;
            prop_assert!((actual_sub - v_sub).abs() <= (e_sub * v_sub).abs() + SECOND_ORDER_SLACK);
        }

        #[test]
        fn mul_udiv_error_bound_holds(
            x in magnitude(), y in magnitude(),
            ex in eps(), ey in eps(),
        ) {
            let actual_x = x * (1.0 + ex);
            let actual_y = y * (1.0 + ey);

            let v_mul = x * y;
            let e_mul = ex.abs() + ey.abs();
            let actual_mul = actual_x * actual_y;
            prop_assert!((actual_mul - v_mul).abs() <= e_mul * v_mul + SECOND_ORDER_SLACK * v_mul);

            let v_div = x / y;
            let e_div = ex.abs() + ey.abs();
            let actual_div = actual_x / actual_y;
            prop_assert!((actual_div - v_div).abs() <= e_div * v_div + SECOND_ORDER_SLACK * v_div);
        }
    }
}
