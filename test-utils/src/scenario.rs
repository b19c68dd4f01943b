use precision_expr::{Array, ExprId, ExpressionFactory, SharedArena};

/// Two freshly-named symbolic inputs read from their own single-element arrays — the
/// `read` shape `ExpressionFactory::source_array_of` recognizes (`spec.md` §4.2), used as
/// the starting point for the add/div/pareto/infinity scenarios of `spec.md` §8.
pub struct TwoInputs {
    pub factory: SharedArena,
    pub a: Array,
    pub b: Array,
    pub a_value: ExprId,
    pub b_value: ExprId,
}

/// Builds [`TwoInputs`] with both arrays at `width` bits, read at index zero.
pub fn two_inputs(width: u32) -> TwoInputs {
    let factory = SharedArena::new();
    let a = Array::new("a", width);
    let b = Array::new("b", width);
    let index = factory.mk_constant(0, 8);
    let a_value = factory.mk_read(a.clone(), index);
    let b_value = factory.mk_read(b.clone(), index);
    TwoInputs { factory, a, b, a_value, b_value }
}

/// A concrete `width`-bit term, used wherever a scenario needs a stand-in for a value that
/// would, in a real interpreter, be produced by the out-of-scope expression-IR
/// constructor from a raw double (an input error literal, a `klee_bound_error` bound, a
/// memory address).
pub fn input_term(factory: &SharedArena, value: u64, width: u32) -> ExprId {
    factory.mk_constant(value, width)
}
