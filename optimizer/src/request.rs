use precision_expr::{Array, ExprId, ExpressionFactory};

/// Everything the Optimizer Bridge (C6) needs to issue the two solver calls described in
/// `spec.md` §4.5-§4.6 for one `klee_bound_error` invocation: a feasibility query deciding
/// whether the bound holds, and a separate set of per-input maximize objectives.
#[derive(Debug, Clone)]
pub struct BoundQuery {
    pub name: String,
    /// The path condition read back from the (out-of-scope) path-condition accumulator.
    pub constraints: Vec<ExprId>,
    /// `error(X) > b`, already in the negated-existential form the original's validity
    /// transform requires (`SPEC_FULL.md` §10 point 4) — satisfiable means the bound is
    /// violated.
    pub comparison: ExprId,
    pub error_expr: ExprId,
    /// The input-error array variables the bridge should maximize independently.
    pub objectives: Vec<Array>,
}

/// The Bound Request Builder (C5): collects the input-error variables relevant to a
/// reported bound and assembles the optimization query from the current error term, the
/// path constraints, and the bound literal.
///
/// `bound` is accepted as an already-constructed [`ExprId`] literal rather than a raw
/// `f64`: converting the `klee_bound_error` intrinsic's double argument into a term at the
/// error expression's width is the expression-IR constructor's job, and that collaborator
/// is explicitly out of scope for this core (`spec.md` §1). See `DESIGN.md` for this
/// resolution of the "bound literal" wording in §4.5.
#[derive(Debug, Default)]
pub struct BoundRequestBuilder;

impl BoundRequestBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build<F: ExpressionFactory>(
        &self,
        factory: &F,
        name: impl Into<String>,
        constraints: Vec<ExprId>,
        current_error: ExprId,
        bound: ExprId,
        objectives: Vec<Array>,
    ) -> BoundQuery {
        let comparison = Self::error_exceeds_bound(factory, current_error, bound);
        BoundQuery { name: name.into(), constraints, comparison, error_expr: current_error, objectives }
    }

    /// Builds `error > bound` as `!(error <= bound)`, the same one-bit-subtract boolean-not
    /// idiom `precision-error-state::propagator` uses for the `scaling` option's
    /// `scalingVar != 0` assertion — `ExpressionFactory` has no dedicated boolean-not
    /// constructor, by design (`spec.md` §9's "no process-wide mutable state" design note
    /// extends to keeping the factory's surface minimal).
    fn error_exceeds_bound<F: ExpressionFactory>(factory: &F, error: ExprId, bound: ExprId) -> ExprId {
        let le = factory.mk_ule(error, bound);
        let one = factory.mk_constant(1, 1);
        factory.mk_sub(one, le)
    }
}
