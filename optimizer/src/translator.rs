use rustc_hash::FxHashMap;

use precision_config::Domain;
use precision_expr::{ExprId, ExprKind, ExpressionFactory};

/// The SMT-LIB2 sort a symbol or literal is rendered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Int,
    Real,
}

impl Sort {
    fn name(self) -> &'static str {
        match self {
            Sort::Int => "Int",
            Sort::Real => "Real",
        }
    }
}

/// Renders [`precision_expr`] terms into SMT-LIB2 text under a single domain (integer or
/// real), reinterpreting the bitvector algebra of §4.3 arithmetically: widths are dropped
/// (casts become pass-throughs) and every `read`/`concat-of-reads` becomes a declared
/// constant symbol named after its source array.
///
/// `SPEC_FULL.md` §10 point 2 (grounded on `Z3ErrorBuilder`): the bridge keeps two
/// independently-configured [`Translator`] instances — one for path-condition checks
/// (always [`Sort::Real`], matching the original's `Z3ErrorBuilder(false, ...)`), one for
/// bound optimization (domain selected by [`Domain`]) — and clears each one's cache after
/// every top-level query rather than per-construct, allowing intra-query sharing without
/// unbounded growth (§4.6's "Cache discipline").
pub struct Translator<F: ExpressionFactory> {
    factory: F,
    sort: Sort,
    cache: FxHashMap<ExprId, String>,
    declarations: FxHashMap<String, Sort>,
}

impl<F: ExpressionFactory> Translator<F> {
    pub fn new(factory: F, domain: Domain) -> Self {
        let sort = if domain == Domain::Integer { Sort::Int } else { Sort::Real };
        Self { factory, sort, cache: FxHashMap::default(), declarations: FxHashMap::default() }
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    /// Renders `id` to an SMT-LIB2 term, memoizing by [`ExprId`] for the lifetime of the
    /// current top-level query.
    pub fn render(&mut self, id: ExprId) -> String {
        if let Some(cached) = self.cache.get(&id) {
            return cached.clone();
        }
        let rendered = self.render_uncached(id);
        self.cache.insert(id, rendered.clone());
        rendered
    }

    fn render_uncached(&mut self, id: ExprId) -> String {
        match self.factory.kind_of(id) {
            ExprKind::Constant(v) => self.literal(v),
            ExprKind::Read { .. } | ExprKind::Concat(_) => self.declare_symbol_for(id),
            ExprKind::Add(l, r) => self.binary("+", l, r),
            ExprKind::Sub(l, r) => self.binary("-", l, r),
            ExprKind::Mul(l, r) => self.binary("*", l, r),
            ExprKind::UDiv(l, r) | ExprKind::SDiv(l, r) => self.division(l, r),
            ExprKind::FAdd(l, r) => self.binary("+", l, r),
            ExprKind::FSub(l, r) => self.binary("-", l, r),
            ExprKind::FMul(l, r) => self.binary("*", l, r),
            ExprKind::FDiv(l, r) => self.division(l, r),
            ExprKind::ZExt(child) | ExprKind::SExt(child) | ExprKind::Trunc(child) | ExprKind::BitCast(child) => {
                self.render(child)
            },
            ExprKind::Eq(l, r) => self.binary("=", l, r),
            ExprKind::Ule(l, r) => self.binary("<=", l, r),
            ExprKind::Select { cond, if_true, if_false } => {
                format!("(ite {} {} {})", self.render(cond), self.render(if_true), self.render(if_false))
            },
            ExprKind::Ulp(of) => {
                let name = format!("ulp_{}", of.as_u32());
                self.declarations.entry(name.clone()).or_insert(self.sort);
                name
            },
            ExprKind::ScalingVar(ordinal) => {
                let name = format!("scaling_{ordinal}");
                self.declarations.entry(name.clone()).or_insert(self.sort);
                name
            },
            ExprKind::LShr(value, shift) => {
                let divisor = self.literal_u64(1u64 << shift);
                let rendered = self.render(value);
                format!("(div {rendered} {divisor})")
            },
        }
    }

    fn binary(&mut self, op: &str, l: ExprId, r: ExprId) -> String {
        let l = self.render(l);
        let r = self.render(r);
        format!("({op} {l} {r})")
    }

    fn division(&mut self, l: ExprId, r: ExprId) -> String {
        let op = if self.sort == Sort::Int { "div" } else { "/" };
        self.binary(op, l, r)
    }

    fn literal(&self, value: u64) -> String {
        self.literal_u64(value)
    }

    fn literal_u64(&self, value: u64) -> String {
        match self.sort {
            Sort::Int => value.to_string(),
            Sort::Real => format!("{value}.0"),
        }
    }

    /// Declares (and returns the symbol name for) the array backing a `read`/
    /// `concat-of-reads` value term. Every element of a same-array concat collapses onto
    /// one symbol, since this core's algebra never splits a single array's relative error
    /// across more than one objective variable.
    fn declare_symbol_for(&mut self, id: ExprId) -> String {
        let array = self.factory.source_array_of(id).expect(
            "Read/Concat node without a recognizable source array; \
             ExpressionFactory::source_array_of must agree with ExprKind::Read/Concat",
        );
        let name = array.name().to_owned();
        self.declarations.entry(name.clone()).or_insert(self.sort);
        name
    }

    /// Forces `name` to be declared even if it is never referenced by a rendered term —
    /// used by the bridge to guarantee every maximize-objective array has a declaration,
    /// since an input-error array that the error term doesn't mention would otherwise
    /// never be visited by [`Translator::render`].
    pub fn declare_raw(&mut self, name: impl Into<String>) {
        self.declarations.entry(name.into()).or_insert(self.sort);
    }

    /// `(declare-const name Sort)` lines for every symbol referenced since the last
    /// [`Translator::clear_cache`], in a deterministic order (name order) so rendered
    /// queries are reproducible across runs — useful for `-debug-precision` diffing.
    pub fn declarations(&self) -> Vec<String> {
        let mut names: Vec<_> = self.declarations.iter().collect();
        names.sort_by(|a, b| a.0.cmp(b.0));
        names.into_iter().map(|(name, sort)| format!("(declare-const {name} {})", sort.name())).collect()
    }

    /// Clears both the render cache and the declaration set, per §4.6's "cleared after
    /// every top-level query" cache discipline.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.declarations.clear();
    }
}
