use rustc_hash::FxHashMap;

use precision_expr::{ExprId, ExpressionFactory};

use crate::errors::MemoryMiss;

/// Source-location bookkeeping carried alongside a store or math-call registration,
/// purely for `tracing`/reporter context — never part of a cell's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrSite {
    pub line: u32,
    pub function: String,
}

/// Opaque handle to the memory object that owns a set of error-memory cells, supplied by
/// the interpreter's allocator (out of scope for this core, `spec.md` §1). Used only to
/// find cells to remove on [`ErrorMemory::deallocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryObjectId(pub u64);

/// A `(stored value, stored error)` pair plus the owning object and the fused
/// value-with-error term, per `spec.md` §3's "Error-memory cell" and §4.4's
/// `storeSimple` contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredError {
    pub value: ExprId,
    pub error: ExprId,
    pub value_with_error: ExprId,
    pub owner: MemoryObjectId,
}

/// `(returnVarName -> (functionName, [argumentCells...]))`, used by the reporter (C7) to
/// reconstruct a human-readable formula for a bound that traces back to a `libm` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathCallRecord {
    pub function_name: String,
    pub argument_cells: Vec<ExprId>,
    pub site: InstrSite,
}

/// The Error Memory (C4): per-execution-state mapping from address expressions to
/// `(value, error)` cells, a separate declared-input-error map, math-call records, and
/// the single-slot memcpy witness (`spec.md` §3, §4.4).
///
/// Address equality is *structural* (keys are [`ExprId`]s from a hash-consed arena, so two
/// addresses compare equal iff they are the same arena node) — there is no alias analysis.
/// Two symbolic addresses that are provably disjoint but structurally distinct are still
/// treated as separate cells. This is the deliberate soundness-erring choice documented in
/// `spec.md` §4.4 and `DESIGN.md`.
#[derive(Debug, Clone, Default)]
pub struct ErrorMemory {
    stored: FxHashMap<ExprId, StoredError>,
    declared_input_errors: FxHashMap<ExprId, ExprId>,
    math_calls: FxHashMap<String, MathCallRecord>,
    math_var_count: u64,
    memcpy_witness: Option<(u32, String)>,
}

impl ErrorMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// `storeSimple(base, addr, value, error, valueWithError, instr)` (§4.4): upsert the
    /// cell keyed by the structural identity of `addr`. If `addr` was previously the
    /// target of [`ErrorMemory::declare_input_error`], that declared cell is *not*
    /// removed — the two maps shadow each other independently per the data model.
    pub fn store_simple(
        &mut self,
        owner: MemoryObjectId,
        addr: ExprId,
        value: ExprId,
        error: ExprId,
        value_with_error: ExprId,
        site: &InstrSite,
    ) {
        tracing::trace!(
            line = site.line,
            function = %site.function,
            "storing error-memory cell"
        );
        self.stored.insert(addr, StoredError { value, error, value_with_error, owner });
    }

    /// `load(instr, base, addr, offset) -> (value, error)` (§4.4). Addresses are assumed
    /// already fully resolved (base + offset folded in) by the out-of-scope expression-IR
    /// constructor collaborator, matching `spec.md` §1's "Out of scope" list.
    ///
    /// First consults the value-store for `addr`; if absent, consults declared-input-error
    /// (value defaults to zero, since only an error was ever declared for that address);
    /// otherwise returns `(0, 0)` of `width` and reports [`MemoryMiss::UninitializedLoad`]
    /// (non-fatal, logged via `tracing::warn!`).
    pub fn load<F: ExpressionFactory>(
        &mut self,
        factory: &F,
        addr: ExprId,
        width: u32,
    ) -> (ExprId, ExprId, Option<MemoryMiss>) {
        if let Some(cell) = self.stored.get(&addr) {
            return (cell.value, cell.error, None);
        }
        if let Some(&declared_error) = self.declared_input_errors.get(&addr) {
            let value = factory.mk_constant(0, width);
            return (value, declared_error, None);
        }
        tracing::warn!(width, "load of uninitialized error-memory cell, modeling zero error");
        let zero = factory.mk_constant(0, width);
        (zero, zero, Some(MemoryMiss::UninitializedLoad))
    }

    /// `declareInputError(addr, err)` (§4.4): upsert the declared-input-error cell,
    /// servicing the `klee_set_input_error` intrinsic (`spec.md` §6).
    pub fn declare_input_error(&mut self, addr: ExprId, error: ExprId) {
        self.declared_input_errors.insert(addr, error);
    }

    pub fn has_declared_input_error(&self, addr: ExprId) -> bool {
        self.declared_input_errors.contains_key(&addr)
    }

    /// Removes every cell owned by `owner`, per §4.4 "removed on deallocation of the
    /// owning memory object".
    pub fn deallocate(&mut self, owner: MemoryObjectId) {
        self.stored.retain(|_, cell| cell.owner != owner);
    }

    /// Mints the next globally-unique (per state) math-call return variable name, backing
    /// the data model's "Math-call record names are globally unique per state via an
    /// increasing `mathVarCount`" invariant.
    pub fn next_math_var_name(&mut self) -> String {
        let name = format!("__math_{}", self.math_var_count);
        self.math_var_count += 1;
        name
    }

    /// Registers a `klee_math_call` invocation, keyed by the variable name minted from
    /// [`ErrorMemory::next_math_var_name`].
    pub fn register_math_call(
        &mut self,
        return_var_name: String,
        function_name: impl Into<String>,
        argument_cells: Vec<ExprId>,
        site: InstrSite,
    ) {
        self.math_calls.insert(
            return_var_name,
            MathCallRecord { function_name: function_name.into(), argument_cells, site },
        );
    }

    pub fn math_call(&self, return_var_name: &str) -> Option<&MathCallRecord> {
        self.math_calls.get(return_var_name)
    }

    /// Records a memcpy-modeling store's source location, to be consumed exactly once by
    /// the next load that services the memcpy destination (§3 "Memcpy witness").
    pub fn note_memcpy_store(&mut self, line: u32, function_name: impl Into<String>) {
        self.memcpy_witness = Some((line, function_name.into()));
    }

    /// `retrieveMemcpyStoreInfo() -> (line, name)`: single-slot witness, cleared on read
    /// (Testable Scenario S6, `spec.md` §8).
    pub fn retrieve_memcpy_store_info(&mut self) -> (u32, String) {
        self.memcpy_witness.take().unwrap_or((0, String::new()))
    }
}
