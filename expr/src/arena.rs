use rustc_hash::FxHashMap;

use crate::array::Array;
use crate::kind::{ConcatParts, ExprKind, ExprNode};

/// A handle into an [`Arena`]. Cheap to copy, stable for the arena's lifetime.
///
/// Mirrors the reference workspace's `MastNodeId`: an index into a flat node table rather
/// than a pointer, so the arena can be serialized, cloned cheaply by sharing an `Arc`, and
/// compared for structural equality by comparing indices once hash-consing is in effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Hash-consed arena of expression terms: the concrete, in-process stand-in for the
/// "Expression IR view" (C1) this core treats as a read-only external collaborator.
///
/// Every `mk_*` constructor is idempotent: building the same [`ExprKind`] at the same
/// width twice returns the same [`ExprId`], which is what makes `ExprId` equality a sound
/// implementation of the data model's "equality is structural" rule.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<ExprNode>,
    index: FxHashMap<ExprNode, ExprId>,
    scaling_var_count: u32,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: ExprId) -> &ExprNode {
        &self.nodes[id.0 as usize]
    }

    pub fn width_of(&self, id: ExprId) -> u32 {
        self.node(id).width
    }

    pub fn kind_of(&self, id: ExprId) -> &ExprKind {
        &self.node(id).kind
    }

    /// Returns the constant value of `id` if it is a [`ExprKind::Constant`].
    pub fn as_constant(&self, id: ExprId) -> Option<u64> {
        match self.kind_of(id) {
            ExprKind::Constant(v) => Some(*v),
            _ => None,
        }
    }

    /// True iff `id` is the literal zero constant of its width — the guard condition used
    /// by the division-by-zero check in §4.3.
    pub fn is_zero_constant(&self, id: ExprId) -> bool {
        matches!(self.as_constant(id), Some(0))
    }

    fn intern(&mut self, kind: ExprKind, width: u32) -> ExprId {
        let node = ExprNode { kind, width };
        if let Some(id) = self.index.get(&node) {
            return *id;
        }
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(node.clone());
        self.index.insert(node, id);
        id
    }

    pub fn mk_constant(&mut self, value: u64, width: u32) -> ExprId {
        self.intern(ExprKind::Constant(value), width)
    }

    pub fn mk_read(&mut self, array: Array, index: ExprId) -> ExprId {
        let width = array.element_width();
        self.intern(ExprKind::Read { array, index }, width)
    }

    pub fn mk_concat(&mut self, parts: impl Into<ConcatParts>) -> ExprId {
        let parts = parts.into();
        let width = parts.iter().map(|p| self.width_of(*p)).sum();
        self.intern(ExprKind::Concat(parts), width)
    }

    pub fn mk_add(&mut self, l: ExprId, r: ExprId) -> ExprId {
        let width = self.width_of(l);
        self.intern(ExprKind::Add(l, r), width)
    }

    pub fn mk_sub(&mut self, l: ExprId, r: ExprId) -> ExprId {
        let width = self.width_of(l);
        self.intern(ExprKind::Sub(l, r), width)
    }

    pub fn mk_mul(&mut self, l: ExprId, r: ExprId) -> ExprId {
        let width = self.width_of(l);
        self.intern(ExprKind::Mul(l, r), width)
    }

    pub fn mk_udiv(&mut self, l: ExprId, r: ExprId) -> ExprId {
        let width = self.width_of(l);
        self.intern(ExprKind::UDiv(l, r), width)
    }

    pub fn mk_sdiv(&mut self, l: ExprId, r: ExprId) -> ExprId {
        let width = self.width_of(l);
        self.intern(ExprKind::SDiv(l, r), width)
    }

    pub fn mk_fadd(&mut self, l: ExprId, r: ExprId) -> ExprId {
        let width = self.width_of(l);
        self.intern(ExprKind::FAdd(l, r), width)
    }

    pub fn mk_fsub(&mut self, l: ExprId, r: ExprId) -> ExprId {
        let width = self.width_of(l);
        self.intern(ExprKind::FSub(l, r), width)
    }

    pub fn mk_fmul(&mut self, l: ExprId, r: ExprId) -> ExprId {
        let width = self.width_of(l);
        self.intern(ExprKind::FMul(l, r), width)
    }

    pub fn mk_fdiv(&mut self, l: ExprId, r: ExprId) -> ExprId {
        let width = self.width_of(l);
        self.intern(ExprKind::FDiv(l, r), width)
    }

    pub fn mk_zext(&mut self, child: ExprId, width: u32) -> ExprId {
        debug_assert!(width >= self.width_of(child), "zext must not narrow");
        self.intern(ExprKind::ZExt(child), width)
    }

    pub fn mk_sext(&mut self, child: ExprId, width: u32) -> ExprId {
        debug_assert!(width >= self.width_of(child), "sext must not narrow");
        self.intern(ExprKind::SExt(child), width)
    }

    pub fn mk_trunc(&mut self, child: ExprId, width: u32) -> ExprId {
        debug_assert!(width <= self.width_of(child), "trunc must not widen");
        self.intern(ExprKind::Trunc(child), width)
    }

    pub fn mk_eq(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.intern(ExprKind::Eq(l, r), 1)
    }

    pub fn mk_ule(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.intern(ExprKind::Ule(l, r), 1)
    }

    pub fn mk_select(&mut self, cond: ExprId, if_true: ExprId, if_false: ExprId) -> ExprId {
        let width = self.width_of(if_true);
        self.intern(ExprKind::Select { cond, if_true, if_false }, width)
    }

    pub fn mk_bitcast(&mut self, child: ExprId, width: u32) -> ExprId {
        self.intern(ExprKind::BitCast(child), width)
    }

    pub fn mk_ulp(&mut self, of: ExprId) -> ExprId {
        let width = self.width_of(of);
        self.intern(ExprKind::Ulp(of), width)
    }

    /// Logical shift right by a constant amount, used by the `optimizeDivides` rewrite
    /// (§4.3) to turn `numerator /ᵤ (2^k)` into `numerator >> k` when the divisor is a
    /// known power-of-two constant.
    pub fn mk_lshr(&mut self, value: ExprId, shift: u32) -> ExprId {
        let width = self.width_of(value);
        self.intern(ExprKind::LShr(value, shift), width)
    }

    /// Mints a fresh `scaling` variable of the given width (§4.3's `optimizeDivides`
    /// sibling option). Each call produces a distinct term even at the same width, since
    /// the ordinal is part of the node's identity.
    pub fn mk_fresh_scaling_var(&mut self, width: u32) -> ExprId {
        let ordinal = self.scaling_var_count;
        self.scaling_var_count += 1;
        self.intern(ExprKind::ScalingVar(ordinal), width)
    }
}
