use smallvec::SmallVec;

use crate::ExprId;
use crate::array::Array;

/// Children of a [`ExprKind::Concat`] node. Multi-byte loads rarely exceed a machine word,
/// so most concats fit inline; wider ones spill to the heap like any `Vec`.
pub type ConcatParts = SmallVec<[ExprId; 8]>;

/// The kind of an expression node, mirroring the opcode set named in the data model:
/// constant, read, concat, add, sub, mul, udiv, sdiv, zext, sext, trunc, eq, ule, plus the
/// handful of extra shapes (`select`, `ite`-free bitcast, floating variants, `ulp`, a fresh
/// `scaling` variable) needed to express the §4.3 algebra and its compile-time options.
///
/// Children are [`ExprId`]s, not nested [`ExprKind`]s: because the arena hash-conses every
/// node, two structurally equal subexpressions always share the same [`ExprId`], so
/// `#[derive(PartialEq, Eq, Hash)]` on this enum already implements the data model's
/// "equality is structural" rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// A literal of the node's width.
    Constant(u64),
    /// A single-element read from a source (or error) array at a constant byte offset.
    Read { array: Array, index: ExprId },
    /// A concatenation of reads from the same source array (multi-byte load).
    Concat(ConcatParts),
    Add(ExprId, ExprId),
    Sub(ExprId, ExprId),
    Mul(ExprId, ExprId),
    UDiv(ExprId, ExprId),
    SDiv(ExprId, ExprId),
    FAdd(ExprId, ExprId),
    FSub(ExprId, ExprId),
    FMul(ExprId, ExprId),
    FDiv(ExprId, ExprId),
    ZExt(ExprId),
    SExt(ExprId),
    Trunc(ExprId),
    Eq(ExprId, ExprId),
    Ule(ExprId, ExprId),
    Select { cond: ExprId, if_true: ExprId, if_false: ExprId },
    /// No-op reinterpretation of another term at the same width.
    BitCast(ExprId),
    /// One unit-in-the-last-place rounding term for a floating operation's result.
    Ulp(ExprId),
    /// A fresh symbolic variable introduced by the `scaling` option, identified by an
    /// arena-assigned ordinal so repeated calls within one arena stay distinct.
    ScalingVar(u32),
    /// Logical shift right by a constant amount (the `optimizeDivides` rewrite).
    LShr(ExprId, u32),
}

impl ExprKind {
    /// Opcode-only discriminant, useful for diagnostics without borrowing children.
    pub fn tag(&self) -> &'static str {
        match self {
            ExprKind::Constant(_) => "const",
            ExprKind::Read { .. } => "read",
            ExprKind::Concat(_) => "concat",
            ExprKind::Add(..) => "add",
            ExprKind::Sub(..) => "sub",
            ExprKind::Mul(..) => "mul",
            ExprKind::UDiv(..) => "udiv",
            ExprKind::SDiv(..) => "sdiv",
            ExprKind::FAdd(..) => "fadd",
            ExprKind::FSub(..) => "fsub",
            ExprKind::FMul(..) => "fmul",
            ExprKind::FDiv(..) => "fdiv",
            ExprKind::ZExt(_) => "zext",
            ExprKind::SExt(_) => "sext",
            ExprKind::Trunc(_) => "trunc",
            ExprKind::Eq(..) => "eq",
            ExprKind::Ule(..) => "ule",
            ExprKind::Select { .. } => "select",
            ExprKind::BitCast(_) => "bitcast",
            ExprKind::Ulp(_) => "ulp",
            ExprKind::ScalingVar(_) => "scaling_var",
            ExprKind::LShr(..) => "lshr",
        }
    }
}

/// A node stored in the arena: its kind plus its bit width.
///
/// Per the data model invariant "the error term of a value is never wider than the value",
/// callers are expected to widen with an explicit `zext` node rather than mutate widths
/// in place.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExprNode {
    pub kind: ExprKind,
    pub width: u32,
}
