use crate::array::Array;
use crate::arena::{Arena, ExprId};
use crate::kind::ExprKind;
use std::cell::RefCell;
use std::rc::Rc;

/// The injected collaborator that replaces the original implementation's back-pointer to
/// its interpreter (see `SPEC_FULL.md` §11 / `spec.md` §9's "Cyclic references to
/// interpreter" design note).
///
/// Everything in `precision-error-state` and `precision-optimizer` that needs to build or
/// inspect expression terms goes through this trait instead of owning an arena directly,
/// so those crates never need to know whether the expressions came from a real
/// interpreter's IR or from the in-process [`SharedArena`] used in tests.
pub trait ExpressionFactory {
    fn width_of(&self, id: ExprId) -> u32;
    fn kind_of(&self, id: ExprId) -> ExprKind;
    fn as_constant(&self, id: ExprId) -> Option<u64>;
    fn is_zero_constant(&self, id: ExprId) -> bool;

    fn mk_constant(&self, value: u64, width: u32) -> ExprId;
    fn mk_read(&self, array: Array, index: ExprId) -> ExprId;
    fn mk_add(&self, l: ExprId, r: ExprId) -> ExprId;
    fn mk_sub(&self, l: ExprId, r: ExprId) -> ExprId;
    fn mk_mul(&self, l: ExprId, r: ExprId) -> ExprId;
    fn mk_udiv(&self, l: ExprId, r: ExprId) -> ExprId;
    fn mk_sdiv(&self, l: ExprId, r: ExprId) -> ExprId;
    fn mk_fadd(&self, l: ExprId, r: ExprId) -> ExprId;
    fn mk_fsub(&self, l: ExprId, r: ExprId) -> ExprId;
    fn mk_fmul(&self, l: ExprId, r: ExprId) -> ExprId;
    fn mk_fdiv(&self, l: ExprId, r: ExprId) -> ExprId;
    fn mk_zext(&self, child: ExprId, width: u32) -> ExprId;
    fn mk_sext(&self, child: ExprId, width: u32) -> ExprId;
    fn mk_trunc(&self, child: ExprId, width: u32) -> ExprId;
    fn mk_select(&self, cond: ExprId, if_true: ExprId, if_false: ExprId) -> ExprId;
    fn mk_ulp(&self, of: ExprId) -> ExprId;
    fn mk_fresh_scaling_var(&self, width: u32) -> ExprId;
    fn mk_lshr(&self, value: ExprId, shift: u32) -> ExprId;
    /// Unsigned `l <= r`, width 1. Exposed on the trait (rather than only on [`Arena`])
    /// because the bound request builder (`precision-optimizer::request`) needs it to
    /// assemble the `error(X) > b` feasibility query of `spec.md` §4.5.
    fn mk_ule(&self, l: ExprId, r: ExprId) -> ExprId;

    /// Root array backing a `read`/`concat-of-reads` value term, if `id` has that shape.
    /// Returns `None` for composite terms that are not themselves loads from a single
    /// array — the only two shapes `errorOf` (§4.2) recognizes besides constants.
    fn source_array_of(&self, id: ExprId) -> Option<Array>;
}

/// A thread-local, reference-counted [`Arena`] that implements [`ExpressionFactory`] via
/// interior mutability. This is the default, self-contained collaborator used by tests and
/// by any embedding application that doesn't already own an expression IR of its own.
#[derive(Clone, Default)]
pub struct SharedArena(Rc<RefCell<Arena>>);

impl SharedArena {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Arena::new())))
    }
}

impl ExpressionFactory for SharedArena {
    fn width_of(&self, id: ExprId) -> u32 {
        self.0.borrow().width_of(id)
    }

    fn kind_of(&self, id: ExprId) -> ExprKind {
        self.0.borrow().kind_of(id).clone()
    }

    fn as_constant(&self, id: ExprId) -> Option<u64> {
        self.0.borrow().as_constant(id)
    }

    fn is_zero_constant(&self, id: ExprId) -> bool {
        self.0.borrow().is_zero_constant(id)
    }

    fn mk_constant(&self, value: u64, width: u32) -> ExprId {
        self.0.borrow_mut().mk_constant(value, width)
    }

    fn mk_read(&self, array: Array, index: ExprId) -> ExprId {
        self.0.borrow_mut().mk_read(array, index)
    }

    fn mk_add(&self, l: ExprId, r: ExprId) -> ExprId {
        self.0.borrow_mut().mk_add(l, r)
    }

    fn mk_sub(&self, l: ExprId, r: ExprId) -> ExprId {
        self.0.borrow_mut().mk_sub(l, r)
    }

    fn mk_mul(&self, l: ExprId, r: ExprId) -> ExprId {
        self.0.borrow_mut().mk_mul(l, r)
    }

    fn mk_udiv(&self, l: ExprId, r: ExprId) -> ExprId {
        self.0.borrow_mut().mk_udiv(l, r)
    }

    fn mk_sdiv(&self, l: ExprId, r: ExprId) -> ExprId {
        self.0.borrow_mut().mk_sdiv(l, r)
    }

    fn mk_fadd(&self, l: ExprId, r: ExprId) -> ExprId {
        self.0.borrow_mut().mk_fadd(l, r)
    }

    fn mk_fsub(&self, l: ExprId, r: ExprId) -> ExprId {
        self.0.borrow_mut().mk_fsub(l, r)
    }

    fn mk_fmul(&self, l: ExprId, r: ExprId) -> ExprId {
        self.0.borrow_mut().mk_fmul(l, r)
    }

    fn mk_fdiv(&self, l: ExprId, r: ExprId) -> ExprId {
        self.0.borrow_mut().mk_fdiv(l, r)
    }

    fn mk_zext(&self, child: ExprId, width: u32) -> ExprId {
        self.0.borrow_mut().mk_zext(child, width)
    }

    fn mk_sext(&self, child: ExprId, width: u32) -> ExprId {
        self.0.borrow_mut().mk_sext(child, width)
    }

    fn mk_trunc(&self, child: ExprId, width: u32) -> ExprId {
        self.0.borrow_mut().mk_trunc(child, width)
    }

    fn mk_select(&self, cond: ExprId, if_true: ExprId, if_false: ExprId) -> ExprId {
        self.0.borrow_mut().mk_select(cond, if_true, if_false)
    }

    fn mk_ulp(&self, of: ExprId) -> ExprId {
        self.0.borrow_mut().mk_ulp(of)
    }

    fn mk_fresh_scaling_var(&self, width: u32) -> ExprId {
        self.0.borrow_mut().mk_fresh_scaling_var(width)
    }

    fn mk_lshr(&self, value: ExprId, shift: u32) -> ExprId {
        self.0.borrow_mut().mk_lshr(value, shift)
    }

    fn mk_ule(&self, l: ExprId, r: ExprId) -> ExprId {
        self.0.borrow_mut().mk_ule(l, r)
    }

    fn source_array_of(&self, id: ExprId) -> Option<Array> {
        let arena = self.0.borrow();
        match arena.kind_of(id) {
            ExprKind::Read { array, .. } => Some(array.clone()),
            ExprKind::Concat(parts) => {
                let first = parts.first()?;
                let array = match arena.kind_of(*first) {
                    ExprKind::Read { array, .. } => array.clone(),
                    _ => return None,
                };
                let all_same_array = parts.iter().all(|p| {
                    matches!(arena.kind_of(*p), ExprKind::Read { array: a, .. } if *a == array)
                });
                all_same_array.then_some(array)
            },
            _ => None,
        }
    }
}
