//! Read-only, hash-consed symbolic expression terms shared by the precision analysis core.
//!
//! This crate is the concrete stand-in for "C1 Expression IR view" (`SPEC_FULL.md` §2): a
//! real embedding interpreter almost certainly already owns an expression IR of its own,
//! in which case only the [`ExpressionFactory`] trait matters — implement it over that
//! IR and the rest of this workspace never needs to know the difference. [`SharedArena`]
//! is the in-process implementation used by this workspace's own tests.

mod arena;
mod array;
mod factory;
mod kind;

pub use arena::{Arena, ExprId};
pub use array::Array;
pub use factory::{ExpressionFactory, SharedArena};
pub use kind::{ExprKind, ExprNode};

#[cfg(test)]
mod tests;
