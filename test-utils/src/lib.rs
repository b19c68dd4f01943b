//! Shared fixtures for the precision analysis core workspace (`SPEC_FULL.md` §6a.4):
//! a scripted [`MockSolverBackend`] that never spawns a subprocess, and small builders for
//! the symbolic inputs the six end-to-end scenarios of `spec.md` §8 are assembled from.

mod backend;
mod scenario;

pub use backend::MockSolverBackend;
pub use scenario::{input_term, two_inputs, TwoInputs};
