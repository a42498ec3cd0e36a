//! Augmented-Lagrangian TV minimisation (TVAL3).
//!
//! Solves `min TV(T(u))  s.t.  A u = b` by alternating a shrinkage step on the
//! splitting variable `W ≈ D T u` with a non-monotone Barzilai-Borwein descent
//! on `u`, then updating the multipliers and increasing `beta`/`mu`.

pub mod diagnostics;
pub mod lagrangian;
pub mod options;
pub mod scaling;
pub mod solver;

pub use diagnostics::{Diagnostics, Terms};
pub use options::{InitPolicy, Options, StoppingCriterion};
pub use solver::{solve, Reconstruction, Tval3};
pub use crate::numerics::shrinkage::TvNorm;
