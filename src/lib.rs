//! Total-variation reconstruction of images and video from compressed linear
//! measurements (TVAL3).
//!
//! - `operator`: the sensing operator interface `A` / `A'` and its adapters
//! - `image`: volume shapes and the `D`/`Dt`, `T`/`Tt` transform pairs
//! - `numerics`: shrinkage and the augmented-Lagrangian TV solver
//! - `io`: YAML options and diagnostics

extern crate nalgebra as na;
extern crate num_complex;
extern crate simba;

use simba::scalar::ComplexField;

pub mod error;
pub mod image;
pub mod io;
pub mod numerics;
pub mod operator;

pub use error::Error;
pub use image::{Shape, TvOperators};
pub use numerics::tval::{solve, Diagnostics, InitPolicy, Options, Reconstruction, StoppingCriterion, Tval3, TvNorm};
pub use operator::{FunctionOperator, LinearOperator, Mode};

macro_rules! define_float {
    ($f:tt) => {
        pub use std::$f as float;
        pub type Float = $f;
    }
}

define_float!(f64);

pub type Complex = num_complex::Complex<Float>;

/// Element type of signals and measurements: `Float` or `Complex`.
pub trait GenericScalar: ComplexField<RealField = Float> + Copy {}
impl<T> GenericScalar for T where T: ComplexField<RealField = Float> + Copy {}
