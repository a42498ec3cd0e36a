extern crate nalgebra as na;

use na::DVector;
use crate::{float, Float, GenericScalar};

pub mod shrinkage;
pub mod tval;

/// `Re⟨a, b⟩`
pub fn real_dot<T: GenericScalar>(a: &DVector<T>, b: &DVector<T>) -> Float {
    a.dotc(b).real()
}

/// `max(value, eps)`, used to keep step length denominators away from zero.
pub fn guard(value: Float) -> Float {
    value.max(float::EPSILON)
}

/// Real part of every element.
pub fn real_part<T: GenericScalar>(vector: &DVector<T>) -> DVector<T> {
    vector.map(|v| T::from_real(v.real()))
}

/// Elementwise `max(Re v, 0)`.
pub fn project_nonnegative<T: GenericScalar>(vector: &mut DVector<T>) -> () {
    for v in vector.iter_mut() {
        *v = T::from_real(v.real().max(0.0));
    }
}
