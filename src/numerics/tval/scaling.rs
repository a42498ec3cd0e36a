extern crate nalgebra as na;

use log::debug;
use na::DVector;
use crate::{Float, GenericScalar};
use crate::operator::{estimate_spectral_norm_squared, LinearOperator};

const EIGEN_TOL: Float = 1e-4;
const EIGEN_MAX_ITER: usize = 300;
const B_RANGE_LOW: Float = 0.5;
const B_RANGE_HIGH: Float = 1.5;

/// Factor `A` must be multiplied by so that the largest eigenvalue of `A'A`
/// is one. `b` is scaled along and `mu` multiplied by the eigenvalue when
/// `consist_mu` is set.
#[allow(non_snake_case)]
pub fn scale_operator<T: GenericScalar>(A: &dyn LinearOperator<T>, b: &mut DVector<T>, mu: &mut Float, consist_mu: bool) -> Float {
    let start = A.adjoint(b);
    let s2 = estimate_spectral_norm_squared(A, &start, EIGEN_TOL, EIGEN_MAX_ITER);
    debug!("largest eigenvalue of A'A: {:e}", s2);
    match s2 {
        s2 if s2 > 1.0 + 1e-10 => {
            if consist_mu {
                *mu *= s2;
            }
            let factor = 1.0/s2.sqrt();
            b.scale_mut(factor);
            factor
        },
        _ => 1.0
    }
}

/// Scales `b` so that `max(b) - min(b)` falls into `[0.5, 1.5]`; returns the factor.
/// Real data is ranged by value, complex data by modulus. `mu` is divided by
/// the factor when `consist_mu` is set.
pub fn scale_measurements<T: GenericScalar>(b: &mut DVector<T>, mu: &mut Float, consist_mu: bool) -> Float {
    let is_real = b.iter().all(|v| v.imaginary() == 0.0);
    let (b_min, b_max) = b.iter()
        .map(|v| match is_real { true => v.real(), false => v.modulus() })
        .fold((Float::INFINITY, Float::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let b_dif = b_max - b_min;
    let scl = match b_dif {
        d if d > B_RANGE_HIGH => B_RANGE_HIGH/d,
        d if d > 0.0 && d < B_RANGE_LOW => B_RANGE_LOW/d,
        _ => return 1.0
    };
    b.scale_mut(scl);
    if consist_mu {
        *mu /= scl;
    }
    debug!("measurements scaled by {:e}", scl);
    scl
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use na::DMatrix;

    #[test]
    fn operator_is_normalised() {
        let a = DMatrix::<Float>::from_diagonal(&DVector::from_vec(vec![4.0, 2.0, 1.0]));
        let mut b = DVector::<Float>::from_vec(vec![4.0, 2.0, 1.0]);
        let mut mu = 10.0;
        let factor = scale_operator(&a, &mut b, &mut mu, true);
        assert_relative_eq!(factor, 0.25, epsilon = 1e-3);
        assert_relative_eq!(mu, 160.0, max_relative = 1e-3);
        assert_relative_eq!(b[0], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn measurements_within_range_are_untouched() {
        let mut b = DVector::<Float>::from_vec(vec![0.0, 1.0, -0.5]);
        let mut mu = 3.0;
        assert_eq!(scale_measurements(&mut b, &mut mu, true), 1.0);
        assert_eq!(mu, 3.0);
    }

    #[test]
    fn wide_measurements_are_compressed() {
        let mut b = DVector::<Float>::from_vec(vec![0.0, 30.0, -15.0]);
        let mut mu = 3.0;
        let scl = scale_measurements(&mut b, &mut mu, true);
        assert_relative_eq!(scl, 1.0/30.0, epsilon = 1e-12);
        assert_relative_eq!(b[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(b[2], -0.5, epsilon = 1e-12);
        assert_relative_eq!(mu, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn signed_range_is_used_for_real_measurements() {
        let mut b = DVector::<Float>::from_vec(vec![-5.0, 5.0]);
        let mut mu = 1.0;
        assert_relative_eq!(scale_measurements(&mut b, &mut mu, false), 0.15, epsilon = 1e-12);
        assert_eq!(mu, 1.0);
        assert_relative_eq!(b[0], -0.75, epsilon = 1e-12);
    }

    #[test]
    fn narrow_measurements_are_stretched() {
        let mut b = DVector::<Float>::from_vec(vec![0.1, 0.2]);
        let mut mu = 10.0;
        let scl = scale_measurements(&mut b, &mut mu, true);
        assert_relative_eq!(scl, 5.0, epsilon = 1e-9);
        assert_relative_eq!(b[1] - b[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(mu, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn constant_measurements_are_untouched() {
        let mut b = DVector::<Float>::from_element(3, 2.0);
        let mut mu = 1.0;
        assert_eq!(scale_measurements(&mut b, &mut mu, true), 1.0);
        assert_eq!(b[0], 2.0);
    }
}
