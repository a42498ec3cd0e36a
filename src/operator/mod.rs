extern crate nalgebra as na;

use na::{DMatrix, DVector};
use crate::{float, Float, GenericScalar};

pub mod function;
pub mod scaled;
pub mod sparse;

pub use function::FunctionOperator;
pub use scaled::ScaledOperator;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    Forward,
    Adjoint
}

/// A linear map from a flattened signal (length `ncols`) to a measurement
/// vector (length `nrows`), together with its adjoint.
///
/// The solver relies on `adjoint` being the true adjoint of `forward`; this is
/// not checked beyond the diagnostics in this module.
pub trait LinearOperator<T: GenericScalar> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn forward(&self, x: &DVector<T>) -> DVector<T>;
    fn adjoint(&self, y: &DVector<T>) -> DVector<T>;

    fn apply(&self, x: &DVector<T>, mode: Mode) -> DVector<T> {
        match mode {
            Mode::Forward => self.forward(x),
            Mode::Adjoint => self.adjoint(x)
        }
    }
}

impl<T: GenericScalar> LinearOperator<T> for DMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }

    fn ncols(&self) -> usize {
        self.ncols()
    }

    fn forward(&self, x: &DVector<T>) -> DVector<T> {
        self * x
    }

    fn adjoint(&self, y: &DVector<T>) -> DVector<T> {
        self.ad_mul(y)
    }
}

pub fn l1_norm<T: GenericScalar>(v: &DVector<T>) -> Float {
    v.iter().map(|x| x.modulus()).sum()
}

/// `‖A A' b − b‖₁ / ‖b‖₁ < 1e-3`, i.e. the rows of `A` are (nearly) orthonormal.
pub fn is_near_orthonormal<T: GenericScalar>(operator: &dyn LinearOperator<T>, b: &DVector<T>) -> bool {
    let b_norm = l1_norm(b);
    if b_norm == 0.0 {
        return false;
    }
    let aatb = operator.forward(&operator.adjoint(b));
    l1_norm(&(aatb - b))/b_norm < 1e-3
}

/// Largest eigenvalue of `A'A` by power iteration.
pub fn estimate_spectral_norm_squared<T: GenericScalar>(operator: &dyn LinearOperator<T>, start: &DVector<T>, tol: Float, max_iter: usize) -> Float {
    let n = operator.ncols();
    let mut x = match start.norm() {
        v if v > 0.0 && start.nrows() == n => start.clone(),
        _ => DVector::<T>::from_element(n, T::one())
    };
    let x_norm = x.norm();
    x.unscale_mut(x_norm);

    let mut eigenvalue: Float = 0.0;
    for _ in 0..max_iter {
        let mut y = operator.adjoint(&operator.forward(&x));
        let y_norm = y.norm();
        if y_norm == 0.0 {
            return 0.0;
        }
        let converged = (y_norm - eigenvalue).abs() <= tol*y_norm;
        eigenvalue = y_norm;
        if converged {
            break;
        }
        y.unscale_mut(y_norm);
        x = y;
    }
    eigenvalue
}

/// Relative gap `|⟨Ax,y⟩ − ⟨x,A'y⟩| / (‖Ax‖‖y‖)`; near zero for a consistent pair.
pub fn adjoint_mismatch<T: GenericScalar>(operator: &dyn LinearOperator<T>, x: &DVector<T>, y: &DVector<T>) -> Float {
    let ax = operator.forward(x);
    let aty = operator.adjoint(y);
    let lhs = ax.dotc(y);
    let rhs = x.dotc(&aty);
    let denom = (ax.norm()*y.norm()).max(float::EPSILON);
    (lhs - rhs).modulus()/denom
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::Complex;

    #[test]
    fn dense_adjoint_is_conjugate_transpose() {
        let a = DMatrix::<Complex>::from_fn(3, 4, |i, j| Complex::new(i as Float + 1.0, j as Float - 1.5));
        let x = DVector::<Complex>::from_fn(4, |i, _| Complex::new(0.5*i as Float, 1.0));
        let y = DVector::<Complex>::from_fn(3, |i, _| Complex::new(1.0, -(i as Float)));
        assert!(adjoint_mismatch(&a, &x, &y) < 1e-12);
        assert_eq!(LinearOperator::apply(&a, &x, Mode::Forward).nrows(), 3);
        assert_eq!(LinearOperator::apply(&a, &y, Mode::Adjoint).nrows(), 4);
    }

    #[test]
    fn spectral_norm_of_diagonal() {
        let a = DMatrix::<Float>::from_diagonal(&DVector::from_vec(vec![3.0, 1.0, 0.5]));
        let start = DVector::<Float>::from_element(3, 1.0);
        let s2 = estimate_spectral_norm_squared(&a, &start, 1e-10, 500);
        assert_relative_eq!(s2, 9.0, epsilon = 1e-6);
    }

    #[test]
    fn selection_rows_are_orthonormal() {
        let a = DMatrix::<Float>::from_fn(2, 5, |i, j| if j == 2*i { 1.0 } else { 0.0 });
        let b = DVector::<Float>::from_vec(vec![1.0, -2.0]);
        assert!(is_near_orthonormal(&a, &b));
        let scaled = &a*2.0;
        assert!(!is_near_orthonormal(&scaled, &b));
    }
}
