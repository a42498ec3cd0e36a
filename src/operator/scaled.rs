extern crate nalgebra as na;

use na::DVector;
use crate::{Float, GenericScalar};
use super::LinearOperator;

/// `factor * A`, used to normalise `A` so that the largest eigenvalue of `A'A` is one.
pub struct ScaledOperator<'a, T: GenericScalar> {
    inner: &'a dyn LinearOperator<T>,
    factor: Float
}

impl<'a, T: GenericScalar> ScaledOperator<'a, T> {
    pub fn new(inner: &'a dyn LinearOperator<T>, factor: Float) -> ScaledOperator<'a, T> {
        ScaledOperator { inner, factor }
    }

    pub fn factor(&self) -> Float {
        self.factor
    }
}

impl<'a, T: GenericScalar> LinearOperator<T> for ScaledOperator<'a, T> {
    fn nrows(&self) -> usize {
        self.inner.nrows()
    }

    fn ncols(&self) -> usize {
        self.inner.ncols()
    }

    fn forward(&self, x: &DVector<T>) -> DVector<T> {
        let mut y = self.inner.forward(x);
        if self.factor != 1.0 {
            y.scale_mut(self.factor);
        }
        y
    }

    fn adjoint(&self, y: &DVector<T>) -> DVector<T> {
        let mut x = self.inner.adjoint(y);
        if self.factor != 1.0 {
            x.scale_mut(self.factor);
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::DMatrix;
    use crate::operator::adjoint_mismatch;

    #[test]
    fn scales_both_directions() {
        let a = DMatrix::<Float>::from_fn(2, 3, |i, j| (i + j) as Float);
        let scaled = ScaledOperator::new(&a, 0.5);
        let x = DVector::<Float>::from_vec(vec![1.0, 2.0, 3.0]);
        let y = DVector::<Float>::from_vec(vec![1.0, -1.0]);
        assert_eq!(scaled.forward(&x), (&a*&x)*0.5);
        assert_eq!(scaled.adjoint(&y), a.tr_mul(&y)*0.5);
        assert_eq!(scaled.nrows(), 2);
        assert!(adjoint_mismatch(&scaled, &x, &y) < 1e-12);
    }
}
