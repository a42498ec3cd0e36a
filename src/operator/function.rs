extern crate nalgebra as na;

use na::DVector;
use crate::GenericScalar;
use super::LinearOperator;

/// Operator given only as a pair of closures, e.g. a fast transform.
pub struct FunctionOperator<T: GenericScalar> {
    nrows: usize,
    ncols: usize,
    forward: Box<dyn Fn(&DVector<T>) -> DVector<T>>,
    adjoint: Box<dyn Fn(&DVector<T>) -> DVector<T>>
}

impl<T: GenericScalar> FunctionOperator<T> {
    pub fn new(
        nrows: usize,
        ncols: usize,
        forward: Box<dyn Fn(&DVector<T>) -> DVector<T>>,
        adjoint: Box<dyn Fn(&DVector<T>) -> DVector<T>>) -> FunctionOperator<T> {
        FunctionOperator { nrows, ncols, forward, adjoint }
    }
}

impl<T: GenericScalar> LinearOperator<T> for FunctionOperator<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }

    fn ncols(&self) -> usize {
        self.ncols
    }

    fn forward(&self, x: &DVector<T>) -> DVector<T> {
        (self.forward)(x)
    }

    fn adjoint(&self, y: &DVector<T>) -> DVector<T> {
        (self.adjoint)(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Float;
    use crate::operator::adjoint_mismatch;

    #[test]
    fn closure_pair_matches_dense_product() {
        // first-difference operator (n-1) x n
        let n = 6;
        let op = FunctionOperator::<Float>::new(
            n - 1,
            n,
            Box::new(move |x: &DVector<Float>| DVector::from_fn(n - 1, |i, _| x[i + 1] - x[i])),
            Box::new(move |y: &DVector<Float>| DVector::from_fn(n, |j, _| {
                let left = if j > 0 { y[j - 1] } else { 0.0 };
                let right = if j < n - 1 { y[j] } else { 0.0 };
                left - right
            }))
        );
        let x = DVector::<Float>::from_fn(n, |i, _| (i*i) as Float);
        let y = DVector::<Float>::from_fn(n - 1, |i, _| 1.0 - i as Float);
        assert_eq!(op.forward(&x)[2], 5.0);
        assert!(adjoint_mismatch(&op, &x, &y) < 1e-12);
    }
}
