extern crate nalgebra as na;

use na::DVector;
use crate::GenericScalar;
use super::Shape;

/// Spatial difference operator `D` with its adjoint `Dt`.
pub trait GradientOperator<T: GenericScalar> {
    /// Returns the `(x, y)` difference fields, each shaped like `u`.
    fn forward(&self, u: &DVector<T>, shape: &Shape) -> (DVector<T>, DVector<T>);
    fn adjoint(&self, x: &DVector<T>, y: &DVector<T>, shape: &Shape) -> DVector<T>;
}

/// Forward differences with circular boundary, frame by frame.
/// `x` differences run along columns, `y` along rows.
#[derive(Debug, Copy, Clone, Default)]
pub struct PeriodicDifference;

impl<T: GenericScalar> GradientOperator<T> for PeriodicDifference {
    fn forward(&self, u: &DVector<T>, shape: &Shape) -> (DVector<T>, DVector<T>) {
        let (p, q, r) = (shape.rows, shape.cols, shape.frames);
        let mut ux = DVector::<T>::zeros(shape.len());
        let mut uy = DVector::<T>::zeros(shape.len());
        for k in 0..r {
            for j in 0..q {
                let j_next = if j + 1 == q { 0 } else { j + 1 };
                for i in 0..p {
                    let i_next = if i + 1 == p { 0 } else { i + 1 };
                    let idx = shape.index(i, j, k);
                    ux[idx] = u[shape.index(i, j_next, k)] - u[idx];
                    uy[idx] = u[shape.index(i_next, j, k)] - u[idx];
                }
            }
        }
        (ux, uy)
    }

    fn adjoint(&self, x: &DVector<T>, y: &DVector<T>, shape: &Shape) -> DVector<T> {
        let (p, q, r) = (shape.rows, shape.cols, shape.frames);
        let mut out = DVector::<T>::zeros(shape.len());
        for k in 0..r {
            for j in 0..q {
                let j_prev = if j == 0 { q - 1 } else { j - 1 };
                for i in 0..p {
                    let i_prev = if i == 0 { p - 1 } else { i - 1 };
                    let idx = shape.index(i, j, k);
                    out[idx] = x[shape.index(i, j_prev, k)] - x[idx] + y[shape.index(i_prev, j, k)] - y[idx];
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Complex, Float};

    #[test]
    fn constant_volume_has_no_variation() {
        let shape = Shape::new(3, 4, 2);
        let u = DVector::<Float>::from_element(shape.len(), 7.0);
        let (ux, uy) = PeriodicDifference.forward(&u, &shape);
        assert_eq!(ux.amax(), 0.0);
        assert_eq!(uy.amax(), 0.0);
    }

    #[test]
    fn column_step_shows_up_in_x_field() {
        let shape = Shape::image(2, 3);
        let u = DVector::<Float>::from_fn(shape.len(), |idx, _| if idx >= 2 { 1.0 } else { 0.0 });
        let (ux, uy) = PeriodicDifference.forward(&u, &shape);
        assert_eq!(ux[shape.index(0, 0, 0)], 1.0);
        assert_eq!(ux[shape.index(1, 2, 0)], -1.0);
        assert_eq!(uy.amax(), 0.0);
    }

    #[test]
    fn adjoint_matches_inner_products() {
        let shape = Shape::new(4, 3, 2);
        let n = shape.len();
        let u = DVector::<Complex>::from_fn(n, |i, _| Complex::new((i*i % 7) as Float, (i % 3) as Float));
        let x = DVector::<Complex>::from_fn(n, |i, _| Complex::new((i % 5) as Float, -1.0));
        let y = DVector::<Complex>::from_fn(n, |i, _| Complex::new(1.0, (i % 4) as Float));
        let (ux, uy) = PeriodicDifference.forward(&u, &shape);
        let lhs = ux.dotc(&x) + uy.dotc(&y);
        let rhs = u.dotc(&PeriodicDifference.adjoint(&x, &y, &shape));
        assert!((lhs - rhs).norm() < 1e-10);
    }
}
