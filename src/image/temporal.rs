extern crate nalgebra as na;

use na::DVector;
use crate::GenericScalar;
use super::Shape;

/// Pre-transform `T` applied before spatial differencing, with adjoint `Tt`.
pub trait PreTransform<T: GenericScalar> {
    fn forward(&self, u: &DVector<T>, shape: &Shape) -> DVector<T>;
    fn adjoint(&self, v: &DVector<T>, shape: &Shape) -> DVector<T>;
}

#[derive(Debug, Copy, Clone, Default)]
pub struct Identity;

impl<T: GenericScalar> PreTransform<T> for Identity {
    fn forward(&self, u: &DVector<T>, _shape: &Shape) -> DVector<T> {
        u.clone()
    }

    fn adjoint(&self, v: &DVector<T>, _shape: &Shape) -> DVector<T> {
        v.clone()
    }
}

/// Circular forward difference between consecutive frames.
#[derive(Debug, Copy, Clone, Default)]
pub struct TemporalDifference;

impl<T: GenericScalar> PreTransform<T> for TemporalDifference {
    fn forward(&self, u: &DVector<T>, shape: &Shape) -> DVector<T> {
        let frame_len = shape.frame_len();
        let r = shape.frames;
        let mut out = DVector::<T>::zeros(shape.len());
        for k in 0..r {
            let k_next = if k + 1 == r { 0 } else { k + 1 };
            for idx in 0..frame_len {
                out[k*frame_len + idx] = u[k_next*frame_len + idx] - u[k*frame_len + idx];
            }
        }
        out
    }

    fn adjoint(&self, v: &DVector<T>, shape: &Shape) -> DVector<T> {
        let frame_len = shape.frame_len();
        let r = shape.frames;
        let mut out = DVector::<T>::zeros(shape.len());
        for k in 0..r {
            let k_prev = if k == 0 { r - 1 } else { k - 1 };
            for idx in 0..frame_len {
                out[k*frame_len + idx] = v[k_prev*frame_len + idx] - v[k*frame_len + idx];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Float;

    #[test]
    fn temporal_adjoint_matches_inner_products() {
        let shape = Shape::new(2, 2, 3);
        let u = DVector::<Float>::from_fn(shape.len(), |i, _| ((3*i) % 5) as Float - 2.0);
        let v = DVector::<Float>::from_fn(shape.len(), |i, _| (i % 4) as Float);
        let lhs = TemporalDifference.forward(&u, &shape).dot(&v);
        let rhs = u.dot(&TemporalDifference.adjoint(&v, &shape));
        assert!((lhs - rhs).abs() < 1e-12);
    }

    #[test]
    fn static_scene_has_zero_temporal_difference() {
        let shape = Shape::new(2, 2, 3);
        let u = DVector::<Float>::from_fn(shape.len(), |i, _| (i % shape.frame_len()) as Float);
        assert_eq!(TemporalDifference.forward(&u, &shape).amax(), 0.0);
    }
}
