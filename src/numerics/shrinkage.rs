extern crate nalgebra as na;

use na::DVector;
use serde::{Deserialize, Serialize};
use crate::{Float, GenericScalar};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TvNorm {
    /// `Σ |x| + |y|`
    Anisotropic,
    /// `Σ sqrt(|x|² + |y|²)`
    Isotropic
}

impl Default for TvNorm {
    fn default() -> TvNorm {
        TvNorm::Anisotropic
    }
}

/// Soft thresholding: `sign(v) * max(|v| - threshold, 0)`, with `sign(v) = v/|v|`
/// for complex values.
#[inline]
pub fn shrink<T: GenericScalar>(v: T, threshold: Float) -> T {
    let modulus = v.modulus();
    match modulus {
        m if m > threshold => v*T::from_real((m - threshold)/m),
        _ => T::zero()
    }
}

/// Shrinks the pair of difference fields with threshold `threshold`.
pub fn shrink_fields<T: GenericScalar>(vx: &DVector<T>, vy: &DVector<T>, threshold: Float, norm: TvNorm) -> (DVector<T>, DVector<T>) {
    match norm {
        TvNorm::Anisotropic => (vx.map(|v| shrink(v, threshold)), vy.map(|v| shrink(v, threshold))),
        TvNorm::Isotropic => {
            let mut wx = vx.clone();
            let mut wy = vy.clone();
            for i in 0..vx.nrows() {
                let magnitude = match (vx[i].modulus_squared() + vy[i].modulus_squared()).sqrt() {
                    m if m == 0.0 => 1.0,
                    m => m
                };
                let s = T::from_real((magnitude - threshold).max(0.0)/magnitude);
                wx[i] = vx[i]*s;
                wy[i] = vy[i]*s;
            }
            (wx, wy)
        }
    }
}

/// TV norm of the pair of fields.
pub fn tv_norm<T: GenericScalar>(wx: &DVector<T>, wy: &DVector<T>, norm: TvNorm) -> Float {
    match norm {
        TvNorm::Anisotropic => wx.iter().zip(wy.iter()).map(|(x, y)| x.modulus() + y.modulus()).sum(),
        TvNorm::Isotropic => wx.iter().zip(wy.iter()).map(|(x, y)| (x.modulus_squared() + y.modulus_squared()).sqrt()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::Complex;

    #[test]
    fn real_soft_threshold() {
        assert_eq!(shrink::<Float>(3.0, 1.0), 2.0);
        assert_eq!(shrink::<Float>(-3.0, 1.0), -2.0);
        assert_eq!(shrink::<Float>(0.5, 1.0), 0.0);
        assert_eq!(shrink::<Float>(-1.0, 1.0), 0.0);
    }

    #[test]
    fn complex_soft_threshold_keeps_phase() {
        let w = shrink(Complex::new(3.0, 4.0), 1.0);
        assert_relative_eq!(w.re, 2.4, epsilon = 1e-12);
        assert_relative_eq!(w.im, 3.2, epsilon = 1e-12);
    }

    #[test]
    fn isotropic_shrinks_pair_magnitude() {
        let vx = DVector::<Float>::from_vec(vec![3.0, 0.0, 0.1]);
        let vy = DVector::<Float>::from_vec(vec![4.0, 0.0, 0.1]);
        let (wx, wy) = shrink_fields(&vx, &vy, 1.0, TvNorm::Isotropic);
        assert_relative_eq!(wx[0], 2.4, epsilon = 1e-12);
        assert_relative_eq!(wy[0], 3.2, epsilon = 1e-12);
        assert_eq!((wx[1], wy[1]), (0.0, 0.0));
        assert_eq!((wx[2], wy[2]), (0.0, 0.0));
        assert_relative_eq!(tv_norm(&wx, &wy, TvNorm::Isotropic), 4.0, epsilon = 1e-12);
        assert_relative_eq!(tv_norm(&wx, &wy, TvNorm::Anisotropic), 5.6, epsilon = 1e-12);
    }
}
