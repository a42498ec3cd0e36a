extern crate nalgebra as na;

use na::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use crate::GenericScalar;
use crate::error::{Error, Result};

pub mod gradient;
pub mod temporal;

pub use gradient::{GradientOperator, PeriodicDifference};
pub use temporal::{Identity, PreTransform, TemporalDifference};

/// Dimensions `p x q x r` (rows, columns, frames) of a volume stored as a
/// column-major `DVector`: element `(i,j,k)` lives at `i + p*(j + q*k)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
    pub frames: usize
}

impl Shape {
    pub fn new(rows: usize, cols: usize, frames: usize) -> Shape {
        Shape { rows, cols, frames }
    }

    pub fn image(rows: usize, cols: usize) -> Shape {
        Shape::new(rows, cols, 1)
    }

    pub fn signal(len: usize) -> Shape {
        Shape::new(len, 1, 1)
    }

    pub fn len(&self) -> usize {
        self.rows*self.cols*self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn frame_len(&self) -> usize {
        self.rows*self.cols
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.rows*(j + self.cols*k)
    }

    /// Frame `k` as a `rows x cols` matrix.
    pub fn frame<T: GenericScalar>(&self, volume: &DVector<T>, k: usize) -> Result<DMatrix<T>> {
        if volume.nrows() != self.len() {
            return Err(Error::OperatorShape(format!("volume has {} elements, shape {}x{}x{} needs {}", volume.nrows(), self.rows, self.cols, self.frames, self.len())));
        }
        if k >= self.frames {
            return Err(Error::OperatorShape(format!("frame {} requested from a volume of {} frames", k, self.frames)));
        }
        let offset = k*self.frame_len();
        Ok(DMatrix::<T>::from_column_slice(self.rows, self.cols, &volume.as_slice()[offset..offset + self.frame_len()]))
    }

    /// Stacks equally sized frames into one volume.
    pub fn from_frames<T: GenericScalar>(frames: &[DMatrix<T>]) -> Result<(Shape, DVector<T>)> {
        let first = frames.first().ok_or_else(|| Error::OperatorShape("no frames given".to_string()))?;
        let (rows, cols) = (first.nrows(), first.ncols());
        let shape = Shape::new(rows, cols, frames.len());
        let mut volume = DVector::<T>::zeros(shape.len());
        for (k, frame) in frames.iter().enumerate() {
            if (frame.nrows(), frame.ncols()) != (rows, cols) {
                return Err(Error::OperatorShape(format!("frame {} is {}x{}, expected {}x{}", k, frame.nrows(), frame.ncols(), rows, cols)));
            }
            let offset = k*shape.frame_len();
            volume.as_mut_slice()[offset..offset + shape.frame_len()].copy_from_slice(frame.as_slice());
        }
        Ok((shape, volume))
    }
}

/// Transform bundle used by one solve: the spatial difference pair `D`/`Dt`
/// applied after the pre-transform pair `T`/`Tt`.
pub struct TvOperators<T: GenericScalar> {
    pub gradient: Box<dyn GradientOperator<T>>,
    pub pre_transform: Box<dyn PreTransform<T>>
}

impl<T: GenericScalar> TvOperators<T> {
    pub fn new(gradient: Box<dyn GradientOperator<T>>, pre_transform: Box<dyn PreTransform<T>>) -> TvOperators<T> {
        TvOperators { gradient, pre_transform }
    }

    /// Circular spatial differences on the raw volume.
    pub fn periodic() -> TvOperators<T> {
        TvOperators::new(Box::new(PeriodicDifference), Box::new(Identity))
    }

    /// Circular spatial differences of circular temporal differences.
    pub fn temporal() -> TvOperators<T> {
        TvOperators::new(Box::new(PeriodicDifference), Box::new(TemporalDifference))
    }

    /// `D(T(u))`
    pub fn forward(&self, u: &DVector<T>, shape: &Shape) -> (DVector<T>, DVector<T>) {
        let transformed = self.pre_transform.forward(u, shape);
        self.gradient.forward(&transformed, shape)
    }

    /// `Tt(Dt(x, y))`
    pub fn adjoint(&self, x: &DVector<T>, y: &DVector<T>, shape: &Shape) -> DVector<T> {
        let v = self.gradient.adjoint(x, y, shape);
        self.pre_transform.adjoint(&v, shape)
    }
}

impl<T: GenericScalar> Default for TvOperators<T> {
    fn default() -> TvOperators<T> {
        TvOperators::periodic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Float;

    #[test]
    fn frames_round_trip_through_volume() {
        let a = DMatrix::<Float>::from_fn(2, 3, |i, j| (i + 10*j) as Float);
        let b = DMatrix::<Float>::from_fn(2, 3, |i, j| -((i + 10*j) as Float));
        let (shape, volume) = Shape::from_frames(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(shape, Shape::new(2, 3, 2));
        assert_eq!(volume[shape.index(1, 2, 1)], b[(1, 2)]);
        assert_eq!(shape.frame(&volume, 0).unwrap(), a);
        assert_eq!(shape.frame(&volume, 1).unwrap(), b);
    }

    #[test]
    fn malformed_frames_are_rejected() {
        let a = DMatrix::<Float>::zeros(2, 3);
        let c = DMatrix::<Float>::zeros(3, 2);
        assert!(matches!(Shape::from_frames::<Float>(&[]), Err(Error::OperatorShape(_))));
        assert!(matches!(Shape::from_frames(&[a.clone(), c]), Err(Error::OperatorShape(_))));

        let (shape, volume) = Shape::from_frames(&[a]).unwrap();
        assert!(matches!(shape.frame(&volume, 1), Err(Error::OperatorShape(_))));
        let short = DVector::<Float>::zeros(4);
        assert!(matches!(shape.frame(&short, 0), Err(Error::OperatorShape(_))));
    }
}
