extern crate nalgebra as na;
extern crate nalgebra_sparse;

use na::DVector;
use nalgebra_sparse::CsrMatrix;
use crate::GenericScalar;
use super::LinearOperator;

impl<T: GenericScalar> LinearOperator<T> for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }

    fn ncols(&self) -> usize {
        self.ncols()
    }

    fn forward(&self, x: &DVector<T>) -> DVector<T> {
        self*x
    }

    // nalgebra-sparse has no conjugate-transpose product, so A^H y is accumulated row by row.
    fn adjoint(&self, y: &DVector<T>) -> DVector<T> {
        let mut x = DVector::<T>::zeros(self.ncols());
        for (i, row) in self.row_iter().enumerate() {
            let y_i = y[i];
            for (&j, &v) in row.col_indices().iter().zip(row.values().iter()) {
                x[j] += v.conjugate()*y_i;
            }
        }
        x
    }
}
