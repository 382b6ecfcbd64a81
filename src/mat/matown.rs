use super::*;
use crate::{assert, linalg::matmul::matmul};
use core::ops::{Index, IndexMut, Mul};

/// Heap allocated matrix, stored in column-major order.
///
/// This type is a convenience for callers and tests. The routines of [`crate::linalg`] never
/// allocate and only operate on views.
#[derive(Clone)]
pub struct Mat<E> {
    data: Vec<E>,
    nrows: usize,
    ncols: usize,
}

impl<E: RealField> Mat<E> {
    /// Returns an empty `0×0` matrix.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            nrows: 0,
            ncols: 0,
        }
    }

    /// Returns a matrix of the given shape, with its elements computed by `f(row, col)`.
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> E) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }

    /// Returns a matrix of the given shape, filled with zeros.
    #[inline]
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self::from_fn(nrows, ncols, |_, _| E::zero())
    }

    /// Returns a matrix of the given shape, with ones on the diagonal and zeros elsewhere.
    #[inline]
    pub fn identity(nrows: usize, ncols: usize) -> Self {
        Self::from_fn(nrows, ncols, |i, j| if i == j { E::one() } else { E::zero() })
    }

    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline(always)]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    #[inline]
    pub fn as_ref(&self) -> MatRef<'_, E> {
        from_column_major_slice(&self.data, self.nrows, self.ncols)
    }

    #[inline]
    pub fn as_mut(&mut self) -> MatMut<'_, E> {
        from_column_major_slice_mut(&mut self.data, self.nrows, self.ncols)
    }

    /// Returns a view over the transpose of `self`.
    #[inline]
    pub fn transpose(&self) -> MatRef<'_, E> {
        self.as_ref().transpose()
    }

    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        self.as_ref().read(row, col)
    }

    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, row: usize, col: usize, value: E) {
        self.as_mut().write(row, col, value)
    }

    /// Returns the column at the given index as a slice.
    #[track_caller]
    pub fn col_as_slice(&self, col: usize) -> &[E] {
        assert!(col < self.ncols);
        &self.data[col * self.nrows..(col + 1) * self.nrows]
    }
}

impl<E: RealField> Default for Mat<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RealField> Index<(usize, usize)> for Mat<E> {
    type Output = E;

    #[track_caller]
    fn index(&self, (row, col): (usize, usize)) -> &E {
        self.as_ref().get(row, col)
    }
}

impl<E: RealField> IndexMut<(usize, usize)> for Mat<E> {
    #[track_caller]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut E {
        self.as_mut().get_mut(row, col)
    }
}

impl<E: RealField> Mul<MatRef<'_, E>> for MatRef<'_, E> {
    type Output = Mat<E>;

    #[track_caller]
    fn mul(self, rhs: MatRef<'_, E>) -> Mat<E> {
        assert!(self.ncols() == rhs.nrows());
        let mut out = Mat::zeros(self.nrows(), rhs.ncols());
        matmul(out.as_mut(), self, rhs, None, E::one());
        out
    }
}

impl<E: RealField> Mul<&Mat<E>> for &Mat<E> {
    type Output = Mat<E>;

    #[track_caller]
    fn mul(self, rhs: &Mat<E>) -> Mat<E> {
        self.as_ref() * rhs.as_ref()
    }
}

impl<E: RealField> Mul<MatRef<'_, E>> for &Mat<E> {
    type Output = Mat<E>;

    #[track_caller]
    fn mul(self, rhs: MatRef<'_, E>) -> Mat<E> {
        self.as_ref() * rhs
    }
}

impl<E: RealField> Mul<&Mat<E>> for Mat<E> {
    type Output = Mat<E>;

    #[track_caller]
    fn mul(self, rhs: &Mat<E>) -> Mat<E> {
        self.as_ref() * rhs.as_ref()
    }
}

impl<E: RealField> Mul<MatRef<'_, E>> for Mat<E> {
    type Output = Mat<E>;

    #[track_caller]
    fn mul(self, rhs: MatRef<'_, E>) -> Mat<E> {
        self.as_ref() * rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    #[test]
    fn product() {
        let a = Mat::from_fn(2, 3, |i, j| (i * 3 + j) as f64);
        let b = Mat::from_fn(3, 2, |i, j| if i == j { 1.0 } else { 2.0 });
        let c = &a * &b;
        assert!(c.shape() == (2, 2));
        // row 0 of a is [0, 1, 2]
        assert!(c[(0, 0)] == 0.0 + 2.0 + 4.0);
        assert!(c[(0, 1)] == 0.0 + 1.0 + 4.0);

        let gram = &a * a.transpose();
        assert!(gram.read(1, 0) == gram.read(0, 1));
        assert!(gram.read(1, 1) == 9.0 + 16.0 + 25.0);
    }

    #[test]
    fn identity_and_slices() {
        let mut id = Mat::<f64>::identity(3, 3);
        id[(2, 0)] = 5.0;
        assert!(id.col_as_slice(0) == &[1.0, 0.0, 5.0][..]);
        assert!(Mat::<f64>::new().shape() == (0, 0));
    }
}
