use super::*;
use crate::{assert, debug_assert};
use core::marker::PhantomData;

/// Immutable view over a matrix, similar to an immutable reference to a 2D strided
/// [prim@slice].
///
/// Strides are signed, so a view may walk its storage backwards. Transposed and reversed views
/// are obtained without touching the data.
#[repr(C)]
pub struct MatRef<'a, E> {
    pub(super) inner: MatImpl<E>,
    pub(super) __marker: PhantomData<&'a E>,
}

impl<E> Clone for MatRef<'_, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for MatRef<'_, E> {}

unsafe impl<E: Sync> Sync for MatRef<'_, E> {}
unsafe impl<E: Sync> Send for MatRef<'_, E> {}

impl<'short, E> Reborrow<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'short, E> ReborrowMut<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        *self
    }
}

impl<E> IntoConst for MatRef<'_, E> {
    type Target = Self;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<'a, E> MatRef<'a, E> {
    #[inline(always)]
    pub(crate) unsafe fn __from_raw_parts(
        ptr: *const E,
        nrows: usize,
        ncols: usize,
        row_stride: isize,
        col_stride: isize,
    ) -> Self {
        Self {
            inner: MatImpl {
                ptr: NonNull::new_unchecked(ptr as *mut E),
                nrows,
                ncols,
                row_stride,
                col_stride,
            },
            __marker: PhantomData,
        }
    }

    /// Returns a pointer to the first element of the matrix.
    #[inline(always)]
    pub fn as_ptr(self) -> *const E {
        self.inner.ptr.as_ptr()
    }

    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.inner.nrows
    }

    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.inner.ncols
    }

    /// Returns `(nrows, ncols)`.
    #[inline(always)]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    /// Offset between the first elements of two consecutive rows.
    #[inline(always)]
    pub fn row_stride(&self) -> isize {
        self.inner.row_stride
    }

    /// Offset between the first elements of two consecutive columns.
    #[inline(always)]
    pub fn col_stride(&self) -> isize {
        self.inner.col_stride
    }

    /// Returns a pointer to the element at the given indices. The pointer may only be
    /// dereferenced when the indices are within bounds.
    #[inline(always)]
    pub fn ptr_at(self, row: usize, col: usize) -> *const E {
        self.inner.ptr_at(row, col)
    }

    /// Returns a reference to the element at the given indices.
    ///
    /// # Panics
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub fn get(self, row: usize, col: usize) -> &'a E {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { &*self.ptr_at(row, col) }
    }

    /// Reads the value of the element at the given indices, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E
    where
        E: Copy,
    {
        *(*self).get(row, col)
    }

    /// Reads the value of the element at the given indices, without bound checks.
    ///
    /// # Safety
    /// `row < self.nrows()` and `col < self.ncols()` must hold.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn read_unchecked(&self, row: usize, col: usize) -> E
    where
        E: Copy,
    {
        debug_assert!(all(row < self.nrows(), col < self.ncols()));
        *self.ptr_at(row, col)
    }

    /// Returns a view over the transpose of `self`.
    #[inline(always)]
    #[must_use]
    pub fn transpose(self) -> Self {
        unsafe {
            Self::__from_raw_parts(
                self.as_ptr(),
                self.ncols(),
                self.nrows(),
                self.col_stride(),
                self.row_stride(),
            )
        }
    }

    /// Returns a view over `self`, with the rows in reversed order.
    #[inline(always)]
    #[must_use]
    pub fn reverse_rows(self) -> Self {
        let ptr = self.ptr_at(self.nrows().saturating_sub(1), 0);
        unsafe {
            Self::__from_raw_parts(
                ptr,
                self.nrows(),
                self.ncols(),
                self.row_stride().wrapping_neg(),
                self.col_stride(),
            )
        }
    }

    /// Returns a view over `self`, with the columns in reversed order.
    #[inline(always)]
    #[must_use]
    pub fn reverse_cols(self) -> Self {
        let ptr = self.ptr_at(0, self.ncols().saturating_sub(1));
        unsafe {
            Self::__from_raw_parts(
                ptr,
                self.nrows(),
                self.ncols(),
                self.row_stride(),
                self.col_stride().wrapping_neg(),
            )
        }
    }

    /// Returns a view over `self`, with the rows and the columns in reversed order.
    #[inline(always)]
    #[must_use]
    pub fn reverse_rows_and_cols(self) -> Self {
        self.reverse_rows().reverse_cols()
    }

    /// Returns a view over the submatrix starting at indices `(row_start, col_start)`, and with
    /// dimensions `(nrows, ncols)`.
    ///
    /// # Panics
    /// Panics if the submatrix does not fit inside `self`.
    #[track_caller]
    #[inline(always)]
    pub fn submatrix(self, row_start: usize, col_start: usize, nrows: usize, ncols: usize) -> Self {
        assert!(all(row_start <= self.nrows(), col_start <= self.ncols()));
        assert!(all(
            nrows <= self.nrows() - row_start,
            ncols <= self.ncols() - col_start,
        ));
        unsafe {
            Self::__from_raw_parts(
                self.ptr_at(row_start, col_start),
                nrows,
                ncols,
                self.row_stride(),
                self.col_stride(),
            )
        }
    }

    /// Returns a view over the rows `row_start..row_start + nrows`.
    #[track_caller]
    #[inline(always)]
    pub fn subrows(self, row_start: usize, nrows: usize) -> Self {
        let ncols = self.ncols();
        self.submatrix(row_start, 0, nrows, ncols)
    }

    /// Returns a view over the columns `col_start..col_start + ncols`.
    #[track_caller]
    #[inline(always)]
    pub fn subcols(self, col_start: usize, ncols: usize) -> Self {
        let nrows = self.nrows();
        self.submatrix(0, col_start, nrows, ncols)
    }

    /// Returns a view over the column at the given index, as an `nrows×1` matrix.
    #[track_caller]
    #[inline(always)]
    pub fn col(self, col: usize) -> Self {
        assert!(col < self.ncols());
        self.subcols(col, 1)
    }

    /// Returns a view over the row at the given index, as a `1×ncols` matrix.
    #[track_caller]
    #[inline(always)]
    pub fn row(self, row: usize) -> Self {
        assert!(row < self.nrows());
        self.subrows(row, 1)
    }

    /// Splits the matrix horizontally at the given row into a top and a bottom part.
    #[track_caller]
    #[inline(always)]
    pub fn split_at_row(self, row: usize) -> (Self, Self) {
        assert!(row <= self.nrows());
        let nrows = self.nrows();
        (self.subrows(0, row), self.subrows(row, nrows - row))
    }

    /// Splits the matrix vertically at the given column into a left and a right part.
    #[track_caller]
    #[inline(always)]
    pub fn split_at_col(self, col: usize) -> (Self, Self) {
        assert!(col <= self.ncols());
        let ncols = self.ncols();
        (self.subcols(0, col), self.subcols(col, ncols - col))
    }

    /// Splits the matrix into four corners, in the order top left, top right, bottom left,
    /// bottom right.
    #[track_caller]
    #[inline(always)]
    pub fn split_at(self, row: usize, col: usize) -> (Self, Self, Self, Self) {
        let (top, bot) = self.split_at_row(row);
        let (top_left, top_right) = top.split_at_col(col);
        let (bot_left, bot_right) = bot.split_at_col(col);
        (top_left, top_right, bot_left, bot_right)
    }

    #[inline(always)]
    pub fn as_ref(&self) -> MatRef<'_, E> {
        *self
    }

    /// Returns a mutable view over the same data.
    ///
    /// # Safety
    /// The data must not be accessed through any other view while the returned view is alive,
    /// and it must actually be writable.
    #[inline(always)]
    pub unsafe fn const_cast(self) -> MatMut<'a, E> {
        MatMut::__from_raw_parts(
            self.as_ptr() as *mut E,
            self.nrows(),
            self.ncols(),
            self.row_stride(),
            self.col_stride(),
        )
    }
}

impl<E: RealField> MatRef<'_, E> {
    /// Returns an owning [`Mat`] of the data.
    pub fn to_owned(&self) -> Mat<E> {
        Mat::from_fn(self.nrows(), self.ncols(), |i, j| self.read(i, j))
    }

    /// Returns `true` if all the elements are finite.
    pub fn is_all_finite(&self) -> bool {
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                if !self.read(i, j).is_finite() {
                    return false;
                }
            }
        }
        true
    }

    /// Returns the maximum absolute value of the elements.
    #[inline]
    pub fn norm_max(&self) -> E {
        crate::linalg::reductions::norm_max(*self)
    }

    /// Returns the Frobenius norm, computed without intermediate overflow.
    #[inline]
    pub fn norm_l2(&self) -> E {
        crate::linalg::reductions::norm_l2(*self)
    }
}
