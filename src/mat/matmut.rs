use super::*;
use crate::{assert, debug_assert};
use core::marker::PhantomData;

/// Mutable view over a matrix, similar to a mutable reference to a 2D strided [prim@slice].
///
/// Methods that return subviews consume `self`. Use [`ReborrowMut::rb_mut`] to keep using the
/// original view afterwards, and [`Reborrow::rb`] to obtain a temporary [`MatRef`].
#[repr(C)]
pub struct MatMut<'a, E> {
    pub(super) inner: MatImpl<E>,
    pub(super) __marker: PhantomData<&'a mut E>,
}

unsafe impl<E: Sync> Sync for MatMut<'_, E> {}
unsafe impl<E: Send> Send for MatMut<'_, E> {}

impl<'short, E> Reborrow<'short> for MatMut<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        MatRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'short, E> ReborrowMut<'short> for MatMut<'_, E> {
    type Target = MatMut<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        MatMut {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'a, E> IntoConst for MatMut<'a, E> {
    type Target = MatRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        MatRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'a, E> MatMut<'a, E> {
    #[inline(always)]
    pub(crate) unsafe fn __from_raw_parts(
        ptr: *mut E,
        nrows: usize,
        ncols: usize,
        row_stride: isize,
        col_stride: isize,
    ) -> Self {
        Self {
            inner: MatImpl {
                ptr: NonNull::new_unchecked(ptr),
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
    pub fn as_ptr_mut(self) -> *mut E {
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
    pub fn ptr_at_mut(self, row: usize, col: usize) -> *mut E {
        self.inner.ptr_at(row, col)
    }

    /// Reads the value of the element at the given indices, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E
    where
        E: Copy,
    {
        self.rb().read(row, col)
    }

    /// Writes the value to the element at the given indices, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, row: usize, col: usize, value: E) {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { *self.inner.ptr_at(row, col) = value };
    }

    /// Writes the value to the element at the given indices, without bound checks.
    ///
    /// # Safety
    /// `row < self.nrows()` and `col < self.ncols()` must hold.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn write_unchecked(&mut self, row: usize, col: usize, value: E) {
        debug_assert!(all(row < self.nrows(), col < self.ncols()));
        *self.inner.ptr_at(row, col) = value;
    }

    /// Returns a mutable reference to the element at the given indices.
    #[inline(always)]
    #[track_caller]
    pub fn get_mut(self, row: usize, col: usize) -> &'a mut E {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { &mut *self.inner.ptr_at(row, col) }
    }

    /// Fills the elements of `self` with `constant`.
    #[inline]
    pub fn fill(&mut self, constant: E)
    where
        E: Copy,
    {
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                unsafe { self.write_unchecked(i, j, constant) };
            }
        }
    }

    /// Copies the values from `other` into `self`.
    ///
    /// # Panics
    /// Panics if the two matrices do not have the same shape.
    #[track_caller]
    pub fn copy_from(&mut self, other: MatRef<'_, E>)
    where
        E: Copy,
    {
        assert!(all(self.nrows() == other.nrows(), self.ncols() == other.ncols()));
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                unsafe { self.write_unchecked(i, j, other.read_unchecked(i, j)) };
            }
        }
    }

    /// Swaps the values of the columns `a` and `b`.
    #[track_caller]
    pub fn swap_cols(&mut self, a: usize, b: usize)
    where
        E: Copy,
    {
        assert!(all(a < self.ncols(), b < self.ncols()));
        if a == b {
            return;
        }
        for i in 0..self.nrows() {
            let x = self.read(i, a);
            let y = self.read(i, b);
            self.write(i, a, y);
            self.write(i, b, x);
        }
    }

    /// Returns a view over the transpose of `self`.
    #[inline(always)]
    #[must_use]
    pub fn transpose_mut(self) -> Self {
        unsafe { self.into_const().transpose().const_cast() }
    }

    /// Returns a view over `self`, with the rows in reversed order.
    #[inline(always)]
    #[must_use]
    pub fn reverse_rows_mut(self) -> Self {
        unsafe { self.into_const().reverse_rows().const_cast() }
    }

    /// Returns a view over `self`, with the columns in reversed order.
    #[inline(always)]
    #[must_use]
    pub fn reverse_cols_mut(self) -> Self {
        unsafe { self.into_const().reverse_cols().const_cast() }
    }

    /// Returns a view over `self`, with the rows and the columns in reversed order.
    #[inline(always)]
    #[must_use]
    pub fn reverse_rows_and_cols_mut(self) -> Self {
        unsafe { self.into_const().reverse_rows_and_cols().const_cast() }
    }

    /// Returns a view over the submatrix starting at indices `(row_start, col_start)`, and with
    /// dimensions `(nrows, ncols)`.
    #[track_caller]
    #[inline(always)]
    pub fn submatrix_mut(
        self,
        row_start: usize,
        col_start: usize,
        nrows: usize,
        ncols: usize,
    ) -> Self {
        unsafe {
            self.into_const()
                .submatrix(row_start, col_start, nrows, ncols)
                .const_cast()
        }
    }

    /// Returns a view over the rows `row_start..row_start + nrows`.
    #[track_caller]
    #[inline(always)]
    pub fn subrows_mut(self, row_start: usize, nrows: usize) -> Self {
        unsafe { self.into_const().subrows(row_start, nrows).const_cast() }
    }

    /// Returns a view over the columns `col_start..col_start + ncols`.
    #[track_caller]
    #[inline(always)]
    pub fn subcols_mut(self, col_start: usize, ncols: usize) -> Self {
        unsafe { self.into_const().subcols(col_start, ncols).const_cast() }
    }

    /// Returns a view over the column at the given index, as an `nrows×1` matrix.
    #[track_caller]
    #[inline(always)]
    pub fn col_mut(self, col: usize) -> Self {
        unsafe { self.into_const().col(col).const_cast() }
    }

    /// Returns a view over the row at the given index, as a `1×ncols` matrix.
    #[track_caller]
    #[inline(always)]
    pub fn row_mut(self, row: usize) -> Self {
        unsafe { self.into_const().row(row).const_cast() }
    }

    /// Splits the matrix horizontally at the given row into a top and a bottom part.
    #[track_caller]
    #[inline(always)]
    pub fn split_at_row_mut(self, row: usize) -> (Self, Self) {
        let (top, bot) = self.into_const().split_at_row(row);
        unsafe { (top.const_cast(), bot.const_cast()) }
    }

    /// Splits the matrix vertically at the given column into a left and a right part.
    #[track_caller]
    #[inline(always)]
    pub fn split_at_col_mut(self, col: usize) -> (Self, Self) {
        let (left, right) = self.into_const().split_at_col(col);
        unsafe { (left.const_cast(), right.const_cast()) }
    }

    /// Splits the matrix into four corners, in the order top left, top right, bottom left,
    /// bottom right.
    #[track_caller]
    #[inline(always)]
    pub fn split_at_mut(self, row: usize, col: usize) -> (Self, Self, Self, Self) {
        let (top_left, top_right, bot_left, bot_right) = self.into_const().split_at(row, col);
        unsafe {
            (
                top_left.const_cast(),
                top_right.const_cast(),
                bot_left.const_cast(),
                bot_right.const_cast(),
            )
        }
    }

    #[inline(always)]
    pub fn as_ref(&self) -> MatRef<'_, E> {
        self.rb()
    }

    #[inline(always)]
    pub fn as_mut(&mut self) -> MatMut<'_, E> {
        self.rb_mut()
    }
}

impl<E: RealField> MatMut<'_, E> {
    /// Fills the elements of `self` with zeros.
    #[inline]
    pub fn fill_zero(&mut self) {
        self.fill(E::zero());
    }

    /// Sets `self` to the identity: ones on the diagonal, zeros elsewhere.
    pub fn fill_identity(&mut self) {
        self.fill_zero();
        for i in 0..Ord::min(self.nrows(), self.ncols()) {
            self.write(i, i, E::one());
        }
    }
}
