//! Matrix views and owned matrices.
//!
//! [`MatRef`] and [`MatMut`] are thin views over strided memory: a pointer to the first
//! element, the dimensions, and a signed stride per axis. Transposing or reversing a view only
//! rewrites this metadata, which lets the kernels of [`crate::linalg`] handle every storage
//! order and every traversal direction with a single code path.

use crate::{
    error::{ArgumentError, ArgumentErrorKind},
    RealField,
};
use core::ptr::NonNull;
use reborrow::*;

mod matmut;
mod matown;
mod matref;

pub use matmut::MatMut;
pub use matown::Mat;
pub use matref::MatRef;

pub(crate) struct MatImpl<E> {
    pub(crate) ptr: NonNull<E>,
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
    pub(crate) row_stride: isize,
    pub(crate) col_stride: isize,
}

impl<E> Copy for MatImpl<E> {}
impl<E> Clone for MatImpl<E> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> MatImpl<E> {
    #[inline(always)]
    pub(crate) fn ptr_at(&self, row: usize, col: usize) -> *mut E {
        let offset = (row as isize)
            .wrapping_mul(self.row_stride)
            .wrapping_add((col as isize).wrapping_mul(self.col_stride));
        self.ptr.as_ptr().wrapping_offset(offset)
    }
}

/// Storage order of a dense matrix held in a slice with a leading dimension.
pub trait Layout {
    /// Smallest valid leading dimension for a matrix of the given shape.
    fn min_leading_dim(nrows: usize, ncols: usize) -> usize;

    /// `(row_stride, col_stride)` for the given leading dimension.
    fn strides(leading_dim: usize) -> (isize, isize);

    /// Number of slice elements spanned by the matrix, or `None` if it overflows `usize`.
    fn required_len(nrows: usize, ncols: usize, leading_dim: usize) -> Option<usize> {
        if nrows == 0 || ncols == 0 {
            return Some(0);
        }
        let (rs, cs) = Self::strides(leading_dim);
        let last_row = (nrows - 1).checked_mul(rs.unsigned_abs())?;
        let last_col = (ncols - 1).checked_mul(cs.unsigned_abs())?;
        last_row.checked_add(last_col)?.checked_add(1)
    }
}

/// Columns are contiguous, and consecutive columns are `leading_dim` elements apart.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ColMajor;

/// Rows are contiguous, and consecutive rows are `leading_dim` elements apart.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RowMajor;

impl Layout for ColMajor {
    #[inline]
    fn min_leading_dim(nrows: usize, _: usize) -> usize {
        Ord::max(nrows, 1)
    }

    #[inline]
    fn strides(leading_dim: usize) -> (isize, isize) {
        (1, leading_dim as isize)
    }
}

impl Layout for RowMajor {
    #[inline]
    fn min_leading_dim(_: usize, ncols: usize) -> usize {
        Ord::max(ncols, 1)
    }

    #[inline]
    fn strides(leading_dim: usize) -> (isize, isize) {
        (leading_dim as isize, 1)
    }
}

fn check_layout<L: Layout>(
    routine: &'static str,
    len: usize,
    nrows: usize,
    ncols: usize,
    leading_dim: usize,
) -> Result<(), ArgumentError> {
    let min = L::min_leading_dim(nrows, ncols);
    if leading_dim < min || leading_dim > isize::MAX as usize {
        return Err(ArgumentError::new(
            routine,
            4,
            ArgumentErrorKind::LeadingDimensionTooSmall {
                min,
                found: leading_dim,
            },
        ));
    }
    // a span that overflows cannot fit in any slice
    let required = L::required_len(nrows, ncols, leading_dim).unwrap_or(usize::MAX);
    if len < required {
        return Err(ArgumentError::new(
            routine,
            1,
            ArgumentErrorKind::SliceTooShort {
                required,
                found: len,
            },
        ));
    }
    Ok(())
}

/// Creates a `MatRef` over a slice holding a matrix in the storage order `L`, with the given
/// leading dimension.
///
/// # Errors
/// Returns an error if `leading_dim` is too small for the layout, or if the slice is too short
/// to hold the matrix.
pub fn from_slice_with_layout<E, L: Layout>(
    slice: &[E],
    nrows: usize,
    ncols: usize,
    leading_dim: usize,
) -> Result<MatRef<'_, E>, ArgumentError> {
    check_layout::<L>("from_slice_with_layout", slice.len(), nrows, ncols, leading_dim)?;
    let (rs, cs) = L::strides(leading_dim);
    Ok(unsafe { MatRef::__from_raw_parts(slice.as_ptr(), nrows, ncols, rs, cs) })
}

/// Creates a `MatMut` over a slice holding a matrix in the storage order `L`, with the given
/// leading dimension.
///
/// # Errors
/// Returns an error if `leading_dim` is too small for the layout, or if the slice is too short
/// to hold the matrix.
pub fn from_slice_with_layout_mut<E, L: Layout>(
    slice: &mut [E],
    nrows: usize,
    ncols: usize,
    leading_dim: usize,
) -> Result<MatMut<'_, E>, ArgumentError> {
    check_layout::<L>(
        "from_slice_with_layout_mut",
        slice.len(),
        nrows,
        ncols,
        leading_dim,
    )?;
    let (rs, cs) = L::strides(leading_dim);
    Ok(unsafe { MatMut::__from_raw_parts(slice.as_mut_ptr(), nrows, ncols, rs, cs) })
}

#[track_caller]
#[inline]
fn from_strided_column_major_slice_assert(nrows: usize, ncols: usize, col_stride: usize, len: usize) {
    crate::assert!(col_stride >= nrows);
    if nrows > 0 && ncols > 0 {
        let last = (ncols - 1)
            .checked_mul(col_stride)
            .and_then(|x| x.checked_add(nrows - 1));
        crate::assert!(last.map_or(false, |last| last < len));
    }
}

/// Creates a `MatRef` from a slice holding the matrix in column-major order.
///
/// # Panics
/// Panics if `nrows * ncols != slice.len()`.
#[track_caller]
#[inline]
pub fn from_column_major_slice<E>(slice: &[E], nrows: usize, ncols: usize) -> MatRef<'_, E> {
    crate::assert!(nrows.checked_mul(ncols) == Some(slice.len()));
    unsafe { MatRef::__from_raw_parts(slice.as_ptr(), nrows, ncols, 1, nrows as isize) }
}

/// Creates a `MatRef` from a slice holding the matrix in row-major order.
///
/// # Panics
/// Panics if `nrows * ncols != slice.len()`.
#[track_caller]
#[inline]
pub fn from_row_major_slice<E>(slice: &[E], nrows: usize, ncols: usize) -> MatRef<'_, E> {
    from_column_major_slice(slice, ncols, nrows).transpose()
}

/// Creates a `MatRef` from a slice holding the matrix in column-major order, where the
/// beginnings of two consecutive columns are `col_stride` elements apart.
#[track_caller]
pub fn from_column_major_slice_with_stride<E>(
    slice: &[E],
    nrows: usize,
    ncols: usize,
    col_stride: usize,
) -> MatRef<'_, E> {
    from_strided_column_major_slice_assert(nrows, ncols, col_stride, slice.len());
    unsafe { MatRef::__from_raw_parts(slice.as_ptr(), nrows, ncols, 1, col_stride as isize) }
}

/// Mutable version of [`from_column_major_slice`].
#[track_caller]
#[inline]
pub fn from_column_major_slice_mut<E>(
    slice: &mut [E],
    nrows: usize,
    ncols: usize,
) -> MatMut<'_, E> {
    crate::assert!(nrows.checked_mul(ncols) == Some(slice.len()));
    unsafe { MatMut::__from_raw_parts(slice.as_mut_ptr(), nrows, ncols, 1, nrows as isize) }
}

/// Mutable version of [`from_row_major_slice`].
#[track_caller]
#[inline]
pub fn from_row_major_slice_mut<E>(slice: &mut [E], nrows: usize, ncols: usize) -> MatMut<'_, E> {
    from_column_major_slice_mut(slice, ncols, nrows).transpose_mut()
}

/// Mutable version of [`from_column_major_slice_with_stride`].
#[track_caller]
pub fn from_column_major_slice_with_stride_mut<E>(
    slice: &mut [E],
    nrows: usize,
    ncols: usize,
    col_stride: usize,
) -> MatMut<'_, E> {
    from_strided_column_major_slice_assert(nrows, ncols, col_stride, slice.len());
    unsafe {
        MatMut::__from_raw_parts(slice.as_mut_ptr(), nrows, ncols, 1, col_stride as isize)
    }
}

/// Views a slice as a column vector.
#[inline]
pub fn col_from_slice<E>(slice: &[E]) -> MatRef<'_, E> {
    from_column_major_slice(slice, slice.len(), 1)
}

/// Views a mutable slice as a column vector.
#[inline]
pub fn col_from_slice_mut<E>(slice: &mut [E]) -> MatMut<'_, E> {
    let n = slice.len();
    from_column_major_slice_mut(slice, n, 1)
}

impl<E: RealField> PartialEq<MatRef<'_, E>> for MatRef<'_, E> {
    fn eq(&self, other: &MatRef<'_, E>) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                if self.read(i, j) != other.read(i, j) {
                    return false;
                }
            }
        }
        true
    }
}

impl<E: RealField> core::fmt::Debug for MatRef<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct DebugRow<'a, E: RealField>(MatRef<'a, E>);

        impl<E: RealField> core::fmt::Debug for DebugRow<'_, E> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut list = f.debug_list();
                for j in 0..self.0.ncols() {
                    list.entry(&self.0.read(0, j));
                }
                list.finish()
            }
        }

        let mut list = f.debug_list();
        for i in 0..self.nrows() {
            list.entry(&DebugRow(self.subrows(i, 1)));
        }
        list.finish()
    }
}

impl<E: RealField> core::fmt::Debug for MatMut<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.rb().fmt(f)
    }
}

impl<E: RealField> core::fmt::Debug for Mat<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.as_ref().fmt(f)
    }
}

impl<E: RealField> PartialEq for Mat<E> {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}
