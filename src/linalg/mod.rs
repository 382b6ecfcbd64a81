//! Linear algebra routines.
//!
//! # Memory allocation
//! Routines of this module never allocate. Those that need temporary space take a [`stack:
//! PodStack`](dyn_stack::PodStack) parameter, a thin wrapper over a slice of bytes that may come
//! from any source (heap allocation, array on the stack, etc.). Each such function has a
//! companion function with a similar name ending in `_req` that returns the memory requirements
//! of the algorithm, for example
//! [`householder::apply_block_householder_on_the_left_in_place`] and
//! [`householder::apply_block_householder_on_the_left_in_place_req`].
//!
//! Requirements may be combined with [`StackReq::try_all_of`] (the routines run one after the
//! other while holding both workspaces) or [`StackReq::try_any_of`] (only one workspace is held
//! at a time), so that a single allocation serves a whole pipeline. The simplest way to allocate
//! the memory is through [`dyn_stack::GlobalPodBuffer::new`].

use crate::{
    mat::{from_column_major_slice_mut, MatMut, MatRef},
    RealField,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};

pub mod matmul;
pub mod reductions;

pub mod householder;
pub mod jacobi;

pub mod evd;

/// Order in which a sequence of elementary transformations is composed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Increasing index order, `H = H(0) H(1) ... H(k-1)`.
    Forward,
    /// Decreasing index order, `H = H(k-1) ... H(1) H(0)`.
    Backward,
}

/// Returns the stack requirements for creating a temporary matrix with the given dimensions.
#[inline]
pub fn temp_mat_req<E: RealField>(nrows: usize, ncols: usize) -> Result<StackReq, SizeOverflow> {
    StackReq::try_new::<E>(nrows.checked_mul(ncols).ok_or(SizeOverflow)?)
}

/// Creates a temporary column-major matrix of untouched values, from the given memory stack.
#[track_caller]
pub fn temp_mat_uninit<E: RealField>(
    nrows: usize,
    ncols: usize,
    stack: PodStack<'_>,
) -> (MatMut<'_, E>, PodStack<'_>) {
    let (alloc, stack) = stack.make_raw::<E>(nrows * ncols);
    (from_column_major_slice_mut(alloc, nrows, ncols), stack)
}

/// Creates a temporary matrix of zero values, from the given memory stack.
#[track_caller]
pub fn temp_mat_zeroed<E: RealField>(
    nrows: usize,
    ncols: usize,
    stack: PodStack<'_>,
) -> (MatMut<'_, E>, PodStack<'_>) {
    let (mut mat, stack) = temp_mat_uninit::<E>(nrows, ncols, stack);
    mat.fill_zero();
    (mat, stack)
}

/// Reports, under the `perf-warn` feature, operands whose rows are contiguous while the routine
/// walks them by column.
#[inline(always)]
#[allow(unused_variables)]
pub(crate) fn warn_if_row_major<E>(routine: &str, matrix: MatRef<'_, E>) {
    #[cfg(feature = "perf-warn")]
    if matrix.nrows() > 1 && matrix.row_stride().unsigned_abs() != 1 {
        if matrix.col_stride().unsigned_abs() == 1 {
            log::warn!(
                target: "symevd_perf",
                "{routine} prefers column-major matrix. Found row-major matrix."
            );
        } else {
            log::warn!(
                target: "symevd_perf",
                "{routine} prefers column-major matrix. Found matrix with generic strides."
            );
        }
    }
}

#[cfg(test)]
macro_rules! make_stack {
    ($req: expr $(,)?) => {
        ::dyn_stack::PodStack::new(&mut ::dyn_stack::GlobalPodBuffer::new($req.unwrap()))
    };
}

#[cfg(test)]
pub(crate) use make_stack;
