//! Eigenvalue decomposition of a real symmetric matrix.
//!
//! The eigenvalue decomposition of a symmetric matrix $A$ of shape $(n, n)$ is a decomposition
//! into two components $U$, $S$:
//!
//! - $U$ has shape $(n, n)$ and is orthogonal,
//! - $S$ has shape $(n, n)$ and is a real diagonal matrix,
//! - and finally:
//!
//! $$A = U S U^T.$$
//!
//! It is computed in three steps: $A$ is reduced to a tridiagonal matrix $T = Q^T A Q$
//! ([`tridiag`]), $Q$ is formed explicitly from its reflectors ([`reconstruct`]), and the
//! eigenpairs of $T$ are found by the QL/QR algorithm ([`tridiag_qr_algorithm`]), which
//! multiplies $Q$ by the eigenvectors of $T$.

use crate::{
    assert,
    error::{check_len, check_shape, check_square, ArgumentError},
    linalg::{
        reductions::{rescale_unchecked, symmetric_norm, NormKind},
        temp_mat_req, temp_mat_uninit, warn_if_row_major,
    },
    mat::col_from_slice_mut,
    MatMut, MatRef, RealField, Side,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use reborrow::*;

pub mod eigen_2x2;
pub mod reconstruct;
pub mod tridiag;
pub mod tridiag_qr_algorithm;

pub use tridiag_qr_algorithm::{
    compute_tridiag_eigenvalues, compute_tridiag_eigenvectors, compute_tridiag_eigenvectors_req,
    Convergence, TridiagQr, TridiagQrParams,
};

/// Indicates whether the eigenvectors are computed or skipped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ComputeVectors {
    /// Do not compute the eigenvectors.
    No,
    /// Do compute the eigenvectors.
    Yes,
}

/// Symmetric eigendecomposition tuning parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SymmetricEvdParams<E> {
    /// Parameters of the tridiagonal eigensolver.
    pub solver: TridiagQrParams<E>,
}

impl<E: RealField> Default for SymmetricEvdParams<E> {
    fn default() -> Self {
        Self {
            solver: TridiagQrParams::default(),
        }
    }
}

/// Computes the size and alignment of required workspace for performing a symmetric eigenvalue
/// decomposition. The eigenvectors may be optionally computed.
pub fn compute_symmetric_evd_req<E: RealField>(
    n: usize,
    compute_vectors: ComputeVectors,
) -> Result<StackReq, SizeOverflow> {
    let n1 = n.saturating_sub(1);
    let reduction =
        StackReq::try_all_of([StackReq::try_new::<E>(n1)?, StackReq::try_new::<E>(n1)?])?;

    match compute_vectors {
        // the reduction is done in a temporary copy
        ComputeVectors::No => StackReq::try_all_of([reduction, temp_mat_req::<E>(n, n)?]),
        // the reduction is done in the eigenvector matrix
        ComputeVectors::Yes => StackReq::try_all_of([
            reduction,
            StackReq::try_any_of([
                reconstruct::orthogonal_from_tridiag_in_place_req::<E>(n)?,
                compute_tridiag_eigenvectors_req::<E>(n)?,
            ])?,
        ]),
    }
}

/// Returns the column range of the `side` half of an `n×n` matrix, in column `j`.
#[inline]
fn half_col_range(side: Side, n: usize, j: usize) -> (usize, usize) {
    match side {
        Side::Lower => (j, n),
        Side::Upper => (0, j + 1),
    }
}

/// Copies the `side` half of `src` into `dst`, scaling it from `cfrom` to `cto` if a scale is
/// given.
fn copy_half<E: RealField>(
    side: Side,
    dst: MatMut<'_, E>,
    src: MatRef<'_, E>,
    scale: Option<(E, E)>,
) {
    let mut dst = dst;
    let n = src.nrows();
    for j in 0..n {
        let (start, end) = half_col_range(side, n, j);
        for i in start..end {
            dst.write(i, j, src.read(i, j));
        }
        if let Some((cfrom, cto)) = scale {
            rescale_unchecked(cfrom, cto, dst.rb_mut().submatrix_mut(start, j, end - start, 1));
        }
    }
}

/// Computes the eigenvalue decomposition of the symmetric matrix `a`. Only the `side` half of
/// the matrix is accessed.
///
/// `eigenvalues` represents the diagonal of the matrix $S$, and must have length equal to the
/// dimension of the matrix.
///
/// If `eigenvectors` is `None`, then only the eigenvalues are computed. Otherwise, the
/// eigenvectors are computed and stored in its columns, column `j` matching `eigenvalues[j]`.
///
/// The matrix is scaled beforehand when its entries are so small or so large that the iteration
/// could underflow or overflow, and the eigenvalues are scaled back afterwards.
///
/// On convergence, the eigenvalues are sorted in ascending order. If the iteration fails to
/// converge, the outputs are left in the unsorted state of the iteration. If `a` has non-finite
/// entries, the outputs are filled with NaN and no iteration is performed.
///
/// # Errors
/// Returns an error, leaving every argument untouched, if `a` is not square, if `eigenvalues`
/// does not have length `n`, if `eigenvectors` is not `n×n`, or if the solver tolerance is not
/// positive and finite.
///
/// # Panics
/// Panics if the provided memory in `stack` is insufficient (see
/// [`compute_symmetric_evd_req`]).
pub fn compute_symmetric_evd<E: RealField>(
    side: Side,
    a: MatRef<'_, E>,
    eigenvalues: &mut [E],
    eigenvectors: Option<MatMut<'_, E>>,
    params: SymmetricEvdParams<E>,
    stack: PodStack<'_>,
) -> Result<Convergence, ArgumentError> {
    const ROUTINE: &str = "compute_symmetric_evd";
    check_square(ROUTINE, 2, a.shape())?;
    let n = a.nrows();
    check_len(ROUTINE, 3, n, eigenvalues.len())?;
    if let Some(u) = &eigenvectors {
        check_shape(ROUTINE, 4, (n, n), u.shape())?;
    }
    tridiag_qr_algorithm::check_params(ROUTINE, 5, &params.solver)?;
    warn_if_row_major(ROUTINE, a);

    let mut eigenvectors = eigenvectors;

    let anorm = symmetric_norm(NormKind::Max, side, a);
    if !anorm.is_finite() {
        log::warn!("{ROUTINE}: the input matrix has non-finite entries");
        eigenvalues.fill(E::nan());
        if let Some(u) = &mut eigenvectors {
            u.fill(E::nan());
        }
        return Ok(Convergence::NotConverged { sweeps: 0 });
    }
    if n == 0 {
        return Ok(Convergence::Converged { sweeps: 0 });
    }

    let small = (E::safe_min() / E::eps()).sqrt();
    let large = small.recip();
    let scale = if anorm > E::zero() && anorm < small {
        Some((anorm, small))
    } else if anorm > large {
        Some((anorm, large))
    } else {
        None
    };
    if let Some((_, target)) = scale {
        log::debug!("{ROUTINE}: matrix rescaled from {anorm:?} to {target:?}");
    }

    let (offdiag, stack) = stack.make_raw::<E>(n - 1);
    let (tau, mut stack) = stack.make_raw::<E>(n - 1);

    let convergence = match &mut eigenvectors {
        Some(u) => {
            copy_half(side, u.rb_mut(), a, scale);
            tridiag::tridiagonalize_in_place(side, u.rb_mut(), eigenvalues, offdiag, tau)?;
            reconstruct::orthogonal_from_tridiag_in_place(side, u.rb_mut(), tau, stack.rb_mut())?;
            compute_tridiag_eigenvectors(
                eigenvalues,
                offdiag,
                u.rb_mut(),
                params.solver,
                stack.rb_mut(),
            )?
        }
        None => {
            let (mut work, _) = temp_mat_uninit::<E>(n, n, stack);
            copy_half(side, work.rb_mut(), a, scale);
            tridiag::tridiagonalize_in_place(side, work.rb_mut(), eigenvalues, offdiag, tau)?;
            compute_tridiag_eigenvalues(eigenvalues, offdiag, params.solver)?
        }
    };

    if let Some((cfrom, cto)) = scale {
        rescale_unchecked(cto, cfrom, col_from_slice_mut(eigenvalues));
    }
    if convergence.is_converged() {
        sort_eigenpairs(eigenvalues, eigenvectors);
    }

    Ok(convergence)
}

/// Sorts `values` in ascending order, applying the same permutation to the columns of `vectors`.
///
/// # Panics
/// Panics if `vectors` does not have `values.len()` columns.
#[track_caller]
pub fn sort_eigenpairs<E: RealField>(values: &mut [E], vectors: Option<MatMut<'_, E>>) {
    let n = values.len();
    let mut vectors = vectors;
    if let Some(u) = &vectors {
        assert!(u.ncols() == n);
    }

    // selection sort, so that each column is swapped at most once
    for i in 0..n {
        let mut k = i;
        for j in i + 1..n {
            if values[j] < values[k] {
                k = j;
            }
        }
        if k != i {
            values.swap(i, k);
            if let Some(u) = &mut vectors {
                u.swap_cols(i, k);
            }
        }
    }
}
