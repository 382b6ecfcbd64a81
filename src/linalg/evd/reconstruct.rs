//! Explicit orthogonal factors from reflectors stored in place.

use crate::{
    error::{check_len, check_square, ArgumentError, ArgumentErrorKind},
    linalg::{
        householder::{
            apply_block_householder_on_the_left_in_place,
            apply_block_householder_on_the_left_in_place_req,
            apply_householder_on_the_left_in_place, apply_householder_on_the_left_in_place_req,
            make_householder_factor_forward, Storage,
        },
        temp_mat_req, temp_mat_uninit, warn_if_row_major, Direction,
    },
    mat::col_from_slice,
    MatMut, MatRef, RealField, Side,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use reborrow::*;

/// Returns the block size used to form the orthogonal factor of a matrix with the given
/// dimensions.
pub fn recommended_blocksize(nrows: usize, ncols: usize) -> usize {
    let prod = nrows * ncols;
    let size = Ord::min(nrows, ncols);

    (if prod > 128 * 128 {
        32
    } else if prod > 32 * 32 {
        16
    } else {
        8
    })
    .min(size)
    .max(1)
}

fn check_reflectors(
    routine: &'static str,
    (nrows, ncols): (usize, usize),
    n_reflectors: usize,
) -> Result<(), ArgumentError> {
    if nrows < ncols {
        return Err(ArgumentError::new(
            routine,
            1,
            ArgumentErrorKind::MoreColumnsThanRows { nrows, ncols },
        ));
    }
    if n_reflectors > ncols {
        return Err(ArgumentError::new(
            routine,
            2,
            ArgumentErrorKind::LengthTooLarge {
                max: ncols,
                found: n_reflectors,
            },
        ));
    }
    Ok(())
}

fn orthogonal_from_qr_unblocked<E: RealField>(
    a: MatMut<'_, E>,
    tau: MatRef<'_, E>,
    stack: PodStack<'_>,
) {
    let mut a = a;
    let mut stack = stack;
    let (m, n) = a.shape();
    let k = tau.nrows();

    for j in k..n {
        a.rb_mut().col_mut(j).fill_zero();
        a.write(j, j, E::one());
    }

    for i in (0..k).rev() {
        let tau_i = tau.read(i, 0);
        if i + 1 < n {
            let (left, right) = a.rb_mut().split_at_col_mut(i + 1);
            let essential = left.into_const().submatrix(i + 1, i, m - i - 1, 1);
            apply_householder_on_the_left_in_place(
                essential,
                tau_i,
                right.subrows_mut(i, m - i),
                stack.rb_mut(),
            );
        }
        for row in i + 1..m {
            a.write(row, i, -tau_i * a.read(row, i));
        }
        a.write(i, i, E::one() - tau_i);
        for row in 0..i {
            a.write(row, i, E::zero());
        }
    }
}

fn orthogonal_from_qr_impl<E: RealField>(a: MatMut<'_, E>, tau: MatRef<'_, E>, stack: PodStack<'_>) {
    let mut a = a;
    let mut stack = stack;
    let (m, n) = a.shape();
    let k = tau.nrows();
    let blocksize = recommended_blocksize(m, n);

    if k <= blocksize {
        orthogonal_from_qr_unblocked(a, tau, stack);
        return;
    }

    // the last block may be partial, the others are full
    let last = ((k - 1) / blocksize) * blocksize;
    let kk = Ord::min(k, last + blocksize);

    a.rb_mut().submatrix_mut(0, kk, kk, n - kk).fill_zero();
    if kk < n {
        orthogonal_from_qr_unblocked(
            a.rb_mut().submatrix_mut(kk, kk, m - kk, n - kk),
            tau.subrows(kk, k - kk),
            stack.rb_mut(),
        );
    }

    for i in (0..last + 1).step_by(blocksize).rev() {
        let bs = Ord::min(blocksize, k - i);
        let tau_block = tau.subrows(i, bs);
        let (mut basis, rest) = a
            .rb_mut()
            .submatrix_mut(i, i, m - i, n - i)
            .split_at_col_mut(bs);

        if i + bs < n {
            let (mut factor, stack) = temp_mat_uninit::<E>(bs, bs, stack.rb_mut());
            make_householder_factor_forward(basis.rb(), tau_block, factor.rb_mut());
            apply_block_householder_on_the_left_in_place(
                Direction::Forward,
                Storage::ByColumn,
                basis.rb(),
                factor.rb(),
                false,
                rest,
                stack,
            );
        }
        orthogonal_from_qr_unblocked(basis.rb_mut(), tau_block, stack.rb_mut());
        a.rb_mut().submatrix_mut(0, i, i, bs).fill_zero();
    }
}

/// Computes the size and alignment of required workspace for forming the orthogonal factor of a
/// QR or QL decomposition with the given dimensions.
pub fn orthogonal_from_qr_in_place_req<E: RealField>(
    nrows: usize,
    ncols: usize,
    n_reflectors: usize,
) -> Result<StackReq, SizeOverflow> {
    let _ = n_reflectors;
    let blocksize = recommended_blocksize(nrows, ncols);
    StackReq::try_any_of([
        StackReq::try_all_of([
            temp_mat_req::<E>(blocksize, blocksize)?,
            apply_block_householder_on_the_left_in_place_req::<E>(blocksize, ncols)?,
        ])?,
        apply_householder_on_the_left_in_place_req::<E>(nrows, ncols)?,
    ])
}

/// Overwrites the `m×n` matrix `a`, whose first `k = tau.len()` columns hold the reflectors of a
/// QR decomposition below the diagonal, with the first `n` columns of
/// $Q = H_0 H_1 \dots H_{k-1}$.
///
/// # Errors
/// Returns an error, leaving every argument untouched, if `a` has more columns than rows, or if
/// there are more reflectors than columns.
pub fn orthogonal_from_qr_in_place<E: RealField>(
    a: MatMut<'_, E>,
    tau: &[E],
    stack: PodStack<'_>,
) -> Result<(), ArgumentError> {
    check_reflectors("orthogonal_from_qr_in_place", a.shape(), tau.len())?;
    warn_if_row_major("orthogonal_from_qr_in_place", a.rb());
    orthogonal_from_qr_impl(a, col_from_slice(tau), stack);
    Ok(())
}

/// Computes the size and alignment of required workspace for forming the orthogonal factor of a
/// QL decomposition with the given dimensions.
pub fn orthogonal_from_ql_in_place_req<E: RealField>(
    nrows: usize,
    ncols: usize,
    n_reflectors: usize,
) -> Result<StackReq, SizeOverflow> {
    orthogonal_from_qr_in_place_req::<E>(nrows, ncols, n_reflectors)
}

/// Overwrites the `m×n` matrix `a`, whose last `k = tau.len()` columns hold the reflectors of a
/// QL decomposition above the `(m - k)`-th subdiagonal, with the last `n` columns of
/// $Q = H_{k-1} \dots H_1 H_0$.
///
/// Reflector $i$ has its unit component at row $m - k + i$, zeros below it, and its essential
/// part above it, in column $n - k + i$.
///
/// # Errors
/// Returns an error, leaving every argument untouched, if `a` has more columns than rows, or if
/// there are more reflectors than columns.
pub fn orthogonal_from_ql_in_place<E: RealField>(
    a: MatMut<'_, E>,
    tau: &[E],
    stack: PodStack<'_>,
) -> Result<(), ArgumentError> {
    check_reflectors("orthogonal_from_ql_in_place", a.shape(), tau.len())?;
    warn_if_row_major("orthogonal_from_ql_in_place", a.rb());
    orthogonal_from_qr_impl(
        a.reverse_rows_and_cols_mut(),
        col_from_slice(tau).reverse_rows(),
        stack,
    );
    Ok(())
}

/// Computes the size and alignment of required workspace for
/// [`orthogonal_from_tridiag_in_place`].
pub fn orthogonal_from_tridiag_in_place_req<E: RealField>(
    n: usize,
) -> Result<StackReq, SizeOverflow> {
    let n = n.saturating_sub(1);
    orthogonal_from_qr_in_place_req::<E>(n, n, n)
}

/// Overwrites `a`, as left by [`tridiagonalize_in_place`](super::tridiag::tridiagonalize_in_place)
/// called with the same `side`, with the orthogonal matrix $Q$ such that $A = Q T Q^T$.
///
/// The whole matrix is written to.
///
/// # Errors
/// Returns an error, leaving every argument untouched, if `a` is not square, or if `tau` does
/// not have length `n - 1` (`0` if `n == 0`).
pub fn orthogonal_from_tridiag_in_place<E: RealField>(
    side: Side,
    a: MatMut<'_, E>,
    tau: &[E],
    stack: PodStack<'_>,
) -> Result<(), ArgumentError> {
    const ROUTINE: &str = "orthogonal_from_tridiag_in_place";
    check_square(ROUTINE, 2, a.shape())?;
    let n = a.nrows();
    check_len(ROUTINE, 3, n.saturating_sub(1), tau.len())?;
    warn_if_row_major(ROUTINE, a.rb());

    if n == 0 {
        return Ok(());
    }

    let mut a = a;
    let tau = col_from_slice(tau);
    match side {
        Side::Upper => {
            // shift the reflectors one column to the left, and make the last row and column
            // those of the identity
            for j in 0..n - 1 {
                for i in 0..j {
                    a.write(i, j, a.read(i, j + 1));
                }
                a.write(n - 1, j, E::zero());
            }
            for i in 0..n - 1 {
                a.write(i, n - 1, E::zero());
            }
            a.write(n - 1, n - 1, E::one());

            orthogonal_from_qr_impl(
                a.submatrix_mut(0, 0, n - 1, n - 1).reverse_rows_and_cols_mut(),
                tau.reverse_rows(),
                stack,
            );
        }
        Side::Lower => {
            // shift the reflectors one column to the right, and make the first row and column
            // those of the identity
            for j in (1..n).rev() {
                a.write(0, j, E::zero());
                for i in j + 1..n {
                    a.write(i, j, a.read(i, j - 1));
                }
            }
            a.write(0, 0, E::one());
            for i in 1..n {
                a.write(i, 0, E::zero());
            }

            orthogonal_from_qr_impl(a.submatrix_mut(1, 1, n - 1, n - 1), tau, stack);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert,
        linalg::{evd::tridiag::tridiagonalize_in_place, make_stack},
        Mat,
    };
    use assert_approx_eq::assert_approx_eq;
    use rand::prelude::*;

    fn dense_reflector(v: &[f64], tau: f64) -> Mat<f64> {
        let n = v.len();
        Mat::from_fn(n, n, |i, j| {
            let id = if i == j { 1.0 } else { 0.0 };
            id - tau * v[i] * v[j]
        })
    }

    /// Returns the factor that makes `I - tau v vᵀ` orthogonal.
    fn orthogonal_tau(v: &[f64]) -> f64 {
        2.0 / v.iter().map(|x| x * x).sum::<f64>()
    }

    #[track_caller]
    fn assert_mat_approx_eq(lhs: MatRef<'_, f64>, rhs: MatRef<'_, f64>, tol: f64) {
        assert!(all(lhs.nrows() == rhs.nrows(), lhs.ncols() == rhs.ncols()));
        for j in 0..lhs.ncols() {
            for i in 0..lhs.nrows() {
                assert_approx_eq!(lhs.read(i, j), rhs.read(i, j), tol);
            }
        }
    }

    #[test]
    fn qr_factor_matches_product_of_reflectors() {
        let rng = &mut StdRng::seed_from_u64(0);
        for (m, n, k) in [(5, 4, 4), (6, 6, 3), (30, 24, 21), (40, 40, 39), (3, 0, 0)] {
            let a = Mat::from_fn(m, n, |_, _| rng.gen::<f64>() - 0.5);
            let mut tau = vec![0.0; k];

            let mut q = Mat::<f64>::identity(m, m);
            for i in 0..k {
                let v: Vec<f64> = (0..m)
                    .map(|row| match row.cmp(&i) {
                        core::cmp::Ordering::Less => 0.0,
                        core::cmp::Ordering::Equal => 1.0,
                        core::cmp::Ordering::Greater => a.read(row, i),
                    })
                    .collect();
                tau[i] = orthogonal_tau(&v);
                q = &q * &dense_reflector(&v, tau[i]);
            }

            let mut out = a.clone();
            orthogonal_from_qr_in_place(
                out.as_mut(),
                &tau,
                make_stack!(orthogonal_from_qr_in_place_req::<f64>(m, n, k)),
            )
            .unwrap();
            assert_mat_approx_eq(out.as_ref(), q.as_ref().subcols(0, n), 1e-12);
        }
    }

    #[test]
    fn ql_factor_matches_product_of_reflectors() {
        let rng = &mut StdRng::seed_from_u64(1);
        for (m, n, k) in [(5, 4, 4), (6, 6, 3), (30, 24, 21), (40, 40, 39)] {
            let a = Mat::from_fn(m, n, |_, _| rng.gen::<f64>() - 0.5);
            let mut tau = vec![0.0; k];

            let mut q = Mat::<f64>::identity(m, m);
            for i in 0..k {
                let unit = m - k + i;
                let v: Vec<f64> = (0..m)
                    .map(|row| match row.cmp(&unit) {
                        core::cmp::Ordering::Less => a.read(row, n - k + i),
                        core::cmp::Ordering::Equal => 1.0,
                        core::cmp::Ordering::Greater => 0.0,
                    })
                    .collect();
                tau[i] = orthogonal_tau(&v);
                q = &dense_reflector(&v, tau[i]) * &q;
            }

            let mut out = a.clone();
            orthogonal_from_ql_in_place(
                out.as_mut(),
                &tau,
                make_stack!(orthogonal_from_ql_in_place_req::<f64>(m, n, k)),
            )
            .unwrap();
            assert_mat_approx_eq(out.as_ref(), q.as_ref().subcols(m - n, n), 1e-12);
        }
    }

    #[test]
    fn tridiagonal_similarity() {
        let rng = &mut StdRng::seed_from_u64(2);
        for n in [1, 2, 5, 20, 45] {
            let mut a = Mat::<f64>::zeros(n, n);
            for j in 0..n {
                for i in j..n {
                    let x = rng.gen::<f64>() - 0.5;
                    a.write(i, j, x);
                    a.write(j, i, x);
                }
            }

            for side in [Side::Lower, Side::Upper] {
                let mut q = a.clone();
                let mut diag = vec![0.0; n];
                let mut offdiag = vec![0.0; n - 1];
                let mut tau = vec![0.0; n - 1];
                tridiagonalize_in_place(side, q.as_mut(), &mut diag, &mut offdiag, &mut tau)
                    .unwrap();
                orthogonal_from_tridiag_in_place(
                    side,
                    q.as_mut(),
                    &tau,
                    make_stack!(orthogonal_from_tridiag_in_place_req::<f64>(n)),
                )
                .unwrap();

                let t = Mat::from_fn(n, n, |i, j| {
                    if i == j {
                        diag[i]
                    } else if i == j + 1 {
                        offdiag[j]
                    } else if j == i + 1 {
                        offdiag[i]
                    } else {
                        0.0
                    }
                });
                let tol = 1e-14 * n as f64;
                assert_mat_approx_eq((&(&q * &t) * q.transpose()).as_ref(), a.as_ref(), tol);
                assert_mat_approx_eq(
                    (q.transpose() * q.as_ref()).as_ref(),
                    Mat::<f64>::identity(n, n).as_ref(),
                    tol,
                );
            }
        }
    }

    #[test]
    fn misuse() {
        let mut a = Mat::<f64>::zeros(3, 4);
        let err = orthogonal_from_qr_in_place(
            a.as_mut(),
            &[1.0],
            make_stack!(orthogonal_from_qr_in_place_req::<f64>(3, 4, 1)),
        )
        .unwrap_err();
        assert!(err.position == 1);

        let mut a = Mat::<f64>::zeros(4, 2);
        let err = orthogonal_from_ql_in_place(
            a.as_mut(),
            &[1.0; 3],
            make_stack!(orthogonal_from_ql_in_place_req::<f64>(4, 2, 3)),
        )
        .unwrap_err();
        assert_eq!(
            err.kind,
            ArgumentErrorKind::LengthTooLarge { max: 2, found: 3 }
        );

        let mut a = Mat::<f64>::zeros(3, 3);
        let err = orthogonal_from_tridiag_in_place(
            Side::Lower,
            a.as_mut(),
            &[1.0; 3],
            make_stack!(orthogonal_from_tridiag_in_place_req::<f64>(3)),
        )
        .unwrap_err();
        assert!(all(err.position == 3, a == Mat::zeros(3, 3)));
    }
}
