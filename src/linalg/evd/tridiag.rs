//! Reduction of a symmetric matrix to tridiagonal form.
//!
//! The matrix is reduced by the orthogonal similarity $Q^T A Q = T$, with $Q$ a product of
//! $n - 1$ Householder reflectors.
//!
//! If the lower half is used, $Q = H_0 H_1 \dots H_{n-2}$, and the essential part of $v_i$
//! (components $i+2$ to $n-1$, with $v_i(i+1) = 1$) is stored below the subdiagonal, in column
//! $i$.
//! If the upper half is used, $Q = H_{n-2} \dots H_1 H_0$, and the essential part of $v_i$
//! (components $0$ to $i-1$, with $v_i(i) = 1$) is stored above the superdiagonal, in column
//! $i + 1$.

use crate::{
    error::{check_len, check_square, ArgumentError},
    linalg::{
        householder::make_householder_in_place,
        matmul::{inner_prod, symmetric_matvec, symmetric_rank_two_update},
        warn_if_row_major,
    },
    mat::col_from_slice_mut,
    MatMut, MatRef, RealField, Side,
};
use reborrow::*;

const ROUTINE: &str = "tridiagonalize_in_place";

/// Applies the two-sided update `A := H A H` to the symmetric matrix `a`, with
/// `H = I - tau v vᵀ`, using `w` as workspace of the same length as `v`.
fn symmetric_reflector_update<E: RealField>(
    side: Side,
    a: MatMut<'_, E>,
    v: MatRef<'_, E>,
    tau: E,
    w: &mut [E],
) {
    let mut w = col_from_slice_mut(w);

    // w = tau A v
    symmetric_matvec(w.rb_mut(), a.rb(), side, v, None, tau);
    // w -= ½ tau (wᵀ v) v
    let alpha = -E::from_f64(0.5) * tau * inner_prod(w.rb(), v);
    for i in 0..w.nrows() {
        w.write(i, 0, w.read(i, 0) + alpha * v.read(i, 0));
    }
    // A -= v wᵀ + w vᵀ
    symmetric_rank_two_update(a, side, v, w.rb(), -E::one());
}

/// Reduces the symmetric matrix `a`, whose meaningful half is given by `side`, to tridiagonal
/// form.
///
/// On output, `diag` holds the diagonal, `offdiag` the off-diagonal, `tau` the scalar factors of
/// the reflectors, and the part of the `side` half of `a` outside the tridiagonal band holds the
/// essential parts of the reflectors. See the [module-level documentation](self) for the layout.
/// The other half of `a` is neither read nor written.
///
/// `tau` is also used as workspace during the reduction.
///
/// # Errors
/// Returns an error, leaving every argument untouched, if `a` is not square, or if `diag` does
/// not have length `n`, or if `offdiag` or `tau` does not have length `n - 1` (`0` if `n == 0`).
pub fn tridiagonalize_in_place<E: RealField>(
    side: Side,
    a: MatMut<'_, E>,
    diag: &mut [E],
    offdiag: &mut [E],
    tau: &mut [E],
) -> Result<(), ArgumentError> {
    check_square(ROUTINE, 2, a.shape())?;
    let n = a.nrows();
    check_len(ROUTINE, 3, n, diag.len())?;
    check_len(ROUTINE, 4, n.saturating_sub(1), offdiag.len())?;
    check_len(ROUTINE, 5, n.saturating_sub(1), tau.len())?;
    warn_if_row_major(ROUTINE, a.rb());

    if n == 0 {
        return Ok(());
    }

    let mut a = a;
    match side {
        Side::Lower => {
            for i in 0..n - 1 {
                let (left, right) = a.rb_mut().split_at_col_mut(i + 1);
                let mut v = left.submatrix_mut(i + 1, i, n - i - 1, 1);
                let a22 = right.subrows_mut(i + 1, n - i - 1);

                let tau_i = {
                    let (head, tail) = v.rb_mut().split_at_row_mut(1);
                    make_householder_in_place(head.get_mut(0, 0), tail)
                };
                let beta = v.read(0, 0);
                offdiag[i] = beta;

                if tau_i != E::zero() {
                    v.write(0, 0, E::one());
                    symmetric_reflector_update(side, a22, v.rb(), tau_i, &mut tau[i..]);
                    v.write(0, 0, beta);
                }

                diag[i] = a.read(i, i);
                tau[i] = tau_i;
            }
            diag[n - 1] = a.read(n - 1, n - 1);
        }
        Side::Upper => {
            for i in (0..n - 1).rev() {
                let (left, right) = a.rb_mut().split_at_col_mut(i + 1);
                let mut v = right.submatrix_mut(0, 0, i + 1, 1);
                let a11 = left.subrows_mut(0, i + 1);

                let tau_i = {
                    let (tail, head) = v.rb_mut().split_at_row_mut(i);
                    make_householder_in_place(head.get_mut(0, 0), tail)
                };
                let beta = v.read(i, 0);
                offdiag[i] = beta;

                if tau_i != E::zero() {
                    v.write(i, 0, E::one());
                    symmetric_reflector_update(side, a11, v.rb(), tau_i, &mut tau[..i + 1]);
                    v.write(i, 0, beta);
                }

                diag[i + 1] = a.read(i + 1, i + 1);
                tau[i] = tau_i;
            }
            diag[0] = a.read(0, 0);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, ArgumentErrorKind, Mat};
    use assert_approx_eq::assert_approx_eq;
    use rand::prelude::*;

    fn random_symmetric(rng: &mut StdRng, n: usize) -> Mat<f64> {
        let mut a = Mat::zeros(n, n);
        for j in 0..n {
            for i in j..n {
                let x = rng.gen::<f64>() - 0.5;
                a.write(i, j, x);
                a.write(j, i, x);
            }
        }
        a
    }

    fn half_only(a: MatRef<'_, f64>, side: Side) -> Mat<f64> {
        let n = a.nrows();
        Mat::from_fn(n, n, |i, j| {
            let inside = match side {
                Side::Lower => i >= j,
                Side::Upper => i <= j,
            };
            if inside {
                a.read(i, j)
            } else {
                f64::NAN
            }
        })
    }

    /// Builds `Q` explicitly from the reflectors stored in `a`.
    fn explicit_q(side: Side, a: MatRef<'_, f64>, tau: &[f64]) -> Mat<f64> {
        let n = a.nrows();
        let mut q = Mat::<f64>::identity(n, n);
        for i in 0..n.saturating_sub(1) {
            let v: Vec<f64> = (0..n)
                .map(|row| match side {
                    Side::Lower if row == i + 1 => 1.0,
                    Side::Lower if row > i + 1 => a.read(row, i),
                    Side::Upper if row == i => 1.0,
                    Side::Upper if row < i => a.read(row, i + 1),
                    _ => 0.0,
                })
                .collect();
            let h = Mat::from_fn(n, n, |r, c| {
                let id = if r == c { 1.0 } else { 0.0 };
                id - tau[i] * v[r] * v[c]
            });
            q = match side {
                Side::Lower => &q * &h,
                Side::Upper => &h * &q,
            };
        }
        q
    }

    #[test]
    fn similarity_reproduces_input() {
        let rng = &mut StdRng::seed_from_u64(0);
        for n in [0, 1, 2, 3, 8, 17] {
            let a = random_symmetric(rng, n);
            for side in [Side::Lower, Side::Upper] {
                let mut work = half_only(a.as_ref(), side);
                let mut diag = vec![0.0; n];
                let mut offdiag = vec![0.0; n.saturating_sub(1)];
                let mut tau = vec![0.0; n.saturating_sub(1)];
                tridiagonalize_in_place(side, work.as_mut(), &mut diag, &mut offdiag, &mut tau)
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
                let q = explicit_q(side, work.as_ref(), &tau);
                let reconstructed = &(&q * &t) * q.transpose();

                for j in 0..n {
                    for i in 0..n {
                        assert_approx_eq!(reconstructed.read(i, j), a.read(i, j), 1e-13);
                        let outside = match side {
                            Side::Lower => i < j,
                            Side::Upper => i > j,
                        };
                        if outside {
                            assert!(work.read(i, j).is_nan());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn already_tridiagonal() {
        let n = 4;
        let mut a = Mat::from_fn(n, n, |i, j| {
            if i == j {
                2.0
            } else if i.abs_diff(j) == 1 {
                -1.0
            } else {
                0.0
            }
        });
        let mut diag = vec![0.0; n];
        let mut offdiag = vec![0.0; n - 1];
        let mut tau = vec![0.0; n - 1];
        tridiagonalize_in_place(Side::Lower, a.as_mut(), &mut diag, &mut offdiag, &mut tau)
            .unwrap();
        assert!(diag == [2.0; 4]);
        assert!(offdiag == [-1.0; 3]);
        assert!(tau == [0.0; 3]);
    }

    #[test]
    fn misuse_leaves_arguments_untouched() {
        let mut a = Mat::from_fn(3, 3, |i, j| (i + j) as f64);
        let copy = a.clone();
        let mut diag = vec![7.0; 3];
        let mut offdiag = vec![7.0; 1];
        let mut tau = vec![7.0; 2];

        let err =
            tridiagonalize_in_place(Side::Upper, a.as_mut(), &mut diag, &mut offdiag, &mut tau)
                .unwrap_err();
        assert!(all(err.routine == ROUTINE, err.position == 4));
        assert_eq!(
            err.kind,
            ArgumentErrorKind::LengthMismatch {
                expected: 2,
                found: 1
            }
        );
        assert!(all(a == copy, diag == [7.0; 3], tau == [7.0; 2]));

        let mut wide = Mat::<f64>::zeros(2, 3);
        let err =
            tridiagonalize_in_place(Side::Lower, wide.as_mut(), &mut diag, &mut offdiag, &mut tau)
                .unwrap_err();
        assert!(err.position == 2);
    }
}
