use super::{max_propagate_nan, SumOfSquares};
use crate::{MatRef, RealField, Side};

/// Matrix norm selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NormKind {
    /// Largest absolute value of the elements. This is not a consistent matrix norm.
    Max,
    /// Largest column sum of absolute values.
    One,
    /// Largest row sum of absolute values.
    Inf,
    /// Square root of the sum of squares of the elements.
    Frobenius,
}

/// Returns the maximum absolute value of the elements of `mat`, or NaN if any element is NaN.
pub fn norm_max<E: RealField>(mat: MatRef<'_, E>) -> E {
    let mut max = E::zero();
    for j in 0..mat.ncols() {
        for i in 0..mat.nrows() {
            max = max_propagate_nan(max, mat.read(i, j).abs());
        }
    }
    max
}

/// Returns the Frobenius norm of `mat`, computed without intermediate overflow.
pub fn norm_l2<E: RealField>(mat: MatRef<'_, E>) -> E {
    let mut acc = SumOfSquares::new();
    for j in 0..mat.ncols() {
        for i in 0..mat.nrows() {
            acc.push(mat.read(i, j));
        }
    }
    acc.norm()
}

/// Returns the requested norm of the symmetric matrix whose meaningful half is given by `side`.
/// The other half is not read.
///
/// # Panics
/// Panics if `a` is not square.
#[track_caller]
pub fn symmetric_norm<E: RealField>(kind: NormKind, side: Side, a: MatRef<'_, E>) -> E {
    let n = a.nrows();
    crate::assert!(a.ncols() == n);

    let sym = |i: usize, j: usize| -> E {
        let (i, j) = match side {
            Side::Lower => (Ord::max(i, j), Ord::min(i, j)),
            Side::Upper => (Ord::min(i, j), Ord::max(i, j)),
        };
        a.read(i, j)
    };

    match kind {
        NormKind::Max => {
            let mut max = E::zero();
            for j in 0..n {
                let (start, end) = match side {
                    Side::Lower => (j, n),
                    Side::Upper => (0, j + 1),
                };
                for i in start..end {
                    max = max_propagate_nan(max, a.read(i, j).abs());
                }
            }
            max
        }
        // the matrix is symmetric, so both norms coincide
        NormKind::One | NormKind::Inf => {
            let mut max = E::zero();
            for j in 0..n {
                let mut sum = E::zero();
                for i in 0..n {
                    sum = sum + sym(i, j).abs();
                }
                max = max_propagate_nan(max, sum);
            }
            max
        }
        NormKind::Frobenius => {
            let mut off_diag = SumOfSquares::new();
            for j in 0..n {
                let (start, end) = match side {
                    Side::Lower => (j + 1, n),
                    Side::Upper => (0, j),
                };
                for i in start..end {
                    off_diag.push(a.read(i, j));
                }
            }
            off_diag.sumsq = off_diag.sumsq + off_diag.sumsq;

            let mut diag = SumOfSquares::new();
            for i in 0..n {
                diag.push(a.read(i, i));
            }
            off_diag.combine(diag);
            off_diag.norm()
        }
    }
}

/// Returns the requested norm of the symmetric tridiagonal matrix with diagonal `diag` and
/// off-diagonal `offdiag`.
///
/// # Panics
/// Panics if `offdiag.len() + 1 != diag.len()` for a nonempty `diag`.
#[track_caller]
pub fn tridiag_norm<E: RealField>(kind: NormKind, diag: &[E], offdiag: &[E]) -> E {
    let n = diag.len();
    if n == 0 {
        return E::zero();
    }
    crate::assert!(offdiag.len() + 1 == n);

    match kind {
        NormKind::Max => {
            let mut max = E::zero();
            for &d in diag {
                max = max_propagate_nan(max, d.abs());
            }
            for &e in offdiag {
                max = max_propagate_nan(max, e.abs());
            }
            max
        }
        NormKind::One | NormKind::Inf => {
            if n == 1 {
                return diag[0].abs();
            }
            let mut max = diag[0].abs() + offdiag[0].abs();
            max = max_propagate_nan(max, offdiag[n - 2].abs() + diag[n - 1].abs());
            for i in 1..n - 1 {
                let sum = offdiag[i - 1].abs() + diag[i].abs() + offdiag[i].abs();
                max = max_propagate_nan(max, sum);
            }
            max
        }
        NormKind::Frobenius => {
            let mut acc: SumOfSquares<E> = offdiag.iter().copied().collect();
            acc.sumsq = acc.sumsq + acc.sumsq;
            for &d in diag {
                acc.push(d);
            }
            acc.norm()
        }
    }
}
