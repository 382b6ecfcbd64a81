//! Matrix multiplication and the low rank updates used by the reflector kernels.
//!
//! These are straightforward loops, with a common convention for accumulation:
//! `acc := alpha * acc + beta * product`, where `alpha == None` means that the previous content
//! of `acc` is overwritten without being read.

use crate::{assert, MatMut, MatRef, RealField, Side};

pub mod triangular;

#[inline(always)]
fn accumulate<E: RealField>(old: E, alpha: Option<E>, beta: E, product: E) -> E {
    match alpha {
        Some(alpha) => alpha * old + beta * product,
        None => beta * product,
    }
}

/// Computes the inner product of two column vectors.
///
/// # Panics
/// Panics if `lhs` or `rhs` is not a column vector, or if their lengths differ.
#[track_caller]
pub fn inner_prod<E: RealField>(lhs: MatRef<'_, E>, rhs: MatRef<'_, E>) -> E {
    assert!(all(
        lhs.ncols() == 1,
        rhs.ncols() == 1,
        lhs.nrows() == rhs.nrows(),
    ));
    let mut acc = E::zero();
    for i in 0..lhs.nrows() {
        acc = acc + lhs.read(i, 0) * rhs.read(i, 0);
    }
    acc
}

/// Computes `acc := alpha * acc + beta * lhs * rhs`.
///
/// If `alpha` is `None`, `acc` is overwritten with `beta * lhs * rhs`.
///
/// # Panics
/// Panics if the shapes are incompatible.
#[track_caller]
pub fn matmul<E: RealField>(
    acc: MatMut<'_, E>,
    lhs: MatRef<'_, E>,
    rhs: MatRef<'_, E>,
    alpha: Option<E>,
    beta: E,
) {
    let mut acc = acc;
    assert!(all(
        acc.nrows() == lhs.nrows(),
        acc.ncols() == rhs.ncols(),
        lhs.ncols() == rhs.nrows(),
    ));

    for j in 0..acc.ncols() {
        for i in 0..acc.nrows() {
            let mut dot = E::zero();
            for k in 0..lhs.ncols() {
                dot = dot + lhs.read(i, k) * rhs.read(k, j);
            }
            let old = if alpha.is_some() {
                acc.read(i, j)
            } else {
                E::zero()
            };
            acc.write(i, j, accumulate(old, alpha, beta, dot));
        }
    }
}

/// Computes `acc := alpha * acc + beta * A * x`, where `A` is symmetric and only the half given
/// by `side` is read.
///
/// # Panics
/// Panics if `A` is not square, or if `acc` and `x` are not column vectors of matching length.
#[track_caller]
pub fn symmetric_matvec<E: RealField>(
    acc: MatMut<'_, E>,
    a: MatRef<'_, E>,
    side: Side,
    x: MatRef<'_, E>,
    alpha: Option<E>,
    beta: E,
) {
    let mut acc = acc;
    let n = a.nrows();
    assert!(all(
        a.ncols() == n,
        acc.nrows() == n,
        acc.ncols() == 1,
        x.nrows() == n,
        x.ncols() == 1,
    ));

    let sym = |i: usize, j: usize| -> E {
        let (i, j) = match side {
            Side::Lower => (Ord::max(i, j), Ord::min(i, j)),
            Side::Upper => (Ord::min(i, j), Ord::max(i, j)),
        };
        a.read(i, j)
    };

    for i in 0..n {
        let mut dot = E::zero();
        for k in 0..n {
            dot = dot + sym(i, k) * x.read(k, 0);
        }
        let old = if alpha.is_some() {
            acc.read(i, 0)
        } else {
            E::zero()
        };
        acc.write(i, 0, accumulate(old, alpha, beta, dot));
    }
}

/// Computes `A := A + alpha * (x * yᵀ + y * xᵀ)` on the half of the symmetric matrix `A` given
/// by `side`. The other half is not accessed.
///
/// # Panics
/// Panics if `A` is not square, or if `x` and `y` are not column vectors of matching length.
#[track_caller]
pub fn symmetric_rank_two_update<E: RealField>(
    a: MatMut<'_, E>,
    side: Side,
    x: MatRef<'_, E>,
    y: MatRef<'_, E>,
    alpha: E,
) {
    let mut a = a;
    let n = a.nrows();
    assert!(all(
        a.ncols() == n,
        x.nrows() == n,
        x.ncols() == 1,
        y.nrows() == n,
        y.ncols() == 1,
    ));

    for j in 0..n {
        let (start, end) = match side {
            Side::Lower => (j, n),
            Side::Upper => (0, j + 1),
        };
        let xj = x.read(j, 0);
        let yj = y.read(j, 0);
        for i in start..end {
            let update = x.read(i, 0) * yj + y.read(i, 0) * xj;
            a.write(i, j, a.read(i, j) + alpha * update);
        }
    }
}

/// Computes `A := A + alpha * x * yᵀ`.
///
/// # Panics
/// Panics if `x` and `y` are not column vectors whose lengths match the shape of `A`.
#[track_caller]
pub fn rank_one_update<E: RealField>(a: MatMut<'_, E>, x: MatRef<'_, E>, y: MatRef<'_, E>, alpha: E) {
    let mut a = a;
    assert!(all(
        x.ncols() == 1,
        y.ncols() == 1,
        x.nrows() == a.nrows(),
        y.nrows() == a.ncols(),
    ));

    for j in 0..a.ncols() {
        let yj = alpha * y.read(j, 0);
        if yj == E::zero() {
            continue;
        }
        for i in 0..a.nrows() {
            a.write(i, j, a.read(i, j) + x.read(i, 0) * yj);
        }
    }
}
