//! Householder reflectors and block reflectors.
//!
//! A Householder reflector is an orthogonal transformation of the form
//! $$H = I - \tau v v^T,$$
//! where $v$ is a vector whose first component is implicitly equal to one, so that only the
//! remaining components, which we call the essential part, need to be stored. $\tau = 0$ denotes
//! the identity.
//!
//! A sequence of $k$ reflectors $H_0, \dots, H_{k-1}$ can be composed into a block reflector
//! $$H = I - V T V^T,$$
//! where $V$ is the Householder basis, the matrix whose columns are the vectors $v_i$, and $T$ is
//! a $k \times k$ triangular matrix that we call the Householder factor.
//!
//! With [`Direction::Forward`], $H = H_0 H_1 \dots H_{k-1}$, the unit component of $v_i$ is at
//! index $i$ and its components before it are zero, making $V$ unit lower trapezoidal, and $T$ is
//! upper triangular.
//! With [`Direction::Backward`], $H = H_{k-1} \dots H_1 H_0$, the unit component of $v_i$ is at
//! index $n - k + i$ and its components after it are zero, making $V$ unit upper trapezoidal, and
//! $T$ is lower triangular.
//!
//! The basis may be stored by column ($n \times k$), or by row ($k \times n$, the transpose of
//! the former). Only the meaningful trapezoidal part of the basis is read: the unit components
//! and the implicit zeros are never accessed, so the storage may hold unrelated data there.
//!
//! Applying the block reflector through the factor costs three matrix products instead of $k$
//! rank one updates, while computing the same transformation.

use crate::{
    assert,
    linalg::{
        matmul::{
            matmul, rank_one_update,
            triangular::{self, BlockStructure},
        },
        reductions::norm_l2,
        temp_mat_req, temp_mat_uninit, warn_if_row_major, Direction,
    },
    mat::col_from_slice,
    MatMut, MatRef, RealField,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use reborrow::*;

/// Storage of the vectors of a Householder basis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Storage {
    /// Each reflector is a column of the basis.
    ByColumn,
    /// Each reflector is a row of the basis.
    ByRow,
}

#[inline]
fn scale_in_place<E: RealField>(x: MatMut<'_, E>, factor: E) {
    let mut x = x;
    for j in 0..x.ncols() {
        for i in 0..x.nrows() {
            x.write(i, j, x.read(i, j) * factor);
        }
    }
}

/// Computes the reflector $H = I - \tau v v^T$ such that $H x = \beta e_0$, where $x_0$ is
/// contained in `head` and $x_{1\dots}$ in `essential`.
///
/// On output, `head` holds $\beta$, `essential` holds $v_{1\dots}$ ($v_0 = 1$ is implicit), and
/// $\tau$ is returned.
///
/// If $x_{1\dots}$ is zero, $\tau = 0$ and $H$ is the identity. Otherwise
/// $\beta = -\operatorname{sign}(x_0) \|x\|$ and $1 \le \tau \le 2$. When $|\beta|$ is too small
/// for its reciprocal to be computed accurately, $x$ is scaled up by a power of the underflow
/// threshold (at most 20 times) before forming the reflector, and the scaling is undone on
/// $\beta$.
///
/// # Panics
/// Panics if `essential` is not a column vector.
#[track_caller]
pub fn make_householder_in_place<E: RealField>(head: &mut E, essential: MatMut<'_, E>) -> E {
    let mut essential = essential;
    assert!(essential.ncols() == 1);

    let mut tail_norm = norm_l2(essential.rb());
    if tail_norm == E::zero() {
        return E::zero();
    }

    let mut alpha = *head;
    let mut beta = -alpha.hypot(tail_norm).copy_sign(alpha);

    let safe_min = E::safe_min() / E::eps();
    let mut count = 0;
    if beta.abs() < safe_min {
        let inv = safe_min.recip();
        loop {
            count += 1;
            scale_in_place(essential.rb_mut(), inv);
            beta = beta * inv;
            alpha = alpha * inv;
            if !(beta.abs() < safe_min && count < 20) {
                break;
            }
        }
        tail_norm = norm_l2(essential.rb());
        beta = -alpha.hypot(tail_norm).copy_sign(alpha);
    }

    let tau = (beta - alpha) / beta;
    scale_in_place(essential, (alpha - beta).recip());
    for _ in 0..count {
        beta = beta * safe_min;
    }
    *head = beta;
    tau
}

/// Returns the number of leading columns of `matrix`, past which every column is zero.
fn nonzero_ncols<E: RealField>(matrix: MatRef<'_, E>) -> usize {
    let mut ncols = matrix.ncols();
    while ncols > 0 {
        let j = ncols - 1;
        if (0..matrix.nrows()).any(|i| matrix.read(i, j) != E::zero()) {
            break;
        }
        ncols -= 1;
    }
    ncols
}

/// Computes the size and alignment of required workspace for applying a Householder reflector
/// to a matrix with the given dimensions, from the left.
pub fn apply_householder_on_the_left_in_place_req<E: RealField>(
    nrows: usize,
    ncols: usize,
) -> Result<StackReq, SizeOverflow> {
    let _ = nrows;
    temp_mat_req::<E>(ncols, 1)
}

/// Computes the size and alignment of required workspace for applying a Householder reflector
/// to a matrix with the given dimensions, from the right.
pub fn apply_householder_on_the_right_in_place_req<E: RealField>(
    nrows: usize,
    ncols: usize,
) -> Result<StackReq, SizeOverflow> {
    apply_householder_on_the_left_in_place_req::<E>(ncols, nrows)
}

/// Computes $C := H C$, where $H = I - \tau v v^T$ and $v = [1; \text{essential}]$.
///
/// Trailing zeros of $v$ and trailing zero columns of the affected rows of $C$ are skipped.
///
/// # Panics
/// Panics if `essential` is not a column vector with `matrix.nrows() - 1` rows.
#[track_caller]
pub fn apply_householder_on_the_left_in_place<E: RealField>(
    essential: MatRef<'_, E>,
    tau: E,
    matrix: MatMut<'_, E>,
    stack: PodStack<'_>,
) {
    assert!(all(
        essential.ncols() == 1,
        essential.nrows() + 1 == matrix.nrows(),
    ));
    if tau == E::zero() {
        return;
    }

    let mut lastv = essential.nrows();
    while lastv > 0 && essential.read(lastv - 1, 0) == E::zero() {
        lastv -= 1;
    }
    let essential = essential.subrows(0, lastv);
    let matrix = matrix.subrows_mut(0, lastv + 1);

    let lastc = nonzero_ncols(matrix.rb());
    if lastc == 0 {
        return;
    }
    let matrix = matrix.subcols_mut(0, lastc);
    let (mut first, mut rest) = matrix.split_at_row_mut(1);

    // w = Cᵀ v
    let (mut w, _) = temp_mat_uninit::<E>(lastc, 1, stack);
    matmul(w.rb_mut(), rest.rb().transpose(), essential, None, E::one());
    for j in 0..lastc {
        w.write(j, 0, w.read(j, 0) + first.read(0, j));
    }

    // C -= tau v wᵀ
    for j in 0..lastc {
        first.write(0, j, first.read(0, j) - tau * w.read(j, 0));
    }
    rank_one_update(rest.rb_mut(), essential, w.rb(), -tau);
}

/// Computes $C := C H$, where $H = I - \tau v v^T$ and $v = [1; \text{essential}]$.
///
/// # Panics
/// Panics if `essential` is not a column vector with `matrix.ncols() - 1` rows.
#[track_caller]
pub fn apply_householder_on_the_right_in_place<E: RealField>(
    essential: MatRef<'_, E>,
    tau: E,
    matrix: MatMut<'_, E>,
    stack: PodStack<'_>,
) {
    apply_householder_on_the_left_in_place(essential, tau, matrix.transpose_mut(), stack)
}

pub(crate) fn make_householder_factor_forward<E: RealField>(
    basis: MatRef<'_, E>,
    tau: MatRef<'_, E>,
    factor: MatMut<'_, E>,
) {
    let mut factor = factor;
    let n = basis.nrows();
    let k = basis.ncols();

    for i in 0..k {
        let tau_i = tau.read(i, 0);
        if tau_i == E::zero() {
            for j in 0..=i {
                factor.write(j, i, E::zero());
            }
            continue;
        }

        let mut lastv = n - 1;
        while lastv > i && basis.read(lastv, i) == E::zero() {
            lastv -= 1;
        }

        // T(0..i, i) = -tau_i * V(i.., 0..i)ᵀ * V(i.., i)
        {
            let mut col = factor.rb_mut().submatrix_mut(0, i, i, 1);
            for j in 0..i {
                col.write(j, 0, basis.read(i, j));
            }
            matmul(
                col.rb_mut(),
                basis.submatrix(i + 1, 0, lastv - i, i).transpose(),
                basis.submatrix(i + 1, i, lastv - i, 1),
                Some(E::one()),
                E::one(),
            );
            scale_in_place(col, -tau_i);
        }

        // T(0..i, i) = T(0..i, 0..i) * T(0..i, i)
        for j in 0..i {
            let mut acc = E::zero();
            for l in j..i {
                acc = acc + factor.read(j, l) * factor.read(l, i);
            }
            factor.write(j, i, acc);
        }
        factor.write(i, i, tau_i);
    }
}

/// Computes the Householder factor $T$ of the block reflector $H = I - V T V^T$ composed of the
/// reflectors stored in `basis` and `tau`. See the [module-level documentation](self) for the
/// meaning of `direction` and `storage`.
///
/// Only the triangular half of `factor` that holds $T$ is written to.
///
/// # Panics
/// Panics if the basis has fewer vectors than `tau.len()`, if it has more vectors than rows, or
/// if `factor` is not `tau.len() × tau.len()`.
#[track_caller]
pub fn make_householder_factor<E: RealField>(
    direction: Direction,
    storage: Storage,
    basis: MatRef<'_, E>,
    tau: &[E],
    factor: MatMut<'_, E>,
) {
    let basis = match storage {
        Storage::ByColumn => basis,
        Storage::ByRow => basis.transpose(),
    };
    let k = tau.len();
    assert!(all(
        basis.ncols() == k,
        k <= basis.nrows(),
        factor.nrows() == k,
        factor.ncols() == k,
    ));

    let tau = col_from_slice(tau);
    match direction {
        Direction::Forward => make_householder_factor_forward(basis, tau, factor),
        Direction::Backward => make_householder_factor_forward(
            basis.reverse_rows_and_cols(),
            tau.reverse_rows(),
            factor.reverse_rows_and_cols_mut(),
        ),
    }
}

/// Computes the size and alignment of required workspace for applying a block reflector of
/// `blocksize` vectors from the left, to a matrix with `ncols` columns.
pub fn apply_block_householder_on_the_left_in_place_req<E: RealField>(
    blocksize: usize,
    ncols: usize,
) -> Result<StackReq, SizeOverflow> {
    let tmp = temp_mat_req::<E>(blocksize, ncols)?;
    StackReq::try_all_of([tmp, tmp])
}

/// Computes the size and alignment of required workspace for applying a block reflector of
/// `blocksize` vectors from the right, to a matrix with `nrows` rows.
pub fn apply_block_householder_on_the_right_in_place_req<E: RealField>(
    blocksize: usize,
    nrows: usize,
) -> Result<StackReq, SizeOverflow> {
    apply_block_householder_on_the_left_in_place_req::<E>(blocksize, nrows)
}

fn apply_block_householder_forward<E: RealField>(
    basis: MatRef<'_, E>,
    factor: MatRef<'_, E>,
    transpose: bool,
    matrix: MatMut<'_, E>,
    stack: PodStack<'_>,
) {
    let k = basis.ncols();
    let n = matrix.ncols();
    if k == 0 || n == 0 {
        return;
    }

    let (basis_top, basis_bot) = basis.split_at_row(k);
    let (mut top, mut bot) = matrix.split_at_row_mut(k);

    let (mut w, stack) = temp_mat_uninit::<E>(k, n, stack);
    let (mut tw, _) = temp_mat_uninit::<E>(k, n, stack);

    // W = Vᵀ C
    triangular::matmul(
        w.rb_mut(),
        BlockStructure::Rectangular,
        basis_top.transpose(),
        BlockStructure::UnitTriangularUpper,
        top.rb(),
        BlockStructure::Rectangular,
        None,
        E::one(),
    );
    matmul(w.rb_mut(), basis_bot.transpose(), bot.rb(), Some(E::one()), E::one());

    // W = T W, or Tᵀ W
    let (factor, factor_structure) = if transpose {
        (factor.transpose(), BlockStructure::TriangularLower)
    } else {
        (factor, BlockStructure::TriangularUpper)
    };
    triangular::matmul(
        tw.rb_mut(),
        BlockStructure::Rectangular,
        factor,
        factor_structure,
        w.rb(),
        BlockStructure::Rectangular,
        None,
        E::one(),
    );

    // C -= V W
    triangular::matmul(
        top.rb_mut(),
        BlockStructure::Rectangular,
        basis_top,
        BlockStructure::UnitTriangularLower,
        tw.rb(),
        BlockStructure::Rectangular,
        Some(E::one()),
        -E::one(),
    );
    matmul(bot.rb_mut(), basis_bot, tw.rb(), Some(E::one()), -E::one());
}

/// Computes $C := H C$, or $C := H^T C$ if `transpose` is `true`, where $H = I - V T V^T$ is the
/// block reflector with basis `basis` and factor `factor`. See the
/// [module-level documentation](self) for the meaning of `direction` and `storage`.
///
/// # Panics
/// Panics if the dimensions of the basis, the factor and the matrix do not match.
#[track_caller]
pub fn apply_block_householder_on_the_left_in_place<E: RealField>(
    direction: Direction,
    storage: Storage,
    basis: MatRef<'_, E>,
    factor: MatRef<'_, E>,
    transpose: bool,
    matrix: MatMut<'_, E>,
    stack: PodStack<'_>,
) {
    let basis = match storage {
        Storage::ByColumn => basis,
        Storage::ByRow => basis.transpose(),
    };
    let k = basis.ncols();
    assert!(all(
        basis.nrows() == matrix.nrows(),
        k <= basis.nrows(),
        factor.nrows() == k,
        factor.ncols() == k,
    ));
    warn_if_row_major("apply_block_householder_on_the_left_in_place", matrix.rb());

    match direction {
        Direction::Forward => {
            apply_block_householder_forward(basis, factor, transpose, matrix, stack)
        }
        Direction::Backward => apply_block_householder_forward(
            basis.reverse_rows_and_cols(),
            factor.reverse_rows_and_cols(),
            transpose,
            matrix.reverse_rows_mut(),
            stack,
        ),
    }
}

/// Computes $C := C H$, or $C := C H^T$ if `transpose` is `true`, where $H = I - V T V^T$ is the
/// block reflector with basis `basis` and factor `factor`. See the
/// [module-level documentation](self) for the meaning of `direction` and `storage`.
///
/// # Panics
/// Panics if the dimensions of the basis, the factor and the matrix do not match.
#[track_caller]
pub fn apply_block_householder_on_the_right_in_place<E: RealField>(
    direction: Direction,
    storage: Storage,
    basis: MatRef<'_, E>,
    factor: MatRef<'_, E>,
    transpose: bool,
    matrix: MatMut<'_, E>,
    stack: PodStack<'_>,
) {
    apply_block_householder_on_the_left_in_place(
        direction,
        storage,
        basis,
        factor,
        !transpose,
        matrix.transpose_mut(),
        stack,
    )
}
