//! Eigenvalues and eigenvectors of a symmetric tridiagonal matrix, by the implicitly shifted QL
//! and QR algorithms.
//!
//! The matrix is first split into unreduced blocks at its negligible off-diagonal entries. Each
//! block is scaled into a range where squaring its entries can neither overflow nor underflow,
//! then iterated on from the end with the diagonal entry of smaller magnitude: QL iteration when
//! it is the first one, QR iteration otherwise. Each sweep uses a Wilkinson shift, and trailing
//! `2×2` blocks are solved in closed form.
//!
//! When eigenvectors are requested, the plane rotations of each sweep are recorded and applied
//! to the columns of the accumulator matrix in a single pass at the end of the sweep.
//!
//! The total number of sweeps is bounded by `n * max_iterations_per_value`. Exhausting that
//! bound is reported as [`Convergence::NotConverged`], not as an error.

use crate::{
    error::{check_len, check_shape, ArgumentError, ArgumentErrorKind},
    linalg::{
        evd::eigen_2x2::{eigen_2x2, eigenvalues_2x2},
        jacobi::{apply_rotation_sequence_on_the_right_in_place, JacobiRotation, Pivot},
        reductions::{rescale_unchecked, tridiag_norm, NormKind},
        Direction,
    },
    mat::col_from_slice_mut,
    MatMut, RealField,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use reborrow::*;

/// Parameters of the tridiagonal QL/QR algorithm.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TridiagQrParams<E> {
    /// The iteration stops after `n * max_iterations_per_value` sweeps in total.
    pub max_iterations_per_value: usize,
    /// Relative threshold under which off-diagonal entries are considered negligible.
    pub tolerance: E,
}

impl<E: RealField> Default for TridiagQrParams<E> {
    fn default() -> Self {
        Self {
            max_iterations_per_value: 64,
            tolerance: E::eps(),
        }
    }
}

/// Outcome of the iteration.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Convergence {
    /// Every off-diagonal entry was reduced to zero.
    Converged {
        /// Number of QL/QR sweeps performed.
        sweeps: usize,
    },
    /// The sweep budget was exhausted, or the input was not finite. The content of the outputs
    /// is a valid intermediate state that does not hold the eigendecomposition.
    NotConverged {
        /// Number of QL/QR sweeps performed.
        sweeps: usize,
    },
}

impl Convergence {
    #[inline]
    pub fn is_converged(self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }

    #[inline]
    pub fn sweeps(self) -> usize {
        match self {
            Convergence::Converged { sweeps } | Convergence::NotConverged { sweeps } => sweeps,
        }
    }
}

/// Symmetric tridiagonal eigensolver that owns its parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TridiagQr<E> {
    params: TridiagQrParams<E>,
}

impl<E: RealField> Default for TridiagQr<E> {
    fn default() -> Self {
        Self::new(TridiagQrParams::default())
    }
}

impl<E: RealField> TridiagQr<E> {
    #[inline]
    pub fn new(params: TridiagQrParams<E>) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &TridiagQrParams<E> {
        &self.params
    }

    /// See [`compute_tridiag_eigenvalues`].
    pub fn eigenvalues(
        &self,
        diag: &mut [E],
        offdiag: &mut [E],
    ) -> Result<Convergence, ArgumentError> {
        compute_tridiag_eigenvalues(diag, offdiag, self.params)
    }

    /// See [`compute_tridiag_eigenvectors`].
    pub fn eigenvectors(
        &self,
        diag: &mut [E],
        offdiag: &mut [E],
        z: MatMut<'_, E>,
        stack: PodStack<'_>,
    ) -> Result<Convergence, ArgumentError> {
        compute_tridiag_eigenvectors(diag, offdiag, z, self.params, stack)
    }
}

/// Counts the sweeps against their upper bound.
struct SweepBudget {
    used: usize,
    max: usize,
}

impl SweepBudget {
    fn new(max: usize) -> Self {
        Self { used: 0, max }
    }

    /// Records a sweep, or returns `false` if the budget is exhausted.
    fn try_spend(&mut self) -> bool {
        if self.used == self.max {
            false
        } else {
            self.used += 1;
            true
        }
    }
}

struct Thresholds<E> {
    tol: E,
    eps2: E,
    safe_min: E,
    scale_min: E,
    scale_max: E,
}

impl<E: RealField> Thresholds<E> {
    fn new(tol: E) -> Self {
        let eps2 = tol * tol;
        let safe_min = E::safe_min();
        Self {
            tol,
            eps2,
            safe_min,
            scale_min: safe_min.sqrt() / eps2,
            scale_max: E::safe_max().sqrt() / E::from_f64(3.0),
        }
    }

    /// Returns `true` if `e`, the off-diagonal entry between `d0` and `d1`, is negligible within
    /// an active block.
    #[inline]
    fn is_negligible(&self, e: E, d0: E, d1: E) -> bool {
        e * e <= self.eps2 * (d0 * d1).abs() + self.safe_min
    }
}

/// Accumulator of the eigenvectors, with the storage for the rotations of one sweep.
struct Rotations<'a, E> {
    z: MatMut<'a, E>,
    cos: &'a mut [E],
    sin: &'a mut [E],
}

impl<E: RealField> Rotations<'_, E> {
    /// Applies the rotations `start..end` to the columns `start..=end` of the accumulator.
    fn apply(&mut self, direction: Direction, start: usize, end: usize) {
        apply_rotation_sequence_on_the_right_in_place(
            Pivot::Variable,
            direction,
            &self.cos[start..end],
            &self.sin[start..end],
            self.z.rb_mut().subcols_mut(start, end - start + 1),
        );
    }

    #[inline]
    fn record(&mut self, i: usize, c: E, s: E) {
        self.cos[i] = c;
        self.sin[i] = s;
    }
}

/// Solves the `2×2` block at `(i, i + 1)`.
fn solve_2x2<E: RealField>(
    diag: &mut [E],
    offdiag: &mut [E],
    rotations: &mut Option<Rotations<'_, E>>,
    i: usize,
    direction: Direction,
) {
    let (rt1, rt2) = match rotations {
        Some(rotations) => {
            let (rt1, rt2, c, s) = eigen_2x2(diag[i], offdiag[i], diag[i + 1]);
            rotations.record(i, c, s);
            rotations.apply(direction, i, i + 1);
            (rt1, rt2)
        }
        None => eigenvalues_2x2(diag[i], offdiag[i], diag[i + 1]),
    };
    diag[i] = rt1;
    diag[i + 1] = rt2;
    offdiag[i] = E::zero();
}

/// Wilkinson shift from the `2×2` block `[[d0, e], [e, d1]]`, relative to the entry `far` at
/// the other end of the active window.
#[inline]
fn wilkinson_shift<E: RealField>(d0: E, e: E, d1: E, far: E) -> E {
    let two = E::from_f64(2.0);
    let f = (d1 - d0) / (two * e);
    let r = f.hypot(E::one());
    far - d0 + e / (f + r.copy_sign(f))
}

/// QL iteration on the block `start..=end`, from the top. Returns `false` if the sweep budget
/// was exhausted.
fn ql_block<E: RealField>(
    diag: &mut [E],
    offdiag: &mut [E],
    rotations: &mut Option<Rotations<'_, E>>,
    start: usize,
    end: usize,
    th: &Thresholds<E>,
    budget: &mut SweepBudget,
) -> bool {
    let two = E::from_f64(2.0);
    let mut k = start;

    while k <= end {
        let mut k0 = k;
        while k0 < end && !th.is_negligible(offdiag[k0], diag[k0], diag[k0 + 1]) {
            k0 += 1;
        }
        if k0 < end {
            offdiag[k0] = E::zero();
        }

        if k0 == k {
            k += 1;
            continue;
        }
        if k0 == k + 1 {
            solve_2x2(diag, offdiag, rotations, k, Direction::Backward);
            k += 2;
            continue;
        }

        if !budget.try_spend() {
            return false;
        }

        let mut g = wilkinson_shift(diag[k], offdiag[k], diag[k + 1], diag[k0]);
        let mut c = E::one();
        let mut s = E::one();
        let mut p = E::zero();

        for i in (k..k0).rev() {
            let f = s * offdiag[i];
            let b = c * offdiag[i];
            let (rot, r) = JacobiRotation::make_givens(g, f);
            c = rot.c;
            s = rot.s;
            if i + 1 != k0 {
                offdiag[i + 1] = r;
            }
            g = diag[i + 1] - p;
            let r = (diag[i] - g) * s + two * c * b;
            p = s * r;
            diag[i + 1] = g + p;
            g = c * r - b;

            if let Some(rotations) = rotations {
                rotations.record(i, c, -s);
            }
        }
        diag[k] = diag[k] - p;
        offdiag[k] = g;

        if let Some(rotations) = rotations {
            rotations.apply(Direction::Backward, k, k0);
        }
    }
    true
}

/// QR iteration on the block `end..=start`, from the bottom. Returns `false` if the sweep budget
/// was exhausted.
fn qr_block<E: RealField>(
    diag: &mut [E],
    offdiag: &mut [E],
    rotations: &mut Option<Rotations<'_, E>>,
    start: usize,
    end: usize,
    th: &Thresholds<E>,
    budget: &mut SweepBudget,
) -> bool {
    let two = E::from_f64(2.0);
    let mut k = start;

    loop {
        let mut k0 = k;
        while k0 > end && !th.is_negligible(offdiag[k0 - 1], diag[k0], diag[k0 - 1]) {
            k0 -= 1;
        }
        if k0 > end {
            offdiag[k0 - 1] = E::zero();
        }

        if k0 == k {
            if k == end {
                return true;
            }
            k -= 1;
            continue;
        }
        if k0 + 1 == k {
            solve_2x2(diag, offdiag, rotations, k0, Direction::Forward);
            if k < end + 2 {
                return true;
            }
            k -= 2;
            continue;
        }

        if !budget.try_spend() {
            return false;
        }

        let mut g = wilkinson_shift(diag[k], offdiag[k - 1], diag[k - 1], diag[k0]);
        let mut c = E::one();
        let mut s = E::one();
        let mut p = E::zero();

        for i in k0..k {
            let f = s * offdiag[i];
            let b = c * offdiag[i];
            let (rot, r) = JacobiRotation::make_givens(g, f);
            c = rot.c;
            s = rot.s;
            if i != k0 {
                offdiag[i - 1] = r;
            }
            g = diag[i] - p;
            let r = (diag[i + 1] - g) * s + two * c * b;
            p = s * r;
            diag[i] = g + p;
            g = c * r - b;

            if let Some(rotations) = rotations {
                rotations.record(i, c, s);
            }
        }
        diag[k] = diag[k] - p;
        offdiag[k - 1] = g;

        if let Some(rotations) = rotations {
            rotations.apply(Direction::Forward, k0, k);
        }
    }
}

fn tridiag_qr<E: RealField>(
    diag: &mut [E],
    offdiag: &mut [E],
    rotations: Option<Rotations<'_, E>>,
    params: TridiagQrParams<E>,
) -> Convergence {
    let mut rotations = rotations;
    let n = diag.len();
    let mut budget = SweepBudget::new(n.saturating_mul(params.max_iterations_per_value));
    let th = Thresholds::new(params.tolerance);

    let mut next = 0;
    while next < n {
        if next > 0 {
            offdiag[next - 1] = E::zero();
        }

        // split at the first negligible off-diagonal entry
        let start = next;
        let mut end = start;
        while end + 1 < n {
            let e = offdiag[end].abs();
            if e == E::zero() {
                break;
            }
            if e <= th.tol * diag[end].abs().sqrt() * diag[end + 1].abs().sqrt() {
                offdiag[end] = E::zero();
                break;
            }
            end += 1;
        }
        next = end + 1;
        if end == start {
            continue;
        }

        let anorm = tridiag_norm(NormKind::Max, &diag[start..=end], &offdiag[start..end]);
        if anorm == E::zero() {
            continue;
        }
        if !anorm.is_finite() {
            log::warn!("tridiagonal QL/QR: block {start}..={end} has non-finite entries");
            return Convergence::NotConverged {
                sweeps: budget.used,
            };
        }

        let scale = anorm.max(th.scale_min).min(th.scale_max);
        let rescaled = scale != anorm;
        if rescaled {
            log::debug!(
                "tridiagonal QL/QR: block {start}..={end} rescaled from {anorm:?} to {scale:?}"
            );
            rescale_unchecked(anorm, scale, col_from_slice_mut(&mut diag[start..=end]));
            rescale_unchecked(anorm, scale, col_from_slice_mut(&mut offdiag[start..end]));
        }

        let use_ql = diag[end].abs() >= diag[start].abs();
        log::debug!(
            "tridiagonal QL/QR: block {start}..={end}, {} iteration",
            if use_ql { "QL" } else { "QR" },
        );

        let finished = if use_ql {
            ql_block(diag, offdiag, &mut rotations, start, end, &th, &mut budget)
        } else {
            qr_block(diag, offdiag, &mut rotations, end, start, &th, &mut budget)
        };

        if rescaled {
            rescale_unchecked(scale, anorm, col_from_slice_mut(&mut diag[start..=end]));
            rescale_unchecked(scale, anorm, col_from_slice_mut(&mut offdiag[start..end]));
        }

        if !finished {
            log::warn!(
                "tridiagonal QL/QR: no convergence after {} sweeps, in block {start}..={end}",
                budget.used,
            );
            return Convergence::NotConverged {
                sweeps: budget.used,
            };
        }
    }

    log::debug!("tridiagonal QL/QR: converged after {} sweeps", budget.used);
    Convergence::Converged {
        sweeps: budget.used,
    }
}

pub(super) fn check_params<E: RealField>(
    routine: &'static str,
    position: usize,
    params: &TridiagQrParams<E>,
) -> Result<(), ArgumentError> {
    let tol = params.tolerance;
    if tol > E::zero() && tol.is_finite() {
        Ok(())
    } else {
        Err(ArgumentError::new(
            routine,
            position,
            ArgumentErrorKind::InvalidTolerance,
        ))
    }
}

/// Computes the eigenvalues of the symmetric tridiagonal matrix with diagonal `diag` and
/// off-diagonal `offdiag`.
///
/// On output, `diag` holds the eigenvalues, in no particular order, and `offdiag` is
/// overwritten. The eigenvalues are those of the isolated blocks in the order they converge, so
/// an already diagonal input is returned unchanged.
///
/// # Errors
/// Returns an error, leaving every argument untouched, if `offdiag` does not have length
/// `n - 1` (`0` if `n == 0`), or if the tolerance is not positive and finite.
pub fn compute_tridiag_eigenvalues<E: RealField>(
    diag: &mut [E],
    offdiag: &mut [E],
    params: TridiagQrParams<E>,
) -> Result<Convergence, ArgumentError> {
    const ROUTINE: &str = "compute_tridiag_eigenvalues";
    let n = diag.len();
    check_len(ROUTINE, 2, n.saturating_sub(1), offdiag.len())?;
    check_params(ROUTINE, 3, &params)?;

    Ok(tridiag_qr(diag, offdiag, None, params))
}

/// Computes the size and alignment of required workspace for
/// [`compute_tridiag_eigenvectors`].
pub fn compute_tridiag_eigenvectors_req<E: RealField>(
    n: usize,
) -> Result<StackReq, SizeOverflow> {
    let rotations = StackReq::try_new::<E>(n)?;
    StackReq::try_all_of([rotations, rotations])
}

/// Computes the eigenvalues and eigenvectors of the symmetric tridiagonal matrix with diagonal
/// `diag` and off-diagonal `offdiag`.
///
/// `z` is multiplied on the right by the accumulated rotations. If it holds the identity on
/// input, its columns are the eigenvectors of the tridiagonal matrix on output. If it holds the
/// orthogonal factor of a tridiagonal reduction, they are the eigenvectors of the reduced
/// matrix. Column `j` of `z` matches `diag[j]` on output.
///
/// # Errors
/// Returns an error, leaving every argument untouched, if `offdiag` does not have length
/// `n - 1` (`0` if `n == 0`), if `z` is not `n×n`, or if the tolerance is not positive and
/// finite.
pub fn compute_tridiag_eigenvectors<E: RealField>(
    diag: &mut [E],
    offdiag: &mut [E],
    z: MatMut<'_, E>,
    params: TridiagQrParams<E>,
    stack: PodStack<'_>,
) -> Result<Convergence, ArgumentError> {
    const ROUTINE: &str = "compute_tridiag_eigenvectors";
    let n = diag.len();
    check_len(ROUTINE, 2, n.saturating_sub(1), offdiag.len())?;
    check_shape(ROUTINE, 3, (n, n), z.shape())?;
    check_params(ROUTINE, 4, &params)?;
    crate::linalg::warn_if_row_major(ROUTINE, z.rb());

    let (cos, stack) = stack.make_raw::<E>(n);
    let (sin, _) = stack.make_raw::<E>(n);
    let rotations = Rotations { z, cos, sin };

    Ok(tridiag_qr(diag, offdiag, Some(rotations), params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, linalg::make_stack, Mat};
    use assert_approx_eq::assert_approx_eq;

    fn explicit_tridiag(diag: &[f64], offdiag: &[f64]) -> Mat<f64> {
        let n = diag.len();
        Mat::from_fn(n, n, |i, j| {
            if i == j {
                diag[i]
            } else if i == j + 1 {
                offdiag[j]
            } else if j == i + 1 {
                offdiag[i]
            } else {
                0.0
            }
        })
    }

    fn sorted(values: &[f64]) -> Vec<f64> {
        let mut values = values.to_vec();
        values.sort_by(f64::total_cmp);
        values
    }

    #[track_caller]
    fn test_evd(diag: &[f64], offdiag: &[f64]) {
        let n = diag.len();
        let mut u = Mat::<f64>::identity(n, n);

        let mut s = diag.to_vec();
        let convergence = {
            let mut offdiag = offdiag.to_vec();
            compute_tridiag_eigenvectors(
                &mut s,
                &mut offdiag,
                u.as_mut(),
                Default::default(),
                make_stack!(compute_tridiag_eigenvectors_req::<f64>(n)),
            )
            .unwrap()
        };
        assert!(convergence.is_converged());

        let s_mat = Mat::from_fn(n, n, |i, j| if i == j { s[i] } else { 0.0 });
        let reconstructed = &(&u * &s_mat) * u.transpose();
        let target = explicit_tridiag(diag, offdiag);
        let orthogonality = u.transpose() * u.as_ref();
        for j in 0..n {
            for i in 0..n {
                assert_approx_eq!(reconstructed.read(i, j), target.read(i, j), 1e-13);
                let id = if i == j { 1.0 } else { 0.0 };
                assert_approx_eq!(orthogonality.read(i, j), id, 1e-13);
            }
        }

        // the value-only variant performs the same arithmetic
        let mut values = diag.to_vec();
        let mut offdiag = offdiag.to_vec();
        let values_convergence =
            compute_tridiag_eigenvalues(&mut values, &mut offdiag, Default::default()).unwrap();
        assert!(values_convergence == convergence);
        for (lhs, rhs) in sorted(&values).iter().zip(sorted(&s)) {
            assert_approx_eq!(*lhs, rhs, 1e-10 * rhs.abs().max(1.0));
        }
    }

    #[test]
    fn test_evd_2_0() {
        let diag = [1.0, 1.0];
        let offdiag = [0.0];
        test_evd(&diag, &offdiag);
    }

    #[test]
    fn test_evd_2_1() {
        let diag = [1.0, 1.0];
        let offdiag = [0.5213289];
        test_evd(&diag, &offdiag);
    }

    #[test]
    fn test_evd_3() {
        let diag = [1.79069356, 1.20930644, 1.0];
        let offdiag = [-4.06813537e-01, 0.0];

        test_evd(&diag, &offdiag);
    }

    #[test]
    fn test_evd_5() {
        let diag = [1.95069537, 2.44845332, 2.56957029, 3.03128102, 1.0];
        let offdiag = [-7.02200909e-01, -1.11661820e+00, -6.81418803e-01, 0.0];
        test_evd(&diag, &offdiag);
    }

    #[test]
    fn test_evd_wilkinson() {
        let diag = [3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0];
        let offdiag = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        test_evd(&diag, &offdiag);
    }

    #[test]
    fn test_evd_qr_direction() {
        // the last diagonal entry is the smallest, which selects QR iteration
        let diag = [4.0, 3.0, 2.0, 1.0, 0.5];
        let offdiag = [1.0, -0.5, 0.25, 2.0];
        test_evd(&diag, &offdiag);
    }

    #[test]
    fn test_glued_wilkinson() {
        let diag = [
            3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0, 3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0,
        ];
        let x = 1e-6;
        let offdiag = [
            1.0, 1.0, 1.0, 1.0, 1.0, 1.0, x, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
        ];
        test_evd(&diag, &offdiag);
    }

    // https://github.com/sarah-ek/faer-rs/issues/82
    #[test]
    fn test_gh_82() {
        let diag = [
            0.0,
            0.0,
            1.0769230769230773,
            -0.4290761869709236,
            -0.8278050499098524,
            0.07994922044020283,
            -0.35579623371016944,
            0.6487378508167678,
            -0.9347442346214521,
            -0.08624745233962683,
            -0.4999243909534632,
            1.3708277457481026,
            -0.2592167303689501,
            -0.5929351972647323,
            -0.5863220906879729,
            0.15069873027683844,
            0.2449309426221532,
            0.5599151389028441,
            0.440084861097156,
            9.811634162559901e-17,
        ];
        let offdiag = [
            1.7320508075688772,
            2.081665999466133,
            2.0303418353670932,
            1.2463948607107287,
            1.5895840148470526,
            1.3810057029812097,
            1.265168346300635,
            0.8941431038915991,
            1.007512301091709,
            0.5877505835309086,
            1.0370970338888965,
            0.8628932798233644,
            1.1935059937001073,
            1.1614143449715744,
            0.41040224297074174,
            0.561318309959268,
            3.1807090401145072e-15,
            0.4963971959331084,
            1.942890293094024e-16,
        ];

        test_evd(&diag, &offdiag);
    }

    #[test]
    fn test_gh_82_mini() {
        let diag = [1.0000000000000002, 1.0000000000000002];
        let offdiag = [7.216449660063518e-16];

        test_evd(&diag, &offdiag);
    }

    #[test]
    fn extreme_scales() {
        for scale in [1e-150, 1e150] {
            let diag = [3.0 * scale, 2.0 * scale, 1.0 * scale, 5.0 * scale];
            let offdiag = [scale, -scale, 0.5 * scale];
            let expected = {
                let mut d = [3.0, 2.0, 1.0, 5.0];
                let mut e = [1.0, -1.0, 0.5];
                compute_tridiag_eigenvalues(&mut d, &mut e, Default::default()).unwrap();
                sorted(&d)
            };

            let mut d = diag;
            let mut e = offdiag;
            let convergence =
                compute_tridiag_eigenvalues(&mut d, &mut e, Default::default()).unwrap();
            assert!(convergence.is_converged());
            for (lhs, rhs) in sorted(&d).iter().zip(&expected) {
                assert_approx_eq!(lhs / scale, *rhs, 1e-12);
            }
        }
    }

    #[test]
    fn diagonal_input_needs_no_sweep() {
        let diag = [4.0, -1.0, 2.5, 0.0];
        let mut d = diag;
        let mut e = [0.0; 3];
        let mut z = Mat::<f64>::identity(4, 4);
        let convergence = TridiagQr::default()
            .eigenvectors(
                &mut d,
                &mut e,
                z.as_mut(),
                make_stack!(compute_tridiag_eigenvectors_req::<f64>(4)),
            )
            .unwrap();
        assert!(convergence == Convergence::Converged { sweeps: 0 });
        assert!(all(d == diag, z == Mat::identity(4, 4)));
    }

    #[test]
    fn sweep_budget_exhaustion() {
        let solver = TridiagQr::new(TridiagQrParams {
            max_iterations_per_value: 0,
            ..Default::default()
        });
        assert!(solver.params().max_iterations_per_value == 0);

        let mut d = [3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0];
        let mut e = [1.0; 6];
        let convergence = solver.eigenvalues(&mut d, &mut e).unwrap();
        assert!(convergence == Convergence::NotConverged { sweeps: 0 });
        assert!(!convergence.is_converged());

        // a 2×2 block is solved in closed form, without any sweep
        let mut d = [1.0, 2.0];
        let mut e = [0.5];
        let convergence = solver.eigenvalues(&mut d, &mut e).unwrap();
        assert!(convergence == Convergence::Converged { sweeps: 0 });
    }

    #[test]
    fn sweep_budget_exhaustion_with_vectors() {
        let solver = TridiagQr::new(TridiagQrParams {
            max_iterations_per_value: 0,
            ..Default::default()
        });

        // the leading 2×2 block is solved and rotates `z`, the trailing block needs a sweep
        let n = 7;
        let mut d = [1.0, 2.0, 3.0, 2.0, 1.0, 0.0, 1.0];
        let mut e = [0.5, 0.0, 1.0, 1.0, 1.0, 1.0];
        let mut z = Mat::<f64>::identity(n, n);
        let convergence = solver
            .eigenvectors(
                &mut d,
                &mut e,
                z.as_mut(),
                make_stack!(compute_tridiag_eigenvectors_req::<f64>(n)),
            )
            .unwrap();
        assert!(convergence == Convergence::NotConverged { sweeps: 0 });
        assert!(z.read(1, 0) != 0.0);

        let orthogonality = z.transpose() * z.as_ref();
        for j in 0..n {
            for i in 0..n {
                let id = if i == j { 1.0 } else { 0.0 };
                assert_approx_eq!(orthogonality.read(i, j), id, 1e-15);
            }
        }
    }

    #[test]
    fn non_finite_input() {
        let mut d = [1.0, f64::NAN, 2.0];
        let mut e = [1.0, 1.0];
        let convergence = compute_tridiag_eigenvalues(&mut d, &mut e, Default::default()).unwrap();
        assert!(!convergence.is_converged());

        let mut d = [1.0, 2.0];
        let mut e = [f64::INFINITY];
        let convergence = compute_tridiag_eigenvalues(&mut d, &mut e, Default::default()).unwrap();
        assert!(!convergence.is_converged());
    }

    #[test]
    fn single_precision() {
        let mut d = [2.0f32, 2.0, 2.0];
        let mut e = [-1.0f32, -1.0];
        let convergence = compute_tridiag_eigenvalues(&mut d, &mut e, Default::default()).unwrap();
        assert!(convergence.is_converged());
        let mut d = d.to_vec();
        d.sort_by(f32::total_cmp);
        let sqrt2 = 2.0f32.sqrt();
        assert_approx_eq!(d[0], 2.0 - sqrt2, 1e-5);
        assert_approx_eq!(d[1], 2.0, 1e-5);
        assert_approx_eq!(d[2], 2.0 + sqrt2, 1e-5);
    }

    #[test]
    fn misuse() {
        let mut d = [1.0, 2.0, 3.0];
        let mut e = [1.0];
        let err = compute_tridiag_eigenvalues(&mut d, &mut e, Default::default()).unwrap_err();
        assert!(all(err.routine == "compute_tridiag_eigenvalues", err.position == 2));

        let mut e = [1.0, 1.0];
        let mut z = Mat::<f64>::zeros(3, 2);
        let err = compute_tridiag_eigenvectors(
            &mut d,
            &mut e,
            z.as_mut(),
            Default::default(),
            make_stack!(compute_tridiag_eigenvectors_req::<f64>(3)),
        )
        .unwrap_err();
        assert!(err.position == 3);

        let params = TridiagQrParams {
            tolerance: 0.0,
            ..Default::default()
        };
        let err = compute_tridiag_eigenvalues(&mut d, &mut e, params).unwrap_err();
        assert!(all(err.position == 3, err.kind == ArgumentErrorKind::InvalidTolerance));
        assert!(all(d == [1.0, 2.0, 3.0], e == [1.0, 1.0]));
    }
}
