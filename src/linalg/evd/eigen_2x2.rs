//! Closed form eigendecomposition of a symmetric `2×2` matrix
//! ```text
//! [a  b]
//! [b  c]
//! ```

use crate::RealField;

/// Returns `(sm, rt)` where `sm = a + c` and `rt = sqrt((a - c)² + 4b²)`, computed without
/// overflow of the intermediate squares.
#[inline(always)]
fn sum_and_spread<E: RealField>(a: E, b: E, c: E) -> (E, E) {
    let sm = a + c;
    let adf = (a - c).abs();
    let ab = (b + b).abs();

    let rt = if adf > ab {
        let ratio = ab / adf;
        adf * (E::one() + ratio * ratio).sqrt()
    } else if adf < ab {
        let ratio = adf / ab;
        ab * (E::one() + ratio * ratio).sqrt()
    } else {
        ab * E::from_f64(2.0).sqrt()
    };
    (sm, rt)
}

/// Returns the eigenvalues `(rt1, rt2)`, with `|rt1| >= |rt2|`.
///
/// The eigenvalue of larger magnitude is computed directly from `a + c` and the spread, and the
/// other one from `rt1 * rt2 = a * c - b²`, which avoids the cancellation that the direct formula
/// suffers from.
pub fn eigenvalues_2x2<E: RealField>(a: E, b: E, c: E) -> (E, E) {
    let (rt1, rt2, _) = eigenvalues_impl(a, b, c);
    (rt1, rt2)
}

/// Returns `(rt1, rt2, sign(rt1))`, where the sign is `+1` when `a + c == 0`.
#[inline(always)]
fn eigenvalues_impl<E: RealField>(a: E, b: E, c: E) -> (E, E, E) {
    let half = E::from_f64(0.5);
    let (sm, rt) = sum_and_spread(a, b, c);
    let (acmx, acmn) = if a.abs() > c.abs() { (a, c) } else { (c, a) };

    if sm < E::zero() {
        let rt1 = half * (sm - rt);
        let rt2 = (acmx / rt1) * acmn - (b / rt1) * b;
        (rt1, rt2, -E::one())
    } else if sm > E::zero() {
        let rt1 = half * (sm + rt);
        let rt2 = (acmx / rt1) * acmn - (b / rt1) * b;
        (rt1, rt2, E::one())
    } else {
        (half * rt, -half * rt, E::one())
    }
}

/// Returns the eigenvalues `(rt1, rt2)`, with `|rt1| >= |rt2|`, and the unit right eigenvector
/// `(cs, sn)` of `rt1`, such that
/// ```text
/// [ cs  sn] [a  b] [cs  -sn]   [rt1    0]
/// [-sn  cs] [b  c] [sn   cs] = [  0  rt2]
/// ```
pub fn eigen_2x2<E: RealField>(a: E, b: E, c: E) -> (E, E, E, E) {
    let (rt1, rt2, sgn1) = eigenvalues_impl(a, b, c);
    let (_, rt) = sum_and_spread(a, b, c);

    let df = a - c;
    let tb = b + b;
    let ab = tb.abs();

    let (cs, sgn2) = if df >= E::zero() {
        (df + rt, E::one())
    } else {
        (df - rt, -E::one())
    };

    let (mut cs1, mut sn1);
    if cs.abs() > ab {
        let ct = -tb / cs;
        sn1 = (E::one() + ct * ct).sqrt().recip();
        cs1 = ct * sn1;
    } else if ab == E::zero() {
        cs1 = E::one();
        sn1 = E::zero();
    } else {
        let tn = -cs / tb;
        cs1 = (E::one() + tn * tn).sqrt().recip();
        sn1 = tn * cs1;
    }

    if sgn1 == sgn2 {
        let tn = cs1;
        cs1 = -sn1;
        sn1 = tn;
    }

    (rt1, rt2, cs1, sn1)
}
