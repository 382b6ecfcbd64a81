//! Plane (Givens) rotations.
//!
//! A rotation `(c, s)` acts on a pair of vectors `(x, y)` as
//! `x := c * x + s * y`, `y := c * y - s * x`.

use crate::{assert, linalg::Direction, MatMut, RealField};
use reborrow::*;

#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(C)]
pub struct JacobiRotation<T> {
    pub c: T,
    pub s: T,
}

unsafe impl<T: bytemuck::Zeroable> bytemuck::Zeroable for JacobiRotation<T> {}
unsafe impl<T: bytemuck::Pod> bytemuck::Pod for JacobiRotation<T> {}

/// Position of the pivot of the plane rotations in a rotation sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pivot {
    /// Rotation `j` mixes the vectors `j` and `j + 1`.
    Variable,
    /// Rotation `j` mixes the vectors `0` and `j + 1`.
    Top,
    /// Rotation `j` mixes the vectors `j` and `n - 1`.
    Bottom,
}

impl<E: RealField> JacobiRotation<E> {
    /// The identity rotation.
    #[inline]
    pub fn identity() -> Self {
        Self {
            c: E::one(),
            s: E::zero(),
        }
    }

    /// Computes the rotation `(c, s)` and the value `r` such that
    /// ```text
    /// [ c  s] [f]   [r]
    /// [-s  c] [g] = [0]
    /// ```
    /// with `c² + s² = 1`.
    ///
    /// If `g == 0`, returns `(1, 0)` and `r = f`. If `f == 0`, returns `(0, 1)` and `r = g`. No
    /// floating point division is performed in either case.
    ///
    /// Otherwise, the inputs are scaled by powers of two into a range where squaring them can
    /// neither overflow nor underflow, and the scaling is undone on `r`. When `|f| > |g|`, `c`
    /// is positive.
    pub fn make_givens(f: E, g: E) -> (Self, E) {
        if g == E::zero() {
            return (Self::identity(), f);
        }
        if f == E::zero() {
            return (
                Self {
                    c: E::zero(),
                    s: E::one(),
                },
                g,
            );
        }

        let two = E::from_f64(2.0);
        let exponent = ((E::safe_min() / E::eps()).log2() / two).trunc();
        let safe_min2 = two.powi(exponent.to_i32().unwrap_or(0));
        let safe_max2 = safe_min2.recip();

        let mut f1 = f;
        let mut g1 = g;
        let mut scale = f1.abs().max(g1.abs());

        let (mut c, mut s, mut r);
        if scale >= safe_max2 {
            let mut count = 0;
            loop {
                count += 1;
                f1 = f1 * safe_min2;
                g1 = g1 * safe_min2;
                scale = f1.abs().max(g1.abs());
                if !(scale >= safe_max2 && count < 20) {
                    break;
                }
            }
            r = (f1 * f1 + g1 * g1).sqrt();
            c = f1 / r;
            s = g1 / r;
            for _ in 0..count {
                r = r * safe_max2;
            }
        } else if scale <= safe_min2 {
            let mut count = 0;
            loop {
                count += 1;
                f1 = f1 * safe_max2;
                g1 = g1 * safe_max2;
                scale = f1.abs().max(g1.abs());
                if !(scale <= safe_min2 && count < 20) {
                    break;
                }
            }
            r = (f1 * f1 + g1 * g1).sqrt();
            c = f1 / r;
            s = g1 / r;
            for _ in 0..count {
                r = r * safe_min2;
            }
        } else {
            r = (f1 * f1 + g1 * g1).sqrt();
            c = f1 / r;
            s = g1 / r;
        }

        if f.abs() > g.abs() && c < E::zero() {
            c = -c;
            s = -s;
            r = -r;
        }

        (Self { c, s }, r)
    }

    /// Returns `true` if `self` is exactly the identity rotation.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.c == E::one() && self.s == E::zero()
    }

    /// Returns the inverse rotation.
    #[inline]
    pub fn transpose(self) -> Self {
        Self {
            c: self.c,
            s: -self.s,
        }
    }

    /// Applies the rotation to the pair of vectors `(x, y)`, which must have the same shape.
    #[track_caller]
    pub fn apply_in_place(&self, x: MatMut<'_, E>, y: MatMut<'_, E>) {
        let (mut x, mut y) = (x, y);
        assert!(all(x.nrows() == y.nrows(), x.ncols() == y.ncols()));
        let Self { c, s } = *self;
        for j in 0..x.ncols() {
            for i in 0..x.nrows() {
                let x_ = x.read(i, j);
                let y_ = y.read(i, j);
                x.write(i, j, c * x_ + s * y_);
                y.write(i, j, c * y_ - s * x_);
            }
        }
    }
}

/// Returns mutable views over the columns `a < b` of `matrix`.
#[inline]
fn two_cols_mut<E>(matrix: MatMut<'_, E>, a: usize, b: usize) -> (MatMut<'_, E>, MatMut<'_, E>) {
    let (left, right) = matrix.split_at_col_mut(b);
    (left.col_mut(a), right.col_mut(0))
}

/// Applies a sequence of plane rotations to the columns of `matrix`, `A := A * P`, where
/// rotation `j` is `(c[j], s[j])` and acts on the pair of columns selected by `pivot`.
/// `direction` selects whether the rotations are applied starting from the first one or the last
/// one.
///
/// Rotations that are exactly the identity are skipped.
///
/// # Panics
/// Panics if `c` or `s` does not have length `ncols - 1`.
#[track_caller]
pub fn apply_rotation_sequence_on_the_right_in_place<E: RealField>(
    pivot: Pivot,
    direction: Direction,
    c: &[E],
    s: &[E],
    matrix: MatMut<'_, E>,
) {
    let mut matrix = matrix;
    let n = matrix.ncols();
    if n == 0 || matrix.nrows() == 0 {
        return;
    }
    assert!(all(c.len() == n - 1, s.len() == n - 1));

    let mut rotate = |j: usize| {
        let rot = JacobiRotation { c: c[j], s: s[j] };
        if rot.is_identity() {
            return;
        }
        let (a, b) = match pivot {
            Pivot::Variable => (j, j + 1),
            Pivot::Top => (0, j + 1),
            Pivot::Bottom => (j, n - 1),
        };
        let (x, y) = two_cols_mut(matrix.rb_mut(), a, b);
        rot.apply_in_place(x, y);
    };

    match direction {
        Direction::Forward => (0..n - 1).for_each(&mut rotate),
        Direction::Backward => (0..n - 1).rev().for_each(&mut rotate),
    }
}

/// Applies a sequence of plane rotations to the rows of `matrix`, `A := Pᵀ * A`. This is
/// [`apply_rotation_sequence_on_the_right_in_place`] applied to the transpose of `matrix`.
///
/// # Panics
/// Panics if `c` or `s` does not have length `nrows - 1`.
#[track_caller]
pub fn apply_rotation_sequence_on_the_left_in_place<E: RealField>(
    pivot: Pivot,
    direction: Direction,
    c: &[E],
    s: &[E],
    matrix: MatMut<'_, E>,
) {
    apply_rotation_sequence_on_the_right_in_place(pivot, direction, c, s, matrix.transpose_mut())
}
