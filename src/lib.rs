//! `symevd` computes eigenvalues and eigenvectors of dense real symmetric matrices.
//!
//! The pipeline is the classic one:
//! 1. reduce the symmetric matrix to tridiagonal form with a sequence of Householder reflectors
//!    ([`linalg::evd::tridiag`]),
//! 2. expand the reflectors into an explicit orthogonal matrix when eigenvectors are needed
//!    ([`linalg::evd::reconstruct`]),
//! 3. extract the eigenpairs of the tridiagonal matrix with the implicitly shifted QL/QR
//!    algorithm ([`linalg::evd::tridiag_qr_algorithm`]).
//!
//! [`linalg::evd::compute_symmetric_evd`] chains the three steps.
//!
//! Matrices are passed as strided views ([`MatRef`], [`MatMut`]), so both column-major and
//! row-major storage are accepted, as well as transposed or reversed views. Routines that need
//! temporary memory take a [`PodStack`](dyn_stack::PodStack) and have a companion function with
//! a `_req` suffix that returns the size of the required workspace.
//!
//! # Example
//! ```
//! use dyn_stack::{GlobalPodBuffer, PodStack};
//! use symevd::{linalg::evd, Mat, Side};
//!
//! let a = Mat::from_fn(3, 3, |i, j| if i == j { 2.0 } else { -1.0f64 });
//! let mut s = vec![0.0; 3];
//! let mut u = Mat::zeros(3, 3);
//!
//! let mut mem = GlobalPodBuffer::new(
//!     evd::compute_symmetric_evd_req::<f64>(3, evd::ComputeVectors::Yes).unwrap(),
//! );
//! let convergence = evd::compute_symmetric_evd(
//!     Side::Lower,
//!     a.as_ref(),
//!     &mut s,
//!     Some(u.as_mut()),
//!     Default::default(),
//!     PodStack::new(&mut mem),
//! )
//! .unwrap();
//!
//! assert!(convergence.is_converged());
//! assert!(s[0].abs() < 1e-12);
//! assert!((s[1] - 3.0).abs() < 1e-12);
//! assert!((s[2] - 3.0).abs() < 1e-12);
//! ```

#![allow(clippy::too_many_arguments)]

use core::fmt::Debug;
use num_traits::Float;

#[allow(unused_imports)]
pub(crate) use equator::{assert, debug_assert};

pub use dyn_stack;
pub use reborrow;

pub mod error;
pub mod linalg;
pub mod mat;

pub use error::{ArgumentError, ArgumentErrorKind};
pub use mat::{Mat, MatMut, MatRef};

/// Which half of a symmetric matrix holds the meaningful entries.
///
/// The other half is never read, and is not assumed to be zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// Entries on and below the diagonal.
    Lower,
    /// Entries on and above the diagonal.
    Upper,
}

impl Side {
    /// Returns the opposite half, which is the half holding the same entries in the transposed
    /// matrix.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Side::Lower => Side::Upper,
            Side::Upper => Side::Lower,
        }
    }
}

/// Real floating point scalar usable by the routines of this crate.
pub trait RealField: Float + bytemuck::Pod + Debug + Send + Sync + 'static {
    /// Converts an `f64` constant to `Self`, rounding if needed.
    fn from_f64(value: f64) -> Self;

    /// Relative machine precision, the distance from 1 to the next representable value.
    #[inline(always)]
    fn eps() -> Self {
        Self::epsilon()
    }

    /// Smallest positive value such that its reciprocal does not overflow.
    #[inline(always)]
    fn safe_min() -> Self {
        Self::min_positive_value()
    }

    /// Reciprocal of [`RealField::safe_min`].
    #[inline(always)]
    fn safe_max() -> Self {
        Self::safe_min().recip()
    }

    /// Returns `self.abs()` with the sign of `sign`.
    #[inline(always)]
    fn copy_sign(self, sign: Self) -> Self {
        if sign.is_sign_negative() {
            -self.abs()
        } else {
            self.abs()
        }
    }
}

impl RealField for f32 {
    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl RealField for f64 {
    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value
    }
}
