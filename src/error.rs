//! Argument validation errors.
//!
//! Routines of the eigenvalue pipeline check their arguments before touching any buffer. On
//! misuse they return an [`ArgumentError`] naming the routine and the 1-based position of the
//! offending parameter, and leave every input untouched.
//!
//! Failure of the iterative eigensolver to converge is not an error: it is reported through
//! [`Convergence`](crate::linalg::evd::tridiag_qr_algorithm::Convergence).

use thiserror::Error;

/// Invalid argument passed to a routine.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("argument #{position} of `{routine}` is invalid: {kind}")]
pub struct ArgumentError {
    /// Name of the routine that rejected the call.
    pub routine: &'static str,
    /// 1-based position of the offending parameter in the routine signature.
    pub position: usize,
    /// What is wrong with it.
    pub kind: ArgumentErrorKind,
}

/// Kind of argument misuse.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArgumentErrorKind {
    #[error("expected a square matrix, found a {nrows}x{ncols} matrix")]
    NotSquare { nrows: usize, ncols: usize },

    #[error("expected a {expected_nrows}x{expected_ncols} matrix, found a {nrows}x{ncols} matrix")]
    DimensionMismatch {
        expected_nrows: usize,
        expected_ncols: usize,
        nrows: usize,
        ncols: usize,
    },

    #[error("expected at least as many rows as columns, found a {nrows}x{ncols} matrix")]
    MoreColumnsThanRows { nrows: usize, ncols: usize },

    #[error("expected a length of {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("expected a length of at most {max}, found {found}")]
    LengthTooLarge { max: usize, found: usize },

    #[error("leading dimension {found} is smaller than the minimum {min}")]
    LeadingDimensionTooSmall { min: usize, found: usize },

    #[error("slice of length {found} cannot hold the {required} addressed elements")]
    SliceTooShort { required: usize, found: usize },

    #[error("scaling factors must not be NaN, and the source factor must be nonzero")]
    InvalidScale,

    #[error("convergence tolerance must be positive and finite")]
    InvalidTolerance,
}

impl ArgumentError {
    #[inline]
    pub(crate) fn new(routine: &'static str, position: usize, kind: ArgumentErrorKind) -> Self {
        Self {
            routine,
            position,
            kind,
        }
    }
}

/// Returns an error unless `actual == expected`.
#[inline]
pub(crate) fn check_len(
    routine: &'static str,
    position: usize,
    expected: usize,
    actual: usize,
) -> Result<(), ArgumentError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ArgumentError::new(
            routine,
            position,
            ArgumentErrorKind::LengthMismatch {
                expected,
                found: actual,
            },
        ))
    }
}

/// Returns an error unless the matrix has the given shape.
#[inline]
pub(crate) fn check_shape(
    routine: &'static str,
    position: usize,
    (expected_nrows, expected_ncols): (usize, usize),
    (nrows, ncols): (usize, usize),
) -> Result<(), ArgumentError> {
    if (nrows, ncols) == (expected_nrows, expected_ncols) {
        Ok(())
    } else {
        Err(ArgumentError::new(
            routine,
            position,
            ArgumentErrorKind::DimensionMismatch {
                expected_nrows,
                expected_ncols,
                nrows,
                ncols,
            },
        ))
    }
}

/// Returns an error unless the matrix is square.
#[inline]
pub(crate) fn check_square(
    routine: &'static str,
    position: usize,
    (nrows, ncols): (usize, usize),
) -> Result<(), ArgumentError> {
    if nrows == ncols {
        Ok(())
    } else {
        Err(ArgumentError::new(
            routine,
            position,
            ArgumentErrorKind::NotSquare { nrows, ncols },
        ))
    }
}
