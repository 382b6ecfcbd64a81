//! Triangular matrix multiplication.

use super::accumulate;
use crate::{assert, MatMut, MatRef, RealField};

/// Part of an operand that [`matmul`] reads or writes. Entries outside of it are treated as
/// zero, except for the implicit unit diagonal of the `Unit*` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStructure {
    Rectangular,
    /// Diagonal and below.
    TriangularLower,
    /// Below the diagonal, with a zero diagonal.
    StrictTriangularLower,
    /// Below the diagonal, with a unit diagonal that is never read.
    UnitTriangularLower,
    /// Diagonal and above.
    TriangularUpper,
    /// Above the diagonal, with a zero diagonal.
    StrictTriangularUpper,
    /// Above the diagonal, with a unit diagonal that is never read.
    UnitTriangularUpper,
}

impl BlockStructure {
    #[inline]
    pub fn is_dense(self) -> bool {
        self == BlockStructure::Rectangular
    }

    /// Returns `true` for the three lower variants.
    #[inline]
    pub fn is_lower(self) -> bool {
        matches!(
            self,
            Self::TriangularLower | Self::StrictTriangularLower | Self::UnitTriangularLower
        )
    }

    /// Returns `true` for the three upper variants.
    #[inline]
    pub fn is_upper(self) -> bool {
        matches!(
            self,
            Self::TriangularUpper | Self::StrictTriangularUpper | Self::UnitTriangularUpper
        )
    }

    /// Whether the element at `(i, j)` belongs to the accessed part.
    #[inline(always)]
    fn contains(self, i: usize, j: usize) -> bool {
        use BlockStructure::*;
        match self {
            Rectangular => true,
            TriangularLower => i >= j,
            StrictTriangularLower | UnitTriangularLower => i > j,
            TriangularUpper => i <= j,
            StrictTriangularUpper | UnitTriangularUpper => i < j,
        }
    }

    #[inline(always)]
    fn is_unit(self) -> bool {
        matches!(
            self,
            BlockStructure::UnitTriangularLower | BlockStructure::UnitTriangularUpper
        )
    }

    /// Reads the element at `(i, j)` of the matrix described by `self`: elements outside the
    /// accessed part are zero, and the diagonal of a unit triangular matrix is one. Only
    /// elements inside the accessed part are read from memory.
    #[inline(always)]
    fn read<E: RealField>(self, mat: MatRef<'_, E>, i: usize, j: usize) -> E {
        if self.contains(i, j) {
            mat.read(i, j)
        } else if i == j && self.is_unit() {
            E::one()
        } else {
            E::zero()
        }
    }
}

/// Computes `acc := alpha * acc + beta * lhs * rhs`, where each operand is interpreted
/// according to its block structure. Only the part of `acc` described by `acc_structure` is
/// written to, and only the accessed parts of `lhs` and `rhs` are read.
///
/// If `alpha` is `None`, the written part of `acc` is overwritten without being read.
///
/// # Panics
/// Panics if the shapes are incompatible, or if a triangular operand is not square.
#[track_caller]
pub fn matmul<E: RealField>(
    acc: MatMut<'_, E>,
    acc_structure: BlockStructure,
    lhs: MatRef<'_, E>,
    lhs_structure: BlockStructure,
    rhs: MatRef<'_, E>,
    rhs_structure: BlockStructure,
    alpha: Option<E>,
    beta: E,
) {
    let mut acc = acc;
    assert!(all(
        acc.nrows() == lhs.nrows(),
        acc.ncols() == rhs.ncols(),
        lhs.ncols() == rhs.nrows(),
    ));
    if !acc_structure.is_dense() {
        assert!(acc.nrows() == acc.ncols());
    }
    if !lhs_structure.is_dense() {
        assert!(lhs.nrows() == lhs.ncols());
    }
    if !rhs_structure.is_dense() {
        assert!(rhs.nrows() == rhs.ncols());
    }

    let depth = lhs.ncols();
    for j in 0..acc.ncols() {
        for i in 0..acc.nrows() {
            if !acc_structure.contains(i, j) {
                continue;
            }

            // range of k where both lhs(i, k) and rhs(k, j) may be nonzero
            let mut k_start = 0;
            let mut k_end = depth;
            if lhs_structure.is_lower() {
                k_end = Ord::min(k_end, i + 1);
            } else if lhs_structure.is_upper() {
                k_start = Ord::max(k_start, i);
            }
            if rhs_structure.is_lower() {
                k_start = Ord::max(k_start, j);
            } else if rhs_structure.is_upper() {
                k_end = Ord::min(k_end, j + 1);
            }

            let mut dot = E::zero();
            for k in k_start..Ord::max(k_start, k_end) {
                dot = dot + lhs_structure.read(lhs, i, k) * rhs_structure.read(rhs, k, j);
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
