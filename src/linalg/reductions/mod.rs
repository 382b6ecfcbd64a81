//! Norms, scaled sums of squares, and overflow-free rescaling.

mod norm;
mod rescale;
mod sum_of_squares;

pub use norm::{norm_l2, norm_max, symmetric_norm, tridiag_norm, NormKind};
pub use rescale::{rescale, rescale_slice};
pub(crate) use rescale::rescale_unchecked;
pub use sum_of_squares::SumOfSquares;

/// Updates `max` with `value`, letting a NaN win over any number.
#[inline(always)]
pub(crate) fn max_propagate_nan<E: crate::RealField>(max: E, value: E) -> E {
    if max < value || value.is_nan() {
        value
    } else {
        max
    }
}
