use crate::RealField;

/// Running sum of squares kept as `scale² * sumsq`, with `scale` the largest magnitude seen so
/// far and `sumsq >= 1` once a nonzero value was pushed.
///
/// Squaring normalized values instead of raw ones keeps the accumulation free of overflow and
/// of harmful underflow, for any finite input.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SumOfSquares<E> {
    /// Largest absolute value seen so far.
    pub scale: E,
    /// Sum of the squares of the values, divided by `scale²`.
    pub sumsq: E,
}

impl<E: RealField> Default for SumOfSquares<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RealField> SumOfSquares<E> {
    /// Returns an empty accumulator, which represents a sum of zero.
    #[inline]
    pub fn new() -> Self {
        Self {
            scale: E::zero(),
            sumsq: E::one(),
        }
    }

    /// Adds `value²` to the sum.
    #[inline]
    pub fn push(&mut self, value: E) {
        if value == E::zero() {
            return;
        }
        let abs = value.abs();
        if self.scale < abs || abs.is_nan() {
            let ratio = self.scale / abs;
            self.sumsq = E::one() + self.sumsq * ratio * ratio;
            self.scale = abs;
        } else {
            let ratio = abs / self.scale;
            self.sumsq = self.sumsq + ratio * ratio;
        }
    }

    /// Merges the partial sum `other` into `self`.
    #[inline]
    pub fn combine(&mut self, other: Self) {
        if self.scale >= other.scale {
            if self.scale != E::zero() {
                let ratio = other.scale / self.scale;
                self.sumsq = self.sumsq + ratio * ratio * other.sumsq;
            } else {
                self.sumsq = self.sumsq + other.sumsq;
            }
        } else {
            let ratio = self.scale / other.scale;
            self.sumsq = other.sumsq + ratio * ratio * self.sumsq;
            self.scale = other.scale;
        }
    }

    /// Returns the square root of the accumulated sum, `scale * sqrt(sumsq)`.
    #[inline]
    pub fn norm(&self) -> E {
        self.scale * self.sumsq.sqrt()
    }
}

impl<E: RealField> Extend<E> for SumOfSquares<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<E: RealField> FromIterator<E> for SumOfSquares<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn matches_naive_sum() {
        let values = [3.0, -4.0, 0.0, 12.0];
        let acc: SumOfSquares<f64> = values.iter().copied().collect();
        assert!(acc.scale == 12.0);
        assert_approx_eq!(acc.norm(), 13.0, 1e-14);
        assert!(SumOfSquares::<f64>::new().norm() == 0.0);
    }

    #[test]
    fn no_overflow_or_underflow() {
        let big: SumOfSquares<f64> = [1e300, 1e300].into_iter().collect();
        assert_approx_eq!(big.norm() / 1e300, 2.0f64.sqrt(), 1e-14);

        let tiny: SumOfSquares<f64> = [3e-300, 4e-300].into_iter().collect();
        assert_approx_eq!(tiny.norm() / 1e-300, 5.0, 1e-13);
    }

    #[test]
    fn combine_partial_sums() {
        let mut lhs: SumOfSquares<f64> = [1.0, 2.0].into_iter().collect();
        let rhs: SumOfSquares<f64> = [1e10, 2.0].into_iter().collect();
        lhs.combine(rhs);
        let expected = (1.0f64 + 4.0 + 1e20 + 4.0).sqrt();
        assert_approx_eq!(lhs.norm() / expected, 1.0, 1e-15);

        let mut empty = SumOfSquares::<f64>::new();
        empty.combine([6.0, 8.0].into_iter().collect());
        assert_approx_eq!(empty.norm(), 10.0, 1e-14);
    }

    #[test]
    fn nan_propagates() {
        let acc: SumOfSquares<f64> = [1.0, f64::NAN, 2.0].into_iter().collect();
        assert!(acc.norm().is_nan());
    }
}
