use crate::{
    error::{ArgumentError, ArgumentErrorKind},
    mat::col_from_slice_mut,
    MatMut, RealField,
};

/// Calls `apply` with a sequence of factors whose product is `cto / cfrom`, each of which can be
/// applied to a representable value without overflow or underflow of the intermediate results.
fn for_each_safe_factor<E: RealField>(cfrom: E, cto: E, mut apply: impl FnMut(E)) {
    let small = E::safe_min();
    let big = small.recip();

    let mut cfrom = cfrom;
    let mut cto = cto;
    loop {
        let cfrom1 = cfrom * small;
        let mul;
        let done;
        if cfrom1 == cfrom {
            // cfrom is infinite, the result is a signed zero or NaN
            mul = cto / cfrom;
            done = true;
        } else {
            let cto1 = cto / big;
            if cto1 == cto {
                // cto is zero or infinite
                mul = cto;
                done = true;
            } else if cfrom1.abs() > cto.abs() && cto != E::zero() {
                mul = small;
                done = false;
                cfrom = cfrom1;
            } else if cto1.abs() > cfrom.abs() {
                mul = big;
                done = false;
                cto = cto1;
            } else {
                mul = cto / cfrom;
                done = true;
                if mul == E::one() {
                    return;
                }
            }
        }

        apply(mul);
        if done {
            return;
        }
    }
}

fn check_scales<E: RealField>(routine: &'static str, cfrom: E, cto: E) -> Result<(), ArgumentError> {
    if cfrom == E::zero() || cfrom.is_nan() {
        return Err(ArgumentError::new(routine, 1, ArgumentErrorKind::InvalidScale));
    }
    if cto.is_nan() {
        return Err(ArgumentError::new(routine, 2, ArgumentErrorKind::InvalidScale));
    }
    Ok(())
}

/// Multiplies the elements of `x` by `cto / cfrom`, without overflow or underflow as long as the
/// final result is representable.
///
/// # Errors
/// Returns an error if `cfrom` is zero or NaN, or if `cto` is NaN. `x` is left untouched in
/// that case.
pub fn rescale<E: RealField>(cfrom: E, cto: E, x: MatMut<'_, E>) -> Result<(), ArgumentError> {
    check_scales("rescale", cfrom, cto)?;
    rescale_unchecked(cfrom, cto, x);
    Ok(())
}

/// Multiplies the elements of `x` by `cto / cfrom`, without overflow or underflow as long as the
/// final result is representable.
///
/// # Errors
/// Returns an error if `cfrom` is zero or NaN, or if `cto` is NaN. `x` is left untouched in
/// that case.
pub fn rescale_slice<E: RealField>(cfrom: E, cto: E, x: &mut [E]) -> Result<(), ArgumentError> {
    check_scales("rescale_slice", cfrom, cto)?;
    rescale_unchecked(cfrom, cto, col_from_slice_mut(x));
    Ok(())
}

/// Same as [`rescale`], for callers that already validated the scales.
pub(crate) fn rescale_unchecked<E: RealField>(cfrom: E, cto: E, x: MatMut<'_, E>) {
    let mut x = x;
    for_each_safe_factor(cfrom, cto, |mul| {
        for j in 0..x.ncols() {
            for i in 0..x.nrows() {
                x.write(i, j, x.read(i, j) * mul);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, Mat};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn ordinary_ratio() {
        let mut x = [1.0, -2.0, 4.0];
        rescale_slice(4.0, 1.0, &mut x).unwrap();
        assert!(x == [0.25, -0.5, 1.0]);
    }

    #[test]
    fn extreme_ratio_without_overflow() {
        // cto / cfrom overflows, but the scaled values are representable
        let mut x = [1e-300f64, -3e-300];
        rescale_slice(1e-300, 1e300, &mut x).unwrap();
        assert_approx_eq!(x[0] / 1e300, 1.0, 1e-14);
        assert_approx_eq!(x[1] / 1e300, -3.0, 1e-14);

        let mut a = Mat::from_fn(2, 2, |i, j| (1 + i + j) as f64 * 1e300);
        rescale(1e300, 1e-300, a.as_mut()).unwrap();
        assert_approx_eq!(a.read(1, 1) / 1e-300, 3.0, 1e-14);
    }

    #[test]
    fn zero_target() {
        let mut x = [1.0, f64::MAX];
        rescale_slice(2.0, 0.0, &mut x).unwrap();
        assert!(x == [0.0, 0.0]);
    }

    #[test]
    fn invalid_scales_leave_input_untouched() {
        let mut x = [1.0, 2.0];
        let err = rescale_slice(0.0, 1.0, &mut x).unwrap_err();
        assert!(all(err.position == 1, err.kind == ArgumentErrorKind::InvalidScale));
        let err = rescale_slice(1.0, f64::NAN, &mut x).unwrap_err();
        assert!(err.position == 2);
        assert!(x == [1.0, 2.0]);
    }
}
