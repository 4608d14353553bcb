//! Error measures for comparing a transform against a reference.
//!
//! All functions take the reference first and fail with
//! [`NfftError::ShapeMismatch`] if the approximation has a different length.

use rustfft::num_complex::Complex64;

use crate::error::{Buffer, NfftError, Result};

fn diffs<'a>(
    reference: &'a [Complex64],
    approx: &'a [Complex64],
) -> Result<impl Iterator<Item = f64> + 'a> {
    if reference.len() != approx.len() {
        return Err(NfftError::ShapeMismatch {
            buffer: Buffer::Approximation,
            expected: reference.len(),
            actual: approx.len(),
        });
    }
    Ok(reference.iter().zip(approx).map(|(a, b)| (*a - *b).norm()))
}

fn relative(err: f64, scale: f64) -> f64 {
    if scale > 0.0 {
        err / scale
    } else {
        err
    }
}

/// Largest absolute difference.
pub fn max_abs_diff(reference: &[Complex64], approx: &[Complex64]) -> Result<f64> {
    Ok(diffs(reference, approx)?.fold(0.0, f64::max))
}

/// `max |x - y| / max |x|`. Falls back to the absolute error when the
/// reference is zero.
pub fn error_l_infty(reference: &[Complex64], approx: &[Complex64]) -> Result<f64> {
    let err = max_abs_diff(reference, approx)?;
    let scale = reference.iter().map(|v| v.norm()).fold(0.0, f64::max);
    Ok(relative(err, scale))
}

/// `max |x - y| / sum |z|`, the usual bound for a transform of `z`.
pub fn error_l_infty_1(
    reference: &[Complex64],
    approx: &[Complex64],
    input: &[Complex64],
) -> Result<f64> {
    let err = max_abs_diff(reference, approx)?;
    let scale: f64 = input.iter().map(|v| v.norm()).sum();
    Ok(relative(err, scale))
}

/// `||x - y||_2 / ||x||_2`.
pub fn error_l_2(reference: &[Complex64], approx: &[Complex64]) -> Result<f64> {
    let err = diffs(reference, approx)?.map(|d| d * d).sum::<f64>().sqrt();
    let scale = reference.iter().map(|v| v.norm_sqr()).sum::<f64>().sqrt();
    Ok(relative(err, scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn measures() {
        let x = [c(3.0, 4.0), c(0.0, 1.0)];
        let y = [c(3.0, 4.5), c(0.0, 1.0)];
        assert_eq!(max_abs_diff(&x, &y), Ok(0.5));
        assert_eq!(error_l_infty(&x, &y), Ok(0.1));
        assert_eq!(
            error_l_infty_1(&x, &y, &[c(1.0, 0.0), c(0.0, -1.0)]),
            Ok(0.25)
        );
        assert!((error_l_2(&x, &y).unwrap() - 0.5 / 26f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn zero_reference_gives_absolute_error() {
        let zero = [c(0.0, 0.0); 2];
        let y = [c(0.0, 2.0), c(0.0, 0.0)];
        assert_eq!(error_l_infty(&zero, &y), Ok(2.0));
        assert_eq!(error_l_2(&zero, &y), Ok(2.0));
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let expected = Err(NfftError::ShapeMismatch {
            buffer: Buffer::Approximation,
            expected: 1,
            actual: 0,
        });
        assert_eq!(max_abs_diff(&[c(1.0, 0.0)], &[]), expected);
        assert_eq!(error_l_infty(&[c(1.0, 0.0)], &[]), expected);
        assert_eq!(error_l_2(&[c(1.0, 0.0)], &[]), expected);
        assert_eq!(error_l_infty_1(&[c(1.0, 0.0)], &[], &[]), expected);
    }
}
