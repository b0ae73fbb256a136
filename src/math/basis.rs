//! Memory-polynomial basis terms.
//!
//! A single basis term for a delayed sample `x` is:
//!
//! - `φ_p(x) = x · |x|^(p-1)`, for `p = 1..=P`
//!
//! Numerical notes:
//! - `p = 1` is the pure delay tap. It returns `x` unchanged (no multiply), so
//!   the column equals the raw sample bit-for-bit, including `x = 0` where the
//!   convention `0^0 = 1` applies.
//! - Higher powers use `powi` on the precomputed magnitude.

use num_complex::Complex64;

/// Evaluate `x · magnitude^(power-1)`.
///
/// `magnitude` is expected to be `|x|`; it is passed in so callers can reuse a
/// magnitude computed once per sample across all powers.
pub fn basis_term(x: Complex64, magnitude: f64, power: usize) -> Complex64 {
    match power {
        0 | 1 => x,
        2 => x * magnitude,
        _ => x * pow_magnitude(magnitude, power - 1),
    }
}

fn pow_magnitude(magnitude: f64, exponent: usize) -> f64 {
    match i32::try_from(exponent) {
        Ok(e) => magnitude.powi(e),
        Err(_) => magnitude.powf(exponent as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_power_is_identity() {
        let x = Complex64::new(0.3, -1.7);
        assert_eq!(basis_term(x, x.norm(), 1), x);

        let zero = Complex64::new(0.0, 0.0);
        assert_eq!(basis_term(zero, 0.0, 1), zero);
    }

    #[test]
    fn higher_powers_scale_by_magnitude() {
        let x = Complex64::new(3.0, 4.0);
        let v = basis_term(x, x.norm(), 3);
        assert!((v - x * 25.0).norm() < 1e-12);
    }

    #[test]
    fn zero_sample_higher_powers_vanish() {
        let zero = Complex64::new(0.0, 0.0);
        assert_eq!(basis_term(zero, 0.0, 4), zero);
    }
}
