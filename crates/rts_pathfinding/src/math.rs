//! Fixed-point math utilities for deterministic cost calculation.
//!
//! Movement costs are plain integers, but the diagonal step factor is
//! irrational. Floating-point results can differ between CPUs and compilers,
//! so the factor is applied through a fixed-point constant defined by its
//! raw bits.

use fixed::types::I32F32;

use crate::grid::Cost;

/// Fixed-point number type for intermediate cost math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// `sqrt(2)` as raw `I32F32` bits (`round(sqrt(2) * 2^32)`).
pub const SQRT_2: Fixed = Fixed::from_bits(6_074_001_000);

/// Multiplies an integer cost by `sqrt(2)`, rounding to the nearest integer.
///
/// Saturates instead of overflowing for absurdly large costs.
#[must_use]
pub fn multiply_by_sqrt2(cost: Cost) -> Cost {
    Fixed::saturating_from_num(cost)
        .saturating_mul(SQRT_2)
        .saturating_round()
        .saturating_to_num::<Cost>()
}

/// Scales a cost by a permille factor (`1000` leaves it unchanged).
#[must_use]
pub fn scale_permille(cost: u64, permille: u32) -> u64 {
    cost.saturating_mul(u64::from(permille)) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt2_constant_precision() {
        // 1.41421356 within 1e-8
        let reference = Fixed::from_num(141_421_356) / Fixed::from_num(100_000_000);
        let epsilon = Fixed::ONE / Fixed::from_num(100_000_000);
        assert!((SQRT_2 - reference).abs() < epsilon);
    }

    #[test]
    fn test_multiply_by_sqrt2() {
        assert_eq!(multiply_by_sqrt2(0), 0);
        assert_eq!(multiply_by_sqrt2(1), 1);
        assert_eq!(multiply_by_sqrt2(24), 34);
        assert_eq!(multiply_by_sqrt2(100), 141);
        assert_eq!(multiply_by_sqrt2(150), 212);
        assert_eq!(multiply_by_sqrt2(200), 283);
    }

    #[test]
    fn test_multiply_by_sqrt2_is_monotonic() {
        let mut previous = 0;
        for cost in 0..2000 {
            let scaled = multiply_by_sqrt2(cost);
            assert!(scaled >= previous);
            previous = scaled;
        }
    }

    #[test]
    fn test_multiply_by_sqrt2_saturates() {
        let saturated = multiply_by_sqrt2(Cost::MAX);
        assert_eq!(saturated, multiply_by_sqrt2(Cost::MAX - 1));
        assert!(saturated > multiply_by_sqrt2(1_000_000));
    }

    #[test]
    fn test_scale_permille() {
        assert_eq!(scale_permille(14_142, 1000), 14_142);
        assert_eq!(scale_permille(14_142, 1001), 14_156);
    }
}
