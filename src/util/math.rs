//! Channel transfer helpers for normalized and linear-light comparisons.

/// Exponent used to approximate the sRGB transfer curve.
pub(crate) const GAMMA: f64 = 2.2;

/// Maps an 8-bit channel value into `[0, 1]`.
#[inline]
pub(crate) fn unit(value: u8) -> f64 {
    f64::from(value) / 255.0
}

/// Converts a normalized gamma-encoded value into approximately linear light.
#[inline]
pub(crate) fn linearize(value: f64) -> f64 {
    value.powf(GAMMA)
}

/// Converts linear light back to a gamma-encoded 8-bit value, truncating.
#[inline]
pub(crate) fn encode_truncated(linear: f64) -> u8 {
    let scaled = linear.powf(1.0 / GAMMA) * 255.0;
    scaled.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::{encode_truncated, linearize, unit};

    #[test]
    fn unit_spans_zero_to_one() {
        assert_eq!(unit(0), 0.0);
        assert_eq!(unit(255), 1.0);
        assert!((unit(51) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn linearize_keeps_endpoints() {
        assert_eq!(linearize(0.0), 0.0);
        assert_eq!(linearize(1.0), 1.0);
        assert!(linearize(0.5) < 0.5);
    }

    #[test]
    fn encode_truncates_toward_zero() {
        assert_eq!(encode_truncated(0.0), 0);
        assert_eq!(encode_truncated(1.0), 255);
        let mid = encode_truncated(linearize(unit(128)));
        assert!(mid == 127 || mid == 128);
    }
}
