//! Range clamping that tolerates non-finite input.

/// Clamp `value` into `[lo, hi]`.
///
/// NaN maps to `lo`; infinities saturate to the matching bound. Unlike
/// `f64::clamp`, this never panics when `lo > hi`: the bounds are swapped.
pub fn clamp_range(value: f64, lo: f64, hi: f64) -> f64 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if value.is_nan() {
        return lo;
    }
    value.max(lo).min(hi)
}

/// Ceiling of a non-negative ratio, saturated at `cap`.
///
/// Used for step counts such as "days until a threshold is crossed".
/// Non-finite or negative ratios return `cap`.
pub fn ceil_capped(ratio: f64, cap: u32) -> u32 {
    if !ratio.is_finite() || ratio < 0.0 {
        return cap;
    }
    let steps = ratio.ceil();
    if steps >= cap as f64 {
        cap
    } else {
        steps as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_range_basic() {
        assert_eq!(clamp_range(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp_range(-3.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp_range(30.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn clamp_range_non_finite() {
        assert_eq!(clamp_range(f64::NAN, 1.0, 10.0), 1.0);
        assert_eq!(clamp_range(f64::INFINITY, 1.0, 10.0), 10.0);
        assert_eq!(clamp_range(f64::NEG_INFINITY, 1.0, 10.0), 1.0);
    }

    #[test]
    fn clamp_range_swapped_bounds() {
        assert_eq!(clamp_range(20.0, 10.0, 0.0), 10.0);
    }

    #[test]
    fn ceil_capped_rounds_up() {
        assert_eq!(ceil_capped(2.5, 365), 3);
        assert_eq!(ceil_capped(3.0, 365), 3);
        assert_eq!(ceil_capped(0.0, 365), 0);
    }

    #[test]
    fn ceil_capped_saturates() {
        assert_eq!(ceil_capped(10_000.0, 365), 365);
        assert_eq!(ceil_capped(f64::INFINITY, 365), 365);
        assert_eq!(ceil_capped(-1.0, 365), 365);
    }
}
