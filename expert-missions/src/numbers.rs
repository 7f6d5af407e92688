//! Numeric conversion helpers centralizing rounding and safe numeric casts.
//!
//! The host engine rounds half-way values to the nearest even integer, so
//! every price, reputation and day offset goes through these helpers to
//! stay in agreement with it.

use num_traits::cast::cast;

/// Round a f64 half-to-even and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round_ties_even();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Round a f64 half-to-even and clamp it to the u32 range, returning 0 for non-finite values.
#[must_use]
pub fn round_f64_to_u32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(0.0, max).round_ties_even();
    cast::<f64, u32>(clamped).unwrap_or(0)
}

/// Convert a collection length to f64 in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
#[must_use]
pub fn lerp_clamped(a: f64, b: f64, t: f64) -> f64 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    a + (b - a) * t
}
