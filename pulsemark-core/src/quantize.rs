//! Robust rounding of trend coefficients before hashing.
//!
//! Rounding is `floor(x / step + 0.5) * step`: ties go toward positive
//! infinity and negative inputs floor toward negative infinity, so
//! `-2.5 / 5` lands on `0` and `-7.5 / 5` lands on `-5`. Native `round`
//! (ties away from zero) would disagree with the embedding device on
//! negative ties and must not be used here.

/// Index of the nearest multiple of `step` (round half up).
pub fn robust_index(x: f64, step: f64) -> i64 {
    (x / step + 0.5).floor() as i64
}

/// Round `x` to the nearest multiple of `step`, ties toward positive infinity.
pub fn robust_round(x: f64, step: f64) -> f64 {
    robust_index(x, step) as f64 * step
}

/// Decimal text of a rounded value, as fed into the watermark hash.
///
/// Integral values print without a fractional part and negative zero prints
/// as `0`, so `150.0` becomes `"150"` on both ends of the link.
pub fn decimal_repr(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
