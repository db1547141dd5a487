//! Scalar rescaling primitives shared by every mapper

/// Affine remap of `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// No clamping is applied: values outside the input interval extrapolate
/// along the same line. The input span must be non-zero.
pub fn linear_rescale(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Restrict `value` to the closed interval `[min, max]`.
///
/// Works for integers and reals alike. NaN compares false both ways and
/// comes back unchanged.
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
