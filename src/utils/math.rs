use std::f64::consts::PI;

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Convert radians to degrees
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Normalise a heading in degrees into [0, 360).
pub fn wrap_heading_deg(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Reduce an angle in degrees into (-180, 180].
pub fn reduce_reflex_angle_deg(angle: f64) -> f64 {
    let wrapped = wrap_heading_deg(angle);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Signed shortest rotation from `current` to `target`, both in degrees.
///
/// Positive means the target lies clockwise of the current heading.
pub fn shortest_signed_angle_deg(target: f64, current: f64) -> f64 {
    reduce_reflex_angle_deg(target - current)
}
