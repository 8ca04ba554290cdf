//! Cubic edge curves: control points for candidate and hand edges.

#[cfg(test)]
#[path = "curve_test.rs"]
mod curve_test;

use crate::camera::Point;
use crate::consts::{MAX_TANGENT, MIN_TANGENT};

/// Horizontal tangent length for a curve between `start` and `end`.
#[must_use]
pub fn control_offset(start: Point, end: Point, zoom: f64) -> f64 {
    let dx = (end.x - start.x).abs();
    (dx * 0.5).max(MIN_TANGENT * zoom).min(MAX_TANGENT * zoom)
}

/// Control points `[p0, p1, p2, p3]` of a horizontal-tangent cubic from `start` to `end`.
///
/// `sign` is `1.0` when the curve leaves `start` to the right (an output port)
/// and `-1.0` when it leaves to the left (an input port).
#[must_use]
pub fn control_points(start: Point, end: Point, sign: f64, zoom: f64) -> [Point; 4] {
    let offset = control_offset(start, end, zoom) * sign;
    [
        start,
        start + Point::new(offset, 0.0),
        end - Point::new(offset, 0.0),
        end,
    ]
}

/// Rotation in degrees, clockwise from screen-up, of the direction `from -> toward`.
///
/// Screen space is y-down, so "up" is `(0, -1)`.
#[must_use]
pub fn rotation_deg(from: Point, toward: Point) -> f64 {
    let v = toward - from;
    if v.is_zero() {
        return 0.0;
    }
    v.x.atan2(-v.y).to_degrees()
}
