#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

// --- control_offset ---

#[test]
fn control_offset_is_half_horizontal_span() {
    let off = control_offset(Point::new(0.0, 0.0), Point::new(120.0, 50.0), 1.0);
    assert!(approx_eq(off, 60.0));
}

#[test]
fn control_offset_clamped_low() {
    let off = control_offset(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0);
    assert!(approx_eq(off, MIN_TANGENT));
}

#[test]
fn control_offset_clamped_high_scales_with_zoom() {
    let off = control_offset(Point::new(0.0, 0.0), Point::new(1000.0, 0.0), 2.0);
    assert!(approx_eq(off, MAX_TANGENT * 2.0));
}

// --- control_points ---

#[test]
fn control_points_output_leaves_right() {
    let pts = control_points(Point::new(0.0, 0.0), Point::new(200.0, 0.0), 1.0, 1.0);
    assert_eq!(pts[0], Point::new(0.0, 0.0));
    assert_eq!(pts[1], Point::new(100.0, 0.0));
    assert_eq!(pts[2], Point::new(100.0, 0.0));
    assert_eq!(pts[3], Point::new(200.0, 0.0));
}

#[test]
fn control_points_input_leaves_left() {
    let pts = control_points(Point::new(0.0, 0.0), Point::new(-200.0, 0.0), -1.0, 1.0);
    assert_eq!(pts[1], Point::new(-100.0, 0.0));
    assert_eq!(pts[2], Point::new(-100.0, 0.0));
}

// --- rotation_deg ---

#[test]
fn rotation_up_is_zero() {
    assert!(approx_eq(rotation_deg(Point::ZERO, Point::new(0.0, -10.0)), 0.0));
}

#[test]
fn rotation_right_is_quarter_turn_clockwise() {
    assert!(approx_eq(rotation_deg(Point::ZERO, Point::new(10.0, 0.0)), 90.0));
}

#[test]
fn rotation_left_is_quarter_turn_counterclockwise() {
    assert!(approx_eq(rotation_deg(Point::ZERO, Point::new(-10.0, 0.0)), -90.0));
}

#[test]
fn rotation_degenerate_is_zero() {
    assert_eq!(rotation_deg(Point::new(3.0, 3.0), Point::new(3.0, 3.0)), 0.0);
}
