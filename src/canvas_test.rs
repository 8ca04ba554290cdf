#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;

fn port(owner: ElementId, direction: PortDirection, kind: &str) -> PortInfo {
    PortInfo {
        id: Uuid::new_v4(),
        owner,
        direction,
        center: Point::new(10.0, 20.0),
        radius: 6.0,
        connected: false,
        kind: kind.into(),
    }
}

// =============================================================
// PortInfo
// =============================================================

#[test]
fn compatible_opposite_direction_same_kind() {
    let src = port(Uuid::new_v4(), PortDirection::Output, "float");
    let dst = port(Uuid::new_v4(), PortDirection::Input, "float");
    assert!(dst.is_compatible_with(&src));
    assert!(src.is_compatible_with(&dst));
}

#[test]
fn incompatible_same_direction() {
    let src = port(Uuid::new_v4(), PortDirection::Output, "float");
    let dst = port(Uuid::new_v4(), PortDirection::Output, "float");
    assert!(!dst.is_compatible_with(&src));
}

#[test]
fn incompatible_same_owner() {
    let owner = Uuid::new_v4();
    let src = port(owner, PortDirection::Output, "float");
    let dst = port(owner, PortDirection::Input, "float");
    assert!(!dst.is_compatible_with(&src));
}

#[test]
fn incompatible_kind_mismatch() {
    let src = port(Uuid::new_v4(), PortDirection::Output, "float");
    let dst = port(Uuid::new_v4(), PortDirection::Input, "texture");
    assert!(!dst.is_compatible_with(&src));
}

#[test]
fn port_never_compatible_with_itself() {
    let p = port(Uuid::new_v4(), PortDirection::Output, "float");
    assert!(!p.is_compatible_with(&p));
}

#[test]
fn tangent_sign_by_direction() {
    assert_eq!(port(Uuid::new_v4(), PortDirection::Output, "x").tangent_sign(), 1.0);
    assert_eq!(port(Uuid::new_v4(), PortDirection::Input, "x").tangent_sign(), -1.0);
}

#[test]
fn screen_center_follows_camera() {
    let p = port(Uuid::new_v4(), PortDirection::Input, "x");
    let cam = Camera { pan_x: 5.0, pan_y: -5.0, zoom: 2.0 };
    assert_eq!(p.screen_center(&cam), Point::new(25.0, 35.0));
}

// =============================================================
// DragEvent / errors
// =============================================================

#[test]
fn only_updated_and_perform_require_acceptance() {
    assert!(DragEvent::Updated.requires_acceptance());
    assert!(DragEvent::Perform.requires_acceptance());
    assert!(!DragEvent::Enter.requires_acceptance());
    assert!(!DragEvent::Leave.requires_acceptance());
    assert!(!DragEvent::Exited.requires_acceptance());
}

#[test]
fn canvas_error_messages_name_ids() {
    let id = Uuid::nil();
    let err = CanvasError::StackIndexOutOfRange { stack: id, index: 4, len: 2 };
    assert!(err.to_string().contains("4 > 2"));
    assert!(CanvasError::UnknownElement(id).to_string().contains("element not found"));
}

#[test]
fn graph_change_serializes() {
    let change = GraphChange { moved_elements: vec![Uuid::nil()], move_delta: Point::new(50.0, 0.0) };
    let json = serde_json::to_value(&change).unwrap();
    assert_eq!(json["move_delta"]["x"], 50.0);
    assert_eq!(json["moved_elements"].as_array().map(Vec::len), Some(1));
}
