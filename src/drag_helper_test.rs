#![allow(clippy::float_cmp)]

use super::*;
use crate::camera::Rect;
use crate::scene::{Scene, SceneEvent};

struct Ports {
    out: PortId,
    inp: PortId,
    other_kind: PortId,
    same_dir: PortId,
    own_input: PortId,
}

fn scene_with_ports() -> (Scene, Ports) {
    let mut scene = Scene::new(800.0, 600.0);
    let a = scene.add_node(Rect::new(20.0, 80.0, 80.0, 40.0));
    let b = scene.add_node(Rect::new(400.0, 80.0, 80.0, 40.0));
    let c = scene.add_node(Rect::new(400.0, 300.0, 80.0, 40.0));
    let out = scene.add_port(a, PortDirection::Output, Point::new(80.0, 20.0), "float");
    let own_input = scene.add_port(a, PortDirection::Input, Point::new(0.0, 20.0), "float");
    let inp = scene.add_port(b, PortDirection::Input, Point::new(0.0, 20.0), "float");
    let other_kind = scene.add_port(c, PortDirection::Input, Point::new(0.0, 20.0), "texture");
    let same_dir = scene.add_port(c, PortDirection::Output, Point::new(80.0, 20.0), "float");
    (scene, Ports { out, inp, other_kind, same_dir, own_input })
}

#[test]
fn begin_filters_compatible_ports() {
    let (scene, ports) = scene_with_ports();
    let mut helper = PortDragHelper::new();
    assert!(helper.begin(&scene, ports.out));
    assert_eq!(helper.compatible_ports(), &[ports.inp]);
    assert_eq!(helper.source(), Some(ports.out));
    for excluded in [ports.other_kind, ports.same_dir, ports.own_input, ports.out] {
        assert!(!helper.compatible_ports().contains(&excluded));
    }
}

#[test]
fn begin_unknown_port_refused() {
    let (scene, _) = scene_with_ports();
    let mut helper = PortDragHelper::new();
    assert!(!helper.begin(&scene, uuid::Uuid::new_v4()));
    assert!(helper.compatible_ports().is_empty());
}

#[test]
fn complete_on_port_connects_output_to_input() {
    let (mut scene, ports) = scene_with_ports();
    let mut helper = PortDragHelper::new();
    helper.begin(&scene, ports.out);
    let outcome = helper.complete(&mut scene, Point::new(403.0, 102.0));
    let expected = EdgeConnection { output: ports.out, input: ports.inp };
    assert_eq!(outcome, Some(DropOutcome::Connected(expected)));
    assert_eq!(scene.connections(), vec![expected]);
}

#[test]
fn complete_from_input_orients_connection() {
    let (mut scene, ports) = scene_with_ports();
    let mut helper = PortDragHelper::new();
    helper.begin(&scene, ports.inp);
    // out is at (100, 100)
    let outcome = helper.complete(&mut scene, Point::new(100.0, 100.0));
    assert_eq!(
        outcome,
        Some(DropOutcome::Connected(EdgeConnection { output: ports.out, input: ports.inp }))
    );
}

#[test]
fn complete_away_from_ports_drops_outside() {
    let (mut scene, ports) = scene_with_ports();
    scene.set_camera(crate::camera::Camera { pan_x: 50.0, pan_y: 0.0, zoom: 2.0 });
    let mut helper = PortDragHelper::new();
    helper.begin(&scene, ports.out);
    let outcome = helper.complete(&mut scene, Point::new(250.0, 500.0));
    assert_eq!(outcome, Some(DropOutcome::Outside(Point::new(100.0, 250.0))));
    assert_eq!(
        scene.events(),
        &[SceneEvent::DroppedOutside { source: ports.out, at: Point::new(100.0, 250.0) }]
    );
}

#[test]
fn complete_on_incompatible_port_drops_outside() {
    let (mut scene, ports) = scene_with_ports();
    let mut helper = PortDragHelper::new();
    helper.begin(&scene, ports.out);
    // other_kind sits at (400, 320)
    let outcome = helper.complete(&mut scene, Point::new(400.0, 320.0));
    assert!(matches!(outcome, Some(DropOutcome::Outside(_))));
    assert!(scene.connections().is_empty());
}

#[test]
fn complete_without_begin_is_none() {
    let (mut scene, _) = scene_with_ports();
    let mut helper = PortDragHelper::new();
    assert_eq!(helper.complete(&mut scene, Point::new(400.0, 100.0)), None);
    assert!(scene.events().is_empty());
}

#[test]
fn reset_forgets_drag() {
    let (scene, ports) = scene_with_ports();
    let mut helper = PortDragHelper::new();
    helper.begin(&scene, ports.out);
    helper.reset();
    assert_eq!(helper.source(), None);
    assert!(helper.compatible_ports().is_empty());
}

struct AnyKind;

impl ConnectionPolicy for AnyKind {
    fn accepts(&self, source: &PortInfo, target: &PortInfo) -> bool {
        source.owner != target.owner && source.direction != target.direction
    }
}

#[test]
fn custom_policy_widens_candidates() {
    let (scene, ports) = scene_with_ports();
    let mut helper = PortDragHelper::with_policy(AnyKind);
    helper.begin(&scene, ports.out);
    assert_eq!(helper.compatible_ports(), &[ports.inp, ports.other_kind]);
}
