#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::camera::{Camera, Rect};
use crate::canvas::PortDirection;
use crate::scene::Scene;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

/// Add an input port centered at `center` on its own node.
fn input_at(scene: &mut Scene, center: Point) -> PortId {
    let node = scene.add_node(Rect::new(center.x, center.y - 20.0, 80.0, 40.0));
    scene.add_port(node, PortDirection::Input, Point::new(0.0, 20.0), "float")
}

fn held_pose_count(scene: &Scene, ports: &[PortId]) -> usize {
    ports
        .iter()
        .filter_map(|p| scene.hand_indicator(*p))
        .filter(|h| h.pose() == HandPose::Held)
        .count()
}

// =============================================================
// Attraction math
// =============================================================

#[test]
fn reach_equals_close_distance_at_response_edge() {
    let cfg = InteractConfig::default();
    assert!(approx_eq(hand_reach(cfg.response_distance, &cfg), cfg.close_distance));
}

#[test]
fn reach_grows_as_pointer_nears() {
    let cfg = InteractConfig::default();
    assert!(hand_reach(50.0, &cfg) > hand_reach(100.0, &cfg));
    assert!(hand_reach(100.0, &cfg) > hand_reach(150.0, &cfg));
    assert!(hand_reach(0.0, &cfg).is_infinite());
}

#[test]
fn attract_out_of_range_is_none() {
    let cfg = InteractConfig::default();
    assert_eq!(attract(200.0, &cfg), None);
    assert_eq!(attract(350.0, &cfg), None);
}

#[test]
fn attract_close_port_holds() {
    let cfg = InteractConfig::default();
    let a = attract(30.0, &cfg).unwrap();
    assert!(a.is_hold());
    assert_eq!(a.gap, 0.0);
}

#[test]
fn attract_hold_threshold() {
    let cfg = InteractConfig::default();
    assert!(attract(168.0, &cfg).unwrap().is_hold());
    let far = attract(171.0, &cfg).unwrap();
    assert!(!far.is_hold());
    assert!(approx_eq(far.gap, far.distance - far.reach));
}

// =============================================================
// HeldPorts
// =============================================================

#[test]
fn held_push_unique_and_remove() {
    let mut held = HeldPorts::default();
    let a = Uuid::new_v4();
    assert!(held.push_unique(a));
    assert!(!held.push_unique(a));
    assert_eq!(held.len(), 1);
    assert!(held.remove(a));
    assert!(!held.remove(a));
    assert!(held.is_empty());
}

#[test]
fn demote_primary_with_two_swaps() {
    let mut held = HeldPorts::default();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    held.push_unique(a);
    held.push_unique(b);
    held.demote_primary();
    assert_eq!(held.iter().copied().collect::<Vec<_>>(), vec![b, a]);
    assert_eq!(held.primary(), Some(a));
}

#[test]
fn demote_primary_with_three_moves_tail_before_new_tail() {
    let mut held = HeldPorts::default();
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    for p in [a, b, c] {
        held.push_unique(p);
    }
    held.demote_primary();
    assert_eq!(held.iter().copied().collect::<Vec<_>>(), vec![a, c, b]);
}

#[test]
fn demote_primary_single_is_noop() {
    let mut held = HeldPorts::default();
    let a = Uuid::new_v4();
    held.push_unique(a);
    held.demote_primary();
    assert_eq!(held.primary(), Some(a));
}

// =============================================================
// ConnectionSession
// =============================================================

#[test]
fn far_pointer_shows_nothing() {
    let mut scene = Scene::new(800.0, 600.0);
    let q = input_at(&mut scene, Point::new(400.0, 100.0));
    let mut session = ConnectionSession::new(vec![q]);
    let changed = session.evaluate(&mut scene, Point::new(100.0, 100.0), &InteractConfig::default());
    assert!(!changed);
    assert_eq!(scene.hand_indicator_count(), 0);
    assert!(session.indicator(q).is_none());
}

#[test]
fn near_pointer_holds_port() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q = input_at(&mut scene, Point::new(400.0, 100.0));
    let mut session = ConnectionSession::new(vec![q]);

    let pointer = Point::new(372.0, 100.0);
    assert!(session.evaluate(&mut scene, pointer, &cfg));
    assert_eq!(session.held().primary(), Some(q));

    let hand = scene.hand_indicator(q).unwrap();
    assert!(hand.is_visible());
    assert_eq!(hand.pose(), HandPose::Held);
    assert_eq!(hand.width(), cfg.thick_edge_width);
    assert_eq!(hand.tip(), pointer);
    assert_eq!(hand.anchor(), Point::new(400.0, 100.0));
    assert_eq!(hand.control_points()[0], hand.anchor());
    assert_eq!(hand.control_points()[1], hand.anchor());
    assert_eq!(hand.control_points()[3], hand.tip());
}

#[test]
fn staying_held_is_not_a_change() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q = input_at(&mut scene, Point::new(400.0, 100.0));
    let mut session = ConnectionSession::new(vec![q]);
    assert!(session.evaluate(&mut scene, Point::new(372.0, 100.0), &cfg));
    assert!(!session.evaluate(&mut scene, Point::new(374.0, 100.0), &cfg));
    assert_eq!(session.held().len(), 1);
}

#[test]
fn open_hand_reaches_toward_pointer() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q = input_at(&mut scene, Point::new(400.0, 100.0));
    let mut session = ConnectionSession::new(vec![q]);

    let pointer = Point::new(220.0, 100.0);
    assert!(!session.evaluate(&mut scene, pointer, &cfg));
    assert!(session.held().is_empty());

    let gap = attract(180.0, &cfg).unwrap().gap;
    let hand = scene.hand_indicator(q).unwrap();
    assert_eq!(hand.pose(), HandPose::Open);
    assert_eq!(hand.width(), cfg.thin_edge_width);
    assert!(approx_eq(hand.tip().x, 220.0 + gap));
    assert!(approx_eq(hand.tip().y, 100.0));
    // Pointer is left of the port: the hand points right, toward the port.
    assert!(approx_eq(hand.rotation_deg(), 90.0));
}

#[test]
fn leaving_range_destroys_indicator_and_hold() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q = input_at(&mut scene, Point::new(400.0, 100.0));
    let mut session = ConnectionSession::new(vec![q]);

    session.evaluate(&mut scene, Point::new(380.0, 100.0), &cfg);
    assert!(session.held().contains(q));

    assert!(session.evaluate(&mut scene, Point::new(400.0, 500.0), &cfg));
    assert!(session.held().is_empty());
    assert!(session.indicator(q).is_none());
    assert_eq!(scene.hand_indicator_count(), 0);
}

#[test]
fn release_within_range_reverts_to_open() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q = input_at(&mut scene, Point::new(400.0, 100.0));
    let mut session = ConnectionSession::new(vec![q]);

    session.evaluate(&mut scene, Point::new(380.0, 100.0), &cfg);
    assert!(session.evaluate(&mut scene, Point::new(215.0, 100.0), &cfg));
    assert!(session.held().is_empty());
    let hand = scene.hand_indicator(q).unwrap();
    assert_eq!(hand.pose(), HandPose::Open);
    assert_eq!(hand.width(), cfg.thin_edge_width);
}

#[test]
fn releasing_last_hold_leaves_tip_at_reach() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q = input_at(&mut scene, Point::new(400.0, 100.0));
    let mut session = ConnectionSession::new(vec![q]);

    session.evaluate(&mut scene, Point::new(380.0, 100.0), &cfg);
    let pointer = Point::new(215.0, 100.0);
    assert!(session.evaluate(&mut scene, pointer, &cfg));

    // No port is held any more, so nothing withdraws.
    let gap = attract(185.0, &cfg).unwrap().gap;
    let hand = scene.hand_indicator(q).unwrap();
    assert!(approx_eq(hand.tip().x, pointer.x + gap));
    assert!(approx_eq(hand.tip().y, pointer.y));
}

#[test]
fn connected_ports_are_skipped() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q = input_at(&mut scene, Point::new(400.0, 100.0));
    scene.set_port_connected(q, true);
    let mut session = ConnectionSession::new(vec![q]);
    session.evaluate(&mut scene, Point::new(395.0, 100.0), &cfg);
    assert!(session.held().is_empty());
    assert_eq!(scene.hand_indicator_count(), 0);
}

#[test]
fn distance_is_zoom_corrected() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q = input_at(&mut scene, Point::new(400.0, 100.0));
    scene.set_camera(Camera { pan_x: 0.0, pan_y: 0.0, zoom: 0.25 });
    let mut session = ConnectionSession::new(vec![q]);

    // Port is at screen (100, 25). 45 screen pixels at zoom 0.25 is 180 content units.
    session.evaluate(&mut scene, Point::new(55.0, 25.0), &cfg);
    assert!(session.held().is_empty());
    assert!(session.indicator(q).is_some());

    // 60 screen pixels is 240 content units: out of range.
    session.evaluate(&mut scene, Point::new(40.0, 25.0), &cfg);
    assert!(session.indicator(q).is_none());
}

#[test]
fn primary_position_is_port_screen_center() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q = input_at(&mut scene, Point::new(400.0, 100.0));
    scene.set_camera(Camera { pan_x: 10.0, pan_y: 20.0, zoom: 1.0 });
    let mut session = ConnectionSession::new(vec![q]);
    assert_eq!(session.primary_position(&scene), None);
    session.evaluate(&mut scene, Point::new(400.0, 120.0), &cfg);
    assert_eq!(session.primary_position(&scene), Some(Point::new(410.0, 120.0)));
}

#[test]
fn two_holds_show_one_held_image() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q1 = input_at(&mut scene, Point::new(400.0, 100.0));
    let q2 = input_at(&mut scene, Point::new(400.0, 140.0));
    let mut session = ConnectionSession::new(vec![q1, q2]);

    session.evaluate(&mut scene, Point::new(380.0, 120.0), &cfg);
    assert_eq!(session.held().iter().copied().collect::<Vec<_>>(), vec![q1, q2]);
    assert_eq!(held_pose_count(&scene, &[q1, q2]), 1);
    assert_eq!(scene.hand_indicator(q2).unwrap().pose(), HandPose::Held);
    assert_eq!(scene.hand_indicator(q1).unwrap().width(), cfg.thin_edge_width);
}

#[test]
fn withdraw_pulls_secondary_tip_toward_port() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q1 = input_at(&mut scene, Point::new(400.0, 100.0));
    let q2 = input_at(&mut scene, Point::new(400.0, 140.0));
    let mut session = ConnectionSession::new(vec![q1, q2]);

    let pointer = Point::new(380.0, 120.0);
    session.evaluate(&mut scene, pointer, &cfg);
    let hand = scene.hand_indicator(q1).unwrap();
    let expected = pointer + (Point::new(400.0, 100.0) - pointer) * cfg.withdraw_rate;
    assert!(approx_eq(hand.tip().x, expected.x));
    assert!(approx_eq(hand.tip().y, expected.y));
    assert_eq!(scene.hand_indicator(q2).unwrap().tip(), pointer);
}

#[test]
fn primacy_passes_after_hysteresis() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q1 = input_at(&mut scene, Point::new(400.0, 100.0));
    let q2 = input_at(&mut scene, Point::new(400.0, 140.0));
    let mut session = ConnectionSession::new(vec![q1, q2]);

    session.evaluate(&mut scene, Point::new(380.0, 120.0), &cfg);
    assert_eq!(session.held().primary(), Some(q2));

    // Walk toward q1. q2 drifts away from its closest approach but stays held.
    for p in [(384.0, 116.0), (388.0, 112.0), (392.0, 108.0), (396.0, 104.0)] {
        session.evaluate(&mut scene, Point::new(p.0, p.1), &cfg);
        assert_eq!(session.held().primary(), Some(q2), "at {p:?}");
        assert_eq!(held_pose_count(&scene, &[q1, q2]), 1);
    }

    session.evaluate(&mut scene, Point::new(400.0, 100.0), &cfg);
    assert_eq!(session.held().iter().copied().collect::<Vec<_>>(), vec![q2, q1]);
    assert_eq!(scene.hand_indicator(q1).unwrap().pose(), HandPose::Held);
    assert_eq!(scene.hand_indicator(q2).unwrap().pose(), HandPose::Open);
    assert_eq!(scene.hand_indicator(q1).unwrap().width(), cfg.thick_edge_width);
}

#[test]
fn teardown_hides_everything() {
    let cfg = InteractConfig::default();
    let mut scene = Scene::new(800.0, 600.0);
    let q1 = input_at(&mut scene, Point::new(400.0, 100.0));
    let q2 = input_at(&mut scene, Point::new(400.0, 140.0));
    let mut session = ConnectionSession::new(vec![q1, q2]);
    session.evaluate(&mut scene, Point::new(380.0, 120.0), &cfg);
    assert_eq!(scene.hand_indicator_count(), 2);

    session.teardown(&mut scene);
    assert_eq!(scene.hand_indicator_count(), 0);
    assert!(session.held().is_empty());
    assert_eq!(session.indicator_ports().count(), 0);
}
