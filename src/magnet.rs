//! Magnetic attraction toward compatible ports during a connection drag.
//!
//! Every candidate port within `response_distance` of the pointer shows a
//! [`HandIndicator`] reaching toward the pointer. The reach grows sharply as the
//! pointer approaches, and once the pointer is inside the reach the port is
//! *held*. Held ports queue up in [`HeldPorts`]; the tail is the primary hold,
//! the only one drawn thick with the closed-hand image, and the one a
//! pointer-up connects to.
//!
//! All of this lives in a [`ConnectionSession`] owned by the connector for one
//! drag. Nothing is shared between drags.
//!
//! Distances are compared in content units: the screen distance between pointer
//! and port center divided by the camera zoom.

#[cfg(test)]
#[path = "magnet_test.rs"]
mod magnet_test;

use std::collections::HashMap;

use tracing::trace;

use crate::camera::Point;
use crate::canvas::{Canvas, PortId};
use crate::config::InteractConfig;
use crate::curve::{control_points, rotation_deg};

// =============================================================================
// ATTRACTION MATH
// =============================================================================

/// Result of evaluating one port against the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attraction {
    /// Pointer-to-port distance in content units.
    pub distance: f64,
    /// How far the hand reaches out of the port.
    pub reach: f64,
    /// Gap between the hand's tip and the pointer; zero means held.
    pub gap: f64,
}

impl Attraction {
    #[must_use]
    pub fn is_hold(&self) -> bool {
        self.gap <= 0.0
    }
}

/// Hand reach for a pointer `distance` away.
///
/// Equals `close_distance` at the response distance and grows with the inverse
/// square of the distance as the pointer closes in.
#[must_use]
pub fn hand_reach(distance: f64, cfg: &InteractConfig) -> f64 {
    if distance <= f64::EPSILON {
        return f64::INFINITY;
    }
    let rate = (cfg.together_distance - cfg.close_distance) / (cfg.response_distance - cfg.together_distance);
    let ratio = cfg.response_distance / distance;
    cfg.close_distance + (cfg.response_distance - distance) * rate * ratio * ratio
}

/// Evaluate a port `distance` content units from the pointer, or `None` when
/// out of range.
#[must_use]
pub fn attract(distance: f64, cfg: &InteractConfig) -> Option<Attraction> {
    if distance >= cfg.response_distance {
        return None;
    }
    let reach = hand_reach(distance, cfg);
    Some(Attraction { distance, reach, gap: (distance - reach).max(0.0) })
}

// =============================================================================
// HAND INDICATOR
// =============================================================================

/// Which hand image an indicator shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPose {
    Open,
    Held,
}

/// Per-port visual reaching from the port toward the pointer.
///
/// All points are in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct HandIndicator {
    port: PortId,
    visible: bool,
    anchor: Point,
    tip: Point,
    control_points: [Point; 4],
    width: f64,
    pose: HandPose,
    rotation_deg: f64,
    /// Closest approach during the current hold, in content units.
    closest_hold: f64,
}

impl HandIndicator {
    fn new(port: PortId, width: f64) -> Self {
        Self {
            port,
            visible: false,
            anchor: Point::ZERO,
            tip: Point::ZERO,
            control_points: [Point::ZERO; 4],
            width,
            pose: HandPose::Open,
            rotation_deg: 0.0,
            closest_hold: f64::MAX,
        }
    }

    #[must_use]
    pub fn port(&self) -> PortId {
        self.port
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The port's on-screen center, where the hand is anchored.
    #[must_use]
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Free endpoint of the hand.
    #[must_use]
    pub fn tip(&self) -> Point {
        self.tip
    }

    #[must_use]
    pub fn control_points(&self) -> [Point; 4] {
        self.control_points
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn pose(&self) -> HandPose {
        self.pose
    }

    /// Rotation of the hand image, clockwise from screen-up.
    #[must_use]
    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    fn reset_hold(&mut self) {
        self.closest_hold = f64::MAX;
    }

    /// Pull the tip `rate` of the way back toward the anchor.
    fn withdraw(&mut self, rate: f64, width: f64) {
        self.tip = self.tip + (self.anchor - self.tip) * rate;
        self.width = width;
    }
}

// =============================================================================
// HELD PORTS
// =============================================================================

/// Ports currently held, oldest first. The tail is the primary hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldPorts(Vec<PortId>);

impl HeldPorts {
    /// Append `port` unless already present. Returns whether it was added.
    pub fn push_unique(&mut self, port: PortId) -> bool {
        if self.0.contains(&port) {
            return false;
        }
        self.0.push(port);
        true
    }

    /// Returns whether `port` was present.
    pub fn remove(&mut self, port: PortId) -> bool {
        let before = self.0.len();
        self.0.retain(|p| *p != port);
        self.0.len() != before
    }

    #[must_use]
    pub fn contains(&self, port: PortId) -> bool {
        self.0.contains(&port)
    }

    #[must_use]
    pub fn primary(&self) -> Option<PortId> {
        self.0.last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Move the primary to just before the new tail, so the previous
    /// second-to-last port becomes primary. No-op with fewer than two ports.
    pub fn demote_primary(&mut self) {
        if self.0.len() < 2 {
            return;
        }
        if let Some(tail) = self.0.pop() {
            let at = self.0.len() - 1;
            self.0.insert(at, tail);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &PortId> {
        self.0.iter()
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Attraction state for one connection drag.
#[derive(Debug, Clone, Default)]
pub struct ConnectionSession {
    candidates: Vec<PortId>,
    indicators: HashMap<PortId, HandIndicator>,
    held: HeldPorts,
}

impl ConnectionSession {
    /// Start a session over the compatible ports of the current drag.
    #[must_use]
    pub fn new(candidates: Vec<PortId>) -> Self {
        Self { candidates, indicators: HashMap::new(), held: HeldPorts::default() }
    }

    #[must_use]
    pub fn candidates(&self) -> &[PortId] {
        &self.candidates
    }

    #[must_use]
    pub fn held(&self) -> &HeldPorts {
        &self.held
    }

    #[must_use]
    pub fn indicator(&self, port: PortId) -> Option<&HandIndicator> {
        self.indicators.get(&port)
    }

    /// Ports whose indicator currently exists.
    pub fn indicator_ports(&self) -> impl Iterator<Item = &PortId> {
        self.indicators.keys()
    }

    /// Primary port's on-screen center, if any port is held.
    #[must_use]
    pub fn primary_position(&self, canvas: &dyn Canvas) -> Option<Point> {
        let port = canvas.port(self.held.primary()?)?;
        Some(port.screen_center(&canvas.camera()))
    }

    /// Run one frame of attraction for a pointer at `pointer` (screen space).
    ///
    /// Returns whether any port's hold state changed.
    pub fn evaluate(&mut self, canvas: &mut dyn Canvas, pointer: Point, cfg: &InteractConfig) -> bool {
        let camera = canvas.camera();
        let mut any_changed = false;

        // Hold state is mutated while walking candidates, so walk a copy.
        let candidates = self.candidates.clone();
        for port_id in candidates {
            let port = match canvas.port(port_id) {
                Some(port) if !port.connected => port,
                _ => {
                    any_changed |= self.drop_port(canvas, port_id);
                    continue;
                }
            };

            let center = port.screen_center(&camera);
            let distance = camera.screen_dist_to_world(center.distance(pointer));
            let Some(attraction) = attract(distance, cfg) else {
                any_changed |= self.drop_port(canvas, port_id);
                continue;
            };

            let indicator = self
                .indicators
                .entry(port_id)
                .or_insert_with(|| HandIndicator::new(port_id, cfg.thin_edge_width));
            indicator.visible = true;
            indicator.anchor = center;
            indicator.tip = pointer + (center - pointer).normalized() * (attraction.gap * camera.zoom);
            indicator.width = cfg.thin_edge_width;
            indicator.rotation_deg = rotation_deg(pointer, center);

            let mut changed = false;
            if attraction.is_hold() {
                if self.held.push_unique(port_id) {
                    changed = true;
                    trace!(%port_id, distance, "port held");
                }
                indicator.closest_hold = indicator.closest_hold.min(distance);
            } else if self.held.remove(port_id) {
                indicator.reset_hold();
                changed = true;
                trace!(%port_id, distance, "port released");
            }

            let away = distance - indicator.closest_hold;
            if !changed
                && self.held.len() > 1
                && self.held.primary() == Some(port_id)
                && away > cfg.hold_hysteresis
            {
                self.held.demote_primary();
                indicator.reset_hold();
                trace!(%port_id, away, new_primary = ?self.held.primary(), "primary hold passed on");
            }

            any_changed |= changed;
        }

        let primary = self.held.primary();
        // Withdrawing only applies while some port is held.
        if let Some(primary) = primary {
            for indicator in self.indicators.values_mut() {
                if indicator.port == primary {
                    indicator.width = cfg.thick_edge_width;
                } else {
                    indicator.withdraw(cfg.withdraw_rate, cfg.thin_edge_width);
                }
            }
        }

        for indicator in self.indicators.values_mut() {
            indicator.pose = if Some(indicator.port) == primary { HandPose::Held } else { HandPose::Open };
            let sign = canvas.port(indicator.port).map_or(1.0, |p| p.tangent_sign());
            let mut points = control_points(indicator.anchor, indicator.tip, sign, camera.zoom);
            // The hand leaves the port straight: no tangent on the port side.
            points[1] = points[0];
            indicator.control_points = points;
            canvas.show_hand_indicator(indicator);
        }

        any_changed
    }

    /// Hide every indicator and forget all holds.
    pub fn teardown(&mut self, canvas: &mut dyn Canvas) {
        for port in self.indicators.keys() {
            canvas.remove_hand_indicator(*port);
        }
        self.indicators.clear();
        self.held.clear();
    }

    /// Destroy `port`'s indicator and hold. Returns whether it was held.
    fn drop_port(&mut self, canvas: &mut dyn Canvas, port: PortId) -> bool {
        if self.indicators.remove(&port).is_some() {
            canvas.remove_hand_indicator(port);
        }
        self.held.remove(port)
    }
}
