//! Drag-helper: computes which ports an edge may end on and completes the drop.
//!
//! The connector owns the gesture; the helper owns the connection semantics.
//! Swap the [`ConnectionPolicy`] to change which port pairs may connect, or
//! implement [`EdgeDragHelper`] outright to change how a drop resolves.

#[cfg(test)]
#[path = "drag_helper_test.rs"]
mod drag_helper_test;

use crate::camera::Point;
use crate::canvas::{Canvas, EdgeConnection, PortDirection, PortId, PortInfo};

/// Decides whether an edge dragged out of `source` may end on `target`.
pub trait ConnectionPolicy {
    fn accepts(&self, source: &PortInfo, target: &PortInfo) -> bool;
}

/// Default policy: [`PortInfo::is_compatible_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PortCompatibility;

impl ConnectionPolicy for PortCompatibility {
    fn accepts(&self, source: &PortInfo, target: &PortInfo) -> bool {
        target.is_compatible_with(source)
    }
}

/// How a drop ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropOutcome {
    /// Landed on a compatible port.
    Connected(EdgeConnection),
    /// Landed elsewhere; the point is in content space.
    Outside(Point),
}

/// Low-level connection semantics behind the edge connector.
pub trait EdgeDragHelper {
    /// Prepare a drag out of `source`. Returns `false` to refuse it.
    fn begin(&mut self, canvas: &dyn Canvas, source: PortId) -> bool;

    /// Ports the current drag may end on, in canvas port order.
    fn compatible_ports(&self) -> &[PortId];

    /// Resolve a drop at `screen`, notifying the canvas. `None` without a drag.
    fn complete(&mut self, canvas: &mut dyn Canvas, screen: Point) -> Option<DropOutcome>;

    /// Forget the current drag.
    fn reset(&mut self);
}

/// Default helper: filters ports through a [`ConnectionPolicy`] and resolves a
/// drop to the compatible port whose hit circle contains the drop point.
#[derive(Debug, Clone, Default)]
pub struct PortDragHelper<P: ConnectionPolicy = PortCompatibility> {
    policy: P,
    source: Option<PortId>,
    compatible: Vec<PortId>,
}

impl PortDragHelper {
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(PortCompatibility)
    }
}

impl<P: ConnectionPolicy> PortDragHelper<P> {
    #[must_use]
    pub fn with_policy(policy: P) -> Self {
        Self { policy, source: None, compatible: Vec::new() }
    }

    #[must_use]
    pub fn source(&self) -> Option<PortId> {
        self.source
    }
}

impl<P: ConnectionPolicy> EdgeDragHelper for PortDragHelper<P> {
    fn begin(&mut self, canvas: &dyn Canvas, source: PortId) -> bool {
        let Some(src) = canvas.port(source) else {
            return false;
        };
        self.compatible = canvas
            .ports()
            .iter()
            .filter(|p| self.policy.accepts(&src, p))
            .map(|p| p.id)
            .collect();
        self.source = Some(source);
        true
    }

    fn compatible_ports(&self) -> &[PortId] {
        &self.compatible
    }

    fn complete(&mut self, canvas: &mut dyn Canvas, screen: Point) -> Option<DropOutcome> {
        let src = canvas.port(self.source?)?;
        let world = canvas.camera().screen_to_world(screen);
        let target = self
            .compatible
            .iter()
            .filter_map(|id| canvas.port(*id))
            .find(|p| p.center.distance(world) <= p.radius);

        let outcome = match target {
            Some(target) => {
                let connection = match src.direction {
                    PortDirection::Output => EdgeConnection { output: src.id, input: target.id },
                    PortDirection::Input => EdgeConnection { output: target.id, input: src.id },
                };
                canvas.on_drop(connection);
                DropOutcome::Connected(connection)
            }
            None => {
                canvas.on_drop_outside_port(src.id, world);
                DropOutcome::Outside(world)
            }
        };
        Some(outcome)
    }

    fn reset(&mut self) {
        self.source = None;
        self.compatible.clear();
    }
}
