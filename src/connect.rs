//! Edge Connection Controller: drag a new edge out of a port.
//!
//! ```text
//! Idle --pointer-down on port--> Armed --move--> Dragging
//!   ^                                              |
//!   +---- pointer-up / Escape / capture lost ------+
//! ```
//!
//! While dragging, the [`CandidateEdge`] follows the pointer and a
//! [`ConnectionSession`] drives the hand indicators of nearby compatible ports.
//! On pointer-up past the travel threshold the drop goes to the primary held
//! port if there is one, otherwise to the pointer.

#[cfg(test)]
#[path = "connect_test.rs"]
mod connect_test;

use tracing::debug;

use crate::camera::Point;
use crate::canvas::{Canvas, PortId};
use crate::config::InteractConfig;
use crate::curve::control_points;
use crate::drag_helper::{DropOutcome, EdgeDragHelper, PortDragHelper};
use crate::input::{
    Action, ActivationFilter, Activators, Button, CancelReason, Modifiers, PointerEvent, PointerInteraction,
};
use crate::magnet::ConnectionSession;

/// The tentative edge drawn while dragging. Points are in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEdge {
    source: PortId,
    fixed: Point,
    free: Point,
    control_points: [Point; 4],
}

impl CandidateEdge {
    fn new(source: PortId, fixed: Point, free: Point, sign: f64, zoom: f64) -> Self {
        Self { source, fixed, free, control_points: control_points(fixed, free, sign, zoom) }
    }

    fn set_free(&mut self, free: Point, sign: f64, zoom: f64) {
        self.free = free;
        self.control_points = control_points(self.fixed, free, sign, zoom);
    }

    #[must_use]
    pub fn source(&self) -> PortId {
        self.source
    }

    /// Endpoint anchored at the source port.
    #[must_use]
    pub fn fixed(&self) -> Point {
        self.fixed
    }

    /// Endpoint following the pointer.
    #[must_use]
    pub fn free(&self) -> Point {
        self.free
    }

    #[must_use]
    pub fn control_points(&self) -> [Point; 4] {
        self.control_points
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectPhase {
    Idle,
    Armed,
    Dragging,
}

struct ConnectDrag {
    source: PortId,
    sign: f64,
    down_position: Point,
    edge: CandidateEdge,
    session: ConnectionSession,
}

pub struct EdgeConnector<H: EdgeDragHelper = PortDragHelper> {
    helper: H,
    config: InteractConfig,
    activators: Activators,
    phase: ConnectPhase,
    drag: Option<ConnectDrag>,
}

impl EdgeConnector {
    #[must_use]
    pub fn new(config: InteractConfig) -> Self {
        Self::with_helper(config, PortDragHelper::new())
    }
}

impl<H: EdgeDragHelper> EdgeConnector<H> {
    #[must_use]
    pub fn with_helper(config: InteractConfig, helper: H) -> Self {
        Self {
            helper,
            config,
            activators: Activators::new(vec![ActivationFilter::new(Button::Primary, Modifiers::NONE)]),
            phase: ConnectPhase::Idle,
            drag: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> ConnectPhase {
        self.phase
    }

    #[must_use]
    pub fn candidate_edge(&self) -> Option<&CandidateEdge> {
        self.drag.as_ref().map(|d| &d.edge)
    }

    #[must_use]
    pub fn session(&self) -> Option<&ConnectionSession> {
        self.drag.as_ref().map(|d| &d.session)
    }

    #[must_use]
    pub fn helper(&self) -> &H {
        &self.helper
    }

    /// Hide every visual, reset the helper, release the pointer.
    fn finish(&mut self, canvas: &mut dyn Canvas) {
        if let Some(mut drag) = self.drag.take() {
            drag.session.teardown(canvas);
        }
        canvas.remove_candidate_edge();
        self.helper.reset();
        if canvas.has_pointer_capture() {
            canvas.release_pointer();
        }
        self.phase = ConnectPhase::Idle;
    }
}

impl<H: EdgeDragHelper> PointerInteraction for EdgeConnector<H> {
    fn arm(&mut self, canvas: &mut dyn Canvas, event: &PointerEvent) -> Vec<Action> {
        if self.phase != ConnectPhase::Idle || !self.activators.can_start(event) {
            return Vec::new();
        }
        let Some(port) = canvas.port_at(event.position).and_then(|id| canvas.port(id)) else {
            return Vec::new();
        };
        if !self.helper.begin(canvas, port.id) {
            return Vec::new();
        }

        let camera = canvas.camera();
        let sign = port.tangent_sign();
        let edge = CandidateEdge::new(port.id, port.screen_center(&camera), event.position, sign, camera.zoom);
        canvas.show_candidate_edge(&edge);
        let session = ConnectionSession::new(self.helper.compatible_ports().to_vec());
        debug!(port = %port.id, candidates = session.candidates().len(), "connection armed");

        self.drag = Some(ConnectDrag { source: port.id, sign, down_position: event.position, edge, session });
        self.phase = ConnectPhase::Armed;
        canvas.capture_pointer();
        vec![Action::StopPropagation, Action::RenderNeeded]
    }

    fn update(&mut self, canvas: &mut dyn Canvas, event: &PointerEvent) -> Vec<Action> {
        let Some(drag) = self.drag.as_mut() else {
            return Vec::new();
        };
        self.phase = ConnectPhase::Dragging;

        let zoom = canvas.camera().zoom;
        drag.edge.set_free(event.position, drag.sign, zoom);
        canvas.show_candidate_edge(&drag.edge);
        drag.session.evaluate(canvas, event.position, &self.config);
        vec![Action::StopPropagation, Action::RenderNeeded]
    }

    fn resolve(&mut self, canvas: &mut dyn Canvas, event: &PointerEvent) -> Vec<Action> {
        if !self.activators.can_stop(event) {
            return Vec::new();
        }
        let Some(drag) = self.drag.as_ref() else {
            return Vec::new();
        };

        let travel = event.position.distance(drag.down_position);
        if travel > self.config.connection_distance_threshold {
            let at = drag.session.primary_position(canvas).unwrap_or(event.position);
            match self.helper.complete(canvas, at) {
                Some(DropOutcome::Connected(connection)) => {
                    debug!(output = %connection.output, input = %connection.input, "connection completed");
                }
                Some(DropOutcome::Outside(world)) => {
                    debug!(source = %drag.source, x = world.x, y = world.y, "connection dropped outside a port");
                }
                None => {}
            }
        } else {
            debug!(source = %drag.source, travel, "connection aborted: insufficient travel");
        }

        self.finish(canvas);
        vec![Action::StopPropagation, Action::RenderNeeded]
    }

    fn cancel(&mut self, canvas: &mut dyn Canvas, reason: CancelReason) -> Vec<Action> {
        let Some(drag) = self.drag.as_ref() else {
            return Vec::new();
        };
        debug!(source = %drag.source, ?reason, "connection cancelled");
        self.finish(canvas);
        vec![Action::StopPropagation, Action::RenderNeeded]
    }

    fn is_active(&self) -> bool {
        self.phase != ConnectPhase::Idle
    }
}
