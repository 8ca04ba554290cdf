//! The canvas collaborator: everything the controllers need from the host.
//!
//! The host widget tree (or the headless [`crate::scene::Scene`]) implements
//! [`Canvas`]. Controllers hold no references into it between events; every
//! handler receives `&mut dyn Canvas` and queries what it needs.
//!
//! ## Contract summary
//!
//! | Concern | Methods |
//! |---------|---------|
//! | Viewport | `camera`, `set_camera`, `refresh_view_transform`, `viewport_size` |
//! | Pointer capture | `capture_pointer`, `release_pointer`, `has_pointer_capture` |
//! | Scheduling | `set_pan_schedule` |
//! | Hit-testing | `element_at`, `pick_all`, `port_at` |
//! | Elements | `selection`, `is_selected`, `is_movable`, `is_snappable`, `is_attached`, `position`, `set_position`, ... |
//! | Containment | `stack_of`, `scope_of`, `stack_start_dragging`, `stack_insert`, `scope_add_elements`, ... |
//! | Drop targets | `is_drop_target`, `can_accept_drop`, `send_drag_event` |
//! | Change sink | `graph_changed` |
//! | Ports and edges | `port`, `ports`, candidate edge and hand indicator display, `on_drop`, `on_drop_outside_port` |

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{Camera, Point, Rect};
use crate::connect::CandidateEdge;
use crate::magnet::HandIndicator;

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

/// Unique identifier for a graph element (node, stack, group, drop zone).
pub type ElementId = Uuid;

/// Unique identifier for a port.
pub type PortId = Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CanvasError {
    #[error("element not found: {0}")]
    UnknownElement(ElementId),
    #[error("stack not found: {0}")]
    UnknownStack(ElementId),
    #[error("scope not found: {0}")]
    UnknownScope(ElementId),
    #[error("stack index out of range: {index} > {len} in stack {stack}")]
    StackIndexOutOfRange { stack: ElementId, index: usize, len: usize },
}

/// Whether a port emits or receives connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Output,
    Input,
}

/// A port as the controllers see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortInfo {
    pub id: PortId,
    /// Element the port belongs to.
    pub owner: ElementId,
    pub direction: PortDirection,
    /// Center in content coordinates.
    pub center: Point,
    /// Hit radius in content units.
    pub radius: f64,
    /// Whether the port already carries an edge.
    pub connected: bool,
    /// Value type tag; only equal tags may connect.
    pub kind: String,
}

impl PortInfo {
    /// Whether an edge dragged out of `source` may end on this port.
    ///
    /// Different port, different owner, opposite direction, same kind.
    #[must_use]
    pub fn is_compatible_with(&self, source: &PortInfo) -> bool {
        self.id != source.id
            && self.owner != source.owner
            && self.direction != source.direction
            && self.kind == source.kind
    }

    /// Which way a curve leaves this port horizontally.
    #[must_use]
    pub fn tangent_sign(&self) -> f64 {
        match self.direction {
            PortDirection::Output => 1.0,
            PortDirection::Input => -1.0,
        }
    }

    /// Center in screen coordinates under `camera`.
    #[must_use]
    pub fn screen_center(&self, camera: &Camera) -> Point {
        camera.world_to_screen(self.center)
    }
}

/// Drag-and-drop notifications delivered to drop targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragEvent {
    Enter,
    Leave,
    Updated,
    Perform,
    Exited,
}

impl DragEvent {
    /// Updated and Perform only reach targets that accept the current selection.
    #[must_use]
    pub fn requires_acceptance(self) -> bool {
        matches!(self, Self::Updated | Self::Perform)
    }
}

/// A committed selection move, delivered once per drag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphChange {
    pub moved_elements: Vec<ElementId>,
    /// Reference element's final content position minus its original one.
    pub move_delta: Point,
}

/// A completed connection, oriented output to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeConnection {
    pub output: PortId,
    pub input: PortId,
}

/// The host surface the controllers drive.
///
/// Positions passed to `position` / `set_position` are in the element's parent
/// space; use `parent_to_content` / `content_to_parent` to cross over.
pub trait Canvas {
    // --- Viewport ---

    fn camera(&self) -> Camera;
    fn set_camera(&mut self, camera: Camera);
    /// Re-apply the current camera to the view after a gesture that panned it.
    fn refresh_view_transform(&mut self);
    /// Viewport width and height in screen pixels.
    fn viewport_size(&self) -> Point;

    // --- Pointer capture ---

    fn capture_pointer(&mut self);
    fn release_pointer(&mut self);
    fn has_pointer_capture(&self) -> bool;

    // --- Scheduling ---

    /// Start or stop the periodic pan tick. While `running`, the host calls
    /// [`crate::engine::Engine::on_pan_tick`] every `interval`.
    fn set_pan_schedule(&mut self, interval: Duration, running: bool);

    // --- Hit-testing ---

    /// Top-most element under a screen point.
    fn element_at(&self, screen: Point) -> Option<ElementId>;
    /// Every element under a screen point, top-most first.
    fn pick_all(&self, screen: Point) -> Vec<ElementId>;
    /// Top-most port under a screen point.
    fn port_at(&self, screen: Point) -> Option<PortId>;

    // --- Elements ---

    /// Current selection, in selection order.
    fn selection(&self) -> Vec<ElementId>;
    fn is_selected(&self, id: ElementId) -> bool;
    fn is_movable(&self, id: ElementId) -> bool;
    fn is_snappable(&self, id: ElementId) -> bool;
    /// Whether the element is still part of the element tree.
    fn is_attached(&self, id: ElementId) -> bool;
    fn position(&self, id: ElementId) -> Option<Rect>;
    /// # Errors
    ///
    /// [`CanvasError::UnknownElement`] if `id` is not on the canvas.
    fn set_position(&mut self, id: ElementId, rect: Rect) -> Result<(), CanvasError>;
    fn parent_to_content(&self, id: ElementId, rect: Rect) -> Rect;
    fn content_to_parent(&self, id: ElementId, rect: Rect) -> Rect;
    /// Element's total scale from its own space to the screen.
    fn world_scale(&self, id: ElementId) -> Point;
    /// Element's own scale relative to its parent.
    fn local_scale(&self, id: ElementId) -> Point;
    /// Push a committed position to the element's presenter/model.
    fn update_presenter_position(&mut self, _id: ElementId) {}

    // --- Containment ---

    /// Containing stack and the element's index in it.
    fn stack_of(&self, id: ElementId) -> Option<(ElementId, usize)>;
    fn scope_of(&self, id: ElementId) -> Option<ElementId>;
    /// One-shot notice that `id` is being dragged out of `stack`.
    fn stack_start_dragging(&mut self, stack: ElementId, id: ElementId);
    /// Shift-drag notice that `ids` are being dragged out of `scope`.
    fn scope_start_dragging(&mut self, _scope: ElementId, _ids: &[ElementId]) {}
    /// # Errors
    ///
    /// [`CanvasError::UnknownStack`], [`CanvasError::UnknownElement`], or
    /// [`CanvasError::StackIndexOutOfRange`].
    fn stack_insert(&mut self, stack: ElementId, index: usize, id: ElementId) -> Result<(), CanvasError>;
    /// # Errors
    ///
    /// [`CanvasError::UnknownScope`] or [`CanvasError::UnknownElement`].
    fn scope_add_elements(&mut self, scope: ElementId, ids: &[ElementId]) -> Result<(), CanvasError>;
    /// Committed notice that `ids` left `stack`.
    fn elements_removed_from_stack(&mut self, stack: ElementId, ids: &[ElementId]);

    // --- Drop targets ---

    fn is_drop_target(&self, id: ElementId) -> bool;
    fn can_accept_drop(&self, target: ElementId, selection: &[ElementId]) -> bool;
    fn send_drag_event(&mut self, target: ElementId, event: DragEvent, selection: &[ElementId]);

    // --- Change sink ---

    fn graph_changed(&mut self, change: GraphChange);

    // --- Ports and edges ---

    fn port(&self, id: PortId) -> Option<PortInfo>;
    fn ports(&self) -> Vec<PortInfo>;
    fn show_candidate_edge(&mut self, edge: &CandidateEdge);
    fn remove_candidate_edge(&mut self);
    fn show_hand_indicator(&mut self, indicator: &HandIndicator);
    fn remove_hand_indicator(&mut self, port: PortId);
    /// An edge was dropped on a compatible port.
    fn on_drop(&mut self, connection: EdgeConnection);
    /// An edge was dropped away from any compatible port; `at` is in content space.
    fn on_drop_outside_port(&mut self, source: PortId, at: Point);
}
