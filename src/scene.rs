//! Headless scene: an in-memory [`Canvas`] implementation.
//!
//! `Scene` owns nodes, stacks, groups, drop zones, and ports, plus the
//! viewport camera, pointer capture, and the visuals the controllers publish
//! (candidate edge, hand indicators). Every notification a controller sends is
//! appended to an ordered [`SceneEvent`] log so a host or test can replay what
//! happened.
//!
//! Stack children store their rectangles in stack-local coordinates; every
//! other element stores content coordinates. Ports are stored as offsets from
//! their owner's top-left corner, so they follow dragged nodes.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashMap;
use std::time::Duration;

use uuid::Uuid;

use crate::camera::{Camera, Point, Rect};
use crate::canvas::{
    Canvas, CanvasError, DragEvent, EdgeConnection, ElementId, GraphChange, PortDirection, PortId, PortInfo,
};
use crate::connect::CandidateEdge;
use crate::magnet::HandIndicator;

/// Default hit radius for ports added through [`Scene::add_port`].
pub const DEFAULT_PORT_RADIUS: f64 = 8.0;

/// What an element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// A plain graph node.
    Node,
    /// Ordered container; children are laid out by index.
    Stack,
    /// Unordered container (a scope).
    Group,
    /// Fixed region that only receives drag-and-drop notifications.
    DropZone,
}

impl ElementKind {
    #[must_use]
    pub fn is_drop_target(self) -> bool {
        matches!(self, Self::Stack | Self::Group | Self::DropZone)
    }
}

/// An element as stored in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneElement {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Rectangle in parent space.
    pub rect: Rect,
    /// Own scale relative to the parent.
    pub scale: Point,
    pub movable: bool,
    pub snappable: bool,
    /// Whether this element (when a drop target) accepts dropped selections.
    pub accepts_drop: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct ScenePort {
    id: PortId,
    owner: ElementId,
    direction: PortDirection,
    /// Offset of the center from the owner's top-left corner, in content units.
    offset: Point,
    radius: f64,
    connected: bool,
    kind: String,
}

/// Notifications recorded by the scene, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    PanSchedule { interval: Duration, running: bool },
    ViewRefreshed,
    StackStartDragging { stack: ElementId, element: ElementId },
    ScopeStartDragging { scope: ElementId, elements: Vec<ElementId> },
    RemovedFromStack { stack: ElementId, elements: Vec<ElementId> },
    PresenterUpdated(ElementId),
    Drag { target: ElementId, event: DragEvent },
    GraphChanged(GraphChange),
    Connected(EdgeConnection),
    DroppedOutside { source: PortId, at: Point },
}

/// In-memory canvas.
pub struct Scene {
    elements: HashMap<ElementId, SceneElement>,
    /// Bottom-most first.
    z_order: Vec<ElementId>,
    stacks: HashMap<ElementId, Vec<ElementId>>,
    scopes: HashMap<ElementId, Vec<ElementId>>,
    selection: Vec<ElementId>,
    ports: Vec<ScenePort>,
    camera: Camera,
    viewport: Point,
    captured: bool,
    pan_running: bool,
    candidate: Option<CandidateEdge>,
    hands: HashMap<PortId, HandIndicator>,
    events: Vec<SceneEvent>,
}

impl Scene {
    /// Create an empty scene with a viewport of the given size.
    #[must_use]
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            elements: HashMap::new(),
            z_order: Vec::new(),
            stacks: HashMap::new(),
            scopes: HashMap::new(),
            selection: Vec::new(),
            ports: Vec::new(),
            camera: Camera::default(),
            viewport: Point::new(viewport_width, viewport_height),
            captured: false,
            pan_running: false,
            candidate: None,
            hands: HashMap::new(),
            events: Vec::new(),
        }
    }

    // --- Building ---

    fn insert(&mut self, kind: ElementKind, rect: Rect, movable: bool, accepts_drop: bool) -> ElementId {
        let id = Uuid::new_v4();
        self.elements.insert(
            id,
            SceneElement {
                id,
                kind,
                rect,
                scale: Point::new(1.0, 1.0),
                movable,
                snappable: kind == ElementKind::Node,
                accepts_drop,
            },
        );
        self.z_order.push(id);
        match kind {
            ElementKind::Stack => {
                self.stacks.insert(id, Vec::new());
            }
            ElementKind::Group => {
                self.scopes.insert(id, Vec::new());
            }
            ElementKind::Node | ElementKind::DropZone => {}
        }
        id
    }

    /// Add a movable node at a content-space rectangle.
    pub fn add_node(&mut self, rect: Rect) -> ElementId {
        self.insert(ElementKind::Node, rect, true, false)
    }

    /// Add a movable stack that accepts drops.
    pub fn add_stack(&mut self, rect: Rect) -> ElementId {
        self.insert(ElementKind::Stack, rect, true, true)
    }

    /// Add a movable group (scope) that accepts drops.
    pub fn add_group(&mut self, rect: Rect) -> ElementId {
        self.insert(ElementKind::Group, rect, true, true)
    }

    /// Add a fixed drop zone.
    pub fn add_drop_zone(&mut self, rect: Rect, accepts_drop: bool) -> ElementId {
        self.insert(ElementKind::DropZone, rect, false, accepts_drop)
    }

    /// Append `id` to `stack`, converting its rectangle into stack-local space.
    ///
    /// # Errors
    ///
    /// Same as [`Canvas::stack_insert`].
    pub fn push_to_stack(&mut self, stack: ElementId, id: ElementId) -> Result<(), CanvasError> {
        let len = self.stacks.get(&stack).map_or(0, Vec::len);
        self.stack_insert(stack, len, id)
    }

    /// Make `id` a member of `group`.
    ///
    /// # Errors
    ///
    /// Same as [`Canvas::scope_add_elements`].
    pub fn add_to_group(&mut self, group: ElementId, id: ElementId) -> Result<(), CanvasError> {
        self.scope_add_elements(group, &[id])
    }

    pub fn set_movable(&mut self, id: ElementId, movable: bool) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.movable = movable;
        }
    }

    pub fn set_snappable(&mut self, id: ElementId, snappable: bool) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.snappable = snappable;
        }
    }

    pub fn set_scale(&mut self, id: ElementId, scale: Point) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.scale = scale;
        }
    }

    /// Add `id` to the end of the selection if it is not already selected.
    pub fn select(&mut self, id: ElementId) {
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Remove an element (and its ports) from the tree entirely.
    pub fn detach(&mut self, id: ElementId) {
        self.elements.remove(&id);
        self.z_order.retain(|e| *e != id);
        self.selection.retain(|e| *e != id);
        for children in self.stacks.values_mut() {
            children.retain(|e| *e != id);
        }
        for members in self.scopes.values_mut() {
            members.retain(|e| *e != id);
        }
        self.ports.retain(|p| p.owner != id);
    }

    /// Add a port to `owner`, centered `offset` from its top-left corner.
    pub fn add_port(&mut self, owner: ElementId, direction: PortDirection, offset: Point, kind: &str) -> PortId {
        let id = Uuid::new_v4();
        self.ports.push(ScenePort {
            id,
            owner,
            direction,
            offset,
            radius: DEFAULT_PORT_RADIUS,
            connected: false,
            kind: kind.to_string(),
        });
        id
    }

    pub fn set_port_connected(&mut self, port: PortId, connected: bool) {
        if let Some(p) = self.ports.iter_mut().find(|p| p.id == port) {
            p.connected = connected;
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&SceneElement> {
        self.elements.get(&id)
    }

    /// Rectangle of `id` in content space.
    #[must_use]
    pub fn content_rect(&self, id: ElementId) -> Option<Rect> {
        let el = self.elements.get(&id)?;
        Some(self.parent_to_content(id, el.rect))
    }

    #[must_use]
    pub fn stack_children(&self, stack: ElementId) -> &[ElementId] {
        self.stacks.get(&stack).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn scope_members(&self, scope: ElementId) -> &[ElementId] {
        self.scopes.get(&scope).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn candidate_edge(&self) -> Option<&CandidateEdge> {
        self.candidate.as_ref()
    }

    #[must_use]
    pub fn hand_indicator(&self, port: PortId) -> Option<&HandIndicator> {
        self.hands.get(&port)
    }

    #[must_use]
    pub fn hand_indicator_count(&self) -> usize {
        self.hands.len()
    }

    #[must_use]
    pub fn pan_running(&self) -> bool {
        self.pan_running
    }

    /// Every graph change delivered so far.
    #[must_use]
    pub fn graph_changes(&self) -> Vec<&GraphChange> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SceneEvent::GraphChanged(change) => Some(change),
                _ => None,
            })
            .collect()
    }

    /// Every drag-and-drop notification delivered so far.
    #[must_use]
    pub fn drag_events(&self) -> Vec<(ElementId, DragEvent)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SceneEvent::Drag { target, event } => Some((*target, *event)),
                _ => None,
            })
            .collect()
    }

    /// Every completed connection so far.
    #[must_use]
    pub fn connections(&self) -> Vec<EdgeConnection> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SceneEvent::Connected(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    fn parent_stack(&self, id: ElementId) -> Option<(ElementId, usize)> {
        self.stacks
            .iter()
            .find_map(|(stack, children)| children.iter().position(|c| *c == id).map(|idx| (*stack, idx)))
    }

    /// Content-space origin of `id`'s parent.
    fn parent_origin(&self, id: ElementId) -> Point {
        match self.parent_stack(id) {
            Some((stack, _)) => self.content_rect(stack).map_or(Point::ZERO, |r| r.position()),
            None => Point::ZERO,
        }
    }

    fn port_info(&self, port: &ScenePort) -> PortInfo {
        let origin = self.content_rect(port.owner).map_or(Point::ZERO, |r| r.position());
        PortInfo {
            id: port.id,
            owner: port.owner,
            direction: port.direction,
            center: origin + port.offset,
            radius: port.radius,
            connected: port.connected,
            kind: port.kind.clone(),
        }
    }

    /// Pull `id` out of whatever stack holds it, keeping its content position.
    fn unstack(&mut self, id: ElementId) {
        let Some((stack, idx)) = self.parent_stack(id) else {
            return;
        };
        let origin = self.parent_origin(id);
        if let Some(children) = self.stacks.get_mut(&stack) {
            children.remove(idx);
        }
        if let Some(el) = self.elements.get_mut(&id) {
            el.rect = el.rect.translated(origin);
        }
    }
}

impl Canvas for Scene {
    fn camera(&self) -> Camera {
        self.camera
    }

    fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    fn refresh_view_transform(&mut self) {
        self.events.push(SceneEvent::ViewRefreshed);
    }

    fn viewport_size(&self) -> Point {
        self.viewport
    }

    fn capture_pointer(&mut self) {
        self.captured = true;
    }

    fn release_pointer(&mut self) {
        self.captured = false;
    }

    fn has_pointer_capture(&self) -> bool {
        self.captured
    }

    fn set_pan_schedule(&mut self, interval: Duration, running: bool) {
        self.pan_running = running;
        self.events.push(SceneEvent::PanSchedule { interval, running });
    }

    fn element_at(&self, screen: Point) -> Option<ElementId> {
        self.pick_all(screen).into_iter().next()
    }

    fn pick_all(&self, screen: Point) -> Vec<ElementId> {
        let world = self.camera.screen_to_world(screen);
        self.z_order
            .iter()
            .rev()
            .filter(|id| self.content_rect(**id).is_some_and(|r| r.contains(world)))
            .copied()
            .collect()
    }

    fn port_at(&self, screen: Point) -> Option<PortId> {
        let world = self.camera.screen_to_world(screen);
        self.ports
            .iter()
            .rev()
            .map(|p| self.port_info(p))
            .find(|p| p.center.distance(world) <= p.radius)
            .map(|p| p.id)
    }

    fn selection(&self) -> Vec<ElementId> {
        self.selection.clone()
    }

    fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    fn is_movable(&self, id: ElementId) -> bool {
        self.elements.get(&id).is_some_and(|e| e.movable)
    }

    fn is_snappable(&self, id: ElementId) -> bool {
        self.elements.get(&id).is_some_and(|e| e.snappable)
    }

    fn is_attached(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    fn position(&self, id: ElementId) -> Option<Rect> {
        self.elements.get(&id).map(|e| e.rect)
    }

    fn set_position(&mut self, id: ElementId, rect: Rect) -> Result<(), CanvasError> {
        let el = self.elements.get_mut(&id).ok_or(CanvasError::UnknownElement(id))?;
        el.rect = rect;
        Ok(())
    }

    fn parent_to_content(&self, id: ElementId, rect: Rect) -> Rect {
        rect.translated(self.parent_origin(id))
    }

    fn content_to_parent(&self, id: ElementId, rect: Rect) -> Rect {
        rect.translated(-self.parent_origin(id))
    }

    fn world_scale(&self, id: ElementId) -> Point {
        let local = self.local_scale(id);
        Point::new(local.x * self.camera.zoom, local.y * self.camera.zoom)
    }

    fn local_scale(&self, id: ElementId) -> Point {
        self.elements.get(&id).map_or(Point::new(1.0, 1.0), |e| e.scale)
    }

    fn update_presenter_position(&mut self, id: ElementId) {
        self.events.push(SceneEvent::PresenterUpdated(id));
    }

    fn stack_of(&self, id: ElementId) -> Option<(ElementId, usize)> {
        self.parent_stack(id)
    }

    fn scope_of(&self, id: ElementId) -> Option<ElementId> {
        self.scopes
            .iter()
            .find(|(_, members)| members.contains(&id))
            .map(|(scope, _)| *scope)
    }

    fn stack_start_dragging(&mut self, stack: ElementId, id: ElementId) {
        if self.parent_stack(id).is_some_and(|(s, _)| s == stack) {
            self.unstack(id);
        }
        self.events.push(SceneEvent::StackStartDragging { stack, element: id });
    }

    fn scope_start_dragging(&mut self, scope: ElementId, ids: &[ElementId]) {
        if let Some(members) = self.scopes.get_mut(&scope) {
            members.retain(|m| !ids.contains(m));
        }
        self.events.push(SceneEvent::ScopeStartDragging { scope, elements: ids.to_vec() });
    }

    fn stack_insert(&mut self, stack: ElementId, index: usize, id: ElementId) -> Result<(), CanvasError> {
        if !self.stacks.contains_key(&stack) {
            return Err(CanvasError::UnknownStack(stack));
        }
        if !self.elements.contains_key(&id) {
            return Err(CanvasError::UnknownElement(id));
        }
        let len = self.stacks.get(&stack).map_or(0, |c| c.iter().filter(|c| **c != id).count());
        if index > len {
            return Err(CanvasError::StackIndexOutOfRange { stack, index, len });
        }
        self.unstack(id);
        let origin = self.content_rect(stack).map_or(Point::ZERO, |r| r.position());
        if let Some(el) = self.elements.get_mut(&id) {
            el.rect = el.rect.translated(-origin);
        }
        if let Some(children) = self.stacks.get_mut(&stack) {
            children.insert(index, id);
        }
        Ok(())
    }

    fn scope_add_elements(&mut self, scope: ElementId, ids: &[ElementId]) -> Result<(), CanvasError> {
        if let Some(missing) = ids.iter().find(|id| !self.elements.contains_key(*id)) {
            return Err(CanvasError::UnknownElement(*missing));
        }
        let members = self.scopes.get_mut(&scope).ok_or(CanvasError::UnknownScope(scope))?;
        for id in ids {
            if !members.contains(id) {
                members.push(*id);
            }
        }
        Ok(())
    }

    fn elements_removed_from_stack(&mut self, stack: ElementId, ids: &[ElementId]) {
        self.events.push(SceneEvent::RemovedFromStack { stack, elements: ids.to_vec() });
    }

    fn is_drop_target(&self, id: ElementId) -> bool {
        self.elements.get(&id).is_some_and(|e| e.kind.is_drop_target())
    }

    fn can_accept_drop(&self, target: ElementId, selection: &[ElementId]) -> bool {
        self.elements.get(&target).is_some_and(|e| e.accepts_drop) && !selection.contains(&target)
    }

    fn send_drag_event(&mut self, target: ElementId, event: DragEvent, _selection: &[ElementId]) {
        self.events.push(SceneEvent::Drag { target, event });
    }

    fn graph_changed(&mut self, change: GraphChange) {
        self.events.push(SceneEvent::GraphChanged(change));
    }

    fn port(&self, id: PortId) -> Option<PortInfo> {
        self.ports.iter().find(|p| p.id == id).map(|p| self.port_info(p))
    }

    fn ports(&self) -> Vec<PortInfo> {
        self.ports.iter().map(|p| self.port_info(p)).collect()
    }

    fn show_candidate_edge(&mut self, edge: &CandidateEdge) {
        self.candidate = Some(edge.clone());
    }

    fn remove_candidate_edge(&mut self) {
        self.candidate = None;
    }

    fn show_hand_indicator(&mut self, indicator: &HandIndicator) {
        self.hands.insert(indicator.port(), indicator.clone());
    }

    fn remove_hand_indicator(&mut self, port: PortId) {
        self.hands.remove(&port);
    }

    fn on_drop(&mut self, connection: EdgeConnection) {
        self.set_port_connected(connection.output, true);
        self.set_port_connected(connection.input, true);
        self.events.push(SceneEvent::Connected(connection));
    }

    fn on_drop_outside_port(&mut self, source: PortId, at: Point) {
        self.events.push(SceneEvent::DroppedOutside { source, at });
    }
}
