//! Selection Drag Controller: move the selected elements with the pointer.
//!
//! ```text
//! Idle --pointer-down on selected movable element--> Dragging
//!   ^                                                   |
//!   +-- pointer-up (commit) / Escape (restore) ---------+
//!   +-- capture lost (reset only) ----------------------+
//! ```
//!
//! ## Coordinates
//!
//! Original positions are recorded in content space. Each frame the pointer
//! displacement since pointer-down, plus whatever auto-pan has shifted the
//! viewport, is divided by the element's world scale, applied to the recorded
//! rectangle, and converted back into the element's parent space. Moving is
//! therefore idempotent per frame: it never accumulates rounding drift.
//!
//! ## Containment
//!
//! Elements leave their stack on the first frame they move
//! (`stack_start_dragging`). With Shift held, they also leave their scope
//! (`scope_start_dragging`). Escape puts both back.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use tracing::{debug, warn};

use crate::camera::{Point, Rect};
use crate::canvas::{Canvas, DragEvent, ElementId, GraphChange};
use crate::config::InteractConfig;
use crate::input::{
    Action, ActivationFilter, Activators, Button, CancelReason, Modifiers, PointerEvent, PointerInteraction,
};
use crate::pan::{PanSchedule, PanState, effective_pan_speed};

/// Snapshot of one dragged element, taken at pointer-down.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalPosition {
    pub id: ElementId,
    /// Pre-drag rectangle in content space.
    pub rect: Rect,
    pub scope: Option<ElementId>,
    /// Containing stack and index.
    pub stack: Option<(ElementId, usize)>,
    /// Set on the first frame the element is displaced.
    pub drag_started: bool,
}

struct DragSession {
    records: Vec<OriginalPosition>,
    reference: ElementId,
    original_mouse: Point,
    /// Pointer-down position minus current pointer position.
    mouse_diff: Point,
    pan: PanState,
    shift: bool,
    snap: bool,
    drop_target: Option<ElementId>,
    moved: bool,
}

impl DragSession {
    fn reference_record(&self) -> Option<&OriginalPosition> {
        self.records.iter().find(|r| r.id == self.reference)
    }
}

pub struct SelectionDragger {
    config: InteractConfig,
    activators: Activators,
    schedule: PanSchedule,
    session: Option<DragSession>,
}

impl SelectionDragger {
    #[must_use]
    pub fn new(config: InteractConfig) -> Self {
        Self {
            activators: Activators::new(vec![
                ActivationFilter::new(Button::Primary, Modifiers::NONE),
                ActivationFilter::new(Button::Primary, Modifiers::SHIFT),
                ActivationFilter::new(Button::Primary, Modifiers::action_key()),
            ]),
            schedule: PanSchedule::new(config.pan_interval()),
            config,
            session: None,
        }
    }

    /// Elements being dragged, in selection order.
    #[must_use]
    pub fn dragged(&self) -> Vec<ElementId> {
        self.session
            .as_ref()
            .map(|s| s.records.iter().map(|r| r.id).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn original_position(&self, id: ElementId) -> Option<&OriginalPosition> {
        self.session.as_ref()?.records.iter().find(|r| r.id == id)
    }

    /// Element whose displacement drives snapping and the reported move delta.
    #[must_use]
    pub fn reference(&self) -> Option<ElementId> {
        self.session.as_ref().map(|s| s.reference)
    }

    #[must_use]
    pub fn pan_state(&self) -> Option<PanState> {
        self.session.as_ref().map(|s| s.pan)
    }

    #[must_use]
    pub fn drop_target(&self) -> Option<ElementId> {
        self.session.as_ref().and_then(|s| s.drop_target)
    }

    #[must_use]
    pub fn pan_schedule(&self) -> &PanSchedule {
        &self.schedule
    }

    /// Periodic auto-pan step. The host calls this while the schedule runs.
    pub fn on_pan_tick(&mut self, canvas: &mut dyn Canvas) -> Vec<Action> {
        if !self.schedule.is_running() {
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        let step = session.pan.tick();
        let mut camera = canvas.camera();
        camera.pan_by(-step);
        canvas.set_camera(camera);
        apply_move(canvas, session, &self.config);
        vec![Action::RenderNeeded]
    }

    /// Pause auto-pan and re-apply the view if it moved during the drag.
    fn settle_view(&mut self, canvas: &mut dyn Canvas, panned: bool) {
        self.schedule.pause(canvas);
        if panned {
            canvas.refresh_view_transform();
        }
    }

    fn commit(&mut self, canvas: &mut dyn Canvas, session: &DragSession) {
        if session.moved {
            for (stack, ids) in group_by_key(session.records.iter().map(|r| (r.stack.map(|(s, _)| s), r.id))) {
                if let Some(stack) = stack {
                    canvas.elements_removed_from_stack(stack, &ids);
                }
                for id in ids {
                    canvas.update_presenter_position(id);
                }
            }

            let moved_elements: Vec<ElementId> = session
                .records
                .iter()
                .filter(|r| content_position(canvas, r.id).is_some_and(|p| p != r.rect.position()))
                .map(|r| r.id)
                .collect();

            if !moved_elements.is_empty() {
                let move_delta = session
                    .reference_record()
                    .and_then(|r| content_position(canvas, r.id).map(|p| p - r.rect.position()))
                    .unwrap_or_default();
                debug!(count = moved_elements.len(), dx = move_delta.x, dy = move_delta.y, "selection drag committed");
                canvas.graph_changed(GraphChange { moved_elements, move_delta });
            }
        }

        self.settle_view(canvas, session.pan.has_panned());

        let selection = canvas.selection();
        if !selection.is_empty() {
            if let Some(target) = session.drop_target {
                let event =
                    if canvas.can_accept_drop(target, &selection) { DragEvent::Perform } else { DragEvent::Exited };
                dispatch(canvas, Some(target), event, &selection);
            }
        }
        canvas.release_pointer();
    }

    fn restore(&mut self, canvas: &mut dyn Canvas, session: &DragSession) {
        let mut stacked: Vec<&OriginalPosition> = session.records.iter().filter(|r| r.stack.is_some()).collect();
        stacked.sort_by_key(|r| r.stack.map(|(_, index)| index));

        for record in stacked {
            let Some((stack, index)) = record.stack else {
                continue;
            };
            if let Err(err) = canvas.stack_insert(stack, index, record.id) {
                warn!(%stack, index, element = %record.id, error = %err, "stack re-insertion failed");
            }
            restore_position(canvas, record);
        }

        let loose = session.records.iter().filter(|r| r.stack.is_none());
        for record in loose.clone() {
            restore_position(canvas, record);
        }
        for (scope, ids) in group_by_key(loose.filter_map(|r| r.scope.map(|s| (s, r.id)))) {
            if let Err(err) = canvas.scope_add_elements(scope, &ids) {
                warn!(%scope, count = ids.len(), error = %err, "scope re-addition failed");
            }
        }

        self.settle_view(canvas, session.pan.has_panned());
        let selection = canvas.selection();
        dispatch(canvas, session.drop_target, DragEvent::Exited, &selection);
        canvas.release_pointer();
        debug!(count = session.records.len(), "selection drag cancelled");
    }

    fn abandon(&mut self, canvas: &mut dyn Canvas, session: &DragSession) {
        if let Some(target) = session.drop_target {
            let selection = canvas.selection();
            if canvas.can_accept_drop(target, &selection) {
                canvas.send_drag_event(target, DragEvent::Exited, &selection);
            }
        }
        self.settle_view(canvas, session.pan.has_panned());
        debug!(count = session.records.len(), "selection drag lost pointer capture");
    }
}

impl PointerInteraction for SelectionDragger {
    fn arm(&mut self, canvas: &mut dyn Canvas, event: &PointerEvent) -> Vec<Action> {
        if self.session.is_some() {
            return vec![Action::StopImmediatePropagation];
        }
        if !self.activators.can_start(event) {
            return Vec::new();
        }
        let Some(clicked) = canvas.element_at(event.position) else {
            return Vec::new();
        };
        if !canvas.is_movable(clicked) {
            return Vec::new();
        }
        if !canvas.is_selected(clicked) {
            return vec![Action::StopImmediatePropagation];
        }

        let records = snapshot(canvas);
        let Some(first) = records.first() else {
            return Vec::new();
        };
        let reference = if records.iter().any(|r| r.id == clicked) { clicked } else { first.id };
        let snap = self.config.snap_grid.is_some() && canvas.is_snappable(reference);

        debug!(count = records.len(), %reference, snap, "selection drag armed");
        self.session = Some(DragSession {
            records,
            reference,
            original_mouse: event.position,
            mouse_diff: Point::ZERO,
            pan: PanState::default(),
            shift: event.modifiers.shift,
            snap,
            drop_target: None,
            moved: false,
        });
        self.schedule.arm(canvas);
        canvas.capture_pointer();
        vec![Action::StopImmediatePropagation]
    }

    fn update(&mut self, canvas: &mut dyn Canvas, event: &PointerEvent) -> Vec<Action> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        let velocity = effective_pan_speed(event.position, canvas.viewport_size(), &self.config);
        session.pan.velocity = velocity;
        self.schedule.follow(canvas, velocity);

        session.mouse_diff = session.original_mouse - event.position;
        session.shift = event.modifiers.shift;
        start_dragging(canvas, session);
        apply_move(canvas, session, &self.config);

        let selection = canvas.selection();
        let target = drop_target_at(canvas, event.position, &selection);
        if target != session.drop_target {
            dispatch(canvas, session.drop_target, DragEvent::Leave, &selection);
            dispatch(canvas, target, DragEvent::Enter, &selection);
        }
        dispatch(canvas, target, DragEvent::Updated, &selection);
        session.drop_target = target;
        session.moved = true;

        vec![Action::StopPropagation, Action::RenderNeeded]
    }

    fn resolve(&mut self, canvas: &mut dyn Canvas, event: &PointerEvent) -> Vec<Action> {
        if self.session.is_none() || !self.activators.can_stop(event) {
            return Vec::new();
        }
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        self.commit(canvas, &session);
        vec![Action::StopPropagation, Action::RenderNeeded]
    }

    fn cancel(&mut self, canvas: &mut dyn Canvas, reason: CancelReason) -> Vec<Action> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        match reason {
            CancelReason::Escape => self.restore(canvas, &session),
            CancelReason::CaptureLost => self.abandon(canvas, &session),
        }
        vec![Action::StopPropagation, Action::RenderNeeded]
    }

    fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Record every selected movable element not already carried by a selected stack.
fn snapshot(canvas: &dyn Canvas) -> Vec<OriginalPosition> {
    let mut records: Vec<OriginalPosition> = Vec::new();
    for id in canvas.selection() {
        if records.iter().any(|r| r.id == id) || !canvas.is_movable(id) {
            continue;
        }
        let stack = canvas.stack_of(id);
        if stack.is_some_and(|(s, _)| canvas.is_selected(s)) {
            continue;
        }
        let Some(rect) = canvas.position(id) else {
            continue;
        };
        records.push(OriginalPosition {
            id,
            rect: canvas.parent_to_content(id, rect),
            scope: canvas.scope_of(id),
            stack,
            drag_started: false,
        });
    }
    records
}

/// One-shot containment notices for elements moving for the first time.
fn start_dragging(canvas: &mut dyn Canvas, session: &mut DragSession) {
    let mut leaving_scopes: Vec<(ElementId, ElementId)> = Vec::new();
    for record in &mut session.records {
        if record.drag_started || !canvas.is_attached(record.id) {
            continue;
        }
        if let Some((stack, _)) = canvas.stack_of(record.id) {
            canvas.stack_start_dragging(stack, record.id);
        }
        if session.shift {
            if let Some(scope) = canvas.scope_of(record.id) {
                leaving_scopes.push((scope, record.id));
            }
        }
        record.drag_started = true;
    }
    for (scope, ids) in group_by_key(leaving_scopes.into_iter()) {
        canvas.scope_start_dragging(scope, &ids);
    }
}

/// Reposition every dragged element for the current pointer and pan offsets.
fn apply_move(canvas: &mut dyn Canvas, session: &DragSession, cfg: &InteractConfig) {
    let offset = session.mouse_diff - session.pan.accumulated;
    let snapped = snapped_displacement(canvas, session, offset, cfg);

    for record in &session.records {
        if !canvas.is_attached(record.id) {
            continue;
        }
        let content = match snapped {
            Some(displacement) => record.rect.translated(displacement),
            None => {
                let world = canvas.world_scale(record.id);
                let local = canvas.local_scale(record.id);
                record.rect.with_position(Point::new(
                    record.rect.x - offset.x / world.x * local.x,
                    record.rect.y - offset.y / world.y * local.y,
                ))
            }
        };
        let rect = canvas.content_to_parent(record.id, content);
        if let Err(err) = canvas.set_position(record.id, rect) {
            warn!(element = %record.id, error = %err, "move failed");
        }
    }
}

/// Grid-snapped displacement of the reference element, when snapping applies.
fn snapped_displacement(
    canvas: &dyn Canvas,
    session: &DragSession,
    offset: Point,
    cfg: &InteractConfig,
) -> Option<Point> {
    if !session.snap || session.shift {
        return None;
    }
    let grid = cfg.snap_grid?;
    let reference = session.reference_record()?;
    let scale = canvas.world_scale(reference.id);
    let proposed = reference.rect.with_position(Point::new(
        reference.rect.x - offset.x / scale.x,
        reference.rect.y - offset.y / scale.y,
    ));
    Some(proposed.snapped_to_grid(grid).position() - reference.rect.position())
}

fn restore_position(canvas: &mut dyn Canvas, record: &OriginalPosition) {
    let rect = canvas.content_to_parent(record.id, record.rect);
    if let Err(err) = canvas.set_position(record.id, rect) {
        warn!(element = %record.id, error = %err, "position restore failed");
    }
}

fn content_position(canvas: &dyn Canvas, id: ElementId) -> Option<Point> {
    canvas.position(id).map(|r| canvas.parent_to_content(id, r).position())
}

/// Top-most drop target under `screen` that is not itself being dragged.
fn drop_target_at(canvas: &dyn Canvas, screen: Point, selection: &[ElementId]) -> Option<ElementId> {
    canvas
        .pick_all(screen)
        .into_iter()
        .find(|id| canvas.is_drop_target(*id) && !selection.contains(id))
}

/// Deliver `event` to `target`. Updated and Perform need the target to accept.
fn dispatch(canvas: &mut dyn Canvas, target: Option<ElementId>, event: DragEvent, selection: &[ElementId]) {
    let Some(target) = target else {
        return;
    };
    if event.requires_acceptance() && !canvas.can_accept_drop(target, selection) {
        return;
    }
    canvas.send_drag_event(target, event, selection);
}

/// Group values by key, keeping first-appearance order for both.
fn group_by_key<K: PartialEq>(items: impl Iterator<Item = (K, ElementId)>) -> Vec<(K, Vec<ElementId>)> {
    let mut groups: Vec<(K, Vec<ElementId>)> = Vec::new();
    for (key, id) in items {
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, ids)) => ids.push(id),
            None => groups.push((key, vec![id])),
        }
    }
    groups
}
