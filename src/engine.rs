use tracing::{debug, info};

use crate::camera::Point;
use crate::canvas::Canvas;
use crate::config::InteractConfig;
use crate::connect::EdgeConnector;
use crate::content::ContentDragger;
use crate::input::{Action, Button, CancelReason, Key, Modifiers, PointerEvent, PointerInteraction, stops_propagation};
use crate::selection::SelectionDragger;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Routes host input to the interaction controllers.
///
/// Pointer-down is offered to the edge connector, then the selection dragger,
/// then the content dragger, stopping at the first one that consumes it. Every
/// later event of the gesture goes to whichever controllers are active.
///
/// The engine holds no canvas; every entry point borrows one for the duration
/// of the call.
pub struct Engine {
    config: InteractConfig,
    pub edges: EdgeConnector,
    pub selection: SelectionDragger,
    pub content: ContentDragger,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(InteractConfig::default())
    }
}

impl Engine {
    #[must_use]
    pub fn new(config: InteractConfig) -> Self {
        info!(
            pan_interval_ms = config.pan_interval_ms,
            response_distance = config.response_distance,
            snap_grid = ?config.snap_grid,
            "interaction engine ready"
        );
        Self {
            config,
            edges: EdgeConnector::new(config),
            selection: SelectionDragger::new(config),
            content: ContentDragger::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &InteractConfig {
        &self.config
    }

    /// Whether any gesture is in progress.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.edges.is_active() || self.selection.is_active() || self.content.is_active()
    }

    fn controllers(&mut self) -> [&mut dyn PointerInteraction; 3] {
        [&mut self.edges, &mut self.selection, &mut self.content]
    }

    // --- Pointer ---

    pub fn on_pointer_down(
        &mut self,
        canvas: &mut dyn Canvas,
        screen_pt: Point,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        let event = PointerEvent::new(screen_pt, button, modifiers);
        let mut actions = Vec::new();
        for controller in self.controllers() {
            actions.extend(controller.arm(canvas, &event));
            if stops_propagation(&actions) {
                break;
            }
        }
        actions
    }

    pub fn on_pointer_move(&mut self, canvas: &mut dyn Canvas, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let event = PointerEvent::new(screen_pt, Button::Primary, modifiers);
        let mut actions = Vec::new();
        for controller in self.controllers() {
            if controller.is_active() {
                actions.extend(controller.update(canvas, &event));
            }
        }
        actions
    }

    pub fn on_pointer_up(
        &mut self,
        canvas: &mut dyn Canvas,
        screen_pt: Point,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        let event = PointerEvent::new(screen_pt, button, modifiers);
        let mut actions = Vec::new();
        for controller in self.controllers() {
            if controller.is_active() {
                actions.extend(controller.resolve(canvas, &event));
            }
        }
        actions
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, canvas: &mut dyn Canvas, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if !key.is_escape() {
            return Vec::new();
        }
        self.cancel_all(canvas, CancelReason::Escape)
    }

    // --- Host notifications ---

    /// The host took pointer capture away mid-gesture.
    pub fn on_capture_lost(&mut self, canvas: &mut dyn Canvas) -> Vec<Action> {
        self.cancel_all(canvas, CancelReason::CaptureLost)
    }

    /// Periodic auto-pan tick, fired while the pan schedule runs.
    pub fn on_pan_tick(&mut self, canvas: &mut dyn Canvas) -> Vec<Action> {
        self.selection.on_pan_tick(canvas)
    }

    fn cancel_all(&mut self, canvas: &mut dyn Canvas, reason: CancelReason) -> Vec<Action> {
        let mut actions = Vec::new();
        for controller in self.controllers() {
            if controller.is_active() {
                actions.extend(controller.cancel(canvas, reason));
            }
        }
        if !actions.is_empty() {
            debug!(?reason, "gesture cancelled");
        }
        actions
    }
}
