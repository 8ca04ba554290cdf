//! Content Drag Controller: pan the viewport by dragging the canvas.
//!
//! Middle button, or primary with Alt. The content point under the pointer at
//! pointer-down stays under the pointer for the rest of the drag.

#[cfg(test)]
#[path = "content_test.rs"]
mod content_test;

use tracing::debug;

use crate::camera::Point;
use crate::canvas::Canvas;
use crate::input::{
    Action, ActivationFilter, Activators, Button, CancelReason, Modifiers, PointerEvent, PointerInteraction,
};

pub struct ContentDragger {
    activators: Activators,
    /// Content-space point grabbed at pointer-down.
    start: Option<Point>,
}

impl Default for ContentDragger {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentDragger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            activators: Activators::new(vec![
                ActivationFilter::new(Button::Primary, Modifiers::ALT),
                ActivationFilter::new(Button::Middle, Modifiers::NONE),
            ]),
            start: None,
        }
    }
}

impl PointerInteraction for ContentDragger {
    fn arm(&mut self, canvas: &mut dyn Canvas, event: &PointerEvent) -> Vec<Action> {
        if self.start.is_some() {
            return vec![Action::StopImmediatePropagation];
        }
        if !self.activators.can_start(event) {
            return Vec::new();
        }
        let start = canvas.camera().screen_to_world(event.position);
        self.start = Some(start);
        canvas.capture_pointer();
        debug!(x = start.x, y = start.y, "content drag armed");
        vec![Action::StopImmediatePropagation]
    }

    fn update(&mut self, canvas: &mut dyn Canvas, event: &PointerEvent) -> Vec<Action> {
        let Some(start) = self.start else {
            return Vec::new();
        };
        let mut camera = canvas.camera();
        let drift = camera.screen_to_world(event.position) - start;
        camera.pan_by(drift * camera.zoom);
        canvas.set_camera(camera);
        vec![Action::StopPropagation, Action::RenderNeeded]
    }

    fn resolve(&mut self, canvas: &mut dyn Canvas, event: &PointerEvent) -> Vec<Action> {
        if self.start.is_none() || !self.activators.can_stop(event) {
            return Vec::new();
        }
        self.start = None;
        canvas.refresh_view_transform();
        canvas.release_pointer();
        let camera = canvas.camera();
        debug!(pan_x = camera.pan_x, pan_y = camera.pan_y, "content drag finished");
        vec![Action::StopPropagation]
    }

    fn cancel(&mut self, _canvas: &mut dyn Canvas, reason: CancelReason) -> Vec<Action> {
        match reason {
            CancelReason::Escape => Vec::new(),
            CancelReason::CaptureLost => {
                self.start = None;
                Vec::new()
            }
        }
    }

    fn is_active(&self) -> bool {
        self.start.is_some()
    }
}
