//! Input model: modifier keys, buttons, pointer events, activation filters, and
//! the capability trait every controller implements.
//!
//! Controllers never receive raw host events. The host translates its own
//! pointer/keyboard callbacks into [`PointerEvent`]s and [`Key`]s and hands them
//! to [`crate::engine::Engine`], which routes them through the
//! [`PointerInteraction`] methods below. Each handler returns the [`Action`]s
//! the host should apply (stop propagation, request a repaint).

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::canvas::Canvas;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false, meta: false };
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false, meta: false };
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false, meta: false };
    pub const ALT: Self = Self { shift: false, ctrl: false, alt: true, meta: false };
    pub const META: Self = Self { shift: false, ctrl: false, alt: false, meta: true };

    /// The platform's "add to selection" modifier: Command on macOS, Ctrl elsewhere.
    #[must_use]
    pub fn action_key() -> Self {
        if cfg!(target_os = "macos") { Self::META } else { Self::CTRL }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key, named as the host reports it (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// A pointer event in screen (viewport-local) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    /// Button pressed or released. Ignored for moves.
    pub button: Button,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    #[must_use]
    pub fn new(position: Point, button: Button, modifiers: Modifiers) -> Self {
        Self { position, button, modifiers }
    }

    /// Primary-button event with no modifiers.
    #[must_use]
    pub fn primary(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y), Button::Primary, Modifiers::NONE)
    }

    #[must_use]
    pub fn with_modifiers(self, modifiers: Modifiers) -> Self {
        Self { modifiers, ..self }
    }
}

/// A (button, exact modifier set) pair that may start a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationFilter {
    pub button: Button,
    pub modifiers: Modifiers,
}

impl ActivationFilter {
    #[must_use]
    pub fn new(button: Button, modifiers: Modifiers) -> Self {
        Self { button, modifiers }
    }

    /// Button must match and the held modifiers must equal the filter's exactly.
    #[must_use]
    pub fn matches(&self, event: &PointerEvent) -> bool {
        self.button == event.button && self.modifiers == event.modifiers
    }
}

/// The activators of one controller, plus the one that started the current gesture.
#[derive(Debug, Clone, Default)]
pub struct Activators {
    filters: Vec<ActivationFilter>,
    current: Option<ActivationFilter>,
}

impl Activators {
    #[must_use]
    pub fn new(filters: Vec<ActivationFilter>) -> Self {
        Self { filters, current: None }
    }

    /// Whether `event` may start the gesture. Remembers the matching filter.
    pub fn can_start(&mut self, event: &PointerEvent) -> bool {
        match self.filters.iter().find(|f| f.matches(event)) {
            Some(filter) => {
                self.current = Some(*filter);
                true
            }
            None => false,
        }
    }

    /// Whether `event` releases the button that started the gesture.
    #[must_use]
    pub fn can_stop(&self, event: &PointerEvent) -> bool {
        self.current.is_some_and(|f| f.button == event.button)
    }

    #[must_use]
    pub fn filters(&self) -> &[ActivationFilter] {
        &self.filters
    }
}

/// Actions returned from handlers for the host to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The event was consumed; do not bubble it further.
    StopPropagation,
    /// The event was consumed; do not offer it to any other handler either.
    StopImmediatePropagation,
    /// Visual state changed; schedule a repaint.
    RenderNeeded,
}

/// Whether `actions` stop the event from reaching later handlers.
#[must_use]
pub fn stops_propagation(actions: &[Action]) -> bool {
    actions
        .iter()
        .any(|a| matches!(a, Action::StopPropagation | Action::StopImmediatePropagation))
}

/// Why an active gesture is being cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The user pressed Escape.
    Escape,
    /// Pointer capture was taken away by the host.
    CaptureLost,
}

/// The capability every pointer controller offers the dispatcher.
///
/// `arm` handles pointer-down, `update` pointer-move, `resolve` pointer-up, and
/// `cancel` Escape or capture loss. All four run to completion before the next
/// event is delivered.
pub trait PointerInteraction {
    fn arm(&mut self, canvas: &mut dyn Canvas, event: &PointerEvent) -> Vec<Action>;
    fn update(&mut self, canvas: &mut dyn Canvas, event: &PointerEvent) -> Vec<Action>;
    fn resolve(&mut self, canvas: &mut dyn Canvas, event: &PointerEvent) -> Vec<Action>;
    fn cancel(&mut self, canvas: &mut dyn Canvas, reason: CancelReason) -> Vec<Action>;
    fn is_active(&self) -> bool;
}
