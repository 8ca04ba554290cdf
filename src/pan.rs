//! Auto-pan while dragging near the viewport edges.
//!
//! The pan vector is recomputed on every pointer move from the pointer's
//! distance into the margin band. A pausable [`PanSchedule`] tells the host
//! whether to keep firing the periodic pan tick; each tick shifts the camera by
//! the vector and adds it to [`PanState::accumulated`].

#[cfg(test)]
#[path = "pan_test.rs"]
mod pan_test;

use std::time::Duration;

use crate::camera::Point;
use crate::canvas::Canvas;
use crate::config::InteractConfig;

/// Pan velocity for a pointer at `pointer` in a viewport of size `viewport`.
///
/// Zero while the pointer is strictly inside the band on both axes. Past the
/// band's inner edge the speed starts at `min_pan_speed_factor * pan_speed` and
/// grows linearly with depth; the result is clamped to `max_pan_speed`.
#[must_use]
pub fn effective_pan_speed(pointer: Point, viewport: Point, cfg: &InteractConfig) -> Point {
    Point::new(
        axis_speed(pointer.x, viewport.x, cfg),
        axis_speed(pointer.y, viewport.y, cfg),
    )
    .clamp_length(cfg.max_pan_speed)
}

fn axis_speed(pos: f64, extent: f64, cfg: &InteractConfig) -> f64 {
    let band = cfg.pan_area_width;
    if pos <= band {
        -((band - pos) / band + cfg.min_pan_speed_factor) * cfg.pan_speed
    } else if pos >= extent - band {
        ((pos - (extent - band)) / band + cfg.min_pan_speed_factor) * cfg.pan_speed
    } else {
        0.0
    }
}

/// Per-drag pan bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanState {
    /// Pan vector applied on each tick, in screen pixels.
    pub velocity: Point,
    /// Sum of every vector applied since the drag started.
    pub accumulated: Point,
}

impl PanState {
    /// Record one tick's worth of panning and return the applied vector.
    pub fn tick(&mut self) -> Point {
        self.accumulated += self.velocity;
        self.velocity
    }

    #[must_use]
    pub fn has_panned(&self) -> bool {
        !self.accumulated.is_zero()
    }
}

/// A periodic task that is paused and resumed, never torn down, within a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanSchedule {
    interval: Duration,
    armed: bool,
    running: bool,
}

impl PanSchedule {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval, armed: false, running: false }
    }

    /// Arm in the paused state.
    pub fn arm(&mut self, canvas: &mut dyn Canvas) {
        self.armed = true;
        self.running = false;
        canvas.set_pan_schedule(self.interval, false);
    }

    pub fn resume(&mut self, canvas: &mut dyn Canvas) {
        if self.armed && !self.running {
            self.running = true;
            canvas.set_pan_schedule(self.interval, true);
        }
    }

    pub fn pause(&mut self, canvas: &mut dyn Canvas) {
        if self.running {
            self.running = false;
            canvas.set_pan_schedule(self.interval, false);
        }
    }

    /// Resume for a non-zero vector, pause otherwise.
    pub fn follow(&mut self, canvas: &mut dyn Canvas, velocity: Point) {
        if velocity.is_zero() {
            self.pause(canvas);
        } else {
            self.resume(canvas);
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
