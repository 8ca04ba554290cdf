//! Shared numeric defaults for the interaction controllers.
//!
//! Most of these seed [`crate::config::InteractConfig::default`], and the
//! controllers read the config rather than the constants. The curve tangent
//! bounds are fixed geometry and are read by [`crate::curve`] directly.

// ── Auto-pan ────────────────────────────────────────────────────

/// Width of the margin band along each viewport edge where auto-pan kicks in.
pub const PAN_AREA_WIDTH: f64 = 100.0;

/// Base pan speed multiplier, in screen units per tick.
pub const PAN_SPEED: f64 = 4.0;

/// Speed factor applied right at the inner edge of the margin band.
pub const MIN_PAN_SPEED_FACTOR: f64 = 0.5;

/// Upper bound on the magnitude of the pan vector.
pub const MAX_PAN_SPEED: f64 = 10.0;

/// Interval between auto-pan ticks, in milliseconds.
pub const PAN_INTERVAL_MS: u64 = 10;

// ── Edge connection ─────────────────────────────────────────────

/// Minimum pointer travel before a pointer-up completes a connection.
pub const CONNECTION_DISTANCE_THRESHOLD: f64 = 10.0;

// ── Magnetic attraction ─────────────────────────────────────────

/// Ports farther than this (zoom-corrected) never show a hand.
pub const RESPONSE_DISTANCE: f64 = 200.0;

/// Hand reach when the pointer sits at the response distance.
pub const CLOSE_DISTANCE: f64 = 40.0;

/// Together threshold used to derive the reach growth rate.
pub const TOGETHER_DISTANCE: f64 = 160.0;

/// Fraction of the remaining tip-to-rest distance a withdrawing hand closes each frame.
pub const WITHDRAW_RATE: f64 = 0.6;

/// How far the primary hold may drift from its closest approach before
/// primacy passes to the next held port.
pub const HOLD_HYSTERESIS: f64 = 10.0;

/// Render width of an open or withdrawn hand.
pub const THIN_EDGE_WIDTH: f64 = 2.0;

/// Render width of the primary hold.
pub const THICK_EDGE_WIDTH: f64 = 4.0;

// ── Curves ──────────────────────────────────────────────────────

/// Lower bound on the horizontal tangent length of an edge curve, in screen units at zoom 1.
pub const MIN_TANGENT: f64 = 30.0;

/// Upper bound on the horizontal tangent length of an edge curve, in screen units at zoom 1.
pub const MAX_TANGENT: f64 = 100.0;
