//! Shared numeric constants for the designer crate.

// ── View ────────────────────────────────────────────────────────

/// Initial zoom factor, in screen pixels per world meter.
pub const DEFAULT_PIXELS_PER_METER: f64 = 20.0;

/// Lower zoom clamp.
pub const MIN_PIXELS_PER_METER: f64 = 5.0;

/// Upper zoom clamp.
pub const MAX_PIXELS_PER_METER: f64 = 50.0;

/// Zoom change per wheel notch, in pixels per meter.
pub const ZOOM_STEP: f64 = 1.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space pick radius for joint anchors, in pixels.
pub const ANCHOR_HIT_RADIUS_PX: f64 = 10.0;

/// World-space pick radius for polygon vertices, in meters.
pub const VERTEX_HIT_RADIUS_M: f64 = 0.3;

// ── Drawing ─────────────────────────────────────────────────────

/// Side length of a freshly placed box before it is sized by dragging.
pub const DEFAULT_BOX_SIDE_M: f64 = 1.0;

/// Radius of a freshly placed circle before it is sized by dragging.
pub const DEFAULT_CIRCLE_RADIUS_M: f64 = 0.5;

/// Smallest box side produced by the rectangle tool.
pub const MIN_BOX_SIDE_M: f64 = 0.5;

/// Smallest radius produced by the circle tool.
pub const MIN_CIRCLE_RADIUS_M: f64 = 0.25;

/// Fewest points that close a polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Most vertices a convex polygon collider accepts.
pub const MAX_POLYGON_VERTICES: usize = 8;

/// A vertex drag shorter than this is not recorded.
pub const VERTEX_MOVE_EPSILON_M: f64 = 0.01;

// ── History ─────────────────────────────────────────────────────

/// Commands kept before the oldest is evicted.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

// ── Joints ──────────────────────────────────────────────────────

/// Default lower angle limit for new revolute joints (-90°).
pub const DEFAULT_LOWER_ANGLE: f64 = -std::f64::consts::FRAC_PI_2;

/// Default upper angle limit for new revolute joints (90°).
pub const DEFAULT_UPPER_ANGLE: f64 = std::f64::consts::FRAC_PI_2;

/// Default motor torque cap for new revolute joints.
pub const DEFAULT_MAX_MOTOR_TORQUE: f64 = 1000.0;

// ── Preview ─────────────────────────────────────────────────────

/// Fixed simulation step, in seconds.
pub const PREVIEW_TIMESTEP: f64 = 1.0 / 60.0;

/// Constraint solver iterations per step.
pub const PREVIEW_ITERATIONS: u32 = 10;

/// Downward gravity in simulation units (pixels, Y down) per second squared.
pub const PREVIEW_GRAVITY_Y: f64 = 300.0;

/// Half-extent of the square simulation region, in simulation units.
pub const PREVIEW_WORLD_BOUND: f64 = 10_000.0;
