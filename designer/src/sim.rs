//! Boundary between the editor and an external rigid-body engine.
//!
//! The preview bridge never touches engine internals. It describes bodies
//! and joints in simulation units with the plain definitions below, hands
//! them to a [`SimWorld`] and gets opaque handles back. An engine adapter
//! (the CLI ships one for `rapier2d`) implements the two traits.
//!
//! Simulation units are the pixel space of the preview frame: Y points down
//! and angles turn clockwise, mirroring the editor's world space.

#[cfg(test)]
#[path = "sim_fake.rs"]
pub(crate) mod fake;

use crate::doc::BodyKind;
use crate::transform::Vec2;

/// Opaque handle to a body inside a [`SimWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimBodyHandle(pub u64);

/// Opaque handle to a joint inside a [`SimWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimJointHandle(pub u64);

/// Parameters for constructing a world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldDef {
    pub gravity: Vec2,
    /// Half-extent of the square region centered on the simulation origin.
    pub bound: f64,
    pub allow_sleep: bool,
}

/// Collider shape in simulation units, relative to the body origin.
#[derive(Debug, Clone, PartialEq)]
pub enum SimShape {
    Box { half_width: f64, half_height: f64 },
    Circle { radius: f64 },
    Polygon { vertices: Vec<Vec2> },
}

/// Everything needed to create one body.
#[derive(Debug, Clone, PartialEq)]
pub struct SimBodyDef {
    pub kind: BodyKind,
    pub position: Vec2,
    pub angle: f64,
    pub shape: SimShape,
    pub density: f64,
    pub friction: f64,
    pub restitution: f64,
    pub linear_damping: f64,
    pub angular_damping: f64,
    pub gravity_scale: f64,
    pub fixed_rotation: bool,
    pub allow_sleep: bool,
}

/// Motor settings of a revolute joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimMotor {
    pub speed: f64,
    pub max_torque: f64,
}

/// A hinge between two bodies about one shared world-space point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimRevoluteDef {
    pub body_a: SimBodyHandle,
    pub body_b: SimBodyHandle,
    /// Hinge point in simulation space at creation time.
    pub anchor: Vec2,
    /// `(lower, upper)` relative angle limits, if enabled.
    pub limit: Option<(f64, f64)>,
    pub motor: Option<SimMotor>,
    pub collide_connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimPose {
    pub position: Vec2,
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimVelocity {
    pub linear: Vec2,
    pub angular: f64,
}

/// Errors reported by an engine adapter.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("world construction failed: {0}")]
    World(String),
    #[error("body rejected: {0}")]
    BodyRejected(String),
    #[error("joint rejected: {0}")]
    JointRejected(String),
    #[error("unknown body handle {0:?}")]
    UnknownBody(SimBodyHandle),
}

/// Factory for simulation worlds.
pub trait PhysicsEngine {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Stand up an empty world.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::World`] if the engine cannot build a world
    /// with these parameters.
    fn create_world(&self, def: &WorldDef) -> Result<Box<dyn SimWorld>, EngineError>;
}

/// One live simulation.
pub trait SimWorld {
    /// # Errors
    ///
    /// Returns [`EngineError::BodyRejected`] if the engine refuses the body.
    fn create_body(&mut self, def: &SimBodyDef) -> Result<SimBodyHandle, EngineError>;

    /// # Errors
    ///
    /// Returns [`EngineError::UnknownBody`] for a stale handle or
    /// [`EngineError::JointRejected`] if the engine refuses the joint.
    fn create_joint(&mut self, def: &SimRevoluteDef) -> Result<SimJointHandle, EngineError>;

    /// Advance by `dt` seconds with the given solver iteration count.
    fn step(&mut self, dt: f64, iterations: u32);

    fn body_pose(&self, handle: SimBodyHandle) -> Option<SimPose>;

    fn body_velocity(&self, handle: SimBodyHandle) -> Option<SimVelocity>;

    /// # Errors
    ///
    /// Returns [`EngineError::UnknownBody`] for a stale handle.
    fn set_body_velocity(&mut self, handle: SimBodyHandle, velocity: SimVelocity) -> Result<(), EngineError>;
}
