//! Physics preview: stands up a transient simulation from the scene, steps
//! it, and writes body poses back until the preview is exited.
//!
//! ## Lifecycle
//!
//! ```text
//!   Idle ──enter──▶ Running ◀──pause/resume──▶ Paused
//!    ▲                 │                          │
//!    └─────────────exit┴──────────────────────────┘
//! ```
//!
//! On enter the bridge snapshots every body's pose and the current view (the
//! *preview frame*). All conversions between world meters and simulation
//! units go through that frame until the view changes, which triggers a
//! [`PreviewBridge::rescale`]. Exit and reset restore the snapshot, so the
//! authored scene is never left in a simulated state.
//!
//! Objects the engine cannot take (bad shapes, refused bodies, joints whose
//! bodies were not built, inactive joint kinds) are logged and skipped; the
//! counts come back in a [`BuildReport`].

#[cfg(test)]
#[path = "preview_test.rs"]
mod preview_test;

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::PreviewSettings;
use crate::doc::{Body, BodyKind, Joint, ObjectId, Scene, Shape};
use crate::sim::*;
use crate::transform::{Vec2, ViewState, Viewport};

/// Where the bridge is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Idle,
    Running,
    Paused,
}

/// Errors that refuse a preview transition.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("physics engine is not available")]
    EngineUnavailable,
    #[error("scene has no bodies to simulate")]
    NoBodies,
    #[error("preview is already running")]
    AlreadyActive,
    #[error("preview is not running")]
    NotActive,
    #[error("object {0} is not part of the simulation")]
    NotSimulated(ObjectId),
    #[error("physics engine error: {0}")]
    Engine(#[from] EngineError),
}

/// What a (re)build handed to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub bodies_built: usize,
    pub bodies_skipped: usize,
    pub joints_built: usize,
    pub joints_skipped: usize,
}

/// View parameters captured for one preview session, and the conversions
/// between world space (meters, Y up) and simulation space (frame pixels,
/// Y down, origin at the viewport's top-left corner).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimFrame {
    pub pixels_per_meter: f64,
    pub origin: Vec2,
    pub viewport: Viewport,
}

impl SimFrame {
    #[must_use]
    pub fn new(view: &ViewState, viewport: Viewport) -> Self {
        Self { pixels_per_meter: view.pixels_per_meter, origin: view.origin, viewport }
    }

    #[must_use]
    pub fn to_sim_point(&self, world: Vec2) -> Vec2 {
        Vec2 {
            x: (world.x - self.origin.x) * self.pixels_per_meter + self.viewport.width / 2.0,
            y: -(world.y - self.origin.y) * self.pixels_per_meter + self.viewport.height / 2.0,
        }
    }

    #[must_use]
    pub fn from_sim_point(&self, sim: Vec2) -> Vec2 {
        Vec2 {
            x: (sim.x - self.viewport.width / 2.0) / self.pixels_per_meter + self.origin.x,
            y: -(sim.y - self.viewport.height / 2.0) / self.pixels_per_meter + self.origin.y,
        }
    }

    /// Angles flip sign with the Y axis. The mapping is its own inverse.
    #[must_use]
    pub fn flip_angle(angle: f64) -> f64 {
        -angle
    }

    #[must_use]
    pub fn to_sim_length(&self, meters: f64) -> f64 {
        meters * self.pixels_per_meter
    }

    /// A body-local offset, scaled and Y-flipped.
    #[must_use]
    pub fn to_sim_offset(&self, local: Vec2) -> Vec2 {
        Vec2::new(local.x * self.pixels_per_meter, -local.y * self.pixels_per_meter)
    }

    #[must_use]
    pub fn to_sim_shape(&self, shape: &Shape) -> SimShape {
        match shape {
            Shape::Box { width, height } => SimShape::Box {
                half_width: self.to_sim_length(*width) / 2.0,
                half_height: self.to_sim_length(*height) / 2.0,
            },
            Shape::Circle { radius } => SimShape::Circle { radius: self.to_sim_length(*radius) },
            Shape::Polygon { vertices } => {
                SimShape::Polygon { vertices: vertices.iter().map(|v| self.to_sim_offset(*v)).collect() }
            }
        }
    }

    /// Full engine definition for a scene body.
    #[must_use]
    pub fn body_def(&self, body: &Body, allow_sleep: bool) -> SimBodyDef {
        SimBodyDef {
            kind: body.body_type,
            position: self.to_sim_point(body.position),
            angle: Self::flip_angle(body.angle),
            shape: self.to_sim_shape(&body.shape),
            // Static colliders carry no mass.
            density: if body.body_type == BodyKind::Static { 0.0 } else { body.density },
            friction: body.friction,
            restitution: body.restitution,
            linear_damping: body.linear_damping,
            angular_damping: body.angular_damping,
            gravity_scale: body.gravity_scale,
            fixed_rotation: body.fixed_rotation,
            allow_sleep,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PoseSnapshot {
    id: ObjectId,
    position: Vec2,
    angle: f64,
}

#[derive(Debug, Clone, Copy)]
struct BuiltBody {
    handle: SimBodyHandle,
    kind: BodyKind,
}

/// Everything that exists only while a preview is active.
struct Session {
    world: Box<dyn SimWorld>,
    frame: SimFrame,
    bodies: HashMap<ObjectId, BuiltBody>,
    joints: HashMap<ObjectId, SimJointHandle>,
    snapshot: Vec<PoseSnapshot>,
    paused: bool,
}

/// Owns the simulation for the duration of a preview.
pub struct PreviewBridge {
    engine: Option<Box<dyn PhysicsEngine>>,
    settings: PreviewSettings,
    session: Option<Session>,
}

impl Default for PreviewBridge {
    fn default() -> Self {
        Self::new(PreviewSettings::default())
    }
}

impl PreviewBridge {
    /// A bridge with no engine installed. [`PreviewBridge::enter`] will be
    /// refused until one is set.
    #[must_use]
    pub fn new(settings: PreviewSettings) -> Self {
        Self { engine: None, settings, session: None }
    }

    #[must_use]
    pub fn with_engine(engine: Box<dyn PhysicsEngine>, settings: PreviewSettings) -> Self {
        Self { engine: Some(engine), settings, session: None }
    }

    pub fn set_engine(&mut self, engine: Box<dyn PhysicsEngine>) {
        self.engine = Some(engine);
    }

    #[must_use]
    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    #[must_use]
    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    #[must_use]
    pub fn state(&self) -> PreviewState {
        match &self.session {
            None => PreviewState::Idle,
            Some(s) if s.paused => PreviewState::Paused,
            Some(_) => PreviewState::Running,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The frame used for conversions in the active session.
    #[must_use]
    pub fn frame(&self) -> Option<SimFrame> {
        self.session.as_ref().map(|s| s.frame)
    }

    /// Whether a scene body currently has a simulation counterpart.
    #[must_use]
    pub fn is_simulated(&self, id: ObjectId) -> bool {
        self.session.as_ref().is_some_and(|s| s.bodies.contains_key(&id))
    }

    /// Whether a scene joint currently has a simulation counterpart.
    #[must_use]
    pub fn is_joint_simulated(&self, id: ObjectId) -> bool {
        self.session.as_ref().is_some_and(|s| s.joints.contains_key(&id))
    }

    /// Latest simulation velocity of a body, in simulation units.
    #[must_use]
    pub fn body_velocity(&self, id: ObjectId) -> Option<SimVelocity> {
        let session = self.session.as_ref()?;
        session.world.body_velocity(session.bodies.get(&id)?.handle)
    }

    /// Override a body's simulation velocity.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::NotActive`] outside a preview and
    /// [`PreviewError::NotSimulated`] for a body that was not built.
    pub fn set_body_velocity(&mut self, id: ObjectId, velocity: SimVelocity) -> Result<(), PreviewError> {
        let session = self.session.as_mut().ok_or(PreviewError::NotActive)?;
        let built = session.bodies.get(&id).ok_or(PreviewError::NotSimulated(id))?;
        session.world.set_body_velocity(built.handle, velocity)?;
        Ok(())
    }

    /// Start a preview of `scene` as seen through `view`.
    ///
    /// # Errors
    ///
    /// Refused without any state change when a preview is already active, no
    /// engine is installed, the scene has no bodies, or the engine cannot
    /// construct a world.
    pub fn enter(&mut self, scene: &mut Scene, view: &ViewState, viewport: Viewport) -> Result<BuildReport, PreviewError> {
        if self.session.is_some() {
            return Err(PreviewError::AlreadyActive);
        }
        let Some(engine) = self.engine.as_ref() else {
            warn!("preview refused: no physics engine installed");
            return Err(PreviewError::EngineUnavailable);
        };
        if scene.body_count() == 0 {
            return Err(PreviewError::NoBodies);
        }

        let frame = SimFrame::new(view, viewport);
        let mut world = engine.create_world(&self.world_def())?;

        let snapshot = scene
            .bodies()
            .map(|b| PoseSnapshot { id: b.id, position: b.position, angle: b.angle })
            .collect();
        let (bodies, joints, report) = build(world.as_mut(), scene, &frame, self.settings.allow_sleep);

        info!(
            engine = engine.name(),
            bodies = report.bodies_built,
            bodies_skipped = report.bodies_skipped,
            joints = report.joints_built,
            joints_skipped = report.joints_skipped,
            ppm = frame.pixels_per_meter,
            "preview started"
        );

        self.session = Some(Session { world, frame, bodies, joints, snapshot, paused: false });
        Ok(report)
    }

    /// Advance one fixed step and copy poses back into the scene. Does
    /// nothing unless running.
    pub fn step(&mut self, scene: &mut Scene) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.paused {
            return false;
        }
        session.world.step(self.settings.timestep, self.settings.iterations);
        sync_poses(session, scene);
        scene.notify();
        true
    }

    pub fn pause(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.paused = false;
        }
    }

    /// Flip between running and paused. Returns the new state.
    pub fn toggle_pause(&mut self) -> PreviewState {
        if let Some(session) = self.session.as_mut() {
            session.paused = !session.paused;
        }
        self.state()
    }

    /// Rebuild the simulation for a new view without losing motion.
    ///
    /// Current poses are copied into the scene, per-body velocities are
    /// captured, and the world is rebuilt from the live scene under the new
    /// frame. Velocities are in simulation units and are re-applied as-is to
    /// every non-static body. Paused/running is preserved. If the engine cannot
    /// build a new world, the preview exits and the error is returned.
    ///
    /// # Errors
    ///
    /// [`PreviewError::NotActive`] outside a preview, or the engine error
    /// that forced an exit.
    pub fn rescale(&mut self, scene: &mut Scene, view: &ViewState, viewport: Viewport) -> Result<BuildReport, PreviewError> {
        let Some(session) = self.session.take() else {
            return Err(PreviewError::NotActive);
        };

        sync_poses(&session, scene);
        let velocities: HashMap<ObjectId, SimVelocity> = session
            .bodies
            .iter()
            .filter(|(_, built)| built.kind != BodyKind::Static)
            .filter_map(|(id, built)| Some((*id, session.world.body_velocity(built.handle)?)))
            .collect();

        let frame = SimFrame::new(view, viewport);
        let report = self.rebuild(session, scene, frame)?;

        if let Some(session) = self.session.as_mut() {
            for (id, velocity) in &velocities {
                let Some(built) = session.bodies.get(id) else {
                    continue;
                };
                if let Err(e) = session.world.set_body_velocity(built.handle, *velocity) {
                    warn!(%id, error = %e, "rescale: velocity not restored");
                }
            }
        }

        debug!(ppm = frame.pixels_per_meter, restored = velocities.len(), "preview rescaled");
        Ok(report)
    }

    /// Put every body back where it was on enter and restart the simulation
    /// from there, running.
    ///
    /// # Errors
    ///
    /// [`PreviewError::NotActive`] outside a preview, or the engine error
    /// that forced an exit.
    pub fn reset(&mut self, scene: &mut Scene) -> Result<BuildReport, PreviewError> {
        let Some(mut session) = self.session.take() else {
            return Err(PreviewError::NotActive);
        };
        restore_snapshot(&session.snapshot, scene);
        session.paused = false;
        let frame = session.frame;
        let report = self.rebuild(session, scene, frame)?;
        info!("preview reset");
        Ok(report)
    }

    /// Tear down the simulation and restore the enter-time poses. Returns
    /// `false` if no preview was active.
    pub fn exit(&mut self, scene: &mut Scene) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        restore_snapshot(&session.snapshot, scene);
        scene.notify();
        info!("preview exited");
        true
    }

    fn world_def(&self) -> WorldDef {
        WorldDef {
            gravity: self.settings.gravity,
            bound: self.settings.world_bound,
            allow_sleep: self.settings.allow_sleep,
        }
    }

    /// Replace the session's world with a fresh one built from `scene`.
    /// On engine failure the snapshot is restored and the bridge is left idle.
    fn rebuild(&mut self, session: Session, scene: &mut Scene, frame: SimFrame) -> Result<BuildReport, PreviewError> {
        let world = match self.engine.as_ref() {
            Some(engine) => engine.create_world(&self.world_def()).map_err(PreviewError::from),
            None => Err(PreviewError::EngineUnavailable),
        };
        let mut world = match world {
            Ok(world) => world,
            Err(e) => {
                warn!(error = %e, "preview rebuild failed, exiting");
                restore_snapshot(&session.snapshot, scene);
                scene.notify();
                return Err(e);
            }
        };

        let (bodies, joints, report) = build(world.as_mut(), scene, &frame, self.settings.allow_sleep);
        self.session = Some(Session { world, frame, bodies, joints, snapshot: session.snapshot, paused: session.paused });
        scene.notify();
        Ok(report)
    }
}

type BuiltBodies = HashMap<ObjectId, BuiltBody>;
type BuiltJoints = HashMap<ObjectId, SimJointHandle>;

/// Hand every body, then every joint, to the engine.
fn build(world: &mut dyn SimWorld, scene: &Scene, frame: &SimFrame, allow_sleep: bool) -> (BuiltBodies, BuiltJoints, BuildReport) {
    let mut report = BuildReport::default();
    let mut bodies = HashMap::new();

    for body in scene.bodies() {
        if let Err(e) = body.shape.validate() {
            warn!(id = %body.id, error = %e, "preview: skipping body with invalid shape");
            report.bodies_skipped += 1;
            continue;
        }
        match world.create_body(&frame.body_def(body, allow_sleep)) {
            Ok(handle) => {
                bodies.insert(body.id, BuiltBody { handle, kind: body.body_type });
                report.bodies_built += 1;
            }
            Err(e) => {
                warn!(id = %body.id, error = %e, "preview: engine refused body");
                report.bodies_skipped += 1;
            }
        }
    }

    let mut joints = HashMap::new();
    for joint in scene.joints() {
        match joint_def(joint, scene, &bodies, frame) {
            Ok(def) => match world.create_joint(&def) {
                Ok(handle) => {
                    joints.insert(joint.id, handle);
                    report.joints_built += 1;
                }
                Err(e) => {
                    warn!(id = %joint.id, error = %e, "preview: engine refused joint");
                    report.joints_skipped += 1;
                }
            },
            Err(reason) => {
                warn!(id = %joint.id, reason, "preview: skipping joint");
                report.joints_skipped += 1;
            }
        }
    }

    (bodies, joints, report)
}

/// Translate a scene joint, or explain why it cannot be simulated.
///
/// The hinge point is anchor A in world space. Angle limits and motor speed
/// are mirrored because the simulation's Y axis points down.
fn joint_def(joint: &Joint, scene: &Scene, built: &BuiltBodies, frame: &SimFrame) -> Result<SimRevoluteDef, &'static str> {
    if !joint.joint_type.is_active() {
        return Err("inactive joint kind");
    }
    let Some(body_a) = scene.body(joint.body_a_id) else {
        return Err("body A missing from scene");
    };
    if scene.body(joint.body_b_id).is_none() {
        return Err("body B missing from scene");
    }
    let (Some(a), Some(b)) = (built.get(&joint.body_a_id), built.get(&joint.body_b_id)) else {
        return Err("endpoint body was not simulated");
    };

    let anchor = frame.to_sim_point(body_a.local_to_world(joint.anchor_a_local));
    Ok(SimRevoluteDef {
        body_a: a.handle,
        body_b: b.handle,
        anchor,
        limit: joint.enable_limit.then_some((-joint.upper_angle, -joint.lower_angle)),
        motor: joint.enable_motor.then_some(SimMotor { speed: -joint.motor_speed, max_torque: joint.max_motor_torque }),
        collide_connected: joint.collide_connected,
    })
}

/// Copy every simulated body's pose into the scene through the frame.
fn sync_poses(session: &Session, scene: &mut Scene) {
    for (id, built) in &session.bodies {
        let Some(pose) = session.world.body_pose(built.handle) else {
            continue;
        };
        if let Some(body) = scene.body_mut(*id) {
            body.position = session.frame.from_sim_point(pose.position);
            body.angle = SimFrame::flip_angle(pose.angle);
        }
    }
}

fn restore_snapshot(snapshot: &[PoseSnapshot], scene: &mut Scene) {
    for pose in snapshot {
        if let Some(body) = scene.body_mut(pose.id) {
            body.position = pose.position;
            body.angle = pose.angle;
        }
    }
}
