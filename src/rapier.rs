//! `rapier2d` adapter for the designer's simulation traits.
//!
//! All rapier boilerplate (pipeline, island manager, phases, joint sets) sits
//! behind one [`RapierWorld`]. Designer handles are indices into the world's
//! own handle tables, so they stay valid for the world's lifetime.

#[cfg(test)]
#[path = "rapier_test.rs"]
mod tests;

use std::num::NonZeroUsize;

use designer::doc::BodyKind;
use designer::sim::{
    EngineError, PhysicsEngine, SimBodyDef, SimBodyHandle, SimJointHandle, SimPose, SimRevoluteDef, SimShape,
    SimVelocity, SimWorld, WorldDef,
};
use designer::transform::Vec2;
use rapier2d::prelude::*;
use tracing::{debug, trace};

/// Velocity-motor damping factor handed to rapier.
const MOTOR_FACTOR: Real = 1.0;

/// Builds [`RapierWorld`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct RapierEngine;

impl PhysicsEngine for RapierEngine {
    fn name(&self) -> &str {
        "rapier2d"
    }

    fn create_world(&self, def: &WorldDef) -> Result<Box<dyn SimWorld>, EngineError> {
        if !def.gravity.x.is_finite() || !def.gravity.y.is_finite() {
            return Err(EngineError::World(format!("gravity must be finite, got {:?}", def.gravity)));
        }
        if !(def.bound.is_finite() && def.bound > 0.0) {
            return Err(EngineError::World(format!("world bound must be positive, got {}", def.bound)));
        }
        debug!(gravity_y = def.gravity.y, bound = def.bound, "rapier world created");
        Ok(Box::new(RapierWorld::new(def)))
    }
}

/// One rapier simulation.
pub struct RapierWorld {
    gravity: Vector<Real>,
    bound: f64,
    allow_sleep: bool,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    body_handles: Vec<RigidBodyHandle>,
    joint_handles: Vec<ImpulseJointHandle>,
}

#[allow(clippy::cast_possible_truncation)]
fn real(v: f64) -> Real {
    v as Real
}

fn to_vector(v: Vec2) -> Vector<Real> {
    vector![real(v.x), real(v.y)]
}

fn to_point(v: Vec2) -> Point<Real> {
    point![real(v.x), real(v.y)]
}

fn from_vector(v: &Vector<Real>) -> Vec2 {
    Vec2::new(f64::from(v.x), f64::from(v.y))
}

impl RapierWorld {
    fn new(def: &WorldDef) -> Self {
        Self {
            gravity: to_vector(def.gravity),
            bound: def.bound,
            allow_sleep: def.allow_sleep,
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            body_handles: Vec::new(),
            joint_handles: Vec::new(),
        }
    }

    fn rigid_body(&self, handle: SimBodyHandle) -> Option<&RigidBody> {
        let index = usize::try_from(handle.0).ok()?;
        self.bodies.get(*self.body_handles.get(index)?)
    }

    fn rapier_handle(&self, handle: SimBodyHandle) -> Result<RigidBodyHandle, EngineError> {
        usize::try_from(handle.0)
            .map_err(|_| EngineError::UnknownBody(handle))
            .and_then(|index| self.body_handles.get(index).copied().ok_or(EngineError::UnknownBody(handle)))
    }

    fn collider(def: &SimBodyDef) -> Result<ColliderBuilder, EngineError> {
        let builder = match &def.shape {
            SimShape::Box { half_width, half_height } => ColliderBuilder::cuboid(real(*half_width), real(*half_height)),
            SimShape::Circle { radius } => ColliderBuilder::ball(real(*radius)),
            SimShape::Polygon { vertices } => {
                let points: Vec<Point<Real>> = vertices.iter().copied().map(to_point).collect();
                ColliderBuilder::convex_hull(&points)
                    .ok_or_else(|| EngineError::BodyRejected("polygon has no convex hull".into()))?
            }
        };
        Ok(builder.density(real(def.density)).friction(real(def.friction)).restitution(real(def.restitution)))
    }
}

impl SimWorld for RapierWorld {
    fn create_body(&mut self, def: &SimBodyDef) -> Result<SimBodyHandle, EngineError> {
        if def.position.x.abs() > self.bound || def.position.y.abs() > self.bound {
            return Err(EngineError::BodyRejected(format!(
                "position ({}, {}) is outside the world bound {}",
                def.position.x, def.position.y, self.bound
            )));
        }
        let collider = Self::collider(def)?;

        let body_type = match def.kind {
            BodyKind::Static => RigidBodyType::Fixed,
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Kinematic => RigidBodyType::KinematicVelocityBased,
        };
        let locked = if def.fixed_rotation { LockedAxes::ROTATION_LOCKED } else { LockedAxes::empty() };
        let body = RigidBodyBuilder::new(body_type)
            .translation(to_vector(def.position))
            .rotation(real(def.angle))
            .gravity_scale(real(def.gravity_scale))
            .linear_damping(real(def.linear_damping))
            .angular_damping(real(def.angular_damping))
            .locked_axes(locked)
            .can_sleep(self.allow_sleep && def.allow_sleep)
            .build();

        let body_handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(collider.build(), body_handle, &mut self.bodies);

        let handle = SimBodyHandle(self.body_handles.len() as u64);
        self.body_handles.push(body_handle);
        trace!(handle = handle.0, kind = def.kind.as_str(), "rapier body created");
        Ok(handle)
    }

    fn create_joint(&mut self, def: &SimRevoluteDef) -> Result<SimJointHandle, EngineError> {
        let a = self.rapier_handle(def.body_a)?;
        let b = self.rapier_handle(def.body_b)?;
        let (Some(body_a), Some(body_b)) = (self.bodies.get(a), self.bodies.get(b)) else {
            return Err(EngineError::JointRejected("endpoint body is gone".into()));
        };

        let anchor = to_point(def.anchor);
        let local_a = body_a.position().inverse_transform_point(&anchor);
        let local_b = body_b.position().inverse_transform_point(&anchor);
        // Limits are relative to the pose at creation, so shift them by the
        // current relative angle.
        let reference = body_b.rotation().angle() - body_a.rotation().angle();

        let mut builder = RevoluteJointBuilder::new()
            .local_anchor1(local_a)
            .local_anchor2(local_b)
            .contacts_enabled(def.collide_connected);
        if let Some((lower, upper)) = def.limit {
            builder = builder.limits([real(lower) + reference, real(upper) + reference]);
        }
        if let Some(motor) = def.motor {
            builder = builder.motor_velocity(real(motor.speed), MOTOR_FACTOR).motor_max_force(real(motor.max_torque));
        }

        let joint = self.impulse_joints.insert(a, b, builder.build(), true);
        let handle = SimJointHandle(self.joint_handles.len() as u64);
        self.joint_handles.push(joint);
        Ok(handle)
    }

    fn step(&mut self, dt: f64, iterations: u32) {
        self.integration_parameters.dt = real(dt);
        self.integration_parameters.num_solver_iterations =
            NonZeroUsize::new(iterations as usize).unwrap_or(NonZeroUsize::MIN);
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    fn body_pose(&self, handle: SimBodyHandle) -> Option<SimPose> {
        let body = self.rigid_body(handle)?;
        Some(SimPose { position: from_vector(body.translation()), angle: f64::from(body.rotation().angle()) })
    }

    fn body_velocity(&self, handle: SimBodyHandle) -> Option<SimVelocity> {
        let body = self.rigid_body(handle)?;
        Some(SimVelocity { linear: from_vector(body.linvel()), angular: f64::from(body.angvel()) })
    }

    fn set_body_velocity(&mut self, handle: SimBodyHandle, velocity: SimVelocity) -> Result<(), EngineError> {
        let rapier = self.rapier_handle(handle)?;
        let body = self.bodies.get_mut(rapier).ok_or(EngineError::UnknownBody(handle))?;
        body.set_linvel(to_vector(velocity.linear), true);
        body.set_angvel(real(velocity.angular), true);
        Ok(())
    }
}
