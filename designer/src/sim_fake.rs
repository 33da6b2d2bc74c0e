//! Deterministic in-memory engine for tests.
//!
//! Dynamic bodies fall under gravity with explicit Euler integration; static
//! and kinematic bodies only move by their own velocity. Every definition
//! handed to the engine is recorded in a shared [`FakeLog`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;

#[derive(Debug, Default)]
pub(crate) struct FakeLog {
    pub worlds: Vec<WorldDef>,
    pub bodies: Vec<SimBodyDef>,
    pub joints: Vec<SimRevoluteDef>,
    pub steps: usize,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct FakeEngine {
    pub log: Rc<RefCell<FakeLog>>,
    /// Refuse to build worlds while set.
    pub fail_world: Rc<Cell<bool>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PhysicsEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn create_world(&self, def: &WorldDef) -> Result<Box<dyn SimWorld>, EngineError> {
        if self.fail_world.get() {
            return Err(EngineError::World("fake engine told to fail".into()));
        }
        self.log.borrow_mut().worlds.push(*def);
        Ok(Box::new(FakeWorld { def: *def, bodies: Vec::new(), joints: 0, log: Rc::clone(&self.log) }))
    }
}

struct FakeBody {
    kind: BodyKind,
    gravity_scale: f64,
    pose: SimPose,
    velocity: SimVelocity,
}

pub(crate) struct FakeWorld {
    def: WorldDef,
    bodies: Vec<FakeBody>,
    joints: u64,
    log: Rc<RefCell<FakeLog>>,
}

impl FakeWorld {
    #[allow(clippy::cast_possible_truncation)]
    fn index(handle: SimBodyHandle) -> usize {
        handle.0 as usize
    }
}

impl SimWorld for FakeWorld {
    fn create_body(&mut self, def: &SimBodyDef) -> Result<SimBodyHandle, EngineError> {
        if def.position.x.abs() > self.def.bound || def.position.y.abs() > self.def.bound {
            return Err(EngineError::BodyRejected("outside world bounds".into()));
        }
        self.log.borrow_mut().bodies.push(def.clone());
        self.bodies.push(FakeBody {
            kind: def.kind,
            gravity_scale: def.gravity_scale,
            pose: SimPose { position: def.position, angle: def.angle },
            velocity: SimVelocity::default(),
        });
        Ok(SimBodyHandle(self.bodies.len() as u64 - 1))
    }

    fn create_joint(&mut self, def: &SimRevoluteDef) -> Result<SimJointHandle, EngineError> {
        for handle in [def.body_a, def.body_b] {
            if self.bodies.get(Self::index(handle)).is_none() {
                return Err(EngineError::UnknownBody(handle));
            }
        }
        self.log.borrow_mut().joints.push(*def);
        self.joints += 1;
        Ok(SimJointHandle(self.joints - 1))
    }

    fn step(&mut self, dt: f64, _iterations: u32) {
        for body in &mut self.bodies {
            if body.kind == BodyKind::Dynamic {
                body.velocity.linear = body.velocity.linear + self.def.gravity * (dt * body.gravity_scale);
            }
            if body.kind != BodyKind::Static {
                body.pose.position = body.pose.position + body.velocity.linear * dt;
                body.pose.angle += body.velocity.angular * dt;
            }
        }
        self.log.borrow_mut().steps += 1;
    }

    fn body_pose(&self, handle: SimBodyHandle) -> Option<SimPose> {
        self.bodies.get(Self::index(handle)).map(|b| b.pose)
    }

    fn body_velocity(&self, handle: SimBodyHandle) -> Option<SimVelocity> {
        self.bodies.get(Self::index(handle)).map(|b| b.velocity)
    }

    fn set_body_velocity(&mut self, handle: SimBodyHandle, velocity: SimVelocity) -> Result<(), EngineError> {
        let body = self.bodies.get_mut(Self::index(handle)).ok_or(EngineError::UnknownBody(handle))?;
        body.velocity = velocity;
        Ok(())
    }
}
