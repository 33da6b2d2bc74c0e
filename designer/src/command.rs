//! Reversible edit commands.
//!
//! Every scene mutation that should be undoable is expressed as a
//! [`Command`]. Commands own whatever they need to reverse themselves: an
//! added or deleted object moves between the command and the scene, and
//! property edits carry owned old/new [`Property`] values, so later in-place
//! edits of the scene (a drag, another command) cannot reach into history.
//!
//! Each command notifies the scene listener after mutating it.

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;

use std::fmt;

use tracing::warn;

use crate::doc::{Body, BodyKind, Joint, ObjectId, Scene, SceneObject, Shape};
use crate::transform::Vec2;

/// One reversible mutation of the scene.
pub trait Command: fmt::Debug {
    fn execute(&mut self, scene: &mut Scene);

    fn undo(&mut self, scene: &mut Scene);

    /// Re-apply after an undo. Identical to [`Command::execute`] unless a
    /// command needs otherwise.
    fn redo(&mut self, scene: &mut Scene) {
        self.execute(scene);
    }

    /// Short human-readable description for history menus and logs.
    fn label(&self) -> &'static str;
}

// =============================================================
// Add / Delete
// =============================================================

/// Append an object on top of the scene.
#[derive(Debug)]
pub struct AddObject {
    id: ObjectId,
    /// Held here while the object is not in the scene.
    object: Option<SceneObject>,
}

impl AddObject {
    #[must_use]
    pub fn new(object: SceneObject) -> Self {
        Self { id: object.id(), object: Some(object) }
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl Command for AddObject {
    fn execute(&mut self, scene: &mut Scene) {
        if let Some(object) = self.object.take() {
            scene.push(object);
        }
        scene.notify();
    }

    fn undo(&mut self, scene: &mut Scene) {
        if let Some((_, object)) = scene.remove(self.id) {
            self.object = Some(object);
        } else {
            warn!(id = %self.id, "undo add: object already gone");
        }
        scene.notify();
    }

    fn label(&self) -> &'static str {
        "Add object"
    }
}

/// Remove an object, restoring it at its original z-position on undo.
///
/// The index is recorded at construction and refreshed on execute if the
/// object has moved since, so deletes batched together restore cleanly.
#[derive(Debug)]
pub struct DeleteObject {
    id: ObjectId,
    index: usize,
    object: Option<SceneObject>,
}

impl DeleteObject {
    /// Record the object's current index. `None` if it is not in the scene.
    #[must_use]
    pub fn new(scene: &Scene, id: ObjectId) -> Option<Self> {
        let index = scene.index_of(id)?;
        Some(Self { id, index, object: None })
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl Command for DeleteObject {
    fn execute(&mut self, scene: &mut Scene) {
        let removed = match scene.remove_at(self.index, self.id) {
            Some(object) => Some(object),
            None => scene.remove(self.id).map(|(index, object)| {
                self.index = index;
                object
            }),
        };
        match removed {
            Some(object) => self.object = Some(object),
            None => warn!(id = %self.id, "delete: object not in scene"),
        }
        scene.notify();
    }

    fn undo(&mut self, scene: &mut Scene) {
        if let Some(object) = self.object.take() {
            scene.insert(self.index, object);
        }
        scene.notify();
    }

    fn label(&self) -> &'static str {
        "Delete object"
    }
}

// =============================================================
// Move
// =============================================================

/// Reposition a body.
#[derive(Debug, Clone)]
pub struct MoveObject {
    id: ObjectId,
    from: Vec2,
    to: Vec2,
}

impl MoveObject {
    #[must_use]
    pub fn new(id: ObjectId, from: Vec2, to: Vec2) -> Self {
        Self { id, from, to }
    }

    /// A move that ends where it started.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    fn set(&self, scene: &mut Scene, position: Vec2) {
        match scene.body_mut(self.id) {
            Some(body) => body.position = position,
            None => warn!(id = %self.id, "move: body not in scene"),
        }
        scene.notify();
    }
}

impl Command for MoveObject {
    fn execute(&mut self, scene: &mut Scene) {
        self.set(scene, self.to);
    }

    fn undo(&mut self, scene: &mut Scene) {
        self.set(scene, self.from);
    }

    fn label(&self) -> &'static str {
        "Move object"
    }
}

// =============================================================
// Properties
// =============================================================

/// Identifies one editable field of a body or joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKey {
    Position,
    Angle,
    BodyKind,
    Density,
    Friction,
    Restitution,
    LinearDamping,
    AngularDamping,
    GravityScale,
    FixedRotation,
    Width,
    Height,
    Radius,
    Vertices,
    AnchorA,
    AnchorB,
    EnableLimit,
    LowerAngle,
    UpperAngle,
    EnableMotor,
    MotorSpeed,
    MaxMotorTorque,
    CollideConnected,
}

/// A typed value for one editable field.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Position(Vec2),
    Angle(f64),
    BodyKind(BodyKind),
    Density(f64),
    Friction(f64),
    Restitution(f64),
    LinearDamping(f64),
    AngularDamping(f64),
    GravityScale(f64),
    FixedRotation(bool),
    /// Box width, meters.
    Width(f64),
    /// Box height, meters.
    Height(f64),
    /// Circle radius, meters.
    Radius(f64),
    /// Polygon ring in the body's local frame.
    Vertices(Vec<Vec2>),
    /// Joint anchor on body A, body-local.
    AnchorA(Vec2),
    /// Joint anchor on body B, body-local.
    AnchorB(Vec2),
    EnableLimit(bool),
    LowerAngle(f64),
    UpperAngle(f64),
    EnableMotor(bool),
    MotorSpeed(f64),
    MaxMotorTorque(f64),
    CollideConnected(bool),
}

impl Property {
    #[must_use]
    pub fn key(&self) -> PropertyKey {
        match self {
            Self::Position(_) => PropertyKey::Position,
            Self::Angle(_) => PropertyKey::Angle,
            Self::BodyKind(_) => PropertyKey::BodyKind,
            Self::Density(_) => PropertyKey::Density,
            Self::Friction(_) => PropertyKey::Friction,
            Self::Restitution(_) => PropertyKey::Restitution,
            Self::LinearDamping(_) => PropertyKey::LinearDamping,
            Self::AngularDamping(_) => PropertyKey::AngularDamping,
            Self::GravityScale(_) => PropertyKey::GravityScale,
            Self::FixedRotation(_) => PropertyKey::FixedRotation,
            Self::Width(_) => PropertyKey::Width,
            Self::Height(_) => PropertyKey::Height,
            Self::Radius(_) => PropertyKey::Radius,
            Self::Vertices(_) => PropertyKey::Vertices,
            Self::AnchorA(_) => PropertyKey::AnchorA,
            Self::AnchorB(_) => PropertyKey::AnchorB,
            Self::EnableLimit(_) => PropertyKey::EnableLimit,
            Self::LowerAngle(_) => PropertyKey::LowerAngle,
            Self::UpperAngle(_) => PropertyKey::UpperAngle,
            Self::EnableMotor(_) => PropertyKey::EnableMotor,
            Self::MotorSpeed(_) => PropertyKey::MotorSpeed,
            Self::MaxMotorTorque(_) => PropertyKey::MaxMotorTorque,
            Self::CollideConnected(_) => PropertyKey::CollideConnected,
        }
    }
}

/// Errors from reading or writing a [`Property`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("object not found: {0}")]
    NotFound(ObjectId),
    #[error("{key:?} does not apply to a {target}")]
    NotApplicable { key: PropertyKey, target: &'static str },
}

/// Field-level read/write access used by [`ModifyProperty`].
pub trait Mutable {
    /// Current value of `key`, or `None` if the field does not exist here.
    fn capture(&self, key: PropertyKey) -> Option<Property>;

    /// Assign a value.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::NotApplicable`] if the field does not exist
    /// on this object (e.g. a radius on a box).
    fn apply(&mut self, value: &Property) -> Result<(), PropertyError>;
}

impl Mutable for Body {
    fn capture(&self, key: PropertyKey) -> Option<Property> {
        let value = match (key, &self.shape) {
            (PropertyKey::Position, _) => Property::Position(self.position),
            (PropertyKey::Angle, _) => Property::Angle(self.angle),
            (PropertyKey::BodyKind, _) => Property::BodyKind(self.body_type),
            (PropertyKey::Density, _) => Property::Density(self.density),
            (PropertyKey::Friction, _) => Property::Friction(self.friction),
            (PropertyKey::Restitution, _) => Property::Restitution(self.restitution),
            (PropertyKey::LinearDamping, _) => Property::LinearDamping(self.linear_damping),
            (PropertyKey::AngularDamping, _) => Property::AngularDamping(self.angular_damping),
            (PropertyKey::GravityScale, _) => Property::GravityScale(self.gravity_scale),
            (PropertyKey::FixedRotation, _) => Property::FixedRotation(self.fixed_rotation),
            (PropertyKey::Width, Shape::Box { width, .. }) => Property::Width(*width),
            (PropertyKey::Height, Shape::Box { height, .. }) => Property::Height(*height),
            (PropertyKey::Radius, Shape::Circle { radius }) => Property::Radius(*radius),
            (PropertyKey::Vertices, Shape::Polygon { vertices }) => Property::Vertices(vertices.clone()),
            _ => return None,
        };
        Some(value)
    }

    fn apply(&mut self, value: &Property) -> Result<(), PropertyError> {
        let target = self.shape.kind_name();
        match (value, &mut self.shape) {
            (Property::Position(v), _) => self.position = *v,
            (Property::Angle(v), _) => self.angle = *v,
            (Property::BodyKind(v), _) => self.body_type = *v,
            (Property::Density(v), _) => self.density = *v,
            (Property::Friction(v), _) => self.friction = *v,
            (Property::Restitution(v), _) => self.restitution = *v,
            (Property::LinearDamping(v), _) => self.linear_damping = *v,
            (Property::AngularDamping(v), _) => self.angular_damping = *v,
            (Property::GravityScale(v), _) => self.gravity_scale = *v,
            (Property::FixedRotation(v), _) => self.fixed_rotation = *v,
            (Property::Width(v), Shape::Box { width, .. }) => *width = *v,
            (Property::Height(v), Shape::Box { height, .. }) => *height = *v,
            (Property::Radius(v), Shape::Circle { radius }) => *radius = *v,
            (Property::Vertices(v), Shape::Polygon { vertices }) => vertices.clone_from(v),
            _ => {
                return Err(PropertyError::NotApplicable { key: value.key(), target });
            }
        }
        Ok(())
    }
}

impl Mutable for Joint {
    fn capture(&self, key: PropertyKey) -> Option<Property> {
        let value = match key {
            PropertyKey::AnchorA => Property::AnchorA(self.anchor_a_local),
            PropertyKey::AnchorB => Property::AnchorB(self.anchor_b_local),
            PropertyKey::EnableLimit => Property::EnableLimit(self.enable_limit),
            PropertyKey::LowerAngle => Property::LowerAngle(self.lower_angle),
            PropertyKey::UpperAngle => Property::UpperAngle(self.upper_angle),
            PropertyKey::EnableMotor => Property::EnableMotor(self.enable_motor),
            PropertyKey::MotorSpeed => Property::MotorSpeed(self.motor_speed),
            PropertyKey::MaxMotorTorque => Property::MaxMotorTorque(self.max_motor_torque),
            PropertyKey::CollideConnected => Property::CollideConnected(self.collide_connected),
            _ => return None,
        };
        Some(value)
    }

    fn apply(&mut self, value: &Property) -> Result<(), PropertyError> {
        match value {
            Property::AnchorA(v) => self.anchor_a_local = *v,
            Property::AnchorB(v) => self.anchor_b_local = *v,
            Property::EnableLimit(v) => self.enable_limit = *v,
            Property::LowerAngle(v) => self.lower_angle = *v,
            Property::UpperAngle(v) => self.upper_angle = *v,
            Property::EnableMotor(v) => self.enable_motor = *v,
            Property::MotorSpeed(v) => self.motor_speed = *v,
            Property::MaxMotorTorque(v) => self.max_motor_torque = *v,
            Property::CollideConnected(v) => self.collide_connected = *v,
            _ => return Err(PropertyError::NotApplicable { key: value.key(), target: "joint" }),
        }
        Ok(())
    }
}

impl Mutable for SceneObject {
    fn capture(&self, key: PropertyKey) -> Option<Property> {
        match self {
            Self::Body(b) => b.capture(key),
            Self::Joint(j) => j.capture(key),
        }
    }

    fn apply(&mut self, value: &Property) -> Result<(), PropertyError> {
        match self {
            Self::Body(b) => b.apply(value),
            Self::Joint(j) => j.apply(value),
        }
    }
}

/// Change one field of a body or joint.
#[derive(Debug, Clone)]
pub struct ModifyProperty {
    id: ObjectId,
    old: Property,
    new: Property,
}

impl ModifyProperty {
    /// Build from explicit old and new values, e.g. when the old value was
    /// captured at the start of a drag.
    #[must_use]
    pub fn new(id: ObjectId, old: Property, new: Property) -> Self {
        Self { id, old, new }
    }

    /// Build by reading the field's current value out of the scene.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::NotFound`] if `id` is not in the scene and
    /// [`PropertyError::NotApplicable`] if the object has no such field.
    pub fn capture(scene: &Scene, id: ObjectId, new: Property) -> Result<Self, PropertyError> {
        let object = scene.get(id).ok_or(PropertyError::NotFound(id))?;
        let key = new.key();
        let target = match object {
            SceneObject::Body(b) => b.shape.kind_name(),
            SceneObject::Joint(_) => "joint",
        };
        let old = object.capture(key).ok_or(PropertyError::NotApplicable { key, target })?;
        Ok(Self { id, old, new })
    }

    /// An edit that leaves the value unchanged.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.old == self.new
    }

    #[must_use]
    pub fn new_value(&self) -> &Property {
        &self.new
    }

    fn set(&self, scene: &mut Scene, value: &Property) {
        match scene.get_mut(self.id) {
            Some(object) => {
                if let Err(e) = object.apply(value) {
                    warn!(id = %self.id, error = %e, "modify property failed");
                }
            }
            None => warn!(id = %self.id, "modify property: object not in scene"),
        }
        scene.notify();
    }
}

impl Command for ModifyProperty {
    fn execute(&mut self, scene: &mut Scene) {
        self.set(scene, &self.new);
    }

    fn undo(&mut self, scene: &mut Scene) {
        self.set(scene, &self.old);
    }

    fn label(&self) -> &'static str {
        "Modify property"
    }
}

// =============================================================
// Batch
// =============================================================

/// Several commands applied as one history entry.
#[derive(Debug, Default)]
pub struct Batch {
    commands: Vec<Box<dyn Command>>,
}

impl Batch {
    #[must_use]
    pub fn new(commands: Vec<Box<dyn Command>>) -> Self {
        Self { commands }
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for Batch {
    fn execute(&mut self, scene: &mut Scene) {
        for command in &mut self.commands {
            command.execute(scene);
        }
    }

    fn undo(&mut self, scene: &mut Scene) {
        for command in self.commands.iter_mut().rev() {
            command.undo(scene);
        }
    }

    fn redo(&mut self, scene: &mut Scene) {
        for command in &mut self.commands {
            command.redo(scene);
        }
    }

    fn label(&self) -> &'static str {
        "Batch"
    }
}
