//! Scene model: bodies, joints and the ordered store that owns them.
//!
//! This module defines what is being authored (`Body`, `Joint`, wrapped in
//! the tagged `SceneObject`) and the runtime container (`Scene`). Insertion
//! order in the scene is z-order: later objects draw on top and win hit-test
//! ties. Joints reference bodies by id only; a joint whose body is gone stays
//! in the scene but is skipped by drawing, hit-testing and the preview.
//!
//! The serde layout here is the persisted save format (camelCase fields,
//! `type` / `shapeType` / `jointType` tags).

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::*;
use crate::geom;
use crate::transform::Vec2;

/// Unique identifier for a scene object.
pub type ObjectId = Uuid;

/// How the engine treats a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    /// Never moves.
    Static,
    /// Moved by forces and collisions.
    #[default]
    Dynamic,
    /// Moved only by its own velocity.
    Kinematic,
}

impl BodyKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Dynamic => "dynamic",
            Self::Kinematic => "kinematic",
        }
    }
}

/// Collision shape of a body, in the body's local frame (meters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shapeType", rename_all = "lowercase")]
pub enum Shape {
    /// Rectangle centered on the body origin.
    Box { width: f64, height: f64 },
    /// Disc centered on the body origin.
    Circle { radius: f64 },
    /// Closed vertex ring; the last vertex connects back to the first.
    Polygon { vertices: Vec<Vec2> },
}

/// Why a shape cannot be handed to an engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("box dimensions must be positive, got {width} x {height}")]
    NonPositiveBox { width: f64, height: f64 },
    #[error("circle radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("polygon accepts at most 8 vertices, got {0}")]
    TooManyVertices(usize),
    #[error("shape contains a non-finite coordinate")]
    NonFinite,
}

impl Shape {
    /// Lowercase shape name as used in the save format.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Circle { .. } => "circle",
            Self::Polygon { .. } => "polygon",
        }
    }

    /// Check that the shape describes a usable collider.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] for non-positive dimensions, out-of-range
    /// vertex counts or NaN/infinite values.
    pub fn validate(&self) -> Result<(), ShapeError> {
        match self {
            Self::Box { width, height } => {
                if !width.is_finite() || !height.is_finite() {
                    return Err(ShapeError::NonFinite);
                }
                if *width <= 0.0 || *height <= 0.0 {
                    return Err(ShapeError::NonPositiveBox { width: *width, height: *height });
                }
            }
            Self::Circle { radius } => {
                if !radius.is_finite() {
                    return Err(ShapeError::NonFinite);
                }
                if *radius <= 0.0 {
                    return Err(ShapeError::NonPositiveRadius(*radius));
                }
            }
            Self::Polygon { vertices } => {
                if vertices.len() < MIN_POLYGON_VERTICES {
                    return Err(ShapeError::TooFewVertices(vertices.len()));
                }
                if vertices.len() > MAX_POLYGON_VERTICES {
                    return Err(ShapeError::TooManyVertices(vertices.len()));
                }
                if vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
                    return Err(ShapeError::NonFinite);
                }
            }
        }
        Ok(())
    }
}

fn default_density() -> f64 {
    1.0
}

fn default_friction() -> f64 {
    0.3
}

fn default_restitution() -> f64 {
    0.5
}

fn default_gravity_scale() -> f64 {
    1.0
}

/// A rigid body as stored in the scene and in saved files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub id: ObjectId,
    #[serde(flatten)]
    pub shape: Shape,
    /// World position of the body origin, in meters.
    pub position: Vec2,
    /// Counter-clockwise rotation in radians.
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub body_type: BodyKind,
    #[serde(default = "default_density")]
    pub density: f64,
    #[serde(default = "default_friction")]
    pub friction: f64,
    #[serde(default = "default_restitution")]
    pub restitution: f64,
    #[serde(default)]
    pub linear_damping: f64,
    #[serde(default)]
    pub angular_damping: f64,
    #[serde(default = "default_gravity_scale")]
    pub gravity_scale: f64,
    #[serde(default)]
    pub fixed_rotation: bool,
}

impl Body {
    /// A dynamic body with default material at `position`.
    #[must_use]
    pub fn new(shape: Shape, position: Vec2) -> Self {
        Self {
            id: Uuid::new_v4(),
            shape,
            position,
            angle: 0.0,
            body_type: BodyKind::Dynamic,
            density: default_density(),
            friction: default_friction(),
            restitution: default_restitution(),
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: default_gravity_scale(),
            fixed_rotation: false,
        }
    }

    #[must_use]
    pub fn new_box(position: Vec2, width: f64, height: f64) -> Self {
        Self::new(Shape::Box { width, height }, position)
    }

    #[must_use]
    pub fn new_circle(position: Vec2, radius: f64) -> Self {
        Self::new(Shape::Circle { radius }, position)
    }

    /// A polygon body from a ring already expressed in the body's local frame.
    #[must_use]
    pub fn new_polygon(position: Vec2, vertices: Vec<Vec2>) -> Self {
        Self::new(Shape::Polygon { vertices }, position)
    }

    #[must_use]
    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.body_type = kind;
        self
    }

    #[must_use]
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        geom::local_to_world(local, self.position, self.angle)
    }

    #[must_use]
    pub fn world_to_local(&self, world: Vec2) -> Vec2 {
        geom::world_to_local(world, self.position, self.angle)
    }

    /// Whether a world point lies inside the body's shape. Degenerate
    /// polygons contain nothing.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        match &self.shape {
            Shape::Box { width, height } => {
                geom::point_in_rotated_rect(point, self.position, self.angle, *width, *height)
            }
            Shape::Circle { radius } => geom::point_in_circle(point, self.position, *radius),
            Shape::Polygon { vertices } => geom::point_in_polygon(point, self.position, self.angle, vertices),
        }
    }

    /// Polygon ring, if this is a polygon body.
    #[must_use]
    pub fn vertices(&self) -> Option<&[Vec2]> {
        match &self.shape {
            Shape::Polygon { vertices } => Some(vertices),
            _ => None,
        }
    }
}

/// Joint type. Only revolute joints are simulated and exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointKind {
    /// Hinge about a shared anchor point.
    #[default]
    Revolute,
    /// Reserved. Loads and saves, but is never built into a simulation.
    Distance,
}

impl JointKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Revolute => "revolute",
            Self::Distance => "distance",
        }
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Revolute)
    }
}

fn default_lower_angle() -> f64 {
    DEFAULT_LOWER_ANGLE
}

fn default_upper_angle() -> f64 {
    DEFAULT_UPPER_ANGLE
}

fn default_max_motor_torque() -> f64 {
    DEFAULT_MAX_MOTOR_TORQUE
}

fn default_collide_connected() -> bool {
    true
}

/// A joint between two bodies, referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Joint {
    pub id: ObjectId,
    #[serde(default)]
    pub joint_type: JointKind,
    pub body_a_id: ObjectId,
    pub body_b_id: ObjectId,
    /// Attachment point in body A's local frame.
    pub anchor_a_local: Vec2,
    /// Attachment point in body B's local frame.
    pub anchor_b_local: Vec2,
    #[serde(default)]
    pub enable_limit: bool,
    #[serde(default = "default_lower_angle")]
    pub lower_angle: f64,
    #[serde(default = "default_upper_angle")]
    pub upper_angle: f64,
    #[serde(default)]
    pub enable_motor: bool,
    /// Target angular speed, radians per second, counter-clockwise.
    #[serde(default)]
    pub motor_speed: f64,
    #[serde(default = "default_max_motor_torque")]
    pub max_motor_torque: f64,
    #[serde(default = "default_collide_connected")]
    pub collide_connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_hz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping_ratio: Option<f64>,
}

impl Joint {
    /// A revolute joint with default limits and motor settings.
    #[must_use]
    pub fn revolute(body_a_id: ObjectId, body_b_id: ObjectId, anchor_a_local: Vec2, anchor_b_local: Vec2) -> Self {
        Self {
            id: Uuid::new_v4(),
            joint_type: JointKind::Revolute,
            body_a_id,
            body_b_id,
            anchor_a_local,
            anchor_b_local,
            enable_limit: false,
            lower_angle: DEFAULT_LOWER_ANGLE,
            upper_angle: DEFAULT_UPPER_ANGLE,
            enable_motor: false,
            motor_speed: 0.0,
            max_motor_torque: DEFAULT_MAX_MOTOR_TORQUE,
            collide_connected: true,
            length: None,
            frequency_hz: None,
            damping_ratio: None,
        }
    }
}

/// Either kind of scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneObject {
    Body(Body),
    Joint(Joint),
}

impl SceneObject {
    #[must_use]
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Body(b) => b.id,
            Self::Joint(j) => j.id,
        }
    }

    #[must_use]
    pub fn as_body(&self) -> Option<&Body> {
        match self {
            Self::Body(b) => Some(b),
            Self::Joint(_) => None,
        }
    }

    #[must_use]
    pub fn as_joint(&self) -> Option<&Joint> {
        match self {
            Self::Joint(j) => Some(j),
            Self::Body(_) => None,
        }
    }

    pub fn as_body_mut(&mut self) -> Option<&mut Body> {
        match self {
            Self::Body(b) => Some(b),
            Self::Joint(_) => None,
        }
    }

    pub fn as_joint_mut(&mut self) -> Option<&mut Joint> {
        match self {
            Self::Joint(j) => Some(j),
            Self::Body(_) => None,
        }
    }
}

impl From<Body> for SceneObject {
    fn from(body: Body) -> Self {
        Self::Body(body)
    }
}

impl From<Joint> for SceneObject {
    fn from(joint: Joint) -> Self {
        Self::Joint(joint)
    }
}

/// Callback fired after every scene mutation (typically schedules a redraw).
pub type SceneListener = Box<dyn FnMut()>;

/// The authoritative, ordered scene.
#[derive(Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    listener: Option<SceneListener>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("objects", &self.objects)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_objects(objects: Vec<SceneObject>) -> Self {
        Self { objects, listener: None }
    }

    /// Install the update callback, replacing any previous one.
    pub fn set_listener(&mut self, listener: SceneListener) {
        self.listener = Some(listener);
    }

    /// Invoke the update callback, if one is installed.
    pub fn notify(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener();
        }
    }

    /// All objects in z-order (bottom first).
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Append an object on top.
    pub fn push(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    /// Insert at `index`, or on top when `index` is past the end.
    pub fn insert(&mut self, index: usize, object: SceneObject) {
        let index = index.min(self.objects.len());
        self.objects.insert(index, object);
    }

    /// Remove by id, returning the object and the index it occupied.
    pub fn remove(&mut self, id: ObjectId) -> Option<(usize, SceneObject)> {
        let index = self.index_of(id)?;
        Some((index, self.objects.remove(index)))
    }

    /// Remove the object at `index` if it has the given id.
    pub fn remove_at(&mut self, index: usize, id: ObjectId) -> Option<SceneObject> {
        if self.objects.get(index).map(SceneObject::id) != Some(id) {
            return None;
        }
        Some(self.objects.remove(index))
    }

    /// Replace the entire contents. The listener is kept.
    pub fn replace_all(&mut self, objects: Vec<SceneObject>) {
        self.objects = objects;
    }

    #[must_use]
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    #[must_use]
    pub fn body(&self, id: ObjectId) -> Option<&Body> {
        self.get(id).and_then(SceneObject::as_body)
    }

    pub fn body_mut(&mut self, id: ObjectId) -> Option<&mut Body> {
        self.get_mut(id).and_then(SceneObject::as_body_mut)
    }

    #[must_use]
    pub fn joint(&self, id: ObjectId) -> Option<&Joint> {
        self.get(id).and_then(SceneObject::as_joint)
    }

    pub fn joint_mut(&mut self, id: ObjectId) -> Option<&mut Joint> {
        self.get_mut(id).and_then(SceneObject::as_joint_mut)
    }

    /// Bodies in z-order.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.objects.iter().filter_map(SceneObject::as_body)
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.objects.iter_mut().filter_map(SceneObject::as_body_mut)
    }

    /// Joints in z-order.
    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.objects.iter().filter_map(SceneObject::as_joint)
    }

    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies().count()
    }

    /// Both bodies of a joint, or `None` if either is missing.
    #[must_use]
    pub fn joint_bodies(&self, joint: &Joint) -> Option<(&Body, &Body)> {
        Some((self.body(joint.body_a_id)?, self.body(joint.body_b_id)?))
    }

    /// World positions of a joint's two anchors, if both bodies exist.
    #[must_use]
    pub fn joint_anchors_world(&self, joint: &Joint) -> Option<(Vec2, Vec2)> {
        let (a, b) = self.joint_bodies(joint)?;
        Some((a.local_to_world(joint.anchor_a_local), b.local_to_world(joint.anchor_b_local)))
    }

    /// Ids of joints that reference a missing body.
    #[must_use]
    pub fn dangling_joints(&self) -> Vec<ObjectId> {
        self.joints()
            .filter(|j| self.joint_bodies(j).is_none())
            .map(|j| j.id)
            .collect()
    }
}
