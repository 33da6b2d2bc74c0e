//! Scene save/load and the engine-ready export document.
//!
//! A saved scene is the JSON array of [`SceneObject`]s exactly as the serde
//! derives in [`crate::doc`] lay them out. Loading validates the whole file
//! before anything is handed back, so a bad file never half-replaces a scene.
//!
//! The export document is a separate, write-only format for game runtimes:
//! world settings plus per-body `body_def`/`fixtures` and per-joint
//! `joint_def`, all in meters with Y up.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::doc::{Body, BodyKind, Joint, ObjectId, Scene, SceneObject, Shape};
use crate::transform::Vec2;

/// Errors from reading a saved scene.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("this is an engine export file; only saved scenes can be loaded")]
    ExportFormat,
    #[error("a saved scene must be a JSON array")]
    NotAnArray,
    #[error("object {index} is missing an id or type")]
    MissingField { index: usize },
    #[error("object {index} is malformed: {source}")]
    Malformed { index: usize, source: serde_json::Error },
    #[error("duplicate object id {0}")]
    DuplicateId(ObjectId),
}

/// Errors from writing a scene or export.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("the scene is empty; nothing to save")]
    EmptyScene,
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================
// Save / load
// =============================================================

/// Serialize the scene as a pretty-printed JSON array.
///
/// # Errors
///
/// [`SaveError::EmptyScene`] for a scene with no objects.
pub fn save_scene(scene: &Scene) -> Result<String, SaveError> {
    if scene.is_empty() {
        return Err(SaveError::EmptyScene);
    }
    Ok(serde_json::to_string_pretty(scene.objects())?)
}

/// Parse and validate a saved scene.
///
/// # Errors
///
/// Any [`LoadError`]; the file is rejected as a whole.
pub fn load_scene(json: &str) -> Result<Vec<SceneObject>, LoadError> {
    let value: Value = serde_json::from_str(json)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) if is_export(&map) => return Err(LoadError::ExportFormat),
        _ => return Err(LoadError::NotAnArray),
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut objects = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if item.get("id").is_none() || item.get("type").is_none() {
            return Err(LoadError::MissingField { index });
        }
        let object: SceneObject = serde_json::from_value(item).map_err(|source| LoadError::Malformed { index, source })?;
        if !seen.insert(object.id()) {
            return Err(LoadError::DuplicateId(object.id()));
        }
        if let SceneObject::Body(body) = &object {
            if let Err(e) = body.shape.validate() {
                warn!(id = %body.id, error = %e, "loaded body has an unusable shape");
            }
        }
        objects.push(object);
    }

    debug!(objects = objects.len(), "scene loaded");
    Ok(objects)
}

fn is_export(map: &Map<String, Value>) -> bool {
    ["world_settings", "bodies", "joints"].iter().all(|k| map.contains_key(*k))
}

// =============================================================
// Export
// =============================================================

/// Root of the engine-ready export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDoc {
    pub world_settings: WorldSettings,
    pub bodies: Vec<ExportBody>,
    pub joints: Vec<ExportJoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorldSettings {
    /// Meters per second squared, Y up.
    pub gravity: [f64; 2],
    pub allow_sleeping: bool,
    pub auto_clear_forces: bool,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self { gravity: [0.0, -10.0], allow_sleeping: true, auto_clear_forces: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBody {
    pub id: ObjectId,
    pub body_def: BodyDef,
    pub fixtures: Vec<Fixture>,
    pub visual_properties: Map<String, Value>,
    pub user_data: Map<String, Value>,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyDef {
    #[serde(rename = "type")]
    pub body_type: BodyKind,
    pub position: [f64; 2],
    pub angle: f64,
    pub linear_velocity: [f64; 2],
    pub angular_velocity: f64,
    pub linear_damping: f64,
    pub angular_damping: f64,
    pub allow_sleep: bool,
    pub awake: bool,
    pub fixed_rotation: bool,
    pub bullet: bool,
    pub gravity_scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fixture {
    pub shape: ExportShape,
    pub fixture_def: FixtureDef,
}

/// Shape parameters in meters, body-local.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "params", rename_all = "lowercase")]
pub enum ExportShape {
    Box { width: f64, height: f64 },
    Circle { radius: f64 },
    Polygon { vertices: Vec<[f64; 2]> },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FixtureDef {
    pub density: f64,
    pub friction: f64,
    pub restitution: f64,
    pub is_sensor: bool,
    pub filter_category_bits: u16,
    pub filter_mask_bits: u16,
    pub filter_group_index: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportJoint {
    pub id: ObjectId,
    pub joint_type: &'static str,
    pub body_a: ObjectId,
    pub body_b: ObjectId,
    pub joint_def: RevoluteJointDef,
    pub visual_properties: Map<String, Value>,
    pub user_data: Map<String, Value>,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevoluteJointDef {
    pub local_anchor_a: [f64; 2],
    pub local_anchor_b: [f64; 2],
    /// Body B angle minus body A angle at authoring time.
    pub reference_angle: f64,
    pub enable_limit: bool,
    pub lower_angle: f64,
    pub upper_angle: f64,
    pub enable_motor: bool,
    pub motor_speed: f64,
    pub max_motor_torque: f64,
    pub collide_connected: bool,
}

fn pair(v: Vec2) -> [f64; 2] {
    [v.x, v.y]
}

/// Build the export document. Bodies with an unusable shape keep their
/// `body_def` but get no fixture; joints that are inactive or reference a
/// missing body are left out.
#[must_use]
pub fn export_scene(scene: &Scene) -> ExportDoc {
    let bodies = scene.bodies().map(export_body).collect();
    let joints = scene
        .joints()
        .filter_map(|joint| {
            let exported = export_joint(joint, scene);
            if exported.is_none() {
                warn!(id = %joint.id, kind = joint.joint_type.as_str(), "export: skipping joint");
            }
            exported
        })
        .collect();
    ExportDoc { world_settings: WorldSettings::default(), bodies, joints }
}

/// [`export_scene`] as pretty-printed JSON.
///
/// # Errors
///
/// [`SaveError::Json`] if serialization fails.
pub fn export_json(scene: &Scene) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(&export_scene(scene))?)
}

fn export_body(body: &Body) -> ExportBody {
    let fixtures = match body.shape.validate() {
        Ok(()) => vec![Fixture {
            shape: match &body.shape {
                Shape::Box { width, height } => ExportShape::Box { width: *width, height: *height },
                Shape::Circle { radius } => ExportShape::Circle { radius: *radius },
                Shape::Polygon { vertices } => ExportShape::Polygon { vertices: vertices.iter().copied().map(pair).collect() },
            },
            fixture_def: FixtureDef {
                density: body.density,
                friction: body.friction,
                restitution: body.restitution,
                is_sensor: false,
                filter_category_bits: 1,
                filter_mask_bits: 0xFFFF,
                filter_group_index: 0,
            },
        }],
        Err(e) => {
            warn!(id = %body.id, error = %e, "export: body has no usable fixture");
            Vec::new()
        }
    };

    ExportBody {
        id: body.id,
        body_def: BodyDef {
            body_type: body.body_type,
            position: pair(body.position),
            angle: body.angle,
            linear_velocity: [0.0, 0.0],
            angular_velocity: 0.0,
            linear_damping: body.linear_damping,
            angular_damping: body.angular_damping,
            allow_sleep: true,
            awake: true,
            fixed_rotation: body.fixed_rotation,
            bullet: false,
            gravity_scale: body.gravity_scale,
        },
        fixtures,
        visual_properties: Map::new(),
        user_data: Map::new(),
    }
}

fn export_joint(joint: &Joint, scene: &Scene) -> Option<ExportJoint> {
    if !joint.joint_type.is_active() {
        return None;
    }
    let (a, b) = scene.joint_bodies(joint)?;
    Some(ExportJoint {
        id: joint.id,
        joint_type: joint.joint_type.as_str(),
        body_a: joint.body_a_id,
        body_b: joint.body_b_id,
        joint_def: RevoluteJointDef {
            local_anchor_a: pair(joint.anchor_a_local),
            local_anchor_b: pair(joint.anchor_b_local),
            reference_angle: b.angle - a.angle,
            enable_limit: joint.enable_limit,
            lower_angle: joint.lower_angle,
            upper_angle: joint.upper_angle,
            enable_motor: joint.enable_motor,
            motor_speed: joint.motor_speed,
            max_motor_torque: joint.max_motor_torque,
            collide_connected: joint.collide_connected,
        },
        visual_properties: Map::new(),
        user_data: Map::new(),
    })
}
