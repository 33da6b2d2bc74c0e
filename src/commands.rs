//! Subcommand implementations, kept free of argument parsing and stdout so
//! they can be driven from tests.

#[cfg(test)]
#[path = "commands_test.rs"]
mod tests;

use std::fmt;
use std::fs;
use std::path::Path;

use designer::config::EditorConfig;
use designer::doc::{ObjectId, Scene};
use designer::editor::{Action, EditorCore};
use designer::persist;
use designer::preview::PreviewState;
use serde::Serialize;
use tracing::info;

use crate::rapier::RapierEngine;
use crate::{CliError, PreviewArgs};

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io { path: path.to_path_buf(), source })
}

/// What `check` found in a scene file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub bodies: usize,
    pub joints: usize,
    pub invalid_shapes: Vec<ObjectId>,
    pub dangling_joints: Vec<ObjectId>,
    pub inactive_joints: Vec<ObjectId>,
}

impl CheckReport {
    fn from_scene(scene: &Scene) -> Self {
        Self {
            bodies: scene.body_count(),
            joints: scene.joints().count(),
            invalid_shapes: scene.bodies().filter(|b| b.shape.validate().is_err()).map(|b| b.id).collect(),
            dangling_joints: scene.dangling_joints(),
            inactive_joints: scene.joints().filter(|j| !j.joint_type.is_active()).map(|j| j.id).collect(),
        }
    }

    /// Everything in the scene can be simulated and exported.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.invalid_shapes.is_empty() && self.dangling_joints.is_empty() && self.inactive_joints.is_empty()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bodies: {}", self.bodies)?;
        writeln!(f, "joints: {}", self.joints)?;
        for id in &self.invalid_shapes {
            writeln!(f, "invalid shape: {id}")?;
        }
        for id in &self.dangling_joints {
            writeln!(f, "joint references a missing body: {id}")?;
        }
        for id in &self.inactive_joints {
            writeln!(f, "joint kind is not simulated: {id}")?;
        }
        if self.is_clean() {
            writeln!(f, "ok")?;
        }
        Ok(())
    }
}

/// Load and validate a saved scene.
pub fn check(path: &Path) -> Result<CheckReport, CliError> {
    let objects = persist::load_scene(&read(path)?)?;
    let report = CheckReport::from_scene(&Scene::from_objects(objects));
    info!(path = %path.display(), bodies = report.bodies, joints = report.joints, "scene checked");
    Ok(report)
}

/// Build the export document for a saved scene. Writes it to `output` and
/// returns `None`, or returns the JSON when no output path is given.
pub fn export(path: &Path, output: Option<&Path>) -> Result<Option<String>, CliError> {
    let scene = Scene::from_objects(persist::load_scene(&read(path)?)?);
    let json = persist::export_json(&scene)?;
    match output {
        Some(out) => {
            fs::write(out, json).map_err(|source| CliError::Io { path: out.to_path_buf(), source })?;
            info!(path = %out.display(), bodies = scene.body_count(), "export written");
            Ok(None)
        }
        None => Ok(Some(json)),
    }
}

/// Final pose of one body after a headless preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyPose {
    pub id: ObjectId,
    pub position: [f64; 2],
    pub angle: f64,
}

/// Run the preview on rapier for `args.steps` frames and report where every
/// body ended up. The scene file is not modified.
pub fn preview(args: &PreviewArgs, config: EditorConfig) -> Result<Vec<BodyPose>, CliError> {
    let json = read(&args.scene)?;

    let mut core = EditorCore::with_config(config);
    core.set_viewport(args.width, args.height);
    if let Some(ppm) = args.ppm {
        core.set_pixels_per_meter(ppm);
    }
    core.load_scene_json(&json)?;
    core.set_engine(Box::new(RapierEngine));

    let actions = core.enter_preview();
    if core.preview_state() == PreviewState::Idle {
        let reason = actions
            .into_iter()
            .find_map(|a| match a {
                Action::Notice(text) => Some(text),
                _ => None,
            })
            .unwrap_or_else(|| "unknown reason".into());
        return Err(CliError::Preview(reason));
    }

    for _ in 0..args.steps {
        core.tick();
    }
    let poses = core
        .scene
        .bodies()
        .map(|b| BodyPose { id: b.id, position: [b.position.x, b.position.y], angle: b.angle })
        .collect();
    core.exit_preview();
    info!(steps = args.steps, "headless preview finished");
    Ok(poses)
}
