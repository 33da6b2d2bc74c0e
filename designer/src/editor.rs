//! Editor core: turns pointer and keyboard events into scene edits.
//!
//! [`EditorCore`] owns everything an editing session needs: the scene, the
//! undo history, the view, the gesture state machine and the preview bridge.
//! It never draws; every handler returns the [`Action`]s the host should act
//! on (repaint, refresh the selection panel, show a message).
//!
//! Drags mutate the scene directly so the host can repaint live, and record
//! a single command on pointer-up when something actually changed. While the
//! physics preview is active only Escape, panning and zooming are accepted.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use tracing::{debug, info};

use crate::command::{AddObject, Command, DeleteObject, ModifyProperty, MoveObject, Property, PropertyError};
use crate::config::EditorConfig;
use crate::consts::*;
use crate::doc::{Body, Joint, ObjectId, Scene, Shape};
use crate::geom;
use crate::history::History;
use crate::hit::{self, AnchorEnd, HitPart};
use crate::input::{Button, InputState, Key, Modifiers, PendingJoint, Tool, UiState, WheelDelta};
use crate::persist::{self, LoadError, SaveError};
use crate::preview::{PreviewBridge, PreviewState};
use crate::sim::PhysicsEngine;
use crate::transform::{Vec2, ViewState, Viewport};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    SelectionChanged(Option<ObjectId>),
    HistoryChanged { can_undo: bool, can_redo: bool },
    PreviewChanged(PreviewState),
    /// A short message for the status bar.
    Notice(String),
}

/// Errors from editor operations that are refused outright.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("not available while the physics preview is running")]
    PreviewActive,
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Property(#[from] PropertyError),
}

/// Core editor state, independent of any windowing or drawing backend.
pub struct EditorCore {
    pub scene: Scene,
    pub history: History,
    pub view: ViewState,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
    pub preview: PreviewBridge,
    config: EditorConfig,
}

impl Default for EditorCore {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl EditorCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            scene: Scene::new(),
            history: History::new(config.history_capacity),
            view: ViewState::new(config.default_ppm, Vec2::ZERO),
            viewport: Viewport::default(),
            ui: UiState::default(),
            input: InputState::default(),
            preview: PreviewBridge::new(config.preview),
            config,
        }
    }

    /// Install the physics engine used by the preview.
    pub fn set_engine(&mut self, engine: Box<dyn PhysicsEngine>) {
        self.preview.set_engine(engine);
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn selection(&self) -> Option<ObjectId> {
        self.ui.selected_id
    }

    #[must_use]
    pub fn preview_state(&self) -> PreviewState {
        self.preview.state()
    }

    /// World position of a screen point under the current view.
    #[must_use]
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        self.view.to_world(screen, self.viewport)
    }

    // --- Tool / view ---

    /// Switch tools, dropping anything half-built with the old one.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        if self.preview.is_active() {
            return Vec::new();
        }
        let mut actions = self.cancel_gesture();
        self.ui.cancel_construction();
        self.ui.tool = tool;
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Resize the canvas. Rescales a running preview.
    pub fn set_viewport(&mut self, width: f64, height: f64) -> Vec<Action> {
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return Vec::new();
        }
        self.viewport = viewport;
        self.view_changed()
    }

    /// Set the zoom directly, clamped to the configured range.
    pub fn set_pixels_per_meter(&mut self, ppm: f64) -> Vec<Action> {
        let ppm = self.config.limits.clamp(ppm);
        if ppm == self.view.pixels_per_meter {
            return Vec::new();
        }
        self.view.pixels_per_meter = ppm;
        self.view_changed()
    }

    pub fn set_origin(&mut self, origin: Vec2) -> Vec<Action> {
        if origin == self.view.origin {
            return Vec::new();
        }
        self.view.origin = origin;
        self.view_changed()
    }

    /// Return to the default zoom centered on the world origin.
    pub fn reset_view(&mut self) -> Vec<Action> {
        self.view.reset(self.config.default_ppm);
        self.view_changed()
    }

    fn view_changed(&mut self) -> Vec<Action> {
        let mut actions = vec![Action::RenderNeeded];
        if self.preview.is_active() {
            actions.extend(self.rescale_preview());
        }
        actions
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen: Vec2, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        match button {
            Button::Middle => {
                // A primary gesture in progress keeps the pointer.
                if self.input.is_idle() {
                    self.input = InputState::Panning { start_screen: screen, start_origin: self.view.origin };
                }
                Vec::new()
            }
            Button::Secondary => Vec::new(),
            Button::Primary => {
                if self.preview.is_active() || !self.input.is_idle() {
                    return Vec::new();
                }
                let world = self.to_world(screen);
                match self.ui.tool {
                    Tool::Select => self.select_down(world),
                    Tool::Rect | Tool::Circle => self.begin_shape(world),
                    Tool::Polygon => self.add_polygon_point(world),
                    Tool::RevoluteJoint => self.joint_click(world),
                    Tool::Delete => self.delete_at(world),
                }
            }
        }
    }

    pub fn on_pointer_move(&mut self, screen: Vec2, _modifiers: Modifiers) -> Vec<Action> {
        let world = self.to_world(screen);
        match self.input {
            InputState::Idle => {
                if self.ui.polygon_points.is_empty() && self.ui.pending_joint.is_none() {
                    Vec::new()
                } else {
                    // Rubber-band preview of the next segment.
                    vec![Action::RenderNeeded]
                }
            }
            InputState::Panning { start_screen, start_origin } => {
                self.view.pan_from(start_origin, screen - start_screen);
                vec![Action::RenderNeeded]
            }
            InputState::DraggingBody { id, grab_offset, .. } => {
                if let Some(body) = self.scene.body_mut(id) {
                    body.position = world + grab_offset;
                }
                self.scene.notify();
                vec![Action::RenderNeeded]
            }
            InputState::DraggingAnchor { id, end, .. } => {
                self.drag_anchor(id, end, world);
                vec![Action::RenderNeeded]
            }
            InputState::DraggingVertex { id, index, .. } => {
                if let Some(body) = self.scene.body_mut(id) {
                    let local = body.world_to_local(world);
                    if let Shape::Polygon { vertices } = &mut body.shape {
                        if let Some(v) = vertices.get_mut(index) {
                            *v = local;
                        }
                    }
                }
                self.scene.notify();
                vec![Action::RenderNeeded]
            }
            InputState::DrawingShape { id, start_world } => {
                if let Some(body) = self.scene.body_mut(id) {
                    size_shape(body, start_world, world);
                }
                self.scene.notify();
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Finish the active gesture, recording one command if it changed
    /// anything. Only the button that started the gesture ends it.
    pub fn on_pointer_up(&mut self, _screen: Vec2, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let ends_gesture = match self.input {
            InputState::Idle => false,
            InputState::Panning { .. } => button == Button::Middle,
            _ => button == Button::Primary,
        };
        if !ends_gesture {
            return Vec::new();
        }
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Panning { .. } => self.view_changed(),
            InputState::DraggingBody { id, orig_position, .. } => {
                let Some(to) = self.scene.body(id).map(|b| b.position) else {
                    return Vec::new();
                };
                let command = MoveObject::new(id, orig_position, to);
                if command.is_noop() {
                    return Vec::new();
                }
                self.record(Box::new(command))
            }
            InputState::DraggingAnchor { id, end, orig_anchor } => {
                let Some(joint) = self.scene.joint(id) else {
                    return Vec::new();
                };
                let (old, new) = match end {
                    AnchorEnd::A => (Property::AnchorA(orig_anchor), Property::AnchorA(joint.anchor_a_local)),
                    AnchorEnd::B => (Property::AnchorB(orig_anchor), Property::AnchorB(joint.anchor_b_local)),
                };
                let command = ModifyProperty::new(id, old, new);
                if command.is_noop() {
                    return Vec::new();
                }
                self.record(Box::new(command))
            }
            InputState::DraggingVertex { id, index, orig_vertices } => self.finish_vertex_drag(id, index, orig_vertices),
            InputState::DrawingShape { id, .. } => {
                // The provisional body leaves the scene and comes back through history.
                let Some((_, object)) = self.scene.remove(id) else {
                    return Vec::new();
                };
                self.record(Box::new(AddObject::new(object)))
            }
        }
    }

    /// Double-click finishes a polygon, or toggles vertex editing on one.
    pub fn on_double_click(&mut self, screen: Vec2) -> Vec<Action> {
        if self.preview.is_active() {
            return Vec::new();
        }
        let world = self.to_world(screen);
        match self.ui.tool {
            Tool::Polygon => {
                // The second press of the double-click already added a point.
                let points = &mut self.ui.polygon_points;
                let duplicate = matches!(points.as_slice(), [.., prev, last] if prev.distance(*last) <= VERTEX_MOVE_EPSILON_M);
                if duplicate {
                    points.pop();
                }
                self.finish_polygon()
            }
            Tool::Select => {
                if self.ui.vertex_edit.take().is_some() {
                    return vec![Action::RenderNeeded];
                }
                let Some(id) = hit::hit_test_body(world, &self.scene) else {
                    return Vec::new();
                };
                if self.scene.body(id).and_then(Body::vertices).is_none() {
                    return Vec::new();
                }
                self.ui.vertex_edit = Some(id);
                let mut actions = Vec::new();
                self.set_selection(Some(id), &mut actions);
                actions.push(Action::RenderNeeded);
                actions
            }
            _ => Vec::new(),
        }
    }

    /// Zoom one step at the cursor. Scrolling down zooms out.
    pub fn on_wheel(&mut self, screen: Vec2, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        let step = if delta.dy > 0.0 {
            -self.config.limits.zoom_step
        } else if delta.dy < 0.0 {
            self.config.limits.zoom_step
        } else {
            return Vec::new();
        };
        if !self.view.zoom_at(screen, step, self.viewport, &self.config.limits) {
            return Vec::new();
        }
        self.view_changed()
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if self.preview.is_active() {
            return if key.is("Escape") { self.exit_preview() } else { Vec::new() };
        }
        if key.is("Escape") {
            let mut actions = self.cancel_gesture();
            self.ui.cancel_construction();
            actions.push(Action::RenderNeeded);
            return actions;
        }
        if !self.input.is_idle() {
            return Vec::new();
        }

        if modifiers.command() {
            if (key.is("z") && modifiers.shift) || key.is("y") {
                return self.redo();
            }
            if key.is("z") {
                return self.undo();
            }
            return Vec::new();
        }
        if key.is("Delete") || key.is("Backspace") {
            return self.delete_selected();
        }
        if key.is(" ") {
            return self.toggle_preview();
        }
        Vec::new()
    }

    // --- Edits ---

    pub fn undo(&mut self) -> Vec<Action> {
        if self.preview.is_active() || !self.history.undo(&mut self.scene) {
            return Vec::new();
        }
        self.after_history_move()
    }

    pub fn redo(&mut self) -> Vec<Action> {
        if self.preview.is_active() || !self.history.redo(&mut self.scene) {
            return Vec::new();
        }
        self.after_history_move()
    }

    /// Delete the selected object, if any.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        if self.preview.is_active() {
            return Vec::new();
        }
        match self.ui.selected_id {
            Some(id) => self.delete_object(id),
            None => Vec::new(),
        }
    }

    /// Finish the polygon being drawn. Needs at least three vertices.
    pub fn finish_polygon(&mut self) -> Vec<Action> {
        if self.ui.polygon_points.len() < MIN_POLYGON_VERTICES {
            return vec![Action::Notice("a polygon needs at least 3 vertices".into())];
        }
        let points = std::mem::take(&mut self.ui.polygon_points);
        let Some(center) = geom::centroid(&points) else {
            return Vec::new();
        };
        let ring = points.iter().map(|p| *p - center).collect();
        let body = Body::new_polygon(center, ring);
        debug!(id = %body.id, vertices = points.len(), "polygon finished");
        self.record(Box::new(AddObject::new(body.into())))
    }

    /// Change one field of a body or joint through history.
    ///
    /// # Errors
    ///
    /// [`EditorError::PreviewActive`] during a preview, or the
    /// [`PropertyError`] if the object or field does not exist.
    pub fn modify_property(&mut self, id: ObjectId, value: Property) -> Result<Vec<Action>, EditorError> {
        self.ensure_editable()?;
        let command = ModifyProperty::capture(&self.scene, id, value)?;
        if command.is_noop() {
            return Ok(Vec::new());
        }
        Ok(self.record(Box::new(command)))
    }

    // --- Scene files ---

    /// Discard the scene and its history.
    ///
    /// # Errors
    ///
    /// [`EditorError::PreviewActive`] during a preview.
    pub fn new_scene(&mut self) -> Result<Vec<Action>, EditorError> {
        self.ensure_editable()?;
        self.scene.replace_all(Vec::new());
        Ok(self.after_replace())
    }

    /// Replace the scene with a saved file and clear history. A file that
    /// fails validation leaves the current scene untouched.
    ///
    /// # Errors
    ///
    /// [`EditorError::PreviewActive`] during a preview, or the [`LoadError`].
    pub fn load_scene_json(&mut self, json: &str) -> Result<Vec<Action>, EditorError> {
        self.ensure_editable()?;
        let objects = persist::load_scene(json)?;
        info!(objects = objects.len(), "scene loaded");
        self.scene.replace_all(objects);
        Ok(self.after_replace())
    }

    /// # Errors
    ///
    /// [`EditorError::PreviewActive`] during a preview, or
    /// [`SaveError::EmptyScene`].
    pub fn save_scene_json(&self) -> Result<String, EditorError> {
        self.ensure_editable()?;
        Ok(persist::save_scene(&self.scene)?)
    }

    /// # Errors
    ///
    /// [`EditorError::PreviewActive`] during a preview.
    pub fn export_json(&self) -> Result<String, EditorError> {
        self.ensure_editable()?;
        Ok(persist::export_json(&self.scene)?)
    }

    // --- Preview ---

    pub fn toggle_preview(&mut self) -> Vec<Action> {
        if self.preview.is_active() { self.exit_preview() } else { self.enter_preview() }
    }

    /// Start the physics preview from the current scene and view.
    pub fn enter_preview(&mut self) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        self.ui.cancel_construction();
        match self.preview.enter(&mut self.scene, &self.view, self.viewport) {
            Ok(report) => {
                actions.push(Action::PreviewChanged(self.preview.state()));
                let skipped = report.bodies_skipped + report.joints_skipped;
                if skipped > 0 {
                    actions.push(Action::Notice(format!("{skipped} object(s) could not be simulated")));
                }
            }
            Err(e) => actions.push(Action::Notice(e.to_string())),
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Leave the preview, restoring the scene to its pre-preview poses.
    pub fn exit_preview(&mut self) -> Vec<Action> {
        if !self.preview.exit(&mut self.scene) {
            return Vec::new();
        }
        vec![Action::PreviewChanged(PreviewState::Idle), Action::RenderNeeded]
    }

    pub fn toggle_pause(&mut self) -> Vec<Action> {
        if !self.preview.is_active() {
            return Vec::new();
        }
        vec![Action::PreviewChanged(self.preview.toggle_pause())]
    }

    /// Restart the preview from the poses captured on enter.
    pub fn reset_preview(&mut self) -> Vec<Action> {
        match self.preview.reset(&mut self.scene) {
            Ok(_) => vec![Action::PreviewChanged(self.preview.state()), Action::RenderNeeded],
            Err(e) => vec![
                Action::Notice(e.to_string()),
                Action::PreviewChanged(self.preview.state()),
                Action::RenderNeeded,
            ],
        }
    }

    /// Advance the preview by one frame.
    pub fn tick(&mut self) -> Vec<Action> {
        if self.preview.step(&mut self.scene) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    fn rescale_preview(&mut self) -> Vec<Action> {
        match self.preview.rescale(&mut self.scene, &self.view, self.viewport) {
            Ok(_) => Vec::new(),
            Err(e) => vec![Action::Notice(e.to_string()), Action::PreviewChanged(self.preview.state())],
        }
    }

    // --- Tool handlers ---

    fn select_down(&mut self, world: Vec2) -> Vec<Action> {
        let mut actions = Vec::new();

        if let Some(id) = self.ui.vertex_edit {
            if let Some(body) = self.scene.body(id) {
                if let Some(index) = hit::hit_test_vertex(body, world, self.config.vertex_hit_m) {
                    let orig_vertices = body.vertices().map(<[Vec2]>::to_vec).unwrap_or_default();
                    self.input = InputState::DraggingVertex { id, index, orig_vertices };
                    return actions;
                }
            }
            self.ui.vertex_edit = None;
        }

        let hit = hit::hit_test(world, &self.scene, &self.view, self.config.anchor_hit_px);
        match hit {
            Some(hit) => {
                match hit.part {
                    HitPart::Anchor(end) => {
                        if let Some(joint) = self.scene.joint(hit.object_id) {
                            let orig_anchor = match end {
                                AnchorEnd::A => joint.anchor_a_local,
                                AnchorEnd::B => joint.anchor_b_local,
                            };
                            self.input = InputState::DraggingAnchor { id: hit.object_id, end, orig_anchor };
                        }
                    }
                    HitPart::Body => {
                        if let Some(body) = self.scene.body(hit.object_id) {
                            self.input = InputState::DraggingBody {
                                id: hit.object_id,
                                grab_offset: body.position - world,
                                orig_position: body.position,
                            };
                        }
                    }
                }
                self.set_selection(Some(hit.object_id), &mut actions);
            }
            None => self.set_selection(None, &mut actions),
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn begin_shape(&mut self, world: Vec2) -> Vec<Action> {
        let body = match self.ui.tool {
            Tool::Circle => Body::new_circle(world, DEFAULT_CIRCLE_RADIUS_M),
            _ => Body::new_box(world, DEFAULT_BOX_SIDE_M, DEFAULT_BOX_SIDE_M),
        };
        self.input = InputState::DrawingShape { id: body.id, start_world: world };
        self.scene.push(body.into());
        vec![Action::RenderNeeded]
    }

    fn add_polygon_point(&mut self, world: Vec2) -> Vec<Action> {
        if self.ui.polygon_points.len() >= MAX_POLYGON_VERTICES {
            return vec![Action::Notice("a polygon can have at most 8 vertices".into())];
        }
        self.ui.polygon_points.push(world);
        vec![Action::RenderNeeded]
    }

    fn joint_click(&mut self, world: Vec2) -> Vec<Action> {
        let Some(id) = hit::hit_test_body(world, &self.scene) else {
            return vec![Action::Notice("click a body to attach the joint".into())];
        };
        let Some(pending) = self.ui.pending_joint else {
            self.ui.pending_joint = Some(PendingJoint { body_a: id, anchor_world: world });
            return vec![Action::Notice("first body picked; click a second body".into()), Action::RenderNeeded];
        };
        if pending.body_a == id {
            return vec![Action::Notice("a joint cannot connect a body to itself".into())];
        }

        self.ui.pending_joint = None;
        let (Some(a), Some(b)) = (self.scene.body(pending.body_a), self.scene.body(id)) else {
            return vec![Action::Notice("the first body no longer exists".into()), Action::RenderNeeded];
        };
        let joint = Joint::revolute(a.id, b.id, a.world_to_local(pending.anchor_world), b.world_to_local(world));
        let mut actions = self.record(Box::new(AddObject::new(joint.into())));
        actions.push(Action::Notice("joint created".into()));
        actions
    }

    fn delete_at(&mut self, world: Vec2) -> Vec<Action> {
        match hit::hit_test(world, &self.scene, &self.view, self.config.anchor_hit_px) {
            Some(hit) => self.delete_object(hit.object_id),
            None => Vec::new(),
        }
    }

    fn delete_object(&mut self, id: ObjectId) -> Vec<Action> {
        let Some(command) = DeleteObject::new(&self.scene, id) else {
            return Vec::new();
        };
        let mut actions = self.record(Box::new(command));
        self.prune_ui(&mut actions);
        actions
    }

    fn drag_anchor(&mut self, id: ObjectId, end: AnchorEnd, world: Vec2) {
        let Some(joint) = self.scene.joint(id) else {
            return;
        };
        let body_id = match end {
            AnchorEnd::A => joint.body_a_id,
            AnchorEnd::B => joint.body_b_id,
        };
        let Some(local) = self.scene.body(body_id).map(|b| b.world_to_local(world)) else {
            return;
        };
        if let Some(joint) = self.scene.joint_mut(id) {
            match end {
                AnchorEnd::A => joint.anchor_a_local = local,
                AnchorEnd::B => joint.anchor_b_local = local,
            }
        }
        self.scene.notify();
    }

    fn finish_vertex_drag(&mut self, id: ObjectId, index: usize, orig_vertices: Vec<Vec2>) -> Vec<Action> {
        let Some(current) = self.scene.body(id).and_then(Body::vertices).map(<[Vec2]>::to_vec) else {
            return Vec::new();
        };
        let moved = match (orig_vertices.get(index), current.get(index)) {
            (Some(a), Some(b)) => (a.x - b.x).abs() > VERTEX_MOVE_EPSILON_M || (a.y - b.y).abs() > VERTEX_MOVE_EPSILON_M,
            _ => false,
        };
        if !moved {
            // Jitter below the threshold is discarded, not left unrecorded.
            if let Some(body) = self.scene.body_mut(id) {
                body.shape = Shape::Polygon { vertices: orig_vertices };
            }
            self.scene.notify();
            return vec![Action::RenderNeeded];
        }
        self.record(Box::new(ModifyProperty::new(id, Property::Vertices(orig_vertices), Property::Vertices(current))))
    }

    // --- Helpers ---

    fn ensure_editable(&self) -> Result<(), EditorError> {
        if self.preview.is_active() { Err(EditorError::PreviewActive) } else { Ok(()) }
    }

    fn record(&mut self, command: Box<dyn Command>) -> Vec<Action> {
        self.history.execute(command, &mut self.scene);
        vec![self.history_changed(), Action::RenderNeeded]
    }

    fn history_changed(&self) -> Action {
        Action::HistoryChanged { can_undo: self.history.can_undo(), can_redo: self.history.can_redo() }
    }

    fn after_history_move(&mut self) -> Vec<Action> {
        let mut actions = vec![self.history_changed(), Action::RenderNeeded];
        self.prune_ui(&mut actions);
        actions
    }

    fn after_replace(&mut self) -> Vec<Action> {
        self.history.clear();
        self.input = InputState::Idle;
        self.ui.cancel_construction();
        let mut actions = vec![self.history_changed(), Action::RenderNeeded];
        self.set_selection(None, &mut actions);
        actions
    }

    fn set_selection(&mut self, id: Option<ObjectId>, actions: &mut Vec<Action>) {
        if self.ui.selected_id != id {
            self.ui.selected_id = id;
            actions.push(Action::SelectionChanged(id));
        }
    }

    /// Drop UI references to objects that are no longer in the scene.
    fn prune_ui(&mut self, actions: &mut Vec<Action>) {
        if self.ui.selected_id.is_some_and(|id| !self.scene.contains(id)) {
            self.set_selection(None, actions);
        }
        if self.ui.vertex_edit.is_some_and(|id| !self.scene.contains(id)) {
            self.ui.vertex_edit = None;
        }
        if self.ui.pending_joint.is_some_and(|p| !self.scene.contains(p.body_a)) {
            self.ui.pending_joint = None;
        }
    }

    /// Abandon the active gesture, putting back whatever it changed.
    fn cancel_gesture(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Panning { .. } => return Vec::new(),
            InputState::DraggingBody { id, orig_position, .. } => {
                if let Some(body) = self.scene.body_mut(id) {
                    body.position = orig_position;
                }
            }
            InputState::DraggingAnchor { id, end, orig_anchor } => {
                if let Some(joint) = self.scene.joint_mut(id) {
                    match end {
                        AnchorEnd::A => joint.anchor_a_local = orig_anchor,
                        AnchorEnd::B => joint.anchor_b_local = orig_anchor,
                    }
                }
            }
            InputState::DraggingVertex { id, orig_vertices, .. } => {
                if let Some(body) = self.scene.body_mut(id) {
                    body.shape = Shape::Polygon { vertices: orig_vertices };
                }
            }
            InputState::DrawingShape { id, .. } => {
                self.scene.remove(id);
            }
        }
        self.scene.notify();
        vec![Action::RenderNeeded]
    }
}

/// Size a provisional box or circle from the drag start to the pointer.
///
/// Boxes span the drag rectangle, centered between its corners. Circles stay
/// centered on the start point with a radius of half the larger extent.
fn size_shape(body: &mut Body, start: Vec2, current: Vec2) {
    let d = current - start;
    match &mut body.shape {
        Shape::Box { width, height } => {
            *width = d.x.abs().max(MIN_BOX_SIDE_M);
            *height = d.y.abs().max(MIN_BOX_SIDE_M);
            body.position = start + d * 0.5;
        }
        Shape::Circle { radius } => {
            *radius = (d.x.abs().max(d.y.abs()) / 2.0).max(MIN_CIRCLE_RADIUS_M);
        }
        Shape::Polygon { .. } => {}
    }
}
