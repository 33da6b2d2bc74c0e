#![allow(clippy::float_cmp)]

use super::*;
use crate::command::PropertyKey;
use crate::doc::{BodyKind, SceneObject};
use crate::sim::fake::FakeEngine;

// =============================================================
// Helpers
// =============================================================

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn ctrl() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn key(name: &str) -> Key {
    Key::new(name)
}

/// Screen point for a world point under the core's current view.
fn screen(core: &EditorCore, x: f64, y: f64) -> Vec2 {
    core.view.to_screen(Vec2::new(x, y), core.viewport)
}

fn click(core: &mut EditorCore, x: f64, y: f64) -> Vec<Action> {
    let pt = screen(core, x, y);
    let mut actions = core.on_pointer_down(pt, Button::Primary, no_modifiers());
    actions.extend(core.on_pointer_up(pt, Button::Primary, no_modifiers()));
    actions
}

fn drag(core: &mut EditorCore, from: (f64, f64), to: (f64, f64)) -> Vec<Action> {
    let start = screen(core, from.0, from.1);
    let end = screen(core, to.0, to.1);
    let mut actions = core.on_pointer_down(start, Button::Primary, no_modifiers());
    actions.extend(core.on_pointer_move(end, no_modifiers()));
    actions.extend(core.on_pointer_up(end, Button::Primary, no_modifiers()));
    actions
}

fn with_bodies(bodies: Vec<Body>) -> EditorCore {
    let mut core = EditorCore::new();
    for body in bodies {
        core.scene.push(body.into());
    }
    core
}

fn with_engine(core: &mut EditorCore) -> FakeEngine {
    let engine = FakeEngine::new();
    core.set_engine(Box::new(engine.clone()));
    engine
}

fn only_body(core: &EditorCore) -> &Body {
    assert_eq!(core.scene.body_count(), 1);
    core.scene.bodies().next().unwrap()
}

fn has_notice(actions: &[Action]) -> bool {
    actions.iter().any(|a| matches!(a, Action::Notice(_)))
}

fn has_history_changed(actions: &[Action]) -> bool {
    actions.iter().any(|a| matches!(a, Action::HistoryChanged { .. }))
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_core_is_empty() {
    let core = EditorCore::new();
    assert!(core.scene.is_empty());
    assert!(core.selection().is_none());
    assert_eq!(core.view.pixels_per_meter, 20.0);
    assert_eq!(core.history.capacity(), 50);
    assert_eq!(core.preview_state(), PreviewState::Idle);
    assert!(core.input.is_idle());
}

#[test]
fn with_config_applies_settings() {
    let config = EditorConfig { history_capacity: 5, default_ppm: 30.0, ..EditorConfig::default() };
    let core = EditorCore::with_config(config);
    assert_eq!(core.history.capacity(), 5);
    assert_eq!(core.view.pixels_per_meter, 30.0);
    assert_eq!(core.config().history_capacity, 5);
}

// =============================================================
// Rect / circle tools
// =============================================================

#[test]
fn rect_drag_creates_box_between_corners() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Rect);
    let actions = drag(&mut core, (0.0, 0.0), (2.0, 1.0));

    let body = only_body(&core);
    assert_eq!(body.shape, Shape::Box { width: 2.0, height: 1.0 });
    assert!(vec_approx_eq(body.position, Vec2::new(1.0, 0.5)));
    assert_eq!(core.history.len(), 1);
    assert!(has_history_changed(&actions));
}

#[test]
fn rect_click_without_drag_keeps_default_size() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Rect);
    click(&mut core, 3.0, 4.0);
    let body = only_body(&core);
    assert_eq!(body.shape, Shape::Box { width: 1.0, height: 1.0 });
    assert_eq!(body.position, Vec2::new(3.0, 4.0));
}

#[test]
fn rect_drag_clamps_to_minimum_side() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Rect);
    drag(&mut core, (0.0, 0.0), (0.1, 3.0));
    assert_eq!(only_body(&core).shape, Shape::Box { width: 0.5, height: 3.0 });
}

#[test]
fn circle_drag_grows_radius_around_start() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Circle);
    drag(&mut core, (0.0, 0.0), (3.0, -1.0));
    let body = only_body(&core);
    assert_eq!(body.shape, Shape::Circle { radius: 1.5 });
    assert_eq!(body.position, Vec2::ZERO);
}

#[test]
fn circle_drag_clamps_to_minimum_radius() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Circle);
    drag(&mut core, (0.0, 0.0), (0.1, 0.1));
    assert_eq!(only_body(&core).shape, Shape::Circle { radius: 0.25 });
}

#[test]
fn drawn_shape_undoes_in_one_step() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Rect);
    drag(&mut core, (0.0, 0.0), (2.0, 2.0));
    assert!(!core.undo().is_empty());
    assert!(core.scene.is_empty());
    core.redo();
    assert_eq!(core.scene.len(), 1);
}

#[test]
fn escape_discards_shape_being_drawn() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Rect);
    let start = screen(&core, 0.0, 0.0);
    core.on_pointer_down(start, Button::Primary, no_modifiers());
    assert_eq!(core.scene.len(), 1);
    core.on_key_down(&key("Escape"), no_modifiers());
    assert!(core.scene.is_empty());
    assert!(core.history.is_empty());
    assert!(core.input.is_idle());
}

// =============================================================
// Select tool
// =============================================================

#[test]
fn click_selects_and_empty_click_clears() {
    let body = Body::new_box(Vec2::ZERO, 2.0, 2.0);
    let id = body.id;
    let mut core = with_bodies(vec![body]);

    let actions = click(&mut core, 0.5, 0.5);
    assert_eq!(core.selection(), Some(id));
    assert!(actions.contains(&Action::SelectionChanged(Some(id))));

    let actions = click(&mut core, 10.0, 10.0);
    assert_eq!(core.selection(), None);
    assert!(actions.contains(&Action::SelectionChanged(None)));
}

#[test]
fn click_without_move_records_nothing() {
    let mut core = with_bodies(vec![Body::new_box(Vec2::ZERO, 2.0, 2.0)]);
    click(&mut core, 0.0, 0.0);
    assert!(core.history.is_empty());
}

#[test]
fn drag_moves_body_with_one_command() {
    let body = Body::new_box(Vec2::ZERO, 2.0, 2.0);
    let id = body.id;
    let mut core = with_bodies(vec![body]);

    drag(&mut core, (0.5, 0.5), (3.5, 2.5));
    assert!(vec_approx_eq(core.scene.body(id).unwrap().position, Vec2::new(3.0, 2.0)));
    assert_eq!(core.history.len(), 1);
    assert_eq!(core.history.undo_label(), Some("Move object"));

    core.undo();
    assert_eq!(core.scene.body(id).unwrap().position, Vec2::ZERO);
}

#[test]
fn drag_through_intermediate_moves_records_once() {
    let mut core = with_bodies(vec![Body::new_box(Vec2::ZERO, 2.0, 2.0)]);
    let start = screen(&core, 0.0, 0.0);
    core.on_pointer_down(start, Button::Primary, no_modifiers());
    for i in 1..=5 {
        let pt = screen(&core, f64::from(i), 0.0);
        core.on_pointer_move(pt, no_modifiers());
    }
    let end = screen(&core, 5.0, 0.0);
    core.on_pointer_up(end, Button::Primary, no_modifiers());
    assert_eq!(core.history.len(), 1);
}

#[test]
fn anchor_drag_records_modify_property() {
    let a = Body::new_box(Vec2::ZERO, 2.0, 2.0);
    let b = Body::new_box(Vec2::new(2.0, 0.0), 2.0, 2.0);
    let joint = Joint::revolute(a.id, b.id, Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0));
    let joint_id = joint.id;
    let mut core = with_bodies(vec![a, b]);
    core.scene.push(joint.into());

    drag(&mut core, (1.0, 0.0), (1.0, 1.0));
    let joint = core.scene.joint(joint_id).unwrap();
    assert!(vec_approx_eq(joint.anchor_a_local, Vec2::new(1.0, 1.0)));
    assert_eq!(joint.anchor_b_local, Vec2::new(-1.0, 0.0));
    assert_eq!(core.selection(), Some(joint_id));
    assert_eq!(core.history.len(), 1);

    core.undo();
    assert_eq!(core.scene.joint(joint_id).unwrap().anchor_a_local, Vec2::new(1.0, 0.0));
}

// =============================================================
// Vertex editing
// =============================================================

fn triangle_core() -> (EditorCore, ObjectId) {
    let body = Body::new_polygon(Vec2::ZERO, vec![Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(0.0, 1.0)]);
    let id = body.id;
    (with_bodies(vec![body]), id)
}

#[test]
fn double_click_toggles_vertex_edit() {
    let (mut core, id) = triangle_core();
    let pt = screen(&core, 0.0, 0.0);
    core.on_double_click(pt);
    assert_eq!(core.ui.vertex_edit, Some(id));
    assert_eq!(core.selection(), Some(id));
    core.on_double_click(pt);
    assert_eq!(core.ui.vertex_edit, None);
}

#[test]
fn double_click_on_box_does_not_enter_vertex_edit() {
    let mut core = with_bodies(vec![Body::new_box(Vec2::ZERO, 2.0, 2.0)]);
    let pt = screen(&core, 0.0, 0.0);
    core.on_double_click(pt);
    assert_eq!(core.ui.vertex_edit, None);
}

#[test]
fn vertex_drag_records_whole_ring() {
    let (mut core, id) = triangle_core();
    let pt = screen(&core, 0.0, 0.0);
    core.on_double_click(pt);

    drag(&mut core, (1.0, -1.0), (2.0, -1.0));
    let ring = core.scene.body(id).unwrap().vertices().unwrap().to_vec();
    assert!(vec_approx_eq(ring[1], Vec2::new(2.0, -1.0)));
    assert_eq!(core.history.len(), 1);
    assert_eq!(core.ui.vertex_edit, Some(id));

    core.undo();
    assert_eq!(core.scene.body(id).unwrap().vertices().unwrap()[1], Vec2::new(1.0, -1.0));
}

#[test]
fn vertex_jitter_is_discarded() {
    let (mut core, id) = triangle_core();
    let pt = screen(&core, 0.0, 0.0);
    core.on_double_click(pt);

    drag(&mut core, (1.0, -1.0), (1.005, -1.0));
    assert!(core.history.is_empty());
    assert_eq!(core.scene.body(id).unwrap().vertices().unwrap()[1], Vec2::new(1.0, -1.0));
}

#[test]
fn click_off_vertices_leaves_vertex_edit() {
    let (mut core, _) = triangle_core();
    let pt = screen(&core, 0.0, 0.0);
    core.on_double_click(pt);
    click(&mut core, 10.0, 10.0);
    assert_eq!(core.ui.vertex_edit, None);
}

// =============================================================
// Polygon tool
// =============================================================

#[test]
fn polygon_double_click_centers_ring_on_centroid() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Polygon);
    click(&mut core, 0.0, 0.0);
    click(&mut core, 3.0, 0.0);
    click(&mut core, 0.0, 3.0);
    // Second press of the double-click.
    click(&mut core, 0.0, 3.0);
    let pt = screen(&core, 0.0, 3.0);
    core.on_double_click(pt);

    let body = only_body(&core);
    assert!(vec_approx_eq(body.position, Vec2::new(1.0, 1.0)));
    let ring = body.vertices().unwrap();
    assert_eq!(ring.len(), 3);
    assert!(vec_approx_eq(ring[0], Vec2::new(-1.0, -1.0)));
    assert!(vec_approx_eq(ring[1], Vec2::new(2.0, -1.0)));
    assert!(vec_approx_eq(ring[2], Vec2::new(-1.0, 2.0)));
    assert!(core.ui.polygon_points.is_empty());
    assert_eq!(core.history.len(), 1);
}

#[test]
fn polygon_needs_three_vertices() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Polygon);
    click(&mut core, 0.0, 0.0);
    click(&mut core, 1.0, 0.0);
    let actions = core.finish_polygon();
    assert!(has_notice(&actions));
    assert!(core.scene.is_empty());
    assert_eq!(core.ui.polygon_points.len(), 2);
}

#[test]
fn polygon_stops_at_eight_vertices() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Polygon);
    for i in 0..8 {
        click(&mut core, f64::from(i), f64::from(i % 2));
    }
    let actions = click(&mut core, 20.0, 20.0);
    assert!(has_notice(&actions));
    assert_eq!(core.ui.polygon_points.len(), 8);
}

#[test]
fn switching_tool_drops_polygon_in_progress() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Polygon);
    click(&mut core, 0.0, 0.0);
    core.set_tool(Tool::Select);
    assert!(core.ui.polygon_points.is_empty());
}

// =============================================================
// Joint tool
// =============================================================

#[test]
fn joint_tool_links_two_bodies() {
    let a = Body::new_box(Vec2::ZERO, 2.0, 2.0);
    let b = Body::new_box(Vec2::new(3.0, 0.0), 2.0, 2.0);
    let (a_id, b_id) = (a.id, b.id);
    let mut core = with_bodies(vec![a, b]);
    core.set_tool(Tool::RevoluteJoint);

    let actions = click(&mut core, 0.5, 0.0);
    assert!(has_notice(&actions));
    assert!(core.ui.pending_joint.is_some());

    click(&mut core, 3.0, 0.5);
    let joint = core.scene.joints().next().unwrap();
    assert_eq!(joint.body_a_id, a_id);
    assert_eq!(joint.body_b_id, b_id);
    assert!(vec_approx_eq(joint.anchor_a_local, Vec2::new(0.5, 0.0)));
    assert!(vec_approx_eq(joint.anchor_b_local, Vec2::new(0.0, 0.5)));
    assert!(joint.collide_connected);
    assert!(core.ui.pending_joint.is_none());
    assert_eq!(core.history.len(), 1);
}

#[test]
fn joint_tool_refuses_same_body() {
    let mut core = with_bodies(vec![Body::new_box(Vec2::ZERO, 2.0, 2.0)]);
    core.set_tool(Tool::RevoluteJoint);
    click(&mut core, 0.0, 0.0);
    let actions = click(&mut core, 0.5, 0.5);
    assert!(has_notice(&actions));
    assert_eq!(core.scene.joints().count(), 0);
    assert!(core.ui.pending_joint.is_some());
}

#[test]
fn joint_tool_needs_a_body() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::RevoluteJoint);
    let actions = click(&mut core, 0.0, 0.0);
    assert!(has_notice(&actions));
    assert!(core.ui.pending_joint.is_none());
}

#[test]
fn joint_anchor_uses_rotated_local_frame() {
    let mut a = Body::new_box(Vec2::ZERO, 2.0, 2.0);
    a.angle = std::f64::consts::FRAC_PI_2;
    let b = Body::new_box(Vec2::new(3.0, 0.0), 2.0, 2.0);
    let mut core = with_bodies(vec![a, b]);
    core.set_tool(Tool::RevoluteJoint);
    click(&mut core, 0.0, 0.5);
    click(&mut core, 3.0, 0.0);
    let joint = core.scene.joints().next().unwrap();
    // World +Y is local +X after a quarter turn.
    assert!(vec_approx_eq(joint.anchor_a_local, Vec2::new(0.5, 0.0)));
}

// =============================================================
// Delete
// =============================================================

#[test]
fn delete_tool_removes_and_undo_restores_order() {
    let bodies = vec![
        Body::new_circle(Vec2::new(-5.0, 0.0), 1.0),
        Body::new_circle(Vec2::ZERO, 1.0),
        Body::new_circle(Vec2::new(5.0, 0.0), 1.0),
    ];
    let middle = bodies[1].id;
    let mut core = with_bodies(bodies);
    let before: Vec<SceneObject> = core.scene.objects().to_vec();

    core.set_tool(Tool::Delete);
    click(&mut core, 0.0, 0.0);
    assert!(!core.scene.contains(middle));

    core.undo();
    assert_eq!(core.scene.objects(), before.as_slice());
}

#[test]
fn delete_key_removes_selection() {
    let body = Body::new_box(Vec2::ZERO, 2.0, 2.0);
    let id = body.id;
    let mut core = with_bodies(vec![body]);
    click(&mut core, 0.0, 0.0);
    let actions = core.on_key_down(&key("Delete"), no_modifiers());
    assert!(!core.scene.contains(id));
    assert_eq!(core.selection(), None);
    assert!(actions.contains(&Action::SelectionChanged(None)));
}

#[test]
fn delete_with_nothing_selected_is_noop() {
    let mut core = with_bodies(vec![Body::new_box(Vec2::ZERO, 2.0, 2.0)]);
    assert!(core.delete_selected().is_empty());
    assert_eq!(core.scene.len(), 1);
}

#[test]
fn deleting_body_keeps_its_joints() {
    let a = Body::new_box(Vec2::ZERO, 2.0, 2.0);
    let b = Body::new_box(Vec2::new(5.0, 0.0), 2.0, 2.0);
    let joint = Joint::revolute(a.id, b.id, Vec2::ZERO, Vec2::ZERO);
    let joint_id = joint.id;
    let mut core = with_bodies(vec![a, b]);
    core.scene.push(joint.into());
    // Well clear of the anchor at the body center.
    click(&mut core, 5.8, 0.8);
    core.delete_selected();
    assert!(core.scene.contains(joint_id));
    assert_eq!(core.scene.dangling_joints(), vec![joint_id]);
}

// =============================================================
// Keyboard shortcuts
// =============================================================

#[test]
fn ctrl_z_and_ctrl_y_walk_history() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Circle);
    click(&mut core, 0.0, 0.0);

    let actions = core.on_key_down(&key("z"), ctrl());
    assert!(actions.contains(&Action::HistoryChanged { can_undo: false, can_redo: true }));
    assert!(core.scene.is_empty());

    let actions = core.on_key_down(&key("y"), ctrl());
    assert!(actions.contains(&Action::HistoryChanged { can_undo: true, can_redo: false }));
    assert_eq!(core.scene.len(), 1);
}

#[test]
fn ctrl_shift_z_redoes() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Circle);
    click(&mut core, 0.0, 0.0);
    core.undo();
    core.on_key_down(&key("Z"), Modifiers { ctrl: true, shift: true, ..Default::default() });
    assert_eq!(core.scene.len(), 1);
}

#[test]
fn plain_z_does_nothing() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Circle);
    click(&mut core, 0.0, 0.0);
    assert!(core.on_key_down(&key("z"), no_modifiers()).is_empty());
    assert_eq!(core.scene.len(), 1);
}

#[test]
fn undo_clears_selection_of_removed_object() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Circle);
    click(&mut core, 0.0, 0.0);
    core.set_tool(Tool::Select);
    click(&mut core, 0.0, 0.0);
    assert!(core.selection().is_some());
    let actions = core.undo();
    assert_eq!(core.selection(), None);
    assert!(actions.contains(&Action::SelectionChanged(None)));
}

#[test]
fn history_capacity_applies_through_editor() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Circle);
    for i in 0..51 {
        click(&mut core, f64::from(i) * 3.0 - 75.0, 0.0);
    }
    assert_eq!(core.history.len(), 50);
    while !core.undo().is_empty() {}
    assert_eq!(core.scene.len(), 1);
}

// =============================================================
// View: wheel and pan
// =============================================================

#[test]
fn wheel_up_zooms_in_one_step() {
    let mut core = EditorCore::new();
    let pt = screen(&core, 2.0, 3.0);
    let actions = core.on_wheel(pt, WheelDelta { dx: 0.0, dy: -100.0 }, no_modifiers());
    assert_eq!(core.view.pixels_per_meter, 21.0);
    assert!(actions.contains(&Action::RenderNeeded));
    // The point under the cursor stays put.
    assert!(vec_approx_eq(core.to_world(pt), Vec2::new(2.0, 3.0)));
}

#[test]
fn wheel_down_zooms_out() {
    let mut core = EditorCore::new();
    core.on_wheel(Vec2::ZERO, WheelDelta { dx: 0.0, dy: 10.0 }, no_modifiers());
    assert_eq!(core.view.pixels_per_meter, 19.0);
}

#[test]
fn wheel_at_limit_is_noop() {
    let mut core = EditorCore::new();
    core.set_pixels_per_meter(50.0);
    let actions = core.on_wheel(Vec2::ZERO, WheelDelta { dx: 0.0, dy: -1.0 }, no_modifiers());
    assert!(actions.is_empty());
    assert_eq!(core.view.pixels_per_meter, 50.0);
}

#[test]
fn horizontal_scroll_does_not_zoom() {
    let mut core = EditorCore::new();
    assert!(core.on_wheel(Vec2::ZERO, WheelDelta { dx: 5.0, dy: 0.0 }, no_modifiers()).is_empty());
    assert_eq!(core.view.pixels_per_meter, 20.0);
}

#[test]
fn set_pixels_per_meter_clamps() {
    let mut core = EditorCore::new();
    core.set_pixels_per_meter(500.0);
    assert_eq!(core.view.pixels_per_meter, 50.0);
    core.set_pixels_per_meter(1.0);
    assert_eq!(core.view.pixels_per_meter, 5.0);
}

#[test]
fn middle_drag_pans() {
    let mut core = EditorCore::new();
    core.on_pointer_down(Vec2::new(400.0, 300.0), Button::Middle, no_modifiers());
    core.on_pointer_move(Vec2::new(420.0, 280.0), no_modifiers());
    core.on_pointer_up(Vec2::new(420.0, 280.0), Button::Middle, no_modifiers());
    assert!(vec_approx_eq(core.view.origin, Vec2::new(-1.0, -1.0)));
    assert!(core.history.is_empty());
}

#[test]
fn middle_click_while_drawing_keeps_shape_undoable() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Rect);
    let start = screen(&core, 0.0, 0.0);
    let end = screen(&core, 2.0, 1.0);
    core.on_pointer_down(start, Button::Primary, no_modifiers());
    core.on_pointer_move(end, no_modifiers());
    core.on_pointer_down(end, Button::Middle, no_modifiers());
    assert!(core.on_pointer_up(end, Button::Middle, no_modifiers()).is_empty());
    assert_eq!(core.view.origin, Vec2::ZERO);

    core.on_pointer_up(end, Button::Primary, no_modifiers());
    assert_eq!(only_body(&core).shape, Shape::Box { width: 2.0, height: 1.0 });
    assert_eq!(core.history.len(), 1);

    core.undo();
    assert_eq!(core.scene.body_count(), 0);
}

#[test]
fn middle_click_while_moving_keeps_move_undoable() {
    let body = Body::new_box(Vec2::ZERO, 2.0, 2.0);
    let id = body.id;
    let mut core = with_bodies(vec![body]);
    core.on_pointer_down(screen(&core, 0.0, 0.0), Button::Primary, no_modifiers());
    let mid = screen(&core, 2.0, 0.0);
    core.on_pointer_move(mid, no_modifiers());
    core.on_pointer_down(mid, Button::Middle, no_modifiers());
    core.on_pointer_up(mid, Button::Middle, no_modifiers());
    let end = screen(&core, 5.0, 0.0);
    core.on_pointer_move(end, no_modifiers());
    core.on_pointer_up(end, Button::Primary, no_modifiers());

    assert!(vec_approx_eq(core.scene.body(id).unwrap().position, Vec2::new(5.0, 0.0)));
    assert_eq!(core.history.len(), 1);
    core.undo();
    assert_eq!(core.scene.body(id).unwrap().position, Vec2::ZERO);
}

#[test]
fn secondary_release_does_not_end_primary_drag() {
    let body = Body::new_box(Vec2::ZERO, 2.0, 2.0);
    let id = body.id;
    let mut core = with_bodies(vec![body]);
    core.on_pointer_down(screen(&core, 0.0, 0.0), Button::Primary, no_modifiers());
    let mid = screen(&core, 1.0, 0.0);
    core.on_pointer_move(mid, no_modifiers());
    assert!(core.on_pointer_up(mid, Button::Secondary, no_modifiers()).is_empty());
    assert!(core.history.is_empty());

    let end = screen(&core, 3.0, 0.0);
    core.on_pointer_move(end, no_modifiers());
    core.on_pointer_up(end, Button::Primary, no_modifiers());
    assert!(vec_approx_eq(core.scene.body(id).unwrap().position, Vec2::new(3.0, 0.0)));
    assert_eq!(core.history.len(), 1);
}

#[test]
fn reset_view_restores_default() {
    let mut core = EditorCore::new();
    core.set_pixels_per_meter(35.0);
    core.set_origin(Vec2::new(4.0, 4.0));
    core.reset_view();
    assert_eq!(core.view.pixels_per_meter, 20.0);
    assert_eq!(core.view.origin, Vec2::ZERO);
}

#[test]
fn set_viewport_reports_change_once() {
    let mut core = EditorCore::new();
    assert!(!core.set_viewport(1024.0, 768.0).is_empty());
    assert!(core.set_viewport(1024.0, 768.0).is_empty());
    assert_eq!(core.viewport, Viewport::new(1024.0, 768.0));
}

// =============================================================
// Preview
// =============================================================

fn falling_box_core() -> (EditorCore, FakeEngine, ObjectId) {
    let ground = Body::new_box(Vec2::new(0.0, -2.0), 10.0, 1.0).with_kind(BodyKind::Static);
    let crate_ = Body::new_box(Vec2::new(0.0, 5.0), 1.0, 1.0);
    let id = crate_.id;
    let mut core = with_bodies(vec![ground, crate_]);
    let engine = with_engine(&mut core);
    (core, engine, id)
}

#[test]
fn space_enters_and_escape_exits_preview() {
    let (mut core, _, id) = falling_box_core();
    let actions = core.on_key_down(&key(" "), no_modifiers());
    assert!(actions.contains(&Action::PreviewChanged(PreviewState::Running)));

    for _ in 0..20 {
        assert!(!core.tick().is_empty());
    }
    assert!(core.scene.body(id).unwrap().position.y < 5.0);

    let actions = core.on_key_down(&key("Escape"), no_modifiers());
    assert!(actions.contains(&Action::PreviewChanged(PreviewState::Idle)));
    assert_eq!(core.scene.body(id).unwrap().position, Vec2::new(0.0, 5.0));
    assert!(core.history.is_empty());
}

#[test]
fn preview_without_engine_gives_notice() {
    let mut core = with_bodies(vec![Body::new_box(Vec2::ZERO, 1.0, 1.0)]);
    let actions = core.toggle_preview();
    assert!(has_notice(&actions));
    assert_eq!(core.preview_state(), PreviewState::Idle);
}

#[test]
fn preview_of_empty_scene_gives_notice() {
    let mut core = EditorCore::new();
    with_engine(&mut core);
    assert!(has_notice(&core.toggle_preview()));
    assert_eq!(core.preview_state(), PreviewState::Idle);
}

#[test]
fn editing_is_blocked_during_preview() {
    let (mut core, _, id) = falling_box_core();
    core.set_tool(Tool::Rect);
    click(&mut core, 8.0, 8.0);
    core.undo();
    core.toggle_preview();

    assert!(click(&mut core, 0.0, 5.0).is_empty());
    assert!(core.on_key_down(&key("z"), ctrl()).is_empty());
    assert!(core.on_key_down(&key("y"), ctrl()).is_empty());
    assert!(core.on_key_down(&key("Delete"), no_modifiers()).is_empty());
    assert!(core.set_tool(Tool::Select).is_empty());
    assert!(matches!(core.modify_property(id, Property::Friction(0.9)), Err(EditorError::PreviewActive)));
    assert!(matches!(core.save_scene_json(), Err(EditorError::PreviewActive)));
    assert!(matches!(core.load_scene_json("[]"), Err(EditorError::PreviewActive)));
    assert_eq!(core.scene.len(), 2);
    assert!(core.history.can_redo());
}

#[test]
fn zoom_during_preview_rescales() {
    let (mut core, engine, _) = falling_box_core();
    core.toggle_preview();
    core.on_wheel(Vec2::new(400.0, 300.0), WheelDelta { dx: 0.0, dy: -1.0 }, no_modifiers());
    assert_eq!(engine.log.borrow().worlds.len(), 2);
    assert_eq!(core.preview.frame().unwrap().pixels_per_meter, 21.0);
    assert_eq!(core.preview_state(), PreviewState::Running);
}

#[test]
fn pan_during_preview_rescales_on_release() {
    let (mut core, engine, _) = falling_box_core();
    core.toggle_preview();
    core.on_pointer_down(Vec2::new(400.0, 300.0), Button::Middle, no_modifiers());
    core.on_pointer_move(Vec2::new(440.0, 300.0), no_modifiers());
    assert_eq!(engine.log.borrow().worlds.len(), 1);
    core.on_pointer_up(Vec2::new(440.0, 300.0), Button::Middle, no_modifiers());
    assert_eq!(engine.log.borrow().worlds.len(), 2);
    assert_eq!(core.preview.frame().unwrap().origin, Vec2::new(-2.0, 0.0));
}

#[test]
fn failed_rescale_exits_preview() {
    let (mut core, engine, id) = falling_box_core();
    core.toggle_preview();
    core.tick();
    engine.fail_world.set(true);
    let actions = core.set_pixels_per_meter(30.0);
    assert!(has_notice(&actions));
    assert!(actions.contains(&Action::PreviewChanged(PreviewState::Idle)));
    assert_eq!(core.scene.body(id).unwrap().position, Vec2::new(0.0, 5.0));
}

#[test]
fn pause_and_reset_preview() {
    let (mut core, _, id) = falling_box_core();
    core.toggle_preview();
    core.tick();
    assert_eq!(core.toggle_pause(), vec![Action::PreviewChanged(PreviewState::Paused)]);
    assert!(core.tick().is_empty());

    core.reset_preview();
    assert_eq!(core.preview_state(), PreviewState::Running);
    assert_eq!(core.scene.body(id).unwrap().position, Vec2::new(0.0, 5.0));
}

#[test]
fn entering_preview_cancels_polygon() {
    let (mut core, _, _) = falling_box_core();
    core.set_tool(Tool::Polygon);
    click(&mut core, 20.0, 20.0);
    core.toggle_preview();
    assert!(core.ui.polygon_points.is_empty());
}

// =============================================================
// Properties
// =============================================================

#[test]
fn modify_property_records_command() {
    let body = Body::new_box(Vec2::ZERO, 1.0, 1.0);
    let id = body.id;
    let mut core = with_bodies(vec![body]);
    let actions = core.modify_property(id, Property::Friction(0.9)).unwrap();
    assert!(has_history_changed(&actions));
    assert_eq!(core.scene.body(id).unwrap().friction, 0.9);
    core.undo();
    assert_eq!(core.scene.body(id).unwrap().friction, 0.3);
}

#[test]
fn modify_property_noop_records_nothing() {
    let body = Body::new_box(Vec2::ZERO, 1.0, 1.0);
    let id = body.id;
    let mut core = with_bodies(vec![body]);
    assert!(core.modify_property(id, Property::Friction(0.3)).unwrap().is_empty());
    assert!(core.history.is_empty());
}

#[test]
fn modify_property_rejects_wrong_field() {
    let body = Body::new_box(Vec2::ZERO, 1.0, 1.0);
    let id = body.id;
    let mut core = with_bodies(vec![body]);
    let err = core.modify_property(id, Property::Radius(2.0)).unwrap_err();
    assert!(matches!(
        err,
        EditorError::Property(PropertyError::NotApplicable { key: PropertyKey::Radius, .. })
    ));
    assert!(core.history.is_empty());
}

// =============================================================
// Files
// =============================================================

#[test]
fn save_empty_scene_is_refused() {
    let core = EditorCore::new();
    assert!(matches!(core.save_scene_json(), Err(EditorError::Save(SaveError::EmptyScene))));
}

#[test]
fn save_and_load_round_trip_clears_history() {
    let mut source = EditorCore::new();
    source.set_tool(Tool::Rect);
    drag(&mut source, (0.0, 0.0), (2.0, 3.0));
    let json = source.save_scene_json().unwrap();

    let mut target = EditorCore::new();
    target.set_tool(Tool::Circle);
    click(&mut target, 9.0, 9.0);
    let actions = target.load_scene_json(&json).unwrap();

    assert_eq!(target.scene.objects(), source.scene.objects());
    assert!(target.history.is_empty());
    assert!(actions.contains(&Action::HistoryChanged { can_undo: false, can_redo: false }));
}

#[test]
fn failed_load_keeps_scene() {
    let mut core = with_bodies(vec![Body::new_box(Vec2::ZERO, 1.0, 1.0)]);
    let export = core.export_json().unwrap();
    let err = core.load_scene_json(&export).unwrap_err();
    assert!(matches!(err, EditorError::Load(LoadError::ExportFormat)));
    assert_eq!(core.scene.len(), 1);
}

#[test]
fn new_scene_clears_everything() {
    let mut core = EditorCore::new();
    core.set_tool(Tool::Circle);
    click(&mut core, 0.0, 0.0);
    core.new_scene().unwrap();
    assert!(core.scene.is_empty());
    assert!(core.history.is_empty());
}
