use super::*;
use designer::doc::Body;
use designer::editor::EditorCore;
use designer::preview::PreviewState;

fn make_world() -> Box<dyn SimWorld> {
    let def = WorldDef { gravity: Vec2::new(0.0, 300.0), bound: 10_000.0, allow_sleep: true };
    RapierEngine.create_world(&def).unwrap()
}

fn make_box(kind: BodyKind, x: f64, y: f64) -> SimBodyDef {
    SimBodyDef {
        kind,
        position: Vec2::new(x, y),
        angle: 0.0,
        shape: SimShape::Box { half_width: 10.0, half_height: 10.0 },
        density: if kind == BodyKind::Static { 0.0 } else { 1.0 },
        friction: 0.3,
        restitution: 0.5,
        linear_damping: 0.0,
        angular_damping: 0.0,
        gravity_scale: 1.0,
        fixed_rotation: false,
        allow_sleep: true,
    }
}

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

// =============================================================
// World
// =============================================================

#[test]
fn engine_name() {
    assert_eq!(RapierEngine.name(), "rapier2d");
}

#[test]
fn rejects_non_finite_gravity() {
    let def = WorldDef { gravity: Vec2::new(0.0, f64::NAN), bound: 100.0, allow_sleep: true };
    assert!(matches!(RapierEngine.create_world(&def), Err(EngineError::World(_))));
}

#[test]
fn rejects_zero_bound() {
    let def = WorldDef { gravity: Vec2::ZERO, bound: 0.0, allow_sleep: true };
    assert!(matches!(RapierEngine.create_world(&def), Err(EngineError::World(_))));
}

// =============================================================
// Bodies
// =============================================================

#[test]
fn dynamic_body_falls_down_the_screen() {
    let mut world = make_world();
    let handle = world.create_body(&make_box(BodyKind::Dynamic, 100.0, 100.0)).unwrap();
    for _ in 0..30 {
        world.step(1.0 / 60.0, 10);
    }
    let pose = world.body_pose(handle).unwrap();
    assert!(pose.position.y > 100.0, "{pose:?}");
    assert!(close(pose.position.x, 100.0, 1e-3));
    assert!(world.body_velocity(handle).unwrap().linear.y > 0.0);
}

#[test]
fn static_body_stays_put() {
    let mut world = make_world();
    let handle = world.create_body(&make_box(BodyKind::Static, 50.0, 60.0)).unwrap();
    for _ in 0..30 {
        world.step(1.0 / 60.0, 10);
    }
    let pose = world.body_pose(handle).unwrap();
    assert!(close(pose.position.x, 50.0, 1e-6));
    assert!(close(pose.position.y, 60.0, 1e-6));
}

#[test]
fn kinematic_body_keeps_its_velocity() {
    let mut world = make_world();
    let handle = world.create_body(&make_box(BodyKind::Kinematic, 0.0, 0.0)).unwrap();
    world.set_body_velocity(handle, SimVelocity { linear: Vec2::new(60.0, 0.0), angular: 0.0 }).unwrap();
    for _ in 0..60 {
        world.step(1.0 / 60.0, 10);
    }
    let pose = world.body_pose(handle).unwrap();
    assert!(close(pose.position.x, 60.0, 0.5), "{pose:?}");
    assert!(close(pose.position.y, 0.0, 1e-6));
}

#[test]
fn pose_keeps_initial_angle() {
    let mut world = make_world();
    let mut def = make_box(BodyKind::Static, 0.0, 0.0);
    def.angle = 0.5;
    let handle = world.create_body(&def).unwrap();
    assert!(close(world.body_pose(handle).unwrap().angle, 0.5, 1e-6));
}

#[test]
fn body_outside_bound_is_rejected() {
    let mut world = make_world();
    let result = world.create_body(&make_box(BodyKind::Dynamic, 20_000.0, 0.0));
    assert!(matches!(result, Err(EngineError::BodyRejected(_))));
}

#[test]
fn circle_and_polygon_bodies_are_accepted() {
    let mut world = make_world();
    let mut circle = make_box(BodyKind::Dynamic, 0.0, 0.0);
    circle.shape = SimShape::Circle { radius: 5.0 };
    let mut polygon = make_box(BodyKind::Dynamic, 50.0, 0.0);
    polygon.shape =
        SimShape::Polygon { vertices: vec![Vec2::new(0.0, -10.0), Vec2::new(10.0, 10.0), Vec2::new(-10.0, 10.0)] };
    assert_eq!(world.create_body(&circle).unwrap(), SimBodyHandle(0));
    assert_eq!(world.create_body(&polygon).unwrap(), SimBodyHandle(1));
}

#[test]
fn velocity_round_trips() {
    let mut world = make_world();
    let handle = world.create_body(&make_box(BodyKind::Dynamic, 0.0, 0.0)).unwrap();
    world.set_body_velocity(handle, SimVelocity { linear: Vec2::new(3.0, -4.0), angular: 1.5 }).unwrap();
    let v = world.body_velocity(handle).unwrap();
    assert!(close(v.linear.x, 3.0, 1e-6));
    assert!(close(v.linear.y, -4.0, 1e-6));
    assert!(close(v.angular, 1.5, 1e-6));
}

#[test]
fn unknown_handle_is_reported() {
    let mut world = make_world();
    assert!(world.body_pose(SimBodyHandle(7)).is_none());
    assert!(world.body_velocity(SimBodyHandle(7)).is_none());
    let result = world.set_body_velocity(SimBodyHandle(7), SimVelocity::default());
    assert!(matches!(result, Err(EngineError::UnknownBody(SimBodyHandle(7)))));
}

// =============================================================
// Joints
// =============================================================

#[test]
fn revolute_joint_holds_body_to_pin() {
    let mut world = make_world();
    let pin = world.create_body(&make_box(BodyKind::Static, 0.0, 0.0)).unwrap();
    let arm = world.create_body(&make_box(BodyKind::Dynamic, 40.0, 0.0)).unwrap();
    let def = SimRevoluteDef {
        body_a: pin,
        body_b: arm,
        anchor: Vec2::new(20.0, 0.0),
        limit: None,
        motor: None,
        collide_connected: false,
    };
    assert_eq!(world.create_joint(&def).unwrap(), SimJointHandle(0));
    for _ in 0..120 {
        world.step(1.0 / 60.0, 10);
    }
    // The arm swings around the hinge but stays attached to it.
    let pose = world.body_pose(arm).unwrap();
    let distance = ((pose.position.x - 20.0).powi(2) + pose.position.y.powi(2)).sqrt();
    assert!(close(distance, 20.0, 1.0), "{pose:?}");
}

#[test]
fn joint_with_unknown_body_is_rejected() {
    let mut world = make_world();
    let a = world.create_body(&make_box(BodyKind::Static, 0.0, 0.0)).unwrap();
    let def = SimRevoluteDef {
        body_a: a,
        body_b: SimBodyHandle(42),
        anchor: Vec2::ZERO,
        limit: Some((-0.5, 0.5)),
        motor: None,
        collide_connected: true,
    };
    assert!(matches!(world.create_joint(&def), Err(EngineError::UnknownBody(SimBodyHandle(42)))));
}

// =============================================================
// Through the editor
// =============================================================

#[test]
fn editor_preview_runs_on_rapier() {
    let ground = Body::new_box(Vec2::new(0.0, -5.0), 20.0, 1.0).with_kind(BodyKind::Static);
    let crate_ = Body::new_box(Vec2::new(0.0, 5.0), 1.0, 1.0);
    let (ground_id, crate_id) = (ground.id, crate_.id);

    let mut core = EditorCore::new();
    core.scene.push(ground.into());
    core.scene.push(crate_.into());
    core.set_engine(Box::new(RapierEngine));

    core.toggle_preview();
    assert_eq!(core.preview_state(), PreviewState::Running);
    for _ in 0..30 {
        core.tick();
    }
    assert!(core.scene.body(crate_id).unwrap().position.y < 5.0);
    assert_eq!(core.scene.body(ground_id).unwrap().position, Vec2::new(0.0, -5.0));

    core.toggle_preview();
    assert_eq!(core.scene.body(crate_id).unwrap().position, Vec2::new(0.0, 5.0));
}
