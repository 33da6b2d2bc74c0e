#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn only_rect_and_circle_are_drag_shapes() {
    assert!(Tool::Rect.is_shape());
    assert!(Tool::Circle.is_shape());
    assert!(!Tool::Polygon.is_shape());
    assert!(!Tool::Select.is_shape());
    assert!(!Tool::RevoluteJoint.is_shape());
    assert!(!Tool::Delete.is_shape());
}

#[test]
fn tool_names() {
    assert_eq!(Tool::Select.as_str(), "select");
    assert_eq!(Tool::RevoluteJoint.as_str(), "revoluteJoint");
    assert_eq!(Tool::Delete.as_str(), "delete");
}

#[test]
fn tool_all_variants_distinct() {
    let variants = [Tool::Select, Tool::Rect, Tool::Circle, Tool::Polygon, Tool::RevoluteJoint, Tool::Delete];
    for (i, a) in variants.iter().enumerate() {
        for (j, b) in variants.iter().enumerate() {
            if i == j {
                assert_eq!(a, b);
            } else {
                assert_ne!(a, b);
            }
        }
    }
}

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift);
    assert!(!m.ctrl);
    assert!(!m.alt);
    assert!(!m.meta);
    assert!(!m.command());
}

#[test]
fn ctrl_or_meta_is_command() {
    assert!(Modifiers { ctrl: true, ..Default::default() }.command());
    assert!(Modifiers { meta: true, ..Default::default() }.command());
    assert!(!Modifiers { shift: true, alt: true, ..Default::default() }.command());
}

// =============================================================
// Button / Key / WheelDelta
// =============================================================

#[test]
fn button_all_variants_distinct() {
    let variants = [Button::Primary, Button::Middle, Button::Secondary];
    for (i, a) in variants.iter().enumerate() {
        for (j, b) in variants.iter().enumerate() {
            if i == j {
                assert_eq!(a, b);
            } else {
                assert_ne!(a, b);
            }
        }
    }
}

#[test]
fn key_matches_case_insensitively() {
    let k = Key::new("Z");
    assert!(k.is("z"));
    assert!(k.is("Z"));
    assert!(!k.is("y"));
}

#[test]
fn key_stores_string() {
    let k = Key::new("Escape");
    assert_eq!(k.0, "Escape");
    assert_eq!(k, Key("Escape".into()));
}

#[test]
fn wheel_delta_values() {
    let w = WheelDelta { dx: 1.5, dy: -3.0 };
    assert_eq!(w.dx, 1.5);
    assert_eq!(w.dy, -3.0);
}

// =============================================================
// UiState
// =============================================================

#[test]
fn ui_state_default_is_empty() {
    let ui = UiState::default();
    assert_eq!(ui.tool, Tool::Select);
    assert!(ui.selected_id.is_none());
    assert!(ui.vertex_edit.is_none());
    assert!(ui.polygon_points.is_empty());
    assert!(ui.pending_joint.is_none());
}

#[test]
fn cancel_construction_clears_work_in_progress() {
    let id = Uuid::new_v4();
    let mut ui = UiState {
        tool: Tool::Polygon,
        selected_id: Some(id),
        vertex_edit: Some(id),
        polygon_points: vec![Vec2::ZERO, Vec2::new(1.0, 0.0)],
        pending_joint: Some(PendingJoint { body_a: id, anchor_world: Vec2::ZERO }),
    };
    ui.cancel_construction();
    assert!(ui.polygon_points.is_empty());
    assert!(ui.pending_joint.is_none());
    assert!(ui.vertex_edit.is_none());
    // Tool and selection survive.
    assert_eq!(ui.tool, Tool::Polygon);
    assert_eq!(ui.selected_id, Some(id));
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert!(InputState::default().is_idle());
}

#[test]
fn gestures_are_not_idle() {
    let id = Uuid::new_v4();
    let gestures = [
        InputState::Panning { start_screen: Vec2::ZERO, start_origin: Vec2::ZERO },
        InputState::DraggingBody { id, grab_offset: Vec2::ZERO, orig_position: Vec2::ZERO },
        InputState::DraggingAnchor { id, end: AnchorEnd::B, orig_anchor: Vec2::ZERO },
        InputState::DraggingVertex { id, index: 0, orig_vertices: Vec::new() },
        InputState::DrawingShape { id, start_world: Vec2::ZERO },
    ];
    for g in &gestures {
        assert!(!g.is_idle(), "{g:?}");
    }
}
