#![allow(clippy::float_cmp)]

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::*;

const EPSILON: f64 = 1e-10;

fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

fn square() -> Vec<Vec2> {
    vec![Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)]
}

// --- rotate / frames ---

#[test]
fn rotate_quarter_turn() {
    assert!(vec_approx_eq(rotate(Vec2::new(1.0, 0.0), FRAC_PI_2), Vec2::new(0.0, 1.0)));
}

#[test]
fn local_world_round_trip() {
    let pos = Vec2::new(3.0, -2.0);
    let angle = 0.7;
    let local = Vec2::new(0.5, 1.25);
    let world = local_to_world(local, pos, angle);
    assert!(vec_approx_eq(world_to_local(world, pos, angle), local));
}

#[test]
fn local_to_world_translates_and_rotates() {
    let w = local_to_world(Vec2::new(1.0, 0.0), Vec2::new(10.0, 10.0), FRAC_PI_2);
    assert!(vec_approx_eq(w, Vec2::new(10.0, 11.0)));
}

// --- rectangle ---

#[test]
fn rect_contains_center_and_edge() {
    let c = Vec2::new(5.0, 5.0);
    assert!(point_in_rotated_rect(c, c, 0.0, 2.0, 1.0));
    assert!(point_in_rotated_rect(Vec2::new(6.0, 5.0), c, 0.0, 2.0, 1.0));
    assert!(!point_in_rotated_rect(Vec2::new(6.01, 5.0), c, 0.0, 2.0, 1.0));
}

#[test]
fn rotated_rect_uses_body_frame() {
    // A 4x0.5 bar rotated 90° stands upright.
    let c = Vec2::ZERO;
    assert!(point_in_rotated_rect(Vec2::new(0.0, 1.9), c, FRAC_PI_2, 4.0, 0.5));
    assert!(!point_in_rotated_rect(Vec2::new(1.9, 0.0), c, FRAC_PI_2, 4.0, 0.5));
}

// --- circle ---

#[test]
fn circle_boundary_inclusive() {
    assert!(point_in_circle(Vec2::new(1.0, 0.0), Vec2::ZERO, 1.0));
    assert!(!point_in_circle(Vec2::new(1.0, 0.1), Vec2::ZERO, 1.0));
}

// --- polygon ---

#[test]
fn ring_contains_interior_point() {
    assert!(point_in_ring(Vec2::new(0.2, -0.3), &square()));
    assert!(!point_in_ring(Vec2::new(1.5, 0.0), &square()));
}

#[test]
fn degenerate_ring_contains_nothing() {
    let ring = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)];
    assert!(!point_in_ring(Vec2::new(0.5, 0.5), &ring));
    assert!(!point_in_ring(Vec2::ZERO, &[]));
}

#[test]
fn concave_ring_notch_is_outside() {
    let ring = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(4.0, 0.0),
        Vec2::new(4.0, 4.0),
        Vec2::new(2.0, 1.0),
        Vec2::new(0.0, 4.0),
    ];
    assert!(point_in_ring(Vec2::new(1.0, 0.5), &ring));
    assert!(!point_in_ring(Vec2::new(2.0, 3.0), &ring));
}

#[test]
fn polygon_in_rotated_body_frame() {
    let pos = Vec2::new(10.0, 0.0);
    let tri = vec![Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(0.0, 0.5)];
    // Unrotated the point (11, 0.1) is inside; rotated 45° it falls out.
    assert!(point_in_polygon(Vec2::new(11.0, 0.1), pos, 0.0, &tri));
    assert!(!point_in_polygon(Vec2::new(11.0, 0.1), pos, FRAC_PI_4, &tri));
}

// --- centroid ---

#[test]
fn centroid_is_vertex_average() {
    let pts = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(2.0, 3.0)];
    assert!(vec_approx_eq(centroid(&pts).unwrap(), Vec2::new(2.0, 1.0)));
}

#[test]
fn centroid_of_nothing_is_none() {
    assert!(centroid(&[]).is_none());
}
