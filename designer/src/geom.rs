//! Rigid-transform helpers and point-in-shape predicates.
//!
//! Bodies store their shape in a local frame centered on `position` and
//! rotated by `angle` (radians, counter-clockwise, Y up). These helpers move
//! points between that frame and world space and answer containment queries.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use crate::transform::Vec2;

/// Rotate `v` counter-clockwise by `angle` radians.
#[must_use]
pub fn rotate(v: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[must_use]
pub fn local_to_world(local: Vec2, position: Vec2, angle: f64) -> Vec2 {
    rotate(local, angle) + position
}

#[must_use]
pub fn world_to_local(world: Vec2, position: Vec2, angle: f64) -> Vec2 {
    rotate(world - position, -angle)
}

/// Whether `point` lies inside (or on the edge of) a `width` x `height`
/// rectangle centered at `center` and rotated by `angle`.
#[must_use]
pub fn point_in_rotated_rect(point: Vec2, center: Vec2, angle: f64, width: f64, height: f64) -> bool {
    let local = world_to_local(point, center, angle);
    local.x.abs() <= width / 2.0 && local.y.abs() <= height / 2.0
}

#[must_use]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f64) -> bool {
    point.distance(center) <= radius
}

/// Ray-casting parity test of a local-frame point against a closed ring.
///
/// Rings with fewer than three vertices contain nothing.
#[must_use]
pub fn point_in_ring(local: Vec2, ring: &[Vec2]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for (i, vi) in ring.iter().enumerate() {
        let vj = ring[j];
        if (vi.y > local.y) != (vj.y > local.y)
            && local.x < (vj.x - vi.x) * (local.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Whether a world point lies inside a polygon whose ring is stored in the
/// local frame of a body at `position` / `angle`.
#[must_use]
pub fn point_in_polygon(point: Vec2, position: Vec2, angle: f64, ring: &[Vec2]) -> bool {
    point_in_ring(world_to_local(point, position, angle), ring)
}

/// Arithmetic mean of a point set. `None` for an empty set.
#[must_use]
pub fn centroid(points: &[Vec2]) -> Option<Vec2> {
    if points.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + *p);
    Some(sum * (1.0 / n))
}
