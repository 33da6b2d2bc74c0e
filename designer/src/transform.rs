#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::config::ViewLimits;
use crate::consts::DEFAULT_PIXELS_PER_METER;

/// A 2D vector in screen pixels, world meters or simulation units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Canvas size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 800.0, height: 600.0 }
    }
}

/// Pan/zoom state of the editor view.
///
/// World space is meters with Y up. The world point `origin` is drawn at the
/// horizontal center of the viewport, on its bottom edge. `pixels_per_meter`
/// is the zoom factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub pixels_per_meter: f64,
    pub origin: Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { pixels_per_meter: DEFAULT_PIXELS_PER_METER, origin: Vec2::ZERO }
    }
}

impl ViewState {
    #[must_use]
    pub fn new(pixels_per_meter: f64, origin: Vec2) -> Self {
        Self { pixels_per_meter, origin }
    }

    /// Convert a world-space point (meters, Y up) to screen pixels (Y down).
    #[must_use]
    pub fn to_screen(&self, world: Vec2, viewport: Viewport) -> Vec2 {
        Vec2 {
            x: viewport.width / 2.0 + (world.x - self.origin.x) * self.pixels_per_meter,
            y: viewport.height - (world.y - self.origin.y) * self.pixels_per_meter,
        }
    }

    /// Convert a screen-space point to world coordinates. Exact inverse of
    /// [`ViewState::to_screen`].
    #[must_use]
    pub fn to_world(&self, screen: Vec2, viewport: Viewport) -> Vec2 {
        Vec2 {
            x: (screen.x - viewport.width / 2.0) / self.pixels_per_meter + self.origin.x,
            y: (viewport.height - screen.y) / self.pixels_per_meter + self.origin.y,
        }
    }

    #[must_use]
    pub fn length_to_screen(&self, meters: f64) -> f64 {
        meters * self.pixels_per_meter
    }

    #[must_use]
    pub fn length_to_world(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_meter
    }

    /// Change the zoom by `delta` pixels-per-meter, keeping the world point
    /// under `screen` fixed.
    ///
    /// Returns `false` (and leaves the view untouched) when clamping to
    /// `limits` means the zoom would not change.
    pub fn zoom_at(&mut self, screen: Vec2, delta: f64, viewport: Viewport, limits: &ViewLimits) -> bool {
        let next = limits.clamp(self.pixels_per_meter + delta);
        if next == self.pixels_per_meter {
            return false;
        }

        let before = self.to_world(screen, viewport);
        self.pixels_per_meter = next;
        let after = self.to_world(screen, viewport);
        self.origin = self.origin + (before - after);
        true
    }

    /// Pan relative to the origin captured when the drag started.
    ///
    /// Dragging right moves the origin left; dragging down moves it up,
    /// because screen Y is inverted.
    pub fn pan_from(&mut self, start_origin: Vec2, screen_delta: Vec2) {
        self.origin = Vec2 {
            x: start_origin.x - screen_delta.x / self.pixels_per_meter,
            y: start_origin.y + screen_delta.y / self.pixels_per_meter,
        };
    }

    /// Return to the initial zoom, centered on the world origin.
    pub fn reset(&mut self, default_ppm: f64) {
        self.pixels_per_meter = default_ppm;
        self.origin = Vec2::ZERO;
    }
}
