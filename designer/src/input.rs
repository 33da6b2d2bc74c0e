//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `UiState` holds what persists between gestures (selection, vertex
//! editing, a polygon or joint under construction). `InputState` is the
//! active gesture tracked between pointer-down and pointer-up, carrying the
//! values needed to record exactly one command on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::ObjectId;
use crate::hit::AnchorEnd;
use crate::transform::Vec2;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Select, move, and edit existing objects.
    #[default]
    Select,
    /// Drag out a box body.
    Rect,
    /// Drag out a circle body.
    Circle,
    /// Click polygon vertices, double-click to finish.
    Polygon,
    /// Click two bodies to hinge them together.
    RevoluteJoint,
    /// Click an object to delete it.
    Delete,
}

impl Tool {
    /// Whether this tool creates a body by dragging.
    #[must_use]
    pub fn is_shape(self) -> bool {
        matches!(self, Self::Rect | Self::Circle)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Polygon => "polygon",
            Self::RevoluteJoint => "revoluteJoint",
            Self::Delete => "delete",
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key. Treated like Ctrl for shortcuts.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button: runs the active tool.
    Primary,
    /// Middle mouse button: pans the view.
    Middle,
    /// Right mouse button. Ignored.
    Secondary,
}

/// A keyboard key, named as the host reports it (e.g. `"Delete"`, `"z"`, `" "`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Case-insensitive comparison against a key name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down, zooms out).
    pub dy: f64,
}

/// First half of a joint being placed with the joint tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingJoint {
    pub body_a: ObjectId,
    /// World-space point clicked on body A.
    pub anchor_world: Vec2,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tool: Tool,
    pub selected_id: Option<ObjectId>,
    /// Polygon body whose vertices are being edited, if any.
    pub vertex_edit: Option<ObjectId>,
    /// World-space vertices clicked so far with the polygon tool.
    pub polygon_points: Vec<Vec2>,
    pub pending_joint: Option<PendingJoint>,
}

impl UiState {
    /// Drop any half-finished polygon, joint, or vertex edit.
    pub fn cancel_construction(&mut self) {
        self.polygon_points.clear();
        self.pending_joint = None;
        self.vertex_edit = None;
    }
}

/// Internal state for the input state machine.
///
/// Each active variant carries the gesture's starting values so pointer-up
/// can compare against them and record a single command.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Middle-button drag moving the view.
    Panning {
        start_screen: Vec2,
        /// View origin when the drag began.
        start_origin: Vec2,
    },
    /// Moving a body with the select tool.
    DraggingBody {
        id: ObjectId,
        /// Body position minus pointer position at pointer-down.
        grab_offset: Vec2,
        orig_position: Vec2,
    },
    /// Moving one end of a joint.
    DraggingAnchor {
        id: ObjectId,
        end: AnchorEnd,
        /// Body-local anchor at pointer-down.
        orig_anchor: Vec2,
    },
    /// Moving one polygon vertex in vertex-edit mode.
    DraggingVertex {
        id: ObjectId,
        index: usize,
        /// The whole ring at pointer-down.
        orig_vertices: Vec<Vec2>,
    },
    /// Sizing a freshly created box or circle.
    DrawingShape {
        id: ObjectId,
        start_world: Vec2,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
