//! Editor core for authoring 2D rigid-body physics scenes.
//!
//! The crate is headless: it owns the authoritative scene, the undo/redo
//! history, the pan/zoom view and the physics-preview bridge, and turns raw
//! pointer and keyboard events into scene mutations. Drawing, file access and
//! the rigid-body engine itself live with the host; the engine is reached only
//! through the traits in [`sim`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`editor`] | Top-level [`editor::EditorCore`] driving input, history and preview |
//! | [`doc`] | Scene model: bodies, joints and the ordered [`doc::Scene`] |
//! | [`command`] | Reversible edit commands and the typed property model |
//! | [`history`] | Bounded linear undo/redo history |
//! | [`transform`] | Screen/world coordinate conversions and the view state |
//! | [`geom`] | Local-frame helpers and point-in-shape predicates |
//! | [`hit`] | Hit-testing against anchors, bodies and polygon vertices |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`sim`] | Boundary traits and definitions for an external physics engine |
//! | [`preview`] | Physics-preview bridge between the scene and a simulation |
//! | [`persist`] | Scene save/load and the engine-ready export document |
//! | [`config`] | Tunable editor settings |
//! | [`consts`] | Shared numeric constants (zoom limits, hit radii, defaults) |

pub mod command;
pub mod config;
pub mod consts;
pub mod doc;
pub mod editor;
pub mod geom;
pub mod history;
pub mod hit;
pub mod input;
pub mod persist;
pub mod preview;
pub mod sim;
pub mod transform;
