//! Pointer-driven direct manipulation for node-graph editors.
//!
//! This crate owns the interaction layer of a graph editor: dragging the
//! selected nodes around a pannable, zoomable canvas (with edge auto-pan, stack
//! and scope bookkeeping, and drop-target notifications), and dragging a new
//! edge out of a port while nearby compatible ports magnetically reach for it.
//! The host widget tree implements [`canvas::Canvas`] and forwards its pointer,
//! keyboard, and timer callbacks to an [`engine::Engine`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Routes host events to the controllers |
//! | [`selection`] | Selection drag controller |
//! | [`connect`] | Edge connection controller and the candidate edge |
//! | [`magnet`] | Hand indicators, held-ports queue, per-drag connection session |
//! | [`drag_helper`] | Compatible-port computation and drop resolution |
//! | [`content`] | Viewport panning by dragging the canvas |
//! | [`canvas`] | The host collaborator trait and shared graph types |
//! | [`scene`] | In-memory [`canvas::Canvas`] for tests and headless hosts |
//! | [`input`] | Pointer events, activation filters, the controller trait |
//! | [`pan`] | Edge auto-pan speed and the pausable pan schedule |
//! | [`camera`] | Points, rectangles, and the viewport camera |
//! | [`curve`] | Edge curve control points |
//! | [`config`] | Tunable thresholds from defaults, environment, or JSON |
//! | [`consts`] | Default values for the tunables |

pub mod camera;
pub mod canvas;
pub mod config;
pub mod connect;
pub mod consts;
pub mod content;
pub mod curve;
pub mod drag_helper;
pub mod engine;
pub mod input;
pub mod magnet;
pub mod pan;
pub mod scene;
pub mod selection;
