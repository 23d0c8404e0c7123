//! Real-time collaborative drawing engine.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! full lifecycle of a room's canvas: translating raw DOM input events into
//! shape edits, maintaining the pan/zoom viewport, keeping local undo/redo
//! history, rendering the scene, and exchanging shapes with peers over the
//! room's socket. The host layer is responsible only for wiring DOM events
//! and the socket to [`web::Engine`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Session controller [`engine::EngineCore`] and its [`engine::Action`]s |
//! | [`web`] | Browser binding: canvas surface, socket transport, [`web::Engine`] |
//! | [`shape`] | Shape records, bounds, and tool-driven shape creation |
//! | [`hit`] | Hit-testing and text measurement |
//! | [`viewport`] | Pan/zoom viewport and coordinate conversions |
//! | [`history`] | Bounded undo/redo snapshots |
//! | [`selection`] | Single-shape selection |
//! | [`render`] | Scene rendering against an abstract [`render::Surface`] |
//! | [`sync`] | Wire messages and the room [`sync::SyncChannel`] |
//! | [`loader`] | Fetching persisted shapes for a room |
//! | [`export`] | JSON export/import and export filenames |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`config`] | Engine configuration |
//! | [`consts`] | Shared numeric and style constants |

pub mod config;
pub mod consts;
pub mod engine;
pub mod export;
pub mod history;
pub mod hit;
pub mod input;
pub mod loader;
pub mod render;
pub mod selection;
pub mod shape;
pub mod sync;
pub mod viewport;
pub mod web;
