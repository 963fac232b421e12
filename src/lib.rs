//! # collada-scene
//!
//! Translates COLLADA (`.dae`) documents into an indexed scene-graph event
//! stream: sources, accessors, and per-primitive index streams are rebound
//! and re-indexed into flat coordinate/normal/texcoord buffers plus shared
//! or face-terminated index arrays, emitted through a caller-supplied sink.

pub mod collada;
pub mod dom;
pub mod math;
pub mod sink;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
