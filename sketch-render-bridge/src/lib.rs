//! Sketch render bridge: a handle table in front of a Filament-style engine.
//!
//! The host never sees engine objects. Every camera, scene, buffer, material
//! and light lives in an [`ObjectTable`](objects::ObjectTable) and is named by
//! an opaque [`Handle`]. Entities that carry meshes and lights are tracked in
//! a separate [`EntityRegistry`](entity::EntityRegistry) under [`EntityId`]s.
//!
//! The engine itself sits behind the [`RenderEngine`] trait. The web crate
//! implements it over the JavaScript bindings; [`HeadlessEngine`] records
//! every call in memory for tests and tooling.

pub mod bridge;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod handle;
pub mod headless;
pub mod objects;

pub use bridge::{Bridge, TextureSlot};
pub use config::BridgeConfig;
pub use engine::{EngineError, RenderEngine};
pub use entity::EntityId;
pub use error::{BridgeError, Result};
pub use handle::Handle;
pub use headless::HeadlessEngine;
pub use objects::{MaterialType, ObjectKind};
