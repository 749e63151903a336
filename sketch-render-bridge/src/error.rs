use sketch_render_shared::VertexFormat;
use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::entity::EntityId;
use crate::handle::Handle;
use crate::objects::ObjectKind;

/// Why a bridge operation did not take effect.
///
/// The host-facing surface turns these into sentinel return values; inside
/// the crate every failure is explicit.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The handle is null, was destroyed, or never existed.
    #[error("Unknown handle: {0}")]
    UnknownHandle(Handle),

    #[error("Handle {handle} is a {found}, expected a {expected}")]
    WrongKind {
        handle: Handle,
        expected: ObjectKind,
        found: ObjectKind,
    },

    #[error("Unknown {0}")]
    UnknownEntity(EntityId),

    #[error("A mesh takes 1 to {max} sub-geometries, got {count}")]
    SubGeometryCount { count: usize, max: usize },

    #[error("Sub-geometry {index} out of range for a mesh with {count}")]
    SubGeometryIndex { index: usize, count: usize },

    /// Host data has the wrong shape or an out-of-range value.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Vertex buffer has format {actual:?}, writer needs {expected:?}")]
    FormatMismatch {
        expected: VertexFormat,
        actual: VertexFormat,
    },

    #[error("Writing {count} elements at offset {offset} overflows a buffer of {capacity}")]
    BufferOverflow { offset: u32, count: u32, capacity: u32 },

    #[error("{entity} has no {component} component")]
    MissingComponent {
        entity: EntityId,
        component: &'static str,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

pub(crate) fn malformed(message: impl Into<String>) -> BridgeError {
    BridgeError::MalformedInput(message.into())
}
