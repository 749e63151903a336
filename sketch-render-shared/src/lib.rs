//! Engine-independent data shared by the Sketch render bridge: unit and axis
//! conversion, interleaved vertex layouts, bounding boxes, texture formats, and
//! the baked indirect-lighting presets.

pub mod bounds;
pub mod lighting;
pub mod texture;
pub mod units;
pub mod vertex;

pub use bounds::BoundingBox;
pub use lighting::IndirectLightPreset;
pub use texture::{TextureFormat, TextureSampler, TextureType};
pub use units::UnitConverter;
pub use vertex::{PrimitiveType, VertexFormat};
