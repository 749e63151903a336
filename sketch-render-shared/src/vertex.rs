//! Interleaved vertex layouts.
//!
//! Each [`VertexFormat`] has exactly one `#[repr(C)]` vertex struct. The
//! buffer stride is the size of that struct, so the attribute layout handed
//! to the engine and the bytes produced by the writers cannot drift apart.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPos {
    pub position: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPosColor {
    pub position: [f32; 3],
    /// RGBA8, red in the lowest byte.
    pub color: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPosUv0 {
    pub position: [f32; 3],
    pub uv0: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPosUv0Tan {
    pub position: [f32; 3],
    pub uv0: [f32; 2],
    /// Tangent frame. Written as the surface normal with w = 0.
    pub tangents: [f32; 4],
}

/// Vertex layouts the host can declare for a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Pos = 0,
    PosColor = 1,
    PosUv0 = 2,
    PosUv0Tan = 3,
}

impl VertexFormat {
    pub const ALL: [VertexFormat; 4] = [
        VertexFormat::Pos,
        VertexFormat::PosColor,
        VertexFormat::PosUv0,
        VertexFormat::PosUv0Tan,
    ];

    /// Decode the host's numeric format tag.
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Bytes per vertex.
    pub fn stride(self) -> u32 {
        let size = match self {
            Self::Pos => std::mem::size_of::<VertexPos>(),
            Self::PosColor => std::mem::size_of::<VertexPosColor>(),
            Self::PosUv0 => std::mem::size_of::<VertexPosUv0>(),
            Self::PosUv0Tan => std::mem::size_of::<VertexPosUv0Tan>(),
        };
        size as u32
    }

    /// Attribute layout inside buffer slot 0.
    pub fn attributes(self) -> &'static [VertexAttributeLayout] {
        const POSITION: VertexAttributeLayout = VertexAttributeLayout {
            attribute: VertexAttribute::Position,
            ty: AttributeType::Float3,
            byte_offset: 0,
            normalized: false,
        };
        const COLOR: VertexAttributeLayout = VertexAttributeLayout {
            attribute: VertexAttribute::Color,
            ty: AttributeType::UByte4,
            byte_offset: 12,
            normalized: true,
        };
        const UV0: VertexAttributeLayout = VertexAttributeLayout {
            attribute: VertexAttribute::Uv0,
            ty: AttributeType::Float2,
            byte_offset: 12,
            normalized: false,
        };
        const TANGENTS: VertexAttributeLayout = VertexAttributeLayout {
            attribute: VertexAttribute::Tangents,
            ty: AttributeType::Float4,
            byte_offset: 20,
            normalized: false,
        };

        match self {
            Self::Pos => &[POSITION],
            Self::PosColor => &[POSITION, COLOR],
            Self::PosUv0 => &[POSITION, UV0],
            Self::PosUv0Tan => &[POSITION, UV0, TANGENTS],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttribute {
    Position,
    Color,
    Uv0,
    Tangents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Float2,
    Float3,
    Float4,
    UByte4,
}

impl AttributeType {
    pub fn size(self) -> u32 {
        match self {
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::UByte4 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttributeLayout {
    pub attribute: VertexAttribute,
    pub ty: AttributeType,
    pub byte_offset: u32,
    pub normalized: bool,
}

/// How a sub-geometry's indices are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Points = 0,
    Lines = 1,
    Triangles = 2,
}

impl PrimitiveType {
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Points),
            1 => Some(Self::Lines),
            2 => Some(Self::Triangles),
            _ => None,
        }
    }
}

/// Pack RGBA bytes the way the `Color` attribute expects them.
pub fn pack_rgba8(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_le_bytes([r, g, b, a])
}
