//! Filament JS enum constants for the bridge's engine-independent enums.
//!
//! Filament exposes its enums as `Filament.<Group>.<NAME>` objects. Each
//! function here returns the path of the constant; `filament.rs` reads the
//! actual value at call time.

use sketch_render_bridge::engine::{CullingMode, LightType, RgbaType};
use sketch_render_shared::texture::{MagFilter, MinFilter, TextureFormat, WrapMode};
use sketch_render_shared::vertex::{AttributeType, VertexAttribute};
use sketch_render_shared::PrimitiveType;

/// `Filament.<group>.<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilamentName {
    pub group: &'static str,
    pub name: &'static str,
}

const fn name(group: &'static str, name: &'static str) -> FilamentName {
    FilamentName { group, name }
}

pub fn primitive(primitive: PrimitiveType) -> FilamentName {
    let group = "RenderableManager$PrimitiveType";
    match primitive {
        PrimitiveType::Points => name(group, "POINTS"),
        PrimitiveType::Lines => name(group, "LINES"),
        PrimitiveType::Triangles => name(group, "TRIANGLES"),
    }
}

pub fn vertex_attribute(attribute: VertexAttribute) -> FilamentName {
    let group = "VertexAttribute";
    match attribute {
        VertexAttribute::Position => name(group, "POSITION"),
        VertexAttribute::Color => name(group, "COLOR"),
        VertexAttribute::Uv0 => name(group, "UV0"),
        VertexAttribute::Tangents => name(group, "TANGENTS"),
    }
}

pub fn attribute_type(ty: AttributeType) -> FilamentName {
    let group = "VertexBuffer$AttributeType";
    match ty {
        AttributeType::Float2 => name(group, "FLOAT2"),
        AttributeType::Float3 => name(group, "FLOAT3"),
        AttributeType::Float4 => name(group, "FLOAT4"),
        AttributeType::UByte4 => name(group, "UBYTE4"),
    }
}

pub const INDEX_TYPE_USHORT: FilamentName = name("IndexBuffer$IndexType", "USHORT");
pub const FOV_VERTICAL: FilamentName = name("Camera$Fov", "VERTICAL");

pub fn rgba_type(ty: RgbaType) -> FilamentName {
    match ty {
        RgbaType::Srgb => name("RgbaType", "sRGB"),
        RgbaType::Linear => name("RgbaType", "LINEAR"),
    }
}

pub fn culling_mode(mode: CullingMode) -> FilamentName {
    let group = "CullingMode";
    match mode {
        CullingMode::None => name(group, "NONE"),
        CullingMode::Front => name(group, "FRONT"),
        CullingMode::Back => name(group, "BACK"),
        CullingMode::FrontAndBack => name(group, "FRONT_AND_BACK"),
    }
}

pub fn light_type(ty: LightType) -> FilamentName {
    let group = "LightManager$Type";
    match ty {
        LightType::Sun => name(group, "SUN"),
        LightType::Directional => name(group, "DIRECTIONAL"),
        LightType::Point => name(group, "POINT"),
        LightType::FocusedSpot => name(group, "FOCUSED_SPOT"),
        LightType::Spot => name(group, "SPOT"),
    }
}

pub fn texture_sampler_type(cubemap: bool) -> FilamentName {
    if cubemap {
        name("Texture$Sampler", "SAMPLER_CUBEMAP")
    } else {
        name("Texture$Sampler", "SAMPLER_2D")
    }
}

fn format_name(format: TextureFormat) -> &'static str {
    match format {
        TextureFormat::Rgba8 => "RGBA8",
        TextureFormat::Srgb8A8 => "SRGB8_A8",
        TextureFormat::Dxt1Rgb => "DXT1_RGB",
        TextureFormat::Dxt1Rgba => "DXT1_RGBA",
        TextureFormat::Dxt3Rgba => "DXT3_RGBA",
        TextureFormat::Dxt5Rgba => "DXT5_RGBA",
        TextureFormat::RedRgtc1 => "RED_RGTC1",
        TextureFormat::RedGreenRgtc2 => "RED_GREEN_RGTC2",
    }
}

pub fn internal_format(format: TextureFormat) -> FilamentName {
    name("Texture$InternalFormat", format_name(format))
}

/// Pixel layout of uploaded image data. Compressed formats use the same
/// name as their internal format.
pub fn pixel_data(format: TextureFormat) -> PixelData {
    if format.is_compressed() {
        PixelData::Compressed(name("CompressedPixelDataType", format_name(format)))
    } else {
        PixelData::Plain {
            format: name("PixelDataFormat", "RGBA"),
            ty: name("PixelDataType", "UBYTE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelData {
    Plain { format: FilamentName, ty: FilamentName },
    Compressed(FilamentName),
}

pub fn wrap_mode(mode: WrapMode) -> FilamentName {
    let group = "WrapMode";
    match mode {
        WrapMode::ClampToEdge => name(group, "CLAMP_TO_EDGE"),
        WrapMode::Repeat => name(group, "REPEAT"),
        WrapMode::MirroredRepeat => name(group, "MIRRORED_REPEAT"),
    }
}

pub fn min_filter(filter: MinFilter) -> FilamentName {
    let group = "MinFilter";
    match filter {
        MinFilter::Nearest => name(group, "NEAREST"),
        MinFilter::Linear => name(group, "LINEAR"),
        MinFilter::NearestMipmapNearest => name(group, "NEAREST_MIPMAP_NEAREST"),
        MinFilter::LinearMipmapNearest => name(group, "LINEAR_MIPMAP_NEAREST"),
        MinFilter::NearestMipmapLinear => name(group, "NEAREST_MIPMAP_LINEAR"),
        MinFilter::LinearMipmapLinear => name(group, "LINEAR_MIPMAP_LINEAR"),
    }
}

pub fn mag_filter(filter: MagFilter) -> FilamentName {
    match filter {
        MagFilter::Nearest => name("MagFilter", "NEAREST"),
        MagFilter::Linear => name("MagFilter", "LINEAR"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names() {
        assert_eq!(primitive(PrimitiveType::Triangles).name, "TRIANGLES");
        assert_eq!(primitive(PrimitiveType::Points).group, "RenderableManager$PrimitiveType");
    }

    #[test]
    fn test_directional_and_sun_are_distinct() {
        assert_eq!(light_type(LightType::Directional).name, "DIRECTIONAL");
        assert_eq!(light_type(LightType::Sun).name, "SUN");
    }

    #[test]
    fn test_pixel_data_follows_compression() {
        assert_eq!(
            pixel_data(TextureFormat::Dxt5Rgba),
            PixelData::Compressed(name("CompressedPixelDataType", "DXT5_RGBA"))
        );
        assert!(matches!(pixel_data(TextureFormat::Srgb8A8), PixelData::Plain { .. }));
        assert_eq!(internal_format(TextureFormat::Srgb8A8).name, "SRGB8_A8");
    }

    #[test]
    fn test_sampler_names() {
        assert_eq!(wrap_mode(WrapMode::MirroredRepeat).name, "MIRRORED_REPEAT");
        assert_eq!(min_filter(MinFilter::LinearMipmapLinear).name, "LINEAR_MIPMAP_LINEAR");
        assert_eq!(mag_filter(MagFilter::Nearest).group, "MagFilter");
        assert_eq!(texture_sampler_type(true).name, "SAMPLER_CUBEMAP");
    }
}
