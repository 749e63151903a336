//! Numeric codes from the host turned into typed bridge values.

use sketch_render_bridge::engine::{CullingMode, TextureDescriptor};
use sketch_render_bridge::{BridgeError, Handle, MaterialType, Result, TextureSlot};
use sketch_render_shared::texture::{CompressionType, MagFilter, MinFilter, TextureFormat, TextureSampler, WrapMode};
use sketch_render_shared::{IndirectLightPreset, PrimitiveType, TextureType, VertexFormat};

fn code<T>(value: Option<T>, what: &str, index: u32) -> Result<T> {
    value.ok_or_else(|| BridgeError::MalformedInput(format!("unknown {what} code {index}")))
}

pub fn primitive(index: u32) -> Result<PrimitiveType> {
    code(PrimitiveType::from_index(index), "primitive type", index)
}

pub fn vertex_format(index: u32) -> Result<VertexFormat> {
    code(VertexFormat::from_index(index), "vertex format", index)
}

pub fn material_type(index: u32) -> Result<MaterialType> {
    code(MaterialType::from_index(index), "material type", index)
}

pub fn preset(index: u32) -> Result<IndirectLightPreset> {
    code(IndirectLightPreset::from_index(index), "indirect light preset", index)
}

pub fn culling_mode(index: u32) -> Result<CullingMode> {
    code(CullingMode::from_index(index), "culling mode", index)
}

pub fn texture_slot(index: u32) -> Result<TextureSlot> {
    code(TextureSlot::from_index(index), "texture slot", index)
}

pub fn sampler(wrap: u32, min: u32, mag: u32) -> Result<TextureSampler> {
    Ok(TextureSampler::new(
        code(MinFilter::from_index(min), "min filter", min)?,
        code(MagFilter::from_index(mag), "mag filter", mag)?,
        code(WrapMode::from_index(wrap), "wrap mode", wrap)?,
    ))
}

/// Texture descriptor with the storage format picked from the texture's use
/// and the compression of the data the host will upload.
pub fn texture(width: u32, height: u32, levels: u32, texture_type: u32, compression: u32) -> Result<TextureDescriptor> {
    let ty = code(TextureType::from_index(texture_type), "texture type", texture_type)?;
    let compression = code(CompressionType::from_index(compression), "compression", compression)?;
    let format = TextureFormat::resolve(compression, ty)
        .ok_or_else(|| BridgeError::MalformedInput(format!("no storage format for {compression:?} {ty:?}")))?;
    Ok(TextureDescriptor {
        width,
        height,
        levels,
        texture_type: ty,
        format,
    })
}

pub fn handles(raw: &[u64]) -> Vec<Handle> {
    raw.iter().copied().map(Handle::from_raw).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_codes() {
        assert_eq!(primitive(2).unwrap(), PrimitiveType::Triangles);
        assert_eq!(vertex_format(3).unwrap(), VertexFormat::PosUv0Tan);
        assert_eq!(preset(1).unwrap(), IndirectLightPreset::DefaultSky);
        assert_eq!(culling_mode(2).unwrap(), CullingMode::Back);
        assert_eq!(texture_slot(3).unwrap(), TextureSlot::Normal);
        assert!(matches!(primitive(7), Err(BridgeError::MalformedInput(_))));
        assert!(material_type(99).is_err());
    }

    #[test]
    fn test_sampler_argument_order() {
        let s = sampler(1, 5, 0).unwrap();
        assert_eq!(s.wrap, WrapMode::Repeat);
        assert_eq!(s.min_filter, MinFilter::LinearMipmapLinear);
        assert_eq!(s.mag_filter, MagFilter::Nearest);
        assert!(sampler(3, 0, 0).is_err());
    }

    #[test]
    fn test_texture_format_resolution() {
        // Color, uncompressed.
        let desc = texture(256, 128, 1, 1, 1).unwrap();
        assert_eq!(desc.format, TextureFormat::Srgb8A8);
        assert_eq!(desc.texture_type, TextureType::Color);

        // Normal map, BC5.
        let desc = texture(64, 64, 7, 3, 9).unwrap();
        assert_eq!(desc.format, TextureFormat::RedGreenRgtc2);
        assert_eq!(desc.levels, 7);
    }

    #[test]
    fn test_texture_with_unknown_compression() {
        assert!(matches!(texture(4, 4, 1, 1, 0), Err(BridgeError::MalformedInput(_))));
        assert!(texture(4, 4, 1, 42, 1).is_err());
    }

    #[test]
    fn test_handles_keep_order() {
        let hs = handles(&[3, 0, 9]);
        assert_eq!(hs.iter().map(|h| h.raw()).collect::<Vec<_>>(), vec![3, 0, 9]);
        assert!(hs[1].is_null());
    }
}
