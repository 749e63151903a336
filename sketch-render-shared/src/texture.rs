/// What a texture is used for. Decides color space and sampler type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Unknown = 0,
    /// Albedo, sRGB.
    Color,
    /// Linear color look-up table.
    ColorLut,
    Normal,
    Roughness,
    Metal,
    AmbientOcclusion,
    Reflection,
    Displacement,
    Cubemap,
}

impl TextureType {
    pub fn from_index(index: u32) -> Option<Self> {
        use TextureType::*;
        [
            Unknown,
            Color,
            ColorLut,
            Normal,
            Roughness,
            Metal,
            AmbientOcclusion,
            Reflection,
            Displacement,
            Cubemap,
        ]
        .get(index as usize)
        .copied()
    }

    pub fn is_cubemap(self) -> bool {
        matches!(self, Self::Cubemap)
    }

    pub fn is_srgb(self) -> bool {
        matches!(self, Self::Color)
    }
}

/// Block compression of the pixel data the host uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionType {
    Unknown = 0,
    None,
    Bc1,
    Bc1N,
    Bc1A,
    Bc2,
    Bc3,
    Bc3N,
    Bc4,
    Bc5,
}

impl CompressionType {
    pub fn from_index(index: u32) -> Option<Self> {
        use CompressionType::*;
        [Unknown, None, Bc1, Bc1N, Bc1A, Bc2, Bc3, Bc3N, Bc4, Bc5]
            .get(index as usize)
            .copied()
    }
}

/// Internal storage format handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8,
    Srgb8A8,
    Dxt1Rgb,
    Dxt1Rgba,
    Dxt3Rgba,
    Dxt5Rgba,
    RedRgtc1,
    RedGreenRgtc2,
}

impl TextureFormat {
    /// Pick the storage format for uploaded data. `None` for unknown compression.
    pub fn resolve(compression: CompressionType, ty: TextureType) -> Option<Self> {
        let format = match compression {
            CompressionType::Unknown => return None,
            CompressionType::None if ty.is_srgb() => Self::Srgb8A8,
            CompressionType::None => Self::Rgba8,
            CompressionType::Bc1 | CompressionType::Bc1N => Self::Dxt1Rgb,
            CompressionType::Bc1A => Self::Dxt1Rgba,
            CompressionType::Bc2 => Self::Dxt3Rgba,
            CompressionType::Bc3 | CompressionType::Bc3N => Self::Dxt5Rgba,
            CompressionType::Bc4 => Self::RedRgtc1,
            CompressionType::Bc5 => Self::RedGreenRgtc2,
        };
        Some(format)
    }

    pub fn is_compressed(self) -> bool {
        !matches!(self, Self::Rgba8 | Self::Srgb8A8)
    }

    /// Bytes per 4x4 block for compressed formats, per pixel otherwise.
    fn unit_size(self) -> usize {
        match self {
            Self::Rgba8 | Self::Srgb8A8 => 4,
            Self::Dxt1Rgb | Self::Dxt1Rgba | Self::RedRgtc1 => 8,
            Self::Dxt3Rgba | Self::Dxt5Rgba | Self::RedGreenRgtc2 => 16,
        }
    }

    /// Byte size of one face of mip `level` for a `width` x `height` base image.
    pub fn level_size(self, width: u32, height: u32, level: u32) -> usize {
        let w = (width >> level).max(1) as usize;
        let h = (height >> level).max(1) as usize;
        if self.is_compressed() {
            w.div_ceil(4) * h.div_ceil(4) * self.unit_size()
        } else {
            w * h * self.unit_size()
        }
    }
}

/// Number of mip levels in a full chain for the given base size.
pub fn full_mip_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    ClampToEdge = 0,
    Repeat,
    MirroredRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinFilter {
    Nearest = 0,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MagFilter {
    Nearest = 0,
    Linear,
}

impl WrapMode {
    pub fn from_index(index: u32) -> Option<Self> {
        [Self::ClampToEdge, Self::Repeat, Self::MirroredRepeat]
            .get(index as usize)
            .copied()
    }
}

impl MinFilter {
    pub fn from_index(index: u32) -> Option<Self> {
        [
            Self::Nearest,
            Self::Linear,
            Self::NearestMipmapNearest,
            Self::LinearMipmapNearest,
            Self::NearestMipmapLinear,
            Self::LinearMipmapLinear,
        ]
        .get(index as usize)
        .copied()
    }
}

impl MagFilter {
    pub fn from_index(index: u32) -> Option<Self> {
        [Self::Nearest, Self::Linear].get(index as usize).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
    pub wrap: WrapMode,
}

impl TextureSampler {
    pub const fn new(min_filter: MinFilter, mag_filter: MagFilter, wrap: WrapMode) -> Self {
        Self {
            min_filter,
            mag_filter,
            wrap,
        }
    }

    /// Fixed sampler for color look-up tables.
    pub const COLOR_LUT: TextureSampler =
        TextureSampler::new(MinFilter::NearestMipmapLinear, MagFilter::Linear, WrapMode::ClampToEdge);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uncompressed_color_space() {
        assert_eq!(
            TextureFormat::resolve(CompressionType::None, TextureType::Color),
            Some(TextureFormat::Srgb8A8)
        );
        assert_eq!(
            TextureFormat::resolve(CompressionType::None, TextureType::Normal),
            Some(TextureFormat::Rgba8)
        );
        assert_eq!(TextureFormat::resolve(CompressionType::Unknown, TextureType::Color), None);
    }

    #[test]
    fn test_level_size_uncompressed() {
        assert_eq!(TextureFormat::Rgba8.level_size(64, 32, 0), 64 * 32 * 4);
        assert_eq!(TextureFormat::Rgba8.level_size(64, 32, 1), 32 * 16 * 4);
        // clamps to 1x1 at the tail of the chain
        assert_eq!(TextureFormat::Rgba8.level_size(64, 32, 10), 4);
    }

    #[test]
    fn test_level_size_block_compressed() {
        assert_eq!(TextureFormat::Dxt1Rgb.level_size(16, 16, 0), 4 * 4 * 8);
        assert_eq!(TextureFormat::Dxt5Rgba.level_size(16, 16, 0), 4 * 4 * 16);
        // partial blocks round up
        assert_eq!(TextureFormat::Dxt1Rgb.level_size(2, 2, 0), 8);
    }

    #[test]
    fn test_full_mip_count() {
        assert_eq!(full_mip_count(1, 1), 1);
        assert_eq!(full_mip_count(256, 64), 9);
        assert_eq!(full_mip_count(300, 10), 9);
    }

    #[test]
    fn test_enum_indices() {
        assert_eq!(TextureType::from_index(9), Some(TextureType::Cubemap));
        assert_eq!(TextureType::from_index(10), None);
        assert_eq!(CompressionType::from_index(9), Some(CompressionType::Bc5));
        assert_eq!(WrapMode::from_index(1), Some(WrapMode::Repeat));
        assert_eq!(MinFilter::from_index(6), None);
        assert_eq!(MagFilter::from_index(1), Some(MagFilter::Linear));
    }
}
