use std::collections::btree_map::Entry;

use sketch_render_shared::texture::{full_mip_count, TextureSampler};

use crate::engine::{CullingMode, RenderEngine, RgbaType, TextureDescriptor};
use crate::error::{malformed, Result};
use crate::handle::Handle;
use crate::objects::{BridgeObject, MaterialInstance, MaterialType, Texture};

use super::Bridge;

const PARAM_BASE_COLOR: &str = "baseColor";
const PARAM_METALLIC: &str = "metallic";
const PARAM_ROUGHNESS: &str = "roughness";
const PARAM_REFLECTANCE: &str = "reflectance";
const PARAM_COLOR_LUT: &str = "color_lut";
const PARAM_CLIP_SPACE_TRANSFORM: &str = "clipSpaceTransform";

/// Texture parameters of the standard lit materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Albedo = 0,
    AmbientOcclusion,
    Metallic,
    Normal,
    Reflectance,
    Roughness,
}

impl TextureSlot {
    pub fn from_index(index: u32) -> Option<Self> {
        [
            Self::Albedo,
            Self::AmbientOcclusion,
            Self::Metallic,
            Self::Normal,
            Self::Reflectance,
            Self::Roughness,
        ]
        .get(index as usize)
        .copied()
    }

    pub fn param_name(self) -> &'static str {
        match self {
            Self::Albedo => "albedo",
            Self::AmbientOcclusion => "ao",
            Self::Metallic => PARAM_METALLIC,
            Self::Normal => "normal",
            Self::Reflectance => PARAM_REFLECTANCE,
            Self::Roughness => PARAM_ROUGHNESS,
        }
    }
}

fn unit_color(r: f32, g: f32, b: f32, a: f32) -> [f32; 4] {
    [r / 255.0, g / 255.0, b / 255.0, a / 255.0]
}

fn param_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(malformed("empty material parameter name"));
    }
    Ok(name)
}

impl<E: RenderEngine> Bridge<E> {
    // ── material instance ──

    /// Fresh instance of the package for `material_type`. Each package is
    /// loaded once and kept until shutdown.
    pub fn create_material_instance(&mut self, material_type: MaterialType) -> Result<Handle> {
        let url = self.config.material_url(material_type)?;
        let material = match self.materials.entry(url.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                log::info!("Loading material package {url} for {material_type:?}");
                entry.insert(self.engine.load_material(url)?)
            }
        };
        let instance = self.engine.create_material_instance(material)?;
        let handle = self.objects.insert(BridgeObject::MaterialInstance(MaterialInstance {
            instance,
            material_type,
        }));
        log::debug!("Created material instance {handle} ({material_type:?})");
        Ok(handle)
    }

    pub fn destroy_material_instance(&mut self, material: Handle) -> bool {
        match self.objects.take_material_instance(material) {
            Some(mi) => {
                self.engine.destroy_material_instance(mi.instance);
                log::debug!("Destroyed material instance {material}");
                true
            }
            None => false,
        }
    }

    fn with_material(&mut self, material: Handle, apply: impl FnOnce(&mut E, &E::MaterialInstance)) -> Result<()> {
        let mi = self.objects.material_instance(material)?;
        apply(&mut self.engine, &mi.instance);
        Ok(())
    }

    /// sRGB base color, channels in 0..=255.
    pub fn material_base_color(&mut self, material: Handle, r: f32, g: f32, b: f32, a: f32) -> Result<()> {
        self.with_material(material, |engine, mi| {
            engine.material_set_color4(mi, PARAM_BASE_COLOR, RgbaType::Srgb, unit_color(r, g, b, a))
        })
    }

    pub fn material_base_color_linear(&mut self, material: Handle, r: f32, g: f32, b: f32, a: f32) -> Result<()> {
        self.with_material(material, |engine, mi| {
            engine.material_set_color4(mi, PARAM_BASE_COLOR, RgbaType::Linear, unit_color(r, g, b, a))
        })
    }

    pub fn material_set_color(&mut self, material: Handle, name: &str, r: f32, g: f32, b: f32, a: f32) -> Result<()> {
        let name = param_name(name)?;
        self.with_material(material, |engine, mi| {
            engine.material_set_color4(mi, name, RgbaType::Srgb, unit_color(r, g, b, a))
        })
    }

    pub fn material_set_color_linear(
        &mut self,
        material: Handle,
        name: &str,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    ) -> Result<()> {
        let name = param_name(name)?;
        self.with_material(material, |engine, mi| {
            engine.material_set_color4(mi, name, RgbaType::Linear, unit_color(r, g, b, a))
        })
    }

    pub fn material_set_value(&mut self, material: Handle, name: &str, value: f32) -> Result<()> {
        let name = param_name(name)?;
        self.with_material(material, |engine, mi| engine.material_set_float(mi, name, value))
    }

    pub fn material_metallic(&mut self, material: Handle, value: f32) -> Result<()> {
        self.with_material(material, |engine, mi| engine.material_set_float(mi, PARAM_METALLIC, value))
    }

    pub fn material_roughness(&mut self, material: Handle, value: f32) -> Result<()> {
        self.with_material(material, |engine, mi| engine.material_set_float(mi, PARAM_ROUGHNESS, value))
    }

    pub fn material_reflectance(&mut self, material: Handle, value: f32) -> Result<()> {
        self.with_material(material, |engine, mi| engine.material_set_float(mi, PARAM_REFLECTANCE, value))
    }

    pub fn material_set_double_sided(&mut self, material: Handle, double_sided: bool) -> Result<()> {
        self.with_material(material, |engine, mi| engine.material_set_double_sided(mi, double_sided))
    }

    pub fn material_set_culling_mode(&mut self, material: Handle, mode: CullingMode) -> Result<()> {
        self.with_material(material, |engine, mi| engine.material_set_culling_mode(mi, mode))
    }

    pub fn material_set_clip_space_transform(
        &mut self,
        material: Handle,
        scale_x: f32,
        scale_y: f32,
        translate_x: f32,
        translate_y: f32,
    ) -> Result<()> {
        self.with_material(material, |engine, mi| {
            engine.material_set_float4(
                mi,
                PARAM_CLIP_SPACE_TRANSFORM,
                [scale_x, scale_y, translate_x, translate_y],
            )
        })
    }

    pub fn material_texture(
        &mut self,
        material: Handle,
        slot: TextureSlot,
        texture: Handle,
        sampler: TextureSampler,
    ) -> Result<()> {
        self.set_material_texture(material, slot.param_name(), texture, sampler)
    }

    /// Color look-up table, always sampled clamped and filtered.
    pub fn material_color_lut(&mut self, material: Handle, texture: Handle) -> Result<()> {
        self.set_material_texture(material, PARAM_COLOR_LUT, texture, TextureSampler::COLOR_LUT)
    }

    fn set_material_texture(
        &mut self,
        material: Handle,
        name: &str,
        texture: Handle,
        sampler: TextureSampler,
    ) -> Result<()> {
        let tex = self.objects.texture(texture)?;
        let mi = self.objects.material_instance(material)?;
        self.engine
            .material_set_texture(&mi.instance, name, &tex.texture, sampler);
        Ok(())
    }

    // ── texture ──

    pub fn create_texture(&mut self, desc: TextureDescriptor) -> Result<Handle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(malformed(format!(
                "texture size {}x{} is empty",
                desc.width, desc.height
            )));
        }
        let max_levels = full_mip_count(desc.width, desc.height);
        if desc.levels == 0 || desc.levels > max_levels {
            return Err(malformed(format!(
                "{} mip levels requested, a {}x{} texture has 1 to {max_levels}",
                desc.levels, desc.width, desc.height
            )));
        }
        let texture = self.engine.create_texture(&desc)?;
        let handle = self.objects.insert(BridgeObject::Texture(Texture { texture, desc }));
        log::debug!(
            "Created texture {handle} ({}x{} {:?} {:?})",
            desc.width,
            desc.height,
            desc.texture_type,
            desc.format
        );
        Ok(handle)
    }

    /// Upload one full mip level, all faces for cubemaps.
    pub fn texture_set_image(&mut self, texture: Handle, level: u32, data: &[u8]) -> Result<()> {
        let tex = self.objects.texture(texture)?;
        if level >= tex.desc.levels {
            return Err(malformed(format!(
                "mip level {level} out of range for a texture with {}",
                tex.desc.levels
            )));
        }
        let expected = tex.desc.level_size(level);
        if data.len() != expected {
            return Err(malformed(format!(
                "mip level {level} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        self.engine.texture_set_image(&tex.texture, level, data);
        Ok(())
    }

    pub fn destroy_texture(&mut self, texture: Handle) -> bool {
        match self.objects.take_texture(texture) {
            Some(tex) => {
                self.engine.destroy_texture(tex.texture);
                log::debug!("Destroyed texture {texture}");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{approx_eq, bridge};
    use super::TextureSlot;
    use crate::engine::{CullingMode, RgbaType, TextureDescriptor};
    use crate::error::BridgeError;
    use crate::headless::{HeadlessEngine, ParamValue};
    use crate::objects::MaterialType;
    use crate::{Bridge, BridgeConfig};
    use sketch_render_shared::texture::{MagFilter, MinFilter, TextureFormat, TextureSampler, TextureType, WrapMode};

    fn params(b: &Bridge<HeadlessEngine>, mi: crate::Handle) -> &std::collections::HashMap<String, ParamValue> {
        let native = b.objects().material_instance(mi).unwrap().instance;
        &b.engine().material_instances[&native].params
    }

    fn color_texture(width: u32, height: u32, levels: u32) -> TextureDescriptor {
        TextureDescriptor {
            width,
            height,
            levels,
            texture_type: TextureType::Color,
            format: TextureFormat::Srgb8A8,
        }
    }

    // ── material instance ──

    #[test]
    fn test_package_loaded_once_per_type() {
        let mut b = bridge();
        let a = b.create_material_instance(MaterialType::LitSimple).unwrap();
        let c = b.create_material_instance(MaterialType::LitSimple).unwrap();
        assert_ne!(a, c);
        assert_eq!(b.engine().materials.len(), 1);
        assert_eq!(b.engine().material_instances.len(), 2);
    }

    #[test]
    fn test_default_shares_unlit_color_package() {
        let mut b = bridge();
        let d = b.create_material_instance(MaterialType::Default).unwrap();
        b.create_material_instance(MaterialType::UnlitColor).unwrap();
        assert_eq!(b.engine().materials.len(), 1);
        assert!(b.engine().materials.values().all(|url| url == "unlit_color.filamat"));
        assert_eq!(b.objects().material_instance(d).unwrap().material_type(), MaterialType::Default);
    }

    #[test]
    fn test_unconfigured_type_falls_back_to_unlit_color() {
        let mut b = bridge();
        b.create_material_instance(MaterialType::UiIcon).unwrap();
        assert!(b.engine().materials.values().any(|url| url == "unlit_color.filamat"));

        // The fallback reuses the package already loaded for unlit color.
        b.create_material_instance(MaterialType::UnlitColor).unwrap();
        assert_eq!(b.engine().materials.len(), 1);
        assert_eq!(b.engine().material_instances.len(), 2);
    }

    #[test]
    fn test_no_packages_configured() {
        let mut b = Bridge::new(HeadlessEngine::new(), BridgeConfig::default()).unwrap();
        assert!(matches!(
            b.create_material_instance(MaterialType::LitSimple),
            Err(BridgeError::Config(_))
        ));
        assert_eq!(b.engine().live_count(), 0);
    }

    #[test]
    fn test_failed_load_is_retried_next_time() {
        let mut b = bridge();
        b.engine_mut().fail_on("load_material");
        assert!(b.create_material_instance(MaterialType::LitSimple).is_err());
        b.engine_mut().clear_failures();
        assert!(b.create_material_instance(MaterialType::LitSimple).is_ok());
    }

    #[test]
    fn test_base_color_scales_bytes() {
        let mut b = bridge();
        let mi = b.create_material_instance(MaterialType::UnlitColor).unwrap();
        b.material_base_color(mi, 255.0, 0.0, 51.0, 255.0).unwrap();
        match &params(&b, mi)["baseColor"] {
            ParamValue::Color(RgbaType::Srgb, c) => {
                assert!(approx_eq(c[0], 1.0));
                assert!(approx_eq(c[2], 0.2));
                assert!(approx_eq(c[3], 1.0));
            }
            other => panic!("unexpected {other:?}"),
        }

        b.material_base_color_linear(mi, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert!(matches!(params(&b, mi)["baseColor"], ParamValue::Color(RgbaType::Linear, _)));
    }

    #[test]
    fn test_named_parameters() {
        let mut b = bridge();
        let mi = b.create_material_instance(MaterialType::LitSimple).unwrap();
        b.material_set_value(mi, "opacity", 0.5).unwrap();
        b.material_set_color(mi, "tint", 0.0, 255.0, 0.0, 255.0).unwrap();
        b.material_set_color_linear(mi, "glow", 255.0, 0.0, 0.0, 255.0).unwrap();
        b.material_metallic(mi, 0.9).unwrap();
        b.material_roughness(mi, 0.3).unwrap();
        b.material_reflectance(mi, 0.4).unwrap();
        b.material_set_clip_space_transform(mi, 2.0, 2.0, -1.0, -1.0).unwrap();

        let p = params(&b, mi);
        assert_eq!(p["opacity"], ParamValue::Float(0.5));
        assert_eq!(p["metallic"], ParamValue::Float(0.9));
        assert_eq!(p["roughness"], ParamValue::Float(0.3));
        assert_eq!(p["reflectance"], ParamValue::Float(0.4));
        assert_eq!(p["clipSpaceTransform"], ParamValue::Float4([2.0, 2.0, -1.0, -1.0]));
        assert!(matches!(p["glow"], ParamValue::Color(RgbaType::Linear, _)));

        assert!(matches!(
            b.material_set_value(mi, "", 1.0),
            Err(BridgeError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_double_sided_and_culling() {
        let mut b = bridge();
        let mi = b.create_material_instance(MaterialType::LitSimple).unwrap();
        b.material_set_double_sided(mi, true).unwrap();
        b.material_set_culling_mode(mi, CullingMode::Front).unwrap();

        let native = b.objects().material_instance(mi).unwrap().instance;
        let record = &b.engine().material_instances[&native];
        assert_eq!(record.double_sided, Some(true));
        assert_eq!(record.culling, Some(CullingMode::Front));
    }

    #[test]
    fn test_texture_slots() {
        let mut b = bridge();
        let mi = b.create_material_instance(MaterialType::LitTextured).unwrap();
        let tex = b.create_texture(color_texture(4, 4, 1)).unwrap();
        let sampler = TextureSampler::new(MinFilter::Linear, MagFilter::Nearest, WrapMode::Repeat);

        b.material_texture(mi, TextureSlot::AmbientOcclusion, tex, sampler).unwrap();
        b.material_color_lut(mi, tex).unwrap();

        let native_tex = b.objects().texture(tex).unwrap().texture;
        let p = params(&b, mi);
        assert_eq!(p["ao"], ParamValue::Texture(native_tex, sampler));
        assert_eq!(p["color_lut"], ParamValue::Texture(native_tex, TextureSampler::COLOR_LUT));
    }

    #[test]
    fn test_texture_slot_names() {
        assert_eq!(TextureSlot::from_index(0), Some(TextureSlot::Albedo));
        assert_eq!(TextureSlot::from_index(6), None);
        assert_eq!(TextureSlot::Normal.param_name(), "normal");
    }

    #[test]
    fn test_destroy_material_instance() {
        let mut b = bridge();
        let mi = b.create_material_instance(MaterialType::UnlitColor).unwrap();
        assert!(b.destroy_material_instance(mi));
        assert!(!b.destroy_material_instance(mi));
        assert!(b.material_metallic(mi, 1.0).is_err());
        assert_eq!(b.engine().materials.len(), 1);
    }

    // ── texture ──

    #[test]
    fn test_texture_levels_checked() {
        let mut b = bridge();
        assert!(b.create_texture(color_texture(0, 4, 1)).is_err());
        assert!(b.create_texture(color_texture(4, 4, 0)).is_err());
        assert!(b.create_texture(color_texture(4, 4, 4)).is_err());
        assert!(b.create_texture(color_texture(4, 4, 3)).is_ok());
    }

    #[test]
    fn test_texture_set_image_size() {
        let mut b = bridge();
        let tex = b.create_texture(color_texture(4, 2, 2)).unwrap();
        b.texture_set_image(tex, 0, &[0; 32]).unwrap();
        b.texture_set_image(tex, 1, &[0; 8]).unwrap();
        assert!(matches!(
            b.texture_set_image(tex, 1, &[0; 9]),
            Err(BridgeError::MalformedInput(_))
        ));
        assert!(b.texture_set_image(tex, 2, &[0; 4]).is_err());

        let native = b.objects().texture(tex).unwrap().texture;
        assert_eq!(b.engine().textures[&native].levels.len(), 2);
    }

    #[test]
    fn test_destroy_texture() {
        let mut b = bridge();
        let tex = b.create_texture(color_texture(1, 1, 1)).unwrap();
        assert!(b.destroy_texture(tex));
        assert!(!b.destroy_texture(tex));
        assert_eq!(b.engine().live_count(), 0);
    }
}
