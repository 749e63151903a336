use std::path::Path;

use serde::{Deserialize, Serialize};
use sketch_render_shared::units::ONE_METER;
use sketch_render_shared::UnitConverter;
use thiserror::Error;

use crate::objects::MaterialType;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("one_meter must be a positive finite number, got {0}")]
    InvalidScale(f64),

    #[error("No material package configured for {0:?}")]
    MissingMaterial(MaterialType),

    #[error("No {0} asset configured")]
    MissingAsset(&'static str),
}

/// Defaults applied to every new camera. Distances are in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDefaults {
    pub fov_degrees: f64,
    pub aspect: f64,
    pub near_meters: f64,
    pub far_meters: f64,
}

impl Default for CameraDefaults {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near_meters: 0.05,
            far_meters: 1000.0,
        }
    }
}

/// Material package URL per [`MaterialType`]. `Default` has no entry of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaterialAssets {
    pub unlit_color: Option<String>,
    pub unlit_color_alpha: Option<String>,
    pub unlit_font: Option<String>,
    pub unlit_font_outline: Option<String>,
    pub unlit_vertex_color: Option<String>,
    pub lit_simple: Option<String>,
    pub lit_textured: Option<String>,
    pub ui_icon: Option<String>,
}

impl MaterialAssets {
    fn slot(&self, ty: MaterialType) -> &Option<String> {
        match ty.package() {
            MaterialType::Default | MaterialType::UnlitColor => &self.unlit_color,
            MaterialType::UnlitColorAlpha => &self.unlit_color_alpha,
            MaterialType::UnlitFont => &self.unlit_font,
            MaterialType::UnlitFontOutline => &self.unlit_font_outline,
            MaterialType::UnlitVertexColor => &self.unlit_vertex_color,
            MaterialType::LitSimple => &self.lit_simple,
            MaterialType::LitTextured => &self.lit_textured,
            MaterialType::UiIcon => &self.ui_icon,
        }
    }

    pub fn get(&self, ty: MaterialType) -> Option<&str> {
        self.slot(ty).as_deref()
    }

    pub fn is_empty(&self) -> bool {
        MaterialType::ALL.iter().all(|ty| self.get(*ty).is_none())
    }
}

/// URLs of the engine assets the bridge loads on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Skybox KTX.
    pub skybox: Option<String>,
    /// Prefiltered IBL KTX used with the skybox.
    pub indirect_light: Option<String>,
    pub materials: MaterialAssets,
}

impl AssetConfig {
    pub fn is_empty(&self) -> bool {
        self.skybox.is_none() && self.indirect_light.is_none() && self.materials.is_empty()
    }

    /// Every configured URL, deduplicated, for the engine to prefetch.
    pub fn urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self
            .skybox
            .iter()
            .chain(self.indirect_light.iter())
            .map(String::as_str)
            .chain(MaterialType::ALL.iter().filter_map(|ty| self.materials.get(*ty)))
            .collect();
        urls.sort_unstable();
        urls.dedup();
        urls
    }
}

/// Bridge configuration. Every field has a default, so an empty TOML
/// document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Sketch units in one meter.
    pub one_meter: f64,
    /// Intensity given to indirect lights built with a reflection cubemap.
    pub indirect_light_intensity: f32,
    pub camera: CameraDefaults,
    pub assets: AssetConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            one_meter: ONE_METER,
            indirect_light_intensity: 30_000.0,
            camera: CameraDefaults::default(),
            assets: AssetConfig::default(),
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.one_meter.is_finite() || self.one_meter <= 0.0 {
            return Err(ConfigError::InvalidScale(self.one_meter));
        }
        Ok(())
    }

    pub fn units(&self) -> UnitConverter {
        UnitConverter::new(self.one_meter)
    }

    /// Package URL for a material type, falling back to the unlit color package.
    pub fn material_url(&self, ty: MaterialType) -> Result<&str, ConfigError> {
        let materials = &self.assets.materials;
        materials
            .get(ty)
            .or_else(|| materials.get(MaterialType::UnlitColor))
            .ok_or(ConfigError::MissingMaterial(ty))
    }

    pub fn skybox_url(&self) -> Result<&str, ConfigError> {
        self.assets.skybox.as_deref().ok_or(ConfigError::MissingAsset("skybox"))
    }

    pub fn indirect_light_url(&self) -> Result<&str, ConfigError> {
        self.assets
            .indirect_light
            .as_deref()
            .ok_or(ConfigError::MissingAsset("indirect light"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = BridgeConfig::from_toml_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert!(config.assets.is_empty());
        assert_eq!(config.one_meter, 5000.0);
    }

    #[test]
    fn test_parse_full_document() {
        let config = BridgeConfig::from_toml_str(
            r#"
            one_meter = 1000.0
            indirect_light_intensity = 25000.0

            [camera]
            fov_degrees = 60.0

            [assets]
            skybox = "sky.ktx"
            indirect_light = "ibl.ktx"

            [assets.materials]
            lit_simple = "lit_simple.filamat"
            unlit_color = "unlit_color.filamat"
            "#,
        )
        .unwrap();

        assert_eq!(config.one_meter, 1000.0);
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.camera.near_meters, 0.05);
        assert_eq!(config.skybox_url().unwrap(), "sky.ktx");
        assert_eq!(config.material_url(MaterialType::LitSimple).unwrap(), "lit_simple.filamat");
    }

    #[test]
    fn test_material_fallback_to_unlit_color() {
        let mut config = BridgeConfig::default();
        config.assets.materials.unlit_color = Some("unlit.filamat".into());

        assert_eq!(config.material_url(MaterialType::Default).unwrap(), "unlit.filamat");
        assert_eq!(config.material_url(MaterialType::UiIcon).unwrap(), "unlit.filamat");
    }

    #[test]
    fn test_asset_urls_are_deduplicated() {
        let mut assets = AssetConfig::default();
        assert!(assets.urls().is_empty());

        assets.skybox = Some("sky.ktx".into());
        assets.indirect_light = Some("ibl.ktx".into());
        assets.materials.unlit_color = Some("unlit.filamat".into());
        assets.materials.ui_icon = Some("unlit.filamat".into());
        assert_eq!(assets.urls(), vec!["ibl.ktx", "sky.ktx", "unlit.filamat"]);
    }

    #[test]
    fn test_missing_material() {
        let config = BridgeConfig::default();
        assert!(matches!(
            config.material_url(MaterialType::LitTextured),
            Err(ConfigError::MissingMaterial(MaterialType::LitTextured))
        ));
        assert!(config.skybox_url().is_err());
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(matches!(
            BridgeConfig::from_toml_str("one_meter = 0.0"),
            Err(ConfigError::InvalidScale(_))
        ));
        assert!(BridgeConfig::from_toml_str("one_meter = -5.0").is_err());
    }

    #[test]
    fn test_rejects_unknown_material_key() {
        let result = BridgeConfig::from_toml_str("[assets.materials]\nshiny = \"x.filamat\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "indirect_light_intensity = 1.5\n").unwrap();

        let config = BridgeConfig::load(&path).unwrap();
        assert_eq!(config.indirect_light_intensity, 1.5);

        assert!(matches!(
            BridgeConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
