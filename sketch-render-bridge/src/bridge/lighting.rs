use sketch_render_shared::lighting::SH_BANDS;
use sketch_render_shared::units::SKETCH_TO_ENGINE_AXES;
use sketch_render_shared::IndirectLightPreset;

use crate::engine::{IndirectLightDescriptor, LightDescriptor, LightType, RenderEngine};
use crate::error::{malformed, BridgeError, Result};
use crate::handle::Handle;
use crate::objects::{BridgeObject, IndirectLight, Light, Skybox};

use super::Bridge;

impl<E: RenderEngine> Bridge<E> {
    // ── indirect light ──

    /// Irradiance-only indirect light from a baked preset.
    pub fn create_indirect_light(&mut self, preset: IndirectLightPreset) -> Result<Handle> {
        let desc = IndirectLightDescriptor {
            irradiance: preset.coefficients(),
            bands: SH_BANDS,
            reflections: None,
            intensity: None,
            rotation: SKETCH_TO_ENGINE_AXES,
        };
        let light = self.engine.build_indirect_light(&desc)?;
        let handle = self
            .objects
            .insert(BridgeObject::IndirectLight(IndirectLight { light, preset }));
        log::debug!("Created indirect light {handle} ({preset:?})");
        Ok(handle)
    }

    /// Preset irradiance plus reflections from a cubemap texture, at the
    /// configured intensity.
    pub fn create_indirect_light_cubemap(&mut self, preset: IndirectLightPreset, cubemap: Handle) -> Result<Handle> {
        let texture = self.objects.texture(cubemap)?;
        if !texture.desc.texture_type.is_cubemap() {
            return Err(malformed(format!("texture {cubemap} is not a cubemap")));
        }
        let desc = IndirectLightDescriptor {
            irradiance: preset.coefficients(),
            bands: SH_BANDS,
            reflections: Some(&texture.texture),
            intensity: Some(self.config.indirect_light_intensity),
            rotation: SKETCH_TO_ENGINE_AXES,
        };
        let light = self.engine.build_indirect_light(&desc)?;
        let handle = self
            .objects
            .insert(BridgeObject::IndirectLight(IndirectLight { light, preset }));
        log::debug!("Created indirect light {handle} ({preset:?}) reflecting {cubemap}");
        Ok(handle)
    }

    pub fn indirect_light_intensity(&mut self, indirect_light: Handle, intensity: f32) -> Result<()> {
        let ibl = self.objects.indirect_light(indirect_light)?;
        self.engine.indirect_light_set_intensity(&ibl.light, intensity);
        Ok(())
    }

    pub fn destroy_indirect_light(&mut self, indirect_light: Handle) -> bool {
        match self.objects.take_indirect_light(indirect_light) {
            Some(ibl) => {
                self.engine.destroy_indirect_light(ibl.light);
                log::debug!("Destroyed indirect light {indirect_light}");
                true
            }
            None => false,
        }
    }

    // ── skybox ──

    /// Skybox and its matching indirect light, both loaded from the
    /// configured environment assets.
    pub fn create_skybox(&mut self, preset: IndirectLightPreset) -> Result<Handle> {
        let skybox_url = self.config.skybox_url()?;
        let ibl_url = self.config.indirect_light_url()?;

        let light = self.engine.load_indirect_light(ibl_url)?;
        self.engine.indirect_light_set_rotation(&light, &SKETCH_TO_ENGINE_AXES);
        let skybox = match self.engine.load_skybox(skybox_url) {
            Ok(skybox) => skybox,
            Err(err) => {
                self.engine.destroy_indirect_light(light);
                return Err(err.into());
            }
        };

        let handle = self.objects.insert(BridgeObject::Skybox(Skybox {
            skybox,
            indirect_light: IndirectLight { light, preset },
        }));
        log::debug!("Created skybox {handle} from {skybox_url}");
        Ok(handle)
    }

    pub fn destroy_skybox(&mut self, skybox: Handle) -> bool {
        match self.objects.take_skybox(skybox) {
            Some(s) => {
                self.engine.destroy_skybox(s.skybox);
                self.engine.destroy_indirect_light(s.indirect_light.light);
                log::debug!("Destroyed skybox {skybox}");
                true
            }
            None => false,
        }
    }

    // ── lights ──

    pub fn create_light_directional(
        &mut self,
        color: [f32; 3],
        intensity: f32,
        direction: [f32; 3],
        cast_shadows: bool,
    ) -> Result<Handle> {
        self.create_light(LightType::Directional, color, intensity, direction, cast_shadows)
    }

    /// Directional light that also draws a sun disk.
    pub fn create_light_sun(
        &mut self,
        color: [f32; 3],
        intensity: f32,
        direction: [f32; 3],
        cast_shadows: bool,
    ) -> Result<Handle> {
        self.create_light(LightType::Sun, color, intensity, direction, cast_shadows)
    }

    fn create_light(
        &mut self,
        light_type: LightType,
        color: [f32; 3],
        intensity: f32,
        direction: [f32; 3],
        cast_shadows: bool,
    ) -> Result<Handle> {
        let desc = LightDescriptor {
            light_type,
            color,
            intensity,
            direction,
            cast_shadows,
        };
        let entity = self.create_entity();
        let built = match self.entities.resolve(entity) {
            Ok(native) => self.engine.build_light(native, &desc).map_err(BridgeError::from),
            Err(err) => Err(err),
        };
        if let Err(err) = built {
            self.destroy_entity(entity);
            return Err(err);
        }

        let handle = self.objects.insert(BridgeObject::Light(Light { light_type, entity }));
        log::debug!("Created {light_type:?} light {handle} on {entity}");
        Ok(handle)
    }

    fn with_light(&mut self, light: Handle, apply: impl FnOnce(&mut E, &E::Entity)) -> Result<()> {
        let light = self.objects.light(light)?;
        let entity = self.entities.resolve(light.entity)?;
        if !self.engine.has_light(entity) {
            return Err(BridgeError::MissingComponent {
                entity: light.entity,
                component: "light",
            });
        }
        apply(&mut self.engine, entity);
        Ok(())
    }

    pub fn light_color(&mut self, light: Handle, color: [f32; 3]) -> Result<()> {
        self.with_light(light, |engine, entity| engine.light_set_color(entity, color))
    }

    pub fn light_intensity(&mut self, light: Handle, intensity: f32) -> Result<()> {
        self.with_light(light, |engine, entity| engine.light_set_intensity(entity, intensity))
    }

    pub fn light_direction(&mut self, light: Handle, direction: [f32; 3]) -> Result<()> {
        self.with_light(light, |engine, entity| engine.light_set_direction(entity, direction))
    }

    /// Removes the light component together with its entity.
    pub fn destroy_light(&mut self, light: Handle) -> bool {
        match self.objects.take_light(light) {
            Some(l) => {
                self.destroy_entity(l.entity);
                log::debug!("Destroyed light {light}");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::bridge;
    use crate::engine::{LightType, TextureDescriptor};
    use crate::error::BridgeError;
    use sketch_render_shared::units::SKETCH_TO_ENGINE_AXES;
    use sketch_render_shared::{IndirectLightPreset, TextureFormat, TextureType};

    fn texture(texture_type: TextureType) -> TextureDescriptor {
        TextureDescriptor {
            width: 4,
            height: 4,
            levels: 1,
            texture_type,
            format: TextureFormat::Rgba8,
        }
    }

    // ── indirect light ──

    #[test]
    fn test_indirect_light_from_preset() {
        let mut b = bridge();
        let ibl = b.create_indirect_light(IndirectLightPreset::NoonGrass).unwrap();
        let native = b.objects().indirect_light(ibl).unwrap().light;
        let record = &b.engine().indirect_lights[&native];

        let expected = IndirectLightPreset::NoonGrass.coefficients().to_vec();
        assert_eq!(record.irradiance.as_ref(), Some(&expected));
        assert_eq!(record.reflections, None);
        assert_eq!(record.intensity, None);
        assert_eq!(record.rotation, Some(SKETCH_TO_ENGINE_AXES));
        assert_eq!(b.objects().indirect_light(ibl).unwrap().preset(), IndirectLightPreset::NoonGrass);
    }

    #[test]
    fn test_indirect_light_with_cubemap() {
        let mut b = bridge();
        let cubemap = b.create_texture(texture(TextureType::Cubemap)).unwrap();
        let ibl = b
            .create_indirect_light_cubemap(IndirectLightPreset::DefaultSky, cubemap)
            .unwrap();

        let native_tex = b.objects().texture(cubemap).unwrap().texture;
        let native = b.objects().indirect_light(ibl).unwrap().light;
        let record = &b.engine().indirect_lights[&native];
        assert_eq!(record.reflections, Some(native_tex));
        assert_eq!(record.intensity, Some(30_000.0));
    }

    #[test]
    fn test_indirect_light_rejects_flat_texture() {
        let mut b = bridge();
        let flat = b.create_texture(texture(TextureType::Color)).unwrap();
        assert!(matches!(
            b.create_indirect_light_cubemap(IndirectLightPreset::DefaultSky, flat),
            Err(BridgeError::MalformedInput(_))
        ));
        assert!(b.engine().indirect_lights.is_empty());
    }

    #[test]
    fn test_indirect_light_intensity_and_destroy() {
        let mut b = bridge();
        let ibl = b.create_indirect_light(IndirectLightPreset::DefaultSky).unwrap();
        b.indirect_light_intensity(ibl, 12_000.0).unwrap();
        let native = b.objects().indirect_light(ibl).unwrap().light;
        assert_eq!(b.engine().indirect_lights[&native].intensity, Some(12_000.0));

        assert!(b.destroy_indirect_light(ibl));
        assert!(!b.destroy_indirect_light(ibl));
        assert!(b.indirect_light_intensity(ibl, 1.0).is_err());
        assert_eq!(b.engine().live_count(), 0);
    }

    // ── skybox ──

    #[test]
    fn test_skybox_loads_configured_assets() {
        let mut b = bridge();
        let skybox = b.create_skybox(IndirectLightPreset::DefaultSky).unwrap();
        let sky = b.objects().skybox(skybox).unwrap();
        assert_eq!(sky.preset(), IndirectLightPreset::DefaultSky);

        let record = &b.engine().indirect_lights[&sky.indirect_light.light];
        assert_eq!(record.source.as_deref(), Some("ibl.ktx"));
        assert_eq!(record.rotation, Some(SKETCH_TO_ENGINE_AXES));
        assert_eq!(b.engine().skyboxes[&sky.skybox], "sky.ktx");

        assert!(b.destroy_skybox(skybox));
        assert!(!b.destroy_skybox(skybox));
        assert_eq!(b.engine().live_count(), 0);
    }

    #[test]
    fn test_skybox_failure_releases_indirect_light() {
        let mut b = bridge();
        b.engine_mut().fail_on("load_skybox");
        assert!(matches!(
            b.create_skybox(IndirectLightPreset::DefaultSky),
            Err(BridgeError::Engine(_))
        ));
        assert_eq!(b.engine().live_count(), 0);
        assert_eq!(b.engine().invalid_destroys(), 0);
    }

    #[test]
    fn test_skybox_without_assets() {
        let mut b = crate::Bridge::new(crate::HeadlessEngine::new(), crate::BridgeConfig::default()).unwrap();
        assert!(matches!(
            b.create_skybox(IndirectLightPreset::NoonGrass),
            Err(BridgeError::Config(_))
        ));
        assert_eq!(b.engine().live_count(), 0);
    }

    // ── lights ──

    #[test]
    fn test_directional_light_keeps_its_type() {
        let mut b = bridge();
        let light = b
            .create_light_directional([1.0, 0.5, 0.25], 50_000.0, [0.0, 0.0, -1.0], true)
            .unwrap();
        let l = *b.objects().light(light).unwrap();
        assert_eq!(l.light_type(), LightType::Directional);
        assert!(b.has_entity(l.entity()));

        let desc = b.engine().lights.values().next().copied().unwrap();
        assert_eq!(desc.light_type, LightType::Directional);
        assert_eq!(desc.color, [1.0, 0.5, 0.25]);
        assert_eq!(desc.direction, [0.0, 0.0, -1.0]);
        assert!(desc.cast_shadows);
    }

    #[test]
    fn test_sun_light() {
        let mut b = bridge();
        let light = b.create_light_sun([1.0; 3], 100_000.0, [0.0, 1.0, -1.0], false).unwrap();
        assert_eq!(b.objects().light(light).unwrap().light_type(), LightType::Sun);
        assert_eq!(b.engine().lights.len(), 1);
    }

    #[test]
    fn test_light_setters() {
        let mut b = bridge();
        let light = b.create_light_sun([1.0; 3], 1.0, [0.0, 0.0, -1.0], false).unwrap();
        b.light_color(light, [0.2, 0.4, 0.6]).unwrap();
        b.light_intensity(light, 8.0).unwrap();
        b.light_direction(light, [1.0, 0.0, 0.0]).unwrap();

        let desc = b.engine().lights.values().next().copied().unwrap();
        assert_eq!(desc.color, [0.2, 0.4, 0.6]);
        assert_eq!(desc.intensity, 8.0);
        assert_eq!(desc.direction, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_light_build_failure_releases_entity() {
        let mut b = bridge();
        b.engine_mut().fail_on("build_light");
        assert!(b.create_light_sun([1.0; 3], 1.0, [0.0, 0.0, -1.0], false).is_err());
        assert_eq!(b.entity_count(), 0);
        assert!(b.objects().is_empty());
        assert_eq!(b.engine().live_count(), 0);
    }

    #[test]
    fn test_destroy_light_removes_entity() {
        let mut b = bridge();
        let light = b.create_light_directional([1.0; 3], 1.0, [0.0, 0.0, -1.0], false).unwrap();
        let entity = b.objects().light(light).unwrap().entity();

        assert!(b.destroy_light(light));
        assert!(!b.has_entity(entity));
        assert!(b.engine().lights.is_empty());
        assert!(!b.destroy_light(light));
        assert!(matches!(b.light_color(light, [0.0; 3]), Err(BridgeError::UnknownHandle(_))));
        assert_eq!(b.engine().live_count(), 0);
    }

    #[test]
    fn test_destroy_light_rejects_mesh_handles() {
        let mut b = bridge();
        let scene = b.create_scene().unwrap();
        assert!(!b.destroy_light(scene));
        assert!(b.contains(scene));
    }
}
