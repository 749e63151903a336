use crate::engine::{RenderEngine, ViewportRect};
use crate::error::{malformed, Result};
use crate::handle::Handle;
use crate::objects::{BridgeObject, Scene, View};

use super::Bridge;

impl<E: RenderEngine> Bridge<E> {
    // ── scene ──

    pub fn create_scene(&mut self) -> Result<Handle> {
        let scene = self.engine.create_scene()?;
        let handle = self.objects.insert(BridgeObject::Scene(Scene { scene }));
        log::debug!("Created scene {handle}");
        Ok(handle)
    }

    pub fn destroy_scene(&mut self, scene: Handle) -> bool {
        match self.objects.take_scene(scene) {
            Some(Scene { scene: native }) => {
                self.engine.destroy_scene(native);
                log::debug!("Destroyed scene {scene}");
                true
            }
            None => false,
        }
    }

    pub fn scene_add_mesh(&mut self, scene: Handle, mesh: Handle) -> Result<()> {
        let scene = self.objects.scene(scene)?;
        let mesh = self.objects.mesh(mesh)?;
        let entity = self.entities.resolve(mesh.entity)?;
        self.engine.scene_add_entity(&scene.scene, entity);
        Ok(())
    }

    pub fn scene_remove_mesh(&mut self, scene: Handle, mesh: Handle) -> Result<()> {
        let scene = self.objects.scene(scene)?;
        let mesh = self.objects.mesh(mesh)?;
        let entity = self.entities.resolve(mesh.entity)?;
        self.engine.scene_remove_entity(&scene.scene, entity);
        Ok(())
    }

    pub fn scene_add_light(&mut self, scene: Handle, light: Handle) -> Result<()> {
        let scene = self.objects.scene(scene)?;
        let light = self.objects.light(light)?;
        let entity = self.entities.resolve(light.entity)?;
        self.engine.scene_add_entity(&scene.scene, entity);
        Ok(())
    }

    pub fn scene_remove_light(&mut self, scene: Handle, light: Handle) -> Result<()> {
        let scene = self.objects.scene(scene)?;
        let light = self.objects.light(light)?;
        let entity = self.entities.resolve(light.entity)?;
        self.engine.scene_remove_entity(&scene.scene, entity);
        Ok(())
    }

    pub fn scene_set_indirect_light(&mut self, scene: Handle, indirect_light: Handle) -> Result<()> {
        let scene = self.objects.scene(scene)?;
        let ibl = self.objects.indirect_light(indirect_light)?;
        self.engine.scene_set_indirect_light(&scene.scene, Some(&ibl.light));
        Ok(())
    }

    pub fn scene_clear_indirect_light(&mut self, scene: Handle) -> Result<()> {
        let scene = self.objects.scene(scene)?;
        self.engine.scene_set_indirect_light(&scene.scene, None);
        Ok(())
    }

    /// Sets both the skybox and the indirect light it was created with.
    pub fn scene_add_skybox(&mut self, scene: Handle, skybox: Handle) -> Result<()> {
        let scene = self.objects.scene(scene)?;
        let skybox = self.objects.skybox(skybox)?;
        self.engine
            .scene_set_indirect_light(&scene.scene, Some(&skybox.indirect_light.light));
        self.engine.scene_set_skybox(&scene.scene, Some(&skybox.skybox));
        Ok(())
    }

    pub fn scene_remove_skybox(&mut self, scene: Handle, skybox: Handle) -> Result<()> {
        let scene = self.objects.scene(scene)?;
        self.objects.skybox(skybox)?;
        self.engine.scene_set_indirect_light(&scene.scene, None);
        self.engine.scene_set_skybox(&scene.scene, None);
        Ok(())
    }

    // ── viewport ──

    /// Host layout pixels, scaled to device pixels.
    pub fn create_viewport(&mut self, left: f64, top: f64, width: f64, height: f64) -> Result<Handle> {
        if ![left, top, width, height].iter().all(|v| v.is_finite()) || width < 0.0 || height < 0.0 {
            return Err(malformed(format!(
                "invalid viewport ({left}, {top}, {width}, {height})"
            )));
        }
        let dpr = self.engine.device_pixel_ratio();
        let rect = ViewportRect {
            left: (left * dpr).round() as i32,
            top: (top * dpr).round() as i32,
            width: (width * dpr).round() as u32,
            height: (height * dpr).round() as u32,
        };
        let handle = self.objects.insert(BridgeObject::Viewport(rect));
        log::debug!("Created viewport {handle} {rect:?}");
        Ok(handle)
    }

    pub fn viewport_rect(&self, viewport: Handle) -> Result<ViewportRect> {
        self.objects.viewport(viewport).copied()
    }

    pub fn destroy_viewport(&mut self, viewport: Handle) -> bool {
        self.objects.take_viewport(viewport).is_some()
    }

    // ── view ──

    pub fn create_view(&mut self) -> Result<Handle> {
        let view = self.engine.create_view()?;
        let handle = self.objects.insert(BridgeObject::View(View {
            view,
            camera: None,
            scene: None,
            viewport: None,
        }));
        log::debug!("Created view {handle}");
        Ok(handle)
    }

    pub fn destroy_view(&mut self, view: Handle) -> bool {
        match self.objects.take_view(view) {
            Some(View { view: native, .. }) => {
                self.engine.view_set_camera(&native, None);
                self.engine.view_set_scene(&native, None);
                self.engine.destroy_view(native);
                log::debug!("Destroyed view {view}");
                true
            }
            None => false,
        }
    }

    pub fn view_set_camera(&mut self, view: Handle, camera: Handle) -> Result<()> {
        let cam = self.objects.camera(camera)?;
        let v = self.objects.view(view)?;
        self.engine.view_set_camera(&v.view, Some(&cam.camera));
        self.objects.view_mut(view)?.camera = Some(camera);
        Ok(())
    }

    pub fn view_set_scene(&mut self, view: Handle, scene: Handle) -> Result<()> {
        let s = self.objects.scene(scene)?;
        let v = self.objects.view(view)?;
        self.engine.view_set_scene(&v.view, Some(&s.scene));
        self.objects.view_mut(view)?.scene = Some(scene);
        Ok(())
    }

    /// Also resizes the drawing surface to the viewport size.
    pub fn view_set_viewport(&mut self, view: Handle, viewport: Handle) -> Result<()> {
        let rect = *self.objects.viewport(viewport)?;
        let v = self.objects.view(view)?;
        self.engine.resize_surface(rect.width, rect.height);
        self.engine.view_set_viewport(&v.view, rect);
        self.objects.view_mut(view)?.viewport = Some(viewport);
        Ok(())
    }

    /// Opaque clear color, linear RGB in 0..1.
    pub fn view_set_clear_color(&mut self, view: Handle, r: f32, g: f32, b: f32) -> Result<()> {
        let v = self.objects.view(view)?;
        self.engine.view_set_clear_color(&v.view, [r, g, b, 1.0]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::bridge;
    use crate::engine::ViewportRect;
    use crate::error::BridgeError;
    use crate::headless::HeadlessEngine;
    use crate::objects::MaterialType;
    use crate::Bridge;
    use sketch_render_shared::{IndirectLightPreset, PrimitiveType, VertexFormat};

    fn mesh(b: &mut Bridge<HeadlessEngine>) -> crate::Handle {
        let mi = b.create_material_instance(MaterialType::UnlitColor).unwrap();
        let vb = b.create_vertex_buffer(VertexFormat::Pos, 3).unwrap();
        let ib = b.create_index_buffer(3).unwrap();
        let bbox = b.create_bounding_box([0.0; 3], [5000.0; 3]).unwrap();
        b.create_mesh_prim(PrimitiveType::Triangles, vb, ib, 0, 3, mi, bbox, true, true)
            .unwrap()
    }

    // ── scene ──

    #[test]
    fn test_scene_create_destroy() {
        let mut b = bridge();
        let scene = b.create_scene().unwrap();
        assert!(b.objects().scene(scene).is_ok());
        assert!(b.destroy_scene(scene));
        assert!(b.objects().scene(scene).is_err());
        assert!(!b.destroy_scene(scene));
    }

    #[test]
    fn test_add_and_remove_mesh() {
        let mut b = bridge();
        let scene = b.create_scene().unwrap();
        let m = mesh(&mut b);
        b.scene_add_mesh(scene, m).unwrap();

        let native_scene = b.objects().scene(scene).unwrap().scene;
        assert_eq!(b.engine().scenes[&native_scene].entities.len(), 1);

        b.scene_remove_mesh(scene, m).unwrap();
        assert!(b.engine().scenes[&native_scene].entities.is_empty());
    }

    #[test]
    fn test_add_mesh_to_missing_scene() {
        let mut b = bridge();
        let scene = b.create_scene().unwrap();
        let m = mesh(&mut b);
        b.destroy_scene(scene);
        assert!(matches!(b.scene_add_mesh(scene, m), Err(BridgeError::UnknownHandle(_))));
    }

    #[test]
    fn test_add_light() {
        let mut b = bridge();
        let scene = b.create_scene().unwrap();
        let light = b
            .create_light_directional([1.0, 1.0, 1.0], 10_000.0, [0.0, 1.0, -1.0], false)
            .unwrap();
        b.scene_add_light(scene, light).unwrap();

        let native_scene = b.objects().scene(scene).unwrap().scene;
        assert_eq!(b.engine().scenes[&native_scene].entities.len(), 1);
        b.scene_remove_light(scene, light).unwrap();
        assert!(b.engine().scenes[&native_scene].entities.is_empty());
    }

    #[test]
    fn test_skybox_sets_and_clears_both() {
        let mut b = bridge();
        let scene = b.create_scene().unwrap();
        let skybox = b.create_skybox(IndirectLightPreset::DefaultSky).unwrap();
        b.scene_add_skybox(scene, skybox).unwrap();

        let native_scene = b.objects().scene(scene).unwrap().scene;
        let record = &b.engine().scenes[&native_scene];
        assert!(record.skybox.is_some());
        assert!(record.indirect_light.is_some());

        b.scene_remove_skybox(scene, skybox).unwrap();
        let record = &b.engine().scenes[&native_scene];
        assert!(record.skybox.is_none());
        assert!(record.indirect_light.is_none());
    }

    #[test]
    fn test_indirect_light_set_and_clear() {
        let mut b = bridge();
        let scene = b.create_scene().unwrap();
        let ibl = b.create_indirect_light(IndirectLightPreset::NoonGrass).unwrap();
        b.scene_set_indirect_light(scene, ibl).unwrap();

        let native_scene = b.objects().scene(scene).unwrap().scene;
        let native_ibl = b.objects().indirect_light(ibl).unwrap().light;
        assert_eq!(b.engine().scenes[&native_scene].indirect_light, Some(native_ibl));

        b.scene_clear_indirect_light(scene).unwrap();
        assert_eq!(b.engine().scenes[&native_scene].indirect_light, None);
    }

    // ── viewport ──

    #[test]
    fn test_viewport_scaled_by_pixel_ratio() {
        let mut b = Bridge::new(HeadlessEngine::with_pixel_ratio(2.0), Default::default()).unwrap();
        let vp = b.create_viewport(0.0, 0.0, 800.0, 600.0).unwrap();
        assert_eq!(
            b.viewport_rect(vp).unwrap(),
            ViewportRect {
                left: 0,
                top: 0,
                width: 1600,
                height: 1200
            }
        );
    }

    #[test]
    fn test_viewport_rounds_fractional_ratio() {
        let mut b = Bridge::new(HeadlessEngine::with_pixel_ratio(1.25), Default::default()).unwrap();
        let vp = b.create_viewport(10.0, 3.0, 101.0, 99.0).unwrap();
        let rect = b.viewport_rect(vp).unwrap();
        assert_eq!((rect.left, rect.top, rect.width, rect.height), (13, 4, 126, 124));
    }

    #[test]
    fn test_viewport_rejects_negative_size() {
        let mut b = bridge();
        assert!(matches!(
            b.create_viewport(0.0, 0.0, -1.0, 10.0),
            Err(BridgeError::MalformedInput(_))
        ));
        assert!(b.create_viewport(0.0, f64::NAN, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_destroy_viewport() {
        let mut b = bridge();
        let vp = b.create_viewport(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(b.destroy_viewport(vp));
        assert!(!b.destroy_viewport(vp));
    }

    // ── view ──

    #[test]
    fn test_view_composition() {
        let mut b = Bridge::new(HeadlessEngine::with_pixel_ratio(2.0), Default::default()).unwrap();
        let view = b.create_view().unwrap();
        let cam = b.create_camera().unwrap();
        let scene = b.create_scene().unwrap();
        let vp = b.create_viewport(0.0, 0.0, 400.0, 300.0).unwrap();

        b.view_set_camera(view, cam).unwrap();
        b.view_set_scene(view, scene).unwrap();
        b.view_set_viewport(view, vp).unwrap();
        b.view_set_clear_color(view, 0.1, 0.2, 0.3).unwrap();

        let v = b.objects().view(view).unwrap();
        assert_eq!(v.camera(), Some(cam));
        assert_eq!(v.scene(), Some(scene));
        assert_eq!(v.viewport(), Some(vp));

        let record = &b.engine().views[&v.view];
        assert_eq!(record.camera, Some(b.objects().camera(cam).unwrap().camera));
        assert_eq!(record.viewport.unwrap().width, 800);
        assert_eq!(record.clear_color, Some([0.1, 0.2, 0.3, 1.0]));
        assert_eq!(b.engine().surface_size(), Some((800, 600)));
    }

    #[test]
    fn test_stale_camera_leaves_view_unchanged() {
        let mut b = bridge();
        let view = b.create_view().unwrap();
        let cam = b.create_camera().unwrap();
        b.view_set_camera(view, cam).unwrap();

        let other = b.create_camera().unwrap();
        b.destroy_camera(other);
        assert!(matches!(b.view_set_camera(view, other), Err(BridgeError::UnknownHandle(_))));
        assert_eq!(b.objects().view(view).unwrap().camera(), Some(cam));
    }

    #[test]
    fn test_destroy_view_detaches() {
        let mut b = bridge();
        let view = b.create_view().unwrap();
        let cam = b.create_camera().unwrap();
        b.view_set_camera(view, cam).unwrap();

        assert!(b.destroy_view(view));
        assert!(!b.destroy_view(view));
        assert!(b.engine().views.is_empty());
        assert!(b.objects().camera(cam).is_ok());
        assert_eq!(b.engine().invalid_destroys(), 0);
    }
}
