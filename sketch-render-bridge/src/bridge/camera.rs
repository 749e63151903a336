use crate::engine::{Projection, RenderEngine};
use crate::error::Result;
use crate::handle::Handle;
use crate::objects::{BridgeObject, Camera, RenderContext};

use super::Bridge;

impl<E: RenderEngine> Bridge<E> {
    // ── camera ──

    /// New camera looking along +Y from one meter up, with the configured
    /// default projection.
    pub fn create_camera(&mut self) -> Result<Handle> {
        let camera = self.engine.create_camera()?;
        let defaults = &self.config.camera;
        let meter = self.units.one_meter();

        let projection = Projection {
            fov_degrees: defaults.fov_degrees,
            aspect: defaults.aspect,
            near: self.units.scalar(defaults.near_meters * meter),
            far: self.units.scalar(defaults.far_meters * meter),
        };
        self.engine.camera_set_projection(&camera, &projection);
        self.engine.camera_look_at(
            &camera,
            self.units.point([0.0, 0.0, meter]),
            self.units.point([0.0, meter, meter]),
            [0.0, 0.0, 1.0],
        );

        let handle = self.objects.insert(BridgeObject::Camera(Camera { camera }));
        log::debug!("Created camera {handle}");
        Ok(handle)
    }

    /// Eye and center are sketch points. `up` is a direction and is not scaled.
    pub fn camera_look_at(&mut self, camera: Handle, eye: [f64; 3], center: [f64; 3], up: [f64; 3]) -> Result<()> {
        let camera = self.objects.camera(camera)?;
        let up = [up[0] as f32, up[1] as f32, up[2] as f32];
        self.engine
            .camera_look_at(&camera.camera, self.units.point(eye), self.units.point(center), up);
        Ok(())
    }

    /// Vertical field of view; `near` and `far` in sketch units.
    pub fn camera_set_projection(
        &mut self,
        camera: Handle,
        fov_degrees: f64,
        aspect: f64,
        near: f64,
        far: f64,
    ) -> Result<()> {
        let camera = self.objects.camera(camera)?;
        let projection = Projection {
            fov_degrees,
            aspect,
            near: self.units.scalar(near),
            far: self.units.scalar(far),
        };
        self.engine.camera_set_projection(&camera.camera, &projection);
        Ok(())
    }

    pub fn camera_set_model_matrix(&mut self, camera: Handle, rows: &[[f64; 4]; 4]) -> Result<()> {
        let camera = self.objects.camera(camera)?;
        self.engine
            .camera_set_model_matrix(&camera.camera, &self.units.matrix(rows));
        Ok(())
    }

    pub fn destroy_camera(&mut self, camera: Handle) -> bool {
        match self.objects.take_camera(camera) {
            Some(Camera { camera: native }) => {
                self.engine.destroy_camera(native);
                log::debug!("Destroyed camera {camera}");
                true
            }
            None => false,
        }
    }

    // ── render context ──

    pub fn create_render_context(&mut self) -> Result<Handle> {
        let swap_chain = self.engine.create_swap_chain()?;
        let renderer = match self.engine.create_renderer() {
            Ok(renderer) => renderer,
            Err(err) => {
                self.engine.destroy_swap_chain(swap_chain);
                return Err(err.into());
            }
        };
        let handle = self
            .objects
            .insert(BridgeObject::RenderContext(RenderContext { swap_chain, renderer }));
        log::debug!("Created render context {handle}");
        Ok(handle)
    }

    /// Draw one frame of `view` into the context's swap chain.
    pub fn render(&mut self, context: Handle, view: Handle) -> Result<()> {
        let context = self.objects.render_context(context)?;
        let view = self.objects.view(view)?;
        self.engine.render(&context.renderer, &context.swap_chain, &view.view);
        Ok(())
    }

    pub fn destroy_render_context(&mut self, context: Handle) -> bool {
        match self.objects.take_render_context(context) {
            Some(ctx) => {
                self.engine.destroy_renderer(ctx.renderer);
                self.engine.destroy_swap_chain(ctx.swap_chain);
                log::debug!("Destroyed render context {context}");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{approx_eq, approx_eq3, bridge};
    use crate::error::BridgeError;
    use crate::handle::Handle;

    // ── camera ──

    #[test]
    fn test_camera_defaults() {
        let mut b = bridge();
        let cam = b.create_camera().unwrap();
        let native = b.objects().camera(cam).unwrap().camera;
        let record = &b.engine().cameras[&native];

        assert!(approx_eq3(record.eye, [0.0, 0.0, 1.0]));
        assert!(approx_eq3(record.center, [0.0, 1.0, 1.0]));
        assert_eq!(record.up, [0.0, 0.0, 1.0]);

        let projection = record.projection.unwrap();
        assert_eq!(projection.fov_degrees, 45.0);
        assert!((projection.aspect - 16.0 / 9.0).abs() < 1e-12);
        assert!((projection.near - 0.05).abs() < 1e-9);
        assert!((projection.far - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_look_at_converts_points_not_up() {
        let mut b = bridge();
        let cam = b.create_camera().unwrap();
        b.camera_look_at(cam, [5000.0, 0.0, 2500.0], [0.0, 10000.0, 0.0], [0.0, 0.0, 1.0])
            .unwrap();

        let native = b.objects().camera(cam).unwrap().camera;
        let record = &b.engine().cameras[&native];
        assert!(approx_eq3(record.eye, [1.0, 0.0, 0.5]));
        assert!(approx_eq3(record.center, [0.0, 2.0, 0.0]));
        assert_eq!(record.up, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_set_projection_converts_planes() {
        let mut b = bridge();
        let cam = b.create_camera().unwrap();
        b.camera_set_projection(cam, 60.0, 1.5, 500.0, 50_000.0).unwrap();

        let native = b.objects().camera(cam).unwrap().camera;
        let projection = b.engine().cameras[&native].projection.unwrap();
        assert_eq!(projection.fov_degrees, 60.0);
        assert!((projection.near - 0.1).abs() < 1e-12);
        assert!((projection.far - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_model_matrix_converts_translation_only() {
        let mut b = bridge();
        let cam = b.create_camera().unwrap();
        let rows = [
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [5000.0, 10000.0, 15000.0, 1.0],
        ];
        b.camera_set_model_matrix(cam, &rows).unwrap();

        let native = b.objects().camera(cam).unwrap().camera;
        let m = b.engine().cameras[&native].model_matrix.unwrap();
        assert_eq!(&m[..12], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        assert!(approx_eq(m[12], 1.0));
        assert!(approx_eq(m[13], 2.0));
        assert!(approx_eq(m[14], 3.0));
        assert_eq!(m[15], 1.0);
    }

    #[test]
    fn test_camera_destroy_twice() {
        let mut b = bridge();
        let cam = b.create_camera().unwrap();
        assert!(b.destroy_camera(cam));
        assert!(!b.destroy_camera(cam));
        assert!(matches!(
            b.camera_look_at(cam, [0.0; 3], [0.0; 3], [0.0; 3]),
            Err(BridgeError::UnknownHandle(_))
        ));
        assert_eq!(b.engine().invalid_destroys(), 0);
    }

    #[test]
    fn test_create_camera_failure_adds_nothing() {
        let mut b = bridge();
        b.engine_mut().fail_on("create_camera");
        assert!(matches!(b.create_camera(), Err(BridgeError::Engine(_))));
        assert!(b.objects().is_empty());
    }

    #[test]
    fn test_destroy_camera_rejects_other_kinds() {
        let mut b = bridge();
        let scene = b.create_scene().unwrap();
        assert!(!b.destroy_camera(scene));
        assert!(b.contains(scene));
        assert!(!b.destroy_camera(Handle::NULL));
    }

    // ── render context ──

    #[test]
    fn test_render_records_frame() {
        let mut b = bridge();
        let ctx = b.create_render_context().unwrap();
        let view = b.create_view().unwrap();
        b.render(ctx, view).unwrap();
        b.render(ctx, view).unwrap();

        let native_view = b.objects().view(view).unwrap().view;
        assert_eq!(b.engine().frames.len(), 2);
        assert_eq!(b.engine().frames[0].view, native_view);
    }

    #[test]
    fn test_render_with_missing_view_draws_nothing() {
        let mut b = bridge();
        let ctx = b.create_render_context().unwrap();
        let view = b.create_view().unwrap();
        b.destroy_view(view);
        assert!(b.render(ctx, view).is_err());
        assert!(b.engine().frames.is_empty());
    }

    #[test]
    fn test_renderer_failure_releases_swap_chain() {
        let mut b = bridge();
        b.engine_mut().fail_on("create_renderer");
        assert!(b.create_render_context().is_err());
        assert_eq!(b.engine().live_count(), 0);
    }

    #[test]
    fn test_destroy_render_context() {
        let mut b = bridge();
        let ctx = b.create_render_context().unwrap();
        assert_eq!(b.engine().live_count(), 2);
        assert!(b.destroy_render_context(ctx));
        assert!(!b.destroy_render_context(ctx));
        assert_eq!(b.engine().live_count(), 0);
    }
}
