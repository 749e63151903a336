use std::cell::Cell;
use std::rc::Rc;

use js_sys::Array;
use sketch_render_bridge::bridge::input;
use sketch_render_bridge::{Bridge, BridgeConfig, Handle, Result};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::decode;
use crate::filament::{filament_init, FilamentEngine};

fn h(raw: u64) -> Handle {
    Handle::from_raw(raw)
}

fn created(op: &str, result: Result<Handle>) -> u64 {
    match result {
        Ok(handle) => handle.raw(),
        Err(err) => {
            log::warn!("{op} failed: {err}");
            Handle::NULL.raw()
        }
    }
}

fn applied(op: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log::warn!("{op} failed: {err}");
            false
        }
    }
}

/// Buffer writers report `false` for an empty write as well as for errors.
fn written(op: &str, result: Result<bool>) -> bool {
    match result {
        Ok(wrote) => wrote,
        Err(err) => {
            log::warn!("{op} failed: {err}");
            false
        }
    }
}

/// The render bridge as seen from JavaScript.
#[wasm_bindgen]
pub struct SketchRender {
    bridge: Bridge<FilamentEngine>,
    assets_loaded: Rc<Cell<bool>>,
}

#[wasm_bindgen]
impl SketchRender {
    /// Start Filament on `canvas`. `config` is an optional TOML document;
    /// its asset URLs are handed to Filament for prefetching.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: Option<String>) -> std::result::Result<SketchRender, JsValue> {
        let config = match config {
            Some(toml) => BridgeConfig::from_toml_str(&toml).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => BridgeConfig::default(),
        };

        let assets_loaded = Rc::new(Cell::new(false));
        let urls: Array = config.assets.urls().into_iter().map(JsValue::from_str).collect();
        let flag = Rc::clone(&assets_loaded);
        let on_ready = Closure::once_into_js(move || {
            flag.set(true);
            log::info!("Filament assets loaded");
        });
        filament_init(&urls, &on_ready);

        let engine = FilamentEngine::new(canvas)?;
        let bridge = Bridge::new(engine, config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { bridge, assets_loaded })
    }

    pub fn is_ready(&mut self) -> bool {
        if self.assets_loaded.get() {
            self.bridge.mark_ready();
        }
        self.bridge.is_ready()
    }

    /// Destroy every live object and release the engine.
    pub fn shutdown(self) {
        self.bridge.shutdown().destroy();
    }

    /// Sketch length to engine length.
    pub fn convert(&self, value: f64) -> f64 {
        self.bridge.convert(value)
    }

    /// Global name a host may publish the object under.
    pub fn published_name(&self, handle: u64) -> String {
        h(handle).published_name()
    }

    // ── camera ──

    pub fn create_camera(&mut self) -> u64 {
        created("create_camera", self.bridge.create_camera())
    }

    pub fn camera_look_at(&mut self, camera: u64, eye: &[f64], center: &[f64], up: &[f64]) -> bool {
        let result = (|| -> Result<()> {
            let (eye, center, up) = (input::point(eye)?, input::point(center)?, input::point(up)?);
            self.bridge.camera_look_at(h(camera), eye, center, up)
        })();
        applied("camera_look_at", result)
    }

    pub fn camera_set_projection(&mut self, camera: u64, fov_degrees: f64, aspect: f64, near: f64, far: f64) -> bool {
        applied(
            "camera_set_projection",
            self.bridge.camera_set_projection(h(camera), fov_degrees, aspect, near, far),
        )
    }

    /// `rows` holds 16 values, row by row.
    pub fn camera_set_model_matrix(&mut self, camera: u64, rows: &[f64]) -> bool {
        let result = input::matrix(rows).and_then(|rows| self.bridge.camera_set_model_matrix(h(camera), &rows));
        applied("camera_set_model_matrix", result)
    }

    pub fn destroy_camera(&mut self, camera: u64) -> bool {
        self.bridge.destroy_camera(h(camera))
    }

    // ── render context ──

    pub fn create_render_context(&mut self) -> u64 {
        created("create_render_context", self.bridge.create_render_context())
    }

    pub fn render(&mut self, context: u64, view: u64) -> bool {
        applied("render", self.bridge.render(h(context), h(view)))
    }

    pub fn destroy_render_context(&mut self, context: u64) -> bool {
        self.bridge.destroy_render_context(h(context))
    }

    // ── scene ──

    pub fn create_scene(&mut self) -> u64 {
        created("create_scene", self.bridge.create_scene())
    }

    pub fn destroy_scene(&mut self, scene: u64) -> bool {
        self.bridge.destroy_scene(h(scene))
    }

    pub fn scene_add_mesh(&mut self, scene: u64, mesh: u64) -> bool {
        applied("scene_add_mesh", self.bridge.scene_add_mesh(h(scene), h(mesh)))
    }

    pub fn scene_remove_mesh(&mut self, scene: u64, mesh: u64) -> bool {
        applied("scene_remove_mesh", self.bridge.scene_remove_mesh(h(scene), h(mesh)))
    }

    pub fn scene_add_light(&mut self, scene: u64, light: u64) -> bool {
        applied("scene_add_light", self.bridge.scene_add_light(h(scene), h(light)))
    }

    pub fn scene_remove_light(&mut self, scene: u64, light: u64) -> bool {
        applied("scene_remove_light", self.bridge.scene_remove_light(h(scene), h(light)))
    }

    pub fn scene_set_indirect_light(&mut self, scene: u64, indirect_light: u64) -> bool {
        applied(
            "scene_set_indirect_light",
            self.bridge.scene_set_indirect_light(h(scene), h(indirect_light)),
        )
    }

    pub fn scene_clear_indirect_light(&mut self, scene: u64) -> bool {
        applied("scene_clear_indirect_light", self.bridge.scene_clear_indirect_light(h(scene)))
    }

    pub fn scene_add_skybox(&mut self, scene: u64, skybox: u64) -> bool {
        applied("scene_add_skybox", self.bridge.scene_add_skybox(h(scene), h(skybox)))
    }

    pub fn scene_remove_skybox(&mut self, scene: u64, skybox: u64) -> bool {
        applied("scene_remove_skybox", self.bridge.scene_remove_skybox(h(scene), h(skybox)))
    }

    // ── viewport and view ──

    /// CSS pixels; scaled by the device pixel ratio.
    pub fn create_viewport(&mut self, left: f64, top: f64, width: f64, height: f64) -> u64 {
        created("create_viewport", self.bridge.create_viewport(left, top, width, height))
    }

    pub fn destroy_viewport(&mut self, viewport: u64) -> bool {
        self.bridge.destroy_viewport(h(viewport))
    }

    pub fn create_view(&mut self) -> u64 {
        created("create_view", self.bridge.create_view())
    }

    pub fn destroy_view(&mut self, view: u64) -> bool {
        self.bridge.destroy_view(h(view))
    }

    pub fn view_set_camera(&mut self, view: u64, camera: u64) -> bool {
        applied("view_set_camera", self.bridge.view_set_camera(h(view), h(camera)))
    }

    pub fn view_set_scene(&mut self, view: u64, scene: u64) -> bool {
        applied("view_set_scene", self.bridge.view_set_scene(h(view), h(scene)))
    }

    pub fn view_set_viewport(&mut self, view: u64, viewport: u64) -> bool {
        applied("view_set_viewport", self.bridge.view_set_viewport(h(view), h(viewport)))
    }

    pub fn view_set_clear_color(&mut self, view: u64, r: f32, g: f32, b: f32) -> bool {
        applied("view_set_clear_color", self.bridge.view_set_clear_color(h(view), r, g, b))
    }

    // ── vertex and index buffers ──

    pub fn create_vertex_buffer(&mut self, format: u32, vertex_count: u32) -> u64 {
        let result = decode::vertex_format(format).and_then(|format| self.bridge.create_vertex_buffer(format, vertex_count));
        created("create_vertex_buffer", result)
    }

    pub fn destroy_vertex_buffer(&mut self, buffer: u64) -> bool {
        self.bridge.destroy_vertex_buffer(h(buffer))
    }

    pub fn set_vertices_pos(&mut self, buffer: u64, positions: &[f64], src_offset: u32, dst_offset: u32, count: u32) -> bool {
        written(
            "set_vertices_pos",
            self.bridge.set_vertices_pos(h(buffer), positions, src_offset, dst_offset, count),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_vertices_pos_color(
        &mut self,
        buffer: u64,
        positions: &[f64],
        colors: &[u32],
        src_offset: u32,
        dst_offset: u32,
        count: u32,
    ) -> bool {
        written(
            "set_vertices_pos_color",
            self.bridge
                .set_vertices_pos_color(h(buffer), positions, colors, src_offset, dst_offset, count),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_vertices_pos_uv0(
        &mut self,
        buffer: u64,
        positions: &[f64],
        uvs: &[f32],
        src_offset: u32,
        dst_offset: u32,
        count: u32,
    ) -> bool {
        written(
            "set_vertices_pos_uv0",
            self.bridge
                .set_vertices_pos_uv0(h(buffer), positions, uvs, src_offset, dst_offset, count),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_vertices_pos_uv0_tan(
        &mut self,
        buffer: u64,
        positions: &[f64],
        normals: &[f32],
        uvs: &[f32],
        src_offset: u32,
        dst_offset: u32,
        count: u32,
    ) -> bool {
        written(
            "set_vertices_pos_uv0_tan",
            self.bridge
                .set_vertices_pos_uv0_tan(h(buffer), positions, normals, uvs, src_offset, dst_offset, count),
        )
    }

    pub fn create_index_buffer(&mut self, index_count: u32) -> u64 {
        created("create_index_buffer", self.bridge.create_index_buffer(index_count))
    }

    pub fn destroy_index_buffer(&mut self, buffer: u64) -> bool {
        self.bridge.destroy_index_buffer(h(buffer))
    }

    pub fn set_indices(&mut self, buffer: u64, indices: &[u32], dst_offset: u32, count: u32) -> bool {
        written("set_indices", self.bridge.set_indices(h(buffer), indices, dst_offset, count))
    }

    // ── bounding box ──

    pub fn create_bounding_box(&mut self, min: &[f64], max: &[f64]) -> u64 {
        let result = (|| -> Result<Handle> {
            let (min, max) = (input::point(min)?, input::point(max)?);
            self.bridge.create_bounding_box(min, max)
        })();
        created("create_bounding_box", result)
    }

    /// Flat `x, y, z` triplets.
    pub fn create_bounding_box_from_points(&mut self, points: &[f64]) -> u64 {
        let result = input::points(points).and_then(|points| self.bridge.create_bounding_box_from_points(&points));
        created("create_bounding_box_from_points", result)
    }

    pub fn destroy_bounding_box(&mut self, bbox: u64) -> bool {
        self.bridge.destroy_bounding_box(h(bbox))
    }

    // ── mesh ──

    pub fn create_mesh_sub_geometry(&mut self, primitive: u32, index_offset: u32, index_count: u32, material: u64) -> u64 {
        let result = decode::primitive(primitive).and_then(|primitive| {
            self.bridge
                .create_mesh_sub_geometry(primitive, index_offset, index_count, h(material))
        });
        created("create_mesh_sub_geometry", result)
    }

    pub fn destroy_mesh_sub_geometry(&mut self, sub_geometry: u64) -> bool {
        self.bridge.destroy_mesh_sub_geometry(h(sub_geometry))
    }

    pub fn create_mesh(
        &mut self,
        vertex_buffer: u64,
        index_buffer: u64,
        sub_geometries: &[u64],
        bounding_box: u64,
        cast_shadows: bool,
        receive_shadows: bool,
    ) -> u64 {
        let result = self.bridge.create_mesh(
            h(vertex_buffer),
            h(index_buffer),
            &decode::handles(sub_geometries),
            h(bounding_box),
            cast_shadows,
            receive_shadows,
        );
        created("create_mesh", result)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_mesh_prim(
        &mut self,
        primitive: u32,
        vertex_buffer: u64,
        index_buffer: u64,
        index_offset: u32,
        index_count: u32,
        material: u64,
        bounding_box: u64,
        cast_shadows: bool,
        receive_shadows: bool,
    ) -> u64 {
        let result = decode::primitive(primitive).and_then(|primitive| {
            self.bridge.create_mesh_prim(
                primitive,
                h(vertex_buffer),
                h(index_buffer),
                index_offset,
                index_count,
                h(material),
                h(bounding_box),
                cast_shadows,
                receive_shadows,
            )
        });
        created("create_mesh_prim", result)
    }

    /// Rebuild `mesh`'s renderable in place and return a new handle to it.
    #[allow(clippy::too_many_arguments)]
    pub fn reuse_mesh(
        &mut self,
        mesh: u64,
        vertex_buffer: u64,
        index_buffer: u64,
        sub_geometries: &[u64],
        bounding_box: u64,
        cast_shadows: bool,
        receive_shadows: bool,
    ) -> u64 {
        let result = self.bridge.reuse_mesh(
            h(mesh),
            h(vertex_buffer),
            h(index_buffer),
            &decode::handles(sub_geometries),
            h(bounding_box),
            cast_shadows,
            receive_shadows,
        );
        created("reuse_mesh", result)
    }

    pub fn destroy_mesh(&mut self, mesh: u64) -> bool {
        self.bridge.destroy_mesh(h(mesh))
    }

    /// Sketch-space transform, 16 values row by row.
    pub fn mesh_set_transform(&mut self, mesh: u64, rows: &[f64]) -> bool {
        let result = input::matrix(rows).and_then(|rows| self.bridge.mesh_set_transform(h(mesh), &rows));
        applied("mesh_set_transform", result)
    }

    pub fn mesh_set_transform_unmodified(&mut self, mesh: u64, rows: &[f64]) -> bool {
        let result = input::matrix(rows).and_then(|rows| self.bridge.mesh_set_transform_unmodified(h(mesh), &rows));
        applied("mesh_set_transform_unmodified", result)
    }

    pub fn mesh_set_material(&mut self, mesh: u64, index: u32, material: u64) -> bool {
        applied(
            "mesh_set_material",
            self.bridge.mesh_set_material(h(mesh), index as usize, h(material)),
        )
    }

    // ── material instance ──

    pub fn create_material_instance(&mut self, material_type: u32) -> u64 {
        let result = decode::material_type(material_type).and_then(|ty| self.bridge.create_material_instance(ty));
        created("create_material_instance", result)
    }

    pub fn destroy_material_instance(&mut self, material: u64) -> bool {
        self.bridge.destroy_material_instance(h(material))
    }

    /// sRGB, channels 0..=255.
    pub fn material_base_color(&mut self, material: u64, r: f32, g: f32, b: f32, a: f32) -> bool {
        applied("material_base_color", self.bridge.material_base_color(h(material), r, g, b, a))
    }

    pub fn material_base_color_linear(&mut self, material: u64, r: f32, g: f32, b: f32, a: f32) -> bool {
        applied(
            "material_base_color_linear",
            self.bridge.material_base_color_linear(h(material), r, g, b, a),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn material_set_color(&mut self, material: u64, name: &str, r: f32, g: f32, b: f32, a: f32) -> bool {
        applied(
            "material_set_color",
            self.bridge.material_set_color(h(material), name, r, g, b, a),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn material_set_color_linear(&mut self, material: u64, name: &str, r: f32, g: f32, b: f32, a: f32) -> bool {
        applied(
            "material_set_color_linear",
            self.bridge.material_set_color_linear(h(material), name, r, g, b, a),
        )
    }

    pub fn material_set_value(&mut self, material: u64, name: &str, value: f32) -> bool {
        applied("material_set_value", self.bridge.material_set_value(h(material), name, value))
    }

    pub fn material_metallic(&mut self, material: u64, value: f32) -> bool {
        applied("material_metallic", self.bridge.material_metallic(h(material), value))
    }

    pub fn material_roughness(&mut self, material: u64, value: f32) -> bool {
        applied("material_roughness", self.bridge.material_roughness(h(material), value))
    }

    pub fn material_reflectance(&mut self, material: u64, value: f32) -> bool {
        applied("material_reflectance", self.bridge.material_reflectance(h(material), value))
    }

    pub fn material_set_double_sided(&mut self, material: u64, double_sided: bool) -> bool {
        applied(
            "material_set_double_sided",
            self.bridge.material_set_double_sided(h(material), double_sided),
        )
    }

    pub fn material_set_culling_mode(&mut self, material: u64, mode: u32) -> bool {
        let result = decode::culling_mode(mode).and_then(|mode| self.bridge.material_set_culling_mode(h(material), mode));
        applied("material_set_culling_mode", result)
    }

    pub fn material_set_clip_space_transform(
        &mut self,
        material: u64,
        scale_x: f32,
        scale_y: f32,
        translate_x: f32,
        translate_y: f32,
    ) -> bool {
        applied(
            "material_set_clip_space_transform",
            self.bridge
                .material_set_clip_space_transform(h(material), scale_x, scale_y, translate_x, translate_y),
        )
    }

    /// Bind `texture` to one of the standard texture slots.
    pub fn material_texture(&mut self, material: u64, slot: u32, texture: u64, wrap: u32, min: u32, mag: u32) -> bool {
        let result = (|| -> Result<()> {
            let slot = decode::texture_slot(slot)?;
            let sampler = decode::sampler(wrap, min, mag)?;
            self.bridge.material_texture(h(material), slot, h(texture), sampler)
        })();
        applied("material_texture", result)
    }

    pub fn material_color_lut(&mut self, material: u64, texture: u64) -> bool {
        applied("material_color_lut", self.bridge.material_color_lut(h(material), h(texture)))
    }

    // ── texture ──

    pub fn create_texture(&mut self, width: u32, height: u32, levels: u32, texture_type: u32, compression: u32) -> u64 {
        let result = decode::texture(width, height, levels, texture_type, compression)
            .and_then(|desc| self.bridge.create_texture(desc));
        created("create_texture", result)
    }

    pub fn texture_set_image(&mut self, texture: u64, level: u32, data: &[u8]) -> bool {
        applied("texture_set_image", self.bridge.texture_set_image(h(texture), level, data))
    }

    pub fn destroy_texture(&mut self, texture: u64) -> bool {
        self.bridge.destroy_texture(h(texture))
    }

    // ── lighting ──

    pub fn create_indirect_light(&mut self, preset: u32) -> u64 {
        let result = decode::preset(preset).and_then(|preset| self.bridge.create_indirect_light(preset));
        created("create_indirect_light", result)
    }

    pub fn create_indirect_light_cubemap(&mut self, preset: u32, cubemap: u64) -> u64 {
        let result =
            decode::preset(preset).and_then(|preset| self.bridge.create_indirect_light_cubemap(preset, h(cubemap)));
        created("create_indirect_light_cubemap", result)
    }

    pub fn indirect_light_intensity(&mut self, indirect_light: u64, intensity: f32) -> bool {
        applied(
            "indirect_light_intensity",
            self.bridge.indirect_light_intensity(h(indirect_light), intensity),
        )
    }

    pub fn destroy_indirect_light(&mut self, indirect_light: u64) -> bool {
        self.bridge.destroy_indirect_light(h(indirect_light))
    }

    pub fn create_skybox(&mut self, preset: u32) -> u64 {
        let result = decode::preset(preset).and_then(|preset| self.bridge.create_skybox(preset));
        created("create_skybox", result)
    }

    pub fn destroy_skybox(&mut self, skybox: u64) -> bool {
        self.bridge.destroy_skybox(h(skybox))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_light_directional(
        &mut self,
        r: f32,
        g: f32,
        b: f32,
        intensity: f32,
        direction: &[f32],
        cast_shadows: bool,
    ) -> u64 {
        let result = input::vector(direction)
            .and_then(|direction| self.bridge.create_light_directional([r, g, b], intensity, direction, cast_shadows));
        created("create_light_directional", result)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_light_sun(&mut self, r: f32, g: f32, b: f32, intensity: f32, direction: &[f32], cast_shadows: bool) -> u64 {
        let result = input::vector(direction)
            .and_then(|direction| self.bridge.create_light_sun([r, g, b], intensity, direction, cast_shadows));
        created("create_light_sun", result)
    }

    pub fn light_color(&mut self, light: u64, r: f32, g: f32, b: f32) -> bool {
        applied("light_color", self.bridge.light_color(h(light), [r, g, b]))
    }

    pub fn light_intensity(&mut self, light: u64, intensity: f32) -> bool {
        applied("light_intensity", self.bridge.light_intensity(h(light), intensity))
    }

    pub fn light_direction(&mut self, light: u64, direction: &[f32]) -> bool {
        let result = input::vector(direction).and_then(|direction| self.bridge.light_direction(h(light), direction));
        applied("light_direction", result)
    }

    pub fn destroy_light(&mut self, light: u64) -> bool {
        self.bridge.destroy_light(h(light))
    }
}
