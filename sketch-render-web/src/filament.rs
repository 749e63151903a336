//! Filament's JavaScript API through `wasm-bindgen`, and the
//! [`RenderEngine`] implementation built on it.
//!
//! Builders are chained exactly as in Filament's JS samples. Small value
//! arrays (vectors, matrices, viewports) go over as plain JS arrays since the
//! Embind value types index into them; bulk data goes over as typed arrays.

use js_sys::{Array, Object, Reflect};
use sketch_render_bridge::engine::{
    CullingMode, EngineError, EngineResult, IndexBufferDescriptor, IndirectLightDescriptor, LightDescriptor,
    Projection, RenderEngine, RenderableDescriptor, RgbaType, TextureDescriptor, VertexBufferDescriptor,
    ViewportRect,
};
use sketch_render_shared::lighting::flatten_sh;
use sketch_render_shared::texture::TextureSampler;
use sketch_render_shared::BoundingBox;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use crate::names::{self, FilamentName, PixelData};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Filament, js_name = init)]
    pub fn filament_init(assets: &Array, on_ready: &JsValue);

    // ── engine ──

    pub type Engine;

    #[wasm_bindgen(js_namespace = ["Filament", "Engine"], js_name = create, catch)]
    fn create_engine(canvas: &HtmlCanvasElement) -> Result<Engine, JsValue>;
    #[wasm_bindgen(js_namespace = ["Filament", "Engine"], js_name = destroy)]
    fn destroy_engine(engine: &Engine);

    #[wasm_bindgen(method, catch, js_name = createSwapChain)]
    fn create_swap_chain(this: &Engine) -> Result<SwapChain, JsValue>;
    #[wasm_bindgen(method, catch, js_name = createRenderer)]
    fn create_renderer(this: &Engine) -> Result<Renderer, JsValue>;
    #[wasm_bindgen(method, catch, js_name = createScene)]
    fn create_scene(this: &Engine) -> Result<Scene, JsValue>;
    #[wasm_bindgen(method, catch, js_name = createView)]
    fn create_view(this: &Engine) -> Result<View, JsValue>;
    #[wasm_bindgen(method, catch, js_name = createCamera)]
    fn create_camera(this: &Engine) -> Result<Camera, JsValue>;
    #[wasm_bindgen(method, catch, js_name = createMaterial)]
    fn create_material(this: &Engine, url: &str) -> Result<Material, JsValue>;
    #[wasm_bindgen(method, catch, js_name = createIblFromKtx)]
    fn create_ibl_from_ktx(this: &Engine, url: &str) -> Result<IndirectLight, JsValue>;
    #[wasm_bindgen(method, catch, js_name = createSkyFromKtx)]
    fn create_sky_from_ktx(this: &Engine, url: &str) -> Result<Skybox, JsValue>;

    #[wasm_bindgen(method, js_name = getRenderableManager)]
    fn renderable_manager(this: &Engine) -> RenderableManager;
    #[wasm_bindgen(method, js_name = getTransformManager)]
    fn transform_manager(this: &Engine) -> TransformManager;
    #[wasm_bindgen(method, js_name = getLightManager)]
    fn light_manager(this: &Engine) -> LightManager;

    #[wasm_bindgen(method, js_name = destroySwapChain)]
    fn destroy_swap_chain(this: &Engine, swap_chain: &SwapChain);
    #[wasm_bindgen(method, js_name = destroyRenderer)]
    fn destroy_renderer(this: &Engine, renderer: &Renderer);
    #[wasm_bindgen(method, js_name = destroyScene)]
    fn destroy_scene(this: &Engine, scene: &Scene);
    #[wasm_bindgen(method, js_name = destroyView)]
    fn destroy_view(this: &Engine, view: &View);
    #[wasm_bindgen(method, js_name = destroyCamera)]
    fn destroy_camera(this: &Engine, camera: &Camera);
    #[wasm_bindgen(method, js_name = destroyMaterial)]
    fn destroy_material(this: &Engine, material: &Material);
    #[wasm_bindgen(method, js_name = destroyMaterialInstance)]
    fn destroy_material_instance(this: &Engine, instance: &MaterialInstance);
    #[wasm_bindgen(method, js_name = destroyTexture)]
    fn destroy_texture(this: &Engine, texture: &Texture);
    #[wasm_bindgen(method, js_name = destroyVertexBuffer)]
    fn destroy_vertex_buffer(this: &Engine, buffer: &VertexBuffer);
    #[wasm_bindgen(method, js_name = destroyIndexBuffer)]
    fn destroy_index_buffer(this: &Engine, buffer: &IndexBuffer);
    #[wasm_bindgen(method, js_name = destroyIndirectLight)]
    fn destroy_indirect_light(this: &Engine, light: &IndirectLight);
    #[wasm_bindgen(method, js_name = destroySkybox)]
    fn destroy_skybox(this: &Engine, skybox: &Skybox);

    // ── entities ──

    #[derive(Clone, Debug)]
    pub type Entity;

    type EntityManager;

    #[wasm_bindgen(js_namespace = ["Filament", "EntityManager"], js_name = get)]
    fn entity_manager() -> EntityManager;
    #[wasm_bindgen(method)]
    fn create(this: &EntityManager) -> Entity;
    #[wasm_bindgen(method)]
    fn destroy(this: &EntityManager, entity: &Entity);

    // ── camera, view, scene, renderer ──

    pub type Camera;

    #[wasm_bindgen(method, js_name = lookAt)]
    fn look_at(this: &Camera, eye: &JsValue, center: &JsValue, up: &JsValue);
    #[wasm_bindgen(method, js_name = setProjectionFov)]
    fn set_projection_fov(this: &Camera, fov: f64, aspect: f64, near: f64, far: f64, direction: &JsValue);
    #[wasm_bindgen(method, js_name = setModelMatrix)]
    fn set_model_matrix(this: &Camera, matrix: &JsValue);

    pub type View;

    #[wasm_bindgen(method, js_name = setCamera)]
    fn set_camera(this: &View, camera: &JsValue);
    #[wasm_bindgen(method, js_name = setScene)]
    fn set_scene(this: &View, scene: &JsValue);
    #[wasm_bindgen(method, js_name = setViewport)]
    fn set_viewport(this: &View, viewport: &JsValue);
    #[wasm_bindgen(method, js_name = setClearColor)]
    fn set_clear_color(this: &View, color: &JsValue);

    pub type Scene;

    #[wasm_bindgen(method, js_name = addEntity)]
    fn add_entity(this: &Scene, entity: &Entity);
    #[wasm_bindgen(method)]
    fn remove(this: &Scene, entity: &Entity);
    #[wasm_bindgen(method, js_name = setIndirectLight)]
    fn set_indirect_light(this: &Scene, light: &JsValue);
    #[wasm_bindgen(method, js_name = setSkybox)]
    fn set_skybox(this: &Scene, skybox: &JsValue);

    pub type Renderer;
    pub type SwapChain;

    #[wasm_bindgen(method)]
    fn render(this: &Renderer, swap_chain: &SwapChain, view: &View);

    // ── buffers ──

    pub type VertexBuffer;
    type VertexBufferBuilder;

    #[wasm_bindgen(js_namespace = ["Filament", "VertexBuffer"], js_name = Builder)]
    fn vertex_buffer_builder() -> VertexBufferBuilder;
    #[wasm_bindgen(method, js_name = vertexCount)]
    fn vertex_count(this: &VertexBufferBuilder, count: u32) -> VertexBufferBuilder;
    #[wasm_bindgen(method, js_name = bufferCount)]
    fn buffer_count(this: &VertexBufferBuilder, count: u32) -> VertexBufferBuilder;
    #[wasm_bindgen(method)]
    fn attribute(
        this: &VertexBufferBuilder,
        attribute: &JsValue,
        buffer_index: u32,
        ty: &JsValue,
        byte_offset: u32,
        stride: u32,
    ) -> VertexBufferBuilder;
    #[wasm_bindgen(method)]
    fn normalized(this: &VertexBufferBuilder, attribute: &JsValue) -> VertexBufferBuilder;
    #[wasm_bindgen(method, catch)]
    fn build(this: &VertexBufferBuilder, engine: &Engine) -> Result<VertexBuffer, JsValue>;

    #[wasm_bindgen(method, js_name = setBufferAt)]
    fn set_buffer_at(this: &VertexBuffer, engine: &Engine, slot: u32, data: &[u8], byte_offset: u32);

    pub type IndexBuffer;
    type IndexBufferBuilder;

    #[wasm_bindgen(js_namespace = ["Filament", "IndexBuffer"], js_name = Builder)]
    fn index_buffer_builder() -> IndexBufferBuilder;
    #[wasm_bindgen(method, js_name = indexCount)]
    fn index_count(this: &IndexBufferBuilder, count: u32) -> IndexBufferBuilder;
    #[wasm_bindgen(method, js_name = bufferType)]
    fn buffer_type(this: &IndexBufferBuilder, ty: &JsValue) -> IndexBufferBuilder;
    #[wasm_bindgen(method, catch)]
    fn build(this: &IndexBufferBuilder, engine: &Engine) -> Result<IndexBuffer, JsValue>;

    #[wasm_bindgen(method, js_name = setBuffer)]
    fn set_buffer(this: &IndexBuffer, engine: &Engine, data: &[u8], byte_offset: u32);

    // ── renderables and transforms ──

    type RenderableBuilder;

    #[wasm_bindgen(js_namespace = ["Filament", "RenderableManager"], js_name = Builder)]
    fn renderable_builder(count: u32) -> RenderableBuilder;
    #[wasm_bindgen(method, js_name = boundingBox)]
    fn bounding_box(this: &RenderableBuilder, bbox: &JsValue) -> RenderableBuilder;
    #[wasm_bindgen(method)]
    fn material(this: &RenderableBuilder, index: u32, instance: &MaterialInstance) -> RenderableBuilder;
    #[wasm_bindgen(method, js_name = geometryOffset)]
    fn geometry_offset(
        this: &RenderableBuilder,
        index: u32,
        primitive: &JsValue,
        vertices: &VertexBuffer,
        indices: &IndexBuffer,
        offset: u32,
        count: u32,
    ) -> RenderableBuilder;
    #[wasm_bindgen(method)]
    fn culling(this: &RenderableBuilder, enabled: bool) -> RenderableBuilder;
    #[wasm_bindgen(method, js_name = castShadows)]
    fn cast_shadows(this: &RenderableBuilder, enabled: bool) -> RenderableBuilder;
    #[wasm_bindgen(method, js_name = receiveShadows)]
    fn receive_shadows(this: &RenderableBuilder, enabled: bool) -> RenderableBuilder;
    #[wasm_bindgen(method, catch)]
    fn build(this: &RenderableBuilder, engine: &Engine, entity: &Entity) -> Result<(), JsValue>;

    type RenderableManager;

    #[wasm_bindgen(method, js_name = hasComponent)]
    fn has_component(this: &RenderableManager, entity: &Entity) -> bool;
    #[wasm_bindgen(method, js_name = getInstance)]
    fn get_instance(this: &RenderableManager, entity: &Entity) -> ComponentInstance;
    #[wasm_bindgen(method, js_name = setMaterialInstanceAt)]
    fn set_material_instance_at(
        this: &RenderableManager,
        instance: &ComponentInstance,
        index: u32,
        material: &MaterialInstance,
    );
    #[wasm_bindgen(method)]
    fn destroy(this: &RenderableManager, entity: &Entity);

    type TransformManager;

    #[wasm_bindgen(method, js_name = hasComponent)]
    fn has_component(this: &TransformManager, entity: &Entity) -> bool;
    #[wasm_bindgen(method)]
    fn create(this: &TransformManager, entity: &Entity);
    #[wasm_bindgen(method, js_name = getInstance)]
    fn get_instance(this: &TransformManager, entity: &Entity) -> ComponentInstance;
    #[wasm_bindgen(method, js_name = setTransform)]
    fn set_transform(this: &TransformManager, instance: &ComponentInstance, matrix: &JsValue);
    #[wasm_bindgen(method)]
    fn destroy(this: &TransformManager, entity: &Entity);

    /// Embind component instance; must be released with `delete`.
    type ComponentInstance;

    #[wasm_bindgen(method)]
    fn delete(this: &ComponentInstance);

    // ── materials and textures ──

    pub type Material;
    pub type MaterialInstance;

    #[wasm_bindgen(method, catch, js_name = createInstance)]
    fn create_instance(this: &Material) -> Result<MaterialInstance, JsValue>;

    #[wasm_bindgen(method, js_name = setFloatParameter)]
    fn set_float_parameter(this: &MaterialInstance, name: &str, value: f32);
    #[wasm_bindgen(method, js_name = setFloat4Parameter)]
    fn set_float4_parameter(this: &MaterialInstance, name: &str, value: &JsValue);
    #[wasm_bindgen(method, js_name = setColor4Parameter)]
    fn set_color4_parameter(this: &MaterialInstance, name: &str, ty: &JsValue, value: &JsValue);
    #[wasm_bindgen(method, js_name = setTextureParameter)]
    fn set_texture_parameter(this: &MaterialInstance, name: &str, texture: &Texture, sampler: &Sampler);
    #[wasm_bindgen(method, js_name = setDoubleSided)]
    fn set_double_sided(this: &MaterialInstance, double_sided: bool);
    #[wasm_bindgen(method, js_name = setCullingMode)]
    fn set_culling_mode(this: &MaterialInstance, mode: &JsValue);

    #[wasm_bindgen(js_namespace = Filament, js_name = TextureSampler)]
    type Sampler;

    #[wasm_bindgen(constructor, js_namespace = Filament, js_class = TextureSampler)]
    fn new(min: &JsValue, mag: &JsValue, wrap: &JsValue) -> Sampler;

    pub type Texture;
    type TextureBuilder;

    #[wasm_bindgen(js_namespace = ["Filament", "Texture"], js_name = Builder)]
    fn texture_builder() -> TextureBuilder;
    #[wasm_bindgen(method)]
    fn width(this: &TextureBuilder, width: u32) -> TextureBuilder;
    #[wasm_bindgen(method)]
    fn height(this: &TextureBuilder, height: u32) -> TextureBuilder;
    #[wasm_bindgen(method)]
    fn levels(this: &TextureBuilder, levels: u32) -> TextureBuilder;
    #[wasm_bindgen(method)]
    fn sampler(this: &TextureBuilder, ty: &JsValue) -> TextureBuilder;
    #[wasm_bindgen(method)]
    fn format(this: &TextureBuilder, format: &JsValue) -> TextureBuilder;
    #[wasm_bindgen(method, catch)]
    fn build(this: &TextureBuilder, engine: &Engine) -> Result<Texture, JsValue>;

    #[wasm_bindgen(method, js_name = setImage)]
    fn set_image(this: &Texture, engine: &Engine, level: u32, pixels: &JsValue);
    #[wasm_bindgen(method, js_name = setImageCube)]
    fn set_image_cube(this: &Texture, engine: &Engine, level: u32, pixels: &JsValue);

    #[wasm_bindgen(js_namespace = Filament, js_name = PixelBuffer)]
    fn pixel_buffer(data: &[u8], format: &JsValue, ty: &JsValue) -> JsValue;
    #[wasm_bindgen(js_namespace = Filament, js_name = CompressedPixelBuffer)]
    fn compressed_pixel_buffer(data: &[u8], ty: &JsValue, face_size: u32) -> JsValue;

    // ── lights ──

    type LightBuilder;

    #[wasm_bindgen(js_namespace = ["Filament", "LightManager"], js_name = Builder)]
    fn light_builder(ty: &JsValue) -> LightBuilder;
    #[wasm_bindgen(method)]
    fn color(this: &LightBuilder, color: &JsValue) -> LightBuilder;
    #[wasm_bindgen(method)]
    fn intensity(this: &LightBuilder, intensity: f32) -> LightBuilder;
    #[wasm_bindgen(method)]
    fn direction(this: &LightBuilder, direction: &JsValue) -> LightBuilder;
    #[wasm_bindgen(method, js_name = castShadows)]
    fn cast_shadows(this: &LightBuilder, enabled: bool) -> LightBuilder;
    #[wasm_bindgen(method, catch)]
    fn build(this: &LightBuilder, engine: &Engine, entity: &Entity) -> Result<(), JsValue>;

    type LightManager;

    #[wasm_bindgen(method, js_name = hasComponent)]
    fn has_component(this: &LightManager, entity: &Entity) -> bool;
    #[wasm_bindgen(method, js_name = getInstance)]
    fn get_instance(this: &LightManager, entity: &Entity) -> ComponentInstance;
    #[wasm_bindgen(method, js_name = setColor)]
    fn set_color(this: &LightManager, instance: &ComponentInstance, color: &JsValue);
    #[wasm_bindgen(method, js_name = setIntensity)]
    fn set_intensity(this: &LightManager, instance: &ComponentInstance, intensity: f32);
    #[wasm_bindgen(method, js_name = setDirection)]
    fn set_direction(this: &LightManager, instance: &ComponentInstance, direction: &JsValue);
    #[wasm_bindgen(method)]
    fn destroy(this: &LightManager, entity: &Entity);

    // ── image-based lighting ──

    pub type IndirectLight;
    type IndirectLightBuilder;

    #[wasm_bindgen(js_namespace = ["Filament", "IndirectLight"], js_name = Builder)]
    fn indirect_light_builder() -> IndirectLightBuilder;
    #[wasm_bindgen(method)]
    fn reflections(this: &IndirectLightBuilder, cubemap: &Texture) -> IndirectLightBuilder;
    #[wasm_bindgen(method, js_name = irradianceSh)]
    fn irradiance_sh(this: &IndirectLightBuilder, bands: u32, sh: &JsValue) -> IndirectLightBuilder;
    #[wasm_bindgen(method)]
    fn intensity(this: &IndirectLightBuilder, intensity: f32) -> IndirectLightBuilder;
    #[wasm_bindgen(method)]
    fn rotation(this: &IndirectLightBuilder, rotation: &JsValue) -> IndirectLightBuilder;
    #[wasm_bindgen(method, catch)]
    fn build(this: &IndirectLightBuilder, engine: &Engine) -> Result<IndirectLight, JsValue>;

    #[wasm_bindgen(method, js_name = setIntensity)]
    fn set_intensity(this: &IndirectLight, intensity: f32);
    #[wasm_bindgen(method, js_name = setRotation)]
    fn set_rotation(this: &IndirectLight, rotation: &JsValue);

    pub type Skybox;
}

/// Read `Filament.<group>.<name>`. Missing constants come back undefined and
/// are logged once per lookup.
fn constant(path: FilamentName) -> JsValue {
    let value = Reflect::get(&js_sys::global(), &JsValue::from_str("Filament"))
        .and_then(|filament| Reflect::get(&filament, &JsValue::from_str(path.group)))
        .and_then(|group| Reflect::get(&group, &JsValue::from_str(path.name)));
    match value {
        Ok(value) if !value.is_undefined() => value,
        _ => {
            log::warn!("Filament.{}.{} is not defined", path.group, path.name);
            JsValue::UNDEFINED
        }
    }
}

/// Plain JS array of numbers.
fn values<T: Copy + Into<JsValue>>(items: &[T]) -> JsValue {
    items.iter().map(|v| (*v).into()).collect::<Array>().into()
}

/// `{center, halfExtent}` as Filament's `Box` expects it.
fn bounding_box(bbox: &BoundingBox) -> Result<JsValue, JsValue> {
    let object = Object::new();
    Reflect::set(&object, &"center".into(), &values(&bbox.center))?;
    Reflect::set(&object, &"halfExtent".into(), &values(&bbox.half_extent))?;
    Ok(object.into())
}

fn describe(err: &JsValue) -> String {
    if let Some(message) = err.as_string() {
        return message;
    }
    match err.dyn_ref::<js_sys::Error>() {
        Some(error) => String::from(error.message()),
        None => format!("{err:?}"),
    }
}

fn failed(call: &'static str) -> impl FnOnce(JsValue) -> EngineError {
    move |err| EngineError::new(call, describe(&err))
}

fn optional<T: AsRef<JsValue>>(value: Option<&T>) -> JsValue {
    value.map_or(JsValue::NULL, |v| v.as_ref().clone())
}

fn with_instance(instance: ComponentInstance, apply: impl FnOnce(&ComponentInstance)) {
    apply(&instance);
    instance.delete();
}

/// A Filament texture plus the layout needed to upload its images.
pub struct FilamentTexture {
    texture: Texture,
    desc: TextureDescriptor,
}

/// [`RenderEngine`] over a Filament engine bound to one canvas.
pub struct FilamentEngine {
    engine: Engine,
    entities: EntityManager,
    canvas: HtmlCanvasElement,
}

impl FilamentEngine {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let engine = create_engine(&canvas)?;
        log::info!("Filament engine created on {}x{} canvas", canvas.width(), canvas.height());
        Ok(Self {
            engine,
            entities: entity_manager(),
            canvas,
        })
    }

    /// Release the engine. Every object it created must be gone already.
    pub fn destroy(self) {
        destroy_engine(&self.engine);
        log::info!("Filament engine destroyed");
    }
}

impl RenderEngine for FilamentEngine {
    type Entity = Entity;
    type Camera = Camera;
    type Scene = Scene;
    type View = View;
    type Renderer = Renderer;
    type SwapChain = SwapChain;
    type Material = Material;
    type MaterialInstance = MaterialInstance;
    type Texture = FilamentTexture;
    type VertexBuffer = VertexBuffer;
    type IndexBuffer = IndexBuffer;
    type IndirectLight = IndirectLight;
    type Skybox = Skybox;

    fn device_pixel_ratio(&self) -> f64 {
        web_sys::window().map_or(1.0, |window| window.device_pixel_ratio())
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    fn destroy_entity(&mut self, entity: Entity) {
        self.entities.destroy(&entity);
    }

    fn create_camera(&mut self) -> EngineResult<Camera> {
        self.engine.create_camera().map_err(failed("createCamera"))
    }

    fn camera_look_at(&mut self, camera: &Camera, eye: [f32; 3], center: [f32; 3], up: [f32; 3]) {
        camera.look_at(&values(&eye), &values(&center), &values(&up));
    }

    fn camera_set_projection(&mut self, camera: &Camera, projection: &Projection) {
        camera.set_projection_fov(
            projection.fov_degrees,
            projection.aspect,
            projection.near,
            projection.far,
            &constant(names::FOV_VERTICAL),
        );
    }

    fn camera_set_model_matrix(&mut self, camera: &Camera, matrix: &[f32; 16]) {
        camera.set_model_matrix(&values(matrix));
    }

    fn destroy_camera(&mut self, camera: Camera) {
        self.engine.destroy_camera(&camera);
    }

    fn create_swap_chain(&mut self) -> EngineResult<SwapChain> {
        self.engine.create_swap_chain().map_err(failed("createSwapChain"))
    }

    fn create_renderer(&mut self) -> EngineResult<Renderer> {
        self.engine.create_renderer().map_err(failed("createRenderer"))
    }

    fn render(&mut self, renderer: &Renderer, swap_chain: &SwapChain, view: &View) {
        renderer.render(swap_chain, view);
    }

    fn destroy_renderer(&mut self, renderer: Renderer) {
        self.engine.destroy_renderer(&renderer);
    }

    fn destroy_swap_chain(&mut self, swap_chain: SwapChain) {
        self.engine.destroy_swap_chain(&swap_chain);
    }

    fn create_scene(&mut self) -> EngineResult<Scene> {
        self.engine.create_scene().map_err(failed("createScene"))
    }

    fn scene_add_entity(&mut self, scene: &Scene, entity: &Entity) {
        scene.add_entity(entity);
    }

    fn scene_remove_entity(&mut self, scene: &Scene, entity: &Entity) {
        scene.remove(entity);
    }

    fn scene_set_indirect_light(&mut self, scene: &Scene, light: Option<&IndirectLight>) {
        scene.set_indirect_light(&optional(light));
    }

    fn scene_set_skybox(&mut self, scene: &Scene, skybox: Option<&Skybox>) {
        scene.set_skybox(&optional(skybox));
    }

    fn destroy_scene(&mut self, scene: Scene) {
        self.engine.destroy_scene(&scene);
    }

    fn create_view(&mut self) -> EngineResult<View> {
        self.engine.create_view().map_err(failed("createView"))
    }

    fn view_set_camera(&mut self, view: &View, camera: Option<&Camera>) {
        view.set_camera(&optional(camera));
    }

    fn view_set_scene(&mut self, view: &View, scene: Option<&Scene>) {
        view.set_scene(&optional(scene));
    }

    fn view_set_viewport(&mut self, view: &View, viewport: ViewportRect) {
        view.set_viewport(&values(&viewport.to_array()));
    }

    fn view_set_clear_color(&mut self, view: &View, color: [f32; 4]) {
        view.set_clear_color(&values(&color));
    }

    fn destroy_view(&mut self, view: View) {
        self.engine.destroy_view(&view);
    }

    fn create_vertex_buffer(&mut self, desc: &VertexBufferDescriptor) -> EngineResult<VertexBuffer> {
        let mut builder = vertex_buffer_builder()
            .vertex_count(desc.vertex_count)
            .buffer_count(desc.buffer_count);
        for layout in desc.attributes {
            let attribute = constant(names::vertex_attribute(layout.attribute));
            builder = builder.attribute(
                &attribute,
                0,
                &constant(names::attribute_type(layout.ty)),
                layout.byte_offset,
                desc.stride,
            );
            if layout.normalized {
                builder = builder.normalized(&attribute);
            }
        }
        builder.build(&self.engine).map_err(failed("VertexBuffer.Builder.build"))
    }

    fn vertex_buffer_upload(&mut self, buffer: &VertexBuffer, slot: u32, data: &[u8], byte_offset: u32) {
        buffer.set_buffer_at(&self.engine, slot, data, byte_offset);
    }

    fn destroy_vertex_buffer(&mut self, buffer: VertexBuffer) {
        self.engine.destroy_vertex_buffer(&buffer);
    }

    fn create_index_buffer(&mut self, desc: &IndexBufferDescriptor) -> EngineResult<IndexBuffer> {
        index_buffer_builder()
            .index_count(desc.index_count)
            .buffer_type(&constant(names::INDEX_TYPE_USHORT))
            .build(&self.engine)
            .map_err(failed("IndexBuffer.Builder.build"))
    }

    fn index_buffer_upload(&mut self, buffer: &IndexBuffer, data: &[u8], byte_offset: u32) {
        buffer.set_buffer(&self.engine, data, byte_offset);
    }

    fn destroy_index_buffer(&mut self, buffer: IndexBuffer) {
        self.engine.destroy_index_buffer(&buffer);
    }

    fn build_renderable(&mut self, entity: &Entity, desc: &RenderableDescriptor<'_, Self>) -> EngineResult<()> {
        let bbox = bounding_box(&desc.bounding_box).map_err(failed("RenderableManager.Builder.boundingBox"))?;
        let mut builder = renderable_builder(desc.primitives.len() as u32).bounding_box(&bbox);
        for (index, primitive) in desc.primitives.iter().enumerate() {
            let index = index as u32;
            builder = builder.material(index, primitive.material).geometry_offset(
                index,
                &constant(names::primitive(primitive.primitive)),
                desc.vertex_buffer,
                desc.index_buffer,
                primitive.index_offset,
                primitive.index_count,
            );
        }
        builder
            .culling(desc.culling)
            .cast_shadows(desc.cast_shadows)
            .receive_shadows(desc.receive_shadows)
            .build(&self.engine, entity)
            .map_err(failed("RenderableManager.Builder.build"))
    }

    fn has_renderable(&self, entity: &Entity) -> bool {
        self.engine.renderable_manager().has_component(entity)
    }

    fn renderable_set_material(&mut self, entity: &Entity, index: usize, material: &MaterialInstance) {
        let manager = self.engine.renderable_manager();
        with_instance(manager.get_instance(entity), |instance| {
            manager.set_material_instance_at(instance, index as u32, material)
        });
    }

    fn destroy_renderable(&mut self, entity: &Entity) {
        self.engine.renderable_manager().destroy(entity);
    }

    fn has_transform(&self, entity: &Entity) -> bool {
        self.engine.transform_manager().has_component(entity)
    }

    fn create_transform(&mut self, entity: &Entity) {
        self.engine.transform_manager().create(entity);
    }

    fn set_transform(&mut self, entity: &Entity, matrix: &[f32; 16]) {
        let manager = self.engine.transform_manager();
        with_instance(manager.get_instance(entity), |instance| {
            manager.set_transform(instance, &values(matrix))
        });
    }

    fn destroy_transform(&mut self, entity: &Entity) {
        self.engine.transform_manager().destroy(entity);
    }

    fn load_material(&mut self, url: &str) -> EngineResult<Material> {
        self.engine.create_material(url).map_err(failed("createMaterial"))
    }

    fn create_material_instance(&mut self, material: &Material) -> EngineResult<MaterialInstance> {
        material.create_instance().map_err(failed("createInstance"))
    }

    fn material_set_float(&mut self, instance: &MaterialInstance, name: &str, value: f32) {
        instance.set_float_parameter(name, value);
    }

    fn material_set_float4(&mut self, instance: &MaterialInstance, name: &str, value: [f32; 4]) {
        instance.set_float4_parameter(name, &values(&value));
    }

    fn material_set_color4(&mut self, instance: &MaterialInstance, name: &str, ty: RgbaType, value: [f32; 4]) {
        instance.set_color4_parameter(name, &constant(names::rgba_type(ty)), &values(&value));
    }

    fn material_set_texture(
        &mut self,
        instance: &MaterialInstance,
        name: &str,
        texture: &FilamentTexture,
        sampler: TextureSampler,
    ) {
        let sampler = Sampler::new(
            &constant(names::min_filter(sampler.min_filter)),
            &constant(names::mag_filter(sampler.mag_filter)),
            &constant(names::wrap_mode(sampler.wrap)),
        );
        instance.set_texture_parameter(name, &texture.texture, &sampler);
    }

    fn material_set_double_sided(&mut self, instance: &MaterialInstance, double_sided: bool) {
        instance.set_double_sided(double_sided);
    }

    fn material_set_culling_mode(&mut self, instance: &MaterialInstance, mode: CullingMode) {
        instance.set_culling_mode(&constant(names::culling_mode(mode)));
    }

    fn destroy_material_instance(&mut self, instance: MaterialInstance) {
        self.engine.destroy_material_instance(&instance);
    }

    fn destroy_material(&mut self, material: Material) {
        self.engine.destroy_material(&material);
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> EngineResult<FilamentTexture> {
        let texture = texture_builder()
            .width(desc.width)
            .height(desc.height)
            .levels(desc.levels)
            .sampler(&constant(names::texture_sampler_type(desc.texture_type.is_cubemap())))
            .format(&constant(names::internal_format(desc.format)))
            .build(&self.engine)
            .map_err(failed("Texture.Builder.build"))?;
        Ok(FilamentTexture { texture, desc: *desc })
    }

    fn texture_set_image(&mut self, texture: &FilamentTexture, level: u32, data: &[u8]) {
        let desc = &texture.desc;
        let pixels = match names::pixel_data(desc.format) {
            PixelData::Plain { format, ty } => pixel_buffer(data, &constant(format), &constant(ty)),
            PixelData::Compressed(ty) => {
                let face_size = desc.format.level_size(desc.width, desc.height, level) as u32;
                compressed_pixel_buffer(data, &constant(ty), face_size)
            }
        };
        if desc.texture_type.is_cubemap() {
            texture.texture.set_image_cube(&self.engine, level, &pixels);
        } else {
            texture.texture.set_image(&self.engine, level, &pixels);
        }
    }

    fn destroy_texture(&mut self, texture: FilamentTexture) {
        self.engine.destroy_texture(&texture.texture);
    }

    fn build_light(&mut self, entity: &Entity, desc: &LightDescriptor) -> EngineResult<()> {
        light_builder(&constant(names::light_type(desc.light_type)))
            .color(&values(&desc.color))
            .intensity(desc.intensity)
            .direction(&values(&desc.direction))
            .cast_shadows(desc.cast_shadows)
            .build(&self.engine, entity)
            .map_err(failed("LightManager.Builder.build"))
    }

    fn has_light(&self, entity: &Entity) -> bool {
        self.engine.light_manager().has_component(entity)
    }

    fn light_set_color(&mut self, entity: &Entity, color: [f32; 3]) {
        let manager = self.engine.light_manager();
        with_instance(manager.get_instance(entity), |instance| {
            manager.set_color(instance, &values(&color))
        });
    }

    fn light_set_intensity(&mut self, entity: &Entity, intensity: f32) {
        let manager = self.engine.light_manager();
        with_instance(manager.get_instance(entity), |instance| {
            manager.set_intensity(instance, intensity)
        });
    }

    fn light_set_direction(&mut self, entity: &Entity, direction: [f32; 3]) {
        let manager = self.engine.light_manager();
        with_instance(manager.get_instance(entity), |instance| {
            manager.set_direction(instance, &values(&direction))
        });
    }

    fn destroy_light(&mut self, entity: &Entity) {
        self.engine.light_manager().destroy(entity);
    }

    fn build_indirect_light(&mut self, desc: &IndirectLightDescriptor<'_, Self>) -> EngineResult<IndirectLight> {
        let mut builder = indirect_light_builder()
            .irradiance_sh(desc.bands, &values(&flatten_sh(desc.irradiance)))
            .rotation(&values(&desc.rotation));
        if let Some(cubemap) = desc.reflections {
            builder = builder.reflections(&cubemap.texture);
        }
        if let Some(intensity) = desc.intensity {
            builder = builder.intensity(intensity);
        }
        builder.build(&self.engine).map_err(failed("IndirectLight.Builder.build"))
    }

    fn load_indirect_light(&mut self, url: &str) -> EngineResult<IndirectLight> {
        self.engine.create_ibl_from_ktx(url).map_err(failed("createIblFromKtx"))
    }

    fn indirect_light_set_intensity(&mut self, light: &IndirectLight, intensity: f32) {
        light.set_intensity(intensity);
    }

    fn indirect_light_set_rotation(&mut self, light: &IndirectLight, rotation: &[f32; 9]) {
        light.set_rotation(&values(rotation));
    }

    fn destroy_indirect_light(&mut self, light: IndirectLight) {
        self.engine.destroy_indirect_light(&light);
    }

    fn load_skybox(&mut self, url: &str) -> EngineResult<Skybox> {
        self.engine.create_sky_from_ktx(url).map_err(failed("createSkyFromKtx"))
    }

    fn destroy_skybox(&mut self, skybox: Skybox) {
        self.engine.destroy_skybox(&skybox);
    }
}
