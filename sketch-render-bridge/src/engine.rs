//! The rendering engine seen from the bridge.
//!
//! [`RenderEngine`] is the whole outbound surface: builder-style construction
//! calls (expressed as descriptors), component setters on entities, and
//! explicit destroy calls. Engine resources are associated types so each
//! backend keeps its native object types; the bridge never inspects them.

use sketch_render_shared::lighting::ShCoefficients;
use sketch_render_shared::texture::{TextureFormat, TextureSampler, TextureType};
use sketch_render_shared::vertex::VertexAttributeLayout;
use sketch_render_shared::{BoundingBox, PrimitiveType, VertexFormat};
use thiserror::Error;

/// A native engine call failed. Never retried by the bridge.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Engine call `{call}` failed: {message}")]
pub struct EngineError {
    pub call: &'static str,
    pub message: String,
}

impl EngineError {
    pub fn new(call: &'static str, message: impl Into<String>) -> Self {
        Self {
            call,
            message: message.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Perspective projection in engine units, vertical field of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_degrees: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

/// Viewport in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportRect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl ViewportRect {
    pub fn to_array(self) -> [f64; 4] {
        [
            self.left as f64,
            self.top as f64,
            self.width as f64,
            self.height as f64,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RgbaType {
    Srgb,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullingMode {
    None = 0,
    Front,
    Back,
    FrontAndBack,
}

impl CullingMode {
    pub fn from_index(index: u32) -> Option<Self> {
        [Self::None, Self::Front, Self::Back, Self::FrontAndBack]
            .get(index as usize)
            .copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    Sun,
    Directional,
    Point,
    FocusedSpot,
    Spot,
}

pub struct VertexBufferDescriptor {
    pub format: VertexFormat,
    pub vertex_count: u32,
    pub buffer_count: u32,
    pub stride: u32,
    pub attributes: &'static [VertexAttributeLayout],
}

impl VertexBufferDescriptor {
    /// Single interleaved buffer laid out per `format`.
    pub fn interleaved(format: VertexFormat, vertex_count: u32) -> Self {
        Self {
            format,
            vertex_count,
            buffer_count: 1,
            stride: format.stride(),
            attributes: format.attributes(),
        }
    }
}

/// Index buffers are always 16-bit.
pub struct IndexBufferDescriptor {
    pub index_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub levels: u32,
    pub texture_type: TextureType,
    pub format: TextureFormat,
}

impl TextureDescriptor {
    pub fn faces(&self) -> usize {
        if self.texture_type.is_cubemap() {
            6
        } else {
            1
        }
    }

    /// Bytes expected for one full mip level, all faces.
    pub fn level_size(&self, level: u32) -> usize {
        self.format.level_size(self.width, self.height, level) * self.faces()
    }
}

/// One slice of a renderable: primitive type, index range, material.
pub struct PrimitiveDescriptor<'a, E: RenderEngine + ?Sized> {
    pub primitive: PrimitiveType,
    pub index_offset: u32,
    pub index_count: u32,
    pub material: &'a E::MaterialInstance,
}

pub struct RenderableDescriptor<'a, E: RenderEngine + ?Sized> {
    pub bounding_box: BoundingBox,
    pub vertex_buffer: &'a E::VertexBuffer,
    pub index_buffer: &'a E::IndexBuffer,
    pub primitives: Vec<PrimitiveDescriptor<'a, E>>,
    pub culling: bool,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightDescriptor {
    pub light_type: LightType,
    pub color: [f32; 3],
    pub intensity: f32,
    pub direction: [f32; 3],
    pub cast_shadows: bool,
}

pub struct IndirectLightDescriptor<'a, E: RenderEngine + ?Sized> {
    pub irradiance: &'a ShCoefficients,
    pub bands: u32,
    pub reflections: Option<&'a E::Texture>,
    pub intensity: Option<f32>,
    /// Row-major 3x3.
    pub rotation: [f32; 9],
}

/// Outbound calls into the wrapped rendering engine.
///
/// Creation calls may fail and report an [`EngineError`]. Setters are
/// fire-and-forget, as in the engine itself. Destroy calls consume the
/// resource value.
pub trait RenderEngine {
    type Entity: Clone;
    type Camera;
    type Scene;
    type View;
    type Renderer;
    type SwapChain;
    type Material;
    type MaterialInstance;
    type Texture;
    type VertexBuffer;
    type IndexBuffer;
    type IndirectLight;
    type Skybox;

    // ── surface ──

    /// Ratio of device pixels to host layout pixels.
    fn device_pixel_ratio(&self) -> f64;
    fn resize_surface(&mut self, width: u32, height: u32);

    // ── entities ──

    fn create_entity(&mut self) -> Self::Entity;
    fn destroy_entity(&mut self, entity: Self::Entity);

    // ── cameras ──

    fn create_camera(&mut self) -> EngineResult<Self::Camera>;
    fn camera_look_at(&mut self, camera: &Self::Camera, eye: [f32; 3], center: [f32; 3], up: [f32; 3]);
    fn camera_set_projection(&mut self, camera: &Self::Camera, projection: &Projection);
    fn camera_set_model_matrix(&mut self, camera: &Self::Camera, matrix: &[f32; 16]);
    fn destroy_camera(&mut self, camera: Self::Camera);

    // ── render context ──

    fn create_swap_chain(&mut self) -> EngineResult<Self::SwapChain>;
    fn create_renderer(&mut self) -> EngineResult<Self::Renderer>;
    fn render(&mut self, renderer: &Self::Renderer, swap_chain: &Self::SwapChain, view: &Self::View);
    fn destroy_renderer(&mut self, renderer: Self::Renderer);
    fn destroy_swap_chain(&mut self, swap_chain: Self::SwapChain);

    // ── scenes ──

    fn create_scene(&mut self) -> EngineResult<Self::Scene>;
    fn scene_add_entity(&mut self, scene: &Self::Scene, entity: &Self::Entity);
    fn scene_remove_entity(&mut self, scene: &Self::Scene, entity: &Self::Entity);
    fn scene_set_indirect_light(&mut self, scene: &Self::Scene, light: Option<&Self::IndirectLight>);
    fn scene_set_skybox(&mut self, scene: &Self::Scene, skybox: Option<&Self::Skybox>);
    fn destroy_scene(&mut self, scene: Self::Scene);

    // ── views ──

    fn create_view(&mut self) -> EngineResult<Self::View>;
    fn view_set_camera(&mut self, view: &Self::View, camera: Option<&Self::Camera>);
    fn view_set_scene(&mut self, view: &Self::View, scene: Option<&Self::Scene>);
    fn view_set_viewport(&mut self, view: &Self::View, viewport: ViewportRect);
    fn view_set_clear_color(&mut self, view: &Self::View, color: [f32; 4]);
    fn destroy_view(&mut self, view: Self::View);

    // ── buffers ──

    fn create_vertex_buffer(&mut self, desc: &VertexBufferDescriptor) -> EngineResult<Self::VertexBuffer>;
    fn vertex_buffer_upload(&mut self, buffer: &Self::VertexBuffer, slot: u32, data: &[u8], byte_offset: u32);
    fn destroy_vertex_buffer(&mut self, buffer: Self::VertexBuffer);

    fn create_index_buffer(&mut self, desc: &IndexBufferDescriptor) -> EngineResult<Self::IndexBuffer>;
    fn index_buffer_upload(&mut self, buffer: &Self::IndexBuffer, data: &[u8], byte_offset: u32);
    fn destroy_index_buffer(&mut self, buffer: Self::IndexBuffer);

    // ── renderables & transforms ──

    /// Attach (or replace) the renderable component of `entity`.
    fn build_renderable(&mut self, entity: &Self::Entity, desc: &RenderableDescriptor<'_, Self>) -> EngineResult<()>;
    fn has_renderable(&self, entity: &Self::Entity) -> bool;
    fn renderable_set_material(&mut self, entity: &Self::Entity, index: usize, material: &Self::MaterialInstance);
    fn destroy_renderable(&mut self, entity: &Self::Entity);

    fn has_transform(&self, entity: &Self::Entity) -> bool;
    fn create_transform(&mut self, entity: &Self::Entity);
    fn set_transform(&mut self, entity: &Self::Entity, matrix: &[f32; 16]);
    fn destroy_transform(&mut self, entity: &Self::Entity);

    // ── materials ──

    /// Load a compiled material package.
    fn load_material(&mut self, url: &str) -> EngineResult<Self::Material>;
    fn create_material_instance(&mut self, material: &Self::Material) -> EngineResult<Self::MaterialInstance>;
    fn material_set_float(&mut self, instance: &Self::MaterialInstance, name: &str, value: f32);
    fn material_set_float4(&mut self, instance: &Self::MaterialInstance, name: &str, value: [f32; 4]);
    fn material_set_color4(&mut self, instance: &Self::MaterialInstance, name: &str, ty: RgbaType, value: [f32; 4]);
    fn material_set_texture(
        &mut self,
        instance: &Self::MaterialInstance,
        name: &str,
        texture: &Self::Texture,
        sampler: TextureSampler,
    );
    fn material_set_double_sided(&mut self, instance: &Self::MaterialInstance, double_sided: bool);
    fn material_set_culling_mode(&mut self, instance: &Self::MaterialInstance, mode: CullingMode);
    fn destroy_material_instance(&mut self, instance: Self::MaterialInstance);
    fn destroy_material(&mut self, material: Self::Material);

    // ── textures ──

    fn create_texture(&mut self, desc: &TextureDescriptor) -> EngineResult<Self::Texture>;
    fn texture_set_image(&mut self, texture: &Self::Texture, level: u32, data: &[u8]);
    fn destroy_texture(&mut self, texture: Self::Texture);

    // ── lights ──

    fn build_light(&mut self, entity: &Self::Entity, desc: &LightDescriptor) -> EngineResult<()>;
    fn has_light(&self, entity: &Self::Entity) -> bool;
    fn light_set_color(&mut self, entity: &Self::Entity, color: [f32; 3]);
    fn light_set_intensity(&mut self, entity: &Self::Entity, intensity: f32);
    fn light_set_direction(&mut self, entity: &Self::Entity, direction: [f32; 3]);
    fn destroy_light(&mut self, entity: &Self::Entity);

    // ── image-based lighting ──

    fn build_indirect_light(&mut self, desc: &IndirectLightDescriptor<'_, Self>) -> EngineResult<Self::IndirectLight>;
    /// Load a prefiltered environment (KTX) as an indirect light.
    fn load_indirect_light(&mut self, url: &str) -> EngineResult<Self::IndirectLight>;
    fn indirect_light_set_intensity(&mut self, light: &Self::IndirectLight, intensity: f32);
    fn indirect_light_set_rotation(&mut self, light: &Self::IndirectLight, rotation: &[f32; 9]);
    fn destroy_indirect_light(&mut self, light: Self::IndirectLight);

    fn load_skybox(&mut self, url: &str) -> EngineResult<Self::Skybox>;
    fn destroy_skybox(&mut self, skybox: Self::Skybox);
}
