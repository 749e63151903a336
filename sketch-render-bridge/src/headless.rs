//! In-memory [`RenderEngine`] that records every call.
//!
//! Used by hosts without a GPU and as the engine double in tests. Every
//! resource is a [`HeadlessId`]; the engine keeps a record per live id and a
//! count of destroy calls that named an id it did not know.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use sketch_render_shared::texture::TextureSampler;
use sketch_render_shared::{BoundingBox, PrimitiveType};

use crate::engine::{
    CullingMode, EngineError, EngineResult, IndexBufferDescriptor, IndirectLightDescriptor, LightDescriptor,
    Projection, RenderEngine, RenderableDescriptor, RgbaType, TextureDescriptor, VertexBufferDescriptor,
    ViewportRect,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadlessId(u32);

impl HeadlessId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraRecord {
    pub eye: [f32; 3],
    pub center: [f32; 3],
    pub up: [f32; 3],
    pub projection: Option<Projection>,
    pub model_matrix: Option<[f32; 16]>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneRecord {
    pub entities: BTreeSet<HeadlessId>,
    pub indirect_light: Option<HeadlessId>,
    pub skybox: Option<HeadlessId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewRecord {
    pub camera: Option<HeadlessId>,
    pub scene: Option<HeadlessId>,
    pub viewport: Option<ViewportRect>,
    pub clear_color: Option<[f32; 4]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VertexBufferRecord {
    pub stride: u32,
    pub vertex_count: u32,
    pub bytes: Vec<u8>,
    pub uploads: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexBufferRecord {
    pub index_count: u32,
    pub bytes: Vec<u8>,
    pub uploads: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveRecord {
    pub primitive: PrimitiveType,
    pub index_offset: u32,
    pub index_count: u32,
    pub material: HeadlessId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderableRecord {
    pub bounding_box: BoundingBox,
    pub vertex_buffer: HeadlessId,
    pub index_buffer: HeadlessId,
    pub primitives: Vec<PrimitiveRecord>,
    pub culling: bool,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

/// A material parameter as last set.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Float4([f32; 4]),
    Color(RgbaType, [f32; 4]),
    Texture(HeadlessId, TextureSampler),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialInstanceRecord {
    pub material: HeadlessId,
    pub params: HashMap<String, ParamValue>,
    pub double_sided: Option<bool>,
    pub culling: Option<CullingMode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureRecord {
    pub desc: TextureDescriptor,
    /// Byte length of the last image set per mip level.
    pub levels: BTreeMap<u32, usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndirectLightRecord {
    pub irradiance: Option<Vec<[f32; 3]>>,
    pub reflections: Option<HeadlessId>,
    pub source: Option<String>,
    pub intensity: Option<f32>,
    pub rotation: Option<[f32; 9]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub renderer: HeadlessId,
    pub swap_chain: HeadlessId,
    pub view: HeadlessId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Entity,
    Camera,
    SwapChain,
    Renderer,
    Scene,
    View,
    VertexBuffer,
    IndexBuffer,
    Material,
    MaterialInstance,
    Texture,
    IndirectLight,
    Skybox,
}

pub struct HeadlessEngine {
    next_id: u32,
    pixel_ratio: f64,
    surface: Option<(u32, u32)>,
    live: HashMap<HeadlessId, Kind>,
    invalid_destroys: usize,
    failing: HashSet<&'static str>,

    pub cameras: HashMap<HeadlessId, CameraRecord>,
    pub scenes: HashMap<HeadlessId, SceneRecord>,
    pub views: HashMap<HeadlessId, ViewRecord>,
    pub vertex_buffers: HashMap<HeadlessId, VertexBufferRecord>,
    pub index_buffers: HashMap<HeadlessId, IndexBufferRecord>,
    pub renderables: HashMap<HeadlessId, RenderableRecord>,
    pub transforms: HashMap<HeadlessId, [f32; 16]>,
    pub lights: HashMap<HeadlessId, LightDescriptor>,
    /// Material id to the package URL it was loaded from.
    pub materials: HashMap<HeadlessId, String>,
    pub material_instances: HashMap<HeadlessId, MaterialInstanceRecord>,
    pub textures: HashMap<HeadlessId, TextureRecord>,
    pub indirect_lights: HashMap<HeadlessId, IndirectLightRecord>,
    /// Skybox id to the KTX URL it was loaded from.
    pub skyboxes: HashMap<HeadlessId, String>,
    pub frames: Vec<Frame>,
}

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::with_pixel_ratio(1.0)
    }

    pub fn with_pixel_ratio(pixel_ratio: f64) -> Self {
        Self {
            next_id: 0,
            pixel_ratio,
            surface: None,
            live: HashMap::new(),
            invalid_destroys: 0,
            failing: HashSet::new(),
            cameras: HashMap::new(),
            scenes: HashMap::new(),
            views: HashMap::new(),
            vertex_buffers: HashMap::new(),
            index_buffers: HashMap::new(),
            renderables: HashMap::new(),
            transforms: HashMap::new(),
            lights: HashMap::new(),
            materials: HashMap::new(),
            material_instances: HashMap::new(),
            textures: HashMap::new(),
            indirect_lights: HashMap::new(),
            skyboxes: HashMap::new(),
            frames: Vec::new(),
        }
    }

    /// Make every later call named `call` (e.g. `"create_camera"`) fail.
    pub fn fail_on(&mut self, call: &'static str) {
        self.failing.insert(call);
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.pixel_ratio = pixel_ratio;
    }

    /// Last size passed to `resize_surface`.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface
    }

    /// Number of engine resources (entities included) not yet destroyed.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, id: HeadlessId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn live_entities(&self) -> usize {
        self.live.values().filter(|k| **k == Kind::Entity).count()
    }

    /// Destroy calls that named a dead or foreign id.
    pub fn invalid_destroys(&self) -> usize {
        self.invalid_destroys
    }

    fn check(&self, call: &'static str) -> EngineResult<()> {
        if self.failing.contains(call) {
            return Err(EngineError::new(call, "injected failure"));
        }
        Ok(())
    }

    fn alloc(&mut self, kind: Kind) -> HeadlessId {
        self.next_id += 1;
        let id = HeadlessId(self.next_id);
        self.live.insert(id, kind);
        id
    }

    fn release(&mut self, id: HeadlessId, kind: Kind) {
        match self.live.get(&id) {
            Some(k) if *k == kind => {
                self.live.remove(&id);
            }
            _ => {
                log::warn!("Headless destroy of unknown {kind:?} {}", id.0);
                self.invalid_destroys += 1;
            }
        }
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn write_at(bytes: &mut Vec<u8>, data: &[u8], byte_offset: u32) {
    let start = byte_offset as usize;
    let end = start + data.len();
    if bytes.len() < end {
        bytes.resize(end, 0);
    }
    bytes[start..end].copy_from_slice(data);
}

impl RenderEngine for HeadlessEngine {
    type Entity = HeadlessId;
    type Camera = HeadlessId;
    type Scene = HeadlessId;
    type View = HeadlessId;
    type Renderer = HeadlessId;
    type SwapChain = HeadlessId;
    type Material = HeadlessId;
    type MaterialInstance = HeadlessId;
    type Texture = HeadlessId;
    type VertexBuffer = HeadlessId;
    type IndexBuffer = HeadlessId;
    type IndirectLight = HeadlessId;
    type Skybox = HeadlessId;

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface = Some((width, height));
    }

    fn create_entity(&mut self) -> HeadlessId {
        self.alloc(Kind::Entity)
    }

    fn destroy_entity(&mut self, entity: HeadlessId) {
        for scene in self.scenes.values_mut() {
            scene.entities.remove(&entity);
        }
        self.release(entity, Kind::Entity);
    }

    fn create_camera(&mut self) -> EngineResult<HeadlessId> {
        self.check("create_camera")?;
        let id = self.alloc(Kind::Camera);
        self.cameras.insert(id, CameraRecord::default());
        Ok(id)
    }

    fn camera_look_at(&mut self, camera: &HeadlessId, eye: [f32; 3], center: [f32; 3], up: [f32; 3]) {
        if let Some(record) = self.cameras.get_mut(camera) {
            record.eye = eye;
            record.center = center;
            record.up = up;
        }
    }

    fn camera_set_projection(&mut self, camera: &HeadlessId, projection: &Projection) {
        if let Some(record) = self.cameras.get_mut(camera) {
            record.projection = Some(*projection);
        }
    }

    fn camera_set_model_matrix(&mut self, camera: &HeadlessId, matrix: &[f32; 16]) {
        if let Some(record) = self.cameras.get_mut(camera) {
            record.model_matrix = Some(*matrix);
        }
    }

    fn destroy_camera(&mut self, camera: HeadlessId) {
        self.cameras.remove(&camera);
        self.release(camera, Kind::Camera);
    }

    fn create_swap_chain(&mut self) -> EngineResult<HeadlessId> {
        self.check("create_swap_chain")?;
        Ok(self.alloc(Kind::SwapChain))
    }

    fn create_renderer(&mut self) -> EngineResult<HeadlessId> {
        self.check("create_renderer")?;
        Ok(self.alloc(Kind::Renderer))
    }

    fn render(&mut self, renderer: &HeadlessId, swap_chain: &HeadlessId, view: &HeadlessId) {
        self.frames.push(Frame {
            renderer: *renderer,
            swap_chain: *swap_chain,
            view: *view,
        });
    }

    fn destroy_renderer(&mut self, renderer: HeadlessId) {
        self.release(renderer, Kind::Renderer);
    }

    fn destroy_swap_chain(&mut self, swap_chain: HeadlessId) {
        self.release(swap_chain, Kind::SwapChain);
    }

    fn create_scene(&mut self) -> EngineResult<HeadlessId> {
        self.check("create_scene")?;
        let id = self.alloc(Kind::Scene);
        self.scenes.insert(id, SceneRecord::default());
        Ok(id)
    }

    fn scene_add_entity(&mut self, scene: &HeadlessId, entity: &HeadlessId) {
        if let Some(record) = self.scenes.get_mut(scene) {
            record.entities.insert(*entity);
        }
    }

    fn scene_remove_entity(&mut self, scene: &HeadlessId, entity: &HeadlessId) {
        if let Some(record) = self.scenes.get_mut(scene) {
            record.entities.remove(entity);
        }
    }

    fn scene_set_indirect_light(&mut self, scene: &HeadlessId, light: Option<&HeadlessId>) {
        if let Some(record) = self.scenes.get_mut(scene) {
            record.indirect_light = light.copied();
        }
    }

    fn scene_set_skybox(&mut self, scene: &HeadlessId, skybox: Option<&HeadlessId>) {
        if let Some(record) = self.scenes.get_mut(scene) {
            record.skybox = skybox.copied();
        }
    }

    fn destroy_scene(&mut self, scene: HeadlessId) {
        self.scenes.remove(&scene);
        self.release(scene, Kind::Scene);
    }

    fn create_view(&mut self) -> EngineResult<HeadlessId> {
        self.check("create_view")?;
        let id = self.alloc(Kind::View);
        self.views.insert(id, ViewRecord::default());
        Ok(id)
    }

    fn view_set_camera(&mut self, view: &HeadlessId, camera: Option<&HeadlessId>) {
        if let Some(record) = self.views.get_mut(view) {
            record.camera = camera.copied();
        }
    }

    fn view_set_scene(&mut self, view: &HeadlessId, scene: Option<&HeadlessId>) {
        if let Some(record) = self.views.get_mut(view) {
            record.scene = scene.copied();
        }
    }

    fn view_set_viewport(&mut self, view: &HeadlessId, viewport: ViewportRect) {
        if let Some(record) = self.views.get_mut(view) {
            record.viewport = Some(viewport);
        }
    }

    fn view_set_clear_color(&mut self, view: &HeadlessId, color: [f32; 4]) {
        if let Some(record) = self.views.get_mut(view) {
            record.clear_color = Some(color);
        }
    }

    fn destroy_view(&mut self, view: HeadlessId) {
        self.views.remove(&view);
        self.release(view, Kind::View);
    }

    fn create_vertex_buffer(&mut self, desc: &VertexBufferDescriptor) -> EngineResult<HeadlessId> {
        self.check("create_vertex_buffer")?;
        let id = self.alloc(Kind::VertexBuffer);
        self.vertex_buffers.insert(
            id,
            VertexBufferRecord {
                stride: desc.stride,
                vertex_count: desc.vertex_count,
                bytes: vec![0; (desc.stride * desc.vertex_count) as usize],
                uploads: 0,
            },
        );
        Ok(id)
    }

    fn vertex_buffer_upload(&mut self, buffer: &HeadlessId, _slot: u32, data: &[u8], byte_offset: u32) {
        if let Some(record) = self.vertex_buffers.get_mut(buffer) {
            write_at(&mut record.bytes, data, byte_offset);
            record.uploads += 1;
        }
    }

    fn destroy_vertex_buffer(&mut self, buffer: HeadlessId) {
        self.vertex_buffers.remove(&buffer);
        self.release(buffer, Kind::VertexBuffer);
    }

    fn create_index_buffer(&mut self, desc: &IndexBufferDescriptor) -> EngineResult<HeadlessId> {
        self.check("create_index_buffer")?;
        let id = self.alloc(Kind::IndexBuffer);
        self.index_buffers.insert(
            id,
            IndexBufferRecord {
                index_count: desc.index_count,
                bytes: vec![0; desc.index_count as usize * 2],
                uploads: 0,
            },
        );
        Ok(id)
    }

    fn index_buffer_upload(&mut self, buffer: &HeadlessId, data: &[u8], byte_offset: u32) {
        if let Some(record) = self.index_buffers.get_mut(buffer) {
            write_at(&mut record.bytes, data, byte_offset);
            record.uploads += 1;
        }
    }

    fn destroy_index_buffer(&mut self, buffer: HeadlessId) {
        self.index_buffers.remove(&buffer);
        self.release(buffer, Kind::IndexBuffer);
    }

    fn build_renderable(&mut self, entity: &HeadlessId, desc: &RenderableDescriptor<'_, Self>) -> EngineResult<()> {
        self.check("build_renderable")?;
        let primitives = desc
            .primitives
            .iter()
            .map(|p| PrimitiveRecord {
                primitive: p.primitive,
                index_offset: p.index_offset,
                index_count: p.index_count,
                material: *p.material,
            })
            .collect();
        self.renderables.insert(
            *entity,
            RenderableRecord {
                bounding_box: desc.bounding_box,
                vertex_buffer: *desc.vertex_buffer,
                index_buffer: *desc.index_buffer,
                primitives,
                culling: desc.culling,
                cast_shadows: desc.cast_shadows,
                receive_shadows: desc.receive_shadows,
            },
        );
        Ok(())
    }

    fn has_renderable(&self, entity: &HeadlessId) -> bool {
        self.renderables.contains_key(entity)
    }

    fn renderable_set_material(&mut self, entity: &HeadlessId, index: usize, material: &HeadlessId) {
        if let Some(primitive) = self
            .renderables
            .get_mut(entity)
            .and_then(|r| r.primitives.get_mut(index))
        {
            primitive.material = *material;
        }
    }

    fn destroy_renderable(&mut self, entity: &HeadlessId) {
        self.renderables.remove(entity);
    }

    fn has_transform(&self, entity: &HeadlessId) -> bool {
        self.transforms.contains_key(entity)
    }

    fn create_transform(&mut self, entity: &HeadlessId) {
        self.transforms.insert(*entity, IDENTITY);
    }

    fn set_transform(&mut self, entity: &HeadlessId, matrix: &[f32; 16]) {
        if let Some(transform) = self.transforms.get_mut(entity) {
            *transform = *matrix;
        }
    }

    fn destroy_transform(&mut self, entity: &HeadlessId) {
        self.transforms.remove(entity);
    }

    fn load_material(&mut self, url: &str) -> EngineResult<HeadlessId> {
        self.check("load_material")?;
        let id = self.alloc(Kind::Material);
        self.materials.insert(id, url.to_string());
        Ok(id)
    }

    fn create_material_instance(&mut self, material: &HeadlessId) -> EngineResult<HeadlessId> {
        self.check("create_material_instance")?;
        let id = self.alloc(Kind::MaterialInstance);
        self.material_instances.insert(
            id,
            MaterialInstanceRecord {
                material: *material,
                params: HashMap::new(),
                double_sided: None,
                culling: None,
            },
        );
        Ok(id)
    }

    fn material_set_float(&mut self, instance: &HeadlessId, name: &str, value: f32) {
        if let Some(record) = self.material_instances.get_mut(instance) {
            record.params.insert(name.to_string(), ParamValue::Float(value));
        }
    }

    fn material_set_float4(&mut self, instance: &HeadlessId, name: &str, value: [f32; 4]) {
        if let Some(record) = self.material_instances.get_mut(instance) {
            record.params.insert(name.to_string(), ParamValue::Float4(value));
        }
    }

    fn material_set_color4(&mut self, instance: &HeadlessId, name: &str, ty: RgbaType, value: [f32; 4]) {
        if let Some(record) = self.material_instances.get_mut(instance) {
            record.params.insert(name.to_string(), ParamValue::Color(ty, value));
        }
    }

    fn material_set_texture(&mut self, instance: &HeadlessId, name: &str, texture: &HeadlessId, sampler: TextureSampler) {
        if let Some(record) = self.material_instances.get_mut(instance) {
            record
                .params
                .insert(name.to_string(), ParamValue::Texture(*texture, sampler));
        }
    }

    fn material_set_double_sided(&mut self, instance: &HeadlessId, double_sided: bool) {
        if let Some(record) = self.material_instances.get_mut(instance) {
            record.double_sided = Some(double_sided);
        }
    }

    fn material_set_culling_mode(&mut self, instance: &HeadlessId, mode: CullingMode) {
        if let Some(record) = self.material_instances.get_mut(instance) {
            record.culling = Some(mode);
        }
    }

    fn destroy_material_instance(&mut self, instance: HeadlessId) {
        self.material_instances.remove(&instance);
        self.release(instance, Kind::MaterialInstance);
    }

    fn destroy_material(&mut self, material: HeadlessId) {
        self.materials.remove(&material);
        self.release(material, Kind::Material);
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> EngineResult<HeadlessId> {
        self.check("create_texture")?;
        let id = self.alloc(Kind::Texture);
        self.textures.insert(
            id,
            TextureRecord {
                desc: *desc,
                levels: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    fn texture_set_image(&mut self, texture: &HeadlessId, level: u32, data: &[u8]) {
        if let Some(record) = self.textures.get_mut(texture) {
            record.levels.insert(level, data.len());
        }
    }

    fn destroy_texture(&mut self, texture: HeadlessId) {
        self.textures.remove(&texture);
        self.release(texture, Kind::Texture);
    }

    fn build_light(&mut self, entity: &HeadlessId, desc: &LightDescriptor) -> EngineResult<()> {
        self.check("build_light")?;
        self.lights.insert(*entity, *desc);
        Ok(())
    }

    fn has_light(&self, entity: &HeadlessId) -> bool {
        self.lights.contains_key(entity)
    }

    fn light_set_color(&mut self, entity: &HeadlessId, color: [f32; 3]) {
        if let Some(light) = self.lights.get_mut(entity) {
            light.color = color;
        }
    }

    fn light_set_intensity(&mut self, entity: &HeadlessId, intensity: f32) {
        if let Some(light) = self.lights.get_mut(entity) {
            light.intensity = intensity;
        }
    }

    fn light_set_direction(&mut self, entity: &HeadlessId, direction: [f32; 3]) {
        if let Some(light) = self.lights.get_mut(entity) {
            light.direction = direction;
        }
    }

    fn destroy_light(&mut self, entity: &HeadlessId) {
        self.lights.remove(entity);
    }

    fn build_indirect_light(&mut self, desc: &IndirectLightDescriptor<'_, Self>) -> EngineResult<HeadlessId> {
        self.check("build_indirect_light")?;
        let id = self.alloc(Kind::IndirectLight);
        self.indirect_lights.insert(
            id,
            IndirectLightRecord {
                irradiance: Some(desc.irradiance.to_vec()),
                reflections: desc.reflections.copied(),
                source: None,
                intensity: desc.intensity,
                rotation: Some(desc.rotation),
            },
        );
        Ok(id)
    }

    fn load_indirect_light(&mut self, url: &str) -> EngineResult<HeadlessId> {
        self.check("load_indirect_light")?;
        let id = self.alloc(Kind::IndirectLight);
        self.indirect_lights.insert(
            id,
            IndirectLightRecord {
                irradiance: None,
                reflections: None,
                source: Some(url.to_string()),
                intensity: None,
                rotation: None,
            },
        );
        Ok(id)
    }

    fn indirect_light_set_intensity(&mut self, light: &HeadlessId, intensity: f32) {
        if let Some(record) = self.indirect_lights.get_mut(light) {
            record.intensity = Some(intensity);
        }
    }

    fn indirect_light_set_rotation(&mut self, light: &HeadlessId, rotation: &[f32; 9]) {
        if let Some(record) = self.indirect_lights.get_mut(light) {
            record.rotation = Some(*rotation);
        }
    }

    fn destroy_indirect_light(&mut self, light: HeadlessId) {
        self.indirect_lights.remove(&light);
        self.release(light, Kind::IndirectLight);
    }

    fn load_skybox(&mut self, url: &str) -> EngineResult<HeadlessId> {
        self.check("load_skybox")?;
        let id = self.alloc(Kind::Skybox);
        self.skyboxes.insert(id, url.to_string());
        Ok(id)
    }

    fn destroy_skybox(&mut self, skybox: HeadlessId) {
        self.skyboxes.remove(&skybox);
        self.release(skybox, Kind::Skybox);
    }
}
