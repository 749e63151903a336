//! Wrapped engine objects held in the object table.

use sketch_render_shared::{BoundingBox, IndirectLightPreset, PrimitiveType, VertexFormat};
use std::fmt;

use crate::engine::{LightType, RenderEngine, TextureDescriptor, ViewportRect};
use crate::entity::EntityId;
use crate::error::{BridgeError, Result};
use crate::handle::{Handle, HandleStore};

/// Largest number of sub-geometries one mesh may carry.
pub const MAX_SUB_GEOMETRIES: usize = 4;

/// Standard material packages the host can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialType {
    Default = 0,
    UnlitColor,
    UnlitColorAlpha,
    UnlitFont,
    UnlitFontOutline,
    UnlitVertexColor,
    LitSimple,
    LitTextured,
    UiIcon,
}

impl MaterialType {
    pub const ALL: [MaterialType; 9] = [
        MaterialType::Default,
        MaterialType::UnlitColor,
        MaterialType::UnlitColorAlpha,
        MaterialType::UnlitFont,
        MaterialType::UnlitFontOutline,
        MaterialType::UnlitVertexColor,
        MaterialType::LitSimple,
        MaterialType::LitTextured,
        MaterialType::UiIcon,
    ];

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// The package actually loaded for this type.
    pub fn package(self) -> MaterialType {
        match self {
            MaterialType::Default => MaterialType::UnlitColor,
            other => other,
        }
    }
}

pub struct Camera<E: RenderEngine> {
    pub(crate) camera: E::Camera,
}

/// Swap chain and renderer pair.
pub struct RenderContext<E: RenderEngine> {
    pub(crate) swap_chain: E::SwapChain,
    pub(crate) renderer: E::Renderer,
}

pub struct Scene<E: RenderEngine> {
    pub(crate) scene: E::Scene,
}

/// A view composes a camera, a scene and a viewport, all by handle.
pub struct View<E: RenderEngine> {
    pub(crate) view: E::View,
    pub(crate) camera: Option<Handle>,
    pub(crate) scene: Option<Handle>,
    pub(crate) viewport: Option<Handle>,
}

impl<E: RenderEngine> View<E> {
    pub fn camera(&self) -> Option<Handle> {
        self.camera
    }

    pub fn scene(&self) -> Option<Handle> {
        self.scene
    }

    pub fn viewport(&self) -> Option<Handle> {
        self.viewport
    }
}

/// One primitive / index range / material slice of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubGeometry {
    pub primitive: PrimitiveType,
    pub index_offset: u32,
    pub index_count: u32,
    pub material: Handle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mesh {
    pub(crate) entity: EntityId,
    pub(crate) sub_geometries: Vec<SubGeometry>,
}

impl Mesh {
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn sub_geometries(&self) -> &[SubGeometry] {
        &self.sub_geometries
    }
}

pub struct MaterialInstance<E: RenderEngine> {
    pub(crate) instance: E::MaterialInstance,
    pub(crate) material_type: MaterialType,
}

impl<E: RenderEngine> MaterialInstance<E> {
    pub fn material_type(&self) -> MaterialType {
        self.material_type
    }
}

pub struct Texture<E: RenderEngine> {
    pub(crate) texture: E::Texture,
    pub(crate) desc: TextureDescriptor,
}

impl<E: RenderEngine> Texture<E> {
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.desc
    }
}

pub struct VertexBuffer<E: RenderEngine> {
    pub(crate) buffer: E::VertexBuffer,
    pub(crate) format: VertexFormat,
    pub(crate) vertex_count: u32,
}

impl<E: RenderEngine> VertexBuffer<E> {
    pub fn format(&self) -> VertexFormat {
        self.format
    }

    pub fn stride(&self) -> u32 {
        self.format.stride()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

pub struct IndexBuffer<E: RenderEngine> {
    pub(crate) buffer: E::IndexBuffer,
    pub(crate) index_count: u32,
    pub(crate) uploaded: u32,
}

impl<E: RenderEngine> IndexBuffer<E> {
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Count of indices in the most recent upload.
    pub fn uploaded(&self) -> u32 {
        self.uploaded
    }
}

pub struct IndirectLight<E: RenderEngine> {
    pub(crate) light: E::IndirectLight,
    pub(crate) preset: IndirectLightPreset,
}

impl<E: RenderEngine> IndirectLight<E> {
    pub fn preset(&self) -> IndirectLightPreset {
        self.preset
    }
}

pub struct Skybox<E: RenderEngine> {
    pub(crate) skybox: E::Skybox,
    pub(crate) indirect_light: IndirectLight<E>,
}

impl<E: RenderEngine> Skybox<E> {
    pub fn preset(&self) -> IndirectLightPreset {
        self.indirect_light.preset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Light {
    pub(crate) light_type: LightType,
    pub(crate) entity: EntityId,
}

impl Light {
    pub fn light_type(&self) -> LightType {
        self.light_type
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Camera,
    RenderContext,
    Scene,
    View,
    Mesh,
    SubGeometry,
    MaterialInstance,
    Texture,
    VertexBuffer,
    IndexBuffer,
    BoundingBox,
    Viewport,
    IndirectLight,
    Skybox,
    Light,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything the object table can hold.
pub enum BridgeObject<E: RenderEngine> {
    Camera(Camera<E>),
    RenderContext(RenderContext<E>),
    Scene(Scene<E>),
    View(View<E>),
    Mesh(Mesh),
    SubGeometry(SubGeometry),
    MaterialInstance(MaterialInstance<E>),
    Texture(Texture<E>),
    VertexBuffer(VertexBuffer<E>),
    IndexBuffer(IndexBuffer<E>),
    BoundingBox(BoundingBox),
    Viewport(ViewportRect),
    IndirectLight(IndirectLight<E>),
    Skybox(Skybox<E>),
    Light(Light),
}

impl<E: RenderEngine> BridgeObject<E> {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Camera(_) => ObjectKind::Camera,
            Self::RenderContext(_) => ObjectKind::RenderContext,
            Self::Scene(_) => ObjectKind::Scene,
            Self::View(_) => ObjectKind::View,
            Self::Mesh(_) => ObjectKind::Mesh,
            Self::SubGeometry(_) => ObjectKind::SubGeometry,
            Self::MaterialInstance(_) => ObjectKind::MaterialInstance,
            Self::Texture(_) => ObjectKind::Texture,
            Self::VertexBuffer(_) => ObjectKind::VertexBuffer,
            Self::IndexBuffer(_) => ObjectKind::IndexBuffer,
            Self::BoundingBox(_) => ObjectKind::BoundingBox,
            Self::Viewport(_) => ObjectKind::Viewport,
            Self::IndirectLight(_) => ObjectKind::IndirectLight,
            Self::Skybox(_) => ObjectKind::Skybox,
            Self::Light(_) => ObjectKind::Light,
        }
    }
}

pub type ObjectTable<E> = HandleStore<BridgeObject<E>>;

// Typed access: `camera(h)` resolves or reports why not, `take_camera(h)`
// removes only when the handle really is a camera.
macro_rules! typed_access {
    ($($get:ident, $get_mut:ident, $take:ident => $variant:ident($ty:ty);)*) => {
        impl<E: RenderEngine> HandleStore<BridgeObject<E>> {
            $(
                pub fn $get(&self, handle: Handle) -> Result<&$ty> {
                    match self.lookup(handle) {
                        Some(BridgeObject::$variant(obj)) => Ok(obj),
                        Some(other) => Err(BridgeError::WrongKind {
                            handle,
                            expected: ObjectKind::$variant,
                            found: other.kind(),
                        }),
                        None => Err(BridgeError::UnknownHandle(handle)),
                    }
                }

                pub fn $get_mut(&mut self, handle: Handle) -> Result<&mut $ty> {
                    let found = match self.get_mut(handle) {
                        Some(BridgeObject::$variant(obj)) => return Ok(obj),
                        Some(other) => other.kind(),
                        None => {
                            log::warn!("Failed to find object {handle}");
                            return Err(BridgeError::UnknownHandle(handle));
                        }
                    };
                    Err(BridgeError::WrongKind {
                        handle,
                        expected: ObjectKind::$variant,
                        found,
                    })
                }

                pub fn $take(&mut self, handle: Handle) -> Option<$ty> {
                    if !matches!(self.get(handle), Some(BridgeObject::$variant(_))) {
                        return None;
                    }
                    match self.remove(handle) {
                        Some(BridgeObject::$variant(obj)) => Some(obj),
                        _ => None,
                    }
                }
            )*
        }
    };
}

typed_access! {
    camera, camera_mut, take_camera => Camera(Camera<E>);
    render_context, render_context_mut, take_render_context => RenderContext(RenderContext<E>);
    scene, scene_mut, take_scene => Scene(Scene<E>);
    view, view_mut, take_view => View(View<E>);
    mesh, mesh_mut, take_mesh => Mesh(Mesh);
    sub_geometry, sub_geometry_mut, take_sub_geometry => SubGeometry(SubGeometry);
    material_instance, material_instance_mut, take_material_instance => MaterialInstance(MaterialInstance<E>);
    texture, texture_mut, take_texture => Texture(Texture<E>);
    vertex_buffer, vertex_buffer_mut, take_vertex_buffer => VertexBuffer(VertexBuffer<E>);
    index_buffer, index_buffer_mut, take_index_buffer => IndexBuffer(IndexBuffer<E>);
    bounding_box, bounding_box_mut, take_bounding_box => BoundingBox(BoundingBox);
    viewport, viewport_mut, take_viewport => Viewport(ViewportRect);
    indirect_light, indirect_light_mut, take_indirect_light => IndirectLight(IndirectLight<E>);
    skybox, skybox_mut, take_skybox => Skybox(Skybox<E>);
    light, light_mut, take_light => Light(Light);
}
