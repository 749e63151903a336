//! The facade: every host operation, keyed by [`Handle`].
//!
//! Operations come in three shapes. Creates return `Result<Handle>`, mutators
//! return `Result<()>`, destroys return `bool` and are safe to repeat. All
//! handles an operation needs are resolved before the engine is touched, so a
//! stale handle never leaves a half-applied change behind.

mod buffers;
mod camera;
pub mod input;
mod lighting;
mod material;
mod mesh;
mod scene;

use std::collections::BTreeMap;

use sketch_render_shared::UnitConverter;

pub use material::TextureSlot;

use crate::config::BridgeConfig;
use crate::engine::RenderEngine;
use crate::entity::{EntityId, EntityRegistry};
use crate::error::Result;
use crate::handle::Handle;
use crate::objects::{BridgeObject, ObjectKind, ObjectTable};

pub struct Bridge<E: RenderEngine> {
    engine: E,
    config: BridgeConfig,
    units: UnitConverter,
    objects: ObjectTable<E>,
    entities: EntityRegistry<E::Entity>,
    /// Loaded material packages keyed by URL, so types sharing a package
    /// share one load.
    materials: BTreeMap<String, E::Material>,
    ready: bool,
}

impl<E: RenderEngine> Bridge<E> {
    /// Fails when `config` does not validate.
    pub fn new(engine: E, config: BridgeConfig) -> Result<Self> {
        config.validate()?;
        let ready = config.assets.is_empty();
        log::info!(
            "Render bridge created (one meter = {} units, ready = {ready})",
            config.one_meter
        );
        Ok(Self {
            engine,
            units: config.units(),
            config,
            objects: ObjectTable::new(),
            entities: EntityRegistry::new(),
            materials: BTreeMap::new(),
            ready,
        })
    }

    /// Whether the engine has finished loading its startup assets.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn mark_ready(&mut self) {
        if !self.ready {
            log::info!("Render bridge ready");
        }
        self.ready = true;
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn objects(&self) -> &ObjectTable<E> {
        &self.objects
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn has_entity(&self, entity: EntityId) -> bool {
        self.entities.contains(entity)
    }

    /// Sketch length to engine length.
    pub fn convert(&self, value: f64) -> f64 {
        self.units.scalar(value)
    }

    /// Whether `handle` names a live object of any kind.
    pub fn contains(&self, handle: Handle) -> bool {
        self.objects.contains(handle)
    }

    pub fn kind_of(&self, handle: Handle) -> Option<ObjectKind> {
        self.objects.get(handle).map(BridgeObject::kind)
    }

    /// Destroy every live object, entity and loaded material, then hand the
    /// engine back.
    pub fn shutdown(mut self) -> E {
        log::info!(
            "Shutting down render bridge ({} objects, {} entities)",
            self.objects.len(),
            self.entities.len()
        );

        let (front, mut rest): (Vec<_>, Vec<_>) = self
            .objects
            .drain()
            .map(|(_, object)| object)
            .partition(|object| matches!(object.kind(), ObjectKind::View | ObjectKind::RenderContext));
        rest.sort_by_key(|object| teardown_rank(object.kind()));

        for object in front {
            release_object(&mut self.engine, object);
        }
        for (_, entity) in self.entities.drain() {
            release_entity(&mut self.engine, entity);
        }
        for object in rest {
            release_object(&mut self.engine, object);
        }
        for (_, material) in std::mem::take(&mut self.materials) {
            self.engine.destroy_material(material);
        }
        self.engine
    }

    /// New engine entity registered under a fresh [`EntityId`].
    fn create_entity(&mut self) -> EntityId {
        let entity = self.engine.create_entity();
        self.entities.insert(entity)
    }

    /// Remove every component of the entity, then the entity itself.
    fn destroy_entity(&mut self, id: EntityId) -> bool {
        match self.entities.remove(id) {
            Some(entity) => {
                release_entity(&mut self.engine, entity);
                true
            }
            None => false,
        }
    }
}

fn release_entity<E: RenderEngine>(engine: &mut E, entity: E::Entity) {
    if engine.has_renderable(&entity) {
        engine.destroy_renderable(&entity);
    }
    if engine.has_transform(&entity) {
        engine.destroy_transform(&entity);
    }
    if engine.has_light(&entity) {
        engine.destroy_light(&entity);
    }
    engine.destroy_entity(entity);
}

// Users before the things they use.
fn teardown_rank(kind: ObjectKind) -> u8 {
    match kind {
        ObjectKind::View | ObjectKind::RenderContext => 0,
        ObjectKind::Scene => 1,
        ObjectKind::Skybox | ObjectKind::IndirectLight => 2,
        ObjectKind::Camera => 3,
        ObjectKind::MaterialInstance => 4,
        ObjectKind::Texture | ObjectKind::VertexBuffer | ObjectKind::IndexBuffer => 5,
        ObjectKind::Mesh
        | ObjectKind::SubGeometry
        | ObjectKind::BoundingBox
        | ObjectKind::Viewport
        | ObjectKind::Light => 6,
    }
}

/// Forward the destroy call(s) for one table entry. Entities are owned by
/// the registry, not by meshes or lights.
fn release_object<E: RenderEngine>(engine: &mut E, object: BridgeObject<E>) {
    match object {
        BridgeObject::Camera(camera) => engine.destroy_camera(camera.camera),
        BridgeObject::RenderContext(ctx) => {
            engine.destroy_renderer(ctx.renderer);
            engine.destroy_swap_chain(ctx.swap_chain);
        }
        BridgeObject::Scene(scene) => engine.destroy_scene(scene.scene),
        BridgeObject::View(view) => {
            engine.view_set_camera(&view.view, None);
            engine.view_set_scene(&view.view, None);
            engine.destroy_view(view.view);
        }
        BridgeObject::MaterialInstance(mi) => engine.destroy_material_instance(mi.instance),
        BridgeObject::Texture(texture) => engine.destroy_texture(texture.texture),
        BridgeObject::VertexBuffer(vb) => engine.destroy_vertex_buffer(vb.buffer),
        BridgeObject::IndexBuffer(ib) => engine.destroy_index_buffer(ib.buffer),
        BridgeObject::IndirectLight(ibl) => engine.destroy_indirect_light(ibl.light),
        BridgeObject::Skybox(skybox) => {
            engine.destroy_skybox(skybox.skybox);
            engine.destroy_indirect_light(skybox.indirect_light.light);
        }
        BridgeObject::Mesh(_)
        | BridgeObject::SubGeometry(_)
        | BridgeObject::BoundingBox(_)
        | BridgeObject::Viewport(_)
        | BridgeObject::Light(_) => {}
    }
}
