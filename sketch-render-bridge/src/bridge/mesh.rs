use sketch_render_shared::units::flatten_matrix;
use sketch_render_shared::PrimitiveType;

use crate::engine::{PrimitiveDescriptor, RenderEngine, RenderableDescriptor};
use crate::entity::EntityId;
use crate::error::{BridgeError, Result};
use crate::handle::Handle;
use crate::objects::{BridgeObject, Mesh, SubGeometry, MAX_SUB_GEOMETRIES};

use super::Bridge;

impl<E: RenderEngine> Bridge<E> {
    /// Describe one slice of a future mesh. The material instance must exist.
    pub fn create_mesh_sub_geometry(
        &mut self,
        primitive: PrimitiveType,
        index_offset: u32,
        index_count: u32,
        material: Handle,
    ) -> Result<Handle> {
        self.objects.material_instance(material)?;
        Ok(self.objects.insert(BridgeObject::SubGeometry(SubGeometry {
            primitive,
            index_offset,
            index_count,
            material,
        })))
    }

    pub fn destroy_mesh_sub_geometry(&mut self, sub_geometry: Handle) -> bool {
        self.objects.take_sub_geometry(sub_geometry).is_some()
    }

    /// New entity carrying a renderable built from 1 to
    /// [`MAX_SUB_GEOMETRIES`] sub-geometries.
    pub fn create_mesh(
        &mut self,
        vertex_buffer: Handle,
        index_buffer: Handle,
        sub_geometries: &[Handle],
        bounding_box: Handle,
        cast_shadows: bool,
        receive_shadows: bool,
    ) -> Result<Handle> {
        self.build_mesh(
            None,
            vertex_buffer,
            index_buffer,
            sub_geometries,
            bounding_box,
            cast_shadows,
            receive_shadows,
        )
    }

    /// Single sub-geometry shorthand for [`create_mesh`](Self::create_mesh).
    #[allow(clippy::too_many_arguments)]
    pub fn create_mesh_prim(
        &mut self,
        primitive: PrimitiveType,
        vertex_buffer: Handle,
        index_buffer: Handle,
        index_offset: u32,
        index_count: u32,
        material: Handle,
        bounding_box: Handle,
        cast_shadows: bool,
        receive_shadows: bool,
    ) -> Result<Handle> {
        let sub = self.create_mesh_sub_geometry(primitive, index_offset, index_count, material)?;
        let result = self.create_mesh(
            vertex_buffer,
            index_buffer,
            &[sub],
            bounding_box,
            cast_shadows,
            receive_shadows,
        );
        if result.is_err() {
            self.objects.take_sub_geometry(sub);
        }
        result
    }

    /// Rebuild the renderable on `mesh`'s entity and return a new mesh handle
    /// bound to it. On success the old handle is retired, so the entity keeps
    /// a single owner. A dead `mesh` handle gets a fresh entity instead.
    #[allow(clippy::too_many_arguments)]
    pub fn reuse_mesh(
        &mut self,
        mesh: Handle,
        vertex_buffer: Handle,
        index_buffer: Handle,
        sub_geometries: &[Handle],
        bounding_box: Handle,
        cast_shadows: bool,
        receive_shadows: bool,
    ) -> Result<Handle> {
        let entity = match self.objects.get(mesh) {
            Some(BridgeObject::Mesh(m)) => Some(m.entity),
            _ => None,
        };
        let handle = self.build_mesh(
            entity,
            vertex_buffer,
            index_buffer,
            sub_geometries,
            bounding_box,
            cast_shadows,
            receive_shadows,
        )?;
        if entity.is_some() {
            self.objects.take_mesh(mesh);
            log::debug!("Mesh {mesh} replaced by {handle}");
        }
        Ok(handle)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_mesh(
        &mut self,
        entity: Option<EntityId>,
        vertex_buffer: Handle,
        index_buffer: Handle,
        sub_geometries: &[Handle],
        bounding_box: Handle,
        cast_shadows: bool,
        receive_shadows: bool,
    ) -> Result<Handle> {
        let count = sub_geometries.len();
        if count == 0 || count > MAX_SUB_GEOMETRIES {
            return Err(BridgeError::SubGeometryCount {
                count,
                max: MAX_SUB_GEOMETRIES,
            });
        }

        let objects = &self.objects;
        let vb = objects.vertex_buffer(vertex_buffer)?;
        let ib = objects.index_buffer(index_buffer)?;
        let bbox = *objects.bounding_box(bounding_box)?;
        let subs = sub_geometries
            .iter()
            .map(|h| objects.sub_geometry(*h).copied())
            .collect::<Result<Vec<_>>>()?;
        let primitives = subs
            .iter()
            .map(|sub| {
                Ok(PrimitiveDescriptor {
                    primitive: sub.primitive,
                    index_offset: sub.index_offset,
                    index_count: sub.index_count,
                    material: &objects.material_instance(sub.material)?.instance,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let (entity_id, fresh) = match entity {
            Some(id) if self.entities.contains(id) => (id, false),
            _ => {
                let native = self.engine.create_entity();
                (self.entities.insert(native), true)
            }
        };
        let entity = self.entities.resolve(entity_id)?;
        if self.engine.has_renderable(entity) {
            self.engine.destroy_renderable(entity);
        }

        let desc = RenderableDescriptor {
            bounding_box: bbox,
            vertex_buffer: &vb.buffer,
            index_buffer: &ib.buffer,
            primitives,
            culling: true,
            cast_shadows,
            receive_shadows,
        };
        if let Err(err) = self.engine.build_renderable(entity, &desc) {
            if fresh {
                self.destroy_entity(entity_id);
            }
            return Err(err.into());
        }

        let handle = self.objects.insert(BridgeObject::Mesh(Mesh {
            entity: entity_id,
            sub_geometries: subs,
        }));
        log::debug!("Created mesh {handle} on {entity_id} with {count} sub-geometries");
        Ok(handle)
    }

    /// Removes the mesh's entity together with all of its components.
    pub fn destroy_mesh(&mut self, mesh: Handle) -> bool {
        match self.objects.take_mesh(mesh) {
            Some(m) => {
                self.destroy_entity(m.entity);
                log::debug!("Destroyed mesh {mesh}");
                true
            }
            None => false,
        }
    }

    /// Sketch-space transform; only the translation row is scaled.
    pub fn mesh_set_transform(&mut self, mesh: Handle, rows: &[[f64; 4]; 4]) -> Result<()> {
        let matrix = self.units.matrix(rows);
        self.set_mesh_transform(mesh, &matrix)
    }

    /// Transform already in engine units.
    pub fn mesh_set_transform_unmodified(&mut self, mesh: Handle, rows: &[[f64; 4]; 4]) -> Result<()> {
        self.set_mesh_transform(mesh, &flatten_matrix(rows))
    }

    fn set_mesh_transform(&mut self, mesh: Handle, matrix: &[f32; 16]) -> Result<()> {
        let mesh = self.objects.mesh(mesh)?;
        let entity = self.entities.resolve(mesh.entity)?;
        if !self.engine.has_transform(entity) {
            self.engine.create_transform(entity);
        }
        self.engine.set_transform(entity, matrix);
        Ok(())
    }

    pub fn mesh_set_material(&mut self, mesh: Handle, index: usize, material: Handle) -> Result<()> {
        let m = self.objects.mesh(mesh)?;
        let mi = self.objects.material_instance(material)?;
        let count = m.sub_geometries.len();
        if index >= count {
            return Err(BridgeError::SubGeometryIndex { index, count });
        }
        let entity = self.entities.resolve(m.entity)?;
        if !self.engine.has_renderable(entity) {
            return Err(BridgeError::MissingComponent {
                entity: m.entity,
                component: "renderable",
            });
        }
        self.engine.renderable_set_material(entity, index, &mi.instance);
        self.objects.mesh_mut(mesh)?.sub_geometries[index].material = material;
        Ok(())
    }

    pub fn mesh_sub_geometry_count(&self, mesh: Handle) -> Result<usize> {
        Ok(self.objects.mesh(mesh)?.sub_geometries.len())
    }

    pub fn mesh_entity(&self, mesh: Handle) -> Result<EntityId> {
        Ok(self.objects.mesh(mesh)?.entity)
    }
}
