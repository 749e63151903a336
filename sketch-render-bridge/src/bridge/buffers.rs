use bytemuck::Pod;
use sketch_render_shared::vertex::{VertexPos, VertexPosColor, VertexPosUv0, VertexPosUv0Tan};
use sketch_render_shared::{BoundingBox, VertexFormat};

use crate::engine::{IndexBufferDescriptor, RenderEngine, VertexBufferDescriptor};
use crate::error::{malformed, BridgeError, Result};
use crate::handle::Handle;
use crate::objects::{BridgeObject, IndexBuffer, VertexBuffer};

use super::input::range;
use super::Bridge;

impl<E: RenderEngine> Bridge<E> {
    // ── vertex buffer ──

    /// One interleaved buffer holding `vertex_count` vertices of `format`.
    pub fn create_vertex_buffer(&mut self, format: VertexFormat, vertex_count: u32) -> Result<Handle> {
        let desc = VertexBufferDescriptor::interleaved(format, vertex_count);
        let buffer = self.engine.create_vertex_buffer(&desc)?;
        let handle = self.objects.insert(BridgeObject::VertexBuffer(VertexBuffer {
            buffer,
            format,
            vertex_count,
        }));
        log::debug!("Created vertex buffer {handle} ({format:?} x {vertex_count})");
        Ok(handle)
    }

    pub fn destroy_vertex_buffer(&mut self, buffer: Handle) -> bool {
        match self.objects.take_vertex_buffer(buffer) {
            Some(vb) => {
                self.engine.destroy_vertex_buffer(vb.buffer);
                log::debug!("Destroyed vertex buffer {buffer}");
                true
            }
            None => false,
        }
    }

    /// Positions are flat sketch-space `x, y, z` triplets.
    pub fn set_vertices_pos(
        &mut self,
        buffer: Handle,
        positions: &[f64],
        src_offset: u32,
        dst_offset: u32,
        count: u32,
    ) -> Result<bool> {
        let Some(byte_offset) = self.check_vertex_write(buffer, VertexFormat::Pos, dst_offset, count)? else {
            return Ok(false);
        };
        let positions = range(positions, 3, src_offset, count, "positions")?;
        let vertices: Vec<VertexPos> = positions
            .chunks_exact(3)
            .map(|p| VertexPos {
                position: self.units.point([p[0], p[1], p[2]]),
            })
            .collect();
        self.upload_vertices(buffer, byte_offset, &vertices)
    }

    /// `colors` holds one packed RGBA8 value per vertex.
    pub fn set_vertices_pos_color(
        &mut self,
        buffer: Handle,
        positions: &[f64],
        colors: &[u32],
        src_offset: u32,
        dst_offset: u32,
        count: u32,
    ) -> Result<bool> {
        let Some(byte_offset) = self.check_vertex_write(buffer, VertexFormat::PosColor, dst_offset, count)? else {
            return Ok(false);
        };
        let positions = range(positions, 3, src_offset, count, "positions")?;
        let colors = range(colors, 1, src_offset, count, "colors")?;
        let vertices: Vec<VertexPosColor> = positions
            .chunks_exact(3)
            .zip(colors)
            .map(|(p, color)| VertexPosColor {
                position: self.units.point([p[0], p[1], p[2]]),
                color: *color,
            })
            .collect();
        self.upload_vertices(buffer, byte_offset, &vertices)
    }

    pub fn set_vertices_pos_uv0(
        &mut self,
        buffer: Handle,
        positions: &[f64],
        uvs: &[f32],
        src_offset: u32,
        dst_offset: u32,
        count: u32,
    ) -> Result<bool> {
        let Some(byte_offset) = self.check_vertex_write(buffer, VertexFormat::PosUv0, dst_offset, count)? else {
            return Ok(false);
        };
        let positions = range(positions, 3, src_offset, count, "positions")?;
        let uvs = range(uvs, 2, src_offset, count, "uvs")?;
        let vertices: Vec<VertexPosUv0> = positions
            .chunks_exact(3)
            .zip(uvs.chunks_exact(2))
            .map(|(p, uv)| VertexPosUv0 {
                position: self.units.point([p[0], p[1], p[2]]),
                uv0: [uv[0], uv[1]],
            })
            .collect();
        self.upload_vertices(buffer, byte_offset, &vertices)
    }

    /// The tangent frame is the normal with `w = 0`. `normals` is either one
    /// `x, y, z` normal shared by every written vertex or one normal per
    /// vertex, indexed like `positions`.
    #[allow(clippy::too_many_arguments)]
    pub fn set_vertices_pos_uv0_tan(
        &mut self,
        buffer: Handle,
        positions: &[f64],
        normals: &[f32],
        uvs: &[f32],
        src_offset: u32,
        dst_offset: u32,
        count: u32,
    ) -> Result<bool> {
        let Some(byte_offset) = self.check_vertex_write(buffer, VertexFormat::PosUv0Tan, dst_offset, count)? else {
            return Ok(false);
        };
        let positions = range(positions, 3, src_offset, count, "positions")?;
        let normals = match normals {
            [x, y, z] => vec![[*x, *y, *z]; count as usize],
            _ => range(normals, 3, src_offset, count, "normals")?
                .chunks_exact(3)
                .map(|n| [n[0], n[1], n[2]])
                .collect(),
        };
        let uvs = range(uvs, 2, src_offset, count, "uvs")?;
        let vertices: Vec<VertexPosUv0Tan> = positions
            .chunks_exact(3)
            .zip(&normals)
            .zip(uvs.chunks_exact(2))
            .map(|((p, n), uv)| VertexPosUv0Tan {
                position: self.units.point([p[0], p[1], p[2]]),
                uv0: [uv[0], uv[1]],
                tangents: [n[0], n[1], n[2], 0.0],
            })
            .collect();
        self.upload_vertices(buffer, byte_offset, &vertices)
    }

    /// Resolves the buffer and checks the destination range. Returns the
    /// byte offset of the write, or `None` when there is nothing to write.
    fn check_vertex_write(
        &self,
        buffer: Handle,
        format: VertexFormat,
        dst_offset: u32,
        count: u32,
    ) -> Result<Option<u32>> {
        let vb = self.objects.vertex_buffer(buffer)?;
        if vb.format != format {
            return Err(BridgeError::FormatMismatch {
                expected: format,
                actual: vb.format,
            });
        }
        if count == 0 {
            return Ok(None);
        }
        byte_offset(dst_offset, count, vb.stride(), vb.vertex_count).map(Some)
    }

    fn upload_vertices<V: Pod>(&mut self, buffer: Handle, byte_offset: u32, vertices: &[V]) -> Result<bool> {
        let vb = self.objects.vertex_buffer(buffer)?;
        self.engine
            .vertex_buffer_upload(&vb.buffer, 0, bytemuck::cast_slice(vertices), byte_offset);
        Ok(true)
    }

    // ── index buffer ──

    /// 16-bit index buffer.
    pub fn create_index_buffer(&mut self, index_count: u32) -> Result<Handle> {
        let buffer = self
            .engine
            .create_index_buffer(&IndexBufferDescriptor { index_count })?;
        let handle = self.objects.insert(BridgeObject::IndexBuffer(IndexBuffer {
            buffer,
            index_count,
            uploaded: 0,
        }));
        log::debug!("Created index buffer {handle} ({index_count} indices)");
        Ok(handle)
    }

    pub fn destroy_index_buffer(&mut self, buffer: Handle) -> bool {
        match self.objects.take_index_buffer(buffer) {
            Some(ib) => {
                self.engine.destroy_index_buffer(ib.buffer);
                log::debug!("Destroyed index buffer {buffer}");
                true
            }
            None => false,
        }
    }

    /// Writes `indices[..count]` starting at index `dst_offset`.
    pub fn set_indices(&mut self, buffer: Handle, indices: &[u32], dst_offset: u32, count: u32) -> Result<bool> {
        let ib = self.objects.index_buffer(buffer)?;
        if count == 0 {
            return Ok(false);
        }
        let offset = byte_offset(dst_offset, count, INDEX_SIZE, ib.index_count)?;
        let indices = range(indices, 1, 0, count, "indices")?
            .iter()
            .map(|&i| u16::try_from(i).map_err(|_| malformed(format!("index {i} does not fit in 16 bits"))))
            .collect::<Result<Vec<u16>>>()?;

        self.engine
            .index_buffer_upload(&ib.buffer, bytemuck::cast_slice(&indices), offset);
        self.objects.index_buffer_mut(buffer)?.uploaded = count;
        Ok(true)
    }

    // ── bounding box ──

    /// Corners in sketch space, in any order.
    pub fn create_bounding_box(&mut self, min: [f64; 3], max: [f64; 3]) -> Result<Handle> {
        let bbox = BoundingBox::from_corners(self.units.point(min), self.units.point(max));
        Ok(self.objects.insert(BridgeObject::BoundingBox(bbox)))
    }

    pub fn create_bounding_box_from_points(&mut self, points: &[[f64; 3]]) -> Result<Handle> {
        let converted: Vec<[f32; 3]> = points.iter().map(|p| self.units.point(*p)).collect();
        let bbox = BoundingBox::from_points(&converted).ok_or_else(|| malformed("bounding box needs at least one point"))?;
        Ok(self.objects.insert(BridgeObject::BoundingBox(bbox)))
    }

    pub fn destroy_bounding_box(&mut self, bbox: Handle) -> bool {
        self.objects.take_bounding_box(bbox).is_some()
    }
}

/// Bytes per 16-bit index.
const INDEX_SIZE: u32 = 2;

/// Byte offset of a write of `count` elements at element `offset`. The whole
/// range must lie inside `capacity` elements and be addressable in bytes.
fn byte_offset(offset: u32, count: u32, element_size: u32, capacity: u32) -> Result<u32> {
    let overflow = || BridgeError::BufferOverflow {
        offset,
        count,
        capacity,
    };
    let end = offset.checked_add(count).filter(|end| *end <= capacity).ok_or_else(overflow)?;
    end.checked_mul(element_size).ok_or_else(overflow)?;
    offset.checked_mul(element_size).ok_or_else(overflow)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{approx_eq3, bridge};
    use super::byte_offset;
    use crate::error::BridgeError;
    use sketch_render_shared::vertex::{pack_rgba8, VertexPosColor, VertexPosUv0Tan};
    use sketch_render_shared::VertexFormat;

    // ── vertex buffer ──

    #[test]
    fn test_vertex_buffer_stride_follows_format() {
        let mut b = bridge();
        for format in VertexFormat::ALL {
            let vb = b.create_vertex_buffer(format, 10).unwrap();
            let wrapped = b.objects().vertex_buffer(vb).unwrap();
            assert_eq!(wrapped.stride(), format.stride());
            assert_eq!(b.engine().vertex_buffers[&wrapped.buffer].stride, format.stride());
        }
    }

    #[test]
    fn test_set_vertices_pos_converts_and_offsets() {
        let mut b = bridge();
        let vb = b.create_vertex_buffer(VertexFormat::Pos, 4).unwrap();
        let positions = [0.0, 0.0, 0.0, 5000.0, 0.0, 0.0, 0.0, 10000.0, 2500.0];

        assert!(b.set_vertices_pos(vb, &positions, 1, 2, 2).unwrap());

        let native = b.objects().vertex_buffer(vb).unwrap().buffer;
        let bytes = &b.engine().vertex_buffers[&native].bytes;
        let floats: Vec<f32> = bytes.chunks_exact(4).map(bytemuck::pod_read_unaligned).collect();
        assert_eq!(&floats[..6], &[0.0; 6]);
        assert!(approx_eq3([floats[6], floats[7], floats[8]], [1.0, 0.0, 0.0]));
        assert!(approx_eq3([floats[9], floats[10], floats[11]], [0.0, 2.0, 0.5]));
    }

    #[test]
    fn test_zero_count_uploads_nothing() {
        let mut b = bridge();
        let vb = b.create_vertex_buffer(VertexFormat::Pos, 4).unwrap();
        assert!(!b.set_vertices_pos(vb, &[], 0, 0, 0).unwrap());

        let native = b.objects().vertex_buffer(vb).unwrap().buffer;
        assert_eq!(b.engine().vertex_buffers[&native].uploads, 0);
    }

    #[test]
    fn test_pos_color_packs_color_after_position() {
        let mut b = bridge();
        let vb = b.create_vertex_buffer(VertexFormat::PosColor, 1).unwrap();
        let color = pack_rgba8(255, 128, 0, 255);
        b.set_vertices_pos_color(vb, &[5000.0, 5000.0, 5000.0], &[color], 0, 0, 1)
            .unwrap();

        let native = b.objects().vertex_buffer(vb).unwrap().buffer;
        let bytes = &b.engine().vertex_buffers[&native].bytes;
        let vertex: VertexPosColor = bytemuck::pod_read_unaligned(&bytes[..16]);
        assert!(approx_eq3(vertex.position, [1.0, 1.0, 1.0]));
        assert_eq!(vertex.color, color);
        assert_eq!(&bytes[12..16], &[255, 128, 0, 255]);
    }

    #[test]
    fn test_pos_uv0_tan_writes_normal_frame() {
        let mut b = bridge();
        let vb = b.create_vertex_buffer(VertexFormat::PosUv0Tan, 2).unwrap();
        b.set_vertices_pos_uv0_tan(vb, &[0.0; 6], &[0.0, 0.0, 1.0, 0.0, 1.0, 0.0], &[0.25, 0.75, 1.0, 0.0], 0, 0, 2)
            .unwrap();

        let native = b.objects().vertex_buffer(vb).unwrap().buffer;
        let vertices: Vec<VertexPosUv0Tan> = b.engine().vertex_buffers[&native]
            .bytes
            .chunks_exact(36)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert_eq!(vertices[0].uv0, [0.25, 0.75]);
        assert_eq!(vertices[0].tangents, [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(vertices[1].tangents, [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_pos_uv0_tan_shares_single_normal() {
        let mut b = bridge();
        let vb = b.create_vertex_buffer(VertexFormat::PosUv0Tan, 3).unwrap();
        let positions = [0.0; 9];
        let uvs = [0.0; 6];
        b.set_vertices_pos_uv0_tan(vb, &positions, &[1.0, 0.0, 0.0], &uvs, 0, 0, 3)
            .unwrap();

        let native = b.objects().vertex_buffer(vb).unwrap().buffer;
        let vertices: Vec<VertexPosUv0Tan> = b.engine().vertex_buffers[&native]
            .bytes
            .chunks_exact(36)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert_eq!(vertices.len(), 3);
        assert!(vertices.iter().all(|v| v.tangents == [1.0, 0.0, 0.0, 0.0]));

        // Neither one normal nor one per vertex.
        assert!(matches!(
            b.set_vertices_pos_uv0_tan(vb, &positions, &[0.0; 6], &uvs, 0, 0, 3),
            Err(BridgeError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_byte_offset_overflow_is_rejected() {
        assert_eq!(byte_offset(3, 2, 36, 8).unwrap(), 108);
        assert!(matches!(
            byte_offset(u32::MAX / 2, 1, 4, u32::MAX),
            Err(BridgeError::BufferOverflow { capacity: u32::MAX, .. })
        ));
        assert!(byte_offset(u32::MAX, 1, 1, u32::MAX).is_err());
        assert!(byte_offset(6, 3, 2, 8).is_err());
    }

    #[test]
    fn test_writer_format_must_match() {
        let mut b = bridge();
        let vb = b.create_vertex_buffer(VertexFormat::PosUv0, 4).unwrap();
        assert!(matches!(
            b.set_vertices_pos(vb, &[0.0; 3], 0, 0, 1),
            Err(BridgeError::FormatMismatch {
                expected: VertexFormat::Pos,
                actual: VertexFormat::PosUv0
            })
        ));
    }

    #[test]
    fn test_vertex_ranges_are_checked() {
        let mut b = bridge();
        let vb = b.create_vertex_buffer(VertexFormat::PosUv0, 2).unwrap();
        assert!(matches!(
            b.set_vertices_pos_uv0(vb, &[0.0; 9], &[0.0; 6], 0, 1, 2),
            Err(BridgeError::BufferOverflow { .. })
        ));
        assert!(matches!(
            b.set_vertices_pos_uv0(vb, &[0.0; 6], &[0.0; 2], 0, 0, 2),
            Err(BridgeError::MalformedInput(_))
        ));
        assert!(b.set_vertices_pos_uv0(vb, &[0.0; 6], &[0.0; 4], 0, u32::MAX, 1).is_err());
    }

    #[test]
    fn test_write_to_destroyed_buffer() {
        let mut b = bridge();
        let vb = b.create_vertex_buffer(VertexFormat::Pos, 1).unwrap();
        assert!(b.destroy_vertex_buffer(vb));
        assert!(!b.destroy_vertex_buffer(vb));
        assert!(matches!(
            b.set_vertices_pos(vb, &[0.0; 3], 0, 0, 1),
            Err(BridgeError::UnknownHandle(_))
        ));
    }

    // ── index buffer ──

    #[test]
    fn test_set_indices() {
        let mut b = bridge();
        let ib = b.create_index_buffer(6).unwrap();
        assert!(b.set_indices(ib, &[0, 1, 2, 9], 3, 3).unwrap());

        let wrapped = b.objects().index_buffer(ib).unwrap();
        assert_eq!(wrapped.uploaded(), 3);
        let indices: Vec<u16> = b.engine().index_buffers[&wrapped.buffer]
            .bytes
            .chunks_exact(2)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert_eq!(indices, vec![0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_set_indices_rejects_wide_values() {
        let mut b = bridge();
        let ib = b.create_index_buffer(2).unwrap();
        assert!(matches!(
            b.set_indices(ib, &[1, 70_000], 0, 2),
            Err(BridgeError::MalformedInput(_))
        ));
        assert_eq!(b.objects().index_buffer(ib).unwrap().uploaded(), 0);
    }

    #[test]
    fn test_set_indices_bounds() {
        let mut b = bridge();
        let ib = b.create_index_buffer(2).unwrap();
        assert!(!b.set_indices(ib, &[], 0, 0).unwrap());
        assert!(matches!(b.set_indices(ib, &[0, 1], 1, 2), Err(BridgeError::BufferOverflow { .. })));
        assert!(matches!(b.set_indices(ib, &[0], 0, 2), Err(BridgeError::MalformedInput(_))));
        assert!(b.destroy_index_buffer(ib));
        assert!(!b.destroy_index_buffer(ib));
    }

    // ── bounding box ──

    #[test]
    fn test_bounding_box_normalizes_corners() {
        let mut b = bridge();
        let bb = b
            .create_bounding_box([10000.0, 0.0, 5000.0], [0.0, 5000.0, -5000.0])
            .unwrap();
        let bbox = b.objects().bounding_box(bb).unwrap();
        assert!(approx_eq3(bbox.center, [1.0, 0.5, 0.0]));
        assert!(approx_eq3(bbox.half_extent, [1.0, 0.5, 1.0]));
    }

    #[test]
    fn test_bounding_box_from_points() {
        let mut b = bridge();
        let bb = b
            .create_bounding_box_from_points(&[[0.0, 0.0, 0.0], [5000.0, 0.0, 0.0], [0.0, -5000.0, 2500.0]])
            .unwrap();
        let bbox = b.objects().bounding_box(bb).unwrap();
        assert!(approx_eq3(bbox.min(), [0.0, -1.0, 0.0]));
        assert!(approx_eq3(bbox.max(), [1.0, 0.0, 0.5]));

        assert!(matches!(
            b.create_bounding_box_from_points(&[]),
            Err(BridgeError::MalformedInput(_))
        ));
        assert!(b.destroy_bounding_box(bb));
        assert!(!b.destroy_bounding_box(bb));
    }
}
