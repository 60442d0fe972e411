use glint_common::MeshData;

use crate::device::{BufferId, BufferKind, GraphicsDevice, VertexArrayId, VertexFormat};
use crate::error::RenderError;

/// Attribute slot for vertex positions.
pub const POSITION_SLOT: u32 = 0;
/// Attribute slot for vertex normals.
pub const NORMAL_SLOT: u32 = 1;
/// Attribute slot for texture coordinates, when the mesh has them.
pub const TEX_COORD_SLOT: u32 = 2;

/// Vertex attribute channels and indices resident on the GPU.
///
/// One buffer per channel plus the index buffer, bound together under one
/// vertex array. Built once at scene load and never mutated; release it with
/// `destroy` at shutdown.
#[derive(Debug, PartialEq, Eq)]
pub struct GeometryBuffer {
    vertex_array: VertexArrayId,
    buffers: Vec<BufferId>,
    index_count: u32,
    vertex_count: u32,
    has_tex_coords: bool,
}

impl GeometryBuffer {
    /// Upload `mesh` and record its attribute layout.
    ///
    /// The mesh is validated first; a malformed mesh is a configuration error
    /// and nothing is allocated for it.
    pub fn build<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        mesh: &MeshData,
    ) -> Result<Self, RenderError> {
        mesh.validate()?;

        let mut buffers = Vec::with_capacity(4);
        let uploaded = Self::upload_channels(device, mesh, &mut buffers);
        let (vertex_array, index_count) = match uploaded {
            Ok(v) => v,
            Err(e) => {
                for buffer in buffers {
                    device.delete_buffer(buffer);
                }
                return Err(e);
            }
        };

        tracing::debug!(
            ?vertex_array,
            vertices = mesh.vertex_count(),
            indices = index_count,
            tex_coords = mesh.has_tex_coords(),
            "geometry uploaded"
        );
        Ok(Self {
            vertex_array,
            buffers,
            index_count,
            vertex_count: mesh.vertex_count() as u32,
            has_tex_coords: mesh.has_tex_coords(),
        })
    }

    /// Build from flat float arrays (`xyz xyz ...`, `uv uv ...`). Pass an
    /// empty `tex_coords` slice for meshes without texture coordinates.
    pub fn from_arrays<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        positions: &[f32],
        normals: &[f32],
        tex_coords: &[f32],
        indices: &[u32],
    ) -> Result<Self, RenderError> {
        let mesh = MeshData::from_flat(positions, normals, tex_coords, indices.to_vec())?;
        Self::build(device, &mesh)
    }

    fn upload_channels<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        mesh: &MeshData,
        buffers: &mut Vec<BufferId>,
    ) -> Result<(VertexArrayId, u32), RenderError> {
        let mut upload = |kind: BufferKind, contents: &[u8]| -> Result<BufferId, RenderError> {
            let buffer = device.create_buffer(kind, contents)?;
            buffers.push(buffer);
            Ok(buffer)
        };
        let positions = upload(BufferKind::Vertex, bytemuck::cast_slice(&mesh.positions))?;
        let normals = upload(BufferKind::Vertex, bytemuck::cast_slice(&mesh.normals))?;
        let tex_coords = if mesh.has_tex_coords() {
            Some(upload(BufferKind::Vertex, bytemuck::cast_slice(&mesh.tex_coords))?)
        } else {
            None
        };
        let indices = upload(BufferKind::Index, bytemuck::cast_slice(&mesh.indices))?;

        let vao = device.create_vertex_array();
        device.attach_vertex_buffer(vao, POSITION_SLOT, positions, VertexFormat::Float32x3);
        device.attach_vertex_buffer(vao, NORMAL_SLOT, normals, VertexFormat::Float32x3);
        if let Some(tex_coords) = tex_coords {
            device.attach_vertex_buffer(vao, TEX_COORD_SLOT, tex_coords, VertexFormat::Float32x2);
        }
        device.attach_index_buffer(vao, indices);
        Ok((vao, mesh.index_count() as u32))
    }

    pub fn vertex_array(&self) -> VertexArrayId {
        self.vertex_array
    }

    /// Number of indices drawn, always `len(indices)` of the source mesh.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn has_tex_coords(&self) -> bool {
        self.has_tex_coords
    }

    /// Release the vertex array and every buffer.
    pub fn destroy<D: GraphicsDevice + ?Sized>(self, device: &mut D) {
        device.delete_vertex_array(self.vertex_array);
        for buffer in self.buffers {
            device.delete_buffer(buffer);
        }
    }
}
