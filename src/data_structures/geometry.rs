//! Renderable form of a mesh.

use crate::data_structures::mesh::{Bounds, Mesh};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// One corner of a flat shaded triangle.
///
/// `colour` is the scalar colour of the point; it is ignored by the shader
/// when the actor does not show scalars.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub colour: [f32; 3],
}

impl Vertex for GridVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GridVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Triangle soup derived from a [`Mesh`] by the mapper.
///
/// Keeps a borrow of the mesh it was made from, so it cannot outlive it.
#[derive(Debug, Clone)]
pub struct GeometryBuffer<'m> {
    pub(crate) mesh: &'m Mesh,
    pub vertices: Vec<GridVertex>,
    /// Cells that have no surface representation (vertices, lines, unknown kinds).
    pub skipped: usize,
    pub has_scalars: bool,
}

impl<'m> GeometryBuffer<'m> {
    pub fn mesh(&self) -> &'m Mesh {
        self.mesh
    }

    pub fn triangles(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.mesh.bounds()
    }
}
