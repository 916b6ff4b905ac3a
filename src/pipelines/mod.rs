//! Render pipelines.

pub mod grid;

/// Pipelines the context keeps alive for the whole session.
#[derive(Debug)]
pub struct Pipelines {
    pub surface: wgpu::RenderPipeline,
    /// Only present when the adapter can rasterize polygons as lines.
    pub wireframe: Option<wgpu::RenderPipeline>,
}
