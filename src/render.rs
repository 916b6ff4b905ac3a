//! Actors and the scene that renders them.
//!
//! An [`Actor`] is mapped geometry uploaded to the GPU together with its
//! appearance ([`Property`]) and a model transform. The [`Scene`] owns the
//! actors, the camera and the background colour, and records the draw calls
//! for a frame.

use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::{
    camera::{Camera, Projection},
    config::Colour,
    data_structures::{geometry::GeometryBuffer, mesh::Bounds},
};

/// Visual style of an actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Property {
    pub colour: Colour,
    /// Colour by point scalars when the geometry carries them.
    pub scalar_visibility: bool,
}

impl Default for Property {
    fn default() -> Self {
        Self {
            colour: crate::config::DEFAULT_ACTOR_COLOUR,
            scalar_visibility: true,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ActorUniform {
    model: [[f32; 4]; 4],
    colour: [f32; 4],
    flags: [u32; 4],
}

impl ActorUniform {
    pub fn new(transform: Matrix4<f32>, property: &Property, has_scalars: bool) -> Self {
        let show_scalars = property.scalar_visibility && has_scalars;
        Self {
            model: transform.into(),
            colour: property.colour.to_array(),
            flags: [show_scalars as u32, 0, 0, 0],
        }
    }

    pub fn shows_scalars(&self) -> bool {
        self.flags[0] == 1
    }
}

/// Renderable entity: geometry on the GPU plus transform and appearance.
#[derive(Debug)]
pub struct Actor {
    pub property: Property,
    pub transform: Matrix4<f32>,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    has_scalars: bool,
    uniform: ActorUniform,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    bounds: Option<Bounds>,
}

impl Actor {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        geometry: &GeometryBuffer<'_>,
        property: Property,
    ) -> Self {
        let transform = Matrix4::identity();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Vertex Buffer"),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform = ActorUniform::new(transform, &property, geometry.has_scalars);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Actor Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("actor_bind_group"),
        });

        Self {
            property,
            transform,
            vertex_buffer,
            vertex_count: geometry.vertices.len() as u32,
            has_scalars: geometry.has_scalars,
            uniform,
            uniform_buffer,
            bind_group,
            bounds: geometry.bounds(),
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn shows_scalars(&self) -> bool {
        self.uniform.shows_scalars()
    }

    /// Upload `transform` and `property` after they were changed.
    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue) {
        self.uniform = ActorUniform::new(self.transform, &self.property, self.has_scalars);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

/// Renderer state for one window: actors, camera and background.
///
/// The background is fixed when the scene is created; there is no way to
/// change it afterwards.
#[derive(Debug)]
pub struct Scene {
    actors: Vec<Actor>,
    pub camera: Camera,
    background: wgpu::Color,
}

impl Scene {
    pub fn new(background: Colour) -> Self {
        Self {
            actors: Vec::new(),
            camera: Camera::default(),
            background: background.to_wgpu(),
        }
    }

    pub fn background(&self) -> wgpu::Color {
        self.background
    }

    pub fn add_actor(&mut self, actor: Actor) -> usize {
        self.actors.push(actor);
        self.actors.len() - 1
    }

    pub fn remove_actor(&mut self, index: usize) -> Option<Actor> {
        (index < self.actors.len()).then(|| self.actors.remove(index))
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Union of the bounds of every actor.
    pub fn bounds(&self) -> Option<Bounds> {
        self.actors
            .iter()
            .filter_map(Actor::bounds)
            .reduce(Bounds::union)
    }

    /// Frame all actors. Leaves the camera alone if there is nothing to frame.
    pub fn reset_camera(&mut self, projection: &mut Projection) -> bool {
        match self.bounds() {
            Some(bounds) => {
                self.camera.reset(&bounds, projection);
                true
            }
            None => false,
        }
    }

    /// Refit the near and far planes to the actors after the camera moved.
    pub fn reset_clipping_range(&self, projection: &mut Projection) {
        if let Some(bounds) = self.bounds() {
            self.camera.reset_clipping_range(&bounds, projection);
        }
    }

    /// Record draw calls for every actor into `render_pass`.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        pipeline: &wgpu::RenderPipeline,
        camera_bind_group: &wgpu::BindGroup,
    ) {
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        for actor in &self.actors {
            if actor.vertex_count == 0 {
                log::warn!("you attempted to render an actor without geometry");
                continue;
            }
            render_pass.set_bind_group(1, &actor.bind_group, &[]);
            render_pass.set_vertex_buffer(0, actor.vertex_buffer.slice(..));
            render_pass.draw(0..actor.vertex_count, 0..1);
        }
    }
}
