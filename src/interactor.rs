//! Interactor: the winit event loop driving the render window.
//!
//! Mouse input goes to the [`CameraController`]. Keys:
//!
//! * `r` frames the scene again
//! * `w` / `s` switch between wireframe and surface rendering
//! * `q`, `e` and `Escape` close the window

use std::{iter, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::{
    camera::CameraController,
    config::ViewerConfig,
    context::Context,
    data_structures::geometry::GeometryBuffer,
    render::{Actor, Property, Scene},
    session::{Outcome, Session, Transition, ViewerState},
};

#[cfg(feature = "integration-tests")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTestResult {
    Passed,
    Waiting,
    Failed,
}

/// Inspects a rendered frame. Returning [`ImageTestResult::Waiting`] asks for
/// another frame.
#[cfg(feature = "integration-tests")]
pub type FrameCheck = Box<dyn FnMut(&image::RgbaImage) -> ImageTestResult>;

/// Build the event loop. Tests run off the main thread, so with the
/// `integration-tests` feature the loop may be created on any thread.
pub fn build_event_loop() -> anyhow::Result<EventLoop<()>> {
    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::builder().with_any_thread(true).build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::builder().with_any_thread(true).build()?
    };

    #[cfg(not(all(
        feature = "integration-tests",
        any(target_os = "linux", target_os = "windows")
    )))]
    let event_loop = EventLoop::new()?;

    Ok(event_loop)
}

/// Everything that exists once the window is open.
struct View {
    ctx: Context,
    scene: Scene,
    wireframe: bool,
}

impl View {
    fn pipeline(&self) -> &wgpu::RenderPipeline {
        match (&self.ctx.pipelines.wireframe, self.wireframe) {
            (Some(wireframe), true) => wireframe,
            _ => &self.ctx.pipelines.surface,
        }
    }

    fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        depth: &wgpu::TextureView,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.scene.background()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_viewport(
            0.0,
            0.0,
            self.ctx.config.width as f32,
            self.ctx.config.height as f32,
            0.0,
            1.0,
        );
        self.scene
            .draw(&mut render_pass, self.pipeline(), &self.ctx.camera.bind_group);
    }

    fn render(&self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.encode(&mut encoder, &view, &self.ctx.depth_texture.view);
        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Render one frame offscreen and read it back.
    #[cfg(feature = "integration-tests")]
    fn capture(&self) -> anyhow::Result<image::RgbaImage> {
        use anyhow::anyhow;

        use crate::data_structures::texture::Texture;

        let (width, height) = (self.ctx.config.width, self.ctx.config.height);
        // Rows copied out of a texture must be 256 byte aligned.
        let padded_width = width.div_ceil(64) * 64;
        let bytes_per_row = padded_width * 4;
        let extent = wgpu::Extent3d {
            width: padded_width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Capture Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.ctx.config.format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth =
            Texture::create_depth_texture(&self.ctx.device, [padded_width, height], "capture_depth");
        let buffer = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Buffer"),
            size: (bytes_per_row * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Encoder"),
            });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.encode(&mut encoder, &view, &depth.view);
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            extent,
        );
        self.ctx.queue.submit(iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.ctx.device.poll(wgpu::PollType::Wait)?;
        futures::executor::block_on(rx.receive())
            .ok_or_else(|| anyhow!("capture buffer was dropped before it was mapped"))??;

        let bgra = matches!(
            self.ctx.config.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        );
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(bytes_per_row as usize) {
                for px in row[..(width * 4) as usize].chunks_exact(4) {
                    if bgra {
                        pixels.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
                    } else {
                        pixels.extend_from_slice(px);
                    }
                }
            }
        }
        buffer.unmap();

        image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| anyhow!("captured frame does not match {width}x{height}"))
    }
}

/// Owns the window for the duration of a session and reacts to its events.
pub struct Interactor<'m> {
    config: ViewerConfig,
    geometry: GeometryBuffer<'m>,
    session: Session,
    view: Option<View>,
    controller: CameraController,
    failure: Option<anyhow::Error>,
    #[cfg(feature = "integration-tests")]
    check: Option<FrameCheck>,
}

impl<'m> Interactor<'m> {
    pub fn new(config: ViewerConfig, geometry: GeometryBuffer<'m>, session: Session) -> Self {
        Self {
            config,
            geometry,
            session,
            view: None,
            controller: CameraController::default(),
            failure: None,
            #[cfg(feature = "integration-tests")]
            check: None,
        }
    }

    #[cfg(feature = "integration-tests")]
    pub fn with_frame_check(mut self, check: FrameCheck) -> Self {
        self.check = Some(check);
        self
    }

    /// Consume the interactor once the event loop has returned.
    pub fn finish(self) -> anyhow::Result<Outcome> {
        if let Some(e) = self.failure {
            return Err(e);
        }
        Ok(Outcome {
            state: self.session.state(),
        })
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<View> {
        let attributes = Window::default_attributes().with_title(self.config.title.clone());
        let window = Arc::new(event_loop.create_window(attributes)?);
        let mut ctx = futures::executor::block_on(Context::new(window))?;
        self.controller
            .set_viewport(ctx.config.width, ctx.config.height);

        let property = Property {
            colour: self.config.actor_colour,
            scalar_visibility: true,
        };
        let actor = Actor::new(
            &ctx.device,
            &ctx.actor_bind_group_layout,
            &self.geometry,
            property,
        );
        let mut scene = Scene::new(self.config.background);
        scene.add_actor(actor);
        if !scene.reset_camera(&mut ctx.projection) {
            log::warn!("Nothing to frame, keeping the default camera");
        }
        ctx.write_camera(&scene.camera);

        Ok(View {
            ctx,
            scene,
            wireframe: false,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.failure = Some(error);
        event_loop.exit();
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.state() == ViewerState::Rendering {
            if let Err(e) = self.session.advance(Transition::Close) {
                log::warn!("{}", e);
            }
        }
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: &Key) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        match key.as_ref() {
            Key::Named(NamedKey::Escape) => self.close(event_loop),
            Key::Character(c) => match c.to_lowercase().as_str() {
                "q" | "e" => self.close(event_loop),
                "r" => {
                    view.scene.reset_camera(&mut view.ctx.projection);
                    view.ctx.write_camera(&view.scene.camera);
                    view.ctx.window.request_redraw();
                }
                "w" => {
                    if view.ctx.pipelines.wireframe.is_some() {
                        view.wireframe = true;
                        view.ctx.window.request_redraw();
                    } else {
                        log::warn!("Wireframe rendering is not supported by this adapter");
                    }
                }
                "s" => {
                    view.wireframe = false;
                    view.ctx.window.request_redraw();
                }
                _ => (),
            },
            _ => (),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        self.controller.update(&mut view.scene.camera);
        view.scene.reset_clipping_range(&mut view.ctx.projection);
        view.ctx.write_camera(&view.scene.camera);

        match view.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = view.ctx.window.inner_size();
                view.ctx.resize(size.width, size.height);
                view.ctx.window.request_redraw();
            }
            Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timeout"),
            Err(e) => {
                let e = anyhow::Error::from(e).context("cannot render the frame");
                self.fail(event_loop, e);
                return;
            }
        }

        #[cfg(feature = "integration-tests")]
        self.run_check(event_loop);
    }

    #[cfg(feature = "integration-tests")]
    fn run_check(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(view), Some(check)) = (self.view.as_ref(), self.check.as_mut()) else {
            return;
        };
        let verdict = view.capture().map(|img| check(&img));
        match verdict {
            Ok(ImageTestResult::Passed) => self.close(event_loop),
            Ok(ImageTestResult::Waiting) => view.ctx.window.request_redraw(),
            Ok(ImageTestResult::Failed) => {
                self.fail(event_loop, anyhow::anyhow!("rendered frame failed the check"))
            }
            Err(e) => self.fail(event_loop, e),
        }
    }
}

impl ApplicationHandler for Interactor<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.view.is_some() {
            return;
        }
        match self.open(event_loop) {
            Ok(view) => {
                view.ctx.window.request_redraw();
                self.view = Some(view);
                if let Err(e) = self.session.advance(Transition::Show) {
                    self.fail(event_loop, e.into());
                }
            }
            Err(e) => self.fail(event_loop, e.context("cannot open the render window")),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        if self.controller.handle_window_events(&event) {
            view.ctx.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => self.close(event_loop),
            WindowEvent::Resized(size) => {
                if view.ctx.resize(size.width, size.height) {
                    view.ctx.write_camera(&view.scene.camera);
                    view.ctx.window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, &logical_key),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
