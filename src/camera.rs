//! Orbit camera, projection and the mouse controller that drives them.
//!
//! The camera circles a focal point: azimuth turns it around the vertical
//! axis, elevation tilts it up and down and distance moves it closer or
//! farther. [`Camera::reset`] frames a bounding box the way a freshly loaded
//! scene is framed.

use std::f32::consts::FRAC_PI_2;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::ModifiersState,
};

use crate::data_structures::mesh::Bounds;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const SAFE_ELEVATION: f32 = FRAC_PI_2 - 0.001;
const MIN_DISTANCE: f32 = 1e-4;
const CLIP_PAD: f32 = 0.01;
// keeps the depth buffer usable when the eye is inside the bounds
const MIN_NEAR_RATIO: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub focal_point: Point3<f32>,
    pub distance: f32,
    pub azimuth: Rad<f32>,
    pub elevation: Rad<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            focal_point: Point3::new(0.0, 0.0, 0.0),
            distance: 5.0,
            azimuth: Rad(0.0),
            elevation: Rad(0.0),
        }
    }
}

impl Camera {
    /// Direction from the focal point to the eye.
    fn direction(&self) -> Vector3<f32> {
        let (sin_az, cos_az) = self.azimuth.0.sin_cos();
        let (sin_el, cos_el) = self.elevation.0.sin_cos();
        Vector3::new(cos_el * sin_az, sin_el, cos_el * cos_az)
    }

    pub fn eye(&self) -> Point3<f32> {
        self.focal_point + self.direction() * self.distance
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye(), self.focal_point, Vector3::unit_y())
    }

    /// Camera right and up vectors in world space.
    fn basis(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = -self.direction();
        let right = forward.cross(Vector3::unit_y()).normalize();
        let up = right.cross(forward).normalize();
        (right, up)
    }

    pub fn rotate(&mut self, d_azimuth: Rad<f32>, d_elevation: Rad<f32>) {
        self.azimuth += d_azimuth;
        self.elevation = Rad((self.elevation + d_elevation)
            .0
            .clamp(-SAFE_ELEVATION, SAFE_ELEVATION));
    }

    /// Move the focal point in the view plane; `dx`/`dy` are fractions of the distance.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let (right, up) = self.basis();
        self.focal_point += (right * -dx + up * dy) * self.distance;
    }

    /// Scale the distance to the focal point; factors below one move closer.
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).max(MIN_DISTANCE);
        }
    }

    /// Look at the centre of `bounds` from far enough away that the whole box
    /// fits the vertical field of view, and adapt the clipping range to it.
    pub fn reset(&mut self, bounds: &Bounds, projection: &mut Projection) {
        let center = bounds.center();
        self.focal_point = Point3::new(center[0], center[1], center[2]);
        self.distance = framing_radius(bounds) / (projection.fovy.0 * 0.5).sin();
        self.reset_clipping_range(bounds, projection);
    }

    /// Fit the near and far planes tightly around `bounds` as seen from the
    /// current eye. Has to follow every zoom and pan, otherwise the grid ends
    /// up behind the far plane or cut by the near one.
    pub fn reset_clipping_range(&self, bounds: &Bounds, projection: &mut Projection) {
        let radius = framing_radius(bounds);
        let center: Vector3<f32> = bounds.center().into();
        let eye = self.eye();
        let depth = (center - Vector3::new(eye.x, eye.y, eye.z)).dot(-self.direction());
        let pad = radius * CLIP_PAD;
        let zfar = (depth + radius + pad).max(radius * CLIP_PAD);
        projection.zfar = zfar;
        projection.znear = (depth - radius - pad).max(zfar * MIN_NEAR_RATIO);
    }
}

/// Radius used to frame `bounds`; a single point still gets some room.
fn framing_radius(bounds: &Bounds) -> f32 {
    if bounds.radius() > 0.0 {
        bounds.radius()
    } else {
        0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.eye().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera: uniform buffer and its bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drag {
    None,
    Rotate,
    Pan,
    Zoom,
}

/// Turns mouse input into camera motion.
///
/// Left drag rotates, middle drag (or shift + left drag) pans, right drag and
/// the wheel zoom. Motion is accumulated between frames and applied in
/// [`update`](Self::update).
#[derive(Debug)]
pub struct CameraController {
    rotate_speed: f32,
    zoom_speed: f32,
    drag: Drag,
    modifiers: ModifiersState,
    last_cursor: Option<PhysicalPosition<f64>>,
    viewport: (f32, f32),
    rotate: (f32, f32),
    pan: (f32, f32),
    zoom: f32,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            drag: Drag::None,
            modifiers: ModifiersState::empty(),
            last_cursor: None,
            viewport: (1.0, 1.0),
            rotate: (0.0, 0.0),
            pan: (0.0, 0.0),
            zoom: 0.0,
        }
    }

    pub fn drag(&self) -> Drag {
        self.drag
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1) as f32, height.max(1) as f32);
    }

    pub fn press(&mut self, button: MouseButton) {
        self.drag = match button {
            MouseButton::Left if self.modifiers.shift_key() => Drag::Pan,
            MouseButton::Left => Drag::Rotate,
            MouseButton::Middle => Drag::Pan,
            MouseButton::Right => Drag::Zoom,
            _ => self.drag,
        };
    }

    pub fn release(&mut self) {
        self.drag = Drag::None;
    }

    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        if let Some(last) = self.last_cursor {
            let dx = (position.x - last.x) as f32 / self.viewport.0;
            let dy = (position.y - last.y) as f32 / self.viewport.1;
            match self.drag {
                Drag::Rotate => {
                    self.rotate.0 += dx;
                    self.rotate.1 += dy;
                }
                Drag::Pan => {
                    self.pan.0 += dx;
                    self.pan.1 += dy;
                }
                Drag::Zoom => self.zoom += dy * 10.0,
                Drag::None => (),
            }
        }
        self.last_cursor = Some(position);
    }

    /// Wheel notches, positive away from the user.
    pub fn scroll(&mut self, lines: f32) {
        self.zoom -= lines;
    }

    /// Returns `true` if the event was consumed.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                match state {
                    ElementState::Pressed => self.press(*button),
                    ElementState::Released => self.release(),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(*position);
                self.drag != Drag::None
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll(match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                });
                true
            }
            WindowEvent::Resized(size) => {
                self.set_viewport(size.width, size.height);
                false
            }
            _ => false,
        }
    }

    /// Apply the motion gathered since the last call.
    pub fn update(&mut self, camera: &mut Camera) {
        let (rx, ry) = std::mem::take(&mut self.rotate);
        if rx != 0.0 || ry != 0.0 {
            camera.rotate(Rad(-rx * self.rotate_speed), Rad(ry * self.rotate_speed));
        }
        let (px, py) = std::mem::take(&mut self.pan);
        if px != 0.0 || py != 0.0 {
            camera.pan(px, py);
        }
        let zoom = std::mem::take(&mut self.zoom);
        if zoom != 0.0 {
            camera.zoom((1.0 + self.zoom_speed).powf(zoom));
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(std::f32::consts::PI, 0.1)
    }
}
