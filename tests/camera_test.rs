use approx::assert_relative_eq;
use cgmath::{Deg, Point3, Rad, Vector4};
use grid_viewer::{
    camera::{Camera, CameraController, Drag, Projection},
    data_structures::mesh::Bounds,
};
use winit::{dpi::PhysicalPosition, event::MouseButton};

fn unit_cube() -> Bounds {
    Bounds {
        min: [0.0, 0.0, 0.0],
        max: [1.0, 1.0, 1.0],
    }
}

fn corners(bounds: &Bounds) -> Vec<[f32; 3]> {
    let mut out = Vec::new();
    for &x in &[bounds.min[0], bounds.max[0]] {
        for &y in &[bounds.min[1], bounds.max[1]] {
            for &z in &[bounds.min[2], bounds.max[2]] {
                out.push([x, y, z]);
            }
        }
    }
    out
}

/// Every corner of `bounds` lies between the near and far planes.
fn assert_depth_inside(camera: &Camera, projection: &Projection, bounds: &Bounds) {
    let view_proj = projection.calc_matrix() * camera.calc_matrix();
    for [x, y, z] in corners(bounds) {
        let clip = view_proj * Vector4::new(x, y, z, 1.0);
        let depth = clip.z / clip.w;
        assert!(
            clip.w > 0.0 && (0.0..=1.0).contains(&depth),
            "{:?} is clipped at distance {} (znear {}, zfar {})",
            [x, y, z],
            camera.distance,
            projection.znear,
            projection.zfar
        );
    }
}

#[test]
fn should_frame_bounds_on_reset() {
    let bounds = unit_cube();
    let mut camera = Camera::default();
    let mut projection = Projection::new(800, 600, Deg(30.0), 0.1, 1000.0);

    camera.reset(&bounds, &mut projection);

    assert_eq!(camera.focal_point, Point3::new(0.5, 0.5, 0.5));
    assert!(projection.znear > 0.0);
    assert!(projection.znear < camera.distance - bounds.radius());
    assert!(projection.zfar > camera.distance + bounds.radius());

    let view_proj = projection.calc_matrix() * camera.calc_matrix();
    for [x, y, z] in corners(&bounds) {
        let clip = view_proj * Vector4::new(x, y, z, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() <= 1.0, "{:?} is cut off horizontally", [x, y, z]);
        assert!(ndc.y.abs() <= 1.0, "{:?} is cut off vertically", [x, y, z]);
        assert!((0.0..=1.0).contains(&ndc.z), "{:?} is clipped", [x, y, z]);
    }
}

#[test]
fn should_frame_flat_and_degenerate_bounds() {
    let mut camera = Camera::default();
    let mut projection = Projection::new(800, 600, Deg(30.0), 0.1, 1000.0);
    let point = Bounds {
        min: [2.0, 2.0, 2.0],
        max: [2.0, 2.0, 2.0],
    };

    camera.reset(&point, &mut projection);

    assert_eq!(camera.focal_point, Point3::new(2.0, 2.0, 2.0));
    assert!(camera.distance.is_finite() && camera.distance > 0.0);
    assert!(projection.znear < projection.zfar);
}

#[test]
fn should_clamp_elevation() {
    let mut camera = Camera::default();

    camera.rotate(Rad(0.0), Rad(10.0));
    assert!(camera.elevation.0 < std::f32::consts::FRAC_PI_2);
    assert!(camera.elevation.0 > 1.5);

    camera.rotate(Rad(0.0), Rad(-20.0));
    assert!(camera.elevation.0 > -std::f32::consts::FRAC_PI_2);
}

#[test]
fn should_zoom_by_factor() {
    let mut camera = Camera::default();

    camera.zoom(0.5);
    assert_relative_eq!(camera.distance, 2.5);

    camera.zoom(0.0);
    camera.zoom(-2.0);
    camera.zoom(f32::NAN);
    assert_relative_eq!(camera.distance, 2.5);

    camera.zoom(1e-12);
    assert!(camera.distance > 0.0);
}

#[test]
fn should_pan_in_view_plane() {
    let mut camera = Camera::default();

    camera.pan(0.1, 0.0);
    assert_relative_eq!(camera.focal_point.x, -0.5, epsilon = 1e-5);
    assert_relative_eq!(camera.focal_point.y, 0.0, epsilon = 1e-5);

    camera.pan(0.0, 0.1);
    assert_relative_eq!(camera.focal_point.y, 0.5, epsilon = 1e-5);
    assert_relative_eq!(camera.focal_point.z, 0.0, epsilon = 1e-5);
    assert_relative_eq!(camera.distance, 5.0);
}

#[test]
fn should_rotate_while_left_dragging() {
    let mut controller = CameraController::default();
    let mut camera = Camera::default();
    controller.set_viewport(100, 100);

    controller.press(MouseButton::Left);
    assert_eq!(controller.drag(), Drag::Rotate);
    controller.cursor_moved(PhysicalPosition::new(10.0, 10.0));
    controller.cursor_moved(PhysicalPosition::new(60.0, 10.0));
    controller.update(&mut camera);

    assert_relative_eq!(camera.azimuth.0, -std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
    assert_relative_eq!(camera.elevation.0, 0.0);

    // motion is consumed by the update
    controller.update(&mut camera);
    assert_relative_eq!(camera.azimuth.0, -std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
}

#[test]
fn should_ignore_motion_without_button() {
    let mut controller = CameraController::default();
    let mut camera = Camera::default();

    controller.cursor_moved(PhysicalPosition::new(0.0, 0.0));
    controller.cursor_moved(PhysicalPosition::new(300.0, 200.0));
    controller.update(&mut camera);

    assert_eq!(camera, Camera::default());
}

#[test]
fn should_select_drag_mode_per_button() {
    let mut controller = CameraController::default();

    controller.press(MouseButton::Middle);
    assert_eq!(controller.drag(), Drag::Pan);
    controller.release();
    assert_eq!(controller.drag(), Drag::None);

    controller.press(MouseButton::Right);
    assert_eq!(controller.drag(), Drag::Zoom);
}

#[test]
fn should_zoom_in_when_scrolling_away() {
    let mut controller = CameraController::default();
    let mut camera = Camera::default();

    controller.scroll(1.0);
    controller.update(&mut camera);

    assert_relative_eq!(camera.distance, 5.0 / 1.1, epsilon = 1e-5);
}

#[test]
fn should_keep_bounds_between_clip_planes_after_zooming() {
    let bounds = unit_cube();
    let mut projection = Projection::new(800, 600, Deg(30.0), 0.1, 1000.0);

    for notches in [-7.0f32, -1.0, 3.0, 6.0] {
        let mut camera = Camera::default();
        let mut controller = CameraController::default();
        camera.reset(&bounds, &mut projection);

        for _ in 0..notches.abs() as usize {
            controller.scroll(notches.signum());
        }
        controller.update(&mut camera);
        camera.reset_clipping_range(&bounds, &mut projection);

        assert_depth_inside(&camera, &projection, &bounds);
        assert!(projection.znear > 0.0 && projection.znear < projection.zfar);
    }
}

#[test]
fn should_keep_bounds_between_clip_planes_after_panning_and_rotating() {
    let bounds = unit_cube();
    let mut projection = Projection::new(800, 600, Deg(30.0), 0.1, 1000.0);
    let mut camera = Camera::default();
    camera.reset(&bounds, &mut projection);

    camera.pan(0.3, -0.2);
    camera.rotate(Rad(1.0), Rad(0.7));
    camera.zoom(3.0);
    camera.reset_clipping_range(&bounds, &mut projection);

    assert_depth_inside(&camera, &projection, &bounds);
}
