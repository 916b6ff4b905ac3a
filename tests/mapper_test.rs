use approx::assert_relative_eq;
use cgmath::{InnerSpace, Vector3};
use grid_viewer::{
    data_structures::{
        geometry::{GeometryBuffer, GridVertex},
        mesh::{Cell, CellKind, Mesh},
    },
    error::LoadError,
    resources::mapper::{Mapper, scalar_colour},
};

use crate::common::test_utils::load_fixture;

mod common;

fn triangles<'a>(geometry: &'a GeometryBuffer<'_>) -> impl Iterator<Item = &'a [GridVertex]> {
    geometry.vertices.chunks_exact(3)
}

/// Every triangle of a convex hull should face away from `center`.
fn assert_faces_outward(geometry: &GeometryBuffer<'_>, center: [f32; 3]) {
    let center = Vector3::from(center);
    for tri in triangles(geometry) {
        let centroid = (Vector3::from(tri[0].position)
            + Vector3::from(tri[1].position)
            + Vector3::from(tri[2].position))
            / 3.0;
        let normal = Vector3::from(tri[0].normal);
        assert_relative_eq!(normal.magnitude(), 1.0, epsilon = 1e-5);
        assert!(
            normal.dot(centroid - center) > 0.0,
            "triangle {:?} faces inward",
            tri
        );
    }
}

#[test]
fn should_map_cube_to_its_six_faces() {
    let mesh = load_fixture("cube.vtk");
    let geometry = Mapper::new(&mesh).unwrap().map();

    assert_eq!(geometry.triangles(), 12);
    assert_eq!(geometry.skipped, 0);
    assert!(!geometry.has_scalars);
    assert_faces_outward(&geometry, [0.5, 0.5, 0.5]);
    assert!(geometry.vertices.iter().all(|v| v.colour == [1.0; 3]));
}

#[test]
fn should_drop_shared_faces() {
    let mesh = load_fixture("two_hexes.vtk");
    let geometry = Mapper::new(&mesh).unwrap().map();

    // 2 x 6 faces minus the shared one counted from both sides
    assert_eq!(geometry.triangles(), 20);
    assert_faces_outward(&geometry, [1.0, 0.5, 0.5]);
    assert!(
        triangles(&geometry).all(|tri| !tri.iter().all(|v| v.position[0] == 1.0)),
        "the face at x = 1 is interior"
    );
}

#[test]
fn should_map_tetra_with_scalar_colours() {
    let mesh = load_fixture("tetra_scalars.vtk");
    let geometry = Mapper::new(&mesh).unwrap().map();

    assert_eq!(geometry.triangles(), 4);
    assert!(geometry.has_scalars);
    assert_faces_outward(&geometry, [0.25, 0.25, 0.25]);

    let colour_at = |position: [f32; 3]| {
        geometry
            .vertices
            .iter()
            .find(|v| v.position == position)
            .map(|v| v.colour)
            .unwrap()
    };
    assert_eq!(colour_at([0.0, 0.0, 0.0]), [0.0, 0.0, 1.0]);
    assert_eq!(colour_at([0.0, 0.0, 1.0]), [1.0, 0.0, 0.0]);
}

#[test]
fn should_skip_cells_without_area() {
    let mesh = load_fixture("triangles.vtk");
    let geometry = Mapper::new(&mesh).unwrap().map();

    assert_eq!(geometry.skipped, 1);
    assert_eq!(geometry.triangles(), 2);
    for v in &geometry.vertices {
        assert_relative_eq!(v.normal[2], 1.0, epsilon = 1e-6);
    }
}

#[test]
fn should_triangulate_strips_and_pixels_facing_the_same_way() {
    let points = vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
    ];
    for kind in [CellKind::TriangleStrip, CellKind::Pixel] {
        let mesh = Mesh {
            points: points.clone(),
            cells: vec![Cell {
                kind,
                ids: vec![0, 1, 2, 3],
            }],
            point_scalars: None,
        };
        let geometry = Mapper::new(&mesh).unwrap().map();

        assert_eq!(geometry.triangles(), 2, "{:?}", kind);
        for v in &geometry.vertices {
            assert_relative_eq!(v.normal[2], 1.0, epsilon = 1e-6);
        }
    }
}

#[test]
fn should_count_unknown_cells_as_skipped() {
    let mesh = Mesh {
        points: vec![[0.0; 3], [1.0, 0.0, 0.0]],
        cells: vec![
            Cell {
                kind: CellKind::Vertex,
                ids: vec![0],
            },
            Cell {
                kind: CellKind::from_code(42),
                ids: vec![0, 1],
            },
        ],
        point_scalars: None,
    };
    let geometry = Mapper::new(&mesh).unwrap().map();

    assert_eq!(geometry.skipped, 2);
    assert!(geometry.vertices.is_empty());
    assert_eq!(geometry.bounds(), mesh.bounds());
}

#[test]
fn should_ramp_from_blue_to_red() {
    assert_eq!(scalar_colour(0.0), [0.0, 0.0, 1.0]);
    assert_eq!(scalar_colour(1.0), [1.0, 0.0, 0.0]);

    let mid = scalar_colour(0.5);
    assert_relative_eq!(mid[0], 0.0, epsilon = 1e-6);
    assert_relative_eq!(mid[1], 1.0, epsilon = 1e-6);
    assert_relative_eq!(mid[2], 0.0, epsilon = 1e-6);

    assert_eq!(scalar_colour(-3.0), scalar_colour(0.0));
    assert_eq!(scalar_colour(7.0), scalar_colour(1.0));
}

#[test]
fn should_refuse_meshes_that_do_not_validate() {
    let out_of_range = Mesh {
        points: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        cells: vec![Cell {
            kind: CellKind::Triangle,
            ids: vec![0, 1, 7],
        }],
        point_scalars: None,
    };
    let short_pixel = Mesh {
        points: vec![[0.0; 3]; 4],
        cells: vec![Cell {
            kind: CellKind::Pixel,
            ids: vec![0, 1, 2],
        }],
        point_scalars: None,
    };

    for mesh in [&out_of_range, &short_pixel] {
        assert!(matches!(
            Mapper::new(mesh),
            Err(LoadError::InvalidCell { cell: 0, .. })
        ));
    }
}

#[test]
fn should_map_ply_pyramid() {
    let mesh = load_fixture("pyramid.ply");
    let geometry = Mapper::new(&mesh).unwrap().map();

    // quad base split in two plus four sides
    assert_eq!(geometry.triangles(), 6);
    assert_faces_outward(&geometry, [0.5, 0.5, 0.25]);
}
