use grid_viewer::{
    LoadError,
    data_structures::mesh::CellKind,
    resources::load_grid,
};

use crate::common::test_utils::{fixture, load_fixture};

mod common;

#[test]
fn should_load_unstructured_grid() {
    let mesh = load_fixture("cube.vtk");

    assert_eq!(mesh.points.len(), 8);
    assert_eq!(mesh.cells.len(), 1);
    assert_eq!(mesh.cells[0].kind, CellKind::Hexahedron);
    assert_eq!(mesh.cells[0].ids, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(mesh.points[6], [1.0, 1.0, 1.0]);
    assert!(mesh.point_scalars.is_none());

    let bounds = mesh.bounds().unwrap();
    assert_eq!(bounds.min, [0.0, 0.0, 0.0]);
    assert_eq!(bounds.max, [1.0, 1.0, 1.0]);
}

#[test]
fn should_load_point_scalars() {
    let mesh = load_fixture("tetra_scalars.vtk");

    assert_eq!(mesh.cells[0].kind, CellKind::Tetra);
    let scalars = mesh.point_scalars.as_ref().unwrap();
    assert_eq!(scalars.name, "temperature");
    assert_eq!(scalars.values, vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(scalars.range(), Some((0.0, 3.0)));
}

#[test]
fn should_load_poly_data() {
    let mesh = load_fixture("triangles.vtk");

    let kinds: Vec<CellKind> = mesh.cells.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![CellKind::Line, CellKind::Triangle, CellKind::Triangle]
    );
}

#[test]
fn should_load_same_mesh_twice() {
    let first = load_fixture("two_hexes.vtk");
    let second = load_fixture("two_hexes.vtk");

    assert_eq!(first, second);
}

#[test]
fn should_report_missing_file() {
    let err = load_grid(fixture("does_not_exist.vtk")).unwrap_err();

    assert!(matches!(err, LoadError::Io { .. }), "{err}");
    assert!(err.to_string().contains("does_not_exist.vtk"));
}

#[test]
fn should_reject_truncated_file() {
    let err = load_grid(fixture("truncated.vtk")).unwrap_err();

    assert!(matches!(err, LoadError::Parse(_)), "{err}");
}

#[test]
fn should_reject_grid_without_points() {
    let err = load_grid(fixture("empty.vtk")).unwrap_err();

    assert!(matches!(err, LoadError::Empty(_)), "{err}");
}

#[test]
fn should_reject_zero_byte_file() {
    let err = load_grid(fixture("zero_bytes.vtk")).unwrap_err();

    assert!(matches!(err, LoadError::Parse(_)), "{err}");
    assert!(err.to_string().starts_with("malformed grid file"));
}

#[test]
fn should_reject_other_datasets() {
    let err = load_grid(fixture("structured_points.vtk")).unwrap_err();

    assert!(matches!(err, LoadError::Unsupported(_)), "{err}");
    assert!(err.to_string().contains("STRUCTURED_POINTS"));
}

#[test]
fn should_reject_cells_pointing_past_the_points() {
    use grid_viewer::data_structures::mesh::{Cell, Mesh};

    let mesh = Mesh {
        points: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        cells: vec![Cell {
            kind: CellKind::Triangle,
            ids: vec![0, 1, 3],
        }],
        point_scalars: None,
    };

    let err = mesh.validate().unwrap_err();
    assert!(matches!(err, LoadError::InvalidCell { cell: 0, .. }), "{err}");
}

#[test]
fn should_reject_wrong_cell_size() {
    use grid_viewer::data_structures::mesh::{Cell, Mesh};

    let mesh = Mesh {
        points: vec![[0.0; 3]; 8],
        cells: vec![Cell {
            kind: CellKind::Hexahedron,
            ids: vec![0, 1, 2, 3],
        }],
        point_scalars: None,
    };

    assert!(matches!(
        mesh.validate(),
        Err(LoadError::InvalidCell { cell: 0, .. })
    ));
}

#[test]
fn should_load_ply_faces() {
    let mesh = load_fixture("pyramid.ply");

    assert_eq!(mesh.points.len(), 5);
    assert_eq!(mesh.points[4], [0.5, 0.5, 1.0]);
    let kinds: Vec<CellKind> = mesh.cells.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CellKind::Quad,
            CellKind::Triangle,
            CellKind::Triangle,
            CellKind::Triangle,
            CellKind::Triangle,
        ]
    );
    assert_eq!(mesh.cells[0].ids, vec![0, 3, 2, 1]);
    assert!(mesh.point_scalars.is_none());
}

#[test]
fn should_reject_ply_without_coordinates() {
    let err = load_grid(fixture("missing_coordinate.ply")).unwrap_err();

    assert!(matches!(err, LoadError::Parse(_)), "{err}");
    assert!(err.to_string().contains("`y`"));
}
