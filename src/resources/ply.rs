//! Polygon files (`.ply`), the other format the viewer accepts.
//!
//! Vertices become points and every face becomes a triangle, quad or polygon
//! cell. Other elements (edges, materials, ...) are ignored.

use ply_rs::{
    parser::Parser,
    ply::{DefaultElement, Property},
};

use crate::{
    data_structures::mesh::{Cell, CellKind, Mesh},
    error::LoadError,
};

pub(crate) fn parse_ply(mut bytes: &[u8]) -> Result<Mesh, LoadError> {
    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut bytes)
        .map_err(|e| LoadError::Parse(e.to_string()))?;

    let mut points = Vec::new();
    if let Some(vertices) = ply.payload.get("vertex") {
        points.reserve(vertices.len());
        for (idx, vertex) in vertices.iter().enumerate() {
            points.push([
                coordinate(vertex, idx, "x")?,
                coordinate(vertex, idx, "y")?,
                coordinate(vertex, idx, "z")?,
            ]);
        }
    }

    let mut cells = Vec::new();
    if let Some(faces) = ply.payload.get("face") {
        cells.reserve(faces.len());
        for (idx, face) in faces.iter().enumerate() {
            let ids = face_indices(face, idx)?;
            let kind = match ids.len() {
                3 => CellKind::Triangle,
                4 => CellKind::Quad,
                _ => CellKind::Polygon,
            };
            cells.push(Cell { kind, ids });
        }
    }
    log::debug!("PLY with {} vertices and {} faces", points.len(), cells.len());

    Ok(Mesh {
        points,
        cells,
        point_scalars: None,
    })
}

fn coordinate(element: &DefaultElement, idx: usize, name: &str) -> Result<f32, LoadError> {
    match element.get(name) {
        Some(Property::Float(v)) => Ok(*v),
        Some(Property::Double(v)) => Ok(*v as f32),
        Some(Property::Int(v)) => Ok(*v as f32),
        Some(Property::UInt(v)) => Ok(*v as f32),
        Some(Property::Short(v)) => Ok(*v as f32),
        Some(Property::UShort(v)) => Ok(*v as f32),
        Some(Property::Char(v)) => Ok(*v as f32),
        Some(Property::UChar(v)) => Ok(*v as f32),
        _ => Err(LoadError::Parse(format!(
            "vertex {} has no numeric `{}` property",
            idx, name
        ))),
    }
}

fn face_indices(element: &DefaultElement, idx: usize) -> Result<Vec<u32>, LoadError> {
    let negative = || LoadError::Parse(format!("face {} has a negative vertex index", idx));
    let signed = |ids: Vec<i64>| -> Result<Vec<u32>, LoadError> {
        ids.into_iter()
            .map(|id| u32::try_from(id).map_err(|_| negative()))
            .collect()
    };
    match element
        .get("vertex_indices")
        .or_else(|| element.get("vertex_index"))
    {
        Some(Property::ListInt(ids)) => signed(ids.iter().map(|&id| id as i64).collect()),
        Some(Property::ListShort(ids)) => signed(ids.iter().map(|&id| id as i64).collect()),
        Some(Property::ListChar(ids)) => signed(ids.iter().map(|&id| id as i64).collect()),
        Some(Property::ListUInt(ids)) => Ok(ids.clone()),
        Some(Property::ListUShort(ids)) => Ok(ids.iter().map(|&id| id as u32).collect()),
        Some(Property::ListUChar(ids)) => Ok(ids.iter().map(|&id| id as u32).collect()),
        _ => Err(LoadError::Parse(format!(
            "face {} has no integer vertex index list",
            idx
        ))),
    }
}
