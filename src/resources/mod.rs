//! Loading grids from legacy VTK and PLY files.
//!
//! Parsing is delegated to `vtkio` and `ply-rs`; this module only turns their
//! data models into a [`Mesh`] and rejects what the viewer cannot show. Legacy
//! VTK files may hold `UNSTRUCTURED_GRID` or `POLYDATA` datasets. Files ending
//! in `.ply` are read as polygon files.

use std::path::Path;

use vtkio::model::{
    Attribute, Attributes, DataSet, ElementType, IOBuffer, Piece, PolyDataPiece,
    UnstructuredGridPiece, VertexNumbers, Vtk,
};

use crate::{
    data_structures::mesh::{Cell, CellKind, Mesh, ScalarField},
    error::LoadError,
};

pub mod mapper;
mod ply;

/// Read and parse the grid at `path`.
///
/// Loading has no hidden state: calling this twice with the same file gives
/// two equal meshes.
pub fn load_grid(path: impl AsRef<Path>) -> Result<Mesh, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_ply = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ply"));
    let mesh = if is_ply {
        ply::parse_ply(&bytes)?
    } else {
        parse_vtk(&bytes, path)?
    };

    if mesh.points.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    mesh.validate()?;
    log::info!(
        "{} points, {} cells{}",
        mesh.points.len(),
        mesh.cells.len(),
        mesh.point_scalars
            .as_ref()
            .map(|s| format!(", point scalars `{}`", s.name))
            .unwrap_or_default()
    );
    Ok(mesh)
}

fn parse_vtk(bytes: &[u8], path: &Path) -> Result<Mesh, LoadError> {
    let vtk = Vtk::parse_legacy_be(bytes).map_err(|e| LoadError::Parse(e.to_string()))?;
    log::info!("Parsed {:?} (\"{}\")", path, vtk.title);

    match vtk.data {
        DataSet::UnstructuredGrid { pieces, .. } => from_unstructured(*single_piece(pieces)?),
        DataSet::PolyData { pieces, .. } => from_poly_data(*single_piece(pieces)?),
        DataSet::ImageData { .. } => Err(unsupported("STRUCTURED_POINTS")),
        DataSet::StructuredGrid { .. } => Err(unsupported("STRUCTURED_GRID")),
        DataSet::RectilinearGrid { .. } => Err(unsupported("RECTILINEAR_GRID")),
        DataSet::Field { name, .. } => Err(unsupported(&format!("FIELD {}", name))),
    }
}

fn unsupported(kind: &str) -> LoadError {
    LoadError::Unsupported(format!(
        "{} (expected UNSTRUCTURED_GRID or POLYDATA)",
        kind
    ))
}

fn single_piece<P>(pieces: Vec<Piece<P>>) -> Result<Box<P>, LoadError> {
    let count = pieces.len();
    let mut inline = pieces.into_iter().filter_map(|piece| match piece {
        Piece::Inline(p) => Some(p),
        _ => None,
    });
    match (inline.next(), count) {
        (Some(piece), 1) => Ok(piece),
        (None, _) => Err(LoadError::Unsupported(
            "dataset has no inline piece".to_string(),
        )),
        (Some(_), n) => Err(LoadError::Unsupported(format!(
            "dataset has {} pieces, only single piece files are supported",
            n
        ))),
    }
}

fn points_from(buffer: IOBuffer) -> Result<Vec<[f32; 3]>, LoadError> {
    let flat: Vec<f32> = buffer
        .cast_into::<f32>()
        .ok_or_else(|| LoadError::Parse("point coordinates are not numeric".to_string()))?;
    if flat.len() % 3 != 0 {
        return Err(LoadError::Parse(format!(
            "{} coordinates do not form 3D points",
            flat.len()
        )));
    }
    Ok(flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

/// Split a connectivity list into per-cell id lists.
fn split_cells(numbers: VertexNumbers) -> Result<Vec<Vec<u32>>, LoadError> {
    match numbers {
        VertexNumbers::Legacy { num_cells, vertices } => {
            let mut out = Vec::with_capacity(num_cells as usize);
            let mut rest = vertices.as_slice();
            while let Some((&n, tail)) = rest.split_first() {
                let n = n as usize;
                if tail.len() < n {
                    return Err(LoadError::Parse(format!(
                        "cell {} lists {} points but only {} ids remain",
                        out.len(),
                        n,
                        tail.len()
                    )));
                }
                out.push(tail[..n].to_vec());
                rest = &tail[n..];
            }
            if out.len() != num_cells as usize {
                return Err(LoadError::Parse(format!(
                    "expected {} cells, found {}",
                    num_cells,
                    out.len()
                )));
            }
            Ok(out)
        }
        VertexNumbers::XML {
            connectivity,
            offsets,
        } => {
            let mut begin = 0usize;
            let mut out = Vec::with_capacity(offsets.len());
            for end in offsets {
                let end = end as usize;
                if end < begin || end > connectivity.len() {
                    return Err(LoadError::Parse(format!("bad cell offset {}", end)));
                }
                out.push(connectivity[begin..end].iter().map(|&id| id as u32).collect());
                begin = end;
            }
            Ok(out)
        }
    }
}

fn from_unstructured(piece: UnstructuredGridPiece) -> Result<Mesh, LoadError> {
    let points = points_from(piece.points)?;
    let ids = split_cells(piece.cells.cell_verts)?;
    let types = piece.cells.types;
    if ids.len() != types.len() {
        return Err(LoadError::Parse(format!(
            "{} cells but {} cell types",
            ids.len(),
            types.len()
        )));
    }
    let cells = ids
        .into_iter()
        .zip(types)
        .map(|(ids, ty)| Cell {
            kind: CellKind::from_code(ty as u8),
            ids,
        })
        .collect();
    Ok(Mesh {
        points,
        cells,
        point_scalars: point_scalars(piece.data),
    })
}

fn from_poly_data(piece: PolyDataPiece) -> Result<Mesh, LoadError> {
    let points = points_from(piece.points)?;
    let mut cells = Vec::new();

    let sections: [(Option<VertexNumbers>, fn(usize) -> CellKind); 4] = [
        (piece.verts, |n| match n {
            1 => CellKind::Vertex,
            _ => CellKind::PolyVertex,
        }),
        (piece.lines, |n| match n {
            2 => CellKind::Line,
            _ => CellKind::PolyLine,
        }),
        (piece.polys, |n| match n {
            3 => CellKind::Triangle,
            4 => CellKind::Quad,
            _ => CellKind::Polygon,
        }),
        (piece.strips, |_| CellKind::TriangleStrip),
    ];
    for (numbers, kind_of) in sections {
        if let Some(numbers) = numbers {
            for ids in split_cells(numbers)? {
                cells.push(Cell {
                    kind: kind_of(ids.len()),
                    ids,
                });
            }
        }
    }

    Ok(Mesh {
        points,
        cells,
        point_scalars: point_scalars(piece.data),
    })
}

/// First one-component scalar array attached to the points.
fn point_scalars(data: Attributes) -> Option<ScalarField> {
    data.point.into_iter().find_map(|attribute| match attribute {
        Attribute::DataArray(array) => match array.elem {
            ElementType::Scalars { num_comp: 1, .. } => {
                let values = array.data.cast_into::<f32>()?;
                Some(ScalarField {
                    name: array.name,
                    values,
                })
            }
            _ => None,
        },
        Attribute::Field { .. } => None,
    })
}
