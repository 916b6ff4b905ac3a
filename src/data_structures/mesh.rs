//! In-memory unstructured grid.
//!
//! A [`Mesh`] is what the loader hands to the rest of the pipeline: a flat list
//! of points and the cells that index into them, plus an optional scalar field
//! attached to the points. It is never mutated after loading.

use crate::error::LoadError;

/// Cell topology, numbered like the legacy file format's `CELL_TYPES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Vertex,
    PolyVertex,
    Line,
    PolyLine,
    Triangle,
    TriangleStrip,
    Polygon,
    Pixel,
    Quad,
    Tetra,
    Voxel,
    Hexahedron,
    Wedge,
    Pyramid,
    Other(u8),
}

impl CellKind {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => CellKind::Vertex,
            2 => CellKind::PolyVertex,
            3 => CellKind::Line,
            4 => CellKind::PolyLine,
            5 => CellKind::Triangle,
            6 => CellKind::TriangleStrip,
            7 => CellKind::Polygon,
            8 => CellKind::Pixel,
            9 => CellKind::Quad,
            10 => CellKind::Tetra,
            11 => CellKind::Voxel,
            12 => CellKind::Hexahedron,
            13 => CellKind::Wedge,
            14 => CellKind::Pyramid,
            other => CellKind::Other(other),
        }
    }

    /// Number of points the cell must have, `None` for variable sized cells.
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            CellKind::Vertex => Some(1),
            CellKind::Line => Some(2),
            CellKind::Triangle => Some(3),
            CellKind::Pixel | CellKind::Quad | CellKind::Tetra => Some(4),
            CellKind::Pyramid => Some(5),
            CellKind::Wedge => Some(6),
            CellKind::Voxel | CellKind::Hexahedron => Some(8),
            CellKind::PolyVertex
            | CellKind::PolyLine
            | CellKind::TriangleStrip
            | CellKind::Polygon
            | CellKind::Other(_) => None,
        }
    }

    /// Topological dimension: 0 for vertices, 1 for lines, 2 for surfaces, 3 for volumes.
    pub fn dimension(self) -> Option<u8> {
        match self {
            CellKind::Vertex | CellKind::PolyVertex => Some(0),
            CellKind::Line | CellKind::PolyLine => Some(1),
            CellKind::Triangle
            | CellKind::TriangleStrip
            | CellKind::Polygon
            | CellKind::Pixel
            | CellKind::Quad => Some(2),
            CellKind::Tetra
            | CellKind::Voxel
            | CellKind::Hexahedron
            | CellKind::Wedge
            | CellKind::Pyramid => Some(3),
            CellKind::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub kind: CellKind,
    pub ids: Vec<u32>,
}

/// A named scalar value per point.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    pub name: String,
    pub values: Vec<f32>,
}

impl ScalarField {
    /// Smallest and largest finite value, `None` if there is none.
    pub fn range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Bounds { min: *p, max: *p },
                Some(b) => b.expand(p),
            })
        })
    }

    fn expand(self, p: &[f32; 3]) -> Self {
        let mut out = self;
        for axis in 0..3 {
            out.min[axis] = out.min[axis].min(p[axis]);
            out.max[axis] = out.max[axis].max(p[axis]);
        }
        out
    }

    pub fn union(self, other: Bounds) -> Self {
        self.expand(&other.min).expand(&other.max)
    }

    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    /// Radius of the sphere through the box corners.
    pub fn radius(&self) -> f32 {
        let d: f32 = (0..3)
            .map(|axis| (self.max[axis] - self.min[axis]).powi(2))
            .sum();
        d.sqrt() * 0.5
    }
}

/// Parsed grid: points, cells and optional point scalars.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub points: Vec<[f32; 3]>,
    pub cells: Vec<Cell>,
    pub point_scalars: Option<ScalarField>,
}

impl Mesh {
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }

    /// Checks that every cell references existing points and that fixed size
    /// cells have the right number of them.
    pub fn validate(&self) -> Result<(), LoadError> {
        let n = self.points.len();
        for (idx, cell) in self.cells.iter().enumerate() {
            if let Some(expected) = cell.kind.fixed_len() {
                if cell.ids.len() != expected {
                    return Err(LoadError::InvalidCell {
                        cell: idx,
                        reason: format!(
                            "{:?} needs {} points but has {}",
                            cell.kind,
                            expected,
                            cell.ids.len()
                        ),
                    });
                }
            }
            if let Some(&bad) = cell.ids.iter().find(|&&id| id as usize >= n) {
                return Err(LoadError::InvalidCell {
                    cell: idx,
                    reason: format!("point id {} is out of range ({} points)", bad, n),
                });
            }
        }
        if let Some(scalars) = &self.point_scalars {
            if scalars.values.len() != n {
                return Err(LoadError::Parse(format!(
                    "scalar field `{}` has {} values for {} points",
                    scalars.name,
                    scalars.values.len(),
                    n
                )));
            }
        }
        Ok(())
    }
}
