use std::collections::HashMap;

use cgmath::{InnerSpace, Vector3};

use crate::{
    data_structures::{
        geometry::{GeometryBuffer, GridVertex},
        mesh::{Cell, CellKind, Mesh},
    },
    error::LoadError,
};

// Local point ids of each face, wound so the normal points out of the cell.
const TETRA_FACES: &[&[usize]] = &[&[0, 1, 3], &[1, 2, 3], &[2, 0, 3], &[0, 2, 1]];
const HEXAHEDRON_FACES: &[&[usize]] = &[
    &[0, 4, 7, 3],
    &[1, 2, 6, 5],
    &[0, 1, 5, 4],
    &[3, 7, 6, 2],
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
];
const VOXEL_FACES: &[&[usize]] = &[
    &[0, 4, 6, 2],
    &[1, 3, 7, 5],
    &[0, 1, 5, 4],
    &[2, 6, 7, 3],
    &[0, 2, 3, 1],
    &[4, 5, 7, 6],
];
const WEDGE_FACES: &[&[usize]] = &[
    &[0, 1, 2],
    &[3, 5, 4],
    &[0, 3, 4, 1],
    &[1, 4, 5, 2],
    &[2, 5, 3, 0],
];
const PYRAMID_FACES: &[&[usize]] = &[
    &[0, 3, 2, 1],
    &[0, 1, 4],
    &[1, 2, 4],
    &[2, 3, 4],
    &[3, 0, 4],
];

/**
 * Turns a [`Mesh`] into triangles the GPU can draw.
 *
 * Volume cells only contribute the faces that are not shared with another
 * cell, so a solid block of hexahedra renders as its hull. Surface cells are
 * triangulated as they are. Vertices and lines have no area and are skipped.
 */
pub struct Mapper<'m> {
    mesh: &'m Mesh,
}

impl<'m> Mapper<'m> {
    /// Fails if `mesh` does not pass [`Mesh::validate`], the mapper indexes
    /// points and cell corners without further checks.
    pub fn new(mesh: &'m Mesh) -> Result<Self, LoadError> {
        mesh.validate()?;
        Ok(Self { mesh })
    }

    pub fn map(&self) -> GeometryBuffer<'m> {
        let mut boundary = BoundaryFaces::default();
        let mut polygons: Vec<Vec<u32>> = Vec::new();
        let mut skipped = 0;

        for cell in &self.mesh.cells {
            match cell.kind {
                CellKind::Tetra => boundary.add_cell(cell, TETRA_FACES),
                CellKind::Hexahedron => boundary.add_cell(cell, HEXAHEDRON_FACES),
                CellKind::Voxel => boundary.add_cell(cell, VOXEL_FACES),
                CellKind::Wedge => boundary.add_cell(cell, WEDGE_FACES),
                CellKind::Pyramid => boundary.add_cell(cell, PYRAMID_FACES),
                CellKind::Triangle | CellKind::Quad | CellKind::Polygon => {
                    polygons.push(cell.ids.clone())
                }
                // pixels are ordered like a grid, not around the rim
                CellKind::Pixel => {
                    polygons.push(vec![cell.ids[0], cell.ids[1], cell.ids[3], cell.ids[2]])
                }
                CellKind::TriangleStrip => polygons.extend(strip_triangles(&cell.ids)),
                CellKind::Vertex
                | CellKind::PolyVertex
                | CellKind::Line
                | CellKind::PolyLine
                | CellKind::Other(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            log::warn!("{} cells without a surface were not mapped", skipped);
        }

        let colours = self.scalar_colours();
        let mut vertices = Vec::new();
        for face in boundary.into_faces().into_iter().chain(polygons) {
            self.push_polygon(&face, colours.as_deref(), &mut vertices);
        }

        GeometryBuffer {
            mesh: self.mesh,
            vertices,
            skipped,
            has_scalars: colours.is_some(),
        }
    }

    fn scalar_colours(&self) -> Option<Vec<[f32; 3]>> {
        let scalars = self.mesh.point_scalars.as_ref()?;
        let (lo, hi) = scalars.range()?;
        let span = hi - lo;
        Some(
            scalars
                .values
                .iter()
                .map(|&v| {
                    let t = if span > f32::EPSILON { (v - lo) / span } else { 0.0 };
                    scalar_colour(t)
                })
                .collect(),
        )
    }

    /// Fan triangulate a convex polygon and append its flat shaded corners.
    fn push_polygon(&self, ids: &[u32], colours: Option<&[[f32; 3]]>, out: &mut Vec<GridVertex>) {
        if ids.len() < 3 {
            return;
        }
        let normal = polygon_normal(&self.mesh.points, ids);
        for i in 1..ids.len() - 1 {
            for &id in &[ids[0], ids[i], ids[i + 1]] {
                out.push(GridVertex {
                    position: self.mesh.points[id as usize],
                    normal,
                    colour: colours.map_or([1.0; 3], |c| c[id as usize]),
                });
            }
        }
    }
}

/// Counts faces of volume cells by their point set and keeps the ones seen once.
#[derive(Default)]
struct BoundaryFaces {
    order: Vec<Vec<u32>>,
    seen: HashMap<Vec<u32>, (usize, u32)>,
}

impl BoundaryFaces {
    fn add_cell(&mut self, cell: &Cell, faces: &[&[usize]]) {
        for face in faces {
            let ids: Vec<u32> = face.iter().map(|&local| cell.ids[local]).collect();
            let mut key = ids.clone();
            key.sort_unstable();
            match self.seen.get_mut(&key) {
                Some((_, count)) => *count += 1,
                None => {
                    self.seen.insert(key, (self.order.len(), 1));
                    self.order.push(ids);
                }
            }
        }
    }

    fn into_faces(self) -> Vec<Vec<u32>> {
        let mut shared = vec![false; self.order.len()];
        for (index, count) in self.seen.into_values() {
            shared[index] = count > 1;
        }
        self.order
            .into_iter()
            .zip(shared)
            .filter_map(|(face, shared)| (!shared).then_some(face))
            .collect()
    }
}

fn strip_triangles(ids: &[u32]) -> Vec<Vec<u32>> {
    ids.windows(3)
        .enumerate()
        .map(|(i, w)| {
            // every other triangle of a strip is wound the other way round
            if i % 2 == 0 {
                vec![w[0], w[1], w[2]]
            } else {
                vec![w[1], w[0], w[2]]
            }
        })
        .collect()
}

/// Newell's method, robust for slightly non-planar quads.
fn polygon_normal(points: &[[f32; 3]], ids: &[u32]) -> [f32; 3] {
    let mut n = Vector3::new(0.0f32, 0.0, 0.0);
    for (i, &a) in ids.iter().enumerate() {
        let b = ids[(i + 1) % ids.len()];
        let p: Vector3<f32> = points[a as usize].into();
        let q: Vector3<f32> = points[b as usize].into();
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    if n.magnitude2() > f32::EPSILON * f32::EPSILON {
        n.normalize().into()
    } else {
        [0.0; 3]
    }
}

/// Blue to red hue ramp for a scalar normalized to `[0, 1]`.
pub fn scalar_colour(t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    let hue = (1.0 - t) * (2.0 / 3.0) * 6.0;
    let sector = hue.floor().min(5.0);
    let f = hue - sector;
    match sector as u8 {
        0 => [1.0, f, 0.0],
        1 => [1.0 - f, 1.0, 0.0],
        2 => [0.0, 1.0, f],
        3 => [0.0, 1.0 - f, 1.0],
        _ => [f, 0.0, 1.0],
    }
}
