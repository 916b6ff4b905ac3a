//! Viewer data structures: the parsed grid, its renderable form and GPU textures.
//!
//! - `mesh` contains the in-memory grid (points, cells, point scalars, bounds)
//! - `geometry` contains the triangle soup the mapper derives from a mesh
//! - `texture` contains the depth texture wrapper

pub mod geometry;
pub mod mesh;
pub mod texture;
