//! grid-viewer
//!
//! Loads a legacy VTK grid file and shows its outer surface in an interactive
//! window. The crate is laid out as the stages of a small visualization
//! pipeline, wired together by [`session::run`].
//!
//! High-level modules
//! - `config`: command line arguments and the resolved viewer configuration
//! - `error`: load and state errors
//! - `data_structures`: the in-memory mesh, mapped vertices and depth textures
//! - `resources`: the grid loader and the mapper that extracts the boundary surface
//! - `render`: actors and the scene they are drawn in
//! - `camera`: orbit camera, projection and mouse controller
//! - `context`: render window and the GPU objects behind it
//! - `pipelines`: the surface and wireframe render pipelines
//! - `interactor`: event loop, keyboard and mouse handling
//! - `session`: the viewer life cycle
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod interactor;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod session;

pub use config::ViewerConfig;
pub use error::LoadError;
pub use session::run;
