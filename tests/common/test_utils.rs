#![allow(dead_code)]

use std::path::PathBuf;

use grid_viewer::{data_structures::mesh::Mesh, resources::load_grid};

pub(crate) fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub(crate) fn load_fixture(name: &str) -> Mesh {
    load_grid(fixture(name)).unwrap_or_else(|e| panic!("fixture {name} should load: {e}"))
}

/// Normalized colour to the byte a unorm render target stores for it.
pub(crate) fn f_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(feature = "integration-tests")]
pub(crate) struct FrameCounter(pub(crate) u32);

#[cfg(feature = "integration-tests")]
impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}
