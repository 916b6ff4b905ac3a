//! Viewer configuration.
//!
//! [`ViewerConfig`] holds every knob the pipeline reads: the grid file, the
//! background and actor colours, the window title and whether a failed load
//! should change the process exit code. [`Args`] is the command line surface
//! that produces it.

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use thiserror::Error;

/// Grid shown when neither an argument nor `GRID_VIEWER_FILE` names one.
pub const DEFAULT_PATH: &str = "public/data/ply/vortex.vtk";

/// Dark blue, in the normalized colour scale.
pub const DEFAULT_BACKGROUND: Colour = Colour {
    r: 0.1,
    g: 0.2,
    b: 0.4,
};

pub const DEFAULT_ACTOR_COLOUR: Colour = Colour {
    r: 1.0,
    g: 1.0,
    b: 1.0,
};

/// An RGB colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colour {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Colour {
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r,
            g: self.g,
            b: self.b,
            a: 1.0,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r as f32, self.g as f32, self.b as f32, 1.0]
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseColourError {
    #[error("expected three comma separated components, got {0}")]
    Arity(usize),
    #[error("`{0}` is not a number")]
    NotANumber(String),
    #[error("component {0} is outside of [0, 1]")]
    OutOfRange(f64),
}

impl FromStr for Colour {
    type Err = ParseColourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ParseColourError::Arity(parts.len()));
        }
        let mut rgb = [0.0; 3];
        for (slot, part) in rgb.iter_mut().zip(parts) {
            let value: f64 = part
                .parse()
                .map_err(|_| ParseColourError::NotANumber(part.to_string()))?;
            if !(0.0..=1.0).contains(&value) {
                return Err(ParseColourError::OutOfRange(value));
            }
            *slot = value;
        }
        Ok(Colour {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
        })
    }
}

/// Resolved configuration for one viewer session.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub path: PathBuf,
    pub background: Colour,
    pub actor_colour: Colour,
    pub title: String,
    /// Exit with a non-zero status when the grid cannot be loaded.
    pub strict: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            background: DEFAULT_BACKGROUND,
            actor_colour: DEFAULT_ACTOR_COLOUR,
            title: "Grid Viewer".to_string(),
            strict: false,
        }
    }
}

/// Load a legacy VTK unstructured grid and show it in an interactive window.
#[derive(Parser, Debug)]
#[command(name = "grid-viewer", version, about)]
pub struct Args {
    /// Legacy VTK file to display.
    #[arg(env = "GRID_VIEWER_FILE", default_value = DEFAULT_PATH)]
    pub path: PathBuf,

    /// Background colour as `R,G,B` in [0, 1].
    #[arg(long, value_name = "R,G,B")]
    pub background: Option<Colour>,

    /// Surface colour as `R,G,B` in [0, 1], used when the grid has no point scalars.
    #[arg(long, value_name = "R,G,B")]
    pub colour: Option<Colour>,

    /// Exit with status 1 when the file cannot be loaded.
    #[arg(long)]
    pub strict: bool,
}

impl From<Args> for ViewerConfig {
    fn from(args: Args) -> Self {
        let defaults = ViewerConfig::default();
        let title = match args.path.file_name() {
            Some(name) => format!("{} - {}", defaults.title, name.to_string_lossy()),
            None => defaults.title,
        };
        Self {
            path: args.path,
            background: args.background.unwrap_or(defaults.background),
            actor_colour: args.colour.unwrap_or(defaults.actor_colour),
            title,
            strict: args.strict,
        }
    }
}
