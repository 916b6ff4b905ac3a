//! Pipeline assembly and the viewer life cycle.
//!
//! A session walks through `Idle -> Loading -> {Failed | Loaded} -> Rendering
//! -> Closed`. Loading happens before any window exists, so a file that cannot
//! be read never opens one. [`run`] wires the stages together in their fixed
//! order: loader, mapper, actor, scene, window, interactor.

use std::{io::Write, path::Path};

use crate::{
    config::ViewerConfig,
    data_structures::mesh::Mesh,
    error::{LoadError, StateError},
    interactor::{self, Interactor},
    resources::{load_grid, mapper::Mapper},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerState {
    #[default]
    Idle,
    Loading,
    Failed,
    Loaded,
    Rendering,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Load,
    LoadFailed,
    LoadSucceeded,
    Show,
    Close,
}

impl ViewerState {
    pub fn advance(self, via: Transition) -> Result<ViewerState, StateError> {
        use Transition::*;
        use ViewerState::*;
        match (self, via) {
            (Idle, Load) => Ok(Loading),
            (Loading, LoadFailed) => Ok(Failed),
            (Loading, LoadSucceeded) => Ok(Loaded),
            (Loaded, Show) => Ok(Rendering),
            (Rendering, Close) => Ok(Closed),
            (from, via) => Err(StateError { from, via }),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ViewerState::Failed | ViewerState::Closed)
    }
}

pub fn success_message(path: &Path) -> String {
    format!("Successfully loaded the file at {}", path.display())
}

pub fn failure_message(error: &LoadError) -> String {
    format!("Error while loading the file: {}", error)
}

/// Tracks where a viewer is in its life cycle.
#[derive(Debug, Default)]
pub struct Session {
    state: ViewerState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub(crate) fn advance(&mut self, via: Transition) -> Result<(), StateError> {
        self.state = self.state.advance(via)?;
        log::debug!("viewer is now {:?}", self.state);
        Ok(())
    }

    /// Load the grid at `path`, announcing the outcome on `out`.
    ///
    /// A load failure is not an error of this function: the message is
    /// written, the session ends up `Failed` and `Ok(None)` is returned.
    pub fn load(&mut self, path: &Path, out: &mut impl Write) -> anyhow::Result<Option<Mesh>> {
        self.advance(Transition::Load)?;
        match load_grid(path) {
            Ok(mesh) => {
                writeln!(out, "{}", success_message(path))?;
                self.advance(Transition::LoadSucceeded)?;
                Ok(Some(mesh))
            }
            Err(e) => {
                writeln!(out, "{}", failure_message(&e))?;
                log::debug!("{:?}", e);
                self.advance(Transition::LoadFailed)?;
                Ok(None)
            }
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub state: ViewerState,
}

impl Outcome {
    pub fn load_failed(&self) -> bool {
        self.state == ViewerState::Failed
    }

    /// Process exit status: a failed load only counts as failure when
    /// `strict` is set.
    pub fn exit_status(&self, strict: bool) -> u8 {
        if strict && self.load_failed() { 1 } else { 0 }
    }
}

/// Load the configured grid and, if that works, show it until the window is
/// closed. Blocks the calling thread for the whole session.
pub fn run(config: &ViewerConfig) -> anyhow::Result<Outcome> {
    assemble(
        config,
        #[cfg(feature = "integration-tests")]
        None,
    )
}

/// Same as [`run`] but hands every rendered frame to `check` until it passes
/// or fails, then closes the window.
#[cfg(feature = "integration-tests")]
pub fn run_with_check(
    config: &ViewerConfig,
    check: interactor::FrameCheck,
) -> anyhow::Result<Outcome> {
    assemble(config, Some(check))
}

fn assemble(
    config: &ViewerConfig,
    #[cfg(feature = "integration-tests")] check: Option<interactor::FrameCheck>,
) -> anyhow::Result<Outcome> {
    let mut session = Session::new();
    let Some(mesh) = session.load(&config.path, &mut std::io::stdout())? else {
        return Ok(Outcome {
            state: session.state(),
        });
    };
    let geometry = Mapper::new(&mesh)?.map();
    log::info!(
        "Mapped {} triangles ({} cells without surface)",
        geometry.triangles(),
        geometry.skipped
    );

    let event_loop = interactor::build_event_loop()?;
    #[allow(unused_mut)]
    let mut app = Interactor::new(config.clone(), geometry, session);
    #[cfg(feature = "integration-tests")]
    if let Some(check) = check {
        app = app.with_frame_check(check);
    }
    event_loop.run_app(&mut app)?;
    app.finish()
}
