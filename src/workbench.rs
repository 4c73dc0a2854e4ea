//! Workbench
//!
//! Editing state for one open canvas. It is created when a canvas is
//! opened and dropped when it is closed; nothing in here is shared
//! implicitly, the owner passes it to whoever needs it.
use crate::auction::{Address, AddressRef};
use crate::canvas::{Canvas, Color, Pixel, DEFAULT_COLOR, MAX_CONTRIBUTION};
use crate::grid::{Coord, GridError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Undo steps kept per workbench; older ones are dropped
pub const HISTORY_LIMIT: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaintError {
    #[error("canvas is already completed")]
    CanvasCompleted,
    #[error("pixel ({}, {}) is already painted", .0.x, .0.y)]
    AlreadyPainted(Coord),
    #[error("pixel ({}, {}) is already pending", .0.x, .0.y)]
    AlreadyPending(Coord),
    #[error("contribution limit of {MAX_CONTRIBUTION} pixels reached")]
    ContributionLimit,
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    #[default]
    Paint,
    Eyedropper,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Eyedropper picked the color of a painted cell
    Picked(Color),
    Paint(PaintCommand),
    Nothing,
}

/// Optimistic paint of a single pixel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintCommand {
    pub pixel: Pixel,
}

impl PaintCommand {
    pub fn apply(&self, state: &mut WorkbenchState) {
        if !state.is_pending(self.pixel.coord()) {
            let mut next = state.pending.clone();
            next.push(self.pixel.clone());
            state.commit_pending(next);
        }
    }

    /// Forgets the pixel entirely, so neither undo nor redo can bring it back
    pub fn rollback(&self, state: &mut WorkbenchState) {
        let coord = self.pixel.coord();
        state.forget(|p| p.coord() == coord);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkbenchState {
    selected_color: Color,
    tool: Tool,
    pending: Vec<Pixel>,
    history: Vec<Vec<Pixel>>,
    history_index: usize,
}

impl Default for WorkbenchState {
    fn default() -> Self {
        Self {
            selected_color: DEFAULT_COLOR,
            tool: Tool::default(),
            pending: Vec::new(),
            history: vec![Vec::new()],
            history_index: 0,
        }
    }
}

impl WorkbenchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_color(&self) -> Color {
        self.selected_color
    }

    pub fn select_color(&mut self, color: Color) {
        self.selected_color = color;
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn pending(&self) -> &[Pixel] {
        &self.pending
    }

    pub fn is_pending(&self, coord: Coord) -> bool {
        self.pending.iter().any(|p| p.coord() == coord)
    }

    pub fn click(
        &mut self,
        canvas: &Canvas,
        coord: Coord,
        painter: AddressRef,
    ) -> Result<ClickOutcome, PaintError> {
        let existing = canvas.pixel_at(coord)?;

        if self.tool == Tool::Eyedropper {
            return Ok(match existing {
                Some(color) => {
                    self.selected_color = color;
                    ClickOutcome::Picked(color)
                }
                None => ClickOutcome::Nothing,
            });
        }

        if canvas.completed {
            return Err(PaintError::CanvasCompleted);
        }
        if existing.is_some() {
            return Err(PaintError::AlreadyPainted(coord));
        }
        if self.is_pending(coord) {
            return Err(PaintError::AlreadyPending(coord));
        }
        let pending_own = self.pending.iter().filter(|p| p.painter == painter).count() as u32;
        if canvas.contributed_by(painter) + pending_own >= MAX_CONTRIBUTION {
            return Err(PaintError::ContributionLimit);
        }

        Ok(ClickOutcome::Paint(PaintCommand {
            pixel: Pixel {
                x: coord.x,
                y: coord.y,
                color: self.selected_color,
                painter: Address::from(painter),
            },
        }))
    }

    /// Drops pending pixels the chain has since painted
    pub fn prune_painted(&mut self, canvas: &Canvas) {
        self.forget(|p| canvas.is_filled(p.coord()).unwrap_or(true));
    }

    pub fn clear_pending(&mut self) {
        if !self.pending.is_empty() {
            self.commit_pending(Vec::new());
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history_index + 1 < self.history.len()
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.history_index -= 1;
        self.pending = self.history[self.history_index].clone();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.history_index += 1;
        self.pending = self.history[self.history_index].clone();
        true
    }

    fn commit_pending(&mut self, next: Vec<Pixel>) {
        self.history.truncate(self.history_index + 1);
        self.history.push(next.clone());
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
        self.history_index = self.history.len() - 1;
        self.pending = next;
    }

    /// Removes matching pixels from every history step without recording a new one
    fn forget(&mut self, mut matches: impl FnMut(&Pixel) -> bool) {
        let mut history: Vec<Vec<Pixel>> = Vec::with_capacity(self.history.len());
        let mut index = 0;
        for (i, step) in std::mem::take(&mut self.history).into_iter().enumerate() {
            let step: Vec<_> = step.into_iter().filter(|p| !matches(p)).collect();
            // steps that only differed by a forgotten pixel collapse into one
            if history.last() != Some(&step) {
                history.push(step);
            }
            if i == self.history_index {
                index = history.len() - 1;
            }
        }
        self.pending = history.get(index).cloned().unwrap_or_default();
        self.history = history;
        self.history_index = index;
    }
}
