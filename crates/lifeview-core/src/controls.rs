//! User-adjustable control values.
//!
//! [`LinkedControlPair`] keeps the cell-count and density controls
//! consistent over a fixed grid: after any single edit
//! `count == round(density * total_cells)`. An edit to one field writes the
//! other and nothing else, so there is no path for an edit to feed back into
//! itself.
//!
//! [`ControlState`] groups the linked pair with the render scale and the
//! evolve step counter. Run mode and evolve pacing live in the
//! [`PollingScheduler`](crate::scheduler::PollingScheduler), whose
//! background tasks read them without taking a lock.

use std::ops::RangeInclusive;

use crate::config::ControllerConfig;

/// Errors raised by control edits.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ControlError {
    /// Density must be a finite number.
    #[error("density {0} is not a finite number")]
    NonFiniteDensity(f64),

    /// The grid has no cells, so no density can be derived.
    #[error("grid has no cells")]
    EmptyGrid,
}

/// Cell count and density, bound together over `total_cells`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkedControlPair {
    total_cells: u64,
    count: u64,
    density: f64,
}

impl LinkedControlPair {
    /// Create the pair from an initial density.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::EmptyGrid`] if `total_cells` is zero, or
    /// [`ControlError::NonFiniteDensity`] if `density` is NaN or infinite.
    pub fn new(total_cells: u64, density: f64) -> Result<Self, ControlError> {
        if total_cells == 0 {
            return Err(ControlError::EmptyGrid);
        }
        let mut pair = Self {
            total_cells,
            count: 0,
            density: 0.0,
        };
        pair.set_density(density)?;
        Ok(pair)
    }

    /// Number of cells in the grid.
    pub const fn total_cells(&self) -> u64 {
        self.total_cells
    }

    /// Current cell count.
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Current density, `0.0..=1.0`.
    pub const fn density(&self) -> f64 {
        self.density
    }

    /// Edit the count field. Density follows as `count / total_cells`.
    ///
    /// Counts above the grid size are clamped to it. Returns the new density.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_count(&mut self, count: u64) -> f64 {
        self.count = count.min(self.total_cells);
        self.density = self.count as f64 / self.total_cells as f64;
        self.density
    }

    /// Edit the density field. Count follows as
    /// `round(density * total_cells)`.
    ///
    /// Finite values outside `0..=1` are clamped. Returns the new count.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::NonFiniteDensity`] for NaN or infinite input;
    /// both fields are left unchanged.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn set_density(&mut self, density: f64) -> Result<u64, ControlError> {
        if !density.is_finite() {
            return Err(ControlError::NonFiniteDensity(density));
        }
        self.density = density.clamp(0.0, 1.0);
        let count = (self.density * self.total_cells as f64).round() as u64;
        self.count = count.min(self.total_cells);
        Ok(self.count)
    }
}

/// Control values owned by the controller and changed only by intents.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    cell_size: u32,
    cell_size_range: RangeInclusive<u32>,
    /// Cell count and density controls.
    pub linked: LinkedControlPair,
    evolution_time_seconds: u64,
}

impl ControlState {
    /// Build the initial state from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError`] if the configured grid is empty or the
    /// configured density is not finite.
    pub fn from_config(config: &ControllerConfig) -> Result<Self, ControlError> {
        let total = u64::from(config.grid.width).saturating_mul(u64::from(config.grid.height));
        let range = config.cell_size_range();
        Ok(Self {
            cell_size: config.display.cell_size.clamp(*range.start(), *range.end()),
            cell_size_range: range,
            linked: LinkedControlPair::new(total, config.seeding.density)?,
            evolution_time_seconds: 0,
        })
    }

    /// Pixels per cell.
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Set the pixels per cell, clamped to the configured range.
    /// Returns the value actually applied.
    pub fn set_cell_size(&mut self, px: u32) -> u32 {
        self.cell_size = px.clamp(*self.cell_size_range.start(), *self.cell_size_range.end());
        self.cell_size
    }

    /// Successful evolve commands since the last reset.
    pub const fn evolution_time_seconds(&self) -> u64 {
        self.evolution_time_seconds
    }

    /// Count one successful evolve.
    pub const fn record_step(&mut self) {
        self.evolution_time_seconds = self.evolution_time_seconds.saturating_add(1);
    }

    /// Zero the step counter.
    pub const fn reset_steps(&mut self) {
        self.evolution_time_seconds = 0;
    }
}
