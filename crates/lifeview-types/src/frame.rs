//! Status published alongside every rendered frame.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stage::StageDistribution;

/// Whether the controller is advancing the simulation on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// No evolve commands are scheduled.
    #[default]
    Paused,
    /// Evolve commands are issued repeatedly, paced by the evolve interval.
    Running,
}

impl RunMode {
    /// Whether this is [`RunMode::Running`].
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl core::fmt::Display for RunMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Paused => f.write_str("paused"),
            Self::Running => f.write_str("running"),
        }
    }
}

/// What a host displays next to the canvas after a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    /// Monotonic render counter, starting at 1 for the first frame.
    pub frame: u64,
    /// Generation of the grid snapshot that was drawn.
    pub generation: u64,
    /// Live cells reported with that grid snapshot.
    pub live_cells: u64,
    /// Species count of the species snapshot that was drawn.
    pub species_count: u64,
    /// Groups per tier in the drawn species snapshot.
    pub stages: StageDistribution,
    /// Successful evolve commands since the last reset.
    pub evolution_time_seconds: u64,
    /// Run mode at render time.
    pub mode: RunMode,
    /// Pixels per cell used for this frame.
    pub cell_size: u32,
    /// Current value of the cell-count control.
    pub cell_count: u64,
    /// Current value of the density control.
    pub density: f64,
    /// Wall-clock time of the render.
    pub rendered_at: DateTime<Utc>,
}

impl FrameInfo {
    /// Density as a whole percentage, for display.
    #[allow(clippy::cast_possible_truncation)]
    pub fn density_percent(&self) -> i64 {
        (self.density * 100.0).round() as i64
    }
}
