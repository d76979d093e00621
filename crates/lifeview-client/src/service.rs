//! The remote simulation service contract.
//!
//! The controller never talks HTTP directly; it drives a [`SimulationService`].
//! [`HttpSimulationService`](crate::http::HttpSimulationService) is the real
//! implementation, tests substitute an in-process fake.
//!
//! Reads return the raw wire replies. Turning them into validated snapshots
//! needs the session's grid dimensions, which the caller owns. Commands
//! resolve to `Ok(())` only when the service reported `success: true`.

use std::future::Future;

use lifeview_types::{GenerateCenterRequest, GridReply, SpeciesReply, ToggleCellRequest};

use crate::error::ClientError;

/// One endpoint of the simulation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /api/grid`
    Grid,
    /// `GET /api/species`
    Species,
    /// `POST /api/evolve`
    Evolve,
    /// `POST /api/reset`
    Reset,
    /// `POST /api/randomize`
    Randomize,
    /// `POST /api/generate_center`
    GenerateCenter,
    /// `POST /api/toggle_cell`
    ToggleCell,
}

impl Endpoint {
    /// Path relative to the service base URL.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Grid => "/api/grid",
            Self::Species => "/api/species",
            Self::Evolve => "/api/evolve",
            Self::Reset => "/api/reset",
            Self::Randomize => "/api/randomize",
            Self::GenerateCenter => "/api/generate_center",
            Self::ToggleCell => "/api/toggle_cell",
        }
    }

    /// Whether the endpoint mutates remote state.
    pub const fn is_command(self) -> bool {
        !matches!(self, Self::Grid | Self::Species)
    }
}

impl core::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path())
    }
}

/// Operations the controller needs from the remote simulation.
///
/// Implementations must be shareable across tasks: the evolve cycle, the
/// auto-refresh timer and user intents all call into the same service
/// concurrently.
pub trait SimulationService: Send + Sync + 'static {
    /// Fetch the current grid.
    fn get_grid(&self) -> impl Future<Output = Result<GridReply, ClientError>> + Send;

    /// Fetch the current lineage groups.
    fn get_species(&self) -> impl Future<Output = Result<SpeciesReply, ClientError>> + Send;

    /// Advance the simulation by one generation.
    fn evolve(&self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Clear the remote grid.
    fn reset(&self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Reseed the whole grid at `density`.
    fn randomize(&self, density: f64) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Seed cells around a centre point.
    fn generate_center(
        &self,
        request: GenerateCenterRequest,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Flip a single cell.
    fn toggle_cell(
        &self,
        request: ToggleCellRequest,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}
