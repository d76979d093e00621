//! JSON request and response bodies of the remote simulation service.
//!
//! These mirror the service's payloads field for field. They are decoded
//! into the validated snapshot types in [`crate::snapshot`] before anything
//! else in the controller sees them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A `[row, col]` coordinate pair as it appears on the wire.
pub type WireCell = (u32, u32);

/// Reply of `GET /api/grid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridReply {
    /// Row-major liveness matrix, `1` for live and `0` for dead.
    pub grid: Vec<Vec<u8>>,
    /// Generation counter of the remote simulation.
    pub generation: u64,
    /// Coordinates of every live cell.
    pub live_cells: Vec<WireCell>,
}

/// One lineage group inside a [`SpeciesReply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpeciesEntry {
    /// Maturity stage, nominally `1..=8`.
    pub stage: i32,
    /// Member cells of the group.
    pub group: Vec<WireCell>,
    /// How long the group has survived, in service time units.
    #[serde(default)]
    pub survival_time: Option<f64>,
    /// Progress towards the next stage, `0.0..=1.0`.
    #[serde(default)]
    pub evolution_progress: Option<f64>,
}

/// Reply of `GET /api/species`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpeciesReply {
    /// All lineage groups detected in the current generation.
    pub species: Vec<SpeciesEntry>,
    /// Number of groups as counted by the service.
    pub species_count: u64,
}

/// Reply of every mutating `POST` endpoint.
///
/// The service adds endpoint-specific fields (generation, live cell count);
/// the controller only relies on `success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CommandReply {
    /// Whether the service applied the command.
    pub success: bool,
}

/// Body of `POST /api/randomize`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RandomizeRequest {
    /// Fraction of cells to bring alive, `0.0..=1.0`.
    pub density: f64,
}

/// Body of `POST /api/generate_center`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GenerateCenterRequest {
    /// Number of cells to seed.
    pub count: u64,
    /// Horizontal centre (column) of the seeding area.
    #[serde(rename = "centerX")]
    pub center_x: u32,
    /// Vertical centre (row) of the seeding area.
    #[serde(rename = "centerY")]
    pub center_y: u32,
}

/// Body of `POST /api/toggle_cell`.
///
/// The service indexes its matrix as `grid[x][y]`, so `x` carries the row
/// and `y` the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ToggleCellRequest {
    /// Row of the cell to flip.
    pub x: u32,
    /// Column of the cell to flip.
    pub y: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn species_reply_tolerates_missing_optional_fields() {
        let json = r#"{"species":[{"stage":2,"group":[[1,2],[1,3]]}],"species_count":1}"#;
        let reply: SpeciesReply = serde_json::from_str(json).unwrap();
        let entry = reply.species.first().unwrap();
        assert_eq!(entry.stage, 2);
        assert_eq!(entry.group, vec![(1, 2), (1, 3)]);
        assert!(entry.survival_time.is_none());
    }

    #[test]
    fn command_reply_ignores_extra_fields() {
        let json = r#"{"success":true,"generation":4,"live_cells":12}"#;
        let reply: CommandReply = serde_json::from_str(json).unwrap();
        assert!(reply.success);
    }

    #[test]
    fn generate_center_uses_camel_case_centre() {
        let body = GenerateCenterRequest {
            count: 20,
            center_x: 5,
            center_y: 7,
        };
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["centerX"], 5);
        assert_eq!(value["centerY"], 7);
        assert_eq!(value["count"], 20);
    }

    #[test]
    fn grid_reply_parses_pairs() {
        let json = r#"{"grid":[[0,1],[0,0]],"generation":3,"live_cells":[[0,1]]}"#;
        let reply: GridReply = serde_json::from_str(json).unwrap();
        assert_eq!(reply.live_cells, vec![(0, 1)]);
        assert_eq!(reply.generation, 3);
    }
}
