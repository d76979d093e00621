//! Shared type definitions for the Lifeview controller.
//!
//! Lifeview watches a cellular automaton that runs on a remote service. This
//! crate holds the shapes every other crate agrees on: the JSON bodies the
//! service speaks, the validated snapshots built from them, the stage table
//! that drives lineage colouring, and the per-frame status record.
//!
//! # Modules
//!
//! - [`wire`] -- Request and reply bodies of the remote service (exported to
//!   `TypeScript` via `ts-rs`)
//! - [`snapshot`] -- Immutable grid and species snapshots
//! - [`stage`] -- Lineage stages, the eight-entry tier table, distributions
//! - [`frame`] -- Run mode and the status published with each frame

pub mod frame;
pub mod snapshot;
pub mod stage;
pub mod wire;

pub use frame::{FrameInfo, RunMode};
pub use snapshot::{Cell, GridSnapshot, LineageGroup, SnapshotError, SpeciesSnapshot};
pub use stage::{LineageTier, Stage, StageDistribution, TIER_COUNT};
pub use wire::{
    CommandReply, GenerateCenterRequest, GridReply, RandomizeRequest, SpeciesEntry,
    SpeciesReply, ToggleCellRequest, WireCell,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the wire types.

    #[test]
    fn export_bindings() {
        // Files land in `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::wire::GridReply::export_all();
        let _ = crate::wire::SpeciesEntry::export_all();
        let _ = crate::wire::SpeciesReply::export_all();
        let _ = crate::wire::CommandReply::export_all();
        let _ = crate::wire::RandomizeRequest::export_all();
        let _ = crate::wire::GenerateCenterRequest::export_all();
        let _ = crate::wire::ToggleCellRequest::export_all();
    }
}
