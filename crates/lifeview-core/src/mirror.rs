//! Local cache of the latest remote snapshots.
//!
//! The mirror holds one [`GridSnapshot`] and one [`SpeciesSnapshot`], each
//! behind its own lock and each replaced wholesale by its own refresh. A
//! failed refresh of one kind never touches the other.
//!
//! Refreshes may overlap: the evolve cycle, the auto-refresh timer and user
//! intents all call in without coordinating. Under
//! [`ReplyOrdering::Sequenced`] every refresh draws a ticket before issuing
//! its request and a reply is installed only if its ticket beats the last
//! installed one, so a slow old reply can no longer overwrite a newer one.
//! [`ReplyOrdering::LastArrival`] installs whatever arrives, in arrival
//! order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lifeview_client::{ClientError, SimulationService};
use lifeview_types::{GridSnapshot, SnapshotError, SpeciesSnapshot};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// How replies of overlapping refreshes are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOrdering {
    /// Install a reply only if it was requested after the installed one.
    #[default]
    Sequenced,
    /// Install every reply in the order replies arrive.
    LastArrival,
}

/// What happened to one refresh.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The reply replaced the cached snapshot.
    Applied,
    /// The reply was older than the cached snapshot and was dropped.
    Stale,
    /// The read failed; the cached snapshot is unchanged.
    Failed(ClientError),
}

impl RefreshOutcome {
    /// Whether the cached snapshot was replaced.
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Both snapshots as seen at one instant.
#[derive(Debug, Clone)]
pub struct MirrorView {
    /// Latest installed grid.
    pub grid: Arc<GridSnapshot>,
    /// Latest installed species.
    pub species: Arc<SpeciesSnapshot>,
}

#[derive(Debug)]
struct Slot<T> {
    installed_ticket: u64,
    value: Arc<T>,
}

impl<T> Slot<T> {
    fn new(value: T) -> Self {
        Self {
            installed_ticket: 0,
            value: Arc::new(value),
        }
    }
}

/// Cache of the latest grid and species snapshots.
#[derive(Debug)]
pub struct StateMirror {
    width: u32,
    height: u32,
    ordering: ReplyOrdering,
    grid: RwLock<Slot<GridSnapshot>>,
    species: RwLock<Slot<SpeciesSnapshot>>,
    grid_tickets: AtomicU64,
    species_tickets: AtomicU64,
}

impl StateMirror {
    /// An empty mirror for a `width x height` session grid.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Dimensions`] if the grid is too large to
    /// allocate.
    pub fn new(width: u32, height: u32, ordering: ReplyOrdering) -> Result<Self, SnapshotError> {
        Ok(Self {
            width,
            height,
            ordering,
            grid: RwLock::new(Slot::new(GridSnapshot::empty(width, height)?)),
            species: RwLock::new(Slot::new(SpeciesSnapshot::default())),
            grid_tickets: AtomicU64::new(0),
            species_tickets: AtomicU64::new(0),
        })
    }

    /// Session grid width.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Session grid height.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The active ordering policy.
    pub const fn ordering(&self) -> ReplyOrdering {
        self.ordering
    }

    /// Current snapshots.
    pub async fn view(&self) -> MirrorView {
        let grid = Arc::clone(&self.grid.read().await.value);
        let species = Arc::clone(&self.species.read().await.value);
        MirrorView { grid, species }
    }

    /// Current grid snapshot.
    pub async fn grid(&self) -> Arc<GridSnapshot> {
        Arc::clone(&self.grid.read().await.value)
    }

    /// Fetch the grid and install it if the ordering policy allows.
    pub async fn refresh_grid<S: SimulationService>(&self, service: &S) -> RefreshOutcome {
        let ticket = next_ticket(&self.grid_tickets);
        let snapshot = service.get_grid().await.and_then(|reply| {
            GridSnapshot::from_reply(&reply, self.width, self.height).map_err(ClientError::from)
        });
        match snapshot {
            Ok(grid) => self.install(&self.grid, ticket, grid, "grid").await,
            Err(e) => {
                warn!(ticket, error = %e, "grid refresh failed");
                RefreshOutcome::Failed(e)
            }
        }
    }

    /// Fetch the species and install them if the ordering policy allows.
    pub async fn refresh_species<S: SimulationService>(&self, service: &S) -> RefreshOutcome {
        let ticket = next_ticket(&self.species_tickets);
        match service.get_species().await {
            Ok(reply) => {
                let species = SpeciesSnapshot::from_reply(reply);
                self.install(&self.species, ticket, species, "species")
                    .await
            }
            Err(e) => {
                warn!(ticket, error = %e, "species refresh failed");
                RefreshOutcome::Failed(e)
            }
        }
    }

    /// Refresh the grid, then the species.
    pub async fn refresh_all<S: SimulationService>(
        &self,
        service: &S,
    ) -> (RefreshOutcome, RefreshOutcome) {
        let grid = self.refresh_grid(service).await;
        let species = self.refresh_species(service).await;
        (grid, species)
    }

    async fn install<T>(
        &self,
        slot: &RwLock<Slot<T>>,
        ticket: u64,
        value: T,
        kind: &'static str,
    ) -> RefreshOutcome {
        let mut guard = slot.write().await;
        if self.ordering == ReplyOrdering::Sequenced && ticket <= guard.installed_ticket {
            debug!(
                kind,
                ticket,
                installed = guard.installed_ticket,
                "discarding stale reply"
            );
            return RefreshOutcome::Stale;
        }
        guard.installed_ticket = ticket;
        guard.value = Arc::new(value);
        debug!(kind, ticket, "snapshot installed");
        RefreshOutcome::Applied
    }
}

fn next_ticket(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::AcqRel).saturating_add(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        let mirror = StateMirror::new(3, 2, ReplyOrdering::Sequenced).unwrap();
        let view = mirror.view().await;
        assert_eq!(view.grid.width(), 3);
        assert_eq!(view.grid.height(), 2);
        assert_eq!(view.grid.generation(), 0);
        assert_eq!(view.grid.live_cell_count(), 0);
        assert!(view.species.groups().is_empty());
    }

    #[tokio::test]
    async fn sequenced_drops_older_ticket() {
        let mirror = StateMirror::new(1, 1, ReplyOrdering::Sequenced).unwrap();
        let old = next_ticket(&mirror.species_tickets);
        let new = next_ticket(&mirror.species_tickets);

        let applied = mirror
            .install(&mirror.species, new, SpeciesSnapshot::default(), "species")
            .await;
        assert!(applied.is_applied());
        let stale = mirror
            .install(&mirror.species, old, SpeciesSnapshot::default(), "species")
            .await;
        assert!(matches!(stale, RefreshOutcome::Stale));
    }

    #[tokio::test]
    async fn last_arrival_takes_everything() {
        let mirror = StateMirror::new(1, 1, ReplyOrdering::LastArrival).unwrap();
        let old = next_ticket(&mirror.grid_tickets);
        let new = next_ticket(&mirror.grid_tickets);
        let empty = GridSnapshot::empty(1, 1).unwrap();

        assert!(mirror.install(&mirror.grid, new, empty.clone(), "grid").await.is_applied());
        assert!(mirror.install(&mirror.grid, old, empty, "grid").await.is_applied());
    }

    #[test]
    fn ordering_parses_snake_case() {
        let o: ReplyOrdering = serde_yml::from_str("last_arrival").unwrap();
        assert_eq!(o, ReplyOrdering::LastArrival);
    }
}
