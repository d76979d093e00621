//! The top-level controller.
//!
//! A [`Controller`] owns one session: the remote service handle, the
//! [`StateMirror`], the [`PollingScheduler`], the [`ControlState`] and the
//! drawing surface. Hosts turn user input into calls on it and watch
//! [`Controller::frames`] for what to display.
//!
//! Lifecycle: [`Controller::new`], then [`Controller::start`] for the first
//! refresh-and-render, then intents, then [`Controller::shutdown`].
//!
//! Remote failures never escape an intent. They are logged and the local
//! state stays as it was, so the worst outcome is a stale frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use lifeview_client::SimulationService;
use lifeview_render::{Surface, cell_at_pixel, render_frame};
use lifeview_types::{
    FrameInfo, GenerateCenterRequest, RunMode, SnapshotError, StageDistribution,
    ToggleCellRequest,
};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ControllerConfig};
use crate::controls::{ControlError, ControlState};
use crate::mirror::{MirrorView, StateMirror};
use crate::scheduler::PollingScheduler;

/// Errors raised while building a controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The initial control values are unusable.
    #[error(transparent)]
    Control(#[from] ControlError),

    /// The grid cannot be allocated.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// One controller session over service `S`, drawing onto surface `D`.
///
/// Cloning is cheap and every clone drives the same session.
pub struct Controller<S, D> {
    inner: Arc<Inner<S, D>>,
}

impl<S, D> Clone for Controller<S, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S, D> {
    service: S,
    mirror: StateMirror,
    scheduler: Arc<PollingScheduler>,
    controls: Mutex<ControlState>,
    surface: Mutex<D>,
    frames: watch::Sender<FrameInfo>,
    frame_counter: AtomicU64,
}

impl<S, D> Controller<S, D>
where
    S: SimulationService,
    D: Surface + 'static,
{
    /// Build a paused controller with an empty mirror.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] if `config` fails validation or the grid
    /// it describes cannot be allocated.
    pub fn new(service: S, surface: D, config: &ControllerConfig) -> Result<Self, ControllerError> {
        config.validate()?;
        let controls = ControlState::from_config(config)?;
        let mirror = StateMirror::new(config.grid.width, config.grid.height, config.ordering)?;
        let scheduler = PollingScheduler::new(
            config.pacing.evolution_speed_ms,
            config.evolution_speed_range(),
            config.auto_refresh_interval(),
        );

        let initial = FrameInfo {
            frame: 0,
            generation: 0,
            live_cells: 0,
            species_count: 0,
            stages: StageDistribution::default(),
            evolution_time_seconds: 0,
            mode: RunMode::Paused,
            cell_size: controls.cell_size(),
            cell_count: controls.linked.count(),
            density: controls.linked.density(),
            rendered_at: Utc::now(),
        };
        let (frames, _) = watch::channel(initial);

        info!(
            width = config.grid.width,
            height = config.grid.height,
            ordering = ?config.ordering,
            "controller created"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                service,
                mirror,
                scheduler: Arc::new(scheduler),
                controls: Mutex::new(controls),
                surface: Mutex::new(surface),
                frames,
                frame_counter: AtomicU64::new(0),
            }),
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Initial refresh followed by a render, whatever the refresh outcome.
    pub async fn start(&self) {
        self.inner.mirror.refresh_all(&self.inner.service).await;
        self.inner.render().await;
    }

    /// Pause, stop every background loop and wait for them to exit.
    pub async fn shutdown(&self) {
        self.inner.scheduler.shutdown().await;
        info!("controller shut down");
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Subscribe to the status published after every render.
    pub fn frames(&self) -> watch::Receiver<FrameInfo> {
        self.inner.frames.subscribe()
    }

    /// Current run mode.
    pub fn mode(&self) -> RunMode {
        self.inner.scheduler.mode()
    }

    /// Current evolve pacing in milliseconds.
    pub fn evolution_speed_ms(&self) -> u64 {
        u64::try_from(self.inner.scheduler.evolution_speed().as_millis()).unwrap_or(u64::MAX)
    }

    /// A copy of the current control values.
    pub async fn controls(&self) -> ControlState {
        self.inner.controls.lock().await.clone()
    }

    /// The snapshots currently in the mirror.
    pub async fn view(&self) -> MirrorView {
        self.inner.mirror.view().await
    }

    /// Run `f` against the drawing surface, e.g. to export it.
    pub async fn with_surface<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        let surface = self.inner.surface.lock().await;
        f(&surface)
    }

    // -----------------------------------------------------------------------
    // Run mode
    // -----------------------------------------------------------------------

    /// Pause when running, run when paused.
    pub async fn toggle_run(&self) {
        match self.mode() {
            RunMode::Running => self.pause().await,
            RunMode::Paused => self.run().await,
        }
    }

    /// Enter `Running`.
    ///
    /// With no live cells in the mirror the grid is first seeded around its
    /// centre. Then the evolve cycle and the auto-refresh timer start. Does
    /// nothing if already running.
    pub async fn run(&self) {
        let inner = &self.inner;
        let Some(ticket) = inner.scheduler.start() else {
            debug!("run ignored, already running");
            return;
        };

        if inner.mirror.grid().await.live_cell_count() == 0 {
            inner.seed().await;
        }
        // A pause may have landed while seeding.
        if !inner.scheduler.is_current(ticket) {
            return;
        }

        let evolve = Arc::clone(inner);
        inner
            .scheduler
            .spawn_evolve_cycle(ticket, move || {
                let inner = Arc::clone(&evolve);
                async move {
                    inner.evolve_once().await;
                }
            })
            .await;

        let refresh = Arc::clone(inner);
        inner
            .scheduler
            .spawn_auto_refresh(ticket, move || {
                let inner = Arc::clone(&refresh);
                async move {
                    inner.refresh_and_render().await;
                }
            })
            .await;

        inner.render().await;
    }

    /// Enter `Paused`. An evolve already in flight still completes.
    pub async fn pause(&self) {
        if self.inner.scheduler.pause() {
            self.inner.render().await;
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Evolve once. Returns whether the service accepted it.
    pub async fn step(&self) -> bool {
        self.inner.evolve_once().await
    }

    /// Pause, clear the remote grid and zero the step counter.
    ///
    /// The pause always happens. The counter is zeroed and the view refreshed
    /// only when the service accepts the reset.
    pub async fn reset(&self) -> bool {
        let inner = &self.inner;
        let was_running = inner.scheduler.pause();
        match inner.service.reset().await {
            Ok(()) => {
                inner.controls.lock().await.reset_steps();
                info!("grid reset");
                inner.refresh_and_render().await;
                true
            }
            Err(e) => {
                warn!(error = %e, "reset failed");
                if was_running {
                    inner.render().await;
                }
                false
            }
        }
    }

    /// Reseed the whole grid at the current density.
    pub async fn randomize(&self) -> bool {
        let inner = &self.inner;
        let density = inner.controls.lock().await.linked.density();
        match inner.service.randomize(density).await {
            Ok(()) => {
                info!(density, "grid randomized");
                inner.refresh_and_render().await;
                true
            }
            Err(e) => {
                warn!(error = %e, density, "randomize failed");
                false
            }
        }
    }

    /// Flip the cell at `(row, col)`.
    ///
    /// Coordinates outside the grid are dropped before any remote call.
    /// Returns whether the service accepted the toggle.
    pub async fn toggle_cell(&self, row: u32, col: u32) -> bool {
        let inner = &self.inner;
        if row >= inner.mirror.height() || col >= inner.mirror.width() {
            debug!(row, col, "toggle outside grid ignored");
            return false;
        }
        match inner.service.toggle_cell(ToggleCellRequest { x: row, y: col }).await {
            Ok(()) => {
                debug!(row, col, "cell toggled");
                inner.refresh_and_render().await;
                true
            }
            Err(e) => {
                warn!(error = %e, row, col, "toggle failed");
                false
            }
        }
    }

    /// Flip the cell under canvas pixel `(x, y)`.
    pub async fn toggle_cell_at_pixel(&self, x: u32, y: u32) -> bool {
        let cell_size = self.inner.controls.lock().await.cell_size();
        let mirror = &self.inner.mirror;
        match cell_at_pixel(x, y, cell_size, mirror.width(), mirror.height()) {
            Some(cell) => self.toggle_cell(cell.row, cell.col).await,
            None => {
                debug!(x, y, "click outside grid ignored");
                false
            }
        }
    }

    /// Re-read both snapshots and redraw.
    pub async fn refresh(&self) {
        self.inner.refresh_and_render().await;
    }

    // -----------------------------------------------------------------------
    // Local controls
    // -----------------------------------------------------------------------

    /// Change the render scale and redraw. No remote call.
    /// Returns the value applied after clamping.
    pub async fn set_cell_size(&self, px: u32) -> u32 {
        let applied = self.inner.controls.lock().await.set_cell_size(px);
        self.inner.render().await;
        applied
    }

    /// Change the evolve pacing for future waits.
    /// Returns the value applied after clamping.
    pub fn set_evolution_speed_ms(&self, ms: u64) -> u64 {
        self.inner.scheduler.set_evolution_speed_ms(ms)
    }

    /// Edit the cell-count control. Returns the derived density.
    pub async fn set_cell_count(&self, count: u64) -> f64 {
        let density = self.inner.controls.lock().await.linked.set_count(count);
        self.inner.render().await;
        density
    }

    /// Edit the density control. Returns the derived cell count.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::NonFiniteDensity`] for NaN or infinite input.
    pub async fn set_density(&self, density: f64) -> Result<u64, ControlError> {
        let count = self.inner.controls.lock().await.linked.set_density(density)?;
        self.inner.render().await;
        Ok(count)
    }
}

impl<S, D> Inner<S, D>
where
    S: SimulationService,
    D: Surface + 'static,
{
    async fn evolve_once(&self) -> bool {
        match self.service.evolve().await {
            Ok(()) => {
                self.controls.lock().await.record_step();
                self.refresh_and_render().await;
                true
            }
            Err(e) => {
                warn!(error = %e, "evolve failed");
                false
            }
        }
    }

    async fn seed(&self) {
        let count = self.controls.lock().await.linked.count();
        let request = GenerateCenterRequest {
            count,
            center_x: self.mirror.width() / 2,
            center_y: self.mirror.height() / 2,
        };
        match self.service.generate_center(request).await {
            Ok(()) => {
                info!(count, "seeded around centre");
                self.refresh_and_render().await;
            }
            Err(e) => warn!(error = %e, count, "seeding failed"),
        }
    }

    /// Refresh both snapshots; redraw if either changed.
    async fn refresh_and_render(&self) {
        let (grid, species) = self.mirror.refresh_all(&self.service).await;
        if grid.is_applied() || species.is_applied() {
            self.render().await;
        }
    }

    async fn render(&self) {
        let view = self.mirror.view().await;
        let (cell_size, cell_count, density, steps) = {
            let controls = self.controls.lock().await;
            (
                controls.cell_size(),
                controls.linked.count(),
                controls.linked.density(),
                controls.evolution_time_seconds(),
            )
        };

        // Frame numbers follow drawing order.
        let mut surface = self.surface.lock().await;
        render_frame(&mut *surface, &view.grid, &view.species, cell_size);
        let frame = self.frame_counter.fetch_add(1, Ordering::AcqRel).saturating_add(1);
        let info = FrameInfo {
            frame,
            generation: view.grid.generation(),
            live_cells: view.grid.live_cell_count(),
            species_count: view.species.species_count(),
            stages: view.species.stage_distribution(),
            evolution_time_seconds: steps,
            mode: self.scheduler.mode(),
            cell_size,
            cell_count,
            density,
            rendered_at: Utc::now(),
        };
        self.frames.send_replace(info);
        drop(surface);
    }
}
