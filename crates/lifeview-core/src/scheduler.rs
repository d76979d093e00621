//! Run mode and the two background cadences.
//!
//! The scheduler has two orthogonal parts:
//!
//! - **Run mode**: [`RunMode::Paused`] or [`RunMode::Running`]. Each entry
//!   into `Running` bumps a run epoch and hands out a [`RunTicket`]. A
//!   background loop holding a ticket keeps going only while the scheduler
//!   is still running under that same epoch, so pause followed quickly by
//!   run never leaves two evolve cycles alive.
//! - **Cadences**: the evolve cycle (act, then wait the current evolve
//!   pacing, repeat) and the auto-refresh timer (fixed period, first firing
//!   one period after start). Both check their ticket before every action.
//!
//! Pausing stops new work from being scheduled. An action already in flight
//! is not cancelled; it runs to completion and its loop then exits.

use std::future::Future;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use lifeview_types::RunMode;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Proof of one entry into [`RunMode::Running`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    epoch: u64,
}

impl RunTicket {
    /// The run epoch this ticket belongs to.
    pub const fn epoch(self) -> u64 {
        self.epoch
    }
}

/// Shared run-mode state plus handles of the background loops.
#[derive(Debug)]
pub struct PollingScheduler {
    running: AtomicBool,
    epoch: AtomicU64,
    evolution_speed_ms: AtomicU64,
    speed_range: RangeInclusive<u64>,
    auto_refresh: Duration,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl PollingScheduler {
    /// Create a paused scheduler.
    ///
    /// `evolution_speed_ms` is clamped into `speed_range`.
    pub fn new(
        evolution_speed_ms: u64,
        speed_range: RangeInclusive<u64>,
        auto_refresh: Duration,
    ) -> Self {
        let speed = evolution_speed_ms.clamp(*speed_range.start(), *speed_range.end());
        Self {
            running: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            evolution_speed_ms: AtomicU64::new(speed),
            speed_range,
            auto_refresh,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Current run mode.
    pub fn mode(&self) -> RunMode {
        if self.running.load(Ordering::Acquire) {
            RunMode::Running
        } else {
            RunMode::Paused
        }
    }

    /// Current run epoch (number of entries into `Running` so far).
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Enter `Running`.
    ///
    /// Returns `None` if already running; the existing ticket stays valid.
    pub fn start(&self) -> Option<RunTicket> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel).saturating_add(1);
        info!(epoch, "run started");
        Some(RunTicket { epoch })
    }

    /// Enter `Paused`. Returns `true` if the scheduler was running.
    pub fn pause(&self) -> bool {
        let was_running = self.running.swap(false, Ordering::AcqRel);
        if was_running {
            info!(epoch = self.epoch(), "run paused");
        }
        was_running
    }

    /// Whether `ticket` still authorises new work.
    pub fn is_current(&self, ticket: RunTicket) -> bool {
        self.running.load(Ordering::Acquire) && self.epoch.load(Ordering::Acquire) == ticket.epoch
    }

    /// Wait between evolve commands.
    pub fn evolution_speed(&self) -> Duration {
        Duration::from_millis(self.evolution_speed_ms.load(Ordering::Acquire))
    }

    /// Change the evolve pacing, clamped to the allowed range.
    ///
    /// Takes effect at the next wait; a wait already in progress keeps its
    /// length. Returns the value actually applied.
    pub fn set_evolution_speed_ms(&self, ms: u64) -> u64 {
        let ms = ms.clamp(*self.speed_range.start(), *self.speed_range.end());
        let prev = self.evolution_speed_ms.swap(ms, Ordering::AcqRel);
        debug!(prev, ms, "evolve pacing changed");
        ms
    }

    /// Auto-refresh period.
    pub const fn auto_refresh_interval(&self) -> Duration {
        self.auto_refresh
    }

    /// Spawn the evolve cycle for `ticket`.
    ///
    /// The loop runs `action`, waits the current evolve pacing, and repeats
    /// for as long as the ticket is current.
    pub async fn spawn_evolve_cycle<F, Fut>(self: &Arc<Self>, ticket: RunTicket, mut action: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let scheduler = Arc::clone(self);
        let handle = tokio::spawn(async move {
            debug!(epoch = ticket.epoch, "evolve cycle started");
            while scheduler.is_current(ticket) {
                action().await;
                if !scheduler.is_current(ticket) {
                    break;
                }
                tokio::time::sleep(scheduler.evolution_speed()).await;
            }
            debug!(epoch = ticket.epoch, "evolve cycle stopped");
        });
        self.track(handle).await;
    }

    /// Spawn the auto-refresh timer for `ticket`.
    ///
    /// `action` first runs one full period after this call, then once per
    /// period while the ticket is current.
    pub async fn spawn_auto_refresh<F, Fut>(self: &Arc<Self>, ticket: RunTicket, mut action: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let scheduler = Arc::clone(self);
        let period = self.auto_refresh;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if !scheduler.is_current(ticket) {
                    break;
                }
                action().await;
            }
            debug!(epoch = ticket.epoch, "auto-refresh stopped");
        });
        self.track(handle).await;
    }

    /// Pause and abort every background loop, in-flight actions included.
    pub async fn shutdown(&self) {
        self.pause();
        let mut tasks = self.tasks.lock().await;
        for handle in tasks.drain(..) {
            handle.abort();
            // Cancelled is the expected outcome.
            let _ = handle.await;
        }
        info!("scheduler shut down");
    }

    /// Number of background loops that have not finished yet.
    pub async fn active_tasks(&self) -> usize {
        let mut tasks = self.tasks.lock().await;
        tasks.retain(|h| !h.is_finished());
        tasks.len()
    }

    async fn track(&self, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock().await;
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scheduler() -> Arc<PollingScheduler> {
        Arc::new(PollingScheduler::new(
            1000,
            100..=5000,
            Duration::from_millis(2500),
        ))
    }

    fn counter() -> (Arc<AtomicU64>, impl FnMut() -> std::future::Ready<()> + Send + 'static) {
        let hits = Arc::new(AtomicU64::new(0));
        let h = Arc::clone(&hits);
        (hits, move || {
            h.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        })
    }

    #[test]
    fn start_and_pause_move_the_epoch() {
        let s = scheduler();
        assert_eq!(s.mode(), RunMode::Paused);
        let first = s.start().unwrap();
        assert!(s.start().is_none());
        assert!(s.is_current(first));
        assert!(s.pause());
        assert!(!s.pause());
        assert!(!s.is_current(first));

        let second = s.start().unwrap();
        assert_eq!(second.epoch(), 2);
        assert!(!s.is_current(first));
        assert!(s.is_current(second));
    }

    #[test]
    fn pacing_is_clamped() {
        let s = scheduler();
        assert_eq!(s.set_evolution_speed_ms(10), 100);
        assert_eq!(s.set_evolution_speed_ms(9_000), 5000);
        assert_eq!(s.evolution_speed(), Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn evolve_cycle_runs_on_pacing() {
        let s = scheduler();
        let ticket = s.start().unwrap();
        let (hits, action) = counter();
        s.spawn_evolve_cycle(ticket, action).await;

        tokio::task::yield_now().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        s.pause();
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(s.active_tasks().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_cycle_exits_after_quick_restart() {
        let s = scheduler();
        let first = s.start().unwrap();
        let (hits, action) = counter();
        s.spawn_evolve_cycle(first, action).await;
        tokio::task::yield_now().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        s.pause();
        let _second = s.start().unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        // The first cycle woke up under a new epoch and stopped.
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(s.active_tasks().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_refresh_first_fires_after_one_period() {
        let s = scheduler();
        let ticket = s.start().unwrap();
        let (hits, action) = counter();
        s.spawn_auto_refresh(ticket, action).await;

        tokio::time::sleep(Duration::from_millis(2400)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        s.pause();
        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_aborts_loops() {
        let s = scheduler();
        let ticket = s.start().unwrap();
        let (_hits, action) = counter();
        s.spawn_auto_refresh(ticket, action).await;
        assert_eq!(s.active_tasks().await, 1);

        s.shutdown().await;
        assert_eq!(s.mode(), RunMode::Paused);
        assert_eq!(s.active_tasks().await, 0);
    }
}
