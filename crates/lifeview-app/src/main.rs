//! Console host for the Lifeview controller.
//!
//! Loads configuration, connects to the simulation service, and drives a
//! [`Controller`] from lines typed on stdin. Every rendered frame is logged
//! and, when `output.frame_path` is set, written to disk as a PNG.
//!
//! ```text
//! stdin --> Intent --> Controller --> SimulationService (HTTP)
//!                          |
//!                          +--> RasterSurface --> frame watcher --> PNG
//! ```

mod error;
mod intent;
mod status;

use std::path::PathBuf;

use lifeview_client::HttpSimulationService;
use lifeview_core::{Controller, ControllerConfig};
use lifeview_render::{RasterSurface, canvas_size};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::intent::{Intent, USAGE};
use crate::status::status_line;

type App = Controller<HttpSimulationService, RasterSurface>;

/// Application entry point.
///
/// Initializes logging, loads configuration, connects to the simulation
/// service, then reads intents from stdin until `quit`, end of input or
/// Ctrl-C.
///
/// # Errors
///
/// Returns an error if initialization or reading the console fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ControllerConfig::load().map_err(AppError::from)?;

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("lifeview starting");
    info!(
        base_url = config.server.base_url,
        grid_width = config.grid.width,
        grid_height = config.grid.height,
        cell_size = config.display.cell_size,
        evolution_speed_ms = config.pacing.evolution_speed_ms,
        ordering = ?config.ordering,
        "configuration loaded"
    );

    let service = HttpSimulationService::new(&config.server.base_url, config.request_timeout())
        .map_err(AppError::from)?;
    let (width, height) = canvas_size(
        config.grid.width,
        config.grid.height,
        config.display.cell_size,
    );
    let controller = Controller::new(service, RasterSurface::new(width, height), &config)
        .map_err(AppError::from)?;

    controller.start().await;
    let watcher = spawn_frame_watcher(controller.clone(), config.output.frame_path.clone());

    println!("{USAGE}");
    let result = console_loop(&controller).await;

    info!("lifeview shutting down");
    controller.shutdown().await;
    watcher.abort();

    result?;
    Ok(())
}

/// Log every published frame and export it when a frame path is configured.
fn spawn_frame_watcher(controller: App, frame_path: Option<PathBuf>) -> JoinHandle<()> {
    let mut frames: watch::Receiver<_> = controller.frames();
    tokio::spawn(async move {
        while frames.changed().await.is_ok() {
            let info = frames.borrow_and_update().clone();
            info!(
                frame = info.frame,
                generation = info.generation,
                live_cells = info.live_cells,
                species_count = info.species_count,
                mode = %info.mode,
                "frame rendered"
            );
            let Some(path) = &frame_path else {
                continue;
            };
            if let Err(e) = export_frame(&controller, path.clone()).await {
                warn!(path = %path.display(), error = %e, "frame export failed");
            }
        }
        debug!("frame channel closed");
    })
}

/// Write the controller's current surface to `path`.
async fn export_frame(controller: &App, path: PathBuf) -> Result<(), AppError> {
    let surface = controller.with_surface(RasterSurface::clone).await;
    tokio::task::spawn_blocking(move || surface.save_png(&path)).await??;
    Ok(())
}

/// Read intents from stdin until the user quits.
async fn console_loop(controller: &App) -> Result<(), AppError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received");
                return Ok(());
            }
        };
        let Some(line) = line else {
            debug!("stdin closed");
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Intent>() {
            Ok(Intent::Quit) => return Ok(()),
            Ok(intent) => dispatch(controller, intent).await,
            Err(e) => println!("{e}\n{USAGE}"),
        }
    }
}

/// Apply one intent and print its outcome.
async fn dispatch(controller: &App, intent: Intent) {
    match intent {
        Intent::Run => {
            controller.run().await;
            println!("{}", controller.mode());
        }
        Intent::Pause => {
            controller.pause().await;
            println!("{}", controller.mode());
        }
        Intent::Toggle => {
            controller.toggle_run().await;
            println!("{}", controller.mode());
        }
        Intent::Step => report("step", controller.step().await),
        Intent::Reset => report("reset", controller.reset().await),
        Intent::Random => report("random", controller.randomize().await),
        Intent::Cell { row, col } => report("cell", controller.toggle_cell(row, col).await),
        Intent::Click { x, y } => report("click", controller.toggle_cell_at_pixel(x, y).await),
        Intent::Size(px) => println!("cell size {}px", controller.set_cell_size(px).await),
        Intent::Speed(ms) => println!("evolve every {} ms", controller.set_evolution_speed_ms(ms)),
        Intent::Count(count) => {
            let density = controller.set_cell_count(count).await;
            println!("density {:.1}%", density * 100.0);
        }
        Intent::Density(density) => match controller.set_density(density).await {
            Ok(count) => println!("cell count {count}"),
            Err(e) => println!("{e}"),
        },
        Intent::Refresh => controller.refresh().await,
        Intent::Status => {
            let info = controller.frames().borrow().clone();
            println!("{}", status_line(&info, controller.evolution_speed_ms()));
        }
        Intent::Save(path) => match export_frame(controller, path.clone()).await {
            Ok(()) => println!("saved {}", path.display()),
            Err(e) => println!("{e}"),
        },
        Intent::Help => println!("{USAGE}"),
        Intent::Quit => {}
    }
}

fn report(command: &str, ok: bool) {
    if ok {
        println!("{command}: ok");
    } else {
        println!("{command}: failed (see log)");
    }
}
