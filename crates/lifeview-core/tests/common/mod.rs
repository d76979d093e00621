//! In-process stand-in for the simulation service.
//!
//! The fake keeps a tiny world (generation counter, live set, species list),
//! records every call, and can be scripted to delay or fail upcoming calls
//! per endpoint. Read replies are captured when the call is issued and
//! delivered after the scripted delay, so a slow read returns the state of
//! the moment it was sent.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lifeview_client::{ClientError, Endpoint, SimulationService};
use lifeview_core::config::ControllerConfig;
use lifeview_types::{
    GenerateCenterRequest, GridReply, SpeciesEntry, SpeciesReply, ToggleCellRequest,
};

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Grid,
    Species,
    Evolve,
    Reset,
    Randomize(f64),
    GenerateCenter(GenerateCenterRequest),
    ToggleCell(ToggleCellRequest),
}

impl Call {
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::Grid => Endpoint::Grid,
            Self::Species => Endpoint::Species,
            Self::Evolve => Endpoint::Evolve,
            Self::Reset => Endpoint::Reset,
            Self::Randomize(_) => Endpoint::Randomize,
            Self::GenerateCenter(_) => Endpoint::GenerateCenter,
            Self::ToggleCell(_) => Endpoint::ToggleCell,
        }
    }
}

#[derive(Debug, Default)]
struct World {
    width: u32,
    height: u32,
    generation: u64,
    live: BTreeSet<(u32, u32)>,
    species: Vec<SpeciesEntry>,
    calls: Vec<Call>,
    delays: HashMap<Endpoint, VecDeque<Duration>>,
    failures: HashMap<Endpoint, u32>,
}

impl World {
    fn begin(&mut self, call: Call) -> (Duration, bool) {
        let endpoint = call.endpoint();
        self.calls.push(call);
        let delay = self
            .delays
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Duration::ZERO);
        let fail = match self.failures.get_mut(&endpoint) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        };
        (delay, fail)
    }

    fn grid_reply(&self) -> GridReply {
        let mut grid = vec![vec![0_u8; self.width as usize]; self.height as usize];
        for (r, c) in &self.live {
            if let Some(cell) = grid.get_mut(*r as usize).and_then(|row| row.get_mut(*c as usize)) {
                *cell = 1;
            }
        }
        GridReply {
            grid,
            generation: self.generation,
            live_cells: self.live.iter().copied().collect(),
        }
    }

    fn fill(&mut self, start: u64, count: u64) {
        let total = u64::from(self.width) * u64::from(self.height);
        for i in 0..count.min(total) {
            let idx = (start + i) % total;
            let row = u32::try_from(idx / u64::from(self.width)).unwrap();
            let col = u32::try_from(idx % u64::from(self.width)).unwrap();
            self.live.insert((row, col));
        }
    }
}

/// Scriptable fake. Clones share the same world.
#[derive(Debug, Clone)]
pub struct FakeService {
    world: Arc<Mutex<World>>,
}

impl FakeService {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            world: Arc::new(Mutex::new(World {
                width,
                height,
                ..World::default()
            })),
        }
    }

    pub fn with_live(self, cells: &[(u32, u32)]) -> Self {
        self.world.lock().unwrap().live.extend(cells.iter().copied());
        self
    }

    pub fn set_generation(&self, generation: u64) {
        self.world.lock().unwrap().generation = generation;
    }

    pub fn set_species(&self, species: Vec<SpeciesEntry>) {
        self.world.lock().unwrap().species = species;
    }

    /// Delay the next call to `endpoint` by `delay`.
    pub fn delay_next(&self, endpoint: Endpoint, delay: Duration) {
        self.world
            .lock()
            .unwrap()
            .delays
            .entry(endpoint)
            .or_default()
            .push_back(delay);
    }

    /// Fail the next `n` calls to `endpoint`.
    pub fn fail_next(&self, endpoint: Endpoint, n: u32) {
        self.world.lock().unwrap().failures.insert(endpoint, n);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.world.lock().unwrap().calls.clone()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.world
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.endpoint() == endpoint)
            .count()
    }

    pub fn generation(&self) -> u64 {
        self.world.lock().unwrap().generation
    }

    fn begin(&self, call: Call) -> (Duration, bool) {
        self.world.lock().unwrap().begin(call)
    }

    fn apply(&self, f: impl FnOnce(&mut World)) {
        f(&mut self.world.lock().unwrap());
    }
}

async fn wait(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

fn transport(endpoint: Endpoint) -> ClientError {
    ClientError::Transport {
        endpoint,
        message: "scripted failure".to_owned(),
    }
}

impl SimulationService for FakeService {
    async fn get_grid(&self) -> Result<GridReply, ClientError> {
        let (delay, fail) = self.begin(Call::Grid);
        let reply = self.world.lock().unwrap().grid_reply();
        wait(delay).await;
        if fail {
            return Err(transport(Endpoint::Grid));
        }
        Ok(reply)
    }

    async fn get_species(&self) -> Result<SpeciesReply, ClientError> {
        let (delay, fail) = self.begin(Call::Species);
        let species = self.world.lock().unwrap().species.clone();
        wait(delay).await;
        if fail {
            return Err(transport(Endpoint::Species));
        }
        let species_count = species.len() as u64;
        Ok(SpeciesReply {
            species,
            species_count,
        })
    }

    async fn evolve(&self) -> Result<(), ClientError> {
        let (delay, fail) = self.begin(Call::Evolve);
        wait(delay).await;
        if fail {
            return Err(ClientError::Rejected {
                endpoint: Endpoint::Evolve,
            });
        }
        self.apply(|w| w.generation += 1);
        Ok(())
    }

    async fn reset(&self) -> Result<(), ClientError> {
        let (delay, fail) = self.begin(Call::Reset);
        wait(delay).await;
        if fail {
            return Err(ClientError::Rejected {
                endpoint: Endpoint::Reset,
            });
        }
        self.apply(|w| {
            w.live.clear();
            w.species.clear();
            w.generation = 0;
        });
        Ok(())
    }

    async fn randomize(&self, density: f64) -> Result<(), ClientError> {
        let (delay, fail) = self.begin(Call::Randomize(density));
        wait(delay).await;
        if fail {
            return Err(ClientError::Rejected {
                endpoint: Endpoint::Randomize,
            });
        }
        self.apply(|w| {
            w.live.clear();
            let total = f64::from(w.width) * f64::from(w.height);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let count = (density * total).round() as u64;
            w.fill(0, count);
        });
        Ok(())
    }

    async fn generate_center(&self, request: GenerateCenterRequest) -> Result<(), ClientError> {
        let (delay, fail) = self.begin(Call::GenerateCenter(request));
        wait(delay).await;
        if fail {
            return Err(ClientError::Rejected {
                endpoint: Endpoint::GenerateCenter,
            });
        }
        self.apply(|w| {
            let start =
                u64::from(request.center_y) * u64::from(w.width) + u64::from(request.center_x);
            w.fill(start, request.count);
        });
        Ok(())
    }

    async fn toggle_cell(&self, request: ToggleCellRequest) -> Result<(), ClientError> {
        let (delay, fail) = self.begin(Call::ToggleCell(request));
        wait(delay).await;
        if fail {
            return Err(ClientError::Rejected {
                endpoint: Endpoint::ToggleCell,
            });
        }
        self.apply(|w| {
            let cell = (request.x, request.y);
            if !w.live.remove(&cell) {
                w.live.insert(cell);
            }
        });
        Ok(())
    }
}

/// A valid config for a `width x height` grid with default pacing.
pub fn config(width: u32, height: u32) -> ControllerConfig {
    let mut config = ControllerConfig::default();
    config.grid.width = width;
    config.grid.height = height;
    config
}

/// Species entry helper.
pub fn entry(stage: i32, cells: &[(u32, u32)]) -> SpeciesEntry {
    SpeciesEntry {
        stage,
        group: cells.to_vec(),
        survival_time: None,
        evolution_progress: None,
    }
}
