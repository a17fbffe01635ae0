//! The top-level control loop.
//!
//! Each iteration classifies the agent's location into exactly one
//! macro-phase (work area / deposit area / elsewhere) and runs that
//! phase's branch: extract or offload while working, deposit or walk back
//! while at the facility, and travel otherwise. A failed branch is never
//! fatal; the next iteration observes the world fresh and tries again.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::modules::candidates::Acquisition;
use crate::modules::cursor::TargetCursor;
use crate::modules::node::Extraction;
use crate::modules::ore::OreKind;
use crate::modules::state::SessionCounters;
use crate::modules::wait::{Timeouts, roll_duration, wait_until};
use crate::modules::world::{Position, Region, World};

/// What to do with a full inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Offload {
    /// Navigate to the deposit facility and bank everything.
    Deposit,
    /// Drop the harvested items on the spot.
    Discard,
}

impl std::fmt::Display for Offload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Offload::Deposit => write!(f, "deposit"),
            Offload::Discard => write!(f, "discard"),
        }
    }
}

/// Immutable run configuration, assembled once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub ore: OreKind,
    pub acquisition: Acquisition,
    pub work_area: Region,
    /// Sub-region of the work area used as the navigation target when
    /// walking back; a random point inside it is picked each trip.
    pub work_entrance: Region,
    pub deposit_area: Region,
    pub offload: Offload,
    pub timeouts: Timeouts,
}

/// The macro-phase an iteration ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    InWorkArea,
    InDepositArea,
    Elsewhere,
}

pub struct Controller<W: World> {
    world: W,
    config: Config,
    cursor: TargetCursor,
    rng: StdRng,
    counters: SessionCounters,
}

impl<W: World> Controller<W> {
    pub fn new(world: W, config: Config, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            world,
            config,
            cursor: TargetCursor::new(),
            rng,
            counters: SessionCounters::default(),
        }
    }

    pub fn counters(&self) -> SessionCounters {
        self.counters
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Runs iterations until the optional cap is exhausted; `None` loops
    /// until the process is stopped externally.
    pub fn run(&mut self, iterations: Option<u64>) {
        let mut remaining = iterations;
        loop {
            if let Some(left) = remaining.as_mut() {
                if *left == 0 {
                    break;
                }
                *left -= 1;
            }
            self.step();
        }
    }

    /// One full iteration: pace, classify, run the branch.
    pub fn step(&mut self) -> Phase {
        self.world.pause(100, 100);
        self.counters.iterations += 1;

        let here = self.world.agent_position();
        let phase = self.classify(here);
        debug!(?phase, position = ?here, "controller iteration");

        match phase {
            Phase::InWorkArea => self.work_phase(),
            Phase::InDepositArea => self.deposit_phase(),
            Phase::Elsewhere => self.travel_phase(),
        }
        phase
    }

    /// The two regions are disjoint by configuration, so at most one
    /// containment check fires; elsewhere is the default.
    fn classify(&self, position: Position) -> Phase {
        if self.config.work_area.contains(position) {
            Phase::InWorkArea
        } else if self.config.deposit_area.contains(position) {
            Phase::InDepositArea
        } else {
            Phase::Elsewhere
        }
    }

    fn work_phase(&mut self) {
        if self.world.inventory_full() {
            match self.config.offload {
                Offload::Deposit => {
                    info!("inventory full, heading to deposit");
                    self.bank_run();
                }
                Offload::Discard => {
                    info!(item = self.config.ore.item_name(), "inventory full, discarding");
                    if self.world.discard_named(&[self.config.ore.item_name()]) {
                        self.counters.discards += 1;
                    }
                    self.world.pause(50, 100);
                }
            }
            return;
        }

        let selected = Extraction::select(
            &mut self.world,
            &self.config.acquisition,
            self.config.ore,
            &self.config.timeouts,
        );
        match selected {
            Some(extraction) => {
                self.counters.extractions_attempted += 1;
                match extraction.run(&mut self.world, &mut self.cursor, &mut self.rng) {
                    Ok(()) => {
                        self.counters.extractions_succeeded += 1;
                        info!(position = ?extraction.position(), "extraction complete");
                    }
                    // Ordinary outcome; the next iteration retries.
                    Err(err) => debug!(%err, "extraction ended early"),
                }
            }
            None => debug!("no suitable node this cycle"),
        }
    }

    fn deposit_phase(&mut self) {
        if self.world.inventory_count() > 0 {
            info!("at deposit with items, banking");
            self.deposit();
        } else {
            info!("deposit done, walking back to work area");
            self.walk_to_work();
        }
        self.world.pause(50, 100);
    }

    fn travel_phase(&mut self) {
        if self.world.inventory_full() && self.config.offload == Offload::Deposit {
            info!("inventory full away from work area, heading to deposit");
            self.bank_run();
        } else {
            self.walk_to_work();
            self.world.pause(50, 100);
        }
    }

    /// Navigates to the deposit facility and banks everything.
    fn bank_run(&mut self) {
        if !self.world.navigate_to_deposit() {
            warn!("navigation to deposit failed");
            return;
        }
        self.deposit();
        self.world.pause(50, 100);
    }

    /// Bulk-deposits and waits for the inventory to actually drain; the
    /// deposit action reports items moved, but fullness can lag a refresh
    /// behind.
    fn deposit(&mut self) -> bool {
        let moved = self.world.deposit_all();
        if moved == 0 {
            warn!("deposit moved nothing");
            return false;
        }
        let timeout = roll_duration(&mut self.rng, self.config.timeouts.deposit_ms);
        let drained = wait_until(
            || {
                self.world.pause(100, 150);
                !self.world.inventory_full()
            },
            timeout,
        );
        if drained {
            self.counters.deposits += 1;
            info!(moved, "deposit confirmed");
        } else {
            warn!("inventory still full after deposit");
        }
        drained
    }

    /// Navigates toward a random point in the work entrance and waits to
    /// actually arrive inside the work area.
    fn walk_to_work(&mut self) -> bool {
        let target = self.config.work_entrance.random_point(&mut self.rng);
        debug!(?target, "navigating to work area");
        if !self.world.navigate_to(target) {
            warn!("navigation to work area failed");
            return false;
        }
        let timeout = roll_duration(&mut self.rng, self.config.timeouts.walk_ms);
        wait_until(
            || {
                self.world.pause(200, 300);
                self.config.work_area.contains(self.world.agent_position())
            },
            timeout,
        )
    }
}
