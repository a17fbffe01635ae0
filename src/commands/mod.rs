use std::str::FromStr;

use clap::{Parser, Subcommand};
use prospector::{
    Acquisition, Config, Controller, Offload, OreKind, Position, Region, SimWorld, Timeouts,
    state::{self, Status},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "prospector",
    version,
    about = "Autonomous ore-harvesting loop (select, extract, offload)",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize local prospector state
    Init,
    /// Run the harvesting loop against the simulated world
    Start {
        /// Ore kind to harvest
        #[arg(long, default_value_t = OreKind::Tin, value_enum)]
        ore: OreKind,
        /// Search radius for nearest-node acquisition
        #[arg(short = 'r', long, default_value_t = 5)]
        radius: i32,
        /// Fixed node position as x,y,z (repeatable; overrides --radius)
        #[arg(short = 'n', long = "node", value_name = "POS")]
        nodes: Vec<PositionArg>,
        /// Work area corners as x1,y1,z1:x2,y2,z2
        #[arg(long, default_value = "3219,3144,0:3230,3153,0")]
        work_area: RegionArg,
        /// Work entrance corners (navigation target when returning)
        #[arg(long, default_value = "3224,3149,0:3228,3150,0")]
        work_entrance: RegionArg,
        /// Deposit area corners
        #[arg(long, default_value = "3250,3160,0:3257,3166,0")]
        deposit_area: RegionArg,
        /// What to do with a full inventory
        #[arg(long, default_value_t = Offload::Deposit, value_enum)]
        offload: Offload,
        /// Iterations to run (omit for continuous)
        #[arg(short = 'i', long)]
        iterations: Option<u64>,
        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Inventory capacity of the simulated agent
        #[arg(long, default_value_t = 28)]
        capacity: usize,
        /// Simulated nodes scattered across the work area
        #[arg(long, default_value_t = 6)]
        sim_nodes: usize,
    },
    /// Show runtime status
    Status,
    /// Mark the runtime as stopped
    Stop,
}

/// "x,y,z" coordinate argument.
#[derive(Clone, Debug)]
pub struct PositionArg(pub Position);

impl FromStr for PositionArg {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = input.split(',').collect();
        if parts.len() != 3 {
            return Err("position requires x,y,z e.g. 3221,3146,0".into());
        }
        let parse = |token: &str, axis: &str| {
            token
                .trim()
                .parse::<i32>()
                .map_err(|_| format!("{} must be an integer", axis))
        };
        Ok(PositionArg(Position::new(
            parse(parts[0], "x")?,
            parse(parts[1], "y")?,
            parse(parts[2], "z")?,
        )))
    }
}

/// "x1,y1,z1:x2,y2,z2" region argument (any two opposite corners).
#[derive(Clone, Debug)]
pub struct RegionArg(pub Region);

impl FromStr for RegionArg {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (a, b) = input
            .split_once(':')
            .ok_or("region requires corner:corner e.g. 0,0,0:10,10,0")?;
        let a = PositionArg::from_str(a)?;
        let b = PositionArg::from_str(b)?;
        Ok(RegionArg(Region::new(a.0, b.0)))
    }
}

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn dispatch(command: Command) -> Result<(), String> {
    match command {
        Command::Init => run_init(),
        Command::Start {
            ore,
            radius,
            nodes,
            work_area,
            work_entrance,
            deposit_area,
            offload,
            iterations,
            seed,
            capacity,
            sim_nodes,
        } => run_start(StartArgs {
            ore,
            radius,
            nodes,
            work_area: work_area.0,
            work_entrance: work_entrance.0,
            deposit_area: deposit_area.0,
            offload,
            iterations,
            seed,
            capacity,
            sim_nodes,
        }),
        Command::Status => run_status(),
        Command::Stop => run_stop(),
    }
}

struct StartArgs {
    ore: OreKind,
    radius: i32,
    nodes: Vec<PositionArg>,
    work_area: Region,
    work_entrance: Region,
    deposit_area: Region,
    offload: Offload,
    iterations: Option<u64>,
    seed: Option<u64>,
    capacity: usize,
    sim_nodes: usize,
}

fn run_init() -> Result<(), String> {
    state::init_state().map_err(|e| e.to_string())?;
    println!(
        "Initialized state at {}",
        state::state_file_path().display()
    );
    Ok(())
}

fn run_status() -> Result<(), String> {
    match state::load_state().map_err(|e| e.to_string())? {
        None => {
            println!("Status: not initialized. Run `prospector init`.");
        }
        Some(state) => {
            let counters = state.counters;
            println!(
                "Status: {:?} | iterations={} | extracted={}/{} | deposits={} | discards={} | message={}",
                state.status,
                counters.iterations,
                counters.extractions_succeeded,
                counters.extractions_attempted,
                counters.deposits,
                counters.discards,
                state.message.unwrap_or_else(|| "-".into())
            );
        }
    }
    Ok(())
}

fn run_stop() -> Result<(), String> {
    let current = state::load_state().map_err(|e| e.to_string())?;
    let Some(prev) = current else {
        return Err("Not initialized. Run `prospector init` first.".into());
    };
    let updated = state::set_status(
        Status::Stopped,
        prev.counters,
        Some("stopped by user".into()),
    )
    .map_err(|e| e.to_string())?;
    println!(
        "Stopped. iterations={} extracted={}",
        updated.counters.iterations, updated.counters.extractions_succeeded
    );
    Ok(())
}

fn run_start(args: StartArgs) -> Result<(), String> {
    if !args.work_area.contains(args.work_entrance.min)
        || !args.work_area.contains(args.work_entrance.max)
    {
        return Err("work entrance must lie inside the work area".into());
    }
    if args.work_area.intersects(args.deposit_area) {
        return Err("work area and deposit area must be disjoint".into());
    }

    if state::load_state().map_err(|e| e.to_string())?.is_none() {
        let initialized = state::init_state().map_err(|e| e.to_string())?;
        println!(
            "State not found; initialized new state at {} (status={:?})",
            state::state_file_path().display(),
            initialized.status
        );
    }

    let positions: Vec<Position> = args.nodes.iter().map(|arg| arg.0).collect();
    let acquisition = Acquisition::from_parts(args.radius, positions);
    let config = Config {
        ore: args.ore,
        acquisition,
        work_area: args.work_area,
        work_entrance: args.work_entrance,
        deposit_area: args.deposit_area,
        offload: args.offload,
        timeouts: Timeouts::default(),
    };

    let mut world = SimWorld::live(
        args.work_area,
        args.ore,
        args.sim_nodes,
        args.seed.unwrap_or_else(rand::random),
    );
    world.capacity = args.capacity.max(1);
    world.deposit_point = Position::new(
        (args.deposit_area.min.x + args.deposit_area.max.x) / 2,
        (args.deposit_area.min.y + args.deposit_area.max.y) / 2,
        args.deposit_area.min.z,
    );

    println!(
        "Harvesting {} ({} simulated node(s), capacity {}, offload {})",
        args.ore, args.sim_nodes, world.capacity, args.offload
    );

    let mut controller = Controller::new(world, config, args.seed);
    state::set_status(
        Status::Running,
        controller.counters(),
        Some("harvest loop running".into()),
    )
    .map_err(|e| e.to_string())?;

    let mut remaining = args.iterations;
    loop {
        if let Some(left) = remaining.as_mut() {
            if *left == 0 {
                break;
            }
            *left -= 1;
        }
        let phase = controller.step();
        state::set_status(
            Status::Running,
            controller.counters(),
            Some(format!("running, last phase {:?}", phase)),
        )
        .map_err(|e| e.to_string())?;
    }

    let counters = controller.counters();
    state::set_status(
        Status::Stopped,
        counters,
        Some(format!("completed {} iteration(s)", counters.iterations)),
    )
    .map_err(|e| e.to_string())?;
    println!(
        "Done. iterations={} extracted={}/{} deposits={} discards={}",
        counters.iterations,
        counters.extractions_succeeded,
        counters.extractions_attempted,
        counters.deposits,
        counters.discards
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_arg_parses_coordinates() {
        let arg = PositionArg::from_str("3221, 3146, 0").unwrap();
        assert_eq!(arg.0, Position::new(3221, 3146, 0));
    }

    #[test]
    fn position_arg_rejects_bad_input() {
        assert!(PositionArg::from_str("1,2").is_err());
        assert!(PositionArg::from_str("a,b,c").is_err());
    }

    #[test]
    fn region_arg_parses_and_normalizes() {
        let arg = RegionArg::from_str("10,5,0:2,9,0").unwrap();
        assert_eq!(arg.0.min, Position::new(2, 5, 0));
        assert_eq!(arg.0.max, Position::new(10, 9, 0));
    }

    #[test]
    fn region_arg_requires_two_corners() {
        assert!(RegionArg::from_str("1,2,3").is_err());
    }
}
