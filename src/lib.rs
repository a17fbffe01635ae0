pub mod modules;

pub use modules::candidates::{Acquisition, exclude_current, sort_by_distance};
pub use modules::controller::{Config, Controller, Offload, Phase};
pub use modules::cursor::TargetCursor;
pub use modules::matcher::{has_lost_signature, is_suitable, pick_first_suitable};
pub use modules::node::{EXTRACT_VERB, ExtractError, Extraction};
pub use modules::ore::{OreKind, Signature};
pub use modules::sim::{NEUTRAL_SIGNATURE, SimNode, SimWorld};
pub use modules::state::{self, RuntimeState, SessionCounters, Status};
pub use modules::wait::{Timeouts, roll_duration, wait_until};
pub use modules::world::{NodeHandle, Position, Region, World};
