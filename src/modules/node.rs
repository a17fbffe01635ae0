//! The extraction lifecycle for one selected node.
//!
//! Sequential phases, terminal on first failure:
//! approach, on-screen confirmation, trigger, activity confirmation,
//! depletion watch. Every phase that has to wait does so through
//! `wait_until` with a freshly randomized timeout, and every refresh of
//! the node is a new lookup at its position. While the depletion watch
//! runs, the cursor is opportunistically parked over the next suitable
//! candidate so the follow-up trigger costs nothing once this node empties.

use std::fmt;

use rand::rngs::StdRng;
use tracing::debug;

use crate::modules::candidates::Acquisition;
use crate::modules::cursor::TargetCursor;
use crate::modules::matcher::{has_lost_signature, pick_first_suitable};
use crate::modules::ore::OreKind;
use crate::modules::wait::{Timeouts, roll_duration, wait_until};
use crate::modules::world::{NodeHandle, World};

/// Menu verb used to trigger extraction.
pub const EXTRACT_VERB: &str = "Mine";

/// Why a lifecycle ended short of a completed extraction. None of these
/// are faults; the controller just tries again next iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractError {
    /// Selection found no workable node this cycle.
    NoSuitableNode,
    /// The direct walk toward an off-screen node failed.
    WalkFailed,
    /// The node never came on-screen inside the bounded wait.
    NeverOnScreen,
    /// The node lost its signature while we were still approaching.
    LostBeforeReady,
    /// The extraction click failed.
    InteractFailed,
    /// The agent never showed extraction activity after the click.
    NeverActive,
    /// The node did not deplete inside the bounded wait.
    NotDepleted,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::NoSuitableNode => write!(f, "no suitable node found"),
            ExtractError::WalkFailed => write!(f, "walk toward node failed"),
            ExtractError::NeverOnScreen => write!(f, "node never came on-screen"),
            ExtractError::LostBeforeReady => write!(f, "node depleted before it could be worked"),
            ExtractError::InteractFailed => write!(f, "extraction click failed"),
            ExtractError::NeverActive => write!(f, "agent never started extracting"),
            ExtractError::NotDepleted => write!(f, "node did not deplete in time"),
        }
    }
}

/// Outcome of the on-screen wait.
enum ScreenWait {
    Visible,
    /// Short-circuited because the node lost its signature first.
    Lost,
    TimedOut,
}

/// One node's lifecycle, owned for a single controller iteration.
pub struct Extraction<'a> {
    node: NodeHandle,
    kind: OreKind,
    acquisition: &'a Acquisition,
    timeouts: &'a Timeouts,
}

impl<'a> Extraction<'a> {
    /// Runs the configured acquisition strategy; `None` means nothing was
    /// workable this cycle.
    pub fn select<W: World>(
        world: &mut W,
        acquisition: &'a Acquisition,
        kind: OreKind,
        timeouts: &'a Timeouts,
    ) -> Option<Self> {
        let node = acquisition.select(world, kind)?;
        debug!(position = ?node.position, %kind, "node selected");
        Some(Self {
            node,
            kind,
            acquisition,
            timeouts,
        })
    }

    pub fn position(&self) -> crate::modules::world::Position {
        self.node.position
    }

    /// Drives the selected node to completion. `Ok` means the node's
    /// resource was observed depleting while we worked it.
    pub fn run<W: World>(
        &self,
        world: &mut W,
        cursor: &mut TargetCursor,
        rng: &mut StdRng,
    ) -> Result<(), ExtractError> {
        if !self.node.on_screen {
            debug!(position = ?self.node.position, "walking to node");
            if !world.walk_direct_path(&self.node) {
                return Err(ExtractError::WalkFailed);
            }
        }

        match self.await_on_screen(world, rng) {
            ScreenWait::Visible => {}
            ScreenWait::Lost => return Err(ExtractError::LostBeforeReady),
            ScreenWait::TimedOut => return Err(ExtractError::NeverOnScreen),
        }

        if !world.interact(&self.node, EXTRACT_VERB) {
            return Err(ExtractError::InteractFailed);
        }
        debug!(position = ?self.node.position, "extraction triggered");

        if !self.await_active(world, rng) {
            return Err(ExtractError::NeverActive);
        }

        if !self.await_depletion(world, cursor, rng) {
            return Err(ExtractError::NotDepleted);
        }
        debug!(position = ?self.node.position, "node depleted");
        Ok(())
    }

    /// Waits for the node to show up on screen. Polls the signature first:
    /// a node that empties while we walk is reported as lost, not as a
    /// timeout, so the caller can tell the two apart.
    fn await_on_screen<W: World>(&self, world: &mut W, rng: &mut StdRng) -> ScreenWait {
        let timeout = roll_duration(rng, self.timeouts.on_screen_ms);
        let mut lost = false;
        let visible = wait_until(
            || {
                world.pause(200, 250);
                if has_lost_signature(&mut *world, self.node.position, self.kind) {
                    lost = true;
                    return true;
                }
                world
                    .nodes_at(self.node.position)
                    .first()
                    .is_some_and(|fresh| fresh.on_screen)
            },
            timeout,
        );
        if lost {
            ScreenWait::Lost
        } else if visible {
            ScreenWait::Visible
        } else {
            ScreenWait::TimedOut
        }
    }

    /// Waits for the agent's activity indicator to confirm extraction.
    fn await_active<W: World>(&self, world: &mut W, rng: &mut StdRng) -> bool {
        let timeout = roll_duration(rng, self.timeouts.active_ms);
        wait_until(
            || {
                world.pause(250, 250);
                world.activity_level() > 0
            },
            timeout,
        )
    }

    /// Waits for the worked node to deplete, pre-hovering the next
    /// candidate on every poll. The hover runs before the depletion check
    /// so the dead time of the extraction animation is spent positioning
    /// the cursor, not after.
    fn await_depletion<W: World>(
        &self,
        world: &mut W,
        cursor: &mut TargetCursor,
        rng: &mut StdRng,
    ) -> bool {
        let timeout = roll_duration(rng, self.timeouts.depletion_ms);
        wait_until(
            || {
                world.pause(600, 600);
                self.hover_next(&mut *world, cursor);
                has_lost_signature(&mut *world, self.node.position, self.kind)
            },
            timeout,
        )
    }

    /// Parks the cursor over the next suitable candidate, if the strategy
    /// has one to offer.
    fn hover_next<W: World>(&self, world: &mut W, cursor: &mut TargetCursor) -> bool {
        let Some(candidates) = self.acquisition.hover_candidates(world, self.node.position) else {
            return false;
        };
        let next = pick_first_suitable(&candidates, self.kind);
        cursor.try_hover(world, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::sim::{SimNode, SimWorld};
    use crate::modules::world::Position;
    use rand::SeedableRng;

    fn fast_timeouts() -> Timeouts {
        Timeouts {
            on_screen_ms: (20, 30),
            active_ms: (20, 30),
            depletion_ms: (40, 60),
            walk_ms: (20, 30),
            deposit_ms: (20, 30),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn full_lifecycle_succeeds_on_depletion() {
        let mut world = SimWorld::default();
        world
            .nodes
            .push(SimNode::with_kind(Position::new(2, 0, 0), OreKind::Tin));
        let strategy = Acquisition::Nearest { radius: 5 };
        let timeouts = fast_timeouts();

        let extraction =
            Extraction::select(&mut world, &strategy, OreKind::Tin, &timeouts).unwrap();
        let result = extraction.run(&mut world, &mut TargetCursor::new(), &mut rng());

        assert_eq!(result, Ok(()));
        assert_eq!(world.inventory, 1);
        assert_eq!(world.interactions.len(), 1);
        assert_eq!(world.interactions[0], (Position::new(2, 0, 0), EXTRACT_VERB.to_string()));
    }

    #[test]
    fn selection_fails_when_nothing_suitable() {
        let mut world = SimWorld::default();
        world.nodes.push(SimNode::depleted(Position::new(2, 0, 0)));
        let strategy = Acquisition::Nearest { radius: 5 };
        let timeouts = fast_timeouts();

        assert!(Extraction::select(&mut world, &strategy, OreKind::Tin, &timeouts).is_none());
    }

    #[test]
    fn walk_failure_stops_before_interaction() {
        let mut world = SimWorld::default();
        let mut node = SimNode::with_kind(Position::new(2, 0, 0), OreKind::Tin);
        node.on_screen = false;
        world.nodes.push(node);
        world.fail_walks = true;
        let strategy = Acquisition::Nearest { radius: 5 };
        let timeouts = fast_timeouts();

        let extraction =
            Extraction::select(&mut world, &strategy, OreKind::Tin, &timeouts).unwrap();
        let result = extraction.run(&mut world, &mut TargetCursor::new(), &mut rng());

        assert_eq!(result, Err(ExtractError::WalkFailed));
        assert!(world.interactions.is_empty()); // no later phase ran
        assert!(world.hovers.is_empty());
    }

    #[test]
    fn node_lost_while_approaching_reports_early_depletion() {
        let mut world = SimWorld::default();
        let mut node = SimNode::with_kind(Position::new(2, 0, 0), OreKind::Tin);
        node.on_screen = false;
        world.nodes.push(node);
        // walking succeeds but the node empties before it is visible
        world.deplete_on_walk = true;
        let strategy = Acquisition::Nearest { radius: 5 };
        let timeouts = fast_timeouts();

        let extraction =
            Extraction::select(&mut world, &strategy, OreKind::Tin, &timeouts).unwrap();
        let result = extraction.run(&mut world, &mut TargetCursor::new(), &mut rng());

        assert_eq!(result, Err(ExtractError::LostBeforeReady));
        assert!(world.interactions.is_empty());
    }

    #[test]
    fn never_on_screen_times_out() {
        let mut world = SimWorld::default();
        let mut node = SimNode::with_kind(Position::new(2, 0, 0), OreKind::Tin);
        node.on_screen = false;
        world.nodes.push(node);
        world.walks_reveal_nodes = false;
        let strategy = Acquisition::Nearest { radius: 5 };
        let timeouts = fast_timeouts();

        let extraction =
            Extraction::select(&mut world, &strategy, OreKind::Tin, &timeouts).unwrap();
        let result = extraction.run(&mut world, &mut TargetCursor::new(), &mut rng());

        assert_eq!(result, Err(ExtractError::NeverOnScreen));
    }

    #[test]
    fn interact_failure_ends_lifecycle() {
        let mut world = SimWorld::default();
        world
            .nodes
            .push(SimNode::with_kind(Position::new(2, 0, 0), OreKind::Tin));
        world.fail_interactions = true;
        let strategy = Acquisition::Nearest { radius: 5 };
        let timeouts = fast_timeouts();

        let extraction =
            Extraction::select(&mut world, &strategy, OreKind::Tin, &timeouts).unwrap();
        let result = extraction.run(&mut world, &mut TargetCursor::new(), &mut rng());

        assert_eq!(result, Err(ExtractError::InteractFailed));
        assert_eq!(world.inventory, 0);
    }

    #[test]
    fn stuck_extraction_times_out_without_depletion() {
        let mut world = SimWorld::default();
        let mut node = SimNode::with_kind(Position::new(2, 0, 0), OreKind::Tin);
        node.extract_polls = u32::MAX; // never finishes
        world.nodes.push(node);
        let strategy = Acquisition::Nearest { radius: 5 };
        let timeouts = fast_timeouts();

        let extraction =
            Extraction::select(&mut world, &strategy, OreKind::Tin, &timeouts).unwrap();
        let result = extraction.run(&mut world, &mut TargetCursor::new(), &mut rng());

        assert_eq!(result, Err(ExtractError::NotDepleted));
        assert_eq!(world.inventory, 0);
    }

    #[test]
    fn nearest_mode_hovers_next_candidate_during_extraction() {
        let mut world = SimWorld::default();
        world
            .nodes
            .push(SimNode::with_kind(Position::new(2, 0, 0), OreKind::Tin));
        world
            .nodes
            .push(SimNode::with_kind(Position::new(3, 0, 0), OreKind::Tin));
        let strategy = Acquisition::Nearest { radius: 5 };
        let timeouts = fast_timeouts();

        let extraction =
            Extraction::select(&mut world, &strategy, OreKind::Tin, &timeouts).unwrap();
        let result = extraction.run(&mut world, &mut TargetCursor::new(), &mut rng());

        assert_eq!(result, Ok(()));
        assert_eq!(world.hovers, vec![Position::new(3, 0, 0)]);
    }

    #[test]
    fn single_fixed_position_never_hovers() {
        let mut world = SimWorld::default();
        world
            .nodes
            .push(SimNode::with_kind(Position::new(2, 0, 0), OreKind::Tin));
        // another perfectly good node nearby must still be ignored
        world
            .nodes
            .push(SimNode::with_kind(Position::new(3, 0, 0), OreKind::Tin));
        let strategy = Acquisition::FixedSingle {
            position: Position::new(2, 0, 0),
        };
        let timeouts = fast_timeouts();

        let extraction =
            Extraction::select(&mut world, &strategy, OreKind::Tin, &timeouts).unwrap();
        let result = extraction.run(&mut world, &mut TargetCursor::new(), &mut rng());

        assert_eq!(result, Ok(()));
        assert!(world.hovers.is_empty());
    }

    #[test]
    fn fixed_set_hovers_nearest_other_node() {
        let mut world = SimWorld::default();
        world
            .nodes
            .push(SimNode::with_kind(Position::new(1, 0, 0), OreKind::Tin));
        world
            .nodes
            .push(SimNode::with_kind(Position::new(4, 0, 0), OreKind::Tin));
        world
            .nodes
            .push(SimNode::with_kind(Position::new(2, 0, 0), OreKind::Tin));
        let strategy = Acquisition::FixedSet {
            positions: vec![
                Position::new(1, 0, 0),
                Position::new(4, 0, 0),
                Position::new(2, 0, 0),
            ],
        };
        let timeouts = fast_timeouts();

        let extraction =
            Extraction::select(&mut world, &strategy, OreKind::Tin, &timeouts).unwrap();
        assert_eq!(extraction.position(), Position::new(1, 0, 0));
        let result = extraction.run(&mut world, &mut TargetCursor::new(), &mut rng());

        assert_eq!(result, Ok(()));
        // next-nearest node after the one being worked
        assert_eq!(world.hovers.first(), Some(&Position::new(2, 0, 0)));
    }
}
