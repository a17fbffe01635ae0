//! Candidate set construction and the node-acquisition strategies.

use tracing::debug;

use crate::modules::matcher::pick_first_suitable;
use crate::modules::ore::OreKind;
use crate::modules::world::{NodeHandle, Position, World};

/// Removes the node currently being worked from a candidate list, keeping
/// the relative order of the rest.
///
/// Only the first candidate at `current` is dropped, so the result is one
/// shorter whenever the current node is present. If no candidate sits at
/// `current` (the node was already removed from a refreshed query), the
/// list comes back unchanged rather than losing an unrelated entry.
pub fn exclude_current(current: Position, candidates: &[NodeHandle]) -> Vec<NodeHandle> {
    let mut remaining = candidates.to_vec();
    match remaining.iter().position(|node| node.position == current) {
        Some(index) => {
            remaining.remove(index);
        }
        None => debug!(?current, "current node absent from candidates"),
    }
    remaining
}

/// Sorts snapshots nearest-first from `origin`.
pub fn sort_by_distance(origin: Position, mut nodes: Vec<NodeHandle>) -> Vec<NodeHandle> {
    nodes.sort_by_key(|node| origin.distance_sq(node.position));
    nodes
}

/// How the next node to work is acquired. Chosen once at configuration
/// time; the lifecycle never branches on mode beyond what the variant
/// itself encodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Acquisition {
    /// Any suitable node within `radius` of the agent, in discovery order.
    Nearest { radius: i32 },
    /// One fixed position, taken unconditionally if a node stands there.
    FixedSingle { position: Position },
    /// A fixed position list, re-sorted by distance each selection.
    FixedSet { positions: Vec<Position> },
}

impl Acquisition {
    /// Builds the variant a radius/position configuration implies: any
    /// positions win over the radius, one position means the single-node
    /// strategy.
    pub fn from_parts(radius: i32, positions: Vec<Position>) -> Self {
        match positions.len() {
            0 => Acquisition::Nearest { radius },
            1 => Acquisition::FixedSingle {
                position: positions[0],
            },
            _ => Acquisition::FixedSet { positions },
        }
    }

    /// Selects the node to work next, or `None` when nothing suitable is
    /// out there this cycle.
    pub fn select<W: World>(&self, world: &mut W, kind: OreKind) -> Option<NodeHandle> {
        match self {
            Acquisition::Nearest { radius } => {
                let origin = world.agent_position();
                let found = world.find_nodes_near(origin, *radius);
                pick_first_suitable(&found, kind).cloned()
            }
            // No suitability check here: a stale or mid-respawn node at
            // the configured position is caught later by the lifecycle.
            Acquisition::FixedSingle { position } => world.nodes_at(*position).into_iter().next(),
            Acquisition::FixedSet { positions } => {
                let origin = world.agent_position();
                let resolved = resolve_positions(world, positions);
                let sorted = sort_by_distance(origin, resolved);
                pick_first_suitable(&sorted, kind).cloned()
            }
        }
    }

    /// Fresh candidates for pre-hovering while `current` is being worked,
    /// or `None` when re-targeting is pointless (a single fixed node has
    /// nothing else to hover).
    pub fn hover_candidates<W: World>(
        &self,
        world: &mut W,
        current: Position,
    ) -> Option<Vec<NodeHandle>> {
        match self {
            Acquisition::Nearest { radius } => {
                let origin = world.agent_position();
                let found = world.find_nodes_near(origin, *radius);
                Some(exclude_current(current, &found))
            }
            Acquisition::FixedSingle { .. } => None,
            Acquisition::FixedSet { positions } => {
                let origin = world.agent_position();
                let resolved = resolve_positions(world, positions);
                let sorted = sort_by_distance(origin, resolved);
                Some(exclude_current(current, &sorted))
            }
        }
    }
}

/// Fresh lookups for each fixed position; positions with nothing standing
/// on them this cycle are skipped.
fn resolve_positions<W: World>(world: &mut W, positions: &[Position]) -> Vec<NodeHandle> {
    positions
        .iter()
        .filter_map(|position| world.nodes_at(*position).into_iter().next())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::sim::{SimNode, SimWorld};

    fn handle(x: i32) -> NodeHandle {
        NodeHandle::new(Position::new(x, 0, 0), Some(vec![53]), true)
    }

    #[test]
    fn exclude_drops_current_and_keeps_order() {
        let candidates = vec![handle(1), handle(2), handle(3)];
        let rest = exclude_current(Position::new(2, 0, 0), &candidates);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].position, Position::new(1, 0, 0));
        assert_eq!(rest[1].position, Position::new(3, 0, 0));
    }

    #[test]
    fn exclude_with_absent_current_returns_set_unchanged() {
        let candidates = vec![handle(1), handle(2)];
        let rest = exclude_current(Position::new(9, 0, 0), &candidates);
        assert_eq!(rest, candidates);
    }

    #[test]
    fn exclude_removes_only_first_duplicate() {
        let candidates = vec![handle(1), handle(1), handle(2)];
        let rest = exclude_current(Position::new(1, 0, 0), &candidates);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].position, Position::new(1, 0, 0)); // second copy survives
    }

    #[test]
    fn nearest_select_keeps_discovery_order() {
        let mut world = SimWorld::default();
        // farther node first in discovery order; both suitable
        world
            .nodes
            .push(SimNode::with_kind(Position::new(4, 0, 0), OreKind::Tin));
        world
            .nodes
            .push(SimNode::with_kind(Position::new(1, 0, 0), OreKind::Tin));
        let picked = Acquisition::Nearest { radius: 5 }
            .select(&mut world, OreKind::Tin)
            .unwrap();
        assert_eq!(picked.position, Position::new(4, 0, 0));
    }

    #[test]
    fn fixed_single_takes_node_without_matching() {
        let mut world = SimWorld::default();
        world.nodes.push(SimNode::depleted(Position::new(2, 2, 0)));
        let picked = Acquisition::FixedSingle {
            position: Position::new(2, 2, 0),
        }
        .select(&mut world, OreKind::Tin)
        .unwrap();
        assert_eq!(picked.position, Position::new(2, 2, 0));
    }

    #[test]
    fn fixed_single_fails_on_empty_position() {
        let mut world = SimWorld::default();
        let picked = Acquisition::FixedSingle {
            position: Position::new(2, 2, 0),
        }
        .select(&mut world, OreKind::Tin);
        assert!(picked.is_none());
    }

    #[test]
    fn fixed_set_picks_nearest_suitable() {
        let mut world = SimWorld::default();
        world
            .nodes
            .push(SimNode::with_kind(Position::new(6, 0, 0), OreKind::Tin));
        world.nodes.push(SimNode::depleted(Position::new(1, 0, 0)));
        world
            .nodes
            .push(SimNode::with_kind(Position::new(3, 0, 0), OreKind::Tin));
        let positions = vec![
            Position::new(6, 0, 0),
            Position::new(1, 0, 0),
            Position::new(3, 0, 0),
        ];
        let picked = Acquisition::FixedSet { positions }
            .select(&mut world, OreKind::Tin)
            .unwrap();
        // nearest is depleted, so the next-closest suitable node wins
        assert_eq!(picked.position, Position::new(3, 0, 0));
    }

    #[test]
    fn fixed_single_never_offers_hover_candidates() {
        let mut world = SimWorld::default();
        world
            .nodes
            .push(SimNode::with_kind(Position::new(2, 2, 0), OreKind::Tin));
        world
            .nodes
            .push(SimNode::with_kind(Position::new(3, 3, 0), OreKind::Tin));
        let strategy = Acquisition::FixedSingle {
            position: Position::new(2, 2, 0),
        };
        assert!(
            strategy
                .hover_candidates(&mut world, Position::new(2, 2, 0))
                .is_none()
        );
    }

    #[test]
    fn from_parts_maps_counts_to_variants() {
        assert_eq!(
            Acquisition::from_parts(5, vec![]),
            Acquisition::Nearest { radius: 5 }
        );
        assert!(matches!(
            Acquisition::from_parts(5, vec![Position::origin()]),
            Acquisition::FixedSingle { .. }
        ));
        assert!(matches!(
            Acquisition::from_parts(5, vec![Position::origin(), Position::new(1, 0, 0)]),
            Acquisition::FixedSet { .. }
        ));
    }
}
