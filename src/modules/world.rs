//! World value types and the collaborator seam.
//!
//! The control core never talks to the game client directly: everything it
//! needs from the outside (object queries, cursor movement, interaction,
//! navigation, inventory operations, humanized pacing) goes through the
//! [`World`] trait. A world implementation may NOT be assumed to hand out
//! stable entity identities; two handles at the same position are the same
//! node, and a handle is only trusted for the refresh cycle that produced it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::modules::ore::Signature;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn origin() -> Self {
        Self { x: 0, y: 0, z: 0 }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Chebyshev containment: true when `other` is within `range` on every axis.
    pub fn within_range(self, other: Position, range: i32) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();
        dx <= range && dy <= range && dz <= range
    }

    /// Squared euclidean distance, used for nearest-first ordering.
    pub fn distance_sq(self, other: Position) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }
}

/// An axis-aligned box of world coordinates, inclusive on all sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub min: Position,
    pub max: Position,
}

impl Region {
    /// Builds a region from any two opposite corners.
    pub fn new(a: Position, b: Position) -> Self {
        Self {
            min: Position::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Position::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn contains(&self, p: Position) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    /// True when the two boxes share at least one coordinate.
    pub fn intersects(&self, other: Region) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    /// A uniformly random point inside the region, on the floor plane.
    pub fn random_point(&self, rng: &mut impl Rng) -> Position {
        Position {
            x: rng.gen_range(self.min.x..=self.max.x),
            y: rng.gen_range(self.min.y..=self.max.y),
            z: self.min.z,
        }
    }
}

/// A point-in-time snapshot of one world entity.
///
/// Identity is the position; the signature set and visibility are only
/// valid for the refresh that produced the handle. `signatures: None`
/// means the entity's definition could not be read at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeHandle {
    pub position: Position,
    pub signatures: Option<Vec<Signature>>,
    pub on_screen: bool,
}

impl NodeHandle {
    pub fn new(position: Position, signatures: Option<Vec<Signature>>, on_screen: bool) -> Self {
        Self {
            position,
            signatures,
            on_screen,
        }
    }
}

/// Everything the control core consumes from its collaborators.
///
/// A world provides:
/// - Entity queries by radius and by exact position (fresh snapshots)
/// - Agent state reads (position, activity level, inventory)
/// - Input actions (hover, interact-with-verb)
/// - Navigation (direct walk toward an entity, pathing to a coordinate
///   or to the deposit facility)
/// - Humanized pacing (`pause` sleeps a random duration in range)
///
/// A world does NOT provide:
/// - Candidate ordering or suitability decisions (core's job)
/// - Timeout bookkeeping (core's job, through `wait_until`)
///
/// Every action returns plain success/failure; a `false` is an ordinary
/// outcome the core recovers from on its next iteration, never a fault.
pub trait World {
    /// Fresh snapshots of all harvestable nodes within `radius` of
    /// `origin`, in discovery order (not distance-sorted).
    fn find_nodes_near(&mut self, origin: Position, radius: i32) -> Vec<NodeHandle>;

    /// Fresh snapshots of the nodes at exactly `position`.
    fn nodes_at(&mut self, position: Position) -> Vec<NodeHandle>;

    fn agent_position(&mut self) -> Position;

    /// Current animation/activity indicator; `> 0` while the agent is
    /// performing an action.
    fn activity_level(&mut self) -> i32;

    /// Pre-positions the cursor over the node without interacting.
    fn hover(&mut self, node: &NodeHandle) -> bool;

    /// Clicks the node with the given menu verb.
    fn interact(&mut self, node: &NodeHandle, verb: &str) -> bool;

    /// Walks a straight path toward an off-screen node.
    fn walk_direct_path(&mut self, node: &NodeHandle) -> bool;

    /// Full pathfinding toward a coordinate.
    fn navigate_to(&mut self, target: Position) -> bool;

    /// Full pathfinding toward the nearest deposit facility.
    fn navigate_to_deposit(&mut self) -> bool;

    fn inventory_full(&mut self) -> bool;

    fn inventory_count(&mut self) -> usize;

    /// Deposits the whole inventory; returns the number of items moved.
    fn deposit_all(&mut self) -> usize;

    /// Drops every inventory item matching one of `names`.
    fn discard_named(&mut self, names: &[&str]) -> bool;

    /// Sleeps a random duration between `min_ms` and `max_ms`.
    fn pause(&mut self, min_ms: u64, max_ms: u64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn region_normalizes_corners() {
        let region = Region::new(Position::new(10, 5, 0), Position::new(2, 9, 0));
        assert_eq!(region.min, Position::new(2, 5, 0));
        assert_eq!(region.max, Position::new(10, 9, 0));
    }

    #[test]
    fn region_contains_is_inclusive() {
        let region = Region::new(Position::new(0, 0, 0), Position::new(4, 4, 0));
        assert!(region.contains(Position::new(0, 0, 0)));
        assert!(region.contains(Position::new(4, 4, 0)));
        assert!(!region.contains(Position::new(5, 4, 0)));
        assert!(!region.contains(Position::new(2, 2, 1))); // wrong plane
    }

    #[test]
    fn intersects_detects_partial_overlap() {
        let a = Region::new(Position::new(0, 0, 0), Position::new(10, 10, 0));
        // min corner outside `a`, extent reaching into it
        let overlapping = Region::new(Position::new(-5, -5, 0), Position::new(2, 2, 0));
        assert!(a.intersects(overlapping));
        assert!(overlapping.intersects(a));

        let disjoint = Region::new(Position::new(20, 20, 0), Position::new(25, 25, 0));
        assert!(!a.intersects(disjoint));

        let wrong_plane = Region::new(Position::new(0, 0, 1), Position::new(10, 10, 1));
        assert!(!a.intersects(wrong_plane));
    }

    #[test]
    fn random_point_stays_inside() {
        let region = Region::new(Position::new(3219, 3144, 0), Position::new(3230, 3153, 0));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            assert!(region.contains(region.random_point(&mut rng)));
        }
    }

    #[test]
    fn distance_sq_orders_by_closeness() {
        let origin = Position::origin();
        assert!(
            origin.distance_sq(Position::new(1, 1, 0)) < origin.distance_sq(Position::new(3, 0, 0))
        );
    }
}
