//! A deterministic simulated world.
//!
//! Implements the collaborator seam well enough to drive the whole control
//! loop without a game client: nodes deplete a fixed number of polls after
//! being triggered, optionally respawn, and every externally visible action
//! is recorded so behavior can be asserted on. Used by the CLI dry-run and
//! by the tests; failure toggles script the unhappy paths.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::modules::ore::{OreKind, Signature};
use crate::modules::world::{NodeHandle, Position, Region, World};

/// Signature of an empty husk; in no kind's valid set.
pub const NEUTRAL_SIGNATURE: Signature = 451;

#[derive(Debug, Clone)]
pub struct SimNode {
    pub position: Position,
    pub signatures: Option<Vec<Signature>>,
    pub on_screen: bool,
    /// World polls after triggering before the node empties.
    pub extract_polls: u32,
    respawn_in: Option<(u32, Vec<Signature>)>,
}

impl SimNode {
    pub fn with_kind(position: Position, kind: OreKind) -> Self {
        Self {
            position,
            signatures: Some(kind.signatures().to_vec()),
            on_screen: true,
            extract_polls: 2,
            respawn_in: None,
        }
    }

    pub fn depleted(position: Position) -> Self {
        Self {
            position,
            signatures: Some(vec![NEUTRAL_SIGNATURE]),
            on_screen: true,
            extract_polls: 2,
            respawn_in: None,
        }
    }

    /// A node whose definition cannot be read at all.
    pub fn unreadable(position: Position) -> Self {
        Self {
            position,
            signatures: None,
            on_screen: true,
            extract_polls: 2,
            respawn_in: None,
        }
    }

    fn snapshot(&self) -> NodeHandle {
        NodeHandle::new(self.position, self.signatures.clone(), self.on_screen)
    }
}

pub struct SimWorld {
    pub nodes: Vec<SimNode>,
    pub agent: Position,
    pub activity: i32,
    pub inventory: usize,
    pub capacity: usize,
    pub deposit_point: Position,
    /// Polls until a depleted node refills; zero means never.
    pub respawn_polls: u32,
    /// Sleep for real during pauses (live dry-runs only; tests stay fast).
    pub realtime: bool,

    // failure toggles
    pub fail_walks: bool,
    pub fail_hover: bool,
    pub fail_interactions: bool,
    /// The deposit action moves nothing.
    pub fail_deposits: bool,
    /// Deposits report items moved but the inventory never drains.
    pub sticky_inventory: bool,
    /// Whether a successful walk brings nodes on-screen.
    pub walks_reveal_nodes: bool,
    /// Empty the walked-to node the moment the walk lands.
    pub deplete_on_walk: bool,

    // recorded actions
    pub hovers: Vec<Position>,
    pub interactions: Vec<(Position, String)>,
    pub discards: Vec<Vec<String>>,
    pub deposit_navigations: u32,
    pub deposit_calls: u32,
    pub walk_calls: u32,
    pub pauses: u64,

    extraction: Option<(usize, u32)>,
    rng: StdRng,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            agent: Position::origin(),
            activity: 0,
            inventory: 0,
            capacity: 28,
            deposit_point: Position::new(100, 100, 0),
            respawn_polls: 0,
            realtime: false,
            fail_walks: false,
            fail_hover: false,
            fail_interactions: false,
            fail_deposits: false,
            sticky_inventory: false,
            walks_reveal_nodes: true,
            deplete_on_walk: false,
            hovers: Vec::new(),
            interactions: Vec::new(),
            discards: Vec::new(),
            deposit_navigations: 0,
            deposit_calls: 0,
            walk_calls: 0,
            pauses: 0,
            extraction: None,
            rng: StdRng::seed_from_u64(0),
        }
    }
}

impl SimWorld {
    /// A live-run world: nodes scattered across `work_area`, respawning,
    /// with real sleeps so the loop paces like a session would.
    pub fn live(work_area: Region, kind: OreKind, node_count: usize, seed: u64) -> Self {
        let mut world = SimWorld {
            realtime: true,
            respawn_polls: 20,
            rng: StdRng::seed_from_u64(seed),
            ..SimWorld::default()
        };
        world.agent = work_area.random_point(&mut world.rng);
        for _ in 0..node_count {
            let position = work_area.random_point(&mut world.rng);
            let mut node = SimNode::with_kind(position, kind);
            node.extract_polls = world.rng.gen_range(2..=5);
            world.nodes.push(node);
        }
        world
    }

    fn node_index_at(&self, position: Position) -> Option<usize> {
        self.nodes.iter().position(|node| node.position == position)
    }

    fn deplete(&mut self, index: usize) {
        let node = &mut self.nodes[index];
        let original = node.signatures.clone().unwrap_or_default();
        node.signatures = Some(vec![NEUTRAL_SIGNATURE]);
        if self.respawn_polls > 0 {
            node.respawn_in = Some((self.respawn_polls, original));
        }
    }

    /// Advances simulated time by one poll: extraction progress first,
    /// then respawn countdowns.
    fn tick(&mut self) {
        if let Some((index, polls_left)) = self.extraction {
            if polls_left <= 1 {
                self.deplete(index);
                self.inventory += 1;
                self.activity = 0;
                self.extraction = None;
            } else {
                self.extraction = Some((index, polls_left - 1));
            }
        }

        for index in 0..self.nodes.len() {
            if let Some((left, original)) = self.nodes[index].respawn_in.take() {
                if left <= 1 {
                    self.nodes[index].signatures = Some(original);
                } else {
                    self.nodes[index].respawn_in = Some((left - 1, original));
                }
            }
        }
    }
}

impl World for SimWorld {
    fn find_nodes_near(&mut self, origin: Position, radius: i32) -> Vec<NodeHandle> {
        self.nodes
            .iter()
            .filter(|node| origin.within_range(node.position, radius))
            .map(SimNode::snapshot)
            .collect()
    }

    fn nodes_at(&mut self, position: Position) -> Vec<NodeHandle> {
        self.nodes
            .iter()
            .filter(|node| node.position == position)
            .map(SimNode::snapshot)
            .collect()
    }

    fn agent_position(&mut self) -> Position {
        self.agent
    }

    fn activity_level(&mut self) -> i32 {
        self.activity
    }

    fn hover(&mut self, node: &NodeHandle) -> bool {
        if self.fail_hover {
            return false;
        }
        self.hovers.push(node.position);
        true
    }

    fn interact(&mut self, node: &NodeHandle, verb: &str) -> bool {
        if self.fail_interactions {
            return false;
        }
        self.interactions.push((node.position, verb.to_string()));
        let Some(index) = self.node_index_at(node.position) else {
            return false;
        };
        self.activity = 1;
        self.extraction = Some((index, self.nodes[index].extract_polls.max(1)));
        true
    }

    fn walk_direct_path(&mut self, node: &NodeHandle) -> bool {
        self.walk_calls += 1;
        if self.fail_walks {
            return false;
        }
        if self.deplete_on_walk {
            if let Some(index) = self.node_index_at(node.position) {
                self.deplete(index);
            }
        } else if self.walks_reveal_nodes {
            for node in &mut self.nodes {
                node.on_screen = true;
            }
        }
        true
    }

    fn navigate_to(&mut self, target: Position) -> bool {
        self.agent = target;
        true
    }

    fn navigate_to_deposit(&mut self) -> bool {
        self.deposit_navigations += 1;
        self.agent = self.deposit_point;
        true
    }

    fn inventory_full(&mut self) -> bool {
        self.capacity > 0 && self.inventory >= self.capacity
    }

    fn inventory_count(&mut self) -> usize {
        self.inventory
    }

    fn deposit_all(&mut self) -> usize {
        self.deposit_calls += 1;
        if self.fail_deposits {
            return 0;
        }
        let moved = self.inventory;
        if !self.sticky_inventory {
            self.inventory = 0;
        }
        moved
    }

    fn discard_named(&mut self, names: &[&str]) -> bool {
        self.discards
            .push(names.iter().map(|name| name.to_string()).collect());
        self.inventory = 0;
        true
    }

    fn pause(&mut self, min_ms: u64, max_ms: u64) {
        self.pauses += 1;
        self.tick();
        if self.realtime {
            let ms = if max_ms > min_ms {
                self.rng.gen_range(min_ms..=max_ms)
            } else {
                min_ms
            };
            std::thread::sleep(std::time::Duration::from_millis(ms));
        }
    }
}
