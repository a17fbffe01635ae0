//! Cursor pre-positioning memo.
//!
//! Remembers the last node the cursor was parked over so the same node is
//! never re-hovered back to back. Purely a latency optimization: losing or
//! resetting the memo costs one redundant hover at worst.

use tracing::debug;

use crate::modules::world::{NodeHandle, Position, World};

#[derive(Debug, Default)]
pub struct TargetCursor {
    last: Option<Position>,
}

impl TargetCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_position(&self) -> Option<Position> {
        self.last
    }

    /// Hovers the cursor over `node`, unless there is no node or the
    /// cursor is already parked on it. The memo is updated only when the
    /// hover action actually succeeds.
    pub fn try_hover<W: World>(&mut self, world: &mut W, node: Option<&NodeHandle>) -> bool {
        let Some(node) = node else {
            return false;
        };

        if self.last == Some(node.position) {
            debug!(position = ?node.position, "same node, cursor stays");
            return false;
        }

        world.pause(450, 550);

        if !world.hover(node) {
            return false;
        }

        debug!(position = ?node.position, "hovering next node");
        self.last = Some(node.position);
        true
    }
}
