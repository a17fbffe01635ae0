//! Node suitability checks.
//!
//! A node is worth working iff its current signature set intersects the
//! sought kind's valid set. Matching is intersection, not equality: a node
//! in a mixed state exposes several signatures at once and matches if any
//! one of them is valid. An unreadable definition fails closed.

use crate::modules::ore::OreKind;
use crate::modules::world::{NodeHandle, Position, World};

/// True when `node` currently has `kind`'s resource available.
pub fn is_suitable(node: &NodeHandle, kind: OreKind) -> bool {
    match &node.signatures {
        Some(signatures) if !signatures.is_empty() => signatures
            .iter()
            .any(|signature| kind.signatures().contains(signature)),
        _ => false,
    }
}

/// First candidate (lowest index) that matches `kind`, if any.
///
/// Order sensitivity is deliberate: radius queries arrive in discovery
/// order, so a caller that wants nearest-first matching must sort before
/// calling.
pub fn pick_first_suitable(candidates: &[NodeHandle], kind: OreKind) -> Option<&NodeHandle> {
    candidates.iter().find(|node| is_suitable(node, kind))
}

/// Re-fetches the node at `position` and reports whether its resource is
/// gone: either nothing stands there anymore, or whatever does no longer
/// matches `kind`.
///
/// Before the node is triggered this reads as "lost the target"; after,
/// it is the completion signal.
pub fn has_lost_signature<W: World>(world: &mut W, position: Position, kind: OreKind) -> bool {
    match world.nodes_at(position).first() {
        Some(node) => !is_suitable(node, kind),
        None => true,
    }
}
