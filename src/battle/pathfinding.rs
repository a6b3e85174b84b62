//! Breadth-first pathfinding for the arena
//!
//! Every step costs the same, so BFS gives shortest paths. Units only ever
//! need the first step toward their target, so that is all this returns.

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};

use crate::battle::hex::HexCoord;

/// First step from `from` on a shortest path to `target`
///
/// Search is restricted to `valid`. Hexes in `blocked` are impassable except
/// `target` itself, so a unit can always path into contact with an occupied
/// target. Returns `None` if `from == target` or the target is unreachable.
///
/// Neighbors are expanded in `HexDirection::ALL` order, so among equal-length
/// paths the result is always the same for the same inputs.
pub fn bfs_next_step(
    from: HexCoord,
    target: HexCoord,
    blocked: &AHashSet<HexCoord>,
    valid: &AHashSet<HexCoord>,
) -> Option<HexCoord> {
    if from == target || !valid.contains(&target) {
        return None;
    }

    let mut came_from: AHashMap<HexCoord, HexCoord> = AHashMap::new();
    let mut frontier = VecDeque::new();
    frontier.push_back(from);
    came_from.insert(from, from);

    while let Some(current) = frontier.pop_front() {
        for neighbor in current.neighbors() {
            if came_from.contains_key(&neighbor) || !valid.contains(&neighbor) {
                continue;
            }
            if neighbor != target && blocked.contains(&neighbor) {
                continue;
            }

            came_from.insert(neighbor, current);
            if neighbor == target {
                return Some(first_step(&came_from, from, target));
            }
            frontier.push_back(neighbor);
        }
    }

    None
}

/// Walk the parent chain back from `target` to the hex right after `from`
fn first_step(came_from: &AHashMap<HexCoord, HexCoord>, from: HexCoord, target: HexCoord) -> HexCoord {
    let mut step = target;
    while let Some(&prev) = came_from.get(&step) {
        if prev == from {
            break;
        }
        step = prev;
    }
    step
}
