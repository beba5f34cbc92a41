//! Grouped value transform, `map(player, f)` (§4.7).
//!
//! Grounded on `GameCoordinator::attach_hand`'s pattern of dropping the
//! board lock before an arbitrary async callback and re-validating state
//! under a fresh lock once it resolves.

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::Mutex;

use super::cell::{Cell, PlayerId, Position};
use super::BoardInner;

/// Apply `f` to every distinct card value currently on the board, preserving
/// the equality relation among cells (pairwise consistency, I4). The lock is
/// held only while grouping and while committing each group's result; it is
/// never held across `f(v)` itself (§5 suspension point 3).
pub(super) async fn map<F, Fut>(board: &Mutex<BoardInner>, player_id: &PlayerId, mut f: F) -> String
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = String>,
{
    let groups = {
        let inner = board.lock().await;
        group_positions(&inner.cells, inner.cols)
    };

    for (value, positions) in groups {
        let new_value = f(value.clone()).await;

        let mut inner = board.lock().await;
        let mut changed = false;
        for pos in &positions {
            if let Cell::Present {
                value: current, ..
            } = inner.cell_mut(*pos)
            {
                if *current == value && new_value != value {
                    *current = new_value.clone();
                    changed = true;
                }
            }
        }
        if changed {
            inner.changes.signal();
        }
    }

    let inner = board.lock().await;
    inner.snapshot(player_id)
}

/// Scan the grid once and bucket positions by their current value,
/// preserving first-seen order so transform order is deterministic for a
/// given board state.
fn group_positions(cells: &[Cell], cols: usize) -> Vec<(String, Vec<Position>)> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<Position>> = HashMap::new();
    for (idx, cell) in cells.iter().enumerate() {
        if let Cell::Present { value, .. } = cell {
            let bucket = buckets.entry(value.clone()).or_insert_with(|| {
                order.push(value.clone());
                Vec::new()
            });
            bucket.push((idx / cols, idx % cols));
        }
    }
    order
        .into_iter()
        .map(|v| {
            let positions = buckets.remove(&v).unwrap_or_default();
            (v, positions)
        })
        .collect()
}
