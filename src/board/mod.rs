//! The board concurrency engine (§2): one logical mutex shared by the card
//! grid, player registry, waiter queues, and change set, exposing the four
//! operations `look`, `flip`, `map`, `watch`.
//!
//! Dependency order, leaves first: [`cell`] → [`waiters`] / [`watch`] →
//! [`player`] → [`flip`] → [`map`], matching §2's stated build order.

pub mod cell;
pub mod errors;
pub mod flip;
pub mod grammar;
pub mod map;
pub mod player;
pub mod waiters;
pub mod watch;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::instrument;

use cell::{Cell, Position};
use errors::{BoardCreationError, FlipError};
use player::PlayerRegistry;
use waiters::WaiterQueues;
use watch::ChangeSet;

const LOG_TARGET: &str = "memory_scramble_board::board";

/// All board state protected by one logical lock (§5 "Shared-resource
/// policy"). Per-cell or per-player locks are deliberately not used: P2/P3
/// span the registry and the grid at once.
pub struct BoardInner {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    players: PlayerRegistry,
    waiters: WaiterQueues,
    changes: ChangeSet,
}

impl BoardInner {
    fn in_range(&self, pos: Position) -> bool {
        pos.0 < self.rows && pos.1 < self.cols
    }

    fn idx(&self, pos: Position) -> usize {
        pos.0 * self.cols + pos.1
    }

    fn cell(&self, pos: Position) -> &Cell {
        &self.cells[self.idx(pos)]
    }

    fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        let idx = self.idx(pos);
        &mut self.cells[idx]
    }

    fn set_cell(&mut self, pos: Position, cell: Cell) {
        let idx = self.idx(pos);
        self.cells[idx] = cell;
    }

    fn snapshot(&self, player_id: &str) -> String {
        grammar::render(self.rows, self.cols, &self.cells, player_id)
    }
}

/// A shared, cloneable handle to one game board. Cloning shares the same
/// underlying state (`Arc`), the way `dashmap::DashMap` handles are cloned
/// around the rest of this crate's CLI layer.
#[derive(Clone)]
pub struct Board {
    inner: Arc<Mutex<BoardInner>>,
}

impl Board {
    /// Construct a fresh board from `(rows, cols, values)` (§3 "Board",
    /// §6 "Board input"). All cells start `Present`, face-down, uncontrolled.
    pub fn new(rows: usize, cols: usize, values: Vec<String>) -> Result<Self, BoardCreationError> {
        if rows == 0 || cols == 0 {
            return Err(BoardCreationError::EmptyDimensions { rows, cols });
        }
        let expected = rows * cols;
        if values.len() != expected {
            return Err(BoardCreationError::WrongValueCount {
                rows,
                cols,
                expected,
                found: values.len(),
            });
        }
        for (index, value) in values.iter().enumerate() {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(BoardCreationError::InvalidValue { index });
            }
        }

        let cells = values.into_iter().map(Cell::new_face_down).collect();
        let inner = BoardInner {
            rows,
            cols,
            cells,
            players: PlayerRegistry::new(),
            waiters: WaiterQueues::new(),
            changes: ChangeSet::new(),
        };
        Ok(Board {
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    /// Board dimensions, for callers that need to bound coordinates (e.g.
    /// the CLI simulator picking random cells) without a full snapshot.
    pub async fn dimensions(&self) -> (usize, usize) {
        let inner = self.inner.lock().await;
        (inner.rows, inner.cols)
    }

    /// Pure read (§4.1). Takes the lock, copies out a snapshot, releases it;
    /// never suspends.
    #[instrument(target = LOG_TARGET, skip(self))]
    pub async fn look(&self, player_id: &str) -> String {
        let mut inner = self.inner.lock().await;
        inner.players.get_or_create(player_id);
        inner.snapshot(player_id)
    }

    /// The flip coordinator (§4.2). May suspend once on a contested cell.
    #[instrument(target = LOG_TARGET, skip(self))]
    pub async fn flip(&self, player_id: &str, r: usize, c: usize) -> Result<String, FlipError> {
        let player_id = player_id.to_string();
        flip::flip(&self.inner, &player_id, (r, c)).await
    }

    /// Grouped value transform (§4.7). Suspends once per distinct value
    /// while `f` runs with the lock released.
    #[instrument(target = LOG_TARGET, skip(self, f))]
    pub async fn map<F, Fut>(&self, player_id: &str, f: F) -> String
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = String>,
    {
        let player_id = player_id.to_string();
        map::map(&self.inner, &player_id, f).await
    }

    /// Registers a change watcher and suspends until a state-observable
    /// change occurs (§4.8).
    #[instrument(target = LOG_TARGET, skip(self))]
    pub async fn watch(&self, player_id: &str) -> String {
        let player_id = player_id.to_string();
        watch::watch(&self.inner, &player_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alternating_board(rows: usize, cols: usize) -> Board {
        let values = (0..rows * cols)
            .map(|i| if i % 2 == 0 { "A".to_string() } else { "B".to_string() })
            .collect();
        Board::new(rows, cols, values).unwrap()
    }

    #[tokio::test]
    async fn look_is_idempotent_and_side_effect_free() {
        let board = alternating_board(2, 2);
        let first = board.look("alice").await;
        let second = board.look("alice").await;
        assert_eq!(first, second);
        assert_eq!(first, "2x2\ndown\ndown\ndown\ndown\n");
    }

    #[tokio::test]
    async fn basic_match_clears_both_cells() {
        let board = Board::new(
            1,
            3,
            vec!["A".to_string(), "B".to_string(), "A".to_string()],
        )
        .unwrap();
        let snap = board.flip("alice", 0, 0).await.unwrap();
        assert_eq!(snap, "1x3\nmy A\ndown\ndown\n");

        let snap = board.flip("alice", 0, 2).await.unwrap();
        assert_eq!(snap, "1x3\nmy A\ndown\nmy A\n");

        // Starting a new turn runs cleanup first, removing the matched pair.
        let snap = board.flip("alice", 0, 1).await.unwrap();
        assert_eq!(snap, "1x3\nnone\nmy B\nnone\n");
    }

    #[tokio::test]
    async fn no_match_flips_back_down_on_next_turn() {
        let board = Board::new(
            1,
            3,
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
        )
        .unwrap();
        board.flip("alice", 0, 0).await.unwrap();
        let snap = board.flip("alice", 0, 1).await.unwrap();
        assert_eq!(snap, "1x3\nup A\nup B\ndown\n");

        let snap = board.flip("alice", 0, 2).await.unwrap();
        assert_eq!(snap, "1x3\ndown\ndown\nmy C\n");
    }

    #[tokio::test]
    async fn second_flip_of_own_first_card_is_controlled_error() {
        let board = Board::new(1, 2, vec!["A".to_string(), "B".to_string()]).unwrap();
        board.flip("alice", 0, 0).await.unwrap();
        let err = board.flip("alice", 0, 0).await.unwrap_err();
        assert_eq!(err, FlipError::Controlled((0, 0)));
    }

    #[tokio::test]
    async fn out_of_range_is_rejected() {
        let board = Board::new(1, 1, vec!["A".to_string()]).unwrap();
        let err = board.flip("alice", 5, 5).await.unwrap_err();
        assert_eq!(err, FlipError::OutOfRange((5, 5)));
    }

    #[tokio::test]
    async fn controlled_flip_suspends_until_released() {
        let board = alternating_board(1, 4);
        board.flip("alice", 0, 0).await.unwrap();

        let board2 = board.clone();
        let bob = tokio::spawn(async move { board2.flip("bob", 0, 0).await });

        tokio::task::yield_now().await;
        // Alice's first card does not match her second, releasing (0,0).
        board.flip("alice", 0, 1).await.unwrap();

        let snap = bob.await.unwrap().unwrap();
        assert!(snap.starts_with("1x4\nmy A\n"));
    }

    #[tokio::test]
    async fn map_preserves_matching_relation() {
        let board = Board::new(
            1,
            4,
            vec!["A".to_string(), "B".to_string(), "A".to_string(), "B".to_string()],
        )
        .unwrap();
        let _ = board.map("alice", |v| async move { v.to_lowercase() }).await;

        let snap = board.flip("alice", 0, 0).await.unwrap();
        assert_eq!(snap, "1x4\nmy a\ndown\ndown\ndown\n");
        let snap = board.flip("alice", 0, 2).await.unwrap();
        assert_eq!(snap, "1x4\nmy a\ndown\nmy a\ndown\n");
    }

    #[tokio::test]
    async fn waiters_are_served_in_fifo_order() {
        let board = alternating_board(1, 4);
        board.flip("alice", 0, 0).await.unwrap();

        let b1 = board.clone();
        let bob = tokio::spawn(async move { b1.flip("bob", 0, 0).await });
        tokio::task::yield_now().await;
        let c1 = board.clone();
        let carol = tokio::spawn(async move { c1.flip("carol", 0, 0).await });
        tokio::task::yield_now().await;

        // Alice releases (0,0); bob, first in the queue, should acquire it.
        board.flip("alice", 0, 1).await.unwrap();
        let bob_snap = bob.await.unwrap().unwrap();
        assert!(bob_snap.starts_with("1x4\nmy A\n"));

        // Bob's own turn eventually releases (0,0) again (non-matching second
        // flip), which should wake carol, not re-serve anyone out of order.
        board.flip("bob", 0, 1).await.unwrap();
        let carol_snap = carol.await.unwrap().unwrap();
        assert!(carol_snap.starts_with("1x4\nmy A\n"));
    }

    #[tokio::test]
    async fn waiter_is_woken_when_its_target_is_removed_instead() {
        let board = Board::new(
            1,
            4,
            vec!["A".to_string(), "A".to_string(), "B".to_string(), "B".to_string()],
        )
        .unwrap();
        board.flip("alice", 0, 0).await.unwrap();
        // Matching second flip; the pair is not actually removed from the
        // grid until cleanup runs at the start of alice's next turn.
        board.flip("alice", 0, 1).await.unwrap();

        let bob_board = board.clone();
        let bob = tokio::spawn(async move { bob_board.flip("bob", 0, 0).await });
        tokio::task::yield_now().await;

        // Starting a new turn runs cleanup, which removes the matched pair
        // and must wake bob's queued wait on the now-removed (0,0) rather
        // than leaving it to hang.
        board.flip("alice", 0, 2).await.unwrap();

        let err = bob.await.unwrap().unwrap_err();
        assert_eq!(err, FlipError::NoCard((0, 0)));
    }

    #[tokio::test]
    async fn watch_wakes_on_face_up_change() {
        let board = alternating_board(1, 2);
        let watcher = board.clone();
        let handle = tokio::spawn(async move { watcher.watch("alice").await });

        tokio::task::yield_now().await;
        board.flip("bob", 0, 0).await.unwrap();

        let snap = handle.await.unwrap();
        assert_eq!(snap, "1x2\nup A\ndown\n");
    }
}
