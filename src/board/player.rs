//! Per-player turn state machine and lazily-created registry.

use std::collections::HashMap;

use super::cell::{PlayerId, Position};

/// Per-player turn state (§3 "Player turn state").
///
/// Invariant P1: `second.is_some() => first.is_some()`.
/// Invariant P2: while `first = Some(p)`, the cell at `p` is `Present` and
/// `controller = Some(player)`.
/// Invariant P3: `previous` is non-empty only between the completion of one
/// flip-pair (or aborted first flip) and the start of the player's next
/// flip-first-card.
#[derive(Clone, Debug, Default)]
pub struct PlayerState {
    pub first: Option<Position>,
    pub second: Option<Position>,
    pub previous: Vec<Position>,
    pub previous_matched: bool,
}

impl PlayerState {
    /// Phase A: awaiting the first flip of a fresh turn.
    pub fn is_phase_a(&self) -> bool {
        self.first.is_none()
    }

    /// Phase B: holds a first card, awaiting the second.
    pub fn is_phase_b(&self) -> bool {
        self.first.is_some() && self.second.is_none()
    }

    /// Phase C: holds a completed pair, awaiting the next turn's first flip.
    pub fn is_phase_c(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    pub fn clear_turn(&mut self) {
        self.first = None;
        self.second = None;
    }

    pub fn set_previous(&mut self, positions: Vec<Position>, matched: bool) {
        self.previous = positions;
        self.previous_matched = matched;
    }
}

/// Registry of player turn state, keyed by the opaque player id. Entries are
/// created lazily on first touch and never removed (§6 "players are never
/// removed").
///
/// This lives inside the board's single logical lock rather than behind its
/// own concurrent map: invariants P2/P3 span both a player's turn state and
/// the cell grid, so mutating one without the other under the same critical
/// section would let them observably diverge (see DESIGN.md).
#[derive(Clone, Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, PlayerState>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, player: &str) -> &mut PlayerState {
        self.players
            .entry(player.to_string())
            .or_insert_with(PlayerState::default)
    }

    pub fn get(&self, player: &str) -> Option<&PlayerState> {
        self.players.get(player)
    }
}
