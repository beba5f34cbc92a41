//! Card grid cell representation.

use serde::{Deserialize, Serialize};

/// Zero-based grid coordinate. Row-major ordering throughout the crate.
pub type Position = (usize, usize);

/// Opaque player identifier. Non-empty, whitespace-free by convention (§6).
pub type PlayerId = String;

/// A single card slot on the board.
///
/// Invariant C1: a `Present` cell with `controller = Some(_)` has `face_up = true`.
/// Invariant C2: at most one controller per cell (enforced structurally — there is
/// only one `controller` field to hold it).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Empty space; a matched pair was cleared from here.
    Removed,
    Present {
        value: String,
        face_up: bool,
        controller: Option<PlayerId>,
    },
}

impl Cell {
    pub fn new_face_down(value: String) -> Self {
        Cell::Present {
            value,
            face_up: false,
            controller: None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Cell::Present { value, .. } => Some(value.as_str()),
            Cell::Removed => None,
        }
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, Cell::Removed)
    }

    pub fn controller(&self) -> Option<&PlayerId> {
        match self {
            Cell::Present { controller, .. } => controller.as_ref(),
            Cell::Removed => None,
        }
    }

    pub fn is_controlled_by(&self, player: &str) -> bool {
        matches!(self.controller(), Some(id) if id == player)
    }

    pub fn is_controlled_by_other(&self, player: &str) -> bool {
        matches!(self.controller(), Some(id) if id != player)
    }

    pub fn face_up(&self) -> bool {
        matches!(self, Cell::Present { face_up: true, .. })
    }
}
