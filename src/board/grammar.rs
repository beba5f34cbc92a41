//! `BOARD_STATE` wire grammar (§4.1, §6): the sole textual snapshot format
//! produced by the engine, required to be byte-identical across
//! implementations.
//!
//! ```text
//! "<rows>x<cols>\n" (SPOT "\n"){rows*cols}
//! SPOT := "none" | "down" | "up " VALUE | "my " VALUE
//! ```

use std::fmt::Write as _;

use super::cell::Cell;

/// Render the full board snapshot from `player`'s point of view, row-major.
pub fn render(rows: usize, cols: usize, cells: &[Cell], player: &str) -> String {
    let mut out = String::with_capacity(8 + cells.len() * 6);
    let _ = writeln!(out, "{rows}x{cols}");
    for cell in cells {
        out.push_str(spot(cell, player));
        if let Some(value) = face_up_value(cell) {
            out.push(' ');
            out.push_str(value);
        }
        out.push('\n');
    }
    out
}

fn spot(cell: &Cell, player: &str) -> &'static str {
    match cell {
        Cell::Removed => "none",
        Cell::Present { face_up: false, .. } => "down",
        Cell::Present {
            face_up: true,
            controller,
            ..
        } if controller.as_deref() == Some(player) => "my",
        Cell::Present { face_up: true, .. } => "up",
    }
}

fn face_up_value(cell: &Cell) -> Option<&str> {
    match cell {
        Cell::Present {
            face_up: true,
            value,
            ..
        } => Some(value.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_none_down_up_my() {
        let cells = vec![
            Cell::Removed,
            Cell::new_face_down("A".to_string()),
            Cell::Present {
                value: "B".to_string(),
                face_up: true,
                controller: None,
            },
            Cell::Present {
                value: "C".to_string(),
                face_up: true,
                controller: Some("alice".to_string()),
            },
        ];
        let rendered = render(2, 2, &cells, "alice");
        assert_eq!(rendered, "2x2\nnone\ndown\nup B\nmy C\n");
    }

    #[test]
    fn up_vs_my_depends_on_viewing_player() {
        let cells = vec![Cell::Present {
            value: "A".to_string(),
            face_up: true,
            controller: Some("alice".to_string()),
        }];
        assert_eq!(render(1, 1, &cells, "alice"), "1x1\nmy A\n");
        assert_eq!(render(1, 1, &cells, "bob"), "1x1\nup A\n");
    }
}
