//! Plain-text board loader: `"<rows> <cols>"` on the first line, followed by
//! `rows * cols` whitespace-separated, non-empty, whitespace-free value
//! tokens (§6 "Board input").

use std::path::Path;

use thiserror::Error;
use tracing::instrument;

const LOG_TARGET: &str = "memory_scramble_board::io::board_file";

#[derive(Debug, Error)]
pub enum BoardFileError {
    #[error("failed to read board file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed header {header:?}: expected \"<rows> <cols>\"")]
    MalformedHeader { header: String },

    #[error("board declares {expected} cells ({rows}x{cols}) but the file has {found} values")]
    WrongValueCount {
        rows: usize,
        cols: usize,
        expected: usize,
        found: usize,
    },

    #[error("value #{index} is empty or contains whitespace")]
    InvalidValue { index: usize },
}

/// Load `(rows, cols, values)` from a board file.
#[instrument(target = LOG_TARGET)]
pub fn load(path: &Path) -> Result<(usize, usize, Vec<String>), BoardFileError> {
    let contents = std::fs::read_to_string(path).map_err(|source| BoardFileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&contents)
}

fn parse(contents: &str) -> Result<(usize, usize, Vec<String>), BoardFileError> {
    let mut tokens = contents.split_whitespace();

    let rows_token = tokens.next().unwrap_or_default();
    let cols_token = tokens.next().unwrap_or_default();
    let (rows, cols) = match (rows_token.parse::<usize>(), cols_token.parse::<usize>()) {
        (Ok(rows), Ok(cols)) if rows > 0 && cols > 0 => (rows, cols),
        _ => {
            return Err(BoardFileError::MalformedHeader {
                header: format!("{rows_token} {cols_token}"),
            })
        }
    };

    let values: Vec<String> = tokens.map(str::to_string).collect();
    let expected = rows * cols;
    if values.len() != expected {
        return Err(BoardFileError::WrongValueCount {
            rows,
            cols,
            expected,
            found: values.len(),
        });
    }
    for (index, value) in values.iter().enumerate() {
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return Err(BoardFileError::InvalidValue { index });
        }
    }

    Ok((rows, cols, values))
}
