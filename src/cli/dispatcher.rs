//! Parses one REPL line and maps it onto the board's four operations
//! (`look <player>`, `flip <player> <r> <c>`, `map <player> [expr]`,
//! `watch <player>`, `quit`).

use thiserror::Error;

use crate::board::errors::FlipError;
use crate::board::Board;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Flip(#[from] FlipError),
}

/// Why a line couldn't be turned into a [`ReplCommand`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseLineError {
    #[error("empty line")]
    Empty,

    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("{command} is missing its {argument} argument")]
    MissingArgument { command: &'static str, argument: &'static str },

    #[error("{argument} must be a non-negative integer, got {value:?}")]
    InvalidNumber { argument: &'static str, value: String },
}

/// One command issued by a player. `map` always applies the fixed
/// lowercasing transform — the harness has no script language for arbitrary
/// `f`, only the engine's `Board::map` supports an arbitrary one; a trailing
/// `<expr>` token is accepted and ignored for this reason.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Look,
    Flip { r: usize, c: usize },
    Map,
    Watch,
}

/// A fully parsed REPL line: either a board command issued by a named
/// player, or the line that ends the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Board { player: String, command: Command },
    Quit,
}

/// Parse one line of the REPL grammar described above. Whitespace-delimited,
/// case-sensitive verb in the first position.
pub fn parse_line(line: &str) -> Result<ReplCommand, ParseLineError> {
    let mut tokens = line.split_whitespace();
    let verb = tokens.next().ok_or(ParseLineError::Empty)?;

    match verb {
        "quit" => Ok(ReplCommand::Quit),
        "look" => {
            let player = next_arg(&mut tokens, "look", "player")?;
            Ok(ReplCommand::Board { player, command: Command::Look })
        }
        "flip" => {
            let player = next_arg(&mut tokens, "flip", "player")?;
            let r = next_number(&mut tokens, "flip", "r")?;
            let c = next_number(&mut tokens, "flip", "c")?;
            Ok(ReplCommand::Board { player, command: Command::Flip { r, c } })
        }
        "map" => {
            let player = next_arg(&mut tokens, "map", "player")?;
            Ok(ReplCommand::Board { player, command: Command::Map })
        }
        "watch" => {
            let player = next_arg(&mut tokens, "watch", "player")?;
            Ok(ReplCommand::Board { player, command: Command::Watch })
        }
        other => Err(ParseLineError::UnknownCommand(other.to_string())),
    }
}

fn next_arg<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<String, ParseLineError> {
    tokens
        .next()
        .map(str::to_string)
        .ok_or(ParseLineError::MissingArgument { command, argument })
}

fn next_number<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<usize, ParseLineError> {
    let token = tokens
        .next()
        .ok_or(ParseLineError::MissingArgument { command, argument })?;
    token.parse().map_err(|_| ParseLineError::InvalidNumber {
        argument,
        value: token.to_string(),
    })
}

pub async fn dispatch(board: &Board, player_id: &str, command: Command) -> Result<String, CliError> {
    match command {
        Command::Look => Ok(board.look(player_id).await),
        Command::Flip { r, c } => Ok(board.flip(player_id, r, c).await?),
        Command::Map => Ok(board.map(player_id, |v| async move { v.to_lowercase() }).await),
        Command::Watch => Ok(board.watch(player_id).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn look_dispatches_to_a_fresh_snapshot() {
        let board = Board::new(1, 1, vec!["A".to_string()]).unwrap();
        let snap = dispatch(&board, "alice", Command::Look).await.unwrap();
        assert_eq!(snap, "1x1\ndown\n");
    }

    #[tokio::test]
    async fn flip_errors_surface_as_cli_errors() {
        let board = Board::new(1, 1, vec!["A".to_string()]).unwrap();
        let err = dispatch(&board, "alice", Command::Flip { r: 9, c: 9 })
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Flip(FlipError::OutOfRange((9, 9)))));
    }

    #[test]
    fn parses_every_verb() {
        assert!(matches!(parse_line("quit").unwrap(), ReplCommand::Quit));
        assert!(matches!(
            parse_line("look alice").unwrap(),
            ReplCommand::Board { player, command: Command::Look } if player == "alice"
        ));
        assert!(matches!(
            parse_line("flip bob 1 2").unwrap(),
            ReplCommand::Board { player, command: Command::Flip { r: 1, c: 2 } } if player == "bob"
        ));
        assert!(matches!(
            parse_line("map carol").unwrap(),
            ReplCommand::Board { player, command: Command::Map } if player == "carol"
        ));
        assert!(matches!(
            parse_line("watch dave").unwrap(),
            ReplCommand::Board { player, command: Command::Watch } if player == "dave"
        ));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_line(""), Err(ParseLineError::Empty));
        assert_eq!(
            parse_line("shuffle"),
            Err(ParseLineError::UnknownCommand("shuffle".to_string()))
        );
        assert_eq!(
            parse_line("flip alice"),
            Err(ParseLineError::MissingArgument { command: "flip", argument: "r" })
        );
        assert_eq!(
            parse_line("flip alice x 2"),
            Err(ParseLineError::InvalidNumber { argument: "r", value: "x".to_string() })
        );
    }
}
