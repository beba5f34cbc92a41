//! Command dispatch and the random-play simulation harness. Both are pure
//! ambient demo glue around the board engine — §1 explicitly excludes "the
//! front-end transport that carries player commands and responses" from the
//! engine itself, so none of this module is part of the tested engine
//! surface.

pub mod dispatcher;
pub mod simulator;

pub use dispatcher::{dispatch, parse_line, CliError, Command, ParseLineError, ReplCommand};
pub use simulator::Simulator;
