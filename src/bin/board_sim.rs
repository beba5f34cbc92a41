use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use memory_scramble_board::cli::{dispatch, parse_line, ReplCommand};
use memory_scramble_board::config::SimulatorConfig;
use memory_scramble_board::io::board_file;
use memory_scramble_board::{cli::Simulator, Board};

const LOG_TARGET: &str = "bin::board_sim";

#[derive(Debug, Parser)]
#[command(name = "board_sim")]
#[command(about = "Load a board file and either run concurrent simulated players against it, \
                    or drive it interactively from stdin", long_about = None)]
struct Args {
    /// Path to a board file: "<rows> <cols>" followed by rows*cols values.
    board: PathBuf,

    /// Read commands from stdin instead of running the random simulator:
    /// one of "look <player>", "flip <player> <r> <c>", "map <player>",
    /// "watch <player>", or "quit".
    #[arg(long)]
    interactive: bool,

    /// Number of concurrent simulated players.
    #[arg(long, default_value_t = 4)]
    players: usize,

    /// Flip attempts issued per simulated player.
    #[arg(long, default_value_t = 20)]
    flips_per_player: usize,

    /// Delay between one player's successive flip attempts, in milliseconds.
    #[arg(long, default_value_t = 50)]
    move_interval_ms: u64,

    /// Seed simulated players' move selection for reproducible runs.
    #[arg(long)]
    rng_seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let (rows, cols, values) =
        board_file::load(&args.board).context("failed to load board file")?;
    info!(target = LOG_TARGET, rows, cols, path = %args.board.display(), "board loaded");

    let board = Board::new(rows, cols, values).context("invalid board data")?;

    if args.interactive {
        run_interactive(&board).await
    } else {
        run_simulation(&board, &args).await
    }
}

/// The "command dispatch glue" that exercises the engine end-to-end from a
/// terminal, one REPL line per board operation.
async fn run_interactive(board: &Board) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(ReplCommand::Quit) => break,
            Ok(ReplCommand::Board { player, command }) => match dispatch(board, &player, command).await {
                Ok(snapshot) => println!("{snapshot}"),
                Err(err) => println!("error: {err}"),
            },
            Err(err) => println!("error: {err}"),
        }
    }
    Ok(())
}

async fn run_simulation(board: &Board, args: &Args) -> Result<()> {
    let config = SimulatorConfig {
        player_count: args.players,
        flips_per_player: args.flips_per_player,
        rng_seed: args.rng_seed,
        move_interval: Duration::from_millis(args.move_interval_ms),
    };

    info!(
        target = LOG_TARGET,
        player_count = config.player_count,
        flips_per_player = config.flips_per_player,
        "starting simulation"
    );
    let simulator = Simulator::new(board.clone(), config);
    simulator.run().await;

    let (accepted, rejected) = simulator.stats();
    info!(target = LOG_TARGET, accepted, rejected, "simulation complete");
    println!("{}", board.look("observer").await);
    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("board_sim=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing subscriber: {err}"))?;
    Ok(())
}
