//! Random-play simulation harness: spawns several simulated players that
//! issue uncoordinated `flip` calls against one [`Board`], the way a real
//! front end's many connected clients would.
//!
//! Grounded on `game::coordinator::manager::GameCoordinator`'s
//! `DashMap`-backed registry of per-entity background state: here the keys
//! are simulated player names rather than `(GameId, HandId)` pairs, and the
//! map lives entirely outside the board's own lock (see DESIGN.md's
//! registry-locking decision — this is the narrower, legitimate `dashmap`
//! use that survives the transform).

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tracing::{debug, info, Instrument};

use crate::board::Board;
use crate::config::SimulatorConfig;

const LOG_TARGET: &str = "memory_scramble_board::cli::simulator";

/// Tallies of flip outcomes across every simulated player. Guarded by a
/// synchronous `parking_lot::Mutex` rather than the board's own `tokio`
/// mutex: increments never need to suspend, so a blocking lock held for a
/// few instructions is cheaper and cannot itself become a suspension point
/// (grounded on `shuffler::state`'s use of `parking_lot::Mutex` for plain
/// in-memory bookkeeping alongside the `tokio`-guarded hand state).
#[derive(Default)]
pub struct SimulationStats {
    pub accepted: u64,
    pub rejected: u64,
}

/// Owns the set of currently-running simulated players for one board.
pub struct Simulator {
    board: Board,
    config: SimulatorConfig,
    players: Arc<DashMap<String, JoinHandle<()>>>,
    stats: Arc<Mutex<SimulationStats>>,
}

impl Simulator {
    pub fn new(board: Board, config: SimulatorConfig) -> Self {
        Self {
            board,
            config,
            players: Arc::new(DashMap::new()),
            stats: Arc::new(Mutex::new(SimulationStats::default())),
        }
    }

    /// Snapshot of outcome tallies so far.
    pub fn stats(&self) -> (u64, u64) {
        let stats = self.stats.lock();
        (stats.accepted, stats.rejected)
    }

    /// Spawn `config.player_count` simulated players and wait for all of
    /// them to finish their `flips_per_player` attempts.
    pub async fn run(&self) {
        let (rows, cols) = self.board.dimensions().await;

        for index in 0..self.config.player_count {
            let name = format!("player-{index}");
            let board = self.board.clone();
            let config = self.config.clone();
            let players = Arc::clone(&self.players);
            let seed = config.rng_seed.map(|base| base.wrapping_add(index as u64));
            let task_name = name.clone();
            let stats = Arc::clone(&self.stats);

            let span = tracing::info_span!("task", task_name = %task_name);
            let handle = tokio::spawn(
                async move {
                    play(&board, &name, rows, cols, &config, seed, &stats).await;
                    players.remove(&name);
                }
                .instrument(span),
            );
            self.players.insert(task_name, handle);
        }

        // Draining: each player removes itself on completion, so waiting for
        // the map to empty is equivalent to joining every handle.
        while !self.players.is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Number of simulated players still running.
    pub fn active_count(&self) -> usize {
        self.players.len()
    }
}

async fn play(
    board: &Board,
    player_id: &str,
    rows: usize,
    cols: usize,
    config: &SimulatorConfig,
    seed: Option<u64>,
    stats: &Mutex<SimulationStats>,
) {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for attempt in 0..config.flips_per_player {
        let r = rng.gen_range(0..rows);
        let c = rng.gen_range(0..cols);
        match board.flip(player_id, r, c).await {
            Ok(snapshot) => {
                stats.lock().accepted += 1;
                debug!(
                    target = LOG_TARGET,
                    player_id,
                    attempt,
                    r,
                    c,
                    snapshot = %snapshot,
                    "flip accepted"
                );
            }
            Err(err) => {
                stats.lock().rejected += 1;
                debug!(
                    target = LOG_TARGET,
                    player_id, attempt, r, c, %err, "flip rejected"
                );
            }
        }
        tokio::time::sleep(config.move_interval).await;
    }
    info!(target = LOG_TARGET, player_id, "player finished its moves");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulator_drains_all_spawned_players() {
        let values = (0..16)
            .map(|i| if i % 2 == 0 { "A".to_string() } else { "B".to_string() })
            .collect();
        let board = Board::new(4, 4, values).unwrap();
        let config = SimulatorConfig {
            player_count: 3,
            flips_per_player: 2,
            rng_seed: Some(7),
            move_interval: Duration::from_millis(1),
        };
        let simulator = Simulator::new(board, config);
        simulator.run().await;
        assert_eq!(simulator.active_count(), 0);
        let (accepted, rejected) = simulator.stats();
        assert_eq!(accepted + rejected, 3 * 2);
    }
}
