//! Typed settings for the board binary (§6 "No persisted state" — the core
//! engine itself takes no configuration; everything here governs the
//! surrounding CLI/simulator demo).

use std::time::Duration;

/// Bounds on a single simulated player's random-walk over the board.
#[derive(Clone, Debug)]
pub struct SimulatorConfig {
    /// Number of concurrent simulated players.
    pub player_count: usize,
    /// Flip attempts issued per simulated player before it stops.
    pub flips_per_player: usize,
    /// Deterministic seed for the simulator's move selection, if set.
    pub rng_seed: Option<u64>,
    /// Delay between a simulated player's successive flip attempts, to keep
    /// log output and contention readable.
    pub move_interval: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            player_count: 4,
            flips_per_player: 20,
            rng_seed: None,
            move_interval: Duration::from_millis(50),
        }
    }
}
