//! Search configuration parameters.
//!
//! Iteration budgets are kept inside the range offered to players
//! (100 to 2000), with named difficulty presets inside it.

/// Smallest iteration budget a player can pick.
pub const MIN_ITERATIONS: u32 = 100;
/// Largest iteration budget a player can pick.
pub const MAX_ITERATIONS: u32 = 2000;

/// Named iteration presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn iterations(self) -> u32 {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Medium => 500,
            Difficulty::Hard => 1000,
        }
    }
}

/// Search configuration parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Number of search iterations per move.
    pub iterations: u32,

    /// UCT exploration constant `C`.
    pub exploration_parameter: f64,

    /// Seed for the random source. `None` seeds from system entropy,
    /// so repeated searches differ.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: Difficulty::Medium.iterations(),
            exploration_parameter: std::f64::consts::SQRT_2,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Default config with the iteration budget clamped to the allowed range.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS),
            ..Self::default()
        }
    }

    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self::with_iterations(difficulty.iterations())
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
