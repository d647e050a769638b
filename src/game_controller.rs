//! # Game Controller Module - Central Game State Management
//!
//! This module provides the `GameController`, the single source of truth for
//! the game being played. It keeps three views apart:
//!
//! - **Authoritative Game State**: owned and mutated only by the controller
//! - **Search States**: clones handed to the AI worker
//! - **Render State**: read-only borrows for display
//!
//! The controller also knows who controls each side (`GameMode`) and keeps
//! the session `Scoreboard`, which survives resets.

use crate::error::Error;
use crate::games::ultimate::{Outcome, Player, UltimateMove, UltimateState};
use log::info;
use std::fmt;
use std::time::SystemTime;

/// Result of attempting to apply a move
#[derive(Debug, Clone, PartialEq)]
pub enum MoveResult {
    /// Move was successfully applied
    Success {
        /// The applied move
        move_made: UltimateMove,
        /// Player who made the move
        player: Player,
        /// Whether the game is now over
        game_over: bool,
        /// Final result if the game is over
        outcome: Option<Outcome>,
    },
    /// Move was rejected as invalid
    Invalid {
        /// Reason the move was rejected
        reason: Error,
    },
    /// Game is already over, no more moves allowed
    GameOver,
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry {
    /// When the move was made
    pub timestamp: SystemTime,
    /// Player who made the move
    pub player: Player,
    /// The move that was made
    pub move_made: UltimateMove,
    /// Move number (1-indexed)
    pub move_number: usize,
}

impl MoveHistoryEntry {
    pub fn new(player: Player, move_made: UltimateMove, move_number: usize) -> Self {
        Self {
            timestamp: SystemTime::now(),
            player,
            move_made,
            move_number,
        }
    }
}

/// Type of player (human or AI)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerType {
    /// Human player (makes moves via input)
    Human,
    /// AI player (moves chosen by MCTS)
    AI,
}

/// Who controls each side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Two humans share the board
    TwoPlayer,
    /// One human plays `human`, the engine plays the other side
    OnePlayer { human: Player },
    /// The engine plays both sides
    CpuVsCpu,
}

impl GameMode {
    pub fn player_type(self, player: Player) -> PlayerType {
        match self {
            GameMode::TwoPlayer => PlayerType::Human,
            GameMode::OnePlayer { human } if human == player => PlayerType::Human,
            GameMode::OnePlayer { .. } | GameMode::CpuVsCpu => PlayerType::AI,
        }
    }
}

/// Tally of finished games in a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub x_wins: u32,
    pub o_wins: u32,
    pub draws: u32,
}

impl Scoreboard {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Won(Player::X) => self.x_wins += 1,
            Outcome::Won(Player::O) => self.o_wins += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    pub fn games_played(&self) -> u32 {
        self.x_wins + self.o_wins + self.draws
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X {} - O {} - Draws {}", self.x_wins, self.o_wins, self.draws)
    }
}

/// The central game controller that owns the authoritative game state
///
/// # Usage
/// ```
/// use uttt::game_controller::{GameController, GameMode, MoveResult};
/// use uttt::games::ultimate::UltimateMove;
///
/// let mut controller = GameController::new(GameMode::TwoPlayer);
/// match controller.try_make_move(UltimateMove::new(4, 4)) {
///     MoveResult::Success { game_over, .. } => assert!(!game_over),
///     other => panic!("unexpected {:?}", other),
/// }
/// // A clone for the AI to search; the controller keeps the original
/// let state_for_ai = controller.get_state_for_search();
/// assert_eq!(state_for_ai.forced_board(), Some(4));
/// ```
#[derive(Debug, Clone)]
pub struct GameController {
    /// The authoritative game state
    game_state: UltimateState,
    /// Complete history of moves made
    move_history: Vec<MoveHistoryEntry>,
    mode: GameMode,
    /// Finished games this session
    scoreboard: Scoreboard,
}

impl GameController {
    /// Create a controller for a fresh game
    pub fn new(mode: GameMode) -> Self {
        Self::from_state(mode, UltimateState::new())
    }

    /// Create a controller starting from an arbitrary position
    pub fn from_state(mode: GameMode, initial_state: UltimateState) -> Self {
        Self {
            game_state: initial_state,
            move_history: Vec::new(),
            mode,
            scoreboard: Scoreboard::default(),
        }
    }

    /// Validate a move without applying it
    pub fn validate_move(&self, mv: &UltimateMove) -> Result<(), Error> {
        if self.game_state.overall_winner().is_some() {
            return Err(Error::InvalidMove("the game is already over".to_string()));
        }
        if !self.game_state.is_legal(mv) {
            return Err(Error::InvalidMove(format!("{} is not a legal move", mv)));
        }
        Ok(())
    }

    /// Attempt to make a move
    ///
    /// Validates the move and applies it if valid. A move that ends the game
    /// records the result on the scoreboard.
    pub fn try_make_move(&mut self, mv: UltimateMove) -> MoveResult {
        if self.is_game_over() {
            return MoveResult::GameOver;
        }
        let player = self.game_state.current_player();
        if let Err(reason) = self.game_state.apply_move(mv.board, mv.cell) {
            return MoveResult::Invalid { reason };
        }

        let move_number = self.move_history.len() + 1;
        self.move_history.push(MoveHistoryEntry::new(player, mv, move_number));

        let outcome = self.game_state.overall_winner();
        if let Some(result) = outcome {
            self.scoreboard.record(result);
            info!("game over after {} moves: {} ({})", move_number, result, self.scoreboard);
        }

        MoveResult::Success {
            move_made: mv,
            player,
            game_over: outcome.is_some(),
            outcome,
        }
    }

    /// Get a clone of the game state for AI to search
    ///
    /// The returned state can be freely modified without affecting the
    /// authoritative state.
    pub fn get_state_for_search(&self) -> UltimateState {
        self.game_state.clone()
    }

    /// Get a reference to the game state for rendering
    pub fn get_render_state(&self) -> &UltimateState {
        &self.game_state
    }

    pub fn get_current_player(&self) -> Player {
        self.game_state.current_player()
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// True when the side to move is engine-controlled and the game is live
    pub fn needs_ai_move(&self) -> bool {
        !self.is_game_over() && self.mode.player_type(self.get_current_player()) == PlayerType::AI
    }

    pub fn is_game_over(&self) -> bool {
        self.game_state.overall_winner().is_some()
    }

    pub fn get_outcome(&self) -> Option<Outcome> {
        self.game_state.overall_winner()
    }

    pub fn get_move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    pub fn get_last_move(&self) -> Option<&MoveHistoryEntry> {
        self.move_history.last()
    }

    pub fn get_legal_moves(&self) -> Vec<UltimateMove> {
        self.game_state.legal_moves()
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    /// Start a new game; the scoreboard is kept
    pub fn reset(&mut self) {
        self.game_state = UltimateState::new();
        self.move_history.clear();
    }

    /// Format the move history as plain text
    pub fn format_history(&self) -> String {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.");
        }

        let mut output = String::from("=== Ultimate Tic-Tac-Toe Game History ===\n\n");
        for entry in &self.move_history {
            output.push_str(&format!(
                "{}. {} - {}\n",
                entry.move_number, entry.player, entry.move_made
            ));
        }

        match self.game_state.overall_winner() {
            Some(outcome) => output.push_str(&format!("\nResult: {}\n", outcome)),
            None => output.push_str(&format!(
                "\n(Game in progress - {} to move)\n",
                self.get_current_player()
            )),
        }
        output
    }
}
