//! # Ultimate Tic-Tac-Toe Game Implementation
//!
//! This module implements Ultimate Tic-Tac-Toe: a 3x3 grid of 3x3 sub-boards.
//! The cell a player picks inside a sub-board sends the opponent to the
//! sub-board with the same index.
//!
//! ## Rules
//! - X moves first, players alternate
//! - A sub-board is won with three in a row, or drawn once it is full
//! - A decided sub-board accepts no further marks
//! - If the sub-board a player is sent to is decided, they may play in any
//!   undecided sub-board
//! - The game is won with three won sub-boards in a row (drawn sub-boards
//!   count for nobody), and drawn once every sub-board is decided without
//!   such a line
//!
//! Sub-boards and cells are both numbered 0-8, row-major.

use crate::error::{Error, Result};
use crate::GameState;
use std::fmt;
use std::str::FromStr;
use uttt_shared::{has_line, line_winner};

/// Number of sub-boards, and number of cells inside each sub-board.
pub const GRID_SLOTS: usize = 9;

/// One of the two players
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Returns the other player
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

impl FromStr for Player {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Player::X),
            "o" | "O" => Ok(Player::O),
            other => Err(format!("unknown player '{}', expected X or O", other)),
        }
    }
}

/// Contents of a single cell. Once a cell is marked it never changes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Cell {
    #[default]
    Empty,
    X,
    O,
}

impl Cell {
    /// The player owning this cell, if any
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

/// Result of a single sub-board. Fixed the first time it becomes decided.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum SubResult {
    #[default]
    Undecided,
    Won(Player),
    Draw,
}

impl SubResult {
    pub fn is_decided(self) -> bool {
        self != SubResult::Undecided
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            SubResult::Won(p) => Some(p),
            _ => None,
        }
    }
}

/// Final result of a finished game
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Outcome {
    Won(Player),
    Draw,
}

impl Outcome {
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::Won(p) => Some(p),
            Outcome::Draw => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Won(p) => write!(f, "Player {} wins", p),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

/// Running count of decided sub-boards. Informational only.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct BoardTally {
    pub x_won: u32,
    pub o_won: u32,
    pub drawn: u32,
}

impl BoardTally {
    fn record(&mut self, result: SubResult) {
        match result {
            SubResult::Won(Player::X) => self.x_won += 1,
            SubResult::Won(Player::O) => self.o_won += 1,
            SubResult::Draw => self.drawn += 1,
            SubResult::Undecided => {}
        }
    }
}

/// Represents a move in Ultimate Tic-Tac-Toe
///
/// `board` selects the sub-board and `cell` the cell inside it, both 0-based
/// and row-major.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct UltimateMove {
    pub board: usize,
    pub cell: usize,
}

impl UltimateMove {
    pub fn new(board: usize, cell: usize) -> Self {
        Self { board, cell }
    }
}

impl fmt::Display for UltimateMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.board, self.cell)
    }
}

impl FromStr for UltimateMove {
    type Err = String;

    /// Parses a move from `"board cell"` or `"board,cell"`
    ///
    /// # Examples
    /// ```
    /// use std::str::FromStr;
    /// use uttt::games::ultimate::UltimateMove;
    /// let mv = UltimateMove::from_str("4, 2").unwrap();
    /// assert_eq!(mv, UltimateMove::new(4, 2));
    /// ```
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() != 2 {
            return Err(format!("expected 'board cell', got '{}'", s.trim()));
        }
        let board = parts[0].parse::<usize>().map_err(|e| e.to_string())?;
        let cell = parts[1].parse::<usize>().map_err(|e| e.to_string())?;
        if board >= GRID_SLOTS || cell >= GRID_SLOTS {
            return Err(format!("board and cell must be in 0..{}", GRID_SLOTS));
        }
        Ok(UltimateMove { board, cell })
    }
}

/// Represents the complete state of an Ultimate Tic-Tac-Toe game
///
/// Cloning produces a fully independent copy: every field is plain data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UltimateState {
    /// 9 sub-boards of 9 cells each
    boards: [[Cell; GRID_SLOTS]; GRID_SLOTS],
    /// Result of each sub-board, monotonic
    sub_results: [SubResult; GRID_SLOTS],
    /// Player to move
    current_player: Player,
    /// Sub-board the player to move is sent to; `None` means free choice
    forced_board: Option<usize>,
    /// Set once the game is over
    overall_winner: Option<Outcome>,
    tally: BoardTally,
}

impl Default for UltimateState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UltimateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..9 {
            if row > 0 && row % 3 == 0 {
                writeln!(f, "------+-------+------")?;
            }
            for col in 0..9 {
                if col > 0 && col % 3 == 0 {
                    write!(f, "| ")?;
                }
                let board = 3 * (row / 3) + col / 3;
                let cell = 3 * (row % 3) + col % 3;
                let symbol = match self.boards[board][cell] {
                    Cell::X => 'X',
                    Cell::O => 'O',
                    Cell::Empty => '.',
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl GameState for UltimateState {
    type Move = UltimateMove;
    type Player = Player;

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        self.legal_moves()
    }

    fn make_move(&mut self, mv: &Self::Move) -> Result<()> {
        self.apply_move(mv.board, mv.cell)
    }

    fn is_terminal(&self) -> bool {
        self.overall_winner.is_some()
    }

    fn get_winner(&self) -> Option<Player> {
        self.overall_winner.and_then(Outcome::winner)
    }

    fn get_current_player(&self) -> Player {
        self.current_player
    }
}

impl UltimateState {
    /// Creates an empty game with X to move and a free choice of sub-board
    pub fn new() -> Self {
        Self {
            boards: [[Cell::Empty; GRID_SLOTS]; GRID_SLOTS],
            sub_results: [SubResult::Undecided; GRID_SLOTS],
            current_player: Player::X,
            forced_board: None,
            overall_winner: None,
            tally: BoardTally::default(),
        }
    }

    /// Builds a position from raw marks
    ///
    /// Sub-board results, the tally and the overall winner are recomputed
    /// from the marks. Fails if a sub-board holds a line for both players
    /// or if `forced_board` is out of range or points at a decided sub-board.
    pub fn from_cells(
        boards: [[Cell; GRID_SLOTS]; GRID_SLOTS],
        current_player: Player,
        forced_board: Option<usize>,
    ) -> Result<Self> {
        let mut state = Self {
            boards,
            current_player,
            ..Self::new()
        };

        for b in 0..GRID_SLOTS {
            let x_line = has_line(&state.boards[b], Cell::X);
            let o_line = has_line(&state.boards[b], Cell::O);
            let result = match (x_line, o_line) {
                (true, true) => {
                    return Err(Error::InvalidPosition(format!(
                        "sub-board {} has lines for both players",
                        b
                    )))
                }
                (true, false) => SubResult::Won(Player::X),
                (false, true) => SubResult::Won(Player::O),
                (false, false) if state.boards[b].iter().all(|c| !c.is_empty()) => SubResult::Draw,
                (false, false) => SubResult::Undecided,
            };
            state.sub_results[b] = result;
            state.tally.record(result);
        }

        if let Some(b) = forced_board {
            if b >= GRID_SLOTS {
                return Err(Error::InvalidPosition(format!("forced board {} out of range", b)));
            }
            if state.sub_results[b].is_decided() {
                return Err(Error::InvalidPosition(format!("forced board {} is already decided", b)));
            }
        }
        state.forced_board = forced_board;
        state.overall_winner = state.evaluate_meta_board();
        Ok(state)
    }

    /// Returns every playable move for the current player
    ///
    /// Only the forced sub-board is considered when there is one; otherwise
    /// every undecided sub-board. Empty once the game is over.
    pub fn legal_moves(&self) -> Vec<UltimateMove> {
        if self.overall_winner.is_some() {
            return Vec::new();
        }
        let boards: Vec<usize> = match self.forced_board {
            Some(b) if !self.sub_results[b].is_decided() => vec![b],
            _ => (0..GRID_SLOTS)
                .filter(|&b| !self.sub_results[b].is_decided())
                .collect(),
        };
        boards
            .into_iter()
            .flat_map(|b| {
                (0..GRID_SLOTS)
                    .filter(move |&c| self.boards[b][c].is_empty())
                    .map(move |c| UltimateMove::new(b, c))
            })
            .collect()
    }

    /// Checks if a move is legal in the current game state
    pub fn is_legal(&self, mv: &UltimateMove) -> bool {
        self.check_legal(mv.board, mv.cell).is_ok()
    }

    fn check_legal(&self, board: usize, cell: usize) -> Result<()> {
        if board >= GRID_SLOTS || cell >= GRID_SLOTS {
            return Err(Error::InvalidMove(format!("({}, {}) is off the board", board, cell)));
        }
        if self.overall_winner.is_some() {
            return Err(Error::InvalidMove("the game is already over".to_string()));
        }
        if self.sub_results[board].is_decided() {
            return Err(Error::InvalidMove(format!("sub-board {} is already decided", board)));
        }
        if let Some(forced) = self.forced_board {
            if forced != board {
                return Err(Error::InvalidMove(format!(
                    "must play in sub-board {}, not {}",
                    forced, board
                )));
            }
        }
        if !self.boards[board][cell].is_empty() {
            return Err(Error::InvalidMove(format!("cell ({}, {}) is occupied", board, cell)));
        }
        Ok(())
    }

    /// Places the current player's mark and advances the game
    ///
    /// Decides the sub-board if the mark completes a line or fills it, then
    /// re-evaluates the meta-board, sends the opponent to sub-board `cell`
    /// (or frees their choice if it is decided) and passes the turn.
    pub fn apply_move(&mut self, board: usize, cell: usize) -> Result<()> {
        self.check_legal(board, cell)?;

        self.boards[board][cell] = self.current_player.into();

        if !self.sub_results[board].is_decided() {
            let result = match line_winner(&self.boards[board], Cell::Empty) {
                Some(mark) => mark.player().map_or(SubResult::Undecided, SubResult::Won),
                None if self.boards[board].iter().all(|c| !c.is_empty()) => SubResult::Draw,
                None => SubResult::Undecided,
            };
            self.sub_results[board] = result;
            self.tally.record(result);
        }

        self.overall_winner = self.evaluate_meta_board();

        self.forced_board = if self.sub_results[cell].is_decided() {
            None
        } else {
            Some(cell)
        };
        self.current_player = self.current_player.opponent();
        Ok(())
    }

    /// Meta-board evaluation; drawn sub-boards count as blanks for lines
    fn evaluate_meta_board(&self) -> Option<Outcome> {
        let meta = self.sub_results.map(|r| r.winner().map_or(Cell::Empty, Cell::from));
        if let Some(player) = line_winner(&meta, Cell::Empty).and_then(Cell::player) {
            return Some(Outcome::Won(player));
        }
        if self.sub_results.iter().all(|r| r.is_decided()) {
            return Some(Outcome::Draw);
        }
        None
    }

    pub fn is_terminal(&self) -> bool {
        <Self as GameState>::is_terminal(self)
    }

    pub fn cell(&self, board: usize, cell: usize) -> Cell {
        self.boards[board][cell]
    }

    pub fn board(&self, board: usize) -> &[Cell; GRID_SLOTS] {
        &self.boards[board]
    }

    pub fn sub_result(&self, board: usize) -> SubResult {
        self.sub_results[board]
    }

    pub fn sub_results(&self) -> &[SubResult; GRID_SLOTS] {
        &self.sub_results
    }

    /// Sub-board the player to move must play in, `None` for free choice
    pub fn forced_board(&self) -> Option<usize> {
        self.forced_board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn overall_winner(&self) -> Option<Outcome> {
        self.overall_winner
    }

    pub fn tally(&self) -> BoardTally {
        self.tally
    }
}
