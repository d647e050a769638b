//! # Game Implementations Module
//!
//! Games playable by the search engine. Each game implements the
//! `GameState` trait, which provides:
//! - Move generation and validation
//! - State transitions and game rules
//! - Terminal state detection and winner determination
//! - Current player tracking
//!
//! ## Supported Games
//! - **Ultimate Tic-Tac-Toe**: nine tic-tac-toe boards arranged in a 3x3 grid,
//!   where each move picks the board the opponent plays in next

pub mod ultimate;
