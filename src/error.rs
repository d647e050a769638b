//! Error types shared by the rules engine, the search and the session layer.

use thiserror::Error;

/// Errors that can occur while playing or searching a game.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A move outside the current legal move set was applied.
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// A position could not be built from the supplied marks.
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// The search root has no children, so there is nothing to recommend.
    /// Happens when the searched state is already terminal.
    #[error("No move available: the game is already over")]
    NoMoveAvailable,

    /// A search was asked to run zero iterations.
    #[error("Search needs at least one iteration")]
    NoIterations,

    /// The search was cancelled before any candidate move was explored.
    #[error("Search cancelled before any move was explored")]
    Cancelled,

    /// The background search worker is gone.
    #[error("AI worker disconnected")]
    WorkerDisconnected,
}

/// Convenience Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
