//! Errors reported back to the originating connection.

use crate::game::BoardError;

/// Every variant is non-fatal and leaves room and session state unchanged.
/// `Display` is the message shown to the player.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("Enter a room code.")]
    MissingRoomCode,
    #[error("Room not found.")]
    RoomNotFound,
    #[error("Room is full.")]
    RoomFull,
    #[error("Room no longer exists.")]
    RoomGone,
    #[error("Session expired. Please join again.")]
    TokenUnrecognized,
    #[error("Join a room first.")]
    NoSession,
    #[error("Waiting for second player.")]
    OpponentMissing,
    #[error("Round is over. Restart round.")]
    RoundAlreadyOver,
    #[error("Not your turn.")]
    NotYourTurn,
    #[error("Invalid move.")]
    InvalidIndex,
    #[error("Cell already used.")]
    CellOccupied,
}

impl GameError {
    /// Rejoin failures are surfaced separately so the client can drop its
    /// stored room code and token.
    pub fn is_rejoin_failure(&self) -> bool {
        matches!(self, GameError::RoomGone | GameError::TokenUnrecognized)
    }
}

impl From<BoardError> for GameError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::InvalidIndex => GameError::InvalidIndex,
            BoardError::CellOccupied => GameError::CellOccupied,
        }
    }
}
