//! Error codes for the party backend.
//!
//! This module defines all error codes surfaced to the room layer.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE.

use core::fmt;

/// Centralized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Setup validation
    /// Fewer than the minimum number of players
    NotEnoughPlayers,
    /// More players than any band supports
    TooManyPlayers,
    /// Same player id listed twice
    DuplicatePlayer,
    /// Start requested while a game is running
    GameAlreadyStarted,
    /// Registry is at its configured capacity
    RoomLimitReached,
    /// General validation error
    ValidationError,

    // Resource Not Found
    /// No session stored or resident for the room
    RoomNotFound,

    // System Errors
    /// Session store could not be reached
    StoreUnavailable,
    /// Stored session record failed validation
    DataCorruption,
    /// Configuration error
    ConfigError,
    /// Internal error
    Internal,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::TooManyPlayers => "TOO_MANY_PLAYERS",
            Self::DuplicatePlayer => "DUPLICATE_PLAYER",
            Self::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            Self::RoomLimitReached => "ROOM_LIMIT_REACHED",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::RoomNotFound => "ROOM_NOT_FOUND",

            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
