//! Bot trait definition.

use thiserror::Error;

use crate::domain::actions::Action;
use crate::domain::player_view::Projection;
use crate::error::AppError;

/// Errors that can occur during bot decision-making.
#[derive(Debug, Error)]
pub enum BotError {
    /// Nothing is legal for this seat right now.
    #[error("bot has no legal action")]
    NoLegalAction,
    #[error("bot internal error: {0}")]
    Internal(String),
}

impl From<BotError> for AppError {
    fn from(err: BotError) -> Self {
        AppError::internal(format!("Bot error: {err}"))
    }
}

/// Trait for bot seats.
///
/// Implementations see only the projection of their own seat and must pick
/// one of `view.legal_actions()`.
pub trait Bot: Send + Sync {
    fn choose_action(&self, view: &Projection) -> Result<Action, BotError>;
}
