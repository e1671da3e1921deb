//! Bot players - automated seats for tests and self-play.
//!
//! This module provides:
//! - `Bot` trait for bot implementations
//! - `RandomBot`: picks uniformly among legal actions (seedable for tests)
//! - `create_bot` factory keyed by bot type

mod random;
mod trait_def;

pub use random::RandomBot;
use serde_json::Value as JsonValue;
pub use trait_def::{Bot, BotError};

/// Create a bot from a type name and optional JSON config.
///
/// Currently supports:
/// - "random": RandomBot with optional `seed` from config
///
/// Returns None if the bot type is unrecognized.
pub fn create_bot(bot_type: &str, config: Option<&JsonValue>) -> Option<Box<dyn Bot>> {
    match bot_type {
        "random" => {
            let seed = config.and_then(|c| c.get("seed")).and_then(|s| s.as_u64());
            Some(Box::new(RandomBot::new(seed)))
        }
        _ => None,
    }
}
