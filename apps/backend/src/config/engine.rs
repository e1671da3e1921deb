use std::env;
use std::str::FromStr;

use crate::error::AppError;

/// Process-level engine settings, read once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Fixed base seed for every game. `None` draws a fresh seed per game.
    pub rng_seed: Option<u64>,
    /// Cap on resident rooms. `None` is unlimited.
    pub max_rooms: Option<usize>,
}

impl EngineConfig {
    /// Read `GAME_RNG_SEED` and `GAME_MAX_ROOMS` from the environment.
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            rng_seed: optional_var("GAME_RNG_SEED")?,
            max_rooms: optional_var("GAME_MAX_ROOMS")?,
        })
    }

    /// Base seed for the next game.
    pub fn game_seed(&self) -> u64 {
        self.rng_seed.unwrap_or_else(rand::random)
    }
}

/// Parse an optional variable; unset or blank means `None`.
fn optional_var<T: FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            AppError::config(format!("{name} must be a non-negative integer, got '{raw}'"))
        }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
