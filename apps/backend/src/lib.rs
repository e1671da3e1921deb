#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod ai;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod repos;
pub mod services;
pub mod telemetry;


// Re-exports for public API
pub use adapters::InMemoryStore;
pub use ai::{Bot, BotError, RandomBot};
pub use config::EngineConfig;
pub use domain::{Action, ActionOutcome, PhaseMachine, Projection, Rejection};
pub use error::AppError;
pub use errors::{DomainError, ErrorCode};
pub use repos::{RoomState, SessionStore};
pub use services::{ActionReply, PartyGame, SessionService};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
