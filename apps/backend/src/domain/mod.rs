//! Domain layer: the pure session engine and its supporting types.

pub mod actions;
pub mod deck;
pub mod engine;
pub mod game_transition;
pub mod player_view;
pub mod powers;
pub mod roles;
pub mod rules;
pub mod seed_derivation;
pub mod session_record;
pub mod state;
pub mod turns;

#[cfg(test)]
mod tests_engine;
#[cfg(test)]
mod tests_player_view;

// Re-exports for ergonomics
pub use actions::{Action, ActionOutcome, Rejection};
pub use engine::PhaseMachine;
pub use game_transition::{derive_game_transitions, GameTransition, LifecycleView};
pub use player_view::{project, Projection, SeatView};
pub use rules::{config_for, Band, ExecutivePower, GameConfig};
pub use state::{
    Ballot, Party, Phase, Player, PlayerId, Policy, Role, SessionState, Victory, WinReason,
};
