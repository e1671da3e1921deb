//! Lifecycle contract shared by party games hosted in a room.

use serde_json::Value as JsonValue;

use crate::domain::actions::{Action, Rejection};
use crate::domain::engine::PhaseMachine;
use crate::domain::game_transition::LifecycleView;
use crate::domain::player_view::{project, Projection};
use crate::domain::session_record;
use crate::domain::state::{Player, PlayerId, Role};
use crate::errors::domain::DomainError;

/// What the session service needs from a game engine.
pub trait PartyGame: Send + Sync + 'static {
    type Action: Send;
    type View: Send;

    /// A room with nobody seated.
    fn lobby() -> Self;

    fn start(&mut self, players: Vec<Player>, seed: u64) -> Result<(), DomainError>;

    /// Decode a client payload. Never fails; unknown payloads become a no-op action.
    fn decode_action(payload: &JsonValue) -> Self::Action;

    fn apply(&mut self, actor: &str, action: &Self::Action) -> Result<(), Rejection>;

    fn view(&self, viewer: &str) -> Self::View;

    fn is_over(&self) -> bool;

    fn lifecycle(&self) -> LifecycleView;

    /// Secret roles dealt at start, for the reconnection side table.
    fn assigned_roles(&self) -> Vec<(PlayerId, Role)>;

    fn to_record(&self) -> Result<String, DomainError>;

    fn from_record(text: &str) -> Result<Self, DomainError>
    where
        Self: Sized;
}

impl PartyGame for PhaseMachine {
    type Action = Action;
    type View = Projection;

    fn lobby() -> Self {
        PhaseMachine::new()
    }

    fn start(&mut self, players: Vec<Player>, seed: u64) -> Result<(), DomainError> {
        PhaseMachine::start(self, players, seed)
    }

    fn decode_action(payload: &JsonValue) -> Action {
        Action::from_json(payload)
    }

    fn apply(&mut self, actor: &str, action: &Action) -> Result<(), Rejection> {
        match PhaseMachine::apply(self, actor, action).rejection() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    fn view(&self, viewer: &str) -> Projection {
        project(self.state(), viewer)
    }

    fn is_over(&self) -> bool {
        PhaseMachine::is_over(self)
    }

    fn lifecycle(&self) -> LifecycleView {
        LifecycleView::of(self.state())
    }

    fn assigned_roles(&self) -> Vec<(PlayerId, Role)> {
        self.state()
            .roles
            .iter()
            .map(|(id, role)| (id.clone(), *role))
            .collect()
    }

    fn to_record(&self) -> Result<String, DomainError> {
        session_record::encode(self.state())
    }

    fn from_record(text: &str) -> Result<Self, DomainError> {
        session_record::decode(text).map(PhaseMachine::from_state)
    }
}
