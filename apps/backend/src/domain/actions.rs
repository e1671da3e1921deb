//! Player actions and the reasons they can be turned away.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::domain::state::{Ballot, Policy, PlayerId};

/// Closed set of actions a player can submit, tagged by `"type"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    NominateChancellor {
        candidate_id: PlayerId,
    },
    Vote {
        vote: Ballot,
    },
    PresidentDiscard {
        discarded_policy: Policy,
    },
    ChancellorDiscard {
        discarded_policy: Policy,
    },
    VetoRequest,
    VetoResponse {
        approved: bool,
    },
    InvestigatePlayer {
        target_id: PlayerId,
    },
    InvestigationConfirm,
    PublicInquest {
        target_id: PlayerId,
    },
    PublicInquestConfirm,
    SpecialElection {
        target_id: PlayerId,
    },
    MartialLaw {
        next_president_id: PlayerId,
        next_chancellor_id: PlayerId,
    },
    Execution {
        target_id: PlayerId,
    },
    Purge {
        target_id: PlayerId,
    },
    PolicyPeekDone,
    /// Any kind we do not recognise. Always a no-op.
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Decode a client payload. Malformed payloads become `Unknown`.
    pub fn from_json(payload: &JsonValue) -> Action {
        match serde_json::from_value::<Action>(payload.clone()) {
            Ok(action) => action,
            Err(err) => {
                tracing::debug!(error = %err, "Undecodable action payload");
                Action::Unknown
            }
        }
    }

    /// Snake-case kind name as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::NominateChancellor { .. } => "nominate_chancellor",
            Action::Vote { .. } => "vote",
            Action::PresidentDiscard { .. } => "president_discard",
            Action::ChancellorDiscard { .. } => "chancellor_discard",
            Action::VetoRequest => "veto_request",
            Action::VetoResponse { .. } => "veto_response",
            Action::InvestigatePlayer { .. } => "investigate_player",
            Action::InvestigationConfirm => "investigation_confirm",
            Action::PublicInquest { .. } => "public_inquest",
            Action::PublicInquestConfirm => "public_inquest_confirm",
            Action::SpecialElection { .. } => "special_election",
            Action::MartialLaw { .. } => "martial_law",
            Action::Execution { .. } => "execution",
            Action::Purge { .. } => "purge",
            Action::PolicyPeekDone => "policy_peek_done",
            Action::Unknown => "unknown",
        }
    }
}

/// Why an action was ignored. The session state is untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    #[error("action not valid in the current phase")]
    WrongPhase,
    #[error("not your turn")]
    NotYourTurn,
    #[error("no such player in this game")]
    UnknownPlayer,
    #[error("player is dead")]
    PlayerDead,
    #[error("cannot target yourself")]
    SelfTarget,
    #[error("candidate is term limited")]
    TermLimited,
    #[error("policy not held")]
    CardNotHeld,
    #[error("veto power not unlocked")]
    VetoLocked,
    #[error("a result is already pending")]
    ResultPending,
    #[error("nothing to confirm")]
    NothingToConfirm,
    #[error("president and chancellor must differ")]
    SamePlayer,
    #[error("unknown action")]
    UnknownAction,
}

/// Result of feeding one action to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    Rejected(Rejection),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied)
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            ActionOutcome::Applied => None,
            ActionOutcome::Rejected(r) => Some(*r),
        }
    }
}
