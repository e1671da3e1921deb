use crate::domain::state::{LastEnactment, Phase, PlayerId, PolicyTrack, SessionState, Victory};

/// The slice of a session that lifecycle transitions are derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleView {
    pub phase: Phase,
    pub president: Option<PlayerId>,
    pub enacted: PolicyTrack,
    pub last_enacted: Option<LastEnactment>,
    pub winner: Option<Victory>,
}

impl LifecycleView {
    pub fn of(state: &SessionState) -> Self {
        Self {
            phase: state.phase,
            president: state.president_candidate.clone(),
            enacted: state.enacted,
            last_enacted: state.last_enacted,
            winner: state.winner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameTransition {
    /// Edge-triggered: Lobby/GameOver -> in progress.
    GameStarted,

    /// Edge-triggered: the presidency passed to a specific player.
    PresidentBecame { player_id: PlayerId },

    /// Edge-triggered: a policy track moved.
    PolicyEnacted(LastEnactment),

    /// Edge-triggered: in progress -> GameOver.
    GameEnded(Victory),
}

fn in_progress(phase: Phase) -> bool {
    !matches!(phase, Phase::Lobby | Phase::GameOver)
}

/// Derive lifecycle transitions from before/after views.
pub fn derive_game_transitions(
    before: &LifecycleView,
    after: &LifecycleView,
) -> Vec<GameTransition> {
    let mut transitions = Vec::new();

    let started = !in_progress(before.phase) && in_progress(after.phase);
    if started {
        transitions.push(GameTransition::GameStarted);
    }

    if after.enacted.total() > before.enacted.total() || (started && after.enacted.total() > 0) {
        if let Some(last) = after.last_enacted {
            transitions.push(GameTransition::PolicyEnacted(last));
        }
    }

    if in_progress(after.phase) && (started || before.president != after.president) {
        if let Some(player_id) = after.president.clone() {
            transitions.push(GameTransition::PresidentBecame { player_id });
        }
    }

    if before.phase != Phase::GameOver && after.phase == Phase::GameOver {
        if let Some(victory) = after.winner {
            transitions.push(GameTransition::GameEnded(victory));
        }
    }

    transitions
}
