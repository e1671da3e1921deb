//! Presidential rotation.
//!
//! The rotation is a fixed permutation chosen at start. Dead players are
//! skipped, and a special election installs its target for exactly one turn.

use rand::seq::SliceRandom;

use crate::domain::seed_derivation::{derive_turn_order_seed, rng_for};
use crate::domain::state::{Phase, Player, PlayerId, SessionState};

/// Shuffle the seating into the fixed presidential rotation.
pub fn shuffled_turn_order(players: &[Player], game_seed: u64) -> Vec<PlayerId> {
    let mut order: Vec<PlayerId> = players.iter().map(|p| p.id.clone()).collect();
    let mut rng = rng_for(derive_turn_order_seed(game_seed));
    order.shuffle(&mut rng);
    order
}

/// Index of the sitting president in the rotation, falling back to the stored index.
///
/// A rehydrated session never trusts the stored index over the president itself.
pub fn resync_index(state: &SessionState) -> usize {
    state
        .president_candidate
        .as_deref()
        .and_then(|p| state.turn_position(p))
        .unwrap_or(state.current_president_index)
}

/// Next living seat after `from`, wrapping. Bounded to one lap.
fn next_alive_index(state: &SessionState, from: usize) -> usize {
    let len = state.turn_order.len();
    let mut index = (from + 1) % len;
    for _ in 0..len {
        if !state.dead_players.contains(&state.turn_order[index]) {
            return index;
        }
        index = (index + 1) % len;
    }
    tracing::warn!("Every player in the rotation is dead; rotation halted");
    index
}

/// Hand the presidency on and return to Nomination.
///
/// A pending special election takes precedence and leaves the index alone;
/// otherwise rotation resumes after the sitting president's seat.
pub fn advance(state: &mut SessionState) {
    if state.turn_order.is_empty() {
        return;
    }

    if let Some(next) = state.special_election_next.take() {
        tracing::debug!(president = %next, "Special election president installed");
        state.president_candidate = Some(next);
    } else {
        let from = resync_index(state);
        let index = next_alive_index(state, from);
        state.current_president_index = index;
        state.president_candidate = Some(state.turn_order[index].clone());
    }

    state.chancellor_candidate = None;
    state.chancellor = None;
    state.investigated_player = None;
    state.public_investigation = None;
    state.peeked_policies.clear();
    state.purge_remaining = 0;
    state.phase = Phase::Nomination;
}
