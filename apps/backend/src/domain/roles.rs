//! Role assignment at game start.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;

use crate::domain::rules::{RoleDistribution, MIN_PLAYERS};
use crate::domain::seed_derivation::{derive_role_seed, rng_for};
use crate::domain::state::{Player, PlayerId, Role};
use crate::errors::domain::{DomainError, ValidationKind};

/// Build the shuffled role list and zip it positionally with `players`.
///
/// Produces exactly one Hitler, `distribution.fascists` Fascists and
/// Liberals for the rest.
pub fn assign_roles(
    players: &[Player],
    distribution: RoleDistribution,
    game_seed: u64,
) -> Result<BTreeMap<PlayerId, Role>, DomainError> {
    if players.len() < MIN_PLAYERS {
        return Err(DomainError::validation(
            ValidationKind::NotEnoughPlayers,
            format!("Not enough players (min {MIN_PLAYERS})"),
        ));
    }
    if players.len() != distribution.total() {
        return Err(DomainError::validation(
            ValidationKind::Other("ROLE_COUNT_MISMATCH".into()),
            format!(
                "Role distribution covers {} players, got {}",
                distribution.total(),
                players.len()
            ),
        ));
    }

    let mut roles = Vec::with_capacity(players.len());
    roles.push(Role::Hitler);
    roles.extend(std::iter::repeat_n(
        Role::Fascist,
        distribution.fascists as usize,
    ));
    roles.extend(std::iter::repeat_n(
        Role::Liberal,
        distribution.liberals as usize,
    ));

    let mut rng = rng_for(derive_role_seed(game_seed));
    roles.shuffle(&mut rng);

    Ok(players
        .iter()
        .map(|p| p.id.clone())
        .zip(roles)
        .collect())
}
