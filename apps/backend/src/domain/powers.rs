//! Executive power dispatch after a fascist enactment.

use crate::domain::rules::{ExecutivePower, GameConfig};

/// Power unlocked when the fascist track reaches `fascist_count`, if any.
pub fn power_for(fascist_count: u8, config: &GameConfig) -> Option<ExecutivePower> {
    config.powers.power_at(fascist_count)
}

/// One-way veto latch: once unlocked it never closes again.
pub fn veto_unlocked(already: bool, fascist_count: u8, config: &GameConfig) -> bool {
    already || fascist_count >= config.veto_unlock
}
