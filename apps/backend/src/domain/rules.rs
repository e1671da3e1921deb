//! Player-count scaled game balance data.
//!
//! Every number here is design data. Nothing is derived by formula.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::domain::state::Phase;

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 20;

/// Highest fascist-policy count any schedule can reference.
pub const MAX_SCHEDULED_FASCIST: u8 = 7;

/// Player-count band. Each band has its own win thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Intimate,
    Classic,
    Mass,
    Dystopia,
}

impl Band {
    pub fn for_players(player_count: usize) -> Option<Band> {
        match player_count {
            3..=4 => Some(Band::Intimate),
            5..=10 => Some(Band::Classic),
            11..=15 => Some(Band::Mass),
            16..=20 => Some(Band::Dystopia),
            _ => None,
        }
    }

    pub fn player_range(self) -> RangeInclusive<usize> {
        match self {
            Band::Intimate => 3..=4,
            Band::Classic => 5..=10,
            Band::Mass => 11..=15,
            Band::Dystopia => 16..=20,
        }
    }
}

/// One-shot presidential power unlocked by a fascist enactment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutivePower {
    PolicyPeek,
    Investigation,
    SpecialElection,
    Execution,
    PublicInquest,
    MartialLaw,
    Purge,
}

impl ExecutivePower {
    pub fn phase(self) -> Phase {
        match self {
            ExecutivePower::PolicyPeek => Phase::PolicyPeek,
            ExecutivePower::Investigation => Phase::Investigation,
            ExecutivePower::SpecialElection => Phase::SpecialElection,
            ExecutivePower::Execution => Phase::Execution,
            ExecutivePower::PublicInquest => Phase::PublicInquest,
            ExecutivePower::MartialLaw => Phase::MartialLaw,
            ExecutivePower::Purge => Phase::Purge,
        }
    }
}

/// Fascist-count → power table. Index 0 is unused (no power before the first enactment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSchedule([Option<ExecutivePower>; MAX_SCHEDULED_FASCIST as usize + 1]);

impl PowerSchedule {
    const fn from_entries(entries: &[(u8, ExecutivePower)]) -> Self {
        let mut slots = [None; MAX_SCHEDULED_FASCIST as usize + 1];
        let mut i = 0;
        while i < entries.len() {
            let (count, power) = entries[i];
            slots[count as usize] = Some(power);
            i += 1;
        }
        Self(slots)
    }

    /// Power granted when the fascist track reaches `fascist_count`.
    pub fn power_at(&self, fascist_count: u8) -> Option<ExecutivePower> {
        self.0.get(fascist_count as usize).copied().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDistribution {
    pub liberals: u8,
    /// Fascists excluding Hitler.
    pub fascists: u8,
}

impl RoleDistribution {
    pub fn total(&self) -> usize {
        self.liberals as usize + self.fascists as usize + 1
    }
}

/// Rules for one exact player count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub player_count: u8,
    pub band: Band,
    pub liberal_win: u8,
    pub fascist_win: u8,
    /// Electing Hitler chancellor once this many fascist policies are enacted ends the game.
    pub hitler_zone: u8,
    pub veto_unlock: u8,
    pub hitler_knows_team: bool,
    pub roles: RoleDistribution,
    pub powers: PowerSchedule,
}

use ExecutivePower::{
    Execution, Investigation, MartialLaw, PolicyPeek, PublicInquest, Purge, SpecialElection,
};

const INTIMATE_POWERS: PowerSchedule = PowerSchedule::from_entries(&[
    (1, PolicyPeek),
    (2, Investigation),
    (3, SpecialElection),
    (4, Execution),
]);

const CLASSIC_SMALL_POWERS: PowerSchedule =
    PowerSchedule::from_entries(&[(3, PolicyPeek), (4, Execution), (5, Execution)]);

const CLASSIC_MEDIUM_POWERS: PowerSchedule = PowerSchedule::from_entries(&[
    (2, Investigation),
    (3, SpecialElection),
    (4, Execution),
    (5, Execution),
]);

const CLASSIC_LARGE_POWERS: PowerSchedule = PowerSchedule::from_entries(&[
    (1, Investigation),
    (2, Investigation),
    (3, SpecialElection),
    (4, Execution),
    (5, Execution),
]);

const MASS_POWERS: PowerSchedule = PowerSchedule::from_entries(&[
    (1, Investigation),
    (2, PublicInquest),
    (3, SpecialElection),
    (4, Execution),
    (5, Execution),
    (6, Execution),
]);

const DYSTOPIA_POWERS: PowerSchedule = PowerSchedule::from_entries(&[
    (1, Investigation),
    (2, PublicInquest),
    (3, MartialLaw),
    (4, Execution),
    (5, Execution),
    (6, Purge),
    (7, Execution),
]);

/// (liberals, fascists excluding Hitler) indexed by player count - 3.
const ROLE_TABLE: [(u8, u8); MAX_PLAYERS - MIN_PLAYERS + 1] = [
    (2, 0),  // 3
    (2, 1),  // 4
    (3, 1),  // 5
    (4, 1),  // 6
    (4, 2),  // 7
    (5, 2),  // 8
    (5, 3),  // 9
    (6, 3),  // 10
    (6, 4),  // 11
    (7, 4),  // 12
    (7, 5),  // 13
    (8, 5),  // 14
    (8, 6),  // 15
    (9, 6),  // 16
    (9, 7),  // 17
    (10, 7), // 18
    (10, 8), // 19
    (11, 8), // 20
];

/// Look up the rules for an exact player count. `None` outside 3..=20.
pub fn config_for(player_count: usize) -> Option<GameConfig> {
    let band = Band::for_players(player_count)?;
    let (liberal_win, fascist_win, hitler_zone) = match band {
        Band::Intimate => (4, 5, 2),
        Band::Classic => (5, 6, 3),
        Band::Mass => (6, 7, 4),
        Band::Dystopia => (6, 8, 5),
    };
    let powers = match (band, player_count) {
        (Band::Intimate, _) => INTIMATE_POWERS,
        (Band::Classic, 5..=6) => CLASSIC_SMALL_POWERS,
        (Band::Classic, 7..=8) => CLASSIC_MEDIUM_POWERS,
        (Band::Classic, _) => CLASSIC_LARGE_POWERS,
        (Band::Mass, _) => MASS_POWERS,
        (Band::Dystopia, _) => DYSTOPIA_POWERS,
    };
    let (liberals, fascists) = ROLE_TABLE[player_count - MIN_PLAYERS];

    Some(GameConfig {
        player_count: player_count as u8,
        band,
        liberal_win,
        fascist_win,
        hitler_zone,
        veto_unlock: fascist_win - 1,
        hitler_knows_team: player_count <= 6,
        roles: RoleDistribution {
            liberals,
            fascists,
        },
        powers,
    })
}
