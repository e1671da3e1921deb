use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::deck::PolicyDeck;
use crate::domain::rules::GameConfig;

/// Stable opaque player identifier handed to us by the room layer.
pub type PlayerId = String;

/// A seated player. Alive/dead is derived from `SessionState::dead_players`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, nickname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nickname: nickname.into(),
        }
    }
}

/// Secret role, assigned once at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Liberal,
    Fascist,
    Hitler,
}

impl Role {
    /// Party membership as revealed by an investigation.
    pub fn party(self) -> Party {
        match self {
            Role::Liberal => Party::Liberal,
            Role::Fascist | Role::Hitler => Party::Fascist,
        }
    }
}

/// Team allegiance. Also used as the winner of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Liberal,
    Fascist,
}

/// A policy card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Policy {
    Liberal,
    Fascist,
}

impl Policy {
    pub fn party(self) -> Party {
        match self {
            Policy::Liberal => Party::Liberal,
            Policy::Fascist => Party::Fascist,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ballot {
    Ja,
    Nein,
}

/// Session phases. Exactly one holds at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Created but not started.
    Lobby,
    /// President picks a chancellor candidate.
    Nomination,
    /// All living players vote on the proposed government.
    Vote,
    /// President holds three policies and discards one.
    LegislativePresident,
    /// Chancellor holds two policies, discards one, enacts the other.
    LegislativeChancellor,
    /// Chancellor asked for a veto; president must answer.
    VetoRequest,
    PolicyPeek,
    Investigation,
    Execution,
    SpecialElection,
    PublicInquest,
    MartialLaw,
    Purge,
    /// Terminal.
    GameOver,
}

impl Phase {
    pub fn is_legislative(self) -> bool {
        matches!(
            self,
            Phase::LegislativePresident | Phase::LegislativeChancellor | Phase::VetoRequest
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    LiberalPolicies,
    FascistPolicies,
    HitlerElected,
    HitlerExecuted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victory {
    pub party: Party,
    pub reason: WinReason,
}

/// Party reveal produced by Investigation or PublicInquest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyReveal {
    pub target: PlayerId,
    pub party: Party,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEnactment {
    pub policy: Policy,
    /// Enacted from the top of the deck after three failed elections.
    pub chaos: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTrack {
    pub liberal: u8,
    pub fascist: u8,
}

impl PolicyTrack {
    pub fn record(&mut self, policy: Policy) {
        match policy {
            Policy::Liberal => self.liberal = self.liberal.saturating_add(1),
            Policy::Fascist => self.fascist = self.fascist.saturating_add(1),
        }
    }

    pub fn total(&self) -> u8 {
        self.liberal.saturating_add(self.fascist)
    }
}

/// The session aggregate. Mutated only by `PhaseMachine`.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub players: Vec<Player>,
    pub config: Option<GameConfig>,
    pub roles: BTreeMap<PlayerId, Role>,
    pub enacted: PolicyTrack,
    pub deck: PolicyDeck,
    pub phase: Phase,
    pub president_candidate: Option<PlayerId>,
    pub chancellor_candidate: Option<PlayerId>,
    pub chancellor: Option<PlayerId>,
    pub votes: BTreeMap<PlayerId, Ballot>,
    pub turn_order: Vec<PlayerId>,
    pub current_president_index: usize,
    /// 0..=2; reaching 3 is converted into a chaos enactment in the same step.
    pub election_tracker: u8,
    pub drawn_policies: Vec<Policy>,
    pub last_enacted: Option<LastEnactment>,
    pub winner: Option<Victory>,
    /// One-way latch.
    pub veto_unlocked: bool,
    pub investigated_player: Option<PartyReveal>,
    pub peeked_policies: Vec<Policy>,
    pub special_election_next: Option<PlayerId>,
    pub dead_players: BTreeSet<PlayerId>,
    pub last_president_id: Option<PlayerId>,
    pub last_chancellor_id: Option<PlayerId>,
    pub public_investigation: Option<PartyReveal>,
    pub public_record: Vec<PartyReveal>,
    pub purge_remaining: u8,
    pub rng_seed: u64,
}

impl SessionState {
    /// Fresh lobby state with no players seated.
    pub fn lobby() -> Self {
        Self {
            players: Vec::new(),
            config: None,
            roles: BTreeMap::new(),
            enacted: PolicyTrack::default(),
            deck: PolicyDeck::empty(0),
            phase: Phase::Lobby,
            president_candidate: None,
            chancellor_candidate: None,
            chancellor: None,
            votes: BTreeMap::new(),
            turn_order: Vec::new(),
            current_president_index: 0,
            election_tracker: 0,
            drawn_policies: Vec::new(),
            last_enacted: None,
            winner: None,
            veto_unlocked: false,
            investigated_player: None,
            peeked_policies: Vec::new(),
            special_election_next: None,
            dead_players: BTreeSet::new(),
            last_president_id: None,
            last_chancellor_id: None,
            public_investigation: None,
            public_record: Vec::new(),
            purge_remaining: 0,
            rng_seed: 0,
        }
    }

    pub fn is_player(&self, id: &str) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn is_alive(&self, id: &str) -> bool {
        self.is_player(id) && !self.dead_players.contains(id)
    }

    pub fn alive_count(&self) -> usize {
        self.players
            .iter()
            .filter(|p| !self.dead_players.contains(&p.id))
            .count()
    }

    pub fn role_of(&self, id: &str) -> Option<Role> {
        self.roles.get(id).copied()
    }

    pub fn is_president(&self, id: &str) -> bool {
        self.president_candidate.as_deref() == Some(id)
    }

    pub fn is_chancellor(&self, id: &str) -> bool {
        self.chancellor.as_deref() == Some(id)
    }

    /// Position of a player in the fixed rotation.
    pub fn turn_position(&self, id: &str) -> Option<usize> {
        self.turn_order.iter().position(|p| p == id)
    }

    /// Cards of the current deck generation that are accounted for.
    ///
    /// Always equals `deck::DECK_SIZE` for a started game.
    pub fn policy_cards_in_play(&self) -> usize {
        self.deck.draw_pile_len()
            + self.deck.discard_len()
            + self.drawn_policies.len()
            + self.deck.enacted_in_generation() as usize
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::lobby()
    }
}
