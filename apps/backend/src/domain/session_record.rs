//! Persisted form of a session.
//!
//! A `SessionRecord` is the whole `SessionState` flattened into one serde
//! document. Decoding validates the structure before anything reaches the
//! engine: a record that cannot describe a reachable state is reported as
//! corruption rather than reinterpreted.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::deck::{PolicyDeck, DECK_SIZE, FASCIST_CARDS, HAND_SIZE, LIBERAL_CARDS};
use crate::domain::rules::config_for;
use crate::domain::state::{
    Ballot, LastEnactment, PartyReveal, Phase, Player, PlayerId, Policy, PolicyTrack, Role,
    SessionState, Victory,
};
use crate::errors::domain::DomainError;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRecord {
    pub draw_pile: Vec<Policy>,
    pub discard: Vec<Policy>,
    pub enacted_in_generation: u8,
    pub generation: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub schema_version: u32,
    pub players: Vec<Player>,
    pub rng_seed: u64,
    pub roles: BTreeMap<PlayerId, Role>,
    pub enacted: PolicyTrack,
    pub deck: DeckRecord,
    pub phase: Phase,
    pub president_candidate: Option<PlayerId>,
    pub chancellor_candidate: Option<PlayerId>,
    pub chancellor: Option<PlayerId>,
    pub votes: BTreeMap<PlayerId, Ballot>,
    pub turn_order: Vec<PlayerId>,
    pub current_president_index: usize,
    pub election_tracker: u8,
    pub drawn_policies: Vec<Policy>,
    pub last_enacted: Option<LastEnactment>,
    pub winner: Option<Victory>,
    pub veto_unlocked: bool,
    pub investigated_player: Option<PartyReveal>,
    pub peeked_policies: Vec<Policy>,
    pub special_election_next: Option<PlayerId>,
    pub dead_players: BTreeSet<PlayerId>,
    pub last_president_id: Option<PlayerId>,
    pub last_chancellor_id: Option<PlayerId>,
    pub public_investigation: Option<PartyReveal>,
    #[serde(default)]
    pub public_record: Vec<PartyReveal>,
    pub purge_remaining: u8,
}

impl SessionRecord {
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            players: state.players.clone(),
            rng_seed: state.rng_seed,
            roles: state.roles.clone(),
            enacted: state.enacted,
            deck: DeckRecord {
                draw_pile: state.deck.draw_pile().to_vec(),
                discard: state.deck.discard_pile().to_vec(),
                enacted_in_generation: state.deck.enacted_in_generation(),
                generation: state.deck.generation(),
            },
            phase: state.phase,
            president_candidate: state.president_candidate.clone(),
            chancellor_candidate: state.chancellor_candidate.clone(),
            chancellor: state.chancellor.clone(),
            votes: state.votes.clone(),
            turn_order: state.turn_order.clone(),
            current_president_index: state.current_president_index,
            election_tracker: state.election_tracker,
            drawn_policies: state.drawn_policies.clone(),
            last_enacted: state.last_enacted,
            winner: state.winner,
            veto_unlocked: state.veto_unlocked,
            investigated_player: state.investigated_player.clone(),
            peeked_policies: state.peeked_policies.clone(),
            special_election_next: state.special_election_next.clone(),
            dead_players: state.dead_players.clone(),
            last_president_id: state.last_president_id.clone(),
            last_chancellor_id: state.last_chancellor_id.clone(),
            public_investigation: state.public_investigation.clone(),
            public_record: state.public_record.clone(),
            purge_remaining: state.purge_remaining,
        }
    }
}

/// Encode a state as the JSON text stored per room.
pub fn encode(state: &SessionState) -> Result<String, DomainError> {
    serde_json::to_string(&SessionRecord::from_state(state))
        .map_err(|e| DomainError::corrupt(format!("encode session: {e}")))
}

/// Decode and validate stored JSON text.
pub fn decode(text: &str) -> Result<SessionState, DomainError> {
    let record: SessionRecord = serde_json::from_str(text)
        .map_err(|e| DomainError::corrupt(format!("decode session: {e}")))?;
    SessionState::try_from(record)
}

fn corrupt<T>(detail: impl Into<String>) -> Result<T, DomainError> {
    Err(DomainError::corrupt(detail))
}

fn check_member(
    ids: &BTreeSet<&str>,
    field: &str,
    id: Option<&PlayerId>,
) -> Result<(), DomainError> {
    match id {
        Some(id) if !ids.contains(id.as_str()) => corrupt(format!("{field} {id} is not seated")),
        _ => Ok(()),
    }
}

/// A reveal must name a seated player and report that player's true party.
fn check_reveal(
    roles: &BTreeMap<PlayerId, Role>,
    field: &str,
    reveal: &PartyReveal,
) -> Result<(), DomainError> {
    match roles.get(&reveal.target) {
        None => corrupt(format!("{field} target {} is not seated", reveal.target)),
        Some(role) if role.party() != reveal.party => {
            corrupt(format!("{field} misreports {}", reveal.target))
        }
        Some(_) => Ok(()),
    }
}

impl TryFrom<SessionRecord> for SessionState {
    type Error = DomainError;

    fn try_from(r: SessionRecord) -> Result<Self, Self::Error> {
        if r.schema_version != SCHEMA_VERSION {
            return corrupt(format!("unsupported schema version {}", r.schema_version));
        }
        if r.phase == Phase::Lobby {
            return Ok(SessionState {
                players: r.players,
                ..SessionState::lobby()
            });
        }

        let ids: BTreeSet<&str> = r.players.iter().map(|p| p.id.as_str()).collect();
        if ids.len() != r.players.len() {
            return corrupt("duplicate player ids");
        }
        let Some(config) = config_for(r.players.len()) else {
            return corrupt(format!("no rules for {} players", r.players.len()));
        };

        let role_ids: BTreeSet<&str> = r.roles.keys().map(String::as_str).collect();
        if role_ids != ids {
            return corrupt("roles do not cover exactly the seated players");
        }
        let count = |role: Role| r.roles.values().filter(|x| **x == role).count();
        if count(Role::Hitler) != 1 {
            return corrupt("expected exactly one Hitler");
        }
        if count(Role::Fascist) != config.roles.fascists as usize
            || count(Role::Liberal) != config.roles.liberals as usize
        {
            return corrupt("role distribution does not match player count");
        }

        let order: BTreeSet<&str> = r.turn_order.iter().map(String::as_str).collect();
        if order != ids || r.turn_order.len() != ids.len() {
            return corrupt("turn order is not a permutation of the players");
        }

        if r.president_candidate.is_none() {
            return corrupt("started session without a president");
        }
        check_member(&ids, "president", r.president_candidate.as_ref())?;
        check_member(&ids, "chancellor candidate", r.chancellor_candidate.as_ref())?;
        check_member(&ids, "chancellor", r.chancellor.as_ref())?;
        check_member(&ids, "special election target", r.special_election_next.as_ref())?;
        check_member(&ids, "last president", r.last_president_id.as_ref())?;
        check_member(&ids, "last chancellor", r.last_chancellor_id.as_ref())?;
        if r.votes.keys().any(|v| !ids.contains(v.as_str())) {
            return corrupt("vote from an unseated player");
        }
        if r.dead_players.iter().any(|d| !ids.contains(d.as_str())) {
            return corrupt("unseated player marked dead");
        }

        if r.election_tracker > 2 {
            return corrupt(format!("election tracker at {}", r.election_tracker));
        }
        if (r.phase == Phase::GameOver) != r.winner.is_some() {
            return corrupt("winner does not agree with phase");
        }
        let expected_hand = match r.phase {
            Phase::LegislativePresident => HAND_SIZE,
            Phase::LegislativeChancellor | Phase::VetoRequest => HAND_SIZE - 1,
            _ => 0,
        };
        if r.phase != Phase::GameOver && r.drawn_policies.len() != expected_hand {
            return corrupt(format!(
                "{} drawn policies in {:?}",
                r.drawn_policies.len(),
                r.phase
            ));
        }
        if r.phase.is_legislative() && r.chancellor.is_none() {
            return corrupt("legislative session without a chancellor");
        }
        if r.phase == Phase::Vote && r.chancellor_candidate.is_none() {
            return corrupt("vote without a candidate");
        }
        if r.purge_remaining > 2 {
            return corrupt(format!("purge counter {}", r.purge_remaining));
        }

        let track = r.enacted;
        let over = r.phase == Phase::GameOver;
        let below = |count: u8, win: u8| if over { count <= win } else { count < win };
        if !below(track.liberal, config.liberal_win) || !below(track.fascist, config.fascist_win) {
            return corrupt(format!(
                "policy track {}/{} impossible in {:?}",
                track.liberal, track.fascist, r.phase
            ));
        }
        if r.veto_unlocked != (track.fascist >= config.veto_unlock) {
            return corrupt("veto latch does not match the fascist track");
        }
        if (r.purge_remaining > 0) != (r.phase == Phase::Purge) {
            return corrupt(format!("purge counter {} in {:?}", r.purge_remaining, r.phase));
        }

        if let Some(reveal) = &r.investigated_player {
            if r.phase != Phase::Investigation {
                return corrupt(format!("pending investigation in {:?}", r.phase));
            }
            check_reveal(&r.roles, "investigation", reveal)?;
        }
        if let Some(reveal) = &r.public_investigation {
            if r.phase != Phase::PublicInquest {
                return corrupt(format!("pending public inquest in {:?}", r.phase));
            }
            check_reveal(&r.roles, "public inquest", reveal)?;
        }
        for reveal in &r.public_record {
            check_reveal(&r.roles, "public record", reveal)?;
        }

        let unplayed = r
            .deck
            .draw_pile
            .iter()
            .chain(&r.deck.discard)
            .chain(&r.drawn_policies);
        let liberal_cards = unplayed.filter(|c| **c == Policy::Liberal).count();
        let fascist_cards = r.deck.draw_pile.len() + r.deck.discard.len() + r.drawn_policies.len()
            - liberal_cards;
        if liberal_cards > LIBERAL_CARDS || fascist_cards > FASCIST_CARDS {
            return corrupt(format!(
                "{liberal_cards} liberal and {fascist_cards} fascist cards outside the 6/11 split"
            ));
        }
        if r.deck.enacted_in_generation > track.total() {
            return corrupt("more enactments from this deck than on the track");
        }
        if !r.peeked_policies.is_empty()
            && (r.phase != Phase::PolicyPeek
                || r.deck.draw_pile.get(..HAND_SIZE) != Some(r.peeked_policies.as_slice()))
        {
            return corrupt("peeked policies do not match the top of the deck");
        }

        let deck = PolicyDeck::from_parts(
            r.deck.draw_pile,
            r.deck.discard,
            r.deck.enacted_in_generation,
            r.deck.generation,
            r.rng_seed,
        );
        let in_play = deck.draw_pile_len()
            + deck.discard_len()
            + r.drawn_policies.len()
            + deck.enacted_in_generation() as usize;
        if in_play != DECK_SIZE {
            return corrupt(format!("{in_play} policy cards accounted for"));
        }

        Ok(SessionState {
            players: r.players,
            config: Some(config),
            roles: r.roles,
            enacted: r.enacted,
            deck,
            phase: r.phase,
            president_candidate: r.president_candidate,
            chancellor_candidate: r.chancellor_candidate,
            chancellor: r.chancellor,
            votes: r.votes,
            turn_order: r.turn_order,
            current_president_index: r.current_president_index,
            election_tracker: r.election_tracker,
            drawn_policies: r.drawn_policies,
            last_enacted: r.last_enacted,
            winner: r.winner,
            veto_unlocked: r.veto_unlocked,
            investigated_player: r.investigated_player,
            peeked_policies: r.peeked_policies,
            special_election_next: r.special_election_next,
            dead_players: r.dead_players,
            last_president_id: r.last_president_id,
            last_chancellor_id: r.last_chancellor_id,
            public_investigation: r.public_investigation,
            public_record: r.public_record,
            purge_remaining: r.purge_remaining,
            rng_seed: r.rng_seed,
        })
    }
}
