//! Player view of session state: what one viewer is allowed to see.
//!
//! [`project`] renders a redacted [`Projection`] for a viewer. It is a pure
//! function of the state, so two calls with no action in between return the
//! same value. [`Projection::legal_actions`] enumerates the moves open to the
//! viewer using only what the projection itself shows.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::actions::Action;
use crate::domain::rules::GameConfig;
use crate::domain::state::{
    Ballot, LastEnactment, PartyReveal, Phase, PlayerId, Policy, PolicyTrack, Role,
    SessionState, Victory,
};

/// One seat as seen by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatView {
    pub id: PlayerId,
    pub nickname: String,
    pub alive: bool,
    /// Only present when the viewer is entitled to know it.
    pub role: Option<Role>,
    pub has_voted: bool,
}

/// Everything visible to one viewer at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    /// `None` for spectators and anyone not seated in this game.
    pub viewer: Option<PlayerId>,
    pub my_role: Option<Role>,
    pub phase: Phase,
    pub config: Option<GameConfig>,
    pub seats: Vec<SeatView>,
    pub turn_order: Vec<PlayerId>,
    pub enacted: PolicyTrack,
    pub election_tracker: u8,
    pub president_candidate: Option<PlayerId>,
    pub chancellor_candidate: Option<PlayerId>,
    pub chancellor: Option<PlayerId>,
    pub last_president_id: Option<PlayerId>,
    pub last_chancellor_id: Option<PlayerId>,
    /// Hidden while a vote is open; afterwards the last round's ballots.
    pub votes: Option<BTreeMap<PlayerId, Ballot>>,
    pub draw_pile_count: usize,
    pub discard_count: usize,
    /// Cards in the viewer's own hand.
    pub drawn_policies: Vec<Policy>,
    pub peeked_policies: Vec<Policy>,
    /// Pending private investigation, president only.
    pub investigation: Option<PartyReveal>,
    pub public_investigation: Option<PartyReveal>,
    pub public_record: Vec<PartyReveal>,
    pub veto_unlocked: bool,
    pub purge_remaining: u8,
    pub last_enacted: Option<LastEnactment>,
    pub winner: Option<Victory>,
}

/// Render the session for `viewer`.
pub fn project(state: &SessionState, viewer: &str) -> Projection {
    let seated = state.is_player(viewer);
    let my_role = if seated { state.role_of(viewer) } else { None };
    let is_president = seated && state.is_president(viewer);
    let is_chancellor = seated && state.is_chancellor(viewer);

    let seats = state
        .players
        .iter()
        .map(|p| SeatView {
            id: p.id.clone(),
            nickname: p.nickname.clone(),
            alive: !state.dead_players.contains(&p.id),
            role: visible_role(state, my_role, viewer, &p.id),
            has_voted: state.phase == Phase::Vote && state.votes.contains_key(&p.id),
        })
        .collect();

    let drawn_policies = match state.phase {
        Phase::LegislativePresident if is_president => state.drawn_policies.clone(),
        Phase::LegislativeChancellor | Phase::VetoRequest if is_chancellor => {
            state.drawn_policies.clone()
        }
        _ => Vec::new(),
    };
    let peeked_policies = if is_president && state.phase == Phase::PolicyPeek {
        state.peeked_policies.clone()
    } else {
        Vec::new()
    };
    let investigation = if is_president {
        state.investigated_player.clone()
    } else {
        None
    };
    let votes = (state.phase != Phase::Vote).then(|| state.votes.clone());

    Projection {
        viewer: seated.then(|| viewer.to_string()),
        my_role,
        phase: state.phase,
        config: state.config,
        seats,
        turn_order: state.turn_order.clone(),
        enacted: state.enacted,
        election_tracker: state.election_tracker,
        president_candidate: state.president_candidate.clone(),
        chancellor_candidate: state.chancellor_candidate.clone(),
        chancellor: state.chancellor.clone(),
        last_president_id: state.last_president_id.clone(),
        last_chancellor_id: state.last_chancellor_id.clone(),
        votes,
        draw_pile_count: state.deck.draw_pile_len(),
        discard_count: state.deck.discard_len(),
        drawn_policies,
        peeked_policies,
        investigation,
        public_investigation: state.public_investigation.clone(),
        public_record: state.public_record.clone(),
        veto_unlocked: state.veto_unlocked,
        purge_remaining: state.purge_remaining,
        last_enacted: state.last_enacted,
        winner: state.winner,
    }
}

fn visible_role(
    state: &SessionState,
    my_role: Option<Role>,
    viewer: &str,
    target: &str,
) -> Option<Role> {
    let role = state.role_of(target)?;
    if state.phase == Phase::GameOver || viewer == target {
        return Some(role);
    }
    let hitler_knows_team = state.config.is_some_and(|c| c.hitler_knows_team);
    let sees_fascists = match my_role {
        Some(Role::Fascist) => true,
        Some(Role::Hitler) => hitler_knows_team,
        _ => false,
    };
    (sees_fascists && role != Role::Liberal).then_some(role)
}

impl Projection {
    fn is_me(&self, id: Option<&PlayerId>) -> bool {
        self.viewer.is_some() && self.viewer.as_ref() == id
    }

    fn alive(&self) -> impl Iterator<Item = &SeatView> {
        self.seats.iter().filter(|s| s.alive)
    }

    /// Living players other than the viewer.
    fn others_alive(&self) -> Vec<PlayerId> {
        self.alive()
            .filter(|s| Some(&s.id) != self.viewer.as_ref())
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Whether the viewer sits in this game and is still alive.
    pub fn viewer_alive(&self) -> bool {
        self.viewer
            .as_ref()
            .is_some_and(|v| self.seats.iter().any(|s| &s.id == v && s.alive))
    }

    /// Players the viewer could nominate as chancellor right now.
    pub fn eligible_chancellors(&self) -> Vec<PlayerId> {
        let alive = self.alive_count();
        let enforce_president_limit = alive >= 5;
        let enforce_chancellor_limit = alive > 2;
        let last_chancellor = self.last_chancellor_id.as_ref();
        let last_president = self.last_president_id.as_ref();
        self.others_alive()
            .into_iter()
            .filter(|id| !(enforce_chancellor_limit && Some(id) == last_chancellor))
            .filter(|id| !(enforce_president_limit && Some(id) == last_president))
            .collect()
    }

    /// Actions the viewer may legally submit, derived from this projection only.
    pub fn legal_actions(&self) -> Vec<Action> {
        if !self.viewer_alive() {
            return Vec::new();
        }
        let president = self.is_me(self.president_candidate.as_ref());
        let chancellor = self.is_me(self.chancellor.as_ref());
        let targets = |make: fn(PlayerId) -> Action| -> Vec<Action> {
            self.others_alive().into_iter().map(make).collect()
        };

        match self.phase {
            Phase::Nomination if president => self
                .eligible_chancellors()
                .into_iter()
                .map(|candidate_id| Action::NominateChancellor { candidate_id })
                .collect(),
            Phase::Vote => {
                let voted = self
                    .seats
                    .iter()
                    .any(|s| Some(&s.id) == self.viewer.as_ref() && s.has_voted);
                if voted {
                    Vec::new()
                } else {
                    vec![
                        Action::Vote { vote: Ballot::Ja },
                        Action::Vote { vote: Ballot::Nein },
                    ]
                }
            }
            Phase::LegislativePresident if president => distinct(&self.drawn_policies)
                .into_iter()
                .map(|discarded_policy| Action::PresidentDiscard { discarded_policy })
                .collect(),
            Phase::LegislativeChancellor if chancellor => {
                let mut actions: Vec<Action> = distinct(&self.drawn_policies)
                    .into_iter()
                    .map(|discarded_policy| Action::ChancellorDiscard { discarded_policy })
                    .collect();
                if self.veto_unlocked {
                    actions.push(Action::VetoRequest);
                }
                actions
            }
            Phase::VetoRequest if president => vec![
                Action::VetoResponse { approved: true },
                Action::VetoResponse { approved: false },
            ],
            Phase::PolicyPeek if president => vec![Action::PolicyPeekDone],
            Phase::Investigation if president => match self.investigation {
                Some(_) => vec![Action::InvestigationConfirm],
                None => targets(|target_id| Action::InvestigatePlayer { target_id }),
            },
            Phase::PublicInquest if president => match self.public_investigation {
                Some(_) => vec![Action::PublicInquestConfirm],
                None => targets(|target_id| Action::PublicInquest { target_id }),
            },
            Phase::SpecialElection if president => {
                targets(|target_id| Action::SpecialElection { target_id })
            }
            Phase::Execution if president => targets(|target_id| Action::Execution { target_id }),
            Phase::Purge if president => targets(|target_id| Action::Purge { target_id }),
            Phase::MartialLaw if president => {
                let alive: Vec<PlayerId> = self.alive().map(|s| s.id.clone()).collect();
                let mut actions = Vec::new();
                for p in &alive {
                    for c in alive.iter().filter(|c| *c != p) {
                        actions.push(Action::MartialLaw {
                            next_president_id: p.clone(),
                            next_chancellor_id: c.clone(),
                        });
                    }
                }
                actions
            }
            _ => Vec::new(),
        }
    }
}

fn distinct(cards: &[Policy]) -> Vec<Policy> {
    let mut out = Vec::new();
    for card in cards {
        if !out.contains(card) {
            out.push(*card);
        }
    }
    out
}
