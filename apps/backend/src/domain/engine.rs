//! The session state machine.
//!
//! `PhaseMachine` validates one action at a time and applies it to
//! completion, including cascades (chaos enactment, win checks, power
//! dispatch). Every handler validates before it mutates, so a rejected
//! action leaves the state exactly as it was.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::domain::actions::{Action, ActionOutcome, Rejection};
use crate::domain::deck::{PolicyDeck, DECK_SIZE, HAND_SIZE};
use crate::domain::powers::{power_for, veto_unlocked};
use crate::domain::roles::assign_roles;
use crate::domain::rules::{config_for, ExecutivePower, GameConfig, MAX_PLAYERS, MIN_PLAYERS};
use crate::domain::state::{
    Ballot, LastEnactment, Party, PartyReveal, Phase, Player, Policy, Role, SessionState,
    Victory, WinReason,
};
use crate::domain::turns::{advance, resync_index, shuffled_turn_order};
use crate::errors::domain::{DomainError, ValidationKind};

/// Failed elections in a row that force a chaos enactment.
pub const CHAOS_THRESHOLD: u8 = 3;

/// Kills granted by the Purge power.
pub const PURGE_KILLS: u8 = 2;

type Checked = Result<(), Rejection>;

#[derive(Debug, Clone, Default)]
pub struct PhaseMachine {
    state: SessionState,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a rehydrated state, recomputing the rotation index from the president.
    pub fn from_state(mut state: SessionState) -> Self {
        state.current_president_index = resync_index(&state);
        Self { state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn config(&self) -> Option<&GameConfig> {
        self.state.config.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == Phase::GameOver
    }

    /// Seat the players, deal roles and the deck, and open the first nomination.
    ///
    /// On failure the session stays where it was.
    pub fn start(&mut self, players: Vec<Player>, game_seed: u64) -> Result<(), DomainError> {
        if !matches!(self.state.phase, Phase::Lobby | Phase::GameOver) {
            return Err(DomainError::validation(
                ValidationKind::GameAlreadyStarted,
                "Game already in progress",
            ));
        }
        if players.len() < MIN_PLAYERS {
            return Err(DomainError::validation(
                ValidationKind::NotEnoughPlayers,
                format!("Not enough players (min {MIN_PLAYERS})"),
            ));
        }
        if players.len() > MAX_PLAYERS {
            return Err(DomainError::validation(
                ValidationKind::TooManyPlayers,
                format!("Too many players (max {MAX_PLAYERS})"),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = players.iter().find(|p| !seen.insert(p.id.as_str())) {
            return Err(DomainError::validation(
                ValidationKind::DuplicatePlayer,
                format!("Player {} listed twice", dup.id),
            ));
        }

        let config = config_for(players.len()).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::Other("NO_CONFIG".into()),
                format!("No rules for {} players", players.len()),
            )
        })?;
        let roles = assign_roles(&players, config.roles, game_seed)?;
        let turn_order = shuffled_turn_order(&players, game_seed);
        let first_president = turn_order[0].clone();

        self.state = SessionState {
            players,
            config: Some(config),
            roles,
            deck: PolicyDeck::new(game_seed),
            phase: Phase::Nomination,
            turn_order,
            current_president_index: 0,
            president_candidate: Some(first_president),
            rng_seed: game_seed,
            ..SessionState::lobby()
        };

        info!(
            players = self.state.players.len(),
            band = ?config.band,
            "Game started"
        );
        Ok(())
    }

    /// Apply one action from `actor`. Rejections leave the state untouched.
    pub fn apply(&mut self, actor: &str, action: &Action) -> ActionOutcome {
        let result = match action {
            Action::NominateChancellor { candidate_id } => self.nominate(actor, candidate_id),
            Action::Vote { vote } => self.vote(actor, *vote),
            Action::PresidentDiscard { discarded_policy } => {
                self.president_discard(actor, *discarded_policy)
            }
            Action::ChancellorDiscard { discarded_policy } => {
                self.chancellor_discard(actor, *discarded_policy)
            }
            Action::VetoRequest => self.veto_request(actor),
            Action::VetoResponse { approved } => self.veto_response(actor, *approved),
            Action::InvestigatePlayer { target_id } => self.investigate(actor, target_id),
            Action::InvestigationConfirm => self.investigation_confirm(actor),
            Action::PublicInquest { target_id } => self.public_inquest(actor, target_id),
            Action::PublicInquestConfirm => self.public_inquest_confirm(actor),
            Action::SpecialElection { target_id } => self.special_election(actor, target_id),
            Action::MartialLaw {
                next_president_id,
                next_chancellor_id,
            } => self.martial_law(actor, next_president_id, next_chancellor_id),
            Action::Execution { target_id } => self.execute(actor, target_id),
            Action::Purge { target_id } => self.purge(actor, target_id),
            Action::PolicyPeekDone => self.policy_peek_done(actor),
            Action::Unknown => Err(Rejection::UnknownAction),
        };

        match result {
            Ok(()) => ActionOutcome::Applied,
            Err(reason) => {
                debug!(
                    actor,
                    action = action.kind(),
                    phase = ?self.state.phase,
                    %reason,
                    "Action rejected"
                );
                ActionOutcome::Rejected(reason)
            }
        }
    }

    // --- guards -----------------------------------------------------------

    fn require_phase(&self, phase: Phase) -> Checked {
        if self.state.phase == phase {
            Ok(())
        } else {
            Err(Rejection::WrongPhase)
        }
    }

    fn require_president(&self, actor: &str) -> Checked {
        if self.state.is_president(actor) {
            Ok(())
        } else {
            Err(Rejection::NotYourTurn)
        }
    }

    fn require_living(&self, id: &str) -> Checked {
        if !self.state.is_player(id) {
            return Err(Rejection::UnknownPlayer);
        }
        if self.state.dead_players.contains(id) {
            return Err(Rejection::PlayerDead);
        }
        Ok(())
    }

    /// A living player other than the actor.
    fn require_target(&self, actor: &str, target: &str) -> Checked {
        self.require_living(target)?;
        if actor == target {
            return Err(Rejection::SelfTarget);
        }
        Ok(())
    }

    fn require_power(&self, actor: &str, phase: Phase) -> Checked {
        self.require_phase(phase)?;
        self.require_president(actor)
    }

    fn rules(&self) -> Result<GameConfig, Rejection> {
        self.state.config.ok_or(Rejection::WrongPhase)
    }

    // --- election ---------------------------------------------------------

    fn nominate(&mut self, actor: &str, candidate: &str) -> Checked {
        self.require_phase(Phase::Nomination)?;
        self.require_president(actor)?;
        self.require_target(actor, candidate)?;

        let s = &self.state;
        // With two alive the last chancellor is the only candidate left.
        if s.alive_count() > 2 && s.last_chancellor_id.as_deref() == Some(candidate) {
            return Err(Rejection::TermLimited);
        }
        if s.alive_count() >= 5 && s.last_president_id.as_deref() == Some(candidate) {
            return Err(Rejection::TermLimited);
        }

        self.state.chancellor_candidate = Some(candidate.to_string());
        self.state.votes.clear();
        self.state.phase = Phase::Vote;
        debug!(president = actor, candidate, "Chancellor nominated");
        Ok(())
    }

    fn vote(&mut self, voter: &str, ballot: Ballot) -> Checked {
        self.require_phase(Phase::Vote)?;
        self.require_living(voter)?;

        self.state.votes.insert(voter.to_string(), ballot);
        if self.state.votes.len() == self.state.alive_count() {
            self.resolve_votes();
        }
        Ok(())
    }

    fn resolve_votes(&mut self) {
        let ja = self
            .state
            .votes
            .values()
            .filter(|b| **b == Ballot::Ja)
            .count();
        let nein = self.state.votes.len() - ja;

        if ja <= nein {
            info!(ja, nein, "Election failed");
            self.fail_government();
            return;
        }

        let Some(config) = self.state.config else {
            return;
        };
        let s = &mut self.state;
        s.election_tracker = 0;
        s.chancellor = s.chancellor_candidate.clone();
        s.last_president_id = s.president_candidate.clone();
        s.last_chancellor_id = s.chancellor.clone();
        info!(ja, nein, chancellor = ?s.chancellor, "Government elected");

        let chancellor_is_hitler = s
            .chancellor
            .as_deref()
            .and_then(|c| s.role_of(c))
            .is_some_and(|r| r == Role::Hitler);
        if s.enacted.fascist >= config.hitler_zone && chancellor_is_hitler {
            self.finish(Party::Fascist, WinReason::HitlerElected);
            return;
        }

        s.drawn_policies = s.deck.draw_hand();
        s.phase = Phase::LegislativePresident;
    }

    /// Failed vote or approved veto: move the tracker, maybe into chaos.
    fn fail_government(&mut self) {
        self.state.election_tracker += 1;
        if self.state.election_tracker >= CHAOS_THRESHOLD {
            self.chaos();
        } else {
            advance(&mut self.state);
        }
    }

    fn chaos(&mut self) {
        let policy = self.state.deck.draw_top();
        self.state.election_tracker = 0;
        info!(?policy, "Chaos: top policy enacted");
        self.record_enactment(policy, true);
        if self.check_policy_win() {
            return;
        }
        advance(&mut self.state);
    }

    // --- legislative session ----------------------------------------------

    fn president_discard(&mut self, actor: &str, card: Policy) -> Checked {
        self.require_phase(Phase::LegislativePresident)?;
        self.require_president(actor)?;
        let index = self.held_card(card, HAND_SIZE)?;

        let discarded = self.state.drawn_policies.remove(index);
        self.state.deck.discard(discarded);
        self.state.phase = Phase::LegislativeChancellor;
        Ok(())
    }

    fn chancellor_discard(&mut self, actor: &str, card: Policy) -> Checked {
        self.require_phase(Phase::LegislativeChancellor)?;
        if !self.state.is_chancellor(actor) {
            return Err(Rejection::NotYourTurn);
        }
        let index = self.held_card(card, HAND_SIZE - 1)?;

        let discarded = self.state.drawn_policies.remove(index);
        self.state.deck.discard(discarded);
        let enacted = self.state.drawn_policies.remove(0);
        self.state.deck.record_enacted();
        self.enact(enacted);
        Ok(())
    }

    /// Index of `card` in a hand that must hold exactly `expected` cards.
    fn held_card(&self, card: Policy, expected: usize) -> Result<usize, Rejection> {
        let hand = &self.state.drawn_policies;
        if hand.len() != expected {
            return Err(Rejection::CardNotHeld);
        }
        hand.iter()
            .position(|c| *c == card)
            .ok_or(Rejection::CardNotHeld)
    }

    fn veto_request(&mut self, actor: &str) -> Checked {
        self.require_phase(Phase::LegislativeChancellor)?;
        if !self.state.is_chancellor(actor) {
            return Err(Rejection::NotYourTurn);
        }
        if !self.state.veto_unlocked {
            return Err(Rejection::VetoLocked);
        }
        self.state.phase = Phase::VetoRequest;
        info!(chancellor = actor, "Veto requested");
        Ok(())
    }

    fn veto_response(&mut self, actor: &str, approved: bool) -> Checked {
        self.require_phase(Phase::VetoRequest)?;
        self.require_president(actor)?;

        if approved {
            info!("Veto approved; agenda discarded");
            let hand: Vec<Policy> = self.state.drawn_policies.drain(..).collect();
            for card in hand {
                self.state.deck.discard(card);
            }
            self.fail_government();
        } else {
            info!("Veto declined");
            self.state.phase = Phase::LegislativeChancellor;
        }
        Ok(())
    }

    fn record_enactment(&mut self, policy: Policy, chaos: bool) {
        let s = &mut self.state;
        s.enacted.record(policy);
        s.last_enacted = Some(LastEnactment { policy, chaos });
        if policy == Policy::Fascist {
            if let Some(config) = s.config {
                s.veto_unlocked = veto_unlocked(s.veto_unlocked, s.enacted.fascist, &config);
            }
        }
        info!(
            ?policy,
            chaos,
            liberal = s.enacted.liberal,
            fascist = s.enacted.fascist,
            "Policy enacted"
        );
    }

    fn enact(&mut self, policy: Policy) {
        self.record_enactment(policy, false);
        if self.check_policy_win() {
            return;
        }

        let power = match (policy, self.state.config) {
            (Policy::Fascist, Some(config)) => power_for(self.state.enacted.fascist, &config),
            _ => None,
        };
        match power {
            Some(power) => self.grant_power(power),
            None => advance(&mut self.state),
        }
    }

    fn grant_power(&mut self, power: ExecutivePower) {
        let s = &mut self.state;
        s.phase = power.phase();
        match power {
            ExecutivePower::PolicyPeek => s.peeked_policies = s.deck.peek_hand(),
            ExecutivePower::Purge => s.purge_remaining = PURGE_KILLS,
            _ => {}
        }
        info!(?power, president = ?s.president_candidate, "Executive power granted");
    }

    // --- win evaluation ---------------------------------------------------

    fn check_policy_win(&mut self) -> bool {
        let Some(config) = self.state.config else {
            return false;
        };
        let track = self.state.enacted;
        if track.liberal >= config.liberal_win {
            self.finish(Party::Liberal, WinReason::LiberalPolicies);
            true
        } else if track.fascist >= config.fascist_win {
            self.finish(Party::Fascist, WinReason::FascistPolicies);
            true
        } else {
            false
        }
    }

    fn finish(&mut self, party: Party, reason: WinReason) {
        self.state.winner = Some(Victory { party, reason });
        self.state.phase = Phase::GameOver;
        self.state.purge_remaining = 0;
        info!(winner = ?party, ?reason, "Game over");
    }

    // --- executive powers -------------------------------------------------

    fn reveal(&self, target: &str) -> Result<PartyReveal, Rejection> {
        let role = self.state.role_of(target).ok_or(Rejection::UnknownPlayer)?;
        Ok(PartyReveal {
            target: target.to_string(),
            party: role.party(),
        })
    }

    fn investigate(&mut self, actor: &str, target: &str) -> Checked {
        self.require_power(actor, Phase::Investigation)?;
        if self.state.investigated_player.is_some() {
            return Err(Rejection::ResultPending);
        }
        self.require_target(actor, target)?;
        let reveal = self.reveal(target)?;
        debug!(president = actor, target, "Investigation performed");
        self.state.investigated_player = Some(reveal);
        Ok(())
    }

    fn investigation_confirm(&mut self, actor: &str) -> Checked {
        self.require_power(actor, Phase::Investigation)?;
        if self.state.investigated_player.is_none() {
            return Err(Rejection::NothingToConfirm);
        }
        advance(&mut self.state);
        Ok(())
    }

    fn public_inquest(&mut self, actor: &str, target: &str) -> Checked {
        self.require_power(actor, Phase::PublicInquest)?;
        if self.state.public_investigation.is_some() {
            return Err(Rejection::ResultPending);
        }
        self.require_target(actor, target)?;
        let reveal = self.reveal(target)?;
        info!(president = actor, target, party = ?reveal.party, "Public inquest");
        self.state.public_investigation = Some(reveal);
        Ok(())
    }

    fn public_inquest_confirm(&mut self, actor: &str) -> Checked {
        self.require_power(actor, Phase::PublicInquest)?;
        let Some(reveal) = self.state.public_investigation.clone() else {
            return Err(Rejection::NothingToConfirm);
        };
        self.state.public_record.push(reveal);
        advance(&mut self.state);
        Ok(())
    }

    fn special_election(&mut self, actor: &str, target: &str) -> Checked {
        self.require_power(actor, Phase::SpecialElection)?;
        self.require_target(actor, target)?;
        info!(president = actor, target, "Special election called");
        self.state.special_election_next = Some(target.to_string());
        advance(&mut self.state);
        Ok(())
    }

    fn martial_law(&mut self, actor: &str, president: &str, chancellor: &str) -> Checked {
        self.require_power(actor, Phase::MartialLaw)?;
        self.require_living(president)?;
        self.require_living(chancellor)?;
        if president == chancellor {
            return Err(Rejection::SamePlayer);
        }
        let index = self
            .state
            .turn_position(president)
            .ok_or(Rejection::UnknownPlayer)?;

        info!(by = actor, president, chancellor, "Martial law imposed");
        let s = &mut self.state;
        s.president_candidate = Some(president.to_string());
        s.chancellor_candidate = Some(chancellor.to_string());
        s.chancellor = None;
        s.current_president_index = index;
        s.votes.clear();
        s.phase = Phase::Vote;
        Ok(())
    }

    /// Mark `target` dead. Returns true when the game ended.
    fn kill(&mut self, target: &str) -> bool {
        self.state.dead_players.insert(target.to_string());
        info!(target, "Player executed");
        if self.state.role_of(target) == Some(Role::Hitler) {
            self.finish(Party::Liberal, WinReason::HitlerExecuted);
            return true;
        }
        false
    }

    fn execute(&mut self, actor: &str, target: &str) -> Checked {
        self.require_power(actor, Phase::Execution)?;
        self.require_target(actor, target)?;
        if !self.kill(target) {
            advance(&mut self.state);
        }
        Ok(())
    }

    fn purge(&mut self, actor: &str, target: &str) -> Checked {
        self.require_power(actor, Phase::Purge)?;
        self.require_target(actor, target)?;
        if self.kill(target) {
            return Ok(());
        }
        self.state.purge_remaining = self.state.purge_remaining.saturating_sub(1);
        if self.state.purge_remaining == 0 {
            advance(&mut self.state);
        }
        Ok(())
    }

    fn policy_peek_done(&mut self, actor: &str) -> Checked {
        self.require_power(actor, Phase::PolicyPeek)?;
        advance(&mut self.state);
        Ok(())
    }

    // --- diagnostics ------------------------------------------------------

    /// Structural invariants that must hold between actions.
    ///
    /// Empty when the state is sound.
    pub fn invariant_violations(&self) -> Vec<String> {
        let s = &self.state;
        let mut problems = Vec::new();
        if s.phase == Phase::Lobby {
            return problems;
        }

        let in_play = s.policy_cards_in_play();
        if in_play != DECK_SIZE {
            problems.push(format!("policy cards in play {in_play} != {DECK_SIZE}"));
        }
        if s.election_tracker >= CHAOS_THRESHOLD {
            problems.push(format!("election tracker at {}", s.election_tracker));
        }
        let hitlers = s.roles.values().filter(|r| **r == Role::Hitler).count();
        if hitlers != 1 {
            problems.push(format!("{hitlers} Hitlers assigned"));
        }
        let expected_hand = match s.phase {
            Phase::LegislativePresident => HAND_SIZE,
            Phase::LegislativeChancellor | Phase::VetoRequest => HAND_SIZE - 1,
            _ => 0,
        };
        if s.drawn_policies.len() != expected_hand {
            problems.push(format!(
                "{} drawn policies in {:?}",
                s.drawn_policies.len(),
                s.phase
            ));
        }
        if let Some(p) = s.president_candidate.as_deref() {
            if s.phase != Phase::GameOver && s.dead_players.contains(p) {
                problems.push(format!("dead president {p}"));
            }
        }
        problems
    }
}
