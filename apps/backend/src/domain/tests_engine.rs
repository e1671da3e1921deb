//! Scripted play through the phase machine.

use crate::domain::actions::{Action, ActionOutcome, Rejection};
use crate::domain::deck::DECK_SIZE;
use crate::domain::engine::PhaseMachine;
use crate::domain::session_record::SessionRecord;
use crate::domain::state::{Ballot, Party, Phase, Policy, Role, SessionState, WinReason};
use crate::domain::test_state_helpers::{
    act, enact, everyone_votes, fail_election, force_hand, hitler, nominate, players, president,
    started, with_role,
};
use crate::errors::domain::{DomainError, ValidationKind};

fn edit(m: &mut PhaseMachine, f: impl FnOnce(&mut SessionState)) {
    let mut state = m.state().clone();
    f(&mut state);
    *m = PhaseMachine::from_state(state);
}

fn snapshot(m: &PhaseMachine) -> SessionRecord {
    SessionRecord::from_state(m.state())
}

fn rejected(outcome: ActionOutcome, reason: Rejection) {
    assert_eq!(outcome, ActionOutcome::Rejected(reason));
}

/// Seat `president` as the sitting president in `phase`.
fn seat_president(m: &mut PhaseMachine, president: &str, phase: Phase) {
    let president = president.to_string();
    edit(m, |s| {
        s.current_president_index = s.turn_position(&president).unwrap();
        s.president_candidate = Some(president);
        s.phase = phase;
    });
}

fn non_hitler(m: &PhaseMachine, skip: &[&str]) -> String {
    let h = hitler(m);
    m.state()
        .turn_order
        .iter()
        .find(|id| **id != h && !skip.contains(&id.as_str()))
        .cloned()
        .unwrap()
}

// --- setup ----------------------------------------------------------------

#[test]
fn start_deals_roles_deck_and_first_nomination() {
    let m = started(7, 42);
    let s = m.state();
    assert_eq!(m.phase(), Phase::Nomination);
    assert_eq!(s.president_candidate.as_ref(), Some(&s.turn_order[0]));
    assert_eq!(s.current_president_index, 0);
    assert_eq!(s.deck.draw_pile_len(), DECK_SIZE);
    assert_eq!(with_role(&m, Role::Hitler).len(), 1);
    assert_eq!(with_role(&m, Role::Fascist).len(), 2);
    assert_eq!(with_role(&m, Role::Liberal).len(), 4);
    assert_eq!(s.election_tracker, 0);
    assert!(m.invariant_violations().is_empty());
}

#[test]
fn start_is_deterministic_per_seed() {
    let a = started(9, 7);
    let b = started(9, 7);
    assert_eq!(snapshot(&a), snapshot(&b));
}

#[test]
fn start_rejects_small_and_large_tables() {
    let mut m = PhaseMachine::new();
    let err = m.start(players(2), 1).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::NotEnoughPlayers, _)
    ));
    assert_eq!(m.phase(), Phase::Lobby);

    let err = m.start(players(21), 1).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::TooManyPlayers, _)
    ));
    assert_eq!(m.phase(), Phase::Lobby);
}

#[test]
fn start_rejects_duplicate_ids_and_running_games() {
    let mut m = PhaseMachine::new();
    let mut table = players(4);
    table[3].id = table[0].id.clone();
    assert!(matches!(
        m.start(table, 1).unwrap_err(),
        DomainError::Validation(ValidationKind::DuplicatePlayer, _)
    ));

    let mut running = started(5, 1);
    let before = snapshot(&running);
    assert!(matches!(
        running.start(players(5), 2).unwrap_err(),
        DomainError::Validation(ValidationKind::GameAlreadyStarted, _)
    ));
    assert_eq!(snapshot(&running), before);
}

// --- nomination and voting --------------------------------------------------

#[test]
fn only_the_president_nominates_a_living_other_player() {
    let mut m = started(5, 3);
    let pres = president(&m);
    let other = m.state().turn_order[1].clone();
    let third = m.state().turn_order[2].clone();

    rejected(
        act(&mut m, &other, Action::NominateChancellor { candidate_id: third.clone() }),
        Rejection::NotYourTurn,
    );
    rejected(nominate(&mut m, &pres), Rejection::SelfTarget);
    rejected(nominate(&mut m, "ghost"), Rejection::UnknownPlayer);

    edit(&mut m, |s| {
        s.dead_players.insert(third.clone());
    });
    rejected(nominate(&mut m, &third), Rejection::PlayerDead);

    assert!(nominate(&mut m, &other).is_applied());
    assert_eq!(m.phase(), Phase::Vote);
    assert_eq!(m.state().chancellor_candidate.as_deref(), Some(other.as_str()));
}

#[test]
fn both_term_limits_apply_with_five_alive() {
    let mut m = started(5, 11);
    let t = m.state().turn_order.clone();
    edit(&mut m, |s| {
        s.last_president_id = Some(t[1].clone());
        s.last_chancellor_id = Some(t[2].clone());
    });
    rejected(nominate(&mut m, &t[1]), Rejection::TermLimited);
    rejected(nominate(&mut m, &t[2]), Rejection::TermLimited);
    assert!(nominate(&mut m, &t[3]).is_applied());
}

#[test]
fn only_chancellor_limit_applies_below_five_alive() {
    let mut m = started(5, 11);
    let t = m.state().turn_order.clone();
    edit(&mut m, |s| {
        s.last_president_id = Some(t[1].clone());
        s.last_chancellor_id = Some(t[2].clone());
        s.dead_players.insert(t[4].clone());
    });
    rejected(nominate(&mut m, &t[2]), Rejection::TermLimited);
    assert!(nominate(&mut m, &t[1]).is_applied());
}

#[test]
fn last_chancellor_is_nominable_when_only_two_remain() {
    let mut m = started(3, 11);
    let t = m.state().turn_order.clone();
    edit(&mut m, |s| s.last_chancellor_id = Some(t[1].clone()));
    rejected(nominate(&mut m, &t[1]), Rejection::TermLimited);

    edit(&mut m, |s| {
        s.dead_players.insert(t[2].clone());
    });
    assert!(nominate(&mut m, &t[1]).is_applied());
    assert_eq!(m.phase(), Phase::Vote);
}

#[test]
fn election_records_term_limits() {
    let mut m = started(6, 5);
    let pres = president(&m);
    enact(&mut m, Policy::Liberal);
    assert_eq!(m.state().last_president_id.as_deref(), Some(pres.as_str()));
    assert!(m.state().last_chancellor_id.is_some());
}

#[test]
fn dead_and_unknown_players_cannot_vote() {
    let mut m = started(5, 9);
    let t = m.state().turn_order.clone();
    edit(&mut m, |s| {
        s.dead_players.insert(t[4].clone());
    });
    assert!(nominate(&mut m, &t[1]).is_applied());
    rejected(act(&mut m, &t[4], Action::Vote { vote: Ballot::Ja }), Rejection::PlayerDead);
    rejected(act(&mut m, "ghost", Action::Vote { vote: Ballot::Ja }), Rejection::UnknownPlayer);
}

#[test]
fn round_closes_when_every_living_player_has_voted() {
    let mut m = started(5, 9);
    let t = m.state().turn_order.clone();
    assert!(nominate(&mut m, &t[1]).is_applied());
    for voter in &t[..4] {
        assert!(act(&mut m, voter, Action::Vote { vote: Ballot::Ja }).is_applied());
        assert_eq!(m.phase(), Phase::Vote);
    }
    // A voter may change their mind before the round closes.
    assert!(act(&mut m, &t[0], Action::Vote { vote: Ballot::Nein }).is_applied());
    assert!(act(&mut m, &t[4], Action::Vote { vote: Ballot::Ja }).is_applied());
    assert_ne!(m.phase(), Phase::Vote);
}

#[test]
fn tie_fails_the_election() {
    let mut m = started(4, 2);
    let t = m.state().turn_order.clone();
    assert!(nominate(&mut m, &t[1]).is_applied());
    for (voter, vote) in t.iter().zip([Ballot::Ja, Ballot::Ja, Ballot::Nein, Ballot::Nein]) {
        act(&mut m, voter, Action::Vote { vote });
    }
    assert_eq!(m.phase(), Phase::Nomination);
    assert_eq!(m.state().election_tracker, 1);
    assert_eq!(president(&m), t[1]);
}

// --- legislative session ------------------------------------------------------

#[test]
fn discards_require_a_held_card_and_the_right_holder() {
    let mut m = started(5, 21);
    let pres = president(&m);
    let chancellor = non_hitler(&m, &[&pres]);
    assert!(nominate(&mut m, &chancellor).is_applied());
    everyone_votes(&mut m, Ballot::Ja);
    assert_eq!(m.phase(), Phase::LegislativePresident);
    assert_eq!(m.state().drawn_policies.len(), 3);

    force_hand(&mut m, vec![Policy::Fascist; 3]);
    rejected(
        act(&mut m, &pres, Action::PresidentDiscard { discarded_policy: Policy::Liberal }),
        Rejection::CardNotHeld,
    );
    rejected(
        act(&mut m, &chancellor, Action::PresidentDiscard { discarded_policy: Policy::Fascist }),
        Rejection::NotYourTurn,
    );
    assert!(act(&mut m, &pres, Action::PresidentDiscard { discarded_policy: Policy::Fascist })
        .is_applied());
    assert_eq!(m.phase(), Phase::LegislativeChancellor);
    assert_eq!(m.state().drawn_policies.len(), 2);
    assert!(m.invariant_violations().is_empty());

    rejected(
        act(&mut m, &pres, Action::ChancellorDiscard { discarded_policy: Policy::Fascist }),
        Rejection::NotYourTurn,
    );
    let enact_fascist = Action::ChancellorDiscard {
        discarded_policy: Policy::Fascist,
    };
    assert!(act(&mut m, &chancellor, enact_fascist).is_applied());
    assert_eq!(m.state().enacted.fascist, 1);
    assert!(m.state().drawn_policies.is_empty());
    assert!(m.invariant_violations().is_empty());
}

#[test]
fn veto_is_locked_until_unlocked() {
    let mut m = started(5, 13);
    let pres = president(&m);
    let chancellor = non_hitler(&m, &[&pres]);
    assert!(nominate(&mut m, &chancellor).is_applied());
    everyone_votes(&mut m, Ballot::Ja);
    let discarded_policy = m.state().drawn_policies[0];
    assert!(act(&mut m, &pres, Action::PresidentDiscard { discarded_policy }).is_applied());
    rejected(act(&mut m, &chancellor, Action::VetoRequest), Rejection::VetoLocked);
}

#[test]
fn approved_veto_discards_agenda_and_moves_tracker() {
    let mut m = started(5, 13);
    let pres = president(&m);
    let chancellor = non_hitler(&m, &[&pres]);
    edit(&mut m, |s| s.veto_unlocked = true);
    assert!(nominate(&mut m, &chancellor).is_applied());
    everyone_votes(&mut m, Ballot::Ja);
    let discarded_policy = m.state().drawn_policies[0];
    assert!(act(&mut m, &pres, Action::PresidentDiscard { discarded_policy }).is_applied());
    let discard_before = m.state().deck.discard_len();

    assert!(act(&mut m, &chancellor, Action::VetoRequest).is_applied());
    assert_eq!(m.phase(), Phase::VetoRequest);
    rejected(
        act(&mut m, &chancellor, Action::VetoResponse { approved: true }),
        Rejection::NotYourTurn,
    );
    assert!(act(&mut m, &pres, Action::VetoResponse { approved: true }).is_applied());

    let s = m.state();
    assert_eq!(s.deck.discard_len(), discard_before + 2);
    assert_eq!(s.election_tracker, 1);
    assert_eq!(s.enacted.total(), 0);
    assert_eq!(m.phase(), Phase::Nomination);
    assert_ne!(president(&m), pres);
    assert!(m.invariant_violations().is_empty());
}

#[test]
fn declined_veto_returns_to_chancellor_who_may_ask_again() {
    let mut m = started(5, 17);
    let pres = president(&m);
    let chancellor = non_hitler(&m, &[&pres]);
    edit(&mut m, |s| s.veto_unlocked = true);
    assert!(nominate(&mut m, &chancellor).is_applied());
    everyone_votes(&mut m, Ballot::Ja);
    let discard = m.state().drawn_policies[0];
    act(&mut m, &pres, Action::PresidentDiscard { discarded_policy: discard });

    assert!(act(&mut m, &chancellor, Action::VetoRequest).is_applied());
    assert!(act(&mut m, &pres, Action::VetoResponse { approved: false }).is_applied());
    assert_eq!(m.phase(), Phase::LegislativeChancellor);
    assert_eq!(m.state().drawn_policies.len(), 2);
    assert!(act(&mut m, &chancellor, Action::VetoRequest).is_applied());
}

#[test]
fn veto_latches_on_fascist_enactment() {
    let mut m = started(5, 23);
    edit(&mut m, |s| s.enacted.fascist = 4);
    enact(&mut m, Policy::Fascist);
    assert!(m.state().veto_unlocked);
}

// --- scenarios -----------------------------------------------------------------

#[test]
fn third_fascist_policy_grants_peek_in_classic_five() {
    let mut m = started(5, 101);
    assert_eq!(enact(&mut m, Policy::Fascist), Phase::Nomination);
    assert_eq!(enact(&mut m, Policy::Fascist), Phase::Nomination);
    assert_eq!(enact(&mut m, Policy::Fascist), Phase::PolicyPeek);
    assert!(m.state().winner.is_none());

    let peeked = m.state().peeked_policies.clone();
    assert_eq!(peeked.len(), 3);
    assert_eq!(&m.state().deck.draw_pile()[..3], peeked.as_slice());

    let pres = president(&m);
    assert!(act(&mut m, &pres, Action::PolicyPeekDone).is_applied());
    assert_eq!(m.phase(), Phase::Nomination);
    assert!(m.state().peeked_policies.is_empty());
    assert!(m.invariant_violations().is_empty());
}

#[test]
fn electing_hitler_in_the_zone_ends_the_game() {
    let mut m = started(7, 55);
    edit(&mut m, |s| s.enacted.fascist = 3);
    let h = hitler(&m);
    if president(&m) == h {
        fail_election(&mut m);
    }
    assert!(nominate(&mut m, &h).is_applied());
    everyone_votes(&mut m, Ballot::Ja);

    let s = m.state();
    assert_eq!(m.phase(), Phase::GameOver);
    let victory = s.winner.unwrap();
    assert_eq!(victory.party, Party::Fascist);
    assert_eq!(victory.reason, WinReason::HitlerElected);
    assert!(s.drawn_policies.is_empty());
}

#[test]
fn electing_hitler_outside_the_zone_is_harmless() {
    let mut m = started(7, 55);
    edit(&mut m, |s| s.enacted.fascist = 2);
    let h = hitler(&m);
    if president(&m) == h {
        fail_election(&mut m);
    }
    assert!(nominate(&mut m, &h).is_applied());
    everyone_votes(&mut m, Ballot::Ja);
    assert_eq!(m.phase(), Phase::LegislativePresident);
}

#[test]
fn three_failed_elections_enact_the_top_card() {
    let mut m = started(6, 77);
    let top = m.state().deck.draw_pile()[0];
    let t = m.state().turn_order.clone();

    fail_election(&mut m);
    fail_election(&mut m);
    assert_eq!(m.state().election_tracker, 2);
    fail_election(&mut m);

    let s = m.state();
    assert_eq!(s.election_tracker, 0);
    assert_eq!(s.enacted.total(), 1);
    let last = s.last_enacted.unwrap();
    assert!(last.chaos);
    assert_eq!(last.policy, top);
    assert_eq!(m.phase(), Phase::Nomination);
    assert_eq!(president(&m), t[3]);
    assert!(s.last_president_id.is_none() && s.last_chancellor_id.is_none());
    assert!(m.invariant_violations().is_empty());
}

#[test]
fn executing_hitler_wins_for_liberals() {
    let mut m = started(5, 31);
    let h = hitler(&m);
    let pres = non_hitler(&m, &[]);
    seat_president(&mut m, &pres, Phase::Execution);
    assert!(act(&mut m, &pres, Action::Execution { target_id: h }).is_applied());
    let victory = m.state().winner.unwrap();
    assert_eq!(victory.party, Party::Liberal);
    assert_eq!(victory.reason, WinReason::HitlerExecuted);
}

#[test]
fn executing_someone_else_moves_on_and_they_stay_dead() {
    let mut m = started(5, 31);
    let pres = non_hitler(&m, &[]);
    let victim = non_hitler(&m, &[&pres]);
    seat_president(&mut m, &pres, Phase::Execution);
    rejected(
        act(&mut m, &pres, Action::Execution { target_id: pres.clone() }),
        Rejection::SelfTarget,
    );
    assert!(act(&mut m, &pres, Action::Execution { target_id: victim.clone() }).is_applied());
    assert!(!m.state().is_alive(&victim));
    assert_eq!(m.phase(), Phase::Nomination);
    rejected(nominate(&mut m, &victim), Rejection::PlayerDead);
}

#[test]
fn purging_hitler_wins_even_with_kills_remaining() {
    let mut m = started(16, 8);
    let h = hitler(&m);
    let pres = non_hitler(&m, &[]);
    let victim = non_hitler(&m, &[&pres]);
    seat_president(&mut m, &pres, Phase::Purge);
    edit(&mut m, |s| s.purge_remaining = 2);

    assert!(act(&mut m, &pres, Action::Purge { target_id: victim }).is_applied());
    assert_eq!(m.phase(), Phase::Purge);
    assert_eq!(m.state().purge_remaining, 1);

    assert!(act(&mut m, &pres, Action::Purge { target_id: h }).is_applied());
    assert_eq!(m.phase(), Phase::GameOver);
    assert_eq!(m.state().winner.unwrap().party, Party::Liberal);
}

#[test]
fn purge_ends_after_two_kills() {
    let mut m = started(16, 8);
    let pres = non_hitler(&m, &[]);
    let a = non_hitler(&m, &[&pres]);
    let b = non_hitler(&m, &[&pres, &a]);
    seat_president(&mut m, &pres, Phase::Purge);
    edit(&mut m, |s| s.purge_remaining = 2);
    act(&mut m, &pres, Action::Purge { target_id: a });
    act(&mut m, &pres, Action::Purge { target_id: b });
    assert_eq!(m.phase(), Phase::Nomination);
    assert_eq!(m.state().dead_players.len(), 2);
}

#[test]
fn special_election_installs_target_then_resumes_after_them() {
    let mut m = started(7, 4);
    let t = m.state().turn_order.clone();
    seat_president(&mut m, &t[0], Phase::SpecialElection);

    assert!(act(&mut m, &t[0], Action::SpecialElection { target_id: t[3].clone() }).is_applied());
    assert_eq!(president(&m), t[3]);
    assert_eq!(m.state().current_president_index, 0);

    fail_election(&mut m);
    assert_eq!(president(&m), t[4]);
    assert_eq!(m.state().current_president_index, 4);
}

// --- other powers ----------------------------------------------------------------

#[test]
fn investigation_needs_a_result_before_confirming() {
    let mut m = started(9, 6);
    let t = m.state().turn_order.clone();
    seat_president(&mut m, &t[0], Phase::Investigation);

    rejected(act(&mut m, &t[0], Action::InvestigationConfirm), Rejection::NothingToConfirm);
    assert!(act(&mut m, &t[0], Action::InvestigatePlayer { target_id: t[2].clone() }).is_applied());
    let reveal = m.state().investigated_player.clone().unwrap();
    assert_eq!(reveal.target, t[2]);
    assert_eq!(reveal.party, m.state().role_of(&t[2]).unwrap().party());

    rejected(
        act(&mut m, &t[0], Action::InvestigatePlayer { target_id: t[3].clone() }),
        Rejection::ResultPending,
    );
    assert!(act(&mut m, &t[0], Action::InvestigationConfirm).is_applied());
    assert!(m.state().investigated_player.is_none());
    assert_eq!(m.phase(), Phase::Nomination);
}

#[test]
fn confirmed_public_inquest_joins_the_record() {
    let mut m = started(12, 6);
    let t = m.state().turn_order.clone();
    seat_president(&mut m, &t[0], Phase::PublicInquest);

    assert!(act(&mut m, &t[0], Action::PublicInquest { target_id: t[5].clone() }).is_applied());
    assert!(m.state().public_investigation.is_some());
    assert!(act(&mut m, &t[0], Action::PublicInquestConfirm).is_applied());
    assert_eq!(m.state().public_record.len(), 1);
    assert_eq!(m.state().public_record[0].target, t[5]);
    assert!(m.state().public_investigation.is_none());
}

#[test]
fn martial_law_forces_a_vote_on_the_chosen_government() {
    let mut m = started(16, 12);
    let t = m.state().turn_order.clone();
    seat_president(&mut m, &t[0], Phase::MartialLaw);

    rejected(
        act(&mut m, &t[0], Action::MartialLaw {
            next_president_id: t[5].clone(),
            next_chancellor_id: t[5].clone(),
        }),
        Rejection::SamePlayer,
    );
    assert!(act(&mut m, &t[0], Action::MartialLaw {
        next_president_id: t[5].clone(),
        next_chancellor_id: t[9].clone(),
    })
    .is_applied());

    let s = m.state();
    assert_eq!(m.phase(), Phase::Vote);
    assert_eq!(s.president_candidate.as_deref(), Some(t[5].as_str()));
    assert_eq!(s.chancellor_candidate.as_deref(), Some(t[9].as_str()));
    assert_eq!(s.current_president_index, 5);
    assert!(s.votes.is_empty());
}

// --- wins, rejections --------------------------------------------------------------

#[test]
fn final_liberal_policy_wins() {
    let mut m = started(5, 44);
    let target = m.config().unwrap().liberal_win;
    edit(&mut m, |s| s.enacted.liberal = target - 1);
    assert_eq!(enact(&mut m, Policy::Liberal), Phase::GameOver);
    assert_eq!(m.state().winner.unwrap().reason, WinReason::LiberalPolicies);
}

#[test]
fn final_fascist_policy_wins_without_granting_a_power() {
    let mut m = started(5, 44);
    let target = m.config().unwrap().fascist_win;
    edit(&mut m, |s| s.enacted.fascist = target - 1);
    assert_eq!(enact(&mut m, Policy::Fascist), Phase::GameOver);
    assert_eq!(m.state().winner.unwrap().reason, WinReason::FascistPolicies);
}

#[test]
fn rejected_actions_leave_state_untouched() {
    let mut m = started(6, 19);
    let before = snapshot(&m);
    let other = m.state().turn_order[1].clone();

    let attempts = [
        Action::Vote { vote: Ballot::Ja },
        Action::PresidentDiscard { discarded_policy: Policy::Liberal },
        Action::VetoRequest,
        Action::InvestigationConfirm,
        Action::PolicyPeekDone,
        Action::Execution { target_id: other.clone() },
        Action::Unknown,
    ];
    for action in &attempts {
        assert!(!m.apply(&other, action).is_applied(), "{action:?}");
    }
    rejected(m.apply(&other, &Action::Unknown), Rejection::UnknownAction);
    assert_eq!(snapshot(&m), before);
}

#[test]
fn finished_games_ignore_everything() {
    let mut m = started(5, 44);
    let h = hitler(&m);
    let pres = non_hitler(&m, &[]);
    seat_president(&mut m, &pres, Phase::Execution);
    act(&mut m, &pres, Action::Execution { target_id: h });
    let before = snapshot(&m);
    let someone = m.state().turn_order[0].clone();
    rejected(nominate(&mut m, &someone), Rejection::WrongPhase);
    assert_eq!(snapshot(&m), before);
}

#[test]
fn a_finished_game_can_be_restarted() {
    let mut m = started(5, 44);
    edit(&mut m, |s| s.phase = Phase::GameOver);
    m.start(players(6), 45).unwrap();
    assert_eq!(m.phase(), Phase::Nomination);
    assert_eq!(m.state().players.len(), 6);
    assert!(m.state().winner.is_none());
}

#[test]
fn rehydration_recomputes_the_rotation_index() {
    let m = started(7, 3);
    let mut state = m.into_state();
    state.president_candidate = Some(state.turn_order[4].clone());
    state.current_president_index = 0;
    let m = PhaseMachine::from_state(state);
    assert_eq!(m.state().current_president_index, 4);
}
