//! Redaction rules for per-viewer projections.

use crate::domain::actions::Action;
use crate::domain::engine::PhaseMachine;
use crate::domain::player_view::project;
use crate::domain::state::{Ballot, Phase, Policy, Role, SessionState};
use crate::domain::test_state_helpers::{
    act, everyone_votes, nominate, president, started, with_role,
};

fn edit(m: &mut PhaseMachine, f: impl FnOnce(&mut SessionState)) {
    let mut state = m.state().clone();
    f(&mut state);
    *m = PhaseMachine::from_state(state);
}

fn known_roles(m: &PhaseMachine, viewer: &str) -> usize {
    project(m.state(), viewer)
        .seats
        .iter()
        .filter(|s| s.role.is_some())
        .count()
}

#[test]
fn liberals_only_know_themselves() {
    let m = started(8, 1);
    let liberal = with_role(&m, Role::Liberal).remove(0);
    let view = project(m.state(), &liberal);
    assert_eq!(view.my_role, Some(Role::Liberal));
    assert_eq!(known_roles(&m, &liberal), 1);
}

#[test]
fn fascists_see_the_whole_team_including_hitler() {
    let m = started(8, 1);
    let fascist = with_role(&m, Role::Fascist).remove(0);
    // 2 fascists + Hitler
    assert_eq!(known_roles(&m, &fascist), 3);
    let view = project(m.state(), &fascist);
    assert!(view
        .seats
        .iter()
        .any(|s| s.role == Some(Role::Hitler)));
}

#[test]
fn hitler_sees_team_only_at_small_tables() {
    let small = started(6, 2);
    let h = with_role(&small, Role::Hitler).remove(0);
    assert_eq!(known_roles(&small, &h), 2);

    let large = started(7, 2);
    let h = with_role(&large, Role::Hitler).remove(0);
    assert_eq!(known_roles(&large, &h), 1);
}

#[test]
fn spectators_get_the_public_view() {
    let m = started(5, 3);
    let view = project(m.state(), "spectator");
    assert!(view.viewer.is_none());
    assert!(view.my_role.is_none());
    assert!(view.seats.iter().all(|s| s.role.is_none()));
    assert!(view.legal_actions().is_empty());
}

#[test]
fn everyone_sees_every_role_at_game_over() {
    let mut m = started(7, 3);
    edit(&mut m, |s| s.phase = Phase::GameOver);
    let liberal = with_role(&m, Role::Liberal).remove(0);
    assert_eq!(known_roles(&m, &liberal), 7);
}

#[test]
fn drawn_cards_follow_the_holder() {
    let mut m = started(5, 4);
    let pres = president(&m);
    let h = with_role(&m, Role::Hitler).remove(0);
    let chancellor = m
        .state()
        .turn_order
        .iter()
        .find(|id| **id != pres && **id != h)
        .cloned()
        .unwrap();
    assert!(nominate(&mut m, &chancellor).is_applied());
    everyone_votes(&mut m, Ballot::Ja);

    assert_eq!(project(m.state(), &pres).drawn_policies.len(), 3);
    assert!(project(m.state(), &chancellor).drawn_policies.is_empty());

    let discard = m.state().drawn_policies[0];
    act(&mut m, &pres, Action::PresidentDiscard { discarded_policy: discard });
    assert!(project(m.state(), &pres).drawn_policies.is_empty());
    assert_eq!(project(m.state(), &chancellor).drawn_policies.len(), 2);
}

#[test]
fn ballots_are_hidden_until_the_round_closes() {
    let mut m = started(5, 5);
    let t = m.state().turn_order.clone();
    assert!(nominate(&mut m, &t[1]).is_applied());
    act(&mut m, &t[2], Action::Vote { vote: Ballot::Nein });

    let view = project(m.state(), &t[0]);
    assert!(view.votes.is_none());
    let voted: Vec<_> = view.seats.iter().filter(|s| s.has_voted).map(|s| &s.id).collect();
    assert_eq!(voted, vec![&t[2]]);

    for voter in [&t[0], &t[1], &t[3], &t[4]] {
        act(&mut m, voter, Action::Vote { vote: Ballot::Nein });
    }
    let view = project(m.state(), &t[0]);
    assert_eq!(view.votes.unwrap().len(), 5);
}

#[test]
fn private_investigation_is_for_the_president_only() {
    let mut m = started(9, 6);
    let t = m.state().turn_order.clone();
    edit(&mut m, |s| s.phase = Phase::Investigation);
    act(&mut m, &t[0], Action::InvestigatePlayer { target_id: t[4].clone() });

    assert!(project(m.state(), &t[0]).investigation.is_some());
    assert!(project(m.state(), &t[4]).investigation.is_none());
    assert!(project(m.state(), &t[1]).investigation.is_none());
}

#[test]
fn public_inquest_is_visible_to_everyone() {
    let mut m = started(11, 6);
    let t = m.state().turn_order.clone();
    edit(&mut m, |s| s.phase = Phase::PublicInquest);
    act(&mut m, &t[0], Action::PublicInquest { target_id: t[4].clone() });
    assert!(project(m.state(), &t[7]).public_investigation.is_some());

    act(&mut m, &t[0], Action::PublicInquestConfirm);
    let view = project(m.state(), "spectator");
    assert_eq!(view.public_record.len(), 1);
    assert_eq!(view.public_record[0].target, t[4]);
}

#[test]
fn peeked_cards_are_for_the_president_only() {
    let mut m = started(5, 7);
    let t = m.state().turn_order.clone();
    edit(&mut m, |s| {
        s.phase = Phase::PolicyPeek;
        s.peeked_policies = vec![Policy::Fascist, Policy::Liberal, Policy::Fascist];
    });
    assert_eq!(project(m.state(), &t[0]).peeked_policies.len(), 3);
    assert!(project(m.state(), &t[1]).peeked_policies.is_empty());
    assert_eq!(
        project(m.state(), &t[0]).legal_actions(),
        vec![Action::PolicyPeekDone]
    );
}

#[test]
fn legal_nominations_respect_term_limits() {
    let mut m = started(6, 8);
    let t = m.state().turn_order.clone();
    edit(&mut m, |s| {
        s.last_president_id = Some(t[1].clone());
        s.last_chancellor_id = Some(t[2].clone());
    });
    let offered = project(m.state(), &t[0]).legal_actions();
    assert_eq!(offered.len(), 3);
    assert!(offered.iter().all(|a| match a {
        Action::NominateChancellor { candidate_id } => {
            *candidate_id != t[1] && *candidate_id != t[2]
        }
        _ => false,
    }));
    assert!(project(m.state(), &t[1]).legal_actions().is_empty());
}

#[test]
fn the_dead_have_no_moves() {
    let mut m = started(5, 9);
    let t = m.state().turn_order.clone();
    edit(&mut m, |s| {
        s.dead_players.insert(t[3].clone());
    });
    assert!(nominate(&mut m, &t[1]).is_applied());
    assert!(project(m.state(), &t[3]).legal_actions().is_empty());
    assert_eq!(project(m.state(), &t[2]).legal_actions().len(), 2);
}
