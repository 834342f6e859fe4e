//! Single elimination end-to-end scenarios
//!
//! Covers layout for power-of-two and bye fields, full playouts, and the
//! change-of-result cascade across several rounds.

use elimination::{
    ApplyOutcome, Format, MatchId, Segment, Source, champion, compute_standings, generate,
    is_complete,
};

fn labels(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Team {i}")).collect()
}

fn id(s: &str) -> MatchId {
    MatchId::from(s)
}

/// Play every ready match with slot A winning
fn play_out_favouring_a(bracket: &mut elimination::Bracket) {
    loop {
        let ready: Vec<MatchId> = bracket.ready_matches().iter().map(|m| m.id.clone()).collect();
        if ready.is_empty() {
            break;
        }
        for match_id in ready {
            bracket.apply_result(&match_id, 2, 0, false).unwrap();
        }
    }
}

#[test]
fn test_eight_team_tournament() {
    let mut bracket = generate(Format::SingleElim, &labels(8)).unwrap();
    assert_eq!(bracket.match_count(), 7);
    assert_eq!(bracket.round(Segment::Winner, 1).len(), 4);
    assert_eq!(bracket.ready_matches().len(), 4);

    play_out_favouring_a(&mut bracket);

    assert!(is_complete(&bracket));
    assert_eq!(champion(&bracket), Some("Team 1"));

    let standings = compute_standings(&bracket);
    assert_eq!(standings[0].participant, "Team 1");
    assert_eq!(standings[0].wins, 3);
    assert_eq!(standings[0].losses, 0);
    // Every match produces exactly one win and one loss
    let wins: u32 = standings.iter().map(|s| s.wins).sum();
    let losses: u32 = standings.iter().map(|s| s.losses).sum();
    assert_eq!(wins, 7);
    assert_eq!(losses, 7);
}

#[test]
fn test_five_team_field_gets_three_byes() {
    let mut bracket = generate(Format::SingleElim, &labels(5)).unwrap();
    assert_eq!(bracket.byes, 3);
    assert_eq!(bracket.match_count(), 4);

    // Only seeds 4 and 5 play in round 1; seeds 2 and 3 meet straight away in round 2
    let ready = bracket.ready_matches();
    assert_eq!(ready.len(), 2);
    assert_eq!(ready[0].id, id("R1-2"));
    assert_eq!(ready[0].a.label(), Some("Team 4"));
    assert_eq!(ready[0].b.label(), Some("Team 5"));
    assert_eq!(ready[1].id, id("R2-2"));
    assert_eq!(ready[1].a.label(), Some("Team 2"));
    assert_eq!(ready[1].b.label(), Some("Team 3"));

    let r1 = ready[0].id.clone();
    bracket.apply_result(&r1, 1, 2, false).unwrap();

    // Seed 1 waits in round 2 for the 4/5 winner
    let semi = bracket
        .round(Segment::Winner, 2)
        .into_iter()
        .find(|m| m.a.label() == Some("Team 1"))
        .unwrap();
    assert_eq!(semi.a.occupant().unwrap().source, Source::Bye);
    assert_eq!(semi.b.label(), Some("Team 5"));
    assert_eq!(semi.b.propagated_from(), Some(&r1));

    play_out_favouring_a(&mut bracket);
    assert_eq!(champion(&bracket), Some("Team 1"));

    // Bye advances are not matches
    let seed_one = compute_standings(&bracket)
        .into_iter()
        .find(|s| s.participant == "Team 1")
        .unwrap();
    assert_eq!(seed_one.matches_played, 2);
}

#[test]
fn test_every_field_size_has_n_minus_one_matches() {
    for n in 2..=33 {
        let bracket = generate(Format::SingleElim, &labels(n)).unwrap();
        assert_eq!(bracket.match_count(), n - 1, "field of {n}");
        assert_eq!(bracket.byes, n.next_power_of_two() - n, "field of {n}");
    }
}

#[test]
fn test_overturning_a_first_round_result() {
    let mut bracket = generate(Format::SingleElim, &labels(8)).unwrap();
    play_out_favouring_a(&mut bracket);
    assert_eq!(champion(&bracket), Some("Team 1"));

    let outcome = bracket.apply_result(&id("R1-1"), 0, 2, false).unwrap();
    assert_eq!(
        outcome,
        ApplyOutcome::Applied {
            cleared: vec![id("R2-1"), id("R3-1")],
            reset_activated: false,
        }
    );
    assert!(!is_complete(&bracket));
    assert_eq!(champion(&bracket), None);

    // The other half of the bracket is untouched
    assert!(bracket.get(&id("R2-2")).unwrap().finished);
    assert_eq!(bracket.get(&id("R3-1")).unwrap().b.label(), Some("Team 2"));

    play_out_favouring_a(&mut bracket);
    assert_eq!(champion(&bracket), Some("Team 8"));
}

#[test]
fn test_reset_result_restores_downstream_slots() {
    let mut bracket = generate(Format::SingleElim, &labels(4)).unwrap();
    let before = bracket.matches().to_vec();

    bracket.apply_result(&id("R1-2"), 3, 2, false).unwrap();
    let cleared = bracket.reset_result(&id("R1-2")).unwrap();

    assert_eq!(cleared, vec![id("R2-1")]);
    assert_eq!(bracket.matches(), before.as_slice());
}

#[test]
fn test_matches_for_follows_a_participant() {
    let mut bracket = generate(Format::SingleElim, &labels(5)).unwrap();

    let ids = |bracket: &elimination::Bracket, label: &str| -> Vec<String> {
        bracket
            .matches_for(label)
            .iter()
            .map(|m| m.id.to_string())
            .collect()
    };
    assert_eq!(ids(&bracket, "Team 1"), vec!["R2-1"]);
    assert_eq!(ids(&bracket, "Team 5"), vec!["R1-2"]);

    bracket.apply_result(&id("R1-2"), 1, 2, false).unwrap();
    assert_eq!(ids(&bracket, "Team 5"), vec!["R1-2", "R2-1"]);
    assert_eq!(ids(&bracket, "Team 4"), vec!["R1-2"]);
    assert!(ids(&bracket, "Team 9").is_empty());
}
