/// Property-based tests for generated brackets
///
/// These tests check structural invariants of every generated graph and
/// play random tournaments to completion.
use elimination::service::resolve_byes;
use elimination::{
    BYE_LABEL, Bracket, Format, MatchId, Segment, champion, compute_standings, generate,
    is_complete, pad_with_byes,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};

fn labels(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Team {i}")).collect()
}

// Strategy for power-of-two field sizes from 2 to 64
fn power_of_two_strategy() -> impl Strategy<Value = usize> {
    (1u32..=6).prop_map(|exp| 1usize << exp)
}

/// Kahn's algorithm over both edge kinds; true when every match is reached
fn is_acyclic(bracket: &Bracket) -> bool {
    let mut in_degree: HashMap<&MatchId, usize> =
        bracket.matches().iter().map(|m| (&m.id, 0)).collect();
    for m in bracket.matches() {
        for target in m.targets() {
            *in_degree.entry(&target.match_id).or_default() += 1;
        }
    }

    let mut queue: VecDeque<&MatchId> = in_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut visited = 0;
    while let Some(id) = queue.pop_front() {
        visited += 1;
        let Some(m) = bracket.get(id) else { continue };
        for target in m.targets() {
            if let Some(d) = in_degree.get_mut(&target.match_id) {
                *d -= 1;
                if *d == 0 {
                    queue.push_back(&target.match_id);
                }
            }
        }
    }
    visited == bracket.match_count()
}

fn edges_resolve(bracket: &Bracket) -> bool {
    bracket
        .matches()
        .iter()
        .flat_map(|m| m.targets())
        .all(|t| bracket.get(&t.match_id).is_some())
}

/// Winner-side edges go from match `k` of round `r` to match `ceil(k / 2)` of `r + 1`
fn winner_edges_halve(bracket: &Bracket) -> bool {
    bracket
        .matches()
        .iter()
        .filter(|m| m.segment == Segment::Winner)
        .filter_map(|m| Some((m, bracket.get(&m.winner_target.as_ref()?.match_id)?)))
        .filter(|(_, next)| next.segment == Segment::Winner)
        .all(|(m, next)| {
            next.round == m.round + 1 && next.match_number == m.match_number.div_ceil(2)
        })
}

/// Play every ready match with random decisive scores until none remain
fn play_randomly(bracket: &mut Bracket, rng: &mut StdRng) -> usize {
    let mut played = 0;
    loop {
        resolve_byes(bracket).unwrap();
        let ready: Vec<MatchId> = bracket.ready_matches().iter().map(|m| m.id.clone()).collect();
        let Some(next) = ready.get(rng.random_range(0..ready.len().max(1))) else {
            return played;
        };

        let high = rng.random_range(1..5u32);
        let low = rng.random_range(0..high);
        let (score_a, score_b) = if rng.random_bool(0.5) {
            (high, low)
        } else {
            (low, high)
        };

        bracket.apply_result(next, score_a, score_b, false).unwrap();
        played += 1;
    }
}

proptest! {
    #[test]
    fn test_single_elim_structure(n in 2usize..=70) {
        let bracket = generate(Format::SingleElim, &labels(n)).unwrap();

        prop_assert_eq!(bracket.match_count(), n - 1);
        prop_assert_eq!(bracket.byes, n.next_power_of_two() - n);
        prop_assert_eq!(
            bracket.rounds(Segment::Winner),
            n.next_power_of_two().trailing_zeros()
        );
        prop_assert!(edges_resolve(&bracket));
        prop_assert!(winner_edges_halve(&bracket));
        prop_assert!(is_acyclic(&bracket));
    }

    #[test]
    fn test_double_elim_structure(n in power_of_two_strategy()) {
        let bracket = generate(Format::DoubleElim, &labels(n)).unwrap();
        let active = bracket.matches().iter().filter(|m| !m.reserved).count();
        let winner_rounds = n.trailing_zeros();

        if n >= 4 {
            prop_assert_eq!(active, 2 * n - 2);
            prop_assert_eq!(bracket.rounds(Segment::Loser), 2 * (winner_rounds - 1));
        } else {
            prop_assert_eq!(active, 1);
        }
        prop_assert_eq!(bracket.match_count(), active + 1);
        prop_assert!(edges_resolve(&bracket));
        prop_assert!(is_acyclic(&bracket));
    }

    #[test]
    fn test_random_single_elim_playout(n in 2usize..=40, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut bracket = generate(Format::SingleElim, &labels(n)).unwrap();

        let played = play_randomly(&mut bracket, &mut rng);

        prop_assert_eq!(played, n - 1);
        prop_assert!(is_complete(&bracket));
        prop_assert!(champion(&bracket).is_some());

        let standings = compute_standings(&bracket);
        let undefeated = standings.iter().filter(|s| s.losses == 0).count();
        prop_assert_eq!(undefeated, 1);
        prop_assert_eq!(standings[0].participant.as_str(), champion(&bracket).unwrap());
    }

    #[test]
    fn test_random_double_elim_playout(n in 2usize..=24, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut bracket = generate(Format::DoubleElim, &pad_with_byes(labels(n))).unwrap();

        play_randomly(&mut bracket, &mut rng);

        prop_assert!(is_complete(&bracket));
        let winner = champion(&bracket);
        prop_assert!(winner.is_some());
        prop_assert_ne!(winner, Some(BYE_LABEL));

        // Everyone but the champion is eliminated with at most two losses
        let standings = compute_standings(&bracket);
        prop_assert_eq!(standings.len(), n);
        for s in &standings {
            prop_assert!(s.losses <= 2);
        }
    }

    #[test]
    fn test_reset_restores_previous_state(n in 4usize..=16, steps in 0usize..20, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut bracket = generate(Format::DoubleElim, &labels(n.next_power_of_two())).unwrap();

        for _ in 0..steps {
            let ready: Vec<MatchId> = bracket.ready_matches().iter().map(|m| m.id.clone()).collect();
            let Some(next) = ready.first() else { break };
            bracket.apply_result(next, 2, rng.random_range(0..2u32), false).unwrap();
        }

        let ready: Vec<MatchId> = bracket.ready_matches().iter().map(|m| m.id.clone()).collect();
        if let Some(target) = ready.last() {
            let before = bracket.matches().to_vec();
            bracket.apply_result(target, 0, 1, false).unwrap();
            bracket.reset_result(target).unwrap();
            prop_assert_eq!(bracket.matches(), before.as_slice());
        }
    }
}
