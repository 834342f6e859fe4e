//! Standings calculator.
//!
//! Read-only view over a bracket: win/loss records, placements, completion and
//! champion. Matches involving the bye sentinel and inactive reset legs never
//! count.

use crate::bracket::{BYE_LABEL, Bracket, BracketId, Format, Match};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One participant's record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub participant: String,
    /// Seed (1-indexed position in the participant list)
    pub seed: usize,
    pub wins: u32,
    pub losses: u32,
    pub matches_played: u32,
    /// 1-based rank
    pub placement: usize,
}

/// Standings plus completion state, as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsReport {
    pub bracket_id: BracketId,
    pub standings: Vec<Standing>,
    pub complete: bool,
    pub champion: Option<String>,
}

/// Compute records for every participant
///
/// Ordered by wins (descending), then losses (ascending), then seed.
pub fn compute_standings(bracket: &Bracket) -> Vec<Standing> {
    let mut standings: Vec<Standing> = bracket
        .participants
        .iter()
        .enumerate()
        .filter(|(_, label)| label.as_str() != BYE_LABEL)
        .map(|(i, label)| Standing {
            participant: label.clone(),
            seed: i + 1,
            wins: 0,
            losses: 0,
            matches_played: 0,
            placement: 0,
        })
        .collect();

    let by_label: HashMap<String, usize> = standings
        .iter()
        .enumerate()
        .map(|(i, s)| (s.participant.clone(), i))
        .collect();

    for m in bracket.matches().iter().filter(|m| counts(m)) {
        if let Some(&i) = m.winner_label().and_then(|label| by_label.get(label)) {
            standings[i].wins += 1;
            standings[i].matches_played += 1;
        }
        if let Some(&i) = m.loser_label().and_then(|label| by_label.get(label)) {
            standings[i].losses += 1;
            standings[i].matches_played += 1;
        }
    }

    standings.sort_by(|x, y| {
        y.wins
            .cmp(&x.wins)
            .then(x.losses.cmp(&y.losses))
            .then(x.seed.cmp(&y.seed))
    });
    for (rank, standing) in standings.iter_mut().enumerate() {
        standing.placement = rank + 1;
    }

    standings
}

/// Finished match between two real participants
fn counts(m: &Match) -> bool {
    m.finished && m.is_real()
}

/// At least one real match exists and all of them are finished
pub fn is_complete(bracket: &Bracket) -> bool {
    let mut real = bracket.matches().iter().filter(|m| m.is_real()).peekable();
    real.peek().is_some() && real.all(|m| m.finished)
}

/// Winner of the last contest, once the bracket is complete
pub fn champion(bracket: &Bracket) -> Option<&str> {
    if !is_complete(bracket) {
        return None;
    }

    let last = match (bracket.format, &bracket.grand_final) {
        (Format::DoubleElim, Some(gf)) => {
            let reset = gf
                .reset_leg
                .as_ref()
                .and_then(|id| bracket.get(id))
                .filter(|m| !m.reserved);
            reset.or_else(|| bracket.get(&gf.first_leg))
        }
        _ => bracket
            .matches()
            .iter()
            .filter(|m| m.winner_target.is_none() && !m.reserved)
            .max_by_key(|m| m.round),
    };

    last.and_then(|m| m.winner_label())
}

/// Standings, completion and champion in one snapshot
pub fn report(bracket: &Bracket) -> StandingsReport {
    StandingsReport {
        bracket_id: bracket.id,
        standings: compute_standings(bracket),
        complete: is_complete(bracket),
        champion: champion(bracket).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::MatchId;
    use crate::generator::generate;

    fn labels(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Team {i}")).collect()
    }

    fn id(s: &str) -> MatchId {
        MatchId::from(s)
    }

    #[test]
    fn test_fresh_bracket_lists_everyone_by_seed() {
        let bracket = generate(Format::SingleElim, &labels(4)).unwrap();
        let standings = compute_standings(&bracket);

        assert_eq!(standings.len(), 4);
        for (i, s) in standings.iter().enumerate() {
            assert_eq!(s.participant, format!("Team {}", i + 1));
            assert_eq!(s.placement, i + 1);
            assert_eq!(s.matches_played, 0);
        }
        assert!(!is_complete(&bracket));
        assert_eq!(champion(&bracket), None);
    }

    #[test]
    fn test_records_and_champion() {
        let mut bracket = generate(Format::SingleElim, &labels(4)).unwrap();
        bracket.apply_result(&id("R1-1"), 2, 1, false).unwrap();
        bracket.apply_result(&id("R1-2"), 0, 2, false).unwrap();
        bracket.apply_result(&id("R2-1"), 1, 3, false).unwrap();

        let standings = compute_standings(&bracket);
        let order: Vec<&str> = standings.iter().map(|s| s.participant.as_str()).collect();
        // Team 3 won twice; Team 1 won once and lost once; Team 2 and 4 lost once
        assert_eq!(order, vec!["Team 3", "Team 1", "Team 2", "Team 4"]);
        assert_eq!(standings[0].wins, 2);
        assert_eq!(standings[1].matches_played, 2);

        assert!(is_complete(&bracket));
        assert_eq!(champion(&bracket), Some("Team 3"));

        let report = report(&bracket);
        assert!(report.complete);
        assert_eq!(report.champion.as_deref(), Some("Team 3"));
        assert_eq!(report.bracket_id, bracket.id);
    }

    #[test]
    fn test_bye_sentinel_matches_do_not_count() {
        let mut participants = labels(3);
        participants.push(BYE_LABEL.to_string());
        let mut bracket = generate(Format::DoubleElim, &participants).unwrap();

        // Seed 1 meets the bye in W1-1
        let first = bracket.get(&id("W1-1")).unwrap();
        assert!(first.has_bye());
        bracket.apply_result(&id("W1-1"), 1, 0, false).unwrap();

        let standings = compute_standings(&bracket);
        assert_eq!(standings.len(), 3);
        assert!(standings.iter().all(|s| s.matches_played == 0));
    }
}
