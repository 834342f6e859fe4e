//! Skeleton generator.
//!
//! Builds the complete match graph for a format and a seed-ordered
//! participant list. Round-1 slots are filled from the list (plus bye
//! placements in single elimination); every later slot starts empty and is
//! filled by result propagation.
//!
//! ## Example
//!
//! ```
//! use elimination::{Format, generate};
//!
//! let teams: Vec<String> = ["Alpha", "Bravo", "Charlie", "Delta", "Echo"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//!
//! let bracket = generate(Format::SingleElim, &teams).unwrap();
//! assert_eq!(bracket.byes, 3);
//! assert_eq!(bracket.match_count(), 4);
//! ```

mod double;
mod single;

use crate::bracket::{
    BYE_LABEL, Bracket, Format, GenerationParams, Match, SeedingMethod, Segment, ValidationError,
};
use log::info;
use std::collections::HashSet;

/// Generate a bracket with default parameters
pub fn generate(format: Format, participants: &[String]) -> Result<Bracket, ValidationError> {
    generate_with(format, participants, GenerationParams::default())
}

/// Generate a bracket
///
/// # Arguments
///
/// * `format` - Single or double elimination
/// * `participants` - Labels in seed order (index 0 is seed 1)
/// * `params` - Seeding method and grand final reset toggle
///
/// # Returns
///
/// * `Result<Bracket, ValidationError>` - The new bracket, or the reason the
///   field cannot be laid out
pub fn generate_with(
    format: Format,
    participants: &[String],
    params: GenerationParams,
) -> Result<Bracket, ValidationError> {
    validate_participants(participants)?;

    let count = participants.len();
    let size = count.next_power_of_two();

    if format == Format::DoubleElim && size != count {
        return Err(ValidationError::UnsupportedParticipantCount { format, count });
    }
    if params.seeding == SeedingMethod::AsListed && size != count {
        return Err(ValidationError::UnsupportedSeeding {
            seeding: params.seeding,
            count,
        });
    }

    let lines = bracket_lines(count, size, params.seeding);

    let (mut matches, grand_final, byes) = match format {
        Format::SingleElim => {
            let tree = single::build_winner_tree(format, participants, &lines);
            (tree.matches, None, tree.byes)
        }
        Format::DoubleElim => {
            let (matches, gf) = double::build(participants, &lines, params.grand_final_reset);
            (matches, Some(gf), 0)
        }
    };

    label_rounds(&mut matches, format);

    let bracket = Bracket::assemble(
        format,
        participants.to_vec(),
        params,
        byes,
        matches,
        grand_final,
    );

    info!(
        "Generated {} bracket {}: {} participants, {} matches, {} byes",
        format,
        bracket.id,
        count,
        bracket.match_count(),
        byes
    );

    Ok(bracket)
}

/// Pad a field with bye sentinels up to the next power of two
///
/// Double elimination only accepts power-of-two fields; the padded entries
/// are resolved by [`crate::service::resolve_byes`].
pub fn pad_with_byes(mut participants: Vec<String>) -> Vec<String> {
    let size = participants.len().next_power_of_two();
    participants.resize(size, BYE_LABEL.to_string());
    participants
}

fn validate_participants(participants: &[String]) -> Result<(), ValidationError> {
    if participants.len() < 2 {
        return Err(ValidationError::TooFewParticipants(participants.len()));
    }

    let mut seen = HashSet::new();
    for (i, label) in participants.iter().enumerate() {
        if label.trim().is_empty() {
            return Err(ValidationError::EmptyLabel(i + 1));
        }
        if label != BYE_LABEL && !seen.insert(label.as_str()) {
            return Err(ValidationError::DuplicateLabel(label.clone()));
        }
    }

    Ok(())
}

/// Participant index for every round-1 line; `None` marks an absent seed
fn bracket_lines(count: usize, size: usize, seeding: SeedingMethod) -> Vec<Option<usize>> {
    match seeding {
        SeedingMethod::Standard => seed_positions(size)
            .into_iter()
            .map(|seed| (seed <= count).then(|| seed - 1))
            .collect(),
        SeedingMethod::AsListed => (0..size).map(|i| (i < count).then_some(i)).collect(),
    }
}

/// Seeds in line order, e.g. `[1, 8, 4, 5, 2, 7, 3, 6]` for eight lines
pub(crate) fn seed_positions(size: usize) -> Vec<usize> {
    let mut seeds = vec![1usize];
    while seeds.len() < size {
        let n = seeds.len();
        let mut next = Vec::with_capacity(n * 2);
        for seed in seeds.iter().copied() {
            next.push(seed);
            next.push(n * 2 + 1 - seed);
        }
        seeds = next;
    }
    seeds
}

fn label_rounds(matches: &mut [Match], format: Format) {
    let last = |segment: Segment| {
        matches
            .iter()
            .filter(|m| m.segment == segment)
            .map(|m| m.round)
            .max()
            .unwrap_or(0)
    };
    let winner_rounds = last(Segment::Winner);
    let loser_rounds = last(Segment::Loser);

    for m in matches.iter_mut() {
        let label = match (format, m.segment) {
            (Format::SingleElim, _) => match winner_rounds - m.round {
                0 => "Final".to_string(),
                1 => "Semi-Final".to_string(),
                2 => "Quarter-Final".to_string(),
                _ => format!("Round {}", m.round),
            },
            (Format::DoubleElim, Segment::Winner) if m.round == winner_rounds => {
                "Winners Final".to_string()
            }
            (Format::DoubleElim, Segment::Winner) => format!("Winners Round {}", m.round),
            (Format::DoubleElim, Segment::Loser) if m.round == loser_rounds => {
                "Losers Final".to_string()
            }
            (Format::DoubleElim, Segment::Loser) => format!("Losers Round {}", m.round),
            (Format::DoubleElim, Segment::Final) if m.round == 1 => "Grand Final".to_string(),
            (Format::DoubleElim, Segment::Final) => "Grand Final Reset".to_string(),
        };
        m.metadata.insert("round_label".to_string(), label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{MatchId, Source};

    fn labels(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Team {i}")).collect()
    }

    #[test]
    fn test_seed_positions() {
        assert_eq!(seed_positions(2), vec![1, 2]);
        assert_eq!(seed_positions(4), vec![1, 4, 2, 3]);
        assert_eq!(seed_positions(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
    }

    #[test]
    fn test_power_of_two_single_elim() {
        let bracket = generate(Format::SingleElim, &labels(8)).unwrap();
        assert_eq!(bracket.match_count(), 7);
        assert_eq!(bracket.rounds(Segment::Winner), 3);
        assert_eq!(bracket.byes, 0);

        let round_one = bracket.round(Segment::Winner, 1);
        let mut seen: Vec<&str> = round_one
            .iter()
            .flat_map(|m| [m.a.label(), m.b.label()])
            .flatten()
            .collect();
        seen.sort();
        let mut expected = labels(8);
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_standard_seeding_pairs_top_against_bottom() {
        let bracket = generate(Format::SingleElim, &labels(4)).unwrap();
        let first = bracket.get(&MatchId::from("R1-1")).unwrap();
        assert_eq!(first.a.label(), Some("Team 1"));
        assert_eq!(first.b.label(), Some("Team 4"));
    }

    #[test]
    fn test_as_listed_seeding_pairs_neighbours() {
        let params = GenerationParams {
            seeding: SeedingMethod::AsListed,
            ..Default::default()
        };
        let bracket = generate_with(Format::SingleElim, &labels(4), params).unwrap();
        let first = bracket.get(&MatchId::from("R1-1")).unwrap();
        assert_eq!(first.a.label(), Some("Team 1"));
        assert_eq!(first.b.label(), Some("Team 2"));

        let result = generate_with(Format::SingleElim, &labels(5), params);
        assert!(matches!(
            result,
            Err(ValidationError::UnsupportedSeeding { count: 5, .. })
        ));
    }

    #[test]
    fn test_byes_go_to_top_seeds() {
        let bracket = generate(Format::SingleElim, &labels(5)).unwrap();
        assert_eq!(bracket.byes, 3);
        assert_eq!(bracket.match_count(), 4);

        let round_one = bracket.round(Segment::Winner, 1);
        assert_eq!(round_one.len(), 1);
        assert_eq!(round_one[0].a.label(), Some("Team 4"));
        assert_eq!(round_one[0].b.label(), Some("Team 5"));

        let bye_holders: Vec<&str> = bracket
            .round(Segment::Winner, 2)
            .into_iter()
            .flat_map(|m| [&m.a, &m.b])
            .filter_map(|slot| slot.occupant())
            .filter(|o| o.source == Source::Bye)
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(bye_holders, vec!["Team 1", "Team 2", "Team 3"]);
    }

    #[test]
    fn test_two_participants_single_elim() {
        let bracket = generate(Format::SingleElim, &labels(2)).unwrap();
        assert_eq!(bracket.match_count(), 1);
        let only = &bracket.matches()[0];
        assert!(only.winner_target.is_none());
        assert_eq!(only.metadata.get("round_label").map(String::as_str), Some("Final"));
    }

    #[test]
    fn test_double_elim_requires_power_of_two() {
        let result = generate(Format::DoubleElim, &labels(6));
        assert_eq!(
            result.unwrap_err(),
            ValidationError::UnsupportedParticipantCount {
                format: Format::DoubleElim,
                count: 6
            }
        );

        let padded = pad_with_byes(labels(6));
        assert_eq!(padded.len(), 8);
        assert_eq!(padded[7], BYE_LABEL);
        assert!(generate(Format::DoubleElim, &padded).is_ok());
    }

    #[test]
    fn test_rejects_bad_participant_lists() {
        assert_eq!(
            generate(Format::SingleElim, &labels(1)).unwrap_err(),
            ValidationError::TooFewParticipants(1)
        );

        let blank = vec!["Alpha".to_string(), "  ".to_string()];
        assert_eq!(
            generate(Format::SingleElim, &blank).unwrap_err(),
            ValidationError::EmptyLabel(2)
        );

        let dup = vec!["Alpha".to_string(), "Alpha".to_string()];
        assert_eq!(
            generate(Format::SingleElim, &dup).unwrap_err(),
            ValidationError::DuplicateLabel("Alpha".to_string())
        );
    }

    #[test]
    fn test_round_labels() {
        let bracket = generate(Format::DoubleElim, &labels(4)).unwrap();
        let label = |id: &str| {
            bracket
                .get(&MatchId::from(id))
                .and_then(|m| m.metadata.get("round_label").cloned())
        };
        assert_eq!(label("W2-1").as_deref(), Some("Winners Final"));
        assert_eq!(label("L2-1").as_deref(), Some("Losers Final"));
        assert_eq!(label("GF1").as_deref(), Some("Grand Final"));
        assert_eq!(label("GF2").as_deref(), Some("Grand Final Reset"));
    }
}
