//! Winner-side tree shared by both formats.

use crate::bracket::{Format, Match, MatchId, Occupant, Origin, Segment, Side, Slot, Source, Target};

/// Winner-side matches plus the number of byes granted
pub(super) struct WinnerTree {
    pub matches: Vec<Match>,
    pub rounds: u32,
    pub byes: usize,
}

fn side_for_position(position: usize) -> Side {
    if position % 2 == 0 { Side::A } else { Side::B }
}

/// Build the winner tree over `lines`, one entry per round-1 line
///
/// A line holding `None` is an absent seed. Its opponent skips round 1 and is
/// written straight into the structural round-2 slot with a bye provenance.
/// Every match is numbered by its position in the full tree, so round 1 has
/// gaps where byes removed matches and each edge lands on `ceil(number / 2)`.
pub(super) fn build_winner_tree(
    format: Format,
    labels: &[String],
    lines: &[Option<usize>],
) -> WinnerTree {
    let size = lines.len();
    let rounds = size.trailing_zeros();
    let mut matches = Vec::with_capacity(size - 1);
    let mut bye_entries = Vec::new();

    for position in 0..size / 2 {
        match (lines[position * 2], lines[position * 2 + 1]) {
            (Some(a), Some(b)) => {
                let number = (position + 1) as u32;
                let id = MatchId::positional(format, Segment::Winner, 1, number);
                let mut m = Match::new(id, Segment::Winner, 1, number);
                m.a = Slot::seeded(labels[a].clone());
                m.b = Slot::seeded(labels[b].clone());
                if rounds > 1 {
                    m.winner_target = Some(Target::fixed(
                        MatchId::positional(format, Segment::Winner, 2, (position / 2 + 1) as u32),
                        side_for_position(position),
                    ));
                }
                matches.push(m);
            }
            (Some(present), None) | (None, Some(present)) => {
                bye_entries.push((position, present));
            }
            (None, None) => {}
        }
    }

    for round in 2..=rounds {
        let count = size >> round;
        for position in 0..count {
            let number = (position + 1) as u32;
            let id = MatchId::positional(format, Segment::Winner, round, number);
            let mut m = Match::new(id, Segment::Winner, round, number);
            if round < rounds {
                m.winner_target = Some(Target::fixed(
                    MatchId::positional(format, Segment::Winner, round + 1, (position / 2 + 1) as u32),
                    side_for_position(position),
                ));
            }
            matches.push(m);
        }
    }

    for &(position, participant) in &bye_entries {
        let target = MatchId::positional(format, Segment::Winner, 2, (position / 2 + 1) as u32);
        if let Some(m) = matches.iter_mut().find(|m| m.id == target) {
            *m.slot_mut(side_for_position(position)) = Slot::Filled(Occupant {
                label: labels[participant].clone(),
                source: Source::Bye,
                origin: Origin::Winner,
            });
        }
    }

    WinnerTree {
        matches,
        rounds,
        byes: bye_entries.len(),
    }
}
