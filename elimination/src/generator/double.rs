//! Double elimination layout: winner tree, loser tree and grand final legs.

use super::single::build_winner_tree;
use crate::bracket::{
    Format, GrandFinal, Match, MatchId, Occupant, Origin, Segment, Side, Slot, Target,
};

const FORMAT: Format = Format::DoubleElim;

fn id(segment: Segment, round: u32, number: u32) -> MatchId {
    MatchId::positional(FORMAT, segment, round, number)
}

fn side_for_number(number: u32) -> Side {
    if number % 2 == 1 { Side::A } else { Side::B }
}

/// Build every match of a power-of-two double elimination field
///
/// Loser rounds come in pairs. Round `2i-1` halves the field (pairs of round-1
/// losers when `i == 1`, otherwise pairs of winners from round `2i-2`); round
/// `2i` keeps the count and meets each survivor with the loser dropping out of
/// winner round `i+1`.
pub(super) fn build(
    labels: &[String],
    lines: &[Option<usize>],
    grand_final_reset: bool,
) -> (Vec<Match>, GrandFinal) {
    let size = lines.len();
    let first_leg = id(Segment::Final, 1, 1);
    let reset_leg = grand_final_reset.then(|| id(Segment::Final, 2, 1));

    let mut matches = if size == 2 {
        seeded_grand_final(labels, lines, &first_leg)
    } else {
        let mut matches = winner_and_loser_trees(labels, lines, &first_leg);
        matches.push(Match::new(first_leg.clone(), Segment::Final, 1, 1));
        matches
    };

    if let Some(reset_id) = &reset_leg {
        let mut reset = Match::new(reset_id.clone(), Segment::Final, 2, 1);
        reset.reserved = true;
        matches.push(reset);
    }

    (
        matches,
        GrandFinal {
            first_leg,
            reset_leg,
        },
    )
}

/// Two participants meet directly in the first leg
///
/// Seed 2 takes the loser-side place, so beating seed 1 forces the reset leg.
fn seeded_grand_final(labels: &[String], lines: &[Option<usize>], first_leg: &MatchId) -> Vec<Match> {
    let mut gf = Match::new(first_leg.clone(), Segment::Final, 1, 1);
    let mut seeded = lines.iter().flatten().map(|&i| labels[i].clone());
    gf.a = seeded.next().map(Slot::seeded).unwrap_or_default();
    gf.b = seeded
        .next()
        .map(|label| {
            Slot::Filled(Occupant {
                origin: Origin::Loser,
                ..Occupant::seed(label)
            })
        })
        .unwrap_or_default();
    vec![gf]
}

fn winner_and_loser_trees(
    labels: &[String],
    lines: &[Option<usize>],
    first_leg: &MatchId,
) -> Vec<Match> {
    let size = lines.len();
    let tree = build_winner_tree(FORMAT, labels, lines);
    let winner_rounds = tree.rounds;
    let loser_rounds = 2 * (winner_rounds - 1);
    let mut matches = tree.matches;

    for m in matches.iter_mut() {
        if m.round == winner_rounds {
            m.winner_target = Some(Target::fixed(first_leg.clone(), Side::A));
        }
        m.loser_target = Some(if m.round == 1 {
            Target::fixed(
                id(Segment::Loser, 1, m.match_number.div_ceil(2)),
                side_for_number(m.match_number),
            )
        } else {
            Target::fixed(
                id(Segment::Loser, 2 * (m.round - 1), m.match_number),
                Side::B,
            )
        });
    }

    for pair in 1..winner_rounds {
        let count = (size >> (pair + 1)) as u32;
        let odd_round = 2 * pair - 1;
        let even_round = 2 * pair;

        for number in 1..=count {
            let mut m = Match::new(id(Segment::Loser, odd_round, number), Segment::Loser, odd_round, number);
            m.winner_target = Some(Target::fixed(id(Segment::Loser, even_round, number), Side::A));
            matches.push(m);
        }

        for number in 1..=count {
            let mut m = Match::new(id(Segment::Loser, even_round, number), Segment::Loser, even_round, number);
            m.winner_target = Some(if even_round == loser_rounds {
                Target::fixed(first_leg.clone(), Side::B)
            } else {
                Target::fixed(
                    id(Segment::Loser, even_round + 1, number.div_ceil(2)),
                    side_for_number(number),
                )
            });
            matches.push(m);
        }
    }

    matches
}
