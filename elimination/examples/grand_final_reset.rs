//! Grand Final Reset Example
//!
//! Plays a four-team double elimination bracket where the loser-side finalist
//! wins the first grand final leg, forcing the reset leg.

use elimination::{Format, MatchId, Segment, champion, compute_standings, generate};

fn main() {
    println!("=== Double Elimination: Grand Final Reset ===\n");

    let teams: Vec<String> = ["Alpha", "Bravo", "Charlie", "Delta"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut bracket = generate(Format::DoubleElim, &teams).unwrap();

    // Higher seed (slot A) wins everything before the grand final
    loop {
        let ready: Vec<MatchId> = bracket
            .ready_matches()
            .iter()
            .filter(|m| m.segment != Segment::Final)
            .map(|m| m.id.clone())
            .collect();
        if ready.is_empty() {
            break;
        }
        for id in ready {
            let m = bracket.get(&id).unwrap();
            println!(
                "{:<5} {} beats {}",
                id,
                m.a.label().unwrap_or_default(),
                m.b.label().unwrap_or_default()
            );
            bracket.apply_result(&id, 2, 0, false).unwrap();
        }
    }

    let gf1 = MatchId::from("GF1");
    let outcome = bracket.apply_result(&gf1, 1, 3, false).unwrap();
    println!("\nGF1 upset by the loser-side finalist: {outcome:?}");

    let gf2 = MatchId::from("GF2");
    bracket.apply_result(&gf2, 0, 2, false).unwrap();
    println!("Champion: {}\n", champion(&bracket).unwrap_or("undecided"));

    for s in compute_standings(&bracket) {
        println!("{}. {} ({}-{})", s.placement, s.participant, s.wins, s.losses);
    }
}
