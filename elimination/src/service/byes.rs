//! Automatic resolution of bye-sentinel matches.

use crate::bracket::{Bracket, PropagationResult};
use log::info;

/// Play out every ready match that holds the bye sentinel
///
/// The real side wins 1-0; slot A wins when both sides are byes. Repeats until
/// no such match is ready, since each result can make another one ready.
/// Returns the number of matches resolved.
pub fn resolve_byes(bracket: &mut Bracket) -> PropagationResult<usize> {
    let mut resolved = 0;

    loop {
        let next = bracket
            .matches()
            .iter()
            .find(|m| m.is_ready() && m.has_bye())
            .map(|m| (m.id.clone(), m.a.is_bye() && !m.b.is_bye()));
        let Some((match_id, b_advances)) = next else {
            break;
        };

        let (score_a, score_b) = if b_advances { (0, 1) } else { (1, 0) };
        bracket.apply_result(&match_id, score_a, score_b, false)?;
        resolved += 1;
    }

    if resolved > 0 {
        info!("Resolved {resolved} bye match(es) in bracket {}", bracket.id);
    }
    Ok(resolved)
}
