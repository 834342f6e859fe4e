//! Result propagator.
//!
//! Applies a single match result and moves the winner (and, in double
//! elimination, the loser) along the match's edges. When a finished match is
//! overturned, every slot whose provenance traces back to it is cleared first,
//! transitively, using an explicit worklist. All mutation happens on a working
//! copy that replaces the bracket only once the whole update has succeeded.

use crate::bracket::{
    Bracket, MatchId, Occupant, Origin, PropagationError, PropagationResult, Segment, Side, Slot,
    Source, Target, TargetSlot, ValidationError,
};
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Outcome of [`Bracket::apply_result`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyOutcome {
    /// The result was recorded and propagated
    Applied {
        /// Matches that lost slots or results to the change-of-result cascade
        cleared: Vec<MatchId>,
        /// The grand final reset leg became playable
        reset_activated: bool,
    },
    /// The same result was already recorded; nothing changed
    Idempotent,
}

impl ApplyOutcome {
    pub fn is_idempotent(&self) -> bool {
        matches!(self, ApplyOutcome::Idempotent)
    }
}

/// Pending write into a downstream slot
#[derive(Debug)]
struct SlotWrite {
    target: MatchId,
    side: Side,
    occupant: Occupant,
}

impl Bracket {
    /// Record a match result and propagate it
    ///
    /// # Arguments
    ///
    /// * `match_id` - Match being reported
    /// * `score_a` - Score of slot A
    /// * `score_b` - Score of slot B
    /// * `force` - Overwrite occupied target slots instead of failing
    ///
    /// # Returns
    ///
    /// * `PropagationResult<ApplyOutcome>` - `Idempotent` for a repeated
    ///   identical report. On error the bracket is left untouched.
    pub fn apply_result(
        &mut self,
        match_id: &MatchId,
        score_a: u32,
        score_b: u32,
        force: bool,
    ) -> PropagationResult<ApplyOutcome> {
        if score_a == score_b {
            return Err(ValidationError::Draw { score_a, score_b }.into());
        }

        let current = self
            .get(match_id)
            .ok_or_else(|| PropagationError::NotFound(match_id.clone()))?;

        if current.reserved {
            return Err(ValidationError::MatchReserved(match_id.clone()).into());
        }
        if current.a.is_empty() || current.b.is_empty() {
            return Err(ValidationError::MatchNotReady(match_id.clone()).into());
        }

        let winner = if score_a > score_b { Side::A } else { Side::B };
        if current.finished
            && current.winner == Some(winner)
            && current.score_a == Some(score_a)
            && current.score_b == Some(score_b)
        {
            debug!("Match {match_id} already recorded as {score_a}-{score_b}");
            return Ok(ApplyOutcome::Idempotent);
        }
        let winner_changed = current.finished && current.winner != Some(winner);

        self.ensure_acyclic(match_id)?;

        let mut working = self.clone();
        let mut cleared = Vec::new();
        if winner_changed {
            info!("Result of {match_id} overturned, clearing downstream slots");
            cleared = working.invalidate_downstream(match_id);
        }

        if let Some(m) = working.get_mut(match_id) {
            m.score_a = Some(score_a);
            m.score_b = Some(score_b);
            m.winner = Some(winner);
            m.finished = true;
        }

        // Every target slot is resolved before any of them is written
        let writes = working.plan_writes(match_id, force)?;
        for write in writes {
            working.write_slot(match_id, write, &mut cleared);
        }

        let reset_activated = working.evaluate_grand_final(match_id);
        working.updated_at = Utc::now();
        *self = working;

        Ok(ApplyOutcome::Applied {
            cleared,
            reset_activated,
        })
    }

    /// Withdraw a recorded result and everything it propagated
    ///
    /// Returns the matches that lost slots or results. A match without a
    /// result is left alone.
    pub fn reset_result(&mut self, match_id: &MatchId) -> PropagationResult<Vec<MatchId>> {
        let m = self
            .get(match_id)
            .ok_or_else(|| PropagationError::NotFound(match_id.clone()))?;
        if !m.finished {
            return Ok(Vec::new());
        }

        self.ensure_acyclic(match_id)?;

        if let Some(m) = self.get_mut(match_id) {
            m.clear_result();
        }
        let cleared = self.invalidate_downstream(match_id);
        self.updated_at = Utc::now();

        info!("Reset result of {match_id}, {} downstream match(es) cleared", cleared.len());
        Ok(cleared)
    }

    /// Fail if any path along the edges leads back to `start`
    fn ensure_acyclic(&self, start: &MatchId) -> PropagationResult<()> {
        let mut stack: Vec<&MatchId> = self
            .get(start)
            .map(|m| m.targets().map(|t| &t.match_id).collect())
            .unwrap_or_default();
        let mut visited = HashSet::new();

        while let Some(current) = stack.pop() {
            if current == start {
                return Err(PropagationError::Cycle(start.clone()));
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(m) = self.get(current) {
                stack.extend(m.targets().map(|t| &t.match_id));
            }
        }

        Ok(())
    }

    /// Clear every slot fed by `root`, then by whatever those matches fed
    ///
    /// A target that loses a slot while finished also loses its result and
    /// joins the worklist. Bounded by the number of matches.
    fn invalidate_downstream(&mut self, root: &MatchId) -> Vec<MatchId> {
        let mut cleared = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([root.clone()]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }

            if self.is_first_leg(&current) {
                self.deactivate_reset_leg(&mut cleared);
            }

            let targets: Vec<MatchId> = self
                .get(&current)
                .map(|m| m.targets().map(|t| t.match_id.clone()).collect())
                .unwrap_or_default();

            for target_id in targets {
                let Some(target) = self.get_mut(&target_id) else {
                    continue;
                };

                let mut touched = false;
                for side in [Side::A, Side::B] {
                    if target.slot(side).propagated_from() == Some(&current) {
                        *target.slot_mut(side) = Slot::Placeholder;
                        touched = true;
                    }
                }
                if !touched {
                    continue;
                }

                debug!("Cleared slot(s) of {target_id} fed by {current}");
                if target.finished {
                    target.clear_result();
                    queue.push_back(target_id.clone());
                }
                if !cleared.contains(&target_id) {
                    cleared.push(target_id);
                }
            }
        }

        cleared
    }

    fn plan_writes(&self, match_id: &MatchId, force: bool) -> PropagationResult<Vec<SlotWrite>> {
        let m = self
            .get(match_id)
            .ok_or_else(|| PropagationError::NotFound(match_id.clone()))?;
        let mut writes: Vec<SlotWrite> = Vec::with_capacity(2);

        if let (Some(target), Some(occupant)) = (&m.winner_target, m.winner_occupant()) {
            let origin = if m.segment == Segment::Loser {
                Origin::Loser
            } else {
                occupant.origin
            };
            let side = self.choose_slot(match_id, target, &occupant.label, force, None)?;
            writes.push(SlotWrite {
                target: target.match_id.clone(),
                side,
                occupant: Occupant {
                    label: occupant.label.clone(),
                    source: Source::Match(match_id.clone()),
                    origin,
                },
            });
        }

        if let (Some(target), Some(occupant)) = (&m.loser_target, m.loser_occupant()) {
            let taken = writes
                .iter()
                .find(|w| w.target == target.match_id)
                .map(|w| w.side);
            let side = self.choose_slot(match_id, target, &occupant.label, force, taken)?;
            writes.push(SlotWrite {
                target: target.match_id.clone(),
                side,
                occupant: Occupant {
                    label: occupant.label.clone(),
                    source: Source::Match(match_id.clone()),
                    origin: Origin::Loser,
                },
            });
        }

        Ok(writes)
    }

    /// Pick the slot of `target` that receives `incoming` from `from`
    fn choose_slot(
        &self,
        from: &MatchId,
        target: &Target,
        incoming: &str,
        force: bool,
        taken: Option<Side>,
    ) -> PropagationResult<Side> {
        let t = self
            .get(&target.match_id)
            .ok_or_else(|| PropagationError::NotFound(target.match_id.clone()))?;

        let accepts = |side: Side| {
            let slot = t.slot(side);
            slot.is_empty() || slot.propagated_from() == Some(from) || slot.label() == Some(incoming)
        };
        let conflict = |side: Side| PropagationError::SlotConflict {
            match_id: from.clone(),
            target: target.match_id.clone(),
            slot: side,
            existing: t.slot(side).label().unwrap_or_default().to_string(),
            incoming: incoming.to_string(),
        };

        match target.slot {
            TargetSlot::Fixed(side) => {
                if accepts(side) || force {
                    Ok(side)
                } else {
                    Err(conflict(side))
                }
            }
            TargetSlot::Any => {
                let sides: Vec<Side> = [Side::A, Side::B]
                    .into_iter()
                    .filter(|&s| Some(s) != taken)
                    .collect();

                let chosen = sides
                    .iter()
                    .copied()
                    .find(|&s| t.slot(s).propagated_from() == Some(from))
                    .or_else(|| sides.iter().copied().find(|&s| t.slot(s).is_empty()))
                    .or_else(|| {
                        sides
                            .iter()
                            .copied()
                            .find(|&s| t.slot(s).label() == Some(incoming))
                    });
                if let Some(side) = chosen {
                    return Ok(side);
                }

                let fallback = if sides.contains(&Side::B) { Side::B } else { Side::A };
                if force {
                    Ok(fallback)
                } else {
                    Err(conflict(fallback))
                }
            }
        }
    }

    fn write_slot(&mut self, from: &MatchId, write: SlotWrite, cleared: &mut Vec<MatchId>) {
        let Some(target) = self.get(&write.target) else {
            return;
        };

        let displaced = target
            .slot(write.side)
            .occupant()
            .filter(|existing| {
                existing.label != write.occupant.label
                    && existing.source != Source::Match(from.clone())
            })
            .map(|existing| existing.label.clone());

        if let Some(label) = displaced {
            warn!(
                "Forced overwrite: {} replaces {} in slot {} of {}",
                write.occupant.label, label, write.side, write.target
            );
            if target.finished {
                // The displaced participant played this match
                if let Some(t) = self.get_mut(&write.target) {
                    t.clear_result();
                }
                for id in self.invalidate_downstream(&write.target) {
                    if !cleared.contains(&id) {
                        cleared.push(id);
                    }
                }
                if !cleared.contains(&write.target) {
                    cleared.push(write.target.clone());
                }
            }
        }

        debug!(
            "{} advances {} into slot {} of {}",
            from, write.occupant.label, write.side, write.target
        );
        if let Some(t) = self.get_mut(&write.target) {
            *t.slot_mut(write.side) = Slot::Filled(write.occupant);
        }
    }

    fn is_first_leg(&self, id: &MatchId) -> bool {
        self.grand_final
            .as_ref()
            .is_some_and(|gf| &gf.first_leg == id)
    }

    /// Return an activated reset leg to its reserved state
    fn deactivate_reset_leg(&mut self, cleared: &mut Vec<MatchId>) {
        let Some(reset_id) = self.grand_final.as_ref().and_then(|gf| gf.reset_leg.clone()) else {
            return;
        };
        let Some(reset) = self.get_mut(&reset_id) else {
            return;
        };
        if reset.reserved {
            return;
        }

        reset.reserved = true;
        reset.a = Slot::Placeholder;
        reset.b = Slot::Placeholder;
        reset.clear_result();
        info!("Grand final reset {reset_id} deactivated");

        if !cleared.contains(&reset_id) {
            cleared.push(reset_id);
        }
    }

    /// Activate the reset leg when the loser-side finalist takes the first leg
    fn evaluate_grand_final(&mut self, match_id: &MatchId) -> bool {
        if !self.is_first_leg(match_id) {
            return false;
        }
        let Some(reset_id) = self.grand_final.as_ref().and_then(|gf| gf.reset_leg.clone()) else {
            return false;
        };
        let Some(first) = self.get(match_id) else {
            return false;
        };
        let (Some(winner), Some(loser)) = (first.winner_occupant(), first.loser_occupant()) else {
            return false;
        };

        if winner.origin != Origin::Loser || loser.origin != Origin::Winner {
            return false;
        }

        let winner_label = winner.label.clone();
        let (a, b) = (fresh(&first.a), fresh(&first.b));
        let Some(reset) = self.get_mut(&reset_id) else {
            return false;
        };
        if !reset.reserved {
            return false;
        }

        reset.reserved = false;
        reset.clear_result();
        reset.a = a;
        reset.b = b;
        info!("{winner_label} took the first grand final leg from the loser side, {reset_id} activated");
        true
    }
}

/// Same participant, without provenance
fn fresh(slot: &Slot) -> Slot {
    match slot.occupant() {
        Some(o) => Slot::Filled(Occupant {
            label: o.label.clone(),
            source: Source::Seed,
            origin: o.origin,
        }),
        None => Slot::Placeholder,
    }
}
