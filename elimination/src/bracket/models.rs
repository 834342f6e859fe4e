//! Match graph data model: opponent slots, matches and the bracket arena.

use super::errors::{RecordError, ValidationError};
use super::record::BracketRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Label used for padding participants in double elimination
pub const BYE_LABEL: &str = "BYE";

/// Bracket ID type
pub type BracketId = Uuid;

/// Stable match identifier, unique within its bracket
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Positional id, e.g. `R2-1` (single elimination), `W2-1` or `L3-2`
    pub(crate) fn positional(format: Format, segment: Segment, round: u32, number: u32) -> Self {
        let prefix = match (format, segment) {
            (Format::SingleElim, _) => "R",
            (Format::DoubleElim, Segment::Winner) => "W",
            (Format::DoubleElim, Segment::Loser) => "L",
            (Format::DoubleElim, Segment::Final) => "GF",
        };
        if segment == Segment::Final {
            Self(format!("{prefix}{round}"))
        } else {
            Self(format!("{prefix}{round}-{number}"))
        }
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MatchId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Bracket format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    SingleElim,
    DoubleElim,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::SingleElim => write!(f, "single_elim"),
            Format::DoubleElim => write!(f, "double_elim"),
        }
    }
}

impl FromStr for Format {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single_elim" | "single" | "se" => Ok(Format::SingleElim),
            "double_elim" | "double" | "de" => Ok(Format::DoubleElim),
            other => Err(ValidationError::UnknownFormat(other.to_string())),
        }
    }
}

/// How seed-ordered labels are laid onto round-1 lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMethod {
    /// Classic bracket lines: 1 v N, with top seeds kept apart until late rounds
    #[default]
    Standard,
    /// Adjacent pairs in list order: 1 v 2, 3 v 4, ...
    AsListed,
}

impl fmt::Display for SeedingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedingMethod::Standard => write!(f, "standard"),
            SeedingMethod::AsListed => write!(f, "as_listed"),
        }
    }
}

impl FromStr for SeedingMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(SeedingMethod::Standard),
            "as_listed" | "as-listed" | "listed" => Ok(SeedingMethod::AsListed),
            other => Err(ValidationError::UnknownSeeding(other.to_string())),
        }
    }
}

/// Part of the bracket a match belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Winner,
    Loser,
    Final,
}

/// One of a match's two opponent positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Side of a double elimination bracket an occupant arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Winner,
    Loser,
}

/// Provenance of a filled slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Initial seed, or a fresh placement such as an activated reset leg
    Seed,
    /// Advanced without playing because the field is not a power of two
    Bye,
    /// Written by this match's propagation step
    Match(MatchId),
}

/// Participant occupying a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub label: String,
    pub source: Source,
    pub origin: Origin,
}

impl Occupant {
    pub fn seed(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: Source::Seed,
            origin: Origin::Winner,
        }
    }
}

/// Opponent slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    #[default]
    Placeholder,
    Filled(Occupant),
}

impl Slot {
    pub fn seeded(label: impl Into<String>) -> Self {
        Slot::Filled(Occupant::seed(label))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Slot::Placeholder => true,
            Slot::Filled(occupant) => occupant.label.is_empty(),
        }
    }

    pub fn occupant(&self) -> Option<&Occupant> {
        match self {
            Slot::Filled(occupant) if !occupant.label.is_empty() => Some(occupant),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.occupant().map(|o| o.label.as_str())
    }

    /// Match that wrote this slot, if any
    pub fn propagated_from(&self) -> Option<&MatchId> {
        match self.occupant().map(|o| &o.source) {
            Some(Source::Match(id)) => Some(id),
            _ => None,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.label() == Some(BYE_LABEL)
    }
}

/// Which slot of the target match an edge writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSlot {
    /// First empty slot at propagation time
    Any,
    /// Structurally fixed slot
    Fixed(Side),
}

/// Outgoing edge of a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub match_id: MatchId,
    pub slot: TargetSlot,
}

impl Target {
    pub fn fixed(match_id: MatchId, side: Side) -> Self {
        Self {
            match_id,
            slot: TargetSlot::Fixed(side),
        }
    }

    pub fn any(match_id: MatchId) -> Self {
        Self {
            match_id,
            slot: TargetSlot::Any,
        }
    }
}

/// A single contest between two slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub segment: Segment,
    /// Round number (1-indexed within the segment)
    pub round: u32,
    /// Position within the round (1-indexed)
    pub match_number: u32,
    #[serde(rename = "opponentA")]
    pub a: Slot,
    #[serde(rename = "opponentB")]
    pub b: Slot,
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    pub winner: Option<Side>,
    pub finished: bool,
    pub winner_target: Option<Target>,
    pub loser_target: Option<Target>,
    /// Inactive grand final reset leg
    #[serde(default)]
    pub reserved: bool,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Match {
    pub fn new(id: MatchId, segment: Segment, round: u32, match_number: u32) -> Self {
        Self {
            id,
            segment,
            round,
            match_number,
            a: Slot::Placeholder,
            b: Slot::Placeholder,
            score_a: None,
            score_b: None,
            winner: None,
            finished: false,
            winner_target: None,
            loser_target: None,
            reserved: false,
            metadata: BTreeMap::new(),
        }
    }

    pub fn slot(&self, side: Side) -> &Slot {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut Slot {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }

    /// Both opponents known, not yet played and not reserved
    pub fn is_ready(&self) -> bool {
        !self.reserved && !self.finished && !self.a.is_empty() && !self.b.is_empty()
    }

    pub fn has_bye(&self) -> bool {
        self.a.is_bye() || self.b.is_bye()
    }

    /// Counts towards records and completion
    pub fn is_real(&self) -> bool {
        !self.reserved && !self.has_bye()
    }

    pub fn winner_occupant(&self) -> Option<&Occupant> {
        self.winner.and_then(|side| self.slot(side).occupant())
    }

    pub fn loser_occupant(&self) -> Option<&Occupant> {
        self.winner
            .and_then(|side| self.slot(side.opposite()).occupant())
    }

    pub fn winner_label(&self) -> Option<&str> {
        self.winner_occupant().map(|o| o.label.as_str())
    }

    pub fn loser_label(&self) -> Option<&str> {
        self.loser_occupant().map(|o| o.label.as_str())
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.winner_target.iter().chain(self.loser_target.iter())
    }

    pub(crate) fn clear_result(&mut self) {
        self.score_a = None;
        self.score_b = None;
        self.winner = None;
        self.finished = false;
    }
}

/// Generation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub seeding: SeedingMethod,
    /// Create the reserved grand final reset leg (double elimination)
    pub grand_final_reset: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seeding: SeedingMethod::Standard,
            grand_final_reset: true,
        }
    }
}

/// Grand final legs of a double elimination bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrandFinal {
    pub first_leg: MatchId,
    pub reset_leg: Option<MatchId>,
}

/// The full match graph for one tournament
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "BracketRecord", into = "BracketRecord")]
pub struct Bracket {
    pub id: BracketId,
    pub format: Format,
    /// Seed-ordered labels, including bye padding
    pub participants: Vec<String>,
    pub params: GenerationParams,
    /// Byes granted by the generator
    pub byes: usize,
    pub grand_final: Option<GrandFinal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub(crate) matches: Vec<Match>,
    pub(crate) index: HashMap<MatchId, usize>,
}

impl Bracket {
    /// Assemble a bracket from already-built matches
    ///
    /// Rejects duplicate match ids and edges that point outside the bracket.
    pub fn from_matches(
        format: Format,
        participants: Vec<String>,
        params: GenerationParams,
        matches: Vec<Match>,
        grand_final: Option<GrandFinal>,
    ) -> Result<Self, RecordError> {
        let mut bracket = Self::assemble(format, participants, params, 0, matches, grand_final);
        bracket.reindex()?;
        Ok(bracket)
    }

    /// Build without validation; the generator's graphs are consistent by construction
    pub(crate) fn assemble(
        format: Format,
        participants: Vec<String>,
        params: GenerationParams,
        byes: usize,
        matches: Vec<Match>,
        grand_final: Option<GrandFinal>,
    ) -> Self {
        let now = Utc::now();
        let index = matches
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        Self {
            id: Uuid::new_v4(),
            format,
            participants,
            params,
            byes,
            grand_final,
            created_at: now,
            updated_at: now,
            matches,
            index,
        }
    }

    pub(crate) fn reindex(&mut self) -> Result<(), RecordError> {
        let mut index = HashMap::with_capacity(self.matches.len());
        for (i, m) in self.matches.iter().enumerate() {
            if index.insert(m.id.clone(), i).is_some() {
                return Err(RecordError::DuplicateMatch(m.id.clone()));
            }
        }

        for m in &self.matches {
            for target in m.targets() {
                if !index.contains_key(&target.match_id) {
                    return Err(RecordError::DanglingEdge {
                        from: m.id.clone(),
                        to: target.match_id.clone(),
                    });
                }
            }
        }

        if let Some(gf) = &self.grand_final {
            for leg in std::iter::once(&gf.first_leg).chain(gf.reset_leg.iter()) {
                if !index.contains_key(leg) {
                    return Err(RecordError::UnknownGrandFinal(leg.clone()));
                }
            }
        }

        self.index = index;
        Ok(())
    }

    pub fn get(&self, id: &MatchId) -> Option<&Match> {
        self.index.get(id).map(|&i| &self.matches[i])
    }

    pub(crate) fn get_mut(&mut self, id: &MatchId) -> Option<&mut Match> {
        self.index.get(id).map(|&i| &mut self.matches[i])
    }

    /// All matches in generation order
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Matches of one round, ordered by match number
    pub fn round(&self, segment: Segment, round: u32) -> Vec<&Match> {
        let mut matches: Vec<&Match> = self
            .matches
            .iter()
            .filter(|m| m.segment == segment && m.round == round)
            .collect();
        matches.sort_by_key(|m| m.match_number);
        matches
    }

    /// Number of rounds in a segment
    pub fn rounds(&self, segment: Segment) -> u32 {
        self.matches
            .iter()
            .filter(|m| m.segment == segment)
            .map(|m| m.round)
            .max()
            .unwrap_or(0)
    }

    /// Matches waiting only for a result
    pub fn ready_matches(&self) -> Vec<&Match> {
        self.matches.iter().filter(|m| m.is_ready()).collect()
    }

    /// Matches a participant currently occupies a slot in
    pub fn matches_for(&self, label: &str) -> Vec<&Match> {
        self.matches
            .iter()
            .filter(|m| m.a.label() == Some(label) || m.b.label() == Some(label))
            .collect()
    }
}
