//! Bracket error types.

use super::models::{Format, MatchId, SeedingMethod, Side};
use thiserror::Error;

/// Rejected input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Fewer than two participants
    #[error("At least 2 participants are required, got {0}")]
    TooFewParticipants(usize),

    /// Blank label at the given seed (1-indexed)
    #[error("Participant at seed {0} has an empty label")]
    EmptyLabel(usize),

    /// The same label appears twice
    #[error("Duplicate participant label: {0}")]
    DuplicateLabel(String),

    /// Format cannot take this many participants
    #[error("{format} requires a power-of-two participant count, got {count}")]
    UnsupportedParticipantCount { format: Format, count: usize },

    /// Seeding method cannot lay out this many participants
    #[error("Seeding method {seeding} cannot place {count} participants")]
    UnsupportedSeeding {
        seeding: SeedingMethod,
        count: usize,
    },

    /// Equal scores
    #[error("Draws are not allowed: {score_a}-{score_b}")]
    Draw { score_a: u32, score_b: u32 },

    /// At least one opponent is still unknown
    #[error("Match {0} is waiting for opponents")]
    MatchNotReady(MatchId),

    /// Grand final reset leg that has not been activated
    #[error("Match {0} is a reserved reset leg")]
    MatchReserved(MatchId),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Unknown seeding method: {0}")]
    UnknownSeeding(String),
}

/// Result propagation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropagationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unknown match id
    #[error("Match not found: {0}")]
    NotFound(MatchId),

    /// The edge graph loops back to the reported match
    #[error("Cycle detected through match {0}")]
    Cycle(MatchId),

    /// Target slot already holds another participant
    #[error(
        "Slot conflict: {match_id} cannot place {incoming} into slot {slot} of {target}, held by {existing}"
    )]
    SlotConflict {
        match_id: MatchId,
        target: MatchId,
        slot: Side,
        existing: String,
        incoming: String,
    },
}

impl PropagationError {
    /// Message suitable for an admin screen
    pub fn client_message(&self) -> String {
        match self {
            PropagationError::SlotConflict {
                match_id,
                target,
                slot,
                existing,
                incoming,
            } => format!(
                "Cannot advance {incoming} from {match_id}: slot {slot} of {target} already holds {existing}. Report again with force to overwrite."
            ),
            PropagationError::Cycle(id) => {
                format!("Bracket is malformed: match {id} feeds back into itself")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for propagation operations
pub type PropagationResult<T> = Result<T, PropagationError>;

/// Persisted record errors
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Unsupported schema version {found}, expected {expected}")]
    SchemaVersion { found: u32, expected: u32 },

    #[error("Duplicate match id: {0}")]
    DuplicateMatch(MatchId),

    #[error("Match {from} points to unknown match {to}")]
    DanglingEdge { from: MatchId, to: MatchId },

    #[error("Grand final refers to unknown match {0}")]
    UnknownGrandFinal(MatchId),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
