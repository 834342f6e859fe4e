//! Match graph model shared by the generator, propagator and standings.
//!
//! A [`Bracket`] owns an arena of [`Match`]es keyed by [`MatchId`]. Edges
//! (`winner_target`, `loser_target`) and slot provenance are ids rather than
//! references, so the graph serializes directly into a [`record`].

pub mod errors;
pub mod models;
pub mod record;

pub use errors::{PropagationError, PropagationResult, RecordError, ValidationError};
pub use models::{
    BYE_LABEL, Bracket, BracketId, Format, GenerationParams, GrandFinal, Match, MatchId,
    Occupant, Origin, SeedingMethod, Segment, Side, Slot, Source, Target, TargetSlot,
};
pub use record::{BracketRecord, SCHEMA_VERSION};
