//! # Elimination
//!
//! A single and double elimination bracket engine.
//!
//! A bracket is a directed acyclic graph of matches. Each match has two
//! opponent slots and up to two outgoing edges: where its winner goes and, in
//! double elimination, where its loser drops. The engine builds that graph
//! once, then mutates it one reported result at a time.
//!
//! ## Components
//!
//! - **Skeleton generator** ([`generator`]): builds every match for a format and
//!   a seed-ordered participant list, with byes for non-power-of-two fields
//! - **Result propagator** ([`propagation`]): records a result, advances the
//!   winner and loser, and clears downstream slots when a result is overturned
//! - **Standings calculator** ([`standings`]): win/loss records, placements,
//!   completion and champion
//! - **Service layer** ([`service`]): versioned storage, compare-and-swap
//!   reporting and bye resolution
//!
//! ## Example
//!
//! ```
//! use elimination::{Format, MatchId, compute_standings, generate};
//!
//! let teams: Vec<String> = ["Alpha", "Bravo", "Charlie", "Delta"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//!
//! let mut bracket = generate(Format::SingleElim, &teams).unwrap();
//! bracket.apply_result(&MatchId::from("R1-1"), 2, 0, false).unwrap();
//! bracket.apply_result(&MatchId::from("R1-2"), 1, 2, false).unwrap();
//!
//! let final_match = bracket.get(&MatchId::from("R2-1")).unwrap();
//! assert_eq!(final_match.a.label(), Some("Alpha"));
//! assert_eq!(final_match.b.label(), Some("Charlie"));
//!
//! let standings = compute_standings(&bracket);
//! assert_eq!(standings[0].participant, "Alpha");
//! ```

/// Match graph model, errors and persisted record.
pub mod bracket;
pub use bracket::{
    BYE_LABEL, Bracket, BracketId, Format, GenerationParams, GrandFinal, Match, MatchId,
    Occupant, Origin, PropagationError, PropagationResult, RecordError, SeedingMethod, Segment,
    Side, Slot, Source, Target, TargetSlot, ValidationError,
};

/// Skeleton generator.
pub mod generator;
pub use generator::{generate, generate_with, pad_with_byes};

/// Result propagator.
pub mod propagation;
pub use propagation::ApplyOutcome;

/// Standings calculator.
pub mod standings;
pub use standings::{Standing, StandingsReport, champion, compute_standings, is_complete};

/// Storage, manager and configuration.
pub mod service;
