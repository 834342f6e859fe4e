//! Subcommands operating on a bracket record file.

use anyhow::{Context, Result, bail};
use elimination::bracket::record::{decode, encode};
use elimination::service::{ServiceConfig, resolve_byes};
use elimination::standings::report;
use elimination::{
    ApplyOutcome, Bracket, Format, GenerationParams, MatchId, SeedingMethod, generate_with,
    pad_with_byes,
};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A reported score such as `3-1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub a: u32,
    pub b: u32,
}

/// Errors that can occur while parsing a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// No `-` between the two scores.
    MissingSeparator(String),
    /// One side is not a non-negative number.
    InvalidNumber(String),
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator(value) => {
                write!(f, "Invalid score '{value}'. Use A-B (e.g., '3-1')")
            }
            Self::InvalidNumber(value) => {
                write!(f, "Invalid score '{value}'. Scores must be non-negative numbers")
            }
        }
    }
}

impl std::error::Error for ScoreError {}

impl FromStr for Score {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once('-')
            .ok_or_else(|| ScoreError::MissingSeparator(s.to_string()))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| ScoreError::InvalidNumber(s.to_string()))
        };
        Ok(Self {
            a: parse(a)?,
            b: parse(b)?,
        })
    }
}

/// A parsed subcommand
#[derive(Debug)]
pub enum Command {
    Generate {
        format: Format,
        participants: PathBuf,
        out: PathBuf,
        seeding: SeedingMethod,
        grand_final_reset: bool,
        pad_byes: bool,
    },
    Report {
        bracket: PathBuf,
        match_id: MatchId,
        score: Score,
        force: bool,
    },
    Reset {
        bracket: PathBuf,
        match_id: MatchId,
    },
    Standings {
        bracket: PathBuf,
        json: bool,
        participant: Option<String>,
    },
    Simulate {
        bracket: PathBuf,
        seed: Option<u64>,
    },
}

/// Execute a subcommand
pub fn run(command: Command, config: &ServiceConfig) -> Result<()> {
    match command {
        Command::Generate {
            format,
            participants,
            out,
            seeding,
            grand_final_reset,
            pad_byes,
        } => {
            let mut labels = read_participants(&participants)?;
            if pad_byes {
                labels = pad_with_byes(labels);
            }
            let params = GenerationParams {
                seeding,
                grand_final_reset,
            };
            let mut bracket = generate_with(format, &labels, params)
                .with_context(|| format!("Cannot build a {format} bracket"))?;
            if config.auto_resolve_byes {
                resolve_byes(&mut bracket)?;
            }
            write_bracket(&out, &bracket)?;
            println!(
                "Created {} bracket {} with {} matches ({} byes)",
                format,
                bracket.id,
                bracket.match_count(),
                bracket.byes
            );
            print_ready(&bracket);
        }
        Command::Report {
            bracket: path,
            match_id,
            score,
            force,
        } => {
            let mut bracket = read_bracket(&path)?;
            let outcome = bracket
                .apply_result(&match_id, score.a, score.b, force)
                .map_err(|e| anyhow::anyhow!(e.client_message()))?;
            match outcome {
                ApplyOutcome::Idempotent => {
                    println!("{match_id} already recorded as {}-{}", score.a, score.b);
                    return Ok(());
                }
                ApplyOutcome::Applied {
                    cleared,
                    reset_activated,
                } => {
                    println!("Recorded {match_id}: {}-{}", score.a, score.b);
                    if !cleared.is_empty() {
                        println!("Cleared downstream: {}", join_ids(&cleared));
                    }
                    if reset_activated {
                        println!("Grand final reset is now live");
                    }
                }
            }
            if config.auto_resolve_byes {
                resolve_byes(&mut bracket)?;
            }
            write_bracket(&path, &bracket)?;
            print_ready(&bracket);
        }
        Command::Reset {
            bracket: path,
            match_id,
        } => {
            let mut bracket = read_bracket(&path)?;
            let cleared = bracket
                .reset_result(&match_id)
                .map_err(|e| anyhow::anyhow!(e.client_message()))?;
            write_bracket(&path, &bracket)?;
            println!("Reset {match_id}");
            if !cleared.is_empty() {
                println!("Cleared downstream: {}", join_ids(&cleared));
            }
        }
        Command::Standings {
            bracket: path,
            json,
            participant,
        } => {
            let bracket = read_bracket(&path)?;
            if let Some(label) = participant {
                return print_participant(&bracket, &label);
            }
            let report = report(&bracket);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("{:>3}  {:<24} {:>4} {:>4}", "#", "Participant", "W", "L");
            for s in &report.standings {
                println!(
                    "{:>3}  {:<24} {:>4} {:>4}",
                    s.placement, s.participant, s.wins, s.losses
                );
            }
            match report.champion {
                Some(champion) => println!("Champion: {champion}"),
                None => println!("In progress, {} match(es) ready", bracket.ready_matches().len()),
            }
        }
        Command::Simulate { bracket: path, seed } => {
            let mut bracket = read_bracket(&path)?;
            let seed = seed.unwrap_or_else(rand::random);
            let mut rng = StdRng::seed_from_u64(seed);
            info!("Simulating bracket {} with seed {}", bracket.id, seed);

            let played = simulate(&mut bracket, &mut rng, config.auto_resolve_byes)?;
            write_bracket(&path, &bracket)?;

            println!("Played {played} match(es) (seed {seed})");
            if let Some(champion) = elimination::champion(&bracket) {
                println!("Champion: {champion}");
            }
        }
    }

    Ok(())
}

/// Play every remaining match with random decisive scores
fn simulate(bracket: &mut Bracket, rng: &mut StdRng, auto_resolve_byes: bool) -> Result<usize> {
    let mut played = 0;
    loop {
        if auto_resolve_byes {
            resolve_byes(bracket)?;
        }
        let Some(next) = bracket.ready_matches().first().map(|m| m.id.clone()) else {
            return Ok(played);
        };

        let high = rng.random_range(1..=5u32);
        let low = rng.random_range(0..high);
        let (a, b) = if rng.random_bool(0.5) {
            (high, low)
        } else {
            (low, high)
        };
        bracket.apply_result(&next, a, b, false)?;
        played += 1;
    }
}

/// One label per line; blank lines and `#` comments are skipped
fn read_participants(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read participants from {}", path.display()))?;
    let labels: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    if labels.is_empty() {
        bail!("{} lists no participants", path.display());
    }
    Ok(labels)
}

fn read_bracket(path: &Path) -> Result<Bracket> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bracket from {}", path.display()))?;
    decode(&json).with_context(|| format!("{} is not a valid bracket record", path.display()))
}

fn write_bracket(path: &Path, bracket: &Bracket) -> Result<()> {
    let json = encode(bracket)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_ready(bracket: &Bracket) {
    for m in bracket.ready_matches() {
        println!(
            "  ready: {:<6} {} vs {}",
            m.id,
            m.a.label().unwrap_or_default(),
            m.b.label().unwrap_or_default()
        );
    }
}

/// Every match the participant has reached, with its state
fn print_participant(bracket: &Bracket, label: &str) -> Result<()> {
    let lines = participant_lines(bracket, label);
    if lines.is_empty() {
        bail!("{label} is not in bracket {}", bracket.id);
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn participant_lines(bracket: &Bracket, label: &str) -> Vec<String> {
    bracket
        .matches_for(label)
        .into_iter()
        .map(|m| {
            let opponent = if m.a.label() == Some(label) { &m.b } else { &m.a };
            let opponent = opponent.label().unwrap_or("TBD");
            let state = match (m.winner_label(), m.score_a, m.score_b) {
                (Some(winner), Some(a), Some(b)) if winner == label => format!("won {a}-{b}"),
                (Some(_), Some(a), Some(b)) => format!("lost {a}-{b}"),
                _ if m.is_ready() => "ready".to_string(),
                _ => "waiting".to_string(),
            };
            format!("{:<6} vs {:<24} {}", m.id, opponent, state)
        })
        .collect()
}

fn join_ids(ids: &[MatchId]) -> String {
    ids.iter()
        .map(MatchId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
