//! Command-line front end for the elimination bracket engine.
//!
//! Brackets live in JSON record files; every mutating command reads the file,
//! applies the change and writes it back.

mod commands;

use anyhow::{Error, bail};
use commands::{Command, Score};
use elimination::service::ServiceConfig;
use elimination::{Format, MatchId, SeedingMethod};
use log::warn;
use pico_args::Arguments;
use std::path::PathBuf;

const HELP: &str = "\
Build and run single or double elimination brackets

USAGE:
  elim_cli <COMMAND> [OPTIONS]

COMMANDS:
  generate    --format single|double --participants FILE --out FILE
              [--seeding standard|as-listed] [--no-reset] [--pad-byes]
  report      --bracket FILE --match ID --score A-B [--force]
  reset       --bracket FILE --match ID
  standings   --bracket FILE [--json] [--participant NAME]
  simulate    --bracket FILE [--seed N]

FLAGS:
  -h, --help  Print help information

ENVIRONMENT:
  BRACKET_AUTO_BYES          Resolve bye matches automatically  [default: true]
  BRACKET_GRAND_FINAL_RESET  Create the grand final reset leg   [default: true]
  BRACKET_SEEDING            Default seeding method             [default: standard]
  RUST_LOG                   Log filter (e.g., elimination=debug)
  (A .env file in the working directory is loaded first)
";

fn main() -> Result<(), Error> {
    // Optional; settings fall back to the process environment
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Checked before the subcommand so `--help` never trips a missing option
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    env_logger::builder().format_target(false).init();

    let config = ServiceConfig::from_env()?;
    let command = parse_command(&mut pargs, &config)?;

    let unused = pargs.finish();
    if !unused.is_empty() {
        warn!("Ignoring unused arguments: {unused:?}");
    }

    commands::run(command, &config)
}

fn parse_command(pargs: &mut Arguments, config: &ServiceConfig) -> Result<Command, Error> {
    let command = match pargs.subcommand()?.as_deref() {
        Some("generate") => Command::Generate {
            format: pargs.value_from_str::<_, Format>("--format")?,
            participants: pargs.value_from_str::<_, PathBuf>("--participants")?,
            out: pargs.value_from_str::<_, PathBuf>("--out")?,
            seeding: pargs
                .opt_value_from_str::<_, SeedingMethod>("--seeding")?
                .unwrap_or(config.seeding),
            grand_final_reset: config.grand_final_reset && !pargs.contains("--no-reset"),
            pad_byes: pargs.contains("--pad-byes"),
        },
        Some("report") => Command::Report {
            bracket: pargs.value_from_str("--bracket")?,
            match_id: MatchId::new(pargs.value_from_str::<_, String>("--match")?),
            score: pargs.value_from_str::<_, Score>("--score")?,
            force: pargs.contains("--force"),
        },
        Some("reset") => Command::Reset {
            bracket: pargs.value_from_str("--bracket")?,
            match_id: MatchId::new(pargs.value_from_str::<_, String>("--match")?),
        },
        Some("standings") => Command::Standings {
            bracket: pargs.value_from_str("--bracket")?,
            json: pargs.contains("--json"),
            participant: pargs.opt_value_from_str("--participant")?,
        },
        Some("simulate") => Command::Simulate {
            bracket: pargs.value_from_str("--bracket")?,
            seed: pargs.opt_value_from_str("--seed")?,
        },
        Some(other) => bail!("Unknown command '{other}'. Run with --help to see available commands"),
        None => {
            print!("{HELP}");
            std::process::exit(1);
        }
    };

    Ok(command)
}
