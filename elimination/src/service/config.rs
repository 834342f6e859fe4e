//! Bracket service configuration.

use super::errors::ServiceError;
use crate::bracket::{GenerationParams, SeedingMethod};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Bracket service configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Attempts at a read-modify-write before giving up on a busy bracket
    pub max_retries: u32,

    /// Play out bye-sentinel matches automatically
    pub auto_resolve_byes: bool,

    /// Create the grand final reset leg in double elimination
    pub grand_final_reset: bool,

    /// Seeding method for new brackets
    pub seeding: SeedingMethod,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            auto_resolve_byes: true,
            grand_final_reset: true,
            seeding: SeedingMethod::Standard,
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `BRACKET_MAX_RETRIES`: Compare-and-swap attempts (default: 3)
    /// - `BRACKET_AUTO_BYES`: Resolve bye matches automatically (default: true)
    /// - `BRACKET_GRAND_FINAL_RESET`: Create the reset leg (default: true)
    /// - `BRACKET_SEEDING`: `standard` or `as-listed` (default: standard)
    ///
    /// # Returns
    ///
    /// * `Result<ServiceConfig, ServiceError>` - Configuration, or
    ///   `ServiceError::Config` naming the offending variable
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServiceError> {
        let defaults = Self::default();
        let config = Self {
            max_retries: parse_var(&lookup, "BRACKET_MAX_RETRIES", defaults.max_retries)?,
            auto_resolve_byes: parse_var(&lookup, "BRACKET_AUTO_BYES", defaults.auto_resolve_byes)?,
            grand_final_reset: parse_var(
                &lookup,
                "BRACKET_GRAND_FINAL_RESET",
                defaults.grand_final_reset,
            )?,
            seeding: parse_var(&lookup, "BRACKET_SEEDING", defaults.seeding)?,
        };
        config.validate().map_err(ServiceError::Config)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 || self.max_retries > 100 {
            return Err("Max retries must be between 1 and 100".to_string());
        }

        Ok(())
    }

    /// Parameters handed to the generator
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            seeding: self.seeding,
            grand_final_reset: self.grand_final_reset,
        }
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ServiceError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ServiceError::Config(format!("{name} is invalid: {e}"))),
        None => Ok(default),
    }
}
