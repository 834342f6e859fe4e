//! Bracket manager: generation, result reporting and standings over a store.

use super::byes::resolve_byes;
use super::config::ServiceConfig;
use super::errors::{ServiceError, ServiceResult};
use super::store::{BracketStore, StoreError, Versioned};
use crate::bracket::{Bracket, BracketId, Format, MatchId, PropagationResult};
use crate::generator::generate_with;
use crate::propagation::ApplyOutcome;
use crate::standings::{StandingsReport, champion, report};
use log::{debug, info};
use std::sync::Arc;

/// Bracket manager
///
/// Every mutation is a load, apply, compare-and-swap save cycle. A save that
/// loses the race reloads and reapplies, up to `max_retries` attempts.
pub struct BracketManager<S: BracketStore> {
    store: Arc<S>,
    config: ServiceConfig,
}

impl<S: BracketStore> Clone for BracketManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config,
        }
    }
}

impl<S: BracketStore> BracketManager<S> {
    /// Create a new bracket manager
    pub fn new(store: Arc<S>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    /// Settings every new bracket is generated with
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Generate and store a new bracket
    ///
    /// # Arguments
    ///
    /// * `format` - Single or double elimination
    /// * `participants` - Labels in seed order
    ///
    /// # Returns
    ///
    /// * `ServiceResult<Bracket>` - The stored bracket, with bye matches
    ///   already resolved when `auto_resolve_byes` is set
    pub async fn create(&self, format: Format, participants: &[String]) -> ServiceResult<Bracket> {
        let mut bracket = generate_with(format, participants, self.config.generation_params())?;
        if self.config.auto_resolve_byes {
            resolve_byes(&mut bracket)?;
        }
        self.store.insert(&bracket).await?;

        info!("Created {} bracket {}", format, bracket.id);
        Ok(bracket)
    }

    /// Get a bracket snapshot
    pub async fn get(&self, id: BracketId) -> ServiceResult<Bracket> {
        Ok(self.store.load(id).await?.value)
    }

    /// IDs of all stored brackets
    pub async fn list(&self) -> ServiceResult<Vec<BracketId>> {
        Ok(self.store.list().await?)
    }

    /// Record a match result
    ///
    /// A repeated identical report is not saved again.
    pub async fn report_result(
        &self,
        id: BracketId,
        match_id: &MatchId,
        score_a: u32,
        score_b: u32,
        force: bool,
    ) -> ServiceResult<ApplyOutcome> {
        let auto_resolve_byes = self.config.auto_resolve_byes;

        self.update(id, |bracket| {
            let outcome = bracket.apply_result(match_id, score_a, score_b, force)?;
            if outcome.is_idempotent() {
                return Ok((outcome, false));
            }
            if auto_resolve_byes {
                resolve_byes(bracket)?;
            }
            Ok((outcome, true))
        })
        .await
    }

    /// Withdraw a match result and everything it propagated
    pub async fn reset_result(&self, id: BracketId, match_id: &MatchId) -> ServiceResult<Vec<MatchId>> {
        self.update(id, |bracket| {
            let was_finished = bracket.get(match_id).is_some_and(|m| m.finished);
            let cleared = bracket.reset_result(match_id)?;
            Ok((cleared, was_finished))
        })
        .await
    }

    /// Standings snapshot
    pub async fn standings(&self, id: BracketId) -> ServiceResult<StandingsReport> {
        let bracket = self.get(id).await?;
        Ok(report(&bracket))
    }

    /// Read-modify-write with compare-and-swap retry
    ///
    /// `mutate` returns its output and whether the bracket changed; an
    /// unchanged bracket is not saved.
    async fn update<T, F>(&self, id: BracketId, mut mutate: F) -> ServiceResult<T>
    where
        F: FnMut(&mut Bracket) -> PropagationResult<(T, bool)>,
    {
        for attempt in 1..=self.config.max_retries {
            let Versioned {
                value: mut bracket,
                version,
            } = self.store.load(id).await?;

            let (output, changed) = mutate(&mut bracket)?;
            if !changed {
                return Ok(output);
            }

            match self.store.save(&bracket, version).await {
                Ok(new_version) => {
                    debug!("Saved bracket {id} at version {new_version}");
                    if let Some(winner) = champion(&bracket) {
                        info!("Bracket {id} is complete, champion: {winner}");
                    }
                    return Ok(output);
                }
                Err(StoreError::VersionConflict { .. }) => {
                    debug!(
                        "Bracket {id} changed during update (attempt {attempt}/{}), retrying",
                        self.config.max_retries
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ServiceError::Conflict {
            id,
            attempts: self.config.max_retries,
        })
    }
}
