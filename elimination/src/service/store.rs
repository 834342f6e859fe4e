//! Bracket storage abstraction.
//!
//! A bracket is persisted as one opaque record. Writers must hold the version
//! they loaded; `save` is a compare-and-swap on that version, so concurrent
//! read-modify-write cycles against the same bracket cannot interleave.

use crate::bracket::record::{decode, encode};
use crate::bracket::{Bracket, BracketId, RecordError};
use async_trait::async_trait;
use log::warn;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Record version, bumped on every successful save
pub type Version = u64;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Bracket not found: {0}")]
    NotFound(BracketId),

    #[error("Bracket already exists: {0}")]
    AlreadyExists(BracketId),

    /// Another writer saved first
    #[error("Version conflict on bracket {id}: expected {expected}, found {actual}")]
    VersionConflict {
        id: BracketId,
        expected: Version,
        actual: Version,
    },

    #[error("Record error: {0}")]
    Record(#[from] RecordError),
}

/// A value together with the version it was read at
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub version: Version,
}

/// Trait for bracket persistence
#[async_trait]
pub trait BracketStore: Send + Sync {
    /// Store a new bracket, returning its initial version
    async fn insert(&self, bracket: &Bracket) -> Result<Version, StoreError>;

    /// Load a bracket with its current version
    async fn load(&self, id: BracketId) -> Result<Versioned<Bracket>, StoreError>;

    /// Replace a bracket if it is still at `expected_version`
    async fn save(&self, bracket: &Bracket, expected_version: Version)
    -> Result<Version, StoreError>;

    /// IDs of all stored brackets
    async fn list(&self) -> Result<Vec<BracketId>, StoreError>;
}

/// In-memory store keeping each bracket as its JSON record
#[derive(Debug, Clone, Default)]
pub struct MemoryBracketStore {
    records: Arc<RwLock<HashMap<BracketId, Versioned<String>>>>,
}

impl MemoryBracketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BracketStore for MemoryBracketStore {
    async fn insert(&self, bracket: &Bracket) -> Result<Version, StoreError> {
        let json = encode(bracket)?;
        let mut records = self.records.write().await;
        if records.contains_key(&bracket.id) {
            return Err(StoreError::AlreadyExists(bracket.id));
        }
        records.insert(
            bracket.id,
            Versioned {
                value: json,
                version: 1,
            },
        );
        Ok(1)
    }

    async fn load(&self, id: BracketId) -> Result<Versioned<Bracket>, StoreError> {
        let records = self.records.read().await;
        let record = records.get(&id).ok_or(StoreError::NotFound(id))?;
        Ok(Versioned {
            value: decode(&record.value)?,
            version: record.version,
        })
    }

    async fn save(
        &self,
        bracket: &Bracket,
        expected_version: Version,
    ) -> Result<Version, StoreError> {
        let json = encode(bracket)?;
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&bracket.id)
            .ok_or(StoreError::NotFound(bracket.id))?;

        if record.version != expected_version {
            warn!(
                "Rejected stale save of bracket {}: expected version {}, found {}",
                bracket.id, expected_version, record.version
            );
            return Err(StoreError::VersionConflict {
                id: bracket.id,
                expected: expected_version,
                actual: record.version,
            });
        }

        record.value = json;
        record.version += 1;
        Ok(record.version)
    }

    async fn list(&self) -> Result<Vec<BracketId>, StoreError> {
        let records = self.records.read().await;
        Ok(records.keys().copied().collect())
    }
}
