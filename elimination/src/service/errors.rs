//! Service error types.

use super::store::StoreError;
use crate::bracket::{BracketId, PropagationError, ValidationError};
use thiserror::Error;

/// Bracket service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Rejected participant list or parameters
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Result could not be applied
    #[error(transparent)]
    Propagation(#[from] PropagationError),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Concurrent writers kept winning the compare-and-swap
    #[error("Bracket {id} is busy: gave up after {attempts} attempts")]
    Conflict { id: BracketId, attempts: u32 },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ServiceError {
    /// Message suitable for an admin screen
    pub fn client_message(&self) -> String {
        match self {
            ServiceError::Propagation(err) => err.client_message(),
            // Don't expose record internals
            ServiceError::Store(StoreError::Record(_)) => "Stored bracket is unreadable".to_string(),
            ServiceError::Conflict { .. } => {
                "Bracket is being updated by someone else, try again".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
