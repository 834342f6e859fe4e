//! Service layer over the bracket engine.
//!
//! This module provides what a tournament backend needs around the core:
//! - Versioned bracket storage with compare-and-swap saves
//! - A manager that serializes result reporting per bracket
//! - Automatic resolution of bye-sentinel matches
//! - Configuration from environment variables
//!
//! ## Example
//!
//! ```no_run
//! use elimination::Format;
//! use elimination::service::{BracketManager, MemoryBracketStore, ServiceConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = BracketManager::new(
//!         Arc::new(MemoryBracketStore::new()),
//!         ServiceConfig::from_env()?,
//!     );
//!
//!     let teams: Vec<String> = (1..=8).map(|i| format!("Team {i}")).collect();
//!     let bracket = manager.create(Format::DoubleElim, &teams).await?;
//!
//!     let first = bracket.ready_matches()[0].id.clone();
//!     manager.report_result(bracket.id, &first, 2, 1, false).await?;
//!
//!     let report = manager.standings(bracket.id).await?;
//!     println!("Leader: {}", report.standings[0].participant);
//!
//!     Ok(())
//! }
//! ```

pub mod byes;
pub mod config;
pub mod errors;
pub mod manager;
pub mod store;

pub use byes::resolve_byes;
pub use config::ServiceConfig;
pub use errors::{ServiceError, ServiceResult};
pub use manager::BracketManager;
pub use store::{BracketStore, MemoryBracketStore, StoreError, Version, Versioned};
