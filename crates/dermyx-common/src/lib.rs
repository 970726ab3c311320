//! dermyx-common: Shared entities, errors, configuration and the scoped HTTP
//! client used across all Dermyx crates.

pub mod error;
pub mod entities;
pub mod config;
pub mod http;

// Re-export commonly used types
pub use config::{DermyxConfig, StoreConfig, ScoringConfig, ClassifierConfig, ServerConfig, TieBreak};
pub use error::{DermyxError, Result};
