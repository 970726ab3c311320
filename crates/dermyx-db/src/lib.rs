//! Dermyx data access layer.
//!
//! This crate answers catalog questions (symptoms, diseases, associations,
//! treatments) from one of two sources behind the `CatalogProvider` trait:
//!
//! - `RemoteCatalog`: the relational store's PostgREST endpoint
//! - `FallbackCatalog`: a built-in demo dataset
//!
//! # Example
//!
//! ```rust,no_run
//! use dermyx_common::StoreConfig;
//! use dermyx_db::{select_provider, CatalogProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (mode, catalog) = select_provider(&StoreConfig::default())?;
//!     let rows = catalog.fetch_associations(&["sym_001".to_string()]).await?;
//!     println!("{mode:?}: {} association rows", rows.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod fallback;
pub mod postgrest;
pub mod provider;
pub mod schema;

pub use error::{DbError, Result};
pub use fallback::FallbackCatalog;
pub use postgrest::RemoteCatalog;
pub use provider::{select_provider, CatalogProvider, DataMode};
pub use schema::{
    AssociationData, AssociationRow, DiseasePage, DiseaseQuery, LinkedRow, StoreHealth,
    TableStatus, MAX_PAGE_SIZE,
};
