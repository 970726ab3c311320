//! Catalog capability trait.
//!
//! The scoring engine only ever talks to a `CatalogProvider`. Two
//! implementations exist:
//! - `RemoteCatalog` (PostgREST endpoint of the relational store)
//! - `FallbackCatalog` (built-in demo dataset)
//!
//! Which one serves a process is decided once, by `select_provider`.

use std::sync::Arc;

use async_trait::async_trait;
use dermyx_common::entities::{Disease, Symptom, SymptomCategory, Treatment};
use dermyx_common::StoreConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::fallback::FallbackCatalog;
use crate::postgrest::RemoteCatalog;
use crate::schema::{AssociationData, DiseasePage, DiseaseQuery, StoreHealth};

/// Read-only access to the symptom / disease catalog.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// All associations whose symptom is in `symptom_ids`.
    ///
    /// An empty id list returns empty data without querying.
    async fn fetch_associations(&self, symptom_ids: &[String]) -> Result<AssociationData>;

    /// A single disease with its category, or `None`.
    async fn fetch_disease(&self, id: &str) -> Result<Option<Disease>>;

    /// Treatments for a disease, first-line treatments first.
    async fn fetch_treatments(&self, disease_id: &str) -> Result<Vec<Treatment>>;

    /// Symptoms, optionally restricted to one category.
    async fn fetch_symptoms(&self, category_id: Option<&str>) -> Result<Vec<Symptom>>;

    /// Symptom categories by display order.
    async fn fetch_symptom_categories(&self) -> Result<Vec<SymptomCategory>>;

    /// Substring search over diseases with offset pagination.
    async fn search_diseases(&self, query: &DiseaseQuery) -> Result<DiseasePage>;

    /// Connection and per-table status. Never fails; problems show up as
    /// unreachable tables.
    async fn health(&self) -> StoreHealth;
}

/// Which catalog serves this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataMode {
    /// Remote relational store
    Remote,
    /// Built-in fallback dataset; the store is not configured
    Demo,
}

impl DataMode {
    pub fn is_demo(&self) -> bool {
        matches!(self, DataMode::Demo)
    }
}

/// Choose the catalog once, from configuration.
///
/// A missing or implausible store configuration selects demo mode; it is
/// logged, not returned as an error. A configured store whose client cannot
/// be built (bad URL host) is an error.
pub fn select_provider(config: &StoreConfig) -> Result<(DataMode, Arc<dyn CatalogProvider>)> {
    if !config.is_configured() {
        warn!("Remote store URL or key is not set. Running in demo mode.");
        return Ok((DataMode::Demo, Arc::new(FallbackCatalog::new())));
    }

    let remote = RemoteCatalog::from_config(config)?;
    info!(base_url = %remote.base_url(), "Using remote catalog");
    Ok((DataMode::Remote, Arc::new(remote)))
}
