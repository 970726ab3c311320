//! Shared application state for the web server.

use std::sync::Arc;

use dermyx_common::{DermyxConfig, ScoringConfig};
use dermyx_db::{select_provider, CatalogProvider, DataMode};
use dermyx_engine::{ClassifierClient, DiagnosisService};

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub service: DiagnosisService,
    /// Fixed at startup
    pub mode: DataMode,
    /// `None` when no classifier URL is configured
    pub classifier: Option<Arc<ClassifierClient>>,
}

impl AppState {
    pub fn new(
        mode: DataMode,
        catalog: Arc<dyn CatalogProvider>,
        scoring: ScoringConfig,
        classifier: Option<ClassifierClient>,
    ) -> Self {
        Self {
            service: DiagnosisService::new(catalog, scoring),
            mode,
            classifier: classifier.map(Arc::new),
        }
    }

    /// Pick the catalog and classifier from configuration.
    pub fn from_config(config: &DermyxConfig) -> anyhow::Result<Self> {
        let (mode, catalog) = select_provider(&config.store)?;
        let classifier = ClassifierClient::from_config(&config.classifier)?;
        Ok(Self::new(mode, catalog, config.scoring.clone(), classifier))
    }
}

pub type SharedState = Arc<AppState>;
