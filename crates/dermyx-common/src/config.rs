//! Runtime configuration for Dermyx.
//!
//! Read from `dermyx.toml` in the working directory, or the path in the
//! `DERMYX_CONFIG` env var. Every section is optional; environment variables
//! override the remote-store and classifier endpoints so secrets never have to
//! live in the file.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::error::{DermyxError, Result};

pub const CONFIG_PATH_ENV: &str = "DERMYX_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "dermyx.toml";

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DermyxConfig {
    /// Remote relational store (PostgREST endpoint)
    #[serde(default)]
    pub store: StoreConfig,

    /// Confidence calibration
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// External image classifier
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// HTTP API
    #[serde(default)]
    pub server: ServerConfig,
}

// ── Remote store ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the project, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: Option<String>,

    /// Anonymous API key. Never serialised back out.
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,

    /// Bounded timeout for a single request; there is no retry.
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

fn default_store_timeout() -> u64 { 10 }

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_secs: default_store_timeout(),
        }
    }
}

impl Clone for StoreConfig {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            api_key: self
                .api_key
                .as_ref()
                .map(|k| SecretString::from(k.expose_secret().to_owned())),
            timeout_secs: self.timeout_secs,
        }
    }
}

impl StoreConfig {
    /// Whether connection parameters are present and plausible.
    ///
    /// An unconfigured store is not an error: callers switch to the local
    /// fallback catalog instead.
    pub fn is_configured(&self) -> bool {
        let Some(url) = self.url.as_deref().map(str::trim) else { return false };
        let Some(key) = self.api_key.as_ref().map(|k| k.expose_secret().trim()) else { return false };

        if url.is_empty() || key.is_empty() || url == "undefined" || key == "undefined" {
            return false;
        }
        if key == "placeholder-key" {
            return false;
        }
        matches!(
            url::Url::parse(url).map(|u| u.scheme().to_string()).as_deref(),
            Ok("http") | Ok("https")
        )
    }
}

// ── Scoring ──────────────────────────────────────────────────────────────────

/// Ordering applied among candidates with equal confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the order in which diseases were first seen while grouping.
    #[default]
    Stable,
    /// Ascending disease id, independent of store row order.
    DiseaseId,
}

/// Calibration constants of the weighted confidence formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Maps the raw weighted sum into the 0–100 range. Calibrated against the
    /// reference symptom weights; must be re-tuned if that scale changes.
    #[serde(default = "default_confidence_scale")]
    pub confidence_scale: f64,

    /// Per-row multiplier for diagnostic associations
    #[serde(default = "default_diagnostic_row_bonus")]
    pub diagnostic_row_bonus: f64,

    /// Per-disease multiplier when at least one matched row is diagnostic
    #[serde(default = "default_diagnostic_disease_bonus")]
    pub diagnostic_disease_bonus: f64,

    /// Per-disease multiplier for common conditions
    #[serde(default = "default_common_bonus")]
    pub common_bonus: f64,

    #[serde(default)]
    pub tie_break: TieBreak,
}

fn default_confidence_scale() -> f64 { 10.0 }
fn default_diagnostic_row_bonus() -> f64 { 1.5 }
fn default_diagnostic_disease_bonus() -> f64 { 1.3 }
fn default_common_bonus() -> f64 { 1.1 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            confidence_scale: default_confidence_scale(),
            diagnostic_row_bonus: default_diagnostic_row_bonus(),
            diagnostic_disease_bonus: default_diagnostic_disease_bonus(),
            common_bonus: default_common_bonus(),
            tie_break: TieBreak::default(),
        }
    }
}

impl ScoringConfig {
    /// All constants must be finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("confidence_scale", self.confidence_scale),
            ("diagnostic_row_bonus", self.diagnostic_row_bonus),
            ("diagnostic_disease_bonus", self.diagnostic_disease_bonus),
            ("common_bonus", self.common_bonus),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(DermyxError::Config(format!(
                    "scoring.{name} must be a positive finite number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ── Image classifier ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Base URL of the classifier service, e.g. `http://127.0.0.1:5000`
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,

    /// Largest decoded image accepted before upload
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

fn default_classifier_timeout() -> u64 { 30 }
fn default_max_image_bytes() -> usize { 5 * 1024 * 1024 }

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_classifier_timeout(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

// ── HTTP API ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "127.0.0.1:3001".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl DermyxConfig {
    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| DermyxError::Config(format!("invalid TOML: {e}")))?;
        config.scoring.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Resolve the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = if Path::new(&path).exists() {
            tracing::info!(path = %path, "Loading configuration file");
            Self::from_file(&path)?
        } else {
            tracing::debug!(path = %path, "No configuration file, using defaults");
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `SUPABASE_URL`, `SUPABASE_KEY`, `DERMYX_CLASSIFIER_URL` and
    /// `DERMYX_BIND`. Takes a lookup function so tests need not touch the
    /// process environment.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SUPABASE_URL") {
            self.store.url = Some(url);
        }
        if let Some(key) = lookup("SUPABASE_KEY") {
            self.store.api_key = Some(SecretString::from(key));
        }
        if let Some(url) = lookup("DERMYX_CLASSIFIER_URL") {
            self.classifier.url = Some(url);
        }
        if let Some(bind) = lookup("DERMYX_BIND") {
            self.server.bind = bind;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
