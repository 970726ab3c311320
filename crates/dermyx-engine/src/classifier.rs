//! Client for the external image classifier service.
//!
//! Endpoints: `POST {base}/predict_image`, `POST {base}/refine_diagnosis`.
//!
//! The image payload is checked locally before upload: data-URL MIME type
//! against the allow-list, then the decoded size against the limit. The
//! service applies the same checks; failing early saves the round trip.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dermyx_common::http::ScopedClient;
use dermyx_common::{ClassifierConfig, DermyxError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument};

pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Unsupported image mime type: {0}")]
    UnsupportedMediaType(String),

    #[error("Image too large: {size} bytes (limit {limit})")]
    ImageTooLarge { size: usize, limit: usize },

    #[error("Invalid image payload: {0}")]
    InvalidImage(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Classifier request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Classifier request timed out")]
    Timeout,

    #[error("Classifier returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed classifier response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Client(#[from] DermyxError),
}

impl From<reqwest::Error> for ClassifierError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClassifierError::Timeout
        } else {
            ClassifierError::Http(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Disease summary attached to a prediction. `id` is absent when the
/// classifier's label has no catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedDisease {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePrediction {
    pub disease: PredictedDisease,
    /// Model probability in [0, 1].
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(default)]
    results: Vec<ImagePrediction>,
}

/// Validate an image given as a data URL or bare base64 and return its
/// decoded size. Bare base64 carries no MIME type and skips that check.
pub fn check_image(image: &str, max_bytes: usize) -> Result<usize> {
    let image = image.trim();
    if image.is_empty() {
        return Err(ClassifierError::InvalidImage("no image provided".to_string()));
    }

    let payload = match image.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| ClassifierError::InvalidImage("data URL has no payload".to_string()))?;
            if let Some(mime) = header.strip_suffix(";base64") {
                let mime = mime.to_ascii_lowercase();
                if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
                    return Err(ClassifierError::UnsupportedMediaType(mime));
                }
            }
            data
        }
        None => image,
    };

    let decoded = STANDARD
        .decode(payload.trim())
        .map_err(|e| ClassifierError::InvalidImage(e.to_string()))?;
    if decoded.len() > max_bytes {
        return Err(ClassifierError::ImageTooLarge { size: decoded.len(), limit: max_bytes });
    }
    Ok(decoded.len())
}

pub struct ClassifierClient {
    client: ScopedClient,
    base_url: String,
    max_image_bytes: usize,
}

impl ClassifierClient {
    pub fn new(base_url: &str, timeout: Duration, max_image_bytes: usize) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let client = ScopedClient::for_base_url(&base_url, timeout)?;
        Ok(Self { client, base_url, max_image_bytes })
    }

    /// `None` when no classifier URL is configured.
    pub fn from_config(config: &ClassifierConfig) -> Result<Option<Self>> {
        match config.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => Ok(Some(Self::new(
                url,
                Duration::from_secs(config.timeout_secs),
                config.max_image_bytes,
            )?)),
            None => Ok(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ranked predictions for one image.
    #[instrument(skip(self, image), fields(image_len = image.len()))]
    pub async fn predict_image(&self, image: &str) -> Result<Vec<ImagePrediction>> {
        let size = check_image(image, self.max_image_bytes)?;
        debug!(size, "Uploading image to classifier");
        self.post("predict_image", json!({ "image": image })).await
    }

    /// Re-rank earlier predictions given the user's selected symptom names.
    #[instrument(skip(self, initial_results))]
    pub async fn refine_diagnosis(
        &self,
        initial_results: &[ImagePrediction],
        symptoms: &[String],
    ) -> Result<Vec<ImagePrediction>> {
        if initial_results.is_empty() || symptoms.is_empty() {
            return Err(ClassifierError::InvalidRequest(
                "initial results and symptoms are required".to_string(),
            ));
        }
        self.post(
            "refine_diagnosis",
            json!({ "initial_results": initial_results, "symptoms": symptoms }),
        )
        .await
    }

    async fn post(&self, endpoint: &str, body: serde_json::Value) -> Result<Vec<ImagePrediction>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp = self.client.post(&url)?.json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClassifierError::Status { status: status.as_u16(), body });
        }

        let bytes = resp.bytes().await?;
        let parsed: PredictionResponse = serde_json::from_slice(&bytes)?;
        debug!(endpoint, count = parsed.results.len(), "Classifier responded");
        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_1PX: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

    #[test]
    fn test_data_url_and_bare_base64_accepted() {
        let url = format!("data:image/png;base64,{PNG_1PX}");
        assert!(check_image(&url, 1024).is_ok());
        assert!(check_image(PNG_1PX, 1024).is_ok());
        assert!(check_image(&format!("data:IMAGE/JPEG;base64,{PNG_1PX}"), 1024).is_ok());
    }

    #[test]
    fn test_mime_allow_list() {
        let err = check_image(&format!("data:image/gif;base64,{PNG_1PX}"), 1024).unwrap_err();
        assert!(matches!(err, ClassifierError::UnsupportedMediaType(m) if m == "image/gif"));
    }

    #[test]
    fn test_size_limit() {
        let err = check_image(PNG_1PX, 10).unwrap_err();
        assert!(matches!(err, ClassifierError::ImageTooLarge { limit: 10, .. }));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(check_image("", 10), Err(ClassifierError::InvalidImage(_))));
        assert!(matches!(check_image("not base64!", 10), Err(ClassifierError::InvalidImage(_))));
        assert!(matches!(check_image("data:image/png;base64", 10), Err(ClassifierError::InvalidImage(_))));
    }

    #[test]
    fn test_unconfigured_classifier() {
        assert!(ClassifierClient::from_config(&ClassifierConfig::default()).unwrap().is_none());
        let config = ClassifierConfig { url: Some("http://127.0.0.1:5000/".into()), ..Default::default() };
        let client = ClassifierClient::from_config(&config).unwrap().unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:5000");
    }

    #[tokio::test]
    async fn test_refine_requires_inputs() {
        let client = ClassifierClient::new("http://127.0.0.1:5000", Duration::from_secs(1), 1024).unwrap();
        let err = client.refine_diagnosis(&[], &["かゆみ".to_string()]).await.unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidRequest(_)));
    }
}
