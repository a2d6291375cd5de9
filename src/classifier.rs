//! Client for the remote gesture classifier.
//!
//! The classifier accepts a sequence of 60 landmark frames and answers with
//! a 26-entry probability vector, one entry per letter. Any failure here is
//! transient from the pipeline's point of view: the cycle is skipped and
//! the next full window triggers a fresh request.

use crate::core::{LandmarkFrame, LETTER_COUNT, SEQUENCE_LENGTH};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Classifier endpoint configuration.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Base URL, e.g. `http://localhost:5000`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClassifierConfig {
    /// Create a new classifier configuration.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Get the prediction endpoint URL.
    pub fn predict_url(&self) -> String {
        format!("{}/api/predict", self.base_url.trim_end_matches('/'))
    }
}

impl From<&crate::config::Config> for ClassifierConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self::new(config.classifier_url.clone(), config.request_timeout)
    }
}

/// Classifier client error types.
#[derive(Debug)]
pub enum ClassifierError {
    /// Client could not be constructed
    Config(String),
    /// The sequence did not have the expected number of frames
    InvalidInput { frames: usize },
    /// Network/HTTP error
    Network(String),
    /// Classifier returned an error status
    Server { status: u16, message: String },
    /// Response body was not valid JSON for the expected shape
    Serialization(String),
    /// Response parsed but did not carry a usable probability vector
    Malformed(String),
}

impl std::fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierError::Config(msg) => write!(f, "Classifier config error: {msg}"),
            ClassifierError::InvalidInput { frames } => write!(
                f,
                "Classifier input must have {SEQUENCE_LENGTH} frames, got {frames}"
            ),
            ClassifierError::Network(msg) => write!(f, "Classifier network error: {msg}"),
            ClassifierError::Server { status, message } => {
                write!(f, "Classifier server error ({status}): {message}")
            }
            ClassifierError::Serialization(msg) => {
                write!(f, "Classifier serialization error: {msg}")
            }
            ClassifierError::Malformed(msg) => write!(f, "Malformed classifier response: {msg}"),
        }
    }
}

impl std::error::Error for ClassifierError {}

/// Request body for the prediction endpoint.
#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub landmarks: &'a [LandmarkFrame],
}

/// Response body from the prediction endpoint.
///
/// The classifier also reports its own top `label` and `score`; only the
/// probability vector is used.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub probabilities: Option<Vec<f32>>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PredictResponse {
    /// Extract and check the probability vector.
    pub fn into_probabilities(self) -> Result<Vec<f32>, ClassifierError> {
        match self.probabilities {
            Some(probabilities) => validate_probabilities(probabilities),
            None => Err(ClassifierError::Malformed(
                self.error
                    .unwrap_or_else(|| "missing probabilities".to_string()),
            )),
        }
    }
}

/// Accept only a finite vector with one entry per letter.
pub fn validate_probabilities(probabilities: Vec<f32>) -> Result<Vec<f32>, ClassifierError> {
    if probabilities.len() != LETTER_COUNT {
        return Err(ClassifierError::Malformed(format!(
            "expected {} probabilities, got {}",
            LETTER_COUNT,
            probabilities.len()
        )));
    }
    if probabilities.iter().any(|p| !p.is_finite()) {
        return Err(ClassifierError::Malformed(
            "non-finite probability".to_string(),
        ));
    }
    Ok(probabilities)
}

/// Boxed future returned by [`Classifier::predict`].
pub type PredictFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<f32>, ClassifierError>> + Send + 'a>>;

/// Anything that can turn a landmark sequence into letter probabilities.
pub trait Classifier: Send + Sync {
    fn predict<'a>(&'a self, landmarks: &'a [LandmarkFrame]) -> PredictFuture<'a>;
}

/// HTTP client for the remote classifier.
pub struct ClassifierClient {
    config: ClassifierConfig,
    client: reqwest::Client,
}

impl ClassifierClient {
    /// Create a new classifier client.
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Test connection to the classifier.
    pub async fn test_connection(&self) -> Result<bool, ClassifierError> {
        let response = self
            .client
            .get(self.config.predict_url())
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }

    /// Classify one full landmark sequence.
    pub async fn classify(&self, landmarks: &[LandmarkFrame]) -> Result<Vec<f32>, ClassifierError> {
        if landmarks.len() != SEQUENCE_LENGTH {
            return Err(ClassifierError::InvalidInput {
                frames: landmarks.len(),
            });
        }

        let response = self
            .client
            .post(self.config.predict_url())
            .header("Content-Type", "application/json")
            .json(&PredictRequest { landmarks })
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClassifierError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Serialization(e.to_string()))?;

        body.into_probabilities()
    }
}

impl Classifier for ClassifierClient {
    fn predict<'a>(&'a self, landmarks: &'a [LandmarkFrame]) -> PredictFuture<'a> {
        Box::pin(self.classify(landmarks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EMPTY_FRAME;

    #[test]
    fn test_classifier_config_url() {
        let config = ClassifierConfig::new("http://127.0.0.1:5000/", Duration::from_secs(1));
        assert_eq!(config.predict_url(), "http://127.0.0.1:5000/api/predict");
    }

    #[test]
    fn test_request_shape() {
        let frames = vec![EMPTY_FRAME; 2];
        let json = serde_json::to_value(PredictRequest { landmarks: &frames }).unwrap();
        let outer = json["landmarks"].as_array().unwrap();
        assert_eq!(outer.len(), 2);
        assert_eq!(outer[0].as_array().unwrap().len(), 21);
        assert_eq!(outer[0][0].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_response_parsing() {
        let mut probabilities = vec![0.0_f32; 26];
        probabilities[2] = 1.0;
        let body = serde_json::json!({
            "label": "C",
            "score": 1.0,
            "probabilities": probabilities,
        });
        let response: PredictResponse = serde_json::from_value(body).unwrap();
        let parsed = response.into_probabilities().unwrap();
        assert_eq!(parsed.len(), 26);
        assert_eq!(parsed[2], 1.0);
    }

    #[test]
    fn test_malformed_responses() {
        let response: PredictResponse =
            serde_json::from_value(serde_json::json!({"error": "Model not loaded"})).unwrap();
        match response.into_probabilities() {
            Err(ClassifierError::Malformed(msg)) => assert_eq!(msg, "Model not loaded"),
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            validate_probabilities(vec![0.5; 3]),
            Err(ClassifierError::Malformed(_))
        ));
        let mut with_nan = vec![0.0; 26];
        with_nan[0] = f32::NAN;
        assert!(validate_probabilities(with_nan).is_err());
    }

    #[tokio::test]
    async fn test_rejects_short_sequence_without_network() {
        let client = ClassifierClient::new(ClassifierConfig::new(
            "http://127.0.0.1:9",
            Duration::from_millis(100),
        ))
        .unwrap();
        let frames = vec![EMPTY_FRAME; 10];
        assert!(matches!(
            client.classify(&frames).await,
            Err(ClassifierError::InvalidInput { frames: 10 })
        ));
    }
}
