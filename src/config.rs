//! Configuration for the ISL sign agent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the recognition agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the gesture classifier (the `/api/predict` path is appended)
    pub classifier_url: String,

    /// Timeout applied to each classifier request
    #[serde(with = "duration_ms")]
    pub request_timeout: Duration,

    /// Period of the frame tick driving the pipeline (camera frame rate)
    #[serde(with = "duration_ms")]
    pub frame_period: Duration,

    /// Recognition tuning
    pub recognition: RecognitionConfig,

    /// Frame source startup supervision
    pub startup: StartupConfig,

    /// Path for storing session statistics
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("isl-sign-agent");

        Self {
            classifier_url: "http://localhost:5000".to_string(),
            request_timeout: Duration::from_secs(10),
            frame_period: Duration::from_millis(33), // ~30 Hz
            recognition: RecognitionConfig::default(),
            startup: StartupConfig::default(),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a configuration document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.recognition.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("isl-sign-agent")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Tuning constants for smoothing, hold-to-confirm and request pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Weight kept on the smoothed history for each new probability vector
    pub smoothing_factor: f32,

    /// Smoothed score a label must exceed to count towards a hold
    pub confidence_threshold: f32,

    /// Qualifying classifier updates needed to confirm a letter
    pub hold_frames: u32,

    /// Minimum spacing between classifier requests
    #[serde(with = "duration_ms")]
    pub min_request_interval: Duration,

    /// How long a confirmed letter stays locked against re-confirmation
    #[serde(with = "duration_ms")]
    pub cooldown: Duration,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.7,
            confidence_threshold: 0.6,
            hold_frames: 8,
            min_request_interval: Duration::from_millis(175),
            cooldown: Duration::from_secs(2),
        }
    }
}

impl RecognitionConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.smoothing_factor) {
            return Err(ConfigError::Invalid(format!(
                "smoothing_factor must be in [0, 1), got {}",
                self.smoothing_factor
            )));
        }
        if self.hold_frames == 0 {
            return Err(ConfigError::Invalid(
                "hold_frames must be at least 1".to_string(),
            ));
        }
        if !self.confidence_threshold.is_finite() {
            return Err(ConfigError::Invalid(
                "confidence_threshold must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bounded retry policy for acquiring the frame source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupConfig {
    pub max_attempts: u32,
    #[serde(with = "duration_ms")]
    pub backoff: Duration,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration as whole milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.classifier_url, "http://localhost:5000");
        assert_eq!(config.recognition.hold_frames, 8);
        assert_eq!(
            config.recognition.min_request_interval,
            Duration::from_millis(175)
        );
        assert_eq!(config.recognition.cooldown, Duration::from_secs(2));
        assert!((config.recognition.smoothing_factor - 0.7).abs() < f32::EPSILON);
        assert!((config.recognition.confidence_threshold - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_json_uses_milliseconds() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("\"min_request_interval\":175"));
        assert!(json.contains("\"cooldown\":2000"));

        let parsed = Config::from_json(&json).unwrap();
        assert_eq!(parsed.recognition.cooldown, Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_recognition_config() {
        let mut recognition = RecognitionConfig::default();
        recognition.smoothing_factor = 1.0;
        assert!(matches!(recognition.validate(), Err(ConfigError::Invalid(_))));

        let mut recognition = RecognitionConfig::default();
        recognition.hold_frames = 0;
        assert!(recognition.validate().is_err());

        assert!(RecognitionConfig::default().validate().is_ok());
    }
}
