//! ISL Sign Agent - Indian Sign Language alphabet recognition for letter games.
//!
//! This library turns a stream of hand-tracking results into confirmed
//! letters. Each frame is reduced to a fixed landmark matrix, the last 60
//! frames are sent to a remote classifier, its probabilities are smoothed,
//! and a letter is confirmed only after it has been held steadily.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          ISL Sign Agent                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐             │
//! │  │ FrameSource │──▶│  Features   │──▶│   Window    │──┐          │
//! │  │ (tracking)  │   │ (21 x 6)    │   │ (60 frames) │  │          │
//! │  └─────────────┘   └─────────────┘   └─────────────┘  ▼          │
//! │                                              ┌─────────────┐     │
//! │  ┌─────────────┐   ┌─────────────┐           │ Classifier  │     │
//! │  │    Game     │◀──│    Hold     │◀──────────│  (HTTP)     │     │
//! │  │ (consumer)  │   │  + Smooth   │           └─────────────┘     │
//! │  └─────────────┘   └─────────────┘                               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use isl_sign_agent::{ClassifierClient, ClassifierConfig, Config, RecognitionRuntime, ReplaySource};
//! use isl_sign_agent::core::Letter;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let classifier = Arc::new(ClassifierClient::new(ClassifierConfig::from(&config))?);
//! let source = ReplaySource::new("session.jsonl", config.frame_period);
//! let mut runtime = RecognitionRuntime::new(&config, source, classifier);
//!
//! let mut on_letter = |letter: Letter| println!("{letter}");
//! runtime.run(&mut on_letter, std::future::pending::<()>()).await?;
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod core;
pub mod games;
pub mod pipeline;
pub mod runtime;
pub mod stats;
pub mod tracking;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use classifier::{Classifier, ClassifierClient, ClassifierConfig, ClassifierError};
pub use config::{Config, ConfigError, RecognitionConfig, StartupConfig};
pub use pipeline::{LetterConsumer, Prediction, RecognitionPipeline};
pub use runtime::{RecognitionRuntime, RuntimeError, RuntimeState};
pub use stats::{RecognitionStats, SharedStats, StatsSnapshot};
pub use tracking::{FrameSource, ReplaySource, TrackingError, TrackingResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
