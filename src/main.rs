//! ISL Sign Agent CLI
//!
//! Runs the letter recognition pipeline over recorded hand tracking, checks
//! the classifier, and optionally serves the classifier relay.

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use isl_sign_agent::{
    classifier::{ClassifierClient, ClassifierConfig},
    config::Config,
    core::{parse_letters, Letter},
    games::{FishingSession, GameLevel, TrainSession, DEFAULT_SEQUENCE_LENGTH},
    pipeline::LetterConsumer,
    runtime::{RecognitionRuntime, RuntimeError},
    stats::RecognitionStats,
    tracking::ReplaySource,
    VERSION,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "isl-sign")]
#[command(version = VERSION)]
#[command(about = "Indian Sign Language alphabet recognition for letter games", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum GameKind {
    Fishing,
    Train,
}

#[derive(Subcommand)]
enum Commands {
    /// Run recognition over a recorded hand-tracking file
    Run {
        /// JSON-lines recording, one tracking result per line
        #[arg(long, short)]
        input: PathBuf,

        /// Classifier base URL (overrides config)
        #[arg(long)]
        classifier_url: Option<String>,

        /// Feed confirmed letters into a game
        #[arg(long, value_enum)]
        game: Option<GameKind>,

        /// Target letters for the fishing game
        #[arg(long, default_value = "CAT")]
        targets: String,

        /// Train level: 1 = sequential, 2 = random
        #[arg(long, default_value = "1")]
        level: u8,

        /// Seed for game randomness
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Check that the classifier is reachable
    Check {
        /// Classifier base URL (overrides config)
        #[arg(long)]
        classifier_url: Option<String>,
    },

    /// Show configuration
    Config,

    /// Serve the classifier relay
    #[cfg(feature = "server")]
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Upstream classifier base URL (overrides config)
        #[arg(long)]
        upstream: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "isl_sign_agent=info,isl_sign=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            classifier_url,
            game,
            targets,
            level,
            seed,
        } => {
            cmd_run(input, classifier_url, game, &targets, level, seed);
        }
        Commands::Check { classifier_url } => {
            cmd_check(classifier_url);
        }
        Commands::Config => {
            cmd_config();
        }
        #[cfg(feature = "server")]
        Commands::Serve { port, upstream } => {
            cmd_serve(port, upstream);
        }
    }
}

fn load_config(classifier_url: Option<String>) -> Config {
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {e}; using defaults");
        Config::default()
    });
    if let Some(url) = classifier_url {
        config.classifier_url = url;
    }
    config
}

fn build_runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: Failed to create async runtime: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_run(
    input: PathBuf,
    classifier_url: Option<String>,
    game: Option<GameKind>,
    targets: &str,
    level: u8,
    seed: Option<u64>,
) {
    println!("ISL Sign Agent v{VERSION}");
    println!();

    let config = load_config(classifier_url);
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let classifier = match ClassifierClient::new(ClassifierConfig::from(&config)) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let stats_path = config
        .data_path
        .join("stats")
        .join(format!("session_{}.json", Utc::now().format("%Y%m%d_%H%M%S")));
    let stats = Arc::new(RecognitionStats::with_persistence(stats_path.clone()));

    println!("Recording: {}", input.display());
    println!("Classifier: {}", classifier.config().predict_url());
    println!("Run ID: {}", stats.run_id());
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let source = ReplaySource::new(input, config.frame_period);
    let mut recognition = RecognitionRuntime::with_stats(&config, source, classifier, stats.clone());

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let runtime = build_runtime();

    let result = match game {
        None => {
            let mut confirmed: Vec<Letter> = Vec::new();
            let mut consumer = |letter: Letter| {
                println!("Confirmed: {letter}");
                confirmed.push(letter);
            };
            let result = drive(&runtime, &mut recognition, &mut consumer, running);
            let text: String = confirmed.iter().map(|l| l.as_char()).collect();
            println!();
            println!("Letters: {}", if text.is_empty() { "(none)" } else { text.as_str() });
            result
        }
        Some(GameKind::Fishing) => {
            let targets = parse_letters(targets);
            if targets.is_empty() {
                eprintln!("Error: --targets must contain at least one letter");
                std::process::exit(1);
            }
            let mut session = FishingSession::new(rng, targets);
            let result = drive(&runtime, &mut recognition, &mut session, running);
            println!();
            println!("Fishing results:");
            println!("  Score: {}", session.score());
            println!(
                "  Caught: {}",
                session.caught().iter().map(|l| l.as_char()).collect::<String>()
            );
            println!("  Misses: {}", session.misses());
            println!("  Finished: {}", session.is_finished());
            result
        }
        Some(GameKind::Train) => {
            let level = GameLevel::from_number(level).unwrap_or_else(|| {
                eprintln!("Error: --level must be 1 or 2");
                std::process::exit(1);
            });
            let mut session =
                TrainSession::new(rng, DEFAULT_SEQUENCE_LENGTH, level).with_auto_advance(true);
            println!("First round: {}", session.round().display());
            let result = drive(&runtime, &mut recognition, &mut session, running);
            println!();
            println!("Train results:");
            println!("  Rounds completed: {}", session.rounds_completed());
            println!(
                "  Wrong letters: {}",
                session.attempts().iter().filter(|a| !a.correct).count()
            );
            println!("  Current round: {}", session.round().display());
            result
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    if let Err(e) = stats.save() {
        eprintln!("Warning: Could not save stats: {e}");
    } else {
        println!("Stats saved to {}", stats_path.display());
    }

    println!();
    println!("{}", stats.summary());
}

/// Run recognition until the recording ends or Ctrl+C is pressed.
fn drive<L: LetterConsumer>(
    runtime: &tokio::runtime::Runtime,
    recognition: &mut RecognitionRuntime<ReplaySource, ClassifierClient>,
    consumer: &mut L,
    running: Arc<AtomicBool>,
) -> Result<(), RuntimeError> {
    runtime.block_on(async {
        let shutdown = async move {
            while running.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            println!();
            println!("Stopping...");
        };
        recognition.run(consumer, shutdown).await
    })
}

fn cmd_check(classifier_url: Option<String>) {
    let config = load_config(classifier_url);
    let client = match ClassifierClient::new(ClassifierConfig::from(&config)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!("Checking {} ...", client.config().predict_url());
    let runtime = build_runtime();
    match runtime.block_on(client.test_connection()) {
        Ok(true) => println!("Classifier connection: OK"),
        Ok(false) => {
            eprintln!("Classifier responded with an error status");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Could not connect to classifier: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

#[cfg(feature = "server")]
fn cmd_serve(port: u16, upstream: Option<String>) {
    use isl_sign_agent::server::{self, ServerConfig};

    let config = load_config(upstream);
    let server_config = ServerConfig::new(port, ClassifierConfig::from(&config));
    let runtime = build_runtime();

    let result = runtime.block_on(async {
        let (addr, shutdown_tx) = server::run(server_config).await?;
        println!("Relay listening on http://{addr}");
        println!("Forwarding to {}", config.classifier_url);
        println!("Press Ctrl+C to stop");

        tokio::signal::ctrl_c().await?;
        let _ = shutdown_tx.send(());
        Ok::<(), anyhow::Error>(())
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    }) {
        eprintln!("Warning: Could not set Ctrl+C handler: {e}");
    }
}
