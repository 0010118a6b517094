//! kgroute CLI — entry point.
//!
//! # Commands
//!
//! - `kgroute ask (--text T | --audio FILE.wav)` — answer one question
//! - `kgroute status` — show knowledge graph and transcription settings
//! - `kgroute onboard` — write the default config and helper script

mod helpers;
mod onboard;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;

use kgroute_core::audio::read_wav_file;
use kgroute_core::config::{load_config, Config};
use kgroute_core::types::{NormalizedAnswer, SpeechRequest};
use kgroute_providers::WhisperTranscriber;
use kgroute_router::KnowledgeRouter;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// kgroute — knowledge graph query router
#[derive(Parser)]
#[command(name = "kgroute", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the spoken answer
    Ask {
        /// Question text (skips transcription)
        #[arg(short, long, conflicts_with = "audio", required_unless_present = "audio")]
        text: Option<String>,

        /// 16-bit PCM WAV recording of the question
        #[arg(short, long)]
        audio: Option<PathBuf>,

        /// Device identifier echoed in the answer
        #[arg(short, long, default_value = "cli")]
        device: String,

        /// Session identifier echoed in the answer
        #[arg(short, long, default_value = "cli:default")]
        session: String,

        /// Request locale
        #[arg(long, default_value = kgroute_core::types::DEFAULT_LOCALE)]
        locale: String,

        /// Print the answer as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Initialize configuration and the OpenAI helper script
    Onboard,

    /// Show knowledge graph configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            text,
            audio,
            device,
            session,
            locale,
            json,
            logs,
        } => {
            init_logging(logs);
            let request = build_request(text, audio.as_deref(), &device, &session)?
                .with_locale(locale);
            run_ask(request, json, logs).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

// ─────────────────────────────────────────────
// Ask command
// ─────────────────────────────────────────────

/// Turn `--text` / `--audio` into a request.
fn build_request(
    text: Option<String>,
    audio: Option<&std::path::Path>,
    device: &str,
    session: &str,
) -> Result<SpeechRequest> {
    match (text, audio) {
        (Some(text), _) => Ok(SpeechRequest::from_transcript(session, device, text)),
        (None, Some(path)) => {
            let path = helpers::expand_tilde(&path.to_string_lossy());
            let clip = read_wav_file(&path)?;
            Ok(SpeechRequest::from_audio(session, device, clip))
        }
        (None, None) => anyhow::bail!("either --text or --audio is required"),
    }
}

async fn run_ask(request: SpeechRequest, json: bool, show_logs: bool) -> Result<()> {
    let config = load_config(None);
    let router = build_router(&config);

    info!(
        session = %request.session,
        provider = %router.selected(),
        "processing single request"
    );

    let (tx, mut rx) = mpsc::channel::<NormalizedAnswer>(1);
    if !show_logs {
        helpers::print_thinking();
    }
    let result = router.process_knowledge_graph(&request, &tx).await;
    if !show_logs {
        helpers::clear_thinking();
    }
    result.context("knowledge graph request failed")?;
    drop(tx);

    let answer = rx
        .recv()
        .await
        .context("router finished without emitting an answer")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        helpers::print_answer(&answer);
    }
    Ok(())
}

/// Build a `KnowledgeRouter` from the loaded configuration.
pub fn build_router(config: &Config) -> KnowledgeRouter {
    let transcriber = Arc::new(WhisperTranscriber::new(&config.transcription));
    KnowledgeRouter::new(config.knowledge.clone(), transcriber)
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("kgroute=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgroute_core::audio::pcm_to_wav;
    use kgroute_core::config::{KnowledgeConfig, ProviderKind};
    use kgroute_core::types::AudioClip;

    #[test]
    fn test_cli_parses_ask_text() {
        let cli = Cli::try_parse_from(["kgroute", "ask", "--text", "hello", "--json"]).unwrap();
        match cli.command {
            Commands::Ask {
                text, audio, json, ..
            } => {
                assert_eq!(text.as_deref(), Some("hello"));
                assert!(audio.is_none());
                assert!(json);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_cli_ask_requires_input() {
        assert!(Cli::try_parse_from(["kgroute", "ask"]).is_err());
        assert!(
            Cli::try_parse_from(["kgroute", "ask", "--text", "a", "--audio", "b.wav"]).is_err()
        );
    }

    #[test]
    fn test_build_request_from_text() {
        let request = build_request(Some("what is rust".into()), None, "dev", "sess").unwrap();
        assert_eq!(request.transcript(), Some("what is rust"));
        assert_eq!(request.device, "dev");
        assert_eq!(request.session, "sess");
    }

    #[test]
    fn test_build_request_from_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.wav");
        let wav = pcm_to_wav(&AudioClip::new(vec![1, 0, 2, 0, 3, 0], 16_000)).unwrap();
        std::fs::write(&path, wav).unwrap();

        let request = build_request(None, Some(&path), "dev", "sess").unwrap();
        let clip = request.audio().unwrap();
        assert_eq!(clip.sample_rate, 16_000);
        assert_eq!(clip.pcm, vec![1, 0, 2, 0, 3, 0]);
    }

    #[test]
    fn test_build_request_missing_wav() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.wav");
        assert!(build_request(None, Some(&missing), "d", "s").is_err());
    }

    #[test]
    fn test_build_router_follows_config() {
        let mut config = Config::default();
        assert_eq!(build_router(&config).selected(), ProviderKind::None);

        config.knowledge = KnowledgeConfig {
            enable: true,
            provider: ProviderKind::Together,
            key: "tg".into(),
            ..Default::default()
        };
        assert_eq!(build_router(&config).selected(), ProviderKind::Together);
    }
}
