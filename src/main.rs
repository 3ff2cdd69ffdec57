use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use loqa_voice::config::PlaybackBackend;
use loqa_voice::{
    create_router, AppState, Config, ConsoleSpeechPlayer, NatsCaptureFactory, NatsSpeechPlayer,
    Orchestrator, SessionConfig, SpeechPlayer, VoiceSession, WebSocketConnector,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(name = "loqa-voice", version, about = "Real-time voice interaction coordinator")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/loqa-voice")]
    config: String,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Serve the HTTP control API (default)
    Serve,
    /// Drive the session from stdin: start, stop, status, reset, quit
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Loqa Voice v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!("Voice endpoint: {}", cfg.transport.url);

    let session = VoiceSession::spawn(build_orchestrator(&cfg));

    match cli.mode.unwrap_or(Mode::Serve) {
        Mode::Serve => serve(&cfg, session.clone()).await?,
        Mode::Interactive => interactive(session.clone()).await?,
    }

    session.shutdown().await
}

fn build_orchestrator(cfg: &Config) -> Orchestrator {
    let capture = NatsCaptureFactory::new(
        cfg.capture.nats_url.clone(),
        cfg.capture.subject.clone(),
        cfg.capture.session_id.clone(),
    );
    info!("Following STT session {}", capture.session_id());

    let player: Box<dyn SpeechPlayer> = match cfg.playback.backend {
        PlaybackBackend::Console => Box::new(ConsoleSpeechPlayer::new(cfg.playback.words_per_minute)),
        PlaybackBackend::Nats => Box::new(NatsSpeechPlayer::new(
            cfg.playback.nats_url.clone(),
            cfg.playback.subject.clone(),
            capture.session_id().to_string(),
            Duration::from_secs(cfg.playback.request_timeout_secs),
        )),
    };

    Orchestrator::new(
        SessionConfig::default().with_restart_policy(cfg.session.restart_policy),
        Arc::new(WebSocketConnector::new(cfg.transport.url.clone())),
        Arc::new(capture),
        player,
    )
}

async fn serve(cfg: &Config, session: VoiceSession) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP API listening on {}", addr);

    axum::serve(listener, create_router(AppState::new(session)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")
}

async fn interactive(session: VoiceSession) -> Result<()> {
    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        let mut last = updates.borrow().status;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow().clone();
            if snapshot.status == last {
                continue;
            }
            last = snapshot.status;
            match &snapshot.error {
                Some(error) => println!("[{}] {}", snapshot.status, error),
                None => println!("[{}]", snapshot.status),
            }
        }
    });

    println!("Commands: start, stop, status, reset, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "start" => session.start_interaction(),
            "stop" => session.stop_interaction(),
            "reset" => session.reset(),
            "status" => {
                let snapshot = session.snapshot();
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            "quit" | "exit" => break,
            "" => {}
            other => println!("Unknown command: {}", other),
        }
    }

    printer.abort();
    Ok(())
}
