use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use talkwithme::{
    create_router, AppState, Config, Providers, ReportView, SessionConfig, SessionController,
    Topic, TurnOutcome,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "talkwithme", version, about = "Spoken English practice with pronunciation scoring")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, short, global = true, default_value = "config/talkwithme")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Run each WAV file as a turn, then print the session report
    Practice {
        /// Conversation topic (defaults to the configured one)
        #[arg(long, short)]
        topic: Option<Topic>,

        /// Captured utterances, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List available topics
    Topics,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Topics => {
            for topic in Topic::ALL {
                println!("{:<18} {}", topic.id(), topic.label());
            }
            Ok(())
        }
        Command::Serve => serve(&cli.config).await,
        Command::Practice { topic, files } => practice(&cli.config, topic, files).await,
    }
}

async fn serve(config_path: &str) -> Result<()> {
    let cfg = Config::load(config_path).context("Failed to load config")?;
    info!("Loaded config: {}", cfg.service.name);

    let providers = Providers::azure(&cfg).context("Failed to set up providers")?;
    let state = AppState::new(providers, SessionConfig::from_config(&cfg));
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}

async fn practice(config_path: &str, topic: Option<Topic>, files: Vec<PathBuf>) -> Result<()> {
    let cfg = Config::load(config_path).context("Failed to load config")?;
    let providers = Providers::azure(&cfg).context("Failed to set up providers")?;

    let mut session_config = SessionConfig::from_config(&cfg);
    if let Some(topic) = topic {
        session_config = session_config.with_topic(topic);
    }

    let mut session = SessionController::new(session_config, providers);
    println!("== {} ==", session.state().topic().label());

    for path in &files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        match session.process_turn(&bytes).await? {
            TurnOutcome::Completed(turn) => {
                println!("you: {}", turn.user_text);
                println!(
                    "     pronunciation {:.0} ({})",
                    turn.score.pronunciation,
                    turn.tier.label()
                );
                println!("tutor: {}", turn.reply);
            }
            TurnOutcome::TranscriptionFailed { reason } => {
                println!("[{}] not recognized, try again: {}", path.display(), reason);
            }
        }
    }

    session.enter_report_mode();
    match session.report().await? {
        ReportView::NoScoreData => println!("\nNo conversation recorded yet."),
        ReportView::Ready(report) => {
            println!("\n== Report ==");
            println!("{}", report.feedback.text);
            println!("\nutterances: {}", report.turn_count);
            println!("average pronunciation: {}", report.average_display());
            for item in &report.breakdown {
                println!(
                    "#{} {} ({:.0}) accuracy {:.0}, fluency {:.0}: {}",
                    item.index,
                    item.text,
                    item.pronunciation,
                    item.accuracy,
                    item.fluency,
                    item.tier_label
                );
            }
        }
    }

    Ok(())
}
