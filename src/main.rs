use anyhow::Context;
use clap::Parser;
use dialogue_session::config::{Config, GeneratorBackend, LoggingConfig};
use dialogue_session::dialogue::{build_session, TerminalSink, TurnOutcome};
use dialogue_session::metrics::METRICS;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Interactive chat session over a token-level generation backend
#[derive(Debug, Parser)]
#[command(name = "dialogue-session", version, about)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, default_value = "dialogue.toml")]
    config: PathBuf,

    /// Override the generator backend (http, echo)
    #[arg(long)]
    backend: Option<GeneratorBackend>,

    /// Override the log filter
    #[arg(long)]
    log_level: Option<String>,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn status(text: &str) {
    eprintln!("[{}]", text);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config =
        Config::load(Some(args.config.as_path())).context("Failed to load configuration")?;
    if let Some(backend) = args.backend {
        config.generator.backend = backend;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_tracing(&config.logging);

    let mut session =
        build_session(&config, TerminalSink::stdout()).context("Failed to start session")?;
    session.greet(&config.session.greeting);
    status("Ready");

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/metrics" => {
                print!("{}", METRICS.render());
                continue;
            }
            "/context" => {
                println!(
                    "{:?}: {} / {} tokens\n",
                    session.state(),
                    session.context().len(),
                    session.budget().max_length()
                );
                continue;
            }
            "" => continue,
            _ => {}
        }

        status("Thinking...");
        if let TurnOutcome::Failed { .. } = session.run_turn(&line).await {
            status("Turn failed, please resubmit");
        } else {
            status("Ready");
        }
    }

    tracing::info!(session = %session.session_id(), "Session closed");
    Ok(())
}
