use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use fleetdiag::api::{build_app, logs_mount, AppState};
use fleetdiag::config::Config;
use fleetdiag::{Ingestor, LogStore};

#[derive(Parser)]
#[command(name = "fleetdiag", about = "Fleet diagnostics: vehicle log ingestion and triage")]
struct Cli {
    /// Config file (defaults to ./fleetdiag.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (the default).
    Serve {
        /// Address to listen on, overriding `server.bind`.
        #[arg(long)]
        bind: Option<String>,
        /// Store file, overriding `store.data_file`.
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
    /// Ingest log files into the store and exit.
    Ingest {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
    /// Print the level a code and message would be given.
    Classify {
        code: String,
        #[arg(default_value = "")]
        message: String,
        /// Print the matching rules as JSON.
        #[arg(long)]
        explain: bool,
    },
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let mut cfg = Config::load(cli.config.as_deref())?;
    let ingestor = Ingestor::from_config(&cfg).context("invalid classifier config")?;

    match cli.command.unwrap_or(Command::Serve { bind: None, data_file: None }) {
        Command::Serve { bind, data_file } => {
            if let Some(bind) = bind {
                cfg.server.bind = bind;
            }
            if let Some(path) = data_file {
                cfg.store.data_file = path;
            }
            serve(cfg, ingestor).await
        }
        Command::Ingest { files, data_file } => {
            let path = data_file.unwrap_or(cfg.store.data_file);
            ingest_files(&path, &files, &ingestor)
        }
        Command::Classify { code, message, explain } => {
            let result = ingestor.classifier().explain(&code, &message);
            if explain {
                let json = serde_json::json!({
                    "level": result.level,
                    "codeFamily": result.code_family,
                    "keywordLevel": result.keyword_level,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                println!("{}", result.level);
            }
            Ok(())
        }
    }
}

async fn serve(cfg: Config, ingestor: Ingestor) -> anyhow::Result<()> {
    let store = LogStore::open(&cfg.store.data_file, ingestor.classifier())?;
    tracing::info!(path = ?store.path(), logs = store.len(), "store opened");

    let addr: SocketAddr = cfg
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {:?}", cfg.server.bind))?;
    let app = build_app(Arc::new(AppState::new(store, ingestor)), &cfg.server);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, mount = %logs_mount(&cfg.server.api_prefix), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}

fn ingest_files(data_file: &std::path::Path, files: &[PathBuf], ingestor: &Ingestor) -> anyhow::Result<()> {
    let mut store = LogStore::open(data_file, ingestor.classifier())?;
    let mut total = 0usize;
    for file in files {
        let content = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
        let batch = ingestor.ingest(&String::from_utf8_lossy(&content));
        let count = store.append(batch.accepted)?;
        println!("{}: {count} entries", file.display());
        total += count;
    }
    println!("stored {total} entries in {} ({} total)", data_file.display(), store.len());
    Ok(())
}
