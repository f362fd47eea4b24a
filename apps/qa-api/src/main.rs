//! QA Server - HTTP API answering questions from a question/answer corpus
//!
//! Provides REST endpoints for:
//! - Closest-match question answering
//! - Detailed matches with scores
//! - Corpus reload
//!
//! The `build` subcommand compiles conversation files into the corpus file
//! the server loads at startup.

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use clap::{Args, Parser, Subcommand};
use qa_core::config::parse_match_count;
use qa_core::{CorpusBuilder, CorpusFile, ServiceConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod handlers;
mod state;

use state::AppState;

/// Command-line interface for the QA server
#[derive(Parser, Debug)]
#[command(name = "qa-api")]
#[command(about = "Closest-match question answering server")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default)
    Serve(ServeArgs),
    /// Build a corpus file from conversation files
    Build(BuildArgs),
}

/// Overrides for environment configuration
#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Host address to bind to
    #[arg(long)]
    host: Option<String>,

    /// Corpus file to load
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Number of answers per question
    #[arg(long, value_parser = parse_match_count_arg)]
    match_count: Option<usize>,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Conversation files or directories of them
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Corpus file to write
    #[arg(short, long, default_value = "./corpus.json")]
    output: PathBuf,

    /// Keep the records already in the output file
    #[arg(long)]
    append: bool,
}

fn parse_match_count_arg(value: &str) -> Result<usize, String> {
    parse_match_count(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Command::Build(args)) => build_corpus(args),
        Some(Command::Serve(args)) => serve(args).await,
        None => serve(ServeArgs::default()).await,
    }
}

fn init_tracing(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "qa_api={0},qa_core={0},tower_http=debug",
            log_level
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the router with all endpoints and middleware
pub fn build_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    let routes = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Question endpoints
        .route("/ask", get(handlers::ask))
        .route("/api/ask", post(handlers::ask_detailed))
        // Admin endpoints
        .route("/admin/reload", post(handlers::reload))
        .with_state(state);

    with_middleware(routes, request_timeout)
}

/// Request tracing and the request timeout (408 once exceeded)
pub fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
}

async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = ServiceConfig::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(corpus) = args.corpus {
        config.corpus_path = corpus;
    }
    if let Some(match_count) = args.match_count {
        config.match_count = match_count;
    }

    // Initialize application state
    info!("Initializing application state...");
    let state = Arc::new(AppState::new(&config)?);

    let app = build_router(state, Duration::from_millis(config.request_timeout_ms));

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server is running on http://{}", addr);
    info!("Request timeout: {}ms", config.request_timeout_ms);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_corpus(args: BuildArgs) -> Result<()> {
    let mut builder = if args.append && args.output.exists() {
        let existing = CorpusFile::read(&args.output)
            .with_context(|| format!("Failed to read existing corpus {}", args.output.display()))?;
        info!("Appending to {} existing records", existing.records.len());
        CorpusBuilder::from_corpus_file(existing)
    } else {
        CorpusBuilder::new()
    };

    for input in &args.inputs {
        let added = builder
            .add_source(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        info!("{}: {} new pairs", input.display(), added);
    }

    let file = builder.build();
    // Validate before replacing the output
    file.clone().into_corpus()?;
    file.write(&args.output)?;

    info!("Corpus written to {} ({} records)", args.output.display(), file.records.len());
    Ok(())
}
