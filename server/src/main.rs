use anyhow::Result;
use axum::Router;
use clap::Parser;
use fts_core::manifest::load_sources;
use fts_core::{IndexController, SourceOptions};
use fts_server::{build_app, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus manifest (.json or .jsonl)
    #[arg(long, default_value = "./sample_data/corpus.json")]
    corpus: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Timeout for fetching each web page
    #[arg(long, default_value_t = 10)]
    fetch_timeout_secs: u64,
    /// Timeout for extracting each PDF
    #[arg(long, default_value_t = 30)]
    pdf_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let source_options = SourceOptions {
        fetch_timeout: Duration::from_secs(args.fetch_timeout_secs),
        pdf_timeout: Duration::from_secs(args.pdf_timeout_secs),
        ..SourceOptions::default()
    };

    let fts = Arc::new(IndexController::new());
    for source in load_sources(&args.corpus, &source_options)? {
        fts.ingest_shared(source);
    }
    // Build before serving; remote and PDF sources block.
    let builder = Arc::clone(&fts);
    tokio::task::spawn_blocking(move || builder.build()).await?;

    let app: Router = build_app(AppState::from_env(fts, source_options));
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
