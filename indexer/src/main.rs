use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use fts_core::manifest::load_sources;
use fts_core::{IndexController, SearchOptions, SourceOptions};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "fts-indexer")]
#[command(about = "Build a TF-IDF index over a corpus manifest and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Corpus manifest (.json or .jsonl)
    #[arg(long, default_value = "./sample_data/corpus.json")]
    corpus: PathBuf,
    /// Timeout for fetching each web page
    #[arg(long, default_value_t = 10)]
    fetch_timeout_secs: u64,
    /// Timeout for extracting each PDF
    #[arg(long, default_value_t = 30)]
    pdf_timeout_secs: u64,
}

impl CorpusArgs {
    fn source_options(&self) -> SourceOptions {
        SourceOptions {
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            pdf_timeout: Duration::from_secs(self.pdf_timeout_secs),
            ..SourceOptions::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Index the corpus and print ranked matches for a query
    Query {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Query text
        #[arg(long)]
        query: String,
        /// Append documents containing the raw query as a substring
        #[arg(long, default_value_t = false)]
        did_you_mean: bool,
        /// Maximum number of results to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Print results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Index the corpus and print index statistics
    Stats {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Number of most discriminative terms to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    query: &'a str,
    took_s: f64,
    total_hits: usize,
    results: Vec<fts_core::SearchHit>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { corpus, query, did_you_mean, limit, json } => {
            run_query(&corpus, &query, did_you_mean, limit, json)
        }
        Commands::Stats { corpus, top } => print_stats(&corpus, top),
    }
}

fn build_index(corpus: &CorpusArgs) -> Result<IndexController> {
    tracing::info!(corpus = %corpus.corpus.display(), "indexing corpus");
    let fts = IndexController::new();
    for source in load_sources(&corpus.corpus, &corpus.source_options())? {
        fts.ingest_shared(source);
    }
    fts.build();
    Ok(fts)
}

fn run_query(
    corpus: &CorpusArgs,
    query: &str,
    did_you_mean: bool,
    limit: usize,
    json: bool,
) -> Result<()> {
    let fts = build_index(corpus)?;
    let start = std::time::Instant::now();
    let hits = fts.search_hits(query, &SearchOptions { did_you_mean });
    let took_s = start.elapsed().as_secs_f64();
    let total_hits = hits.len();
    let results: Vec<_> = hits.into_iter().take(limit).collect();

    if json {
        let out = QueryOutput { query, took_s, total_hits, results };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    for hit in &results {
        println!("{:>6}  {:.6}  {}", hit.doc_id, hit.score, preview(&hit.text, 80));
    }
    println!("{total_hits} hit(s) in {took_s:.6}s");
    Ok(())
}

fn print_stats(corpus: &CorpusArgs, top: usize) -> Result<()> {
    let fts = build_index(corpus)?;
    let stats = fts.stats();
    let built_at = stats
        .built_at
        .and_then(|t| t.format(&time::format_description::well_known::Rfc3339).ok())
        .unwrap_or_default();
    println!("state:     {}", stats.state);
    println!("documents: {}", stats.num_docs);
    for (kind, count) in &stats.sources {
        println!("  {kind:<8} {count}");
    }
    println!("terms:     {}", stats.num_terms);
    println!("built_at:  {built_at}");
    if let Some(snapshot) = fts.snapshot() {
        println!("most discriminative terms:");
        for (term, idf) in snapshot.most_discriminative(top) {
            println!("  {idf:.4}  {term}");
        }
    }
    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_flattens_and_truncates() {
        assert_eq!(preview("a\n\nb   c", 80), "a b c");
        assert_eq!(preview("abcdef", 3), "abc…");
    }
}
