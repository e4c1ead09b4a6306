mod classify;
mod config;
mod extract;
mod fetch;
mod models;
mod normalize;
mod pipeline;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;

use classify::ClassifierRules;
use config::Config;
use extract::ListingExtractor;
use fetch::PageFetcher;
use normalize::Normalizer;
use pipeline::{persist, screen, RateGate, ScrapeStats};
use store::JobStore;

const LISTING_URL: &str = "https://remoteok.io/remote-dev-jobs";

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Scrape worldwide-friendly remote jobs into the shared jobs table")]
struct Cli {
    /// Listing page to scrape
    #[arg(long, default_value = LISTING_URL)]
    url: String,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Pause between inserts, in milliseconds
    #[arg(long, default_value_t = 100)]
    insert_gap_ms: u64,

    /// Show what would be inserted without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env.local wins over .env when both exist.
    if dotenvy::from_filename(".env.local").is_err() {
        dotenvy::dotenv().ok();
    }

    let config = Config::from_env()?;
    let fetcher = PageFetcher::new(cli.timeout)?;
    let extractor = ListingExtractor::new()?;
    let rules = ClassifierRules::default();
    let normalizer = Normalizer::new()?;
    let store = JobStore::new(&config)?;

    println!("Fetching {} ...", cli.url);
    let page = fetcher
        .fetch(&cli.url)
        .context("Failed to fetch listing page")?;
    println!("Fetched {} bytes (HTTP {})", page.body.len(), page.status);

    let candidates = extractor.extract(&page.body);
    let jobs = screen(&candidates, &rules, &normalizer);

    let mut stats = ScrapeStats {
        seen: candidates.len(),
        eligible: jobs.len(),
        ..ScrapeStats::default()
    };

    println!("Candidates found: {}", stats.seen);
    println!(
        "Worldwide-eligible: {} ({} filtered out as location-specific)",
        stats.eligible,
        stats.seen - stats.eligible
    );

    if jobs.is_empty() {
        println!("No worldwide-eligible jobs this run.");
        return Ok(());
    }

    println!("Uploading {} jobs...", jobs.len());
    let mut gate = RateGate::new(Duration::from_millis(cli.insert_gap_ms));
    let (inserted, failed) = persist(jobs, &store, &normalizer, &mut gate, cli.dry_run);
    stats.inserted = inserted;
    stats.failed = failed;

    println!("\nResults:");
    println!("  Candidates seen: {}", stats.seen);
    println!("  Eligible:        {}", stats.eligible);
    println!("  Inserted:        {}", stats.inserted);
    println!("  Failed:          {}", stats.failed);

    if cli.dry_run {
        println!("\n(Dry run - no jobs were actually inserted)");
    }

    Ok(())
}
