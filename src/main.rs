use anyhow::{bail, Result};
use redharvest::{init_tracing_once, AppConfig, HttpSession, RedditClient};
use std::path::PathBuf;
use std::time::Duration;
use time::{OffsetDateTime, PrimitiveDateTime};

const DEFAULT_CONFIG: &str = "config.json";

fn now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

fn main() -> Result<()> {
    init_tracing_once();

    let mut args = std::env::args().skip(1);
    let Some(phrase) = args.next() else {
        bail!("usage: redharvest <phrase> [config.json]");
    };
    let config_path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string()));

    let config = AppConfig::load(&config_path)?;

    println!("---- Reddit harvester ----\n");
    println!("Searched phrase: {phrase}");
    println!("Max searched: {}", config.limit);
    println!("Date interval: {}", config.interval);
    println!("Download author details: {}", config.download_authors);
    println!("Include today: {}", config.include_today);
    println!("Use workers: {}", config.use_workers);
    println!("Number of workers: {}\n", config.worker_count);

    let timeout = Duration::from_secs(config.timeout_secs);
    let base_url = config.website_url.clone();
    let summary = redharvest::run(&config, &phrase, now_utc(), || {
        RedditClient::new(HttpSession::new(timeout), base_url.clone())
    })?;

    println!(
        "\nDone. {} load: {} posts across {} windows, {} author records.",
        summary.mode, summary.posts_downloaded, summary.windows_written, summary.authors_downloaded
    );
    Ok(())
}
