//! Immutable run configuration, read once at startup from a JSON file.

use crate::windows::Granularity;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

fn default_timeout_secs() -> u64 {
    crate::http::DEFAULT_TIMEOUT_SECS
}

/// One snapshot of the application parameters. Folder and file patterns may
/// use `{phrase}`, and file patterns additionally `{start_date}`/`{end_date}`.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Maximum number of search results to harvest per run.
    pub limit: usize,
    /// Window granularity: "h", "d", "m" or "y".
    pub interval: String,
    /// Historical-load start, `YYYY-MM-DD`.
    pub start_date: String,
    pub website_url: String,
    pub posts_folder_pattern: String,
    pub authors_folder_pattern: String,
    pub posts_file_pattern: String,
    pub authors_file_pattern: String,
    /// Also download each window's author activity.
    pub download_authors: bool,
    /// When false, the still-accumulating current day is excluded.
    pub include_today: bool,
    /// Fan batch downloads out across worker threads.
    pub use_workers: bool,
    pub worker_count: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("opening config {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Configured historical start as a midnight timestamp.
    pub fn start_datetime(&self) -> Result<PrimitiveDateTime> {
        let date = Date::parse(&self.start_date, format_description!("[year]-[month]-[day]"))
            .with_context(|| format!("invalid start_date '{}'", self.start_date))?;
        Ok(date.midnight())
    }

    /// Parsed window granularity; unknown values are a configuration error.
    pub fn granularity(&self) -> Result<Granularity> {
        self.interval.parse()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            interval: "d".to_string(),
            start_date: "2024-01-01".to_string(),
            website_url: "https://www.reddit.com".to_string(),
            posts_folder_pattern: "reddits_{phrase}".to_string(),
            authors_folder_pattern: "authors_{phrase}".to_string(),
            posts_file_pattern: "reddits_{phrase}_{start_date}_{end_date}.json".to_string(),
            authors_file_pattern: "authors_{phrase}_{start_date}_{end_date}.json".to_string(),
            download_authors: false,
            include_today: true,
            use_workers: false,
            worker_count: 4,
            timeout_secs: default_timeout_secs(),
        }
    }
}
