//! End-to-end harvest run: plan the load, search, batch-download post
//! details, bucket them into time windows, and archive each window (plus its
//! author activity when requested).

use crate::archive::{render_pattern, write_window};
use crate::client::RedditClient;
use crate::comments::collect_authors;
use crate::config::AppConfig;
use crate::distributor::run_batch;
use crate::filters::{filter_by_window, to_unix};
use crate::http::Transport;
use crate::model::UserActivityItem;
use crate::planner::{plan, LoadMode};
use crate::progress::make_count_progress;
use crate::windows::plan_windows;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use time::PrimitiveDateTime;
use tracing::{info, warn};

/// Worker progress is logged every this many completed downloads.
const PROGRESS_EVERY: usize = 10;

/// What one run accomplished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: LoadMode,
    pub posts_downloaded: usize,
    pub windows_written: usize,
    pub authors_downloaded: usize,
}

/// Run the full harvest for `phrase`.
///
/// `make_client` builds one client per caller: the orchestrator gets one for
/// the sequential phases, and every fan-out worker builds its own so no
/// session is shared across threads.
pub fn run<T, F>(
    config: &AppConfig,
    phrase: &str,
    now: PrimitiveDateTime,
    make_client: F,
) -> Result<RunSummary>
where
    T: Transport,
    F: Fn() -> RedditClient<T> + Sync,
{
    let granularity = config.granularity()?;
    let configured_start = config.start_datetime()?;

    let posts_folder = render_pattern(&config.posts_folder_pattern, phrase, None);
    let authors_folder = render_pattern(&config.authors_folder_pattern, phrase, None);

    let load = plan(
        Path::new(&posts_folder),
        configured_start,
        now,
        config.include_today,
    )?;

    let client = make_client();

    info!(phrase, limit = config.limit, "searching");
    let mut hits = client
        .search(phrase, config.limit, None, None)
        .with_context(|| format!("searching for '{phrase}'"))?;

    // An incremental run only wants results newer than what is already
    // archived: from <= created_utc < to.
    if load.mode == LoadMode::Incremental {
        let (lo, hi) = (to_unix(load.from), to_unix(load.to));
        hits.retain(|h| {
            let ts = h.created_utc as i64;
            ts >= lo && ts < hi
        });
    }

    let permalinks: Vec<String> = hits
        .iter()
        .filter_map(|h| {
            h.link
                .split_once(config.website_url.as_str())
                .map(|(_, path)| path.to_string())
        })
        .collect();
    info!(results = permalinks.len(), mode = %load.mode, "download set resolved");

    let workers = config.worker_count.max(1);
    let fan_out = config.use_workers && permalinks.len() >= workers * workers;

    let posts: Vec<Value> = if fan_out {
        run_batch(&permalinks, workers, |idx, stripe| {
            let worker_client = make_client();
            download_posts(&worker_client, idx, &stripe)
        })
    } else {
        let pb = make_count_progress(permalinks.len() as u64, "posts");
        let mut out = Vec::new();
        for permalink in &permalinks {
            if let Some(value) = post_value(&client, 0, permalink) {
                out.push(value);
            }
            pb.inc(1);
        }
        pb.finish_and_clear();
        out
    };
    info!(downloaded = posts.len(), "post details downloaded");

    let mut summary = RunSummary {
        mode: load.mode,
        posts_downloaded: posts.len(),
        windows_written: 0,
        authors_downloaded: 0,
    };

    for window in plan_windows(load.from, load.to, granularity) {
        let records = filter_by_window(&posts, window.start, window.end);
        let file_name = render_pattern(
            &config.posts_file_pattern,
            phrase,
            Some((window.start, window.end)),
        );
        write_window(&records, Path::new(&posts_folder), &file_name)?;
        summary.windows_written += 1;

        if !config.download_authors {
            continue;
        }

        let authors = collect_authors(&records);
        info!(
            authors = authors.len(),
            window = ?window,
            "downloading author activity"
        );

        let author_fan_out = config.use_workers && authors.len() >= workers * workers;
        let details: Vec<Vec<UserActivityItem>> = if author_fan_out {
            run_batch(&authors, workers, |idx, stripe| {
                let worker_client = make_client();
                download_authors(&worker_client, idx, &stripe)
            })
        } else {
            let pb = make_count_progress(authors.len() as u64, "authors");
            let mut out = Vec::new();
            for name in &authors {
                out.push(client.fetch_user_activity(name, 1));
                pb.inc(1);
            }
            pb.finish_and_clear();
            out
        };
        summary.authors_downloaded += details.len();

        let file_name = render_pattern(
            &config.authors_file_pattern,
            phrase,
            Some((window.start, window.end)),
        );
        write_window(&details, Path::new(&authors_folder), &file_name)?;
    }

    info!(
        windows = summary.windows_written,
        posts = summary.posts_downloaded,
        authors = summary.authors_downloaded,
        "run finished"
    );
    Ok(summary)
}

fn post_value<T: Transport>(
    client: &RedditClient<T>,
    worker: usize,
    permalink: &str,
) -> Option<Value> {
    let post = client.fetch_post(permalink)?;
    match serde_json::to_value(&post) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(worker = worker + 1, permalink, error = %err, "post serialization failed");
            None
        }
    }
}

/// One worker's stripe of post downloads. Failures are skipped, never fatal.
fn download_posts<T: Transport>(
    client: &RedditClient<T>,
    worker: usize,
    permalinks: &[String],
) -> Vec<Value> {
    info!(worker = worker + 1, items = permalinks.len(), "post download stripe started");
    let mut out = Vec::new();
    for permalink in permalinks {
        match post_value(client, worker, permalink) {
            Some(value) => out.push(value),
            None => warn!(worker = worker + 1, permalink = %permalink, "post skipped"),
        }
        if !out.is_empty() && out.len() % PROGRESS_EVERY == 0 {
            info!(
                worker = worker + 1,
                downloaded = out.len(),
                total = permalinks.len(),
                "post download progress"
            );
        }
    }
    info!(worker = worker + 1, downloaded = out.len(), "post download stripe finished");
    out
}

/// One worker's stripe of author-activity downloads, one record list per
/// author.
fn download_authors<T: Transport>(
    client: &RedditClient<T>,
    worker: usize,
    names: &[String],
) -> Vec<Vec<UserActivityItem>> {
    info!(worker = worker + 1, items = names.len(), "author download stripe started");
    let mut out = Vec::new();
    for name in names {
        out.push(client.fetch_user_activity(name, 1));
        if !out.is_empty() && out.len() % PROGRESS_EVERY == 0 {
            info!(
                worker = worker + 1,
                downloaded = out.len(),
                total = names.len(),
                "author download progress"
            );
        }
    }
    info!(worker = worker + 1, downloaded = out.len(), "author download stripe finished");
    out
}
