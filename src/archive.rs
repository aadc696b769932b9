//! Per-window archive files: pattern-rendered names, atomic-enough JSON
//! snapshots, and discovery of previously written window end timestamps.
//!
//! File names embed the window bounds as ISO timestamps; the end timestamp is
//! always the final `_`-separated segment of the stem, which is what the load
//! planner parses to find its resume point.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::PrimitiveDateTime;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Timestamp layout used in archive file names, e.g. `2024-01-02T00:00:00`.
pub const TS_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Render a timestamp in the archive-name layout.
pub fn format_ts(dt: PrimitiveDateTime) -> String {
    dt.format(TS_FORMAT).unwrap_or_else(|_| dt.to_string())
}

/// Parse a timestamp in the archive-name layout.
pub fn parse_ts(s: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(s, TS_FORMAT).ok()
}

/// Substitute `{phrase}`, `{start_date}` and `{end_date}` placeholders.
pub fn render_pattern(
    pattern: &str,
    phrase: &str,
    window: Option<(PrimitiveDateTime, PrimitiveDateTime)>,
) -> String {
    let mut out = pattern.replace("{phrase}", phrase);
    if let Some((start, end)) = window {
        out = out
            .replace("{start_date}", &format_ts(start))
            .replace("{end_date}", &format_ts(end));
    }
    out
}

/// Write one window's records as a single pretty-printed JSON snapshot.
/// Each call produces a complete file; nothing is appended later.
pub fn write_window<T: Serialize>(records: &T, folder: &Path, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(folder)
        .with_context(|| format!("creating archive folder {}", folder.display()))?;
    let path = folder.join(file_name);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .with_context(|| format!("writing {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    info!(path = %path.display(), "archive written");
    Ok(path)
}

/// End timestamps of every archive already present in `folder`, unsorted.
/// Files whose names do not end in `_<ISO-timestamp>.json` are skipped.
pub fn existing_window_ends(folder: &Path) -> Vec<PrimitiveDateTime> {
    let re = Regex::new(r"_(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})\.json$")
        .expect("static pattern compiles");
    let mut ends = Vec::new();
    if !folder.exists() {
        return ends;
    }
    for entry in WalkDir::new(folder).min_depth(1).max_depth(1).into_iter().flatten() {
        let Some(name) = entry.file_name().to_str() else { continue };
        let Some(caps) = re.captures(name) else { continue };
        match parse_ts(&caps[1]) {
            Some(ts) => ends.push(ts),
            None => warn!(name, "archive name timestamp did not parse; skipped"),
        }
    }
    ends
}
