//! Historical-vs-incremental load planning from on-disk archive state.

use crate::archive::{existing_window_ends, format_ts};
use anyhow::{bail, Result};
use std::fmt;
use std::path::Path;
use time::{Duration, PrimitiveDateTime};
use tracing::info;

/// Whether this run starts from the configured fixed date or resumes from the
/// newest archive already on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadMode {
    Historical,
    Incremental,
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Historical => f.write_str("HISTORICAL"),
            Self::Incremental => f.write_str("INCREMENTAL"),
        }
    }
}

/// Resolved fetch interval. Invariant: `from <= to`; a violated plan is an
/// error at construction, never a silently clamped fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadPlan {
    pub mode: LoadMode,
    pub from: PrimitiveDateTime,
    pub to: PrimitiveDateTime,
}

/// Derive the load plan for one run.
///
/// No parseable archives in `folder` means a historical load from
/// `configured_start`; otherwise an incremental load from the newest archived
/// window end. The upper bound is `now`, or the last instant of yesterday
/// when `include_today` is false (today's still-accumulating bucket stays
/// out).
pub fn plan(
    folder: &Path,
    configured_start: PrimitiveDateTime,
    now: PrimitiveDateTime,
    include_today: bool,
) -> Result<LoadPlan> {
    let resume = existing_window_ends(folder).into_iter().max();

    let (mode, from) = match resume {
        Some(latest) => (LoadMode::Incremental, latest),
        None => (LoadMode::Historical, configured_start),
    };

    let to = if include_today {
        now
    } else {
        now.date().midnight() - Duration::SECOND
    };

    if from > to {
        bail!(
            "nothing to download: resume point {} is after the end bound {}",
            format_ts(from),
            format_ts(to)
        );
    }

    info!(mode = %mode, from = %format_ts(from), to = %format_ts(to), "load plan resolved");
    Ok(LoadPlan { mode, from, to })
}
