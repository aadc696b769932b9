mod archive;
mod client;
mod comments;
mod config;
mod distributor;
mod filters;
mod http;
mod json_utils;
mod model;
mod pagination;
mod planner;
mod pipeline;
mod progress;
mod util;
mod windows;

pub use crate::config::AppConfig;
pub use crate::pipeline::{run, RunSummary};

// Transport seam and the production session, so callers (and tests) can
// inject their own.
pub use crate::http::{
    backoff_delay, is_retryable_status, HttpError, HttpSession, Transport, DEFAULT_TIMEOUT_SECS,
    MAX_ATTEMPTS, RETRYABLE_STATUSES, USER_AGENTS,
};

// Scraper surface.
pub use crate::client::{FeedCategory, RedditClient};
pub use crate::model::{ActivityKind, Comment, FeedItem, Post, SearchHit, UserActivityItem};

// Core building blocks, exposed for direct use and for the integration tests.
pub use crate::comments::{collect_authors, extract_comments};
pub use crate::distributor::{run_batch, stripes};
pub use crate::filters::{filter_by_window, to_unix, within_window};
pub use crate::pagination::{walk_listing, Page, PageDelay};
pub use crate::planner::{plan, LoadMode, LoadPlan};
pub use crate::windows::{align_down, plan_windows, Granularity, TimeWindow};

// Archive naming and IO, shared by the pipeline and the load planner.
pub use crate::archive::{
    existing_window_ends, format_ts, parse_ts, render_pattern, write_window,
};

// Listing-envelope helpers for application code working on raw records.
pub use crate::json_utils::{listing_after, listing_children, node_data, node_kind};

pub use crate::progress::make_count_progress;
pub use crate::util::init_tracing_once;
