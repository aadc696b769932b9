//! Generic cursor walk over paginated listing endpoints.

use crate::http::HttpError;
use rand::Rng;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// One fetched page: its items and the forward cursor, if any.
pub struct Page {
    pub items: Vec<Value>,
    pub after: Option<String>,
}

/// Politeness delay bounds between two page fetches.
#[derive(Clone, Copy, Debug)]
pub struct PageDelay {
    pub min: Duration,
    pub max: Duration,
}

impl PageDelay {
    /// Default 1–2 s uniform delay between pages.
    pub fn polite() -> Self {
        Self { min: Duration::from_secs(1), max: Duration::from_secs(2) }
    }

    /// No delay (tests).
    pub fn none() -> Self {
        Self { min: Duration::ZERO, max: Duration::ZERO }
    }

    fn sleep(self) {
        if self.max.is_zero() {
            return;
        }
        let span = self.max.saturating_sub(self.min);
        let jitter = if span.is_zero() {
            Duration::ZERO
        } else {
            rand::thread_rng().gen_range(Duration::ZERO..span)
        };
        std::thread::sleep(self.min + jitter);
    }
}

/// Walk pages until `limit` items are collected, the endpoint stops handing
/// out a cursor, or a page comes back empty. Never returns more than `limit`
/// items; the final page's overshoot is discarded.
///
/// `fetch` receives the cursor from the previous page (`None` on the first
/// call). A fetch failure mid-walk ends the walk and returns everything
/// collected so far — partial data is preferred over none.
///
/// The politeness delay runs strictly between two fetches: not before the
/// first and not after the last.
pub fn walk_listing<F>(limit: usize, delay: PageDelay, mut fetch: F) -> Vec<Value>
where
    F: FnMut(Option<&str>) -> Result<Page, HttpError>,
{
    let mut collected: Vec<Value> = Vec::new();
    let mut after: Option<String> = None;
    let mut page_no = 0usize;

    while collected.len() < limit {
        if page_no > 0 {
            delay.sleep();
        }
        page_no += 1;

        let page = match fetch(after.as_deref()) {
            Ok(page) => page,
            Err(err) => {
                warn!(page = page_no, error = %err, "page fetch failed; keeping partial results");
                break;
            }
        };

        if page.items.is_empty() {
            debug!(page = page_no, "empty page; stopping walk");
            break;
        }

        let room = limit - collected.len();
        let taken = page.items.len().min(room);
        collected.extend(page.items.into_iter().take(room));
        debug!(page = page_no, taken, total = collected.len(), "page collected");

        after = page.after;
        if after.is_none() {
            break;
        }
    }

    collected
}
