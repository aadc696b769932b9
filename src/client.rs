//! Reddit endpoint scrapers: phrase search, post details with the full
//! comment forest, user activity histories, and subreddit/user feeds.
//!
//! Single-item failures are swallowed here: they are logged and surface only
//! as a `None` result or a shorter list. Configuration errors (an invalid
//! feed category) are raised before any request is made.

use crate::comments::extract_comments;
use crate::http::{HttpError, Transport};
use crate::json_utils::{
    f64_or_zero, i64_or_zero, listing_after, listing_children, node_data, node_kind, str_or_empty,
    str_or_null,
};
use crate::model::{ActivityKind, Comment, FeedItem, Post, SearchHit, UserActivityItem};
use crate::pagination::{walk_listing, Page, PageDelay};
use anyhow::{bail, Result};
use serde_json::Value;
use std::str::FromStr;
use tracing::{info, warn};

/// Search result descriptions are clipped to this many characters.
const DESCRIPTION_CLIP: usize = 269;

/// Feed listing pages are capped at the API's maximum page size.
const MAX_PAGE_SIZE: usize = 100;

/// Closed set of feed orderings. The `user*` variants read a user's
/// submitted listing instead of a subreddit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedCategory {
    Hot,
    Top,
    New,
    UserHot,
    UserTop,
    UserNew,
}

impl FromStr for FeedCategory {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hot" => Ok(Self::Hot),
            "top" => Ok(Self::Top),
            "new" => Ok(Self::New),
            "userhot" => Ok(Self::UserHot),
            "usertop" => Ok(Self::UserTop),
            "usernew" => Ok(Self::UserNew),
            other => bail!(
                "invalid feed category '{other}'; subreddits take 'hot', 'top' or 'new', \
                 users take 'userhot', 'usertop' or 'usernew'"
            ),
        }
    }
}

impl FeedCategory {
    fn path(self, target: &str) -> String {
        match self {
            Self::Hot => format!("/r/{target}/hot.json"),
            Self::Top => format!("/r/{target}/top.json"),
            Self::New => format!("/r/{target}/new.json"),
            Self::UserHot => format!("/user/{target}/submitted/hot.json"),
            Self::UserTop => format!("/user/{target}/submitted/top.json"),
            Self::UserNew => format!("/user/{target}/submitted/new.json"),
        }
    }
}

/// All scrapers share one transport session and one politeness-delay setting.
pub struct RedditClient<T: Transport> {
    transport: T,
    base_url: String,
    page_delay: PageDelay,
}

impl<T: Transport> RedditClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            page_delay: PageDelay::polite(),
        }
    }

    pub fn with_page_delay(mut self, delay: PageDelay) -> Self {
        self.page_delay = delay;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn fetch_page(&self, url: &str, params: &[(&str, String)]) -> Result<Page, HttpError> {
        let body = self.transport.get_json(url, params)?;
        let items = listing_children(&body).cloned().unwrap_or_default();
        let after = listing_after(&body);
        Ok(Page { items, after })
    }

    /// Site-wide phrase search, one page, relevance-sorted links.
    /// A failed search is an error, not an empty result set.
    pub fn search(
        &self,
        query: &str,
        limit: usize,
        after: Option<&str>,
        before: Option<&str>,
    ) -> Result<Vec<SearchHit>, HttpError> {
        let mut params = vec![
            ("q", query.to_string()),
            ("limit", limit.to_string()),
            ("sort", "relevance".to_string()),
            ("type", "link".to_string()),
        ];
        self.run_search(&self.url("/search.json"), &mut params, after, before)
    }

    /// Phrase search restricted to one subreddit.
    pub fn search_subreddit(
        &self,
        subreddit: &str,
        query: &str,
        limit: usize,
        after: Option<&str>,
        before: Option<&str>,
    ) -> Result<Vec<SearchHit>, HttpError> {
        let mut params = vec![
            ("q", query.to_string()),
            ("limit", limit.to_string()),
            ("sort", "relevance".to_string()),
            ("type", "link".to_string()),
            ("restrict_sr", "on".to_string()),
        ];
        self.run_search(&self.url(&format!("/r/{subreddit}/search.json")), &mut params, after, before)
    }

    fn run_search(
        &self,
        url: &str,
        params: &mut Vec<(&str, String)>,
        after: Option<&str>,
        before: Option<&str>,
    ) -> Result<Vec<SearchHit>, HttpError> {
        if let Some(after) = after {
            params.push(("after", after.to_string()));
        }
        if let Some(before) = before {
            params.push(("before", before.to_string()));
        }
        let body = self.transport.get_json(url, params)?;
        let hits: Vec<SearchHit> = listing_children(&body)
            .map(|children| {
                children
                    .iter()
                    .filter_map(node_data)
                    .map(|data| self.search_hit(data))
                    .collect()
            })
            .unwrap_or_default();
        info!(results = hits.len(), "search returned");
        Ok(hits)
    }

    fn search_hit(&self, data: &Value) -> SearchHit {
        SearchHit {
            author: str_or_empty(data, "author"),
            title: str_or_empty(data, "title"),
            link: self.url(&str_or_empty(data, "permalink")),
            description: clip_chars(&str_or_empty(data, "selftext"), DESCRIPTION_CLIP),
            created: f64_or_zero(data, "created"),
            created_utc: f64_or_zero(data, "created_utc"),
        }
    }

    /// One post with its complete comment forest, or `None` on any failure.
    ///
    /// The endpoint returns a 2-element envelope: post listing, then comment
    /// forest. Anything shaped differently counts as a single-item failure.
    pub fn fetch_post(&self, permalink: &str) -> Option<Post> {
        let url = self.url(&format!("{permalink}.json"));
        let body = match self.transport.get_json(&url, &[]) {
            Ok(body) => body,
            Err(err) => {
                warn!(permalink, error = %err, "post fetch failed");
                return None;
            }
        };

        let sections = match body.as_array() {
            Some(sections) if sections.len() >= 2 => sections,
            _ => {
                warn!(permalink, "unexpected post envelope shape");
                return None;
            }
        };
        let main = listing_children(&sections[0])
            .and_then(|children| children.first())
            .and_then(node_data)?;

        let comments = listing_children(&sections[1])
            .map(|children| extract_comments(children))
            .unwrap_or_default();

        let post = post_fields(main, comments);
        info!(permalink, title = %post.title, "post scraped");
        Some(post)
    }

    /// Up to `limit` items of a user's submitted history, newest first.
    /// Partial results on mid-walk failure.
    pub fn fetch_user_activity(&self, username: &str, limit: usize) -> Vec<UserActivityItem> {
        let url = self.url(&format!("/user/{username}/.json"));
        let items = walk_listing(limit, self.page_delay, |after| {
            let mut params = vec![("limit", limit.to_string())];
            if let Some(after) = after {
                params.push(("after", after.to_string()));
            }
            self.fetch_page(&url, &params)
        });

        items
            .iter()
            .filter_map(|node| {
                let kind = node_kind(node)?;
                let data = node_data(node)?;
                self.activity_item(kind, data)
            })
            .collect()
    }

    fn activity_item(&self, kind: &str, data: &Value) -> Option<UserActivityItem> {
        let kind = match kind {
            "t3" => ActivityKind::Post,
            "t1" => ActivityKind::Comment,
            _ => return None,
        };
        Some(UserActivityItem {
            kind,
            subreddit: str_or_empty(data, "subreddit"),
            author: str_or_empty(data, "author"),
            title: str_or_empty(data, "title"),
            body: str_or_empty(data, "body"),
            author_flair_text: str_or_null(data, "author_flair_text"),
            author_flair_css_class: str_or_null(data, "author_flair_css_class"),
            author_flair_template_id: str_or_null(data, "author_flair_template_id"),
            author_flair_background_color: str_or_null(data, "author_flair_background_color"),
            author_flair_text_color: str_or_null(data, "author_flair_text_color"),
            author_flair_type: str_or_empty(data, "author_flair_type"),
            author_fullname: str_or_empty(data, "author_fullname"),
            author_premium: data.get("author_premium").and_then(Value::as_bool).unwrap_or(false),
            author_is_blocked: data
                .get("author_is_blocked")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            created: f64_or_zero(data, "created"),
            created_utc: f64_or_zero(data, "created_utc"),
            url: self.url(&str_or_empty(data, "permalink")),
        })
    }

    /// Up to `limit` entries of a subreddit or user feed, paged at
    /// `min(100, limit)`. Partial results on mid-walk failure.
    pub fn fetch_feed(
        &self,
        target: &str,
        limit: usize,
        category: FeedCategory,
        time_filter: &str,
    ) -> Vec<FeedItem> {
        let url = self.url(&category.path(target));
        let page_size = limit.min(MAX_PAGE_SIZE);
        info!(target, limit, category = ?category, time_filter, "fetching feed");

        let items = walk_listing(limit, self.page_delay, |after| {
            let mut params = vec![
                ("limit", page_size.to_string()),
                ("raw_json", "1".to_string()),
                ("t", time_filter.to_string()),
            ];
            if let Some(after) = after {
                params.push(("after", after.to_string()));
            }
            self.fetch_page(&url, &params)
        });

        items.iter().filter_map(node_data).map(feed_item).collect()
    }
}

fn post_fields(data: &Value, comments: Vec<Comment>) -> Post {
    Post {
        id: str_or_empty(data, "id"),
        name: str_or_empty(data, "name"),
        permalink: str_or_empty(data, "permalink"),
        author: str_or_empty(data, "author"),
        title: str_or_empty(data, "title"),
        body: str_or_empty(data, "selftext"),
        created: f64_or_zero(data, "created"),
        created_utc: f64_or_zero(data, "created_utc"),
        score: i64_or_zero(data, "score"),
        ups: i64_or_zero(data, "ups"),
        downs: i64_or_zero(data, "downs"),
        upvote_ratio: data
            .get("upvote_ratio")
            .and_then(Value::as_f64)
            .unwrap_or(1.0),
        gilded: i64_or_zero(data, "gilded"),
        subreddit_id: str_or_empty(data, "subreddit_id"),
        subreddit_name: str_or_empty(data, "subreddit"),
        num_comments: i64_or_zero(data, "num_comments"),
        comments,
    }
}

/// Direct image hint wins over the nested preview source; the `"self"`
/// thumbnail sentinel means "no thumbnail".
fn feed_item(data: &Value) -> FeedItem {
    let image_url = if data.get("post_hint").and_then(Value::as_str) == Some("image") {
        str_or_null(data, "url")
    } else {
        None
    }
    .or_else(|| preview_image_url(data));

    let thumbnail_url = str_or_null(data, "thumbnail").filter(|t| t != "self");

    FeedItem {
        title: str_or_empty(data, "title"),
        author: str_or_empty(data, "author"),
        permalink: str_or_empty(data, "permalink"),
        score: i64_or_zero(data, "score"),
        num_comments: i64_or_zero(data, "num_comments"),
        created_utc: f64_or_zero(data, "created_utc"),
        image_url,
        thumbnail_url,
    }
}

fn preview_image_url(data: &Value) -> Option<String> {
    data.get("preview")?
        .get("images")?
        .as_array()?
        .first()?
        .get("source")?
        .get("url")?
        .as_str()
        .map(str::to_string)
}

/// Truncate at a character boundary; byte slicing could split a code point.
fn clip_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
