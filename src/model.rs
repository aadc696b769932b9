//! Record shapes produced by the scrapers. Every entity is immutable once
//! built and serialized as-is into the window archives.

use serde::{Deserialize, Serialize};

/// One comment in a reply tree. `depth_level` is taken from the server as
/// given (path length from the root); `replies` is always present, possibly
/// empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub parent_id: String,
    pub name: String,
    pub permalink: String,
    pub author: String,
    pub body: String,
    pub created: f64,
    pub created_utc: f64,
    pub depth_level: i64,
    pub controversiality: i64,
    pub score: i64,
    pub ups: i64,
    pub downs: i64,
    pub upvote_ratio: f64,
    pub gilded: i64,
    pub subreddit_id: String,
    pub subreddit_name: String,
    pub replies: Vec<Comment>,
}

/// A post with its fully extracted comment forest.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub name: String,
    pub permalink: String,
    pub author: String,
    pub title: String,
    pub body: String,
    pub created: f64,
    pub created_utc: f64,
    pub score: i64,
    pub ups: i64,
    pub downs: i64,
    pub upvote_ratio: f64,
    pub gilded: i64,
    pub subreddit_id: String,
    pub subreddit_name: String,
    pub num_comments: i64,
    pub comments: Vec<Comment>,
}

/// Post vs comment classification of a user-history item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Post,
    Comment,
}

/// One item of a user's submitted history. Posts and comments share this
/// superset shape: fields the other kind lacks stay at their empty/null
/// defaults rather than being dropped from the record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserActivityItem {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub subreddit: String,
    pub author: String,
    /// Post-only; empty for comments.
    pub title: String,
    /// Comment-only; empty for posts.
    pub body: String,
    pub author_flair_text: Option<String>,
    pub author_flair_css_class: Option<String>,
    pub author_flair_template_id: Option<String>,
    pub author_flair_background_color: Option<String>,
    pub author_flair_text_color: Option<String>,
    pub author_flair_type: String,
    pub author_fullname: String,
    pub author_premium: bool,
    pub author_is_blocked: bool,
    pub created: f64,
    pub created_utc: f64,
    pub url: String,
}

/// One entry of a subreddit/user feed listing. `image_url` and
/// `thumbnail_url` are genuinely optional and omitted when not derivable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub author: String,
    pub permalink: String,
    pub score: i64,
    pub num_comments: i64,
    pub created_utc: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// One search result header; `link` is the absolute post URL.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub author: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub created: f64,
    pub created_utc: f64,
}
