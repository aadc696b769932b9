//! Comment-tree extraction and author aggregation.
//!
//! Both walks use an explicit frame stack instead of call-stack recursion so
//! arbitrarily deep reply chains cannot hit a recursion limit.

use crate::json_utils::{
    f64_or_zero, i64_or_zero, listing_children, node_data, node_kind, str_or_empty,
};
use crate::model::Comment;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

/// Listing-node kind tag for comments. Everything else ("more" placeholders,
/// post stubs) is dropped silently.
const COMMENT_KIND: &str = "t1";

fn comment_fields(data: &Value) -> Comment {
    Comment {
        id: str_or_empty(data, "id"),
        parent_id: str_or_empty(data, "parent_id"),
        name: str_or_empty(data, "name"),
        permalink: str_or_empty(data, "permalink"),
        author: str_or_empty(data, "author"),
        body: str_or_empty(data, "body"),
        created: f64_or_zero(data, "created"),
        created_utc: f64_or_zero(data, "created_utc"),
        depth_level: i64_or_zero(data, "depth"),
        controversiality: i64_or_zero(data, "controversiality"),
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
        replies: Vec::new(),
    }
}

/// Nested reply nodes of a comment, when the `replies` field is a listing
/// object. Reddit sends an empty string instead when there are none.
fn reply_children(data: &Value) -> Vec<Value> {
    data.get("replies")
        .filter(|r| r.is_object())
        .and_then(listing_children)
        .cloned()
        .unwrap_or_default()
}

struct Frame {
    items: std::vec::IntoIter<Value>,
    acc: Vec<Comment>,
    /// Comment awaiting this frame's accumulated replies; `None` for the root.
    parent: Option<Comment>,
}

/// Flatten a raw comment forest into nested [`Comment`] values.
///
/// Only `kind == "t1"` nodes are kept. Each comment's `replies` holds the
/// recursively extracted children, or stays empty.
pub fn extract_comments(raw_nodes: &[Value]) -> Vec<Comment> {
    let mut stack = vec![Frame {
        items: raw_nodes.to_vec().into_iter(),
        acc: Vec::new(),
        parent: None,
    }];

    loop {
        // The root frame is only popped at the final return, so the stack is
        // never empty here.
        let top = stack.last_mut().expect("root frame present");
        if let Some(node) = top.items.next() {
            if node_kind(&node) != Some(COMMENT_KIND) {
                continue;
            }
            let Some(data) = node_data(&node) else { continue };
            let comment = comment_fields(data);
            let kids = reply_children(data);
            if kids.is_empty() {
                top.acc.push(comment);
            } else {
                stack.push(Frame {
                    items: kids.into_iter(),
                    acc: Vec::new(),
                    parent: Some(comment),
                });
            }
        } else {
            let done = stack.pop().expect("frame just inspected");
            match done.parent {
                Some(mut comment) => {
                    comment.replies = done.acc;
                    stack
                        .last_mut()
                        .expect("child frames always have a parent frame")
                        .acc
                        .push(comment);
                }
                None => {
                    debug!(comments = done.acc.len(), "extracted comment forest");
                    return done.acc;
                }
            }
        }
    }
}

/// Collect the distinct author names appearing anywhere in the given archived
/// records, post and comment levels alike. `"[deleted]"` is dropped.
///
/// Descends through `comments` when present and non-empty, otherwise through
/// `replies` — never both. Post-level records carry `comments`, comment-level
/// records carry `replies`; if a record somehow carries both, `comments` wins.
/// That precedence is a deliberate carry-over from the original collector and
/// must not be "fixed" to merge the two.
pub fn collect_authors(records: &[Value]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<&Value> = records.iter().collect();

    while let Some(record) = stack.pop() {
        if let Some(author) = record.get("author").and_then(Value::as_str) {
            if author != "[deleted]" && !author.is_empty() {
                seen.insert(author.to_string());
            }
        }
        let comments = record.get("comments").and_then(Value::as_array);
        let children = match comments {
            Some(c) if !c.is_empty() => Some(c),
            _ => record
                .get("replies")
                .and_then(Value::as_array)
                .filter(|r| !r.is_empty()),
        };
        if let Some(children) = children {
            stack.extend(children.iter());
        }
    }

    seen.into_iter().collect()
}
