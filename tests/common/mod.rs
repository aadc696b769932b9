#![allow(dead_code)]

use redharvest::{HttpError, Transport};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Wrap children into Reddit's listing envelope.
pub fn listing(children: Vec<Value>, after: Option<&str>) -> Value {
    json!({ "data": { "children": children, "after": after } })
}

/// A `t3` (post) listing node.
pub fn post_node(data: Value) -> Value {
    json!({ "kind": "t3", "data": data })
}

/// A `t1` (comment) listing node. `replies` becomes a nested listing when
/// non-empty, else the empty-string placeholder Reddit actually sends.
pub fn comment_node(id: &str, author: &str, depth: i64, replies: Vec<Value>) -> Value {
    let replies_field = if replies.is_empty() {
        json!("")
    } else {
        listing(replies, None)
    };
    json!({
        "kind": "t1",
        "data": {
            "id": id,
            "parent_id": format!("t1_parent_of_{id}"),
            "name": format!("t1_{id}"),
            "permalink": format!("/r/test/comments/x/{id}/"),
            "author": author,
            "body": format!("body of {id}"),
            "created": 1_704_067_200.0,
            "created_utc": 1_704_067_200.0,
            "depth": depth,
            "controversiality": 0,
            "score": 5,
            "ups": 5,
            "downs": 0,
            "upvote_ratio": 0.9,
            "gilded": 0,
            "subreddit_id": "t5_abc",
            "subreddit": "test",
            "replies": replies_field,
        }
    })
}

/// The 2-element post-details envelope: post listing, then comment forest.
pub fn post_envelope(post_data: Value, comments: Vec<Value>) -> Value {
    json!([
        listing(vec![post_node(post_data)], None),
        listing(comments, None),
    ])
}

/// Minimal post payload for the details endpoint.
pub fn post_data(id: &str, author: &str, title: &str, created_utc: f64) -> Value {
    json!({
        "id": id,
        "name": format!("t3_{id}"),
        "permalink": format!("/r/corgi/comments/{id}/slug/"),
        "author": author,
        "title": title,
        "selftext": format!("text of {id}"),
        "created": created_utc,
        "created_utc": created_utc,
        "score": 10,
        "ups": 12,
        "downs": 2,
        "upvote_ratio": 0.83,
        "gilded": 0,
        "subreddit_id": "t5_corgi",
        "subreddit": "corgi",
        "num_comments": 1,
    })
}

/// A search-result child for `/search.json`.
pub fn search_child(author: &str, title: &str, permalink: &str, created_utc: f64) -> Value {
    post_node(json!({
        "author": author,
        "title": title,
        "permalink": permalink,
        "selftext": "a description",
        "created": created_utc,
        "created_utc": created_utc,
    }))
}

/// Scripted transport: an immutable URL-to-body map. Unknown URLs answer
/// with a 404-shaped typed failure, query parameters are ignored.
#[derive(Clone)]
pub struct ScriptedTransport {
    responses: Arc<HashMap<String, Value>>,
}

impl ScriptedTransport {
    pub fn new(responses: HashMap<String, Value>) -> Self {
        Self { responses: Arc::new(responses) }
    }

    pub fn single(url: impl Into<String>, body: Value) -> Self {
        let mut map = HashMap::new();
        map.insert(url.into(), body);
        Self::new(map)
    }
}

impl Transport for ScriptedTransport {
    fn get_json(&self, url: &str, _params: &[(&str, String)]) -> Result<Value, HttpError> {
        match self.responses.get(url) {
            Some(body) => Ok(body.clone()),
            None => Err(HttpError::Status { url: url.to_string(), status: 404 }),
        }
    }
}
