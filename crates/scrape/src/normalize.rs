//! Reduce raw actor dataset items to canonical per-channel fragments.
//!
//! Actors disagree on field naming, so every extractor tries the known
//! spellings in order. Missing fields are omitted entirely; the merge
//! rules treat absent keys as "keep what we had".

use serde_json::{json, Map, Value};

use postpilot_core::channels::Channel;

/// Keep at most this many recent posts/videos per channel.
const MAX_POSTS: usize = 10;

/// Normalize a dataset into one canonical fragment for the channel.
pub fn normalize_items(channel: Channel, items: &[Value]) -> Value {
    match channel {
        Channel::Instagram => normalize_instagram(items),
        Channel::Blog => normalize_blog(items),
        Channel::Threads => normalize_threads(items),
        Channel::Youtube => normalize_youtube(items),
    }
}

fn normalize_instagram(items: &[Value]) -> Value {
    let mut out = Map::new();
    if let Some(item) = items.first() {
        put_str(&mut out, "username", item, &["username", "userName"]);
        put_str(&mut out, "display_name", item, &["fullName", "full_name"]);
        put_str(&mut out, "bio", item, &["biography", "bio"]);
        put_i64(&mut out, "followers", item, &["followersCount", "followers"]);
        put_i64(&mut out, "following", item, &["followsCount", "following"]);
        put_i64(&mut out, "posts_count", item, &["postsCount", "posts_count"]);

        let posts: Vec<Value> = item
            .get("latestPosts")
            .and_then(Value::as_array)
            .map(|posts| {
                posts
                    .iter()
                    .take(MAX_POSTS)
                    .map(|p| {
                        let mut post = Map::new();
                        put_str(&mut post, "id", p, &["id", "shortCode"]);
                        put_str(&mut post, "url", p, &["url"]);
                        put_str(&mut post, "caption", p, &["caption"]);
                        put_i64(&mut post, "likes", p, &["likesCount", "likes"]);
                        put_i64(&mut post, "comments", p, &["commentsCount", "comments"]);
                        Value::Object(post)
                    })
                    .collect()
            })
            .unwrap_or_default();
        if !posts.is_empty() {
            out.insert("recent_posts".to_string(), json!(posts));
        }
    }
    Value::Object(out)
}

/// Blog crawlers return one item per crawled page.
fn normalize_blog(items: &[Value]) -> Value {
    let mut out = Map::new();
    let posts: Vec<Value> = items
        .iter()
        .take(MAX_POSTS)
        .filter_map(|p| {
            let mut post = Map::new();
            put_str(&mut post, "url", p, &["url", "loadedUrl"]);
            put_str(&mut post, "title", p, &["title", "pageTitle"]);
            // A page without a URL cannot be deduplicated; drop it.
            post.contains_key("url").then(|| Value::Object(post))
        })
        .collect();
    if !posts.is_empty() {
        out.insert("recent_posts".to_string(), json!(posts));
    }
    Value::Object(out)
}

fn normalize_threads(items: &[Value]) -> Value {
    let mut out = Map::new();
    if let Some(item) = items.first() {
        put_str(&mut out, "username", item, &["username", "userName"]);
        put_str(&mut out, "bio", item, &["biography", "bio"]);
        put_i64(&mut out, "followers", item, &["followersCount", "followers"]);

        let source = item
            .get("threads")
            .or_else(|| item.get("posts"))
            .and_then(Value::as_array);
        let posts: Vec<Value> = source
            .map(|posts| {
                posts
                    .iter()
                    .take(MAX_POSTS)
                    .map(|p| {
                        let mut post = Map::new();
                        put_str(&mut post, "id", p, &["id"]);
                        put_str(&mut post, "url", p, &["url"]);
                        put_str(&mut post, "text", p, &["text", "caption"]);
                        put_i64(&mut post, "likes", p, &["likesCount", "likes"]);
                        Value::Object(post)
                    })
                    .collect()
            })
            .unwrap_or_default();
        if !posts.is_empty() {
            out.insert("recent_posts".to_string(), json!(posts));
        }
    }
    Value::Object(out)
}

/// Video scrapers return one item per video, channel stats repeated on each.
fn normalize_youtube(items: &[Value]) -> Value {
    let mut out = Map::new();
    if let Some(item) = items.first() {
        put_str(&mut out, "channel_name", item, &["channelName", "channel_name"]);
        put_i64(
            &mut out,
            "subscribers",
            item,
            &["numberOfSubscribers", "subscribers"],
        );
    }
    let videos: Vec<Value> = items
        .iter()
        .take(MAX_POSTS)
        .filter_map(|v| {
            let mut video = Map::new();
            put_str(&mut video, "id", v, &["id", "videoId"]);
            put_str(&mut video, "url", v, &["url"]);
            put_str(&mut video, "title", v, &["title"]);
            put_i64(&mut video, "views", v, &["viewCount", "views"]);
            (video.contains_key("id") || video.contains_key("url"))
                .then(|| Value::Object(video))
        })
        .collect();
    if !videos.is_empty() {
        out.insert("videos".to_string(), json!(videos));
    }
    Value::Object(out)
}

/// Insert the first present string value among `keys`.
fn put_str(out: &mut Map<String, Value>, name: &str, item: &Value, keys: &[&str]) {
    for key in keys {
        if let Some(s) = item.get(key).and_then(Value::as_str) {
            if !s.is_empty() {
                out.insert(name.to_string(), json!(s));
                return;
            }
        }
    }
}

/// Insert the first present integer value among `keys`.
fn put_i64(out: &mut Map<String, Value>, name: &str, item: &Value, keys: &[&str]) {
    for key in keys {
        if let Some(n) = item.get(key).and_then(Value::as_i64) {
            out.insert(name.to_string(), json!(n));
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instagram_profile_reduces_to_canonical_shape() {
        let items = vec![json!({
            "username": "daily.cafe",
            "fullName": "데일리 카페",
            "biography": "매일 새로운 원두",
            "followersCount": 1520,
            "followsCount": 310,
            "postsCount": 87,
            "latestPosts": [
                {"id": "p1", "caption": "가을 신메뉴 출시", "likesCount": 120, "commentsCount": 8},
                {"id": "p2", "caption": "주말 이벤트", "likesCount": 95}
            ]
        })];
        let got = normalize_items(Channel::Instagram, &items);
        assert_eq!(got["username"], "daily.cafe");
        assert_eq!(got["display_name"], "데일리 카페");
        assert_eq!(got["followers"], 1520);
        let posts = got["recent_posts"].as_array().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0]["id"], "p1");
        assert_eq!(posts[1]["likes"], 95);
        // Missing comments on p2 must be omitted, not null.
        assert!(posts[1].get("comments").is_none());
    }

    #[test]
    fn blog_pages_become_posts_keyed_by_url() {
        let items = vec![
            json!({"url": "https://blog.example.com/1", "title": "신메뉴 소개"}),
            json!({"title": "주소 없는 페이지"}),
        ];
        let got = normalize_items(Channel::Blog, &items);
        let posts = got["recent_posts"].as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["url"], "https://blog.example.com/1");
    }

    #[test]
    fn youtube_items_fold_into_channel_plus_videos() {
        let items = vec![
            json!({"id": "v1", "title": "브이로그 1", "viewCount": 1000,
                   "channelName": "카페채널", "numberOfSubscribers": 5000}),
            json!({"id": "v2", "title": "브이로그 2", "viewCount": 500,
                   "channelName": "카페채널", "numberOfSubscribers": 5000}),
        ];
        let got = normalize_items(Channel::Youtube, &items);
        assert_eq!(got["channel_name"], "카페채널");
        assert_eq!(got["subscribers"], 5000);
        assert_eq!(got["videos"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn empty_dataset_yields_empty_fragment() {
        let got = normalize_items(Channel::Instagram, &[]);
        assert_eq!(got, json!({}));
    }
}
