//! Upstream payload fixtures and mock server setup

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Path the mock market API answers on
pub const MARKET_PATH: &str = "/itemapi/itemdetails";
/// Path the mock thumbnails API answers on
pub const THUMBNAIL_PATH: &str = "/v1/assets";
/// Path prefix the mock CDN serves images from
pub const CDN_PREFIX: &str = "/cdn";

/// Bytes served as every thumbnail image
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nlimited-thumbnail";

/// The single-item market response used by the end-to-end example
pub fn cool_hat_market() -> Value {
    json!({
        "success": true,
        "item_count": 1,
        "items": {
            "42": ["Cool Hat", "CH", 150, 300, 300, 1, 0, 0, 0, 0]
        }
    })
}

/// A market response with mixed field quality, in a deliberate non-sorted order
pub fn mixed_market() -> Value {
    json!({
        "success": true,
        "item_count": 4,
        "items": {
            "1029025": ["The Classic ROBLOX Fedora", "CF", 1234, 5000, 5000, 2, 2, -1, -1, -1],
            "20573078": ["Shaggy", "", "12,500", "n/a", -1, -1, -1, -1, -1, -1],
            "100": ["", "", null, null, -1, -1, -1, -1, -1, -1],
            "5": "not-an-array"
        }
    })
}

/// A market response with `count` items named `Item #<n>`, ids 10001..
pub fn large_market(count: usize) -> Value {
    let items: serde_json::Map<String, Value> = (1..=count)
        .map(|n| {
            (
                (10_000 + n).to_string(),
                json!([format!("Item #{n}"), "", n * 10, n * 20, 0, 0, 0, 0, 0, 0]),
            )
        })
        .collect();
    json!({ "success": true, "items": items })
}

/// Answers every thumbnail request by resolving each requested id to a CDN URL
/// on `cdn_base`, except ids listed in `unresolved`.
pub struct ThumbnailEcho {
    /// Base URL of the CDN (usually the same mock server)
    pub cdn_base: String,
    /// Ids the API reports as blocked
    pub unresolved: Vec<String>,
}

impl Respond for ThumbnailEcho {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let data: Vec<Value> = requested_asset_ids(request)
            .into_iter()
            .map(|id| {
                if self.unresolved.contains(&id) {
                    json!({ "targetId": id.parse::<u64>().unwrap_or(0), "state": "Blocked", "imageUrl": null })
                } else {
                    json!({
                        "targetId": id.parse::<u64>().unwrap_or(0),
                        "state": "Completed",
                        "imageUrl": format!("{}{}/{}.png", self.cdn_base, CDN_PREFIX, id),
                    })
                }
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
    }
}

/// The comma-separated `assetIds` of a thumbnail request
pub fn requested_asset_ids(request: &Request) -> Vec<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == "assetIds")
        .map(|(_, v)| v.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

/// Mount the market endpoint answering with `body`
pub async fn mount_market(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(MARKET_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount the thumbnails endpoint resolving every id except `unresolved`
pub async fn mount_thumbnails(server: &MockServer, unresolved: &[&str]) {
    Mock::given(method("GET"))
        .and(path(THUMBNAIL_PATH))
        .respond_with(ThumbnailEcho {
            cdn_base: server.uri(),
            unresolved: unresolved.iter().map(|s| s.to_string()).collect(),
        })
        .mount(server)
        .await;
}

/// Mount a CDN route serving [`PNG_BYTES`] for any image
pub async fn mount_cdn(server: &MockServer) {
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(format!(r"^{CDN_PREFIX}/.+\.png$")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES))
        .mount(server)
        .await;
}

/// Count requests received on `route`
pub async fn requests_to(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().starts_with(route))
        .count()
}
