// src/services/resolvers.rs

//! Embed resolvers.
//!
//! Each resolver recognizes URLs of one platform and resolves the
//! attributes needed to render an embed. All network calls go through the
//! shared [`RateLimitedQueue`].

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{EmbedConfig, Platform};
use crate::services::RateLimitedQueue;
use crate::utils::http::fetch_json;

/// A resolved `name = value` attribute to attach to an embed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedAttribute {
    pub name: String,
    pub value: String,
}

impl EmbedAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Platform-specific embed resolution.
#[async_trait]
pub trait EmbedResolver: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether this resolver handles the URL. Pure string match.
    fn can_handle(&self, url: &str) -> bool;

    /// Resolve the attributes for the URL.
    async fn resolve(&self, url: &str) -> Result<Vec<EmbedAttribute>>;
}

/// Ordered resolver list; the first resolver that handles a URL wins.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: Vec<Box<dyn EmbedResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the Bluesky and TikTok resolvers, in that order.
    pub fn with_defaults(client: &Client, queue: &RateLimitedQueue, config: &EmbedConfig) -> Self {
        Self::new()
            .with(BlueskyResolver::new(
                client.clone(),
                queue.clone(),
                &config.bluesky_resolve_url,
            ))
            .with(TikTokResolver::new(
                client.clone(),
                queue.clone(),
                &config.tiktok_oembed_url,
            ))
    }

    /// Append a resolver at the lowest priority.
    pub fn with(mut self, resolver: impl EmbedResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// First resolver handling the URL.
    pub fn select(&self, url: &str) -> Option<&dyn EmbedResolver> {
        self.resolvers
            .iter()
            .find(|r| r.can_handle(url))
            .map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

// --- Bluesky ---

fn post_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/profile/([^/?#]+)/post/([^/?#]+)").expect("valid bluesky post pattern")
    })
}

/// Split a Bluesky post URL into `(handle, record key)`.
pub fn parse_bluesky_post(url: &str) -> Option<(String, String)> {
    let caps = post_pattern().captures(url)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

#[derive(Debug, Deserialize)]
struct ResolveHandleResponse {
    #[serde(default)]
    did: String,
}

/// Resolves a post's author handle to a DID and builds the post's AT URI.
///
/// Attributes: `did`, `uri` (`at://<did>/app.bsky.feed.post/<rkey>`).
pub struct BlueskyResolver {
    client: Client,
    queue: RateLimitedQueue,
    endpoint: Arc<str>,
}

impl BlueskyResolver {
    pub fn new(client: Client, queue: RateLimitedQueue, endpoint: &str) -> Self {
        Self {
            client,
            queue,
            endpoint: Arc::from(endpoint),
        }
    }

    async fn resolve_handle(&self, handle: &str) -> Result<String> {
        let client = self.client.clone();
        let endpoint = Arc::clone(&self.endpoint);
        let handle = handle.to_string();

        let response: ResolveHandleResponse = self
            .queue
            .submit(move || async move {
                fetch_json(&client, &endpoint, &[("handle", handle.as_str())]).await
            })
            .await?;

        Ok(response.did)
    }
}

#[async_trait]
impl EmbedResolver for BlueskyResolver {
    fn name(&self) -> &'static str {
        "bluesky"
    }

    fn can_handle(&self, url: &str) -> bool {
        Platform::classify(url) == Platform::Bluesky
    }

    async fn resolve(&self, url: &str) -> Result<Vec<EmbedAttribute>> {
        let (handle, rkey) = parse_bluesky_post(url)
            .ok_or_else(|| AppError::resolution(url, "URL is not a Bluesky post link"))?;

        let did = self
            .resolve_handle(&handle)
            .await
            .map_err(|e| AppError::resolution(url, format!("handle '{handle}': {e}")))?;

        if did.trim().is_empty() {
            return Err(AppError::resolution(
                url,
                format!("handle '{handle}' resolved to an empty DID"),
            ));
        }

        let uri = format!("at://{did}/app.bsky.feed.post/{rkey}");
        Ok(vec![EmbedAttribute::new("did", did), EmbedAttribute::new("uri", uri)])
    }
}

// --- TikTok ---

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    #[serde(default)]
    html: String,
}

/// Fetches embeddable markup from the TikTok oEmbed endpoint.
///
/// Attributes: `html`.
pub struct TikTokResolver {
    client: Client,
    queue: RateLimitedQueue,
    endpoint: Arc<str>,
}

impl TikTokResolver {
    pub fn new(client: Client, queue: RateLimitedQueue, endpoint: &str) -> Self {
        Self {
            client,
            queue,
            endpoint: Arc::from(endpoint),
        }
    }
}

#[async_trait]
impl EmbedResolver for TikTokResolver {
    fn name(&self) -> &'static str {
        "tiktok"
    }

    fn can_handle(&self, url: &str) -> bool {
        Platform::classify(url) == Platform::TikTok
    }

    async fn resolve(&self, url: &str) -> Result<Vec<EmbedAttribute>> {
        let client = self.client.clone();
        let endpoint = Arc::clone(&self.endpoint);
        let target = url.to_string();

        let response: OEmbedResponse = self
            .queue
            .submit(move || async move {
                fetch_json(&client, &endpoint, &[("url", target.as_str())]).await
            })
            .await
            .map_err(|e| AppError::resolution(url, e))?;

        if response.html.trim().is_empty() {
            return Err(AppError::resolution(url, "oEmbed response has no html"));
        }

        Ok(vec![EmbedAttribute::new("html", response.html)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BSKY_POST: &str = "https://bsky.app/profile/maker.bsky.social/post/3kabc123";
    const TIKTOK_POST: &str = "https://www.tiktok.com/@maker/video/7300000000000000000";

    fn registry(server_uri: &str) -> ResolverRegistry {
        let queue = RateLimitedQueue::new(Duration::from_millis(1));
        let config = EmbedConfig {
            bluesky_resolve_url: format!("{server_uri}/resolveHandle"),
            tiktok_oembed_url: format!("{server_uri}/oembed"),
        };
        ResolverRegistry::with_defaults(&Client::new(), &queue, &config)
    }

    #[test]
    fn test_parse_bluesky_post() {
        assert_eq!(
            parse_bluesky_post(BSKY_POST),
            Some(("maker.bsky.social".to_string(), "3kabc123".to_string()))
        );
        assert_eq!(parse_bluesky_post("https://bsky.app/profile/maker.bsky.social"), None);
    }

    #[test]
    fn test_dispatch_is_first_match() {
        let registry = registry("http://127.0.0.1:9");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.select(BSKY_POST).map(|r| r.name()), Some("bluesky"));
        assert_eq!(registry.select(TIKTOK_POST).map(|r| r.name()), Some("tiktok"));
        assert!(registry.select("https://example.com/post").is_none());
    }

    #[tokio::test]
    async fn test_bluesky_resolves_did_and_uri() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resolveHandle"))
            .and(query_param("handle", "maker.bsky.social"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"did": "did:plc:abc"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let registry = registry(&server.uri());
        let attrs = registry.select(BSKY_POST).unwrap().resolve(BSKY_POST).await.unwrap();

        assert_eq!(
            attrs,
            vec![
                EmbedAttribute::new("did", "did:plc:abc"),
                EmbedAttribute::new("uri", "at://did:plc:abc/app.bsky.feed.post/3kabc123"),
            ]
        );
    }

    #[tokio::test]
    async fn test_bluesky_empty_did_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resolveHandle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let registry = registry(&server.uri());
        let err = registry.select(BSKY_POST).unwrap().resolve(BSKY_POST).await.unwrap_err();
        assert!(matches!(err, AppError::Resolution { .. }));
    }

    #[tokio::test]
    async fn test_bluesky_error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resolveHandle"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let registry = registry(&server.uri());
        let result = registry.select(BSKY_POST).unwrap().resolve(BSKY_POST).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_bluesky_rejects_non_post_url_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let registry = registry(&server.uri());
        let url = "https://bsky.app/profile/maker.bsky.social";
        assert!(registry.select(url).unwrap().resolve(url).await.is_err());
    }

    #[tokio::test]
    async fn test_tiktok_resolves_markup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .and(query_param("url", TIKTOK_POST))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"html": "<blockquote class=\"tiktok-embed\"></blockquote>"}),
            ))
            .mount(&server)
            .await;

        let registry = registry(&server.uri());
        let attrs = registry.select(TIKTOK_POST).unwrap().resolve(TIKTOK_POST).await.unwrap();
        assert_eq!(attrs[0].name, "html");
        assert!(attrs[0].value.contains("tiktok-embed"));
    }

    #[tokio::test]
    async fn test_tiktok_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let registry = registry(&server.uri());
        let err = registry.select(TIKTOK_POST).unwrap().resolve(TIKTOK_POST).await.unwrap_err();
        assert!(matches!(err, AppError::Resolution { .. }));
    }
}
