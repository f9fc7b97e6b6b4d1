//! Content fetcher
//!
//! A single client for the content service. Every call site picks a
//! [`FetchPolicy`]: how the response cache is used and whether failure
//! details are kept for display.

mod error;

pub use error::FetchError;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{CacheMode, RevalidationCache};
use crate::config::SiteConfig;
use crate::content::query::{
    PostBySlugData, QueryRequest, QueryResponse, RecentPostsData, SlugPageData, POST_BY_SLUG,
    RECENT_POSTS, SLUG_PAGE,
};
use crate::content::{Post, SlugIndex};

/// How failures are surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorVisibility {
    /// Log failures, hand the caller only the outcome
    Silent,
    /// Attach request target, raw body and error text to the outcome
    Diagnostic,
}

/// Cache and error policy of one call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub cache: CacheMode,
    pub errors: ErrorVisibility,
}

impl FetchPolicy {
    /// Periodically revalidated, silent on failure
    pub fn revalidate(interval: std::time::Duration) -> Self {
        Self {
            cache: CacheMode::Revalidate(interval),
            errors: ErrorVisibility::Silent,
        }
    }

    /// Always fresh, with full diagnostics
    pub fn diagnostic() -> Self {
        Self {
            cache: CacheMode::NoStore,
            errors: ErrorVisibility::Diagnostic,
        }
    }

    /// Fetched once ahead of serving
    pub fn snapshot() -> Self {
        Self {
            cache: CacheMode::BuildSnapshot,
            errors: ErrorVisibility::Silent,
        }
    }
}

/// Outcome of a single-post fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    Found(Post),
    NotFound,
    TransportError(FetchError),
}

impl FetchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, FetchResult::Found(_))
    }
}

/// Details of one exchange, kept only for diagnostic call sites
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Endpoint the request was sent to
    pub target: String,
    /// Query variables, pretty-printed
    pub variables: String,
    pub status: Option<u16>,
    /// Response body exactly as received
    pub raw_body: Option<String>,
    pub error: Option<String>,
    /// Served from the response cache
    pub cached: bool,
}

/// A fetched value together with optional diagnostics
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub diagnostics: Option<Diagnostics>,
}

impl<T> Fetched<T> {
    fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }
}

/// Client for the content service
#[derive(Clone)]
pub struct ContentFetcher {
    http: Client,
    endpoint: Url,
    cache: Arc<RevalidationCache>,
    slug_page_size: usize,
}

impl fmt::Debug for ContentFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentFetcher")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ContentFetcher {
    /// Create a fetcher for the endpoint named in the site configuration
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .with_context(|| format!("invalid content endpoint: {}", config.endpoint))?;
        let http = Client::builder()
            .user_agent(concat!("headless-blog/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .no_proxy()
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint,
            cache: Arc::new(RevalidationCache::new()),
            slug_page_size: config.slug_page_size.max(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn cache(&self) -> &RevalidationCache {
        &self.cache
    }

    /// Fetch up to `limit` of the most recent posts, in backend order.
    ///
    /// Failures are logged and yield an empty list.
    pub async fn list_recent(&self, limit: usize, policy: FetchPolicy) -> Fetched<Vec<Post>> {
        if limit == 0 {
            return Fetched {
                value: Vec::new(),
                diagnostics: None,
            };
        }

        let variables = json!({ "first": limit });
        let fetched = self
            .query::<RecentPostsData>(RECENT_POSTS, Some(variables), policy)
            .await;

        fetched.map(|result| match result {
            Ok(data) => {
                let mut posts: Vec<Post> = data
                    .posts
                    .map(|c| c.nodes)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|node| node.into_post(None))
                    .collect();
                posts.truncate(limit);
                debug!("Fetched {} recent posts", posts.len());
                posts
            }
            Err(e) => {
                warn!(kind = e.kind(), "Failed to fetch recent posts: {}", e);
                Vec::new()
            }
        })
    }

    /// Enumerate slugs page by page until the backend runs out or `limit` is reached.
    ///
    /// A failure stops the enumeration and keeps what was collected so far.
    pub async fn list_all_slugs(&self, limit: usize) -> SlugIndex {
        let mut index = SlugIndex::default();
        let mut after: Option<String> = None;

        while index.slugs.len() < limit {
            let first = self.slug_page_size.min(limit - index.slugs.len());
            let variables = json!({ "first": first, "after": after });
            let fetched = self
                .query::<SlugPageData>(SLUG_PAGE, Some(variables), FetchPolicy::snapshot())
                .await;

            let connection = match fetched.value {
                Ok(data) => match data.posts {
                    Some(connection) => connection,
                    None => break,
                },
                Err(e) => {
                    warn!(
                        kind = e.kind(),
                        "Slug enumeration stopped after {} slugs: {}",
                        index.slugs.len(),
                        e
                    );
                    break;
                }
            };

            let page_len = connection.nodes.len();
            index.slugs.extend(
                connection
                    .nodes
                    .into_iter()
                    .filter_map(|node| node.slug)
                    .filter(|slug| !slug.is_empty()),
            );

            let (has_next, cursor) = connection
                .page_info
                .map(|p| (p.has_next_page, p.end_cursor))
                .unwrap_or((false, None));

            if index.slugs.len() > limit {
                index.slugs.truncate(limit);
                index.truncated = true;
                break;
            }
            if !has_next {
                break;
            }
            if index.slugs.len() >= limit {
                index.truncated = true;
                break;
            }
            if page_len == 0 || cursor.is_none() {
                warn!("Backend reported more posts but returned no cursor; stopping");
                break;
            }
            after = cursor;
        }

        if index.truncated {
            warn!(
                "Slug enumeration hit the limit of {}; remaining posts will not be pre-rendered",
                limit
            );
        }
        debug!("Enumerated {} slugs", index.slugs.len());
        index
    }

    /// Fetch the full projection of one post
    pub async fn get_by_slug(&self, slug: &str, policy: FetchPolicy) -> Fetched<FetchResult> {
        let slug = slug.trim();
        if slug.is_empty() {
            let diagnostics = (policy.errors == ErrorVisibility::Diagnostic).then(|| Diagnostics {
                target: self.endpoint.to_string(),
                error: Some("empty slug, no request issued".to_string()),
                ..Default::default()
            });
            return Fetched {
                value: FetchResult::NotFound,
                diagnostics,
            };
        }

        let variables = json!({ "slug": slug });
        let fetched = self
            .query::<PostBySlugData>(POST_BY_SLUG, Some(variables), policy)
            .await;

        fetched.map(|result| match result {
            Ok(PostBySlugData { post: Some(node) }) => {
                FetchResult::Found(node.into_post(Some(slug)))
            }
            Ok(PostBySlugData { post: None }) => {
                debug!("No post with slug {:?}", slug);
                FetchResult::NotFound
            }
            Err(e) => {
                warn!(kind = e.kind(), "Failed to fetch post {:?}: {}", slug, e);
                FetchResult::TransportError(e)
            }
        })
    }

    /// Run one query and classify the exchange
    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
        policy: FetchPolicy,
    ) -> Fetched<Result<T, FetchError>> {
        let mut diagnostics = Diagnostics {
            target: self.endpoint.to_string(),
            variables: variables
                .as_ref()
                .and_then(|v| serde_json::to_string_pretty(v).ok())
                .unwrap_or_default(),
            ..Default::default()
        };

        let request = QueryRequest { query, variables };
        let value = self.exchange(&request, policy.cache, &mut diagnostics).await;

        if let Err(e) = &value {
            diagnostics.error = Some(e.to_string());
        }

        Fetched {
            value,
            diagnostics: (policy.errors == ErrorVisibility::Diagnostic).then_some(diagnostics),
        }
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        request: &QueryRequest<'_>,
        mode: CacheMode,
        diagnostics: &mut Diagnostics,
    ) -> Result<T, FetchError> {
        let payload =
            serde_json::to_string(request).map_err(|e| FetchError::Decode(e.to_string()))?;
        let key = payload.clone();

        if let Some(body) = self.cache.get(&key, mode).await {
            debug!("Serving cached response for {}", self.endpoint);
            diagnostics.cached = true;
            diagnostics.raw_body = Some(body.clone());
            return decode(&body);
        }

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        diagnostics.status = Some(status.as_u16());

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("failed to read response body: {}", e)))?;
        diagnostics.raw_body = Some(body.clone());

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let data = decode(&body)?;
        self.cache.put(key, mode, body).await;
        Ok(data)
    }
}

/// Decode a response envelope, turning reported errors into [`FetchError::Query`]
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    let envelope: QueryResponse<T> =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if let Some(messages) = envelope.error_messages() {
        return Err(FetchError::Query { messages });
    }

    envelope
        .data
        .ok_or_else(|| FetchError::Decode("response carried neither data nor errors".to_string()))
}
