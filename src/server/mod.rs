//! Blog server
//!
//! Renders the listing and detail pages on request. Listing and detail pages
//! are served through the revalidating cache; the debug route always fetches
//! fresh and shows what the content service answered.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::content::SlugIndex;
use crate::fetcher::{ContentFetcher, FetchPolicy, FetchResult};
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Server state
struct ServerState {
    fetcher: ContentFetcher,
    renderer: TemplateRenderer,
    policy: FetchPolicy,
    revalidate: Duration,
    per_page: usize,
}

impl ServerState {
    fn new(blog: &Blog, fetcher: ContentFetcher) -> Result<Self> {
        Ok(Self {
            fetcher,
            renderer: TemplateRenderer::new(&blog.config)?,
            policy: blog.revalidate_policy(),
            revalidate: blog.config.revalidate_interval(),
            per_page: blog.config.per_page,
        })
    }

    fn cache_control(&self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate",
            self.revalidate.as_secs()
        )
    }
}

/// Build the application router
pub fn router(blog: &Blog) -> Result<Router> {
    let state = ServerState::new(blog, blog.fetcher()?)?;
    Ok(build_router(Arc::new(state)))
}

fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/posts/:slug", get(post_handler))
        .route("/posts/:slug/", get(post_handler))
        .route("/debug/posts/:slug", get(debug_post_handler))
        .route("/debug/posts/:slug/", get(debug_post_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, prewarm: bool) -> Result<()> {
    let fetcher = blog.fetcher()?;

    if prewarm {
        let index = fetcher.list_all_slugs(blog.config.slug_limit).await;
        prewarm_posts(&fetcher, &index, blog.revalidate_policy()).await;
    }

    let state = Arc::new(ServerState::new(blog, fetcher)?);
    let app = build_router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Content endpoint: {}", blog.config.endpoint);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Fetch every indexed post once so the first visitors hit the cache
async fn prewarm_posts(fetcher: &ContentFetcher, index: &SlugIndex, policy: FetchPolicy) {
    let mut found = 0;
    for slug in index.iter() {
        if fetcher.get_by_slug(slug, policy).await.value.is_found() {
            found += 1;
        }
    }
    tracing::info!(
        "Prewarmed {} of {} indexed posts{}, {} responses cached",
        found,
        index.len(),
        if index.truncated { " (index truncated)" } else { "" },
        fetcher.cache().len().await
    );
}

/// Listing page
async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    let posts = state.fetcher.list_recent(state.per_page, state.policy).await.value;

    match state.renderer.render_index(&posts) {
        Ok(html) => (
            [(header::CACHE_CONTROL, state.cache_control())],
            Html(html),
        )
            .into_response(),
        Err(e) => render_error(e),
    }
}

/// Post detail page; every failure is a plain not-found
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    match state.fetcher.get_by_slug(&slug, state.policy).await.value {
        FetchResult::Found(post) => match state.renderer.render_post(&post, None) {
            Ok(html) => (
                [(header::CACHE_CONTROL, state.cache_control())],
                Html(html),
            )
                .into_response(),
            Err(e) => render_error(e),
        },
        FetchResult::NotFound | FetchResult::TransportError(_) => not_found(&state),
    }
}

/// Diagnostic post page, never cached
async fn debug_post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    let fetched = state
        .fetcher
        .get_by_slug(&slug, FetchPolicy::diagnostic())
        .await;
    let diagnostics = fetched.diagnostics.unwrap_or_default();

    let (status, rendered) = match &fetched.value {
        FetchResult::Found(post) => (
            StatusCode::OK,
            state.renderer.render_post(post, Some(&diagnostics)),
        ),
        outcome => (
            StatusCode::NOT_FOUND,
            state.renderer.render_debug(&slug, outcome, &diagnostics),
        ),
    };

    match rendered {
        Ok(html) => (
            status,
            [(header::CACHE_CONTROL, "no-store".to_string())],
            Html(html),
        )
            .into_response(),
        Err(e) => render_error(e),
    }
}

async fn fallback_handler(State(state): State<Arc<ServerState>>) -> Response {
    not_found(&state)
}

fn not_found(state: &ServerState) -> Response {
    match state.renderer.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => render_error(e),
    }
}

/// Failure details stay in the log
fn render_error(e: anyhow::Error) -> Response {
    tracing::error!("Template rendering failed: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<h1>Internal server error</h1>".to_string()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use mockito::{Matcher, Server};
    use serde_json::json;

    /// Serve the router on an ephemeral port and return its base URL
    async fn spawn_app(endpoint: &str) -> String {
        let config = SiteConfig {
            title: "Test Blog".to_string(),
            endpoint: endpoint.to_string(),
            request_timeout: 5,
            ..Default::default()
        };
        let blog = Blog::with_config(std::env::temp_dir(), config);
        let app = router(&blog).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn test_index_lists_posts() {
        let mut backend = Server::new_async().await;
        let _mock = backend
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({ "variables": { "first": 12 } })))
            .with_body(
                json!({ "data": { "posts": { "nodes": [
                    { "id": "1", "slug": "a", "title": "Alpha", "excerpt": "<p>A</p>", "date": "2024-01-01T00:00:00" },
                    { "id": "2", "slug": "b", "title": "Beta", "excerpt": "<p>B</p>", "date": "2024-01-02T00:00:00" }
                ] } } })
                .to_string(),
            )
            .create_async()
            .await;

        let base = spawn_app(&format!("{}/graphql", backend.url())).await;
        let response = client().get(format!("{}/", base)).send().await.unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let cache_control = response
            .headers()
            .get("cache-control")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(cache_control, "public, s-maxage=60, stale-while-revalidate");
        let body = response.text().await.unwrap();
        assert!(body.find("Alpha").unwrap() < body.find("Beta").unwrap());
    }

    #[tokio::test]
    async fn test_index_degrades_to_empty_state() {
        let base = spawn_app("http://127.0.0.1:1/graphql").await;
        let response = client().get(format!("{}/", base)).send().await.unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert!(response.text().await.unwrap().contains("No posts found."));
    }

    #[tokio::test]
    async fn test_post_found_and_missing() {
        let mut backend = Server::new_async().await;
        let _found = backend
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({ "variables": { "slug": "hello" } })))
            .with_body(
                json!({ "data": { "post": {
                    "id": "1", "slug": "hello", "title": "Hello Post",
                    "content": "<p>Body text</p>", "excerpt": "", "date": "2024-01-01T00:00:00"
                } } })
                .to_string(),
            )
            .create_async()
            .await;
        let _missing = backend
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({ "variables": { "slug": "nope" } })))
            .with_body(r#"{"data":{"post":null}}"#)
            .create_async()
            .await;

        let base = spawn_app(&format!("{}/graphql", backend.url())).await;

        let response = client()
            .get(format!("{}/posts/hello", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body = response.text().await.unwrap();
        assert!(body.contains("Hello Post"));
        assert!(body.contains("<p>Body text</p>"));

        let response = client()
            .get(format!("{}/posts/nope/", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
        let body = response.text().await.unwrap();
        assert!(body.contains("Page not found"));
    }

    #[tokio::test]
    async fn test_post_transport_error_is_not_found() {
        let base = spawn_app("http://127.0.0.1:1/graphql").await;
        let response = client()
            .get(format!("{}/posts/anything", base))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 404);
        let body = response.text().await.unwrap();
        assert!(!body.contains("failed to reach"));
    }

    #[tokio::test]
    async fn test_debug_route_exposes_raw_response() {
        let mut backend = Server::new_async().await;
        let raw = r#"{"errors":[{"message":"Internal server error"}],"data":{"post":null}}"#;
        let mock = backend
            .mock("POST", "/graphql")
            .with_body(raw)
            .expect(2)
            .create_async()
            .await;

        let base = spawn_app(&format!("{}/graphql", backend.url())).await;

        for _ in 0..2 {
            let response = client()
                .get(format!("{}/debug/posts/missing-slug", base))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status().as_u16(), 404);
            assert_eq!(
                response.headers().get("cache-control").unwrap(),
                "no-store"
            );
            let body = response.text().await.unwrap();
            assert!(body.contains(&tera::escape_html(raw)));
            assert!(body.contains("query failed: Internal server error"));
            assert!(body.contains("missing-slug"));
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_render_error_hides_details() {
        let response = render_error(anyhow::anyhow!("template 'post.html' failed at /srv/secret"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(body, "<h1>Internal server error</h1>");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let base = spawn_app("http://127.0.0.1:1/graphql").await;
        let response = client()
            .get(format!("{}/archives/2024", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }
}
