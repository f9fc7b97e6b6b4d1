//! Query documents and wire types for the content service
//!
//! The backend speaks a WPGraphQL-compatible dialect: a single POST endpoint
//! taking `{ query, variables }` and answering `{ data, errors }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Category, Post};

/// Recent posts for the listing page
pub const RECENT_POSTS: &str = r#"query RecentPosts($first: Int!) {
  posts(first: $first) {
    nodes {
      id
      slug
      title
      excerpt
      date
      author { node { name } }
      featuredImage { node { sourceUrl } }
      categories { nodes { name slug } }
    }
  }
}"#;

/// One page of slugs for build-time enumeration
pub const SLUG_PAGE: &str = r#"query SlugPage($first: Int!, $after: String) {
  posts(first: $first, after: $after) {
    nodes { slug }
    pageInfo { hasNextPage endCursor }
  }
}"#;

/// Full projection of a single post
pub const POST_BY_SLUG: &str = r#"query PostBySlug($slug: ID!) {
  post(id: $slug, idType: SLUG) {
    id
    slug
    title
    content
    date
    excerpt
    author { node { name } }
    featuredImage { node { sourceUrl } }
    categories { nodes { name slug } }
  }
}"#;

/// Request body sent to the endpoint
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

/// Response envelope
#[derive(Debug, Deserialize)]
pub struct QueryResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<QueryErrorEntry>>,
}

impl<T> QueryResponse<T> {
    /// Messages of the reported query errors, if any
    pub fn error_messages(&self) -> Option<Vec<String>> {
        match &self.errors {
            Some(errors) if !errors.is_empty() => {
                Some(errors.iter().map(|e| e.message.clone()).collect())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryErrorEntry {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RecentPostsData {
    pub posts: Option<Connection<PostNode>>,
}

#[derive(Debug, Deserialize)]
pub struct SlugPageData {
    pub posts: Option<Connection<SlugNode>>,
}

#[derive(Debug, Deserialize)]
pub struct PostBySlugData {
    pub post: Option<PostNode>,
}

#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    #[serde(default, rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    #[serde(default, rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(default, rename = "endCursor")]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct SlugNode {
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorNode {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageNode {
    #[serde(rename = "sourceUrl")]
    pub source_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryNode {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// A post as it appears on the wire
#[derive(Debug, Deserialize)]
pub struct PostNode {
    #[serde(default)]
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub date: Option<String>,
    pub author: Option<Edge<AuthorNode>>,
    #[serde(rename = "featuredImage")]
    pub featured_image: Option<Edge<ImageNode>>,
    pub categories: Option<Connection<CategoryNode>>,
}

impl PostNode {
    /// Flatten the wire shape into a [`Post`].
    ///
    /// `fallback_slug` is used when the projection omits the slug.
    pub fn into_post(self, fallback_slug: Option<&str>) -> Post {
        let slug = self
            .slug
            .or_else(|| fallback_slug.map(str::to_string))
            .unwrap_or_default();

        Post {
            id: self.id,
            slug,
            title: self.title.unwrap_or_default(),
            content: self.content,
            excerpt: self.excerpt.unwrap_or_default(),
            date: self.date.unwrap_or_default(),
            author: self.author.and_then(|e| e.node).and_then(|a| a.name),
            cover_image: self
                .featured_image
                .and_then(|e| e.node)
                .and_then(|i| i.source_url),
            categories: self
                .categories
                .map(|c| {
                    c.nodes
                        .into_iter()
                        .map(|n| Category {
                            name: n.name,
                            slug: n.slug,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_omits_missing_variables() {
        let body = serde_json::to_value(QueryRequest {
            query: "{ posts { nodes { slug } } }",
            variables: None,
        })
        .unwrap();
        assert_eq!(body, json!({ "query": "{ posts { nodes { slug } } }" }));
    }

    #[test]
    fn test_post_node_projection() {
        let raw = json!({
            "id": "cG9zdDo0Mg==",
            "slug": "rust-on-the-edge",
            "title": "Rust on the Edge",
            "content": "<p>Body</p>",
            "excerpt": "<p>Short</p>",
            "date": "2024-03-02T08:00:00",
            "author": { "node": { "name": "Sam" } },
            "featuredImage": { "node": { "sourceUrl": "https://cdn.example.com/a.png" } },
            "categories": { "nodes": [ { "name": "Rust", "slug": "rust" } ] }
        });
        let node: PostNode = serde_json::from_value(raw).unwrap();
        let post = node.into_post(None);

        assert_eq!(post.id, "cG9zdDo0Mg==");
        assert_eq!(post.slug, "rust-on-the-edge");
        assert_eq!(post.content.as_deref(), Some("<p>Body</p>"));
        assert_eq!(post.author.as_deref(), Some("Sam"));
        assert_eq!(
            post.cover_image.as_deref(),
            Some("https://cdn.example.com/a.png")
        );
        assert_eq!(
            post.categories,
            vec![Category {
                name: "Rust".to_string(),
                slug: "rust".to_string()
            }]
        );
    }

    #[test]
    fn test_post_node_nulls() {
        let raw = json!({
            "id": "1",
            "title": "Bare",
            "author": null,
            "featuredImage": { "node": null },
            "categories": null
        });
        let node: PostNode = serde_json::from_value(raw).unwrap();
        let post = node.into_post(Some("bare"));

        assert_eq!(post.slug, "bare");
        assert!(post.author.is_none());
        assert!(post.cover_image.is_none());
        assert!(post.categories.is_empty());
        assert_eq!(post.excerpt, "");
    }

    #[test]
    fn test_error_messages() {
        let resp: QueryResponse<PostBySlugData> = serde_json::from_value(json!({
            "errors": [ { "message": "Cannot query field \"nope\"" } ]
        }))
        .unwrap();
        assert_eq!(
            resp.error_messages(),
            Some(vec!["Cannot query field \"nope\"".to_string()])
        );

        let empty: QueryResponse<PostBySlugData> =
            serde_json::from_value(json!({ "data": { "post": null }, "errors": [] })).unwrap();
        assert!(empty.error_messages().is_none());
    }
}
