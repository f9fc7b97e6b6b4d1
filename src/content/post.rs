//! Post and category models

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A blog post as projected from the content service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Backend identifier
    pub id: String,

    /// Slug (URL-friendly name)
    pub slug: String,

    /// Post title
    pub title: String,

    /// Body markup, only present in detail projections
    pub content: Option<String>,

    /// Excerpt markup
    pub excerpt: String,

    /// Publication timestamp exactly as reported by the backend
    pub date: String,

    /// Author display name
    pub author: Option<String>,

    /// Cover image URL
    pub cover_image: Option<String>,

    /// Post categories
    pub categories: Vec<Category>,
}

impl Post {
    /// Parse the publication timestamp.
    ///
    /// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` and bare dates.
    pub fn published_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.date)
    }

    /// URL path of the detail page (without root)
    pub fn path(&self) -> String {
        format!("posts/{}/", crate::helpers::encode_segment(&self.slug))
    }
}

/// A category label attached to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
}

/// Snapshot of the slugs known to the backend at enumeration time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlugIndex {
    /// Slugs in backend order
    pub slugs: Vec<String>,
    /// The enumeration stopped at the configured limit while the backend had more
    pub truncated: bool,
}

impl SlugIndex {
    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.slugs.iter().map(String::as_str)
    }
}

/// Parse a backend timestamp
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_date(date: &str) -> Post {
        Post {
            id: "cG9zdDox".to_string(),
            slug: "hello-world".to_string(),
            title: "Hello".to_string(),
            content: None,
            excerpt: String::new(),
            date: date.to_string(),
            author: None,
            cover_image: None,
            categories: Vec::new(),
        }
    }

    #[test]
    fn test_published_at_formats() {
        let naive = post_with_date("2024-01-15T10:30:00").published_at().unwrap();
        assert_eq!(naive.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");

        let rfc = post_with_date("2024-01-15T10:30:00+02:00").published_at().unwrap();
        assert_eq!(rfc.format("%H:%M").to_string(), "10:30");

        let day = post_with_date("2024-01-15").published_at().unwrap();
        assert_eq!(day.format("%H:%M").to_string(), "00:00");

        assert!(post_with_date("yesterday").published_at().is_none());
    }

    #[test]
    fn test_path() {
        assert_eq!(post_with_date("").path(), "posts/hello-world/");
    }

    #[test]
    fn test_slug_index() {
        let index = SlugIndex {
            slugs: vec!["a".to_string(), "b".to_string()],
            truncated: false,
        };
        assert_eq!(index.len(), 2);
        assert_eq!(index.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(SlugIndex::default().is_empty());
    }
}
