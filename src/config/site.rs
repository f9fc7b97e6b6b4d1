//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides the configured content endpoint
pub const ENDPOINT_ENV: &str = "HEADLESS_BLOG_ENDPOINT";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,

    // URL
    pub url: String,
    pub root: String,

    // Content service
    pub endpoint: String,
    /// Request timeout in seconds
    pub request_timeout: u64,
    /// Revalidation interval in seconds
    pub revalidate: u64,

    // Listing
    pub per_page: usize,
    pub excerpt_length: usize,
    pub date_format: String,

    // Slug enumeration
    pub slug_limit: usize,
    pub slug_page_size: usize,

    // Directory
    pub public_dir: String,

    // Markup policy
    #[serde(default)]
    pub sanitize: SanitizeConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Headless Blog".to_string(),
            description: String::new(),
            author: String::new(),

            url: "http://localhost:3000".to_string(),
            root: "/".to_string(),

            endpoint: "http://localhost:8080/graphql".to_string(),
            request_timeout: 30,
            revalidate: 60,

            per_page: 12,
            excerpt_length: 160,
            date_format: "MMMM D, YYYY".to_string(),

            slug_limit: 100,
            slug_page_size: 100,

            public_dir: "public".to_string(),

            sanitize: SanitizeConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply the endpoint override from the environment, if set
    pub fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                tracing::debug!("Endpoint overridden by {}", ENDPOINT_ENV);
                self.endpoint = endpoint.trim().to_string();
            }
        }
    }

    pub fn revalidate_interval(&self) -> Duration {
        Duration::from_secs(self.revalidate)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Allow-list applied to backend-supplied markup before rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeConfig {
    pub tags: Vec<String>,
    /// Attributes allowed on every allowed tag
    pub attributes: Vec<String>,
    /// Extra attributes allowed on specific tags
    pub tag_attributes: HashMap<String, Vec<String>>,
    pub url_schemes: Vec<String>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        let tags = [
            "p", "a", "em", "strong", "b", "i", "u", "s", "ul", "ol", "li", "h1", "h2", "h3",
            "h4", "h5", "h6", "blockquote", "pre", "code", "img", "figure", "figcaption", "br",
            "hr", "span", "div", "table", "thead", "tbody", "tr", "th", "td",
        ];
        let mut tag_attributes = HashMap::new();
        tag_attributes.insert("a".to_string(), vec!["href".to_string()]);
        tag_attributes.insert(
            "img".to_string(),
            vec![
                "src".to_string(),
                "alt".to_string(),
                "width".to_string(),
                "height".to_string(),
            ],
        );

        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            attributes: vec!["class".to_string(), "title".to_string()],
            tag_attributes,
            url_schemes: vec![
                "http".to_string(),
                "https".to_string(),
                "mailto".to_string(),
            ],
        }
    }
}
