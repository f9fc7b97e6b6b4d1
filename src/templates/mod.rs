//! Built-in blog templates using Tera template engine
//!
//! All templates are embedded directly in the binary. Backend markup is
//! passed through the [`Sanitizer`] before it reaches a template; every other
//! value is autoescaped.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::fetcher::{Diagnostics, FetchResult};
use crate::helpers::{self, Sanitizer};

/// Template renderer with the embedded blog theme
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
    sanitizer: Sanitizer,
    config: SiteConfig,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("index.html", include_str!("blog/index.html")),
            ("post.html", include_str!("blog/post.html")),
            ("not_found.html", include_str!("blog/not_found.html")),
            ("debug.html", include_str!("blog/debug.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("blog/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("blog/partials/footer.html"),
            ),
            (
                "partials/macros.html",
                include_str!("blog/partials/macros.html"),
            ),
        ])?;

        tera.register_filter("date_format", date_format_filter);

        Ok(Self {
            tera,
            site: SiteData::from_config(config),
            sanitizer: Sanitizer::new(config.sanitize.clone()),
            config: config.clone(),
        })
    }

    /// Render the listing page
    pub fn render_index(&self, posts: &[Post]) -> Result<String> {
        let posts: Vec<PostData> = posts.iter().map(|p| self.post_data(p)).collect();
        let mut context = self.base_context();
        context.insert("posts", &posts);
        self.render("index.html", &context)
    }

    /// Render a post detail page, optionally with a diagnostics panel
    pub fn render_post(&self, post: &Post, diagnostics: Option<&Diagnostics>) -> Result<String> {
        let mut context = self.base_context();
        context.insert("post", &self.post_data(post));
        context.insert("diagnostics", &diagnostics);
        self.render("post.html", &context)
    }

    /// Render the generic not-found page
    pub fn render_not_found(&self) -> Result<String> {
        self.render("not_found.html", &self.base_context())
    }

    /// Render the diagnostic page for a post that could not be shown
    pub fn render_debug(
        &self,
        slug: &str,
        outcome: &FetchResult,
        diagnostics: &Diagnostics,
    ) -> Result<String> {
        let outcome = match outcome {
            FetchResult::Found(_) => "found".to_string(),
            FetchResult::NotFound => "not found".to_string(),
            FetchResult::TransportError(e) => format!("{} error", e.kind()),
        };

        let mut context = self.base_context();
        context.insert("slug", slug);
        context.insert("outcome", &outcome);
        context.insert("diagnostics", diagnostics);
        self.render("debug.html", &context)
    }

    /// Project a post into template data, sanitizing backend markup
    pub fn post_data(&self, post: &Post) -> PostData {
        let excerpt = self.sanitizer.clean(&post.excerpt);
        let summary = helpers::summarize(&excerpt, self.config.excerpt_length);

        PostData {
            title: post.title.clone(),
            slug: post.slug.clone(),
            url: helpers::post_url(&self.config, &post.slug),
            permalink: helpers::full_url_for(&self.config, &post.path()),
            date: post.date.clone(),
            datetime: post
                .published_at()
                .map(|d| helpers::date_xml(&d))
                .unwrap_or_else(|| post.date.clone()),
            author: post.author.clone(),
            cover_image: post
                .cover_image
                .as_deref()
                .filter(|url| self.allows_url(url))
                .map(str::to_string),
            excerpt,
            summary,
            content: post
                .content
                .as_deref()
                .map(|c| self.sanitizer.clean(c))
                .unwrap_or_default(),
            categories: post
                .categories
                .iter()
                .map(|c| CategoryData {
                    name: c.name.clone(),
                    slug: c.slug.clone(),
                })
                .collect(),
        }
    }

    fn allows_url(&self, url: &str) -> bool {
        match url.split_once(':') {
            Some((scheme, _)) => self
                .config
                .sanitize
                .url_schemes
                .iter()
                .any(|s| s.eq_ignore_ascii_case(scheme)),
            // Scheme-less URLs are relative to the site
            None => true,
        }
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("generator_version", env!("CARGO_PKG_VERSION"));
        context.insert("current_year", &chrono::Local::now().format("%Y").to_string());
        context
    }

    /// Render a template with given context
    fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: format a backend timestamp
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    // Unparseable timestamps and unusable formats show the date as reported
    let formatted = crate::content::parse_timestamp(&s)
        .and_then(|date| helpers::try_format_timestamp(&date, &format));
    Ok(tera::Value::String(formatted.unwrap_or(s)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub root: String,
    pub date_format: String,
}

impl SiteData {
    fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
            root: helpers::url_for(config, "/"),
            date_format: config.date_format.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub slug: String,
    pub url: String,
    /// Absolute URL of the detail page
    pub permalink: String,
    /// Timestamp as reported by the backend
    pub date: String,
    /// Machine-readable timestamp for `<time datetime>`
    pub datetime: String,
    pub author: Option<String>,
    pub cover_image: Option<String>,
    /// Sanitized excerpt markup
    pub excerpt: String,
    /// Plain-text excerpt
    pub summary: String,
    /// Sanitized body markup
    pub content: String,
    pub categories: Vec<CategoryData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryData {
    pub name: String,
    pub slug: String,
}
