//! Generator module - renders the site into static HTML files
//!
//! The slug index is enumerated once and every post it names is fetched
//! and written to `posts/<slug>/index.html`.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::SlugIndex;
use crate::fetcher::{ContentFetcher, FetchPolicy, FetchResult};
use crate::helpers::encode_segment;
use crate::templates::TemplateRenderer;
use crate::Blog;

/// What a generation run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Posts listed on the index page
    pub listed: usize,
    /// Detail pages written
    pub written: usize,
    /// Slugs that could not be rendered
    pub skipped: Vec<String>,
    /// The slug enumeration hit its limit
    pub truncated: bool,
}

/// Static site generator
pub struct Generator {
    blog: Blog,
    fetcher: ContentFetcher,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            fetcher: blog.fetcher()?,
            renderer: TemplateRenderer::new(&blog.config)?,
        })
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<GenerateReport> {
        fs::create_dir_all(&self.blog.public_dir)?;

        let mut report = GenerateReport::default();

        report.listed = self.generate_index().await?;
        self.generate_not_found()?;

        let index = self.fetcher.list_all_slugs(self.blog.config.slug_limit).await;
        report.truncated = index.truncated;
        self.generate_post_pages(&index, &mut report).await?;

        Ok(report)
    }

    /// Generate the listing page
    async fn generate_index(&self) -> Result<usize> {
        let posts = self
            .fetcher
            .list_recent(self.blog.config.per_page, FetchPolicy::snapshot())
            .await
            .value;

        let html = self.renderer.render_index(&posts)?;
        let output_path = self.blog.public_dir.join("index.html");
        write_page(&output_path, &html)?;

        Ok(posts.len())
    }

    fn generate_not_found(&self) -> Result<()> {
        let html = self.renderer.render_not_found()?;
        write_page(&self.blog.public_dir.join("404.html"), &html)
    }

    /// Generate individual post pages
    async fn generate_post_pages(
        &self,
        index: &SlugIndex,
        report: &mut GenerateReport,
    ) -> Result<()> {
        for slug in index.iter() {
            let Some(dir) = post_dir(&self.blog.public_dir, slug) else {
                tracing::warn!("Skipping unsafe slug {:?}", slug);
                report.skipped.push(slug.to_string());
                continue;
            };

            let post = match self
                .fetcher
                .get_by_slug(slug, FetchPolicy::snapshot())
                .await
                .value
            {
                FetchResult::Found(post) => post,
                FetchResult::NotFound => {
                    tracing::warn!("Post {:?} disappeared during generation", slug);
                    report.skipped.push(slug.to_string());
                    continue;
                }
                FetchResult::TransportError(e) => {
                    tracing::warn!("Skipping post {:?}: {}", slug, e);
                    report.skipped.push(slug.to_string());
                    continue;
                }
            };

            let html = self.renderer.render_post(&post, None)?;
            write_page(&dir.join("index.html"), &html)?;
            report.written += 1;
        }

        Ok(())
    }
}

/// Output directory of a post, or `None` if the slug cannot name a directory
fn post_dir(public_dir: &Path, slug: &str) -> Option<PathBuf> {
    if slug.is_empty() || slug == "." || slug == ".." {
        return None;
    }
    Some(public_dir.join("posts").join(encode_segment(slug)))
}

fn write_page(output_path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(output_path, html)
        .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
    tracing::debug!("Generated: {:?}", output_path);
    Ok(())
}
