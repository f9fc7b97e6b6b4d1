//! List site content

use anyhow::Result;

use crate::fetcher::FetchPolicy;
use crate::helpers::format_timestamp;
use crate::Blog;

/// List content from the backend by type
pub async fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let fetcher = blog.fetcher()?;

    match content_type {
        "post" | "posts" => {
            let posts = fetcher
                .list_recent(blog.config.per_page, FetchPolicy::diagnostic())
                .await;
            if let Some(error) = posts.diagnostics.and_then(|d| d.error) {
                anyhow::bail!("Failed to list posts from {}: {}", fetcher.endpoint(), error);
            }

            println!("Posts ({}):", posts.value.len());
            for post in posts.value {
                let date = post
                    .published_at()
                    .map(|d| format_timestamp(&d, "YYYY-MM-DD"))
                    .unwrap_or_else(|| post.date.clone());
                println!("  {} - {} [{}]", date, post.title, post.slug);
            }
        }
        "slug" | "slugs" => {
            let index = fetcher.list_all_slugs(blog.config.slug_limit).await;
            println!(
                "Slugs ({}{}):",
                index.len(),
                if index.truncated { ", truncated" } else { "" }
            );
            for slug in index.iter() {
                println!("  {}", slug);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, slug", content_type);
        }
    }

    Ok(())
}
