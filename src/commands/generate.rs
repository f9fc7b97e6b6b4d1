//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Blog;

/// Render the listing and every indexed post into the public directory
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog)?;
    let report = generator.generate().await?;

    tracing::info!(
        "Listed {} posts, wrote {} post pages",
        report.listed,
        report.written
    );
    if !report.skipped.is_empty() {
        tracing::warn!(
            "Skipped {} posts: {}",
            report.skipped.len(),
            report.skipped.join(", ")
        );
    }
    if report.truncated {
        tracing::warn!(
            "Only the first {} posts were generated; raise slug_limit to include the rest",
            blog.config.slug_limit
        );
    }

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}
