//! headless-blog: a server-rendered blog front end for headless CMS backends
//!
//! Posts are fetched from a GraphQL-style content service and rendered with
//! embedded Tera templates, either on request by the built-in server or ahead
//! of time into static files.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod fetcher;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use fetcher::{ContentFetcher, FetchPolicy};

/// Config file looked up in the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a new blog from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog from an already-built configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// Build a content fetcher for the configured endpoint
    pub fn fetcher(&self) -> Result<ContentFetcher> {
        ContentFetcher::new(&self.config)
    }

    /// Policy of the request-time listing and detail pages
    pub fn revalidate_policy(&self) -> FetchPolicy {
        FetchPolicy::revalidate(self.config.revalidate_interval())
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
