//! CLI entry point for headless-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "headless-blog")]
#[command(version = "0.1.0")]
#[command(about = "A server-rendered blog front end for headless CMS backends", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Content service endpoint, overrides the config file and environment
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default _config.yml
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Start the blog server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Skip fetching every indexed post at startup
        #[arg(long)]
        no_prewarm: bool,
    },

    /// Render the site into static files
    #[command(alias = "g")]
    Generate,

    /// Remove the generated files
    Clean,

    /// List content from the backend
    List {
        /// Type of content to list (post, slug)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "headless_blog=debug,info"
    } else {
        "headless_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let load_blog = || -> Result<headless_blog::Blog> {
        let mut blog = headless_blog::Blog::new(&base_dir)?;
        if let Some(endpoint) = &cli.endpoint {
            blog.config.endpoint = endpoint.clone();
        }
        Ok(blog)
    };

    match cli.command {
        Commands::Init { ref folder } => {
            let target_dir = if folder.is_absolute() {
                folder.clone()
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            headless_blog::commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::Server {
            port,
            ref ip,
            no_prewarm,
        } => {
            let blog = load_blog()?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            headless_blog::server::start(&blog, ip, port, !no_prewarm).await?;
        }

        Commands::Generate => {
            let blog = load_blog()?;
            tracing::info!("Generating static files from {}", blog.config.endpoint);
            blog.generate().await?;
            println!("Generated successfully!");
        }

        Commands::Clean => {
            let blog = load_blog()?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { ref r#type } => {
            let blog = load_blog()?;
            headless_blog::commands::list::run(&blog, r#type).await?;
        }

        Commands::Version => {
            println!("headless-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
