//! CLI entry point for folio

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Markdown content engine for a portfolio blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts, newest first
    #[command(alias = "ls")]
    List {
        /// Only posts in this category ("all" for every category)
        #[arg(long)]
        category: Option<String>,

        /// Only posts matching this search
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Show a single post
    Show {
        slug: String,

        /// Print the markdown body instead of rendered HTML
        #[arg(long)]
        raw: bool,
    },

    /// Search titles, excerpts, bodies and tags
    Search { query: String },

    /// Posts in the same category or sharing a tag
    Related {
        slug: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// The newest posts
    Recent {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List categories with post counts
    Categories,

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Category directory to create it in
        #[arg(long)]
        category: String,

        /// File name to use instead of the slugified title
        #[arg(short, long)]
        slug: Option<String>,

        /// Tags for the front-matter
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Export the index as JSON files
    #[command(alias = "g")]
    Export {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Serve the index as a JSON API
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long)]
        ip: Option<String>,

        /// Disable reindexing on content changes
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the exported JSON
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    if let Commands::Version = cli.command {
        println!("folio version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let site = folio::Folio::new(&base_dir)
        .with_context(|| format!("Failed to open site at {:?}", base_dir))?;
    let json = cli.json;

    match cli.command {
        Commands::List { category, query } => {
            folio::commands::list::run(&site, category.as_deref(), query.as_deref(), json)?;
        }

        Commands::Show { slug, raw } => {
            folio::commands::show::run(&site, &slug, raw, json)?;
        }

        Commands::Search { query } => {
            folio::commands::list::search(&site, &query, json)?;
        }

        Commands::Related { slug, limit } => {
            folio::commands::list::related(&site, &slug, limit, json)?;
        }

        Commands::Recent { limit } => {
            folio::commands::list::recent(&site, limit, json)?;
        }

        Commands::Categories => {
            folio::commands::list::categories(&site, json)?;
        }

        Commands::New {
            title,
            category,
            slug,
            tags,
        } => {
            let path =
                folio::commands::new::create_post(&site, &title, &category, slug.as_deref(), &tags)?;
            println!("Created: {:?}", path);
        }

        Commands::Export { watch } => {
            tracing::info!("Exporting content...");
            let count = folio::commands::export::run(&site)?;
            println!("Exported {} posts to {:?}", count, site.public_dir);

            if watch {
                tokio::task::spawn_blocking(move || folio::commands::export::watch(&site))
                    .await??;
            }
        }

        Commands::Serve {
            port,
            ip,
            r#static,
        } => {
            let ip = ip.unwrap_or_else(|| site.config.server.ip.clone());
            let port = port.unwrap_or(site.config.server.port);
            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(site, &ip, port, !r#static).await?;
        }

        Commands::Clean => {
            folio::commands::clean::run(&site)?;
            println!("Cleaned successfully!");
        }

        // Printed above, before a site is opened
        Commands::Version => {}
    }

    Ok(())
}
