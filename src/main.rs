//! CLI entry point for mustache-rs

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mustache_rs::commands::render::RenderOptions;
use mustache_rs::Workspace;

#[derive(Parser)]
#[command(name = "mustache-rs")]
#[command(author = "Yukang Chen")]
#[command(version = "0.1.0")]
#[command(about = "A Mustache template engine with partials, pragmas and a preview server", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Configuration file (defaults to _mustache.yml in the base directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template
    #[command(alias = "r")]
    Render {
        /// Template name, relative to the template directory
        template: String,

        /// Data file (.json, .yaml, .toml)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Re-render when templates or data change
        #[arg(short, long)]
        watch: bool,
    },

    /// Parse all templates and report errors
    Check {
        /// Directory to check (defaults to the template directory)
        path: Option<PathBuf>,
    },

    /// Serve templates over HTTP
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Data file shared by all requests
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Per-request render time limit in seconds
        #[arg(long, default_value = "5")]
        timeout: u64,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "mustache_rs=debug,info"
    } else {
        "mustache_rs=info"
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
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::Render {
            template,
            data,
            output,
            watch,
        } => {
            let ws = Workspace::new(&base_dir, cli.config.as_deref())?;
            let options = RenderOptions {
                template,
                data,
                output,
            };
            mustache_rs::commands::render::run(&ws, &options)?;

            if watch {
                tracing::info!("Watching for file changes...");
                mustache_rs::commands::render::watch(&ws, &options)?;
            }
        }

        Commands::Check { path } => {
            let ws = Workspace::new(&base_dir, cli.config.as_deref())?;
            mustache_rs::commands::check::run(&ws, path.as_deref())?;
        }

        Commands::Serve {
            port,
            ip,
            data,
            timeout,
        } => {
            let ws = Workspace::new(&base_dir, cli.config.as_deref())?;
            let data = ws.load_data(data.as_deref())?;

            tracing::info!("Serving templates from {:?}", ws.template_dir());
            mustache_rs::server::start(
                ws.engine.clone(),
                data,
                &ip,
                port,
                Duration::from_secs(timeout),
            )
            .await?;
        }

        Commands::Version => {
            println!("mustache-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
