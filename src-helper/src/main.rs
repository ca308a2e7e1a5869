use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod version;
use version::{AGENT_NAME, AGENT_VERSION};

#[derive(Parser)]
#[command(name = "gitdeck-agent")]
#[command(about = "Drives the gitdeck path view against a running git server")]
struct Cli {
    /// Server api url (overrides config and GITDECK_SERVER_URL)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check health and version
    Health,

    /// Classify a path and print the resulting view, including candidate
    /// repositories found under it
    Status {
        /// Path to inspect (defaults to current)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Initialize a repository
    Init {
        /// Directory to initialize
        #[arg(default_value = ".")]
        path: String,
    },

    /// Create a directory
    Mkdir {
        /// Directory to create
        path: String,
    },

    /// Clone a repository into a directory
    Clone {
        /// Parent directory for the clone
        path: String,
        /// Remote url
        url: String,
        /// Destination folder name (defaults to the project name)
        #[arg(long)]
        dest: Option<String>,
        /// Do not clone submodules recursively
        #[arg(long)]
        no_recursive: bool,
    },

    /// Print the effective configuration
    Config,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("GITDECK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = gitdeck::config::load_config(None).context("Failed to load config")?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    let report = match cli.command {
        Commands::Health => {
            println!(r#"{{"ok":true,"name":"{}","version":"{}"}}"#, AGENT_NAME, AGENT_VERSION);
            return Ok(());
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }

        Commands::Status { path } => commands::path::status(&config, &path).await?,

        Commands::Init { path } => commands::path::init(&config, &path).await?,

        Commands::Mkdir { path } => commands::path::mkdir(&config, &path).await?,

        Commands::Clone { path, url, dest, no_recursive } => {
            commands::path::clone(&config, &path, &url, dest, !no_recursive).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
