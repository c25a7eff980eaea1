//! ImageFactory - backend server entry point.

use std::env;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_lib::ServeOptions;
use common::{AppResult, DeploymentMode};
use platform::{MigrateAction, PlatformConfig};

#[derive(Parser)]
#[command(name = "imagefactory")]
#[command(author, version, about = "ImageFactory backend server")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (defaults to SERVER_HOST or 0.0.0.0)
        #[arg(short = 'H', long)]
        host: Option<String>,
        /// Port to listen on (defaults to SERVER_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
        /// Use in-process storage instead of PostgreSQL
        #[arg(long, env = "IMAGEFACTORY_IN_MEMORY")]
        in_memory: bool,
    },
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(cli.verbose, deployment_mode());

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = PlatformConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Serve {
            host,
            port,
            in_memory,
        } => {
            let options = ServeOptions {
                host: host.unwrap_or_else(|| config.server.host.clone()),
                port: port.unwrap_or(config.server.port),
                in_memory,
            };
            api_lib::run_server(config, options).await
        }
        Commands::Migrate { action } => {
            let action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            platform::run_migrations(&config, action).await
        }
    }
}

/// Deployment mode from `APP_ENV`, read before configuration is loaded.
fn deployment_mode() -> DeploymentMode {
    env::var("APP_ENV")
        .ok()
        .and_then(|value| value.parse::<DeploymentMode>().ok())
        .unwrap_or_default()
}

/// Initialize tracing subscriber (verbose mode sets debug level)
fn init_tracing(verbose: bool, mode: DeploymentMode) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };

    // Production logs are compact and free of color codes
    let production = mode.is_production();
    let compact = production.then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(false)
    });
    let pretty = (!production).then(|| tracing_subscriber::fmt::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(pretty)
        .init();
}
