mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "parkwatch")]
#[command(about = "Live parking and traffic operations dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the dashboard API (default)
    Serve,
    /// Run the refresh loop headless, logging each snapshot
    Watch {
        /// Stop after this many snapshots
        #[arg(long)]
        cycles: Option<u32>,
    },
    /// Resolve free-form location text
    Resolve {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Map a GPS fix into the local grid and snap to the nearest place
    Locate {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },
    /// Park a vehicle near a destination
    Park {
        #[arg(required = true, num_args = 1..)]
        destination: Vec<String>,
    },
    /// Probe the backend's health route
    Health,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = parkwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve(&config).await,
        Commands::Watch { cycles } => commands::watch(&config, cycles).await,
        Commands::Resolve { text } => commands::resolve(&config, &text.join(" ")),
        Commands::Locate {
            latitude,
            longitude,
        } => commands::locate(&config, latitude, longitude).await,
        Commands::Park { destination } => commands::park(&config, &destination.join(" ")).await,
        Commands::Health => commands::health(&config).await,
    }
}
