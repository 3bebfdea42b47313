// crates/furrow-cli/src/main.rs
//
// CLI entrypoint for Furrow operators.
//
// Inspects the emission schedule, computes the reward reserve still owed,
// and replays configured scenarios against the staking engine.

mod commands;
mod config;
mod output;

use clap::{Parser, Subcommand};

use config::FurrowConfig;
use output::OutputFormat;

/// Furrow: staking-reward engine tools.
#[derive(Parser, Debug)]
#[command(
    name = "furrow",
    version = "0.1.0",
    about = "Furrow CLI: emission schedule, reward liability, and scenario simulation"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.furrow/config.toml")]
    config: String,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Show every emitting period with its index range and rate.
    Schedule,

    /// Show the period containing an index.
    Period {
        /// Block/time index to look up.
        #[arg(long)]
        index: u64,
    },

    /// Reward still to be emitted from an index, and the funding shortfall.
    Necessary {
        /// Index to count emission from (exclusive).
        #[arg(long)]
        from: u64,
        /// Reward units already held in custody.
        #[arg(long)]
        funded: Option<u128>,
    },

    /// Run the `[[steps]]` scenario from the config file.
    Simulate,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration before logging starts so its log level applies;
    // report the outcome once the subscriber is installed.
    let loaded = FurrowConfig::load(&cli.config);
    let config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => FurrowConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", cli.config),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            cli.config,
            e
        ),
    }

    let format = OutputFormat::from_json_flag(cli.json);
    let schedule = config.emission_schedule()?;

    match &cli.command {
        Commands::Schedule => commands::schedule::run(&schedule, format)?,
        Commands::Period { index } => commands::period::run(&schedule, *index, format)?,
        Commands::Necessary { from, funded } => {
            let planner = furrow_economics::TreasuryPlanner::new(schedule);
            commands::necessary::run(&planner, *from, *funded, format)?
        }
        Commands::Simulate => commands::simulate::run(&config, format)?,
    }

    Ok(())
}
