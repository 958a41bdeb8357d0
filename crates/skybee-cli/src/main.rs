use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use skybee_cli::output::OutputFormat;

mod commands;

use commands::airports::handle_airports_command;
use commands::route::{handle_route_command, AlgorithmArg, RouteCommandArgs};
use commands::DataArgs;

#[derive(Parser, Debug)]
#[command(author, version, about = "SkyBee airport route finder")]
struct Cli {
    /// Directory containing Airports.csv and Routes.csv. Falls back to
    /// $SKYBEE_DATA_DIR, then the platform data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Path to the airports table, overriding --data-dir.
    #[arg(long)]
    airports: Option<PathBuf>,

    /// Path to the routes table, overriding --data-dir.
    #[arg(long)]
    routes: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the best route between two airports with one or more strategies.
    Route {
        /// Source airport identifier.
        #[arg(long = "from")]
        from: String,
        /// Destination airport identifier.
        #[arg(long = "to")]
        to: String,
        /// Strategy to run; repeat for several. Defaults to all.
        #[arg(long = "algorithm", value_enum)]
        algorithms: Vec<AlgorithmArg>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Q-learning training episodes.
        #[arg(long)]
        episodes: Option<usize>,
        /// Q-learning exploration seed.
        #[arg(long)]
        seed: Option<u64>,
        /// Q-learning training budget in milliseconds.
        #[arg(long)]
        rl_timeout_ms: Option<u64>,
        /// JSON file with Q-learning hyperparameters.
        #[arg(long)]
        rl_config: Option<PathBuf>,
    },
    /// List the known airport identifiers.
    Airports {
        /// Only list identifiers of exactly three characters.
        #[arg(long)]
        three_letter_only: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let data = DataArgs {
        data_dir: cli.data_dir,
        airports: cli.airports,
        routes: cli.routes,
    };

    match cli.command {
        Command::Route {
            from,
            to,
            algorithms,
            format,
            episodes,
            seed,
            rl_timeout_ms,
            rl_config,
        } => {
            let args = RouteCommandArgs {
                from,
                to,
                algorithms,
                episodes,
                seed,
                rl_timeout_ms,
                rl_config,
            };
            handle_route_command(&data, format, &args)
        }
        Command::Airports {
            three_letter_only,
            format,
        } => handle_airports_command(&data, three_letter_only, format),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
