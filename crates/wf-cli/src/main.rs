//! Command-line player for Wayfarer adventures.

mod commands;
mod demo;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(
    name = "wf",
    about = "Wayfarer: play text adventures from the terminal",
    version,
    propagate_version = true
)]
struct Cli {
    /// Language to play in (e.g. en, es)
    #[arg(short, long, global = true)]
    lang: Option<String>,

    /// Log filter, e.g. `debug` or `wf::script=debug` (overrides WF_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the demo adventure interactively
    Play,

    /// Take a fixed sequence of routes and print the transcript
    Walk {
        /// Route names, in the order to take them
        routes: Vec<String>,

        /// Print the transcript as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the order a script's includes are concatenated in
    Includes {
        /// Script name
        script: String,
    },

    /// Validate the demo adventure
    Check,
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env("WF_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let lang = cli.lang.as_deref();
    let result = match cli.command {
        Commands::Play => commands::play::run(lang).await,
        Commands::Walk { routes, json } => commands::walk::run(lang, &routes, json).await,
        Commands::Includes { script } => commands::includes::run(&script).await,
        Commands::Check => commands::check::run().await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
