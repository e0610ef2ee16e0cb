//! Sheetcount - count stacks of coloured sheets in a photo with a vision model.
//!
//! The browser front end is the main surface; the `analyze` command runs the
//! same pipeline over files on disk.
//!
//! # Usage
//!
//! ```bash
//! # Start the web UI on http://127.0.0.1:8501
//! sheetcount serve
//!
//! # Analyse images from the command line
//! sheetcount analyze stacks.jpg --pretty
//!
//! # View configuration
//! sheetcount config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Sheetcount - count coloured sheet stacks with a vision model.
#[derive(Parser, Debug)]
#[command(name = "sheetcount")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web UI
    Serve(cli::serve::ServeArgs),

    /// Analyse image files and print the results as JSON
    Analyze(cli::analyze::AnalyzeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the key may come from the real environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match sheetcount_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `sheetcount config path`."
            );
            sheetcount_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Sheetcount v{}", sheetcount_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Analyze(args) => cli::analyze::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
