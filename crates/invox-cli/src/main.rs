//! CLI application for invoice document processing.

mod commands;
mod store;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{ask, batch, config, process};

/// Process invoice documents and query them in plain language
#[derive(Parser)]
#[command(name = "invox", author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory holding the local invoice store
    #[arg(short, long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single invoice file
    Process(process::ProcessArgs),

    /// Process every file matching a glob pattern
    Batch(batch::BatchArgs),

    /// Ask a question about your stored invoices
    Ask(ask::AskArgs),

    /// Inspect or bootstrap the configuration
    Config(config::ConfigArgs),
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = cli.config.as_deref();
    let data_dir = cli.data_dir.as_deref();

    match cli.command {
        Commands::Process(args) => process::run(args, config, data_dir).await,
        Commands::Batch(args) => batch::run(args, config, data_dir).await,
        Commands::Ask(args) => ask::run(args, config, data_dir).await,
        Commands::Config(args) => config::run(args).await,
    }
}
