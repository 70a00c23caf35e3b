//! Lumina CLI - Command-line interface
//!
//! Runs the media server and manages the video catalog from the shell.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use lumina_core::LuminaError;
use lumina_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "lumina")]
#[command(about = "A video library and range-streaming media server")]
struct Cli {
    /// Console log level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value_t = CliLogLevel::Info, global = true)]
    log_level: CliLogLevel,

    /// Directory for the per-run debug log
    #[arg(long, default_value = "logs", global = true)]
    logs_dir: PathBuf,

    /// Uploads directory holding videos, thumbnails and the catalog
    #[arg(long, global = true)]
    uploads: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), Some(&cli.logs_dir))?;

    if let Err(e) = commands::handle_command(cli.command, cli.uploads).await {
        if let Some(lumina_error) = e.downcast_ref::<LuminaError>() {
            eprintln!("Error: {}", lumina_error.user_message());
            std::process::exit(if lumina_error.is_user_error() { 2 } else { 1 });
        }
        return Err(e);
    }

    Ok(())
}
