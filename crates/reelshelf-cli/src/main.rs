//! reelshelf - a command-line movie discovery client.
//!
//! Search the movie catalog, keep a favorites list and share it through a
//! read-only link. Login state persists between runs.

mod commands;

use std::io;
use std::path::Path;

use anyhow::Result;
use reelshelf_core::{AppContext, Config};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Command;

// ============================================================================
// Constants
// ============================================================================

/// Log file name inside the cache directory
const LOG_FILE: &str = "reelshelf.log";

/// Initialize the tracing subscriber for logging.
///
/// Returns the guard of the file writer; it must live until exit or buffered
/// lines are lost.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n", e);
            commands::print_usage();
            std::process::exit(2);
        }
    };
    if matches!(command, Command::Help) {
        commands::print_usage();
        return Ok(());
    }

    let config = Config::load()?;
    let _log_guard = init_tracing(config.cache_dir().ok().as_deref());
    info!(command = command.name(), "reelshelf starting");

    let ctx = AppContext::new(config)?;
    let result = commands::run(&ctx, command).await;
    commands::report_notification(&ctx);
    ctx.shutdown();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
