//! sitekeep - admin command line for the site content store.
//!
//! Reads and edits the services, portfolio, testimonials, pricing, process
//! and site text collections through the same storage layer the public site
//! uses.

mod command;

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sitekeep_core::Config;

use command::Command;

/// How long to let background cache refreshes finish before exiting
const REFRESH_GRACE: Duration = Duration::from_secs(3);

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr, and to a daily rolling file when `SITEKEEP_LOG_DIR`
/// is set. The returned guard must live until exit so the file is flushed.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var_os("SITEKEEP_LOG_DIR") {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "sitekeep.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
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
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n", e);
            eprintln!("{}", command::USAGE);
            return ExitCode::from(2);
        }
    };

    if let Command::Help = command {
        println!("{}", command::USAGE);
        return ExitCode::SUCCESS;
    }

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Saved as-is, before environment overrides are layered on.
    if let Some(message) = command.apply_to_config(&mut config) {
        if let Err(e) = config.save() {
            eprintln!("Error: failed to save config: {:#}", e);
            return ExitCode::FAILURE;
        }
        println!("{}", message);
        return ExitCode::SUCCESS;
    }
    config.apply_env();

    let store = match config.open_store() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if !store.is_connected() {
        eprintln!("Offline mode: changes are saved to this machine only.");
    }
    info!(connected = store.is_connected(), "sitekeep starting");

    if command.seeds_on_start() {
        if let Err(e) = store.ensure_seeded().await {
            error!(error = %e, "Startup seeding failed");
            eprintln!("Error: could not write default data: {}", e);
            eprintln!("Nothing else was run. Check the connection and try again.");
            return ExitCode::FAILURE;
        }
    }

    let result = command.run(&store).await;
    store.settle(REFRESH_GRACE).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
