//! # retreat-register: Register Host for Retreat POS
//!
//! Wires configuration, logging, the database and the cart together and
//! exposes them as commands and a CLI.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Retreat Register                                 │
//! │                                                                         │
//! │  main.rs ────► tokio runtime, calls run()                              │
//! │                                                                         │
//! │  lib.rs ─────► tracing, database path, CLI dispatch                    │
//! │                                                                         │
//! │  cli.rs ─────► clap subcommands: items, buy, history, export, ...      │
//! │                                                                         │
//! │  commands/ ──► list_items, add_item_to_cart, checkout, export_csv      │
//! │                                                                         │
//! │  state/ ─────► DbState, CartState, ConfigState                         │
//! │                                                                         │
//! │  share.rs ───► FileShare (CSV export target)                           │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         SQLite Database                          │  │
//! │  │  retreat.db (local file, WAL mode, kv_store table)               │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Parse the command line
//! 3. Load config (defaults → `register.toml` → `RETREAT_*`)
//! 4. Connect to database & run migrations
//! 5. Load the sample catalog on first run
//! 6. Run the subcommand against fresh state

pub mod cli;
pub mod commands;
pub mod error;
pub mod share;
pub mod state;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use directories::ProjectDirs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::ApiError;
use state::ConfigState;

/// Runs the register CLI and maps the outcome to a process exit code.
pub async fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    info!("Starting Retreat POS register");

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=retreat=trace` - Show trace for retreat crates only
/// - Default: INFO, DEBUG for retreat crates
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,retreat=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.retreat.pos/retreat.db`
/// - **Windows**: `%APPDATA%\retreat\pos\data\retreat.db`
/// - **Linux**: `~/.local/share/pos/retreat.db`
///
/// ## Override
/// `database_path` in the config file, or `RETREAT_DB_PATH`.
pub fn get_database_path(config: &ConfigState) -> Result<PathBuf, ApiError> {
    if let Some(path) = &config.database_path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "retreat", "pos")
        .ok_or_else(|| ApiError::internal("Could not determine app data directory"))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(|e| {
        ApiError::internal(format!("Could not create {}: {}", data_dir.display(), e))
    })?;

    Ok(data_dir.join("retreat.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_database_path_wins() {
        let config = ConfigState {
            database_path: Some(PathBuf::from("/srv/retreat/shop.db")),
            ..ConfigState::default()
        };
        assert_eq!(
            get_database_path(&config).unwrap(),
            PathBuf::from("/srv/retreat/shop.db")
        );
    }
}
