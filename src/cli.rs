//! Command-line interface for pattern_challenge.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pattern & Logic Challenge - three-level puzzle game
#[derive(Parser, Debug)]
#[command(name = "pattern_challenge")]
#[command(about = "Pattern & Logic Challenge game server and terminal client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (defaults to pattern_challenge.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Play in the terminal
    Play {
        /// Game server URL. If not provided, sessions are kept in a local database.
        #[arg(long)]
        server_url: Option<String>,

        /// Local database file (overrides config; ignored with --server-url)
        #[arg(long)]
        db_path: Option<String>,

        /// Resume an existing session instead of starting a new one
        #[arg(long)]
        session: Option<String>,
    },
}
