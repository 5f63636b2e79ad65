// SPDX-License-Identifier: AGPL-3.0-or-later
//! filekit CLI
//!
//! Drives the file handle layer the way a file manager would.

mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fk")]
#[command(author, version, about = "filekit - uniform file handles across backends", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List directory contents
    #[command(alias = "dir")]
    Ls {
        /// Location to list (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Long format with details
        #[arg(short, long)]
        long: bool,

        /// Show all files including hidden
        #[arg(short, long)]
        all: bool,

        /// Human-readable sizes
        #[arg(short = 'H', long)]
        human: bool,
    },

    /// Display file contents
    Cat {
        /// File to display
        path: String,
    },

    /// Move or rename a file, copying across backends when needed
    Mv {
        /// Source location
        source: String,

        /// Destination location
        dest: String,
    },

    /// Remove files or empty directories
    Rm {
        /// Location(s) to remove
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Create directories inside an existing directory
    Mkdir {
        /// Directory to create them in
        parent: String,

        /// Names of the new directories
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show file or directory information
    Stat {
        /// Location to inspect
        path: String,

        /// Print the metadata snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// List filesystem roots
    Roots,

    /// List registered backends
    Backends,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Ls { path, long, all, human } => commands::ls(&path, long, all, human),
        Commands::Cat { path } => commands::cat(&path),
        Commands::Mv { source, dest } => commands::mv(&source, &dest),
        Commands::Rm { paths } => commands::rm(&paths),
        Commands::Mkdir { parent, names } => commands::mkdir(&parent, &names),
        Commands::Stat { path, json } => commands::stat(&path, json),
        Commands::Roots => commands::roots(),
        Commands::Backends => commands::backends(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
