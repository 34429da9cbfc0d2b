// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! oj-admin - administrative CLI for the job lifecycle daemon.
//!
//! Deliberately not `#[tokio::main]`: `serve --daemonize` has to fork before
//! any tokio runtime exists (a forked child does not inherit the parent's
//! worker threads), so `main` stays synchronous and builds the runtime
//! itself, after daemonizing, in the grandchild.

mod commands;
mod context;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use error::CliError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "oj-admin", version, about = "Job lifecycle daemon administration")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short = 'c', long = "config", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon
    Serve {
        /// Fork into the background before starting
        #[arg(long)]
        daemonize: bool,
    },
    /// Create the job table and its enum type
    CreateTables,
    /// Drop the job table
    DeleteTables,
    /// Drive a FAILED job back to INCOMING
    Resubmit { name: String },
    /// Print a job row
    Show {
        name: String,
        #[arg(short = 'o', long = "output", value_enum, default_value_t)]
        output: OutputFormat,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Serve { daemonize: true } = cli.command {
        if let Err(e) = jobsvc_daemon::daemonize() {
            eprintln!("Error: failed to daemonize: {e}");
            return ExitCode::FAILURE;
        }
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(dispatch(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Serve { .. } => commands::serve::run(&cli.config).await,
        Commands::CreateTables => commands::tables::create_tables(&cli.config).await,
        Commands::DeleteTables => commands::tables::delete_tables(&cli.config).await,
        Commands::Resubmit { name } => commands::resubmit::run(&cli.config, &name).await,
        Commands::Show { name, output } => commands::show::run(&cli.config, &name, output).await,
    }
}
