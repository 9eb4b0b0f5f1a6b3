// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use clap::{Args, Parser};

#[derive(Parser, Debug)]
#[command(name = "autonova-ci")]
#[command(version)]
#[command(about = "Test-result sanitizing and time-logging API smoke tests", long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Copy well-formed JUnit/TRX results into a clean mirror tree
    Sanitize(SanitizeArgs),
    /// Run the time-logging API smoke sequence against a live service
    Smoke(SmokeArgs),
    /// Initialize config file
    Init {
        /// Overwrite an existing config file without asking
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct SanitizeArgs {
    /// Directory holding the raw test results
    #[arg(long, env = "AUTONOVA_CI_SOURCE")]
    pub source: Option<PathBuf>,

    /// Destination for the kept files
    #[arg(long, env = "AUTONOVA_CI_DEST")]
    pub dest: Option<PathBuf>,

    /// Classify files without copying anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct SmokeArgs {
    /// API root, e.g. http://localhost:8083/api
    #[arg(long, env = "AUTONOVA_CI_BASE_URL")]
    pub base_url: Option<String>,

    /// Health endpoint checked before any other call
    #[arg(long, env = "AUTONOVA_CI_HEALTH_URL")]
    pub health_url: Option<String>,

    /// Employee whose logs and summary are fetched
    #[arg(long)]
    pub employee_id: Option<String>,

    /// Exit with an error if any step failed
    #[arg(long)]
    pub strict: bool,
}
