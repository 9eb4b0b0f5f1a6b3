// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use console::style;
use dialoguer::Confirm;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{Cli, Commands, SanitizeArgs, SmokeArgs};
use crate::config::Config;
use crate::domain::{SanitizeEntry, SanitizeOutcome, SanitizeReport, StepOutcome, StepResult};
use crate::error::{Error, Result};
use crate::services::{
    sanitizer::ResultSanitizer, smoke::SmokeRunner, timelog_client::TimeLogClient,
};

pub struct App {
    cli: Cli,
    config: Config,
    cancel_token: CancellationToken,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        let config = Config::load(&cli)?;
        debug!(
            source = %config.sanitize.source_dir.display(),
            dest = %config.sanitize.dest_dir.display(),
            base_url = %config.smoke.base_url,
            "config loaded"
        );
        let cancel_token = CancellationToken::new();
        Ok(Self {
            cli,
            config,
            cancel_token,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup Ctrl+C handler with CancellationToken
        let cancel = self.cancel_token.clone();
        tokio::spawn(async move {
            signal::ctrl_c().await.ok();
            cancel.cancel();
        });

        match &self.cli.command {
            Commands::Sanitize(args) => self.sanitize(args).await,
            Commands::Smoke(args) => self.smoke(args).await,
            Commands::Init { yes } => self.init(*yes),
            Commands::Config => {
                let rendered = toml::to_string_pretty(&self.config)
                    .map_err(|e| Error::Config(e.to_string()))?;
                if let Some(ref path) = Config::config_path() {
                    let status = if path.exists() { "found" } else { "not found" };
                    eprintln!(
                        "{}",
                        style(format!("# user config: {} ({})", path.display(), status)).dim()
                    );
                }
                println!("{}", rendered);
                Ok(())
            }
            Commands::Completions { shell } => {
                let mut cmd = <Cli as clap::CommandFactory>::command();
                clap_complete::generate(*shell, &mut cmd, "autonova-ci", &mut std::io::stdout());
                Ok(())
            }
        }
    }

    // ─── Sanitize ───

    async fn sanitize(&self, args: &SanitizeArgs) -> Result<()> {
        let sanitizer = ResultSanitizer::new(&self.config.sanitize)?
            .dry_run(args.dry_run)
            .cancel_token(self.cancel_token.clone());

        self.print_status(&format!(
            "Sanitizing {} -> {}{}",
            self.config.sanitize.source_dir.display(),
            self.config.sanitize.dest_dir.display(),
            if args.dry_run { " (dry run)" } else { "" }
        ));

        // Off the runtime threads so the Ctrl+C listener keeps running
        let report = tokio::task::spawn_blocking(move || sanitizer.run())
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;

        for entry in &report.entries {
            self.print_entry(entry);
        }
        eprintln!("{}", Self::sanitize_summary(&report));

        if args.json {
            let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
            println!("{}", json);
        }

        Ok(())
    }

    fn print_entry(&self, entry: &SanitizeEntry) {
        let path = entry.source.display();
        match &entry.outcome {
            SanitizeOutcome::Kept { .. } => {
                eprintln!("{} Kept: {}", style("✓").green().bold(), path);
            }
            SanitizeOutcome::NonMatchingRoot { root } => {
                self.print_warning(&format!(
                    "Skipping non-junit/trx file (root=\"{root}\"): {path}"
                ));
            }
            SanitizeOutcome::Invalid { reason } => {
                self.print_warning(&format!("Skipping invalid test file: {path} -> {reason}"));
            }
        }
    }

    fn sanitize_summary(report: &SanitizeReport) -> String {
        format!(
            "{} {} kept, {} non-matching, {} invalid",
            style("info:").cyan(),
            report.kept(),
            report.non_matching(),
            report.invalid()
        )
    }

    // ─── Smoke ───

    async fn smoke(&self, args: &SmokeArgs) -> Result<()> {
        self.print_status(&format!(
            "Time Logging Service smoke test against {}",
            self.config.smoke.base_url
        ));

        let client = TimeLogClient::new(&self.config.smoke)?;
        let runner = SmokeRunner::new(&client, &self.config.smoke);

        let (tx, mut rx) = mpsc::channel::<StepResult>(16);
        let print_handle = tokio::spawn(async move {
            while let Some(step) = rx.recv().await {
                print_step(&step);
            }
        });

        let result = runner.run(tx, self.cancel_token.clone()).await;
        let _ = print_handle.await;
        let report = result?;

        eprintln!();
        eprintln!(
            "{} {} passed, {} failed, {} skipped",
            style("info:").cyan(),
            report.passed(),
            report.failed(),
            report.skipped()
        );

        if args.strict && report.failed() > 0 {
            return Err(Error::SmokeFailed {
                failed: report.failed(),
                total: report.steps.len(),
            });
        }

        eprintln!("{} Smoke test completed!", style("✓").green().bold());
        Ok(())
    }

    // ─── Init ───

    fn init(&self, yes: bool) -> Result<()> {
        if let Some(path) = Config::config_path() {
            if path.exists() && !yes {
                let overwrite = Confirm::new()
                    .with_prompt(format!("{} exists. Overwrite?", path.display()))
                    .default(false)
                    .interact()?;
                if !overwrite {
                    return Err(Error::Cancelled);
                }
            }
        }

        let path = Config::create_default()?;
        eprintln!(
            "{} Created config at {}",
            style("✓").green().bold(),
            path.display()
        );
        Ok(())
    }

    // ─── Output Helpers ───

    fn print_status(&self, msg: &str) {
        eprintln!("{} {}", style("→").cyan(), msg);
    }

    fn print_warning(&self, msg: &str) {
        eprintln!("{} {}", style("warning:").yellow().bold(), msg);
    }
}

fn print_step(step: &StepResult) {
    match &step.outcome {
        StepOutcome::Passed { detail } => {
            eprintln!("{} {}: {}", style("PASS").green().bold(), step.name, detail);
        }
        StepOutcome::Failed { reason } => {
            eprintln!("{} {}: {}", style("FAIL").red().bold(), step.name, reason);
        }
        StepOutcome::Skipped { reason } => {
            eprintln!("{} {}: {}", style("SKIP").dim(), step.name, reason);
        }
    }
}
