// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::future::Future;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SmokeConfig;
use crate::domain::{
    ApprovalAction, ApprovalStatus, SmokeReport, StepOutcome, StepResult, TimeLog, TimeLogDraft,
};
use crate::error::{Error, Result};
use crate::services::timelog_client::TimeLogApi;

pub const STEP_HEALTH: &str = "health check";
pub const STEP_CREATE: &str = "create time log";
pub const STEP_EMPLOYEE_LOGS: &str = "get employee time logs";
pub const STEP_PENDING: &str = "get pending time logs";
pub const STEP_APPROVE: &str = "approve time log";
pub const STEP_CREATE_FOR_REJECT: &str = "create time log for rejection";
pub const STEP_REJECT: &str = "reject time log";
pub const STEP_SUMMARY: &str = "get employee summary";

/// Drives the create → read → approve/reject → summary sequence.
///
/// Only the health check is fatal. Every later step records its outcome and
/// degrades to an empty result so the remaining steps still run.
pub struct SmokeRunner<'a> {
    api: &'a dyn TimeLogApi,
    config: &'a SmokeConfig,
}

impl<'a> SmokeRunner<'a> {
    pub fn new(api: &'a dyn TimeLogApi, config: &'a SmokeConfig) -> Self {
        Self { api, config }
    }

    pub fn draft(&self) -> TimeLogDraft {
        TimeLogDraft {
            employee_id: self.config.employee_id.clone(),
            project_id: self.config.project_id.clone(),
            task_id: self.config.task_id.clone(),
            hours: self.config.hours,
            note: self.config.note.clone(),
        }
    }

    /// Run the sequence, streaming each step result to `progress` as it
    /// completes. Cancelling `cancel` aborts an in-flight request.
    pub async fn run(
        &self,
        progress: mpsc::Sender<StepResult>,
        cancel: CancellationToken,
    ) -> Result<SmokeReport> {
        let mut steps = Steps {
            report: SmokeReport::default(),
            progress,
        };

        cancellable(&cancel, self.api.health()).await?;
        steps
            .record(
                STEP_HEALTH,
                StepOutcome::Passed {
                    detail: "service is running".into(),
                },
            )
            .await;

        let Some(created) = self.create(&mut steps, &cancel, STEP_CREATE).await? else {
            for name in [
                STEP_EMPLOYEE_LOGS,
                STEP_PENDING,
                STEP_APPROVE,
                STEP_CREATE_FOR_REJECT,
                STEP_REJECT,
                STEP_SUMMARY,
            ] {
                steps.skip(name, "no time log was created").await;
            }
            return Ok(steps.report);
        };
        debug!(id = %created.id, "time log created");

        self.employee_logs(&mut steps, &cancel).await?;
        let pending = self.pending(&mut steps, &cancel).await?;

        match pending.first() {
            Some(first) => {
                self.decide(&mut steps, &cancel, STEP_APPROVE, first, ApprovalAction::Approve)
                    .await?;

                match self
                    .create(&mut steps, &cancel, STEP_CREATE_FOR_REJECT)
                    .await?
                {
                    Some(second) => {
                        self.decide(
                            &mut steps,
                            &cancel,
                            STEP_REJECT,
                            &second,
                            ApprovalAction::Reject,
                        )
                        .await?;
                    }
                    None => steps.skip(STEP_REJECT, "second time log was not created").await,
                }
            }
            None => {
                for name in [STEP_APPROVE, STEP_CREATE_FOR_REJECT, STEP_REJECT] {
                    steps.skip(name, "no pending time logs").await;
                }
            }
        }

        self.summary(&mut steps, &cancel).await?;

        info!(
            passed = steps.report.passed(),
            failed = steps.report.failed(),
            skipped = steps.report.skipped(),
            "smoke sequence finished"
        );
        Ok(steps.report)
    }

    async fn create(
        &self,
        steps: &mut Steps,
        cancel: &CancellationToken,
        name: &str,
    ) -> Result<Option<TimeLog>> {
        let draft = self.draft();
        let result = match draft.validate() {
            Ok(()) => cancellable(cancel, self.api.create(&draft)).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(log) => {
                let detail = format!(
                    "created time log {} with status {}",
                    log.id,
                    status_label(log.approval_status)
                );
                steps.record(name, StepOutcome::Passed { detail }).await;
                Ok(Some(log))
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                steps.fail(name, &e).await;
                Ok(None)
            }
        }
    }

    async fn employee_logs(
        &self,
        steps: &mut Steps,
        cancel: &CancellationToken,
    ) -> Result<Vec<TimeLog>> {
        match cancellable(cancel, self.api.by_employee(&self.config.employee_id)).await {
            Ok(logs) => {
                let mut detail = format!("retrieved {} time logs", logs.len());
                if let Some(latest) = logs.first() {
                    detail.push_str(&format!(
                        "; latest: {} hours on {}",
                        latest
                            .hours
                            .map_or_else(|| "?".to_string(), |h| h.to_string()),
                        latest.task_name.as_deref().unwrap_or("unknown task")
                    ));
                }
                steps
                    .record(STEP_EMPLOYEE_LOGS, StepOutcome::Passed { detail })
                    .await;
                Ok(logs)
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                steps.fail(STEP_EMPLOYEE_LOGS, &e).await;
                Ok(Vec::new())
            }
        }
    }

    async fn pending(&self, steps: &mut Steps, cancel: &CancellationToken) -> Result<Vec<TimeLog>> {
        match cancellable(cancel, self.api.pending()).await {
            Ok(logs) => {
                let detail = format!("{} pending logs found", logs.len());
                steps.record(STEP_PENDING, StepOutcome::Passed { detail }).await;
                Ok(logs)
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                steps.fail(STEP_PENDING, &e).await;
                Ok(Vec::new())
            }
        }
    }

    /// Approve or reject `log`, then check the returned status against the
    /// one a pending log moves to. The request is sent even when the listing
    /// already shows the log as decided; the service has the final say.
    async fn decide(
        &self,
        steps: &mut Steps,
        cancel: &CancellationToken,
        name: &str,
        log: &TimeLog,
        action: ApprovalAction,
    ) -> Result<()> {
        let listed = log.approval_status.unwrap_or_default();
        if listed.is_decided() {
            warn!(id = %log.id, status = %listed, %action, "listed time log is already decided");
        }
        let expected = action.decided_status();

        let result = match action {
            ApprovalAction::Approve => cancellable(cancel, self.api.approve(&log.id)).await,
            ApprovalAction::Reject => {
                cancellable(cancel, self.api.reject(&log.id, &self.config.reject_reason)).await
            }
        };

        match result {
            Ok(updated) => match updated.approval_status {
                Some(status) if status != expected => {
                    let reason =
                        format!("time log {} is {status} after {action}, expected {expected}", log.id);
                    steps.record(name, StepOutcome::Failed { reason }).await;
                }
                status => {
                    let detail = format!(
                        "time log {} now has status {}",
                        updated.id,
                        status_label(status)
                    );
                    steps.record(name, StepOutcome::Passed { detail }).await;
                }
            },
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => steps.fail(name, &e).await,
        }
        Ok(())
    }

    async fn summary(&self, steps: &mut Steps, cancel: &CancellationToken) -> Result<()> {
        match cancellable(cancel, self.api.employee_summary(&self.config.employee_id)).await {
            Ok(summary) => {
                let detail = format!(
                    "employee {} has {} total hours",
                    summary
                        .employee_name
                        .as_deref()
                        .unwrap_or(&self.config.employee_id),
                    summary
                        .total_hours_logged
                        .map_or_else(|| "?".to_string(), |h| h.to_string())
                );
                steps.record(STEP_SUMMARY, StepOutcome::Passed { detail }).await;
            }
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => steps.fail(STEP_SUMMARY, &e).await,
        }
        Ok(())
    }
}

struct Steps {
    report: SmokeReport,
    progress: mpsc::Sender<StepResult>,
}

impl Steps {
    async fn record(&mut self, name: &str, outcome: StepOutcome) {
        let step = StepResult {
            name: name.to_string(),
            outcome,
        };
        // The receiver only prints; a closed channel is not an error
        let _ = self.progress.send(step.clone()).await;
        self.report.steps.push(step);
    }

    async fn fail(&mut self, name: &str, error: &Error) {
        debug!(step = name, error = ?error, "smoke step failed");
        self.record(
            name,
            StepOutcome::Failed {
                reason: error.to_string(),
            },
        )
        .await;
    }

    async fn skip(&mut self, name: &str, reason: &str) {
        self.record(
            name,
            StepOutcome::Skipped {
                reason: reason.to_string(),
            },
        )
        .await;
    }
}

/// Race `call` against `cancel`; a cancelled token drops the request.
async fn cancellable<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = call => result,
    }
}

fn status_label(status: Option<ApprovalStatus>) -> String {
    status.map_or_else(|| "unknown".to_string(), |s| s.to_string())
}
