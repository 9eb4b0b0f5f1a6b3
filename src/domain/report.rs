// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::path::PathBuf;

use serde::Serialize;

use super::ResultKind;

// ─── Sanitizer ───

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SanitizeOutcome {
    /// Copied (or would be, in dry-run) to `dest`
    Kept { dest: PathBuf },
    NonMatchingRoot { root: String },
    Invalid { reason: String },
}

impl SanitizeOutcome {
    pub fn is_kept(&self) -> bool {
        matches!(self, Self::Kept { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizeEntry {
    pub source: PathBuf,
    pub kind: ResultKind,
    #[serde(flatten)]
    pub outcome: SanitizeOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub dry_run: bool,
    pub entries: Vec<SanitizeEntry>,
}

impl SanitizeReport {
    pub fn kept(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_kept()).count()
    }

    pub fn non_matching(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, SanitizeOutcome::NonMatchingRoot { .. }))
            .count()
    }

    pub fn invalid(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, SanitizeOutcome::Invalid { .. }))
            .count()
    }
}

// ─── Smoke ───

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Passed { detail: String },
    Failed { reason: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub name: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SmokeReport {
    pub steps: Vec<StepResult>,
}

impl SmokeReport {
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::Passed { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&StepOutcome) -> bool) -> usize {
        self.steps.iter().filter(|s| pred(&s.outcome)).count()
    }
}
