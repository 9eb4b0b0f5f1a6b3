// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

//! Time-log payloads exchanged with the time-logging service, plus the two
//! rules every client should agree on: hour bounds and approval transitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MAX_HOURS_PER_DAY: f64 = 24.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Approved => write!(f, "APPROVED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalAction {
    Approve,
    Reject,
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

impl ApprovalAction {
    /// The status a pending log ends up in after this action
    pub fn decided_status(self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }
}

impl ApprovalStatus {
    /// Apply an approval decision. Only pending logs can be decided, so a
    /// second approval (or any change of mind) is rejected.
    pub fn apply(self, action: ApprovalAction) -> Result<Self> {
        match (self, action) {
            (Self::Pending, action) => Ok(action.decided_status()),
            (status, action) => Err(Error::InvalidTransition { status, action }),
        }
    }

    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Request body for `POST /time-logs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLogDraft {
    pub employee_id: String,
    pub project_id: String,
    pub task_id: String,
    pub hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TimeLogDraft {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("employeeId", &self.employee_id),
            ("projectId", &self.project_id),
            ("taskId", &self.task_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidTimeLog(format!("{field} is required")));
            }
        }

        if self.hours.is_nan() || self.hours <= 0.0 {
            return Err(Error::InvalidTimeLog(format!(
                "hours must be greater than 0, got {}",
                self.hours
            )));
        }
        if self.hours > MAX_HOURS_PER_DAY {
            return Err(Error::InvalidTimeLog(format!(
                "hours cannot exceed {MAX_HOURS_PER_DAY} per day, got {}",
                self.hours
            )));
        }

        Ok(())
    }
}

/// A time log as returned by the service. Only `id` is relied upon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLog {
    pub id: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_title: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub hours: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub approval_status: Option<ApprovalStatus>,
    #[serde(default)]
    pub logged_at: Option<String>,
}

/// Request body for `PATCH /time-logs/{id}/reject`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, alias = "totalHours")]
    pub total_hours_logged: Option<f64>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub total_earnings: Option<f64>,
}
