// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

// miette's Diagnostic derive generates code that triggers this false positive
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::{ApprovalAction, ApprovalStatus};

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Cannot connect to Time Logging Service at {url}")]
    #[diagnostic(
        code(autonova::smoke::unreachable),
        help("Please start the service first: mvn spring-boot:run")
    )]
    ServiceUnavailable { url: String },

    #[error("Time Logging Service is not healthy at {url} (HTTP {status})")]
    #[diagnostic(
        code(autonova::smoke::unhealthy),
        help("Please start the service first: mvn spring-boot:run")
    )]
    ServiceUnhealthy { url: String, status: u16 },

    #[error("Unexpected HTTP {status} from {endpoint}: {body}")]
    #[diagnostic(code(autonova::smoke::status))]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{failed} of {total} smoke steps failed")]
    #[diagnostic(
        code(autonova::smoke::failed),
        help("Re-run with --verbose to see each request, or drop --strict")
    )]
    SmokeFailed { failed: usize, total: usize },

    #[error("Invalid time log: {0}")]
    #[diagnostic(code(autonova::timelog::invalid))]
    InvalidTimeLog(String),

    #[error("Cannot {action} a time log that is already {status}")]
    #[diagnostic(
        code(autonova::timelog::transition),
        help("Only PENDING time logs can be approved or rejected")
    )]
    InvalidTransition {
        status: ApprovalStatus,
        action: ApprovalAction,
    },

    #[error("Malformed XML: {0}")]
    #[diagnostic(code(autonova::sanitize::xml))]
    Xml(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(autonova::config::error))]
    Config(String),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Dialog error: {0}")]
    Dialog(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl From<dialoguer::Error> for Error {
    fn from(e: dialoguer::Error) -> Self {
        Error::Dialog(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
