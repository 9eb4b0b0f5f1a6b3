// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::SmokeConfig;
use crate::domain::{EmployeeSummary, RejectRequest, TimeLog, TimeLogDraft};
use crate::error::{Error, Result};

/// The slice of the time-logging REST API the smoke sequence touches.
#[async_trait]
pub trait TimeLogApi: Send + Sync {
    /// Fails with `ServiceUnavailable` or `ServiceUnhealthy`
    async fn health(&self) -> Result<()>;

    async fn create(&self, draft: &TimeLogDraft) -> Result<TimeLog>;

    async fn by_employee(&self, employee_id: &str) -> Result<Vec<TimeLog>>;

    async fn pending(&self) -> Result<Vec<TimeLog>>;

    async fn approve(&self, id: &str) -> Result<TimeLog>;

    async fn reject(&self, id: &str, reason: &str) -> Result<TimeLog>;

    async fn employee_summary(&self, employee_id: &str) -> Result<EmployeeSummary>;
}

pub struct TimeLogClient {
    client: Client,
    base: Url,
    health: Url,
}

impl TimeLogClient {
    pub fn new(config: &SmokeConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let base = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("smoke.base_url: {e}")))?;
        let health = Url::parse(&config.health_url)
            .map_err(|e| Error::Config(format!("smoke.health_url: {e}")))?;

        Ok(Self {
            client,
            base,
            health,
        })
    }

    /// `{base}/time-logs/{segments...}`, each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("smoke.base_url cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .push("time-logs")
            .extend(segments);
        Ok(url)
    }

    async fn expect_json<T: DeserializeOwned>(
        response: Response,
        expected: StatusCode,
    ) -> Result<T> {
        let status = response.status();
        let endpoint = response.url().path().to_string();
        debug!(%endpoint, status = status.as_u16(), "response received");

        if status != expected {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UnexpectedStatus {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TimeLogApi for TimeLogClient {
    async fn health(&self) -> Result<()> {
        let url = self.health.to_string();
        let response = self
            .client
            .get(self.health.clone())
            .send()
            .await
            .map_err(|_| Error::ServiceUnavailable { url: url.clone() })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::ServiceUnhealthy {
                url,
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn create(&self, draft: &TimeLogDraft) -> Result<TimeLog> {
        let response = self
            .client
            .post(self.endpoint(&[])?)
            .json(draft)
            .send()
            .await?;
        Self::expect_json(response, StatusCode::CREATED).await
    }

    async fn by_employee(&self, employee_id: &str) -> Result<Vec<TimeLog>> {
        let response = self
            .client
            .get(self.endpoint(&["employee", employee_id])?)
            .send()
            .await?;
        Self::expect_json(response, StatusCode::OK).await
    }

    async fn pending(&self) -> Result<Vec<TimeLog>> {
        let response = self
            .client
            .get(self.endpoint(&["pending"])?)
            .send()
            .await?;
        Self::expect_json(response, StatusCode::OK).await
    }

    async fn approve(&self, id: &str) -> Result<TimeLog> {
        let response = self
            .client
            .patch(self.endpoint(&[id, "approve"])?)
            .send()
            .await?;
        Self::expect_json(response, StatusCode::OK).await
    }

    async fn reject(&self, id: &str, reason: &str) -> Result<TimeLog> {
        let response = self
            .client
            .patch(self.endpoint(&[id, "reject"])?)
            .json(&RejectRequest {
                reason: reason.to_string(),
            })
            .send()
            .await?;
        Self::expect_json(response, StatusCode::OK).await
    }

    async fn employee_summary(&self, employee_id: &str) -> Result<EmployeeSummary> {
        let response = self
            .client
            .get(self.endpoint(&["employee", employee_id, "summary"])?)
            .send()
            .await?;
        Self::expect_json(response, StatusCode::OK).await
    }
}
