// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

//! Smoke sequence tests against a mocked time-logging service.
//!
//! Uses `wiremock` so no running Spring service is needed.

mod helpers;

use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use autonova_ci::config::SmokeConfig;
use autonova_ci::domain::{SmokeReport, StepOutcome, StepResult};
use autonova_ci::error::Error;
use autonova_ci::services::smoke::{
    STEP_APPROVE, STEP_CREATE, STEP_CREATE_FOR_REJECT, STEP_EMPLOYEE_LOGS, STEP_HEALTH,
    STEP_PENDING, STEP_REJECT, STEP_SUMMARY, SmokeRunner,
};
use autonova_ci::services::timelog_client::{TimeLogApi, TimeLogClient};
use helpers::smoke_config;

// ─── Test helpers ────────────────────────────────────────────────────────────

async fn mount_health(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/actuator/health"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"status": "UP"})))
        .mount(server)
        .await;
}

fn time_log(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "employeeId": "emp-001",
        "employeeName": "Nimal Perera",
        "projectId": "proj-001",
        "taskId": "task-001",
        "taskName": "Brake inspection",
        "hours": 2.5,
        "approvalStatus": status
    })
}

/// Mount the whole happy path: two creates (log-1, then log-2), one pending
/// log (log-0), approve/reject, and the summary.
async fn mount_happy_path(server: &MockServer) {
    mount_health(server, 200).await;

    Mock::given(method("POST"))
        .and(path("/api/time-logs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(time_log("log-1", "PENDING")))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/time-logs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(time_log("log-2", "PENDING")))
        .with_priority(2)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/time-logs/employee/emp-001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([time_log("log-1", "PENDING")])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/time-logs/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([time_log("log-0", "PENDING")])))
        .mount(server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/time-logs/log-0/approve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(time_log("log-0", "APPROVED")))
        .mount(server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/time-logs/log-2/reject"))
        .and(body_json(json!({"reason": SmokeConfig::default().reject_reason})))
        .respond_with(ResponseTemplate::new(200).set_body_json(time_log("log-2", "REJECTED")))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/time-logs/employee/emp-001/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "employeeId": "emp-001",
            "employeeName": "Nimal Perera",
            "totalHoursLogged": 2.5,
            "hourlyRate": 1500.0
        })))
        .mount(server)
        .await;
}

async fn run_smoke(config: &SmokeConfig) -> (autonova_ci::Result<SmokeReport>, Vec<StepResult>) {
    let client = TimeLogClient::new(config).unwrap();
    let runner = SmokeRunner::new(&client, config);
    let (tx, mut rx) = mpsc::channel(32);

    let result = runner.run(tx, CancellationToken::new()).await;

    let mut streamed = Vec::new();
    while let Some(step) = rx.recv().await {
        streamed.push(step);
    }
    (result, streamed)
}

fn names(report: &SmokeReport) -> Vec<&str> {
    report.steps.iter().map(|s| s.name.as_str()).collect()
}

fn outcome<'a>(report: &'a SmokeReport, name: &str) -> &'a StepOutcome {
    &report
        .steps
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("step {name} not recorded"))
        .outcome
}

// ─── Happy path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_sequence_runs_in_order() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let (result, streamed) = run_smoke(&smoke_config(&server.uri())).await;
    let report = result.unwrap();

    assert_eq!(
        names(&report),
        vec![
            STEP_HEALTH,
            STEP_CREATE,
            STEP_EMPLOYEE_LOGS,
            STEP_PENDING,
            STEP_APPROVE,
            STEP_CREATE_FOR_REJECT,
            STEP_REJECT,
            STEP_SUMMARY,
        ]
    );
    assert_eq!(report.passed(), 8, "report: {report:?}");
    assert_eq!(report.failed(), 0);
    assert_eq!(streamed, report.steps, "every step is streamed as it completes");
}

#[tokio::test]
async fn step_details_describe_the_service_response() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let (result, _) = run_smoke(&smoke_config(&server.uri())).await;
    let report = result.unwrap();

    assert_eq!(
        outcome(&report, STEP_CREATE),
        &StepOutcome::Passed {
            detail: "created time log log-1 with status PENDING".into()
        }
    );
    assert_eq!(
        outcome(&report, STEP_EMPLOYEE_LOGS),
        &StepOutcome::Passed {
            detail: "retrieved 1 time logs; latest: 2.5 hours on Brake inspection".into()
        }
    );
    assert_eq!(
        outcome(&report, STEP_SUMMARY),
        &StepOutcome::Passed {
            detail: "employee Nimal Perera has 2.5 total hours".into()
        }
    );
}

#[tokio::test]
async fn create_sends_camel_case_draft() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/api/time-logs"))
        .and(body_json(json!({
            "employeeId": "emp-001",
            "projectId": "proj-001",
            "taskId": "task-001",
            "hours": 2.5,
            "note": "Smoke test from autonova-ci"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(time_log("log-1", "PENDING")))
        .expect(1)
        .mount(&server)
        .await;

    let config = smoke_config(&server.uri());
    let client = TimeLogClient::new(&config).unwrap();
    let created = client.create(&SmokeRunner::new(&client, &config).draft()).await.unwrap();

    assert_eq!(created.id, "log-1");
}

// ─── Health check ────────────────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_service_aborts() {
    let config = smoke_config("http://127.0.0.1:1");

    let (result, streamed) = run_smoke(&config).await;

    let err = result.unwrap_err();
    assert!(
        matches!(err, Error::ServiceUnavailable { .. }),
        "expected ServiceUnavailable, got: {err:?}"
    );
    assert!(streamed.is_empty());
}

#[tokio::test]
async fn unhealthy_service_aborts_before_any_time_log_call() {
    let server = MockServer::start().await;
    mount_health(&server, 503).await;

    let (result, _) = run_smoke(&smoke_config(&server.uri())).await;

    match result.unwrap_err() {
        Error::ServiceUnhealthy { status, .. } => assert_eq!(status, 503),
        other => panic!("expected ServiceUnhealthy, got: {other:?}"),
    }
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "only the health endpoint is called");
}

// ─── Degradation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_create_skips_dependent_steps() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/api/time-logs"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Task ID is required"))
        .mount(&server)
        .await;

    let (result, _) = run_smoke(&smoke_config(&server.uri())).await;
    let report = result.unwrap();

    match outcome(&report, STEP_CREATE) {
        StepOutcome::Failed { reason } => {
            assert!(reason.contains("400"), "reason: {reason}");
            assert!(reason.contains("Task ID is required"), "reason: {reason}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(report.skipped(), 6);
    assert_eq!(report.steps.len(), 8);
    assert!(matches!(
        outcome(&report, STEP_SUMMARY),
        StepOutcome::Skipped { .. }
    ));
}

#[tokio::test]
async fn failing_step_does_not_stop_the_sequence() {
    let server = MockServer::start().await;
    // Higher priority than the happy-path listing mock
    Mock::given(method("GET"))
        .and(path("/api/time-logs/employee/emp-001"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_happy_path(&server).await;

    let (result, _) = run_smoke(&smoke_config(&server.uri())).await;
    let report = result.unwrap();

    assert!(matches!(
        outcome(&report, STEP_EMPLOYEE_LOGS),
        StepOutcome::Failed { .. }
    ));
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        outcome(&report, STEP_SUMMARY),
        StepOutcome::Passed { .. }
    ));
}

#[tokio::test]
async fn no_pending_logs_skips_approval_and_rejection() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/api/time-logs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(time_log("log-1", "PENDING")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/time-logs/employee/emp-001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/time-logs/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/time-logs/employee/emp-001/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalHours": 0})))
        .mount(&server)
        .await;

    let (result, _) = run_smoke(&smoke_config(&server.uri())).await;
    let report = result.unwrap();

    for name in [STEP_APPROVE, STEP_CREATE_FOR_REJECT, STEP_REJECT] {
        assert!(
            matches!(outcome(&report, name), StepOutcome::Skipped { .. }),
            "{name} should be skipped"
        );
    }
    assert_eq!(
        outcome(&report, STEP_SUMMARY),
        &StepOutcome::Passed {
            detail: "employee emp-001 has 0 total hours".into()
        }
    );
}

#[tokio::test]
async fn unexpected_status_after_approve_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/time-logs/log-0/approve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(time_log("log-0", "REJECTED")))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_happy_path(&server).await;

    let (result, _) = run_smoke(&smoke_config(&server.uri())).await;
    let report = result.unwrap();

    match outcome(&report, STEP_APPROVE) {
        StepOutcome::Failed { reason } => assert!(reason.contains("expected APPROVED"), "{reason}"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(matches!(
        outcome(&report, STEP_REJECT),
        StepOutcome::Passed { .. }
    ));
}

#[tokio::test]
async fn invalid_draft_is_never_sent() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;

    let config = SmokeConfig {
        hours: 25.0,
        ..smoke_config(&server.uri())
    };
    let (result, _) = run_smoke(&config).await;
    let report = result.unwrap();

    match outcome(&report, STEP_CREATE) {
        StepOutcome::Failed { reason } => assert!(reason.contains("cannot exceed"), "{reason}"),
        other => panic!("expected failure, got {other:?}"),
    }
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn cancellation_stops_between_steps() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let config = smoke_config(&server.uri());
    let client = TimeLogClient::new(&config).unwrap();
    let runner = SmokeRunner::new(&client, &config);
    let (tx, _rx) = mpsc::channel(32);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = runner.run(tx, cancel).await;

    assert!(matches!(result, Err(Error::Cancelled)));
}

/// Run the sequence with the token cancelled shortly after start
async fn run_and_cancel(config: &SmokeConfig) -> (autonova_ci::Result<SmokeReport>, Vec<StepResult>) {
    let client = TimeLogClient::new(config).unwrap();
    let runner = SmokeRunner::new(&client, config);
    let (tx, mut rx) = mpsc::channel(32);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(10), runner.run(tx, cancel))
        .await
        .expect("cancellation must interrupt the pending request");

    let mut streamed = Vec::new();
    while let Some(step) = rx.recv().await {
        streamed.push(step);
    }
    (result, streamed)
}

#[tokio::test]
async fn cancellation_interrupts_hanging_health_check() {
    // Accepts connections at the socket level but never answers
    let silent = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", silent.local_addr().unwrap());

    let config = SmokeConfig {
        timeout_secs: None,
        ..smoke_config(&uri)
    };
    let (result, streamed) = run_and_cancel(&config).await;

    assert!(matches!(result, Err(Error::Cancelled)), "got {result:?}");
    assert!(streamed.is_empty());
}

#[tokio::test]
async fn cancellation_interrupts_hanging_step() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/api/time-logs"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(time_log("log-1", "PENDING"))
                .set_delay(Duration::from_secs(60)),
        )
        .mount(&server)
        .await;

    let config = SmokeConfig {
        timeout_secs: None,
        ..smoke_config(&server.uri())
    };
    let (result, streamed) = run_and_cancel(&config).await;

    assert!(matches!(result, Err(Error::Cancelled)), "got {result:?}");
    let names: Vec<_> = streamed.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec![STEP_HEALTH], "a cancelled step is not recorded");
}

#[tokio::test]
async fn listed_log_is_decided_even_if_not_pending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/time-logs/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([time_log("log-0", "APPROVED")])))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/time-logs/log-0/approve"))
        .respond_with(ResponseTemplate::new(409).set_body_string("already approved"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_happy_path(&server).await;

    let (result, _) = run_smoke(&smoke_config(&server.uri())).await;
    let report = result.unwrap();

    match outcome(&report, STEP_APPROVE) {
        StepOutcome::Failed { reason } => assert!(reason.contains("409"), "{reason}"),
        other => panic!("expected failure, got {other:?}"),
    }
}

// ─── Client URLs ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/time-logs/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = SmokeConfig {
        base_url: format!("{}/api/", server.uri()),
        ..smoke_config(&server.uri())
    };
    let client = TimeLogClient::new(&config).unwrap();

    assert!(client.pending().await.unwrap().is_empty());
}
