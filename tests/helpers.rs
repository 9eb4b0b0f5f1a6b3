// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};

use autonova_ci::config::{SanitizeConfig, SmokeConfig};
use tempfile::TempDir;

pub const JUNIT_SUITE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="TimeLogServiceImplTest" tests="2" failures="0">
  <testcase name="createTimeLog" classname="TimeLogServiceImplTest" time="0.01"/>
  <testcase name="approveTimeLog" classname="TimeLogServiceImplTest" time="0.02"/>
</testsuite>
"#;

/// Source/dest layout mirroring the CI job: `<tmp>/test-results` and
/// `<tmp>/test-results-clean`
#[allow(dead_code)]
pub struct ResultTree {
    pub tmp: TempDir,
    pub source: PathBuf,
    pub dest: PathBuf,
}

#[allow(dead_code)]
impl ResultTree {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let source = tmp.path().join("test-results");
        let dest = tmp.path().join("test-results-clean");
        fs::create_dir_all(&source).expect("create source dir");
        Self { tmp, source, dest }
    }

    /// Write `contents` at `relative` under the source root
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.source.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn config(&self) -> SanitizeConfig {
        SanitizeConfig {
            source_dir: self.source.clone(),
            dest_dir: self.dest.clone(),
            ..SanitizeConfig::default()
        }
    }

    pub fn dest_file(&self, relative: &str) -> PathBuf {
        self.dest.join(relative)
    }
}

/// Path relative to `root`, with forward slashes
#[allow(dead_code)]
pub fn rel(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Smoke config pointed at a mock server's `/api` and `/actuator/health`
#[allow(dead_code)]
pub fn smoke_config(server_uri: &str) -> SmokeConfig {
    SmokeConfig {
        base_url: format!("{server_uri}/api"),
        health_url: format!("{server_uri}/actuator/health"),
        timeout_secs: Some(5),
        ..SmokeConfig::default()
    }
}
