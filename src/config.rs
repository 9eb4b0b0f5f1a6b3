// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::cli::{Cli, Commands};
use crate::domain::{DEFAULT_EXTENSIONS, DEFAULT_VALID_ROOTS, MAX_HOURS_PER_DAY};
use crate::error::{Error, Result};

pub const PROJECT_CONFIG_FILE: &str = ".autonova-ci.toml";

/// `[sanitize]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeConfig {
    /// Directory scanned for raw test results (default: test-results)
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Mirror tree receiving the kept files (default: test-results-clean)
    #[serde(default = "default_dest_dir")]
    pub dest_dir: PathBuf,

    /// Accepted root element local names
    #[serde(default = "default_valid_roots")]
    pub valid_roots: Vec<String>,

    /// Candidate extensions, matched case-insensitively
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            dest_dir: default_dest_dir(),
            valid_roots: default_valid_roots(),
            extensions: default_extensions(),
        }
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("test-results")
}
fn default_dest_dir() -> PathBuf {
    PathBuf::from("test-results-clean")
}
fn default_valid_roots() -> Vec<String> {
    DEFAULT_VALID_ROOTS.iter().map(|s| s.to_string()).collect()
}
fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

/// `[smoke]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmokeConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_health_url")]
    pub health_url: String,

    #[serde(default = "default_employee_id")]
    pub employee_id: String,

    #[serde(default = "default_project_id")]
    pub project_id: String,

    #[serde(default = "default_task_id")]
    pub task_id: String,

    #[serde(default = "default_hours")]
    pub hours: f64,

    #[serde(default = "default_note", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default = "default_reject_reason")]
    pub reject_reason: String,

    /// Per-request timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            health_url: default_health_url(),
            employee_id: default_employee_id(),
            project_id: default_project_id(),
            task_id: default_task_id(),
            hours: default_hours(),
            note: default_note(),
            reject_reason: default_reject_reason(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8083/api".into()
}
fn default_health_url() -> String {
    "http://localhost:8083/actuator/health".into()
}
fn default_employee_id() -> String {
    "emp-001".into()
}
fn default_project_id() -> String {
    "proj-001".into()
}
fn default_task_id() -> String {
    "task-001".into()
}
fn default_hours() -> f64 {
    2.5
}
fn default_note() -> Option<String> {
    Some("Smoke test from autonova-ci".into())
}
fn default_reject_reason() -> String {
    "Smoke test rejection from autonova-ci".into()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sanitize: SanitizeConfig,

    #[serde(default)]
    pub smoke: SmokeConfig,
}

impl Config {
    /// Load with priority: CLI > ENV > user config > project config > defaults
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Project-level config (.autonova-ci.toml in the working directory)
        if let Ok(cwd) = std::env::current_dir() {
            let project_config = cwd.join(PROJECT_CONFIG_FILE);
            if project_config.exists() {
                figment = figment.merge(Toml::file(&project_config));
            }
        }

        // User-level config
        if let Some(path) = Self::config_path() {
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
            }
        }

        // Environment variables, e.g. AUTONOVA_CI_SMOKE__BASE_URL
        figment = figment.merge(Env::prefixed("AUTONOVA_CI_").split("__"));

        // A broken section only matters to the command that reads it
        let (needs_sanitize, needs_smoke) = match &cli.command {
            Commands::Sanitize(_) => (true, false),
            Commands::Smoke(_) => (false, true),
            Commands::Config => (true, true),
            Commands::Init { .. } | Commands::Completions { .. } => (false, false),
        };

        let mut config = Config {
            sanitize: section(figment.extract_inner("sanitize"), "sanitize", needs_sanitize)?,
            smoke: section(figment.extract_inner("smoke"), "smoke", needs_smoke)?,
        };

        config.apply_cli(cli);
        if needs_sanitize {
            config.validate_sanitize()?;
        }
        if needs_smoke {
            config.validate_smoke()?;
        }
        Ok(config)
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "autonova-ci").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    fn apply_cli(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Sanitize(args) => {
                if let Some(ref source) = args.source {
                    self.sanitize.source_dir = source.clone();
                }
                if let Some(ref dest) = args.dest {
                    self.sanitize.dest_dir = dest.clone();
                }
            }
            Commands::Smoke(args) => {
                if let Some(ref url) = args.base_url {
                    self.smoke.base_url = url.clone();
                }
                if let Some(ref url) = args.health_url {
                    self.smoke.health_url = url.clone();
                }
                if let Some(ref id) = args.employee_id {
                    self.smoke.employee_id = id.clone();
                }
            }
            _ => {}
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_sanitize()?;
        self.validate_smoke()
    }

    pub fn validate_sanitize(&self) -> Result<()> {
        let s = &self.sanitize;
        if s.valid_roots.is_empty() || s.valid_roots.iter().any(|r| r.trim().is_empty()) {
            return Err(Error::Config(
                "sanitize.valid_roots must list at least one non-empty element name".into(),
            ));
        }
        if s.extensions.is_empty() || s.extensions.iter().any(|e| e.trim().is_empty()) {
            return Err(Error::Config(
                "sanitize.extensions must list at least one non-empty extension".into(),
            ));
        }
        if s.source_dir == s.dest_dir {
            return Err(Error::Config(format!(
                "sanitize.source_dir and sanitize.dest_dir must differ, both are '{}'",
                s.source_dir.display()
            )));
        }
        Ok(())
    }

    pub fn validate_smoke(&self) -> Result<()> {
        let m = &self.smoke;
        validate_http_url("smoke.base_url", &m.base_url)?;
        validate_http_url("smoke.health_url", &m.health_url)?;

        for (field, value) in [
            ("smoke.employee_id", &m.employee_id),
            ("smoke.project_id", &m.project_id),
            ("smoke.task_id", &m.task_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{field} cannot be empty")));
            }
        }

        if !(m.hours > 0.0 && m.hours <= MAX_HOURS_PER_DAY) {
            return Err(Error::Config(format!(
                "smoke.hours must be within (0, {MAX_HOURS_PER_DAY}], got {}",
                m.hours
            )));
        }

        if let Some(secs) = m.timeout_secs {
            if !(1..=3600).contains(&secs) {
                return Err(Error::Config(format!(
                    "smoke.timeout_secs must be 1–3600, got {secs}"
                )));
            }
        }

        Ok(())
    }

    /// Create default config file with secure permissions
    pub fn create_default() -> Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            return Err(Error::Config("Cannot determine config directory".into()));
        };

        fs::create_dir_all(&dir)?;

        let path = dir.join("config.toml");
        let content = r#"# autonova-ci configuration

[sanitize]
# Raw test results produced by the CI jobs
source_dir = "test-results"

# Mirror tree receiving only well-formed JUnit/TRX files
dest_dir = "test-results-clean"

# Root element names that mark a file as a test result
valid_roots = ["testsuite", "testsuites", "TestRun"]

# Candidate extensions (case-insensitive)
extensions = ["xml", "trx"]

[smoke]
# Time Logging Service API root and Spring actuator health endpoint
base_url = "http://localhost:8083/api"
health_url = "http://localhost:8083/actuator/health"

# Fixture identifiers used for the created time logs
employee_id = "emp-001"
project_id = "proj-001"
task_id = "task-001"
hours = 2.5

reject_reason = "Smoke test rejection from autonova-ci"

# Per-request timeout in seconds (unset = wait indefinitely)
# timeout_secs = 30
"#;

        fs::write(&path, content)?;

        // Set secure permissions (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(path)
    }
}

fn section<T: Default>(
    extracted: std::result::Result<T, figment::Error>,
    name: &str,
    required: bool,
) -> Result<T> {
    match extracted {
        Ok(value) => Ok(value),
        Err(e) if required => Err(Error::Config(e.to_string())),
        Err(e) => {
            warn!(section = name, error = %e, "ignoring unusable config section");
            Ok(T::default())
        }
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| Error::Config(format!("{field} is not a valid URL ('{value}'): {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "{field} must start with http:// or https://, got '{value}'"
        )));
    }
    Ok(())
}
