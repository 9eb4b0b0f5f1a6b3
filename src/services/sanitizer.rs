// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::SanitizeConfig;
use crate::domain::{
    ResultFile, SanitizeEntry, SanitizeOutcome, SanitizeReport, is_valid_root, local_name,
};
use crate::error::{Error, Result};
use crate::services::xml;

/// Copies test-result files whose root element is on the allow-list into a
/// mirrored destination tree. Anything malformed or unrecognized is left
/// behind and reported.
pub struct ResultSanitizer {
    source: PathBuf,
    dest: PathBuf,
    valid_roots: Vec<String>,
    candidates: GlobSet,
    dry_run: bool,
    cancel: CancellationToken,
}

impl ResultSanitizer {
    pub fn new(config: &SanitizeConfig) -> Result<Self> {
        Ok(Self {
            source: config.source_dir.clone(),
            dest: config.dest_dir.clone(),
            valid_roots: config.valid_roots.clone(),
            candidates: build_candidate_set(&config.extensions)?,
            dry_run: false,
            cancel: CancellationToken::new(),
        })
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Stop before the next file once `cancel` fires
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_candidate(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.candidates.is_match(Path::new(name)))
    }

    pub fn run(&self) -> Result<SanitizeReport> {
        if !self.dry_run {
            fs::create_dir_all(&self.dest)?;
        }

        let mut report = SanitizeReport {
            source_dir: self.source.clone(),
            dest_dir: self.dest.clone(),
            dry_run: self.dry_run,
            entries: Vec::new(),
        };

        for file in self.discover()? {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let outcome = self.process(&file);
            report.entries.push(SanitizeEntry {
                source: file.path,
                kind: file.kind,
                outcome,
            });
        }

        debug!(
            kept = report.kept(),
            non_matching = report.non_matching(),
            invalid = report.invalid(),
            "sanitize finished"
        );
        Ok(report)
    }

    /// Recursively list candidate files under the source root, in path order.
    pub fn discover(&self) -> Result<Vec<ResultFile>> {
        if !self.source.is_dir() {
            warn!(source = %self.source.display(), "source directory not found, nothing to sanitize");
            return Ok(Vec::new());
        }

        // Never re-ingest our own output when dest lives under source
        let dest_canonical = fs::canonicalize(&self.dest).ok();

        let mut files = Vec::new();
        if let Err(e) = self.collect(&self.source, dest_canonical.as_deref(), &mut files) {
            warn!(source = %self.source.display(), error = %e, "cannot read source directory");
        }
        Ok(files)
    }

    fn collect(&self, dir: &Path, skip: Option<&Path>, out: &mut Vec<ResultFile>) -> Result<()> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            entries.push((entry.path(), entry.file_type()?));
        }
        entries.sort_by(|(left, _), (right, _)| left.cmp(right));

        for (path, file_type) in entries {
            if file_type.is_dir() {
                if skip.is_some() && fs::canonicalize(&path).ok().as_deref() == skip {
                    debug!(path = %path.display(), "skipping destination directory");
                    continue;
                }
                if let Err(e) = self.collect(&path, skip, out) {
                    warn!(path = %path.display(), error = %e, "cannot read directory");
                }
                continue;
            }

            let is_file = if file_type.is_symlink() {
                // Follow links to files, not to directories
                fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false)
            } else {
                file_type.is_file()
            };

            if is_file && self.is_candidate(&path) {
                if let Some(file) = ResultFile::new(&self.source, path) {
                    out.push(file);
                }
            }
        }
        Ok(())
    }

    fn process(&self, file: &ResultFile) -> SanitizeOutcome {
        let bytes = match fs::read(&file.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return SanitizeOutcome::Invalid {
                    reason: e.to_string(),
                };
            }
        };

        let root = match xml::root_element(&bytes) {
            Ok(root) => root,
            Err(e) => {
                debug!(path = %file.path.display(), error = %e, "invalid test file");
                return SanitizeOutcome::Invalid {
                    reason: e.to_string(),
                };
            }
        };

        if !is_valid_root(&root, &self.valid_roots) {
            let name = local_name(&root);
            debug!(path = %file.path.display(), root = name, "non-matching root");
            return SanitizeOutcome::NonMatchingRoot {
                root: name.to_string(),
            };
        }

        let dest = file.destination(&self.dest);
        if !self.dry_run {
            if let Err(e) = write_mirrored(&dest, &bytes) {
                return SanitizeOutcome::Invalid {
                    reason: format!("cannot write {}: {e}", dest.display()),
                };
            }
        }
        debug!(path = %file.path.display(), dest = %dest.display(), "kept");
        SanitizeOutcome::Kept { dest }
    }
}

fn write_mirrored(dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, bytes)
}

fn build_candidate_set(extensions: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for ext in extensions {
        let ext = ext.trim().trim_start_matches('.');
        let glob = GlobBuilder::new(&format!("*.{ext}"))
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::Config(format!("invalid extension '{ext}': {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::Config(format!("invalid extension set: {e}")))
}
