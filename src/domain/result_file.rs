// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Root elements accepted as test-result documents.
pub const DEFAULT_VALID_ROOTS: &[&str] = &["testsuite", "testsuites", "TestRun"];

/// File extensions (without the dot) considered candidates.
pub const DEFAULT_EXTENSIONS: &[&str] = &["xml", "trx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Xml,
    Trx,
}

impl ResultKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext.eq_ignore_ascii_case("trx") {
            Self::Trx
        } else {
            Self::Xml
        }
    }
}

/// A candidate test-result file found under the source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    pub path: PathBuf,
    /// Path relative to the source root, mirrored under the destination
    pub relative: PathBuf,
    pub kind: ResultKind,
}

impl ResultFile {
    pub fn new(root: &Path, path: PathBuf) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?.to_path_buf();
        let kind = ResultKind::from_path(&path);
        Some(Self {
            path,
            relative,
            kind,
        })
    }

    pub fn destination(&self, dest_root: &Path) -> PathBuf {
        dest_root.join(&self.relative)
    }
}

/// Strip any namespace qualifier from an element name.
///
/// Handles both Clark notation (`{urn:x}TestRun`) and prefixed names
/// (`ns:testsuite`).
pub fn local_name(tag: &str) -> &str {
    let tag = tag.rsplit_once('}').map_or(tag, |(_, rest)| rest);
    tag.rsplit_once(':').map_or(tag, |(_, rest)| rest)
}

pub fn is_valid_root<S: AsRef<str>>(tag: &str, valid_roots: &[S]) -> bool {
    let name = local_name(tag);
    valid_roots.iter().any(|r| r.as_ref() == name)
}
