//! Patch sessions: own a line buffer for one target file, apply an ordered
//! specification against it, and commit the result atomically.
//!
//! Anchor resolution is sequential against the mutated buffer: each edit's
//! anchors resolve against the state left by all prior edits in the same
//! specification, so edit order is load-bearing. Edits are never applied in
//! parallel.

use crate::buffer::LineBuffer;
use crate::edit::{ChangeRecord, PatchSpecification};
use crate::error::{EditFailure, SessionError};
use crate::executor::EditExecutor;
use crate::matcher::MatchProfile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One patching session over one target file (or in-memory buffer).
#[derive(Debug)]
pub struct PatchSession {
    path: Option<PathBuf>,
    buffer: LineBuffer,
    /// The prepared text, kept for diffing and untouched on failure.
    pristine: String,
    profile: MatchProfile,
    changelog: Vec<ChangeRecord>,
    failed_edits: usize,
}

impl PatchSession {
    /// Read the target file into a fresh buffer. The file handle is released
    /// before this returns, on every path.
    pub fn prepare(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let text = fs::read_to_string(&path).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })?;
        let profile = MatchProfile::for_path(&path);
        debug!(path = %path.display(), ?profile, "session prepared");
        Ok(Self {
            buffer: LineBuffer::from_text(&text),
            pristine: text,
            path: Some(path),
            profile,
            changelog: Vec::new(),
            failed_edits: 0,
        })
    }

    /// Session over an already-loaded buffer; useful for dry-run callers.
    pub fn from_buffer(buffer: LineBuffer, profile: MatchProfile) -> Self {
        let pristine = buffer.to_text();
        Self {
            path: None,
            buffer,
            pristine,
            profile,
            changelog: Vec::new(),
            failed_edits: 0,
        }
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn pristine_text(&self) -> &str {
        &self.pristine
    }

    pub fn changelog(&self) -> &[ChangeRecord] {
        &self.changelog
    }

    /// Apply every edit strictly in specification order. Failures are
    /// aggregated (the remaining edits still run, for diagnostic
    /// completeness) and a failed session can no longer commit.
    pub fn apply(&mut self, spec: &PatchSpecification) -> Result<(), SessionError> {
        let executor = EditExecutor::new(self.profile);
        let mut failures = Vec::new();

        for (index, edit) in spec.edits.iter().enumerate() {
            match executor.apply(edit, &mut self.buffer) {
                Ok(records) => {
                    debug!(index, kind = %edit.kind(), splices = records.len(), "edit applied");
                    self.changelog.extend(records);
                }
                Err(error) => {
                    warn!(index, kind = %edit.kind(), %error, "edit failed");
                    failures.push(EditFailure {
                        index,
                        kind: edit.kind(),
                        error,
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            self.failed_edits += failures.len();
            Err(SessionError::EditsFailed {
                total: spec.edits.len(),
                failures,
            })
        }
    }

    /// Write the final buffer back to the target file atomically: either the
    /// complete post-edit content lands on disk or nothing changes. Consumes
    /// the session and returns the accumulated changelog.
    pub fn commit(self) -> Result<Vec<ChangeRecord>, SessionError> {
        if self.failed_edits > 0 {
            return Err(SessionError::CommitAfterFailure {
                failed: self.failed_edits,
            });
        }
        let Some(path) = &self.path else {
            // In-memory sessions have nothing to commit to; treat as a
            // successful dry run.
            return Ok(self.changelog);
        };

        atomic_write(path, self.buffer.to_text().as_bytes()).map_err(|source| {
            SessionError::Io {
                path: path.clone(),
                source,
            }
        })?;
        debug!(path = %path.display(), edits = self.changelog.len(), "committed");
        Ok(self.changelog)
    }

    /// Dry-run accessor: the final buffer and changelog, nothing written.
    pub fn into_preview(self) -> (LineBuffer, Vec<ChangeRecord>) {
        (self.buffer, self.changelog)
    }
}

/// Prepare, apply, and commit in one step.
pub fn apply_to_file(
    path: impl Into<PathBuf>,
    spec: &PatchSpecification,
) -> Result<Vec<ChangeRecord>, SessionError> {
    let mut session = PatchSession::prepare(path)?;
    session.apply(spec)?;
    session.commit()
}

/// Atomic file write: tempfile in the same directory, fsync, rename, then an
/// mtime bump so downstream watchers notice the change.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    filetime::set_file_mtime(path, filetime::FileTime::now())?;
    Ok(())
}
