use crate::edit::EditKind;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which part of an edit failed to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorLabel {
    Before,
    After,
    Pattern,
}

impl fmt::Display for AnchorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorLabel::Before => write!(f, "before"),
            AnchorLabel::After => write!(f, "after"),
            AnchorLabel::Pattern => write!(f, "search pattern"),
        }
    }
}

/// Failure of a single edit. Never mutates the buffer it was applied to.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("malformed {kind} edit: {reason}")]
    MalformedEdit { kind: EditKind, reason: String },

    #[error("{label} anchor not found by any strategy:\n{pattern}\nnearest candidate region:\n{excerpt}")]
    MissingAnchor {
        label: AnchorLabel,
        /// Whitespace-visualized rendering of the attempted pattern.
        pattern: String,
        /// Whitespace-visualized rendering of the best near-miss in the buffer.
        excerpt: String,
    },

    #[error("pattern matched {} equally ranked locations (lines {})", lines.len(), fmt_lines(lines))]
    AmbiguousMatch {
        /// 0-based start lines of the tied candidates; displayed 1-based.
        lines: Vec<usize>,
    },

    #[error("{kind} edit located its anchor but left the buffer unchanged")]
    NoOp { kind: EditKind },
}

/// Render 0-based line indices 1-based, matching the numbered excerpts
/// produced by the diagnostics renderer.
pub(crate) fn fmt_lines(lines: &[usize]) -> String {
    let shown: Vec<String> = lines.iter().map(|line| (line + 1).to_string()).collect();
    format!("[{}]", shown.join(", "))
}

/// One failed edit inside a specification, tagged with its position.
#[derive(Debug)]
pub struct EditFailure {
    /// Index of the edit in the specification (application order).
    pub index: usize,
    pub kind: EditKind,
    pub error: PatchError,
}

impl fmt::Display for EditFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edit #{} ({}): {}", self.index, self.kind, self.error)
    }
}

/// Session-level failure. `EditsFailed` aggregates every failed edit in the
/// specification so a caller sees all problems in one pass.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} of {total} edits failed", failures.len())]
    EditsFailed {
        total: usize,
        failures: Vec<EditFailure>,
    },

    #[error("refusing to commit: {failed} edits failed during apply")]
    CommitAfterFailure { failed: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_match_displays_one_based_lines() {
        let err = PatchError::AmbiguousMatch { lines: vec![0, 2] };
        assert_eq!(
            err.to_string(),
            "pattern matched 2 equally ranked locations (lines [1, 3])"
        );
    }
}
