//! The edit data model: patterns, context anchors, the edit variants, and the
//! change records the session accumulates.
//!
//! An external collaborator (the change-description parser) constructs a
//! [`PatchSpecification`] from a textual description; everything here is also
//! serde-derived so the CLI can read specifications from JSON.

use crate::error::PatchError;
use crate::indent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered block of lines: either a literal block to find or one side of a
/// context anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern {
    pub lines: Vec<String>,
}

impl Pattern {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// The pattern's declared indentation: leading-whitespace width of its
    /// first non-blank line.
    pub fn declared_indent(&self) -> usize {
        indent::declared_indent(&self.lines)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }
}

/// Context anchor: one or both patterns used to locate an edit site. When
/// both sides are present they are located as a contiguous pair: `after` is
/// searched only in the region starting immediately after the `before` match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AnchorSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Pattern>,
}

impl AnchorSpec {
    pub fn before(pattern: Pattern) -> Self {
        Self {
            before: Some(pattern),
            after: None,
        }
    }

    pub fn after(pattern: Pattern) -> Self {
        Self {
            before: None,
            after: Some(pattern),
        }
    }

    pub fn between(before: Pattern, after: Pattern) -> Self {
        Self {
            before: Some(before),
            after: Some(after),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }
}

/// One structured edit against a line buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Edit {
    /// Replace the full matched span, context sides included.
    /// With a single anchor side, inserts adjacent to it instead.
    ReplaceBlock {
        anchor: AnchorSpec,
        new_content: Pattern,
    },
    /// Delete the matched span. With a single side, the one-extra-line rule
    /// applies: `before` deletes its match plus one following line, `after`
    /// deletes one preceding line plus its match.
    DeleteBlock { anchor: AnchorSpec },
    /// Like `ReplaceBlock`, but the matched context lines are preserved and
    /// only the interior (or adjacent region) receives the new content.
    AdaptBlock {
        anchor: AnchorSpec,
        new_content: Pattern,
    },
    /// Append verbatim at the end of the buffer; no matching, no
    /// transposition.
    AppendAtEnd { new_content: Pattern },
    /// Locate `pattern` and replace (or delete, when `replacement` is absent)
    /// each matched span. Without `allow_multiple` the match must be unique.
    SearchReplace {
        pattern: Pattern,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        replacement: Option<Pattern>,
        #[serde(default)]
        allow_multiple: bool,
    },
}

/// Discriminant of an [`Edit`], used in records and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    ReplaceBlock,
    DeleteBlock,
    AdaptBlock,
    AppendAtEnd,
    SearchReplace,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditKind::ReplaceBlock => write!(f, "replace_block"),
            EditKind::DeleteBlock => write!(f, "delete_block"),
            EditKind::AdaptBlock => write!(f, "adapt_block"),
            EditKind::AppendAtEnd => write!(f, "append_at_end"),
            EditKind::SearchReplace => write!(f, "search_replace"),
        }
    }
}

impl Edit {
    pub fn kind(&self) -> EditKind {
        match self {
            Edit::ReplaceBlock { .. } => EditKind::ReplaceBlock,
            Edit::DeleteBlock { .. } => EditKind::DeleteBlock,
            Edit::AdaptBlock { .. } => EditKind::AdaptBlock,
            Edit::AppendAtEnd { .. } => EditKind::AppendAtEnd,
            Edit::SearchReplace { .. } => EditKind::SearchReplace,
        }
    }

    /// Check that every field this variant's semantics require is present.
    pub fn validate(&self) -> Result<(), PatchError> {
        let malformed = |reason: &str| {
            Err(PatchError::MalformedEdit {
                kind: self.kind(),
                reason: reason.to_string(),
            })
        };

        match self {
            Edit::ReplaceBlock { anchor, .. }
            | Edit::AdaptBlock { anchor, .. }
            | Edit::DeleteBlock { anchor } => {
                if anchor.is_empty() {
                    return malformed("requires at least one anchor side");
                }
                if anchor.before.as_ref().is_some_and(Pattern::is_empty)
                    || anchor.after.as_ref().is_some_and(Pattern::is_empty)
                {
                    return malformed("anchor side present but empty");
                }
                Ok(())
            }
            Edit::AppendAtEnd { new_content } => {
                if new_content.is_empty() {
                    return malformed("requires content to append");
                }
                Ok(())
            }
            Edit::SearchReplace { pattern, .. } => {
                if pattern.is_empty() {
                    return malformed("requires a non-empty search pattern");
                }
                Ok(())
            }
        }
    }
}

/// Ordered list of edits, applied strictly in order, each against the buffer
/// state produced by all prior edits in the same specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PatchSpecification {
    pub edits: Vec<Edit>,
}

impl PatchSpecification {
    pub fn new(edits: Vec<Edit>) -> Self {
        Self { edits }
    }
}

/// Immutable audit entry appended after each successfully applied splice;
/// consumed by the external preview/diff layer.
///
/// `start..end` is the post-edit extent of `new`; for deletions `end == start`
/// and `original` holds the removed lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    pub kind: EditKind,
    pub original: Vec<String>,
    pub new: Vec<String>,
    pub start: usize,
    pub end: usize,
}
