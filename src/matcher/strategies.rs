//! The four matching strategies, each a pure function
//! `(pattern, buffer) -> Vec<MatchCandidate>`.
//!
//! The strategy set is closed and exhaustively known, so strategies are plain
//! functions tagged by [`MatchStrategy`] rather than trait objects.

use crate::indent::{declared_indent, indent_shape, indent_width, is_blank};
use std::fmt;
use tracing::trace;

/// Which strategy produced a candidate. Ordering here is the cascade's
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchStrategy {
    /// Right-trimmed per-line equality; leading whitespace must match.
    Exact,
    /// Per-line equality after trimming both ends; any reindentation
    /// tolerated, including non-uniform reindentation of individual lines.
    WhitespaceNormalized,
    /// Whitespace-normalized comparison after canonicalizing cosmetic
    /// signature differences (trailing return-type annotations).
    SyntaxAware,
    /// Whitespace-stripped content equality plus identical nesting shape.
    IndentPattern,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::Exact => write!(f, "exact"),
            MatchStrategy::WhitespaceNormalized => write!(f, "whitespace-normalized"),
            MatchStrategy::SyntaxAware => write!(f, "syntax-aware"),
            MatchStrategy::IndentPattern => write!(f, "indent-pattern"),
        }
    }
}

/// A position one strategy considers a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate {
    /// First matched line (0-based).
    pub start: usize,
    /// One past the last matched line.
    pub end: usize,
    pub strategy: MatchStrategy,
    /// Absolute difference between the candidate's actual indentation and the
    /// pattern's declared indentation; the selector minimizes this.
    pub indent_distance: usize,
}

/// Indentation of a matched window: its first non-blank line, falling back to
/// the first line. This is the "actual indentation" the transposer shifts
/// against.
pub fn actual_indent(window: &[String]) -> usize {
    window
        .iter()
        .find(|line| !is_blank(line))
        .or_else(|| window.first())
        .map(|line| indent_width(line))
        .unwrap_or(0)
}

fn candidate(
    buffer: &[String],
    start: usize,
    len: usize,
    strategy: MatchStrategy,
    declared: usize,
) -> MatchCandidate {
    let actual = actual_indent(&buffer[start..start + len]);
    MatchCandidate {
        start,
        end: start + len,
        strategy,
        indent_distance: actual.abs_diff(declared),
    }
}

/// Slide the pattern over the buffer, collecting every window that satisfies
/// `lines_match` for all line pairs.
fn scan(
    pattern: &[String],
    buffer: &[String],
    strategy: MatchStrategy,
    lines_match: impl Fn(&str, &str) -> bool,
) -> Vec<MatchCandidate> {
    let plen = pattern.len();
    if plen == 0 || plen > buffer.len() {
        return Vec::new();
    }
    let declared = declared_indent(pattern);
    let mut candidates = Vec::new();
    for start in 0..=buffer.len() - plen {
        let window = &buffer[start..start + plen];
        if window
            .iter()
            .zip(pattern)
            .all(|(b, p)| lines_match(b, p))
        {
            trace!(%strategy, start, "candidate window matched");
            candidates.push(candidate(buffer, start, plen, strategy, declared));
        }
    }
    candidates
}

/// Strategy 1: exact match. Right-trimmed equality, so trailing whitespace is
/// forgiven but leading whitespace must match byte-for-byte.
pub fn find_exact(pattern: &[String], buffer: &[String]) -> Vec<MatchCandidate> {
    scan(pattern, buffer, MatchStrategy::Exact, |b, p| {
        b.trim_end() == p.trim_end()
    })
}

/// Strategy 2: whitespace-normalized match. Strips both ends of every line
/// before comparing.
pub fn find_whitespace_normalized(pattern: &[String], buffer: &[String]) -> Vec<MatchCandidate> {
    scan(
        pattern,
        buffer,
        MatchStrategy::WhitespaceNormalized,
        |b, p| b.trim() == p.trim(),
    )
}

/// Canonicalize cosmetic signature differences on a definition line: a
/// trailing return-type annotation (`-> T`) immediately before a
/// block-opening `:` or `{` is dropped, and whitespace before that opener is
/// collapsed so annotated and unannotated forms compare equal.
///
/// `def f(x) -> int:` and `def f(x):` both canonicalize to `def f(x):`;
/// `fn f(x) -> i32 {` and `fn f(x) {` both canonicalize to `fn f(x){`.
pub fn canonicalize_signature(line: &str) -> String {
    let trimmed = line.trim();
    let Some(opener) = trimmed.chars().last().filter(|c| *c == ':' || *c == '{') else {
        return trimmed.to_string();
    };
    let mut body = trimmed[..trimmed.len() - opener.len_utf8()].trim_end();
    if let Some(arrow) = body.rfind("->") {
        let head = body[..arrow].trim_end();
        if head.ends_with(')') {
            body = head;
        }
    }
    format!("{body}{opener}")
}

/// Strategy 3: syntax-aware normalization. Whitespace-normalized comparison
/// over canonicalized lines; opt-in per file category.
pub fn find_syntax_aware(pattern: &[String], buffer: &[String]) -> Vec<MatchCandidate> {
    scan(pattern, buffer, MatchStrategy::SyntaxAware, |b, p| {
        canonicalize_signature(b) == canonicalize_signature(p)
    })
}

/// Strategy 4: indentation-pattern match. Content must be equal after
/// whitespace-stripping and the sequence of indentation deltas between
/// consecutive lines must be identical, so a rescaled nesting shape still
/// matches as long as relative topology is preserved.
pub fn find_indent_pattern(pattern: &[String], buffer: &[String]) -> Vec<MatchCandidate> {
    let plen = pattern.len();
    if plen == 0 || plen > buffer.len() {
        return Vec::new();
    }
    let declared = declared_indent(pattern);
    let pattern_shape = indent_shape(pattern);
    let mut candidates = Vec::new();
    for start in 0..=buffer.len() - plen {
        let window = &buffer[start..start + plen];
        let content_equal = window.iter().zip(pattern).all(|(b, p)| b.trim() == p.trim());
        if content_equal && indent_shape(window) == pattern_shape {
            trace!(start, "indent-pattern window matched");
            candidates.push(candidate(
                buffer,
                start,
                plen,
                MatchStrategy::IndentPattern,
                declared,
            ));
        }
    }
    candidates
}
