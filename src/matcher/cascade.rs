//! The strategy cascade: try each participating strategy in priority order
//! and return the first non-empty candidate set. Later strategies are never
//! tried once an earlier one succeeds.

use crate::matcher::strategies::{
    find_exact, find_indent_pattern, find_syntax_aware, find_whitespace_normalized,
    MatchCandidate,
};
use std::path::Path;
use tracing::debug;

/// Which strategies participate in the cascade for a given file category.
/// Exact matching always runs first.
///
/// The indentation-sensitive profile drops both trim-based strategies: for
/// languages where indentation is structure, a match must preserve nesting
/// topology, which only the indent-pattern strategy enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchProfile {
    pub whitespace_normalized: bool,
    pub syntax_aware: bool,
    pub indent_pattern: bool,
}

impl Default for MatchProfile {
    fn default() -> Self {
        Self::plain()
    }
}

impl MatchProfile {
    /// Default profile: exact, whitespace-normalized, indent-pattern.
    pub fn plain() -> Self {
        Self {
            whitespace_normalized: true,
            syntax_aware: false,
            indent_pattern: true,
        }
    }

    /// Brace-delimited source: as `plain`, plus syntax-aware signature
    /// canonicalization.
    pub fn braced() -> Self {
        Self {
            syntax_aware: true,
            ..Self::plain()
        }
    }

    /// Indentation-structured source: exact and indent-pattern only.
    pub fn indent_sensitive() -> Self {
        Self {
            whitespace_normalized: false,
            syntax_aware: false,
            indent_pattern: true,
        }
    }

    /// Pick a profile from a path's extension.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("py" | "pyi" | "yaml" | "yml" | "nim") => Self::indent_sensitive(),
            Some("rs" | "c" | "h" | "cpp" | "cc" | "go" | "java" | "js" | "ts" | "tsx") => {
                Self::braced()
            }
            _ => Self::plain(),
        }
    }
}

/// Run the cascade: candidates from the first strategy that yields any.
pub fn find_candidates(
    pattern: &[String],
    buffer: &[String],
    profile: &MatchProfile,
) -> Vec<MatchCandidate> {
    let passes: [(bool, fn(&[String], &[String]) -> Vec<MatchCandidate>); 4] = [
        (true, find_exact),
        (profile.whitespace_normalized, find_whitespace_normalized),
        (profile.syntax_aware, find_syntax_aware),
        (profile.indent_pattern, find_indent_pattern),
    ];

    for (enabled, find) in passes {
        if !enabled {
            continue;
        }
        let candidates = find(pattern, buffer);
        if !candidates.is_empty() {
            debug!(
                strategy = %candidates[0].strategy,
                count = candidates.len(),
                "cascade stopped at winning strategy"
            );
            return candidates;
        }
    }
    debug!("no strategy produced candidates");
    Vec::new()
}
