//! Candidate selection: one explicit selector type with an explicit policy,
//! replacing per-call-site tie-break reimplementations.

use crate::matcher::strategies::MatchCandidate;
use thiserror::Error;
use tracing::debug;

/// How ties among equally ranked candidates are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Always resolve: minimal indent distance, then earliest start line.
    BestEffort,
    /// A tie at the minimal indent distance is an error rather than being
    /// silently resolved.
    StrictUnique,
}

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("no candidates to select from")]
    NoCandidates,

    #[error("{} candidates tied at minimal indent distance (lines {})", lines.len(), crate::error::fmt_lines(lines))]
    Ambiguous { lines: Vec<usize> },
}

/// Resolves a winning strategy's candidate set into a single position.
#[derive(Debug, Clone, Copy)]
pub struct MatchSelector {
    policy: SelectionPolicy,
}

impl MatchSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    /// Choose the candidate with minimal indent distance; ties break by
    /// document order, or fail under [`SelectionPolicy::StrictUnique`].
    pub fn select(&self, candidates: &[MatchCandidate]) -> Result<MatchCandidate, SelectionError> {
        let best_distance = candidates
            .iter()
            .map(|c| c.indent_distance)
            .min()
            .ok_or(SelectionError::NoCandidates)?;

        let mut tied: Vec<&MatchCandidate> = candidates
            .iter()
            .filter(|c| c.indent_distance == best_distance)
            .collect();
        tied.sort_by_key(|c| c.start);

        if tied.len() > 1 && self.policy == SelectionPolicy::StrictUnique {
            return Err(SelectionError::Ambiguous {
                lines: tied.iter().map(|c| c.start).collect(),
            });
        }

        let chosen = *tied[0];
        debug!(
            start = chosen.start,
            distance = chosen.indent_distance,
            tied = tied.len(),
            "selected candidate"
        );
        Ok(chosen)
    }
}
