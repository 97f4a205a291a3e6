//! The edit executor: applies one structured [`Edit`] to a line buffer via
//! the matcher cascade, the selector, and the indentation transposer.
//!
//! Each edit either produces one or more change records after mutating the
//! buffer, or a typed error without mutating anything.

use crate::buffer::LineBuffer;
use crate::diag;
use crate::edit::{AnchorSpec, ChangeRecord, Edit, EditKind, Pattern};
use crate::error::{AnchorLabel, PatchError};
use crate::indent;
use crate::matcher::strategies::actual_indent;
use crate::matcher::{
    find_candidates, MatchCandidate, MatchProfile, MatchSelector, MatchStrategy, SelectionError,
    SelectionPolicy,
};
use std::ops::Range;
use tracing::debug;

/// A located anchor: the full matched span plus the per-side candidates.
#[derive(Debug, Clone, Copy)]
struct AnchorSite {
    start: usize,
    end: usize,
    before: Option<MatchCandidate>,
    after: Option<MatchCandidate>,
}

impl AnchorSite {
    /// The candidate the transposer shifts against: the `before` side when
    /// present, otherwise `after`.
    fn shift_candidate(&self) -> MatchCandidate {
        match (self.before, self.after) {
            (Some(b), _) => b,
            (None, Some(a)) => a,
            (None, None) => unreachable!("anchor sites always have at least one side"),
        }
    }
}

/// Applies edits to a line buffer under a fixed match profile.
#[derive(Debug, Clone, Copy)]
pub struct EditExecutor {
    profile: MatchProfile,
}

impl EditExecutor {
    pub fn new(profile: MatchProfile) -> Self {
        Self { profile }
    }

    /// Apply one edit. On success the buffer is mutated and the splices are
    /// returned as change records, in application order. On failure the
    /// buffer is untouched.
    pub fn apply(
        &self,
        edit: &Edit,
        buffer: &mut LineBuffer,
    ) -> Result<Vec<ChangeRecord>, PatchError> {
        edit.validate()?;

        match edit {
            Edit::ReplaceBlock {
                anchor,
                new_content,
            } => {
                let site = self.locate_anchor(anchor, buffer)?;
                let new_lines = self.transposed(new_content, anchor, &site, buffer);
                let range = match (site.before, site.after) {
                    // Full span, both context sides included.
                    (Some(_), Some(_)) => site.start..site.end,
                    // Single-sided: insert adjacent to the anchor.
                    (Some(b), None) => b.end..b.end,
                    (None, Some(a)) => a.start..a.start,
                    (None, None) => unreachable!("validated above"),
                };
                self.splice_checked(buffer, range, new_lines, EditKind::ReplaceBlock)
            }

            Edit::AdaptBlock {
                anchor,
                new_content,
            } => {
                let site = self.locate_anchor(anchor, buffer)?;
                let new_lines = self.transposed(new_content, anchor, &site, buffer);
                let range = match (site.before, site.after) {
                    // Context lines preserved; only the interior changes.
                    (Some(b), Some(a)) => b.end..a.start,
                    (Some(b), None) => b.end..b.end,
                    (None, Some(a)) => a.start..a.start,
                    (None, None) => unreachable!("validated above"),
                };
                self.splice_checked(buffer, range, new_lines, EditKind::AdaptBlock)
            }

            Edit::DeleteBlock { anchor } => {
                let site = self.locate_anchor(anchor, buffer)?;
                let range = match (site.before, site.after) {
                    (Some(_), Some(_)) => site.start..site.end,
                    // One-extra-line rule for single-sided deletes.
                    (Some(b), None) => b.start..(b.end + 1).min(buffer.len()),
                    (None, Some(a)) => a.start.saturating_sub(1)..a.end,
                    (None, None) => unreachable!("validated above"),
                };
                self.splice_checked(buffer, range, Vec::new(), EditKind::DeleteBlock)
            }

            Edit::AppendAtEnd { new_content } => {
                // Lines are self-terminating in the buffer model, so append
                // is a plain extend; content goes in verbatim, untransposed.
                let start = buffer.len();
                let new_lines = new_content.lines.clone();
                buffer.extend(new_lines.clone());
                debug!(start, appended = new_lines.len(), "appended at end");
                Ok(vec![ChangeRecord {
                    kind: EditKind::AppendAtEnd,
                    original: Vec::new(),
                    new: new_lines,
                    start,
                    end: buffer.len(),
                }])
            }

            Edit::SearchReplace {
                pattern,
                replacement,
                allow_multiple,
            } => self.search_replace(pattern, replacement.as_ref(), *allow_multiple, buffer),
        }
    }

    fn search_replace(
        &self,
        pattern: &Pattern,
        replacement: Option<&Pattern>,
        allow_multiple: bool,
        buffer: &mut LineBuffer,
    ) -> Result<Vec<ChangeRecord>, PatchError> {
        let candidates = find_candidates(pattern.as_lines(), buffer.lines(), &self.profile);
        if candidates.is_empty() {
            return Err(self.missing(AnchorLabel::Pattern, pattern, buffer.lines(), 0));
        }

        let spans: Vec<MatchCandidate> = if allow_multiple {
            // Earliest-first greedy pass keeps only disjoint spans, so
            // overlapping candidates (pattern "a\na" over "a\na\na") cannot
            // splice the same lines twice. Then highest-indexed span first,
            // so lower indices stay stable while splicing.
            let mut sorted = candidates;
            sorted.sort_by_key(|c| c.start);
            let mut spans: Vec<MatchCandidate> = Vec::with_capacity(sorted.len());
            for cand in sorted {
                if spans.last().map_or(true, |prev| cand.start >= prev.end) {
                    spans.push(cand);
                }
            }
            spans.reverse();
            spans
        } else {
            let selector = MatchSelector::new(SelectionPolicy::StrictUnique);
            let chosen = selector.select(&candidates).map_err(|e| match e {
                SelectionError::Ambiguous { lines } => PatchError::AmbiguousMatch { lines },
                SelectionError::NoCandidates => {
                    self.missing(AnchorLabel::Pattern, pattern, buffer.lines(), 0)
                }
            })?;
            vec![chosen]
        };

        let declared = pattern.declared_indent();
        let planned: Vec<(Range<usize>, Vec<String>)> = spans
            .iter()
            .map(|span| {
                let new_lines = match replacement {
                    Some(r) => self.transpose_for(r.as_lines(), *span, declared, buffer),
                    None => Vec::new(),
                };
                (span.start..span.end, new_lines)
            })
            .collect();

        // The edit as a whole must change something.
        if planned
            .iter()
            .all(|(range, new)| buffer.lines()[range.clone()] == new[..])
        {
            return Err(PatchError::NoOp {
                kind: EditKind::SearchReplace,
            });
        }

        let mut records = Vec::with_capacity(planned.len());
        for (range, new_lines) in planned {
            // Identity spans in a mixed pass stay untouched and unrecorded.
            if buffer.lines()[range.clone()] == new_lines[..] {
                continue;
            }
            let start = range.start;
            let end = start + new_lines.len();
            let original = buffer.splice(range, new_lines.clone());
            debug!(start, removed = original.len(), inserted = new_lines.len(), "replaced span");
            records.push(ChangeRecord {
                kind: EditKind::SearchReplace,
                original,
                new: new_lines,
                start,
                end,
            });
        }
        Ok(records)
    }

    /// Locate both anchor sides. `after` is searched only in the region that
    /// starts immediately after the end of the `before` match.
    fn locate_anchor(
        &self,
        anchor: &AnchorSpec,
        buffer: &LineBuffer,
    ) -> Result<AnchorSite, PatchError> {
        let before = match &anchor.before {
            Some(pattern) => Some(self.locate_side(pattern, buffer.lines(), 0, AnchorLabel::Before)?),
            None => None,
        };

        let search_from = before.map(|c| c.end).unwrap_or(0);
        let after = match &anchor.after {
            Some(pattern) => {
                let region = &buffer.lines()[search_from..];
                Some(self.locate_side(pattern, region, search_from, AnchorLabel::After)?)
            }
            None => None,
        };

        let (start, end) = match (before, after) {
            (Some(b), Some(a)) => (b.start, a.end),
            (Some(b), None) => (b.start, b.end),
            (None, Some(a)) => (a.start, a.end),
            (None, None) => unreachable!("validated: at least one anchor side present"),
        };

        debug!(start, end, "anchor located");
        Ok(AnchorSite {
            start,
            end,
            before,
            after,
        })
    }

    /// Run the cascade over `region` (a tail slice of the buffer beginning at
    /// absolute line `offset`) and resolve with the best-effort selector.
    fn locate_side(
        &self,
        pattern: &Pattern,
        region: &[String],
        offset: usize,
        label: AnchorLabel,
    ) -> Result<MatchCandidate, PatchError> {
        let mut candidates = find_candidates(pattern.as_lines(), region, &self.profile);
        if candidates.is_empty() {
            return Err(self.missing(label, pattern, region, offset));
        }
        for candidate in &mut candidates {
            candidate.start += offset;
            candidate.end += offset;
        }

        let selector = MatchSelector::new(SelectionPolicy::BestEffort);
        selector.select(&candidates).map_err(|e| match e {
            SelectionError::NoCandidates => self.missing(label, pattern, region, offset),
            SelectionError::Ambiguous { lines } => PatchError::AmbiguousMatch { lines },
        })
    }

    fn missing(
        &self,
        label: AnchorLabel,
        pattern: &Pattern,
        region: &[String],
        offset: usize,
    ) -> PatchError {
        PatchError::MissingAnchor {
            label,
            pattern: diag::render_lines(pattern.as_lines(), 0),
            excerpt: diag::nearest_miss(region, pattern.as_lines(), offset),
        }
    }

    /// Transpose new content against the anchor actually used for the shift.
    fn transposed(
        &self,
        content: &Pattern,
        anchor: &AnchorSpec,
        site: &AnchorSite,
        buffer: &LineBuffer,
    ) -> Vec<String> {
        let declared = match (&anchor.before, &anchor.after) {
            (Some(p), _) => p.declared_indent(),
            (None, Some(p)) => p.declared_indent(),
            (None, None) => 0,
        };
        self.transpose_for(content.as_lines(), site.shift_candidate(), declared, buffer)
    }

    /// The transposition step: shift = actual anchor indent minus the
    /// pattern's declared indent, applied only when the winning strategy was
    /// not exact. Exact matches keep the replacement's literal indentation.
    fn transpose_for(
        &self,
        content: &[String],
        anchor: MatchCandidate,
        declared: usize,
        buffer: &LineBuffer,
    ) -> Vec<String> {
        if anchor.strategy == MatchStrategy::Exact {
            return content.to_vec();
        }
        let actual = actual_indent(&buffer.lines()[anchor.start..anchor.end]);
        let shift = actual as isize - declared as isize;
        if shift == 0 {
            return content.to_vec();
        }
        debug!(actual, declared, shift, "transposing replacement indentation");
        indent::transpose(content, shift)
    }

    /// Splice after verifying the edit changes something; identity splices
    /// are a reported no-op, never silent success.
    fn splice_checked(
        &self,
        buffer: &mut LineBuffer,
        range: Range<usize>,
        new_lines: Vec<String>,
        kind: EditKind,
    ) -> Result<Vec<ChangeRecord>, PatchError> {
        if buffer.lines()[range.clone()] == new_lines[..] {
            return Err(PatchError::NoOp { kind });
        }
        let start = range.start;
        let end = start + new_lines.len();
        let original = buffer.splice(range, new_lines.clone());
        debug!(
            %kind,
            start,
            removed = original.len(),
            inserted = new_lines.len(),
            "applied splice"
        );
        Ok(vec![ChangeRecord {
            kind,
            original,
            new: new_lines,
            start,
            end,
        }])
    }
}
