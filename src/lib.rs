//! Context Patcher: a context-anchored fuzzy patch engine.
//!
//! Locates a target block of text inside a source document using approximate
//! (whitespace- and indentation-tolerant) matching, rewrites the block while
//! re-deriving correct indentation for the replacement, and commits the
//! result atomically. The engine fails loudly and informatively rather than
//! silently corrupting a file.
//!
//! # Architecture
//!
//! - A [`LineBuffer`](buffer::LineBuffer) is the mutable in-memory document.
//! - The matcher cascade ([`matcher`]) tries a fixed, ordered set of
//!   strategies (exact, whitespace-normalized, syntax-aware,
//!   indentation-pattern) until one yields candidates; the
//!   [`MatchSelector`](matcher::MatchSelector) resolves them into one
//!   position with an explicit tie-break policy.
//! - The [`EditExecutor`](executor::EditExecutor) applies one [`Edit`] at a
//!   time, transposing replacement indentation against the matched anchor.
//! - A [`PatchSession`](session::PatchSession) applies an ordered
//!   [`PatchSpecification`] and commits atomically only when every edit
//!   succeeded; failures aggregate into a single report.
//!
//! # Example
//!
//! ```
//! use context_patcher::{
//!     AnchorSpec, Edit, LineBuffer, MatchProfile, PatchSession, PatchSpecification, Pattern,
//! };
//!
//! let buffer = LineBuffer::from_text("def f():\n    x = 1\n    return x\n");
//! let mut session = PatchSession::from_buffer(buffer, MatchProfile::indent_sensitive());
//! let spec = PatchSpecification::new(vec![Edit::ReplaceBlock {
//!     anchor: AnchorSpec::between(
//!         Pattern::from_text("def f():"),
//!         Pattern::from_text("    return x"),
//!     ),
//!     new_content: Pattern::from_text("def f():\n    y = 2\n    return y"),
//! }]);
//! session.apply(&spec).unwrap();
//! let (buffer, changelog) = session.into_preview();
//! assert_eq!(buffer.to_text(), "def f():\n    y = 2\n    return y\n");
//! assert_eq!(changelog.len(), 1);
//! ```

pub mod buffer;
pub mod diag;
pub mod edit;
pub mod error;
pub mod executor;
pub mod indent;
pub mod matcher;
pub mod session;

// Re-exports
pub use buffer::LineBuffer;
pub use diag::FailedMatchRecord;
pub use edit::{AnchorSpec, ChangeRecord, Edit, EditKind, PatchSpecification, Pattern};
pub use error::{AnchorLabel, EditFailure, PatchError, SessionError};
pub use executor::EditExecutor;
pub use matcher::{
    MatchCandidate, MatchProfile, MatchSelector, MatchStrategy, SelectionPolicy,
};
pub use session::{apply_to_file, PatchSession};
