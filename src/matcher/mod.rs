//! Block matching: the strategy cascade that locates a pattern in a line
//! buffer, and the selector that resolves multiple candidates into one
//! position.

pub mod cascade;
pub mod selector;
pub mod strategies;

pub use cascade::{find_candidates, MatchProfile};
pub use selector::{MatchSelector, SelectionError, SelectionPolicy};
pub use strategies::{MatchCandidate, MatchStrategy};
