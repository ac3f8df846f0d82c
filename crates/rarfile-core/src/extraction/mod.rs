//! Extraction and test passes.
//!
//! Each pass re-opens the archive in extraction mode and replays the
//! header stream, choosing per member whether to extract, test or skip it.

mod planner;

use std::collections::HashSet;
use std::fmt;

pub use planner::Planner;

use crate::error::ErrorKind;

/// Members an extraction pass writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MemberSelection {
    /// Every member.
    #[default]
    All,
    /// Members whose name is in the set. Every occurrence of a duplicated
    /// name is extracted.
    Only(HashSet<String>),
}

impl MemberSelection {
    /// Selects the given names.
    #[must_use]
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(names.into_iter().map(Into::into).collect())
    }

    /// Returns `true` if the member named `name` is selected.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.contains(name),
        }
    }
}

/// First member that failed an integrity test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFailure {
    /// Name of the member being processed when the pass failed, or the
    /// archive path if no member header had been read yet.
    pub name: String,
    /// Failure kind.
    pub kind: ErrorKind,
    /// Raw native result code.
    pub code: i32,
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (code {})", self.name, self.kind, self.code)
    }
}
