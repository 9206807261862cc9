//! Identifiers for the documents an editing session can open

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Primary key of a row in the backing store
pub type RowId = i64;

/// Owner of a body buffer, also used as the scope of tag annotations
///
/// Exactly one of thread (sub-item) or episode is set, so the mutual
/// exclusion of the two foreign keys is carried by the type.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "id", rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScriptTarget {
    /// A sub-item (thread) body
    Thread(RowId),
    /// An episode body
    Episode(RowId),
}

impl ScriptTarget {
    /// Thread id, if this is a thread target
    #[must_use]
    pub const fn thread_id(self) -> Option<RowId> {
        match self {
            Self::Thread(id) => Some(id),
            Self::Episode(_) => None,
        }
    }

    /// Episode id, if this is an episode target
    #[must_use]
    pub const fn episode_id(self) -> Option<RowId> {
        match self {
            Self::Episode(id) => Some(id),
            Self::Thread(_) => None,
        }
    }

    /// Build a target from a pair of nullable foreign keys
    ///
    /// Returns `None` unless exactly one of them is set.
    #[must_use]
    pub const fn from_columns(thread_id: Option<RowId>, episode_id: Option<RowId>) -> Option<Self> {
        match (thread_id, episode_id) {
            (Some(id), None) => Some(Self::Thread(id)),
            (None, Some(id)) => Some(Self::Episode(id)),
            _ => None,
        }
    }
}

impl fmt::Display for ScriptTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thread(id) => write!(f, "thread:{id}"),
            Self::Episode(id) => write!(f, "episode:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_columns_requires_exactly_one_key() {
        assert_eq!(
            ScriptTarget::from_columns(Some(3), None),
            Some(ScriptTarget::Thread(3))
        );
        assert_eq!(
            ScriptTarget::from_columns(None, Some(9)),
            Some(ScriptTarget::Episode(9))
        );
        assert_eq!(ScriptTarget::from_columns(Some(1), Some(2)), None);
        assert_eq!(ScriptTarget::from_columns(None, None), None);
    }

    #[test]
    fn accessors_and_display() {
        let t = ScriptTarget::Episode(12);
        assert_eq!(t.episode_id(), Some(12));
        assert_eq!(t.thread_id(), None);
        assert_eq!(t.to_string(), "episode:12");
    }
}
