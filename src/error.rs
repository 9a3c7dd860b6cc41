//! Error types for structured-diff.
//!
//! Every error means the same thing to the caller: the edit set can not be
//! applied as one incremental batch, so the presented list has to be fully
//! reloaded and a fresh snapshot taken. None of them is fatal to the process.

use std::fmt;

use thiserror::Error;

use crate::algo::{DiffResult, Position, SectionMove};
use crate::key::{IdentityKey, SectionKey};

/// Which input of a diff violated an invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The previous snapshot
    Old,
    /// The new structure
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Old => "old",
            Side::New => "new",
        })
    }
}

/// Errors that can occur while diffing two structures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// Two sections share an identifier
    #[error("{side} structure contains two or more sections identified as {section} (second at index {index})")]
    DuplicateSectionIdentity {
        /// Which input is ill-formed
        side: Side,
        /// The repeated identifier
        section: SectionKey,
        /// Index of the second occurrence
        index: usize,
    },

    /// Two rows of one section share an identity
    #[error("{side} structure contains two or more rows identified as {identity} in section {section} (second at {position})")]
    DuplicateRowIdentity {
        /// Which input is ill-formed
        side: Side,
        /// Identifier of the owning section
        section: SectionKey,
        /// The repeated identity
        identity: IdentityKey,
        /// Position of the second occurrence
        position: Position,
    },

    /// A row is deleted from a section that also moves
    #[error("can not batch: attempts to delete row {position} in section moving {section_move}")]
    UnsafeDeletionInMovingSection {
        /// Deleted row, old coordinates
        position: Position,
        /// The conflicting section move
        section_move: SectionMove,
    },

    /// A row is inserted into a section that also moves
    #[error("can not batch: attempts to insert row {position} in section moving {section_move}")]
    UnsafeInsertionInMovingSection {
        /// Inserted row, new coordinates
        position: Position,
        /// The conflicting section move
        section_move: SectionMove,
    },
}

/// Result of one diff call.
pub type DiffOutcome = Result<DiffResult, DiffError>;

impl DiffError {
    /// True for uniqueness violations in either input.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::DuplicateSectionIdentity { .. } | Self::DuplicateRowIdentity { .. }
        )
    }

    /// True for edit sets that are valid but not safely batchable.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::UnsafeDeletionInMovingSection { .. } | Self::UnsafeInsertionInMovingSection { .. }
        )
    }

    /// Whether recovering requires a full, non-incremental reload.
    ///
    /// Always true. Retrying the diff with the same inputs is meaningless.
    pub fn requires_full_reload(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DiffError::DuplicateSectionIdentity {
            side: Side::New,
            section: SectionKey::from("X"),
            index: 2,
        };
        assert_eq!(
            err.to_string(),
            "new structure contains two or more sections identified as X (second at index 2)"
        );

        let err = DiffError::UnsafeDeletionInMovingSection {
            position: Position::new(0, 1),
            section_move: SectionMove { from: 0, to: 1 },
        };
        assert_eq!(
            err.to_string(),
            "can not batch: attempts to delete row [0, 1] in section moving 0 -> 1"
        );
    }

    #[test]
    fn test_classification() {
        let dup = DiffError::DuplicateRowIdentity {
            side: Side::Old,
            section: SectionKey::from("S"),
            identity: IdentityKey::from("a"),
            position: Position::new(0, 3),
        };
        assert!(dup.is_duplicate());
        assert!(!dup.is_conflict());
        assert!(dup.requires_full_reload());

        let conflict = DiffError::UnsafeInsertionInMovingSection {
            position: Position::new(1, 0),
            section_move: SectionMove { from: 0, to: 1 },
        };
        assert!(conflict.is_conflict());
        assert!(!conflict.is_duplicate());
    }

    #[test]
    fn test_error_is_send_sync() {
        static_assertions::assert_impl_all!(DiffError: Send, Sync, std::error::Error);
    }
}
