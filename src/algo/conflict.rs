//! Conflict analysis for raw edit sets
//!
//! Index-based batch APIs resolve deletions against old indices and
//! insertions against new ones. A section that moves in the same batch makes
//! the row indices inside it ambiguous, so two combinations are refused:
//!
//! - a row deleted from a section whose old index is a move source
//! - a row inserted into a section whose new index is a move target
//!
//! Analysis is all-or-nothing. A result with any conflict is never handed
//! to an applier; the caller reloads fully instead.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::error::DiffError;

use super::diff::{DiffResult, Position, SectionMove};

/// An edit combination that can not be applied as one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conflict {
    /// Row deletion (old coordinates) inside a moving section
    Deletion {
        position: Position,
        section_move: SectionMove,
    },
    /// Row insertion (new coordinates) inside a moving section
    Insertion {
        position: Position,
        section_move: SectionMove,
    },
}

impl Conflict {
    pub fn into_error(self) -> DiffError {
        match self {
            Conflict::Deletion { position, section_move } => {
                DiffError::UnsafeDeletionInMovingSection { position, section_move }
            }
            Conflict::Insertion { position, section_move } => {
                DiffError::UnsafeInsertionInMovingSection { position, section_move }
            }
        }
    }
}

/// All conflicts in `result`: deletions first, then insertions, each in
/// position order.
pub fn conflicts(result: &DiffResult) -> Vec<Conflict> {
    if result.sections_to_move.is_empty() {
        return Vec::new();
    }

    let by_source: FxHashMap<usize, SectionMove> =
        result.sections_to_move.iter().map(|m| (m.from, *m)).collect();
    let by_target: FxHashMap<usize, SectionMove> =
        result.sections_to_move.iter().map(|m| (m.to, *m)).collect();

    let deletions = result.rows_to_delete.iter().filter_map(|&position| {
        by_source
            .get(&position.section)
            .map(|&section_move| Conflict::Deletion { position, section_move })
    });
    let insertions = result.rows_to_insert.iter().filter_map(|&position| {
        by_target
            .get(&position.section)
            .map(|&section_move| Conflict::Insertion { position, section_move })
    });

    deletions.chain(insertions).collect()
}

/// Check `result` for conflicts, logging each and failing on the first.
pub fn analyze(result: &DiffResult) -> Result<(), DiffError> {
    let found = conflicts(result);

    for conflict in &found {
        match conflict {
            Conflict::Deletion { position, section_move } => warn!(
                %position, %section_move,
                "Can not reload animated. Attempts to delete row in movable section."
            ),
            Conflict::Insertion { position, section_move } => warn!(
                %position, %section_move,
                "Can not reload animated. Attempts to insert row in movable section."
            ),
        }
    }

    match found.into_iter().next() {
        Some(conflict) => Err(conflict.into_error()),
        None => Ok(()),
    }
}

// =============================================================================
// Tests
// =============================================================================
