//! Applying a diff to a host list view
//!
//! The host UI framework is reached through [`BatchTarget`]: one method per
//! incremental primitive, plus `reload_all` for the non-incremental
//! fallback. [`apply`] drives a target through one batch in the order that
//! keeps indices valid:
//!
//! ```text
//! begin_updates
//!   section moves -> section deletes -> section inserts
//!   row moves     -> row deletes     -> row inserts
//! end_updates
//! row reloads -> header reloads -> footer reloads
//! ```
//!
//! Reloads come after `end_updates` because refreshing an item while its
//! index is still shifting inside the batch is unsafe.

use std::collections::BTreeSet;
use std::fmt;

use crate::algo::{DiffResult, DiffStats, Position};
use crate::error::DiffError;

// =============================================================================
// BatchTarget
// =============================================================================

/// Incremental update primitives of a sectioned list view.
///
/// Deletions receive old indices, insertions, moves' `to` and reloads
/// receive new indices, exactly as carried by [`DiffResult`].
pub trait BatchTarget {
    /// Whether the view is on screen. Detached views always get a full reload.
    fn is_attached(&self) -> bool {
        true
    }

    fn begin_updates(&mut self) {}

    fn end_updates(&mut self) {}

    fn move_section(&mut self, from: usize, to: usize);

    fn delete_sections(&mut self, sections: &BTreeSet<usize>);

    fn insert_sections(&mut self, sections: &BTreeSet<usize>);

    fn move_row(&mut self, from: Position, to: Position);

    fn delete_rows(&mut self, rows: &[Position]);

    fn insert_rows(&mut self, rows: &[Position]);

    /// Refresh row content in place, without recreating the row.
    fn reload_rows(&mut self, rows: &[Position]);

    /// Refresh header content in place.
    fn reload_headers(&mut self, sections: &[usize]);

    /// Refresh footer content in place.
    fn reload_footers(&mut self, sections: &[usize]);

    /// Non-incremental reload of everything.
    fn reload_all(&mut self);
}

// =============================================================================
// Outcome
// =============================================================================

/// Why a cycle ended in a full reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The caller asked for an immediate, non-animated update
    Immediate,
    /// The target view is not attached
    Detached,
    /// The diff degraded to a reload result
    Requested(String),
    /// The diff was refused
    Rejected(DiffError),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => f.write_str("immediate update requested"),
            Self::Detached => f.write_str("target is not attached"),
            Self::Requested(reason) => f.write_str(reason),
            Self::Rejected(err) => fmt::Display::fmt(err, f),
        }
    }
}

/// How a target ended up matching the new structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Operations were applied incrementally
    Batched(DiffStats),
    /// Everything was reloaded
    FullReload(FallbackReason),
}

impl Outcome {
    pub fn is_batched(&self) -> bool {
        matches!(self, Outcome::Batched(_))
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Outcome::Batched(_) => None,
            Outcome::FullReload(reason) => Some(reason),
        }
    }
}

// =============================================================================
// apply
// =============================================================================

/// Apply a diff result to `target` as one batch.
///
/// Falls back to `reload_all` when the target is detached or the result asks
/// for a reload. Empty operation groups are skipped; a result with no
/// structural operations opens no batch.
pub fn apply<B: BatchTarget + ?Sized>(result: &DiffResult, target: &mut B) -> Outcome {
    if !target.is_attached() {
        target.reload_all();
        return Outcome::FullReload(FallbackReason::Detached);
    }

    if result.should_reload {
        target.reload_all();
        let reason = result.reload_reason.clone().unwrap_or_default();
        return Outcome::FullReload(FallbackReason::Requested(reason));
    }

    if result.structural_op_count() > 0 {
        target.begin_updates();

        for movement in &result.sections_to_move {
            target.move_section(movement.from, movement.to);
        }
        if !result.sections_to_delete.is_empty() {
            target.delete_sections(&result.sections_to_delete);
        }
        if !result.sections_to_insert.is_empty() {
            target.insert_sections(&result.sections_to_insert);
        }

        for movement in &result.rows_to_move {
            target.move_row(movement.from, movement.to);
        }
        if !result.rows_to_delete.is_empty() {
            target.delete_rows(&result.rows_to_delete);
        }
        if !result.rows_to_insert.is_empty() {
            target.insert_rows(&result.rows_to_insert);
        }

        target.end_updates();
    }

    if !result.rows_to_reload.is_empty() {
        target.reload_rows(&result.rows_to_reload);
    }
    if !result.header_reloads.is_empty() {
        target.reload_headers(&result.header_reloads);
    }
    if !result.footer_reloads.is_empty() {
        target.reload_footers(&result.footer_reloads);
    }

    Outcome::Batched(result.stats)
}

// =============================================================================
// Test support
// =============================================================================


// =============================================================================
// Tests
// =============================================================================
