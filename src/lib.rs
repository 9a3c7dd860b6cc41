//! structured-diff - Batchable edit scripts for sectioned lists
//!
//! ## Core Concepts
//!
//! **Two-level identity**: a [`Structure`] is an ordered list of sections,
//! each an ordered list of rows. Sections are identified by [`SectionKey`],
//! rows by [`IdentityKey`] unique within their section. An optional
//! [`ContentKey`] per row, header and footer tells "same item, new content"
//! apart from "same item, unchanged".
//!
//! **Snapshot, diff, apply**: the previous structure is kept as a key-only
//! [`Snapshot`]. [`diff`] compares it with the new structure and yields a
//! [`DiffResult`] of section and row moves, deletes, inserts and reloads.
//! Results that an index-based batch API can not apply safely are refused
//! with a [`DiffError`], and the caller reloads fully instead.
//!
//! ## Modules
//! - `key`: identity, section and content keys
//! - `model`: `Entry`, `Section`, `Structure`
//! - `snapshot`: key-only captures and the `Layout` view they share
//! - `algo`: diff engine, conflict analysis, Myers LCS
//! - `apply`: `BatchTarget` and the batch application order
//! - `reconcile`: per-list `Reconciler` cycles
//! - `cache`: thread-safe registry of list reconcilers
//!
//! ## Usage
//!
//! ```
//! use structured_diff::prelude::*;
//!
//! let old = Structure::from(vec![Section::with_rows("inbox", ["a", "b", "c"].map(Entry::key))]);
//! let new = Structure::from(vec![Section::with_rows("inbox", ["c", "a"].map(Entry::key))]);
//!
//! let result = diff(&snapshot(&old), &new).unwrap();
//! assert_eq!(result.rows_to_delete, vec![Position::new(0, 1)]);
//! assert_eq!(result.rows_to_move.len(), 2);
//! ```

// =============================================================================
// Modules
// =============================================================================

/// Identity, section and content keys
pub mod key;

/// Stable content hashing
pub mod hash;

/// Data model: entries, sections, structures
pub mod model;

/// Read-only structure view shared by models and snapshots
pub mod layout;

/// Key-only captures of a structure
pub mod snapshot;

/// Algorithms: diff, conflict analysis, myers
pub mod algo;

/// Applying results to a host view
pub mod apply;

/// Snapshot-diff-apply cycles
pub mod reconcile;

/// Shared per-list reconcilers
pub mod cache;

/// Error types
pub mod error;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Keys
pub use key::{ContentKey, IdentityKey, Key, SectionKey};
pub use hash::StableHasher;

// Model
pub use model::{Capabilities, Decoration, Entry, Rows, Section, Structure};
pub use layout::Layout;
pub use snapshot::{snapshot, RowSnapshot, SectionSnapshot, Snapshot};

// Algorithms
pub use algo::{
    diff, diff_with_config, Conflict, DiffConfig, DiffResult, DiffStats, DuplicatePolicy,
    MoveStrategy, Operation, Position, RowMove, SectionMove,
};

#[cfg(feature = "parallel")]
pub use algo::diff_many;

// Application
pub use apply::{apply, BatchTarget, FallbackReason, Outcome};
pub use reconcile::{Reconciler, ReloadMode};
pub use cache::{ListKey, ReconcilerCache, SharedReconciler, SharedReconcilerCache};

// Error types
pub use error::{DiffError, DiffOutcome, Side};

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: &str, rows: &[&str]) -> Section {
        Section::with_rows(id, rows.iter().map(|r| Entry::key(*r)))
    }

    #[test]
    fn test_worked_example_rows() {
        let old = Structure::from(vec![section("X", &["a", "b", "c"])]);
        let new = Structure::from(vec![section("X", &["c", "a"])]);

        let result = diff(&snapshot(&old), &new).unwrap();
        assert_eq!(result.rows_to_delete, vec![Position::new(0, 1)]);
        assert!(result.rows_to_insert.is_empty());
        assert_eq!(
            result.rows_to_move,
            vec![
                RowMove {
                    from: Position::new(0, 0),
                    to: Position::new(0, 1)
                },
                RowMove {
                    from: Position::new(0, 2),
                    to: Position::new(0, 0)
                },
            ]
        );
    }

    #[test]
    fn test_worked_example_sections() {
        let old = Structure::from(vec![section("A", &[]), section("B", &[])]);
        let new = Structure::from(vec![section("B", &[]), section("C", &[])]);

        let result = diff(&snapshot(&old), &new).unwrap();
        assert_eq!(result.sections_to_move, vec![SectionMove { from: 1, to: 0 }]);
        assert!(result.sections_to_delete.contains(&0));
        assert!(result.sections_to_insert.contains(&1));
    }

    #[test]
    fn test_worked_example_conflict() {
        let old = Structure::from(vec![section("A", &["x"]), section("B", &["y", "z"])]);
        let new = Structure::from(vec![section("B", &["y"]), section("A", &["x"])]);

        let err = diff(&snapshot(&old), &new).unwrap_err();
        assert!(err.is_conflict());
        assert!(err.requires_full_reload());
    }

    #[test]
    fn test_end_to_end_through_cache() {
        let cache = SharedReconcilerCache::new();
        let key = ListKey::new("feed");
        let mut target = crate::apply::testing::Recorder::default();

        let first = Structure::from(vec![section("A", &["a", "b"])]);
        assert!(cache.reconcile(&key, &first, &mut target, ReloadMode::Batched).is_batched());

        let second = Structure::from(vec![section("A", &["b", "a"])]);
        let outcome = cache.reconcile(&key, &second, &mut target, ReloadMode::Batched);
        match outcome {
            Outcome::Batched(stats) => assert_eq!(stats.rows_moved, 2),
            other => panic!("expected batched outcome, got {other:?}"),
        }
    }
}
