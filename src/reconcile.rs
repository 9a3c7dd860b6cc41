//! One reconciliation cycle per data change
//!
//! A [`Reconciler`] owns the snapshot of the structure the view currently
//! shows. Each call to [`Reconciler::reconcile`] diffs the previous snapshot
//! against the new structure, applies the result to the target (or reloads
//! it fully), and then captures the new snapshot regardless of how the view
//! was updated.
//!
//! Cycles on one reconciler are serialized by `&mut self`. Independent
//! lists use independent reconcilers, see [`crate::cache`].

use tracing::{debug, info};

use crate::algo::{diff_with_config, DiffConfig};
use crate::apply::{apply, BatchTarget, FallbackReason, Outcome};
use crate::layout::Layout;
use crate::snapshot::Snapshot;

/// How the caller wants the view updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadMode {
    /// Skip diffing and reload everything
    Immediate,
    /// Diff and apply incrementally where possible
    #[default]
    Batched,
}

/// Previous-snapshot holder driving diff and apply.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    previous: Snapshot,
    config: DiffConfig,
}

impl Reconciler {
    /// Reconciler for a view that currently shows nothing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiffConfig) -> Self {
        Self {
            previous: Snapshot::empty(),
            config,
        }
    }

    /// Reconciler for a view already showing `previous`.
    pub fn from_snapshot(previous: Snapshot, config: DiffConfig) -> Self {
        Self { previous, config }
    }

    pub fn previous(&self) -> &Snapshot {
        &self.previous
    }

    pub fn config(&self) -> DiffConfig {
        self.config
    }

    pub fn set_config(&mut self, config: DiffConfig) {
        self.config = config;
    }

    /// Forget the shown structure; the next batched cycle inserts everything.
    pub fn reset(&mut self) {
        self.previous = Snapshot::empty();
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.previous
    }

    /// Bring `target` from the previous structure to `structure`.
    pub fn reconcile<L, B>(&mut self, structure: &L, target: &mut B, mode: ReloadMode) -> Outcome
    where
        L: Layout + ?Sized,
        B: BatchTarget + ?Sized,
    {
        let outcome = self.update(structure, target, mode);
        self.previous = Snapshot::capture(structure);

        match &outcome {
            Outcome::Batched(stats) => debug!(?stats, "reconciled incrementally"),
            Outcome::FullReload(reason) => info!(%reason, "reconciled with full reload"),
        }
        outcome
    }

    fn update<L, B>(&self, structure: &L, target: &mut B, mode: ReloadMode) -> Outcome
    where
        L: Layout + ?Sized,
        B: BatchTarget + ?Sized,
    {
        if mode == ReloadMode::Immediate {
            target.reload_all();
            return Outcome::FullReload(FallbackReason::Immediate);
        }
        if !target.is_attached() {
            target.reload_all();
            return Outcome::FullReload(FallbackReason::Detached);
        }

        match diff_with_config(&self.previous, structure, self.config) {
            Ok(result) => apply(&result, target),
            Err(err) => {
                target.reload_all();
                Outcome::FullReload(FallbackReason::Rejected(err))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::Position;
    use crate::apply::testing::{Call, Recorder};
    use crate::error::{DiffError, Side};
    use crate::key::ContentKey;
    use crate::model::{Entry, Section, Structure};

    fn rows(ids: &[&str]) -> Vec<Entry> {
        ids.iter().map(|id| Entry::key(*id)).collect()
    }

    #[test]
    fn test_first_cycle_inserts_sections() {
        let mut reconciler = Reconciler::new();
        let mut target = Recorder::default();
        let s = Structure::from(vec![Section::with_rows("A", rows(&["a"]))]);

        let outcome = reconciler.reconcile(&s, &mut target, ReloadMode::Batched);
        assert!(outcome.is_batched());
        assert_eq!(
            target.calls,
            vec![Call::Begin, Call::InsertSections(vec![0]), Call::End]
        );
        assert_eq!(reconciler.previous().len(), 1);
    }

    #[test]
    fn test_second_cycle_diffs_against_previous() {
        let mut reconciler = Reconciler::new();
        let first = Structure::from(vec![Section::with_rows("A", rows(&["a", "b"]))]);
        reconciler.reconcile(&first, &mut Recorder::default(), ReloadMode::Batched);

        let second = Structure::from(vec![Section::with_rows("A", rows(&["a", "b", "c"]))]);
        let mut target = Recorder::default();
        reconciler.reconcile(&second, &mut target, ReloadMode::Batched);
        assert_eq!(
            target.calls,
            vec![
                Call::Begin,
                Call::InsertRows(vec![Position::new(0, 2)]),
                Call::End
            ]
        );
    }

    #[test]
    fn test_immediate_mode_reloads_and_captures() {
        let mut reconciler = Reconciler::new();
        let mut target = Recorder::default();
        let s = Structure::from(vec![Section::with_rows("A", rows(&["a"]))]);

        let outcome = reconciler.reconcile(&s, &mut target, ReloadMode::Immediate);
        assert_eq!(outcome, Outcome::FullReload(FallbackReason::Immediate));
        assert_eq!(target.calls, vec![Call::ReloadAll]);

        // Snapshot still advanced: unchanged follow-up is a no-op.
        let mut target = Recorder::default();
        reconciler.reconcile(&s, &mut target, ReloadMode::Batched);
        assert!(target.calls.is_empty());
    }

    #[test]
    fn test_detached_target_reloads() {
        let mut reconciler = Reconciler::new();
        let mut target = Recorder {
            attached: false,
            ..Recorder::default()
        };
        let s: Structure = Structure::from(vec![Section::new("A")]);
        let outcome = reconciler.reconcile(&s, &mut target, ReloadMode::Batched);
        assert_eq!(outcome.fallback_reason(), Some(&FallbackReason::Detached));
        assert_eq!(reconciler.previous().len(), 1);
    }

    #[test]
    fn test_conflict_falls_back_and_advances() {
        let mut reconciler = Reconciler::new();
        let old = Structure::from(vec![
            Section::with_rows("A", rows(&["x"])),
            Section::with_rows("B", rows(&["y", "z"])),
        ]);
        reconciler.reconcile(&old, &mut Recorder::default(), ReloadMode::Batched);

        // B moves to the front and loses z: deletion inside a moving section.
        let new = Structure::from(vec![
            Section::with_rows("B", rows(&["y"])),
            Section::with_rows("A", rows(&["x"])),
        ]);
        let mut target = Recorder::default();
        let outcome = reconciler.reconcile(&new, &mut target, ReloadMode::Batched);

        assert!(matches!(
            outcome,
            Outcome::FullReload(FallbackReason::Rejected(DiffError::UnsafeDeletionInMovingSection { .. }))
        ));
        assert_eq!(target.calls, vec![Call::ReloadAll]);

        let mut target = Recorder::default();
        reconciler.reconcile(&new, &mut target, ReloadMode::Batched);
        assert!(target.calls.is_empty());
    }

    #[test]
    fn test_duplicate_rejected_then_recovers() {
        let mut reconciler = Reconciler::new();
        let dup: Structure = Structure::from(vec![Section::new("A"), Section::new("A")]);
        let outcome = reconciler.reconcile(&dup, &mut Recorder::default(), ReloadMode::Batched);
        assert!(matches!(
            outcome.fallback_reason(),
            Some(FallbackReason::Rejected(DiffError::DuplicateSectionIdentity { side: Side::New, .. }))
        ));

        // The duplicate snapshot was still captured, so the next cycle is
        // refused on the old side.
        let ok: Structure = Structure::from(vec![Section::new("A")]);
        let mut target = Recorder::default();
        let outcome = reconciler.reconcile(&ok, &mut target, ReloadMode::Batched);
        assert!(matches!(
            outcome.fallback_reason(),
            Some(FallbackReason::Rejected(DiffError::DuplicateSectionIdentity { side: Side::Old, .. }))
        ));
        assert_eq!(target.calls, vec![Call::ReloadAll]);

        let mut target = Recorder::default();
        let outcome = reconciler.reconcile(&ok, &mut target, ReloadMode::Batched);
        assert!(outcome.is_batched());
        assert!(target.calls.is_empty());
    }

    #[test]
    fn test_lenient_duplicate_is_requested_reload() {
        let mut reconciler = Reconciler::with_config(DiffConfig::lenient());
        let dup: Structure = Structure::from(vec![Section::new("A"), Section::new("A")]);
        let outcome = reconciler.reconcile(&dup, &mut Recorder::default(), ReloadMode::Batched);
        assert!(matches!(outcome.fallback_reason(), Some(FallbackReason::Requested(_))));
    }

    #[test]
    fn test_content_change_reloads_after_batch() {
        let mut reconciler = Reconciler::new();
        let old = Structure::from(vec![Section::with_rows("A", rows(&["a", "b"]))]);
        reconciler.reconcile(&old, &mut Recorder::default(), ReloadMode::Batched);

        let new = Structure::from(vec![Section::with_rows(
            "A",
            vec![
                Entry::key("a"),
                Entry::key("b").with_content(ContentKey::of_text("edited")),
                Entry::key("c"),
            ],
        )]);
        // b had no content before, so it is not comparable yet.
        let mut target = Recorder::default();
        reconciler.reconcile(&new, &mut target, ReloadMode::Batched);
        assert_eq!(
            target.calls,
            vec![
                Call::Begin,
                Call::InsertRows(vec![Position::new(0, 2)]),
                Call::End
            ]
        );

        let newer = Structure::from(vec![Section::with_rows(
            "A",
            vec![
                Entry::key("a"),
                Entry::key("b").with_content(ContentKey::of_text("edited again")),
                Entry::key("c"),
            ],
        )]);
        let mut target = Recorder::default();
        reconciler.reconcile(&newer, &mut target, ReloadMode::Batched);
        assert_eq!(target.calls, vec![Call::ReloadRows(vec![Position::new(0, 1)])]);
    }

    #[test]
    fn test_reset_forgets_previous() {
        let mut reconciler = Reconciler::new();
        let s: Structure = Structure::from(vec![Section::new("A")]);
        reconciler.reconcile(&s, &mut Recorder::default(), ReloadMode::Batched);
        reconciler.reset();
        assert!(reconciler.previous().is_empty());

        let mut target = Recorder::default();
        reconciler.reconcile(&s, &mut target, ReloadMode::Batched);
        assert!(target.calls.contains(&Call::InsertSections(vec![0])));
    }
}
