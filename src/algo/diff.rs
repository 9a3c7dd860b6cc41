//! Two-level diff: sections, then rows within matched sections
//!
//! Computes the structural edit set that turns an old [`Snapshot`] into a new
//! layout. This is a **pure algorithm module**: it never touches payloads or
//! UI state, and owns nothing of its inputs once it returns.
//!
//! # Algorithm
//!
//! 1. Index both sides by identity in one pass each (`FxHashMap`), failing
//!    on any repeated section identifier or row identity
//! 2. Match sections by identifier: unmatched old ones are deleted, unmatched
//!    new ones inserted, displaced matches moved
//! 3. Within each matched pair, match rows by identity the same way; a
//!    matched row whose content signature changed is reloaded at its new
//!    position
//! 4. Compare header and footer signatures of matched sections
//! 5. Reject edit sets that index-based batch APIs can not apply consistently
//!    (see [`conflict`](super::conflict))
//!
//! Rows of an inserted section are implied by the section insert and never
//! listed. A section move alone never produces row operations: row indices
//! are compared inside the matched pair.
//!
//! # Complexity
//!
//! - Time: O(n + m) over total entries with the positional strategy
//! - Space: O(n + m) for the index maps
//!
//! No step scans one side once per element of the other.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, debug_span, warn};

use crate::error::{DiffError, DiffOutcome, Side};
use crate::key::{IdentityKey, SectionKey};
use crate::layout::Layout;
use crate::snapshot::Snapshot;

use super::conflict;
use super::myers::lcs_pairs;

// =============================================================================
// Configuration
// =============================================================================

/// How a repeated identity in either input is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Return the duplicate as a [`DiffError`]
    #[default]
    Reject,
    /// Log it and return an empty result flagged `should_reload`
    LogAndReload,
}

/// Which matched items count as moved.
///
/// Swapping two sections `[A, B] -> [B, A]` reports both as moved under
/// `Positional`; [`DiffConfig::minimal_moves`] reports only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveStrategy {
    /// Every matched item whose index changed is a move
    #[default]
    Positional,
    /// Only matched items off a longest common subsequence of the old and new
    /// order are moves; the rest slide into place implicitly
    LongestCommonSubsequence,
}

/// Configuration for the diff engine.
#[derive(Debug, Clone, Copy)]
pub struct DiffConfig {
    /// Compare header/footer content signatures of matched sections.
    /// Default: true
    pub detect_decoration_reloads: bool,
    /// Default: [`DuplicatePolicy::Reject`]
    pub duplicate_policy: DuplicatePolicy,
    /// Default: [`MoveStrategy::Positional`]
    pub move_strategy: MoveStrategy,
    /// Structural operation count beyond which the result degrades to a full
    /// reload. Default: unlimited
    pub max_ops: Option<usize>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            detect_decoration_reloads: true,
            duplicate_policy: DuplicatePolicy::Reject,
            move_strategy: MoveStrategy::Positional,
            max_ops: None,
        }
    }
}

impl DiffConfig {
    /// Every check is a hard error. Same as `default()`.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Duplicates degrade to a reload result instead of an error.
    pub fn lenient() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::LogAndReload,
            ..Self::default()
        }
    }

    /// Report only the moves outside the longest common subsequence.
    pub fn minimal_moves() -> Self {
        Self {
            move_strategy: MoveStrategy::LongestCommonSubsequence,
            ..Self::default()
        }
    }

    /// Degrade to a full reload past `max_ops` structural operations.
    pub fn with_max_ops(mut self, max_ops: usize) -> Self {
        self.max_ops = Some(max_ops);
        self
    }

    /// Toggle header/footer reload detection.
    pub fn with_decoration_reloads(mut self, on: bool) -> Self {
        self.detect_decoration_reloads = on;
        self
    }
}

// =============================================================================
// Public Types
// =============================================================================

/// Row coordinates: section index, then row index within it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Section index
    pub section: usize,
    /// Row index within the section
    pub row: usize,
}

impl Position {
    #[inline]
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.section, self.row)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}

/// Section move: old index to new index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionMove {
    /// Index in the old structure
    pub from: usize,
    /// Index in the new structure
    pub to: usize,
}

impl fmt::Display for SectionMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Row move: old position to new position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowMove {
    /// Position in the old structure
    pub from: Position,
    /// Position in the new structure
    pub to: Position,
}

impl fmt::Display for RowMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Statistics from diff operation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct DiffStats {
    /// Number of old sections matched in the new layout
    pub sections_matched: usize,
    /// Number of matched sections that moved
    pub sections_moved: usize,
    /// Number of rows compared across matched sections
    pub rows_compared: usize,
    /// Number of matched rows left in place
    pub rows_kept: usize,
    /// Number of matched rows that moved
    pub rows_moved: usize,
    /// Number of content reloads (rows, headers, footers)
    pub reloads: usize,
}

/// Output of a diff: everything an applier needs for one batch.
///
/// Deletions use old indices, insertions and reloads use new indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct DiffResult {
    /// Sorted by `from`
    pub sections_to_move: Vec<SectionMove>,
    /// Old indices
    pub sections_to_delete: BTreeSet<usize>,
    /// New indices
    pub sections_to_insert: BTreeSet<usize>,
    /// Sorted by `from`
    pub rows_to_move: Vec<RowMove>,
    /// Old positions, sorted
    pub rows_to_delete: Vec<Position>,
    /// New positions, sorted
    pub rows_to_insert: Vec<Position>,
    /// New positions of matched rows whose content changed, sorted
    pub rows_to_reload: Vec<Position>,
    /// New section indices, sorted
    pub header_reloads: Vec<usize>,
    /// New section indices, sorted
    pub footer_reloads: Vec<usize>,
    /// The caller should reload everything instead of applying operations
    pub should_reload: bool,
    /// Reason for reload (if should_reload is true)
    pub reload_reason: Option<String>,
    pub stats: DiffStats,
}

impl DiffResult {
    /// Create a result that triggers reload
    pub fn reload(reason: impl Into<String>) -> Self {
        Self {
            should_reload: true,
            reload_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// No operations of any kind.
    pub fn is_empty(&self) -> bool {
        self.structural_op_count() == 0
            && self.rows_to_reload.is_empty()
            && self.header_reloads.is_empty()
            && self.footer_reloads.is_empty()
    }

    /// Check if any changes were detected
    pub fn has_changes(&self) -> bool {
        !self.is_empty() || self.should_reload
    }

    /// Number of moves, deletes and inserts at both levels.
    pub fn structural_op_count(&self) -> usize {
        self.sections_to_move.len()
            + self.sections_to_delete.len()
            + self.sections_to_insert.len()
            + self.rows_to_move.len()
            + self.rows_to_delete.len()
            + self.rows_to_insert.len()
    }

    /// All operations flattened in apply order.
    ///
    /// Section moves, section deletes, section inserts, row moves, row
    /// deletes, row inserts, then the deferred reloads.
    pub fn operations(&self) -> Vec<Operation> {
        let mut ops = Vec::with_capacity(
            self.structural_op_count()
                + self.rows_to_reload.len()
                + self.header_reloads.len()
                + self.footer_reloads.len(),
        );
        ops.extend(self.sections_to_move.iter().copied().map(Operation::MoveSection));
        ops.extend(self.sections_to_delete.iter().copied().map(Operation::DeleteSection));
        ops.extend(self.sections_to_insert.iter().copied().map(Operation::InsertSection));
        ops.extend(self.rows_to_move.iter().copied().map(Operation::MoveRow));
        ops.extend(self.rows_to_delete.iter().copied().map(Operation::DeleteRow));
        ops.extend(self.rows_to_insert.iter().copied().map(Operation::InsertRow));
        ops.extend(self.rows_to_reload.iter().copied().map(Operation::ReloadRow));
        ops.extend(self.header_reloads.iter().copied().map(Operation::ReloadHeader));
        ops.extend(self.footer_reloads.iter().copied().map(Operation::ReloadFooter));
        ops
    }
}

/// One edit, as listed by [`DiffResult::operations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Matched section whose index changed
    MoveSection(SectionMove),
    /// Old section index with no match in the new structure
    DeleteSection(usize),
    /// New section index with no match in the old structure
    InsertSection(usize),
    /// Matched row whose position changed
    MoveRow(RowMove),
    /// Old row position with no match
    DeleteRow(Position),
    /// New row position with no match
    InsertRow(Position),
    /// New position of a matched row whose content changed
    ReloadRow(Position),
    /// New index of a section whose header changed
    ReloadHeader(usize),
    /// New index of a section whose footer changed
    ReloadFooter(usize),
}

impl Operation {
    /// Part of the structural batch, as opposed to a deferred reload.
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            Self::ReloadRow(_) | Self::ReloadHeader(_) | Self::ReloadFooter(_)
        )
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Diff a snapshot against a new layout with the default configuration.
///
/// The new side is usually a live [`Structure`](crate::Structure), but any
/// [`Layout`] works, including another snapshot.
///
/// # Example
///
/// ```
/// use structured_diff::{diff, snapshot, Entry, Section, Structure};
///
/// let old = Structure::from(vec![Section::with_rows("X", ["a", "b", "c"].map(Entry::key))]);
/// let new = Structure::from(vec![Section::with_rows("X", ["c", "a"].map(Entry::key))]);
///
/// let result = diff(&snapshot(&old), &new).unwrap();
/// assert_eq!(result.rows_to_delete.len(), 1);
/// assert_eq!(result.rows_to_move.len(), 2);
/// ```
pub fn diff<N: Layout + ?Sized>(old: &Snapshot, new: &N) -> DiffOutcome {
    diff_with_config(old, new, DiffConfig::default())
}

/// Diff a snapshot against a new layout with custom configuration.
pub fn diff_with_config<N: Layout + ?Sized>(old: &Snapshot, new: &N, config: DiffConfig) -> DiffOutcome {
    let _span = debug_span!(
        "structured_diff::diff",
        old_sections = old.section_count(),
        new_sections = new.section_count()
    )
    .entered();

    let outcome = DiffContext::new(old, new, config).run();

    match outcome {
        Ok(result) => {
            if let Some(limit) = config.max_ops {
                let count = result.structural_op_count();
                if count > limit {
                    debug!(count, limit, "operation limit exceeded, falling back to reload");
                    return Ok(DiffResult::reload(format!(
                        "{count} structural operations exceed the limit of {limit}"
                    )));
                }
            }
            debug!(stats = ?result.stats, ops = result.structural_op_count(), "diff complete");
            Ok(result)
        }
        Err(err) if err.is_duplicate() => {
            warn!("Can not reload animated. {err}");
            match config.duplicate_policy {
                DuplicatePolicy::Reject => Err(err),
                DuplicatePolicy::LogAndReload => Ok(DiffResult::reload(err.to_string())),
            }
        }
        Err(err) => Err(err),
    }
}

/// Diff several independent lists at once.
///
/// Each pair is its own reconciliation cycle; no state is shared between
/// them.
#[cfg(feature = "parallel")]
pub fn diff_many<N>(pairs: &[(&Snapshot, &N)], config: DiffConfig) -> Vec<DiffOutcome>
where
    N: Layout + Sync,
{
    use rayon::prelude::*;

    pairs
        .par_iter()
        .map(|(old, new)| diff_with_config(*old, *new, config))
        .collect()
}

// =============================================================================
// Indexing
// =============================================================================

/// Identity maps for one side of the diff.
struct SideIndex<'a> {
    sections: FxHashMap<&'a SectionKey, usize>,
    rows: Vec<FxHashMap<&'a IdentityKey, usize>>,
}

impl<'a> SideIndex<'a> {
    /// Build section and per-section row maps in one pass, rejecting
    /// repeated keys instead of overwriting them.
    fn build<L: Layout + ?Sized>(layout: &'a L, side: Side) -> Result<Self, DiffError> {
        let count = layout.section_count();
        let mut sections = FxHashMap::with_capacity_and_hasher(count, Default::default());
        let mut rows = Vec::with_capacity(count);

        for s in 0..count {
            let section = layout.section_key(s);
            if sections.insert(section, s).is_some() {
                return Err(DiffError::DuplicateSectionIdentity {
                    side,
                    section: section.clone(),
                    index: s,
                });
            }

            let row_count = layout.row_count(s);
            let mut map = FxHashMap::with_capacity_and_hasher(row_count, Default::default());
            for r in 0..row_count {
                let identity = layout.row_identity(s, r);
                if map.insert(identity, r).is_some() {
                    return Err(DiffError::DuplicateRowIdentity {
                        side,
                        section: section.clone(),
                        identity: identity.clone(),
                        position: Position::new(s, r),
                    });
                }
            }
            rows.push(map);
        }

        Ok(Self { sections, rows })
    }
}

// =============================================================================
// Internal Context
// =============================================================================

struct DiffContext<'a, N: Layout + ?Sized> {
    old: &'a Snapshot,
    new: &'a N,
    config: DiffConfig,
    result: DiffResult,
}

impl<'a, N: Layout + ?Sized> DiffContext<'a, N> {
    fn new(old: &'a Snapshot, new: &'a N, config: DiffConfig) -> Self {
        Self {
            old,
            new,
            config,
            result: DiffResult::default(),
        }
    }

    fn run(mut self) -> DiffOutcome {
        let old_index = SideIndex::build(self.old, Side::Old)?;
        let new_index = SideIndex::build(self.new, Side::New)?;

        let pairs = self.diff_sections(&old_index, &new_index);
        for &(old_s, new_s) in &pairs {
            self.diff_rows(old_s, new_s, &old_index.rows[old_s], &new_index.rows[new_s]);
            if self.config.detect_decoration_reloads {
                self.diff_decorations(old_s, new_s);
            }
        }

        let mut result = self.result;
        result.sections_to_move.sort_unstable();
        result.rows_to_move.sort_unstable();
        result.rows_to_delete.sort_unstable();
        result.rows_to_insert.sort_unstable();
        result.rows_to_reload.sort_unstable();
        result.header_reloads.sort_unstable();
        result.footer_reloads.sort_unstable();

        conflict::analyze(&result)?;
        Ok(result)
    }

    /// Match sections by identifier. Returns matched `(old, new)` pairs in
    /// old order.
    fn diff_sections(&mut self, old_index: &SideIndex<'_>, new_index: &SideIndex<'_>) -> Vec<(usize, usize)> {
        let mut pairs = Vec::with_capacity(self.old.section_count());

        for old_s in 0..self.old.section_count() {
            match new_index.sections.get(self.old.section_key(old_s)) {
                Some(&new_s) => pairs.push((old_s, new_s)),
                None => {
                    self.result.sections_to_delete.insert(old_s);
                }
            }
        }

        for new_s in 0..self.new.section_count() {
            if !old_index.sections.contains_key(self.new.section_key(new_s)) {
                self.result.sections_to_insert.insert(new_s);
            }
        }

        self.result.stats.sections_matched = pairs.len();
        for (old_s, new_s) in moved(&pairs, self.config.move_strategy) {
            self.result.sections_to_move.push(SectionMove { from: old_s, to: new_s });
            self.result.stats.sections_moved += 1;
        }

        pairs
    }

    /// Match rows of one section pair by identity.
    fn diff_rows(
        &mut self,
        old_s: usize,
        new_s: usize,
        old_rows: &FxHashMap<&IdentityKey, usize>,
        new_rows: &FxHashMap<&IdentityKey, usize>,
    ) {
        let old_count = self.old.row_count(old_s);
        let mut pairs = Vec::with_capacity(old_count);

        for old_r in 0..old_count {
            self.result.stats.rows_compared += 1;
            match new_rows.get(self.old.row_identity(old_s, old_r)) {
                Some(&new_r) => pairs.push((old_r, new_r)),
                None => self.result.rows_to_delete.push(Position::new(old_s, old_r)),
            }
        }

        for new_r in 0..self.new.row_count(new_s) {
            if !old_rows.contains_key(self.new.row_identity(new_s, new_r)) {
                self.result.rows_to_insert.push(Position::new(new_s, new_r));
            }
        }

        let moves: FxHashSet<(usize, usize)> = moved(&pairs, self.config.move_strategy).collect();

        for &(old_r, new_r) in &pairs {
            if moves.contains(&(old_r, new_r)) {
                self.result.rows_to_move.push(RowMove {
                    from: Position::new(old_s, old_r),
                    to: Position::new(new_s, new_r),
                });
                self.result.stats.rows_moved += 1;
            } else {
                self.result.stats.rows_kept += 1;
            }

            let old_content = self.old.row_content(old_s, old_r);
            let new_content = self.new.row_content(new_s, new_r);
            if content_changed(old_content, new_content) {
                self.result.rows_to_reload.push(Position::new(new_s, new_r));
                self.result.stats.reloads += 1;
            }
        }
    }

    /// Compare header and footer signatures of one section pair.
    fn diff_decorations(&mut self, old_s: usize, new_s: usize) {
        if content_changed(self.old.header_content(old_s), self.new.header_content(new_s)) {
            self.result.header_reloads.push(new_s);
            self.result.stats.reloads += 1;
        }
        if content_changed(self.old.footer_content(old_s), self.new.footer_content(new_s)) {
            self.result.footer_reloads.push(new_s);
            self.result.stats.reloads += 1;
        }
    }
}

/// Both sides opted into content comparison and disagree.
#[inline]
fn content_changed<C: PartialEq>(old: Option<C>, new: Option<C>) -> bool {
    matches!((old, new), (Some(o), Some(n)) if o != n)
}

/// Matched `(old, new)` index pairs (in old order) that count as moves.
///
/// Under the LCS strategy an item off the subsequence moves even when its
/// index is unchanged: batch APIs place unmoved items by relative order only.
fn moved(pairs: &[(usize, usize)], strategy: MoveStrategy) -> impl Iterator<Item = (usize, usize)> + '_ {
    let kept: Option<FxHashSet<usize>> = match strategy {
        MoveStrategy::Positional => None,
        MoveStrategy::LongestCommonSubsequence => Some({
            // Old order of new indices against ascending new order
            let old_order: Vec<usize> = pairs.iter().map(|&(_, n)| n).collect();
            let mut new_order = old_order.clone();
            new_order.sort_unstable();
            lcs_pairs(&old_order, &new_order)
                .into_iter()
                .map(|(o, _)| old_order[o])
                .collect()
        }),
    };

    pairs.iter().copied().filter(move |&(o, n)| match &kept {
        None => o != n,
        Some(kept) => !kept.contains(&n),
    })
}

// =============================================================================
// Tests
// =============================================================================
