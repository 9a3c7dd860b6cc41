//! Property tests for the diff engine.
//!
//! Random structures with unique identities must satisfy:
//!
//! - diffing a structure against its own snapshot yields no operations
//! - appending one row yields exactly one insert at that row
//! - reversing a section yields moves for exactly the displaced rows
//! - changing one row's content yields exactly one reload
//! - the move/delete/insert sets equal an independent recomputation

use std::collections::BTreeSet;

use proptest::prelude::*;
use rustc_hash::FxHashMap;

use crate::algo::{diff, Position, RowMove};
use crate::error::DiffError;
use crate::key::ContentKey;
use crate::model::{Entry, Section, Structure};
use crate::snapshot::snapshot;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn row(id: u32) -> Entry {
    Entry::key(id).with_content(ContentKey::from_raw(id as u64))
}

fn section(index: usize, ids: impl IntoIterator<Item = u32>) -> Section {
    Section::with_rows(index, ids.into_iter().map(row))
}

fn arb_structure() -> impl Strategy<Value = Structure> {
    prop::collection::vec(prop::collection::btree_set(0u32..64, 0..12), 0..6).prop_map(|sections| {
        sections
            .into_iter()
            .enumerate()
            .map(|(s, rows)| section(s, rows))
            .collect()
    })
}

/// Old row ids and a new ordering that drops some, adds some and shuffles.
fn arb_reorder() -> impl Strategy<Value = (Vec<u32>, Vec<u32>)> {
    prop::collection::btree_set(0u32..64, 0..20)
        .prop_flat_map(|set| {
            let old: Vec<u32> = set.into_iter().collect();
            let len = old.len();
            (Just(old.clone()), prop::sample::subsequence(old, 0..=len), 0u32..4)
        })
        .prop_flat_map(|(old, kept, added)| {
            let mut new = kept;
            new.extend((0..added).map(|i| 100 + i));
            (Just(old), Just(new).prop_shuffle())
        })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_unchanged_structure_has_no_operations(s in arb_structure()) {
        let result = diff(&snapshot(&s), &s).unwrap();
        prop_assert!(result.is_empty());
        prop_assert!(!result.should_reload);
    }

    #[test]
    fn test_appended_row_is_single_insert(s in arb_structure(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!s.is_empty());
        let target = pick.index(s.len());

        let mut new = s.clone();
        new.sections_mut()[target].push(row(1000));
        let at = Position::new(target, new.sections()[target].len() - 1);

        let result = diff(&snapshot(&s), &new).unwrap();
        prop_assert_eq!(&result.rows_to_insert, &vec![at]);
        prop_assert!(result.rows_to_delete.is_empty());
        prop_assert!(result.rows_to_move.is_empty());
        prop_assert!(result.sections_to_move.is_empty());
    }

    #[test]
    fn test_reversed_section_is_pure_reposition(ids in prop::collection::btree_set(0u32..64, 0..24)) {
        let ids: Vec<u32> = ids.into_iter().collect();
        let old = Structure::from(vec![section(0, ids.iter().copied())]);
        let new = Structure::from(vec![section(0, ids.iter().rev().copied())]);

        let displaced = ids.len() - ids.len() % 2;
        let result = diff(&snapshot(&old), &new).unwrap();
        prop_assert_eq!(result.rows_to_move.len(), displaced);
        prop_assert!(result.rows_to_insert.is_empty());
        prop_assert!(result.rows_to_delete.is_empty());
        prop_assert!(result.rows_to_reload.is_empty());
    }

    #[test]
    fn test_content_change_is_single_reload(s in arb_structure(), pick in any::<prop::sample::Index>()) {
        let total = s.row_count();
        prop_assume!(total > 0);
        let nth = pick.index(total);

        let at = s
            .sections()
            .iter()
            .enumerate()
            .flat_map(|(si, sec)| (0..sec.len()).map(move |ri| Position::new(si, ri)))
            .nth(nth)
            .unwrap();

        let mut new = s.clone();
        new.sections_mut()[at.section].rows[at.row].content = Some(ContentKey::from_raw(u64::MAX));

        let result = diff(&snapshot(&s), &new).unwrap();
        prop_assert_eq!(&result.rows_to_reload, &vec![at]);
        prop_assert_eq!(result.structural_op_count(), 0);
    }

    #[test]
    fn test_row_ops_match_recomputation((old_ids, new_ids) in arb_reorder()) {
        let old = Structure::from(vec![section(0, old_ids.iter().copied())]);
        let new = Structure::from(vec![section(0, new_ids.iter().copied())]);
        let result = diff(&snapshot(&old), &new).unwrap();

        let old_pos: FxHashMap<u32, usize> = old_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let new_pos: FxHashMap<u32, usize> = new_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let expected_moves: BTreeSet<RowMove> = old_pos
            .iter()
            .filter_map(|(id, &o)| new_pos.get(id).filter(|&&n| n != o).map(|&n| RowMove {
                from: Position::new(0, o),
                to: Position::new(0, n),
            }))
            .collect();
        let expected_deletes: BTreeSet<Position> = old_pos
            .iter()
            .filter(|(id, _)| !new_pos.contains_key(*id))
            .map(|(_, &o)| Position::new(0, o))
            .collect();
        let expected_inserts: BTreeSet<Position> = new_pos
            .iter()
            .filter(|(id, _)| !old_pos.contains_key(*id))
            .map(|(_, &n)| Position::new(0, n))
            .collect();

        prop_assert_eq!(result.rows_to_move.iter().copied().collect::<BTreeSet<_>>(), expected_moves);
        prop_assert_eq!(result.rows_to_delete.iter().copied().collect::<BTreeSet<_>>(), expected_deletes);
        prop_assert_eq!(result.rows_to_insert.iter().copied().collect::<BTreeSet<_>>(), expected_inserts);
        prop_assert!(result.rows_to_reload.is_empty());
    }

    #[test]
    fn test_duplicate_section_always_rejected(s in arb_structure(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!s.is_empty());
        let copied = s.sections()[pick.index(s.len())].clone();

        let mut new = s.clone();
        new.push(copied);

        let is_duplicate_section = matches!(
            diff(&snapshot(&s), &new),
            Err(DiffError::DuplicateSectionIdentity { .. })
        );
        prop_assert!(is_duplicate_section);
    }
}
