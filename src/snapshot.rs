//! Snapshots: immutable key-only captures of a structure
//!
//! A [`Snapshot`] copies section identifiers, row identities and content
//! signatures out of a live structure. It holds no references into the
//! source, so later mutation of the structure can not affect a diff that
//! is computed (or already was computed) against it.
//!
//! Capturing is O(total entries) and never fails, even for an empty or
//! ill-formed structure: uniqueness is the diff's concern, not the
//! snapshot's.

use smallvec::SmallVec;

use crate::key::{ContentKey, IdentityKey, SectionKey};
use crate::layout::Layout;
use crate::model::Structure;

/// Captured row keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowSnapshot {
    pub identity: IdentityKey,
    pub content: Option<ContentKey>,
}

/// Captured section keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionSnapshot {
    pub identifier: SectionKey,
    pub rows: SmallVec<[RowSnapshot; 8]>,
    pub header: Option<ContentKey>,
    pub footer: Option<ContentKey>,
}

/// Immutable capture of a structure's keys at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Snapshot {
    sections: Vec<SectionSnapshot>,
}

impl Snapshot {
    /// The snapshot of an empty structure.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture any layout (a live structure or another snapshot).
    pub fn capture<L: Layout + ?Sized>(layout: &L) -> Self {
        let sections = (0..layout.section_count())
            .map(|s| SectionSnapshot {
                identifier: layout.section_key(s).clone(),
                rows: (0..layout.row_count(s))
                    .map(|r| RowSnapshot {
                        identity: layout.row_identity(s, r).clone(),
                        content: layout.row_content(s, r),
                    })
                    .collect(),
                header: layout.header_content(s),
                footer: layout.footer_content(s),
            })
            .collect();
        Self { sections }
    }

    #[inline]
    pub fn sections(&self) -> &[SectionSnapshot] {
        &self.sections
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl<T> From<&Structure<T>> for Snapshot {
    fn from(structure: &Structure<T>) -> Self {
        Self::capture(structure)
    }
}

/// Capture a snapshot of a live structure.
pub fn snapshot<T>(structure: &Structure<T>) -> Snapshot {
    Snapshot::capture(structure)
}

impl Layout for Snapshot {
    #[inline]
    fn section_count(&self) -> usize {
        self.sections.len()
    }

    #[inline]
    fn section_key(&self, section: usize) -> &SectionKey {
        &self.sections[section].identifier
    }

    #[inline]
    fn row_count(&self, section: usize) -> usize {
        self.sections[section].rows.len()
    }

    #[inline]
    fn row_identity(&self, section: usize, row: usize) -> &IdentityKey {
        &self.sections[section].rows[row].identity
    }

    #[inline]
    fn row_content(&self, section: usize, row: usize) -> Option<ContentKey> {
        self.sections[section].rows[row].content
    }

    #[inline]
    fn header_content(&self, section: usize) -> Option<ContentKey> {
        self.sections[section].header
    }

    #[inline]
    fn footer_content(&self, section: usize) -> Option<ContentKey> {
        self.sections[section].footer
    }
}

// =============================================================================
// Tests
// =============================================================================
