//! Read-only view over a sectioned structure.
//!
//! The diff engine never touches payloads; it reads identities and content
//! signatures through [`Layout`]. Both the live [`Structure`] and a captured
//! [`Snapshot`](crate::Snapshot) implement it, so either can be the new side
//! of a diff.

use crate::key::{ContentKey, IdentityKey, SectionKey};
use crate::model::Structure;

/// Index-addressed access to section and row keys.
///
/// Indices passed in are always in range; implementations may panic
/// otherwise.
pub trait Layout {
    /// Number of sections.
    fn section_count(&self) -> usize;

    /// Identity of the section at `section`.
    fn section_key(&self, section: usize) -> &SectionKey;

    /// Number of rows in `section`.
    fn row_count(&self, section: usize) -> usize;

    /// Identity of one row, unique within its section.
    fn row_identity(&self, section: usize, row: usize) -> &IdentityKey;

    /// Content signature of one row; `None` if the row is not comparable.
    fn row_content(&self, section: usize, row: usize) -> Option<ContentKey>;

    /// Header content signature, if the section has one.
    fn header_content(&self, section: usize) -> Option<ContentKey>;

    /// Footer content signature, if the section has one.
    fn footer_content(&self, section: usize) -> Option<ContentKey>;

    /// Total rows across all sections.
    fn total_rows(&self) -> usize {
        (0..self.section_count()).map(|s| self.row_count(s)).sum()
    }
}

impl<T> Layout for Structure<T> {
    #[inline]
    fn section_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn section_key(&self, section: usize) -> &SectionKey {
        &self.sections()[section].identifier
    }

    #[inline]
    fn row_count(&self, section: usize) -> usize {
        self.sections()[section].rows.len()
    }

    #[inline]
    fn row_identity(&self, section: usize, row: usize) -> &IdentityKey {
        &self.sections()[section].rows[row].identity
    }

    #[inline]
    fn row_content(&self, section: usize, row: usize) -> Option<ContentKey> {
        self.sections()[section].rows[row].content
    }

    fn header_content(&self, section: usize) -> Option<ContentKey> {
        self.sections()[section].header.as_ref().and_then(|h| h.content())
    }

    fn footer_content(&self, section: usize) -> Option<ContentKey> {
        self.sections()[section].footer.as_ref().and_then(|f| f.content())
    }
}
