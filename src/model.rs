//! Live structure types: Structure, Section, Entry, Decoration
//!
//! A [`Structure`] is what the UI layer builds for every update: an ordered
//! list of [`Section`]s, each an ordered list of [`Entry`] rows plus an
//! optional header and footer. Entries carry a caller payload `T` next to
//! their keys; the diff engine only reads the keys.
//!
//! # Example
//!
//! ```
//! use structured_diff::{ContentKey, Entry, Section, Structure};
//!
//! let mut structure = Structure::new();
//! structure.push(
//!     Section::new("cities")
//!         .with_header_text("Cities")
//!         .with_row(Entry::new("kyiv", "Kyiv").with_content(ContentKey::of_text("Kyiv")))
//!         .with_row(Entry::new("lviv", "Lviv")),
//! );
//! assert_eq!(structure.row_count(), 2);
//! ```

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::algo::Position;
use crate::error::{DiffError, Side};
use crate::key::{ContentKey, IdentityKey, SectionKey};

// =============================================================================
// Capabilities
// =============================================================================

/// Behaviors an entry opts into, resolved once at construction.
///
/// The engine ignores these. They travel with the entry so the UI layer can
/// answer "may this row be selected / edited / moved?" without inspecting
/// the payload type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    pub selectable: bool,
    pub deselectable: bool,
    pub editable: bool,
    pub movable: bool,
    pub focusable: bool,
}

impl Capabilities {
    /// No behaviors.
    pub const NONE: Self = Self {
        selectable: false,
        deselectable: false,
        editable: false,
        movable: false,
        focusable: false,
    };

    /// Selectable, deselectable and focusable. The usual tappable row.
    pub const INTERACTIVE: Self = Self {
        selectable: true,
        deselectable: true,
        editable: false,
        movable: false,
        focusable: true,
    };

    pub fn selectable(mut self, on: bool) -> Self {
        self.selectable = on;
        self
    }

    pub fn deselectable(mut self, on: bool) -> Self {
        self.deselectable = on;
        self
    }

    pub fn editable(mut self, on: bool) -> Self {
        self.editable = on;
        self
    }

    pub fn movable(mut self, on: bool) -> Self {
        self.movable = on;
        self
    }

    pub fn focusable(mut self, on: bool) -> Self {
        self.focusable = on;
        self
    }
}

// =============================================================================
// Entry
// =============================================================================

/// A row or decoration: keys plus the caller's payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T = ()> {
    /// Stable identity, unique within the owning section
    pub identity: IdentityKey,
    /// Content signature; `None` opts out of reload detection
    pub content: Option<ContentKey>,
    /// Caller payload (view model)
    pub value: T,
    /// Opted-in behaviors
    pub capabilities: Capabilities,
}

impl<T> Entry<T> {
    /// Create an entry without a content signature.
    pub fn new(identity: impl Into<IdentityKey>, value: T) -> Self {
        Self {
            identity: identity.into(),
            content: None,
            value,
            capabilities: Capabilities::NONE,
        }
    }

    /// Attach a content signature.
    pub fn with_content(mut self, content: ContentKey) -> Self {
        self.content = Some(content);
        self
    }

    /// Attach capabilities.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Whether this entry takes part in content reload detection.
    #[inline]
    pub fn is_content_comparable(&self) -> bool {
        self.content.is_some()
    }
}

impl Entry<()> {
    /// Create a payload-less entry.
    pub fn key(identity: impl Into<IdentityKey>) -> Self {
        Self::new(identity, ())
    }
}

// =============================================================================
// Decoration
// =============================================================================

/// Section header or footer.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoration<T = ()> {
    /// Plain title; its content signature is the text fingerprint
    Text(CompactString),
    /// Custom view model
    Entry(Entry<T>),
}

impl<T> Decoration<T> {
    /// Content signature used for header/footer reload detection.
    pub fn content(&self) -> Option<ContentKey> {
        match self {
            Decoration::Text(text) => Some(ContentKey::of_text(text)),
            Decoration::Entry(entry) => entry.content,
        }
    }

    /// Title text, if this is a plain text decoration.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Decoration::Text(text) => Some(text.as_str()),
            Decoration::Entry(_) => None,
        }
    }
}

// =============================================================================
// Section
// =============================================================================

/// Row storage; most sections are short.
pub type Rows<T> = SmallVec<[Entry<T>; 8]>;

/// An ordered container of rows with optional header and footer.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<T = ()> {
    /// Identifier, unique within the structure
    pub identifier: SectionKey,
    /// Rows in display order
    pub rows: Rows<T>,
    pub header: Option<Decoration<T>>,
    pub footer: Option<Decoration<T>>,
}

impl<T> Section<T> {
    /// Create an empty section.
    pub fn new(identifier: impl Into<SectionKey>) -> Self {
        Self {
            identifier: identifier.into(),
            rows: SmallVec::new(),
            header: None,
            footer: None,
        }
    }

    /// Create a section from rows.
    pub fn with_rows(identifier: impl Into<SectionKey>, rows: impl IntoIterator<Item = Entry<T>>) -> Self {
        let mut section = Self::new(identifier);
        section.rows.extend(rows);
        section
    }

    /// Builder: append one row.
    pub fn with_row(mut self, row: Entry<T>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_header(mut self, header: Decoration<T>) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_footer(mut self, footer: Decoration<T>) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn with_header_text(self, text: &str) -> Self {
        self.with_header(Decoration::Text(text.into()))
    }

    pub fn with_footer_text(self, text: &str) -> Self {
        self.with_footer(Decoration::Text(text.into()))
    }

    pub fn push(&mut self, row: Entry<T>) {
        self.rows.push(row);
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = Entry<T>>) {
        self.rows.extend(rows);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Structure
// =============================================================================

/// The full presented collection: sections in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure<T = ()> {
    sections: Vec<Section<T>>,
}

impl<T> Default for Structure<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Structure<T> {
    pub fn new() -> Self {
        Self { sections: Vec::new() }
    }

    /// Append a section without checking identifier uniqueness.
    ///
    /// Duplicates are still caught by the diff.
    pub fn push(&mut self, section: Section<T>) {
        self.sections.push(section);
    }

    /// Append a section, refusing a repeated identifier.
    pub fn try_push(&mut self, section: Section<T>) -> Result<(), DiffError> {
        if self.section_index(&section.identifier).is_some() {
            return Err(DiffError::DuplicateSectionIdentity {
                side: Side::New,
                index: self.sections.len(),
                section: section.identifier,
            });
        }
        self.sections.push(section);
        Ok(())
    }

    /// An empty section identified by its future position (`#Section{n}`).
    pub fn new_section(&self) -> Section<T> {
        Section::new(SectionKey::positional(self.sections.len()))
    }

    #[inline]
    pub fn sections(&self) -> &[Section<T>] {
        &self.sections
    }

    #[inline]
    pub fn sections_mut(&mut self) -> &mut [Section<T>] {
        &mut self.sections
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of rows across all sections.
    pub fn row_count(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }

    pub fn section(&self, index: usize) -> Option<&Section<T>> {
        self.sections.get(index)
    }

    /// Index of the section with this identifier.
    pub fn section_index(&self, identifier: &SectionKey) -> Option<usize> {
        self.sections.iter().position(|s| &s.identifier == identifier)
    }

    /// Whether `position` addresses an existing row.
    pub fn is_valid(&self, position: Position) -> bool {
        self.entry_at(position).is_some()
    }

    pub fn entry_at(&self, position: Position) -> Option<&Entry<T>> {
        self.sections.get(position.section)?.rows.get(position.row)
    }

    /// First position holding a row with this identity.
    pub fn position_of(&self, identity: &IdentityKey) -> Option<Position> {
        self.sections.iter().enumerate().find_map(|(s, section)| {
            section
                .rows
                .iter()
                .position(|row| &row.identity == identity)
                .map(|r| Position::new(s, r))
        })
    }

    pub fn into_sections(self) -> Vec<Section<T>> {
        self.sections
    }
}

impl<T> FromIterator<Section<T>> for Structure<T> {
    fn from_iter<I: IntoIterator<Item = Section<T>>>(iter: I) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

impl<T> From<Vec<Section<T>>> for Structure<T> {
    fn from(sections: Vec<Section<T>>) -> Self {
        Self { sections }
    }
}

// =============================================================================
// Tests
// =============================================================================
