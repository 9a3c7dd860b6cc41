//! Prelude module for common imports.
//!
//! ```
//! use structured_diff::prelude::*;
//! ```

// Keys
pub use crate::key::{ContentKey, IdentityKey, Key, SectionKey};
pub use crate::hash::StableHasher;

// Model
pub use crate::model::{Capabilities, Decoration, Entry, Section, Structure};
pub use crate::layout::Layout;
pub use crate::snapshot::{snapshot, Snapshot};

// Algorithms
pub use crate::algo::{
    diff, diff_with_config, DiffConfig, DiffResult, DiffStats, Operation, Position, RowMove,
    SectionMove,
};

// Application
pub use crate::apply::{apply, BatchTarget, FallbackReason, Outcome};
pub use crate::reconcile::{Reconciler, ReloadMode};
pub use crate::cache::{ListKey, SharedReconcilerCache};

// Error
pub use crate::error::{DiffError, DiffOutcome};
