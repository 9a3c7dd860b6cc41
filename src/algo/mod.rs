//! Algorithm implementations for structure reconciliation.
//!
//! - `diff`: two-level diff producing batchable edit operations
//! - `conflict`: detection of edit sets that can not be batched
//! - `myers`: Myers LCS for minimal move reporting

pub mod conflict;
mod diff;
mod myers;

#[cfg(test)]
mod proptests;

#[cfg(feature = "parallel")]
pub use diff::diff_many;
pub use diff::{
    diff, diff_with_config, DiffConfig, DiffResult, DiffStats, DuplicatePolicy, MoveStrategy,
    Operation, Position, RowMove, SectionMove,
};
pub use conflict::Conflict;
pub use myers::lcs_pairs;
