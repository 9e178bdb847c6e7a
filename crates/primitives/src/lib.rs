//! Core types for navigation history: entity identifiers and caret offsets.

/// Identifier types for blocks, views, rendered nodes and tab groups.
pub mod ids;
/// Caret and selection offsets within a block's editable content.
pub mod offsets;

pub use ids::{BlockId, GroupId, NodeId, ViewId};
pub use offsets::{Offsets, OffsetsError};
