//! Back/forward navigation history for a block editor workspace.
//!
//! Positions (block, caret offsets, zoom scope) are recorded as focus leaves
//! them and replayed on back/forward. Replaying has to cope with a workspace
//! that moved on: the recorded view may be closed, the document may be only
//! partially loaded, and the block may have been deleted.
//!
//! * [`NavigationHistory`] owns the two stacks and is the entry point:
//!   [`record`](NavigationHistory::record),
//!   [`go_back`](NavigationHistory::go_back) and
//!   [`go_forward`](NavigationHistory::go_forward).
//! * [`Reconciler`] resolves a single entry against the live views.
//! * [`DualStack`] is the bounded back/forward store.
//! * [`host`] declares the collaborators the history is driven through.
//!
//! Everything runs on one task; collaborator calls are the only suspension
//! points and the stacks are never locked across them.

pub mod config;
pub mod entry;
pub mod error;
pub mod host;
mod navigator;
mod reconciler;
mod recorder;
pub mod stack;
mod state;

pub use backtrail_primitives::{BlockId, GroupId, NodeId, Offsets, ViewId};
pub use config::HistoryConfig;
pub use entry::{HistoryEntry, ViewHandle};
pub use error::{BackendError, ConfigError};
pub use host::Host;
pub use navigator::{Navigation, NavigationHistory};
pub use reconciler::Reconciler;
pub use recorder::Recorded;
pub use stack::{DualStack, Side};
