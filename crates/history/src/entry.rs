//! History entries and the weak view handle they carry.

use backtrail_primitives::{BlockId, Offsets, ViewId};

/// Weak handle to the editor view an entry was recorded in.
///
/// Only identifiers are kept. The view may have been torn down since, so the
/// handle must be re-resolved through the editor surface before every use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewHandle {
	/// View the entry was recorded in (or last rebound to).
	pub view: ViewId,
	/// Root id of the document that view was showing.
	pub root: BlockId,
}

impl ViewHandle {
	pub fn new(view: ViewId, root: BlockId) -> Self {
		Self { view, root }
	}
}

/// A recorded position in either the back or the forward stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
	/// Block (or document root, meaning the title) the entry points at.
	pub target: BlockId,
	/// Zoom scope of the originating view, `None` for a whole-document view.
	pub zoom: Option<BlockId>,
	/// Caret or selection within the target's editable content.
	pub offsets: Offsets,
	/// View the entry was recorded in.
	pub view: ViewHandle,
}

impl HistoryEntry {
	pub fn new(target: BlockId, zoom: Option<BlockId>, offsets: Offsets, view: ViewHandle) -> Self {
		Self {
			target,
			zoom,
			offsets,
			view,
		}
	}

	/// Returns true if the entry addresses its document's title.
	pub fn targets_title(&self) -> bool {
		self.target == self.view.root
	}

	/// Returns true if `other` should update this entry instead of being
	/// pushed after it: same target, and both zoomed or both unzoomed.
	pub fn coalesces_with(&self, other: &HistoryEntry) -> bool {
		self.target == other.target && self.zoom.is_some() == other.zoom.is_some()
	}
}
