//! Collaborator seams consumed by the navigation history.
//!
//! The history never owns an editor view, a tab or a document. It talks to
//! the rest of the workspace through these traits:
//!
//! * [`EditorSurface`]: live views and their rendered node trees. Attachment
//!   is polled, never pushed.
//! * [`Backend`]: read-only block store queries (existence, block info,
//!   content windows). The only async seam.
//! * [`TabLayout`]: tab groups and tab construction.
//! * [`Toolbar`] and [`Notifier`]: pure side-effect sinks.
//!
//! [`Host`] bundles one implementation of each.

mod types;

use std::sync::Arc;

use async_trait::async_trait;
use backtrail_primitives::{BlockId, GroupId, NodeId, Offsets, ViewId};
pub use types::{
	BlockInfo, ContentWindow, LoadMode, NodeInfo, NodeKind, Notice, TabSpec, TextRange, ViewInfo,
	WindowBlock,
};

use crate::error::BackendError;
use crate::stack::Side;

/// Live editor views and their rendered content.
pub trait EditorSurface: Send + Sync {
	/// Returns true while the view is attached to the visible layout.
	fn is_attached(&self, view: ViewId) -> bool;

	/// Document and scope shown by the view, `None` for unknown views.
	fn view_info(&self, view: ViewId) -> Option<ViewInfo>;

	/// Returns true if the view's tab is the selected one in its group.
	fn is_foreground(&self, view: ViewId) -> bool;

	/// Brings the view's tab to the foreground of its group.
	fn activate(&self, view: ViewId);

	/// Current selection of the view, if it has one.
	fn selection(&self, view: ViewId) -> Option<TextRange>;

	fn node(&self, view: ViewId, node: NodeId) -> Option<NodeInfo>;

	/// The title editable of the view.
	fn title_node(&self, view: ViewId) -> Option<NodeId>;

	/// Every rendered node carrying `block`, in document order, embedded
	/// copies included.
	fn nodes_for_block(&self, view: ViewId, block: &BlockId) -> Vec<NodeId>;

	/// Offsets of `range` relative to the editable content of `node`.
	fn selection_offsets(&self, view: ViewId, node: NodeId, range: &TextRange) -> Offsets;

	/// Places the caret (or selection) inside `node`.
	fn place_caret(&self, view: ViewId, node: NodeId, offsets: Offsets);

	/// Scrolls `node` to the vertical centre of the viewport.
	fn scroll_center(&self, view: ViewId, node: NodeId);

	/// Replaces the view's rendered content with `window`, adopting its scope.
	fn splice(&self, view: ViewId, window: ContentWindow);

	/// Hides transient overlays (gutter, toolbars, hints, dialogs).
	fn dismiss_overlays(&self, view: ViewId);
}

/// Read-only queries against the block store.
#[async_trait]
pub trait Backend: Send + Sync {
	async fn check_block_exist(&self, id: &BlockId) -> Result<bool, BackendError>;

	async fn get_block_info(&self, id: &BlockId) -> Result<BlockInfo, BackendError>;

	/// Fetches a content window of at most `size` blocks around `id`.
	async fn get_doc(&self, id: &BlockId, mode: LoadMode, size: usize) -> Result<ContentWindow, BackendError>;
}

/// Tab groups and tab construction.
pub trait TabLayout: Send + Sync {
	/// Group holding the focused tab, if any.
	fn active_group(&self) -> Option<GroupId>;

	/// Group of the central editor area.
	fn central_group(&self) -> Option<GroupId>;

	/// Opens `tab` in `group`, makes it the active group and returns the new
	/// editor view.
	fn open_editor(&self, group: GroupId, tab: TabSpec) -> Option<ViewId>;
}

/// Back/forward buttons.
pub trait Toolbar: Send + Sync {
	fn set_back_enabled(&self, enabled: bool);

	fn set_forward_enabled(&self, enabled: bool);

	fn set_enabled(&self, side: Side, enabled: bool) {
		match side {
			Side::Back => self.set_back_enabled(enabled),
			Side::Forward => self.set_forward_enabled(enabled),
		}
	}
}

/// Sink for user-visible messages.
pub trait Notifier: Send + Sync {
	fn notify(&self, notice: Notice);
}

/// One implementation of every collaborator.
#[derive(Clone)]
pub struct Host {
	pub surface: Arc<dyn EditorSurface>,
	pub backend: Arc<dyn Backend>,
	pub layout: Arc<dyn TabLayout>,
	pub toolbar: Arc<dyn Toolbar>,
	pub notifier: Arc<dyn Notifier>,
}
