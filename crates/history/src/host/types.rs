use backtrail_primitives::{BlockId, NodeId};

/// What an editor view is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewInfo {
	/// Root id of the document loaded in the view.
	pub root: BlockId,
	/// Sub-block the view is zoomed into, `None` for the whole document.
	pub scope: Option<BlockId>,
	/// Whether the view is hosted by a tab (floating previews are not).
	pub hosted: bool,
}

/// Kind of a rendered node, as far as navigation cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	/// The document title editable.
	Title,
	/// A block-level element carrying a block id.
	Block(BlockId),
	/// Container of a transcluded copy of another block.
	Embed,
	/// Anything else: inline spans, text runs, decorations.
	Inline,
}

/// A rendered node and its place in the view's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
	pub kind: NodeKind,
	pub parent: Option<NodeId>,
	/// Whether the node has editable text content.
	pub editable: bool,
}

/// A selection as the surface reports it: offsets relative to the text of
/// its anchor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
	pub anchor: NodeId,
	pub start: usize,
	pub end: usize,
}

/// Backend lookup result used to rebuild a closed tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
	pub root_id: BlockId,
	pub root_title: String,
	pub root_icon: Option<String>,
	/// Top-level block of the document containing the looked-up block; the
	/// tab is opened at this block.
	pub root_child_id: BlockId,
}

/// How a content window is positioned around the requested id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
	/// Load a scope from its beginning; the view shows only that sub-tree
	/// unless the id is a document root.
	Scope,
	/// Load a whole-document window centred on the id.
	Centered,
}

/// One block of a fetched content window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowBlock {
	pub id: BlockId,
	/// Parent block, `None` for top-level blocks (or the window's scope).
	pub parent: Option<BlockId>,
	/// Length of the block's editable text in characters.
	pub text_len: usize,
	/// Blocks transcluded inside this one.
	pub embeds: Vec<BlockId>,
}

/// A slice of a document as returned by the backend's content fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentWindow {
	pub root: BlockId,
	/// Zoom scope the window represents, `None` for a whole-document window.
	pub scope: Option<BlockId>,
	/// Blocks in document order.
	pub blocks: Vec<WindowBlock>,
}

impl ContentWindow {
	pub fn contains(&self, id: &BlockId) -> bool {
		self.blocks.iter().any(|b| &b.id == id)
	}
}

/// Request to host a document in a new tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSpec {
	pub root: BlockId,
	/// Block the new view is initially loaded around.
	pub focus: BlockId,
	pub title: String,
	pub icon: Option<String>,
}

/// User-visible messages raised while navigating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
	/// The document is locked and cannot be opened.
	DocumentLocked { root: BlockId },
	/// The document window was closed and could not be recreated.
	DocumentUnavailable { root: BlockId, reason: String },
}

impl std::fmt::Display for Notice {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Notice::DocumentLocked { root } => write!(f, "document {root} is locked"),
			Notice::DocumentUnavailable { root, reason } => {
				write!(f, "document {root} was closed and could not be recreated: {reason}")
			}
		}
	}
}
