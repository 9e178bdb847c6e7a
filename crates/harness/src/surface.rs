//! Editor views with a rendered node tree.
//!
//! Every block renders as a block node with one inline text child. An embed
//! renders as an embed node holding a block node for the transcluded copy, so
//! the same block id can appear more than once in a view.

use std::collections::{BTreeMap, HashMap};

use backtrail_history::host::{ContentWindow, EditorSurface, NodeInfo, NodeKind, TextRange, ViewInfo};
use backtrail_primitives::{BlockId, GroupId, NodeId, Offsets, ViewId};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
struct Node {
	kind: NodeKind,
	parent: Option<NodeId>,
	editable: bool,
	/// Editable text length, `None` when unknown (titles, embedded copies).
	text_len: Option<usize>,
}

#[derive(Debug)]
struct View {
	root: BlockId,
	scope: Option<BlockId>,
	group: GroupId,
	hosted: bool,
	attached: bool,
	title: NodeId,
	nodes: HashMap<NodeId, Node>,
	/// Block-level nodes in document order.
	order: Vec<NodeId>,
	selection: Option<TextRange>,
	splices: usize,
}

/// Where the caret was last placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focus {
	pub view: ViewId,
	pub node: NodeId,
	/// Block holding the caret, `None` for the title.
	pub block: Option<BlockId>,
	pub offsets: Offsets,
	/// Whether the caret landed inside an embedded copy.
	pub in_embed: bool,
}

#[derive(Debug, Default)]
struct SurfaceState {
	views: BTreeMap<ViewId, View>,
	/// Foreground view of each group.
	foreground: HashMap<GroupId, ViewId>,
	next_view: u64,
	next_node: u64,
	focus: Option<Focus>,
	scrolled: Option<(ViewId, NodeId)>,
	overlays_dismissed: usize,
}

impl SurfaceState {
	fn alloc_node(&mut self) -> NodeId {
		self.next_node += 1;
		NodeId(self.next_node)
	}

	fn in_embed(&self, view: &View, node: NodeId) -> bool {
		let mut cursor = view.nodes.get(&node).and_then(|n| n.parent);
		while let Some(id) = cursor {
			match view.nodes.get(&id) {
				Some(n) if n.kind == NodeKind::Embed => return true,
				Some(n) => cursor = n.parent,
				None => return false,
			}
		}
		false
	}

	/// Builds a fresh node tree for `window`.
	fn render(&mut self, window: &ContentWindow) -> (NodeId, HashMap<NodeId, Node>, Vec<NodeId>) {
		let mut nodes = HashMap::new();
		let mut order = Vec::new();
		let mut by_block: HashMap<BlockId, NodeId> = HashMap::new();

		let title = self.alloc_node();
		nodes.insert(
			title,
			Node {
				kind: NodeKind::Title,
				parent: None,
				editable: true,
				text_len: None,
			},
		);

		for block in &window.blocks {
			let parent = block.parent.as_ref().and_then(|p| by_block.get(p)).copied();
			let node = self.push_block(&mut nodes, &mut order, block.id.clone(), parent, Some(block.text_len));
			by_block.insert(block.id.clone(), node);

			for embedded in &block.embeds {
				let embed = self.alloc_node();
				nodes.insert(
					embed,
					Node {
						kind: NodeKind::Embed,
						parent: Some(node),
						editable: false,
						text_len: None,
					},
				);
				self.push_block(&mut nodes, &mut order, embedded.clone(), Some(embed), None);
			}
		}
		(title, nodes, order)
	}

	fn push_block(
		&mut self,
		nodes: &mut HashMap<NodeId, Node>,
		order: &mut Vec<NodeId>,
		id: BlockId,
		parent: Option<NodeId>,
		text_len: Option<usize>,
	) -> NodeId {
		let node = self.alloc_node();
		nodes.insert(
			node,
			Node {
				kind: NodeKind::Block(id),
				parent,
				editable: true,
				text_len,
			},
		);
		let text = self.alloc_node();
		nodes.insert(
			text,
			Node {
				kind: NodeKind::Inline,
				parent: Some(node),
				editable: true,
				text_len,
			},
		);
		order.push(node);
		node
	}
}

/// In-memory [`EditorSurface`].
#[derive(Debug, Default)]
pub struct MemorySurface {
	state: Mutex<SurfaceState>,
}

impl MemorySurface {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a view showing `window` and brings it to the front of `group`.
	pub fn open_view(&self, group: GroupId, window: &ContentWindow, hosted: bool) -> ViewId {
		let mut state = self.state.lock();
		state.next_view += 1;
		let id = ViewId(state.next_view);
		let (title, nodes, order) = state.render(window);
		state.views.insert(
			id,
			View {
				root: window.root.clone(),
				scope: window.scope.clone(),
				group,
				hosted,
				attached: true,
				title,
				nodes,
				order,
				selection: None,
				splices: 0,
			},
		);
		state.foreground.insert(group, id);
		id
	}

	/// Detaches the view, as closing its tab does. The id stays known.
	pub fn close_view(&self, view: ViewId) {
		let mut state = self.state.lock();
		let Some(v) = state.views.get_mut(&view) else {
			return;
		};
		v.attached = false;
		let group = v.group;
		if state.foreground.get(&group) == Some(&view) {
			let next = state
				.views
				.iter()
				.rev()
				.find(|(_, v)| v.attached && v.group == group)
				.map(|(id, _)| *id);
			match next {
				Some(next) => state.foreground.insert(group, next),
				None => state.foreground.remove(&group),
			};
		}
	}

	/// Views of `root` that are still attached.
	pub fn views_of(&self, root: &BlockId) -> Vec<ViewId> {
		let state = self.state.lock();
		state
			.views
			.iter()
			.filter(|(_, v)| v.attached && &v.root == root)
			.map(|(id, _)| *id)
			.collect()
	}

	/// Removes every rendered occurrence of `block` (and its rendered
	/// descendants) from all views.
	pub fn remove_block(&self, block: &BlockId) {
		let mut state = self.state.lock();
		for view in state.views.values_mut() {
			let doomed: Vec<NodeId> = view
				.nodes
				.iter()
				.filter(|(_, n)| n.kind == NodeKind::Block(block.clone()))
				.map(|(id, _)| *id)
				.collect();
			for root in doomed {
				let mut stack = vec![root];
				while let Some(id) = stack.pop() {
					view.nodes.remove(&id);
					stack.extend(view.nodes.iter().filter(|(_, n)| n.parent == Some(id)).map(|(c, _)| *c));
				}
			}
			let nodes = &view.nodes;
			view.order.retain(|id| nodes.contains_key(id));
		}
	}

	/// Moves the selection of `view` into the canonical rendering of `block`
	/// and returns it. Offsets are relative to the block's text.
	pub fn select(&self, view: ViewId, block: &BlockId, offsets: Offsets) -> Option<TextRange> {
		let mut state = self.state.lock();
		let v = state.views.get(&view)?;
		let node = v
			.order
			.iter()
			.copied()
			.find(|id| v.nodes[id].kind == NodeKind::Block(block.clone()) && !state.in_embed(v, *id))?;
		let text = v
			.nodes
			.iter()
			.find(|(_, n)| n.parent == Some(node) && n.kind == NodeKind::Inline)
			.map(|(id, _)| *id)?;
		let range = TextRange {
			anchor: text,
			start: offsets.start(),
			end: offsets.end(),
		};
		state.views.get_mut(&view)?.selection = Some(range);
		Some(range)
	}

	/// Moves the selection of `view` into its title.
	pub fn select_title(&self, view: ViewId, offsets: Offsets) -> Option<TextRange> {
		let mut state = self.state.lock();
		let v = state.views.get_mut(&view)?;
		let range = TextRange {
			anchor: v.title,
			start: offsets.start(),
			end: offsets.end(),
		};
		v.selection = Some(range);
		Some(range)
	}

	/// Moves the selection onto an arbitrary node.
	pub fn select_node(&self, view: ViewId, node: NodeId, offsets: Offsets) -> Option<TextRange> {
		let mut state = self.state.lock();
		let v = state.views.get_mut(&view)?;
		let range = TextRange {
			anchor: node,
			start: offsets.start(),
			end: offsets.end(),
		};
		v.selection = Some(range);
		Some(range)
	}

	pub fn focus(&self) -> Option<Focus> {
		self.state.lock().focus.clone()
	}

	pub fn scrolled_to(&self) -> Option<(ViewId, NodeId)> {
		self.state.lock().scrolled
	}

	/// Block shown by a rendered node.
	pub fn block_of(&self, view: ViewId, node: NodeId) -> Option<BlockId> {
		let state = self.state.lock();
		match &state.views.get(&view)?.nodes.get(&node)?.kind {
			NodeKind::Block(id) => Some(id.clone()),
			_ => None,
		}
	}

	/// Nodes of the transcluded copies in `view`, in document order.
	pub fn embed_nodes(&self, view: ViewId) -> Vec<NodeId> {
		let state = self.state.lock();
		let Some(v) = state.views.get(&view) else {
			return Vec::new();
		};
		v.order.iter().copied().filter(|id| state.in_embed(v, *id)).collect()
	}

	/// Whether `block` is rendered outside any embed in `view`.
	pub fn renders(&self, view: ViewId, block: &BlockId) -> bool {
		let state = self.state.lock();
		state.views.get(&view).is_some_and(|v| {
			v.order
				.iter()
				.any(|id| v.nodes[id].kind == NodeKind::Block(block.clone()) && !state.in_embed(v, *id))
		})
	}

	pub fn splice_count(&self, view: ViewId) -> usize {
		self.state.lock().views.get(&view).map_or(0, |v| v.splices)
	}

	pub fn overlays_dismissed(&self) -> usize {
		self.state.lock().overlays_dismissed
	}

	pub fn foreground_of(&self, group: GroupId) -> Option<ViewId> {
		self.state.lock().foreground.get(&group).copied()
	}

	/// Opens `view`'s group on a different view, pushing `view` to the back.
	pub fn send_to_background(&self, view: ViewId, replacement: ViewId) {
		let mut state = self.state.lock();
		if let Some(group) = state.views.get(&view).map(|v| v.group) {
			state.foreground.insert(group, replacement);
		}
	}
}

impl EditorSurface for MemorySurface {
	fn is_attached(&self, view: ViewId) -> bool {
		self.state.lock().views.get(&view).is_some_and(|v| v.attached)
	}

	fn view_info(&self, view: ViewId) -> Option<ViewInfo> {
		let state = self.state.lock();
		let v = state.views.get(&view)?;
		Some(ViewInfo {
			root: v.root.clone(),
			scope: v.scope.clone(),
			hosted: v.hosted,
		})
	}

	fn is_foreground(&self, view: ViewId) -> bool {
		let state = self.state.lock();
		state
			.views
			.get(&view)
			.is_some_and(|v| state.foreground.get(&v.group) == Some(&view))
	}

	fn activate(&self, view: ViewId) {
		let mut state = self.state.lock();
		if let Some(group) = state.views.get(&view).filter(|v| v.attached).map(|v| v.group) {
			state.foreground.insert(group, view);
		}
	}

	fn selection(&self, view: ViewId) -> Option<TextRange> {
		self.state.lock().views.get(&view)?.selection
	}

	fn node(&self, view: ViewId, node: NodeId) -> Option<NodeInfo> {
		let state = self.state.lock();
		let n = state.views.get(&view)?.nodes.get(&node)?;
		Some(NodeInfo {
			kind: n.kind.clone(),
			parent: n.parent,
			editable: n.editable,
		})
	}

	fn title_node(&self, view: ViewId) -> Option<NodeId> {
		self.state.lock().views.get(&view).map(|v| v.title)
	}

	fn nodes_for_block(&self, view: ViewId, block: &BlockId) -> Vec<NodeId> {
		let state = self.state.lock();
		let Some(v) = state.views.get(&view) else {
			return Vec::new();
		};
		v.order
			.iter()
			.copied()
			.filter(|id| v.nodes[id].kind == NodeKind::Block(block.clone()))
			.collect()
	}

	fn selection_offsets(&self, view: ViewId, node: NodeId, range: &TextRange) -> Offsets {
		let state = self.state.lock();
		let Some(v) = state.views.get(&view) else {
			return Offsets::default();
		};
		let within = range.anchor == node || v.nodes.get(&range.anchor).and_then(|n| n.parent) == Some(node);
		if !within {
			return Offsets::default();
		}
		let offsets = Offsets::spanning(range.start, range.end);
		match v.nodes.get(&node).and_then(|n| n.text_len) {
			Some(len) => offsets.clamp_to(len),
			None => offsets,
		}
	}

	fn place_caret(&self, view: ViewId, node: NodeId, offsets: Offsets) {
		let mut state = self.state.lock();
		let Some(v) = state.views.get(&view) else {
			return;
		};
		let block = match v.nodes.get(&node).map(|n| &n.kind) {
			Some(NodeKind::Block(id)) => Some(id.clone()),
			_ => None,
		};
		let in_embed = state.in_embed(v, node);
		state.focus = Some(Focus {
			view,
			node,
			block,
			offsets,
			in_embed,
		});
	}

	fn scroll_center(&self, view: ViewId, node: NodeId) {
		self.state.lock().scrolled = Some((view, node));
	}

	fn splice(&self, view: ViewId, window: ContentWindow) {
		let mut state = self.state.lock();
		if !state.views.contains_key(&view) {
			return;
		}
		let (title, nodes, order) = state.render(&window);
		if let Some(v) = state.views.get_mut(&view) {
			v.scope = window.scope;
			v.title = title;
			v.nodes = nodes;
			v.order = order;
			v.selection = None;
			v.splices += 1;
		}
	}

	fn dismiss_overlays(&self, _view: ViewId) {
		self.state.lock().overlays_dismissed += 1;
	}
}
