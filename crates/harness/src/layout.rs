use std::sync::Arc;

use backtrail_history::host::{LoadMode, TabLayout, TabSpec};
use backtrail_primitives::{BlockId, GroupId, ViewId};
use parking_lot::Mutex;
use tracing::debug;

use crate::store::DocumentStore;
use crate::surface::MemorySurface;

/// The central group every layout starts with.
pub const CENTRAL_GROUP: GroupId = GroupId(1);

#[derive(Debug)]
struct LayoutState {
	groups: Vec<GroupId>,
	active: Option<GroupId>,
	central: Option<GroupId>,
	opened: Vec<(GroupId, TabSpec, ViewId)>,
}

/// In-memory [`TabLayout`] rendering tabs onto a [`MemorySurface`].
#[derive(Debug)]
pub struct MemoryLayout {
	store: Arc<DocumentStore>,
	surface: Arc<MemorySurface>,
	page_size: usize,
	state: Mutex<LayoutState>,
}

impl MemoryLayout {
	pub fn new(store: Arc<DocumentStore>, surface: Arc<MemorySurface>, page_size: usize) -> Self {
		Self {
			store,
			surface,
			page_size,
			state: Mutex::new(LayoutState {
				groups: vec![CENTRAL_GROUP],
				active: Some(CENTRAL_GROUP),
				central: Some(CENTRAL_GROUP),
				opened: Vec::new(),
			}),
		}
	}

	/// Adds a split group and returns its id.
	pub fn add_group(&self) -> GroupId {
		let mut state = self.state.lock();
		let id = GroupId(state.groups.iter().map(|g| g.0).max().unwrap_or(0) + 1);
		state.groups.push(id);
		id
	}

	pub fn set_active(&self, group: Option<GroupId>) {
		self.state.lock().active = group;
	}

	pub fn set_central(&self, group: Option<GroupId>) {
		self.state.lock().central = group;
	}

	/// Tabs opened through [`TabLayout::open_editor`], oldest first.
	pub fn opened(&self) -> Vec<(GroupId, TabSpec, ViewId)> {
		self.state.lock().opened.clone()
	}

	/// Opens a document at its top, in the active group or the central one.
	pub fn open_document(&self, root: &BlockId) -> Option<ViewId> {
		let group = self.active_group().or_else(|| self.central_group())?;
		let window = self.store.window(root, LoadMode::Scope, self.page_size).ok()?;
		if window.root != *root {
			return None;
		}
		let view = self.surface.open_view(group, &window, true);
		self.state.lock().active = Some(group);
		Some(view)
	}
}

impl TabLayout for MemoryLayout {
	fn active_group(&self) -> Option<GroupId> {
		self.state.lock().active
	}

	fn central_group(&self) -> Option<GroupId> {
		self.state.lock().central
	}

	fn open_editor(&self, group: GroupId, tab: TabSpec) -> Option<ViewId> {
		if !self.state.lock().groups.contains(&group) {
			return None;
		}
		let window = self.store.window(&tab.focus, LoadMode::Centered, self.page_size).ok()?;
		let view = self.surface.open_view(group, &window, true);
		debug!(%view, root = %tab.root, title = %tab.title, "tab opened");

		let mut state = self.state.lock();
		state.active = Some(group);
		state.opened.push((group, tab, view));
		Some(view)
	}
}
