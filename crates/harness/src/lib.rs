//! An in-memory workspace for driving [`NavigationHistory`] without an editor.
//!
//! [`Workspace`] wires a [`DocumentStore`] to implementations of every
//! collaborator trait and offers the user-level moves the history reacts to:
//! opening and closing tabs, moving the caret, deleting blocks.

mod backend;
mod chrome;
mod layout;
mod store;
mod surface;

use std::sync::Arc;

pub use backend::{BackendCall, MemoryBackend};
use backtrail_history::host::{EditorSurface, Host};
use backtrail_history::{HistoryConfig, NavigationHistory, Recorded};
use backtrail_primitives::{BlockId, Offsets, ViewId};
pub use chrome::{RecordingNotifier, RecordingToolbar};
pub use layout::{CENTRAL_GROUP, MemoryLayout};
pub use store::{BlockSpec, DocumentSpec, DocumentStore};
pub use surface::{Focus, MemorySurface};

/// Every collaborator of a navigation history, in memory.
pub struct Workspace {
	pub store: Arc<DocumentStore>,
	pub surface: Arc<MemorySurface>,
	pub backend: Arc<MemoryBackend>,
	pub layout: Arc<MemoryLayout>,
	pub toolbar: Arc<RecordingToolbar>,
	pub notifier: Arc<RecordingNotifier>,
}

impl Workspace {
	/// Creates a workspace holding `documents`; tabs open `page_size` blocks.
	pub fn new(documents: impl IntoIterator<Item = DocumentSpec>, page_size: usize) -> Self {
		let store = Arc::new(DocumentStore::new());
		for doc in documents {
			store.insert(doc);
		}
		let surface = Arc::new(MemorySurface::new());
		Self {
			backend: Arc::new(MemoryBackend::new(Arc::clone(&store))),
			layout: Arc::new(MemoryLayout::new(Arc::clone(&store), Arc::clone(&surface), page_size)),
			toolbar: Arc::new(RecordingToolbar::default()),
			notifier: Arc::new(RecordingNotifier::default()),
			store,
			surface,
		}
	}

	pub fn host(&self) -> Host {
		Host {
			surface: self.surface.clone(),
			backend: self.backend.clone(),
			layout: self.layout.clone(),
			toolbar: self.toolbar.clone(),
			notifier: self.notifier.clone(),
		}
	}

	/// A fresh history driven by this workspace.
	pub fn history(&self, config: HistoryConfig) -> NavigationHistory {
		NavigationHistory::new(self.host(), config)
	}

	/// Opens a document in a new tab.
	pub fn open(&self, root: &str) -> Option<ViewId> {
		self.layout.open_document(&root.into())
	}

	/// Closes the tab hosting `view`.
	pub fn close(&self, view: ViewId) {
		self.surface.close_view(view);
	}

	/// Deletes a block (or document) from the store and from every view.
	pub fn delete(&self, id: &str) -> bool {
		let id = BlockId::from(id);
		for view in self.surface.views_of(&id) {
			self.surface.close_view(view);
		}
		self.surface.remove_block(&id);
		self.store.delete(&id)
	}

	/// Moves the caret of `view` into `block` and records the position.
	pub fn caret(&self, history: &NavigationHistory, view: ViewId, block: &str, offsets: Offsets) -> Recorded {
		let block = BlockId::from(block);
		let root = self.surface.view_info(view).map(|info| info.root);
		let range = match root {
			Some(root) if root == block => self.surface.select_title(view, offsets),
			_ => self.surface.select(view, &block, offsets),
		};
		match range {
			Some(range) => history.record(view, Some(range)),
			None => Recorded::Skipped,
		}
	}
}
