//! Resolving a history entry against the live workspace.
//!
//! [`Reconciler::resolve`] runs these stages in order and returns at the
//! first one that lands the caret:
//!
//! 1. **Live view**: the entry's view is attached, shows the entry's scope and
//!    has the target rendered. Focus it.
//! 2. **Reconstruction**: the view is gone but the document still exists.
//!    Open a new tab, rebind every stale entry of that document to the new
//!    view, then continue with the new view.
//! 3. **Dynamic load**: no zoom was recorded; fetch a document window centred
//!    on the target and splice it in.
//! 4. **Scope change**: load the recorded zoom scope (or the document root)
//!    and look again.
//! 5. **Exhausted**: ask the backend whether the target exists at all. Either
//!    way the entry failed.
//!
//! Embedded copies of the target never count as its location.

use backtrail_primitives::{BlockId, NodeId, Offsets, ViewId};
use tracing::{debug, warn};

use crate::config::HistoryConfig;
use crate::entry::{HistoryEntry, ViewHandle};
use crate::error::BackendError;
use crate::host::{Host, LoadMode, NodeKind, Notice, TabSpec};
use crate::state::SharedState;

/// Brings history entries back into focus.
pub struct Reconciler {
	host: Host,
	config: HistoryConfig,
	state: SharedState,
}

impl Reconciler {
	pub(crate) fn new(host: Host, config: HistoryConfig, state: SharedState) -> Self {
		Self { host, config, state }
	}

	pub fn config(&self) -> &HistoryConfig {
		&self.config
	}

	/// Attempts to focus `entry`'s target, returning whether it succeeded.
	///
	/// A reconstruction rewrites `entry.view` (and the matching stale entries
	/// of both stacks) to the newly opened view.
	#[tracing::instrument(level = "debug", skip_all, fields(target = %entry.target, view = ?entry.view.view))]
	pub async fn resolve(&self, entry: &mut HistoryEntry) -> bool {
		let surface = &*self.host.surface;

		if !surface.is_attached(entry.view.view) {
			debug!("view detached, reconstructing");
			let Some(handle) = self.reopen(entry).await else {
				return false;
			};
			entry.view = handle;
		}
		let view = entry.view.view;
		surface.dismiss_overlays(view);

		let Some(info) = surface.view_info(view) else {
			debug!("view vanished before it could be inspected");
			return false;
		};

		if entry.target == info.root {
			return self.focus_title(view, entry.offsets);
		}

		if info.scope == entry.zoom
			&& let Some(node) = self.canonical_node(view, &entry.target)
		{
			self.focus_block(view, node, entry.offsets);
			surface.scroll_center(view, node);
			return true;
		}

		let mut target_missing = false;
		if entry.zoom.is_none() {
			debug!("loading a window around the target");
			match self
				.host
				.backend
				.get_doc(&entry.target, LoadMode::Centered, self.config.page_size)
				.await
			{
				Ok(window) => {
					surface.splice(view, window);
					if self.land_after_load(view, entry).await {
						return true;
					}
				}
				Err(BackendError::NotFound(_)) => target_missing = true,
				Err(error) => warn!(%error, "content window fetch failed"),
			}
		}

		if !target_missing {
			let (scope, size) = match &entry.zoom {
				Some(zoom) => (zoom.clone(), self.config.scope_page_size),
				None => (info.root.clone(), self.config.page_size),
			};
			debug!(%scope, "changing scope");
			match self.host.backend.get_doc(&scope, LoadMode::Scope, size).await {
				Ok(window) => {
					surface.splice(view, window);
					if self.land_after_load(view, entry).await {
						return true;
					}
				}
				Err(error) => debug!(%error, "scope fetch failed"),
			}
		}

		match self.host.backend.check_block_exist(&entry.target).await {
			Ok(false) => debug!("target deleted"),
			Ok(true) => warn!("target exists but could not be located in any rendered form"),
			Err(error) => warn!(%error, "existence check failed"),
		}
		false
	}

	/// Opens a new tab for the entry's document, returning its handle.
	async fn reopen(&self, entry: &HistoryEntry) -> Option<ViewHandle> {
		let backend = &*self.host.backend;
		let root = &entry.view.root;

		match backend.check_block_exist(root).await {
			Ok(true) => {}
			Ok(false) => {
				debug!(%root, "document deleted");
				return None;
			}
			Err(error) => {
				warn!(%root, %error, "existence check failed");
				return None;
			}
		}

		let layout = &*self.host.layout;
		let Some(group) = layout.active_group().or_else(|| layout.central_group()) else {
			debug!("no tab group to reopen the document in");
			return None;
		};

		let lookup = match backend.get_block_info(&entry.target).await {
			// The document outlived the block; open it at its top and let the
			// later stages drop the entry.
			Err(BackendError::NotFound(_)) if entry.target != *root => {
				debug!(%root, "target deleted, reopening the document at its top");
				backend.get_block_info(root).await
			}
			lookup => lookup,
		};
		let info = match lookup {
			Ok(info) => info,
			Err(BackendError::Locked { root }) => {
				self.host.notifier.notify(Notice::DocumentLocked { root });
				return None;
			}
			Err(error @ (BackendError::NotFound(_) | BackendError::Status { .. })) => {
				self.host.notifier.notify(Notice::DocumentUnavailable {
					root: root.clone(),
					reason: error.to_string(),
				});
				return None;
			}
			Err(error) => {
				warn!(%root, %error, "block info lookup failed");
				return None;
			}
		};

		let tab = TabSpec {
			root: info.root_id.clone(),
			focus: info.root_child_id,
			title: info.root_title,
			icon: info.root_icon,
		};
		let Some(view) = layout.open_editor(group, tab) else {
			self.host.notifier.notify(Notice::DocumentUnavailable {
				root: info.root_id,
				reason: "the tab could not be created".into(),
			});
			return None;
		};
		debug!(%view, %group, "document reopened");

		tokio::time::sleep(self.config.settle_delay()).await;

		let handle = ViewHandle::new(view, info.root_id);
		let surface = &*self.host.surface;
		let rebound = self
			.state
			.with_mut(|s| s.stacks.rebind(&handle, |v| !surface.is_attached(v)));
		debug!(rebound, "stale entries rebound to the new view");
		Some(handle)
	}

	/// Focuses the target after new content was spliced in. Scrolling waits for
	/// the content to lay out.
	async fn land_after_load(&self, view: ViewId, entry: &HistoryEntry) -> bool {
		let Some(node) = self.canonical_node(view, &entry.target) else {
			return false;
		};
		self.focus_block(view, node, entry.offsets);
		tokio::time::sleep(self.config.block_load_delay()).await;
		self.host.surface.scroll_center(view, node);
		true
	}

	fn focus_title(&self, view: ViewId, offsets: Offsets) -> bool {
		let surface = &*self.host.surface;
		let Some(title) = surface.title_node(view) else {
			return false;
		};
		if !surface.is_foreground(view) {
			surface.activate(view);
		}
		surface.place_caret(view, title, offsets);
		true
	}

	fn focus_block(&self, view: ViewId, node: NodeId, offsets: Offsets) {
		let surface = &*self.host.surface;
		if !surface.is_foreground(view) {
			surface.activate(view);
		}
		surface.place_caret(view, node, offsets);
	}

	/// First rendered node of `block` that is not inside an embed.
	fn canonical_node(&self, view: ViewId, block: &BlockId) -> Option<NodeId> {
		self.host
			.surface
			.nodes_for_block(view, block)
			.into_iter()
			.find(|&node| !self.inside_embed(view, node))
	}

	fn inside_embed(&self, view: ViewId, node: NodeId) -> bool {
		let surface = &*self.host.surface;
		let mut cursor = surface.node(view, node).and_then(|n| n.parent);
		while let Some(id) = cursor {
			let Some(info) = surface.node(view, id) else {
				return false;
			};
			if info.kind == NodeKind::Embed {
				return true;
			}
			cursor = info.parent;
		}
		false
	}
}
