//! Document store backing the in-memory backend and tab layout.

use std::collections::BTreeMap;

use backtrail_history::BackendError;
use backtrail_history::host::{BlockInfo, ContentWindow, LoadMode, WindowBlock};
use backtrail_primitives::BlockId;
use parking_lot::RwLock;
use serde::Deserialize;

/// A block and its children, as written in fixtures and scenario files.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockSpec {
	pub id: BlockId,
	#[serde(default)]
	pub text: String,
	#[serde(default)]
	pub children: Vec<BlockSpec>,
	/// Blocks transcluded inside this one.
	#[serde(default)]
	pub embeds: Vec<BlockId>,
}

impl BlockSpec {
	pub fn new(id: &str, text: &str) -> Self {
		Self {
			id: id.into(),
			text: text.into(),
			children: Vec::new(),
			embeds: Vec::new(),
		}
	}

	pub fn child(mut self, child: BlockSpec) -> Self {
		self.children.push(child);
		self
	}

	pub fn embed(mut self, id: &str) -> Self {
		self.embeds.push(id.into());
		self
	}
}

/// A document: a root id doubling as the title, and its block tree.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSpec {
	pub root: BlockId,
	pub title: String,
	#[serde(default)]
	pub icon: Option<String>,
	#[serde(default)]
	pub blocks: Vec<BlockSpec>,
}

impl DocumentSpec {
	pub fn new(root: &str, title: &str) -> Self {
		Self {
			root: root.into(),
			title: title.into(),
			icon: None,
			blocks: Vec::new(),
		}
	}

	pub fn block(mut self, block: BlockSpec) -> Self {
		self.blocks.push(block);
		self
	}

	/// Appends `count` plain paragraphs named `{prefix}{n}`.
	pub fn paragraphs(mut self, prefix: &str, count: usize) -> Self {
		for n in 0..count {
			let id = format!("{prefix}{n}");
			self.blocks.push(BlockSpec::new(&id, &format!("paragraph {n}")));
		}
		self
	}
}

#[derive(Debug, Clone)]
struct StoredBlock {
	id: BlockId,
	parent: Option<BlockId>,
	text_len: usize,
	embeds: Vec<BlockId>,
}

impl StoredBlock {
	fn to_window(&self) -> WindowBlock {
		WindowBlock {
			id: self.id.clone(),
			parent: self.parent.clone(),
			text_len: self.text_len,
			embeds: self.embeds.clone(),
		}
	}
}

#[derive(Debug, Clone)]
struct Document {
	title: String,
	icon: Option<String>,
	/// Pre-order, so every subtree is a contiguous run.
	blocks: Vec<StoredBlock>,
	locked: bool,
}

impl Document {
	fn position(&self, id: &BlockId) -> Option<usize> {
		self.blocks.iter().position(|b| &b.id == id)
	}

	/// End (exclusive) of the subtree starting at `start`.
	fn subtree_end(&self, start: usize) -> usize {
		let mut inside = vec![self.blocks[start].id.clone()];
		let mut end = start + 1;
		while end < self.blocks.len() {
			match &self.blocks[end].parent {
				Some(parent) if inside.contains(parent) => {
					inside.push(self.blocks[end].id.clone());
					end += 1;
				}
				_ => break,
			}
		}
		end
	}

	fn top_level_ancestor(&self, id: &BlockId) -> Option<BlockId> {
		let mut current = self.blocks.iter().find(|b| &b.id == id)?;
		while let Some(parent) = &current.parent {
			current = self.blocks.iter().find(|b| &b.id == parent)?;
		}
		Some(current.id.clone())
	}
}

fn flatten(blocks: &[BlockSpec], parent: Option<&BlockId>, out: &mut Vec<StoredBlock>) {
	for block in blocks {
		out.push(StoredBlock {
			id: block.id.clone(),
			parent: parent.cloned(),
			text_len: block.text.chars().count(),
			embeds: block.embeds.clone(),
		});
		flatten(&block.children, Some(&block.id), out);
	}
}

/// All documents of the simulated workspace.
#[derive(Debug, Default)]
pub struct DocumentStore {
	docs: RwLock<BTreeMap<BlockId, Document>>,
}

impl DocumentStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a document.
	pub fn insert(&self, spec: DocumentSpec) {
		let mut blocks = Vec::new();
		flatten(&spec.blocks, None, &mut blocks);
		self.docs.write().insert(
			spec.root,
			Document {
				title: spec.title,
				icon: spec.icon,
				blocks,
				locked: false,
			},
		);
	}

	/// Deletes a block with its descendants, or a whole document when `id` is
	/// a root. Returns false if nothing matched.
	pub fn delete(&self, id: &BlockId) -> bool {
		let mut docs = self.docs.write();
		if docs.remove(id).is_some() {
			return true;
		}
		for doc in docs.values_mut() {
			if let Some(start) = doc.position(id) {
				let end = doc.subtree_end(start);
				doc.blocks.drain(start..end);
				return true;
			}
		}
		false
	}

	pub fn set_locked(&self, root: &BlockId, locked: bool) {
		if let Some(doc) = self.docs.write().get_mut(root) {
			doc.locked = locked;
		}
	}

	/// Root id of the document holding `id` (itself for a root).
	pub fn root_of(&self, id: &BlockId) -> Option<BlockId> {
		let docs = self.docs.read();
		if docs.contains_key(id) {
			return Some(id.clone());
		}
		docs.iter()
			.find(|(_, doc)| doc.position(id).is_some())
			.map(|(root, _)| root.clone())
	}

	pub fn contains(&self, id: &BlockId) -> bool {
		self.root_of(id).is_some()
	}

	pub fn block_info(&self, id: &BlockId) -> Result<BlockInfo, BackendError> {
		let root = self.root_of(id).ok_or_else(|| BackendError::NotFound(id.clone()))?;
		let docs = self.docs.read();
		let doc = &docs[&root];
		if doc.locked {
			return Err(BackendError::Locked { root });
		}
		let root_child_id = if id == &root {
			doc.blocks.first().map_or_else(|| root.clone(), |b| b.id.clone())
		} else {
			doc.top_level_ancestor(id).unwrap_or_else(|| id.clone())
		};
		Ok(BlockInfo {
			root_id: root,
			root_title: doc.title.clone(),
			root_icon: doc.icon.clone(),
			root_child_id,
		})
	}

	/// Content window of at most `size` blocks around `id`.
	pub fn window(&self, id: &BlockId, mode: LoadMode, size: usize) -> Result<ContentWindow, BackendError> {
		let root = self.root_of(id).ok_or_else(|| BackendError::NotFound(id.clone()))?;
		let docs = self.docs.read();
		let doc = &docs[&root];
		let size = size.max(1);
		let len = doc.blocks.len();

		let (range, scope) = match (mode, doc.position(id)) {
			(_, None) => (0..len.min(size), None),
			(LoadMode::Centered, Some(idx)) => {
				let start = idx.saturating_sub(size / 2);
				let end = (start + size).min(len);
				(end.saturating_sub(size)..end, None)
			}
			(LoadMode::Scope, Some(idx)) => {
				let end = doc.subtree_end(idx).min(idx + size);
				(idx..end, Some(id.clone()))
			}
		};

		Ok(ContentWindow {
			root,
			scope,
			blocks: doc.blocks[range].iter().map(StoredBlock::to_window).collect(),
		})
	}
}
