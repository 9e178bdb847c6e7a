//! Recording the position focus is leaving.

use backtrail_primitives::{NodeId, ViewId};
use tracing::trace;

use crate::entry::{HistoryEntry, ViewHandle};
use crate::host::{NodeKind, TextRange};
use crate::navigator::NavigationHistory;
use crate::stack::Side;

/// What [`NavigationHistory::record`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
	/// Nothing addressable under the selection, or the view is not hosted.
	Skipped,
	/// The top back entry points at the same target and took the new offsets.
	///
	/// After a back step that top can be the branching point moved over from
	/// the forward stack, in which case forward was dropped first.
	Coalesced { forward_cleared: usize, evicted: bool },
	/// A new entry was pushed.
	Pushed {
		/// Forward entries dropped because a new path was taken.
		forward_cleared: usize,
		/// Whether the oldest back entry was evicted.
		evicted: bool,
	},
}

impl Recorded {
	/// Forward entries dropped by this record.
	pub fn forward_cleared(&self) -> usize {
		match *self {
			Recorded::Skipped => 0,
			Recorded::Coalesced { forward_cleared, .. } | Recorded::Pushed { forward_cleared, .. } => forward_cleared,
		}
	}
}

impl NavigationHistory {
	/// Records the position of `view`'s selection, or of `range` if given.
	///
	/// Best effort: a selection outside any block, or inside a block without
	/// editable content, records nothing.
	pub fn record(&self, view: ViewId, range: Option<TextRange>) -> Recorded {
		let surface = &*self.host.surface;
		let Some(info) = surface.view_info(view) else {
			return Recorded::Skipped;
		};
		if !info.hosted {
			return Recorded::Skipped;
		}
		let Some(range) = range.or_else(|| surface.selection(view)) else {
			return Recorded::Skipped;
		};
		let Some((node, kind)) = self.enclosing_block(view, range.anchor) else {
			return Recorded::Skipped;
		};
		if !surface.node(view, node).is_some_and(|n| n.editable) {
			return Recorded::Skipped;
		}

		let target = match kind {
			NodeKind::Block(id) => id,
			_ => info.root.clone(),
		};
		let offsets = surface.selection_offsets(view, node, &range);
		let entry = HistoryEntry::new(target, info.scope, offsets, ViewHandle::new(view, info.root));
		self.record_entry(entry)
	}

	/// Records an already resolved position.
	pub fn record_entry(&self, entry: HistoryEntry) -> Recorded {
		let outcome = self.state.with_mut(|s| {
			if let Some(top) = s.stacks.peek_top_mut(Side::Back)
				&& top.coalesces_with(&entry)
			{
				top.offsets = entry.offsets;
				return Recorded::Coalesced {
					forward_cleared: 0,
					evicted: false,
				};
			}

			let mut forward_cleared = 0;
			let mut evicted = false;
			if !s.stacks.is_empty(Side::Forward) {
				// After a back step the forward top is the current position;
				// keep it as the branching point.
				if s.last_step == Side::Back
					&& let Some(current) = s.stacks.pop(Side::Forward)
				{
					evicted = s.stacks.push(Side::Back, current).is_some();
				}
				forward_cleared = s.stacks.clear_forward();
				s.last_step = Side::Forward;
				if let Some(top) = s.stacks.peek_top_mut(Side::Back)
					&& top.coalesces_with(&entry)
				{
					top.offsets = entry.offsets;
					return Recorded::Coalesced { forward_cleared, evicted };
				}
			}

			trace!(target = %entry.target, offsets = %entry.offsets, "recording position");
			evicted |= s.stacks.push(Side::Back, entry).is_some();
			s.last_step = Side::Forward;
			Recorded::Pushed { forward_cleared, evicted }
		});

		let back_len = self.state.with(|s| s.stacks.len(Side::Back));
		if outcome.forward_cleared() > 0 {
			self.host.toolbar.set_forward_enabled(false);
		}
		if back_len > 1 {
			self.host.toolbar.set_back_enabled(true);
		}
		outcome
	}

	/// Nearest block-level node at or above `node`: a block or the title.
	fn enclosing_block(&self, view: ViewId, node: NodeId) -> Option<(NodeId, NodeKind)> {
		let surface = &*self.host.surface;
		let mut cursor = Some(node);
		while let Some(id) = cursor {
			let info = surface.node(view, id)?;
			match info.kind {
				NodeKind::Block(_) | NodeKind::Title => return Some((id, info.kind)),
				NodeKind::Embed | NodeKind::Inline => cursor = info.parent,
			}
		}
		None
	}
}
