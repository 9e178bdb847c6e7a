//! Bounded back/forward stacks.
//!
//! [`DualStack`] is plain data: no I/O and no async. Both stacks are ordered
//! oldest first and pushed/popped at the tail. A push beyond the capacity
//! evicts the head of the same stack.


use std::collections::VecDeque;

use backtrail_primitives::ViewId;

use crate::entry::{HistoryEntry, ViewHandle};

/// Selects one of the two stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
	Back,
	Forward,
}

impl Side {
	/// The other stack.
	pub const fn opposite(self) -> Self {
		match self {
			Side::Back => Side::Forward,
			Side::Forward => Side::Back,
		}
	}
}

/// The back and forward stacks of a navigation history.
#[derive(Debug, Clone)]
pub struct DualStack {
	back: VecDeque<HistoryEntry>,
	forward: VecDeque<HistoryEntry>,
	capacity: usize,
}

impl DualStack {
	/// Creates empty stacks holding at most `capacity` entries each.
	///
	/// A zero capacity is raised to one.
	pub fn new(capacity: usize) -> Self {
		Self {
			back: VecDeque::new(),
			forward: VecDeque::new(),
			capacity: capacity.max(1),
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	fn side(&self, side: Side) -> &VecDeque<HistoryEntry> {
		match side {
			Side::Back => &self.back,
			Side::Forward => &self.forward,
		}
	}

	fn side_mut(&mut self, side: Side) -> &mut VecDeque<HistoryEntry> {
		match side {
			Side::Back => &mut self.back,
			Side::Forward => &mut self.forward,
		}
	}

	/// Pushes onto `side`, returning the entry evicted to honor the bound.
	pub fn push(&mut self, side: Side, entry: HistoryEntry) -> Option<HistoryEntry> {
		let capacity = self.capacity;
		let stack = self.side_mut(side);
		stack.push_back(entry);
		if stack.len() > capacity { stack.pop_front() } else { None }
	}

	/// Pops the most recent entry of `side`.
	pub fn pop(&mut self, side: Side) -> Option<HistoryEntry> {
		self.side_mut(side).pop_back()
	}

	/// Most recent entry of `side`.
	pub fn peek_top(&self, side: Side) -> Option<&HistoryEntry> {
		self.side(side).back()
	}

	pub fn peek_top_mut(&mut self, side: Side) -> Option<&mut HistoryEntry> {
		self.side_mut(side).back_mut()
	}

	pub fn push_back(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
		self.push(Side::Back, entry)
	}

	pub fn push_forward(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
		self.push(Side::Forward, entry)
	}

	pub fn pop_back(&mut self) -> Option<HistoryEntry> {
		self.pop(Side::Back)
	}

	pub fn pop_forward(&mut self) -> Option<HistoryEntry> {
		self.pop(Side::Forward)
	}

	/// Drops every forward entry, returning how many were dropped.
	pub fn clear_forward(&mut self) -> usize {
		let dropped = self.forward.len();
		self.forward.clear();
		dropped
	}

	/// Moves the top of `from` onto the other stack.
	pub fn transfer_top(&mut self, from: Side) -> bool {
		match self.pop(from) {
			Some(entry) => {
				self.push(from.opposite(), entry);
				true
			}
			None => false,
		}
	}

	pub fn len(&self, side: Side) -> usize {
		self.side(side).len()
	}

	pub fn is_empty(&self, side: Side) -> bool {
		self.side(side).is_empty()
	}

	/// Entries of `side`, oldest first.
	pub fn entries(&self, side: Side) -> impl ExactSizeIterator<Item = &HistoryEntry> + '_ {
		self.side(side).iter()
	}

	/// Points every entry of document `handle.root` whose view is stale at
	/// `handle.view`, in both stacks. Returns the number of entries rebound.
	pub fn rebind(&mut self, handle: &ViewHandle, mut is_stale: impl FnMut(ViewId) -> bool) -> usize {
		let mut rebound = 0;
		for entry in self.back.iter_mut().chain(self.forward.iter_mut()) {
			if entry.view.root == handle.root && entry.view.view != handle.view && is_stale(entry.view.view) {
				entry.view.view = handle.view;
				rebound += 1;
			}
		}
		rebound
	}
}
