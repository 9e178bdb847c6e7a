use std::sync::Arc;

use parking_lot::Mutex;

use crate::stack::{DualStack, Side};

/// Mutable navigation state shared by the recorder, navigator and reconciler.
#[derive(Debug)]
pub(crate) struct HistoryState {
	pub(crate) stacks: DualStack,
	/// Direction of the most recent step; `Forward` also after a new record.
	pub(crate) last_step: Side,
	/// Set while a back/forward step is being resolved.
	pub(crate) in_flight: bool,
}

/// Handle to the [`HistoryState`].
///
/// Access goes through closures so no guard can live across an await.
#[derive(Debug, Clone)]
pub(crate) struct SharedState(Arc<Mutex<HistoryState>>);

impl SharedState {
	pub(crate) fn new(capacity: usize) -> Self {
		Self(Arc::new(Mutex::new(HistoryState {
			stacks: DualStack::new(capacity),
			last_step: Side::Forward,
			in_flight: false,
		})))
	}

	pub(crate) fn with<R>(&self, f: impl FnOnce(&HistoryState) -> R) -> R {
		let guard = self.0.lock();
		f(&guard)
	}

	pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut HistoryState) -> R) -> R {
		let mut guard = self.0.lock();
		f(&mut guard)
	}
}

/// Marks a navigation step as in flight until dropped.
///
/// Dropping also covers a step whose future was abandoned mid-await.
pub(crate) struct InFlight<'a>(&'a SharedState);

impl<'a> InFlight<'a> {
	pub(crate) fn acquire(state: &'a SharedState) -> Option<Self> {
		let acquired = state.with_mut(|s| !std::mem::replace(&mut s.in_flight, true));
		acquired.then_some(Self(state))
	}
}

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		self.0.with_mut(|s| s.in_flight = false);
	}
}
