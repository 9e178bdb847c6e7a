//! Back/forward stepping over the two stacks.
//!
//! A step pops candidates off one stack and hands each to the
//! [`Reconciler`]. The first candidate that resolves is pushed onto the other
//! stack; candidates that fail are dropped for good. Attempts run strictly one
//! after another because a reconstruction rebinds stale views across both
//! stacks, and the next attempt must see that.

use backtrail_primitives::BlockId;
use tracing::{debug, trace};

use crate::config::HistoryConfig;
use crate::entry::HistoryEntry;
use crate::host::Host;
use crate::reconciler::Reconciler;
use crate::stack::Side;
use crate::state::{InFlight, SharedState};

/// Result of a [`NavigationHistory::go_back`] or
/// [`NavigationHistory::go_forward`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
	/// Focus moved to `target` after dropping `skipped` unusable entries.
	Moved { target: BlockId, skipped: usize },
	/// Nothing to pop; the position on the other stack was focused again.
	Refocused { target: BlockId },
	/// Every candidate failed to resolve and was dropped.
	Exhausted { skipped: usize },
	/// Nothing to navigate to.
	Unchanged,
	/// Another step was still in flight; this call did nothing.
	Busy,
}

/// Back/forward history of one workspace session.
///
/// Owns both stacks and the direction flag. Cheap to share by reference;
/// every method takes `&self` and no internal lock is held across an await,
/// so an overlapping call observes whatever stack state exists when it runs.
pub struct NavigationHistory {
	pub(crate) state: SharedState,
	pub(crate) host: Host,
	reconciler: Reconciler,
}

impl NavigationHistory {
	/// Creates an empty history.
	pub fn new(host: Host, config: HistoryConfig) -> Self {
		let state = SharedState::new(config.capacity);
		let reconciler = Reconciler::new(host.clone(), config, state.clone());
		Self { state, host, reconciler }
	}

	pub fn config(&self) -> &HistoryConfig {
		self.reconciler.config()
	}

	pub fn reconciler(&self) -> &Reconciler {
		&self.reconciler
	}

	/// Steps back to the most recent resolvable older position.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn go_back(&self) -> Navigation {
		self.step(Side::Back).await
	}

	/// Steps forward to the most recent resolvable newer position.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn go_forward(&self) -> Navigation {
		self.step(Side::Forward).await
	}

	async fn step(&self, from: Side) -> Navigation {
		let Some(_flight) = InFlight::acquire(&self.state) else {
			debug!(?from, "navigation already in flight");
			return Navigation::Busy;
		};
		let to = from.opposite();

		let (from_empty, to_top) = self
			.state
			.with(|s| (s.stacks.is_empty(from), s.stacks.peek_top(to).cloned()));
		if from_empty {
			let Some(mut current) = to_top else {
				return Navigation::Unchanged;
			};
			return if self.reconciler.resolve(&mut current).await {
				Navigation::Refocused { target: current.target }
			} else {
				Navigation::Unchanged
			};
		}
		self.host.toolbar.set_enabled(to, true);

		// The top of `from` is where the user is now unless the previous step
		// already went this way. It becomes reachable from the other stack.
		let surface = &self.host.surface;
		self.state.with_mut(|s| {
			if s.last_step == from {
				return;
			}
			let live = s.stacks.peek_top(from).is_some_and(|top| surface.is_attached(top.view.view));
			if live && s.stacks.transfer_top(from) {
				trace!(?from, "current position parked on the opposite stack");
			}
		});

		let mut skipped = 0;
		let landed = loop {
			let Some(mut entry) = self.state.with_mut(|s| s.stacks.pop(from)) else {
				break None;
			};
			if self.reconciler.resolve(&mut entry).await {
				let target = entry.target.clone();
				self.state.with_mut(|s| s.stacks.push(to, entry));
				break Some(target);
			}
			skipped += 1;
			debug!(target = %entry.target, "dropping unresolvable history entry");
		};

		let (from_empty, to_empty) = self.state.with_mut(|s| {
			s.last_step = from;
			(s.stacks.is_empty(from), s.stacks.is_empty(to))
		});
		self.host.toolbar.set_enabled(from, !from_empty);
		self.host.toolbar.set_enabled(to, !to_empty);

		match landed {
			Some(target) => Navigation::Moved { target, skipped },
			None => Navigation::Exhausted { skipped },
		}
	}

	/// Back stack entries, oldest first.
	pub fn back_entries(&self) -> Vec<HistoryEntry> {
		self.entries(Side::Back)
	}

	/// Forward stack entries, oldest first.
	pub fn forward_entries(&self) -> Vec<HistoryEntry> {
		self.entries(Side::Forward)
	}

	fn entries(&self, side: Side) -> Vec<HistoryEntry> {
		self.state.with(|s| s.stacks.entries(side).cloned().collect())
	}

	/// The entry standing for the current position: the top of the stack the
	/// last step pushed onto.
	pub fn current(&self) -> Option<HistoryEntry> {
		self.state.with(|s| {
			let side = s.last_step.opposite();
			s.stacks
				.peek_top(side)
				.or_else(|| s.stacks.peek_top(side.opposite()))
				.cloned()
		})
	}

	pub fn can_go_back(&self) -> bool {
		self.state.with(|s| !s.stacks.is_empty(Side::Back))
	}

	pub fn can_go_forward(&self) -> bool {
		self.state.with(|s| !s.stacks.is_empty(Side::Forward))
	}

	/// Direction of the most recent step.
	pub fn last_step(&self) -> Side {
		self.state.with(|s| s.last_step)
	}

	/// Returns true while a back/forward step is in flight.
	pub fn is_navigating(&self) -> bool {
		self.state.with(|s| s.in_flight)
	}
}
