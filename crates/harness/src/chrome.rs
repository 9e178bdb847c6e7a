//! Toolbar and notification sinks that remember what they were told.

use std::sync::atomic::{AtomicBool, Ordering};

use backtrail_history::host::{Notice, Notifier, Toolbar};
use parking_lot::Mutex;

/// Back/forward buttons, both disabled initially.
#[derive(Debug, Default)]
pub struct RecordingToolbar {
	back: AtomicBool,
	forward: AtomicBool,
}

impl RecordingToolbar {
	pub fn back_enabled(&self) -> bool {
		self.back.load(Ordering::Acquire)
	}

	pub fn forward_enabled(&self) -> bool {
		self.forward.load(Ordering::Acquire)
	}
}

impl Toolbar for RecordingToolbar {
	fn set_back_enabled(&self, enabled: bool) {
		self.back.store(enabled, Ordering::Release);
	}

	fn set_forward_enabled(&self, enabled: bool) {
		self.forward.store(enabled, Ordering::Release);
	}
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
	notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
	pub fn notices(&self) -> Vec<Notice> {
		self.notices.lock().clone()
	}
}

impl Notifier for RecordingNotifier {
	fn notify(&self, notice: Notice) {
		tracing::info!(%notice, "user notice");
		self.notices.lock().push(notice);
	}
}
