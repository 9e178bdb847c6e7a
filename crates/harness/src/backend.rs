use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backtrail_history::BackendError;
use backtrail_history::host::{Backend, BlockInfo, ContentWindow, LoadMode};
use backtrail_primitives::BlockId;
use parking_lot::Mutex;

use crate::store::DocumentStore;

/// A request received by [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
	CheckBlockExist(BlockId),
	GetBlockInfo(BlockId),
	GetDoc(BlockId, LoadMode, usize),
}

/// [`Backend`] answering from a [`DocumentStore`].
///
/// Each request sleeps for the configured latency before answering, and
/// queued faults are returned in place of the next answers.
#[derive(Debug)]
pub struct MemoryBackend {
	store: Arc<DocumentStore>,
	latency: Mutex<Duration>,
	/// Scripted answers: `None` lets a request through.
	faults: Mutex<VecDeque<Option<BackendError>>>,
	calls: Mutex<Vec<BackendCall>>,
}

impl MemoryBackend {
	pub fn new(store: Arc<DocumentStore>) -> Self {
		Self {
			store,
			latency: Mutex::new(Duration::ZERO),
			faults: Mutex::new(VecDeque::new()),
			calls: Mutex::new(Vec::new()),
		}
	}

	pub fn set_latency(&self, latency: Duration) {
		*self.latency.lock() = latency;
	}

	/// Makes the next request fail with `error`.
	pub fn inject_fault(&self, error: BackendError) {
		self.inject_fault_after(0, error);
	}

	/// Lets `skip` requests through, then fails one with `error`.
	pub fn inject_fault_after(&self, skip: usize, error: BackendError) {
		let mut faults = self.faults.lock();
		faults.extend(std::iter::repeat_n(None, skip));
		faults.push_back(Some(error));
	}

	pub fn calls(&self) -> Vec<BackendCall> {
		self.calls.lock().clone()
	}

	pub fn clear_calls(&self) {
		self.calls.lock().clear();
	}

	async fn begin(&self, call: BackendCall) -> Result<(), BackendError> {
		self.calls.lock().push(call);
		let latency = *self.latency.lock();
		if !latency.is_zero() {
			tokio::time::sleep(latency).await;
		}
		match self.faults.lock().pop_front().flatten() {
			Some(error) => Err(error),
			None => Ok(()),
		}
	}
}

#[async_trait]
impl Backend for MemoryBackend {
	async fn check_block_exist(&self, id: &BlockId) -> Result<bool, BackendError> {
		self.begin(BackendCall::CheckBlockExist(id.clone())).await?;
		Ok(self.store.contains(id))
	}

	async fn get_block_info(&self, id: &BlockId) -> Result<BlockInfo, BackendError> {
		self.begin(BackendCall::GetBlockInfo(id.clone())).await?;
		self.store.block_info(id)
	}

	async fn get_doc(&self, id: &BlockId, mode: LoadMode, size: usize) -> Result<ContentWindow, BackendError> {
		self.begin(BackendCall::GetDoc(id.clone(), mode, size)).await?;
		self.store.window(id, mode, size)
	}
}
