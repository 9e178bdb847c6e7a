use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Stable identifier of a block or document root in the backend store.
///
/// Document roots share the id space with blocks: the root id of a document
/// is also the id of its title.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Arc<str>);

impl BlockId {
	/// Creates a block id from any string-like value.
	pub fn new(id: impl Into<Arc<str>>) -> Self {
		Self(id.into())
	}

	/// Returns the id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for BlockId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "BlockId({})", self.0)
	}
}

impl fmt::Display for BlockId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for BlockId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for BlockId {
	fn from(id: String) -> Self {
		Self::new(id)
	}
}

/// Identifier of a live editor view.
///
/// A view id outlives the view it names; whether the view is still attached
/// must be asked of the editor surface on every use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

/// Identifier of a rendered node inside an editor view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Identifier of a tab group (window) in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u64);

impl fmt::Display for ViewId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "view#{}", self.0)
	}
}

impl fmt::Display for GroupId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "group#{}", self.0)
	}
}
