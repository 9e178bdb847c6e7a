//! Tunables for history capacity, content paging and settle delays.


use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Maximum number of entries kept on each stack.
pub const DEFAULT_CAPACITY: usize = 64;
/// Blocks per dynamic-load window for whole-document views.
pub const DEFAULT_PAGE_SIZE: usize = 48;
/// Blocks fetched when a view is scoped to a sub-block.
pub const DEFAULT_SCOPE_PAGE_SIZE: usize = 102_400;

/// Navigation history configuration.
///
/// Every field has a default, so an empty TOML table is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
	/// Bound on each stack; the oldest entry is evicted beyond it.
	pub capacity: usize,
	/// Wait after reconstructing a tab before its view is addressed.
	pub settle_delay_ms: u64,
	/// Wait after splicing fetched content before scrolling to the target.
	pub block_load_delay_ms: u64,
	/// Blocks requested per window for whole-document views.
	pub page_size: usize,
	/// Blocks requested when loading a zoomed sub-tree.
	pub scope_page_size: usize,
}

impl Default for HistoryConfig {
	fn default() -> Self {
		Self {
			capacity: DEFAULT_CAPACITY,
			settle_delay_ms: 500,
			block_load_delay_ms: 300,
			page_size: DEFAULT_PAGE_SIZE,
			scope_page_size: DEFAULT_SCOPE_PAGE_SIZE,
		}
	}
}

impl HistoryConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(src)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates a TOML file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let src = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&src)
	}

	/// Rejects values the history cannot operate with.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.capacity == 0 {
			return Err(ConfigError::Invalid {
				field: "capacity",
				reason: "must be at least 1",
			});
		}
		if self.page_size == 0 {
			return Err(ConfigError::Invalid {
				field: "page_size",
				reason: "must be at least 1",
			});
		}
		if self.scope_page_size < self.page_size {
			return Err(ConfigError::Invalid {
				field: "scope_page_size",
				reason: "must not be smaller than page_size",
			});
		}
		Ok(())
	}

	pub fn settle_delay(&self) -> Duration {
		Duration::from_millis(self.settle_delay_ms)
	}

	pub fn block_load_delay(&self) -> Duration {
		Duration::from_millis(self.block_load_delay_ms)
	}
}
