//! Error types for collaborator calls and configuration loading.

use std::path::PathBuf;

use backtrail_primitives::BlockId;
use thiserror::Error;

/// Failures reported by the backend block store.
///
/// Reconciliation never propagates these; each one is turned into a failed
/// resolution (and, for a few of them, a user notice).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
	/// The requested block or document does not exist.
	#[error("block {0} not found")]
	NotFound(BlockId),

	/// The document holding the block is locked by another writer.
	#[error("document {root} is locked")]
	Locked {
		/// Root id of the locked document.
		root: BlockId,
	},

	/// The backend answered with a non-zero status code.
	#[error("backend returned status {code}: {message}")]
	Status {
		/// Status code reported by the backend.
		code: i32,
		/// Human-readable reason.
		message: String,
	},

	/// The request never produced an answer.
	#[error("backend request failed: {0}")]
	Transport(String),
}

/// Errors that can occur when loading [`HistoryConfig`].
///
/// [`HistoryConfig`]: crate::config::HistoryConfig
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or field types.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A value is outside its accepted range.
	#[error("invalid value for '{field}': {reason}")]
	Invalid {
		/// Name of the offending field.
		field: &'static str,
		/// Why the value was rejected.
		reason: &'static str,
	},
}
