use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected offset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("selection start {start} is past its end {end}")]
pub struct OffsetsError {
	/// Requested start offset.
	pub start: usize,
	/// Requested end offset.
	pub end: usize,
}

/// Character offsets of a caret or selection within a block's editable
/// content.
///
/// Always satisfies `start <= end`. A caret is an empty selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct Offsets {
	start: usize,
	end: usize,
}

impl Offsets {
	/// Creates a selection, rejecting `start > end`.
	pub const fn new(start: usize, end: usize) -> Result<Self, OffsetsError> {
		if start > end {
			return Err(OffsetsError { start, end });
		}
		Ok(Self { start, end })
	}

	/// Creates a collapsed caret at `pos`.
	pub const fn caret(pos: usize) -> Self {
		Self { start: pos, end: pos }
	}

	/// Creates a selection between two positions in either order.
	pub fn spanning(a: usize, b: usize) -> Self {
		Self {
			start: a.min(b),
			end: a.max(b),
		}
	}

	/// Start offset (inclusive).
	#[inline]
	pub const fn start(&self) -> usize {
		self.start
	}

	/// End offset (exclusive).
	#[inline]
	pub const fn end(&self) -> usize {
		self.end
	}

	/// Returns true for a collapsed caret.
	#[inline]
	pub const fn is_caret(&self) -> bool {
		self.start == self.end
	}

	/// Clamps both ends to `len`, for content that shrank since recording.
	pub fn clamp_to(self, len: usize) -> Self {
		Self {
			start: self.start.min(len),
			end: self.end.min(len),
		}
	}
}

impl TryFrom<(usize, usize)> for Offsets {
	type Error = OffsetsError;

	fn try_from((start, end): (usize, usize)) -> Result<Self, Self::Error> {
		Self::new(start, end)
	}
}

impl From<Offsets> for (usize, usize) {
	fn from(offsets: Offsets) -> Self {
		(offsets.start, offsets.end)
	}
}

impl fmt::Display for Offsets {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({},{})", self.start, self.end)
	}
}
