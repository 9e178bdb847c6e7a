//! Scenario files and their replay.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use backtrail_harness::{DocumentSpec, Workspace};
use backtrail_history::{HistoryConfig, HistoryEntry, Navigation, NavigationHistory, Recorded};
use backtrail_primitives::{BlockId, Offsets, ViewId};
use serde::Deserialize;
use tracing::debug;

/// A replayable navigation session.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
	#[serde(default)]
	pub history: HistoryConfig,
	#[serde(default)]
	pub documents: Vec<DocumentSpec>,
	#[serde(default)]
	pub steps: Vec<Step>,
}

impl Scenario {
	pub fn from_toml_str(src: &str) -> anyhow::Result<Self> {
		let scenario: Self = toml::from_str(src)?;
		scenario.history.validate()?;
		Ok(scenario)
	}

	pub fn load(path: &Path) -> anyhow::Result<Self> {
		let src = std::fs::read_to_string(path).with_context(|| format!("reading scenario {}", path.display()))?;
		Self::from_toml_str(&src).with_context(|| format!("parsing scenario {}", path.display()))
	}
}

/// One user move. Views are referred to by the name given when opening them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
	/// Open a document in a new tab.
	Open { document: BlockId, name: String },
	/// Move the caret of a view and record the position.
	Caret {
		view: String,
		block: BlockId,
		#[serde(default)]
		at: Offsets,
	},
	Back,
	Forward,
	/// Close a tab; its entries stay in the history.
	Close { view: String },
	/// Delete a block, or a whole document when given a root id.
	Delete { block: BlockId },
	/// Lock a document against opening.
	Lock { document: BlockId },
	/// Delay every backend answer.
	Latency { ms: u64 },
}

impl fmt::Display for Step {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let text = match self {
			Self::Open { document, name } => format!("open {document} as {name}"),
			Self::Caret { view, block, at } => format!("caret {view}:{block}{at}"),
			Self::Back => "back".into(),
			Self::Forward => "forward".into(),
			Self::Close { view } => format!("close {view}"),
			Self::Delete { block } => format!("delete {block}"),
			Self::Lock { document } => format!("lock {document}"),
			Self::Latency { ms } => format!("latency {ms}ms"),
		};
		// Pad through the formatter so width specifiers apply.
		f.pad(&text)
	}
}

/// Replays steps against an in-memory [`Workspace`].
pub struct Runner {
	workspace: Workspace,
	history: NavigationHistory,
	views: HashMap<String, ViewId>,
}

impl Runner {
	pub fn new(scenario: &Scenario) -> Self {
		let workspace = Workspace::new(scenario.documents.iter().cloned(), scenario.history.page_size);
		let history = workspace.history(scenario.history.clone());
		Self {
			workspace,
			history,
			views: HashMap::new(),
		}
	}

	pub fn history(&self) -> &NavigationHistory {
		&self.history
	}

	fn view(&self, name: &str) -> anyhow::Result<ViewId> {
		match self.views.get(name) {
			Some(view) => Ok(*view),
			None => bail!("no view named {name:?}"),
		}
	}

	/// Applies `step` and describes what happened.
	pub async fn apply(&mut self, step: &Step) -> anyhow::Result<String> {
		debug!(%step, "applying step");
		let ws = &self.workspace;
		let seen = ws.notifier.notices().len();
		let outcome = match step {
			Step::Open { document, name } => {
				let Some(view) = ws.open(document.as_str()) else {
					bail!("document {document} does not exist");
				};
				self.views.insert(name.clone(), view);
				format!("opened {view}")
			}
			Step::Caret { view, block, at } => {
				let view = self.view(view)?;
				match ws.caret(&self.history, view, block.as_str(), *at) {
					Recorded::Skipped => "not recorded".into(),
					Recorded::Coalesced {
						forward_cleared,
						evicted,
					} => summarize("coalesced", forward_cleared, evicted),
					Recorded::Pushed {
						forward_cleared,
						evicted,
					} => summarize("recorded", forward_cleared, evicted),
				}
			}
			Step::Back => describe(self.history.go_back().await),
			Step::Forward => describe(self.history.go_forward().await),
			Step::Close { view } => {
				ws.close(self.view(view)?);
				"closed".into()
			}
			Step::Delete { block } => {
				if !ws.delete(block.as_str()) {
					bail!("block {block} does not exist");
				}
				"deleted".into()
			}
			Step::Lock { document } => {
				ws.store.set_locked(document, true);
				"locked".into()
			}
			Step::Latency { ms } => {
				ws.backend.set_latency(Duration::from_millis(*ms));
				"latency set".into()
			}
		};

		let notices = ws.notifier.notices();
		Ok(match notices.get(seen..) {
			Some(fresh) if !fresh.is_empty() => {
				let fresh: Vec<String> = fresh.iter().map(ToString::to_string).collect();
				format!("{outcome} ({})", fresh.join("; "))
			}
			_ => outcome,
		})
	}

	/// One-line summary of both stacks and the focus.
	pub fn report(&self) -> String {
		let focus = match self.workspace.surface.focus() {
			Some(focus) => match focus.block {
				Some(block) => format!("{block}{}@{}", focus.offsets, focus.view),
				None => format!("title{}@{}", focus.offsets, focus.view),
			},
			None => "-".into(),
		};
		format!(
			"back [{}] forward [{}] focus {focus}",
			list(&self.history.back_entries()),
			list(&self.history.forward_entries()),
		)
	}
}

fn summarize(action: &str, forward_cleared: usize, evicted: bool) -> String {
	let mut text = String::from(action);
	if forward_cleared > 0 {
		text.push_str(&format!(", dropped {forward_cleared} forward"));
	}
	if evicted {
		text.push_str(", evicted oldest");
	}
	text
}

fn describe(navigation: Navigation) -> String {
	match navigation {
		Navigation::Moved { target, skipped: 0 } => format!("moved to {target}"),
		Navigation::Moved { target, skipped } => format!("moved to {target}, skipped {skipped}"),
		Navigation::Refocused { target } => format!("refocused {target}"),
		Navigation::Exhausted { skipped } => format!("exhausted, dropped {skipped}"),
		Navigation::Unchanged => "nothing to do".into(),
		Navigation::Busy => "busy".into(),
	}
}

fn list(entries: &[HistoryEntry]) -> String {
	entries.iter().map(|e| e.target.as_str()).collect::<Vec<_>>().join(" ")
}
