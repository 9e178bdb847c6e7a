//! Shared fixtures for navigation history integration tests.

#![allow(dead_code)]

use backtrail_harness::{BlockSpec, DocumentSpec, Workspace};
use backtrail_history::{HistoryConfig, HistoryEntry, NavigationHistory, Offsets};

/// Blocks per window in every fixture.
pub const PAGE: usize = 10;

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn config() -> HistoryConfig {
	HistoryConfig {
		page_size: PAGE,
		..HistoryConfig::default()
	}
}

/// Document `root` with paragraphs `{root}-p0` .. `{root}-p{count-1}`.
pub fn doc(root: &str, count: usize) -> DocumentSpec {
	DocumentSpec::new(root, &format!("Document {root}")).paragraphs(&format!("{root}-p"), count)
}

/// Two small documents, `d1` and `d2`, and a history over them.
pub fn setup() -> (Workspace, NavigationHistory) {
	setup_with(vec![doc("d1", 6), doc("d2", 6)])
}

pub fn setup_with(docs: Vec<DocumentSpec>) -> (Workspace, NavigationHistory) {
	init_tracing();
	let ws = Workspace::new(docs, PAGE);
	let history = ws.history(config());
	(ws, history)
}

pub fn at(start: usize, end: usize) -> Offsets {
	Offsets::new(start, end).expect("ordered offsets")
}

pub fn targets(entries: &[HistoryEntry]) -> Vec<String> {
	entries.iter().map(|e| e.target.to_string()).collect()
}

pub fn para(text: &str) -> BlockSpec {
	BlockSpec::new(text, "some paragraph text")
}
