mod common;

use std::time::Duration;

use backtrail_harness::Workspace;
use backtrail_history::{BlockId, Navigation, NavigationHistory, Offsets, Side, ViewId};
use common::*;
use pretty_assertions::assert_eq;

/// Records a caret position in each of `blocks`, in order.
fn visit(ws: &Workspace, history: &NavigationHistory, view: ViewId, blocks: &[&str]) {
	for block in blocks {
		ws.caret(history, view, block, at(0, 0));
	}
}

fn moved(target: &str, skipped: usize) -> Navigation {
	Navigation::Moved {
		target: target.into(),
		skipped,
	}
}

fn focused_block(ws: &Workspace) -> Option<BlockId> {
	ws.surface.focus().and_then(|f| f.block)
}

/// Block and offsets the caret was placed at.
fn focused(ws: &Workspace) -> Option<(BlockId, Offsets)> {
	ws.surface.focus().and_then(|f| Some((f.block?, f.offsets)))
}

#[tokio::test(start_paused = true)]
async fn back_then_forward_returns_to_latest() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1-p0", at(1, 1));
	ws.caret(&history, view, "d1-p1", at(2, 5));
	ws.caret(&history, view, "d1-p2", at(7, 9));

	assert_eq!(history.go_back().await, moved("d1-p1", 0));
	assert_eq!(focused(&ws), Some((BlockId::from("d1-p1"), at(2, 5))));
	assert_eq!(targets(&history.back_entries()), vec!["d1-p0"]);
	assert_eq!(targets(&history.forward_entries()), vec!["d1-p2", "d1-p1"]);

	assert_eq!(history.go_forward().await, moved("d1-p2", 0));
	assert_eq!(focused(&ws), Some((BlockId::from("d1-p2"), at(7, 9))));
	assert_eq!(targets(&history.back_entries()), vec!["d1-p0", "d1-p1", "d1-p2"]);
	assert!(history.forward_entries().is_empty());

	assert_eq!(history.go_back().await, moved("d1-p1", 0));
	assert_eq!(history.go_back().await, moved("d1-p0", 0));
	assert_eq!(focused(&ws), Some((BlockId::from("d1-p0"), at(1, 1))));
}

#[tokio::test(start_paused = true)]
async fn deleted_entries_are_skipped_and_dropped() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	visit(&ws, &history, view, &["d1-p0", "d1-p1", "d1-p2"]);
	assert!(ws.delete("d1-p1"));

	assert_eq!(history.go_back().await, moved("d1-p0", 1));
	assert_eq!(focused_block(&ws), Some("d1-p0".into()));
	assert!(history.back_entries().is_empty());
	assert_eq!(targets(&history.forward_entries()), vec!["d1-p2", "d1-p0"]);
}

#[tokio::test(start_paused = true)]
async fn exhausting_the_back_stack_disables_back() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	visit(&ws, &history, view, &["d1-p0", "d1-p1", "d1-p2"]);
	ws.delete("d1-p0");
	ws.delete("d1-p1");

	assert_eq!(history.go_back().await, Navigation::Exhausted { skipped: 2 });
	assert!(!history.can_go_back());
	assert!(!ws.toolbar.back_enabled());
	assert!(ws.toolbar.forward_enabled());
	assert_eq!(targets(&history.forward_entries()), vec!["d1-p2"]);
}

#[tokio::test(start_paused = true)]
async fn empty_side_refocuses_current_position() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	visit(&ws, &history, view, &["d1-p3"]);

	assert_eq!(history.go_back().await, Navigation::Exhausted { skipped: 0 });
	ws.surface.select(view, &"d1-p5".into(), at(0, 0));

	assert_eq!(
		history.go_back().await,
		Navigation::Refocused {
			target: "d1-p3".into()
		}
	);
	assert_eq!(focused_block(&ws), Some("d1-p3".into()));
	assert_eq!(targets(&history.forward_entries()), vec!["d1-p3"]);
}

#[tokio::test(start_paused = true)]
async fn empty_history_does_nothing() {
	let (ws, history) = setup();

	assert_eq!(history.go_back().await, Navigation::Unchanged);
	assert_eq!(history.go_forward().await, Navigation::Unchanged);
	assert!(ws.surface.focus().is_none());
	assert!(ws.backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn alternating_steps_lose_no_entries() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	visit(&ws, &history, view, &["d1-p0", "d1-p1", "d1-p2", "d1-p3"]);

	assert_eq!(history.go_back().await, moved("d1-p2", 0));
	assert_eq!(history.go_back().await, moved("d1-p1", 0));
	assert_eq!(history.go_forward().await, moved("d1-p2", 0));
	assert_eq!(history.go_back().await, moved("d1-p1", 0));
	assert_eq!(history.go_forward().await, moved("d1-p2", 0));
	assert_eq!(history.go_forward().await, moved("d1-p3", 0));

	assert_eq!(
		targets(&history.back_entries()),
		vec!["d1-p0", "d1-p1", "d1-p2", "d1-p3"]
	);
	assert!(history.forward_entries().is_empty());
	assert_eq!(history.last_step(), Side::Forward);
}

#[tokio::test(start_paused = true)]
async fn toolbar_follows_stack_emptiness() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	visit(&ws, &history, view, &["d1-p0", "d1-p1", "d1-p2"]);

	history.go_back().await;
	assert!(ws.toolbar.back_enabled());
	assert!(ws.toolbar.forward_enabled());

	history.go_back().await;
	assert!(!ws.toolbar.back_enabled());
	assert!(ws.toolbar.forward_enabled());

	history.go_forward().await;
	history.go_forward().await;
	assert!(ws.toolbar.back_enabled());
	assert!(!ws.toolbar.forward_enabled());
}

#[tokio::test(start_paused = true)]
async fn overlapping_step_is_rejected() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	visit(&ws, &history, view, &["d1-p0", "d1-p1"]);
	ws.close(view);
	ws.backend.set_latency(Duration::from_millis(100));

	let (first, second) = tokio::join!(history.go_back(), history.go_back());

	assert_eq!(first, moved("d1-p1", 0));
	assert_eq!(second, Navigation::Busy);
	assert!(!history.is_navigating());
	assert_eq!(targets(&history.back_entries()), vec!["d1-p0"]);
}

#[tokio::test(start_paused = true)]
async fn abandoned_step_releases_the_guard() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	visit(&ws, &history, view, &["d1-p0", "d1-p1"]);
	ws.close(view);
	ws.backend.set_latency(Duration::from_secs(1));

	let abandoned = tokio::time::timeout(Duration::from_millis(10), history.go_back()).await;
	assert!(abandoned.is_err());
	assert!(!history.is_navigating());

	ws.backend.set_latency(Duration::ZERO);
	assert!(matches!(history.go_back().await, Navigation::Moved { .. }));
}

#[tokio::test(start_paused = true)]
async fn current_tracks_the_last_step() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	visit(&ws, &history, view, &["d1-p0", "d1-p1", "d1-p2"]);
	assert_eq!(history.current().map(|e| e.target), Some("d1-p2".into()));

	history.go_back().await;
	assert_eq!(history.current().map(|e| e.target), Some("d1-p1".into()));

	history.go_forward().await;
	assert_eq!(history.current().map(|e| e.target), Some("d1-p2".into()));
}
