mod common;

use std::time::Duration;

use backtrail_harness::{BackendCall, BlockSpec, CENTRAL_GROUP, DocumentSpec};
use backtrail_history::host::{EditorSurface, LoadMode, Notice};
use backtrail_history::{BackendError, BlockId, HistoryEntry, Navigation, Offsets, ViewHandle, ViewId};
use common::*;
use pretty_assertions::assert_eq;

fn entry(target: &str, zoom: Option<&str>, view: ViewId, root: &str) -> HistoryEntry {
	HistoryEntry::new(
		target.into(),
		zoom.map(Into::into),
		Offsets::caret(1),
		ViewHandle::new(view, root.into()),
	)
}

#[tokio::test(start_paused = true)]
async fn closed_tab_is_reopened() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1-p2", at(1, 1));
	ws.close(view);

	assert!(matches!(history.go_back().await, Navigation::Moved { skipped: 0, .. }));

	let opened = ws.layout.opened();
	assert_eq!(opened.len(), 1);
	let (group, tab, reopened) = &opened[0];
	assert_eq!(*group, CENTRAL_GROUP);
	assert_eq!(tab.root, BlockId::from("d1"));
	assert_eq!(tab.focus, BlockId::from("d1-p2"));
	assert_eq!(tab.title, "Document d1");

	let focus = ws.surface.focus().unwrap();
	assert_eq!(focus.view, *reopened);
	assert_eq!(focus.block, Some("d1-p2".into()));
	assert_eq!(focus.offsets, at(1, 1));
	assert_eq!(history.forward_entries()[0].view.view, *reopened);
}

#[tokio::test(start_paused = true)]
async fn reopening_rebinds_every_stale_entry() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1-p0", at(0, 0));
	ws.caret(&history, view, "d1-p1", at(0, 0));
	ws.close(view);

	history.go_back().await;
	let reopened = ws.layout.opened()[0].2;
	assert!(history.back_entries().iter().all(|e| e.view.view == reopened));

	ws.backend.clear_calls();
	assert!(matches!(history.go_back().await, Navigation::Moved { .. }));
	assert_eq!(ws.layout.opened().len(), 1, "second entry reuses the reopened tab");
	assert!(ws.backend.calls().is_empty());
	assert_eq!(ws.surface.focus().map(|f| f.view), Some(reopened));
}

#[tokio::test(start_paused = true)]
async fn reopening_waits_for_the_tab_to_settle() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1-p1", at(0, 0));
	ws.close(view);

	let started = tokio::time::Instant::now();
	history.go_back().await;

	assert!(started.elapsed() >= history.config().settle_delay());
}

#[tokio::test(start_paused = true)]
async fn locked_document_is_reported() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1-p1", at(0, 0));
	ws.close(view);
	ws.store.set_locked(&"d1".into(), true);

	assert_eq!(history.go_back().await, Navigation::Exhausted { skipped: 1 });
	assert_eq!(ws.notifier.notices(), vec![Notice::DocumentLocked { root: "d1".into() }]);
	assert!(ws.layout.opened().is_empty());
}

#[tokio::test(start_paused = true)]
async fn deleted_document_fails_silently() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1-p1", at(0, 0));
	assert!(ws.delete("d1"));

	assert_eq!(history.go_back().await, Navigation::Exhausted { skipped: 1 });
	assert!(ws.notifier.notices().is_empty());
	assert!(ws.layout.opened().is_empty());
}

#[tokio::test(start_paused = true)]
async fn deleted_target_in_closed_document_is_dropped_silently() {
	let (ws, history) = setup();
	let first = ws.open("d1").unwrap();
	ws.caret(&history, first, "d1-p1", at(2, 2));
	let second = ws.open("d2").unwrap();
	ws.caret(&history, second, "d2-p0", at(0, 0));
	ws.close(first);
	assert!(ws.delete("d1-p1"));

	assert_eq!(history.go_back().await, Navigation::Exhausted { skipped: 1 });

	assert!(ws.notifier.notices().is_empty());
	let opened = ws.layout.opened();
	assert_eq!(opened.len(), 1, "the document still exists and is reopened");
	assert_eq!(opened[0].1.root, BlockId::from("d1"));
	assert_eq!(opened[0].1.focus, BlockId::from("d1-p0"));
	assert_eq!(ws.backend.calls().last(), Some(&BackendCall::CheckBlockExist("d1-p1".into())));
	assert_eq!(targets(&history.forward_entries()), vec!["d2-p0"]);
}

#[tokio::test(start_paused = true)]
async fn backend_status_error_is_reported() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1-p1", at(0, 0));
	ws.close(view);
	// The existence check passes; the block info lookup fails.
	ws.backend.inject_fault_after(
		1,
		BackendError::Status {
			code: -1,
			message: "kernel busy".into(),
		},
	);

	assert_eq!(history.go_back().await, Navigation::Exhausted { skipped: 1 });
	let notices = ws.notifier.notices();
	assert_eq!(notices.len(), 1);
	assert!(matches!(
		&notices[0],
		Notice::DocumentUnavailable { root, reason } if root.as_str() == "d1" && reason.contains("kernel busy")
	));
}

#[tokio::test(start_paused = true)]
async fn transport_failure_fails_silently() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1-p1", at(0, 0));
	ws.close(view);
	ws.backend.inject_fault(BackendError::Transport("connection reset".into()));

	assert_eq!(history.go_back().await, Navigation::Exhausted { skipped: 1 });
	assert!(ws.notifier.notices().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reopening_falls_back_to_central_group() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1-p1", at(0, 0));
	ws.close(view);
	ws.layout.set_active(None);

	assert!(matches!(history.go_back().await, Navigation::Moved { .. }));
	assert_eq!(ws.layout.opened()[0].0, CENTRAL_GROUP);
}

#[tokio::test(start_paused = true)]
async fn reopening_without_any_group_fails() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1-p1", at(0, 0));
	ws.close(view);
	ws.layout.set_active(None);
	ws.layout.set_central(None);

	assert_eq!(history.go_back().await, Navigation::Exhausted { skipped: 1 });
	assert!(ws.layout.opened().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unrendered_target_is_loaded_around() {
	let (ws, history) = setup_with(vec![doc("d1", 100)]);
	let view = ws.open("d1").unwrap();
	assert!(!ws.surface.renders(view, &"d1-p80".into()));
	history.record_entry(entry("d1-p80", None, view, "d1"));
	ws.caret(&history, view, "d1-p1", at(0, 0));
	ws.backend.clear_calls();

	assert_eq!(
		history.go_back().await,
		Navigation::Moved {
			target: "d1-p80".into(),
			skipped: 0
		}
	);

	assert_eq!(
		ws.backend.calls(),
		vec![BackendCall::GetDoc("d1-p80".into(), LoadMode::Centered, PAGE)]
	);
	assert_eq!(ws.surface.splice_count(view), 1);
	assert!(ws.surface.renders(view, &"d1-p80".into()));
	assert!(!ws.surface.renders(view, &"d1-p1".into()));
	let (scrolled_view, node) = ws.surface.scrolled_to().unwrap();
	assert_eq!(scrolled_view, view);
	assert_eq!(ws.surface.block_of(view, node), Some("d1-p80".into()));
}

#[tokio::test(start_paused = true)]
async fn zoomed_entry_restores_its_scope() {
	let (ws, history) = setup_with(vec![
		DocumentSpec::new("d1", "One")
			.block(
				BlockSpec::new("a", "heading")
					.child(BlockSpec::new("a1", "first"))
					.child(BlockSpec::new("a2", "second")),
			)
			.paragraphs("p", 4),
	]);
	let view = ws.open("d1").unwrap();
	history.record_entry(entry("a1", Some("a"), view, "d1"));
	ws.caret(&history, view, "p1", at(0, 0));
	ws.backend.clear_calls();

	assert!(matches!(history.go_back().await, Navigation::Moved { .. }));

	let scope_page = history.config().scope_page_size;
	assert_eq!(
		ws.backend.calls(),
		vec![BackendCall::GetDoc("a".into(), LoadMode::Scope, scope_page)]
	);
	assert_eq!(ws.surface.view_info(view).unwrap().scope, Some("a".into()));
	assert_eq!(ws.surface.focus().unwrap().block, Some("a1".into()));
	assert!(!ws.surface.renders(view, &"p1".into()));
}

#[tokio::test(start_paused = true)]
async fn embedded_copy_is_not_the_target() {
	let (ws, history) = setup_with(vec![
		DocumentSpec::new("d1", "One")
			.block(para("host").embed("far"))
			.paragraphs("p", 20)
			.block(para("far")),
	]);
	let view = ws.open("d1").unwrap();
	assert_eq!(ws.surface.embed_nodes(view).len(), 1, "the copy of far is on screen");
	assert!(!ws.surface.renders(view, &"far".into()));
	history.record_entry(entry("far", None, view, "d1"));
	ws.caret(&history, view, "p1", at(0, 0));

	assert!(matches!(history.go_back().await, Navigation::Moved { .. }));

	let focus = ws.surface.focus().unwrap();
	assert_eq!(focus.block, Some("far".into()));
	assert!(!focus.in_embed);
	assert_eq!(ws.surface.splice_count(view), 1);
}

#[tokio::test(start_paused = true)]
async fn title_target_focuses_the_title() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1", at(2, 2));
	ws.caret(&history, view, "d1-p1", at(0, 0));

	assert_eq!(
		history.go_back().await,
		Navigation::Moved {
			target: "d1".into(),
			skipped: 0
		}
	);

	let focus = ws.surface.focus().unwrap();
	assert_eq!(focus.block, None);
	assert_eq!(Some(focus.node), ws.surface.title_node(view));
	assert_eq!(focus.offsets, at(2, 2));
}

#[tokio::test(start_paused = true)]
async fn background_tab_is_brought_forward() {
	let (ws, history) = setup();
	let first = ws.open("d1").unwrap();
	let second = ws.open("d2").unwrap();
	assert_eq!(ws.surface.foreground_of(CENTRAL_GROUP), Some(second));
	ws.caret(&history, first, "d1-p1", at(0, 0));
	ws.caret(&history, second, "d2-p1", at(0, 0));

	assert!(matches!(history.go_back().await, Navigation::Moved { .. }));

	assert_eq!(ws.surface.foreground_of(CENTRAL_GROUP), Some(first));
	assert_eq!(ws.surface.focus().map(|f| f.view), Some(first));
	assert!(ws.layout.opened().is_empty(), "a background tab is still attached");
}

#[tokio::test(start_paused = true)]
async fn deleted_block_stops_after_existence_check() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1-p1", at(0, 0));
	ws.caret(&history, view, "d1-p2", at(0, 0));
	ws.delete("d1-p1");
	ws.backend.clear_calls();

	assert_eq!(history.go_back().await, Navigation::Exhausted { skipped: 1 });
	assert_eq!(
		ws.backend.calls(),
		vec![
			BackendCall::GetDoc("d1-p1".into(), LoadMode::Centered, PAGE),
			BackendCall::CheckBlockExist("d1-p1".into()),
		]
	);
}

#[tokio::test(start_paused = true)]
async fn transient_overlays_are_dismissed() {
	let (ws, history) = setup();
	let view = ws.open("d1").unwrap();
	ws.caret(&history, view, "d1-p0", at(0, 0));
	ws.caret(&history, view, "d1-p1", at(0, 0));

	history.go_back().await;

	assert!(ws.surface.overlays_dismissed() >= 1);
}

#[tokio::test(start_paused = true)]
async fn missing_zoom_scope_fails_resolution() {
	let (ws, history) = setup_with(vec![
		DocumentSpec::new("d1", "One").block(BlockSpec::new("a", "heading").child(BlockSpec::new("a1", "first"))),
	]);
	let view = ws.open("d1").unwrap();
	let mut stale = entry("a1", Some("a"), view, "d1");
	ws.delete("a");
	ws.backend.clear_calls();

	assert!(!history.reconciler().resolve(&mut stale).await);
	assert_eq!(
		ws.backend.calls(),
		vec![
			BackendCall::GetDoc("a".into(), LoadMode::Scope, history.config().scope_page_size),
			BackendCall::CheckBlockExist("a1".into()),
		]
	);
}

#[tokio::test(start_paused = true)]
async fn existing_but_unreachable_target_fails_resolution() {
	let (ws, history) = setup_with(vec![
		DocumentSpec::new("d1", "One")
			.block(BlockSpec::new("a", "heading").child(BlockSpec::new("a1", "first")))
			.paragraphs("p", 3),
	]);
	let view = ws.open("d1").unwrap();
	// Zoomed into a scope that does not contain the target.
	let mut inconsistent = entry("p2", Some("a"), view, "d1");

	assert!(!history.reconciler().resolve(&mut inconsistent).await);
	assert_eq!(ws.backend.calls().last(), Some(&BackendCall::CheckBlockExist("p2".into())));
	assert_eq!(ws.surface.view_info(view).unwrap().scope, Some("a".into()));
}

#[tokio::test(start_paused = true)]
async fn slow_backend_still_lands() {
	let (ws, history) = setup_with(vec![doc("d1", 40)]);
	let view = ws.open("d1").unwrap();
	history.record_entry(entry("d1-p30", None, view, "d1"));
	ws.caret(&history, view, "d1-p0", at(0, 0));
	ws.backend.set_latency(Duration::from_millis(250));

	let started = tokio::time::Instant::now();
	assert!(matches!(history.go_back().await, Navigation::Moved { .. }));

	assert!(started.elapsed() >= Duration::from_millis(250) + history.config().block_load_delay());
	assert_eq!(ws.surface.focus().unwrap().block, Some("d1-p30".into()));
}
