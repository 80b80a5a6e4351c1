//! Integration tests for live patching and diagnostics
//!
//! Test Categories:
//! 1. Insertion order on mounted trees
//! 2. Removal and reinsertion on live elements
//! 3. Log-and-continue behavior for malformed markup

use std::sync::{Arc, Mutex};

use arbor_pages::{Control, Document, HydrationError, Hydrator, Session};
use proptest::prelude::*;
use rstest::*;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// A tracing layer that captures `[LEVEL] message` lines.
struct LogCapture {
	logs: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
		struct MessageVisitor {
			message: String,
		}

		impl tracing::field::Visit for MessageVisitor {
			fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
				if field.name() == "message" {
					self.message = format!("{:?}", value);
				}
			}
		}

		let mut visitor = MessageVisitor {
			message: String::new(),
		};
		event.record(&mut visitor);
		self.logs.lock().unwrap().push(format!(
			"[{}] {}",
			event.metadata().level(),
			visitor.message
		));
	}
}

fn capture_logs() -> (Arc<Mutex<Vec<String>>>, tracing::subscriber::DefaultGuard) {
	let logs = Arc::new(Mutex::new(Vec::new()));
	let capture = LogCapture { logs: logs.clone() };
	let guard = tracing_subscriber::registry().with(capture).set_default();
	(logs, guard)
}

// ============================================================================
// Insertion order
// ============================================================================

/// Insertion order: each add after mounting lands as the last live child
#[rstest]
fn test_add_after_mount_appends_last() {
	proptest!(|(labels in prop::collection::vec("[a-z]{1,6}", 1..10))| {
		let session = Session::new();
		let document = Document::new();
		let list = Control::typed(&session, "list", "ul");
		let first = Control::new(&session, "li");
		list.add(&first).unwrap();
		let live_list = list.mount(document.body()).unwrap();

		let mut added = vec![first];
		for label in &labels {
			let item = Control::new(&session, "li");
			item.add(label.as_str()).unwrap();
			list.add(&item).unwrap();
			prop_assert!(item.is_active());
			prop_assert_eq!(live_list.children().last().cloned(), item.element());
			added.push(item);
		}

		let live_ids: Vec<_> = live_list.children().iter().filter_map(|e| e.id()).collect();
		let expected: Vec<_> = added.iter().map(|c| c.id().to_string()).collect();
		prop_assert_eq!(live_ids, expected);
		prop_assert_eq!(live_list.text_content(), labels.concat());
	});
}

#[rstest]
fn test_rendered_order_follows_add_order() {
	let session = Session::new();
	let row = Control::new(&session, "p");
	let bold = Control::new(&session, "b");
	bold.add("b").unwrap();

	row.add("a").unwrap();
	row.add(&bold).unwrap();
	row.add("c").unwrap();

	assert_eq!(
		row.render(),
		r#"<p id="control_0">a<b id="control_1">b</b>c</p>"#
	);
}

#[rstest]
fn test_move_between_live_parents() {
	let session = Session::new();
	let document = Document::new();
	let left = Control::typed(&session, "column", "div");
	let right = Control::typed(&session, "column", "div");
	let card = Control::typed(&session, "card", "article");
	left.add(&card).unwrap();
	let live_left = left.mount(document.body()).unwrap();
	let live_right = right.mount(document.body()).unwrap();

	right.add(&card).unwrap();

	assert_eq!(card.parent(), Some(right.clone()));
	assert_eq!(live_left.child_count(), 0);
	assert_eq!(live_right.children(), vec![card.element().unwrap()]);
}

#[rstest]
fn test_remove_detaches_live_element() {
	let session = Session::new();
	let document = Document::new();
	let list = Control::typed(&session, "list", "ul");
	let items: Vec<_> = (0..3).map(|_| Control::new(&session, "li")).collect();
	list.add(items.clone()).unwrap();
	let live = list.mount(document.body()).unwrap();

	list.remove(&items[1]).unwrap();

	let remaining: Vec<_> = live.children().iter().filter_map(|e| e.id()).collect();
	assert_eq!(remaining, vec!["control_0", "control_2"]);
	assert!(document.get_element_by_id("control_1").is_none());
}

// ============================================================================
// Log and continue
// ============================================================================

#[rstest]
fn test_malformed_fields_are_traced_and_skipped() {
	let (logs, _guard) = capture_logs();
	let session = Session::new();
	let document = Document::from_markup(
		r#"<div id="panel_0" data-ah-type="panel" data-ah-fields="{bad"><span id="label_0" data-ah-type="label">ok</span></div>"#,
	);

	let report = Hydrator::new(&session, &document).hydrate_all();

	assert!(matches!(
		report.diagnostics.as_slice(),
		[HydrationError::MalformedPayload { .. }]
	));
	let panel = session.control("panel_0").unwrap();
	assert!(panel.is_active());
	assert!(panel.fields().is_empty());
	assert!(session.control("label_0").unwrap().is_active());
	assert!(session.is_hydration_complete());

	let captured = logs.lock().unwrap();
	assert!(
		captured
			.iter()
			.any(|log| log.contains("WARN") && log.contains("malformed data-ah-fields payload on panel_0")),
		"expected a warning, got: {:?}",
		*captured
	);
}

#[rstest]
fn test_unknown_mixin_is_traced() {
	let (logs, _guard) = capture_logs();
	let session = Session::new();
	let document = Document::from_markup(
		r#"<div id="window_0" data-ah-type="window" data-ah-mixins="[{&quot;name&quot;:&quot;sortable&quot;,&quot;options&quot;:null}]"></div>"#,
	);

	let report = Hydrator::new(&session, &document).hydrate_all();

	assert!(matches!(
		report.diagnostics.as_slice(),
		[HydrationError::UnknownMixin { .. }]
	));
	assert!(session.control("window_0").unwrap().is_active());
	assert!(logs.lock().unwrap().iter().any(|log| log.contains("sortable")));
}

#[rstest]
fn test_missing_root_is_the_only_error() {
	let session = Session::new();
	let document = Document::from_markup("<div></div>");

	let err = Hydrator::new(&session, &document)
		.hydrate_root("app")
		.unwrap_err();

	assert_eq!(err, HydrationError::RootNotFound("app".to_string()));
}
