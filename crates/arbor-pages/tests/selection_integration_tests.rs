//! Integration tests for selection scopes
//!
//! Test Categories:
//! 1. Exclusive selection with `select_only`
//! 2. Toggling under the ancestor-wins and no-nested-selection rules
//! 3. Silent bulk updates
//! 4. Property: no selected pair is ever in an ancestor/descendant relation

use std::cell::RefCell;
use std::rc::Rc;

use arbor_pages::{Control, SelectionEvent, Session, Toggle};
use proptest::prelude::*;
use rstest::*;

/// A three-level tree: root > [branch > [leaf_a, leaf_b], side].
#[fixture]
fn tree() -> (Session, Vec<Control>) {
	let session = Session::new();
	let root = Control::typed(&session, "tree", "ul");
	let branch = Control::typed(&session, "node", "li");
	let leaf_a = Control::typed(&session, "node", "li");
	let leaf_b = Control::typed(&session, "node", "li");
	let side = Control::typed(&session, "node", "li");
	branch.add(vec![&leaf_a, &leaf_b]).unwrap();
	root.add(vec![&branch, &side]).unwrap();
	(session, vec![root, branch, leaf_a, leaf_b, side])
}

fn ids(controls: &[Control]) -> Vec<String> {
	controls.iter().map(|c| c.id().to_string()).collect()
}

#[rstest]
fn test_select_only_child_then_parent(tree: (Session, Vec<Control>)) {
	let (session, nodes) = tree;
	let scope = session.new_selection_scope(Some(&nodes[0]));
	nodes[0].set_selection_scope(&scope);

	scope.select_only(&nodes[2], false);
	scope.select_only(&nodes[1], false);

	assert_eq!(ids(&scope.selected()), vec!["node_0"]);
	assert!(!scope.is_selected(&nodes[2]));
}

#[rstest]
fn test_select_only_is_quiet_when_already_sole(tree: (Session, Vec<Control>)) {
	let (session, nodes) = tree;
	let scope = session.new_selection_scope(None);
	let events = Rc::new(RefCell::new(Vec::new()));
	let log = Rc::clone(&events);
	scope.subscribe(move |event| log.borrow_mut().push(event.clone()));

	scope.select_only(&nodes[4], false);
	scope.select_only(&nodes[4], false);

	assert_eq!(*events.borrow(), vec![SelectionEvent::Selected(nodes[4].clone())]);
}

#[rstest]
fn test_toggle_refused_under_selected_ancestor(tree: (Session, Vec<Control>)) {
	let (session, nodes) = tree;
	let scope = session.new_selection_scope(None);

	assert_eq!(scope.select_toggle(&nodes[1], false), Toggle::Selected);
	assert_eq!(scope.select_toggle(&nodes[3], false), Toggle::Refused);
	assert_eq!(ids(&scope.selected()), vec!["node_0"]);
}

#[rstest]
fn test_toggle_parent_deselects_descendants(tree: (Session, Vec<Control>)) {
	let (session, nodes) = tree;
	let scope = session.new_selection_scope(None);
	scope.select_toggle(&nodes[2], false);
	scope.select_toggle(&nodes[3], false);
	scope.select_toggle(&nodes[4], false);

	assert_eq!(scope.select_toggle(&nodes[1], false), Toggle::Selected);

	let mut selected = ids(&scope.selected());
	selected.sort();
	assert_eq!(selected, vec!["node_0", "node_3"]);
	assert_eq!(scope.select_toggle(&nodes[1], false), Toggle::Deselected);
}

#[rstest]
fn test_silent_updates_emit_nothing(tree: (Session, Vec<Control>)) {
	let (session, nodes) = tree;
	let scope = session.new_selection_scope(None);
	let count = Rc::new(RefCell::new(0));
	let counter = Rc::clone(&count);
	scope.subscribe(move |_| *counter.borrow_mut() += 1);

	scope.select(&nodes[2], true);
	scope.select(&nodes[4], true);
	scope.deselect_all(true);

	assert_eq!(*count.borrow(), 0);
	assert!(scope.selected().is_empty());
}

#[rstest]
fn test_scope_found_from_descendant(tree: (Session, Vec<Control>)) {
	let (session, nodes) = tree;
	let scope = session.new_selection_scope(Some(&nodes[0]));
	nodes[0].set_selection_scope(&scope);

	assert_eq!(nodes[3].find_selection_scope(), Some(scope.clone()));
	assert_eq!(session.selection_scope(scope.id()), Some(scope));
	assert_eq!(nodes[3].selection_scope(), None);
}

/// Selection invariant: toggles never leave nested selections
#[rstest]
fn test_toggle_sequence_never_nests() {
	proptest!(|(toggles in prop::collection::vec(0usize..8, 0..40))| {
		let session = Session::new();
		let root = Control::typed(&session, "node", "div");
		let mut nodes = vec![root.clone()];
		for parent in [0usize, 0, 1, 1, 2, 3, 3] {
			let child = Control::typed(&session, "node", "div");
			nodes[parent].add(&child).unwrap();
			nodes.push(child);
		}
		let scope = session.new_selection_scope(Some(&root));

		for index in toggles {
			scope.select_toggle(&nodes[index], false);
			let selected = scope.selected();
			for a in &selected {
				for b in &selected {
					prop_assert!(!a.has_ancestor(b), "{} nested under {}", a.id(), b.id());
				}
			}
		}
	});
}
