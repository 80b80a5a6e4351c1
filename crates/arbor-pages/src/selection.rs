//! Selection scopes.
//!
//! A scope tracks which controls of a subtree are selected and enforces two
//! rules: a control whose ancestor is selected cannot be toggled on
//! (ancestor wins), and selecting a control first deselects its selected
//! descendants (no nested selection). Every mutating operation takes a
//! `silent` flag that suppresses change events for bulk updates.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::component::{Control, ControlInner, EventChannel, Subscription};
use crate::warn_log;

/// A selection change.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
	/// A control was selected.
	Selected(Control),
	/// A control was deselected.
	Deselected(Control),
}

/// Result of [`SelectionScope::select_toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
	/// The control is now selected.
	Selected,
	/// The control is now deselected.
	Deselected,
	/// An ancestor in the same scope is selected; nothing changed.
	Refused,
}

struct ScopeInner {
	id: u64,
	owner: Option<Weak<ControlInner>>,
	selected: RefCell<IndexMap<String, Control>>,
	changes: EventChannel<SelectionEvent>,
}

/// A subtree-bounded selection domain.
///
/// Created through [`Session::new_selection_scope`](crate::Session::new_selection_scope).
#[derive(Clone)]
pub struct SelectionScope(Rc<ScopeInner>);

impl SelectionScope {
	pub(crate) fn new(id: u64, owner: Option<&Control>) -> Self {
		Self(Rc::new(ScopeInner {
			id,
			owner: owner.map(Control::downgrade),
			selected: RefCell::new(IndexMap::new()),
			changes: EventChannel::new(),
		}))
	}

	/// Returns the scope id.
	pub fn id(&self) -> u64 {
		self.0.id
	}

	/// Returns the owning control.
	pub fn owner(&self) -> Option<Control> {
		self.0.owner.as_ref()?.upgrade().map(Control)
	}

	/// Returns the selected controls, in selection order.
	pub fn selected(&self) -> Vec<Control> {
		self.0.selected.borrow().values().cloned().collect()
	}

	/// Returns the selected ids, in selection order.
	pub fn selected_ids(&self) -> Vec<String> {
		self.0.selected.borrow().keys().cloned().collect()
	}

	/// Returns whether `control` is selected.
	pub fn is_selected(&self, control: &Control) -> bool {
		self.0.selected.borrow().contains_key(control.id())
	}

	/// Selects `control`. Returns false if it already was.
	pub fn select(&self, control: &Control, silent: bool) -> bool {
		let inserted = self
			.0
			.selected
			.borrow_mut()
			.insert(control.id().to_string(), control.clone())
			.is_none();
		if inserted && !silent {
			self.0.changes.emit(&SelectionEvent::Selected(control.clone()));
		}
		inserted
	}

	/// Deselects `control`. Returns false if it was not selected.
	pub fn deselect(&self, control: &Control, silent: bool) -> bool {
		let removed = self
			.0
			.selected
			.borrow_mut()
			.shift_remove(control.id())
			.is_some();
		if removed && !silent {
			self.0.changes.emit(&SelectionEvent::Deselected(control.clone()));
		}
		removed
	}

	/// Deselects everything.
	pub fn deselect_all(&self, silent: bool) {
		for control in self.selected() {
			self.deselect(&control, silent);
		}
	}

	/// Makes `control` the only selection.
	///
	/// The scope's owner is never deselected. Nothing is emitted when
	/// `control` already is the sole selection.
	pub fn select_only(&self, control: &Control, silent: bool) {
		let owner = self.owner();
		for other in self.selected() {
			if &other != control && Some(&other) != owner.as_ref() {
				self.deselect(&other, silent);
			}
		}
		self.select(control, silent);
	}

	/// Toggles `control`.
	///
	/// Deselects it if selected. Otherwise refuses when a strict ancestor is
	/// selected in this scope; else deselects its selected descendants and
	/// selects it.
	pub fn select_toggle(&self, control: &Control, silent: bool) -> Toggle {
		if self.deselect(control, silent) {
			return Toggle::Deselected;
		}
		let selected = self.selected();
		if let Some(ancestor) = selected.iter().find(|other| control.has_ancestor(other)) {
			warn_log!(
				"refusing to select {}: ancestor {} is selected in scope {}",
				control.id(),
				ancestor.id(),
				self.id()
			);
			return Toggle::Refused;
		}
		for descendant in selected.iter().filter(|other| other.has_ancestor(control)) {
			self.deselect(descendant, silent);
		}
		self.select(control, silent);
		Toggle::Selected
	}

	/// Subscribes to selection changes.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&SelectionEvent) + 'static,
	{
		self.0.changes.subscribe(listener)
	}

	/// Removes a subscription.
	pub fn unsubscribe(&self, subscription: Subscription) -> bool {
		self.0.changes.unsubscribe(subscription)
	}
}

impl PartialEq for SelectionScope {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for SelectionScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SelectionScope")
			.field("id", &self.0.id)
			.field("selected", &self.selected_ids())
			.finish()
	}
}

impl Control {
	/// Attaches a selection scope to this control.
	pub fn set_selection_scope(&self, scope: &SelectionScope) {
		*self.0.selection_scope.borrow_mut() = Some(scope.clone());
	}

	/// Returns the scope attached to this control itself.
	pub fn selection_scope(&self) -> Option<SelectionScope> {
		self.0.selection_scope.borrow().clone()
	}

	/// Finds the nearest scope on this control or its ancestors.
	pub fn find_selection_scope(&self) -> Option<SelectionScope> {
		let mut current = Some(self.clone());
		while let Some(control) = current {
			if let Some(scope) = control.selection_scope() {
				return Some(scope);
			}
			current = control.parent();
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::session::Session;
	use rstest::{fixture, rstest};

	struct Tree {
		session: Session,
		parent: Control,
		child: Control,
		grandchild: Control,
		sibling: Control,
	}

	#[fixture]
	fn tree() -> Tree {
		let session = Session::new();
		let parent = Control::new(&session, "ul");
		let child = Control::new(&session, "li");
		let grandchild = Control::new(&session, "span");
		let sibling = Control::new(&session, "li");
		child.add(&grandchild).unwrap();
		parent.add(vec![&child, &sibling]).unwrap();
		Tree {
			session,
			parent,
			child,
			grandchild,
			sibling,
		}
	}

	#[rstest]
	fn test_select_only_replaces_selection(tree: Tree) {
		let scope = tree.session.new_selection_scope(None);

		scope.select_only(&tree.child, false);
		scope.select_only(&tree.parent, false);

		assert_eq!(scope.selected(), vec![tree.parent.clone()]);
		assert!(!scope.is_selected(&tree.child));
	}

	#[rstest]
	fn test_select_only_is_idempotent(tree: Tree) {
		let scope = tree.session.new_selection_scope(None);
		let events = Rc::new(RefCell::new(Vec::new()));
		let log = Rc::clone(&events);
		scope.subscribe(move |event| log.borrow_mut().push(event.clone()));

		scope.select_only(&tree.child, false);
		scope.select_only(&tree.child, false);

		assert_eq!(*events.borrow(), vec![SelectionEvent::Selected(tree.child.clone())]);
	}

	#[rstest]
	fn test_select_only_keeps_owner(tree: Tree) {
		let scope = tree.session.new_selection_scope(Some(&tree.parent));
		scope.select(&tree.parent, true);

		scope.select_only(&tree.sibling, false);

		assert_eq!(scope.selected(), vec![tree.parent.clone(), tree.sibling.clone()]);
	}

	#[rstest]
	fn test_toggle_ancestor_wins(tree: Tree) {
		let scope = tree.session.new_selection_scope(None);
		assert_eq!(scope.select_toggle(&tree.child, false), Toggle::Selected);

		assert_eq!(scope.select_toggle(&tree.grandchild, false), Toggle::Refused);
		assert_eq!(scope.selected(), vec![tree.child.clone()]);
	}

	#[rstest]
	fn test_toggle_deselects_descendants(tree: Tree) {
		let scope = tree.session.new_selection_scope(None);
		scope.select_toggle(&tree.grandchild, false);
		scope.select_toggle(&tree.sibling, false);

		assert_eq!(scope.select_toggle(&tree.parent, false), Toggle::Selected);

		assert_eq!(scope.selected(), vec![tree.parent.clone()]);
		assert_eq!(scope.select_toggle(&tree.parent, false), Toggle::Deselected);
		assert!(scope.selected().is_empty());
	}

	#[rstest]
	fn test_silent_operations_emit_nothing(tree: Tree) {
		let scope = tree.session.new_selection_scope(None);
		let count = Rc::new(RefCell::new(0));
		let counter = Rc::clone(&count);
		scope.subscribe(move |_| *counter.borrow_mut() += 1);

		scope.select(&tree.child, true);
		scope.select_toggle(&tree.sibling, true);
		scope.deselect_all(true);

		assert_eq!(*count.borrow(), 0);
		assert!(scope.selected().is_empty());
	}

	#[rstest]
	fn test_find_selection_scope_walks_ancestors(tree: Tree) {
		let scope = tree.session.new_selection_scope(Some(&tree.parent));
		tree.parent.set_selection_scope(&scope);

		assert_eq!(tree.grandchild.find_selection_scope(), Some(scope));
		assert!(tree.grandchild.selection_scope().is_none());
	}
}
