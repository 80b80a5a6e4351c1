//! The composable capability shared by tree nodes and text leaves.

use super::child::{Child, ContentChange, TextNode};
use super::control::Control;
use super::events::Subscription;
use crate::error::CompositionError;

/// Anything that can sit in a child sequence.
///
/// Walking code (rendering, hydration, state collection) goes through this
/// trait instead of probing what a child happens to be. Text leaves implement
/// it with an empty, closed child sequence.
pub trait Composable {
	/// Returns the ordered children.
	fn child_nodes(&self) -> Vec<Child>;

	/// Appends a child.
	fn add_child(&self, child: Child) -> Result<(), CompositionError>;

	/// Removes a child.
	fn remove_child(&self, child: &Child) -> Result<(), CompositionError>;

	/// Removes every child.
	fn clear_children(&self);

	/// Subscribes to structural changes. Leaves have none and return `None`.
	fn subscribe_content(&self, listener: Box<dyn Fn(&ContentChange)>) -> Option<Subscription>;

	/// Returns the text content of the subtree.
	fn text(&self) -> String;

	/// Returns true for nodes that can never hold children.
	fn is_leaf(&self) -> bool {
		false
	}
}

impl Composable for Control {
	fn child_nodes(&self) -> Vec<Child> {
		self.children()
	}

	fn add_child(&self, child: Child) -> Result<(), CompositionError> {
		self.add(child)
	}

	fn remove_child(&self, child: &Child) -> Result<(), CompositionError> {
		self.remove(child.clone())
	}

	fn clear_children(&self) {
		self.clear();
	}

	fn subscribe_content(&self, listener: Box<dyn Fn(&ContentChange)>) -> Option<Subscription> {
		Some(self.subscribe_content(listener))
	}

	fn text(&self) -> String {
		self.text_content()
	}
}

impl Composable for TextNode {
	fn child_nodes(&self) -> Vec<Child> {
		Vec::new()
	}

	fn add_child(&self, _child: Child) -> Result<(), CompositionError> {
		Err(CompositionError::LeafNode)
	}

	fn remove_child(&self, _child: &Child) -> Result<(), CompositionError> {
		Err(CompositionError::LeafNode)
	}

	fn clear_children(&self) {}

	fn subscribe_content(&self, _listener: Box<dyn Fn(&ContentChange)>) -> Option<Subscription> {
		None
	}

	fn text(&self) -> String {
		TextNode::text(self)
	}

	fn is_leaf(&self) -> bool {
		true
	}
}

impl Composable for Child {
	fn child_nodes(&self) -> Vec<Child> {
		self.as_composable().child_nodes()
	}

	fn add_child(&self, child: Child) -> Result<(), CompositionError> {
		self.as_composable().add_child(child)
	}

	fn remove_child(&self, child: &Child) -> Result<(), CompositionError> {
		self.as_composable().remove_child(child)
	}

	fn clear_children(&self) {
		self.as_composable().clear_children();
	}

	fn subscribe_content(&self, listener: Box<dyn Fn(&ContentChange)>) -> Option<Subscription> {
		self.as_composable().subscribe_content(listener)
	}

	fn text(&self) -> String {
		self.as_composable().text()
	}

	fn is_leaf(&self) -> bool {
		self.as_composable().is_leaf()
	}
}

impl Child {
	fn as_composable(&self) -> &dyn Composable {
		match self {
			Self::Control(control) => control,
			Self::Text(text) => text,
		}
	}
}

/// Collects every control in the subtree rooted at `root`, depth-first,
/// root first when it is a control.
pub fn descendant_controls(root: &dyn Composable) -> Vec<Control> {
	let mut out = Vec::new();
	for child in root.child_nodes() {
		if let Child::Control(control) = &child {
			out.push(control.clone());
		}
		out.extend(descendant_controls(&child));
	}
	out
}
