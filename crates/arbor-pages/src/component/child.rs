//! Entries of a control's child sequence.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use super::control::Control;
use crate::dom::Text;

struct TextNodeInner {
	value: RefCell<Value>,
	live: RefCell<Option<Text>>,
}

/// A text leaf in a control's child sequence.
///
/// Holds a JSON value so that numbers and other bound data render as their
/// text form. Once hydrated it also holds the live text handle.
#[derive(Clone)]
pub struct TextNode(Rc<TextNodeInner>);

impl TextNode {
	/// Creates a text leaf.
	pub fn new(text: impl Into<String>) -> Self {
		Self::bound(Value::String(text.into()))
	}

	/// Creates a text leaf whose text is extracted from a data value.
	pub fn bound(value: Value) -> Self {
		Self(Rc::new(TextNodeInner {
			value: RefCell::new(value),
			live: RefCell::new(None),
		}))
	}

	/// Returns the text.
	pub fn text(&self) -> String {
		text_of(&self.0.value.borrow())
	}

	/// Returns the underlying value.
	pub fn value(&self) -> Value {
		self.0.value.borrow().clone()
	}

	/// Replaces the text, updating the live text node if bound.
	pub fn set_text(&self, value: impl Into<Value>) {
		*self.0.value.borrow_mut() = value.into();
		if let Some(live) = self.live() {
			live.set_data(self.text());
		}
	}

	/// Returns the live text handle.
	pub fn live(&self) -> Option<Text> {
		self.0.live.borrow().clone()
	}

	pub(crate) fn bind_live(&self, text: Text) {
		*self.0.live.borrow_mut() = Some(text);
	}
}

/// Extracts display text from a data value.
pub(crate) fn text_of(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

impl PartialEq for TextNode {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for TextNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TextNode")
			.field("text", &self.text())
			.field("live", &self.0.live.borrow().is_some())
			.finish()
	}
}

/// One entry of a child sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
	/// A nested control.
	Control(Control),
	/// A text leaf.
	Text(TextNode),
}

impl Child {
	/// Returns the control, if this entry is one.
	pub fn as_control(&self) -> Option<&Control> {
		match self {
			Self::Control(control) => Some(control),
			Self::Text(_) => None,
		}
	}

	/// Returns the text leaf, if this entry is one.
	pub fn as_text(&self) -> Option<&TextNode> {
		match self {
			Self::Text(text) => Some(text),
			Self::Control(_) => None,
		}
	}

	/// Returns the text content of this entry and its subtree.
	pub fn text_content(&self) -> String {
		match self {
			Self::Control(control) => control.text_content(),
			Self::Text(text) => text.text(),
		}
	}

	/// Detaches this entry's live node from its live parent.
	pub(crate) fn detach_live(&self) {
		match self {
			Self::Control(control) => {
				if let Some(element) = control.element() {
					element.detach();
				}
			}
			Self::Text(text) => {
				if let Some(live) = text.live() {
					live.detach();
				}
			}
		}
	}
}

impl From<Control> for Child {
	fn from(control: Control) -> Self {
		Self::Control(control)
	}
}

impl From<&Control> for Child {
	fn from(control: &Control) -> Self {
		Self::Control(control.clone())
	}
}

impl From<TextNode> for Child {
	fn from(text: TextNode) -> Self {
		Self::Text(text)
	}
}

impl From<&TextNode> for Child {
	fn from(text: &TextNode) -> Self {
		Self::Text(text.clone())
	}
}

/// A structural change to a child sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentChange {
	/// An entry was appended.
	Insert(Child),
	/// An entry was removed.
	Remove(Child),
	/// Every entry was removed.
	Clear,
	/// The live content must be rebuilt from the current sequence.
	Resync,
}

/// Values accepted by [`Control::add`].
///
/// Bare text is normalized to a [`TextNode`]; vectors add each item in order.
pub trait IntoChildren {
	/// Converts `self` into child entries.
	fn into_children(self) -> Vec<Child>;
}

impl IntoChildren for Child {
	fn into_children(self) -> Vec<Child> {
		vec![self]
	}
}

impl IntoChildren for Control {
	fn into_children(self) -> Vec<Child> {
		vec![Child::Control(self)]
	}
}

impl IntoChildren for &Control {
	fn into_children(self) -> Vec<Child> {
		vec![Child::Control(self.clone())]
	}
}

impl IntoChildren for TextNode {
	fn into_children(self) -> Vec<Child> {
		vec![Child::Text(self)]
	}
}

impl IntoChildren for &str {
	fn into_children(self) -> Vec<Child> {
		vec![Child::Text(TextNode::new(self))]
	}
}

impl IntoChildren for String {
	fn into_children(self) -> Vec<Child> {
		vec![Child::Text(TextNode::new(self))]
	}
}

impl<T: IntoChildren> IntoChildren for Vec<T> {
	fn into_children(self) -> Vec<Child> {
		self.into_iter().flat_map(IntoChildren::into_children).collect()
	}
}

impl<T: IntoChildren> IntoChildren for Option<T> {
	fn into_children(self) -> Vec<Child> {
		self.map(IntoChildren::into_children).unwrap_or_default()
	}
}
