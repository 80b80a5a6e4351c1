//! Observable attribute and style store.
//!
//! Replaces property interception with an explicit get/set/subscribe
//! interface. Writes notify synchronously; after pre-activation the
//! hydration engine subscribes and mirrors every write onto the live element.

use std::cell::RefCell;

use indexmap::IndexMap;
use serde_json::Value;

use super::events::{EventChannel, Subscription};
use crate::dom::{Element, parse_style};

const STYLE_ATTR: &str = "style";

/// Style keys whose numeric values are coerced to pixels.
pub const PIXEL_STYLE_KEYS: &[&str] = &["width", "height", "left", "top"];

/// A change to an [`AttributeStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeChange {
	/// An attribute was set (the class list is the `class` attribute).
	Set {
		/// Attribute name
		name: String,
		/// New value
		value: String,
	},
	/// An attribute was removed.
	Removed {
		/// Attribute name
		name: String,
	},
	/// A single style declaration changed; `None` means removed.
	Style {
		/// Style key
		key: String,
		/// New value
		value: Option<String>,
	},
}

/// A style value before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
	/// A bare number. Coerced to `px` for width/height/left/top.
	Number(f64),
	/// A string, passed through untouched.
	Text(String),
}

impl StyleValue {
	/// Produces the declared string for `key`.
	pub fn coerce(&self, key: &str) -> String {
		match self {
			Self::Number(n) if PIXEL_STYLE_KEYS.contains(&key) => format!("{}px", format_number(*n)),
			Self::Number(n) => format_number(*n),
			Self::Text(s) => s.clone(),
		}
	}
}

fn format_number(n: f64) -> String {
	if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
		format!("{}", n as i64)
	} else {
		n.to_string()
	}
}

macro_rules! style_value_from_number {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for StyleValue {
				fn from(n: $ty) -> Self {
					Self::Number(n as f64)
				}
			}
		)*
	};
}

style_value_from_number!(i32, i64, u32, u64, usize, f32, f64);

impl From<&str> for StyleValue {
	fn from(s: &str) -> Self {
		Self::Text(s.to_string())
	}
}

impl From<String> for StyleValue {
	fn from(s: String) -> Self {
		Self::Text(s)
	}
}

impl From<Value> for StyleValue {
	fn from(value: Value) -> Self {
		match value {
			Value::Number(n) => n.as_f64().map_or_else(|| Self::Text(n.to_string()), Self::Number),
			Value::String(s) => Self::Text(s),
			other => Self::Text(other.to_string()),
		}
	}
}

/// Attributes, class list and style declarations of a control.
#[derive(Debug, Default)]
pub struct AttributeStore {
	attributes: RefCell<IndexMap<String, String>>,
	style: RefCell<IndexMap<String, String>>,
	changes: EventChannel<AttributeChange>,
}

impl AttributeStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns an attribute value.
	pub fn get(&self, name: &str) -> Option<String> {
		self.attributes.borrow().get(name).cloned()
	}

	/// Returns whether the attribute is present.
	pub fn contains(&self, name: &str) -> bool {
		self.attributes.borrow().contains_key(name)
	}

	/// Returns every attribute in insertion order.
	pub fn attributes(&self) -> Vec<(String, String)> {
		self.attributes
			.borrow()
			.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect()
	}

	/// Sets an attribute and notifies subscribers.
	///
	/// `style` replaces the style declarations and notifies one
	/// [`AttributeChange::Style`] per key that changed.
	pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
		let (name, value) = (name.into(), value.into());
		if name == STYLE_ATTR {
			self.replace_style(&value);
			return;
		}
		self.set_silent(name.clone(), value.clone());
		self.changes.emit(&AttributeChange::Set { name, value });
	}

	/// Sets an attribute without notifying.
	pub fn set_silent(&self, name: impl Into<String>, value: impl Into<String>) {
		let (name, value) = (name.into(), value.into());
		if name == STYLE_ATTR {
			*self.style.borrow_mut() = parse_style(&value);
			return;
		}
		self.attributes.borrow_mut().insert(name, value);
	}

	/// Removes an attribute. Returns whether it was present.
	///
	/// Removing `style` drops every style declaration.
	pub fn remove(&self, name: &str) -> bool {
		if name == STYLE_ATTR {
			return self.replace_style("");
		}
		let removed = self.attributes.borrow_mut().shift_remove(name).is_some();
		if removed {
			self.changes.emit(&AttributeChange::Removed {
				name: name.to_string(),
			});
		}
		removed
	}

	/// Returns the class list.
	pub fn classes(&self) -> Vec<String> {
		self.get("class")
			.map(|c| c.split_whitespace().map(str::to_string).collect())
			.unwrap_or_default()
	}

	/// Returns whether `class` is in the class list.
	pub fn has_class(&self, class: &str) -> bool {
		self.classes().iter().any(|c| c == class)
	}

	/// Adds a class. Returns false (and stays silent) if it was present.
	pub fn add_class(&self, class: &str) -> bool {
		match self.with_class_added(class) {
			Some(value) => {
				self.set("class", value);
				true
			}
			None => false,
		}
	}

	pub(crate) fn add_class_silent(&self, class: &str) {
		if let Some(value) = self.with_class_added(class) {
			self.set_silent("class", value);
		}
	}

	/// Removes a class. Returns false (and stays silent) if it was absent.
	pub fn remove_class(&self, class: &str) -> bool {
		let mut classes = self.classes();
		let before = classes.len();
		classes.retain(|c| c != class);
		if classes.len() == before {
			return false;
		}
		if classes.is_empty() {
			self.remove("class");
		} else {
			self.set("class", classes.join(" "));
		}
		true
	}

	/// Returns a declared style value.
	pub fn style(&self, key: &str) -> Option<String> {
		self.style.borrow().get(key).cloned()
	}

	/// Sets one style declaration, coercing numeric pixel keys, and notifies.
	pub fn set_style(&self, key: impl Into<String>, value: impl Into<StyleValue>) {
		let key = key.into();
		let value = value.into().coerce(&key);
		self.style.borrow_mut().insert(key.clone(), value.clone());
		self.changes.emit(&AttributeChange::Style {
			key,
			value: Some(value),
		});
	}

	pub(crate) fn set_style_silent(&self, key: impl Into<String>, value: impl Into<String>) {
		self.style.borrow_mut().insert(key.into(), value.into());
	}

	/// Removes one style declaration. Returns whether it was present.
	pub fn remove_style(&self, key: &str) -> bool {
		let removed = self.style.borrow_mut().shift_remove(key).is_some();
		if removed {
			self.changes.emit(&AttributeChange::Style {
				key: key.to_string(),
				value: None,
			});
		}
		removed
	}

	/// Returns every style declaration in order.
	pub fn style_declarations(&self) -> Vec<(String, String)> {
		self.style
			.borrow()
			.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect()
	}

	/// Returns the flattened `key:value;` style string.
	pub fn flattened_style(&self) -> String {
		crate::dom::flatten_style_pairs(&self.style_declarations())
	}

	/// Subscribes to attribute changes.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&AttributeChange) + 'static,
	{
		self.changes.subscribe(listener)
	}

	/// Removes a subscription.
	pub fn unsubscribe(&self, subscription: Subscription) -> bool {
		self.changes.unsubscribe(subscription)
	}

	/// Swaps in the declarations parsed from `source`. Returns whether
	/// anything changed.
	fn replace_style(&self, source: &str) -> bool {
		let next = parse_style(source);
		let previous = std::mem::replace(&mut *self.style.borrow_mut(), next.clone());
		let mut changed = false;
		for key in previous.keys().filter(|key| !next.contains_key(*key)) {
			changed = true;
			self.changes.emit(&AttributeChange::Style {
				key: key.clone(),
				value: None,
			});
		}
		for (key, value) in next {
			if previous.get(&key) == Some(&value) {
				continue;
			}
			changed = true;
			self.changes.emit(&AttributeChange::Style {
				key,
				value: Some(value),
			});
		}
		changed
	}

	fn with_class_added(&self, class: &str) -> Option<String> {
		let mut classes = self.classes();
		if class.is_empty() || classes.iter().any(|c| c == class) {
			return None;
		}
		classes.push(class.to_string());
		Some(classes.join(" "))
	}
}

/// Applies one attribute change to a live element.
pub(crate) fn apply_to_element(element: &Element, change: &AttributeChange) {
	match change {
		AttributeChange::Set { name, value } => element.set_attribute(name, value),
		AttributeChange::Removed { name } => element.remove_attribute(name),
		AttributeChange::Style {
			key,
			value: Some(value),
		} => element.set_style_property(key, value),
		AttributeChange::Style { key, value: None } => element.remove_style_property(key),
	}
}
