//! Shared data objects.
//!
//! A control's view can be bound to a [`DataObject`] that other controls also
//! observe. The object's id is rendered into markup so that, after hydration,
//! independently rendered controls rebind to one shared instance.

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use std::cell::RefCell;

use super::events::{EventChannel, Subscription};

/// A change to one key of a [`DataObject`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataChange {
	/// The key that changed.
	pub key: String,
	/// The previous value, if any.
	pub old: Option<Value>,
	/// The new value.
	pub value: Value,
}

struct DataObjectInner {
	id: String,
	values: RefCell<Map<String, Value>>,
	changes: EventChannel<DataChange>,
}

/// An observable JSON object with a session-wide id.
#[derive(Clone)]
pub struct DataObject(Rc<DataObjectInner>);

impl DataObject {
	/// Creates an empty object. Use [`Session::new_data_object`](crate::Session::new_data_object)
	/// to get one with a fresh id that is already registered.
	pub fn new(id: impl Into<String>) -> Self {
		Self::with_values(id, Map::new())
	}

	/// Creates an object holding `values`.
	pub fn with_values(id: impl Into<String>, values: Map<String, Value>) -> Self {
		Self(Rc::new(DataObjectInner {
			id: id.into(),
			values: RefCell::new(values),
			changes: EventChannel::new(),
		}))
	}

	/// Returns the object's id.
	pub fn id(&self) -> &str {
		&self.0.id
	}

	/// Returns a value.
	pub fn get(&self, key: &str) -> Option<Value> {
		self.0.values.borrow().get(key).cloned()
	}

	/// Sets a value and notifies subscribers.
	pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
		let key = key.into();
		let value = value.into();
		let old = self
			.0
			.values
			.borrow_mut()
			.insert(key.clone(), value.clone());
		self.0.changes.emit(&DataChange { key, old, value });
	}

	/// Merges `values` in without notifying.
	pub(crate) fn merge_silent(&self, values: Map<String, Value>) {
		self.0.values.borrow_mut().extend(values);
	}

	/// Returns a snapshot of every value.
	pub fn snapshot(&self) -> Map<String, Value> {
		self.0.values.borrow().clone()
	}

	/// Subscribes to value changes.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&DataChange) + 'static,
	{
		self.0.changes.subscribe(listener)
	}

	/// Removes a subscription.
	pub fn unsubscribe(&self, subscription: Subscription) -> bool {
		self.0.changes.unsubscribe(subscription)
	}
}

impl PartialEq for DataObject {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for DataObject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DataObject")
			.field("id", &self.0.id)
			.field("values", &self.0.values.borrow())
			.finish()
	}
}
