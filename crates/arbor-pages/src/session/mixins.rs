//! Mixin registry.
//!
//! Behaviors applied at render time are serialized as `{name, options}`
//! descriptors; the descriptor never carries logic. On the client the name is
//! normalized to a lookup key and the function registered under that key at
//! startup is invoked against the control.
//!
//! ## Example
//!
//! ```ignore
//! session.mixins().register("Drag-Handle", |control, options| {
//!     control.add_class("draggable");
//!     control.set_field("axis", options["axis"].clone());
//! });
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::component::Control;

/// A registered behavior function.
pub type MixinFn = Rc<dyn Fn(&Control, &Value)>;

/// A recorded behavior: the name it was applied under and its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixinDescriptor {
	/// The name as given to `apply_mixin`.
	pub name: String,
	/// The options payload.
	#[serde(default)]
	pub options: Value,
}

impl MixinDescriptor {
	/// Creates a descriptor.
	pub fn new(name: impl Into<String>, options: Value) -> Self {
		Self {
			name: name.into(),
			options,
		}
	}

	/// Returns the normalized lookup key.
	pub fn key(&self) -> String {
		normalize_key(&self.name)
	}
}

/// Normalizes a mixin name to its lookup key.
///
/// Trims, lower-cases, and maps `-`, `.` and whitespace to `_`.
pub fn normalize_key(name: &str) -> String {
	name.trim()
		.chars()
		.map(|c| match c {
			'-' | '.' => '_',
			c if c.is_whitespace() => '_',
			c => c.to_ascii_lowercase(),
		})
		.collect()
}

/// Maps normalized keys to behavior functions.
#[derive(Default)]
pub struct MixinRegistry {
	entries: RefCell<HashMap<String, MixinFn>>,
}

impl MixinRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `mixin` under the normalized form of `name`, replacing any
	/// previous registration.
	pub fn register<F>(&self, name: &str, mixin: F)
	where
		F: Fn(&Control, &Value) + 'static,
	{
		self.entries
			.borrow_mut()
			.insert(normalize_key(name), Rc::new(mixin));
	}

	/// Looks up a mixin by name (normalized before lookup).
	pub fn get(&self, name: &str) -> Option<MixinFn> {
		self.entries.borrow().get(&normalize_key(name)).cloned()
	}

	/// Returns whether a mixin is registered under `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.entries.borrow().contains_key(&normalize_key(name))
	}

	/// Returns the number of registered mixins.
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	/// Returns true if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

impl fmt::Debug for MixinRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut keys: Vec<_> = self.entries.borrow().keys().cloned().collect();
		keys.sort();
		f.debug_struct("MixinRegistry").field("keys", &keys).finish()
	}
}
