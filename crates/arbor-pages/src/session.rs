//! The session registry.
//!
//! One [`Session`] exists per document. It allocates ids and maps them to
//! controls, live elements and shared data objects, so that server and client
//! agree on identity across the serialize/deserialize boundary. It is an
//! explicit value handed to every control at construction, never a global.
//!
//! Entries are never purged when a control leaves the tree; long-lived
//! sessions that churn many controls accumulate stale entries.

mod mixins;

pub use mixins::{MixinDescriptor, MixinFn, MixinRegistry, normalize_key};

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::component::{Control, DataObject, EventChannel, Subscription};
use crate::config::SessionOptions;
use crate::dom::{Document, Element};
use crate::selection::SelectionScope;
use crate::ssr::SsrState;

pub(crate) struct SessionInner {
	options: SessionOptions,
	counters: RefCell<HashMap<String, u64>>,
	controls: RefCell<HashMap<String, Control>>,
	elements: RefCell<HashMap<String, Element>>,
	data_objects: RefCell<HashMap<String, DataObject>>,
	scopes: RefCell<BTreeMap<u64, SelectionScope>>,
	next_scope: Cell<u64>,
	mixins: MixinRegistry,
	document: RefCell<Option<Document>>,
	hydration_complete: Cell<bool>,
	hydration_listeners: EventChannel<()>,
}

/// Per-document id allocator and id-keyed lookup tables.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct Session(Rc<SessionInner>);

impl Default for Session {
	fn default() -> Self {
		Self::new()
	}
}

impl Session {
	/// Creates a session with default options.
	pub fn new() -> Self {
		Self::with_options(SessionOptions::default())
	}

	/// Creates a session with the given options.
	pub fn with_options(options: SessionOptions) -> Self {
		Self(Rc::new(SessionInner {
			options,
			counters: RefCell::new(HashMap::new()),
			controls: RefCell::new(HashMap::new()),
			elements: RefCell::new(HashMap::new()),
			data_objects: RefCell::new(HashMap::new()),
			scopes: RefCell::new(BTreeMap::new()),
			next_scope: Cell::new(0),
			mixins: MixinRegistry::new(),
			document: RefCell::new(None),
			hydration_complete: Cell::new(false),
			hydration_listeners: EventChannel::new(),
		}))
	}

	pub(crate) fn from_inner(inner: Rc<SessionInner>) -> Self {
		Self(inner)
	}

	pub(crate) fn downgrade(&self) -> Weak<SessionInner> {
		Rc::downgrade(&self.0)
	}

	/// Returns the options.
	pub fn options(&self) -> &SessionOptions {
		&self.0.options
	}

	/// Allocates the next id for `type_name`: `"{type_name}_{n}"`.
	///
	/// Counters are per type and start at zero, so the same construction order
	/// yields the same ids in every session.
	pub fn new_id(&self, type_name: &str) -> String {
		let mut counters = self.0.counters.borrow_mut();
		let counter = counters.entry(type_name.to_string()).or_insert(0);
		let id = format!("{}_{}", type_name, counter);
		*counter += 1;
		id
	}

	/// Advances the counter for `type_name` past an id read back from markup,
	/// so ids allocated later on the client never collide with it.
	pub fn reserve_id(&self, type_name: &str, id: &str) {
		let Some(n) = id
			.strip_prefix(type_name)
			.and_then(|rest| rest.strip_prefix('_'))
			.and_then(|n| n.parse::<u64>().ok())
		else {
			return;
		};
		let mut counters = self.0.counters.borrow_mut();
		let counter = counters.entry(type_name.to_string()).or_insert(0);
		*counter = (*counter).max(n + 1);
	}

	/// Inserts (or overwrites) the id-to-control mapping.
	pub fn register_control(&self, control: &Control) {
		self.0
			.controls
			.borrow_mut()
			.insert(control.id().to_string(), control.clone());
	}

	/// Looks up a control by id.
	pub fn control(&self, id: &str) -> Option<Control> {
		self.0.controls.borrow().get(id).cloned()
	}

	/// Returns the number of registered controls.
	pub fn control_count(&self) -> usize {
		self.0.controls.borrow().len()
	}

	/// Caches the live element for an id.
	pub fn register_element(&self, id: &str, element: &Element) {
		self.0
			.elements
			.borrow_mut()
			.insert(id.to_string(), element.clone());
	}

	/// Looks up a cached live element.
	pub fn element(&self, id: &str) -> Option<Element> {
		self.0.elements.borrow().get(id).cloned()
	}

	/// Registers a shared data object under its id.
	pub fn register_data_object(&self, object: &DataObject) {
		self.0
			.data_objects
			.borrow_mut()
			.insert(object.id().to_string(), object.clone());
	}

	/// Looks up a shared data object.
	pub fn data_object(&self, id: &str) -> Option<DataObject> {
		self.0.data_objects.borrow().get(id).cloned()
	}

	/// Creates and registers an empty data object with a fresh `model_{n}` id.
	pub fn new_data_object(&self) -> DataObject {
		let object = DataObject::new(self.new_id("model"));
		self.register_data_object(&object);
		object
	}

	/// Returns every registered data object, ordered by id.
	pub fn data_objects(&self) -> Vec<DataObject> {
		let mut objects: Vec<_> = self.0.data_objects.borrow().values().cloned().collect();
		objects.sort_by(|a, b| a.id().cmp(b.id()));
		objects
	}

	/// Allocates a selection scope with the next numeric id.
	pub fn new_selection_scope(&self, owner: Option<&Control>) -> SelectionScope {
		let id = self.0.next_scope.get();
		self.0.next_scope.set(id + 1);
		let scope = SelectionScope::new(id, owner);
		self.0.scopes.borrow_mut().insert(id, scope.clone());
		scope
	}

	/// Looks up a selection scope.
	pub fn selection_scope(&self, id: u64) -> Option<SelectionScope> {
		self.0.scopes.borrow().get(&id).cloned()
	}

	/// Returns the mixin registry.
	pub fn mixins(&self) -> &MixinRegistry {
		&self.0.mixins
	}

	/// Attaches the live document that pre-activation falls back to when
	/// resolving elements by id.
	pub fn attach_document(&self, document: &Document) {
		*self.0.document.borrow_mut() = Some(document.clone());
	}

	/// Returns the attached document.
	pub fn document(&self) -> Option<Document> {
		self.0.document.borrow().clone()
	}

	/// Seeds shared data objects from server-side state.
	///
	/// Objects already present are merged into, not replaced.
	pub fn restore_state(&self, state: &SsrState) {
		for (id, values) in state.data_objects() {
			match self.data_object(id) {
				Some(object) => object.merge_silent(values.clone()),
				None => {
					self.register_data_object(&DataObject::with_values(id.clone(), values.clone()))
				}
			}
		}
	}

	/// Runs `callback` once the document has been hydrated; immediately if it
	/// already has.
	pub fn on_hydration_complete<F>(&self, callback: F) -> Option<Subscription>
	where
		F: FnOnce() + 'static,
	{
		if self.is_hydration_complete() {
			callback();
			return None;
		}
		Some(self.0.hydration_listeners.subscribe_once(move |_| callback()))
	}

	/// Returns whether a document-level hydration pass has completed.
	pub fn is_hydration_complete(&self) -> bool {
		self.0.hydration_complete.get()
	}

	pub(crate) fn mark_hydration_complete(&self) {
		if !self.0.hydration_complete.replace(true) {
			self.0.hydration_listeners.emit(&());
		}
	}
}

impl PartialEq for Session {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for Session {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Session")
			.field("controls", &self.0.controls.borrow().len())
			.field("elements", &self.0.elements.borrow().len())
			.field("data_objects", &self.0.data_objects.borrow().len())
			.field("scopes", &self.0.scopes.borrow().len())
			.field("mixins", &self.0.mixins)
			.field("hydration_complete", &self.0.hydration_complete.get())
			.finish()
	}
}
