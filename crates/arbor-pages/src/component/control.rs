//! The control: a tree node combining renderable markup state with behavior.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::attrs::{AttributeStore, StyleValue};
use super::child::{Child, ContentChange, IntoChildren, TextNode};
use super::data::DataObject;
use super::events::{EventChannel, Subscription};
use crate::dom::Element;
use crate::error::CompositionError;
use crate::hydration::ActivationState;
use crate::selection::SelectionScope;
use crate::session::{MixinDescriptor, Session, SessionInner};
use crate::ssr::markers::IMPLICIT_TYPE;

pub(crate) struct ControlInner {
	pub(crate) id: String,
	pub(crate) type_name: String,
	pub(crate) tag: String,
	pub(crate) session: RefCell<Weak<SessionInner>>,
	pub(crate) parent: RefCell<Weak<ControlInner>>,
	pub(crate) children: RefCell<Vec<Child>>,
	pub(crate) attrs: AttributeStore,
	pub(crate) element: RefCell<Option<Element>>,
	pub(crate) fields: RefCell<Map<String, Value>>,
	pub(crate) refs: RefCell<IndexMap<String, String>>,
	pub(crate) mixins: RefCell<Vec<MixinDescriptor>>,
	pub(crate) model: RefCell<Option<DataObject>>,
	pub(crate) state: Cell<ActivationState>,
	pub(crate) pending: Cell<bool>,
	pub(crate) selection_scope: RefCell<Option<SelectionScope>>,
	pub(crate) content: EventChannel<ContentChange>,
	pub(crate) activated: EventChannel<()>,
	pub(crate) readiness: EventChannel<()>,
	pub(crate) listeners: RefCell<Vec<Subscription>>,
}

/// A node of the component tree.
///
/// Cloning yields another handle to the same control; equality is identity.
/// Children are owned, the parent and the session are held weakly.
#[derive(Clone)]
pub struct Control(pub(crate) Rc<ControlInner>);

impl Control {
	/// Creates a control of the implicit `control` type.
	pub fn new(session: &Session, tag: &str) -> Self {
		Self::typed(session, IMPLICIT_TYPE, tag)
	}

	/// Creates a control of `type_name` with a fresh id from the session.
	///
	/// # Example
	///
	/// ```ignore
	/// let session = Session::new();
	/// let window = Control::typed(&session, "window", "div");
	/// assert_eq!(window.id(), "window_0");
	/// ```
	pub fn typed(session: &Session, type_name: &str, tag: &str) -> Self {
		let id = session.new_id(type_name);
		Self::adopt(session, id, type_name, tag)
	}

	/// Creates a control with an id read back from rendered markup.
	///
	/// Used on the client, where identity comes from the `id` attribute and is
	/// never re-derived from the counters.
	pub fn adopt(session: &Session, id: impl Into<String>, type_name: &str, tag: &str) -> Self {
		let control = Self::detached(id, type_name, tag);
		session.reserve_id(type_name, control.id());
		*control.0.session.borrow_mut() = session.downgrade();
		session.register_control(&control);
		control
	}

	/// Creates a control that belongs to no session yet.
	///
	/// It joins (and is registered with) the session of the first parent it
	/// is added to.
	pub fn detached(id: impl Into<String>, type_name: &str, tag: &str) -> Self {
		Self(Rc::new(ControlInner {
			id: id.into(),
			type_name: type_name.to_string(),
			tag: tag.to_ascii_lowercase(),
			session: RefCell::new(Weak::new()),
			parent: RefCell::new(Weak::new()),
			children: RefCell::new(Vec::new()),
			attrs: AttributeStore::new(),
			element: RefCell::new(None),
			fields: RefCell::new(Map::new()),
			refs: RefCell::new(IndexMap::new()),
			mixins: RefCell::new(Vec::new()),
			model: RefCell::new(None),
			state: Cell::new(ActivationState::Constructed),
			pending: Cell::new(false),
			selection_scope: RefCell::new(None),
			content: EventChannel::new(),
			activated: EventChannel::new(),
			readiness: EventChannel::new(),
			listeners: RefCell::new(Vec::new()),
		}))
	}

	/// Returns the id.
	pub fn id(&self) -> &str {
		&self.0.id
	}

	/// Returns the type name.
	pub fn type_name(&self) -> &str {
		&self.0.type_name
	}

	/// Returns the tag name.
	pub fn tag_name(&self) -> &str {
		&self.0.tag
	}

	/// Returns the session this control belongs to, if it is still alive.
	pub fn session(&self) -> Option<Session> {
		self.0.session.borrow().upgrade().map(Session::from_inner)
	}

	/// Returns the parent control.
	pub fn parent(&self) -> Option<Control> {
		self.0.parent.borrow().upgrade().map(Control)
	}

	/// Returns the ordered child sequence.
	pub fn children(&self) -> Vec<Child> {
		self.0.children.borrow().clone()
	}

	/// Returns the child controls, skipping text leaves.
	pub fn child_controls(&self) -> Vec<Control> {
		self.0
			.children
			.borrow()
			.iter()
			.filter_map(|c| c.as_control().cloned())
			.collect()
	}

	/// Returns the concatenated text of the subtree.
	pub fn text_content(&self) -> String {
		self.children().iter().map(Child::text_content).collect()
	}

	/// Returns whether `other` is a strict ancestor of this control.
	pub fn has_ancestor(&self, other: &Control) -> bool {
		let mut current = self.parent();
		while let Some(control) = current {
			if &control == other {
				return true;
			}
			current = control.parent();
		}
		false
	}

	/// Appends children and raises one `Insert` per appended entry.
	///
	/// Accepts a control, a text leaf, bare text, or a `Vec` of those (added in
	/// order). A control that already has a parent is moved. Nothing is added
	/// if any entry would create a cycle.
	///
	/// # Example
	///
	/// ```ignore
	/// let div = Control::new(&session, "div");
	/// div.add("hello")?;
	/// div.add(vec![Child::from(&icon), Child::from(TextNode::new(" label"))])?;
	/// ```
	pub fn add(&self, children: impl IntoChildren) -> Result<(), CompositionError> {
		let children = children.into_children();
		for child in &children {
			if let Child::Control(control) = child
				&& (control == self || self.has_ancestor(control))
			{
				return Err(CompositionError::Cycle {
					parent: self.id().to_string(),
					child: control.id().to_string(),
				});
			}
		}
		for child in children {
			self.append(child, true);
		}
		Ok(())
	}

	/// Appends a child without raising `Insert`. Used while binding to
	/// existing markup, where the live element already holds the child.
	pub(crate) fn append_silent(&self, child: Child) {
		self.append(child, false);
	}

	fn append(&self, child: Child, notify: bool) {
		if let Child::Control(control) = &child {
			// Re-adding an existing child moves it to the end.
			if let Some(old_parent) = control.parent() {
				let _ = old_parent.remove(control);
			}
			self.adopt_into_session(control);
			*control.0.parent.borrow_mut() = Rc::downgrade(&self.0);
		}
		self.0.children.borrow_mut().push(child.clone());
		if notify {
			self.0.content.emit(&ContentChange::Insert(child));
		}
	}

	fn adopt_into_session(&self, control: &Control) {
		let Some(session) = self.session() else {
			return;
		};
		if control.session().is_none() {
			*control.0.session.borrow_mut() = session.downgrade();
			session.register_control(control);
			for descendant in control.child_controls() {
				control.adopt_into_session(&descendant);
			}
		}
	}

	/// Removes a child (matched by identity) and raises `Remove`.
	pub fn remove(&self, child: impl Into<Child>) -> Result<(), CompositionError> {
		let child = child.into();
		let position = self.0.children.borrow().iter().position(|c| c == &child);
		let Some(position) = position else {
			return Err(CompositionError::NotAChild {
				parent: self.id().to_string(),
				child: describe(&child),
			});
		};
		self.0.children.borrow_mut().remove(position);
		if let Child::Control(control) = &child {
			*control.0.parent.borrow_mut() = Weak::new();
		}
		self.0.content.emit(&ContentChange::Remove(child));
		Ok(())
	}

	/// Removes every child and raises `Clear`.
	pub fn clear(&self) {
		let removed = std::mem::take(&mut *self.0.children.borrow_mut());
		for control in removed.iter().filter_map(Child::as_control) {
			*control.0.parent.borrow_mut() = Weak::new();
		}
		self.0.content.emit(&ContentChange::Clear);
	}

	/// Raises `Resync`, asking the live tree to rebuild from the child sequence.
	pub fn resync(&self) {
		self.0.content.emit(&ContentChange::Resync);
	}

	/// Subscribes to structural changes of the child sequence.
	pub fn subscribe_content<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&ContentChange) + 'static,
	{
		self.0.content.subscribe(listener)
	}

	/// Removes a content subscription.
	pub fn unsubscribe_content(&self, subscription: Subscription) -> bool {
		self.0.content.unsubscribe(subscription)
	}

	/// Returns the attribute store.
	pub fn attributes(&self) -> &AttributeStore {
		&self.0.attrs
	}

	/// Returns an attribute.
	pub fn attr(&self, name: &str) -> Option<String> {
		self.0.attrs.get(name)
	}

	/// Sets an attribute.
	pub fn set_attr(&self, name: &str, value: impl Into<String>) {
		self.0.attrs.set(name, value);
	}

	/// Removes an attribute.
	pub fn remove_attr(&self, name: &str) -> bool {
		self.0.attrs.remove(name)
	}

	/// Adds a class. Adding a present class is a silent no-op.
	pub fn add_class(&self, class: &str) -> bool {
		self.0.attrs.add_class(class)
	}

	/// Removes a class.
	pub fn remove_class(&self, class: &str) -> bool {
		self.0.attrs.remove_class(class)
	}

	/// Returns whether the class list holds `class`.
	pub fn has_class(&self, class: &str) -> bool {
		self.0.attrs.has_class(class)
	}

	/// Returns a style value: the live element's if bound, else the declared one.
	pub fn style(&self, key: &str) -> Option<String> {
		self.element()
			.and_then(|el| el.style_property(key))
			.or_else(|| self.0.attrs.style(key))
	}

	/// Sets one style declaration.
	///
	/// Numeric `width`, `height`, `left` and `top` are coerced to pixels.
	pub fn set_style(&self, key: &str, value: impl Into<StyleValue>) {
		self.0.attrs.set_style(key, value);
	}

	/// Sets several style declarations, in order.
	///
	/// # Example
	///
	/// ```ignore
	/// control.style_batch([("left", StyleValue::from(10)), ("color", "red".into())]);
	/// ```
	pub fn style_batch<K, V, I>(&self, declarations: I)
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<StyleValue>,
	{
		for (key, value) in declarations {
			self.0.attrs.set_style(key, value);
		}
	}

	/// Stores a persisted plain-data field.
	pub fn set_field(&self, name: impl Into<String>, value: impl Into<Value>) {
		self.0.fields.borrow_mut().insert(name.into(), value.into());
	}

	/// Reads a persisted field as `T`. Returns `None` if absent or of another shape.
	pub fn field<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
		let value = self.0.fields.borrow().get(name).cloned()?;
		serde_json::from_value(value).ok()
	}

	/// Returns every persisted field.
	pub fn fields(&self) -> Map<String, Value> {
		self.0.fields.borrow().clone()
	}

	/// Points the named property at another control, by id.
	pub fn set_reference(&self, name: impl Into<String>, target: &Control) {
		self.0
			.refs
			.borrow_mut()
			.insert(name.into(), target.id().to_string());
	}

	/// Resolves a named reference through the session's id index.
	pub fn reference(&self, name: &str) -> Option<Control> {
		let id = self.0.refs.borrow().get(name).cloned()?;
		self.session()?.control(&id)
	}

	/// Returns the reference map (property name to control id).
	pub fn references(&self) -> IndexMap<String, String> {
		self.0.refs.borrow().clone()
	}

	/// Records a behavior descriptor and runs the registered mixin, if any.
	///
	/// Returns whether a registered function was invoked.
	pub fn apply_mixin(&self, name: &str, options: Value) -> bool {
		let descriptor = MixinDescriptor::new(name, options);
		self.0.mixins.borrow_mut().push(descriptor.clone());
		self.invoke_mixin(&descriptor)
	}

	pub(crate) fn invoke_mixin(&self, descriptor: &MixinDescriptor) -> bool {
		let Some(mixin) = self
			.session()
			.and_then(|session| session.mixins().get(&descriptor.name))
		else {
			return false;
		};
		mixin(self, &descriptor.options);
		true
	}

	/// Returns the recorded behavior descriptors, in application order.
	pub fn mixins(&self) -> Vec<MixinDescriptor> {
		self.0.mixins.borrow().clone()
	}

	/// Binds the view to a shared data object.
	pub fn bind_model(&self, model: &DataObject) {
		*self.0.model.borrow_mut() = Some(model.clone());
	}

	/// Returns the bound data object.
	pub fn model(&self) -> Option<DataObject> {
		self.0.model.borrow().clone()
	}

	/// Returns the live element, once bound.
	pub fn element(&self) -> Option<Element> {
		self.0.element.borrow().clone()
	}

	/// Assigns the live element this control should bind to.
	///
	/// The session's id-to-element cache is updated as well.
	pub fn set_element(&self, element: &Element) {
		*self.0.element.borrow_mut() = Some(element.clone());
		if let Some(session) = self.session() {
			session.register_element(self.id(), element);
		}
	}

	/// Returns the activation state.
	pub fn state(&self) -> ActivationState {
		self.0.state.get()
	}

	/// Returns whether activation has completed.
	pub fn is_active(&self) -> bool {
		self.state() == ActivationState::Active
	}

	/// Returns whether the type name is rendered into markup.
	pub fn has_explicit_type(&self) -> bool {
		self.0.type_name != IMPLICIT_TYPE
	}

	pub(crate) fn downgrade(&self) -> Weak<ControlInner> {
		Rc::downgrade(&self.0)
	}
}

fn describe(child: &Child) -> String {
	match child {
		Child::Control(control) => control.id().to_string(),
		Child::Text(text) => format!("text {:?}", TextNode::text(text)),
	}
}

impl PartialEq for Control {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl Eq for Control {}

impl fmt::Debug for Control {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Control")
			.field("id", &self.0.id)
			.field("type_name", &self.0.type_name)
			.field("tag", &self.0.tag)
			.field("children", &self.0.children.borrow().len())
			.field("state", &self.0.state.get())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn session() -> Session {
		Session::new()
	}

	#[rstest]
	fn test_ids_come_from_session(session: Session) {
		let a = Control::typed(&session, "window", "div");
		let b = Control::typed(&session, "window", "div");
		let c = Control::new(&session, "span");
		assert_eq!(a.id(), "window_0");
		assert_eq!(b.id(), "window_1");
		assert_eq!(c.id(), "control_0");
		assert_eq!(session.control("window_1"), Some(b));
	}

	#[rstest]
	fn test_add_sets_parent_and_raises_insert(session: Session) {
		let parent = Control::new(&session, "div");
		let child = Control::new(&session, "span");
		let inserted = Rc::new(RefCell::new(Vec::new()));
		let log = Rc::clone(&inserted);
		parent.subscribe_content(move |change| log.borrow_mut().push(change.clone()));

		parent.add(&child).unwrap();
		parent.add("text").unwrap();

		assert_eq!(child.parent(), Some(parent.clone()));
		assert_eq!(inserted.borrow().len(), 2);
		assert_eq!(inserted.borrow()[0], ContentChange::Insert(Child::from(&child)));
		assert_eq!(parent.text_content(), "text");
	}

	#[rstest]
	fn test_add_rejects_cycles(session: Session) {
		let a = Control::new(&session, "div");
		let b = Control::new(&session, "div");
		a.add(&b).unwrap();

		assert!(matches!(a.add(&a), Err(CompositionError::Cycle { .. })));
		assert!(matches!(b.add(&a), Err(CompositionError::Cycle { .. })));
		assert_eq!(b.children().len(), 0);
	}

	#[rstest]
	fn test_add_moves_child_between_parents(session: Session) {
		let first = Control::new(&session, "div");
		let second = Control::new(&session, "div");
		let child = Control::new(&session, "span");
		first.add(&child).unwrap();

		second.add(&child).unwrap();

		assert!(first.children().is_empty());
		assert_eq!(child.parent(), Some(second));
	}

	#[rstest]
	fn test_detached_control_joins_parent_session(session: Session) {
		let parent = Control::new(&session, "div");
		let loose = Control::detached("badge_7", "badge", "span");
		let inner = Control::detached("badge_8", "badge", "b");
		loose.add(&inner).unwrap();

		parent.add(&loose).unwrap();

		assert_eq!(session.control("badge_7"), Some(loose.clone()));
		assert_eq!(session.control("badge_8"), Some(inner));
		assert!(loose.session().is_some());
	}

	#[rstest]
	fn test_remove_and_clear(session: Session) {
		let parent = Control::new(&session, "ul");
		let a = Control::new(&session, "li");
		let b = Control::new(&session, "li");
		parent.add(vec![&a, &b]).unwrap();

		parent.remove(&a).unwrap();
		assert_eq!(parent.child_controls(), vec![b.clone()]);
		assert!(a.parent().is_none());
		assert!(matches!(parent.remove(&a), Err(CompositionError::NotAChild { .. })));

		parent.clear();
		assert!(parent.children().is_empty());
		assert!(b.parent().is_none());
	}

	#[rstest]
	fn test_fields_and_references(session: Session) {
		let owner = Control::typed(&session, "menu", "div");
		let target = Control::typed(&session, "popup", "div");
		owner.set_field("expanded", true);
		owner.set_field("label", "File");
		owner.set_reference("popup", &target);

		assert_eq!(owner.field::<bool>("expanded"), Some(true));
		assert_eq!(owner.field::<String>("label").as_deref(), Some("File"));
		assert_eq!(owner.field::<u32>("label"), None);
		assert_eq!(owner.reference("popup"), Some(target));
		assert_eq!(owner.reference("missing"), None);
	}

	#[rstest]
	fn test_style_batch_coerces_pixels(session: Session) {
		let control = Control::new(&session, "div");
		control.style_batch([("left", StyleValue::from(10)), ("color", StyleValue::from("red"))]);

		assert_eq!(control.style("left").as_deref(), Some("10px"));
		assert_eq!(control.style("color").as_deref(), Some("red"));
	}
}
