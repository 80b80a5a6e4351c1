//! Two-phase activation of a control against rendered markup.
//!
//! `pre_activate` binds a control to its live element and restores what the
//! server recorded: raw attributes, behavior descriptors, persisted fields,
//! the shared model and cross-references. It then matches the element's
//! immediate children to the child sequence and installs the listeners that
//! keep the live element in sync. `activate` finishes the job recursively.
//!
//! A parent must be pre-activated before any of its children; the
//! [`Hydrator`](super::Hydrator) walks the tree parent first.

use std::future::Future;

use futures::channel::oneshot;

use super::patcher;
use crate::component::{Child, Control, DataObject, Subscription, TextNode, apply_to_element};
use crate::dom::{DomNode, Element};
use crate::error::HydrationError;
use crate::ssr::markers::{self, ATTR_ID, ATTR_MIXINS, ATTR_MODEL};
use crate::{debug_log, warn_log};

/// Where a control stands in the activation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActivationState {
	/// Constructed, not yet bound to a live element.
	#[default]
	Constructed,
	/// Bound to its element; state and behavior restored.
	Bound,
	/// Activation complete. Terminal.
	Active,
	/// No backing element was found. Not an error; activation retries the
	/// lookup.
	Dormant,
}

impl Control {
	/// Binds this control to its rendered element and restores its state.
	///
	/// Returns the resulting state; `Dormant` when no element could be found.
	/// Calling it on a bound or active control does nothing.
	pub fn pre_activate(&self) -> ActivationState {
		let mut diagnostics = Vec::new();
		self.pre_activate_with(&mut diagnostics)
	}

	pub(crate) fn pre_activate_with(&self, diagnostics: &mut Vec<HydrationError>) -> ActivationState {
		if matches!(self.state(), ActivationState::Bound | ActivationState::Active) {
			return self.state();
		}
		let Some(element) = self.resolve_element() else {
			debug_log!("control {} stays dormant", self.id());
			diagnostics.push(HydrationError::ElementNotFound(self.id().to_string()));
			self.0.state.set(ActivationState::Dormant);
			return ActivationState::Dormant;
		};

		self.restore_attributes(&element);
		self.replay_mixins(&element, diagnostics);
		self.restore_fields(&element, diagnostics);
		self.restore_model(&element);
		self.restore_references(&element, diagnostics);
		self.bind_children(&element, diagnostics);
		self.install_listeners();

		self.0.state.set(ActivationState::Bound);
		ActivationState::Bound
	}

	/// Completes activation: recursively activates children that have a bound
	/// element, marks this control active and raises the activation event.
	///
	/// Idempotent. A control whose element still cannot be found stays dormant.
	pub fn activate(&self) -> ActivationState {
		let mut diagnostics = Vec::new();
		self.activate_with(&mut diagnostics)
	}

	pub(crate) fn activate_with(&self, diagnostics: &mut Vec<HydrationError>) -> ActivationState {
		match self.state() {
			ActivationState::Active => return ActivationState::Active,
			ActivationState::Constructed | ActivationState::Dormant => {
				if self.pre_activate_with(diagnostics) == ActivationState::Dormant {
					return ActivationState::Dormant;
				}
			}
			ActivationState::Bound => {}
		}
		for child in self.child_controls() {
			if child.element().is_some() {
				child.activate_with(diagnostics);
			}
		}
		self.0.state.set(ActivationState::Active);
		self.0.activated.emit(&());
		ActivationState::Active
	}

	/// Runs `callback` once this control is active; immediately if it already is.
	///
	/// Returns the one-shot subscription when the callback was deferred.
	pub fn once_active<F>(&self, callback: F) -> Option<Subscription>
	where
		F: FnOnce(&Control) + 'static,
	{
		if self.is_active() {
			callback(self);
			return None;
		}
		let weak = self.downgrade();
		Some(self.0.activated.subscribe_once(move |_| {
			if let Some(inner) = weak.upgrade() {
				callback(&Control(inner));
			}
		}))
	}

	/// Resolves once this control is active.
	///
	/// # Example
	///
	/// ```ignore
	/// let ready = control.activation();
	/// hydrator.hydrate_root("app")?;
	/// block_on(ready);
	/// ```
	pub fn activation(&self) -> impl Future<Output = ()> + 'static {
		let (tx, rx) = oneshot::channel();
		self.once_active(move |_| {
			let _ = tx.send(());
		});
		async move {
			let _ = rx.await;
		}
	}

	/// Finds the live element: the assigned handle, then the session cache,
	/// then the session's document by id. Binds it when found.
	pub(crate) fn resolve_element(&self) -> Option<Element> {
		if let Some(element) = self.element() {
			return Some(element);
		}
		let session = self.session()?;
		let element = session
			.element(self.id())
			.or_else(|| session.document()?.get_element_by_id(self.id()))?;
		self.set_element(&element);
		Some(element)
	}

	fn restore_attributes(&self, element: &Element) {
		let attrs = &self.0.attrs;
		for (name, value) in element.attributes() {
			match name.as_str() {
				ATTR_ID => {}
				"style" => {
					for (key, value) in element.style_declarations() {
						attrs.set_style_silent(key, value);
					}
				}
				"class" => {
					for class in value.split_whitespace() {
						attrs.add_class_silent(class);
					}
				}
				name if markers::is_protocol(name) => {}
				_ => attrs.set_silent(name, value),
			}
		}
	}

	fn replay_mixins(&self, element: &Element, diagnostics: &mut Vec<HydrationError>) {
		let Some(raw) = element.get_attribute(ATTR_MIXINS) else {
			return;
		};
		let descriptors = match markers::decode_mixins(self.id(), &raw) {
			Ok(descriptors) => descriptors,
			Err(err) => {
				warn_log!("{}", err);
				diagnostics.push(err);
				return;
			}
		};
		for descriptor in descriptors {
			if self.0.mixins.borrow().contains(&descriptor) {
				continue;
			}
			self.0.mixins.borrow_mut().push(descriptor.clone());
			if !self.invoke_mixin(&descriptor) {
				let err = HydrationError::UnknownMixin {
					id: self.id().to_string(),
					key: descriptor.key(),
				};
				warn_log!("{}", err);
				diagnostics.push(err);
			}
		}
	}

	fn restore_fields(&self, element: &Element, diagnostics: &mut Vec<HydrationError>) {
		let Some(raw) = element.get_attribute(markers::ATTR_FIELDS) else {
			return;
		};
		match markers::decode_fields(self.id(), &raw) {
			Ok(fields) => self.0.fields.borrow_mut().extend(fields),
			Err(err) => {
				warn_log!("{}", err);
				diagnostics.push(err);
			}
		}
	}

	fn restore_model(&self, element: &Element) {
		let (Some(model_id), Some(session)) = (element.get_attribute(ATTR_MODEL), self.session())
		else {
			return;
		};
		let model = session.data_object(&model_id).unwrap_or_else(|| {
			let created = DataObject::new(model_id.clone());
			session.register_data_object(&created);
			created
		});
		self.bind_model(&model);
	}

	fn restore_references(&self, element: &Element, diagnostics: &mut Vec<HydrationError>) {
		let Some(raw) = element.get_attribute(markers::ATTR_REFS) else {
			return;
		};
		match markers::decode_refs(self.id(), &raw) {
			Ok(refs) => self.0.refs.borrow_mut().extend(refs),
			Err(err) => {
				warn_log!("{}", err);
				diagnostics.push(err);
			}
		}
	}

	/// Matches the element's immediate children to the child sequence.
	///
	/// Element children resolve through the reference map, then the known
	/// children by id, then the session registry by id, then positionally (the
	/// next unbound child control with the same tag). Text children bind to
	/// the text leaf expected at the cursor. Anything else is traced.
	fn bind_children(&self, element: &Element, diagnostics: &mut Vec<HydrationError>) {
		let expected = self.children();
		let mut matched = vec![false; expected.len()];
		let mut cursor = 0;

		for (index, node) in element.child_nodes().into_iter().enumerate() {
			match node {
				DomNode::Element(child_el) => {
					match self.match_element(&child_el, &expected, &matched, cursor) {
						Some(position) => {
							if let Child::Control(control) = &expected[position] {
								control.set_element(&child_el);
							}
							matched[position] = true;
							cursor = position + 1;
						}
						None => {
							if let Some(control) = self.match_registered(&child_el) {
								control.set_element(&child_el);
								continue;
							}
							let err = HydrationError::UnmatchedStructure {
								id: self.id().to_string(),
								kind: "element",
								index,
							};
							warn_log!("{}", err);
							diagnostics.push(err);
						}
					}
				}
				DomNode::Text(text) => {
					if let Some(Child::Text(leaf)) = expected.get(cursor)
						&& !matched[cursor]
					{
						leaf.bind_live(text);
						matched[cursor] = true;
						cursor += 1;
						continue;
					}
					if text.data().trim().is_empty() {
						continue;
					}
					let err = HydrationError::UnmatchedStructure {
						id: self.id().to_string(),
						kind: "text",
						index,
					};
					warn_log!("{}", err);
					diagnostics.push(err);
				}
			}
		}
	}

	fn match_element(
		&self,
		element: &Element,
		expected: &[Child],
		matched: &[bool],
		cursor: usize,
	) -> Option<usize> {
		let unmatched_control =
			|position: usize| (!matched[position]).then(|| expected[position].as_control()).flatten();
		if let Some(id) = element.id() {
			let referenced = self.0.refs.borrow().values().any(|target| target == &id);
			if referenced
				&& let Some(target) = self.session().and_then(|s| s.control(&id))
				&& let Some(position) =
					(0..expected.len()).find(|&p| unmatched_control(p) == Some(&target))
			{
				return Some(position);
			}
			if let Some(position) =
				(0..expected.len()).find(|&p| unmatched_control(p).is_some_and(|c| c.id() == id))
			{
				return Some(position);
			}
			if self.session().is_some_and(|s| s.control(&id).is_some()) {
				return None;
			}
		}
		let tag = element.tag_name();
		(cursor..expected.len()).find(|&p| {
			unmatched_control(p).is_some_and(|c| c.element().is_none() && c.tag_name() == tag)
		})
	}

	/// A control known to the session but not to this parent's sequence,
	/// such as one only reachable through a cross-reference.
	fn match_registered(&self, element: &Element) -> Option<Control> {
		let id = element.id()?;
		let control = self.session()?.control(&id)?;
		(control != *self && control.element().is_none()).then_some(control)
	}

	fn install_listeners(&self) {
		if !self.0.listeners.borrow().is_empty() {
			return;
		}
		let weak = self.downgrade();
		let attrs = self.0.attrs.subscribe(move |change| {
			if let Some(element) = weak.upgrade().and_then(|inner| Control(inner).element()) {
				apply_to_element(&element, change);
			}
		});
		let weak = self.downgrade();
		let content = self.subscribe_content(move |change| {
			if let Some(inner) = weak.upgrade() {
				patcher::apply(&Control(inner), change);
			}
		});
		self.0.listeners.borrow_mut().extend([attrs, content]);
	}
}

/// Builds text leaves for a live text node, for callers that reconstruct a
/// child sequence from markup.
pub(crate) fn text_leaf_for(text: &crate::dom::Text) -> TextNode {
	let leaf = TextNode::new(text.data());
	leaf.bind_live(text.clone());
	leaf
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::Document;
	use crate::session::Session;
	use rstest::rstest;
	use serde_json::json;
	use std::cell::Cell;
	use std::rc::Rc;

	fn client(markup: &str) -> (Session, Document) {
		let session = Session::new();
		let document = Document::from_markup(markup);
		session.attach_document(&document);
		(session, document)
	}

	#[rstest]
	fn test_missing_element_is_dormant() {
		let (session, _) = client("<div id=\"other\"></div>");
		let control = Control::adopt(&session, "panel_0", "panel", "div");

		assert_eq!(control.pre_activate(), ActivationState::Dormant);
		assert_eq!(control.activate(), ActivationState::Dormant);
		assert!(!control.is_active());
	}

	#[rstest]
	fn test_pre_activate_restores_state() {
		let (session, _) = client(concat!(
			r#"<div id="menu_0" data-ah-type="menu" role="menu" class="open wide" "#,
			r#"style="left:10px;color:red;" data-ah-model="model_3" "#,
			r#"data-ah-fields="{&quot;depth&quot;:2}" "#,
			r#"data-ah-refs="{&quot;popup&quot;:&quot;popup_0&quot;}"></div>"#,
		));
		let popup = Control::adopt(&session, "popup_0", "popup", "div");
		let menu = Control::adopt(&session, "menu_0", "menu", "div");
		menu.add_class("open");

		assert_eq!(menu.pre_activate(), ActivationState::Bound);

		assert_eq!(menu.attr("role").as_deref(), Some("menu"));
		assert_eq!(menu.attr("class").as_deref(), Some("open wide"));
		assert_eq!(menu.style("left").as_deref(), Some("10px"));
		assert_eq!(menu.field::<u32>("depth"), Some(2));
		assert_eq!(menu.reference("popup"), Some(popup));
		assert_eq!(menu.model().map(|m| m.id().to_string()).as_deref(), Some("model_3"));
		assert!(session.data_object("model_3").is_some());
	}

	#[rstest]
	fn test_shared_model_is_rebound() {
		let (session, _) = client(concat!(
			r#"<span id="a" data-ah-model="model_0"></span>"#,
			r#"<span id="b" data-ah-model="model_0"></span>"#,
		));
		let a = Control::adopt(&session, "a", "control", "span");
		let b = Control::adopt(&session, "b", "control", "span");
		a.pre_activate();
		b.pre_activate();

		a.model().unwrap().set("count", 5);

		assert_eq!(b.model().unwrap().get("count"), Some(json!(5)));
		assert_eq!(a.model(), b.model());
	}

	#[rstest]
	fn test_malformed_fields_are_skipped() {
		let (session, _) = client(r#"<div id="x_0" data-ah-fields="{oops" data-ah-refs="[]"></div>"#);
		let control = Control::adopt(&session, "x_0", "x", "div");
		let mut diagnostics = Vec::new();

		assert_eq!(control.pre_activate_with(&mut diagnostics), ActivationState::Bound);

		assert_eq!(diagnostics.len(), 2);
		assert!(control.fields().is_empty());
	}

	#[rstest]
	fn test_mixin_replayed_once_with_options() {
		let (session, _) = client(
			r#"<div id="w_0" data-ah-mixins="[{&quot;name&quot;:&quot;Drag-Handle&quot;,&quot;options&quot;:{&quot;axis&quot;:&quot;x&quot;}}]"></div>"#,
		);
		let calls = Rc::new(Cell::new(0));
		let seen = Rc::clone(&calls);
		session.mixins().register("drag_handle", move |control, options| {
			assert_eq!(options, &json!({"axis": "x"}));
			control.add_class("draggable");
			seen.set(seen.get() + 1);
		});
		let control = Control::adopt(&session, "w_0", "w", "div");

		control.pre_activate();
		control.activate();
		control.activate();

		assert_eq!(calls.get(), 1);
		assert!(control.has_class("draggable"));
		assert_eq!(control.mixins().len(), 1);
	}

	#[rstest]
	fn test_unknown_mixin_is_recorded_not_fatal() {
		let (session, _) = client(
			r#"<div id="w_0" data-ah-mixins="[{&quot;name&quot;:&quot;ghost&quot;}]"></div>"#,
		);
		let control = Control::adopt(&session, "w_0", "w", "div");
		let mut diagnostics = Vec::new();

		control.pre_activate_with(&mut diagnostics);

		assert_eq!(control.mixins().len(), 1);
		assert!(matches!(diagnostics[0], HydrationError::UnknownMixin { .. }));
	}

	#[rstest]
	fn test_children_matched_by_id_and_text_position() {
		let (session, document) =
			client(r#"<ul id="list_0"><li id="item_1">b</li>Total<li id="item_0">a</li></ul>"#);
		let list = Control::adopt(&session, "list_0", "list", "ul");
		let first = Control::adopt(&session, "item_0", "item", "li");
		let second = Control::adopt(&session, "item_1", "item", "li");
		let total = TextNode::new("Total");
		list.add(vec![Child::from(&second), Child::from(&total), Child::from(&first)])
			.unwrap();

		list.pre_activate();

		assert_eq!(second.element(), document.get_element_by_id("item_1"));
		assert_eq!(first.element(), document.get_element_by_id("item_0"));
		assert_eq!(total.live().map(|t| t.data()).as_deref(), Some("Total"));
	}

	#[rstest]
	fn test_activate_is_idempotent_and_notifies_once() {
		let (session, _) = client(r#"<div id="root"><span id="leaf"></span></div>"#);
		let root = Control::adopt(&session, "root", "control", "div");
		let leaf = Control::adopt(&session, "leaf", "control", "span");
		root.add(&leaf).unwrap();
		let fired = Rc::new(Cell::new(0));
		let counter = Rc::clone(&fired);
		root.once_active(move |_| counter.set(counter.get() + 1));

		assert_eq!(root.activate(), ActivationState::Active);
		assert_eq!(root.activate(), ActivationState::Active);

		assert_eq!(fired.get(), 1);
		assert!(leaf.is_active());
	}

	#[rstest]
	fn test_once_active_runs_immediately_when_active() {
		let (session, _) = client(r#"<div id="root"></div>"#);
		let root = Control::adopt(&session, "root", "control", "div");
		root.activate();
		let fired = Rc::new(Cell::new(false));
		let flag = Rc::clone(&fired);

		assert!(root.once_active(move |_| flag.set(true)).is_none());
		assert!(fired.get());
	}

	#[rstest]
	fn test_activation_future_resolves() {
		let (session, _) = client(r#"<div id="root"></div>"#);
		let root = Control::adopt(&session, "root", "control", "div");
		let activation = root.activation();
		root.activate();
		futures::executor::block_on(activation);
		assert!(root.is_active());
	}
}
