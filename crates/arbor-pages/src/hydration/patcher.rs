//! Incremental patcher.
//!
//! Installed as a content-change listener during pre-activation. It mutates
//! the live element tree directly from structural notifications; there is no
//! diffing. A missing live parent is a silent no-op, and an item that cannot
//! be turned into a live node is traced and skipped so that it never blocks
//! its siblings.

use crate::component::{Child, ContentChange, Control};
use crate::dom::{Document, DomNode, Element};
use crate::{debug_log, error_log};

/// Applies one structural change to `parent`'s live element.
pub(crate) fn apply(parent: &Control, change: &ContentChange) {
	let Some(live) = parent.element() else {
		return;
	};
	match change {
		ContentChange::Insert(child) => insert(parent, &live, child),
		ContentChange::Remove(child) => child.detach_live(),
		ContentChange::Clear => live.clear_children(),
		ContentChange::Resync => {
			debug_log!("resyncing live content of {}", parent.id());
			live.clear_children();
			for child in parent.children() {
				insert(parent, &live, &child);
			}
		}
	}
}

fn insert(parent: &Control, live: &Element, child: &Child) {
	match child {
		Child::Text(text) => {
			let node = text.live().unwrap_or_else(|| {
				let created = crate::dom::Text::new(text.text());
				text.bind_live(created.clone());
				created
			});
			live.append_child(node);
		}
		Child::Control(control) => {
			let Some(element) = materialize(control) else {
				error_log!(
					"could not build a live element for {} under {}",
					control.id(),
					parent.id()
				);
				return;
			};
			live.append_child(element.clone());
			if let Some(session) = parent.session() {
				session.register_control(control);
				session.register_element(control.id(), &element);
			}
			*control.0.element.borrow_mut() = Some(element);
			let hydrate = parent
				.session()
				.is_none_or(|session| session.options().hydrate_on_insert);
			if parent.is_active() && hydrate {
				control.activate();
			}
		}
	}
}

/// Obtains a live element for a control: its own element, the session's
/// cached element for its id, a wrapped parse for tags that only exist
/// inside a specific parent, or a parse of its rendered markup.
pub(crate) fn materialize(control: &Control) -> Option<Element> {
	if let Some(element) = control.element() {
		return Some(element);
	}
	if let Some(element) = control.session().and_then(|s| s.element(control.id())) {
		return Some(element);
	}
	let document = Document::new();
	let markup = control.render();
	if Document::needs_wrapper(control.tag_name()) {
		return document.parse_namespaced(control.tag_name(), &markup);
	}
	document
		.parse_fragment(&markup)
		.into_iter()
		.find_map(|node| match node {
			DomNode::Element(element) => Some(element),
			DomNode::Text(_) => None,
		})
}
