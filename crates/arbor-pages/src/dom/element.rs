//! Element and text handles.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::parser::{escape_attr, escape_text};

/// Returns whether `tag` is an HTML void element (no closing tag).
pub fn is_void_tag(tag: &str) -> bool {
	matches!(
		tag,
		"area"
			| "base" | "br"
			| "col" | "embed"
			| "hr" | "img"
			| "input" | "link"
			| "meta" | "source"
			| "track" | "wbr"
	)
}

/// Markup namespace of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Namespace {
	/// Plain HTML.
	#[default]
	Html,
	/// SVG content.
	Svg,
	/// MathML content.
	MathMl,
}

impl Namespace {
	/// Maps a namespace URL to a [`Namespace`].
	pub fn from_url(url: &str) -> Self {
		match url {
			"http://www.w3.org/2000/svg" => Self::Svg,
			"http://www.w3.org/1998/Math/MathML" => Self::MathMl,
			_ => Self::Html,
		}
	}
}

type ElementRc = Rc<RefCell<ElementData>>;
type ElementWeak = Weak<RefCell<ElementData>>;

struct ElementData {
	tag: String,
	namespace: Namespace,
	attributes: IndexMap<String, String>,
	style: IndexMap<String, String>,
	children: Vec<DomNode>,
	parent: ElementWeak,
}

struct TextData {
	data: String,
	parent: ElementWeak,
}

/// Handle to a live element.
#[derive(Clone)]
pub struct Element(ElementRc);

/// Handle to a live text node.
#[derive(Clone)]
pub struct Text(Rc<RefCell<TextData>>);

/// A live child node: an element or a text node.
#[derive(Clone, Debug, PartialEq)]
pub enum DomNode {
	/// An element.
	Element(Element),
	/// A text node.
	Text(Text),
}

impl DomNode {
	/// Returns the element, if this node is one.
	pub fn as_element(&self) -> Option<&Element> {
		match self {
			Self::Element(el) => Some(el),
			Self::Text(_) => None,
		}
	}

	/// Returns the text node, if this node is one.
	pub fn as_text(&self) -> Option<&Text> {
		match self {
			Self::Text(text) => Some(text),
			Self::Element(_) => None,
		}
	}

	/// Removes the node from its live parent, if it has one.
	pub fn detach(&self) {
		match self {
			Self::Element(el) => el.detach(),
			Self::Text(text) => text.detach(),
		}
	}

	fn parent_weak(&self) -> ElementWeak {
		match self {
			Self::Element(el) => el.0.borrow().parent.clone(),
			Self::Text(text) => text.0.borrow().parent.clone(),
		}
	}

	fn set_parent(&self, parent: ElementWeak) {
		match self {
			Self::Element(el) => el.0.borrow_mut().parent = parent,
			Self::Text(text) => text.0.borrow_mut().parent = parent,
		}
	}

	fn write_html(&self, out: &mut String) {
		match self {
			Self::Element(el) => el.write_html(out),
			Self::Text(text) => out.push_str(&escape_text(&text.data())),
		}
	}

	fn same_node(&self, other: &DomNode) -> bool {
		self == other
	}
}

impl From<Element> for DomNode {
	fn from(el: Element) -> Self {
		Self::Element(el)
	}
}

impl From<Text> for DomNode {
	fn from(text: Text) -> Self {
		Self::Text(text)
	}
}

impl Element {
	/// Creates a detached HTML element.
	pub fn new(tag: impl Into<String>) -> Self {
		Self::with_namespace(tag, Namespace::Html)
	}

	/// Creates a detached element in the given namespace.
	pub fn with_namespace(tag: impl Into<String>, namespace: Namespace) -> Self {
		Self(Rc::new(RefCell::new(ElementData {
			tag: tag.into(),
			namespace,
			attributes: IndexMap::new(),
			style: IndexMap::new(),
			children: Vec::new(),
			parent: Weak::new(),
		})))
	}

	/// Returns the tag name.
	pub fn tag_name(&self) -> String {
		self.0.borrow().tag.clone()
	}

	/// Returns the namespace.
	pub fn namespace(&self) -> Namespace {
		self.0.borrow().namespace
	}

	/// Returns the `id` attribute.
	pub fn id(&self) -> Option<String> {
		self.get_attribute("id")
	}

	/// Returns an attribute value.
	pub fn get_attribute(&self, name: &str) -> Option<String> {
		self.0.borrow().attributes.get(name).cloned()
	}

	/// Returns whether the attribute is present.
	pub fn has_attribute(&self, name: &str) -> bool {
		self.0.borrow().attributes.contains_key(name)
	}

	/// Returns all attributes in document order.
	pub fn attributes(&self) -> Vec<(String, String)> {
		self.0
			.borrow()
			.attributes
			.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect()
	}

	/// Returns attribute names in document order.
	pub fn attribute_names(&self) -> Vec<String> {
		self.0.borrow().attributes.keys().cloned().collect()
	}

	/// Sets an attribute. Setting `style` replaces the style declarations.
	pub fn set_attribute(&self, name: &str, value: &str) {
		let mut data = self.0.borrow_mut();
		if name == "style" {
			data.style = parse_style(value);
			data.sync_style_attribute();
		} else {
			data.attributes.insert(name.to_string(), value.to_string());
		}
	}

	/// Removes an attribute.
	pub fn remove_attribute(&self, name: &str) {
		let mut data = self.0.borrow_mut();
		if name == "style" {
			data.style.clear();
		}
		data.attributes.shift_remove(name);
	}

	/// Returns a single style declaration.
	pub fn style_property(&self, key: &str) -> Option<String> {
		self.0.borrow().style.get(key).cloned()
	}

	/// Sets a single style declaration, leaving the others untouched.
	pub fn set_style_property(&self, key: &str, value: &str) {
		let mut data = self.0.borrow_mut();
		data.style.insert(key.to_string(), value.to_string());
		data.sync_style_attribute();
	}

	/// Removes a single style declaration.
	pub fn remove_style_property(&self, key: &str) {
		let mut data = self.0.borrow_mut();
		data.style.shift_remove(key);
		data.sync_style_attribute();
	}

	/// Returns every style declaration in order.
	pub fn style_declarations(&self) -> Vec<(String, String)> {
		self.0
			.borrow()
			.style
			.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect()
	}

	/// Returns the live parent element.
	pub fn parent(&self) -> Option<Element> {
		self.0.borrow().parent.upgrade().map(Element)
	}

	/// Returns all child nodes.
	pub fn child_nodes(&self) -> Vec<DomNode> {
		self.0.borrow().children.clone()
	}

	/// Returns element children only.
	pub fn children(&self) -> Vec<Element> {
		self.0
			.borrow()
			.children
			.iter()
			.filter_map(|node| node.as_element().cloned())
			.collect()
	}

	/// Returns the number of child nodes.
	pub fn child_count(&self) -> usize {
		self.0.borrow().children.len()
	}

	/// Appends a node as the last child, moving it out of any previous parent.
	pub fn append_child(&self, node: impl Into<DomNode>) {
		let node = node.into();
		node.detach();
		node.set_parent(Rc::downgrade(&self.0));
		self.0.borrow_mut().children.push(node);
	}

	/// Removes `node` if it is a child of this element. Returns whether it was.
	pub fn remove_child(&self, node: &DomNode) -> bool {
		let removed = {
			let mut data = self.0.borrow_mut();
			let before = data.children.len();
			data.children.retain(|child| !child.same_node(node));
			before != data.children.len()
		};
		if removed {
			node.set_parent(Weak::new());
		}
		removed
	}

	/// Removes every child node.
	pub fn clear_children(&self) {
		let children = std::mem::take(&mut self.0.borrow_mut().children);
		for child in children {
			child.set_parent(Weak::new());
		}
	}

	/// Removes this element from its live parent.
	pub fn detach(&self) {
		if let Some(parent) = self.parent() {
			parent.remove_child(&DomNode::Element(self.clone()));
		}
	}

	/// Returns the concatenated text of every descendant text node.
	pub fn text_content(&self) -> String {
		let mut out = String::new();
		for child in self.child_nodes() {
			match child {
				DomNode::Text(text) => out.push_str(&text.data()),
				DomNode::Element(el) => out.push_str(&el.text_content()),
			}
		}
		out
	}

	/// Finds the first descendant (or self) whose `id` matches.
	pub fn find_by_id(&self, id: &str) -> Option<Element> {
		if self.get_attribute("id").as_deref() == Some(id) {
			return Some(self.clone());
		}
		self.children().iter().find_map(|child| child.find_by_id(id))
	}

	/// Finds the first descendant (or self) with the given tag name.
	pub fn find_by_tag(&self, tag: &str) -> Option<Element> {
		if self.0.borrow().tag.eq_ignore_ascii_case(tag) {
			return Some(self.clone());
		}
		self.children().iter().find_map(|child| child.find_by_tag(tag))
	}

	/// Serializes the element and its subtree.
	pub fn outer_html(&self) -> String {
		let mut out = String::new();
		self.write_html(&mut out);
		out
	}

	/// Serializes the element's children.
	pub fn inner_html(&self) -> String {
		let mut out = String::new();
		for child in self.child_nodes() {
			child.write_html(&mut out);
		}
		out
	}

	fn write_html(&self, out: &mut String) {
		let data = self.0.borrow();
		out.push('<');
		out.push_str(&data.tag);
		for (name, value) in &data.attributes {
			out.push(' ');
			out.push_str(name);
			out.push_str("=\"");
			out.push_str(&escape_attr(value));
			out.push('"');
		}
		if is_void_tag(&data.tag) && data.children.is_empty() {
			out.push('>');
			return;
		}
		out.push('>');
		for child in &data.children {
			child.write_html(out);
		}
		out.push_str("</");
		out.push_str(&data.tag);
		out.push('>');
	}
}

impl ElementData {
	fn sync_style_attribute(&mut self) {
		if self.style.is_empty() {
			self.attributes.shift_remove("style");
		} else {
			let flat = flatten_style(self.style.iter());
			self.attributes.insert("style".to_string(), flat);
		}
	}
}

impl PartialEq for Element {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let data = self.0.borrow();
		f.debug_struct("Element")
			.field("tag", &data.tag)
			.field("attributes", &data.attributes)
			.field("children", &data.children.len())
			.finish()
	}
}

impl Text {
	/// Creates a detached text node.
	pub fn new(data: impl Into<String>) -> Self {
		Self(Rc::new(RefCell::new(TextData {
			data: data.into(),
			parent: Weak::new(),
		})))
	}

	/// Returns the text.
	pub fn data(&self) -> String {
		self.0.borrow().data.clone()
	}

	/// Replaces the text.
	pub fn set_data(&self, data: impl Into<String>) {
		self.0.borrow_mut().data = data.into();
	}

	/// Returns the live parent element.
	pub fn parent(&self) -> Option<Element> {
		self.0.borrow().parent.upgrade().map(Element)
	}

	/// Removes this text node from its live parent.
	pub fn detach(&self) {
		if let Some(parent) = self.parent() {
			parent.remove_child(&DomNode::Text(self.clone()));
		}
	}
}

impl PartialEq for Text {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for Text {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Text").field(&self.0.borrow().data).finish()
	}
}

/// Parses a `key:value;` declaration list.
pub(crate) fn parse_style(source: &str) -> IndexMap<String, String> {
	source
		.split(';')
		.filter_map(|decl| {
			let (key, value) = decl.split_once(':')?;
			let key = key.trim();
			let value = value.trim();
			(!key.is_empty()).then(|| (key.to_string(), value.to_string()))
		})
		.collect()
}

/// Flattens declarations into `key:value;` form.
pub(crate) fn flatten_style<'a>(decls: impl Iterator<Item = (&'a String, &'a String)>) -> String {
	decls.map(|(k, v)| format!("{}:{};", k, v)).collect()
}

/// Flattens owned declaration pairs into `key:value;` form.
pub(crate) fn flatten_style_pairs(pairs: &[(String, String)]) -> String {
	flatten_style(pairs.iter().map(|(k, v)| (k, v)))
}
