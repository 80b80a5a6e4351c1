//! The live document.

use super::element::{DomNode, Element, Namespace, Text};
use super::parser;

/// A live document: a container element holding the hydrated markup.
///
/// Cloning yields another handle to the same document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	body: Element,
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl Document {
	/// Creates an empty document.
	pub fn new() -> Self {
		Self {
			body: Element::new("body"),
		}
	}

	/// Creates a document whose body holds the parsed `markup`.
	pub fn from_markup(markup: &str) -> Self {
		let doc = Self::new();
		for node in parser::parse_fragment(markup) {
			doc.body.append_child(node);
		}
		doc
	}

	/// Creates a document from a full page (`<!DOCTYPE html>...`), keeping
	/// only the content of its body.
	pub fn from_page(markup: &str) -> Self {
		let doc = Self::new();
		for node in parser::parse_body(markup) {
			doc.body.append_child(node);
		}
		doc
	}

	/// Returns the body container.
	pub fn body(&self) -> &Element {
		&self.body
	}

	/// Finds an element by its `id` attribute (depth-first, attached nodes only).
	pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
		self.body.find_by_id(id)
	}

	/// Creates a detached element.
	pub fn create_element(&self, tag: &str) -> Element {
		Element::new(tag)
	}

	/// Creates a detached text node.
	pub fn create_text_node(&self, data: &str) -> Text {
		Text::new(data)
	}

	/// Parses `markup` in a detached container and returns its top-level nodes.
	pub fn parse_fragment(&self, markup: &str) -> Vec<DomNode> {
		parser::parse_fragment(markup)
	}

	/// Parses markup for a tag that only exists inside a specific parent
	/// (table parts, `option`, SVG shapes) by wrapping it in a throwaway
	/// fragment, and returns the first element named `tag`.
	///
	/// Returns `None` when `tag` needs no wrapper or nothing matched.
	pub fn parse_namespaced(&self, tag: &str, markup: &str) -> Option<Element> {
		let (open, close) = parser::wrapper_for(&tag.to_ascii_lowercase())?;
		let wrapped = format!("{}{}{}", open, markup, close);
		let found = parser::parse_fragment(&wrapped)
			.iter()
			.filter_map(DomNode::as_element)
			.find_map(|el| el.find_by_tag(tag))?;
		found.detach();
		Some(found)
	}

	/// Returns whether `tag` is parsed through [`Document::parse_namespaced`].
	pub fn needs_wrapper(tag: &str) -> bool {
		parser::wrapper_for(&tag.to_ascii_lowercase()).is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_from_page_keeps_body_only() {
		let doc = Document::from_page(
			"<!DOCTYPE html><html><head><title>t</title></head><body><div id=\"app\">x</div></body></html>",
		);
		assert_eq!(doc.body().inner_html(), "<div id=\"app\">x</div>");
	}

	#[rstest]
	fn test_get_element_by_id() {
		let doc = Document::from_markup("<div id=\"a\"><span id=\"b\">x</span></div>");
		let b = doc.get_element_by_id("b").unwrap();
		assert_eq!(b.tag_name(), "span");
		assert!(doc.get_element_by_id("missing").is_none());
	}

	#[rstest]
	fn test_parse_namespaced_table_row() {
		let doc = Document::new();
		let row = doc
			.parse_namespaced("tr", "<tr id=\"r\"><td>1</td></tr>")
			.unwrap();
		assert_eq!(row.tag_name(), "tr");
		assert_eq!(row.id().as_deref(), Some("r"));
		assert!(row.parent().is_none());
	}

	#[rstest]
	fn test_parse_namespaced_svg() {
		let doc = Document::new();
		let circle = doc
			.parse_namespaced("circle", "<circle r=\"4\"></circle>")
			.unwrap();
		assert_eq!(circle.namespace(), Namespace::Svg);
		assert_eq!(circle.get_attribute("r").as_deref(), Some("4"));
	}

	#[rstest]
	fn test_parse_namespaced_plain_tag() {
		assert!(Document::new().parse_namespaced("div", "<div></div>").is_none());
	}
}
