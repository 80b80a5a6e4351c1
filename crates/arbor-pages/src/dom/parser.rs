//! Markup parsing into live handles.
//!
//! Parsing is delegated to `scraper` (html5ever); the resulting tree is copied
//! into [`Element`]/[`Text`] handles. Comments, doctypes and processing
//! instructions are dropped.

use scraper::{ElementRef, Html, Node};

use super::element::{DomNode, Element, Namespace, Text};

/// Parses a markup fragment in a detached container.
pub(super) fn parse_fragment(markup: &str) -> Vec<DomNode> {
	let fragment = Html::parse_fragment(markup);
	convert_children(fragment.root_element())
}

/// Parses a full page and returns the top-level nodes of its body.
pub(super) fn parse_body(markup: &str) -> Vec<DomNode> {
	let page = Html::parse_document(markup);
	page.root_element()
		.children()
		.filter_map(ElementRef::wrap)
		.find(|el| el.value().name() == "body")
		.map(convert_children)
		.unwrap_or_default()
}

/// Tag names whose markup only parses correctly inside a wrapping parent.
pub(super) fn wrapper_for(tag: &str) -> Option<(&'static str, &'static str)> {
	let wrapper = match tag {
		"tr" => ("<table><tbody>", "</tbody></table>"),
		"td" | "th" => ("<table><tbody><tr>", "</tr></tbody></table>"),
		"tbody" | "thead" | "tfoot" | "colgroup" | "caption" => ("<table>", "</table>"),
		"col" => ("<table><colgroup>", "</colgroup></table>"),
		"option" | "optgroup" => ("<select>", "</select>"),
		"circle" | "ellipse" | "g" | "line" | "path" | "polygon" | "polyline" | "rect"
		| "defs" | "use" | "tspan" | "lineargradient" | "radialgradient" | "stop" => {
			("<svg>", "</svg>")
		}
		_ => return None,
	};
	Some(wrapper)
}

fn convert_children(parent: ElementRef<'_>) -> Vec<DomNode> {
	let mut nodes = Vec::new();
	for child in parent.children() {
		match child.value() {
			Node::Text(text) => nodes.push(DomNode::Text(Text::new(&**text))),
			Node::Element(_) => {
				if let Some(el) = ElementRef::wrap(child) {
					nodes.push(DomNode::Element(convert_element(el)));
				}
			}
			_ => {}
		}
	}
	nodes
}

fn convert_element(source: ElementRef<'_>) -> Element {
	let value = source.value();
	let element = Element::with_namespace(value.name(), Namespace::from_url(&value.name.ns));
	for (name, attr) in value.attrs() {
		element.set_attribute(name, attr);
	}
	for child in convert_children(source) {
		element.append_child(child);
	}
	element
}

/// Escapes text content.
pub(crate) fn escape_text(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}

/// Escapes a string for use in a double-quoted attribute value.
pub(crate) fn escape_attr(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('"', "&quot;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}
