//! Markup serialization of a control tree.
//!
//! Rendering is pure: it reads the tree and never mutates it, so repeated
//! calls with no structural change in between yield identical output.

use super::child::Child;
use super::control::Control;
use crate::dom::{escape_attr, escape_text, is_void_tag};
use crate::ssr::markers::{self, HydrationMarker};

impl Control {
	/// Renders the control and its subtree, including the hydration protocol
	/// attributes.
	///
	/// # Example
	///
	/// ```ignore
	/// let div = Control::new(&session, "div");
	/// div.add("hello")?;
	/// assert_eq!(div.render(), r#"<div id="control_0">hello</div>"#);
	/// ```
	pub fn render(&self) -> String {
		let mut out = String::new();
		write_control(self, true, &mut out);
		out
	}

	/// Renders without any `data-ah-*` attribute. The output is plain markup
	/// that cannot be hydrated.
	pub fn render_plain(&self) -> String {
		let mut out = String::new();
		write_control(self, false, &mut out);
		out
	}

	/// Returns the attributes `render` emits on this control's begin tag, in
	/// order.
	pub fn rendered_attributes(&self, with_markers: bool) -> Vec<(String, String)> {
		let mut attrs = vec![(markers::ATTR_ID.to_string(), self.id().to_string())];
		if with_markers && self.has_explicit_type() {
			attrs.push((markers::ATTR_TYPE.to_string(), self.type_name().to_string()));
		}
		attrs.extend(
			self.0
				.attrs
				.attributes()
				.into_iter()
				.filter(|(name, _)| !markers::is_reserved(name)),
		);
		let style = self.0.attrs.flattened_style();
		if !style.is_empty() {
			attrs.push((markers::ATTR_STYLE.to_string(), style));
		}
		if with_markers {
			attrs.extend(HydrationMarker::of(self).to_attrs());
		}
		attrs
	}
}

fn write_control(control: &Control, with_markers: bool, out: &mut String) {
	let tag = control.tag_name();
	out.push('<');
	out.push_str(tag);
	for (name, value) in control.rendered_attributes(with_markers) {
		out.push(' ');
		out.push_str(&name);
		out.push_str("=\"");
		out.push_str(&escape_attr(&value));
		out.push('"');
	}
	if is_void_tag(tag) {
		out.push_str(" />");
		return;
	}
	out.push('>');
	for child in control.0.children.borrow().iter() {
		match child {
			Child::Control(nested) => write_control(nested, with_markers, out),
			Child::Text(text) => out.push_str(&escape_text(&text.text())),
		}
	}
	out.push_str("</");
	out.push_str(tag);
	out.push('>');
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::{DataObject, TextNode};
	use crate::session::Session;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_render_div_with_text() {
		let session = Session::new();
		let div = Control::new(&session, "div");
		div.add("hello").unwrap();

		assert_eq!(div.render(), r#"<div id="control_0">hello</div>"#);
	}

	#[rstest]
	fn test_render_escapes_text() {
		let session = Session::new();
		let p = Control::new(&session, "p");
		p.add("<b>&</b>").unwrap();

		assert_eq!(p.render(), r#"<p id="control_0">&lt;b&gt;&amp;&lt;/b&gt;</p>"#);
	}

	#[rstest]
	fn test_render_protocol_attributes_in_order() {
		let session = Session::new();
		let menu = Control::typed(&session, "menu", "div");
		let popup = Control::typed(&session, "popup", "div");
		let model = DataObject::new("model_0");
		menu.set_attr("role", "menu");
		menu.add_class("open");
		menu.set_style("left", 10);
		menu.bind_model(&model);
		menu.set_field("depth", 2);
		menu.set_reference("popup", &popup);
		menu.0
			.mixins
			.borrow_mut()
			.push(crate::session::MixinDescriptor::new("draggable", json!({"axis": "x"})));

		let names: Vec<_> = menu
			.rendered_attributes(true)
			.into_iter()
			.map(|(name, _)| name)
			.collect();

		assert_eq!(
			names,
			vec![
				"id",
				"data-ah-type",
				"role",
				"class",
				"style",
				"data-ah-model",
				"data-ah-fields",
				"data-ah-refs",
				"data-ah-mixins",
			]
		);
		let html = menu.render();
		assert!(html.contains(r#"style="left:10px;""#));
		assert!(html.contains(r#"data-ah-refs="{&quot;popup&quot;:&quot;popup_0&quot;}""#));
	}

	#[rstest]
	fn test_render_plain_drops_markers() {
		let session = Session::new();
		let tab = Control::typed(&session, "tab", "li");
		tab.set_field("index", 1);

		assert_eq!(tab.render_plain(), r#"<li id="tab_0"></li>"#);
	}

	#[rstest]
	fn test_render_void_tag_self_closes() {
		let session = Session::new();
		let input = Control::new(&session, "input");
		input.set_attr("type", "text");

		assert_eq!(input.render(), r#"<input id="control_0" type="text" />"#);
	}

	#[rstest]
	fn test_style_attribute_renders_as_declarations() {
		let session = Session::new();
		let div = Control::new(&session, "div");
		div.set_attr("style", "color:red");
		div.set_style("left", 5);

		assert_eq!(div.render(), r#"<div id="control_0" style="color:red;left:5px;"></div>"#);
	}

	#[rstest]
	fn test_render_is_idempotent() {
		let session = Session::new();
		let root = Control::new(&session, "div");
		root.add(vec!["a", "b"]).unwrap();
		root.add(TextNode::bound(json!(3))).unwrap();

		let first = root.render();
		assert_eq!(first, root.render());
		assert!(first.ends_with(">ab3</div>"));
	}
}
