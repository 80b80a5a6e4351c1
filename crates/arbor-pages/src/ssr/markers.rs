//! Hydration protocol attributes.
//!
//! These attributes are embedded in rendered markup and are the only link
//! between the server's control tree and the client's. The client reads them
//! back to rebuild identity, fields, references, shared models and behavior.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::component::Control;
use crate::dom::{Element, escape_attr};
use crate::error::HydrationError;
use crate::session::MixinDescriptor;

/// Unique control id.
pub const ATTR_ID: &str = "id";

/// Type name; omitted for the implicit type.
pub const ATTR_TYPE: &str = "data-ah-type";

/// Id of the shared data object the control's view is bound to.
pub const ATTR_MODEL: &str = "data-ah-model";

/// JSON object of persisted plain-data fields.
pub const ATTR_FIELDS: &str = "data-ah-fields";

/// JSON object mapping property names to control ids.
pub const ATTR_REFS: &str = "data-ah-refs";

/// JSON array of `{"name", "options"}` behavior descriptors.
pub const ATTR_MIXINS: &str = "data-ah-mixins";

/// Flattened `key:value;` style declarations.
pub const ATTR_STYLE: &str = "style";

/// Marks the page container that hydration descends through.
pub const ATTR_ROOT: &str = "data-ah-root";

/// Prefix shared by every protocol attribute.
pub const PROTOCOL_PREFIX: &str = "data-ah-";

/// The type name that is never written to markup.
pub const IMPLICIT_TYPE: &str = "control";

/// Id of the embedded session-state script.
pub const STATE_SCRIPT_ID: &str = "ah-state";

/// Returns whether `name` is a protocol attribute.
pub fn is_protocol(name: &str) -> bool {
	name.starts_with(PROTOCOL_PREFIX)
}

/// Returns whether `name` is written by the renderer itself rather than
/// copied from the attribute store.
pub fn is_reserved(name: &str) -> bool {
	name == ATTR_ID || name == ATTR_STYLE || is_protocol(name)
}

/// Returns whether an element carries a control: it has an id and is neither
/// the page container nor the state script.
pub fn is_control_element(element: &Element) -> bool {
	match element.get_attribute(ATTR_ID) {
		Some(id) => id != STATE_SCRIPT_ID && !element.has_attribute(ATTR_ROOT),
		None => false,
	}
}

/// Returns the type name recorded on an element.
pub fn type_of(element: &Element) -> String {
	element
		.get_attribute(ATTR_TYPE)
		.unwrap_or_else(|| IMPLICIT_TYPE.to_string())
}

/// The state-bearing protocol attributes of one control.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HydrationMarker {
	/// Shared data object id.
	pub model: Option<String>,
	/// Persisted plain-data fields.
	pub fields: Map<String, Value>,
	/// Named cross-references.
	pub refs: IndexMap<String, String>,
	/// Behavior descriptors, in application order.
	pub mixins: Vec<MixinDescriptor>,
}

impl HydrationMarker {
	/// Captures the marker state of a control.
	pub fn of(control: &Control) -> Self {
		Self {
			model: control.model().map(|m| m.id().to_string()),
			fields: control.fields(),
			refs: control.references(),
			mixins: control.mixins(),
		}
	}

	/// Generates the attributes for this marker. Empty parts are omitted.
	pub fn to_attrs(&self) -> Vec<(String, String)> {
		let mut attrs = Vec::new();
		if let Some(ref model) = self.model {
			attrs.push((ATTR_MODEL.to_string(), model.clone()));
		}
		if !self.fields.is_empty() {
			attrs.push((ATTR_FIELDS.to_string(), encode(&self.fields, "{}")));
		}
		if !self.refs.is_empty() {
			attrs.push((ATTR_REFS.to_string(), encode(&self.refs, "{}")));
		}
		if !self.mixins.is_empty() {
			attrs.push((ATTR_MIXINS.to_string(), encode(&self.mixins, "[]")));
		}
		attrs
	}

	/// Generates the attribute string for this marker.
	pub fn to_attr_string(&self) -> String {
		self.to_attrs()
			.iter()
			.map(|(k, v)| format!("{}=\"{}\"", k, escape_attr(v)))
			.collect::<Vec<_>>()
			.join(" ")
	}
}

fn encode<T: serde::Serialize>(value: &T, fallback: &str) -> String {
	serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}

fn decode<T: DeserializeOwned>(
	id: &str,
	attribute: &'static str,
	raw: &str,
) -> Result<T, HydrationError> {
	serde_json::from_str(raw).map_err(|err| HydrationError::MalformedPayload {
		id: id.to_string(),
		attribute,
		reason: err.to_string(),
	})
}

/// Decodes a `data-ah-fields` payload.
pub fn decode_fields(id: &str, raw: &str) -> Result<Map<String, Value>, HydrationError> {
	decode(id, ATTR_FIELDS, raw)
}

/// Decodes a `data-ah-refs` payload.
pub fn decode_refs(id: &str, raw: &str) -> Result<IndexMap<String, String>, HydrationError> {
	decode(id, ATTR_REFS, raw)
}

/// Decodes a `data-ah-mixins` payload.
pub fn decode_mixins(id: &str, raw: &str) -> Result<Vec<MixinDescriptor>, HydrationError> {
	decode(id, ATTR_MIXINS, raw)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("id", true)]
	#[case("style", true)]
	#[case("data-ah-refs", true)]
	#[case("class", false)]
	#[case("data-role", false)]
	fn test_is_reserved(#[case] name: &str, #[case] expected: bool) {
		assert_eq!(is_reserved(name), expected);
	}

	#[rstest]
	fn test_empty_marker_has_no_attrs() {
		assert!(HydrationMarker::default().to_attrs().is_empty());
	}

	#[rstest]
	fn test_marker_attr_string_escapes_json() {
		let mut marker = HydrationMarker::default();
		marker.fields.insert("label".to_string(), json!("a\"b"));
		assert_eq!(
			marker.to_attr_string(),
			r#"data-ah-fields="{&quot;label&quot;:&quot;a\&quot;b&quot;}""#
		);
	}

	#[rstest]
	fn test_decode_mixins() {
		let mixins = decode_mixins("x_0", r#"[{"name":"drag","options":{"axis":"x"}}]"#).unwrap();
		assert_eq!(mixins, vec![MixinDescriptor::new("drag", json!({"axis": "x"}))]);
	}

	#[rstest]
	fn test_decode_reports_malformed_payload() {
		let err = decode_fields("x_0", "{not json").unwrap_err();
		assert!(matches!(
			err,
			HydrationError::MalformedPayload {
				attribute: ATTR_FIELDS,
				..
			}
		));
	}

	#[rstest]
	fn test_is_control_element() {
		let plain = Element::new("div");
		let control = Element::new("div");
		control.set_attribute(ATTR_ID, "control_0");
		let root = Element::new("div");
		root.set_attribute(ATTR_ID, "app");
		root.set_attribute(ATTR_ROOT, "");
		let script = Element::new("script");
		script.set_attribute(ATTR_ID, STATE_SCRIPT_ID);

		assert!(!is_control_element(&plain));
		assert!(is_control_element(&control));
		assert!(!is_control_element(&root));
		assert!(!is_control_element(&script));
	}

	#[rstest]
	fn test_type_of_defaults_to_implicit() {
		let element = Element::new("div");
		assert_eq!(type_of(&element), IMPLICIT_TYPE);
		element.set_attribute(ATTR_TYPE, "window");
		assert_eq!(type_of(&element), "window");
	}
}
