//! Session state embedded in a rendered page.
//!
//! Shared data objects are not part of any single control's markup, so the
//! page carries their values in a JSON script. The client feeds it to
//! [`Session::restore_state`](crate::Session::restore_state) before hydrating.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::markers::STATE_SCRIPT_ID;
use crate::dom::Document;
use crate::session::Session;

/// Serialized session state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SsrState {
	/// Shared data object values, by object id.
	#[serde(default)]
	data_objects: BTreeMap<String, Map<String, Value>>,
	/// Additional metadata.
	#[serde(default)]
	metadata: BTreeMap<String, Value>,
}

impl SsrState {
	/// Creates an empty state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Captures every data object registered with `session`.
	pub fn from_session(session: &Session) -> Self {
		let mut state = Self::new();
		for object in session.data_objects() {
			state
				.data_objects
				.insert(object.id().to_string(), object.snapshot());
		}
		state
	}

	/// Adds a data object's values. Values that do not serialize to a JSON
	/// object are ignored.
	pub fn add_data_object(&mut self, id: impl Into<String>, values: impl Serialize) {
		if let Ok(Value::Object(map)) = serde_json::to_value(values) {
			self.data_objects.insert(id.into(), map);
		}
	}

	/// Adds metadata.
	pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Serialize) {
		if let Ok(json) = serde_json::to_value(value) {
			self.metadata.insert(key.into(), json);
		}
	}

	/// Returns the values of one data object.
	pub fn get_data_object(&self, id: &str) -> Option<&Map<String, Value>> {
		self.data_objects.get(id)
	}

	/// Iterates over data objects, ordered by id.
	pub fn data_objects(&self) -> impl Iterator<Item = (&String, &Map<String, Value>)> {
		self.data_objects.iter()
	}

	/// Gets metadata by key.
	pub fn get_metadata(&self, key: &str) -> Option<&Value> {
		self.metadata.get(key)
	}

	/// Checks if the state is empty.
	pub fn is_empty(&self) -> bool {
		self.data_objects.is_empty() && self.metadata.is_empty()
	}

	/// Serializes the state to JSON.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	/// Deserializes state from JSON.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Reads the state script from a parsed page, if present and well formed.
	pub fn from_document(document: &Document) -> Option<Self> {
		let script = document.get_element_by_id(STATE_SCRIPT_ID)?;
		Self::from_json(&script.text_content()).ok()
	}

	/// Generates the `<script>` tag carrying the state.
	///
	/// `</` is escaped so a value containing `</script>` cannot close the tag.
	pub fn to_script_tag(&self) -> String {
		let json = self.to_json().unwrap_or_else(|_| "{}".to_string());
		format!(
			r#"<script id="{}" type="application/json">{}</script>"#,
			STATE_SCRIPT_ID,
			escape_json_for_script(&json)
		)
	}

	/// Merges another state into this one.
	pub fn merge(&mut self, other: SsrState) {
		self.data_objects.extend(other.data_objects);
		self.metadata.extend(other.metadata);
	}
}

/// Escapes JSON for embedding in a script element by replacing `</` with
/// `<\/`, which JSON parsers read back as `</`.
pub(crate) fn escape_json_for_script(json: &str) -> String {
	json.replace("</", "<\\/")
}
