//! Error types for arbor-pages.
//!
//! Only direct API-contract violations are returned as errors. Everything that
//! can go wrong while hydrating engine-produced markup is reported as a
//! [`HydrationError`] value through the logs (and counted in
//! [`HydrationReport`](crate::hydration::HydrationReport)), never propagated.

/// Errors raised when a composition instruction is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
	/// Children were added to a text leaf.
	#[error("text leaves cannot have children")]
	LeafNode,
	/// A control was added to itself or to one of its own descendants.
	#[error("adding control {child} under {parent} would create a cycle")]
	Cycle {
		/// The control that received the `add` call
		parent: String,
		/// The control that was being added
		child: String,
	},
	/// `remove` was called with an item that is not a child of the control.
	#[error("{child} is not a child of {parent}")]
	NotAChild {
		/// The control that received the `remove` call
		parent: String,
		/// Description of the missing child
		child: String,
	},
}

/// Diagnostics produced while binding controls to rendered markup.
///
/// These never abort a hydration pass; they are traced at the point of use.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HydrationError {
	/// No live element could be found for a control.
	#[error("no element found for control {0}")]
	ElementNotFound(String),
	/// A protocol attribute carried a payload that is not valid JSON of the
	/// expected shape.
	#[error("malformed {attribute} payload on {id}: {reason}")]
	MalformedPayload {
		/// Control id
		id: String,
		/// Protocol attribute name
		attribute: &'static str,
		/// Parser message
		reason: String,
	},
	/// A behavior descriptor names a mixin that is not registered.
	#[error("no mixin registered under '{key}' (control {id})")]
	UnknownMixin {
		/// Control id
		id: String,
		/// Normalized lookup key
		key: String,
	},
	/// A live child node could not be matched to any known child.
	#[error("unmatched {kind} at position {index} under {id}")]
	UnmatchedStructure {
		/// Parent control id
		id: String,
		/// `"element"` or `"text"`
		kind: &'static str,
		/// Position in the live child list
		index: usize,
	},
	/// The hydration root was not present in the document.
	#[error("hydration root element not found: {0}")]
	RootNotFound(String),
}

/// Errors returned when loading options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The TOML source could not be parsed into options.
	#[error("invalid options: {0}")]
	Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_composition_error_display() {
		let err = CompositionError::Cycle {
			parent: "control_1".to_string(),
			child: "control_0".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"adding control control_0 under control_1 would create a cycle"
		);
		assert_eq!(
			CompositionError::LeafNode.to_string(),
			"text leaves cannot have children"
		);
	}

	#[rstest]
	fn test_hydration_error_display() {
		let err = HydrationError::RootNotFound("app".to_string());
		assert_eq!(err.to_string(), "hydration root element not found: app");

		let err = HydrationError::MalformedPayload {
			id: "window_0".to_string(),
			attribute: "data-ah-fields",
			reason: "expected value".to_string(),
		};
		assert!(err.to_string().contains("malformed data-ah-fields payload"));
	}
}
