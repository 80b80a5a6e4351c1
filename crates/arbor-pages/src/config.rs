//! Options for sessions and server-side rendering.
//!
//! Both option structs are plain values with builder methods. They can also
//! be loaded from TOML, either separately or together as an
//! [`ArborConfig`]:
//!
//! ```toml
//! [session]
//! hydrate_on_insert = false
//!
//! [ssr]
//! lang = "ja"
//! minify = true
//! title = "Dashboard"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ssr::SsrOptions;

/// Options for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
	/// Pre-activate and activate children inserted under an active parent.
	pub hydrate_on_insert: bool,
}

impl Default for SessionOptions {
	fn default() -> Self {
		Self {
			hydrate_on_insert: true,
		}
	}
}

impl SessionOptions {
	/// Creates default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets whether inserted children are activated.
	pub fn hydrate_on_insert(mut self, enable: bool) -> Self {
		self.hydrate_on_insert = enable;
		self
	}

	/// Parses options from TOML.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}
}

/// Session and rendering options loaded together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArborConfig {
	/// Session options (`[session]`).
	pub session: SessionOptions,
	/// Rendering options (`[ssr]`).
	pub ssr: SsrOptions,
}

impl ArborConfig {
	/// Parses a configuration document.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}
}
