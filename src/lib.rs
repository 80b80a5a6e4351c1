//! # Arbor
//!
//! Server-rendered component trees with client-side hydration.
//!
//! Arbor builds a tree of controls, renders it to markup that carries a
//! small hydration protocol, and on the client binds a fresh tree to that
//! markup in place. There is no virtual DOM: after activation every
//! structural or attribute change is patched directly onto the bound element.
//!
//! ## Feature Flags
//!
//! - `pages` (default) - Component tree, SSR renderer and hydration engine
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use arbor::prelude::*;
//!
//! let session = Session::new();
//! let panel = Control::typed(&session, "panel", "div");
//! panel.style_batch([("left", 10)]);
//! panel.add("hello")?;
//!
//! assert_eq!(
//!     panel.render(),
//!     r#"<div id="panel_0" data-ah-type="panel" style="left:10px;">hello</div>"#
//! );
//! ```

#[cfg(feature = "pages")]
pub mod pages;

/// Commonly used types.
#[cfg(feature = "pages")]
pub mod prelude {
	pub use crate::pages::{
		ActivationState, Child, Composable, Control, DataObject, Document, Element, HydrationError,
		HydrationReport, Hydrator, SelectionScope, Session, SessionOptions, SsrOptions, SsrRenderer,
		SsrState, TextNode,
	};
}
