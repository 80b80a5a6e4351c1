//! Arbor Pages - server-rendered component trees with client hydration
//!
//! A tree of controls is rendered to markup on the server, and that markup is
//! hydrated on the client into a live, behavior-bound object graph. There is
//! no virtual DOM and no diffing: structural edits on a live tree are patched
//! onto the element tree directly.
//!
//! ## Architecture
//!
//! - [`component`]: controls, the attribute store, child sequences, rendering
//! - [`session`]: per-document id allocation and id-keyed lookup tables
//! - [`ssr`]: hydration protocol attributes, page rendering, embedded state
//! - [`hydration`]: two-phase activation, the incremental patcher, the hydrator
//! - [`selection`]: mutually exclusive selection scopes
//! - [`dom`]: the live element tree the client half binds to
//! - [`config`]: session and rendering options, loadable from TOML
//!
//! ## Example
//!
//! ### Server
//!
//! ```ignore
//! use arbor_pages::{Control, Session, SsrRenderer};
//! use serde_json::json;
//!
//! let session = Session::new();
//! let window = Control::typed(&session, "window", "div");
//! window.set_style("left", 10);
//! window.apply_mixin("draggable", json!({"axis": "x"}));
//! window.add("hello")?;
//!
//! let html = SsrRenderer::new().render_page(&window);
//! ```
//!
//! ### Client
//!
//! ```ignore
//! use arbor_pages::{Document, Hydrator, Session};
//!
//! let session = Session::new();
//! session.mixins().register("draggable", |control, options| {
//!     control.add_class("draggable");
//! });
//!
//! let document = Document::from_page(&html);
//! let report = Hydrator::new(&session, &document).hydrate_root("app")?;
//!
//! let window = session.control("window_0").unwrap();
//! window.set_style("left", 42); // the live element now has left:42px
//! ```

#![warn(missing_docs)]

// Diagnostics
pub mod logging;

#[doc(hidden)]
pub use tracing as __tracing;

// Core modules
pub mod component;
pub mod config;
pub mod dom;
pub mod error;
pub mod session;

// Server-side rendering
pub mod ssr;

// Client-side hydration
pub mod hydration;

// Selection scopes
pub mod selection;

// Re-export commonly used types
pub use component::{
	AttributeChange, AttributeStore, Child, Composable, ContentChange, Control, DataChange,
	DataObject, EventChannel, IntoChildren, StyleValue, Subscription, TextNode,
};
pub use config::{ArborConfig, SessionOptions};
pub use dom::{Document, DomNode, Element, Text};
pub use error::{CompositionError, ConfigError, HydrationError};
pub use hydration::{ActivationState, HydrationReport, Hydrator};
pub use selection::{SelectionEvent, SelectionScope, Toggle};
pub use session::{MixinDescriptor, MixinFn, MixinRegistry, Session};
pub use ssr::{SsrOptions, SsrRenderer, SsrState};

// Logging macros are exported via #[macro_export]
// and reachable as arbor_pages::debug_log!, arbor_pages::warn_log!, etc.
