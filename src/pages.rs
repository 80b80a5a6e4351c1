//! Component trees rendered on the server and hydrated in place on the client
//!
//! This module provides access to arbor-pages.
//!
//! ## Architecture
//!
//! - **Component Tree**: `Control` nodes with observable attributes and style
//! - **Session**: per-document id allocation and registries
//! - **SSR**: markup with hydration markers and an embedded state script
//! - **Hydration**: binds existing markup instead of re-rendering it
//!
//! ## Example
//!
//! ```rust,ignore
//! use arbor::pages::{Control, Document, Hydrator, Session, SsrRenderer};
//!
//! // Server
//! let session = Session::new();
//! let list = Control::typed(&session, "list", "ul");
//! list.add(Control::new(&session, "li"))?;
//! let page = SsrRenderer::new().render_page(&list);
//!
//! // Client
//! let client = Session::new();
//! let document = Document::from_page(&page);
//! Hydrator::new(&client, &document).hydrate_root("app")?;
//! ```

// Re-export all arbor-pages functionality
pub use arbor_pages::*;
