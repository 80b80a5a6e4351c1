//! Controls: the nodes of a component tree.
//!
//! A [`Control`] carries everything needed to render itself to markup on the
//! server and to be rebound to that markup on the client: a session-assigned
//! id, a type name, an ordered child sequence, an observable
//! [`AttributeStore`], persisted plain-data fields, id-based cross-references,
//! recorded behavior descriptors, and an optional shared [`DataObject`].
//!
//! ## Usage
//!
//! ```ignore
//! use arbor_pages::{Control, Session};
//!
//! let session = Session::new();
//! let list = Control::typed(&session, "list", "ul");
//! let item = Control::new(&session, "li");
//! item.add("first")?;
//! list.add(&item)?;
//! list.add_class("menu");
//!
//! let html = list.render();
//! ```

mod attrs;
mod child;
mod composable;
mod control;
mod data;
mod deferred;
mod events;
mod render;

pub use attrs::{AttributeChange, AttributeStore, PIXEL_STYLE_KEYS, StyleValue};
pub(crate) use attrs::apply_to_element;
pub use child::{Child, ContentChange, IntoChildren, TextNode};
pub use composable::{Composable, descendant_controls};
pub use control::Control;
pub(crate) use control::ControlInner;
pub use data::{DataChange, DataObject};
pub use events::{EventChannel, Subscription};
