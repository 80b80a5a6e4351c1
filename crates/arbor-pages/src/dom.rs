//! Live element tree.
//!
//! A native, single-threaded model of the browser DOM. Hydration binds
//! controls to these handles and the patcher mutates them directly, so the
//! client half of the engine runs (and is tested) without a browser.
//!
//! Handles are reference counted: cloning an [`Element`] or a [`Text`] yields
//! another handle to the same live node. Parents are held weakly.

mod document;
mod element;
mod parser;

pub use document::Document;
pub use element::{DomNode, Element, Namespace, Text, is_void_tag};
pub(crate) use element::{flatten_style_pairs, parse_style};
pub(crate) use parser::{escape_attr, escape_text};
