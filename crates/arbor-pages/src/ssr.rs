//! Server-side rendering.
//!
//! Controls render themselves (see [`Control::render`](crate::Control::render));
//! this module holds the protocol attribute definitions, the embedded session
//! state, and a renderer that wraps a tree in a full page.

pub mod markers;
mod renderer;
mod state;

pub use markers::HydrationMarker;
pub use renderer::{SsrOptions, SsrRenderer, minify_html};
pub use state::SsrState;
