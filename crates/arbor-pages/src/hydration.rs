//! Client-side hydration.
//!
//! Controls are brought live in two phases. Pre-activation binds a control
//! to its rendered element and restores state and behavior; activation
//! finishes recursively and raises the activation event. After that, the
//! patcher keeps the live element in step with structural edits and the
//! attribute listener mirrors attribute, class and style writes.
//!
//! Nothing in a hydration pass is fatal: missing elements, malformed
//! payloads, unknown mixins and unmatched structure are traced and the pass
//! continues.

mod activation;
mod patcher;
mod runtime;

pub use activation::ActivationState;
pub use runtime::{HydrationReport, Hydrator};
