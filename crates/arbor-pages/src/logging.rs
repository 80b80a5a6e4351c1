//! Logging abstraction layer for arbor-pages
//!
//! The engine never aborts a hydration pass: missing elements, malformed
//! payloads, unknown mixins and unmatched structure are traced and skipped.
//! These macros are the single funnel for those diagnostics. They forward to
//! [`tracing`] under the `arbor_pages` target, so applications pick the
//! subscriber (and the level filter) they want.
//!
//! ## Macro Overview
//!
//! | Macro | Level | Typical use |
//! |-------|-------|-------------|
//! | `debug_log!` | `DEBUG` | dormant controls, patch steps |
//! | `info_log!` | `INFO` | hydration pass summaries |
//! | `warn_log!` | `WARN` | malformed payloads, unmatched markup, refused selections |
//! | `error_log!` | `ERROR` | an item the patcher could not convert |
//!
//! ## Example
//!
//! ```ignore
//! use arbor_pages::{debug_log, warn_log};
//!
//! debug_log!("control {} stays dormant", id);
//! warn_log!("malformed persisted fields on {}: {}", id, err);
//! ```

/// Logs a debug message under the `arbor_pages` target.
///
/// # Example
///
/// ```ignore
/// debug_log!("Debug value: {:?}", value);
/// ```
#[macro_export]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		$crate::__tracing::debug!(target: "arbor_pages", $($arg)*);
	}};
}

/// Logs an info message under the `arbor_pages` target.
#[macro_export]
macro_rules! info_log {
	($($arg:tt)*) => {{
		$crate::__tracing::info!(target: "arbor_pages", $($arg)*);
	}};
}

/// Logs a warning message under the `arbor_pages` target.
///
/// # Example
///
/// ```ignore
/// warn_log!("no element for control {}", id);
/// ```
#[macro_export]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		$crate::__tracing::warn!(target: "arbor_pages", $($arg)*);
	}};
}

/// Logs an error message under the `arbor_pages` target.
#[macro_export]
macro_rules! error_log {
	($($arg:tt)*) => {{
		$crate::__tracing::error!(target: "arbor_pages", $($arg)*);
	}};
}
