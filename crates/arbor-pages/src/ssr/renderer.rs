//! Server-side renderer for control trees.

use serde::{Deserialize, Serialize};

use super::markers::ATTR_ROOT;
use super::state::SsrState;
use crate::component::Control;

/// Options for SSR rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsrOptions {
	/// Whether to include hydration markers.
	pub include_hydration_markers: bool,
	/// Whether to minify the output.
	pub minify: bool,
	/// Whether to include the session-state script.
	pub include_state_script: bool,
	/// Language attribute for the HTML element.
	pub lang: String,
	/// Page title.
	pub title: Option<String>,
}

impl Default for SsrOptions {
	fn default() -> Self {
		Self {
			include_hydration_markers: true,
			minify: false,
			include_state_script: true,
			lang: "en".to_string(),
			title: None,
		}
	}
}

impl SsrOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the language.
	pub fn lang(mut self, lang: impl Into<String>) -> Self {
		self.lang = lang.into();
		self
	}

	/// Disables hydration markers. The output can no longer be hydrated.
	pub fn no_hydration(mut self) -> Self {
		self.include_hydration_markers = false;
		self
	}

	/// Enables minification.
	///
	/// Whitespace runs in text outside `<pre>`, `<textarea>` and `<script>`
	/// collapse to one space, so text leaves such as `"a   b"` hydrate back as
	/// `"a b"`.
	pub fn minify(mut self) -> Self {
		self.minify = true;
		self
	}

	/// Disables the session-state script.
	pub fn no_state_script(mut self) -> Self {
		self.include_state_script = false;
		self
	}

	/// Sets the page title.
	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}
}

/// The main SSR renderer.
///
/// # Example
///
/// ```ignore
/// let mut renderer = SsrRenderer::with_options(SsrOptions::new().title("Inbox"));
/// let html = renderer.render_page(&root);
/// ```
#[derive(Debug, Default)]
pub struct SsrRenderer {
	options: SsrOptions,
	state: SsrState,
}

impl SsrRenderer {
	/// Creates a new renderer with default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a renderer with custom options.
	pub fn with_options(options: SsrOptions) -> Self {
		Self {
			options,
			state: SsrState::new(),
		}
	}

	/// Returns the options.
	pub fn options(&self) -> &SsrOptions {
		&self.options
	}

	/// Returns a reference to the SSR state.
	pub fn state(&self) -> &SsrState {
		&self.state
	}

	/// Returns a mutable reference to the SSR state.
	pub fn state_mut(&mut self) -> &mut SsrState {
		&mut self.state
	}

	/// Renders a control tree to an HTML string and collects the session's
	/// shared data objects into the state.
	pub fn render(&mut self, control: &Control) -> String {
		if let Some(session) = control.session() {
			self.state.merge(SsrState::from_session(&session));
		}
		if self.options.include_hydration_markers {
			control.render()
		} else {
			control.render_plain()
		}
	}

	/// Renders a control tree to a full HTML page.
	pub fn render_page(&mut self, control: &Control) -> String {
		let content = self.render(control);
		self.wrap_in_html(&content)
	}

	/// Wraps content in a full HTML document.
	pub fn wrap_in_html(&self, content: &str) -> String {
		let mut html = String::with_capacity(content.len() + 512);

		html.push_str("<!DOCTYPE html>\n");
		html.push_str(&format!("<html lang=\"{}\">\n", html_escape(&self.options.lang)));

		html.push_str("<head>\n");
		html.push_str("<meta charset=\"UTF-8\">\n");
		html.push_str(
			"<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
		);
		if let Some(ref title) = self.options.title {
			html.push_str(&format!("<title>{}</title>\n", html_escape(title)));
		}
		html.push_str("</head>\n");

		html.push_str("<body>\n");
		if self.options.include_hydration_markers {
			html.push_str(&format!("<div id=\"app\" {}=\"\">", ATTR_ROOT));
		} else {
			html.push_str("<div id=\"app\">");
		}
		html.push_str(content);
		html.push_str("</div>\n");

		if self.options.include_state_script && !self.state.is_empty() {
			html.push_str(&self.state.to_script_tag());
			html.push('\n');
		}

		html.push_str("</body>\n");
		html.push_str("</html>");

		if self.options.minify {
			minify_html(&html)
		} else {
			html
		}
	}
}

/// Simple HTML escape function.
fn html_escape(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&#x27;")
}

/// Maximum input size for HTML minification (1 MiB).
///
/// Larger inputs are returned unmodified.
const MINIFY_HTML_MAX_INPUT_SIZE: usize = 1024 * 1024;

/// Elements whose content keeps its whitespace when minifying.
const MINIFY_PRESERVED_TAGS: &[&str] = &["pre", "textarea", "script"];

/// Collapses whitespace runs to a single space.
///
/// Whitespace inside `<pre>`, `<textarea>` and `<script>` is preserved. Inputs
/// larger than 1 MiB are returned unmodified.
pub fn minify_html(html: &str) -> String {
	if html.len() > MINIFY_HTML_MAX_INPUT_SIZE {
		return html.to_string();
	}

	let mut result = String::with_capacity(html.len());
	let mut prev_was_whitespace = false;
	let mut preserving: Option<&str> = None;
	let mut chars = html.char_indices();

	while let Some((byte_pos, c)) = chars.next() {
		let remaining = &html[byte_pos..];

		if preserving.is_none() && c == '<' {
			preserving = MINIFY_PRESERVED_TAGS
				.iter()
				.copied()
				.find(|tag| opens_tag(remaining, tag));
		}

		if let Some(tag) = preserving {
			let closing = format!("</{}>", tag);
			if c == '<' && remaining.starts_with(&closing) {
				result.push_str(&closing);
				for _ in 1..closing.len() {
					chars.next();
				}
				preserving = None;
				prev_was_whitespace = false;
			} else {
				result.push(c);
			}
			continue;
		}

		if c.is_whitespace() {
			if !prev_was_whitespace {
				result.push(' ');
				prev_was_whitespace = true;
			}
		} else {
			result.push(c);
			prev_was_whitespace = false;
		}
	}

	result
}

fn opens_tag(remaining: &str, tag: &str) -> bool {
	remaining
		.strip_prefix('<')
		.and_then(|rest| rest.strip_prefix(tag))
		.is_some_and(|after| {
			after.is_empty() || after.starts_with(|ch: char| ch == '>' || ch.is_ascii_whitespace())
		})
}
