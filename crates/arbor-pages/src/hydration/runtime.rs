//! Hydration Runtime
//!
//! Document-level entry point for client-side hydration. The [`Hydrator`]
//! walks rendered markup parent first, locating (or adopting) a control for
//! every protocol-marked element, pre-activating each parent before its
//! children, then activates the roots and fires the session's
//! hydration-complete listeners.

use super::activation::text_leaf_for;
use super::patcher;
use crate::component::{Child, Control};
use crate::dom::{Document, DomNode, Element};
use crate::error::HydrationError;
use crate::hydration::ActivationState;
use crate::session::Session;
use crate::ssr::SsrState;
use crate::ssr::markers;
use crate::{debug_log, info_log};

/// Outcome of a hydration pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HydrationReport {
	/// Controls bound to their elements.
	pub bound: usize,
	/// Controls left dormant.
	pub dormant: usize,
	/// Controls created on the client from markup (not previously known).
	pub adopted: usize,
	/// Every diagnostic traced during the pass.
	pub diagnostics: Vec<HydrationError>,
	/// The top-level controls that were activated.
	pub roots: Vec<Control>,
}

impl HydrationReport {
	/// Returns true when nothing was traced.
	pub fn is_clean(&self) -> bool {
		self.diagnostics.is_empty()
	}
}

/// Binds a session to a live document.
///
/// # Example
///
/// ```ignore
/// let document = Document::from_markup(&html);
/// let session = Session::new();
/// session.mixins().register("draggable", draggable);
///
/// let report = Hydrator::new(&session, &document).hydrate_root("app")?;
/// assert!(session.is_hydration_complete());
/// ```
#[derive(Debug, Clone)]
pub struct Hydrator {
	session: Session,
	document: Document,
}

impl Hydrator {
	/// Creates a hydrator and attaches `document` to the session.
	pub fn new(session: &Session, document: &Document) -> Self {
		session.attach_document(document);
		Self {
			session: session.clone(),
			document: document.clone(),
		}
	}

	/// Hydrates everything under the element with id `root_id`.
	///
	/// The root may be a control element or a plain container such as the
	/// page's `#app` wrapper.
	pub fn hydrate_root(&self, root_id: &str) -> Result<HydrationReport, HydrationError> {
		let root = self
			.document
			.get_element_by_id(root_id)
			.ok_or_else(|| HydrationError::RootNotFound(root_id.to_string()))?;
		Ok(self.run(&root))
	}

	/// Hydrates every control element in the document.
	pub fn hydrate_all(&self) -> HydrationReport {
		self.run(self.document.body())
	}

	fn run(&self, root: &Element) -> HydrationReport {
		if let Some(state) = SsrState::from_document(&self.document) {
			self.session.restore_state(&state);
		}
		let mut report = HydrationReport::default();
		let tops = if markers::is_control_element(root) {
			vec![root.clone()]
		} else {
			top_level_controls(root)
		};
		for element in tops {
			let control = self.locate_or_adopt(&element, &mut report);
			self.hydrate_control(&control, &mut report);
			control.activate_with(&mut report.diagnostics);
			report.roots.push(control);
		}
		self.session.mark_hydration_complete();
		info_log!(
			"hydrated {} controls ({} dormant, {} adopted, {} diagnostics)",
			report.bound,
			report.dormant,
			report.adopted,
			report.diagnostics.len()
		);
		report
	}

	fn hydrate_control(&self, control: &Control, report: &mut HydrationReport) {
		if let Some(element) = control.resolve_element()
			&& control.children().is_empty()
		{
			self.populate(control, &element, report);
		}
		match control.pre_activate_with(&mut report.diagnostics) {
			ActivationState::Dormant => {
				report.dormant += 1;
				return;
			}
			_ => report.bound += 1,
		}
		for child in control.child_controls() {
			self.hydrate_control(&child, report);
		}
	}

	/// Rebuilds an empty child sequence from the live children.
	fn populate(&self, control: &Control, element: &Element, report: &mut HydrationReport) {
		for node in element.child_nodes() {
			match node {
				DomNode::Element(child) if markers::is_control_element(&child) => {
					let child = self.locate_or_adopt(&child, report);
					control.append_silent(Child::Control(child));
				}
				DomNode::Element(_) => {}
				DomNode::Text(text) => control.append_silent(Child::Text(text_leaf_for(&text))),
			}
		}
	}

	fn locate_or_adopt(&self, element: &Element, report: &mut HydrationReport) -> Control {
		let id = element.id().unwrap_or_default();
		if let Some(control) = self.session.control(&id) {
			return control;
		}
		debug_log!("adopting control {} from markup", id);
		report.adopted += 1;
		let control = Control::adopt(
			&self.session,
			id,
			&markers::type_of(element),
			&element.tag_name(),
		);
		control.set_element(element);
		control
	}
}

/// Collects the outermost control elements under a container.
fn top_level_controls(container: &Element) -> Vec<Element> {
	let mut found = Vec::new();
	for child in container.children() {
		if markers::is_control_element(&child) {
			found.push(child);
		} else {
			found.extend(top_level_controls(&child));
		}
	}
	found
}

impl Control {
	/// Builds a live element for a freshly constructed tree, appends it to
	/// `container` and activates the tree.
	///
	/// Returns `None` (and leaves the container untouched) if the tree could
	/// not be turned into a live element.
	pub fn mount(&self, container: &Element) -> Option<Element> {
		let element = patcher::materialize(self)?;
		container.append_child(element.clone());
		self.set_element(&element);
		self.activate();
		Some(element)
	}
}
