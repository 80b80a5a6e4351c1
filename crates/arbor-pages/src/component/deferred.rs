//! Deferred rendering.
//!
//! A control marked pending holds back `render_when_ready` on every ancestor
//! until it signals readiness. There is no timeout: a control that never
//! becomes ready stalls that render forever.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use futures::channel::oneshot;

use super::composable::descendant_controls;
use super::control::Control;

type ReadyCallback = Box<dyn FnOnce(String)>;

impl Control {
	/// Marks this control as not yet ready to render.
	pub fn mark_pending(&self) {
		self.0.pending.set(true);
	}

	/// Signals readiness, releasing any render waiting on this control.
	pub fn mark_ready(&self) {
		if self.0.pending.replace(false) {
			self.0.readiness.emit(&());
		}
	}

	/// Returns whether this control is marked pending.
	pub fn is_pending(&self) -> bool {
		self.0.pending.get()
	}

	/// Calls `callback` with the rendered markup once this control and every
	/// descendant are ready. Runs immediately when nothing is pending.
	pub fn render_when_ready<F>(&self, callback: F)
	where
		F: FnOnce(String) + 'static,
	{
		let mut waiting: Vec<Control> = descendant_controls(self)
			.into_iter()
			.filter(Control::is_pending)
			.collect();
		if self.is_pending() {
			waiting.insert(0, self.clone());
		}
		if waiting.is_empty() {
			callback(self.render());
			return;
		}

		let remaining = Rc::new(Cell::new(waiting.len()));
		let callback: Rc<RefCell<Option<ReadyCallback>>> =
			Rc::new(RefCell::new(Some(Box::new(callback))));
		let root = self.downgrade();
		for control in waiting {
			let remaining = Rc::clone(&remaining);
			let callback = Rc::clone(&callback);
			let root = root.clone();
			control.0.readiness.subscribe_once(move |_| {
				remaining.set(remaining.get() - 1);
				if remaining.get() > 0 {
					return;
				}
				let Some(root) = root.upgrade().map(Control) else {
					return;
				};
				if let Some(callback) = callback.borrow_mut().take() {
					callback(root.render());
				}
			});
		}
	}

	/// Awaitable form of [`Control::render_when_ready`].
	///
	/// Resolves to `None` if the control is dropped before it becomes ready.
	pub fn render_ready(&self) -> impl Future<Output = Option<String>> + 'static {
		let (tx, rx) = oneshot::channel();
		self.render_when_ready(move |html| {
			let _ = tx.send(html);
		});
		async move { rx.await.ok() }
	}
}
