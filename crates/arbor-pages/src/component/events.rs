//! Synchronous, push-based event channels.
//!
//! Every observable piece of engine state (attribute stores, child sequences,
//! activation, readiness, data objects, selection scopes) notifies through an
//! [`EventChannel`]. Dispatch is synchronous and depth-first: a listener that
//! triggers further changes runs those handlers to completion before `emit`
//! returns. There is no batching.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`EventChannel::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener<T> = Rc<dyn Fn(&T)>;

struct Entry<T> {
	id: Subscription,
	once: bool,
	listener: Listener<T>,
}

impl<T> Clone for Entry<T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			once: self.once,
			listener: Rc::clone(&self.listener),
		}
	}
}

/// A list of listeners for events of type `T`.
pub struct EventChannel<T> {
	entries: RefCell<Vec<Entry<T>>>,
	next_id: Cell<u64>,
}

impl<T> Default for EventChannel<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> EventChannel<T> {
	/// Creates an empty channel.
	pub fn new() -> Self {
		Self {
			entries: RefCell::new(Vec::new()),
			next_id: Cell::new(0),
		}
	}

	/// Subscribes a listener that fires on every event.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&T) + 'static,
	{
		self.push(false, Rc::new(listener))
	}

	/// Subscribes a listener that fires once and then unsubscribes itself.
	pub fn subscribe_once<F>(&self, listener: F) -> Subscription
	where
		F: FnOnce(&T) + 'static,
	{
		let slot = RefCell::new(Some(listener));
		self.push(
			true,
			Rc::new(move |event: &T| {
				if let Some(listener) = slot.borrow_mut().take() {
					listener(event);
				}
			}),
		)
	}

	/// Removes a listener. Returns whether it was still subscribed.
	pub fn unsubscribe(&self, subscription: Subscription) -> bool {
		let mut entries = self.entries.borrow_mut();
		let before = entries.len();
		entries.retain(|entry| entry.id != subscription);
		before != entries.len()
	}

	/// Dispatches `event` to every listener, in subscription order.
	///
	/// Listeners may subscribe, unsubscribe or emit re-entrantly. A listener
	/// unsubscribed by an earlier listener in the same dispatch is skipped.
	pub fn emit(&self, event: &T) {
		let snapshot: Vec<Entry<T>> = {
			let mut entries = self.entries.borrow_mut();
			let snapshot = entries.clone();
			entries.retain(|entry| !entry.once);
			snapshot
		};
		for entry in snapshot {
			if !entry.once && !self.is_subscribed(entry.id) {
				continue;
			}
			(entry.listener)(event);
		}
	}

	/// Returns the number of listeners.
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	/// Returns true if nothing is listening.
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}

	fn is_subscribed(&self, id: Subscription) -> bool {
		self.entries.borrow().iter().any(|entry| entry.id == id)
	}

	fn push(&self, once: bool, listener: Listener<T>) -> Subscription {
		let id = Subscription(self.next_id.get());
		self.next_id.set(self.next_id.get() + 1);
		self.entries.borrow_mut().push(Entry { id, once, listener });
		id
	}
}

impl<T> fmt::Debug for EventChannel<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventChannel")
			.field("listeners", &self.len())
			.finish()
	}
}
