use crate::{host::HostNode, vnode::Handler};
use hashbrown::HashMap;
use std::{cell::RefCell, rc::Rc};
use tracing::{instrument, trace};

type EventKey = (Rc<str>, bool);

/// Delegated event listeners of one element.
///
/// Each `(event, capture)` pair gets exactly one native listener, which looks up the current handler when invoked.
/// Replacing a handler therefore never touches the host.
pub(crate) struct EventListeners<N: HostNode> {
	handlers: Rc<RefCell<HashMap<EventKey, Handler<N>>>>,
	native: HashMap<EventKey, N::Listener>,
}

impl<N: HostNode> Default for EventListeners<N> {
	fn default() -> Self {
		Self {
			handlers: Rc::default(),
			native: HashMap::new(),
		}
	}
}

impl<N: HostNode> EventListeners<N> {
	#[instrument(skip(self, handler))]
	pub fn set(&mut self, node: &N, event: &str, capture: bool, handler: Option<Handler<N>>) {
		let key: EventKey = (event.into(), capture);
		match handler {
			Some(handler) => {
				self.handlers.borrow_mut().insert(key.clone(), handler);
				if !self.native.contains_key(&key) {
					let handlers = Rc::downgrade(&self.handlers);
					let lookup = key.clone();
					let listener = node.add_event_listener(
						event,
						capture,
						Rc::new(move |event: &N::Event| {
							let handler = match handlers.upgrade() {
								Some(handlers) => {
									let handlers = handlers.borrow();
									handlers.get(&lookup).cloned()
								}
								None => None,
							};
							match handler {
								Some(handler) => handler(event),
								None => trace!("Event listener outlived its handler."),
							}
						}),
					);
					trace!("Added native listener.");
					self.native.insert(key, listener);
				}
			}
			None => {
				self.handlers.borrow_mut().remove(&key);
				if let Some(listener) = self.native.remove(&key) {
					node.remove_event_listener(event, capture, listener);
					trace!("Removed native listener.");
				}
			}
		}
	}

	/// Removes all native listeners from `node`.
	pub fn clear(&mut self, node: &N) {
		self.handlers.borrow_mut().clear();
		for ((event, capture), listener) in self.native.drain() {
			node.remove_event_listener(&event, capture, listener)
		}
	}
}
