//! The host platform surface the reconciler mutates.
//!
//! Only [`patch`](crate::patch), [`listeners`](crate::listeners) and [`diff`](crate::diff) call into this trait.
//! Implementations are provided for [`web_sys::Node`] (see [`web`](crate::web)) and for the in-memory [`memory::Node`](crate::memory::Node).

use core::{any::Any, fmt::Debug};
use std::rc::Rc;

/// A primitive value written to a DOM property.
///
/// Host implementations coerce it the way the platform would (for example `""` to `false` for `checked`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
	Bool(bool),
	Number(f64),
	Str(&'a str),
}

/// What kind of host node a handle refers to, as far as the differ cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
	Element,
	Text,
	Other,
}

/// A handle to a live host node.
///
/// Handles are cheap to clone and compare by node identity.
/// Methods that create nodes do so in the owner document of `self`.
pub trait HostNode: Clone + PartialEq + Debug + 'static {
	/// The native event type passed to listeners.
	type Event: 'static;
	/// Keeps a registered native listener alive until it is removed again.
	type Listener: 'static;

	fn create_element(&self, tag: &str, svg: bool) -> Self;
	fn create_text(&self, data: &str) -> Self;

	fn kind(&self) -> NodeKind;
	/// The element's local name, as the host reports it.
	fn local_name(&self) -> Option<String>;
	/// Whether this is an element in the SVG namespace.
	fn is_svg(&self) -> bool;
	fn text(&self) -> Option<String>;
	fn set_text(&self, data: &str);

	fn parent(&self) -> Option<Self>;
	fn first_child(&self) -> Option<Self>;
	fn next_sibling(&self) -> Option<Self>;
	fn child_nodes(&self) -> Vec<Self> {
		let mut child_nodes = Vec::new();
		let mut next = self.first_child();
		while let Some(child) = next {
			next = child.next_sibling();
			child_nodes.push(child);
		}
		child_nodes
	}
	/// Inserts or moves `child` into `self`, before `reference` or at the end.
	fn insert_before(&self, child: &Self, reference: Option<&Self>);
	fn remove_child(&self, child: &Self);

	/// All attributes as `(name, value)` pairs, in host order.
	fn attributes(&self) -> Vec<(String, String)>;
	fn set_attribute(&self, name: &str, value: &str);
	fn remove_attribute(&self, name: &str);
	fn set_attribute_ns(&self, namespace: &str, name: &str, value: &str);
	fn remove_attribute_ns(&self, namespace: &str, name: &str);
	fn set_property(&self, name: &str, value: Scalar<'_>);

	fn set_style_text(&self, css_text: &str);
	/// Assigns a single style declaration. `name` may be camel-cased or dashed.
	fn set_style_property(&self, name: &str, value: &str);
	fn set_inner_html(&self, html: &str);

	fn add_event_listener(&self, event: &str, capture: bool, listener: Rc<dyn Fn(&Self::Event)>) -> Self::Listener;
	fn remove_event_listener(&self, event: &str, capture: bool, listener: Self::Listener);

	/// Data attached to this node by [`attach`](`HostNode::attach`).
	fn attachment(&self) -> Option<Rc<dyn Any>>;
	fn attach(&self, attachment: Option<Rc<dyn Any>>);

	/// Runs `task` soon, but not synchronously.
	fn schedule(task: Box<dyn FnOnce()>);

	fn remove(&self) {
		if let Some(parent) = self.parent() {
			parent.remove_child(self)
		}
	}
}
