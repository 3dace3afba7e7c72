//! The render entry point.

use crate::{
	component::ComponentHandle,
	diff::{diff_node, Placement},
	host::HostNode,
	rendered::{Previous, Rendered},
	schedule,
	vnode::VNode,
};
use core::cell::RefCell;
use std::rc::Rc;
use tracing::{instrument, trace};

/// The rendered root of a container, attached to that container.
struct Root<N: HostNode> {
	record: RefCell<Option<Rendered<N>>>,
}

/// What [`render`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Mounted<N: HostNode> {
	/// The root host node, or [`None`] if nothing was rendered.
	pub node: Option<N>,
	/// The root component, if the tree's root is one.
	pub component: Option<ComponentHandle<N>>,
}

fn root_of<N: HostNode>(container: &N) -> Option<Rc<Root<N>>> {
	container.attachment().and_then(|attachment| attachment.downcast::<Root<N>>().ok())
}

/// Renders `tree` into `container` and returns the result.
///
/// Rendering into the same container again updates the tree rendered there before.
///
/// `hint` names an existing child of `container` (or a detached node) to reuse.
/// If it is the root rendered there last time, this is the same as passing [`None`].
/// Otherwise, the tracked root is unmounted and `hint` is hydrated: its element kind, attributes and children are reused where they fit,
/// and everything the new tree doesn't mention is removed.
///
/// An empty `tree` unmounts the tracked root. Untracked children of `container` are never touched.
#[instrument(skip(tree, hint))]
pub fn render<N: HostNode>(tree: impl Into<VNode<N>>, container: &N, hint: Option<&N>) -> Mounted<N> {
	let tree = tree.into();
	schedule::pass(|| {
		let root = root_of(container);
		let tracked = root.as_ref().and_then(|root| root.record.take());

		let previous = match (tracked, hint) {
			(Some(tracked), Some(hint)) if tracked.host().as_ref() != Some(hint) => {
				trace!("Hint differs from the tracked root, which is unmounted.");
				tracked.unmount(true);
				Previous::Adopt(hint.clone())
			}
			(Some(tracked), _) => Previous::Rendered(tracked),
			(None, Some(hint)) => Previous::Adopt(hint.clone()),
			(None, None) => Previous::Nothing,
		};

		if tree.is_empty() {
			if let Previous::Rendered(tracked) = previous {
				tracked.unmount(true)
			}
			container.attach(None);
			return Mounted { node: None, component: None };
		}

		let mut placement = Placement::new(container, previous.host().map(|host| (host, true)).into_iter().collect());
		let svg = container.is_svg() && container.local_name().as_deref() != Some("foreignObject");
		let record = diff_node(previous, tree, container, svg);
		let node = record.host();
		if let Some(node) = &node {
			placement.place(node)
		}

		let component = match &record {
			Rendered::Component(instance) => Some(instance.handle()),
			_ => None,
		};
		match root {
			Some(root) => *root.record.borrow_mut() = Some(record),
			None => container.attach(Some(Rc::new(Root { record: RefCell::new(Some(record)) }))),
		}
		Mounted { node, component }
	})
}

/// Unmounts whatever [`render`] put into `container`.
#[instrument]
pub fn unmount<N: HostNode>(container: &N) {
	schedule::pass(|| {
		if let Some(record) = root_of(container).and_then(|root| root.record.take()) {
			record.unmount(true)
		}
		container.attach(None)
	})
}
