//! Records of what was last rendered, and the old side of a diff.

use crate::{
	component::Instance,
	host::{HostNode, NodeKind},
	listeners::EventListeners,
	vnode::{NodeRef, Props, VNode},
};
use std::rc::Rc;
use tracing::{trace, trace_span};

/// The record of one rendered virtual node.
pub(crate) enum Rendered<N: HostNode> {
	/// Empty children have no host node.
	Empty,
	Text(N),
	Element(Box<ElementRecord<N>>),
	Component(Rc<Instance<N>>),
}

pub(crate) struct ElementRecord<N: HostNode> {
	pub node: N,
	pub tag: Rc<str>,
	pub svg: bool,
	/// The props last applied to `node`.
	pub props: Props<N>,
	pub children: Vec<Rendered<N>>,
	pub listeners: EventListeners<N>,
	pub node_ref: Option<NodeRef<N>>,
}

impl<N: HostNode> Rendered<N> {
	/// The host node of this record. Components forward to their rendered subtree.
	pub fn host(&self) -> Option<N> {
		match self {
			Rendered::Empty => None,
			Rendered::Text(node) => Some(node.clone()),
			Rendered::Element(record) => Some(record.node.clone()),
			Rendered::Component(instance) => instance.base(),
		}
	}

	/// Tears down this record bottom-up.
	///
	/// The host node is only detached if `detach` is set. Descendants of a detached node stay where they are.
	pub fn unmount(self, detach: bool) {
		match self {
			Rendered::Empty => (),
			Rendered::Text(node) => {
				if detach {
					node.remove()
				}
			}
			Rendered::Element(mut record) => {
				let span = trace_span!("Unmounting element", tag = &*record.tag);
				let _enter = span.enter();

				for child in record.children.drain(..) {
					child.unmount(false)
				}
				record.listeners.clear(&record.node);
				if let Some(node_ref) = record.node_ref.take() {
					node_ref(None)
				}
				if detach {
					record.node.remove()
				}
			}
			Rendered::Component(instance) => instance.unmount(detach),
		}
	}
}

/// What a virtual node is diffed against.
pub(crate) enum Previous<N: HostNode> {
	Nothing,
	Rendered(Rendered<N>),
	/// A host node that isn't tracked yet and may be hydrated.
	Adopt(N),
}

impl<N: HostNode> From<Option<Rendered<N>>> for Previous<N> {
	fn from(rendered: Option<Rendered<N>>) -> Self {
		rendered.map_or(Previous::Nothing, Previous::Rendered)
	}
}

impl<N: HostNode> Previous<N> {
	pub fn host(&self) -> Option<N> {
		match self {
			Previous::Nothing => None,
			Previous::Rendered(rendered) => rendered.host(),
			Previous::Adopt(node) => Some(node.clone()),
		}
	}

	/// Unmounts and detaches whatever was there.
	pub fn unmount(self) {
		match self {
			Previous::Nothing => (),
			Previous::Rendered(rendered) => rendered.unmount(true),
			Previous::Adopt(node) => {
				trace!("Removing unmatched untracked node.");
				node.remove()
			}
		}
	}

	/// Puts `node` where the previous host node is, then unmounts the previous side.
	pub fn replace_with(self, node: &N) {
		if let Some(old) = self.host() {
			if let Some(parent) = old.parent() {
				parent.insert_before(node, Some(&old))
			}
		}
		self.unmount()
	}

	/// Unwraps component records down to the host-level record they rendered, detaching each instance on the way.
	pub fn peel(self) -> Self {
		let mut previous = self;
		while let Previous::Rendered(Rendered::Component(instance)) = previous {
			previous = instance.detach().into();
		}
		previous
	}

	/// Whether `vnode` can update this in place.
	pub fn matches(&self, vnode: &VNode<N>) -> bool {
		match (self, vnode) {
			(Previous::Nothing, _) => false,
			(Previous::Rendered(rendered), vnode) => match (rendered, vnode) {
				(Rendered::Empty, VNode::Empty) | (Rendered::Text(_), VNode::Text(_)) => true,
				(Rendered::Element(record), VNode::Element(element)) => record.tag == element.tag,
				(Rendered::Component(instance), VNode::Component(component)) => instance.kind().same(&component.kind),
				_ => false,
			},
			(Previous::Adopt(node), vnode) => match (node.kind(), vnode) {
				(NodeKind::Text, VNode::Text(_)) => true,
				(NodeKind::Element, VNode::Element(element)) => node.local_name().map_or(false, |name| name.eq_ignore_ascii_case(&element.tag)),
				(NodeKind::Element | NodeKind::Text, VNode::Component(_)) => true,
				_ => false,
			},
		}
	}
}
