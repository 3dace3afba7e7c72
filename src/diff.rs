//! The node differ and the child-list differ.

use crate::{
	classify::HostKind,
	component,
	host::{HostNode, NodeKind},
	patch::diff_props,
	rendered::{ElementRecord, Previous, Rendered},
	vnode::{Element, Props, VNode, Value},
};
use core::mem;
use std::rc::Rc;
use tracing::{instrument, trace, trace_span};

/// Brings `previous` in line with `vnode` and returns the new record.
///
/// `document` is any node of the target document; new host nodes are created through it.
/// If the host node changes, the new one takes the place of the old one in the DOM.
/// Nodes without previous host are left unattached, which is what [`Placement`] is for.
pub(crate) fn diff_node<N: HostNode>(previous: Previous<N>, vnode: VNode<N>, document: &N, svg: bool) -> Rendered<N> {
	match vnode {
		VNode::Empty => {
			previous.unmount();
			Rendered::Empty
		}
		VNode::Text(text) => diff_text(previous.peel(), &text, document),
		VNode::Element(element) => diff_element(previous.peel(), element, document, svg),
		VNode::Component(component) => component::diff_component(previous, component, document, svg),
	}
}

fn diff_text<N: HostNode>(previous: Previous<N>, text: &str, document: &N) -> Rendered<N> {
	match previous {
		Previous::Rendered(Rendered::Text(node)) | Previous::Adopt(node) if node.kind() == NodeKind::Text => {
			if node.text().as_deref() != Some(text) {
				if cfg!(feature = "dangerous-logging") {
					trace!("Updating text to {:?}.", text);
				} else {
					trace!("Updating text.");
				}
				node.set_text(text)
			}
			Rendered::Text(node)
		}
		previous => {
			trace!("Creating text node.");
			let node = document.create_text(text);
			previous.replace_with(&node);
			Rendered::Text(node)
		}
	}
}

#[instrument(skip(previous, element, document), fields(tag = %element.tag))]
fn diff_element<N: HostNode>(previous: Previous<N>, element: Element<N>, document: &N, svg: bool) -> Rendered<N> {
	let Element { tag, props, children, node_ref } = element;
	let svg = svg || &*tag == "svg";

	let (mut record, previous_children) = match previous {
		Previous::Rendered(Rendered::Element(mut record)) if record.tag == tag => {
			let children = mem::take(&mut record.children).into_iter().map(Previous::Rendered).collect();
			(record, children)
		}
		Previous::Adopt(node) if node.kind() == NodeKind::Element && node.local_name().map_or(false, |name| name.eq_ignore_ascii_case(&tag)) => {
			trace!("Hydrating element.");
			let props = node.attributes().into_iter().fold(Props::new(), |props, (name, value)| props.with(&name, value));
			let children = node.child_nodes().into_iter().map(Previous::Adopt).collect();
			let record = ElementRecord {
				node,
				tag: Rc::clone(&tag),
				svg,
				props,
				children: Vec::new(),
				listeners: Default::default(),
				node_ref: None,
			};
			(Box::new(record), children)
		}
		previous => {
			trace!("Creating element.");
			let node = document.create_element(&tag, svg);
			previous.replace_with(&node);
			let record = ElementRecord {
				node,
				tag: Rc::clone(&tag),
				svg,
				props: Props::new(),
				children: Vec::new(),
				listeners: Default::default(),
				node_ref: None,
			};
			(Box::new(record), Vec::new())
		}
	};

	let inner_html = |props: &Props<N>| props.get("dangerouslySetInnerHTML").map_or(false, Value::is_truthy);
	if inner_html(&props) {
		for child in previous_children {
			child.unmount()
		}
	} else {
		let previous_children = if inner_html(&record.props) {
			trace!("Clearing injected markup.");
			record.node.set_inner_html("");
			Vec::new()
		} else {
			previous_children
		};
		let children_svg = svg && &*tag != "foreignObject";
		record.children = diff_children(previous_children, children, &record.node, children_svg);
	}

	let lower_tag;
	let kind = if svg {
		HostKind::svg(&tag)
	} else {
		lower_tag = tag.to_ascii_lowercase();
		HostKind::html(&lower_tag)
	};
	let ElementRecord {
		node, props: old_props, listeners, ..
	} = &mut *record;
	diff_props(node, &kind, old_props, &props, listeners);
	record.props = props;

	match (record.node_ref.take(), node_ref) {
		(Some(old), Some(new)) if Rc::ptr_eq(&old, &new) => record.node_ref = Some(new),
		(old, new) => {
			if let Some(old) = old {
				old(None)
			}
			if let Some(new) = &new {
				new(Some(&record.node))
			}
			record.node_ref = new
		}
	}

	Rendered::Element(record)
}

/// Diffs a child list, consuming `previous` entirely.
///
/// Every new child first claims the nearest compatible previous child (same index, then `i - 1`, `i + 1`, `i - 2`, ...).
/// Claimed children are then diffed and placed in order, and unclaimed ones are unmounted.
/// The result has exactly one record per entry of `next`.
#[instrument(skip(previous, next, parent), fields(previous = previous.len(), next = next.len()))]
pub(crate) fn diff_children<N: HostNode>(previous: Vec<Previous<N>>, next: Vec<VNode<N>>, parent: &N, svg: bool) -> Vec<Rendered<N>> {
	let mut claimed = vec![false; previous.len()];
	let assignments: Vec<Option<usize>> = next
		.iter()
		.enumerate()
		.map(|(i, vnode)| {
			let found = nearest_match(&previous, &claimed, i, vnode);
			if let Some(found) = found {
				claimed[found] = true;
			}
			found
		})
		.collect();

	let mut placement = Placement::new(
		parent,
		previous
			.iter()
			.zip(&claimed)
			.filter_map(|(previous, claimed)| previous.host().map(|host| (host, *claimed)))
			.collect(),
	);

	let mut pool: Vec<Option<Previous<N>>> = previous.into_iter().map(Some).collect();
	let mut rendered = Vec::with_capacity(next.len());
	for (vnode, assignment) in next.into_iter().zip(assignments) {
		let previous = assignment.and_then(|i| pool[i].take()).unwrap_or(Previous::Nothing);
		let record = diff_node(previous, vnode, parent, svg);
		if let Some(host) = record.host() {
			placement.place(&host);
		}
		rendered.push(record);
	}

	let span = trace_span!("Unmounting unmatched children");
	let _enter = span.enter();
	for leftover in pool.into_iter().flatten() {
		leftover.unmount()
	}

	rendered
}

fn nearest_match<N: HostNode>(previous: &[Previous<N>], claimed: &[bool], index: usize, vnode: &VNode<N>) -> Option<usize> {
	let len = previous.len();
	if len == 0 {
		return None;
	}
	let candidate = |i: usize| i < len && !claimed[i] && previous[i].matches(vnode);
	// Closer than `nearest` there are only indices past the end. Further than `furthest` there are none at all.
	let nearest = (index + 1).saturating_sub(len);
	let furthest = index.max(len.saturating_sub(index + 1));
	(nearest..=furthest).find_map(|distance| {
		index
			.checked_sub(distance)
			.filter(|i| candidate(*i))
			.or_else(|| Some(index + distance).filter(|i| distance > 0 && candidate(*i)))
	})
}

/// Places rendered host nodes into a parent in order, one by one, with as few moves as possible.
///
/// Anchors are the host nodes of the previous child list that haven't been placed yet.
/// Claimed anchors will be placed later and mark the end of the slot for the current node.
/// Unclaimed anchors are about to be removed, and new nodes are put before them so that they take their place.
/// Any other sibling is foreign and left alone.
pub(crate) struct Placement<'a, N: HostNode> {
	parent: &'a N,
	anchors: Vec<(N, bool)>,
	previous: Option<N>,
}

impl<'a, N: HostNode> Placement<'a, N> {
	/// `anchors` are `(host, claimed)` pairs, in any order.
	pub fn new(parent: &'a N, anchors: Vec<(N, bool)>) -> Self {
		Self { parent, anchors, previous: None }
	}

	pub fn place(&mut self, host: &N) {
		let mut sibling = match &self.previous {
			Some(previous) => previous.next_sibling(),
			None => self.parent.first_child(),
		};
		let mut reference = None;
		let in_place = loop {
			let current = match sibling {
				Some(current) => current,
				None => break false,
			};
			if &current == host {
				break true;
			}
			match self.anchors.iter().find(|(anchor, _)| anchor == &current) {
				Some((_, true)) => {
					reference.get_or_insert(current);
					break false;
				}
				Some((_, false)) => {
					reference.get_or_insert_with(|| current.clone());
				}
				None => (),
			}
			sibling = current.next_sibling();
		};

		if !in_place {
			let reference = match reference {
				Some(reference) => Some(reference),
				None => self.previous.as_ref().and_then(HostNode::next_sibling),
			};
			trace!("Placing node.");
			self.parent.insert_before(host, reference.as_ref());
		}

		self.anchors.retain(|(anchor, _)| anchor != host);
		self.previous = Some(host.clone());
	}
}
