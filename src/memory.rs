//! An in-memory DOM implementing [`HostNode`].
//!
//! It models just enough of the browser to observe the reconciler: element and text nodes,
//! attributes (with namespaces), the live `value`/`checked`/`selected` properties, style declarations,
//! markup parsing and serialization, and event dispatch with capture, target and bubble phases.
//!
//! Each thread also keeps [`Stats`] about host operations, and a task queue backing [`HostNode::schedule`]
//! that only runs when [`run_tasks`] is called.

use crate::{
	host::{HostNode, NodeKind, Scalar},
	vnode::format_number,
};
use core::{
	any::Any,
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
};
use std::{
	collections::VecDeque,
	rc::{Rc, Weak},
};
use tracing::{error, trace};

/// Counters of host operations on the current thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
	pub elements_created: usize,
	pub texts_created: usize,
	/// Calls to [`HostNode::insert_before`], including moves.
	pub insertions: usize,
	/// Calls to [`HostNode::remove_child`].
	pub removals: usize,
	/// `(event, capture)` per call to [`HostNode::add_event_listener`].
	pub listeners_added: Vec<(String, bool)>,
	/// `(event, capture)` per call to [`HostNode::remove_event_listener`].
	pub listeners_removed: Vec<(String, bool)>,
}

thread_local! {
	static STATS: RefCell<Stats> = RefCell::default();
	static TASKS: RefCell<VecDeque<Box<dyn FnOnce()>>> = RefCell::default();
	static NEXT_LISTENER: Cell<u64> = Cell::new(0);
}

#[must_use]
pub fn stats() -> Stats {
	STATS.with(|stats| stats.borrow().clone())
}

pub fn reset_stats() {
	STATS.with(|stats| *stats.borrow_mut() = Stats::default())
}

fn count(update: impl FnOnce(&mut Stats)) {
	STATS.with(|stats| update(&mut stats.borrow_mut()))
}

/// Runs scheduled tasks until there are none left. Returns how many ran.
pub fn run_tasks() -> usize {
	let mut ran = 0;
	while let Some(task) = TASKS.with(|tasks| tasks.borrow_mut().pop_front()) {
		task();
		ran += 1;
	}
	ran
}

/// A node handle. Clones refer to the same node.
#[derive(Clone)]
pub struct Node(Rc<NodeData>);

struct NodeData {
	content: Content,
	parent: RefCell<Weak<NodeData>>,
	children: RefCell<Vec<Node>>,
	attachment: RefCell<Option<Rc<dyn Any>>>,
}

enum Content {
	Element(ElementData),
	Text(RefCell<String>),
}

struct ElementData {
	name: String,
	svg: bool,
	attributes: RefCell<Vec<Attribute>>,
	style: RefCell<Vec<(String, String)>>,
	live: RefCell<Live>,
	listeners: RefCell<Vec<Listener>>,
}

/// Properties that aren't reflected to attributes once written.
#[derive(Default)]
struct Live {
	value: Option<String>,
	checked: Option<bool>,
	selected: Option<bool>,
}

struct Attribute {
	namespace: Option<String>,
	name: String,
	value: String,
}

struct Listener {
	id: u64,
	event: String,
	capture: bool,
	callback: Rc<dyn Fn(&Event)>,
}

/// Identifies a registered listener.
#[derive(Debug)]
pub struct ListenerId(u64);

impl PartialEq for Node {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl Eq for Node {}

impl Debug for Node {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match &self.0.content {
			Content::Element(element) => write!(f, "<{}>", element.name),
			Content::Text(text) => {
				if cfg!(feature = "dangerous-logging") {
					write!(f, "#text {:?}", text.borrow())
				} else {
					f.write_str("#text")
				}
			}
		}
	}
}

const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

impl Node {
	fn new(content: Content) -> Self {
		Self(Rc::new(NodeData {
			content,
			parent: RefCell::default(),
			children: RefCell::default(),
			attachment: RefCell::default(),
		}))
	}

	fn make_element(name: &str, svg: bool) -> Self {
		Self::new(Content::Element(ElementData {
			name: if svg { name.to_owned() } else { name.to_ascii_lowercase() },
			svg,
			attributes: RefCell::default(),
			style: RefCell::default(),
			live: RefCell::default(),
			listeners: RefCell::default(),
		}))
	}

	fn make_text(data: &str) -> Self {
		Self::new(Content::Text(RefCell::new(data.to_owned())))
	}

	/// Creates an HTML element. The name is lower-cased.
	#[must_use]
	pub fn element(name: &str) -> Self {
		count(|stats| stats.elements_created += 1);
		Self::make_element(name, false)
	}

	/// Creates an element in the SVG namespace. The name is kept as is.
	#[must_use]
	pub fn svg_element(name: &str) -> Self {
		count(|stats| stats.elements_created += 1);
		Self::make_element(name, true)
	}

	#[must_use]
	pub fn text_node(data: &str) -> Self {
		count(|stats| stats.texts_created += 1);
		Self::make_text(data)
	}

	fn element_data(&self) -> Option<&ElementData> {
		match &self.0.content {
			Content::Element(element) => Some(element),
			Content::Text(_) => None,
		}
	}

	/// `DIV` for HTML elements, the local name for SVG elements and `#text` for text nodes.
	#[must_use]
	pub fn node_name(&self) -> String {
		match &self.0.content {
			Content::Element(element) if element.svg => element.name.clone(),
			Content::Element(element) => element.name.to_ascii_uppercase(),
			Content::Text(_) => "#text".to_owned(),
		}
	}

	#[must_use]
	pub fn is_svg(&self) -> bool {
		self.element_data().map_or(false, |element| element.svg)
	}

	/// Element children only.
	#[must_use]
	pub fn children(&self) -> Vec<Node> {
		self.0.children.borrow().iter().filter(|child| child.kind() == NodeKind::Element).cloned().collect()
	}

	#[must_use]
	pub fn last_child(&self) -> Option<Node> {
		self.0.children.borrow().last().cloned()
	}

	#[must_use]
	pub fn text_content(&self) -> String {
		match &self.0.content {
			Content::Text(text) => text.borrow().clone(),
			Content::Element(_) => self.0.children.borrow().iter().map(Node::text_content).collect(),
		}
	}

	pub fn append_child(&self, child: &Node) {
		self.insert_before(child, None)
	}

	/// The value of the attribute `name` without namespace, or failing that with any namespace.
	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<String> {
		let element = self.element_data()?;
		let name = if element.svg { name.to_owned() } else { name.to_ascii_lowercase() };
		let attributes = element.attributes.borrow();
		attributes
			.iter()
			.find(|attribute| attribute.namespace.is_none() && attribute.name == name)
			.or_else(|| attributes.iter().find(|attribute| attribute.name == name))
			.map(|attribute| attribute.value.clone())
	}

	#[must_use]
	pub fn attribute_ns(&self, namespace: &str, name: &str) -> Option<String> {
		let element = self.element_data()?;
		let attributes = element.attributes.borrow();
		attributes
			.iter()
			.find(|attribute| attribute.namespace.as_deref() == Some(namespace) && attribute.name == name)
			.map(|attribute| attribute.value.clone())
	}

	/// The live `value`, which falls back to the `value` attribute until written.
	#[must_use]
	pub fn value(&self) -> String {
		self.element_data()
			.and_then(|element| element.live.borrow().value.clone())
			.or_else(|| self.attribute("value"))
			.unwrap_or_default()
	}

	/// Changes the live `value` like user input would.
	pub fn set_value(&self, value: &str) {
		if let Some(element) = self.element_data() {
			element.live.borrow_mut().value = Some(value.to_owned())
		}
	}

	#[must_use]
	pub fn checked(&self) -> bool {
		self.element_data()
			.and_then(|element| element.live.borrow().checked)
			.unwrap_or_else(|| self.attribute("checked").is_some())
	}

	/// Changes the live `checked` state like a user would.
	pub fn set_checked(&self, checked: bool) {
		if let Some(element) = self.element_data() {
			element.live.borrow_mut().checked = Some(checked)
		}
	}

	#[must_use]
	pub fn selected(&self) -> bool {
		self.element_data()
			.and_then(|element| element.live.borrow().selected)
			.unwrap_or_else(|| self.attribute("selected").is_some())
	}

	/// A single style declaration. `name` may be camel-cased or dashed. Empty if not set.
	#[must_use]
	pub fn style_property(&self, name: &str) -> String {
		let name = css_name(name);
		self.element_data()
			.and_then(|element| {
				let style = element.style.borrow();
				style.iter().find(|(declared, _)| *declared == name).map(|(_, value)| value.clone())
			})
			.unwrap_or_default()
	}

	/// All style declarations, serialized like `color: red; top: 5px;`.
	#[must_use]
	pub fn css_text(&self) -> String {
		self.element_data()
			.map(|element| serialize_style(&element.style.borrow()))
			.unwrap_or_default()
	}

	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.element_data().map_or(0, |element| element.listeners.borrow().len())
	}

	#[must_use]
	pub fn inner_html(&self) -> String {
		let mut html = String::new();
		for child in self.0.children.borrow().iter() {
			child.serialize(&mut html)
		}
		html
	}

	#[must_use]
	pub fn outer_html(&self) -> String {
		let mut html = String::new();
		self.serialize(&mut html);
		html
	}

	fn serialize(&self, html: &mut String) {
		match &self.0.content {
			Content::Text(text) => escape(&text.borrow(), false, html),
			Content::Element(element) => {
				html.push('<');
				html.push_str(&element.name);
				for attribute in element.attributes.borrow().iter() {
					html.push(' ');
					html.push_str(&attribute.name);
					html.push_str("=\"");
					escape(&attribute.value, true, html);
					html.push('"');
				}
				html.push('>');
				if !element.svg && VOID_ELEMENTS.contains(&element.name.as_str()) {
					return;
				}
				for child in self.0.children.borrow().iter() {
					child.serialize(html)
				}
				html.push_str("</");
				html.push_str(&element.name);
				html.push('>');
			}
		}
	}

	/// Dispatches a bubbling `click` event.
	pub fn click(&self) -> Event {
		self.dispatch_event("click", true)
	}

	/// Dispatches an event of type `kind` at this node.
	///
	/// Capturing listeners of ancestors run outermost first, then listeners on the node itself (capturing ones first),
	/// then, if `bubbles`, non-capturing listeners of ancestors innermost first.
	pub fn dispatch_event(&self, kind: &str, bubbles: bool) -> Event {
		let mut path = Vec::new();
		let mut next = self.parent();
		while let Some(ancestor) = next {
			next = ancestor.parent();
			path.push(ancestor);
		}

		let event = Event {
			kind: kind.to_owned(),
			bubbles,
			target: self.clone(),
			current_target: RefCell::default(),
			phase: Cell::new(EventPhase::None),
			stopped: Cell::new(false),
		};

		event.phase.set(EventPhase::Capturing);
		for ancestor in path.iter().rev() {
			ancestor.invoke(&event, true)
		}
		event.phase.set(EventPhase::AtTarget);
		self.invoke(&event, true);
		self.invoke(&event, false);
		if bubbles {
			event.phase.set(EventPhase::Bubbling);
			for ancestor in &path {
				ancestor.invoke(&event, false)
			}
		}

		event.phase.set(EventPhase::None);
		*event.current_target.borrow_mut() = None;
		event
	}

	fn invoke(&self, event: &Event, capture: bool) {
		if event.stopped.get() {
			return;
		}
		let callbacks: Vec<Rc<dyn Fn(&Event)>> = match self.element_data() {
			Some(element) => element
				.listeners
				.borrow()
				.iter()
				.filter(|listener| listener.capture == capture && listener.event == event.kind)
				.map(|listener| Rc::clone(&listener.callback))
				.collect(),
			None => return,
		};
		*event.current_target.borrow_mut() = Some(self.clone());
		for callback in callbacks {
			callback(event)
		}
	}

	fn upsert_attribute(&self, namespace: Option<&str>, name: &str, value: &str) {
		let element = match self.element_data() {
			Some(element) => element,
			None => return error!("Can't set attributes on text nodes."),
		};
		let mut attributes = element.attributes.borrow_mut();
		match attributes.iter_mut().find(|attribute| attribute.namespace.as_deref() == namespace && attribute.name == name) {
			Some(attribute) => value.clone_into(&mut attribute.value),
			None => attributes.push(Attribute {
				namespace: namespace.map(ToOwned::to_owned),
				name: name.to_owned(),
				value: value.to_owned(),
			}),
		}
	}

	fn drop_attribute(&self, namespace: Option<&str>, name: &str) {
		if let Some(element) = self.element_data() {
			element
				.attributes
				.borrow_mut()
				.retain(|attribute| !(attribute.namespace.as_deref() == namespace && attribute.name == name))
		}
	}

	/// Writes the style declarations back to the `style` attribute.
	fn sync_style(&self) {
		if let Some(element) = self.element_data() {
			let css_text = serialize_style(&element.style.borrow());
			if css_text.is_empty() {
				self.drop_attribute(None, "style")
			} else {
				self.upsert_attribute(None, "style", &css_text)
			}
		}
	}

	fn detach_from_parent(&self) -> bool {
		let parent = match self.0.parent.borrow().upgrade() {
			Some(parent) => parent,
			None => return false,
		};
		parent.children.borrow_mut().retain(|sibling| sibling != self);
		*self.0.parent.borrow_mut() = Weak::new();
		true
	}

	fn replace_children(&self, children: Vec<Node>) {
		for child in self.0.children.take() {
			*child.0.parent.borrow_mut() = Weak::new();
		}
		for child in &children {
			*child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
		}
		*self.0.children.borrow_mut() = children;
	}

	fn contains(&self, other: &Node) -> bool {
		let mut next = Some(other.clone());
		while let Some(node) = next {
			if &node == self {
				return true;
			}
			next = node.parent();
		}
		false
	}
}

/// The phase an [`Event`] is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
	None,
	Capturing,
	AtTarget,
	Bubbling,
}

/// An event being dispatched by [`Node::dispatch_event`].
#[derive(Debug)]
pub struct Event {
	kind: String,
	bubbles: bool,
	target: Node,
	current_target: RefCell<Option<Node>>,
	phase: Cell<EventPhase>,
	stopped: Cell<bool>,
}

impl Event {
	#[must_use]
	pub fn kind(&self) -> &str {
		&self.kind
	}

	#[must_use]
	pub fn bubbles(&self) -> bool {
		self.bubbles
	}

	#[must_use]
	pub fn target(&self) -> &Node {
		&self.target
	}

	#[must_use]
	pub fn current_target(&self) -> Option<Node> {
		self.current_target.borrow().clone()
	}

	#[must_use]
	pub fn phase(&self) -> EventPhase {
		self.phase.get()
	}

	/// Stops the event before it reaches the next node.
	pub fn stop_propagation(&self) {
		self.stopped.set(true)
	}
}

impl HostNode for Node {
	type Event = Event;
	type Listener = ListenerId;

	fn create_element(&self, tag: &str, svg: bool) -> Self {
		if svg {
			Node::svg_element(tag)
		} else {
			Node::element(tag)
		}
	}

	fn create_text(&self, data: &str) -> Self {
		Node::text_node(data)
	}

	fn kind(&self) -> NodeKind {
		match &self.0.content {
			Content::Element(_) => NodeKind::Element,
			Content::Text(_) => NodeKind::Text,
		}
	}

	fn local_name(&self) -> Option<String> {
		self.element_data().map(|element| element.name.clone())
	}

	fn is_svg(&self) -> bool {
		Node::is_svg(self)
	}

	fn text(&self) -> Option<String> {
		match &self.0.content {
			Content::Text(text) => Some(text.borrow().clone()),
			Content::Element(_) => None,
		}
	}

	fn set_text(&self, data: &str) {
		match &self.0.content {
			Content::Text(text) => data.clone_into(&mut text.borrow_mut()),
			Content::Element(_) => error!("Can't set the text of an element."),
		}
	}

	fn parent(&self) -> Option<Self> {
		self.0.parent.borrow().upgrade().map(Node)
	}

	fn first_child(&self) -> Option<Self> {
		self.0.children.borrow().first().cloned()
	}

	fn next_sibling(&self) -> Option<Self> {
		let parent = self.parent()?;
		let siblings = parent.0.children.borrow();
		let index = siblings.iter().position(|sibling| sibling == self)?;
		siblings.get(index + 1).cloned()
	}

	fn child_nodes(&self) -> Vec<Self> {
		self.0.children.borrow().clone()
	}

	fn insert_before(&self, child: &Self, reference: Option<&Self>) {
		if child.contains(self) {
			return error!("Can't insert a node into itself or its descendants.");
		}
		if self.element_data().is_none() {
			return error!("Text nodes can't have children.");
		}
		if let Some(reference) = reference {
			if reference == child {
				return trace!("Node inserted before itself.");
			}
			if reference.parent().as_ref() != Some(self) {
				return error!("Reference node is not a child of the parent.");
			}
		}

		child.detach_from_parent();
		{
			let mut children = self.0.children.borrow_mut();
			let index = reference
				.and_then(|reference| children.iter().position(|sibling| sibling == reference))
				.unwrap_or(children.len());
			children.insert(index, child.clone());
		}
		*child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
		count(|stats| stats.insertions += 1);
	}

	fn remove_child(&self, child: &Self) {
		if child.parent().as_ref() != Some(self) {
			return error!("Node to remove is not a child of the parent.");
		}
		child.detach_from_parent();
		count(|stats| stats.removals += 1);
	}

	fn attributes(&self) -> Vec<(String, String)> {
		self.element_data()
			.map(|element| {
				element
					.attributes
					.borrow()
					.iter()
					.map(|attribute| (attribute.name.clone(), attribute.value.clone()))
					.collect()
			})
			.unwrap_or_default()
	}

	fn set_attribute(&self, name: &str, value: &str) {
		let name = if self.is_svg() { name.to_owned() } else { name.to_ascii_lowercase() };
		self.upsert_attribute(None, &name, value);
		if name == "style" {
			if let Some(element) = self.element_data() {
				*element.style.borrow_mut() = parse_style(value)
			}
		}
	}

	fn remove_attribute(&self, name: &str) {
		let name = if self.is_svg() { name.to_owned() } else { name.to_ascii_lowercase() };
		self.drop_attribute(None, &name);
		if name == "style" {
			if let Some(element) = self.element_data() {
				element.style.borrow_mut().clear()
			}
		}
	}

	fn set_attribute_ns(&self, namespace: &str, name: &str, value: &str) {
		self.upsert_attribute(Some(namespace), name, value)
	}

	fn remove_attribute_ns(&self, namespace: &str, name: &str) {
		self.drop_attribute(Some(namespace), name)
	}

	fn set_property(&self, name: &str, value: Scalar<'_>) {
		let element = match self.element_data() {
			Some(element) => element,
			None => return error!("Can't set properties on text nodes."),
		};
		match name {
			"value" => element.live.borrow_mut().value = Some(scalar_string(value)),
			"checked" => element.live.borrow_mut().checked = Some(scalar_truthy(value)),
			"selected" => element.live.borrow_mut().selected = Some(scalar_truthy(value)),
			"indeterminate" => (),
			"textContent" | "innerText" => {
				let text = scalar_string(value);
				let children = if text.is_empty() { Vec::new() } else { vec![Node::make_text(&text)] };
				self.replace_children(children)
			}
			_ => match reflected_attribute(name) {
				Reflected::Boolean(attribute) => {
					if scalar_truthy(value) {
						self.set_attribute(attribute, "")
					} else {
						self.remove_attribute(attribute)
					}
				}
				Reflected::Named(attribute) => self.set_attribute(attribute, &scalar_string(value)),
				Reflected::Lower => self.set_attribute(&name.to_ascii_lowercase(), &scalar_string(value)),
			},
		}
	}

	fn set_style_text(&self, css_text: &str) {
		if let Some(element) = self.element_data() {
			*element.style.borrow_mut() = parse_style(css_text);
			self.sync_style()
		}
	}

	fn set_style_property(&self, name: &str, value: &str) {
		let element = match self.element_data() {
			Some(element) => element,
			None => return error!("Text nodes have no style."),
		};
		let name = css_name(name);
		{
			let mut style = element.style.borrow_mut();
			let existing = style.iter().position(|(declared, _)| *declared == name);
			match (existing, value.is_empty()) {
				(Some(index), true) => {
					style.remove(index);
				}
				(Some(index), false) => value.clone_into(&mut style[index].1),
				(None, true) => (),
				(None, false) => style.push((name, value.to_owned())),
			}
		}
		self.sync_style()
	}

	fn set_inner_html(&self, html: &str) {
		if self.element_data().is_none() {
			return error!("Can't set the inner HTML of a text node.");
		}
		let children = parse_fragment(html, self.is_svg() && self.local_name().as_deref() != Some("foreignObject"));
		self.replace_children(children)
	}

	fn add_event_listener(&self, event: &str, capture: bool, listener: Rc<dyn Fn(&Self::Event)>) -> Self::Listener {
		let id = NEXT_LISTENER.with(|next| {
			let id = next.get();
			next.set(id + 1);
			id
		});
		match self.element_data() {
			Some(element) => element.listeners.borrow_mut().push(Listener {
				id,
				event: event.to_owned(),
				capture,
				callback: listener,
			}),
			None => error!("Can't listen to events on text nodes."),
		}
		count(|stats| stats.listeners_added.push((event.to_owned(), capture)));
		ListenerId(id)
	}

	fn remove_event_listener(&self, event: &str, capture: bool, listener: Self::Listener) {
		if let Some(element) = self.element_data() {
			element.listeners.borrow_mut().retain(|registered| registered.id != listener.0)
		}
		count(|stats| stats.listeners_removed.push((event.to_owned(), capture)));
	}

	fn attachment(&self) -> Option<Rc<dyn Any>> {
		self.0.attachment.borrow().clone()
	}

	fn attach(&self, attachment: Option<Rc<dyn Any>>) {
		*self.0.attachment.borrow_mut() = attachment
	}

	fn schedule(task: Box<dyn FnOnce()>) {
		TASKS.with(|tasks| tasks.borrow_mut().push_back(task))
	}
}

enum Reflected {
	Boolean(&'static str),
	Named(&'static str),
	Lower,
}

fn reflected_attribute(property: &str) -> Reflected {
	match property {
		"className" => Reflected::Named("class"),
		"htmlFor" => Reflected::Named("for"),
		"defaultValue" => Reflected::Named("value"),
		"defaultChecked" => Reflected::Boolean("checked"),
		"defaultSelected" => Reflected::Boolean("selected"),
		"hidden" => Reflected::Boolean("hidden"),
		"disabled" => Reflected::Boolean("disabled"),
		"readOnly" => Reflected::Boolean("readonly"),
		"required" => Reflected::Boolean("required"),
		"multiple" => Reflected::Boolean("multiple"),
		"autofocus" => Reflected::Boolean("autofocus"),
		"noValidate" => Reflected::Boolean("novalidate"),
		"formNoValidate" => Reflected::Boolean("formnovalidate"),
		"reversed" => Reflected::Boolean("reversed"),
		"allowFullscreen" => Reflected::Boolean("allowfullscreen"),
		"isMap" => Reflected::Boolean("ismap"),
		"controls" => Reflected::Boolean("controls"),
		"autoplay" => Reflected::Boolean("autoplay"),
		"loop" => Reflected::Boolean("loop"),
		"muted" => Reflected::Boolean("muted"),
		_ => Reflected::Lower,
	}
}

fn scalar_string(value: Scalar<'_>) -> String {
	match value {
		Scalar::Bool(b) => b.to_string(),
		Scalar::Number(n) => format_number(n),
		Scalar::Str(s) => s.to_owned(),
	}
}

fn scalar_truthy(value: Scalar<'_>) -> bool {
	match value {
		Scalar::Bool(b) => b,
		Scalar::Number(n) => n != 0.0 && !n.is_nan(),
		Scalar::Str(s) => !s.is_empty(),
	}
}

/// `backgroundColor` becomes `background-color`. Dashed names are kept.
fn css_name(name: &str) -> String {
	if name.contains('-') {
		return name.to_owned();
	}
	let mut css = String::with_capacity(name.len() + 4);
	for c in name.chars() {
		if c.is_ascii_uppercase() {
			css.push('-');
			css.push(c.to_ascii_lowercase());
		} else {
			css.push(c);
		}
	}
	css
}

fn parse_style(css_text: &str) -> Vec<(String, String)> {
	css_text
		.split(';')
		.filter_map(|declaration| declaration.split_once(':'))
		.map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_owned()))
		.filter(|(name, value)| !name.is_empty() && !value.is_empty())
		.collect()
}

fn serialize_style(style: &[(String, String)]) -> String {
	style.iter().map(|(name, value)| format!("{}: {};", name, value)).collect::<Vec<_>>().join(" ")
}

fn escape(text: &str, attribute: bool, html: &mut String) {
	for c in text.chars() {
		match c {
			'&' => html.push_str("&amp;"),
			'\u{a0}' => html.push_str("&nbsp;"),
			'"' if attribute => html.push_str("&quot;"),
			'<' if !attribute => html.push_str("&lt;"),
			'>' if !attribute => html.push_str("&gt;"),
			c => html.push(c),
		}
	}
}

fn decode_entities(text: &str) -> String {
	let mut decoded = String::with_capacity(text.len());
	let mut rest = text;
	while let Some(start) = rest.find('&') {
		decoded.push_str(&rest[..start]);
		let candidate = &rest[start..];
		let entity = candidate
			.find(';')
			.filter(|end| *end <= 10)
			.and_then(|end| decode_entity(&candidate[1..end]).map(|c| (c, end + 1)));
		match entity {
			Some((c, length)) => {
				decoded.push(c);
				rest = &candidate[length..];
			}
			None => {
				decoded.push('&');
				rest = &candidate[1..];
			}
		}
	}
	decoded.push_str(rest);
	decoded
}

fn decode_entity(name: &str) -> Option<char> {
	match name {
		"amp" => Some('&'),
		"lt" => Some('<'),
		"gt" => Some('>'),
		"quot" => Some('"'),
		"apos" => Some('\''),
		"nbsp" => Some('\u{a0}'),
		_ => {
			let code = name.strip_prefix('#')?;
			let code = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
				Some(hex) => u32::from_str_radix(hex, 16).ok()?,
				None => code.parse().ok()?,
			};
			char::from_u32(code)
		}
	}
}

/// A lenient fragment parser: elements, attributes, text and comments (which are dropped).
fn parse_fragment(html: &str, svg: bool) -> Vec<Node> {
	let root = Node::make_element("#fragment", svg);
	let mut stack = vec![root.clone()];
	let mut rest = html;

	while !rest.is_empty() {
		let parent = stack.last().cloned().unwrap_or_else(|| root.clone());

		if let Some(comment) = rest.strip_prefix("<!--") {
			rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
		} else if let Some(end_tag) = rest.strip_prefix("</") {
			let end = end_tag.find('>').unwrap_or(end_tag.len());
			let name = end_tag[..end].trim();
			rest = end_tag.get(end + 1..).unwrap_or("");
			let open = stack
				.iter()
				.skip(1)
				.rposition(|open| open.local_name().map_or(false, |local_name| local_name.eq_ignore_ascii_case(name)));
			if let Some(open) = open {
				stack.truncate(open + 1);
			}
		} else if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
			let parent_svg = parent.is_svg() && parent.local_name().as_deref() != Some("foreignObject");
			let (element, after, self_closing) = parse_start_tag(&rest[1..], parent_svg);
			append_parsed(&parent, &element);
			rest = after;
			let void = !element.is_svg() && element.local_name().map_or(false, |name| VOID_ELEMENTS.contains(&name.as_str()));
			if !self_closing && !void {
				stack.push(element)
			}
		} else {
			let end = rest.char_indices().skip(1).find(|(_, c)| *c == '<').map_or(rest.len(), |(i, _)| i);
			append_parsed(&parent, &Node::make_text(&decode_entities(&rest[..end])));
			rest = &rest[end..];
		}
	}

	let children = root.0.children.take();
	for child in &children {
		*child.0.parent.borrow_mut() = Weak::new();
	}
	children
}

fn append_parsed(parent: &Node, child: &Node) {
	*child.0.parent.borrow_mut() = Rc::downgrade(&parent.0);
	parent.0.children.borrow_mut().push(child.clone());
}

/// Parses from just after `<` up to and including `>`.
fn parse_start_tag(input: &str, parent_svg: bool) -> (Node, &str, bool) {
	let name_end = input.find(|c: char| c.is_whitespace() || c == '>' || c == '/').unwrap_or(input.len());
	let name = &input[..name_end];
	let element = Node::make_element(name, parent_svg || name.eq_ignore_ascii_case("svg"));
	let mut rest = &input[name_end..];

	loop {
		rest = rest.trim_start();
		if rest.is_empty() {
			return (element, rest, false);
		}
		if let Some(after) = rest.strip_prefix("/>") {
			return (element, after, true);
		}
		if let Some(after) = rest.strip_prefix('>') {
			return (element, after, false);
		}

		let name_end = rest.find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/').unwrap_or(rest.len());
		if name_end == 0 {
			// A stray `/` or `=`.
			rest = &rest[1..];
			continue;
		}
		let name = &rest[..name_end];
		rest = rest[name_end..].trim_start();

		let value = match rest.strip_prefix('=') {
			Some(after) => {
				let after = after.trim_start();
				match after.chars().next().filter(|c| *c == '"' || *c == '\'') {
					Some(quote) => {
						let body = &after[1..];
						let close = body.find(quote).unwrap_or(body.len());
						rest = body.get(close + 1..).unwrap_or("");
						decode_entities(&body[..close])
					}
					None => {
						let end = after.find(|c: char| c.is_whitespace() || c == '>').unwrap_or(after.len());
						rest = &after[end..];
						decode_entities(&after[..end])
					}
				}
			}
			None => String::new(),
		};
		element.set_attribute(name, &value);
	}
}
