//! Immutable descriptions of the desired tree.
//!
//! Virtual nodes are consumed by a single diff and then discarded; nothing in this module refers to host nodes except through callbacks.

use crate::{
	component::{Component, ComponentHandle, ComponentKind},
	host::HostNode,
};
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;

/// An event handler, or any other function-valued prop.
pub type Handler<N> = Rc<dyn Fn(&<N as HostNode>::Event)>;

/// Called with the host node when an element is rendered, and with [`None`] when it's removed or the callback is replaced.
pub type NodeRef<N> = Rc<dyn Fn(Option<&N>)>;

/// Called with the instance handle when a component is mounted, and with [`None`] when it's unmounted or the callback is replaced.
pub type ComponentRef<N> = Rc<dyn Fn(Option<&ComponentHandle<N>>)>;

/// A prop (or state) value.
pub enum Value<N: HostNode> {
	Null,
	Undefined,
	Bool(bool),
	Number(f64),
	String(Rc<str>),
	Object(Rc<Object<N>>),
	Function(Handler<N>),
}

impl<N: HostNode> Clone for Value<N> {
	fn clone(&self) -> Self {
		match self {
			Value::Null => Value::Null,
			Value::Undefined => Value::Undefined,
			Value::Bool(b) => Value::Bool(*b),
			Value::Number(n) => Value::Number(*n),
			Value::String(s) => Value::String(Rc::clone(s)),
			Value::Object(o) => Value::Object(Rc::clone(o)),
			Value::Function(f) => Value::Function(Rc::clone(f)),
		}
	}
}

impl<N: HostNode> Debug for Value<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("null"),
			Value::Undefined => f.write_str("undefined"),
			Value::Bool(b) => Debug::fmt(b, f),
			Value::Number(n) => f.write_str(&format_number(*n)),
			Value::String(s) => Debug::fmt(s, f),
			Value::Object(o) => Debug::fmt(o, f),
			Value::Function(_) => f.write_str("function"),
		}
	}
}

impl<N: HostNode> Value<N> {
	/// Whether the value survives as an attribute: everything except `null`, `undefined` and `false`.
	///
	/// Note that `0` and `NaN` **do** survive, as `"0"` and `"NaN"`.
	#[must_use]
	pub fn is_present(&self) -> bool {
		!matches!(self, Value::Null | Value::Undefined | Value::Bool(false))
	}

	/// JavaScript truthiness.
	#[must_use]
	pub fn is_truthy(&self) -> bool {
		match self {
			Value::Null | Value::Undefined => false,
			Value::Bool(b) => *b,
			Value::Number(n) => *n != 0.0 && !n.is_nan(),
			Value::String(s) => !s.is_empty(),
			Value::Object(_) | Value::Function(_) => true,
		}
	}

	/// Strict identity: numbers by `===` (so `NaN` never equals itself), objects and functions by pointer.
	#[must_use]
	pub fn same(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			#[allow(clippy::float_cmp)]
			(Value::Number(a), Value::Number(b)) => a == b,
			(Value::String(a), Value::String(b)) => a == b,
			(Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
			(Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}

	/// The platform's default string conversion.
	#[must_use]
	pub fn to_js_string(&self) -> String {
		match self {
			Value::Null => "null".to_owned(),
			Value::Undefined => "undefined".to_owned(),
			Value::Bool(b) => b.to_string(),
			Value::Number(n) => format_number(*n),
			Value::String(s) => s.to_string(),
			Value::Object(o) => o.to_js_string(),
			Value::Function(_) => "function () { [native code] }".to_owned(),
		}
	}

	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_object(&self) -> Option<&Rc<Object<N>>> {
		match self {
			Value::Object(o) => Some(o),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_function(&self) -> Option<&Handler<N>> {
		match self {
			Value::Function(f) => Some(f),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Number(n) => Some(*n),
			_ => None,
		}
	}

	pub fn function(f: impl Fn(&N::Event) + 'static) -> Self {
		Value::Function(Rc::new(f))
	}
}

/// Formats `n` the way JavaScript's `String(n)` does.
///
/// Magnitudes below `1e-6` or from `1e21` up are written in exponent notation, like `1e+21` or `1.5e-7`.
#[must_use]
pub fn format_number(n: f64) -> String {
	if n.is_nan() {
		"NaN".to_owned()
	} else if n.is_infinite() {
		let infinity = if n > 0.0 { "Infinity" } else { "-Infinity" };
		infinity.to_owned()
	} else if n == 0.0 {
		// Also `-0`.
		"0".to_owned()
	} else if (1e-6..1e21).contains(&n.abs()) {
		n.to_string()
	} else {
		let exponential = format!("{:e}", n);
		match exponential.split_once('e') {
			Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{}e+{}", mantissa, exponent),
			_ => exponential,
		}
	}
}

impl<N: HostNode> From<&str> for Value<N> {
	fn from(s: &str) -> Self {
		Value::String(s.into())
	}
}
impl<N: HostNode> From<String> for Value<N> {
	fn from(s: String) -> Self {
		Value::String(s.into())
	}
}
impl<N: HostNode> From<Rc<str>> for Value<N> {
	fn from(s: Rc<str>) -> Self {
		Value::String(s)
	}
}
impl<N: HostNode> From<f64> for Value<N> {
	fn from(n: f64) -> Self {
		Value::Number(n)
	}
}
impl<N: HostNode> From<i32> for Value<N> {
	fn from(n: i32) -> Self {
		Value::Number(n.into())
	}
}
impl<N: HostNode> From<bool> for Value<N> {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}
impl<N: HostNode> From<Object<N>> for Value<N> {
	fn from(o: Object<N>) -> Self {
		Value::Object(Rc::new(o))
	}
}
impl<N: HostNode, T: Into<Value<N>>> From<Option<T>> for Value<N> {
	fn from(value: Option<T>) -> Self {
		value.map_or(Value::Null, Into::into)
	}
}

/// A plain object value: ordered fields plus an optional custom string conversion.
pub struct Object<N: HostNode> {
	fields: Vec<(Rc<str>, Value<N>)>,
	display: Option<Rc<dyn Fn() -> String>>,
}

impl<N: HostNode> Default for Object<N> {
	fn default() -> Self {
		Self::new()
	}
}

impl<N: HostNode> Debug for Object<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.fields.iter().map(|(k, v)| (k, v))).finish()
	}
}

impl<N: HostNode> Object<N> {
	#[must_use]
	pub fn new() -> Self {
		Self { fields: Vec::new(), display: None }
	}

	/// Sets a field, replacing an existing one with the same name in place.
	#[must_use]
	pub fn field(mut self, name: &str, value: impl Into<Value<N>>) -> Self {
		let value = value.into();
		match self.fields.iter_mut().find(|(k, _)| &**k == name) {
			Some((_, existing)) => *existing = value,
			None => self.fields.push((name.into(), value)),
		}
		self
	}

	/// Gives the object its own string conversion, used instead of `[object Object]`.
	#[must_use]
	pub fn with_display(mut self, display: impl Fn() -> String + 'static) -> Self {
		self.display = Some(Rc::new(display));
		self
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&Value<N>> {
		self.fields.iter().find(|(k, _)| &**k == name).map(|(_, v)| v)
	}

	pub fn fields(&self) -> impl Iterator<Item = (&str, &Value<N>)> {
		self.fields.iter().map(|(k, v)| (&**k, v))
	}

	#[must_use]
	pub fn to_js_string(&self) -> String {
		match &self.display {
			Some(display) => display(),
			None => "[object Object]".to_owned(),
		}
	}
}

/// Ordered, uniquely named values. Used for props and for component state.
pub struct Props<N: HostNode> {
	entries: Vec<(Rc<str>, Value<N>)>,
}

/// Component state has the same shape as props.
pub type State<N> = Props<N>;

impl<N: HostNode> Clone for Props<N> {
	fn clone(&self) -> Self {
		Self { entries: self.entries.clone() }
	}
}

impl<N: HostNode> Default for Props<N> {
	fn default() -> Self {
		Self::new()
	}
}

impl<N: HostNode> Debug for Props<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.entries.iter().map(|(k, v)| (k, v))).finish()
	}
}

impl<N: HostNode> Props<N> {
	#[must_use]
	pub fn new() -> Self {
		Self { entries: Vec::new() }
	}

	#[must_use]
	pub fn with(mut self, name: &str, value: impl Into<Value<N>>) -> Self {
		self.set(name, value);
		self
	}

	/// Sets `name`, keeping its original position if it was already present.
	pub fn set(&mut self, name: &str, value: impl Into<Value<N>>) {
		let value = value.into();
		match self.entries.iter_mut().find(|(k, _)| &**k == name) {
			Some((_, existing)) => *existing = value,
			None => self.entries.push((name.into(), value)),
		}
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&Value<N>> {
		self.entries.iter().find(|(k, _)| &**k == name).map(|(_, v)| v)
	}

	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	pub fn remove(&mut self, name: &str) -> Option<Value<N>> {
		let index = self.entries.iter().position(|(k, _)| &**k == name)?;
		Some(self.entries.remove(index).1)
	}

	/// Copies all of `patch` over `self`, left to right.
	pub fn merge(&mut self, patch: Props<N>) {
		for (name, value) in patch.entries {
			self.set(&name, value)
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value<N>)> {
		self.entries.iter().map(|(k, v)| (&**k, v))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// An element description.
pub struct Element<N: HostNode> {
	pub(crate) tag: Rc<str>,
	pub(crate) props: Props<N>,
	pub(crate) children: Vec<VNode<N>>,
	pub(crate) node_ref: Option<NodeRef<N>>,
}

impl<N: HostNode> Element<N> {
	#[must_use]
	pub fn tag(&self) -> &str {
		&self.tag
	}

	#[must_use]
	pub fn props(&self) -> &Props<N> {
		&self.props
	}

	#[must_use]
	pub fn children(&self) -> &[VNode<N>] {
		&self.children
	}
}

/// A component description.
pub struct ComponentNode<N: HostNode> {
	pub(crate) kind: ComponentKind<N>,
	pub(crate) props: Props<N>,
	pub(crate) children: Vec<VNode<N>>,
	pub(crate) component_ref: Option<ComponentRef<N>>,
}

/// A virtual node.
pub enum VNode<N: HostNode> {
	/// `null`, `undefined`, `true` and `false`: renders nothing.
	Empty,
	/// Strings and numbers.
	Text(Rc<str>),
	Element(Element<N>),
	Component(ComponentNode<N>),
}

impl<N: HostNode> Clone for Element<N> {
	fn clone(&self) -> Self {
		Self {
			tag: Rc::clone(&self.tag),
			props: self.props.clone(),
			children: self.children.clone(),
			node_ref: self.node_ref.clone(),
		}
	}
}

impl<N: HostNode> Clone for ComponentNode<N> {
	fn clone(&self) -> Self {
		Self {
			kind: self.kind.clone(),
			props: self.props.clone(),
			children: self.children.clone(),
			component_ref: self.component_ref.clone(),
		}
	}
}

impl<N: HostNode> Clone for VNode<N> {
	fn clone(&self) -> Self {
		match self {
			VNode::Empty => VNode::Empty,
			VNode::Text(text) => VNode::Text(Rc::clone(text)),
			VNode::Element(element) => VNode::Element(element.clone()),
			VNode::Component(component) => VNode::Component(component.clone()),
		}
	}
}

impl<N: HostNode> Debug for VNode<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			VNode::Empty => f.write_str("Empty"),
			VNode::Text(text) => f.debug_tuple("Text").field(text).finish(),
			VNode::Element(element) => f
				.debug_struct("Element")
				.field("tag", &element.tag)
				.field("props", &element.props)
				.field("children", &element.children)
				.finish(),
			VNode::Component(component) => f
				.debug_struct("Component")
				.field("kind", &component.kind.name())
				.field("props", &component.props)
				.field("children", &component.children)
				.finish(),
		}
	}
}

/// Shorthand for [`VNode::element`].
#[must_use]
pub fn h<N: HostNode>(tag: &str) -> VNode<N> {
	VNode::element(tag)
}

impl<N: HostNode> VNode<N> {
	#[must_use]
	pub fn element(tag: &str) -> Self {
		VNode::Element(Element {
			tag: tag.into(),
			props: Props::new(),
			children: Vec::new(),
			node_ref: None,
		})
	}

	pub fn text(text: impl Into<Rc<str>>) -> Self {
		VNode::Text(text.into())
	}

	#[must_use]
	pub fn number(n: f64) -> Self {
		VNode::Text(format_number(n).into())
	}

	/// A stateful component, constructed from its props on first mount.
	#[must_use]
	pub fn component<C: Component<N>>() -> Self {
		VNode::Component(ComponentNode {
			kind: ComponentKind::stateful::<C>(),
			props: Props::new(),
			children: Vec::new(),
			component_ref: None,
		})
	}

	/// A stateless component.
	#[must_use]
	pub fn function(render: fn(&Props<N>, &[VNode<N>]) -> VNode<N>) -> Self {
		VNode::Component(ComponentNode {
			kind: ComponentKind::Function(render),
			props: Props::new(),
			children: Vec::new(),
			component_ref: None,
		})
	}

	/// Sets a prop. Ignored on text and empty nodes.
	#[must_use]
	pub fn prop(mut self, name: &str, value: impl Into<Value<N>>) -> Self {
		match &mut self {
			VNode::Element(Element { props, .. }) | VNode::Component(ComponentNode { props, .. }) => props.set(name, value),
			VNode::Empty | VNode::Text(_) => (),
		}
		self
	}

	/// Shorthand for a function-valued prop, like an `on*` event handler.
	#[must_use]
	pub fn on(self, name: &str, handler: impl Fn(&N::Event) + 'static) -> Self {
		self.prop(name, Value::function(handler))
	}

	#[must_use]
	pub fn child(mut self, child: impl Into<VNode<N>>) -> Self {
		match &mut self {
			VNode::Element(Element { children, .. }) | VNode::Component(ComponentNode { children, .. }) => children.push(child.into()),
			VNode::Empty | VNode::Text(_) => (),
		}
		self
	}

	#[must_use]
	pub fn children<I>(self, children: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<VNode<N>>,
	{
		children.into_iter().fold(self, |node, child| node.child(child))
	}

	/// Element refs receive the host node.
	///
	/// Refs are compared by identity across renders: a different ref is first called with [`None`] for the old one.
	/// Use [`shared_node_ref`](`VNode::shared_node_ref`) to keep the same ref between renders.
	#[must_use]
	pub fn node_ref(self, node_ref: impl Fn(Option<&N>) + 'static) -> Self {
		self.shared_node_ref(Rc::new(node_ref))
	}

	#[must_use]
	pub fn shared_node_ref(mut self, node_ref: NodeRef<N>) -> Self {
		if let VNode::Element(element) = &mut self {
			element.node_ref = Some(node_ref)
		}
		self
	}

	/// Component refs receive the instance handle, and are compared by identity like [`node_ref`](`VNode::node_ref`)s.
	#[must_use]
	pub fn component_ref(self, component_ref: impl Fn(Option<&ComponentHandle<N>>) + 'static) -> Self {
		self.shared_component_ref(Rc::new(component_ref))
	}

	#[must_use]
	pub fn shared_component_ref(mut self, component_ref: ComponentRef<N>) -> Self {
		if let VNode::Component(component) = &mut self {
			component.component_ref = Some(component_ref)
		}
		self
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		matches!(self, VNode::Empty)
	}
}

impl<N: HostNode> From<&str> for VNode<N> {
	fn from(text: &str) -> Self {
		VNode::Text(text.into())
	}
}
impl<N: HostNode> From<String> for VNode<N> {
	fn from(text: String) -> Self {
		VNode::Text(text.into())
	}
}
impl<N: HostNode> From<f64> for VNode<N> {
	fn from(n: f64) -> Self {
		VNode::number(n)
	}
}
impl<N: HostNode> From<i32> for VNode<N> {
	fn from(n: i32) -> Self {
		VNode::number(n.into())
	}
}
/// Booleans render nothing.
impl<N: HostNode> From<bool> for VNode<N> {
	fn from(_: bool) -> Self {
		VNode::Empty
	}
}
impl<N: HostNode> From<()> for VNode<N> {
	fn from((): ()) -> Self {
		VNode::Empty
	}
}
impl<N: HostNode, T: Into<VNode<N>>> From<Option<T>> for VNode<N> {
	fn from(value: Option<T>) -> Self {
		value.map_or(VNode::Empty, Into::into)
	}
}

#[cfg(test)]
mod tests {
	use super::format_number;

	#[test]
	fn numbers_format_like_javascript() {
		let cases = [
			(0.0, "0"),
			(-0.0, "0"),
			(5.0, "5"),
			(-2.5, "-2.5"),
			(0.1 + 0.2, "0.30000000000000004"),
			(1e-6, "0.000001"),
			(1e-7, "1e-7"),
			(-1.5e-7, "-1.5e-7"),
			(123_456_789_012_345_680_000.0, "123456789012345680000"),
			(1e21, "1e+21"),
			(2.5e300, "2.5e+300"),
			(f64::NAN, "NaN"),
			(f64::NEG_INFINITY, "-Infinity"),
		];
		for (n, expected) in cases {
			assert_eq!(format_number(n), expected, "{:?}", n);
		}
	}
}
