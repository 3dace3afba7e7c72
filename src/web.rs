//! [`HostNode`] for the browser DOM, through [`web_sys`].
//!
//! Only functional on `wasm32` targets with a JavaScript host; on other targets, every call panics.

use crate::host::{HostNode, NodeKind, Scalar};
use core::{
	any::Any,
	cell::{Cell, RefCell},
};
use hashbrown::HashMap;
use js_sys::{Function, Promise, Reflect};
use std::rc::Rc;
use tracing::{error, trace};
use wasm_bindgen::{closure::Closure, JsCast, JsValue, UnwrapThrowExt};
use web_sys::{Attr, CharacterData, CssStyleDeclaration, Document, Element, NamedNodeMap, Node};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Expando property holding the key of a node's attachment.
const ATTACHMENT_KEY: &str = "__vnodeDomAttachment";

thread_local! {
	static ATTACHMENTS: RefCell<HashMap<u32, Rc<dyn Any>>> = RefCell::new(HashMap::new());
	static NEXT_ATTACHMENT: Cell<u32> = Cell::new(0);
}

fn owner_document(node: &Node) -> Document {
	match node.dyn_ref::<Document>() {
		Some(document) => document.clone(),
		None => node.owner_document().expect_throw("vnode-dom: No owner document found."),
	}
}

fn style(node: &Node) -> Option<CssStyleDeclaration> {
	Reflect::get(node, &JsValue::from_str("style")).ok()?.dyn_into::<CssStyleDeclaration>().ok()
}

fn attribute_pairs(attributes: &NamedNodeMap) -> Vec<(String, String)> {
	(0..attributes.length())
		.filter_map(|i| attributes.item(i))
		.map(|attribute: Attr| (attribute.name(), attribute.value()))
		.collect()
}

impl HostNode for Node {
	type Event = web_sys::Event;
	type Listener = Closure<dyn Fn(web_sys::Event)>;

	fn create_element(&self, tag: &str, svg: bool) -> Self {
		let document = owner_document(self);
		let element = if svg {
			document.create_element_ns(Some(SVG_NAMESPACE), tag)
		} else {
			document.create_element(tag)
		};
		element.expect_throw("vnode-dom: Failed to create element.").into()
	}

	fn create_text(&self, data: &str) -> Self {
		owner_document(self).create_text_node(data).into()
	}

	fn kind(&self) -> NodeKind {
		match self.node_type() {
			Node::ELEMENT_NODE => NodeKind::Element,
			Node::TEXT_NODE => NodeKind::Text,
			_ => NodeKind::Other,
		}
	}

	fn local_name(&self) -> Option<String> {
		self.dyn_ref::<Element>().map(Element::local_name)
	}

	fn is_svg(&self) -> bool {
		self.dyn_ref::<Element>().map_or(false, |element| element.namespace_uri().as_deref() == Some(SVG_NAMESPACE))
	}

	fn text(&self) -> Option<String> {
		self.dyn_ref::<CharacterData>().map(CharacterData::data)
	}

	fn set_text(&self, data: &str) {
		match self.dyn_ref::<CharacterData>() {
			Some(character_data) => character_data.set_data(data),
			None => error!("Tried to set the text of a node that isn't character data."),
		}
	}

	fn parent(&self) -> Option<Self> {
		self.parent_node()
	}

	fn first_child(&self) -> Option<Self> {
		Node::first_child(self)
	}

	fn next_sibling(&self) -> Option<Self> {
		Node::next_sibling(self)
	}

	fn insert_before(&self, child: &Self, reference: Option<&Self>) {
		if let Err(error) = Node::insert_before(self, child, reference) {
			error!("Failed to insert node: {:?}", error)
		}
	}

	fn remove_child(&self, child: &Self) {
		if let Err(error) = Node::remove_child(self, child) {
			error!("Failed to remove node: {:?}", error)
		}
	}

	fn attributes(&self) -> Vec<(String, String)> {
		self.dyn_ref::<Element>().map(|element| attribute_pairs(&element.attributes())).unwrap_or_default()
	}

	fn set_attribute(&self, name: &str, value: &str) {
		let element: &Element = self.unchecked_ref();
		if let Err(error) = element.set_attribute(name, value) {
			if cfg!(feature = "dangerous-logging") {
				error!("Failed to set attribute {:?} to {:?}: {:?}", name, value, error)
			} else {
				error!("Failed to set attribute {:?}: {:?}", name, error)
			}
		}
	}

	fn remove_attribute(&self, name: &str) {
		let element: &Element = self.unchecked_ref();
		if let Err(error) = element.remove_attribute(name) {
			error!("Failed to remove attribute {:?}: {:?}", name, error)
		}
	}

	fn set_attribute_ns(&self, namespace: &str, name: &str, value: &str) {
		let element: &Element = self.unchecked_ref();
		if let Err(error) = element.set_attribute_ns(Some(namespace), name, value) {
			error!("Failed to set attribute {:?} in namespace {:?}: {:?}", name, namespace, error)
		}
	}

	fn remove_attribute_ns(&self, namespace: &str, name: &str) {
		let element: &Element = self.unchecked_ref();
		if let Err(error) = element.remove_attribute_ns(Some(namespace), name) {
			error!("Failed to remove attribute {:?} in namespace {:?}: {:?}", name, namespace, error)
		}
	}

	fn set_property(&self, name: &str, value: Scalar<'_>) {
		let value = match value {
			Scalar::Bool(b) => JsValue::from_bool(b),
			Scalar::Number(n) => JsValue::from_f64(n),
			Scalar::Str(s) => JsValue::from_str(s),
		};
		if let Err(error) = Reflect::set(self, &JsValue::from_str(name), &value) {
			error!("Failed to set property {:?}: {:?}", name, error)
		}
	}

	fn set_style_text(&self, css_text: &str) {
		match style(self) {
			Some(style) => style.set_css_text(css_text),
			None => error!("Node has no style declaration."),
		}
	}

	fn set_style_property(&self, name: &str, value: &str) {
		let style = match style(self) {
			Some(style) => style,
			None => return error!("Node has no style declaration."),
		};
		let result = if name.contains('-') {
			style.set_property(name, value)
		} else {
			Reflect::set(&style, &JsValue::from_str(name), &JsValue::from_str(value)).map(drop)
		};
		if let Err(error) = result {
			error!("Failed to set style property {:?}: {:?}", name, error)
		}
	}

	fn set_inner_html(&self, html: &str) {
		match self.dyn_ref::<Element>() {
			Some(element) => element.set_inner_html(html),
			None => error!("Tried to set the inner HTML of a node that isn't an element."),
		}
	}

	fn add_event_listener(&self, event: &str, capture: bool, listener: Rc<dyn Fn(&Self::Event)>) -> Self::Listener {
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| listener(&event)) as Box<dyn Fn(web_sys::Event)>);
		if let Err(error) = self.add_event_listener_with_callback_and_bool(event, closure.as_ref().unchecked_ref(), capture) {
			error!("Failed to add event listener for {:?}: {:?}", event, error)
		}
		closure
	}

	fn remove_event_listener(&self, event: &str, capture: bool, listener: Self::Listener) {
		if let Err(error) = self.remove_event_listener_with_callback_and_bool(event, listener.as_ref().unchecked_ref(), capture) {
			error!("Failed to remove event listener for {:?}: {:?}", event, error)
		}
	}

	fn attachment(&self) -> Option<Rc<dyn Any>> {
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let key = Reflect::get(self, &JsValue::from_str(ATTACHMENT_KEY)).ok()?.as_f64()? as u32;
		ATTACHMENTS.with(|attachments| attachments.borrow().get(&key).cloned())
	}

	fn attach(&self, attachment: Option<Rc<dyn Any>>) {
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let existing = Reflect::get(self, &JsValue::from_str(ATTACHMENT_KEY))
			.ok()
			.and_then(|key| key.as_f64())
			.map(|key| key as u32);

		match attachment {
			Some(attachment) => {
				let key = existing.unwrap_or_else(|| {
					NEXT_ATTACHMENT.with(|next| {
						let key = next.get();
						next.set(key.wrapping_add(1));
						key
					})
				});
				ATTACHMENTS.with(|attachments| attachments.borrow_mut().insert(key, attachment));
				if let Err(error) = Reflect::set(self, &JsValue::from_str(ATTACHMENT_KEY), &JsValue::from(key)) {
					error!("Failed to attach data to node: {:?}", error)
				}
			}
			None => {
				if let Some(key) = existing {
					trace!("Detaching data from node.");
					ATTACHMENTS.with(|attachments| attachments.borrow_mut().remove(&key));
					Reflect::delete_property(self.unchecked_ref::<js_sys::Object>(), &JsValue::from_str(ATTACHMENT_KEY)).unwrap_throw();
				}
			}
		}
	}

	fn schedule(task: Box<dyn FnOnce()>) {
		// Freed after its only call.
		let callback = Closure::once_into_js(task);
		let promise = Promise::resolve(&JsValue::UNDEFINED);
		let then = Reflect::get(&promise, &JsValue::from_str("then")).and_then(|then| then.dyn_into::<Function>());
		if let Err(error) = then.and_then(|then| then.call1(&promise, &callback)) {
			error!("Failed to schedule a microtask: {:?}", error)
		}
	}
}
