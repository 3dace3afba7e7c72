#![cfg(target_arch = "wasm32")]

use js_sys::Promise;
use std::{cell::Cell, rc::Rc};
use vnode_dom::{render, unmount, Component, Object, Props, RenderContext, State, VNode, Value};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, Element, HtmlElement, HtmlInputElement, Node};

wasm_bindgen_test_configure!(run_in_browser);

static mut LOG_INITIALIZED: bool = false;

fn h(tag: &str) -> VNode<Node> {
	vnode_dom::h(tag)
}

fn scratch() -> Element {
	unsafe {
		if !LOG_INITIALIZED {
			tracing_wasm::set_as_global_default();
			LOG_INITIALIZED = true;
		}
	}

	let document = window().unwrap().document().unwrap();
	let scratch = document.create_element("div").unwrap();
	document.body().unwrap().append_child(&scratch).unwrap();
	scratch
}

fn root(scratch: &Element) -> &Node {
	scratch
}

#[wasm_bindgen_test]
fn create_and_update() {
	let scratch = scratch();
	render(h("div").prop("class", "foo").child("a").child(h("b")), root(&scratch), None);
	assert_eq!(scratch.inner_html(), r#"<div class="foo">a<b></b></div>"#);

	render(h("div").child("b").child(h("i")), root(&scratch), None);
	assert_eq!(scratch.inner_html(), "<div>b<i></i></div>");

	unmount(root(&scratch));
	assert_eq!(scratch.inner_html(), "");
	scratch.remove();
}

#[wasm_bindgen_test]
fn click() {
	let scratch = scratch();
	let clicks = Rc::new(Cell::new(0));
	let handler = {
		let clicks = Rc::clone(&clicks);
		move |event: &web_sys::Event| {
			assert_eq!(event.type_(), "click");
			clicks.set(clicks.get() + 1)
		}
	};

	render(h("button").on("onClick", handler), root(&scratch), None);
	let button = scratch.first_element_child().unwrap().dyn_into::<HtmlElement>().unwrap();
	button.click();
	assert_eq!(clicks.get(), 1);

	render(h("button"), root(&scratch), None);
	button.click();
	assert_eq!(clicks.get(), 1);
	scratch.remove();
}

#[wasm_bindgen_test]
fn live_values_and_style() {
	let scratch = scratch();
	render(
		h("input").prop("value", "a").prop("style", Object::new().field("width", 10)),
		root(&scratch),
		None,
	);
	let input = scratch.first_element_child().unwrap().dyn_into::<HtmlInputElement>().unwrap();
	assert_eq!(input.value(), "a");
	assert_eq!(input.get_attribute("style").as_deref(), Some("width: 10px;"));

	input.set_value("typed");
	render(h("input").prop("value", "a"), root(&scratch), None);
	assert_eq!(input.value(), "a");
	assert_eq!(input.get_attribute("style"), None);
	scratch.remove();
}

#[wasm_bindgen_test]
fn svg_namespace() {
	let scratch = scratch();
	render(h("svg").child(h("circle").prop("r", 5)), root(&scratch), None);
	let circle = scratch.first_element_child().unwrap().first_element_child().unwrap();
	assert_eq!(circle.namespace_uri().as_deref(), Some("http://www.w3.org/2000/svg"));
	assert_eq!(circle.get_attribute("r").as_deref(), Some("5"));
	scratch.remove();
}

#[wasm_bindgen_test]
fn hydrate() {
	let scratch = scratch();
	scratch.set_inner_html(r#"<p title="old">text</p>"#);
	let p: Node = scratch.first_child().unwrap();

	render(h("p").child("text"), root(&scratch), Some(&p));
	assert_eq!(scratch.inner_html(), "<p>text</p>");
	assert_eq!(scratch.first_child(), Some(p));
	scratch.remove();
}

struct Counter;

impl Component<Node> for Counter {
	fn create(_: &Props<Node>) -> Self {
		Counter
	}

	fn initial_state(&self, _: &Props<Node>) -> State<Node> {
		State::new().with("count", 0)
	}

	fn render(&mut self, cx: &RenderContext<'_, Node>) -> VNode<Node> {
		VNode::number(cx.state.get("count").and_then(Value::as_f64).unwrap_or_default())
	}
}

#[wasm_bindgen_test]
async fn state_updates_flush_in_a_microtask() {
	let scratch = scratch();
	let counter = render(VNode::component::<Counter>(), root(&scratch), None).component.unwrap();
	counter.set_state(State::new().with("count", 1));
	counter.set_state(State::new().with("count", 2));
	assert_eq!(scratch.inner_html(), "0");

	JsFuture::from(Promise::resolve(&JsValue::UNDEFINED)).await.unwrap();
	assert_eq!(scratch.inner_html(), "2");

	counter.set_state(State::new().with("count", 3));
	JsFuture::from(Promise::resolve(&JsValue::UNDEFINED)).await.unwrap();
	assert_eq!(scratch.inner_html(), "3");
	scratch.remove();
}
