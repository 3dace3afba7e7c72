use vnode_dom::{
	memory::{self, Node},
	render, Component, HostNode, Object, Props, RenderContext, State, VNode, Value,
};

fn h(tag: &str) -> VNode<Node> {
	vnode_dom::h(tag)
}

fn scratch() -> Node {
	Node::element("div")
}

fn html(markup: &str) -> Object<Node> {
	Object::new().field("__html", markup)
}

#[test]
fn set_unset_and_set_again() {
	let scratch = scratch();
	let markup = "<b>foo &amp; bar</b>";

	let root = render(h("div").prop("dangerouslySetInnerHTML", html(markup)), &scratch, None).node;
	assert_eq!(scratch.first_child().unwrap().inner_html(), markup);

	render(h("div").child("a").child(h("strong").child("b")), &scratch, root.as_ref());
	assert_eq!(scratch.inner_html(), "<div>a<strong>b</strong></div>");

	render(h("div").prop("dangerouslySetInnerHTML", html(markup)), &scratch, root.as_ref());
	assert_eq!(scratch.inner_html(), format!("<div>{}</div>", markup));
	assert_eq!(scratch.first_child(), root);
}

#[test]
fn same_markup_is_not_set_again() {
	let scratch = scratch();
	render(h("div").prop("dangerouslySetInnerHTML", html("<i>x</i>")), &scratch, None);
	let italic = scratch.first_child().unwrap().first_child().unwrap();

	render(h("div").prop("dangerouslySetInnerHTML", html("<i>x</i>")), &scratch, None);
	assert_eq!(scratch.first_child().unwrap().first_child(), Some(italic));

	render(h("div").prop("dangerouslySetInnerHTML", html("<i>y</i>")), &scratch, None);
	assert_eq!(scratch.inner_html(), "<div><i>y</i></div>");
}

#[test]
fn hydration() {
	let scratch = scratch();
	let markup = "<div><b>foo &amp; bar</b></div>";
	scratch.set_inner_html(markup);
	let hint = scratch.last_child();

	render(
		h("div").prop("dangerouslySetInnerHTML", html("<b>foo &amp; bar</b>")),
		&scratch,
		hint.as_ref(),
	);
	assert_eq!(scratch.inner_html(), markup);
	assert_eq!(scratch.last_child(), hint);
}

#[test]
fn falsy_markup_is_ignored() {
	let scratch = scratch();
	render(h("div").prop("dangerouslySetInnerHTML", Value::Null).child("text"), &scratch, None);
	assert_eq!(scratch.inner_html(), "<div>text</div>");
}

struct Thing;

impl Component<Node> for Thing {
	fn create(_: &Props<Node>) -> Self {
		Thing
	}

	fn initial_state(&self, _: &Props<Node>) -> State<Node> {
		State::new().with("html", html("<foo><bar>test</bar></foo>"))
	}

	fn render(&mut self, cx: &RenderContext<'_, Node>) -> VNode<Node> {
		match cx.state.get("html") {
			Some(value) if value.is_truthy() => h("div").prop("dangerouslySetInnerHTML", value.clone()),
			_ => h("div"),
		}
	}
}

#[test]
fn component_toggles_markup() {
	let scratch = scratch();
	let thing = render(VNode::component::<Thing>(), &scratch, None).component.unwrap();
	assert_eq!(scratch.inner_html(), "<div><foo><bar>test</bar></foo></div>");

	thing.set_state(State::new().with("html", false));
	thing.force_update();
	assert_eq!(scratch.inner_html(), "<div></div>");

	thing.set_state(State::new().with("html", html("<foo><bar>test</bar></foo>")));
	thing.force_update();
	assert_eq!(scratch.inner_html(), "<div><foo><bar>test</bar></foo></div>");

	// Both updates were already rendered synchronously.
	memory::run_tasks();
	assert_eq!(scratch.inner_html(), "<div><foo><bar>test</bar></foo></div>");
}
