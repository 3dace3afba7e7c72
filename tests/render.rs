use vnode_dom::{
	memory::{self, Node},
	render, unmount, HostNode, Object, VNode, Value,
};

fn h(tag: &str) -> VNode<Node> {
	vnode_dom::h(tag)
}

fn scratch() -> Node {
	Node::element("div")
}

#[test]
fn text_root() {
	let scratch = scratch();
	let mounted = render("Hello!", &scratch, None);
	assert_eq!(scratch.inner_html(), "Hello!");
	assert_eq!(mounted.node.and_then(|node| node.text()).as_deref(), Some("Hello!"));
	assert_eq!(mounted.component, None);
}

#[test]
fn text_root_is_updated_in_place() {
	let scratch = scratch();
	let before = render(42, &scratch, None).node;
	memory::reset_stats();
	let after = render("x", &scratch, None).node;
	assert_eq!(before, after);
	assert_eq!(scratch.inner_html(), "x");
	assert_eq!(memory::stats().texts_created, 0);
}

#[test]
fn nested_elements() {
	let scratch = scratch();
	let mounted = render(h("div").child(h("span").child("a")).child(h("x-foo")), &scratch, None);
	assert_eq!(scratch.inner_html(), "<div><span>a</span><x-foo></x-foo></div>");
	assert_eq!(mounted.node, scratch.first_child());
}

#[test]
fn text_is_escaped() {
	let scratch = scratch();
	render(h("p").child("<b> & </b>"), &scratch, None);
	assert_eq!(scratch.inner_html(), "<p>&lt;b&gt; &amp; &lt;/b&gt;</p>");
}

#[test]
fn falsy_children() {
	let scratch = scratch();
	render(
		h("div")
			.child(())
			.child(",")
			.child(Option::<&str>::None)
			.child(",")
			.child(false)
			.child(",")
			.child(0)
			.child(",")
			.child(f64::NAN),
		&scratch,
		None,
	);
	assert_eq!(scratch.first_child().unwrap().text_content(), ",,,0,NaN");
}

#[test]
fn booleans_render_nothing() {
	let scratch = scratch();
	render(h("div").child(true).child(h("b")).child(false), &scratch, None);
	assert_eq!(scratch.inner_html(), "<div><b></b></div>");
}

#[test]
fn falsy_attributes() {
	let scratch = scratch();
	render(
		h("div")
			.prop("anull", Value::Null)
			.prop("aundefined", Value::Undefined)
			.prop("afalse", false)
			.prop("anan", f64::NAN)
			.prop("a0", 0),
		&scratch,
		None,
	);
	let div = scratch.first_child().unwrap();
	assert_eq!(div.attribute("anull"), None);
	assert_eq!(div.attribute("aundefined"), None);
	assert_eq!(div.attribute("afalse"), None);
	assert_eq!(div.attribute("anan").as_deref(), Some("NaN"));
	assert_eq!(div.attribute("a0").as_deref(), Some("0"));
}

#[test]
fn falsy_live_values() {
	let scratch = scratch();
	let values: [Value<Node>; 4] = [0.into(), false.into(), Value::Null, Value::Undefined];
	render(h("div").children(values.iter().map(|value| h("input").prop("value", value.clone()))), &scratch, None);

	let inputs = scratch.first_child().unwrap().children();
	let rendered: Vec<String> = inputs.iter().map(Node::value).collect();
	assert_eq!(rendered, ["0", "false", "", ""]);
	assert_eq!(scratch.inner_html(), "<div><input><input><input><input></div>");
}

#[test]
fn falsy_properties_are_cleared() {
	let scratch = scratch();
	let test = |value: Value<Node>| {
		render(
			h("div").child(h("input").prop("value", value.clone())).child(h("table").prop("border", value)),
			&scratch,
			None,
		);
	};

	test("2".into());
	let div = scratch.first_child().unwrap();
	let input = div.first_child().unwrap();
	assert_eq!(input.value(), "2");
	assert_eq!(div.last_child().unwrap().attribute("border").as_deref(), Some("2"));

	test(false.into());
	assert_eq!(scratch.inner_html(), "<div><input><table></table></div>");
	assert_eq!(scratch.first_child().unwrap().first_child(), Some(input));
}

#[test]
fn attribute_order_follows_props() {
	let scratch = scratch();
	render(h("div").prop("foo", "bar").prop("data-foo", "databar"), &scratch, None);
	assert_eq!(scratch.inner_html(), r#"<div foo="bar" data-foo="databar"></div>"#);
}

#[test]
fn function_props_are_not_serialized() {
	let scratch = scratch();
	render(h("div").on("foo", |_| ()).on("ref", |_| ()), &scratch, None);
	assert_eq!(scratch.inner_html(), "<div></div>");
}

#[test]
fn object_props_are_stringified() {
	let scratch = scratch();
	render(h("div").prop("foo", Object::new().field("bar", "baz")), &scratch, None);
	assert_eq!(scratch.first_child().unwrap().attribute("foo").as_deref(), Some("[object Object]"));

	render(h("div").prop("foo", Object::new().with_display(|| "abc".to_owned())), &scratch, None);
	assert_eq!(scratch.first_child().unwrap().attribute("foo").as_deref(), Some("abc"));
}

#[test]
fn changed_attributes_only() {
	let scratch = scratch();
	render(h("div").prop("a", "1").prop("b", "2"), &scratch, None);
	render(h("div").prop("b", "3"), &scratch, None);
	assert_eq!(scratch.inner_html(), r#"<div b="3"></div>"#);
	render(h("div").prop("b", Value::Null).prop("c", 4), &scratch, None);
	assert_eq!(scratch.inner_html(), r#"<div c="4"></div>"#);
}

#[test]
fn class_and_class_name() {
	let scratch = scratch();
	render(h("div").prop("class", "foo"), &scratch, None);
	assert_eq!(scratch.inner_html(), r#"<div class="foo"></div>"#);
	render(h("div").prop("className", "bar"), &scratch, None);
	assert_eq!(scratch.inner_html(), r#"<div class="bar"></div>"#);
	render(h("div").prop("className", ""), &scratch, None);
	assert_eq!(scratch.inner_html(), "<div></div>");
}

#[test]
fn style_strings_and_objects() {
	let scratch = scratch();
	render(h("div").prop("style", "color: rgb(0, 255, 255)"), &scratch, None);
	let div = scratch.first_child().unwrap();
	assert_eq!(div.css_text(), "color: rgb(0, 255, 255);");

	render(h("div").prop("style", Object::new().field("backgroundColor", "rgb(0, 255, 255)")), &scratch, None);
	assert_eq!(div.css_text(), "background-color: rgb(0, 255, 255);");

	render(h("div").prop("style", Object::new().field("width", 10).field("opacity", 0.5).field("zIndex", 3)), &scratch, None);
	assert_eq!(div.style_property("backgroundColor"), "");
	assert_eq!(div.style_property("width"), "10px");
	assert_eq!(div.style_property("opacity"), "0.5");
	assert_eq!(div.style_property("z-index"), "3");

	render(h("div"), &scratch, None);
	assert_eq!(div.attribute("style"), None);
	assert_eq!(scratch.first_child(), Some(div));
}

#[test]
fn input_list_stays_an_attribute() {
	let scratch = scratch();
	render(
		h("input").prop("type", "range").prop("min", 0).prop("max", 100).prop("list", "steplist"),
		&scratch,
		None,
	);
	assert_eq!(scratch.inner_html(), r#"<input type="range" min="0" max="100" list="steplist">"#);
}

#[test]
fn svg_namespace() {
	let scratch = scratch();
	render(
		h("svg")
			.prop("viewBox", "0 0 10 10")
			.prop("className", "icon")
			.child(h("use").prop("xlinkHref", "#dot"))
			.child(h("foreignObject").child(h("div"))),
		&scratch,
		None,
	);

	let svg = scratch.first_child().unwrap();
	assert!(svg.is_svg());
	assert_eq!(svg.attribute("viewBox").as_deref(), Some("0 0 10 10"));
	assert_eq!(svg.attribute("class").as_deref(), Some("icon"));

	let children = svg.children();
	assert!(children[0].is_svg());
	assert_eq!(children[0].attribute_ns("http://www.w3.org/1999/xlink", "href").as_deref(), Some("#dot"));
	assert_eq!(children[1].node_name(), "foreignObject");
	assert!(!children[1].first_child().unwrap().is_svg());
}

#[test]
fn svg_containers() {
	let group = Node::svg_element("g");
	render(h("circle").prop("r", 5).prop("className", "dot"), &group, None);
	let circle = group.first_child().unwrap();
	assert!(circle.is_svg());
	assert_eq!(group.inner_html(), r#"<circle r="5" class="dot"></circle>"#);

	let foreign = Node::svg_element("foreignObject");
	render(h("div"), &foreign, None);
	assert!(!foreign.first_child().unwrap().is_svg());
}

#[test]
fn untouched_siblings() {
	let scratch = scratch();
	let foreign = Node::element("aside");
	scratch.append_child(&foreign);

	render(h("main"), &scratch, None);
	assert_eq!(scratch.inner_html(), "<aside></aside><main></main>");

	render(h("section"), &scratch, None);
	assert_eq!(scratch.inner_html(), "<aside></aside><section></section>");

	unmount(&scratch);
	assert_eq!(scratch.inner_html(), "<aside></aside>");
}

#[test]
fn empty_tree_unmounts() {
	let scratch = scratch();
	render(h("div").child("a"), &scratch, None);
	let mounted = render((), &scratch, None);
	assert_eq!(mounted.node, None);
	assert_eq!(scratch.inner_html(), "");

	render(h("p"), &scratch, None);
	assert_eq!(scratch.inner_html(), "<p></p>");
}

#[test]
fn node_refs() {
	use std::{cell::RefCell, rc::Rc};

	let scratch = scratch();
	let seen = Rc::new(RefCell::new(Vec::new()));
	let node_ref = {
		let seen = Rc::clone(&seen);
		move |node: Option<&Node>| seen.borrow_mut().push(node.map(Node::node_name))
	};

	render(h("div").child(h("b").node_ref(node_ref)), &scratch, None);
	assert_eq!(*seen.borrow(), [Some("B".to_owned())]);

	render(h("div"), &scratch, None);
	assert_eq!(*seen.borrow(), [Some("B".to_owned()), None]);
}

#[test]
fn changed_node_refs() {
	use std::{cell::RefCell, rc::Rc};
	use vnode_dom::vnode::NodeRef;

	let scratch = scratch();
	let seen = Rc::new(RefCell::new(Vec::new()));
	let named = |name: &'static str| -> NodeRef<Node> {
		let seen = Rc::clone(&seen);
		Rc::new(move |node: Option<&Node>| seen.borrow_mut().push((name, node.cloned())))
	};

	let first = named("first");
	render(h("p").shared_node_ref(Rc::clone(&first)), &scratch, None);
	let p = scratch.first_child().unwrap();
	render(h("p").shared_node_ref(first), &scratch, None);
	assert_eq!(*seen.borrow(), [("first", Some(p.clone()))]);

	seen.borrow_mut().clear();
	render(h("p").shared_node_ref(named("second")), &scratch, None);
	assert_eq!(*seen.borrow(), [("first", None), ("second", Some(p.clone()))]);
	assert_eq!(scratch.first_child(), Some(p));
}

#[test]
fn unchanged_rerender_is_free() {
	let scratch = scratch();
	let tree = || h("ul").children((0..3).map(|i| h("li").prop("class", "item").child(i)));
	render(tree(), &scratch, None);

	memory::reset_stats();
	render(tree(), &scratch, None);
	assert_eq!(memory::stats(), memory::Stats::default());
}
