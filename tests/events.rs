use std::{cell::RefCell, rc::Rc};
use vnode_dom::{
	memory::{self, EventPhase, Node},
	render, unmount, HostNode, VNode,
};

fn h(tag: &str) -> VNode<Node> {
	vnode_dom::h(tag)
}

fn scratch() -> Node {
	Node::element("div")
}

type Log = Rc<RefCell<Vec<String>>>;

fn logger(log: &Log, entry: &'static str) -> impl Fn(&memory::Event) + 'static {
	let log = Rc::clone(log);
	move |_: &memory::Event| log.borrow_mut().push(entry.to_owned())
}

#[test]
fn only_functions_are_registered() {
	let scratch = scratch();
	let log = Log::default();
	memory::reset_stats();

	render(h("div").on("onClick", logger(&log, "click")).prop("onOther", "foo").prop("onAnother", false), &scratch, None);

	let stats = memory::stats();
	assert_eq!(stats.listeners_added, [("click".to_owned(), false)]);
	assert!(stats.listeners_removed.is_empty());

	scratch.first_child().unwrap().click();
	assert_eq!(*log.borrow(), ["click"]);
}

#[test]
fn replacing_a_handler_keeps_the_native_listener() {
	let scratch = scratch();
	let log = Log::default();

	render(h("div").on("onClick", logger(&log, "first")), &scratch, None);
	memory::reset_stats();
	render(h("div").on("onClick", logger(&log, "second")), &scratch, None);
	assert_eq!(memory::stats(), memory::Stats::default());

	let div = scratch.first_child().unwrap();
	assert_eq!(div.listener_count(), 1);
	div.click();
	assert_eq!(*log.borrow(), ["second"]);
}

#[test]
fn removed_handlers() {
	let scratch = scratch();
	let log = Log::default();

	render(
		h("div").on("onClick", logger(&log, "click")).on("onMouseDown", logger(&log, "mousedown")),
		&scratch,
		None,
	);
	memory::reset_stats();

	render(h("div").on("onClick", logger(&log, "click")), &scratch, None);
	assert_eq!(memory::stats().listeners_removed, [("mousedown".to_owned(), false)]);

	render(h("div"), &scratch, None);
	assert_eq!(
		memory::stats().listeners_removed,
		[("mousedown".to_owned(), false), ("click".to_owned(), false)]
	);

	let div = scratch.first_child().unwrap();
	assert_eq!(div.listener_count(), 0);
	div.click();
	div.dispatch_event("mousedown", true);
	assert!(log.borrow().is_empty());
}

#[test]
fn event_names_are_lower_cased() {
	let scratch = scratch();
	let log = Log::default();
	render(h("div").on("onDblClick", logger(&log, "dblclick")), &scratch, None);

	scratch.first_child().unwrap().dispatch_event("dblclick", true);
	assert_eq!(*log.borrow(), ["dblclick"]);
}

#[test]
fn capture_phase() {
	let scratch = scratch();
	let phases = Rc::new(RefCell::new(Vec::new()));
	let record = |name: &'static str| {
		let phases = Rc::clone(&phases);
		move |event: &memory::Event| phases.borrow_mut().push((name, event.kind().to_owned(), event.phase()))
	};

	render(
		h("div")
			.on("onClickCapture", record("div capture"))
			.on("onClick", record("div"))
			.on("onFocusCapture", record("div capture"))
			.child(h("button").on("onClick", record("button"))),
		&scratch,
		None,
	);

	let button = scratch.first_child().unwrap().first_child().unwrap();
	button.click();
	// Focus doesn't bubble, but capturing listeners still see it.
	button.dispatch_event("focus", false);

	assert_eq!(
		*phases.borrow(),
		[
			("div capture", "click".to_owned(), EventPhase::Capturing),
			("button", "click".to_owned(), EventPhase::AtTarget),
			("div", "click".to_owned(), EventPhase::Bubbling),
			("div capture", "focus".to_owned(), EventPhase::Capturing),
		]
	);
}

#[test]
fn capture_and_bubble_listeners_are_separate() {
	let scratch = scratch();
	let log = Log::default();
	memory::reset_stats();

	render(
		h("div").on("onClick", logger(&log, "bubble")).on("onClickCapture", logger(&log, "capture")),
		&scratch,
		None,
	);
	assert_eq!(memory::stats().listeners_added, [("click".to_owned(), false), ("click".to_owned(), true)]);

	render(h("div").on("onClick", logger(&log, "bubble")), &scratch, None);
	assert_eq!(memory::stats().listeners_removed, [("click".to_owned(), true)]);
}

#[test]
fn unmounting_removes_listeners() {
	let scratch = scratch();
	let log = Log::default();
	render(h("div").child(h("button").on("onClick", logger(&log, "click"))), &scratch, None);
	let button = scratch.first_child().unwrap().first_child().unwrap();

	unmount(&scratch);
	assert_eq!(button.listener_count(), 0);
	button.click();
	assert!(log.borrow().is_empty());
}

#[test]
fn handlers_see_the_current_target() {
	let scratch = scratch();
	let seen = Rc::new(RefCell::new(None));
	let handler = {
		let seen = Rc::clone(&seen);
		move |event: &memory::Event| *seen.borrow_mut() = event.current_target()
	};
	render(h("ul").on("onClick", handler).child(h("li")), &scratch, None);

	let ul = scratch.first_child().unwrap();
	ul.first_child().unwrap().click();
	assert_eq!(*seen.borrow(), Some(ul));
}
