//! Components: user types that render to virtual nodes, and the lifecycle driver that keeps them mounted.
//!
//! Hooks run in this order:
//!
//! - on mount: [`create`](`Component::create`), [`initial_state`](`Component::initial_state`), [`render`](`Component::render`),
//!   the component ref, and once the whole pass has settled [`did_mount`](`Component::did_mount`);
//! - on update: [`will_receive_props`](`Component::will_receive_props`) (only if the parent re-rendered),
//!   [`should_update`](`Component::should_update`) (unless forced), [`render`](`Component::render`),
//!   and once settled [`did_update`](`Component::did_update`);
//! - on unmount: [`will_unmount`](`Component::will_unmount`), then the component ref with [`None`].

use crate::{
	diff::diff_node,
	host::HostNode,
	rendered::{Previous, Rendered},
	schedule::{self, Deferred},
	vnode::{ComponentNode, ComponentRef, Props, State, VNode},
};
use core::{
	any::{type_name, Any, TypeId},
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
};
use std::rc::{Rc, Weak};
use tracing::{instrument, trace, trace_span, warn};

/// A stateful component.
///
/// Only [`create`](`Component::create`) and [`render`](`Component::render`) are required.
#[allow(unused_variables)]
pub trait Component<N: HostNode>: Sized + 'static {
	fn create(props: &Props<N>) -> Self;

	fn initial_state(&self, props: &Props<N>) -> State<N> {
		State::new()
	}

	fn render(&mut self, cx: &RenderContext<'_, N>) -> VNode<N>;

	/// Called before an update caused by the parent rendering this component again.
	fn will_receive_props(&mut self, next_props: &Props<N>, this: &ComponentHandle<N>) {}

	/// Return `false` to skip rendering. The state is updated either way.
	fn should_update(&mut self, next_props: &Props<N>, next_state: &State<N>) -> bool {
		true
	}

	fn did_mount(&mut self, this: &ComponentHandle<N>) {}

	fn did_update(&mut self, this: &ComponentHandle<N>, previous_props: &Props<N>, previous_state: &State<N>) {}

	fn will_unmount(&mut self, this: &ComponentHandle<N>) {}
}

/// What [`Component::render`] gets to see.
pub struct RenderContext<'a, N: HostNode> {
	pub props: &'a Props<N>,
	pub state: &'a State<N>,
	/// The children the parent passed in.
	pub children: &'a [VNode<N>],
	pub this: &'a ComponentHandle<N>,
}

/// The object-safe face of a component instance.
pub(crate) trait AnyComponent<N: HostNode>: 'static {
	fn initial_state(&self, props: &Props<N>) -> State<N>;
	fn render(&mut self, cx: &RenderContext<'_, N>) -> VNode<N>;
	fn will_receive_props(&mut self, next_props: &Props<N>, this: &ComponentHandle<N>);
	fn should_update(&mut self, next_props: &Props<N>, next_state: &State<N>) -> bool;
	fn did_mount(&mut self, this: &ComponentHandle<N>);
	fn did_update(&mut self, this: &ComponentHandle<N>, previous_props: &Props<N>, previous_state: &State<N>);
	fn will_unmount(&mut self, this: &ComponentHandle<N>);
	fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Stateful<C>(C);

impl<N: HostNode, C: Component<N>> AnyComponent<N> for Stateful<C> {
	fn initial_state(&self, props: &Props<N>) -> State<N> {
		self.0.initial_state(props)
	}
	fn render(&mut self, cx: &RenderContext<'_, N>) -> VNode<N> {
		self.0.render(cx)
	}
	fn will_receive_props(&mut self, next_props: &Props<N>, this: &ComponentHandle<N>) {
		self.0.will_receive_props(next_props, this)
	}
	fn should_update(&mut self, next_props: &Props<N>, next_state: &State<N>) -> bool {
		self.0.should_update(next_props, next_state)
	}
	fn did_mount(&mut self, this: &ComponentHandle<N>) {
		self.0.did_mount(this)
	}
	fn did_update(&mut self, this: &ComponentHandle<N>, previous_props: &Props<N>, previous_state: &State<N>) {
		self.0.did_update(this, previous_props, previous_state)
	}
	fn will_unmount(&mut self, this: &ComponentHandle<N>) {
		self.0.will_unmount(this)
	}
	fn as_any_mut(&mut self) -> &mut dyn Any {
		&mut self.0
	}
}

/// A stateless component: a plain render function without hooks.
struct FunctionComponent<N: HostNode>(fn(&Props<N>, &[VNode<N>]) -> VNode<N>);

impl<N: HostNode> AnyComponent<N> for FunctionComponent<N> {
	fn initial_state(&self, _: &Props<N>) -> State<N> {
		State::new()
	}
	fn render(&mut self, cx: &RenderContext<'_, N>) -> VNode<N> {
		(self.0)(cx.props, cx.children)
	}
	fn will_receive_props(&mut self, _: &Props<N>, _: &ComponentHandle<N>) {}
	fn should_update(&mut self, _: &Props<N>, _: &State<N>) -> bool {
		true
	}
	fn did_mount(&mut self, _: &ComponentHandle<N>) {}
	fn did_update(&mut self, _: &ComponentHandle<N>, _: &Props<N>, _: &State<N>) {}
	fn will_unmount(&mut self, _: &ComponentHandle<N>) {}
	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}

/// Identifies what a component node instantiates. Instances are only reused for the same kind.
pub(crate) enum ComponentKind<N: HostNode> {
	Stateful {
		type_id: TypeId,
		name: &'static str,
		create: fn(&Props<N>) -> Box<dyn AnyComponent<N>>,
	},
	Function(fn(&Props<N>, &[VNode<N>]) -> VNode<N>),
}

impl<N: HostNode> Clone for ComponentKind<N> {
	fn clone(&self) -> Self {
		match self {
			ComponentKind::Stateful { type_id, name, create } => ComponentKind::Stateful {
				type_id: *type_id,
				name: *name,
				create: *create,
			},
			ComponentKind::Function(render) => ComponentKind::Function(*render),
		}
	}
}

fn create_stateful<N: HostNode, C: Component<N>>(props: &Props<N>) -> Box<dyn AnyComponent<N>> {
	Box::new(Stateful(C::create(props)))
}

impl<N: HostNode> ComponentKind<N> {
	pub fn stateful<C: Component<N>>() -> Self {
		ComponentKind::Stateful {
			type_id: TypeId::of::<C>(),
			name: type_name::<C>(),
			create: create_stateful::<N, C>,
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			ComponentKind::Stateful { name, .. } => *name,
			ComponentKind::Function(_) => "function component",
		}
	}

	pub fn same(&self, other: &Self) -> bool {
		match (self, other) {
			(ComponentKind::Stateful { type_id: a, .. }, ComponentKind::Stateful { type_id: b, .. }) => a == b,
			(ComponentKind::Function(a), ComponentKind::Function(b)) => *a as usize == *b as usize,
			_ => false,
		}
	}

	fn instantiate(&self, props: &Props<N>) -> Box<dyn AnyComponent<N>> {
		match self {
			ComponentKind::Stateful { create, .. } => create(props),
			ComponentKind::Function(render) => Box::new(FunctionComponent(*render)),
		}
	}
}

/// A mounted component. Owns the record of what it rendered.
pub(crate) struct Instance<N: HostNode> {
	kind: ComponentKind<N>,
	component: RefCell<Box<dyn AnyComponent<N>>>,
	props: RefCell<Props<N>>,
	children: RefCell<Vec<VNode<N>>>,
	state: RefCell<State<N>>,
	/// State patches not yet rendered, in call order.
	pending: RefCell<Vec<State<N>>>,
	rendered: RefCell<Option<Rendered<N>>>,
	component_ref: RefCell<Option<ComponentRef<N>>>,
	svg: Cell<bool>,
	mounted: Cell<bool>,
	dirty: Cell<bool>,
	forced: Cell<bool>,
	queued: Cell<bool>,
	this: Weak<Self>,
}

#[instrument(skip(previous, node, document), fields(component = node.kind.name()))]
pub(crate) fn diff_component<N: HostNode>(previous: Previous<N>, node: ComponentNode<N>, document: &N, svg: bool) -> Rendered<N> {
	let ComponentNode {
		kind,
		props,
		children,
		component_ref,
	} = node;
	match previous {
		Previous::Rendered(Rendered::Component(instance)) if instance.kind.same(&kind) => {
			instance.receive(props, children, component_ref, document, svg);
			Rendered::Component(instance)
		}
		previous => {
			let instance = Instance::new(kind, props, children, svg);
			instance.mount(previous.peel(), document, component_ref);
			Rendered::Component(instance)
		}
	}
}

impl<N: HostNode> Instance<N> {
	fn new(kind: ComponentKind<N>, props: Props<N>, children: Vec<VNode<N>>, svg: bool) -> Rc<Self> {
		let component = kind.instantiate(&props);
		let state = component.initial_state(&props);
		Rc::new_cyclic(|this| Self {
			kind,
			component: RefCell::new(component),
			props: RefCell::new(props),
			children: RefCell::new(children),
			state: RefCell::new(state),
			pending: RefCell::default(),
			rendered: RefCell::default(),
			component_ref: RefCell::default(),
			svg: Cell::new(svg),
			mounted: Cell::new(false),
			dirty: Cell::new(false),
			forced: Cell::new(false),
			queued: Cell::new(false),
			this: this.clone(),
		})
	}

	pub fn kind(&self) -> &ComponentKind<N> {
		&self.kind
	}

	pub fn handle(&self) -> ComponentHandle<N> {
		ComponentHandle(self.this.clone())
	}

	/// The host node of the rendered subtree.
	pub fn base(&self) -> Option<N> {
		self.rendered.borrow().as_ref().and_then(Rendered::host)
	}

	fn mount(self: &Rc<Self>, previous: Previous<N>, document: &N, component_ref: Option<ComponentRef<N>>) {
		trace!("Mounting component.");
		self.mounted.set(true);
		self.render_from(previous, document);
		self.set_ref(component_ref);

		let this = Rc::clone(self);
		schedule::after_settle(move || {
			if this.mounted.get() {
				let handle = this.handle();
				this.component.borrow_mut().did_mount(&handle)
			}
		})
	}

	fn receive(self: &Rc<Self>, props: Props<N>, children: Vec<VNode<N>>, component_ref: Option<ComponentRef<N>>, document: &N, svg: bool) {
		self.svg.set(svg);
		self.set_ref(component_ref);
		self.component.borrow_mut().will_receive_props(&props, &self.handle());
		let previous_props = self.props.replace(props);
		*self.children.borrow_mut() = children;
		self.update(false, document, previous_props)
	}

	fn set_ref(&self, component_ref: Option<ComponentRef<N>>) {
		let old = self.component_ref.replace(component_ref.clone());
		match (old, component_ref) {
			(Some(old), Some(new)) if Rc::ptr_eq(&old, &new) => (),
			(old, new) => {
				if let Some(old) = old {
					old(None)
				}
				if let Some(new) = new {
					new(Some(&self.handle()))
				}
			}
		}
	}

	/// Coalesces pending state and re-renders unless [`Component::should_update`] declines.
	fn update(self: &Rc<Self>, forced: bool, document: &N, previous_props: Props<N>) {
		let forced = self.forced.replace(false) || forced;
		self.dirty.set(false);

		let previous_state = self.state.borrow().clone();
		let mut next_state = previous_state.clone();
		for patch in self.pending.take() {
			next_state.merge(patch)
		}

		let proceed = forced || {
			let props = self.props.borrow();
			self.component.borrow_mut().should_update(&props, &next_state)
		};
		*self.state.borrow_mut() = next_state;
		if !proceed {
			trace!("Update declined by component.");
			return;
		}

		let previous = self.rendered.borrow_mut().take().into();
		self.render_from(previous, document);

		let this = Rc::clone(self);
		schedule::after_settle(move || {
			if this.mounted.get() {
				let handle = this.handle();
				this.component.borrow_mut().did_update(&handle, &previous_props, &previous_state)
			}
		})
	}

	fn render_from(&self, previous: Previous<N>, document: &N) {
		let tree = {
			let this = self.handle();
			let props = self.props.borrow();
			let state = self.state.borrow();
			let children = self.children.borrow();
			let cx = RenderContext {
				props: &props,
				state: &state,
				children: &children,
				this: &this,
			};
			let span = trace_span!("Rendering component", component = self.kind.name());
			let _enter = span.enter();
			self.component.borrow_mut().render(&cx)
		};
		// A component always has a host node, so an empty render becomes an empty text node.
		let tree = if tree.is_empty() { VNode::text("") } else { tree };
		let rendered = diff_node(previous, tree, document, self.svg.get());
		*self.rendered.borrow_mut() = Some(rendered);
	}

	/// Re-renders from this component downwards, in a pass of its own.
	fn rerender(self: &Rc<Self>, forced: bool) {
		if !self.mounted.get() {
			trace!("Skipping re-render of unmounted component.");
			return;
		}
		let document = match self.base() {
			Some(base) => base,
			None => return warn!("Component {} has no host node to re-render from.", self.kind.name()),
		};
		schedule::pass(|| {
			let previous_props = self.props.borrow().clone();
			self.update(forced, &document, previous_props)
		})
	}

	fn enqueue(self: &Rc<Self>) -> bool {
		if self.queued.replace(true) {
			false
		} else {
			schedule::defer(Rc::clone(self) as Rc<dyn Deferred>)
		}
	}

	/// Runs [`Component::will_unmount`], clears the ref and hands out the rendered subtree without unmounting it.
	pub fn detach(&self) -> Option<Rendered<N>> {
		if self.mounted.replace(false) {
			let span = trace_span!("Unmounting component", component = self.kind.name());
			let _enter = span.enter();
			self.component.borrow_mut().will_unmount(&self.handle());
			if let Some(component_ref) = self.component_ref.take() {
				component_ref(None)
			}
			self.pending.borrow_mut().clear();
		}
		self.rendered.borrow_mut().take()
	}

	pub fn unmount(&self, detach: bool) {
		if let Some(rendered) = self.detach() {
			rendered.unmount(detach)
		}
	}
}

impl<N: HostNode> Deferred for Instance<N> {
	fn run_deferred(self: Rc<Self>) {
		self.queued.set(false);
		if self.dirty.get() {
			let forced = self.forced.replace(false);
			self.rerender(forced)
		}
	}

	fn cancel(&self) {
		// Stays dirty, so the next update still applies pending state.
		self.queued.set(false)
	}
}

/// A weak handle to a mounted component, passed to hooks and refs.
///
/// All methods are no-ops (or return [`None`]/defaults) once the component is gone.
pub struct ComponentHandle<N: HostNode>(Weak<Instance<N>>);

impl<N: HostNode> Clone for ComponentHandle<N> {
	fn clone(&self) -> Self {
		Self(Weak::clone(&self.0))
	}
}

impl<N: HostNode> PartialEq for ComponentHandle<N> {
	fn eq(&self, other: &Self) -> bool {
		Weak::ptr_eq(&self.0, &other.0)
	}
}

impl<N: HostNode> Debug for ComponentHandle<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ComponentHandle").field(&self.0.upgrade().map(|instance| instance.kind.name())).finish()
	}
}

impl<N: HostNode> ComponentHandle<N> {
	#[must_use]
	pub fn is_mounted(&self) -> bool {
		self.0.upgrade().map_or(false, |instance| instance.mounted.get())
	}

	/// Merges `patch` into the state before the next render.
	///
	/// Outside of a reconciliation pass, the re-render is scheduled through [`HostNode::schedule`] (or run by [`flush`](`crate::flush`)).
	/// Inside one, it happens once the outermost pass has finished.
	/// Any number of calls before that are coalesced into a single render.
	pub fn set_state(&self, patch: State<N>) {
		let instance = match self.0.upgrade() {
			Some(instance) if instance.mounted.get() => instance,
			_ => return trace!("Ignoring state update of unmounted component."),
		};
		instance.pending.borrow_mut().push(patch);
		instance.dirty.set(true);
		if instance.enqueue() && !schedule::in_pass() {
			N::schedule(Box::new(schedule::flush))
		}
	}

	/// Re-renders the component without consulting [`Component::should_update`].
	///
	/// Synchronous, unless called during a reconciliation pass, in which case it runs at the end of the outermost pass.
	pub fn force_update(&self) {
		let instance = match self.0.upgrade() {
			Some(instance) => instance,
			None => return trace!("Ignoring forced update of dropped component."),
		};
		if schedule::in_pass() {
			trace!("Deferring forced update.");
			instance.forced.set(true);
			instance.dirty.set(true);
			instance.enqueue();
		} else {
			instance.rerender(true)
		}
	}

	/// The host node the component currently renders to.
	#[must_use]
	pub fn base(&self) -> Option<N> {
		self.0.upgrade()?.base()
	}

	#[must_use]
	pub fn props(&self) -> Props<N> {
		match self.0.upgrade() {
			Some(instance) => {
				let props = instance.props.borrow();
				props.clone()
			}
			None => Props::new(),
		}
	}

	#[must_use]
	pub fn state(&self) -> State<N> {
		match self.0.upgrade() {
			Some(instance) => {
				let state = instance.state.borrow();
				state.clone()
			}
			None => State::new(),
		}
	}

	/// Runs `f` with the component, if it is a `C` and not currently busy rendering or running a hook.
	pub fn with<C: Component<N>, R>(&self, f: impl FnOnce(&mut C) -> R) -> Option<R> {
		let instance = self.0.upgrade()?;
		let mut component = instance.component.try_borrow_mut().ok()?;
		component.as_any_mut().downcast_mut::<C>().map(f)
	}
}
