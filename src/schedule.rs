//! Reconciliation passes and the work deferred to their end.

use std::{
	cell::{Cell, RefCell},
	collections::VecDeque,
	rc::Rc,
	thread,
};
use tracing::{trace, trace_span};

/// Something that re-renders once the current pass is over.
pub(crate) trait Deferred {
	fn run_deferred(self: Rc<Self>);
	/// Called instead of [`run_deferred`](`Deferred::run_deferred`) when the queue is dropped, so that `self` can be queued again later.
	fn cancel(&self);
}

thread_local! {
	static DEPTH: Cell<usize> = Cell::new(0);
	static SETTLED: RefCell<VecDeque<Box<dyn FnOnce()>>> = RefCell::new(VecDeque::new());
	static DEFERRED: RefCell<VecDeque<Rc<dyn Deferred>>> = RefCell::new(VecDeque::new());
	static FLUSHING: Cell<bool> = Cell::new(false);
}

struct DepthGuard;
impl Drop for DepthGuard {
	fn drop(&mut self) {
		let depth = DEPTH.with(|depth| {
			let new_depth = depth.get() - 1;
			depth.set(new_depth);
			new_depth
		});
		if depth == 0 && thread::panicking() {
			SETTLED.with(|settled| settled.borrow_mut().clear());
			let dropped = DEFERRED.with(|deferred| core::mem::take(&mut *deferred.borrow_mut()));
			for deferred in dropped {
				deferred.cancel()
			}
		}
	}
}

pub(crate) fn in_pass() -> bool {
	DEPTH.with(Cell::get) > 0
}

/// Runs `run` as (part of) a reconciliation pass.
///
/// When the outermost pass ends, post-settle hooks run first (still inside the pass), then deferred re-renders are flushed.
pub(crate) fn pass<R>(run: impl FnOnce() -> R) -> R {
	let outermost = DEPTH.with(|depth| {
		let previous = depth.get();
		depth.set(previous + 1);
		previous == 0
	});
	let guard = DepthGuard;

	let result = run();
	if outermost {
		let span = trace_span!("Running post-settle hooks");
		let _enter = span.enter();
		while let Some(hook) = SETTLED.with(|settled| settled.borrow_mut().pop_front()) {
			hook()
		}
	}

	drop(guard);
	if outermost {
		flush()
	}
	result
}

/// Queues `hook` until the current pass has settled, or runs it right away outside of one.
pub(crate) fn after_settle(hook: impl FnOnce() + 'static) {
	if in_pass() {
		SETTLED.with(|settled| settled.borrow_mut().push_back(Box::new(hook)))
	} else {
		hook()
	}
}

/// Queues a re-render. Returns whether the queue was empty before.
pub(crate) fn defer(deferred: Rc<dyn Deferred>) -> bool {
	DEFERRED.with(|queue| {
		let mut queue = queue.borrow_mut();
		queue.push_back(deferred);
		queue.len() == 1
	})
}

/// Runs all queued re-renders now, including any that are queued while doing so.
///
/// Does nothing while a reconciliation pass is in progress, since that pass will flush on its own once it ends.
pub fn flush() {
	struct FlushGuard;
	impl Drop for FlushGuard {
		fn drop(&mut self) {
			FLUSHING.with(|flushing| flushing.set(false))
		}
	}

	if in_pass() || FLUSHING.with(|flushing| flushing.replace(true)) {
		return;
	}
	let _guard = FlushGuard;
	let span = trace_span!("Flushing deferred re-renders");
	let _enter = span.enter();
	let mut count = 0_usize;
	while let Some(next) = DEFERRED.with(|queue| queue.borrow_mut().pop_front()) {
		next.run_deferred();
		count += 1;
	}
	trace!("Ran {} deferred re-render(s).", count);
}
