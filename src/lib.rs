#![doc(html_root_url = "https://docs.rs/vnode-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A virtual DOM reconciler.
//!
//! [`render`] brings a host DOM subtree in line with a tree of [`VNode`]s, reusing host nodes wherever possible.
//! Child lists are matched without keys, by kind and proximity. Existing markup can be hydrated.
//!
//! The host DOM is abstracted by [`HostNode`], which is implemented for [`web_sys::Node`] and for the in-memory [`memory::Node`].

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod classify;
pub mod component;
mod diff;
pub mod host;
mod listeners;
pub mod memory;
mod patch;
mod render;
mod rendered;
mod schedule;
pub mod vnode;
pub mod web;

pub use component::{Component, ComponentHandle, RenderContext};
pub use host::HostNode;
pub use render::{render, unmount, Mounted};
pub use schedule::flush;
pub use vnode::{h, Object, Props, State, VNode, Value};
