//! The property patcher: moves a single named prop of a host element from one value to another.

use crate::{
	classify::{classify, Classification, HostKind, Special},
	host::{HostNode, Scalar},
	listeners::EventListeners,
	vnode::{format_number, Props, Value},
};
use tracing::{instrument, trace, warn};

pub(crate) const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Applies every change between `old` and `new` to `node`.
///
/// Props that disappeared are patched to absent first, then all new props are patched in order.
#[instrument(skip(node, old, new, listeners))]
pub(crate) fn diff_props<N: HostNode>(node: &N, kind: &HostKind<'_>, old: &Props<N>, new: &Props<N>, listeners: &mut EventListeners<N>) {
	for (name, value) in old.iter() {
		if !new.contains(name) && !matches!(value, Value::Null | Value::Undefined) {
			patch(node, kind, name, Some(value), None, listeners)
		}
	}
	for (name, value) in new.iter() {
		patch(node, kind, name, old.get(name), Some(value), listeners)
	}
}

/// Applies exactly the mutation needed to move `name` from `old` to `new`. [`None`] means absent.
pub(crate) fn patch<N: HostNode>(node: &N, kind: &HostKind<'_>, name: &str, old: Option<&Value<N>>, new: Option<&Value<N>>, listeners: &mut EventListeners<N>) {
	let unchanged = match (old, new) {
		(Some(old), Some(new)) => old.same(new),
		(None, None) => true,
		_ => false,
	};

	match classify(kind, name) {
		Classification::Special(Special::Skip) => (),

		Classification::Special(Special::Style) => patch_style(node, old, new),

		Classification::Special(Special::InnerHtml) => {
			let html = |value: Option<&Value<N>>| {
				value
					.filter(|value| value.is_truthy())
					.map(|value| value.as_object().and_then(|object| object.get("__html")).map(Value::to_js_string).unwrap_or_default())
			};
			if let Some(new_html) = html(new) {
				if html(old).as_ref() != Some(&new_html) {
					trace!("Setting inner HTML.");
					node.set_inner_html(&new_html)
				}
			}
		}

		Classification::Special(Special::Live) => {
			if let Some(Value::Function(_)) = new {
				return;
			}
			let value = new.cloned().unwrap_or(Value::Undefined);
			with_scalar(&value, |scalar| node.set_property(name, scalar));
			if !value.is_present() {
				node.remove_attribute(name)
			}
		}

		_ if unchanged => (),

		Classification::Special(Special::Class) => match new {
			Some(value) if value.is_truthy() => node.set_attribute("class", &value.to_js_string()),
			_ => node.remove_attribute("class"),
		},

		Classification::EventHandler { event, capture } => {
			let handler = match new {
				Some(Value::Function(handler)) => Some(handler.clone()),
				Some(value) if value.is_truthy() => {
					warn!("Ignoring non-function event handler {:?} for {:?}.", name, event);
					None
				}
				_ => None,
			};
			listeners.set(node, &event, capture, handler)
		}

		// Function-valued props are never serialized.
		_ if matches!(new, Some(Value::Function(_))) => trace!("Skipping function-valued prop {:?}.", name),

		Classification::Property => {
			let value = new.cloned().unwrap_or(Value::Undefined);
			with_scalar(&value, |scalar| node.set_property(name, scalar));
			if !value.is_present() && name != "spellcheck" {
				node.remove_attribute(name)
			}
		}

		Classification::Attribute => {
			let xlink = kind.svg && name.starts_with("xlink");
			let value = new.filter(|value| value.is_present());
			if xlink {
				let local_name = name.trim_start_matches("xlink").trim_start_matches(':').to_ascii_lowercase();
				match value {
					Some(value) => node.set_attribute_ns(XLINK_NAMESPACE, &local_name, &value.to_js_string()),
					None => node.remove_attribute_ns(XLINK_NAMESPACE, &local_name),
				}
			} else {
				match value {
					Some(value) => node.set_attribute(name, &value.to_js_string()),
					None => node.remove_attribute(name),
				}
			}
		}
	}
}

/// Properties that take bare numbers without a unit.
fn is_unitless(name: &str) -> bool {
	let name: String = name.chars().filter(|c| *c != '-').map(|c| c.to_ascii_lowercase()).collect();
	["acit", "exs", "exg", "exn", "exp", "rph", "ows", "mnc", "ntw", "inec", "ineh", "zoo"]
		.iter()
		.any(|fragment| name.contains(fragment))
		|| name.ends_with("ex")
		|| name.starts_with("ord")
}

fn patch_style<N: HostNode>(node: &N, old: Option<&Value<N>>, new: Option<&Value<N>>) {
	match new {
		Some(Value::Object(new)) => {
			match old {
				Some(Value::String(_)) => node.set_style_text(""),
				Some(Value::Object(old)) => {
					for (name, _) in old.fields() {
						if new.get(name).is_none() {
							node.set_style_property(name, "")
						}
					}
				}
				_ => (),
			}
			for (name, value) in new.fields() {
				let value = match value {
					Value::Number(n) if !is_unitless(name) => format!("{}px", format_number(*n)),
					value if !value.is_present() => String::new(),
					value => value.to_js_string(),
				};
				node.set_style_property(name, &value)
			}
		}
		Some(value) if value.is_truthy() => node.set_style_text(&value.to_js_string()),
		_ => node.remove_attribute("style"),
	}
}

fn with_scalar<N: HostNode, R>(value: &Value<N>, f: impl FnOnce(Scalar<'_>) -> R) -> R {
	match value {
		Value::Null | Value::Undefined => f(Scalar::Str("")),
		Value::Bool(b) => f(Scalar::Bool(*b)),
		Value::Number(n) => f(Scalar::Number(*n)),
		Value::String(s) => f(Scalar::Str(s)),
		Value::Object(_) | Value::Function(_) => f(Scalar::Str(&value.to_js_string())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{memory::Node, vnode::Object};

	fn apply(node: &Node, name: &str, old: Option<Value<Node>>, new: Option<Value<Node>>) {
		let tag = node.local_name().unwrap();
		let mut listeners = EventListeners::default();
		patch(node, &HostKind::html(&tag), name, old.as_ref(), new.as_ref(), &mut listeners)
	}

	#[test]
	fn falsy_attributes() {
		let div = Node::element("div");
		apply(&div, "a0", None, Some(0.into()));
		apply(&div, "anan", None, Some(f64::NAN.into()));
		apply(&div, "afalse", None, Some(false.into()));
		apply(&div, "anull", None, Some(Value::Null));
		apply(&div, "aundefined", None, Some(Value::Undefined));
		assert_eq!(div.attributes(), vec![("a0".to_owned(), "0".to_owned()), ("anan".to_owned(), "NaN".to_owned())]);
	}

	#[test]
	fn objects_stringify() {
		let div = Node::element("div");
		apply(&div, "foo", None, Some(Object::new().field("a", "b").into()));
		apply(&div, "bar", None, Some(Object::new().with_display(|| "abc".to_owned()).into()));
		assert_eq!(div.attribute("foo").as_deref(), Some("[object Object]"));
		assert_eq!(div.attribute("bar").as_deref(), Some("abc"));
	}

	#[test]
	fn functions_are_skipped() {
		let div = Node::element("div");
		apply(&div, "click", None, Some(Value::function(|_| ())));
		assert!(div.attributes().is_empty());
	}

	#[test]
	fn style_units() {
		let div = Node::element("div");
		apply(
			&div,
			"style",
			None,
			Some(Object::new().field("padding", 5).field("opacity", 0.5).field("zIndex", 2).field("left", "100%").into()),
		);
		assert_eq!(div.style_property("padding"), "5px");
		assert_eq!(div.style_property("opacity"), "0.5");
		assert_eq!(div.style_property("zIndex"), "2");
		assert_eq!(div.style_property("left"), "100%");
		apply(&div, "style", Some(Value::Null), None);
		assert_eq!(div.css_text(), "");
		assert_eq!(div.attribute("style"), None);
	}

	#[test]
	fn unitless_names() {
		for name in ["opacity", "flex", "flexGrow", "z-index", "zIndex", "order", "lineHeight", "fontWeight", "zoom", "columnCount", "orphans", "widows"] {
			assert!(is_unitless(name), "{}", name);
		}
		for name in ["top", "padding", "width", "flexBasis", "borderWidth"] {
			assert!(!is_unitless(name), "{}", name);
		}
	}

	#[test]
	fn live_value_is_always_reapplied() {
		let input = Node::element("input");
		apply(&input, "checked", None, Some(true.into()));
		assert!(input.checked());
		input.set_checked(false);
		apply(&input, "checked", Some(true.into()), Some(true.into()));
		assert!(input.checked());
	}

	#[test]
	fn xlink() {
		let a = Node::svg_element("a");
		let mut listeners = EventListeners::default();
		patch(&a, &HostKind::svg("a"), "xlinkHref", None, Some(&"#target".into()), &mut listeners);
		assert_eq!(a.attribute("href").as_deref(), Some("#target"));
		patch(&a, &HostKind::svg("a"), "xlinkHref", Some(&"#target".into()), None, &mut listeners);
		assert_eq!(a.attribute("href"), None);
	}
}
