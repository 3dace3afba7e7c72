//! Decides how a named prop reaches the host, without touching it.

/// The kind of host element a prop is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostKind<'a> {
	/// Lower-case local name for HTML elements, as written for SVG elements.
	pub tag: &'a str,
	pub svg: bool,
}

impl<'a> HostKind<'a> {
	#[must_use]
	pub fn html(tag: &'a str) -> Self {
		Self { tag, svg: false }
	}

	#[must_use]
	pub fn svg(tag: &'a str) -> Self {
		Self { tag, svg: true }
	}
}

/// Props that bypass the generic property/attribute rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
	/// `key` and `children`: consumed by the differ, never applied.
	Skip,
	/// `class` and `className`.
	Class,
	Style,
	/// `dangerouslySetInnerHTML`.
	InnerHtml,
	/// `value`, `checked` and `selected` on form controls: live properties, always re-applied.
	Live,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
	Property,
	Attribute,
	EventHandler { event: String, capture: bool },
	Special(Special),
}

/// Classifies `name` for an element of `kind`.
#[must_use]
pub fn classify(kind: &HostKind<'_>, name: &str) -> Classification {
	match name {
		"key" | "children" => return Classification::Special(Special::Skip),
		"class" | "className" => return Classification::Special(Special::Class),
		"style" => return Classification::Special(Special::Style),
		"dangerouslySetInnerHTML" => return Classification::Special(Special::InnerHtml),
		_ => (),
	}

	if name.len() > 2 && name.is_char_boundary(2) && name[..2].eq_ignore_ascii_case("on") {
		let (event, capture) = match name.strip_suffix("Capture") {
			Some(event) if event.len() > 2 => (event, true),
			_ => (name, false),
		};
		return Classification::EventHandler {
			event: event[2..].to_ascii_lowercase(),
			capture,
		};
	}

	if kind.svg {
		return Classification::Attribute;
	}

	if matches!(name, "value" | "checked" | "selected") && has_live_property(kind.tag, name) {
		return Classification::Special(Special::Live);
	}

	if declares_writable_property(kind.tag, name) {
		Classification::Property
	} else {
		Classification::Attribute
	}
}

fn has_live_property(tag: &str, name: &str) -> bool {
	match name {
		"value" => matches!(tag, "input" | "textarea" | "select" | "option" | "button" | "li" | "meter" | "progress" | "param" | "data" | "output"),
		"checked" => tag == "input",
		"selected" => tag == "option",
		_ => false,
	}
}

/// Writable IDL attributes of the HTML element interfaces.
///
/// `list`, `form` and `type` are left out on purpose: the first two are read-only and `type` must stay an attribute for inputs.
fn declares_writable_property(tag: &str, name: &str) -> bool {
	const HTML_ELEMENT: &[&str] = &[
		"id", "title", "lang", "dir", "hidden", "tabIndex", "accessKey", "draggable", "spellcheck", "translate", "contentEditable", "inputMode", "autofocus", "innerText",
		"textContent", "slot",
	];

	HTML_ELEMENT.contains(&name)
		|| match tag {
			"a" | "area" => matches!(name, "href" | "target" | "rel" | "download" | "hreflang" | "ping" | "referrerPolicy" | "coords" | "shape"),
			"button" => matches!(name, "disabled" | "name" | "formAction" | "formMethod" | "formNoValidate" | "formTarget"),
			"fieldset" | "optgroup" => matches!(name, "disabled" | "name" | "label"),
			"form" => matches!(name, "action" | "method" | "enctype" | "encoding" | "target" | "name" | "noValidate" | "acceptCharset" | "autocomplete"),
			"iframe" => matches!(name, "src" | "srcdoc" | "name" | "width" | "height" | "allow" | "allowFullscreen" | "referrerPolicy"),
			"img" => matches!(name, "src" | "srcset" | "sizes" | "alt" | "width" | "height" | "crossOrigin" | "useMap" | "isMap" | "loading" | "decoding"),
			"input" => matches!(
				name,
				"accept"
					| "alt" | "autocomplete"
					| "defaultChecked"
					| "defaultValue"
					| "dirName" | "disabled"
					| "height" | "indeterminate"
					| "max" | "maxLength"
					| "min" | "minLength"
					| "multiple" | "name"
					| "pattern" | "placeholder"
					| "readOnly" | "required"
					| "size" | "src" | "step"
					| "width"
			),
			"label" => name == "htmlFor",
			"li" => false,
			"ol" => matches!(name, "reversed" | "start"),
			"option" => matches!(name, "defaultSelected" | "disabled" | "label" | "text"),
			"select" => matches!(name, "disabled" | "multiple" | "name" | "required" | "size" | "selectedIndex" | "autocomplete"),
			"table" => matches!(name, "border" | "width" | "cellPadding" | "cellSpacing" | "frame" | "rules" | "summary" | "align" | "bgColor"),
			"td" | "th" => matches!(name, "colSpan" | "rowSpan" | "headers" | "abbr" | "scope"),
			"textarea" => matches!(name, "cols" | "rows" | "wrap" | "disabled" | "name" | "placeholder" | "readOnly" | "required" | "maxLength" | "minLength" | "defaultValue"),
			"video" | "audio" => matches!(name, "src" | "autoplay" | "controls" | "loop" | "muted" | "preload" | "poster" | "volume" | "currentTime" | "playbackRate"),
			_ => false,
		}
}
