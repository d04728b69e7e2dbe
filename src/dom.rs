//! Bindings between the reconciliation core and the pin containers the device rendered into
//! the page.
//!
//! Both pages tag each pin container with the `state` marker class. The index page renders
//! read-only [***output***](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/output)
//! elements; the settings page renders a form per pin with editable `name`/`resistor`
//! controls, plus one extra add-new template form (recognized by its `name="add"` attribute)
//! that represents a not-yet-created pin and is exempt from reconciliation.
//!
//! Scanning resolves every field element exactly once, at load time; a malformed container is
//! logged and left out rather than aborting the page.

use crate::{
	reconcile::{PinFields, Pull, Reconciler},
	snapshot::PinId,
};
use std::{cell::RefCell, rc::Rc};
use tracing::error;
use wasm_bindgen::{closure::Closure, JsCast, UnwrapThrowExt};
use web_sys::{Document, Element, HtmlInputElement};

/// Class the device's templating puts on every pin container, on both pages.
const PIN_MARKER_CLASS: &str = "state";
/// `name` attribute value of the settings page's add-new template form.
const ADD_TEMPLATE_NAME: &str = "add";

/// Field sinks of one pin row on the index page: the `<output>` elements rendered into its
/// container.
#[derive(Debug)]
pub struct ViewPin {
	name: Element,
	resistor: Element,
	state: Element,
	changes: Element,
}

impl PinFields for ViewPin {
	fn set_name(&mut self, name: &str) {
		self.name.set_text_content(Some(name));
	}

	fn set_pull(&mut self, pull: Pull) {
		self.resistor.set_text_content(Some(pull.label()));
	}

	fn set_state(&mut self, state: &str) {
		self.state.set_text_content(Some(state));
		self.state.set_class_name(&format!("{}color", state));
	}

	fn set_changes(&mut self, changes: u64) {
		self.changes.set_text_content(Some(&changes.to_string()));
	}
}

/// Field sinks of one pin form on the settings page.
///
/// `name` and the resistor radio pair are the user-editable controls; `state` and `changes`
/// stay read-only outputs there too.
#[derive(Debug)]
pub struct EditPin {
	name: HtmlInputElement,
	pull_up: HtmlInputElement,
	pull_down: HtmlInputElement,
	state: Element,
	changes: Element,
}

impl PinFields for EditPin {
	fn set_name(&mut self, name: &str) {
		self.name.set_value(name);
	}

	fn set_pull(&mut self, pull: Pull) {
		match pull {
			Pull::Up => self.pull_up.set_checked(true),
			Pull::Down => self.pull_down.set_checked(true),
		}
	}

	fn set_state(&mut self, state: &str) {
		self.state.set_text_content(Some(state));
		self.state.set_class_name(&format!("{}color", state));
	}

	fn set_changes(&mut self, changes: u64) {
		self.changes.set_text_content(Some(&changes.to_string()));
	}
}

/// Collects the index page's pin rows into registry entries.
#[must_use]
pub fn collect_view_pins(document: &Document) -> Vec<(PinId, ViewPin)> {
	let containers = document.get_elements_by_class_name(PIN_MARKER_CLASS);
	let mut pins = Vec::with_capacity(containers.length() as usize);
	for i in 0..containers.length() {
		let container = containers.item(i).unwrap_throw();

		let id = match query_output(&container, "pin").and_then(|output| parse_pin_number(&output.text_content().unwrap_or_default())) {
			Some(id) => id,
			None => continue,
		};

		if let (Some(name), Some(resistor), Some(state), Some(changes)) = (
			query_output(&container, "name"),
			query_output(&container, "resistor"),
			query_output(&container, "state"),
			query_output(&container, "changes"),
		) {
			pins.push((id, ViewPin { name, resistor, state, changes }));
		}
	}
	pins
}

/// Collects the settings page's pin forms into registry entries, leaving out the add-new
/// template.
#[must_use]
pub fn collect_edit_pins(document: &Document) -> Vec<(PinId, EditPin)> {
	let containers = document.get_elements_by_class_name(PIN_MARKER_CLASS);
	let mut pins = Vec::with_capacity(containers.length() as usize);
	for i in 0..containers.length() {
		let form = containers.item(i).unwrap_throw();
		if is_add_template(&form) {
			continue;
		}

		let id = match query_input(&form, "pin").and_then(|input| parse_pin_number(&input.value())) {
			Some(id) => id,
			None => continue,
		};

		if let (Some(name), Some((pull_up, pull_down)), Some(state), Some(changes)) = (
			query_input(&form, "name"),
			query_resistor_pair(&form),
			query_output(&form, "state"),
			query_output(&form, "changes"),
		) {
			pins.push((id, EditPin { name, pull_up, pull_down, state, changes }));
		}
	}
	pins
}

/// Subscribes `reconciler` to edit notifications from every pin form: `change` events on the
/// form itself plus `input` events on its name field, so a keystroke marks the pin dirty
/// before the value is ever committed.
///
/// The add-new template gets a listener too, reporting without a pin number. The listeners
/// live for the rest of the page.
pub fn wire_edit_listeners(document: &Document, reconciler: &Rc<RefCell<Reconciler<EditPin>>>) {
	let containers = document.get_elements_by_class_name(PIN_MARKER_CLASS);
	for i in 0..containers.length() {
		let form = containers.item(i).unwrap_throw();

		let pin = if is_add_template(&form) {
			None
		} else {
			match query_input(&form, "pin").and_then(|input| parse_pin_number(&input.value())) {
				Some(id) => Some(id),
				None => continue,
			}
		};

		let listener = Closure::wrap(Box::new({
			let reconciler = Rc::clone(reconciler);
			move || reconciler.borrow_mut().edit_started(pin)
		}) as Box<dyn Fn()>);

		if let Err(error) = form.add_event_listener_with_callback("change", listener.as_ref().unchecked_ref()) {
			error!("Failed to subscribe to change events of pin {:?}: {:?}", pin, error);
		}
		if let Some(name) = query_input(&form, "name") {
			if let Err(error) = name.add_event_listener_with_callback("input", listener.as_ref().unchecked_ref()) {
				error!("Failed to subscribe to input events of pin {:?}: {:?}", pin, error);
			}
		}
		listener.forget();
	}
}

fn is_add_template(form: &Element) -> bool {
	form.get_attribute("name").map_or(false, |name| name == ADD_TEMPLATE_NAME)
}

fn parse_pin_number(text: &str) -> Option<PinId> {
	match text.trim().parse() {
		Ok(id) => Some(id),
		Err(_) => {
			error!("Expected a pin number but found {:?}. Skipping the container.", text);
			None
		}
	}
}

fn query_output(container: &Element, name: &str) -> Option<Element> {
	query_field(container, &format!("output[name=\"{}\"]", name))
}

fn query_input(container: &Element, name: &str) -> Option<HtmlInputElement> {
	let element = query_field(container, &format!("input[name=\"{}\"]", name))?;
	match element.dyn_into::<HtmlInputElement>() {
		Ok(input) => Some(input),
		Err(element) => {
			error!("Expected an <input> named {:?} but found {:?}. Skipping the container.", name, element);
			None
		}
	}
}

fn query_field(container: &Element, selector: &str) -> Option<Element> {
	match container.query_selector(selector) {
		Ok(Some(element)) => Some(element),
		Ok(None) => {
			error!("Missing {:?} in a pin container. Skipping it.", selector);
			None
		}
		Err(error) => {
			error!("Failed to query {:?}: {:?}. Skipping the container.", selector, error);
			None
		}
	}
}

/// The templating renders the pull-up radio before the pull-down radio; positions, not
/// values, identify them.
fn query_resistor_pair(form: &Element) -> Option<(HtmlInputElement, HtmlInputElement)> {
	let radios = match form.query_selector_all("input[name=\"resistor\"]") {
		Ok(radios) => radios,
		Err(error) => {
			error!("Failed to query the resistor radios: {:?}. Skipping the container.", error);
			return None;
		}
	};
	if radios.length() != 2 {
		error!("Expected two resistor radios but found {}. Skipping the container.", radios.length());
		return None;
	}

	let mut pair = Vec::with_capacity(2);
	for i in 0..2 {
		match radios.get(i).unwrap_throw().dyn_into::<HtmlInputElement>() {
			Ok(input) => pair.push(input),
			Err(node) => {
				error!("Expected the resistor radios to be <input>s but found {:?}. Skipping the container.", node);
				return None;
			}
		}
	}
	let pull_down = pair.pop().unwrap_throw();
	let pull_up = pair.pop().unwrap_throw();
	Some((pull_up, pull_down))
}
