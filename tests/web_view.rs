#![cfg(target_arch = "wasm32")]

use pins_dom::{
	dom::collect_view_pins,
	reconcile::{Outcome, Reconciler, WritePolicy},
	snapshot::{PinRecord, Snapshot},
};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::window;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
	window().unwrap().document().unwrap()
}

fn field_text(document: &web_sys::Document, selector: &str) -> String {
	document.query_selector(selector).unwrap().unwrap().text_content().unwrap()
}

#[wasm_bindgen_test]
fn scans_and_rewrites_index_rows() {
	let document = document();
	document.body().unwrap().set_inner_html(
		r#"
		<div class="state" id="pin-2">
			<p>Pin <output name="pin">2</output></p>
			<p>Name: <output name="name">stale</output></p>
			<p>Resistor: <output name="resistor">Pull Up</output></p>
			<p>State: <output name="state" class="Lowcolor">Low</output></p>
			<p>Changes: <output name="changes">0</output></p>
		</div>
		<div class="state" id="pin-4">
			<p>Pin <output name="pin">4</output></p>
			<p>Name: <output name="name">boot</output></p>
			<p>Resistor: <output name="resistor">Pull Down</output></p>
			<p>State: <output name="state" class="Highcolor">High</output></p>
			<p>Changes: <output name="changes">8</output></p>
		</div>
		"#,
	);

	let pins = collect_view_pins(&document);
	assert_eq!(pins.len(), 2);

	let mut reconciler = Reconciler::new(WritePolicy::Overwrite, pins);
	let snapshot = Snapshot::from(vec![
		(
			2,
			PinRecord {
				name: "relay".to_owned(),
				pull_up: false,
				state: "High".to_owned(),
				changes: 1,
			},
		),
		(
			4,
			PinRecord {
				name: "boot".to_owned(),
				pull_up: true,
				state: "Low".to_owned(),
				changes: 9,
			},
		),
	]);
	assert_eq!(reconciler.apply(&snapshot), Outcome::InSync);

	assert_eq!(field_text(&document, "#pin-2 output[name=\"name\"]"), "relay");
	assert_eq!(field_text(&document, "#pin-2 output[name=\"resistor\"]"), "Pull Down");
	assert_eq!(field_text(&document, "#pin-2 output[name=\"state\"]"), "High");
	assert_eq!(
		document.query_selector("#pin-2 output[name=\"state\"]").unwrap().unwrap().class_name(),
		"Highcolor"
	);
	assert_eq!(field_text(&document, "#pin-2 output[name=\"changes\"]"), "1");

	assert_eq!(field_text(&document, "#pin-4 output[name=\"resistor\"]"), "Pull Up");
	assert_eq!(field_text(&document, "#pin-4 output[name=\"state\"]"), "Low");
	assert_eq!(field_text(&document, "#pin-4 output[name=\"changes\"]"), "9");
}

#[wasm_bindgen_test]
fn malformed_containers_are_left_out() {
	let document = document();
	document.body().unwrap().set_inner_html(
		r#"
		<div class="state">
			<output name="pin">not a number</output>
			<output name="name">a</output>
			<output name="resistor">Pull Up</output>
			<output name="state">Low</output>
			<output name="changes">0</output>
		</div>
		<div class="state">
			<output name="pin">3</output>
			<output name="name">b</output>
			<output name="resistor">Pull Up</output>
			<output name="state">Low</output>
			<output name="changes">0</output>
		</div>
		"#,
	);

	let pins = collect_view_pins(&document);
	assert_eq!(pins.len(), 1);
	assert_eq!(pins[0].0, 3);
}
