//! Page entry points: registry construction, the poll timer and the reload recovery.
//!
//! Each HTML page calls exactly one of the exported `start_*` functions after the module is
//! instantiated. From then on a repeating 5-second timer is the sole driver of
//! reconciliation; a failed or slow fetch only costs that cycle, the next tick fires
//! regardless.

use crate::{
	dom::{self, EditPin, ViewPin},
	reconcile::{PinFields, Reconciler, WritePolicy},
	snapshot::Snapshot,
};
use gloo_net::http::Request;
use gloo_timers::callback::Interval;
use std::{cell::RefCell, rc::Rc, sync::Once};
use tracing::{error, info};
use wasm_bindgen::{prelude::wasm_bindgen, UnwrapThrowExt};

/// Snapshot resource, relative to the page that loaded the module.
const SNAPSHOT_URL: &str = "pins.json";
const POLL_INTERVAL_MS: u32 = 5_000;

/// Entry point of the index (read-only status) page: every field of every matched pin is
/// overwritten on each poll, and an inventory mismatch always reloads.
#[wasm_bindgen]
pub fn start_view() {
	init_logging();
	let pins = dom::collect_view_pins(&document());
	info!("Watching {} pin(s) on the index page.", pins.len());
	start_polling(&Rc::new(RefCell::new(Reconciler::new(WritePolicy::Overwrite, pins))));
}

/// Entry point of the settings page: edited fields are preserved across polls, and an
/// inventory mismatch only reloads while no edit is in progress anywhere on the page.
#[wasm_bindgen]
pub fn start_settings() {
	init_logging();
	let document = document();
	let pins = dom::collect_edit_pins(&document);
	info!("Watching {} pin(s) on the settings page.", pins.len());
	let reconciler = Rc::new(RefCell::new(Reconciler::new(WritePolicy::PreserveEdits, pins)));
	dom::wire_edit_listeners(&document, &reconciler);
	start_polling(&reconciler);
}

fn init_logging() {
	static INIT: Once = Once::new();
	INIT.call_once(tracing_wasm::set_as_global_default);
}

fn document() -> web_sys::Document {
	window().document().expect_throw("pins-dom: No document found on the window.")
}

fn window() -> web_sys::Window {
	web_sys::window().expect_throw("pins-dom: No window found.")
}

fn start_polling<P: PinFields + 'static>(reconciler: &Rc<RefCell<Reconciler<P>>>) {
	let reconciler = Rc::clone(reconciler);
	Interval::new(POLL_INTERVAL_MS, move || {
		let reconciler = Rc::clone(&reconciler);
		wasm_bindgen_futures::spawn_local(async move {
			match fetch_snapshot().await {
				Ok(snapshot) => {
					let mut reconciler = reconciler.borrow_mut();
					let outcome = reconciler.apply(&snapshot);
					if reconciler.should_reload(outcome) {
						reload();
					}
				}
				// Not retried early; the next tick fetches again on its own.
				Err(error) => error!("Failed to fetch {:?}: {:?}", SNAPSHOT_URL, error),
			}
		});
	})
	.forget();
}

async fn fetch_snapshot() -> Result<Snapshot, gloo_net::Error> {
	Request::get(SNAPSHOT_URL).send().await?.json().await
}

/// Re-navigates to the current address, which re-fetches and re-renders the document without
/// re-submitting any form.
fn reload() {
	let location = window().location();
	match location.href() {
		Ok(href) => {
			info!("Pin inventory changed; reloading the page.");
			if let Err(error) = location.set_href(&href) {
				error!("Failed to reload the page: {:?}", error);
			}
		}
		Err(error) => error!("Failed to read the page address: {:?}", error),
	}
}
