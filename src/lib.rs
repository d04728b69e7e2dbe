#![warn(clippy::pedantic)]

//! Browser-side state synchronizer for GPIO pin status pages.
//!
//! The device renders one container per watched pin into its index and settings pages, then
//! serves a point-in-time [`snapshot::Snapshot`] of all pin fields at `pins.json`. This crate
//! polls that resource and reconciles each snapshot against the rendered containers: matched
//! pins have their fields rewritten in place, while an inventory disagreement between page and
//! device triggers a full reload (suppressed on the settings page while an edit is in
//! progress, so unsaved input isn't discarded).
//!
//! [`reconcile`] and [`snapshot`] are plain Rust and test natively; `dom` and `page` bind
//! them to [***web_sys***](https://docs.rs/web-sys) and only exist on `wasm32`.

pub mod reconcile;
pub mod snapshot;

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod page;
