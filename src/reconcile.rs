//! The shared reconciliation core: identity registry, dirty tracking, the single-pass
//! inventory reconciliation algorithm and the reload decision.
//!
//! This module never touches the document. Field writes go through [`PinFields`], which the
//! [`dom`](crate::dom) module implements over the rendered elements and tests implement over
//! plain values; edit notifications arrive as explicit [`Reconciler::edit_started`] messages
//! rather than being folded into event handlers.

use crate::snapshot::{PinId, Snapshot};
use hashbrown::{HashMap, HashSet};
use tracing::{trace, trace_span, warn};

/// Resistor configuration of a pin.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Pull {
	Up,
	Down,
}

impl Pull {
	/// The label the device's templating renders for this configuration.
	#[must_use]
	pub fn label(self) -> &'static str {
		match self {
			Pull::Up => "Pull Up",
			Pull::Down => "Pull Down",
		}
	}
}

impl From<bool> for Pull {
	fn from(pull_up: bool) -> Self {
		if pull_up {
			Pull::Up
		} else {
			Pull::Down
		}
	}
}

/// Field sinks of one page-bound pin.
///
/// Implementations write into whatever representation the page uses for the pin; resolving
/// that representation happens once, when the registry is built, not per pass.
pub trait PinFields {
	fn set_name(&mut self, name: &str);
	fn set_pull(&mut self, pull: Pull);
	/// Expected to also update the state's derived `"<state>color"` class.
	fn set_state(&mut self, state: &str);
	fn set_changes(&mut self, changes: u64);
}

/// Which fields a reconciliation pass may overwrite.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WritePolicy {
	/// Read-only display: every field of every matched pin is overwritten on every pass.
	Overwrite,
	/// Editable display: `state` and `changes` are overwritten unconditionally (the device
	/// owns them), but `name` and `pull` are skipped while the pin has an unconfirmed edit,
	/// and an inventory mismatch doesn't reload the page while any edit is in progress.
	PreserveEdits,
}

/// Result of one reconciliation pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
	/// Every registry pin matched exactly one snapshot entry.
	InSync,
	/// The page's inventory disagrees with the device's. `unmatched` counts registry pins
	/// without a snapshot entry together with snapshot entries unknown to this page; either
	/// way the statically rendered page is stale and only a reload resolves it.
	OutOfSync { unmatched: usize },
}

/// Owns the registry of page-bound pins, the set of pins with unconfirmed edits and the
/// page-wide edit flag, and reconciles device snapshots against them.
///
/// One instance exists per page, shared between the poll timer and the edit listeners; the
/// page is single-threaded, so no two passes ever overlap.
#[derive(Debug)]
pub struct Reconciler<P> {
	policy: WritePolicy,
	pins: HashMap<PinId, P>,
	dirty: HashSet<PinId>,
	any_edited: bool,
}

impl<P: PinFields> Reconciler<P> {
	/// Builds the registry from the pins rendered into the page at load time.
	///
	/// Pin numbers must be unique; feeding duplicates is a caller error (the last binding
	/// wins silently).
	pub fn new(policy: WritePolicy, pins: impl IntoIterator<Item = (PinId, P)>) -> Self {
		Self {
			policy,
			pins: pins.into_iter().collect(),
			dirty: HashSet::new(),
			any_edited: false,
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.pins.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.pins.is_empty()
	}

	#[must_use]
	pub fn pin(&self, pin: PinId) -> Option<&P> {
		self.pins.get(&pin)
	}

	/// Whether any edit notification arrived since the page loaded.
	#[must_use]
	pub fn any_edited(&self) -> bool {
		self.any_edited
	}

	/// Whether `pin` has an unconfirmed edit.
	#[must_use]
	pub fn is_dirty(&self, pin: PinId) -> bool {
		self.dirty.contains(&pin)
	}

	/// Records an edit notification from the page's input widgets.
	///
	/// `None` is the add-new template, which represents a not-yet-created pin: it raises the
	/// page-wide edit flag (its input is just as worth protecting from a reload) but dirties
	/// no registry pin. Dirty pins never become clean again within the page's lifetime, even
	/// once the edit is submitted or abandoned.
	pub fn edit_started(&mut self, pin: Option<PinId>) {
		self.any_edited = true;
		if let Some(pin) = pin {
			if self.dirty.insert(pin) {
				trace!("Pin {} now has an unconfirmed edit.", pin);
			}
		}
	}

	/// Reconciles one snapshot against the registry in a single forward pass.
	///
	/// Each snapshot entry either matches a registry pin (its fields are rewritten per the
	/// [`WritePolicy`]), is unknown to this page (counted as unmatched, same recovery as a
	/// locally-missing pin), or repeats an already-processed pin number (logged as a
	/// duplicate-entity warning and skipped, never fatal). Registry pins the snapshot never
	/// mentioned remain unmatched and make the outcome [`Outcome::OutOfSync`].
	pub fn apply(&mut self, snapshot: &Snapshot) -> Outcome {
		let span = trace_span!("Reconciling snapshot", entries = snapshot.len(), pins = self.pins.len());
		let _enter = span.enter();

		let mut unmatched: HashSet<PinId> = self.pins.keys().copied().collect();
		for (id, record) in snapshot.entries() {
			match (self.pins.get_mut(&id), unmatched.contains(&id)) {
				(Some(pin), true) => {
					unmatched.remove(&id);
					if self.policy == WritePolicy::Overwrite || !self.dirty.contains(&id) {
						pin.set_name(&record.name);
						pin.set_pull(Pull::from(record.pull_up));
					}
					pin.set_state(&record.state);
					pin.set_changes(record.changes);
				}
				(None, false) => {
					// A pin this page was never rendered with. It needs the same recovery as
					// a locally-known pin missing from the snapshot, so it shares the
					// unmatched collection.
					unmatched.insert(id);
				}
				(_, _) => warn!("Pins on the page or in the snapshot contain duplicate {}. Skipping its update.", id),
			}
		}

		if unmatched.is_empty() {
			Outcome::InSync
		} else {
			warn!("{} pin(s) without a page/snapshot match.", unmatched.len());
			Outcome::OutOfSync { unmatched: unmatched.len() }
		}
	}

	/// Whether the mismatch recovery (a full page reload) should run for `outcome`.
	///
	/// Under [`WritePolicy::PreserveEdits`] a reload is suppressed once any edit has started
	/// anywhere on the page, leaving the mismatch unresolved rather than discarding unsaved
	/// input.
	#[must_use]
	pub fn should_reload(&self, outcome: Outcome) -> bool {
		match outcome {
			Outcome::InSync => false,
			Outcome::OutOfSync { .. } => match self.policy {
				WritePolicy::Overwrite => true,
				WritePolicy::PreserveEdits => !self.any_edited,
			},
		}
	}
}
