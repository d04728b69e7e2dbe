//! Wire decode of the device's `pins.json` resource.
//!
//! The resource is a JSON object keyed by stringified pin numbers. The device assembles it by
//! string concatenation rather than through a serializer, so duplicate keys *are*
//! representable on the wire; decoding into an ordered entry list instead of a map keeps them
//! visible to reconciliation, which reports them as duplicate-entity warnings.

use core::fmt;
use serde::{
	de::{Error as _, MapAccess, Visitor},
	Deserialize, Deserializer,
};

/// Pin numbers are GPIO line indices; the device addresses them as one byte.
pub type PinId = u8;

/// One pin's fields as reported by the device.
///
/// `state` stays a free-form string (`"High"`/`"Low"` on the real device) and is passed
/// through to the display verbatim; the device also repeats the pin number in a `pin` field,
/// which is redundant with the key and ignored here.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct PinRecord {
	pub name: String,
	pub pull_up: bool,
	pub state: String,
	pub changes: u64,
}

/// A full, unordered, point-in-time report of all watched pins, kept in wire order.
///
/// Produced fresh on every poll and discarded after one reconciliation pass.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Snapshot(Vec<(PinId, PinRecord)>);

impl Snapshot {
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// The reported pins, in the order the device wrote them.
	pub fn entries(&self) -> impl Iterator<Item = (PinId, &PinRecord)> {
		self.0.iter().map(|(id, record)| (*id, record))
	}
}

impl From<Vec<(PinId, PinRecord)>> for Snapshot {
	fn from(entries: Vec<(PinId, PinRecord)>) -> Self {
		Self(entries)
	}
}

impl<'de> Deserialize<'de> for Snapshot {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct SnapshotVisitor;
		impl<'de> Visitor<'de> for SnapshotVisitor {
			type Value = Snapshot;

			fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
				formatter.write_str("a map from stringified pin numbers to pin records")
			}

			fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
				let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
				while let Some((key, record)) = map.next_entry::<String, PinRecord>()? {
					let id = key
						.parse::<PinId>()
						.map_err(|_| A::Error::custom(format_args!("invalid pin number key {:?}", key)))?;
					entries.push((id, record));
				}
				Ok(Snapshot(entries))
			}
		}
		deserializer.deserialize_map(SnapshotVisitor)
	}
}
