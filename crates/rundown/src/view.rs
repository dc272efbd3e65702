use serde::{Deserialize, Serialize};

use crate::{EventEntry, Rundown, TimeMs, DAY_MS};

/// The events playback may select, in display order, skipped events left out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayableEvents {
	events: Vec<EventEntry>,
}

/// Summary of the playable schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RundownMetadata {
	pub num_events: usize,
	pub first_start: Option<TimeMs>,
	pub last_end: Option<TimeMs>,
	/// From the first start to the last end, counting every midnight crossed
	pub total_duration: TimeMs,
}

impl PlayableEvents {
	pub fn from_rundown(rundown: &Rundown) -> Self {
		Self::from_events(rundown.iter().filter_map(|entry| entry.as_event().cloned()))
	}

	pub fn from_events(events: impl IntoIterator<Item = EventEntry>) -> Self {
		Self {
			events: events.into_iter().filter(|e| !e.skip).collect(),
		}
	}

	pub fn len(&self) -> usize {
		self.events.len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&EventEntry> {
		self.events.get(index)
	}

	pub fn iter(&self) -> std::slice::Iter<'_, EventEntry> {
		self.events.iter()
	}

	pub fn as_slice(&self) -> &[EventEntry] {
		&self.events
	}

	pub fn position(&self, id: &str) -> Option<usize> {
		self.events.iter().position(|e| e.id == id)
	}

	pub fn find(&self, id: &str) -> Option<&EventEntry> {
		self.events.iter().find(|e| e.id == id)
	}

	pub fn first(&self) -> Option<&EventEntry> {
		self.events.first()
	}

	pub fn next_after(&self, id: &str) -> Option<&EventEntry> {
		self.position(id).and_then(|i| self.events.get(i + 1))
	}

	pub fn previous_before(&self, id: &str) -> Option<&EventEntry> {
		self.position(id).and_then(|i| i.checked_sub(1)).and_then(|i| self.events.get(i))
	}

	/// Next event after `id` flagged public
	pub fn next_public_after(&self, id: &str) -> Option<&EventEntry> {
		let from = self.position(id)? + 1;
		self.events[from..].iter().find(|e| e.is_public)
	}

	pub fn metadata(&self) -> RundownMetadata {
		let Some(first) = self.events.first() else {
			return RundownMetadata::default();
		};

		let mut day_offset = 0;
		let mut previous_start = first.time_start;
		let mut last_end = first.time_start;
		for event in &self.events {
			// a start earlier than the one before means the schedule rolled past midnight
			if event.time_start + day_offset < previous_start {
				day_offset += DAY_MS;
			}
			let start = event.time_start + day_offset;
			previous_start = start;
			last_end = last_end.max(start + event.duration);
		}

		RundownMetadata {
			num_events: self.events.len(),
			first_start: Some(first.time_start),
			last_end: self.events.last().map(|e| e.time_end),
			total_duration: last_end - first.time_start,
		}
	}
}

impl<'a> IntoIterator for &'a PlayableEvents {
	type Item = &'a EventEntry;
	type IntoIter = std::slice::Iter<'a, EventEntry>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn events() -> PlayableEvents {
		PlayableEvents::from_events([
			EventEntry::new("a", 1000, 2000),
			EventEntry::new("hidden", 2000, 3000).skipped(),
			EventEntry::new("b", 3000, 4000).public(),
			EventEntry::new("c", 4000, 5000),
		])
	}

	#[test]
	fn skipped_events_are_left_out() {
		let view = events();
		let ids: Vec<_> = view.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, ["a", "b", "c"]);
	}

	#[test]
	fn neighbours() {
		let view = events();
		assert_eq!(view.next_after("a").map(|e| e.id.as_str()), Some("b"));
		assert_eq!(view.previous_before("a"), None);
		assert_eq!(view.next_after("c"), None);
		assert_eq!(view.next_public_after("a").map(|e| e.id.as_str()), Some("b"));
		assert_eq!(view.next_public_after("b"), None);
	}

	#[test]
	fn metadata_spans_midnight() {
		let view = PlayableEvents::from_events([EventEntry::new("late", DAY_MS - 3_600_000, DAY_MS - 1_800_000), EventEntry::new("early", 1_800_000, 3_600_000)]);
		let meta = view.metadata();

		assert_eq!(meta.num_events, 2);
		assert_eq!(meta.first_start, Some(DAY_MS - 3_600_000));
		assert_eq!(meta.last_end, Some(3_600_000));
		assert_eq!(meta.total_duration, 7_200_000);
	}

	#[test]
	fn empty_metadata() {
		assert_eq!(PlayableEvents::default().metadata(), RundownMetadata::default());
	}
}
