use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Time in milliseconds
pub type TimeMs = i64;

/// Entry identifier, unique within a rundown
pub type EntryId = String;

/// Custom field key -> value
pub type CustomFields = BTreeMap<String, String>;

/// Length of a day in milliseconds
pub const DAY_MS: TimeMs = 86_400_000;

const DEFAULT_TIME_WARNING: TimeMs = 120_000;
const DEFAULT_TIME_DANGER: TimeMs = 60_000;

/// Which timing field is kept when an event is rescheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeStrategy {
	#[default]
	LockDuration,
	LockEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerType {
	#[default]
	CountDown,
	CountUp,
	TimeToEnd,
	Clock,
	None,
}

/// What the playback timer does once an event runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndAction {
	#[default]
	None,
	Stop,
	LoadNext,
	PlayNext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
	Event,
	Group,
	Delay,
	Milestone,
}

impl fmt::Display for EntryKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Event => "event",
			Self::Group => "group",
			Self::Delay => "delay",
			Self::Milestone => "milestone",
		};
		f.write_str(name)
	}
}

/// A timed, playable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventEntry {
	pub id: EntryId,
	pub parent: Option<EntryId>,
	pub cue: String,
	pub title: String,
	pub presenter: String,
	pub subtitle: String,
	pub note: String,
	pub time_start: TimeMs,
	pub time_end: TimeMs,
	pub duration: TimeMs,
	pub time_strategy: TimeStrategy,
	pub link_start: bool,
	pub timer_type: TimerType,
	pub count_to_end: bool,
	pub end_action: EndAction,
	pub is_public: bool,
	pub skip: bool,
	pub colour: String,
	pub flag: bool,
	pub time_warning: TimeMs,
	pub time_danger: TimeMs,
	pub custom: CustomFields,
	pub revision: u32,
}

impl Default for EventEntry {
	fn default() -> Self {
		Self {
			id: EntryId::new(),
			parent: None,
			cue: String::new(),
			title: String::new(),
			presenter: String::new(),
			subtitle: String::new(),
			note: String::new(),
			time_start: 0,
			time_end: 0,
			duration: 0,
			time_strategy: TimeStrategy::default(),
			link_start: false,
			timer_type: TimerType::default(),
			count_to_end: false,
			end_action: EndAction::default(),
			is_public: false,
			skip: false,
			colour: String::new(),
			flag: false,
			time_warning: DEFAULT_TIME_WARNING,
			time_danger: DEFAULT_TIME_DANGER,
			custom: CustomFields::new(),
			revision: 0,
		}
	}
}

impl EventEntry {
	pub fn new(id: impl Into<EntryId>, time_start: TimeMs, time_end: TimeMs) -> Self {
		Self {
			id: id.into(),
			time_start,
			time_end,
			duration: crate::timing::calculate_duration(time_start, time_end),
			..Self::default()
		}
	}

	pub fn titled(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}

	pub fn presented_by(mut self, presenter: impl Into<String>) -> Self {
		self.presenter = presenter.into();
		self
	}

	pub fn public(mut self) -> Self {
		self.is_public = true;
		self
	}

	pub fn skipped(mut self) -> Self {
		self.skip = true;
		self
	}

	pub fn with_end_action(mut self, end_action: EndAction) -> Self {
		self.end_action = end_action;
		self
	}

	pub fn with_thresholds(mut self, warning: TimeMs, danger: TimeMs) -> Self {
		self.time_warning = warning;
		self.time_danger = danger;
		self
	}

	/// End time shifted past midnight when the event wraps around
	pub fn normal_end(&self) -> TimeMs {
		crate::timing::normalise_end(self.time_start, self.time_end)
	}
}

/// A container that owns an ordered run of child entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupEntry {
	pub id: EntryId,
	pub parent: Option<EntryId>,
	pub title: String,
	pub note: String,
	pub colour: String,
	pub custom: CustomFields,
	pub entries: Vec<EntryId>,
}

impl GroupEntry {
	pub fn new(id: impl Into<EntryId>) -> Self {
		Self { id: id.into(), ..Self::default() }
	}

	pub fn titled(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}
}

/// Time to push onto the following events, consumed when applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DelayEntry {
	pub id: EntryId,
	pub parent: Option<EntryId>,
	pub duration: TimeMs,
}

impl DelayEntry {
	pub fn new(id: impl Into<EntryId>, duration: TimeMs) -> Self {
		Self {
			id: id.into(),
			parent: None,
			duration,
		}
	}
}

/// Untimed marker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MilestoneEntry {
	pub id: EntryId,
	pub parent: Option<EntryId>,
	pub cue: String,
	pub title: String,
	pub note: String,
	pub colour: String,
	pub custom: CustomFields,
}

impl MilestoneEntry {
	pub fn new(id: impl Into<EntryId>) -> Self {
		Self { id: id.into(), ..Self::default() }
	}

	pub fn titled(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RundownEntry {
	Event(EventEntry),
	Group(GroupEntry),
	Delay(DelayEntry),
	Milestone(MilestoneEntry),
}

impl RundownEntry {
	pub fn id(&self) -> &str {
		match self {
			Self::Event(e) => &e.id,
			Self::Group(g) => &g.id,
			Self::Delay(d) => &d.id,
			Self::Milestone(m) => &m.id,
		}
	}

	pub fn parent(&self) -> Option<&str> {
		match self {
			Self::Event(e) => e.parent.as_deref(),
			Self::Group(g) => g.parent.as_deref(),
			Self::Delay(d) => d.parent.as_deref(),
			Self::Milestone(m) => m.parent.as_deref(),
		}
	}

	pub fn kind(&self) -> EntryKind {
		match self {
			Self::Event(_) => EntryKind::Event,
			Self::Group(_) => EntryKind::Group,
			Self::Delay(_) => EntryKind::Delay,
			Self::Milestone(_) => EntryKind::Milestone,
		}
	}

	pub fn is_group(&self) -> bool {
		matches!(self, Self::Group(_))
	}

	pub fn as_event(&self) -> Option<&EventEntry> {
		match self {
			Self::Event(e) => Some(e),
			_ => None,
		}
	}

	pub fn as_group(&self) -> Option<&GroupEntry> {
		match self {
			Self::Group(g) => Some(g),
			_ => None,
		}
	}

	pub(crate) fn set_id(&mut self, id: EntryId) {
		match self {
			Self::Event(e) => e.id = id,
			Self::Group(g) => g.id = id,
			Self::Delay(d) => d.id = id,
			Self::Milestone(m) => m.id = id,
		}
	}

	pub(crate) fn set_parent(&mut self, parent: Option<EntryId>) {
		match self {
			Self::Event(e) => e.parent = parent,
			Self::Group(g) => g.parent = parent,
			Self::Delay(d) => d.parent = parent,
			Self::Milestone(m) => m.parent = parent,
		}
	}
}

impl From<EventEntry> for RundownEntry {
	fn from(event: EventEntry) -> Self {
		Self::Event(event)
	}
}

impl From<GroupEntry> for RundownEntry {
	fn from(group: GroupEntry) -> Self {
		Self::Group(group)
	}
}

impl From<DelayEntry> for RundownEntry {
	fn from(delay: DelayEntry) -> Self {
		Self::Delay(delay)
	}
}

impl From<MilestoneEntry> for RundownEntry {
	fn from(milestone: MilestoneEntry) -> Self {
		Self::Milestone(milestone)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn entries_serialize_with_type_tag() {
		let entry = RundownEntry::from(EventEntry::new("a", 1000, 2000).titled("Opening"));
		let json = serde_json::to_value(&entry).unwrap();

		assert_eq!(json["type"], "event");
		assert_eq!(json["timeStart"], 1000);
		assert_eq!(json["duration"], 1000);

		let back: RundownEntry = serde_json::from_value(json).unwrap();
		assert_eq!(back, entry);
	}

	#[test]
	fn partial_event_json_uses_defaults() {
		let entry: RundownEntry = serde_json::from_str(r#"{"type":"event","id":"x","timeStart":10}"#).unwrap();
		let event = entry.as_event().unwrap();

		assert_eq!(event.time_start, 10);
		assert_eq!(event.time_warning, DEFAULT_TIME_WARNING);
		assert_eq!(event.end_action, EndAction::None);
	}

	#[test]
	fn normal_end_wraps_past_midnight() {
		let event = EventEntry::new("late", DAY_MS - 1000, 500);
		assert_eq!(event.duration, 1500);
		assert_eq!(event.normal_end(), DAY_MS + 500);
	}
}
