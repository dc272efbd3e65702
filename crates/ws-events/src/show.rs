use serde::{Deserialize, Serialize};
use std::sync::Arc;

use rundown::Rundown;

mod event_type;
mod lifecycle;
mod state;
mod timecode;

pub use event_type::EventType;
pub use lifecycle::TimerLifecycle;
pub use state::{EventSelection, PlaybackState, ShowSnapshot, TimerPhase, TimerSnapshot, TimerState};
pub use timecode::{format_timer, Timecode};

/// A committed rundown, as broadcast after every mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RundownChanged {
	pub revision: u64,
	pub did_invalidate: bool,
	pub rundown: Arc<Rundown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "camelCase")]
pub enum ShowEvent {
	Rundown(RundownChanged),
	Timer(TimerSnapshot),
	Lifecycle { cycle: TimerLifecycle, snapshot: TimerSnapshot },
}

impl ShowEvent {
	pub fn event_type(&self) -> EventType {
		match self {
			Self::Rundown(_) => EventType::RundownChanged,
			Self::Timer(_) => EventType::TimerUpdate,
			Self::Lifecycle { .. } => EventType::TimerLifecycle,
		}
	}

	/// Timer snapshot carried by the event, if any
	pub fn timer(&self) -> Option<&TimerSnapshot> {
		match self {
			Self::Rundown(_) => None,
			Self::Timer(snapshot) | Self::Lifecycle { snapshot, .. } => Some(snapshot),
		}
	}
}

impl From<RundownChanged> for ShowEvent {
	fn from(changed: RundownChanged) -> Self {
		Self::Rundown(changed)
	}
}

impl From<TimerSnapshot> for ShowEvent {
	fn from(snapshot: TimerSnapshot) -> Self {
		Self::Timer(snapshot)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn events_carry_type_tag_and_subject() {
		let event = ShowEvent::Lifecycle {
			cycle: TimerLifecycle::OnStart,
			snapshot: TimerSnapshot::default(),
		};
		let json = serde_json::to_value(&event).unwrap();

		assert_eq!(json["type"], "lifecycle");
		assert_eq!(json["cycle"], "onStart");
		assert_eq!(event.event_type().subject(), "timer.lifecycle");
		assert!(event.timer().is_some());
	}

	#[test]
	fn rundown_change_round_trips() {
		let event = ShowEvent::from(RundownChanged {
			revision: 4,
			did_invalidate: true,
			rundown: Arc::new(Rundown::new("show")),
		});
		let json = serde_json::to_string(&event).unwrap();
		let back: ShowEvent = serde_json::from_str(&json).unwrap();

		assert_eq!(back, event);
		assert_eq!(back.event_type(), EventType::RundownChanged);
	}
}
