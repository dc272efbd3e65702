use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use rundown::{EntryId, PlayableEvents, Rundown, TimeMs};

/// User-facing playback mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackState {
	#[default]
	Stop,
	Armed,
	Play,
	Pause,
	Roll,
}

impl PlaybackState {
	pub fn is_active(&self) -> bool {
		matches!(self, Self::Play | Self::Pause | Self::Roll)
	}
}

impl fmt::Display for PlaybackState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Stop => "stop",
			Self::Armed => "armed",
			Self::Play => "play",
			Self::Pause => "pause",
			Self::Roll => "roll",
		};
		f.write_str(name)
	}
}

/// Colour band of the running countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerPhase {
	#[default]
	None,
	Default,
	Warning,
	Danger,
	Overtime,
	/// Roll is waiting for the next event to begin
	Pending,
}

impl TimerPhase {
	/// Phase for a running countdown with `current` ms left; zero counts as finished
	pub fn from_remaining(current: TimeMs, warning: TimeMs, danger: TimeMs) -> Self {
		if current <= 0 {
			Self::Overtime
		} else if current <= danger {
			Self::Danger
		} else if current <= warning {
			Self::Warning
		} else {
			Self::Default
		}
	}
}

/// Countdown accounting, all times in ms since local midnight
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
	pub playback: PlaybackState,
	pub phase: TimerPhase,
	pub duration: Option<TimeMs>,
	/// Remaining time, negative once overtime
	pub current: Option<TimeMs>,
	pub elapsed: Option<TimeMs>,
	pub added_time: TimeMs,
	pub started_at: Option<TimeMs>,
	pub paused_at: Option<TimeMs>,
	pub finished_at: Option<TimeMs>,
	pub expected_finish: Option<TimeMs>,
	/// Time until the next event while roll has nothing running
	pub secondary_timer: Option<TimeMs>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSelection {
	pub selected_event_id: Option<EntryId>,
	pub selected_event_index: Option<usize>,
	pub next_event_id: Option<EntryId>,
	pub public_event_id: Option<EntryId>,
	pub public_next_event_id: Option<EntryId>,
	pub num_events: usize,
}

/// Everything a viewer needs to render the timer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
	pub clock: TimeMs,
	#[serde(flatten)]
	pub timer: TimerState,
	#[serde(flatten)]
	pub selection: EventSelection,
}

impl TimerSnapshot {
	pub fn playback(&self) -> PlaybackState {
		self.timer.playback
	}

	pub fn selected_event_id(&self) -> Option<&str> {
		self.selection.selected_event_id.as_deref()
	}
}

/// Combined view published on the engine's watch channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowSnapshot {
	pub rundown: Arc<Rundown>,
	pub playable: Arc<PlayableEvents>,
	pub timer: TimerSnapshot,
}
