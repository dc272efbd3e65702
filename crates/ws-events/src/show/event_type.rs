use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
	RundownChanged,
	TimerUpdate,
	TimerLifecycle,
}

impl fmt::Display for EventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.subject())
	}
}

impl EventType {
	/// Dotted subject consumers subscribe to
	pub fn subject(&self) -> &'static str {
		match self {
			EventType::RundownChanged => "rundown.changed",
			EventType::TimerUpdate => "timer.update",
			EventType::TimerLifecycle => "timer.lifecycle",
		}
	}

	pub fn connection_subject(&self, connection_id: &str) -> String {
		format!("{}.{}", self.subject(), connection_id)
	}
}

impl std::str::FromStr for EventType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"rundown.changed" | "rundownChanged" => Ok(EventType::RundownChanged),
			"timer.update" | "timerUpdate" => Ok(EventType::TimerUpdate),
			"timer.lifecycle" | "timerLifecycle" => Ok(EventType::TimerLifecycle),
			_ => Err(format!("Unknown event type: {}", s)),
		}
	}
}
