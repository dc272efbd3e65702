use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal playback phase that side effects hang off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerLifecycle {
	OnLoad,
	OnStart,
	OnUpdate,
	OnPause,
	OnStop,
	OnFinish,
}

impl TimerLifecycle {
	pub const ALL: [Self; 6] = [Self::OnLoad, Self::OnStart, Self::OnUpdate, Self::OnPause, Self::OnStop, Self::OnFinish];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::OnLoad => "onLoad",
			Self::OnStart => "onStart",
			Self::OnUpdate => "onUpdate",
			Self::OnPause => "onPause",
			Self::OnStop => "onStop",
			Self::OnFinish => "onFinish",
		}
	}
}

impl fmt::Display for TimerLifecycle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for TimerLifecycle {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL.into_iter().find(|cycle| cycle.as_str() == s).ok_or_else(|| format!("Unknown lifecycle: {}", s))
	}
}
