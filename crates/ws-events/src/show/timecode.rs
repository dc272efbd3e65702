use serde::{Deserialize, Serialize};

use rundown::TimeMs;

/// Timecode in HH:MM:SS.mmm format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timecode(String);

impl Timecode {
	pub fn from_ms(ms: TimeMs) -> Self {
		let sign = if ms < 0 { "-" } else { "" };
		let ms = ms.abs();
		let hours = ms / (3600 * 1000);
		let minutes = (ms % (3600 * 1000)) / (60 * 1000);
		let seconds = (ms % (60 * 1000)) / 1000;
		let milliseconds = ms % 1000;
		Self(format!("{sign}{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// Signed `HH:MM:SS`, as shown on a countdown; whole seconds are truncated toward zero
pub fn format_timer(ms: TimeMs) -> String {
	let total = ms.abs() / 1000;
	let sign = if ms <= -1000 { "-" } else { "" };
	format!("{sign}{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
