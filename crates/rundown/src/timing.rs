use crate::error::{Result, RundownError};
use crate::{EventEntry, TimeMs, TimeStrategy, DAY_MS};

/// Duration between two times of day, wrapping over midnight
pub fn calculate_duration(start: TimeMs, end: TimeMs) -> TimeMs {
	if end < start {
		end + DAY_MS - start
	} else {
		end - start
	}
}

pub fn normalise_end(start: TimeMs, end: TimeMs) -> TimeMs {
	if end < start {
		end + DAY_MS
	} else {
		end
	}
}

/// Fold any millisecond value back into a single day
pub fn wrap_day(time: TimeMs) -> TimeMs {
	time.rem_euclid(DAY_MS)
}

fn check_time_of_day(field: &str, value: TimeMs) -> Result<()> {
	if (0..DAY_MS).contains(&value) {
		Ok(())
	} else {
		Err(RundownError::invalid(format!("{field} must be within a day, got {value}")))
	}
}

/// Timing fields requested by an edit
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TimingChange {
	pub time_start: Option<TimeMs>,
	pub time_end: Option<TimeMs>,
	pub duration: Option<TimeMs>,
	pub time_strategy: Option<TimeStrategy>,
}

impl TimingChange {
	pub fn validate(&self) -> Result<()> {
		if let Some(start) = self.time_start {
			check_time_of_day("timeStart", start)?;
		}
		if let Some(end) = self.time_end {
			check_time_of_day("timeEnd", end)?;
		}
		match self.duration {
			Some(d) if !(0..=DAY_MS).contains(&d) => Err(RundownError::invalid(format!("duration must be within a day, got {d}"))),
			_ => Ok(()),
		}
	}

	/// Apply to an already validated event
	pub fn apply(&self, event: &mut EventEntry) {
		if let Some(strategy) = self.time_strategy {
			event.time_strategy = strategy;
		}

		let start = self.time_start.unwrap_or(event.time_start);

		if let Some(duration) = self.duration {
			event.duration = duration;
			event.time_end = wrap_day(start + duration);
		} else if let Some(end) = self.time_end {
			event.time_end = end;
			event.duration = calculate_duration(start, end);
		} else if self.time_start.is_some() {
			match event.time_strategy {
				TimeStrategy::LockDuration => event.time_end = wrap_day(start + event.duration),
				TimeStrategy::LockEnd => event.duration = calculate_duration(start, event.time_end),
			}
		}

		event.time_start = start;
	}
}

/// Validate a freshly submitted event and derive whichever of end/duration is missing
pub(crate) fn settle_new_event(event: &mut EventEntry) -> Result<()> {
	check_time_of_day("timeStart", event.time_start)?;
	check_time_of_day("timeEnd", event.time_end)?;
	if !(0..=DAY_MS).contains(&event.duration) {
		return Err(RundownError::invalid(format!("duration must be within a day, got {}", event.duration)));
	}

	if event.time_end == event.time_start && event.duration > 0 {
		event.time_end = wrap_day(event.time_start + event.duration);
	} else {
		event.duration = calculate_duration(event.time_start, event.time_end);
	}
	Ok(())
}
