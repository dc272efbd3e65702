use rundown::{wrap_day, TimeMs, DAY_MS};

/// Time from `from` to `to`, assuming `to` is never earlier than a day before
pub fn time_between(from: TimeMs, to: TimeMs) -> TimeMs {
	if to >= from {
		to - from
	} else {
		to + DAY_MS - from
	}
}

/// Which way a manual adjustment moved the countdown across zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroCrossing {
	IntoOvertime,
	OutOfOvertime,
}

/// Remaining-time accounting for one run of one event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Countdown {
	duration: TimeMs,
	current: TimeMs,
	added_time: TimeMs,
	started_at: Option<TimeMs>,
	paused_at: Option<TimeMs>,
	finished_at: Option<TimeMs>,
}

impl Countdown {
	pub fn new(duration: TimeMs) -> Self {
		Self {
			duration,
			current: duration,
			..Self::default()
		}
	}

	/// Countdown already underway, as roll finds it
	pub fn running_since(started_at: TimeMs, duration: TimeMs, current: TimeMs) -> Self {
		Self {
			duration,
			current,
			started_at: Some(started_at),
			..Self::default()
		}
	}

	pub fn duration(&self) -> TimeMs {
		self.duration
	}

	pub fn current(&self) -> TimeMs {
		self.current
	}

	pub fn added_time(&self) -> TimeMs {
		self.added_time
	}

	pub fn started_at(&self) -> Option<TimeMs> {
		self.started_at
	}

	pub fn paused_at(&self) -> Option<TimeMs> {
		self.paused_at
	}

	pub fn finished_at(&self) -> Option<TimeMs> {
		self.finished_at
	}

	pub fn is_started(&self) -> bool {
		self.started_at.is_some()
	}

	/// Running time so far, manual additions included
	pub fn elapsed(&self) -> Option<TimeMs> {
		self.started_at.map(|_| self.duration + self.added_time - self.current)
	}

	pub fn expected_finish(&self, now: TimeMs) -> Option<TimeMs> {
		self.started_at.map(|_| wrap_day(now + self.current))
	}

	pub fn start(&mut self, now: TimeMs) {
		match (self.started_at, self.paused_at) {
			(None, _) => self.started_at = Some(now),
			(Some(_), Some(paused)) => {
				self.added_time += time_between(paused, now);
				self.paused_at = None;
			}
			(Some(_), None) => {}
		}
	}

	pub fn pause(&mut self, now: TimeMs) {
		if self.started_at.is_some() && self.paused_at.is_none() {
			self.paused_at = Some(now);
		}
	}

	/// Recompute `current`; true only on the update that first reaches zero
	pub fn update(&mut self, now: TimeMs) -> bool {
		let Some(started) = self.started_at else {
			return false;
		};
		let reference = self.paused_at.unwrap_or(now);
		self.current = self.duration + self.added_time - time_between(started, reference);

		if self.current <= 0 && self.finished_at.is_none() {
			self.finished_at = Some(now);
			return true;
		}
		false
	}

	pub fn add_time(&mut self, amount: TimeMs, now: TimeMs) -> Option<ZeroCrossing> {
		let before = self.current;
		self.added_time += amount;
		self.current += amount;

		if !self.is_started() {
			return None;
		}
		if before > 0 && self.current <= 0 {
			self.finished_at = Some(now);
			Some(ZeroCrossing::IntoOvertime)
		} else if before <= 0 && self.current > 0 {
			self.finished_at = None;
			Some(ZeroCrossing::OutOfOvertime)
		} else {
			None
		}
	}

	/// Adopt a new duration and keep the time already run
	pub fn retime(&mut self, duration: TimeMs) {
		self.current += duration - self.duration;
		self.duration = duration;
		if self.current > 0 {
			self.finished_at = None;
		}
	}

	/// Overwrite with values computed from the schedule
	pub fn follow_schedule(&mut self, duration: TimeMs, current: TimeMs) {
		self.duration = duration;
		self.current = current;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pause_is_folded_into_added_time() {
		let mut countdown = Countdown::new(10_000);
		countdown.start(1_000);
		countdown.update(4_000);
		assert_eq!(countdown.current(), 7_000);

		countdown.pause(4_000);
		countdown.update(9_000);
		assert_eq!(countdown.current(), 7_000);

		countdown.start(9_000);
		assert_eq!(countdown.added_time(), 5_000);
		countdown.update(10_000);
		assert_eq!(countdown.current(), 6_000);
		assert_eq!(countdown.elapsed(), Some(4_000 + 5_000));
	}

	#[test]
	fn finish_is_reported_once() {
		let mut countdown = Countdown::new(1_000);
		countdown.start(0);

		assert!(!countdown.update(500));
		assert!(countdown.update(1_000));
		assert!(!countdown.update(1_500));
		assert!(!countdown.update(3_000));
		assert_eq!(countdown.finished_at(), Some(1_000));
		assert_eq!(countdown.current(), -2_000);
	}

	#[test]
	fn runs_across_midnight() {
		let mut countdown = Countdown::new(120_000);
		countdown.start(DAY_MS - 60_000);
		countdown.update(30_000);
		assert_eq!(countdown.current(), 30_000);
	}

	#[test]
	fn delay_crossing_zero_sets_and_clears_finish() {
		let mut countdown = Countdown::new(5_000);
		countdown.start(0);
		countdown.update(1_000);

		assert_eq!(countdown.add_time(-6_000, 1_000), Some(ZeroCrossing::IntoOvertime));
		assert_eq!(countdown.finished_at(), Some(1_000));

		assert_eq!(countdown.add_time(3_000, 1_200), Some(ZeroCrossing::OutOfOvertime));
		assert_eq!(countdown.finished_at(), None);
		assert_eq!(countdown.add_time(1_000, 1_200), None);
	}

	#[test]
	fn retime_keeps_elapsed() {
		let mut countdown = Countdown::new(10_000);
		countdown.start(0);
		countdown.update(4_000);
		countdown.retime(20_000);

		assert_eq!(countdown.current(), 16_000);
		countdown.update(5_000);
		assert_eq!(countdown.current(), 15_000);
	}
}
