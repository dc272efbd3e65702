use chrono::{Local, Timelike};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use rundown::{wrap_day, TimeMs};

/// Source of the time of day, in ms since local midnight
pub trait Clock: Send + Sync + fmt::Debug {
	fn now(&self) -> TimeMs;
}

/// Wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> TimeMs {
		let now = Local::now();
		// leap seconds report up to 1999
		let millis = now.timestamp_subsec_millis().min(999);
		i64::from(now.num_seconds_from_midnight()) * 1000 + i64::from(millis)
	}
}

/// Clock that only moves when told to; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
	now: Arc<AtomicI64>,
}

impl ManualClock {
	pub fn new(start: TimeMs) -> Self {
		Self {
			now: Arc::new(AtomicI64::new(wrap_day(start))),
		}
	}

	pub fn set(&self, time: TimeMs) {
		self.now.store(wrap_day(time), Ordering::SeqCst);
	}

	pub fn advance(&self, by: TimeMs) {
		self.set(self.now() + by);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> TimeMs {
		self.now.load(Ordering::SeqCst)
	}
}
