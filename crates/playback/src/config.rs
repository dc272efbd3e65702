use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PlaybackError, Result};

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShowConfig {
	pub tick_interval_ms: u64,
	pub broadcast_capacity: usize,
	/// Enter roll as soon as the engine starts
	pub start_in_roll: bool,
}

impl ShowConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_tick_interval(mut self, ms: u64) -> Self {
		self.tick_interval_ms = ms;
		self
	}

	pub fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
		self.broadcast_capacity = capacity;
		self
	}

	pub fn with_roll(mut self, enable: bool) -> Self {
		self.start_in_roll = enable;
		self
	}

	pub fn tick_interval(&self) -> Duration {
		Duration::from_millis(self.tick_interval_ms)
	}

	pub fn validate(&self) -> Result<()> {
		if self.tick_interval_ms == 0 {
			return Err(PlaybackError::InvalidArgument("tick interval must be positive".to_string()));
		}
		if self.broadcast_capacity == 0 {
			return Err(PlaybackError::InvalidArgument("broadcast capacity must be positive".to_string()));
		}
		Ok(())
	}
}

impl Default for ShowConfig {
	fn default() -> Self {
		Self {
			tick_interval_ms: 1000,
			broadcast_capacity: 256,
			start_in_roll: false,
		}
	}
}
