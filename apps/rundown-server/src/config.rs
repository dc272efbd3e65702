use clap::Parser;
use std::path::PathBuf;

use playback::ShowConfig;

#[derive(Parser, Clone, Debug)]
#[command(name = "rundown-server")]
#[command(about = "Live rundown store and playback engine", long_about = None)]
pub struct Config {
	/// Use JSON formatting for tracing
	#[arg(long, env = "LOG_JSON", default_value = "false")]
	pub log_json: bool,

	/// Log filter directives
	#[arg(long, env = "RUST_LOG")]
	pub rust_log: Option<String>,

	/// Milliseconds between timer updates
	#[arg(long, env = "TICK_INTERVAL_MS", default_value = "1000")]
	pub tick_interval_ms: u64,

	/// Events buffered for slow subscribers
	#[arg(long, env = "BROADCAST_CAPACITY", default_value = "256")]
	pub broadcast_capacity: usize,

	/// Rundown to load at startup (JSON)
	#[arg(long, env = "RUNDOWN_FILE")]
	pub rundown_file: Option<PathBuf>,

	/// Integration trigger subscriptions (JSON list)
	#[arg(long, env = "INTEGRATIONS_FILE")]
	pub integrations_file: Option<PathBuf>,

	/// Follow the schedule from the wall clock as soon as the engine starts
	#[arg(long, env = "START_IN_ROLL", default_value = "false")]
	pub start_in_roll: bool,
}

impl Config {
	pub fn show_config(&self) -> ShowConfig {
		ShowConfig::new()
			.with_tick_interval(self.tick_interval_ms)
			.with_broadcast_capacity(self.broadcast_capacity)
			.with_roll(self.start_in_roll)
	}
}
