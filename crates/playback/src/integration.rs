//! Outbound triggers fired on lifecycle transitions.

mod placeholder;
mod sink;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ws_events::TimerLifecycle;

use crate::error::IntegrationError;

pub use placeholder::{resolve_placeholders, PlaceholderValues};
pub use sink::{ChannelSink, IntegrationSink, TracingSink, TriggerMessage};

fn enabled_by_default() -> bool {
	true
}

/// A trigger subscription as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfig {
	pub id: String,
	pub cycle: String,
	pub message: String,
	#[serde(default = "enabled_by_default")]
	pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
	pub id: String,
	pub cycle: TimerLifecycle,
	pub message: String,
	pub enabled: bool,
}

impl TryFrom<TriggerConfig> for Trigger {
	type Error = IntegrationError;

	fn try_from(config: TriggerConfig) -> Result<Self, Self::Error> {
		let cycle = config.cycle.parse().map_err(|_| IntegrationError::UnknownLifecycle {
			trigger: config.id.clone(),
			cycle: config.cycle.clone(),
		})?;

		Ok(Self {
			id: config.id,
			cycle,
			message: config.message,
			enabled: config.enabled,
		})
	}
}

/// Triggers and the sinks their messages go to
#[derive(Debug, Default)]
pub struct IntegrationRegistry {
	triggers: Vec<Trigger>,
	sinks: Vec<Box<dyn IntegrationSink>>,
}

impl IntegrationRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse every config; bad entries are skipped and returned
	pub fn from_configs(configs: impl IntoIterator<Item = TriggerConfig>) -> (Self, Vec<IntegrationError>) {
		let mut registry = Self::new();
		let mut errors = Vec::new();

		for config in configs {
			match Trigger::try_from(config) {
				Ok(trigger) => registry.triggers.push(trigger),
				Err(e) => {
					warn!(error = %e, "Skipping integration trigger");
					errors.push(e);
				}
			}
		}
		(registry, errors)
	}

	pub fn with_sink(mut self, sink: impl IntegrationSink + 'static) -> Self {
		self.add_sink(sink);
		self
	}

	pub fn add_sink(&mut self, sink: impl IntegrationSink + 'static) {
		self.sinks.push(Box::new(sink));
	}

	pub fn triggers(&self) -> &[Trigger] {
		&self.triggers
	}

	/// Deliver every enabled trigger for `cycle`; returns how many messages reached a sink
	pub fn dispatch(&self, cycle: TimerLifecycle, values: &PlaceholderValues) -> usize {
		let mut delivered = 0;
		for trigger in self.triggers.iter().filter(|t| t.enabled && t.cycle == cycle) {
			let message = TriggerMessage {
				trigger_id: trigger.id.clone(),
				cycle,
				payload: resolve_placeholders(&trigger.message, values),
			};

			for sink in &self.sinks {
				match sink.deliver(&message) {
					Ok(()) => delivered += 1,
					Err(e) => warn!(error = %e, trigger = %trigger.id, "Integration dispatch failed"),
				}
			}
		}

		if delivered > 0 {
			debug!(%cycle, delivered, "Integration triggers dispatched");
		}
		delivered
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(id: &str, cycle: &str, message: &str) -> TriggerConfig {
		TriggerConfig {
			id: id.into(),
			cycle: cycle.into(),
			message: message.into(),
			enabled: true,
		}
	}

	#[test]
	fn unknown_cycle_is_reported_and_skipped() {
		let (registry, errors) = IntegrationRegistry::from_configs([config("a", "onStart", "go"), config("b", "onExplode", "boom")]);

		assert_eq!(registry.triggers().len(), 1);
		assert_eq!(
			errors,
			[IntegrationError::UnknownLifecycle {
				trigger: "b".into(),
				cycle: "onExplode".into()
			}]
		);
	}

	#[test]
	fn matching_triggers_reach_every_sink() {
		let (first, mut first_rx) = ChannelSink::new("first");
		let (second, mut second_rx) = ChannelSink::new("second");
		let (registry, _) = IntegrationRegistry::from_configs([config("go", "onStart", "/start $title"), config("bye", "onStop", "/stop")]);
		let registry = registry.with_sink(first).with_sink(second).with_sink(TracingSink);

		let values = PlaceholderValues {
			title: "Opening".into(),
			..PlaceholderValues::default()
		};
		assert_eq!(registry.dispatch(TimerLifecycle::OnStart, &values), 3);

		let message = first_rx.try_recv().unwrap();
		assert_eq!(message.payload, "/start Opening");
		assert_eq!(message.trigger_id, "go");
		assert_eq!(second_rx.try_recv().unwrap(), message);
		assert!(first_rx.try_recv().is_err());
	}

	#[test]
	fn no_subscribers_is_silent() {
		let registry = IntegrationRegistry::new().with_sink(TracingSink);
		assert_eq!(registry.dispatch(TimerLifecycle::OnUpdate, &PlaceholderValues::default()), 0);
	}

	#[test]
	fn failing_sink_does_not_block_others() {
		let (dead, dead_rx) = ChannelSink::new("dead");
		drop(dead_rx);
		let (alive, mut alive_rx) = ChannelSink::new("alive");
		let (registry, _) = IntegrationRegistry::from_configs([config("x", "onFinish", "done")]);
		let registry = registry.with_sink(dead).with_sink(alive);

		assert_eq!(registry.dispatch(TimerLifecycle::OnFinish, &PlaceholderValues::default()), 1);
		assert_eq!(alive_rx.try_recv().unwrap().payload, "done");
	}

	#[test]
	fn disabled_trigger_defaults_on() {
		let parsed: TriggerConfig = serde_json::from_str(r#"{"id":"t","cycle":"onLoad","message":"m"}"#).unwrap();
		assert!(parsed.enabled);
	}
}
