use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;
use tracing::info;

use ws_events::TimerLifecycle;

use crate::error::IntegrationError;

/// A resolved trigger, ready to leave the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMessage {
	pub trigger_id: String,
	pub cycle: TimerLifecycle,
	pub payload: String,
}

/// Destination for trigger messages (OSC, HTTP, ...)
pub trait IntegrationSink: Send + Sync + fmt::Debug {
	fn name(&self) -> &str;

	fn deliver(&self, message: &TriggerMessage) -> Result<(), IntegrationError>;
}

/// Writes every message to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl IntegrationSink for TracingSink {
	fn name(&self) -> &str {
		"tracing"
	}

	fn deliver(&self, message: &TriggerMessage) -> Result<(), IntegrationError> {
		info!(trigger = %message.trigger_id, cycle = %message.cycle, payload = %message.payload, "Integration trigger fired");
		Ok(())
	}
}

/// Hands messages to another task over a channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
	name: String,
	tx: mpsc::UnboundedSender<TriggerMessage>,
}

impl ChannelSink {
	pub fn new(name: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<TriggerMessage>) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self { name: name.into(), tx }, rx)
	}
}

impl IntegrationSink for ChannelSink {
	fn name(&self) -> &str {
		&self.name
	}

	fn deliver(&self, message: &TriggerMessage) -> Result<(), IntegrationError> {
		self.tx.send(message.clone()).map_err(|_| IntegrationError::Dispatch {
			sink: self.name.clone(),
			reason: "receiver dropped".to_string(),
		})
	}
}
