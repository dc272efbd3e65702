mod config;
mod seed;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use playback::{ChannelSink, IntegrationRegistry, ShowContext, ShowHandle, SystemClock, TracingSink};
use ws_events::ShowEvent;

use crate::config::Config;

fn log_event(event: &ShowEvent) {
	let subject = event.event_type().subject();
	match event {
		ShowEvent::Rundown(changed) => info!(subject, revision = changed.revision, invalidated = changed.did_invalidate, "Rundown changed"),
		ShowEvent::Lifecycle { cycle, snapshot } => info!(subject, %cycle, event = ?snapshot.selected_event_id(), "Timer lifecycle"),
		ShowEvent::Timer(_) => {}
	}

	match serde_json::to_string(event) {
		Ok(payload) => trace!(subject, %payload, "Broadcast"),
		Err(e) => warn!(subject, error = %e, "Could not serialize broadcast event"),
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	dotenv::dotenv().ok();
	let config = Config::parse();
	telemetry::init_tracing(&config)?;

	let store = seed::load_store(config.rundown_file.as_deref())?;
	let (mut integrations, skipped) = IntegrationRegistry::from_configs(seed::load_triggers(config.integrations_file.as_deref())?);
	if !skipped.is_empty() {
		warn!(count = skipped.len(), "Some integration triggers were skipped");
	}
	let (outbound, mut messages) = ChannelSink::new("outbound");
	integrations.add_sink(TracingSink);
	integrations.add_sink(outbound);

	let show_config = config.show_config();
	let context = ShowContext::new(store, integrations, SystemClock, &show_config);
	let handle = ShowHandle::spawn(context, show_config).context("starting show engine")?;

	let metadata = handle.metadata().await?;
	info!(
		events = metadata.num_events,
		first_start = ?metadata.first_start,
		total_ms = metadata.total_duration,
		roll = config.start_in_roll,
		"Show engine running"
	);

	let shutdown_token = CancellationToken::new();

	// Stand-in for the websocket fan-out: consume and log every broadcast
	let mut events = handle.subscribe_events();
	let event_token = shutdown_token.clone();
	let event_task = tokio::spawn(async move {
		loop {
			tokio::select! {
				() = event_token.cancelled() => break,
				received = events.recv() => match received {
					Ok(event) => log_event(&event),
					Err(RecvError::Lagged(missed)) => warn!(missed, "Broadcast consumer fell behind"),
					Err(RecvError::Closed) => break,
				},
			}
		}
		debug!("Broadcast consumer stopped");
	});

	// Ends once the engine drops its sink
	let integration_task = tokio::spawn(async move {
		while let Some(message) = messages.recv().await {
			debug!(trigger = %message.trigger_id, cycle = %message.cycle, payload = %message.payload, "Outbound trigger");
		}
		debug!("Integration consumer stopped");
	});

	tokio::signal::ctrl_c().await.context("listening for Ctrl+C")?;
	info!("Received Ctrl+C, initiating shutdown...");
	shutdown_token.cancel();

	let cleanup = async {
		handle.shutdown().await;
		info!("Show engine stopped");
		let _ = event_task.await;
		let _ = integration_task.await;
	};

	match tokio::time::timeout(Duration::from_secs(5), cleanup).await {
		Ok(()) => info!("Graceful shutdown completed"),
		Err(_) => error!("Shutdown timeout - forcing exit"),
	}

	Ok(())
}
