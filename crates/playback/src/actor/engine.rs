use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::commands::ShowCommand;
use crate::config::ShowConfig;
use crate::context::ShowContext;

/// Owns the show context and runs it on a single task
#[derive(Debug)]
pub(crate) struct ShowEngine {
	context: ShowContext,
	config: ShowConfig,
}

impl ShowEngine {
	pub(crate) fn new(context: ShowContext, config: ShowConfig) -> Self {
		Self { context, config }
	}

	pub(crate) async fn run(mut self, mut command_rx: mpsc::UnboundedReceiver<ShowCommand>, cancel: CancellationToken) {
		let mut ticker = interval(self.config.tick_interval());
		ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

		if self.config.start_in_roll {
			if let Err(e) = self.context.roll() {
				warn!(error = %e, "Could not start in roll mode");
			}
		}

		info!(tick_ms = self.config.tick_interval_ms, "Show engine started");

		loop {
			tokio::select! {
				_ = ticker.tick() => self.context.tick(),

				cmd = command_rx.recv() => match cmd {
					Some(cmd) => self.handle(cmd),
					None => {
						info!("Command channel closed, show engine stopping");
						break;
					}
				},

				() = cancel.cancelled() => {
					info!("Show engine cancelled");
					break;
				}
			}
		}
	}

	fn handle(&mut self, command: ShowCommand) {
		let ctx = &mut self.context;

		// a dropped responder means the caller stopped waiting
		match command {
			ShowCommand::Add { entry, after, parent, response } => {
				let _ = response.send(ctx.add(entry, after.as_deref(), parent.as_deref()));
			}
			ShowCommand::Edit { patch, response } => {
				let _ = response.send(ctx.edit(&patch));
			}
			ShowCommand::BatchEdit { ids, patch, response } => {
				let _ = response.send(ctx.batch_edit(&ids, &patch));
			}
			ShowCommand::Remove { id, response } => {
				let _ = response.send(ctx.remove(&id));
			}
			ShowCommand::RemoveMany { ids, response } => {
				let _ = response.send(ctx.remove_many(&ids));
			}
			ShowCommand::RemoveAll { response } => {
				let _ = response.send(ctx.remove_all());
			}
			ShowCommand::Reorder { id, target, position, response } => {
				let _ = response.send(ctx.reorder(&id, &target, position));
			}
			ShowCommand::Swap { a, b, response } => {
				let _ = response.send(ctx.swap(&a, &b));
			}
			ShowCommand::ApplyDelay { id, response } => {
				let _ = response.send(ctx.apply_delay(&id));
			}
			ShowCommand::CloneEntry { id, response } => {
				let _ = response.send(ctx.clone_entry(&id));
			}
			ShowCommand::DissolveGroup { id, response } => {
				let _ = response.send(ctx.dissolve_group(&id));
			}
			ShowCommand::SetTitle { title, response } => {
				let _ = response.send(ctx.set_title(title));
			}
			ShowCommand::Replace { rundown, response } => {
				let _ = response.send(ctx.replace_rundown(*rundown));
			}

			ShowCommand::Load { target, response } => {
				let _ = response.send(ctx.load(&target));
			}
			ShowCommand::Start { response } => {
				let _ = response.send(ctx.start());
			}
			ShowCommand::Pause { response } => {
				let _ = response.send(ctx.pause());
			}
			ShowCommand::Stop { response } => {
				let _ = response.send(ctx.stop());
			}
			ShowCommand::Previous { response } => {
				let _ = response.send(ctx.previous());
			}
			ShowCommand::Next { response } => {
				let _ = response.send(ctx.next());
			}
			ShowCommand::Roll { response } => {
				let _ = response.send(ctx.roll());
			}
			ShowCommand::Reload { response } => {
				let _ = response.send(ctx.reload());
			}
			ShowCommand::Delay { amount, response } => {
				let _ = response.send(ctx.delay(amount));
			}

			ShowCommand::GetEntry { id, response } => {
				let _ = response.send(ctx.entry(&id));
			}
			ShowCommand::Metadata { response } => {
				let _ = response.send(Ok(ctx.metadata()));
			}
		}
	}
}
