use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use rundown::{EditOutcome, EntryId, EntryPatch, ReorderPosition, Rundown, RundownEntry, RundownMetadata, TimeMs};
use ws_events::{ShowEvent, ShowSnapshot};

use super::commands::{Responder, ShowCommand};
use super::engine::ShowEngine;
use crate::config::ShowConfig;
use crate::context::{LoadTarget, ShowContext};
use crate::error::{PlaybackError, Result};

/// Cloneable façade over the running show engine
#[derive(Debug, Clone)]
pub struct ShowHandle {
	command_tx: mpsc::UnboundedSender<ShowCommand>,
	state_rx: watch::Receiver<ShowSnapshot>,
	events_tx: broadcast::Sender<ShowEvent>,
	task_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
	cancel_token: CancellationToken,
}

impl ShowHandle {
	/// Move `context` onto its own task; must be called inside a tokio runtime
	pub fn spawn(context: ShowContext, config: ShowConfig) -> Result<Self> {
		config.validate()?;

		let cancel_token = CancellationToken::new();
		let (command_tx, command_rx) = mpsc::unbounded_channel();
		let state_rx = context.watch();
		let events_tx = context.event_sender();

		let engine = ShowEngine::new(context, config);
		let task_handle = tokio::spawn(engine.run(command_rx, cancel_token.clone()));

		info!("Show engine spawned");

		Ok(Self {
			command_tx,
			state_rx,
			events_tx,
			task_handle: Arc::new(Mutex::new(Some(task_handle))),
			cancel_token,
		})
	}

	async fn request<T>(&self, make: impl FnOnce(Responder<T>) -> ShowCommand) -> Result<T> {
		let (tx, rx) = oneshot::channel();
		self.command_tx.send(make(tx)).map_err(|_| PlaybackError::Internal("Failed to send command".into()))?;

		rx.await.map_err(|_| PlaybackError::Internal("Engine dropped".into()))?
	}

	// Rundown
	pub async fn add(&self, entry: impl Into<RundownEntry>, after: Option<EntryId>, parent: Option<EntryId>) -> Result<RundownEntry> {
		let entry = entry.into();
		self.request(|response| ShowCommand::Add { entry, after, parent, response }).await
	}
	pub async fn edit(&self, patch: EntryPatch) -> Result<EditOutcome> {
		self.request(|response| ShowCommand::Edit { patch, response }).await
	}
	pub async fn batch_edit(&self, ids: Vec<EntryId>, patch: EntryPatch) -> Result<Vec<RundownEntry>> {
		self.request(|response| ShowCommand::BatchEdit { ids, patch, response }).await
	}
	pub async fn remove(&self, id: impl Into<EntryId>) -> Result<usize> {
		let id = id.into();
		self.request(|response| ShowCommand::Remove { id, response }).await
	}
	pub async fn remove_many(&self, ids: Vec<EntryId>) -> Result<usize> {
		self.request(|response| ShowCommand::RemoveMany { ids, response }).await
	}
	pub async fn remove_all(&self) -> Result<()> {
		self.request(|response| ShowCommand::RemoveAll { response }).await
	}
	pub async fn reorder(&self, id: impl Into<EntryId>, target: impl Into<EntryId>, position: ReorderPosition) -> Result<RundownEntry> {
		let (id, target) = (id.into(), target.into());
		self.request(|response| ShowCommand::Reorder { id, target, position, response }).await
	}
	pub async fn swap(&self, a: impl Into<EntryId>, b: impl Into<EntryId>) -> Result<()> {
		let (a, b) = (a.into(), b.into());
		self.request(|response| ShowCommand::Swap { a, b, response }).await
	}
	pub async fn apply_delay(&self, id: impl Into<EntryId>) -> Result<Vec<EntryId>> {
		let id = id.into();
		self.request(|response| ShowCommand::ApplyDelay { id, response }).await
	}
	pub async fn clone_entry(&self, id: impl Into<EntryId>) -> Result<RundownEntry> {
		let id = id.into();
		self.request(|response| ShowCommand::CloneEntry { id, response }).await
	}
	pub async fn dissolve_group(&self, id: impl Into<EntryId>) -> Result<Vec<EntryId>> {
		let id = id.into();
		self.request(|response| ShowCommand::DissolveGroup { id, response }).await
	}
	pub async fn set_title(&self, title: impl Into<String>) -> Result<()> {
		let title = title.into();
		self.request(|response| ShowCommand::SetTitle { title, response }).await
	}
	/// Returns the revision the new rundown was committed at
	pub async fn replace_rundown(&self, rundown: Rundown) -> Result<u64> {
		let rundown = Box::new(rundown);
		self.request(|response| ShowCommand::Replace { rundown, response }).await
	}

	// Playback
	pub async fn load(&self, target: LoadTarget) -> Result<()> {
		self.request(|response| ShowCommand::Load { target, response }).await
	}
	pub async fn load_id(&self, id: impl Into<EntryId>) -> Result<()> {
		self.load(LoadTarget::Id(id.into())).await
	}
	pub async fn start(&self) -> Result<()> {
		self.request(|response| ShowCommand::Start { response }).await
	}
	pub async fn pause(&self) -> Result<()> {
		self.request(|response| ShowCommand::Pause { response }).await
	}
	pub async fn stop(&self) -> Result<()> {
		self.request(|response| ShowCommand::Stop { response }).await
	}
	pub async fn previous(&self) -> Result<()> {
		self.request(|response| ShowCommand::Previous { response }).await
	}
	pub async fn next(&self) -> Result<()> {
		self.request(|response| ShowCommand::Next { response }).await
	}
	pub async fn roll(&self) -> Result<()> {
		self.request(|response| ShowCommand::Roll { response }).await
	}
	pub async fn reload(&self) -> Result<()> {
		self.request(|response| ShowCommand::Reload { response }).await
	}
	pub async fn delay(&self, amount: TimeMs) -> Result<()> {
		self.request(|response| ShowCommand::Delay { amount, response }).await
	}

	// Queries
	pub async fn entry(&self, id: impl Into<EntryId>) -> Result<RundownEntry> {
		let id = id.into();
		self.request(|response| ShowCommand::GetEntry { id, response }).await
	}
	pub async fn metadata(&self) -> Result<RundownMetadata> {
		self.request(|response| ShowCommand::Metadata { response }).await
	}

	// Access state
	pub fn subscribe_events(&self) -> broadcast::Receiver<ShowEvent> {
		self.events_tx.subscribe()
	}
	pub fn watch_state(&self) -> watch::Receiver<ShowSnapshot> {
		self.state_rx.clone()
	}
	pub fn current_state(&self) -> ShowSnapshot {
		self.state_rx.borrow().clone()
	}

	/// Stop the engine and wait for its task to finish
	pub async fn shutdown(&self) {
		self.cancel_token.cancel();
		if let Some(handle) = self.task_handle.lock().await.take() {
			let _ = handle.await;
		}
	}

	pub fn is_running(&self) -> bool {
		!self.cancel_token.is_cancelled() && !self.command_tx.is_closed()
	}
}
