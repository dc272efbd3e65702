//! The show context owns the rundown store, the playback timer and the integrations, and is
//! the only place either of them changes. Every mutation and playback command goes through
//! it, so commits, timer re-syncs and lifecycle dispatch always happen in the same order.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use rundown::{EditOutcome, EntryId, EntryPatch, PlayableEvents, ReorderPosition, Rundown, RundownEntry, RundownMetadata, RundownStore, TimeMs, Transaction};
use ws_events::{PlaybackState, RundownChanged, ShowEvent, ShowSnapshot, TimerSnapshot};

use crate::clock::Clock;
use crate::config::ShowConfig;
use crate::error::{PlaybackError, Result};
use crate::integration::IntegrationRegistry;
use crate::timer::{follow_up, FollowUp, PlaybackTimer, MAX_STEPS};

/// How a caller names the event to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadTarget {
	Id(EntryId),
	/// Position in the playable events
	Index(usize),
}

pub struct ShowContext {
	store: RundownStore,
	timer: PlaybackTimer,
	integrations: IntegrationRegistry,
	clock: Box<dyn Clock>,
	events_tx: broadcast::Sender<ShowEvent>,
	state_tx: watch::Sender<ShowSnapshot>,
}

impl std::fmt::Debug for ShowContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ShowContext")
			.field("revision", &self.store.revision())
			.field("playback", &self.timer.playback())
			.field("triggers", &self.integrations.triggers().len())
			.finish_non_exhaustive()
	}
}

impl ShowContext {
	pub fn new(store: RundownStore, integrations: IntegrationRegistry, clock: impl Clock + 'static, config: &ShowConfig) -> Self {
		let timer = PlaybackTimer::new(store.playable());
		let (events_tx, _) = broadcast::channel(config.broadcast_capacity.max(1));
		let (state_tx, _) = watch::channel(ShowSnapshot {
			rundown: store.snapshot(),
			playable: store.playable(),
			timer: timer.snapshot(),
		});

		info!(revision = store.revision(), events = store.playable().len(), triggers = integrations.triggers().len(), "Show context created");

		Self {
			store,
			timer,
			integrations,
			clock: Box::new(clock),
			events_tx,
			state_tx,
		}
	}

	// ------------------------------------------------------------------
	// Rundown mutations
	// ------------------------------------------------------------------

	/// Run `f` as one transaction; the timer follows whatever it commits
	pub fn mutate<T>(&mut self, f: impl FnOnce(&mut Transaction<'_>) -> rundown::Result<T>) -> Result<T> {
		let (value, commit) = self.store.apply(f).inspect_err(|e| info!(error = %e, "Rundown edit rejected"))?;

		let now = self.clock.now();
		self.broadcast(ShowEvent::Rundown(RundownChanged {
			revision: commit.revision(),
			did_invalidate: commit.did_invalidate,
			rundown: Arc::clone(&commit.rundown),
		}));

		self.timer.begin_step();
		if let Err(e) = self.timer.sync(commit.playable, commit.did_invalidate, now) {
			warn!(error = %e, revision = commit.rundown.revision(), "Timer could not follow the rundown");
		}
		self.drain(now);
		self.publish();
		Ok(value)
	}

	pub fn add(&mut self, entry: RundownEntry, after: Option<&str>, parent: Option<&str>) -> Result<RundownEntry> {
		self.mutate(|tx| tx.add(entry, after, parent))
	}

	pub fn edit(&mut self, patch: &EntryPatch) -> Result<EditOutcome> {
		self.mutate(|tx| tx.edit(patch))
	}

	pub fn batch_edit(&mut self, ids: &[EntryId], patch: &EntryPatch) -> Result<Vec<RundownEntry>> {
		self.mutate(|tx| tx.batch_edit(ids, patch))
	}

	pub fn remove(&mut self, id: &str) -> Result<usize> {
		self.mutate(|tx| tx.remove(id))
	}

	pub fn remove_many(&mut self, ids: &[EntryId]) -> Result<usize> {
		self.mutate(|tx| tx.remove_many(ids))
	}

	pub fn remove_all(&mut self) -> Result<()> {
		self.mutate(|tx| tx.remove_all())
	}

	pub fn reorder(&mut self, id: &str, target: &str, position: ReorderPosition) -> Result<RundownEntry> {
		self.mutate(|tx| tx.reorder(id, target, position))
	}

	pub fn swap(&mut self, a: &str, b: &str) -> Result<()> {
		self.mutate(|tx| tx.swap(a, b))
	}

	pub fn apply_delay(&mut self, delay_id: &str) -> Result<Vec<EntryId>> {
		self.mutate(|tx| tx.apply_delay(delay_id))
	}

	pub fn clone_entry(&mut self, id: &str) -> Result<RundownEntry> {
		self.mutate(|tx| tx.clone_entry(id))
	}

	pub fn dissolve_group(&mut self, group_id: &str) -> Result<Vec<EntryId>> {
		self.mutate(|tx| tx.dissolve_group(group_id))
	}

	pub fn set_title(&mut self, title: String) -> Result<()> {
		self.mutate(|tx| tx.set_title(title))
	}

	/// Swap in a whole rundown, as when a show file is opened
	pub fn replace_rundown(&mut self, rundown: Rundown) -> Result<u64> {
		let commit = self.store.replace(rundown)?;
		let revision = commit.revision();
		let now = self.clock.now();
		info!(revision, events = commit.playable.len(), "Rundown replaced");

		self.broadcast(ShowEvent::Rundown(RundownChanged {
			revision,
			did_invalidate: true,
			rundown: Arc::clone(&commit.rundown),
		}));
		self.timer.begin_step();
		if let Err(e) = self.timer.sync(commit.playable, true, now) {
			warn!(error = %e, revision, "Timer could not follow the rundown");
		}
		self.drain(now);
		self.publish();
		Ok(revision)
	}

	// ------------------------------------------------------------------
	// Playback
	// ------------------------------------------------------------------

	pub fn load(&mut self, target: &LoadTarget) -> Result<()> {
		let index = self.resolve(target)?;
		self.step(|timer, now| timer.load(index, now))
	}

	pub fn start(&mut self) -> Result<()> {
		self.step(PlaybackTimer::start)
	}

	pub fn pause(&mut self) -> Result<()> {
		self.step(PlaybackTimer::pause)
	}

	pub fn stop(&mut self) -> Result<()> {
		self.step(PlaybackTimer::stop)
	}

	pub fn previous(&mut self) -> Result<()> {
		self.step(PlaybackTimer::previous)
	}

	pub fn next(&mut self) -> Result<()> {
		self.step(PlaybackTimer::next)
	}

	pub fn roll(&mut self) -> Result<()> {
		self.step(PlaybackTimer::roll)
	}

	pub fn reload(&mut self) -> Result<()> {
		self.step(PlaybackTimer::reload)
	}

	/// Add `amount` ms to the running countdown; negative values take time away
	pub fn delay(&mut self, amount: TimeMs) -> Result<()> {
		self.step(|timer, now| timer.add_time(amount, now))
	}

	/// Periodic update, driven by the engine's ticker
	pub fn tick(&mut self) {
		let now = self.clock.now();
		self.timer.begin_step();
		self.timer.update(now);
		self.drain(now);

		if self.timer.playback().is_active() {
			self.broadcast(ShowEvent::Timer(self.timer.snapshot()));
		}
		self.publish();
	}

	fn resolve(&self, target: &LoadTarget) -> Result<usize> {
		match target {
			LoadTarget::Index(index) => Ok(*index),
			LoadTarget::Id(id) => self.timer.playable().position(id).ok_or_else(|| match self.store.snapshot().get_event(id) {
				Some(event) if event.skip => PlaybackError::RefusedSkipped(id.clone()),
				_ => PlaybackError::NotFound(id.clone()),
			}),
		}
	}

	fn step(&mut self, op: impl FnOnce(&mut PlaybackTimer, TimeMs) -> Result<()>) -> Result<()> {
		let now = self.clock.now();
		self.timer.begin_step();
		let result = op(&mut self.timer, now);
		if let Err(e) = &result {
			info!(error = %e, playback = %self.timer.playback(), "Playback command refused");
		}

		self.drain(now);
		self.publish();
		result
	}

	/// Dispatch queued lifecycle steps, running end actions as they come up
	fn drain(&mut self, now: TimeMs) {
		while let Some(cycle) = self.timer.pop_cycle() {
			self.broadcast(ShowEvent::Lifecycle {
				cycle,
				snapshot: self.timer.snapshot(),
			});
			self.integrations.dispatch(cycle, &self.timer.placeholders());

			if self.timer.playback() != PlaybackState::Play {
				continue;
			}
			if let Some(action) = follow_up(cycle, self.timer.end_action()) {
				self.follow(action, now);
			}
		}
	}

	fn follow(&mut self, action: FollowUp, now: TimeMs) {
		if self.timer.step_budget() < action.steps() {
			warn!(?action, max = MAX_STEPS, "Lifecycle step limit reached, stopping instead");
			if let Err(e) = self.timer.stop(now) {
				warn!(error = %e, "Stop at step limit failed");
			}
			return;
		}

		debug!(?action, "Running end action");
		let result = match action {
			FollowUp::Stop => self.timer.stop(now),
			FollowUp::LoadNext => self.timer.next(now),
			FollowUp::PlayNext => self.timer.next(now).and_then(|()| self.timer.start(now)),
		};

		if let Err(e) = result {
			info!(error = %e, ?action, "End action cannot continue, stopping");
			if let Err(e) = self.timer.stop(now) {
				warn!(error = %e, "Stop after end action failed");
			}
		}
	}

	fn broadcast(&self, event: ShowEvent) {
		// no subscribers is not an error
		let _ = self.events_tx.send(event);
	}

	fn publish(&self) {
		self.state_tx.send_replace(self.snapshot());
	}

	// ------------------------------------------------------------------
	// Queries
	// ------------------------------------------------------------------

	pub fn rundown(&self) -> Arc<Rundown> {
		self.store.snapshot()
	}

	pub fn playable(&self) -> Arc<PlayableEvents> {
		self.store.playable()
	}

	pub fn timer(&self) -> TimerSnapshot {
		self.timer.snapshot()
	}

	pub fn metadata(&self) -> RundownMetadata {
		self.store.playable().metadata()
	}

	pub fn entry(&self, id: &str) -> Result<RundownEntry> {
		self.store.snapshot().get(id).cloned().ok_or_else(|| PlaybackError::NotFound(id.to_string()))
	}

	pub fn snapshot(&self) -> ShowSnapshot {
		ShowSnapshot {
			rundown: self.store.snapshot(),
			playable: self.store.playable(),
			timer: self.timer.snapshot(),
		}
	}

	pub fn subscribe(&self) -> broadcast::Receiver<ShowEvent> {
		self.events_tx.subscribe()
	}

	pub fn watch(&self) -> watch::Receiver<ShowSnapshot> {
		self.state_tx.subscribe()
	}

	pub(crate) fn event_sender(&self) -> broadcast::Sender<ShowEvent> {
		self.events_tx.clone()
	}
}
