mod countdown;
mod fsm;
mod lifecycle;

use std::sync::Arc;
use tracing::{debug, info};

use rundown::{EndAction, EntryId, EventEntry, PlayableEvents, TimeMs};
use ws_events::{EventSelection, PlaybackState, TimerLifecycle, TimerPhase, TimerSnapshot, TimerState};

use crate::error::{PlaybackError, Result};
use crate::integration::PlaceholderValues;
use crate::roll::roll_select;

pub use countdown::{time_between, Countdown, ZeroCrossing};
pub use fsm::{transition, PlaybackAction};
pub use lifecycle::{follow_up, CycleQueue, FollowUp, MAX_STEPS};

/// Selection and countdown of the show, with the lifecycle steps each change causes
#[derive(Debug, Clone, Default)]
pub struct PlaybackTimer {
	playback: PlaybackState,
	phase: TimerPhase,
	countdown: Countdown,
	loaded: Option<EventEntry>,
	selected_index: Option<usize>,
	next_event_id: Option<EntryId>,
	public_event_id: Option<EntryId>,
	public_next_event_id: Option<EntryId>,
	secondary_timer: Option<TimeMs>,
	clock: TimeMs,
	playable: Arc<PlayableEvents>,
	cycles: CycleQueue,
	// reached zero while not playing; raised on the next start
	finish_due: bool,
}

impl PlaybackTimer {
	pub fn new(playable: Arc<PlayableEvents>) -> Self {
		Self {
			playable,
			..Self::default()
		}
	}

	pub fn playback(&self) -> PlaybackState {
		self.playback
	}

	pub fn phase(&self) -> TimerPhase {
		self.phase
	}

	pub fn countdown(&self) -> &Countdown {
		&self.countdown
	}

	pub fn loaded(&self) -> Option<&EventEntry> {
		self.loaded.as_ref()
	}

	pub fn next_event(&self) -> Option<&EventEntry> {
		self.next_event_id.as_deref().and_then(|id| self.playable.find(id))
	}

	pub fn playable(&self) -> &PlayableEvents {
		&self.playable
	}

	pub fn end_action(&self) -> EndAction {
		self.loaded.as_ref().map(|e| e.end_action).unwrap_or_default()
	}

	/// Forget queued steps and start a fresh step budget
	pub fn begin_step(&mut self) {
		self.cycles.reset();
	}

	pub fn pop_cycle(&mut self) -> Option<TimerLifecycle> {
		self.cycles.pop()
	}

	/// Lifecycle steps still accepted for the current external event
	pub fn step_budget(&self) -> usize {
		self.cycles.remaining()
	}

	/// Raise a finish now, or once playback resumes
	fn finish(&mut self) {
		if self.playback == PlaybackState::Play {
			info!(event = ?self.loaded.as_ref().map(|e| &e.id), "Event finished");
			self.cycles.push(TimerLifecycle::OnFinish);
		} else {
			debug!("Finish held until playback resumes");
			self.finish_due = true;
		}
	}

	pub fn load(&mut self, index: usize, now: TimeMs) -> Result<()> {
		let event = self.playable.get(index).cloned().ok_or_else(|| PlaybackError::NotFound(format!("no playable event at index {index}")))?;
		if event.skip {
			return Err(PlaybackError::RefusedSkipped(event.id));
		}

		self.playback = transition(self.playback, PlaybackAction::Load)?;
		info!(event = %event.id, index, "Event loaded");
		self.countdown = Countdown::new(event.duration);
		self.finish_due = false;
		self.loaded = Some(event);
		self.selected_index = Some(index);
		self.secondary_timer = None;
		self.clock = now;
		self.refresh_neighbours();
		self.refresh_phase();
		self.cycles.push(TimerLifecycle::OnLoad);
		Ok(())
	}

	pub fn start(&mut self, now: TimeMs) -> Result<()> {
		if self.playback == PlaybackState::Play {
			return Ok(());
		}
		let next = transition(self.playback, PlaybackAction::Start)?;

		self.countdown.start(now);
		let finished = self.countdown.update(now);
		self.playback = next;
		self.clock = now;
		self.refresh_phase();
		info!(event = ?self.loaded.as_ref().map(|e| &e.id), "Playback started");
		self.cycles.push(TimerLifecycle::OnStart);
		// zero-length events finish the moment they start
		if finished || std::mem::take(&mut self.finish_due) {
			self.finish();
		}
		Ok(())
	}

	pub fn pause(&mut self, now: TimeMs) -> Result<()> {
		let next = transition(self.playback, PlaybackAction::Pause)?;
		if next == self.playback {
			return Ok(());
		}

		let finished = self.countdown.update(now);
		self.countdown.pause(now);
		self.playback = next;
		self.clock = now;
		info!("Playback paused");
		self.cycles.push(TimerLifecycle::OnPause);
		if finished {
			self.finish();
		}
		self.refresh_phase();
		Ok(())
	}

	/// Clear the selection and every accumulator
	pub fn stop(&mut self, now: TimeMs) -> Result<()> {
		self.clock = now;
		if self.playback == PlaybackState::Stop {
			return Ok(());
		}

		self.playback = transition(self.playback, PlaybackAction::Stop)?;
		self.countdown = Countdown::default();
		self.finish_due = false;
		self.loaded = None;
		self.selected_index = None;
		self.secondary_timer = None;
		self.refresh_neighbours();
		self.refresh_phase();
		info!("Playback stopped");
		self.cycles.push(TimerLifecycle::OnStop);
		Ok(())
	}

	/// Add (or with a negative amount, remove) time from the running event
	pub fn add_time(&mut self, amount: TimeMs, now: TimeMs) -> Result<()> {
		match self.playback {
			PlaybackState::Stop => return Err(PlaybackError::NothingLoaded),
			PlaybackState::Roll => return Err(PlaybackError::InvalidArgument("cannot add time while rolling".to_string())),
			PlaybackState::Armed | PlaybackState::Play | PlaybackState::Pause => {}
		}

		self.clock = now;
		let crossing = self.countdown.add_time(amount, now);
		debug!(amount, current = self.countdown.current(), "Time added");
		match crossing {
			Some(ZeroCrossing::IntoOvertime) => self.finish(),
			Some(ZeroCrossing::OutOfOvertime) => self.finish_due = false,
			None => {}
		}
		self.refresh_phase();
		Ok(())
	}

	/// Periodic recompute from the clock
	pub fn update(&mut self, now: TimeMs) {
		self.clock = now;
		match self.playback {
			PlaybackState::Play => {
				let finished = self.countdown.update(now);
				self.cycles.push(TimerLifecycle::OnUpdate);
				if finished {
					self.finish();
				}
			}
			PlaybackState::Pause => {
				if self.countdown.update(now) {
					self.finish();
				}
			}
			PlaybackState::Roll => self.roll_update(now),
			PlaybackState::Armed | PlaybackState::Stop => {}
		}
		self.refresh_phase();
	}

	/// Hand selection over to the schedule
	pub fn roll(&mut self, now: TimeMs) -> Result<()> {
		if self.playback == PlaybackState::Roll {
			return Ok(());
		}

		self.playback = transition(self.playback, PlaybackAction::Roll)?;
		self.countdown = Countdown::default();
		self.finish_due = false;
		self.loaded = None;
		self.selected_index = None;
		info!(events = self.playable.len(), "Roll mode entered");
		self.roll_update(now);
		self.refresh_phase();
		Ok(())
	}

	fn roll_update(&mut self, now: TimeMs) {
		let selection = roll_select(self.playable.as_slice(), now);
		let previous = self.loaded.as_ref().map(|e| e.id.clone());
		self.clock = now;

		match (selection.now_index, selection.timers) {
			(Some(index), Some(timers)) => {
				let event = self.playable.get(index).cloned();
				if previous.as_deref() == selection.now_id.as_deref() {
					self.countdown.follow_schedule(timers.duration, timers.current);
					self.cycles.push(TimerLifecycle::OnUpdate);
				} else {
					if previous.is_some() {
						self.cycles.push(TimerLifecycle::OnFinish);
					}
					debug!(event = ?selection.now_id, "Roll selected event");
					self.countdown = Countdown::running_since(timers.started_at, timers.duration, timers.current);
					self.cycles.push(TimerLifecycle::OnLoad);
					self.cycles.push(TimerLifecycle::OnStart);
				}
				self.loaded = event;
				self.selected_index = Some(index);
				self.secondary_timer = None;
			}
			_ => {
				if previous.is_some() {
					self.cycles.push(TimerLifecycle::OnFinish);
					self.countdown = Countdown::default();
					self.loaded = None;
					self.selected_index = None;
				}
				self.secondary_timer = selection.time_to_next;
			}
		}

		let id_at = |index: Option<usize>| index.and_then(|i| self.playable.get(i)).map(|e| e.id.clone());
		self.next_event_id = selection.next_id;
		self.public_event_id = id_at(selection.now_public_index);
		self.public_next_event_id = id_at(selection.next_public_index);
	}

	pub fn next(&mut self, now: TimeMs) -> Result<()> {
		let index = self.selected_index.map_or(0, |i| i + 1);
		if index >= self.playable.len() {
			return Err(PlaybackError::NotFound("no next event".to_string()));
		}
		self.load(index, now)
	}

	pub fn previous(&mut self, now: TimeMs) -> Result<()> {
		let index = match self.selected_index {
			None => 0,
			Some(0) => return Err(PlaybackError::NotFound("no previous event".to_string())),
			Some(i) => i - 1,
		};
		if index >= self.playable.len() {
			return Err(PlaybackError::NotFound("no previous event".to_string()));
		}
		self.load(index, now)
	}

	/// Arm the loaded event again with its current data
	pub fn reload(&mut self, now: TimeMs) -> Result<()> {
		if self.playback == PlaybackState::Roll {
			self.roll_update(now);
			self.refresh_phase();
			return Ok(());
		}
		let id = self.loaded.as_ref().map(|e| e.id.clone()).ok_or(PlaybackError::NothingLoaded)?;
		let index = self.playable.position(&id).ok_or(PlaybackError::NotFound(id))?;
		self.load(index, now)
	}

	/// Follow a committed rundown
	pub fn sync(&mut self, playable: Arc<PlayableEvents>, did_invalidate: bool, now: TimeMs) -> Result<()> {
		self.playable = playable;
		self.clock = now;

		if self.playback == PlaybackState::Roll {
			self.roll_update(now);
			self.refresh_phase();
			return Ok(());
		}

		let Some(loaded) = self.loaded.clone() else {
			return Ok(());
		};
		let Some(index) = self.playable.position(&loaded.id) else {
			info!(event = %loaded.id, "Loaded event is no longer playable");
			return self.stop(now);
		};
		let fresh = self.playable.get(index).cloned().ok_or_else(|| PlaybackError::Internal("playable index out of range".to_string()))?;

		let retimed = fresh.duration != loaded.duration || fresh.time_start != loaded.time_start || fresh.time_end != loaded.time_end;
		if did_invalidate && retimed {
			match self.playback {
				PlaybackState::Armed => {
					self.countdown = Countdown::new(fresh.duration);
					self.cycles.push(TimerLifecycle::OnLoad);
				}
				PlaybackState::Play | PlaybackState::Pause => {
					self.countdown.retime(fresh.duration);
					if self.countdown.finished_at().is_none() {
						self.finish_due = false;
					}
					if self.countdown.update(now) {
						self.finish();
					}
				}
				PlaybackState::Stop | PlaybackState::Roll => {}
			}
			debug!(event = %fresh.id, duration = fresh.duration, "Loaded event retimed");
		}

		self.loaded = Some(fresh);
		self.selected_index = Some(index);
		self.refresh_neighbours();
		self.refresh_phase();
		Ok(())
	}

	fn refresh_neighbours(&mut self) {
		let events = self.playable.as_slice();
		let Some(index) = self.selected_index.filter(|&i| i < events.len()) else {
			self.next_event_id = None;
			self.public_event_id = None;
			self.public_next_event_id = None;
			return;
		};

		self.next_event_id = events.get(index + 1).map(|e| e.id.clone());
		self.public_event_id = events[..=index].iter().rev().find(|e| e.is_public).map(|e| e.id.clone());
		self.public_next_event_id = events[index + 1..].iter().find(|e| e.is_public).map(|e| e.id.clone());
	}

	fn refresh_phase(&mut self) {
		self.phase = match (self.playback, &self.loaded) {
			(PlaybackState::Stop, _) => TimerPhase::None,
			(PlaybackState::Roll, None) => TimerPhase::Pending,
			(_, Some(event)) => TimerPhase::from_remaining(self.countdown.current(), event.time_warning, event.time_danger),
			(_, None) => TimerPhase::None,
		};
	}

	pub fn placeholders(&self) -> PlaceholderValues {
		let current = self.loaded.as_ref().map(|_| self.countdown.current());
		PlaceholderValues::new(current, self.loaded.as_ref(), self.next_event())
	}

	pub fn snapshot(&self) -> TimerSnapshot {
		let loaded = self.loaded.is_some();
		let expected_finish = match self.playback {
			PlaybackState::Play | PlaybackState::Roll => self.countdown.expected_finish(self.clock),
			PlaybackState::Stop | PlaybackState::Armed | PlaybackState::Pause => None,
		};

		TimerSnapshot {
			clock: self.clock,
			timer: TimerState {
				playback: self.playback,
				phase: self.phase,
				duration: loaded.then(|| self.countdown.duration()),
				current: loaded.then(|| self.countdown.current()),
				elapsed: self.countdown.elapsed(),
				added_time: self.countdown.added_time(),
				started_at: self.countdown.started_at(),
				paused_at: self.countdown.paused_at(),
				finished_at: self.countdown.finished_at(),
				expected_finish,
				secondary_timer: self.secondary_timer,
			},
			selection: EventSelection {
				selected_event_id: self.loaded.as_ref().map(|e| e.id.clone()),
				selected_event_index: self.selected_index,
				next_event_id: self.next_event_id.clone(),
				public_event_id: self.public_event_id.clone(),
				public_next_event_id: self.public_next_event_id.clone(),
				num_events: self.playable.len(),
			},
		}
	}
}
