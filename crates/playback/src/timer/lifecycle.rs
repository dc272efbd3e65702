use smallvec::SmallVec;
use tracing::warn;

use rundown::EndAction;
use ws_events::TimerLifecycle;

/// Most lifecycle steps one external event may cause
pub const MAX_STEPS: usize = 8;

/// Ordered lifecycle steps waiting to be dispatched
#[derive(Debug, Clone, Default)]
pub struct CycleQueue {
	pending: SmallVec<[TimerLifecycle; MAX_STEPS]>,
	accepted: usize,
}

impl CycleQueue {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start counting a new external event
	pub fn reset(&mut self) {
		self.pending.clear();
		self.accepted = 0;
	}

	/// Queue a step; refused once the per-event budget is spent. `OnStop` is always
	/// accepted so a chain cut short still announces where it ended.
	pub fn push(&mut self, cycle: TimerLifecycle) -> bool {
		if self.accepted >= MAX_STEPS && cycle != TimerLifecycle::OnStop {
			warn!(%cycle, max = MAX_STEPS, "Lifecycle step limit reached, dropping step");
			return false;
		}
		self.accepted += 1;
		self.pending.push(cycle);
		true
	}

	pub fn pop(&mut self) -> Option<TimerLifecycle> {
		if self.pending.is_empty() {
			None
		} else {
			Some(self.pending.remove(0))
		}
	}

	pub fn remaining(&self) -> usize {
		MAX_STEPS.saturating_sub(self.accepted)
	}

	pub fn len(&self) -> usize {
		self.pending.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}
}

/// What the timer does after an event finishes in manual play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
	Stop,
	LoadNext,
	PlayNext,
}

impl FollowUp {
	/// Steps the action may queue: a load, a start and the finish of a zero-length event
	pub fn steps(self) -> usize {
		match self {
			Self::Stop => 0,
			Self::LoadNext => 1,
			Self::PlayNext => 3,
		}
	}
}

pub fn follow_up(cycle: TimerLifecycle, end_action: EndAction) -> Option<FollowUp> {
	match (cycle, end_action) {
		(TimerLifecycle::OnFinish, EndAction::Stop) => Some(FollowUp::Stop),
		(TimerLifecycle::OnFinish, EndAction::LoadNext) => Some(FollowUp::LoadNext),
		(TimerLifecycle::OnFinish, EndAction::PlayNext) => Some(FollowUp::PlayNext),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn queue_is_fifo_and_bounded() {
		let mut queue = CycleQueue::new();
		assert!(queue.push(TimerLifecycle::OnFinish));
		assert!(queue.push(TimerLifecycle::OnLoad));
		assert_eq!(queue.pop(), Some(TimerLifecycle::OnFinish));

		for _ in 0..MAX_STEPS - 2 {
			assert!(queue.push(TimerLifecycle::OnUpdate));
		}
		assert!(!queue.push(TimerLifecycle::OnStart));
		assert_eq!(queue.len(), MAX_STEPS - 1);
		assert_eq!(queue.remaining(), 0);
		assert!(queue.push(TimerLifecycle::OnStop));
		assert_eq!(queue.len(), MAX_STEPS);

		queue.reset();
		assert!(queue.is_empty());
		assert_eq!(queue.remaining(), MAX_STEPS);
		assert!(queue.push(TimerLifecycle::OnStart));
	}

	#[test]
	fn only_finish_has_follow_ups() {
		assert_eq!(follow_up(TimerLifecycle::OnFinish, EndAction::PlayNext), Some(FollowUp::PlayNext));
		assert_eq!(follow_up(TimerLifecycle::OnFinish, EndAction::None), None);
		for cycle in [TimerLifecycle::OnLoad, TimerLifecycle::OnStart, TimerLifecycle::OnUpdate, TimerLifecycle::OnPause, TimerLifecycle::OnStop] {
			assert_eq!(follow_up(cycle, EndAction::Stop), None);
		}
	}
}
