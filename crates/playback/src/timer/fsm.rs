use ws_events::PlaybackState;

use crate::error::{PlaybackError, Result};

/// User-facing controls that move the playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackAction {
	Load,
	Start,
	Pause,
	Stop,
	Roll,
}

/// Pure FSM: validates transitions only
pub fn transition(state: PlaybackState, action: PlaybackAction) -> Result<PlaybackState> {
	use PlaybackAction as A;
	use PlaybackState as S;

	Ok(match (state, action) {
		// Load always arms, leaving roll behind
		(_, A::Load) => S::Armed,

		(S::Armed | S::Pause | S::Play, A::Start) => S::Play,
		(S::Stop, A::Start) => return Err(PlaybackError::NothingLoaded),
		(S::Roll, A::Start) => return Err(PlaybackError::InvalidArgument("cannot start while rolling".to_string())),

		// Pause only from Play, otherwise a no-op
		(S::Play, A::Pause) => S::Pause,
		(_, A::Pause) => state,

		(_, A::Stop) => S::Stop,
		(_, A::Roll) => S::Roll,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	const STATES: [PlaybackState; 5] = [PlaybackState::Stop, PlaybackState::Armed, PlaybackState::Play, PlaybackState::Pause, PlaybackState::Roll];

	#[test]
	fn stop_and_load_accepted_everywhere() {
		for state in STATES {
			assert_eq!(transition(state, PlaybackAction::Stop), Ok(PlaybackState::Stop));
			assert_eq!(transition(state, PlaybackAction::Load), Ok(PlaybackState::Armed));
			assert_eq!(transition(state, PlaybackAction::Roll), Ok(PlaybackState::Roll));
		}
	}

	#[test]
	fn start_needs_a_loaded_event() {
		assert_eq!(transition(PlaybackState::Stop, PlaybackAction::Start), Err(PlaybackError::NothingLoaded));
		assert!(matches!(transition(PlaybackState::Roll, PlaybackAction::Start), Err(PlaybackError::InvalidArgument(_))));
		assert_eq!(transition(PlaybackState::Pause, PlaybackAction::Start), Ok(PlaybackState::Play));
	}

	#[test]
	fn pause_only_moves_from_play() {
		assert_eq!(transition(PlaybackState::Play, PlaybackAction::Pause), Ok(PlaybackState::Pause));
		for state in [PlaybackState::Stop, PlaybackState::Armed, PlaybackState::Pause, PlaybackState::Roll] {
			assert_eq!(transition(state, PlaybackAction::Pause), Ok(state));
		}
	}
}
