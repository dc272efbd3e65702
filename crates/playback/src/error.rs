use rundown::{EntryId, RundownError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlaybackError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
	#[error("Event not found: {0}")]
	NotFound(String),

	#[error("Event {0} is skipped and cannot be loaded")]
	RefusedSkipped(EntryId),

	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	#[error("No event loaded")]
	NothingLoaded,

	#[error(transparent)]
	Rundown(#[from] RundownError),

	#[error("Internal error: {0}")]
	Internal(String),
}

impl PlaybackError {
	pub fn is_recoverable(&self) -> bool {
		match self {
			Self::NotFound(_) | Self::RefusedSkipped(_) | Self::InvalidArgument(_) | Self::NothingLoaded => true,
			Self::Rundown(e) => e.is_caller_error(),
			Self::Internal(_) => false,
		}
	}
}

/// Failures around integration triggers; reported, never fatal to the show
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrationError {
	#[error("Trigger {trigger} names unknown lifecycle {cycle}")]
	UnknownLifecycle { trigger: String, cycle: String },

	#[error("Sink {sink} failed: {reason}")]
	Dispatch { sink: String, reason: String },
}
