use thiserror::Error;

use crate::EntryId;

pub type Result<T> = std::result::Result<T, RundownError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RundownError {
	#[error("Entry not found: {0}")]
	NotFound(EntryId),

	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	#[error("Rundown invariant violated: {0}")]
	InvariantViolation(String),
}

impl RundownError {
	pub fn invalid(reason: impl Into<String>) -> Self {
		Self::InvalidArgument(reason.into())
	}

	pub fn violation(reason: impl Into<String>) -> Self {
		Self::InvariantViolation(reason.into())
	}

	/// Caller mistakes, as opposed to engine bugs
	pub fn is_caller_error(&self) -> bool {
		matches!(self, Self::NotFound(_) | Self::InvalidArgument(_))
	}
}
