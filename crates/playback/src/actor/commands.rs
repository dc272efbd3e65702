use tokio::sync::oneshot;

use rundown::{EditOutcome, EntryId, EntryPatch, ReorderPosition, Rundown, RundownEntry, RundownMetadata, TimeMs};

use crate::context::LoadTarget;
use crate::error::Result;

pub(crate) type Responder<T> = oneshot::Sender<Result<T>>;

/// Requests the engine serializes onto its loop
#[derive(Debug)]
pub(crate) enum ShowCommand {
	// Rundown
	Add {
		entry: RundownEntry,
		after: Option<EntryId>,
		parent: Option<EntryId>,
		response: Responder<RundownEntry>,
	},
	Edit {
		patch: EntryPatch,
		response: Responder<EditOutcome>,
	},
	BatchEdit {
		ids: Vec<EntryId>,
		patch: EntryPatch,
		response: Responder<Vec<RundownEntry>>,
	},
	Remove {
		id: EntryId,
		response: Responder<usize>,
	},
	RemoveMany {
		ids: Vec<EntryId>,
		response: Responder<usize>,
	},
	RemoveAll {
		response: Responder<()>,
	},
	Reorder {
		id: EntryId,
		target: EntryId,
		position: ReorderPosition,
		response: Responder<RundownEntry>,
	},
	Swap {
		a: EntryId,
		b: EntryId,
		response: Responder<()>,
	},
	ApplyDelay {
		id: EntryId,
		response: Responder<Vec<EntryId>>,
	},
	CloneEntry {
		id: EntryId,
		response: Responder<RundownEntry>,
	},
	DissolveGroup {
		id: EntryId,
		response: Responder<Vec<EntryId>>,
	},
	SetTitle {
		title: String,
		response: Responder<()>,
	},
	Replace {
		rundown: Box<Rundown>,
		response: Responder<u64>,
	},

	// Playback
	Load {
		target: LoadTarget,
		response: Responder<()>,
	},
	Start {
		response: Responder<()>,
	},
	Pause {
		response: Responder<()>,
	},
	Stop {
		response: Responder<()>,
	},
	Previous {
		response: Responder<()>,
	},
	Next {
		response: Responder<()>,
	},
	Roll {
		response: Responder<()>,
	},
	Reload {
		response: Responder<()>,
	},
	Delay {
		amount: TimeMs,
		response: Responder<()>,
	},

	// Queries
	GetEntry {
		id: EntryId,
		response: Responder<RundownEntry>,
	},
	Metadata {
		response: Responder<RundownMetadata>,
	},
}
