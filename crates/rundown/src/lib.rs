//! In-memory rundown: the schedule entries, their structural rules and every edit that may
//! be made to them.

mod entry;
mod error;
mod mutation;
mod patch;
mod store;
mod timing;
mod transaction;
mod view;

pub use entry::{CustomFields, DelayEntry, EndAction, EntryId, EntryKind, EventEntry, GroupEntry, MilestoneEntry, RundownEntry, TimeMs, TimeStrategy, TimerType, DAY_MS};
pub use error::{Result, RundownError};
pub use mutation::{EditOutcome, ReorderPosition};
pub use patch::EntryPatch;
pub use store::Rundown;
pub use timing::{calculate_duration, normalise_end, wrap_day};
pub use transaction::{Commit, RundownStore, Transaction};
pub use view::{PlayableEvents, RundownMetadata};
