use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Result, RundownError};
use crate::mutation::{EditOutcome, ReorderPosition};
use crate::patch::EntryPatch;
use crate::view::PlayableEvents;
use crate::{EntryId, Rundown, RundownEntry};

/// Owner of the committed rundown and the playable view derived from it
#[derive(Debug, Clone, Default)]
pub struct RundownStore {
	current: Arc<Rundown>,
	playable: Arc<PlayableEvents>,
}

/// What a successful commit made visible
#[derive(Debug, Clone)]
pub struct Commit {
	pub rundown: Arc<Rundown>,
	pub playable: Arc<PlayableEvents>,
	pub did_invalidate: bool,
}

impl Commit {
	pub fn revision(&self) -> u64 {
		self.rundown.revision()
	}
}

impl RundownStore {
	pub fn new(rundown: Rundown) -> Self {
		let playable = PlayableEvents::from_rundown(&rundown);
		Self {
			current: Arc::new(rundown),
			playable: Arc::new(playable),
		}
	}

	/// Immutable view of the committed rundown
	pub fn snapshot(&self) -> Arc<Rundown> {
		Arc::clone(&self.current)
	}

	pub fn playable(&self) -> Arc<PlayableEvents> {
		Arc::clone(&self.playable)
	}

	pub fn revision(&self) -> u64 {
		self.current.revision()
	}

	/// Start editing a private copy; nothing is visible until `commit`
	pub fn transaction(&mut self) -> Transaction<'_> {
		let working = Rundown::clone(&self.current);
		Transaction {
			store: self,
			working,
			did_invalidate: false,
			poisoned: None,
		}
	}

	/// Swap in a wholly new rundown, as on load or import
	pub fn replace(&mut self, mut rundown: Rundown) -> Result<Commit> {
		rundown.check_invariants()?;
		rundown.set_revision(rundown.revision().max(self.revision() + 1));
		Ok(self.publish(rundown, true))
	}

	/// Run `f` inside a transaction and commit if it succeeds
	pub fn apply<T>(&mut self, f: impl FnOnce(&mut Transaction<'_>) -> Result<T>) -> Result<(T, Commit)> {
		let mut tx = self.transaction();
		let value = f(&mut tx)?;
		let commit = tx.commit()?;
		Ok((value, commit))
	}

	fn publish(&mut self, rundown: Rundown, did_invalidate: bool) -> Commit {
		let playable = Arc::new(PlayableEvents::from_rundown(&rundown));
		let rundown = Arc::new(rundown);
		self.current = Arc::clone(&rundown);
		self.playable = Arc::clone(&playable);
		debug!(revision = rundown.revision(), entries = rundown.len(), playable = playable.len(), "Rundown committed");

		Commit {
			rundown,
			playable,
			did_invalidate,
		}
	}
}

/// A working copy of the rundown; every operation validates before it mutates
#[derive(Debug)]
pub struct Transaction<'a> {
	store: &'a mut RundownStore,
	working: Rundown,
	did_invalidate: bool,
	poisoned: Option<RundownError>,
}

impl Transaction<'_> {
	fn run<T>(&mut self, structural: bool, op: impl FnOnce(&mut Rundown) -> Result<T>) -> Result<T> {
		if let Some(err) = &self.poisoned {
			return Err(err.clone());
		}
		match op(&mut self.working) {
			Ok(value) => {
				self.did_invalidate |= structural;
				Ok(value)
			}
			Err(err) => {
				if matches!(err, RundownError::InvariantViolation(_)) {
					warn!(error = %err, "Transaction poisoned");
					self.poisoned = Some(err.clone());
				}
				Err(err)
			}
		}
	}

	/// The working copy, including uncommitted changes
	pub fn rundown(&self) -> &Rundown {
		&self.working
	}

	pub fn add(&mut self, entry: impl Into<RundownEntry>, after: Option<&str>, parent: Option<&str>) -> Result<RundownEntry> {
		let entry = entry.into();
		self.run(true, |r| r.insert_entry(entry, after, parent))
	}

	pub fn edit(&mut self, patch: &EntryPatch) -> Result<EditOutcome> {
		let outcome = self.run(false, |r| r.edit_entry(patch))?;
		self.did_invalidate |= outcome.did_invalidate;
		Ok(outcome)
	}

	pub fn batch_edit(&mut self, ids: &[EntryId], patch: &EntryPatch) -> Result<Vec<RundownEntry>> {
		self.run(patch.touches_timing(), |r| r.batch_edit_entries(ids, patch))
	}

	pub fn remove(&mut self, id: &str) -> Result<usize> {
		self.run(true, |r| r.remove_entry(id))
	}

	pub fn remove_many(&mut self, ids: &[EntryId]) -> Result<usize> {
		self.run(true, |r| r.remove_entries(ids))
	}

	pub fn remove_all(&mut self) -> Result<()> {
		self.run(true, |r| {
			r.remove_all_entries();
			Ok(())
		})
	}

	pub fn reorder(&mut self, id: &str, target: &str, position: ReorderPosition) -> Result<RundownEntry> {
		self.run(true, |r| r.reorder_entry(id, target, position))
	}

	pub fn swap(&mut self, a: &str, b: &str) -> Result<()> {
		self.run(true, |r| r.swap_entries(a, b))
	}

	/// Returns the ids of the events that were shifted
	pub fn apply_delay(&mut self, delay_id: &str) -> Result<Vec<EntryId>> {
		self.run(true, |r| r.apply_delay_entry(delay_id))
	}

	pub fn clone_entry(&mut self, id: &str) -> Result<RundownEntry> {
		self.run(true, |r| r.clone_entry(id))
	}

	pub fn dissolve_group(&mut self, group_id: &str) -> Result<Vec<EntryId>> {
		self.run(true, |r| r.dissolve_group(group_id))
	}

	pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
		let title = title.into();
		self.run(false, |r| {
			r.rename(title);
			Ok(())
		})
	}

	/// Verify the working copy and make it the committed rundown
	pub fn commit(self) -> Result<Commit> {
		let Self {
			store,
			mut working,
			did_invalidate,
			poisoned,
		} = self;

		if let Some(err) = poisoned {
			return Err(err);
		}
		if let Err(err) = working.check_invariants() {
			warn!(error = %err, revision = store.revision(), "Refusing to commit an inconsistent rundown");
			return Err(err);
		}

		working.bump_revision();
		Ok(store.publish(working, did_invalidate))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{EventEntry, GroupEntry};

	fn store() -> RundownStore {
		let mut store = RundownStore::default();
		store
			.apply(|tx| {
				tx.add(EventEntry::new("a", 0, 1000), None, None)?;
				tx.add(EventEntry::new("b", 1000, 2000).skipped(), Some("a"), None)?;
				tx.add(EventEntry::new("c", 2000, 3000), Some("b"), None)
			})
			.unwrap();
		store
	}

	#[test]
	fn commit_publishes_snapshot_and_view() {
		let store = store();

		assert_eq!(store.revision(), 1);
		assert_eq!(store.snapshot().flat_order(), ["a", "b", "c"]);
		assert_eq!(store.playable().len(), 2);
	}

	#[test]
	fn uncommitted_changes_stay_private() {
		let mut store = store();
		let before = store.snapshot();
		{
			let mut tx = store.transaction();
			tx.remove("a").unwrap();
			assert!(!tx.rundown().contains("a"));
		}

		assert_eq!(store.snapshot(), before);
		assert_eq!(store.revision(), 1);
	}

	#[test]
	fn failed_apply_keeps_revision() {
		let mut store = store();
		let err = store
			.apply(|tx| {
				tx.remove("a")?;
				tx.remove("nope")
			})
			.unwrap_err();

		assert_eq!(err, RundownError::NotFound("nope".into()));
		assert_eq!(store.revision(), 1);
		assert!(store.snapshot().contains("a"));
	}

	#[test]
	fn title_only_edit_does_not_invalidate() {
		let mut store = store();
		let (_, commit) = store.apply(|tx| tx.set_title("Evening show")).unwrap();
		assert!(!commit.did_invalidate);

		let (_, commit) = store
			.apply(|tx| {
				tx.edit(&EntryPatch {
					duration: Some(500),
					..EntryPatch::new("a")
				})
			})
			.unwrap();
		assert!(commit.did_invalidate);
		assert_eq!(commit.revision(), 3);
	}

	#[test]
	fn replace_keeps_revision_monotonic() {
		let mut store = store();
		let commit = store.replace(Rundown::new("fresh")).unwrap();

		assert_eq!(commit.revision(), 2);
		assert!(store.playable().is_empty());
	}

	#[test]
	fn nested_group_is_refused_inside_transaction() {
		let mut store = store();
		let result = store.apply(|tx| {
			tx.add(GroupEntry::new("g"), Some("c"), None)?;
			tx.add(GroupEntry::new("inner"), None, Some("g"))
		});

		assert!(matches!(result, Err(RundownError::InvalidArgument(_))));
		assert!(!store.snapshot().contains("g"));
	}
}
