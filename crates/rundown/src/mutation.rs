//! Structural edits on a rundown.
//!
//! Every operation checks its preconditions before touching anything, so an `Err` leaves
//! the rundown exactly as it was. Callers outside this crate go through [`Transaction`].
//!
//! [`Transaction`]: crate::Transaction

use serde::{Deserialize, Serialize};

use crate::error::{Result, RundownError};
use crate::patch::EntryPatch;
use crate::timing::{settle_new_event, wrap_day};
use crate::{EntryId, Rundown, RundownEntry};

/// Where a reordered entry lands relative to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReorderPosition {
	Before,
	After,
	/// First child of the target group
	Insert,
}

/// Result of a single-entry edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
	pub entry: RundownEntry,
	pub did_invalidate: bool,
}

fn generate_id() -> EntryId {
	uuid::Uuid::new_v4().simple().to_string()
}

impl Rundown {
	fn require(&self, id: &str) -> Result<&RundownEntry> {
		self.get(id).ok_or_else(|| RundownError::NotFound(id.to_owned()))
	}

	fn scope(&self, parent: Option<&str>) -> &[EntryId] {
		match parent {
			Some(group) => self.children(group).unwrap_or_default(),
			None => self.order(),
		}
	}

	fn scope_mut(&mut self, parent: Option<&str>) -> Result<&mut Vec<EntryId>> {
		match parent {
			None => Ok(self.order_mut()),
			Some(group) => match self.entries_mut().get_mut(group) {
				Some(RundownEntry::Group(g)) => Ok(&mut g.entries),
				Some(_) => Err(RundownError::invalid(format!("`{group}` is not a group"))),
				None => Err(RundownError::NotFound(group.to_owned())),
			},
		}
	}

	/// Position of `id` inside its own scope
	fn locate(&self, id: &str) -> Result<(Option<EntryId>, usize)> {
		let entry = self.require(id)?;
		let parent = entry.parent().map(str::to_owned);
		let index = self
			.scope(parent.as_deref())
			.iter()
			.position(|e| e == id)
			.ok_or_else(|| RundownError::violation(format!("`{id}` is missing from its scope")))?;
		Ok((parent, index))
	}

	fn fresh_id(&self) -> EntryId {
		loop {
			let id = generate_id();
			if !self.contains(&id) {
				return id;
			}
		}
	}

	fn check_parent(&self, parent: Option<&str>, moving_group: bool) -> Result<()> {
		let Some(parent) = parent else { return Ok(()) };
		let target = self.require(parent)?;
		if !target.is_group() {
			return Err(RundownError::invalid(format!("`{parent}` is not a group")));
		}
		if moving_group {
			return Err(RundownError::invalid("groups cannot be nested"));
		}
		Ok(())
	}

	pub(crate) fn insert_entry(&mut self, mut entry: RundownEntry, after: Option<&str>, parent: Option<&str>) -> Result<RundownEntry> {
		if entry.id().is_empty() {
			entry.set_id(self.fresh_id());
		}
		if self.contains(entry.id()) {
			return Err(RundownError::invalid(format!("entry `{}` already exists", entry.id())));
		}
		self.check_parent(parent, entry.is_group())?;
		if matches!(&entry, RundownEntry::Group(g) if !g.entries.is_empty()) {
			return Err(RundownError::invalid("a new group must be created empty"));
		}
		if let RundownEntry::Event(event) = &mut entry {
			settle_new_event(event)?;
			event.revision = 0;
		}

		let index = match after {
			None => 0,
			Some(anchor) => {
				self.require(anchor)?;
				let at = self
					.scope(parent)
					.iter()
					.position(|e| e == anchor)
					.ok_or_else(|| RundownError::invalid(format!("`{anchor}` is not in the target scope")))?;
				at + 1
			}
		};

		entry.set_parent(parent.map(str::to_owned));
		let id = entry.id().to_owned();
		self.scope_mut(parent)?.insert(index, id.clone());
		self.entries_mut().insert(id, entry.clone());
		self.rebuild_flat_order();
		Ok(entry)
	}

	pub(crate) fn edit_entry(&mut self, patch: &EntryPatch) -> Result<EditOutcome> {
		let mut updated = self.require(&patch.id)?.clone();
		patch.apply_to(&mut updated)?;
		if let RundownEntry::Event(event) = &mut updated {
			event.revision += 1;
		}

		self.entries_mut().insert(patch.id.clone(), updated.clone());
		Ok(EditOutcome {
			entry: updated,
			did_invalidate: patch.touches_timing(),
		})
	}

	pub(crate) fn batch_edit_entries(&mut self, ids: &[EntryId], patch: &EntryPatch) -> Result<Vec<RundownEntry>> {
		let mut staged = Vec::with_capacity(ids.len());
		for id in ids {
			let mut updated = self.require(id)?.clone();
			patch.apply_to(&mut updated)?;
			if let RundownEntry::Event(event) = &mut updated {
				event.revision += 1;
			}
			staged.push(updated);
		}

		for entry in &staged {
			self.entries_mut().insert(entry.id().to_owned(), entry.clone());
		}
		Ok(staged)
	}

	fn collect_subtree(&self, id: &str, out: &mut Vec<EntryId>) {
		out.push(id.to_owned());
		if let Some(children) = self.children(id) {
			for child in children {
				self.collect_subtree(child, out);
			}
		}
	}

	/// Remove an entry and everything it owns, returning how many entries went away
	pub(crate) fn remove_entry(&mut self, id: &str) -> Result<usize> {
		let (parent, index) = self.locate(id)?;

		let mut doomed = Vec::new();
		self.collect_subtree(id, &mut doomed);

		self.scope_mut(parent.as_deref())?.remove(index);
		for gone in &doomed {
			self.entries_mut().remove(gone);
		}
		self.rebuild_flat_order();
		Ok(doomed.len())
	}

	pub(crate) fn remove_entries(&mut self, ids: &[EntryId]) -> Result<usize> {
		let mut removed = 0;
		for id in ids {
			// may already be gone with an earlier group
			if self.contains(id) {
				removed += self.remove_entry(id)?;
			}
		}
		Ok(removed)
	}

	pub(crate) fn remove_all_entries(&mut self) {
		self.clear();
	}

	pub(crate) fn reorder_entry(&mut self, id: &str, target: &str, position: ReorderPosition) -> Result<RundownEntry> {
		let moving = self.require(id)?;
		let moving_group = moving.is_group();
		let target_entry = self.require(target)?;

		if id == target {
			return match position {
				ReorderPosition::Insert => Err(RundownError::invalid("an entry cannot be inserted into itself")),
				_ => Ok(moving.clone()),
			};
		}

		let new_parent = match position {
			ReorderPosition::Insert => {
				if !target_entry.is_group() {
					return Err(RundownError::invalid(format!("cannot insert into `{target}`, it is not a group")));
				}
				Some(target.to_owned())
			}
			ReorderPosition::Before | ReorderPosition::After => target_entry.parent().map(str::to_owned),
		};
		self.check_parent(new_parent.as_deref(), moving_group)?;

		let (old_parent, old_index) = self.locate(id)?;
		self.scope_mut(old_parent.as_deref())?.remove(old_index);

		let scope = self.scope_mut(new_parent.as_deref())?;
		let index = match position {
			ReorderPosition::Insert => 0,
			ReorderPosition::Before | ReorderPosition::After => {
				let at = scope
					.iter()
					.position(|e| e == target)
					.ok_or_else(|| RundownError::violation(format!("`{target}` is missing from its scope")))?;
				if position == ReorderPosition::After {
					at + 1
				} else {
					at
				}
			}
		};
		scope.insert(index, id.to_owned());

		let entry = self.entries_mut().get_mut(id).ok_or_else(|| RundownError::violation(format!("`{id}` vanished while moving")))?;
		entry.set_parent(new_parent);
		let moved = entry.clone();
		self.rebuild_flat_order();
		Ok(moved)
	}

	pub(crate) fn swap_entries(&mut self, a: &str, b: &str) -> Result<()> {
		let (parent_a, index_a) = self.locate(a)?;
		let (parent_b, index_b) = self.locate(b)?;
		if a == b {
			return Ok(());
		}

		let a_group = self.require(a)?.is_group();
		let b_group = self.require(b)?.is_group();
		if (a_group && parent_b.is_some()) || (b_group && parent_a.is_some()) {
			return Err(RundownError::invalid("groups cannot be nested"));
		}

		self.scope_mut(parent_a.as_deref())?[index_a] = b.to_owned();
		self.scope_mut(parent_b.as_deref())?[index_b] = a.to_owned();
		if let Some(entry) = self.entries_mut().get_mut(a) {
			entry.set_parent(parent_b);
		}
		if let Some(entry) = self.entries_mut().get_mut(b) {
			entry.set_parent(parent_a);
		}
		self.rebuild_flat_order();
		Ok(())
	}

	/// Shift the events following a delay up to the next group or the end of the delay's
	/// own group, then drop the delay
	pub(crate) fn apply_delay_entry(&mut self, delay_id: &str) -> Result<Vec<EntryId>> {
		let entry = self.require(delay_id)?;
		let RundownEntry::Delay(delay) = entry else {
			return Err(RundownError::invalid(format!("`{delay_id}` is not a delay")));
		};
		let amount = delay.duration;
		let scope = entry.parent().map(str::to_owned);
		let at = self
			.flat_index(delay_id)
			.ok_or_else(|| RundownError::violation(format!("`{delay_id}` is not in the flat order")))?;

		let affected: Vec<EntryId> = self.flat_order()[at + 1..]
			.iter()
			.take_while(|id| self.get(id).is_some_and(|e| !e.is_group() && e.parent() == scope.as_deref()))
			.filter(|id| self.get_event(id).is_some())
			.cloned()
			.collect();

		if amount != 0 {
			for id in &affected {
				if let Some(RundownEntry::Event(event)) = self.entries_mut().get_mut(id) {
					event.time_start = wrap_day(event.time_start + amount);
					event.time_end = wrap_day(event.time_end + amount);
					event.revision += 1;
				}
			}
		}

		self.remove_entry(delay_id)?;
		Ok(if amount == 0 { Vec::new() } else { affected })
	}

	/// Copy a non-group entry under a fresh id, placed right after the original
	pub(crate) fn clone_entry(&mut self, id: &str) -> Result<RundownEntry> {
		let source = self.require(id)?;
		if source.is_group() {
			return Err(RundownError::invalid("groups cannot be cloned"));
		}

		let mut copy = source.clone();
		let parent = copy.parent().map(str::to_owned);
		copy.set_id(String::new());
		if let RundownEntry::Event(event) = &mut copy {
			event.revision = 0;
		}
		self.insert_entry(copy, Some(id), parent.as_deref())
	}

	/// Remove a group but keep its children, lifted into the top level in its place
	pub(crate) fn dissolve_group(&mut self, group_id: &str) -> Result<Vec<EntryId>> {
		let Some(group) = self.require(group_id)?.as_group() else {
			return Err(RundownError::invalid(format!("`{group_id}` is not a group")));
		};
		let children = group.entries.clone();
		let (_, index) = self.locate(group_id)?;

		let order = self.order_mut();
		order.remove(index);
		for (offset, child) in children.iter().enumerate() {
			order.insert(index + offset, child.clone());
		}
		for child in &children {
			if let Some(entry) = self.entries_mut().get_mut(child) {
				entry.set_parent(None);
			}
		}
		self.entries_mut().remove(group_id);
		self.rebuild_flat_order();
		Ok(children)
	}

	pub(crate) fn rename(&mut self, title: impl Into<String>) {
		self.set_title(title.into());
	}
}
