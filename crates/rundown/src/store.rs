use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{Result, RundownError};
use crate::{EntryId, EventEntry, RundownEntry};

/// The canonical schedule: entries by id, top-level order and the derived flat order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RundownData")]
pub struct Rundown {
	title: String,
	revision: u64,
	order: Vec<EntryId>,
	flat_order: Vec<EntryId>,
	entries: BTreeMap<EntryId, RundownEntry>,
}

/// Wire shape of a rundown before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RundownData {
	title: String,
	revision: u64,
	order: Vec<EntryId>,
	entries: BTreeMap<EntryId, RundownEntry>,
}

impl TryFrom<RundownData> for Rundown {
	type Error = RundownError;

	fn try_from(data: RundownData) -> Result<Self> {
		let mut rundown = Self::from_parts(data.title, data.order, data.entries)?;
		rundown.revision = data.revision;
		Ok(rundown)
	}
}

impl Rundown {
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			..Self::default()
		}
	}

	/// Build a rundown from loaded data, rejecting anything that breaks the structural rules
	pub fn from_parts(title: impl Into<String>, order: Vec<EntryId>, entries: BTreeMap<EntryId, RundownEntry>) -> Result<Self> {
		for (key, entry) in &entries {
			if key != entry.id() {
				return Err(RundownError::invalid(format!("entry stored under `{key}` has id `{}`", entry.id())));
			}
		}

		let mut rundown = Self {
			title: title.into(),
			revision: 0,
			order,
			flat_order: Vec::new(),
			entries,
		};
		rundown.rebuild_flat_order();
		rundown.check_invariants().map_err(|e| match e {
			RundownError::InvariantViolation(reason) => RundownError::InvalidArgument(reason),
			other => other,
		})?;
		Ok(rundown)
	}

	pub fn title(&self) -> &str {
		&self.title
	}

	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// Top-level ids; group children are not listed here
	pub fn order(&self) -> &[EntryId] {
		&self.order
	}

	/// Every id in display order, children following their group
	pub fn flat_order(&self) -> &[EntryId] {
		&self.flat_order
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.entries.contains_key(id)
	}

	pub fn get(&self, id: &str) -> Option<&RundownEntry> {
		self.entries.get(id)
	}

	pub fn get_event(&self, id: &str) -> Option<&EventEntry> {
		self.get(id).and_then(RundownEntry::as_event)
	}

	pub fn children(&self, group_id: &str) -> Option<&[EntryId]> {
		self.get(group_id).and_then(RundownEntry::as_group).map(|g| g.entries.as_slice())
	}

	pub fn flat_index(&self, id: &str) -> Option<usize> {
		self.flat_order.iter().position(|e| e == id)
	}

	/// Entries in flat (display) order
	pub fn iter(&self) -> impl Iterator<Item = &RundownEntry> {
		self.flat_order.iter().filter_map(|id| self.entries.get(id))
	}

	pub(crate) fn set_title(&mut self, title: String) {
		self.title = title;
	}

	pub(crate) fn bump_revision(&mut self) {
		self.revision += 1;
	}

	pub(crate) fn set_revision(&mut self, revision: u64) {
		self.revision = revision;
	}

	pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<EntryId, RundownEntry> {
		&mut self.entries
	}

	pub(crate) fn order_mut(&mut self) -> &mut Vec<EntryId> {
		&mut self.order
	}

	pub(crate) fn clear(&mut self) {
		self.order.clear();
		self.flat_order.clear();
		self.entries.clear();
	}

	/// Recompute the flat order from `order` and each group's child list
	pub(crate) fn rebuild_flat_order(&mut self) {
		let mut flat = Vec::with_capacity(self.entries.len());
		for id in &self.order {
			self.push_subtree(id, &mut flat, 0);
		}
		self.flat_order = flat;
	}

	fn push_subtree(&self, id: &str, flat: &mut Vec<EntryId>, depth: usize) {
		flat.push(id.to_owned());
		// a cycle would otherwise recurse forever; check_invariants reports it
		if depth > self.entries.len() {
			return;
		}
		if let Some(children) = self.children(id) {
			for child in children {
				self.push_subtree(child, flat, depth + 1);
			}
		}
	}

	/// Verify every structural invariant of the rundown
	pub fn check_invariants(&self) -> Result<()> {
		let mut seen = HashSet::with_capacity(self.flat_order.len());
		for id in &self.flat_order {
			if !seen.insert(id.as_str()) {
				return Err(RundownError::violation(format!("`{id}` appears twice in the flat order")));
			}
			if !self.entries.contains_key(id) {
				return Err(RundownError::violation(format!("`{id}` is ordered but has no entry")));
			}
		}
		if seen.len() != self.entries.len() {
			let missing = self.entries.keys().find(|id| !seen.contains(id.as_str())).cloned().unwrap_or_default();
			return Err(RundownError::violation(format!("`{missing}` has an entry but is not ordered")));
		}

		let top_level: HashSet<&str> = self.order.iter().map(String::as_str).collect();
		if top_level.len() != self.order.len() {
			return Err(RundownError::violation("top-level order holds a duplicate id"));
		}

		for (id, entry) in &self.entries {
			match entry.parent() {
				None if !top_level.contains(id.as_str()) => {
					return Err(RundownError::violation(format!("`{id}` has no parent but is not top-level")));
				}
				None => {}
				Some(parent) => {
					if top_level.contains(id.as_str()) {
						return Err(RundownError::violation(format!("`{id}` is top-level but names parent `{parent}`")));
					}
					let Some(siblings) = self.children(parent) else {
						return Err(RundownError::violation(format!("`{id}` names `{parent}` which is not a group")));
					};
					if siblings.iter().filter(|s| *s == id).count() != 1 {
						return Err(RundownError::violation(format!("group `{parent}` does not list `{id}` exactly once")));
					}
				}
			}

			if let Some(group) = entry.as_group() {
				let mut children = HashSet::with_capacity(group.entries.len());
				for child in &group.entries {
					if !children.insert(child.as_str()) {
						return Err(RundownError::violation(format!("group `{id}` lists `{child}` twice")));
					}
					match self.entries.get(child) {
						Some(c) if c.parent() == Some(id.as_str()) => {}
						_ => return Err(RundownError::violation(format!("group `{id}` lists `{child}` which does not point back"))),
					}
				}

				let Some(at) = self.flat_index(id) else {
					return Err(RundownError::violation(format!("group `{id}` is not in the flat order")));
				};
				let mut cursor = at + 1;
				for child in &group.entries {
					if self.flat_order.get(cursor) != Some(child) {
						return Err(RundownError::violation(format!("children of `{id}` are not contiguous in the flat order")));
					}
					cursor += 1 + self.descendant_count(child);
				}
			}
		}
		Ok(())
	}

	/// Number of entries owned (transitively) by `id`
	pub fn descendant_count(&self, id: &str) -> usize {
		self.children(id).map_or(0, |children| children.iter().map(|c| 1 + self.descendant_count(c)).sum())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{EventEntry, GroupEntry};

	fn entry_map(entries: Vec<RundownEntry>) -> BTreeMap<EntryId, RundownEntry> {
		entries.into_iter().map(|e| (e.id().to_owned(), e)).collect()
	}

	fn grouped() -> (Vec<EntryId>, BTreeMap<EntryId, RundownEntry>) {
		let mut group = GroupEntry::new("g");
		group.entries = vec!["b".into(), "c".into()];
		let mut b = EventEntry::new("b", 0, 10);
		b.parent = Some("g".into());
		let mut c = EventEntry::new("c", 10, 20);
		c.parent = Some("g".into());

		let entries = entry_map(vec![EventEntry::new("a", 0, 5).into(), group.into(), b.into(), c.into(), EventEntry::new("d", 30, 40).into()]);
		(vec!["a".into(), "g".into(), "d".into()], entries)
	}

	#[test]
	fn flat_order_interleaves_group_children() {
		let (order, entries) = grouped();
		let rundown = Rundown::from_parts("show", order, entries).unwrap();

		assert_eq!(rundown.flat_order(), ["a", "g", "b", "c", "d"]);
		assert_eq!(rundown.descendant_count("g"), 2);
		assert!(rundown.check_invariants().is_ok());
	}

	#[test]
	fn orphan_entry_is_rejected() {
		let (order, mut entries) = grouped();
		entries.insert("lost".into(), EventEntry::new("lost", 0, 1).into());

		let err = Rundown::from_parts("show", order, entries).unwrap_err();
		assert!(matches!(err, RundownError::InvalidArgument(ref m) if m.contains("lost")));
	}

	#[test]
	fn dangling_parent_is_rejected() {
		let (order, mut entries) = grouped();
		if let Some(RundownEntry::Group(g)) = entries.get_mut("g") {
			g.entries.pop();
		}

		assert!(Rundown::from_parts("show", order, entries).is_err());
	}

	#[test]
	fn deserialization_validates() {
		let json = r#"{
			"title": "show",
			"order": ["a", "a"],
			"entries": { "a": { "type": "event", "id": "a" } }
		}"#;
		assert!(serde_json::from_str::<Rundown>(json).is_err());

		let json = r#"{
			"title": "show",
			"order": ["a"],
			"entries": { "a": { "type": "event", "id": "a", "timeEnd": 1000 } }
		}"#;
		let rundown: Rundown = serde_json::from_str(json).unwrap();
		assert_eq!(rundown.flat_order(), ["a"]);
	}
}
