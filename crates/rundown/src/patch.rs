use serde::{Deserialize, Serialize};

use crate::error::{Result, RundownError};
use crate::timing::TimingChange;
use crate::{CustomFields, EndAction, EntryId, EntryKind, RundownEntry, TimeMs, TimeStrategy, TimerType};

/// Partial update addressed to a single entry; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntryPatch {
	pub id: EntryId,
	pub cue: Option<String>,
	pub title: Option<String>,
	pub presenter: Option<String>,
	pub subtitle: Option<String>,
	pub note: Option<String>,
	pub colour: Option<String>,
	pub time_start: Option<TimeMs>,
	pub time_end: Option<TimeMs>,
	pub duration: Option<TimeMs>,
	pub time_strategy: Option<TimeStrategy>,
	pub link_start: Option<bool>,
	pub timer_type: Option<TimerType>,
	pub count_to_end: Option<bool>,
	pub end_action: Option<EndAction>,
	pub is_public: Option<bool>,
	pub skip: Option<bool>,
	pub flag: Option<bool>,
	pub time_warning: Option<TimeMs>,
	pub time_danger: Option<TimeMs>,
	/// Merged into the existing fields; an empty value removes the key
	pub custom: Option<CustomFields>,
}

impl EntryPatch {
	pub fn new(id: impl Into<EntryId>) -> Self {
		Self { id: id.into(), ..Self::default() }
	}

	/// Whether applying this patch invalidates derived schedule state
	pub fn touches_timing(&self) -> bool {
		self.time_start.is_some() || self.time_end.is_some() || self.duration.is_some() || self.link_start.is_some()
	}

	fn present_fields(&self) -> Vec<&'static str> {
		let fields = [
			("cue", self.cue.is_some()),
			("title", self.title.is_some()),
			("presenter", self.presenter.is_some()),
			("subtitle", self.subtitle.is_some()),
			("note", self.note.is_some()),
			("colour", self.colour.is_some()),
			("timeStart", self.time_start.is_some()),
			("timeEnd", self.time_end.is_some()),
			("duration", self.duration.is_some()),
			("timeStrategy", self.time_strategy.is_some()),
			("linkStart", self.link_start.is_some()),
			("timerType", self.timer_type.is_some()),
			("countToEnd", self.count_to_end.is_some()),
			("endAction", self.end_action.is_some()),
			("isPublic", self.is_public.is_some()),
			("skip", self.skip.is_some()),
			("flag", self.flag.is_some()),
			("timeWarning", self.time_warning.is_some()),
			("timeDanger", self.time_danger.is_some()),
			("custom", self.custom.is_some()),
		];
		fields.into_iter().filter(|(_, present)| *present).map(|(name, _)| name).collect()
	}

	fn allowed_fields(kind: EntryKind) -> &'static [&'static str] {
		match kind {
			EntryKind::Event => &[
				"cue",
				"title",
				"presenter",
				"subtitle",
				"note",
				"colour",
				"timeStart",
				"timeEnd",
				"duration",
				"timeStrategy",
				"linkStart",
				"timerType",
				"countToEnd",
				"endAction",
				"isPublic",
				"skip",
				"flag",
				"timeWarning",
				"timeDanger",
				"custom",
			],
			EntryKind::Group => &["title", "note", "colour", "custom"],
			EntryKind::Milestone => &["cue", "title", "note", "colour", "custom"],
			EntryKind::Delay => &["duration"],
		}
	}

	fn timing(&self) -> TimingChange {
		TimingChange {
			time_start: self.time_start,
			time_end: self.time_end,
			duration: self.duration,
			time_strategy: self.time_strategy,
		}
	}

	/// Check that every field present applies to `kind` and holds a sane value
	pub fn validate_for(&self, kind: EntryKind) -> Result<()> {
		let allowed = Self::allowed_fields(kind);
		if let Some(field) = self.present_fields().into_iter().find(|f| !allowed.contains(f)) {
			return Err(RundownError::invalid(format!("field `{field}` does not apply to a {kind}")));
		}

		match kind {
			EntryKind::Event => {
				self.timing().validate()?;
				for (field, value) in [("timeWarning", self.time_warning), ("timeDanger", self.time_danger)] {
					if matches!(value, Some(v) if v < 0) {
						return Err(RundownError::invalid(format!("{field} cannot be negative")));
					}
				}
			}
			EntryKind::Delay => {
				if matches!(self.duration, Some(d) if d.abs() >= crate::DAY_MS) {
					return Err(RundownError::invalid("delay must be shorter than a day"));
				}
			}
			EntryKind::Group | EntryKind::Milestone => {}
		}
		Ok(())
	}

	/// Validate, then write every present field into `entry`
	pub(crate) fn apply_to(&self, entry: &mut RundownEntry) -> Result<()> {
		self.validate_for(entry.kind())?;

		match entry {
			RundownEntry::Event(event) => {
				set(&mut event.cue, &self.cue);
				set(&mut event.title, &self.title);
				set(&mut event.presenter, &self.presenter);
				set(&mut event.subtitle, &self.subtitle);
				set(&mut event.note, &self.note);
				set(&mut event.colour, &self.colour);
				set(&mut event.link_start, &self.link_start);
				set(&mut event.timer_type, &self.timer_type);
				set(&mut event.count_to_end, &self.count_to_end);
				set(&mut event.end_action, &self.end_action);
				set(&mut event.is_public, &self.is_public);
				set(&mut event.skip, &self.skip);
				set(&mut event.flag, &self.flag);
				set(&mut event.time_warning, &self.time_warning);
				set(&mut event.time_danger, &self.time_danger);
				merge_custom(&mut event.custom, &self.custom);
				self.timing().apply(event);
			}
			RundownEntry::Group(group) => {
				set(&mut group.title, &self.title);
				set(&mut group.note, &self.note);
				set(&mut group.colour, &self.colour);
				merge_custom(&mut group.custom, &self.custom);
			}
			RundownEntry::Milestone(milestone) => {
				set(&mut milestone.cue, &self.cue);
				set(&mut milestone.title, &self.title);
				set(&mut milestone.note, &self.note);
				set(&mut milestone.colour, &self.colour);
				merge_custom(&mut milestone.custom, &self.custom);
			}
			RundownEntry::Delay(delay) => {
				set(&mut delay.duration, &self.duration);
			}
		}
		Ok(())
	}
}

fn set<T: Clone>(target: &mut T, value: &Option<T>) {
	if let Some(v) = value {
		*target = v.clone();
	}
}

fn merge_custom(target: &mut CustomFields, patch: &Option<CustomFields>) {
	let Some(patch) = patch else { return };
	for (key, value) in patch {
		if value.is_empty() {
			target.remove(key);
		} else {
			target.insert(key.clone(), value.clone());
		}
	}
}
