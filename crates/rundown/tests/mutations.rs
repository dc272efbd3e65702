use rundown::{DelayEntry, EntryPatch, EventEntry, GroupEntry, MilestoneEntry, ReorderPosition, RundownError, RundownStore, DAY_MS};

/// opening, delay, talk, break, block[panel, q&a], close
fn show() -> RundownStore {
	let mut store = RundownStore::default();
	store
		.apply(|tx| {
			tx.set_title("Conference day 1")?;
			tx.add(EventEntry::new("opening", 32_400_000, 33_000_000).titled("Opening"), None, None)?;
			tx.add(DelayEntry::new("delay", 300_000), Some("opening"), None)?;
			tx.add(EventEntry::new("talk", 33_000_000, 36_000_000).titled("Keynote"), Some("delay"), None)?;
			tx.add(MilestoneEntry::new("break").titled("Coffee"), Some("talk"), None)?;
			tx.add(GroupEntry::new("block").titled("Afternoon"), Some("break"), None)?;
			tx.add(EventEntry::new("panel", 46_800_000, 50_400_000), None, Some("block"))?;
			tx.add(EventEntry::new("qa", 50_400_000, 52_200_000), Some("panel"), Some("block"))?;
			tx.add(EventEntry::new("close", 52_200_000, 53_000_000), Some("block"), None)
		})
		.unwrap();
	store
}

#[test]
fn group_removal_takes_descendants() {
	let mut store = show();
	let before = store.snapshot().len();

	let (removed, _) = store.apply(|tx| tx.remove("block")).unwrap();

	assert_eq!(removed, 3);
	assert_eq!(store.snapshot().len(), before - 3);
	assert_eq!(store.snapshot().flat_order(), ["opening", "delay", "talk", "break", "close"]);
}

#[test]
fn reorder_round_trip_restores_order() {
	let mut store = show();
	let original = store.snapshot().order().to_vec();

	store.apply(|tx| tx.reorder("break", "opening", ReorderPosition::Before)).unwrap();
	assert_eq!(store.snapshot().order()[0], "break");

	store.apply(|tx| tx.reorder("break", "block", ReorderPosition::Before)).unwrap();
	assert_eq!(store.snapshot().order(), original.as_slice());
}

#[test]
fn delay_shifts_events_up_to_the_group() {
	let mut store = show();
	let (shifted, commit) = store.apply(|tx| tx.apply_delay("delay")).unwrap();
	let rundown = commit.rundown;

	assert_eq!(shifted, ["talk"]);
	let talk = rundown.get_event("talk").unwrap();
	assert_eq!((talk.time_start, talk.time_end, talk.revision), (33_300_000, 36_300_000, 1));

	let opening = rundown.get_event("opening").unwrap();
	assert_eq!((opening.time_start, opening.revision), (32_400_000, 0));
	let panel = rundown.get_event("panel").unwrap();
	assert_eq!((panel.time_start, panel.revision), (46_800_000, 0));

	assert!(!rundown.contains("delay"));
	assert!(rundown.contains("block"));
	assert!(commit.did_invalidate);
}

#[test]
fn delay_wraps_past_midnight() {
	let mut store = RundownStore::default();
	let (_, commit) = store
		.apply(|tx| {
			tx.add(DelayEntry::new("late", 3_600_000), None, None)?;
			tx.add(EventEntry::new("party", DAY_MS - 1_800_000, 1_800_000), Some("late"), None)?;
			tx.apply_delay("late")
		})
		.unwrap();

	let party = commit.rundown.get_event("party").unwrap();
	assert_eq!((party.time_start, party.time_end, party.duration), (1_800_000, 5_400_000, 3_600_000));
}

#[test]
fn batch_edit_with_unknown_id_changes_nothing() {
	let mut store = show();
	let before = serde_json::to_string(&*store.snapshot()).unwrap();

	let err = store
		.apply(|tx| {
			let patch = EntryPatch {
				colour: Some("#ff0000".into()),
				..EntryPatch::default()
			};
			tx.batch_edit(&["opening".into(), "ghost".into(), "talk".into()], &patch)
		})
		.unwrap_err();

	assert_eq!(err, RundownError::NotFound("ghost".into()));
	assert_eq!(serde_json::to_string(&*store.snapshot()).unwrap(), before);
}

#[test]
fn dissolve_group_keeps_children_in_place() {
	let mut store = show();
	let mut expected = store.snapshot().flat_order().to_vec();
	expected.retain(|id| id != "block");

	let (lifted, commit) = store.apply(|tx| tx.dissolve_group("block")).unwrap();

	assert_eq!(lifted, ["panel", "qa"]);
	assert_eq!(commit.rundown.flat_order(), expected.as_slice());
	assert_eq!(commit.rundown.get("panel").unwrap().parent(), None);
	assert_eq!(commit.rundown.get("qa").unwrap().parent(), None);
}

#[test]
fn cloning_a_group_is_refused() {
	let mut store = show();
	let err = store.apply(|tx| tx.clone_entry("block")).unwrap_err();
	assert!(matches!(err, RundownError::InvalidArgument(_)));
}

#[test]
fn failed_transaction_keeps_committed_revision() {
	let mut store = show();
	let revision = store.revision();

	let result = store.apply(|tx| {
		tx.edit(&EntryPatch {
			title: Some("Renamed".into()),
			..EntryPatch::new("talk")
		})?;
		tx.reorder("opening", "talk", ReorderPosition::Insert)
	});

	assert!(matches!(result, Err(RundownError::InvalidArgument(_))));
	assert_eq!(store.revision(), revision);
	assert_eq!(store.snapshot().get_event("talk").unwrap().title, "Keynote");
}

#[test]
fn skipping_an_event_hides_it_from_playback() {
	let mut store = show();
	assert_eq!(store.playable().len(), 5);

	let (outcome, commit) = store
		.apply(|tx| {
			tx.edit(&EntryPatch {
				skip: Some(true),
				..EntryPatch::new("talk")
			})
		})
		.unwrap();

	assert!(!outcome.did_invalidate);
	assert_eq!(commit.playable.len(), 4);
	assert!(commit.playable.find("talk").is_none());
}

#[test]
fn remove_all_empties_everything() {
	let mut store = show();
	store.apply(|tx| tx.remove_all()).unwrap();

	let rundown = store.snapshot();
	assert!(rundown.is_empty());
	assert!(rundown.order().is_empty());
	assert!(rundown.flat_order().is_empty());
	assert_eq!(rundown.title(), "Conference day 1");
}

#[test]
fn snapshot_survives_json_round_trip() {
	let store = show();
	let json = serde_json::to_string(&*store.snapshot()).unwrap();
	let loaded: rundown::Rundown = serde_json::from_str(&json).unwrap();

	assert_eq!(&loaded, &*store.snapshot());
}
