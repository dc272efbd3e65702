use playback::{roll_select, RollTimers};
use rundown::{EventEntry, DAY_MS};

/// Eight back-to-back events; 5 and 7 are public
fn schedule() -> Vec<EventEntry> {
	[(1, 5, 10), (2, 10, 20), (3, 20, 30), (4, 30, 40), (5, 40, 50), (6, 50, 60), (7, 60, 70), (8, 70, 80)]
		.into_iter()
		.map(|(id, start, end)| {
			let event = EventEntry::new(id.to_string(), start, end);
			if id == 5 || id == 7 {
				event.public()
			} else {
				event
			}
		})
		.collect()
}

#[test]
fn before_the_first_event() {
	let selection = roll_select(&schedule(), 0);

	assert_eq!(selection.now_id, None);
	assert_eq!(selection.timers, None);
	assert_eq!(selection.next_id.as_deref(), Some("1"));
	assert_eq!(selection.next_public_index, Some(4));
	assert_eq!(selection.time_to_next, Some(5));
}

#[test]
fn inside_the_first_event() {
	let selection = roll_select(&schedule(), 5);

	assert_eq!(selection.now_id.as_deref(), Some("1"));
	assert_eq!(selection.next_id.as_deref(), Some("2"));
	assert_eq!(
		selection.timers,
		Some(RollTimers {
			started_at: 5,
			finish_at: 10,
			duration: 5,
			current: 5,
		})
	);
}

#[test]
fn public_event_is_on_air() {
	let selection = roll_select(&schedule(), 49);

	assert_eq!(selection.now_id.as_deref(), Some("5"));
	assert_eq!(selection.now_public_index, Some(4));
	assert_eq!(selection.next_id.as_deref(), Some("6"));
	assert_eq!(selection.next_public_index, Some(6));
	assert_eq!(selection.timers.map(|t| t.current), Some(1));
}

#[test]
fn after_the_last_event_waits_for_tomorrow() {
	let selection = roll_select(&schedule(), 100);

	assert_eq!(selection.now_index, None);
	assert_eq!(selection.next_id.as_deref(), Some("1"));
	assert_eq!(selection.time_to_next, Some(DAY_MS - 100 + 5));
}

#[test]
fn selection_is_recomputed_not_remembered() {
	let events = schedule();
	let early = roll_select(&events, 12);
	let _ = roll_select(&events, 75);

	assert_eq!(roll_select(&events, 12), early);
}
