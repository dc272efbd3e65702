//! Picks what should be on air from the time of day alone.

use serde::{Deserialize, Serialize};

use rundown::{normalise_end, EntryId, EventEntry, TimeMs, DAY_MS};

/// Countdown values for the event roll has on air
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollTimers {
	pub started_at: TimeMs,
	pub finish_at: TimeMs,
	pub duration: TimeMs,
	pub current: TimeMs,
}

/// Indices point into the playable events the selection was made from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollSelection {
	pub now_index: Option<usize>,
	pub now_id: Option<EntryId>,
	pub now_public_index: Option<usize>,
	pub next_index: Option<usize>,
	pub next_id: Option<EntryId>,
	pub next_public_index: Option<usize>,
	pub timers: Option<RollTimers>,
	pub time_to_next: Option<TimeMs>,
}

/// Clock value shifted into the window of `event`, for events running past midnight
fn clock_within(event: &EventEntry, clock: TimeMs) -> Option<TimeMs> {
	let end = event.normal_end();
	if event.time_start <= clock && clock < end {
		Some(clock)
	} else if end > DAY_MS && clock + DAY_MS < end {
		Some(clock + DAY_MS)
	} else {
		None
	}
}

fn wait_until(start: TimeMs, clock: TimeMs, wraps: bool) -> TimeMs {
	if start >= clock {
		start - clock
	} else if wraps {
		start + DAY_MS - clock
	} else {
		0
	}
}

/// Select the running and upcoming events for `clock` (ms since local midnight)
pub fn roll_select(events: &[EventEntry], clock: TimeMs) -> RollSelection {
	if events.is_empty() {
		return RollSelection::default();
	}

	// stable: equal starts keep their rundown order
	let mut order: Vec<usize> = (0..events.len()).collect();
	order.sort_by_key(|&i| events[i].time_start);
	let public: Vec<usize> = order.iter().copied().filter(|&i| events[i].is_public).collect();

	let last_end = events.iter().map(|e| normalise_end(e.time_start, e.time_end)).max().unwrap_or_default();
	if clock >= last_end {
		let first = order[0];
		return RollSelection {
			next_index: Some(first),
			next_id: Some(events[first].id.clone()),
			next_public_index: public.first().copied(),
			time_to_next: Some(events[first].time_start + DAY_MS - clock),
			..RollSelection::default()
		};
	}

	let running = order.iter().position(|&i| clock_within(&events[i], clock).is_some());

	let now_public_index = match running.map(|at| order[at]) {
		Some(i) if events[i].is_public => Some(i),
		_ => public
			.iter()
			.copied()
			.filter(|&i| clock_within(&events[i], clock).is_some())
			.max_by_key(|&i| events[i].normal_end()),
	};

	let upcoming = order.iter().copied().find(|&i| events[i].time_start > clock);
	let next_index = match running {
		// running since yesterday: today's schedule is still ahead
		Some(at) if clock_within(&events[order[at]], clock) != Some(clock) => upcoming,
		Some(at) => order
			.get(at + 1)
			.copied()
			.or_else(|| (events[order[at]].normal_end() > DAY_MS).then_some(order[0]).filter(|&first| first != order[at])),
		None => upcoming,
	};
	let next_public_index = match now_public_index {
		Some(now) => public.iter().position(|&i| i == now).and_then(|at| public.get(at + 1)).copied(),
		None => public.iter().copied().find(|&i| events[i].time_start > clock),
	};

	let mut selection = RollSelection {
		now_public_index,
		next_index,
		next_id: next_index.map(|i| events[i].id.clone()),
		next_public_index,
		..RollSelection::default()
	};

	if let Some(at) = running {
		let index = order[at];
		let event = &events[index];
		let shifted = clock_within(event, clock).unwrap_or(clock);
		let end = event.normal_end();

		selection.now_index = Some(index);
		selection.now_id = Some(event.id.clone());
		selection.timers = Some(RollTimers {
			started_at: event.time_start,
			finish_at: event.time_end,
			duration: end - event.time_start,
			current: end - shifted,
		});
		selection.time_to_next = next_index.map(|i| wait_until(events[i].time_start, clock, end > DAY_MS && shifted == clock));
	} else {
		selection.time_to_next = next_index.map(|i| wait_until(events[i].time_start, clock, false));
	}

	selection
}

#[cfg(test)]
mod tests {
	use super::*;

	fn event(id: &str, start: TimeMs, end: TimeMs) -> EventEntry {
		EventEntry::new(id, start, end)
	}

	#[test]
	fn empty_list_selects_nothing() {
		assert_eq!(roll_select(&[], 1000), RollSelection::default());
	}

	#[test]
	fn event_across_midnight_runs_after_midnight() {
		let events = [event("late", DAY_MS - 3_600_000, 1_800_000), event("morning", 3_600_000, 7_200_000)];

		let selection = roll_select(&events, 600_000);
		assert_eq!(selection.now_id.as_deref(), Some("late"));
		assert_eq!(selection.timers.map(|t| t.current), Some(1_200_000));
		assert_eq!(selection.next_id.as_deref(), Some("morning"));
		assert_eq!(selection.time_to_next, Some(3_000_000));

		let selection = roll_select(&events, DAY_MS - 600_000);
		assert_eq!(selection.now_id.as_deref(), Some("late"));
		assert_eq!(selection.timers.map(|t| t.current), Some(2_400_000));
		// the morning event is tomorrow
		assert_eq!(selection.time_to_next, Some(600_000 + 3_600_000));
	}

	#[test]
	fn equal_starts_keep_rundown_order() {
		let events = [event("b", 100, 300), event("a", 100, 200)];
		let selection = roll_select(&events, 150);

		assert_eq!(selection.now_id.as_deref(), Some("b"));
		assert_eq!(selection.next_id.as_deref(), Some("a"));
		assert_eq!(selection.time_to_next, Some(0));
	}

	#[test]
	fn overlapping_public_event_takes_latest_end() {
		let events = [event("private", 0, 100), event("p1", 0, 50).public(), event("p2", 10, 80).public()];
		let selection = roll_select(&events, 20);

		assert_eq!(selection.now_index, Some(0));
		assert_eq!(selection.now_public_index, Some(2));
	}
}
