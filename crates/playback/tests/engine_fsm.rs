use std::time::Duration;
use tokio::time::timeout;
use tokio_test::{assert_err, assert_ok};

use playback::{IntegrationRegistry, ManualClock, PlaybackError, ShowConfig, ShowContext, ShowHandle};
use rundown::{EventEntry, ReorderPosition, RundownStore};
use ws_events::{EventType, PlaybackState};

const WAIT: Duration = Duration::from_secs(2);

fn spawn(clock: &ManualClock, store: RundownStore, config: ShowConfig) -> ShowHandle {
	let context = ShowContext::new(store, IntegrationRegistry::new(), clock.clone(), &config);
	ShowHandle::spawn(context, config).unwrap()
}

fn seeded() -> RundownStore {
	let mut store = RundownStore::default();
	store
		.apply(|tx| {
			tx.add(EventEntry::new("a", 0, 10_000), None, None)?;
			tx.add(EventEntry::new("b", 10_000, 20_000), Some("a"), None)
		})
		.unwrap();
	store
}

#[tokio::test]
async fn commands_show_up_in_watch() {
	let clock = ManualClock::new(0);
	let handle = spawn(&clock, RundownStore::default(), ShowConfig::new().with_tick_interval(50));

	assert_ok!(handle.add(EventEntry::new("a", 0, 10_000), None, None).await);
	assert_ok!(handle.load_id("a").await);
	assert_ok!(handle.start().await);

	let state = handle.current_state();
	assert_eq!(state.rundown.revision(), 1);
	assert_eq!(state.playable.len(), 1);
	assert_eq!(state.timer.playback(), PlaybackState::Play);
	assert_eq!(state.timer.selected_event_id(), Some("a"));

	handle.shutdown().await;
}

#[tokio::test]
async fn ticks_drive_the_countdown() {
	let clock = ManualClock::new(0);
	let handle = spawn(&clock, seeded(), ShowConfig::new().with_tick_interval(20));
	let mut state = handle.watch_state();

	assert_ok!(handle.load_id("a").await);
	assert_ok!(handle.start().await);
	clock.set(4_000);

	// the borrow guard must not outlive the statement or the engine cannot publish
	assert!(matches!(timeout(WAIT, state.wait_for(|s| s.timer.timer.current == Some(6_000))).await, Ok(Ok(_))));

	handle.shutdown().await;
}

#[tokio::test]
async fn refused_commands_keep_the_engine_alive() {
	let clock = ManualClock::new(0);
	let handle = spawn(&clock, seeded(), ShowConfig::new());

	assert_eq!(handle.start().await, Err(PlaybackError::NothingLoaded));
	assert_err!(handle.reorder("a", "a", ReorderPosition::Insert).await);
	assert_eq!(handle.entry("nope").await, Err(PlaybackError::NotFound("nope".into())));

	let metadata = assert_ok!(handle.metadata().await);
	assert_eq!(metadata.num_events, 2);
	assert_eq!(metadata.total_duration, 20_000);

	handle.shutdown().await;
}

#[tokio::test]
async fn subscribers_receive_commits() {
	let clock = ManualClock::new(0);
	let handle = spawn(&clock, seeded(), ShowConfig::new());
	let mut events = handle.subscribe_events();

	assert_ok!(handle.remove("b").await);

	let event = assert_ok!(timeout(WAIT, events.recv()).await).unwrap();
	assert_eq!(event.event_type(), EventType::RundownChanged);

	handle.shutdown().await;
}

#[tokio::test]
async fn starts_in_roll_when_configured() {
	let clock = ManualClock::new(5_000);
	let handle = spawn(&clock, seeded(), ShowConfig::new().with_roll(true));
	let mut state = handle.watch_state();

	assert!(matches!(timeout(WAIT, state.wait_for(|s| s.timer.playback() == PlaybackState::Roll)).await, Ok(Ok(_))));
	assert_eq!(handle.current_state().timer.selected_event_id(), Some("a"));

	handle.shutdown().await;
}

#[tokio::test]
async fn shutdown_joins_the_task() {
	let clock = ManualClock::new(0);
	let handle = spawn(&clock, seeded(), ShowConfig::new());
	let other = handle.clone();
	assert!(handle.is_running());

	handle.shutdown().await;
	other.shutdown().await;

	assert!(!other.is_running());
	assert!(matches!(other.start().await, Err(PlaybackError::Internal(_))));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
	let clock = ManualClock::new(0);
	let config = ShowConfig::new().with_tick_interval(0);
	let context = ShowContext::new(seeded(), IntegrationRegistry::new(), clock, &config);

	assert!(matches!(ShowHandle::spawn(context, config), Err(PlaybackError::InvalidArgument(_))));
}
