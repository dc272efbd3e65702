//! What the show engine tells the outside world: timer snapshots, rundown changes and
//! lifecycle transitions, in the shape websocket and integration consumers receive them.

mod show;

pub use show::{format_timer, EventSelection, EventType, PlaybackState, RundownChanged, ShowEvent, ShowSnapshot, Timecode, TimerLifecycle, TimerPhase, TimerSnapshot, TimerState};
