//! Playback side of the show: countdown accounting, the playback state machine, roll
//! selection, lifecycle dispatch to integrations, and the engine task that serializes every
//! rundown edit and playback command onto one loop.

mod actor;
mod clock;
mod config;
mod context;
mod error;
mod integration;
mod roll;
mod timer;

pub use actor::ShowHandle;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ShowConfig;
pub use context::{LoadTarget, ShowContext};
pub use error::{IntegrationError, PlaybackError, Result};
pub use integration::{resolve_placeholders, ChannelSink, IntegrationRegistry, IntegrationSink, PlaceholderValues, TracingSink, Trigger, TriggerConfig, TriggerMessage};
pub use roll::{roll_select, RollSelection, RollTimers};
pub use timer::{follow_up, time_between, transition, Countdown, CycleQueue, FollowUp, PlaybackAction, PlaybackTimer, ZeroCrossing, MAX_STEPS};
