use anyhow::{Context, Result};
use std::str::FromStr;
use tracing_subscriber::{filter::EnvFilter, fmt::format::JsonFields, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::config::Config;

pub fn init_tracing(config: &Config) -> Result<()> {
	let filter = EnvFilter::from_str(config.rust_log.as_deref().unwrap_or("info")).context("parsing RUST_LOG")?;

	tracing_subscriber::registry()
		.with(if config.log_json {
			Box::new(
				tracing_subscriber::fmt::layer()
					.fmt_fields(JsonFields::default())
					.event_format(tracing_subscriber::fmt::format().json().flatten_event(true).with_span_list(false))
					.with_filter(filter),
			) as Box<dyn Layer<_> + Send + Sync>
		} else {
			Box::new(
				tracing_subscriber::fmt::layer()
					.event_format(tracing_subscriber::fmt::format().pretty())
					.with_filter(filter),
			)
		})
		.try_init()
		.context("installing tracing subscriber")?;
	Ok(())
}
