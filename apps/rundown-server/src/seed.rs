use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use playback::TriggerConfig;
use rundown::{Rundown, RundownStore};

/// Store seeded from `path`, or an empty one
pub fn load_store(path: Option<&Path>) -> Result<RundownStore> {
	let Some(path) = path else {
		info!("No rundown file configured, starting empty");
		return Ok(RundownStore::default());
	};

	let raw = fs::read_to_string(path).with_context(|| format!("reading rundown file {}", path.display()))?;
	let rundown: Rundown = serde_json::from_str(&raw).with_context(|| format!("parsing rundown file {}", path.display()))?;
	info!(path = %path.display(), title = rundown.title(), entries = rundown.len(), "Rundown loaded");

	Ok(RundownStore::new(rundown))
}

pub fn load_triggers(path: Option<&Path>) -> Result<Vec<TriggerConfig>> {
	let Some(path) = path else {
		return Ok(Vec::new());
	};

	let raw = fs::read_to_string(path).with_context(|| format!("reading integrations file {}", path.display()))?;
	let triggers: Vec<TriggerConfig> = serde_json::from_str(&raw).with_context(|| format!("parsing integrations file {}", path.display()))?;
	info!(path = %path.display(), count = triggers.len(), "Integration triggers loaded");

	Ok(triggers)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn file(contents: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		file
	}

	#[test]
	fn missing_paths_mean_empty() {
		assert!(load_store(None).unwrap().snapshot().is_empty());
		assert!(load_triggers(None).unwrap().is_empty());
	}

	#[test]
	fn loads_a_valid_rundown() {
		let seed = file(
			r#"{
				"title": "Morning show",
				"order": ["intro", "news"],
				"entries": {
					"intro": { "type": "event", "id": "intro", "timeStart": 0, "timeEnd": 60000, "duration": 60000 },
					"news": { "type": "event", "id": "news", "timeStart": 60000, "timeEnd": 120000, "duration": 60000, "skip": true }
				}
			}"#,
		);
		let store = load_store(Some(seed.path())).unwrap();

		assert_eq!(store.snapshot().title(), "Morning show");
		assert_eq!(store.snapshot().flat_order(), ["intro", "news"]);
		assert_eq!(store.playable().len(), 1);
	}

	#[test]
	fn rejects_a_broken_rundown() {
		let seed = file(r#"{ "order": ["ghost"], "entries": {} }"#);
		assert!(load_store(Some(seed.path())).is_err());
	}

	#[test]
	fn loads_triggers() {
		let triggers = file(r#"[{ "id": "go", "cycle": "onStart", "message": "/go $title" }]"#);
		let loaded = load_triggers(Some(triggers.path())).unwrap();

		assert_eq!(loaded.len(), 1);
		assert_eq!(loaded[0].cycle, "onStart");
		assert!(loaded[0].enabled);
	}
}
