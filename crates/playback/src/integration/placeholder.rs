use serde::{Deserialize, Serialize};

use rundown::{EventEntry, TimeMs};
use ws_events::format_timer;

/// Values substituted into trigger messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderValues {
	pub timer: String,
	pub title: String,
	pub presenter: String,
	pub subtitle: String,
	pub next_title: String,
	pub next_presenter: String,
	pub next_subtitle: String,
}

impl PlaceholderValues {
	pub fn new(current: Option<TimeMs>, loaded: Option<&EventEntry>, next: Option<&EventEntry>) -> Self {
		Self {
			timer: current.map(format_timer).unwrap_or_default(),
			title: field(loaded, |e| e.title.as_str()),
			presenter: field(loaded, |e| e.presenter.as_str()),
			subtitle: field(loaded, |e| e.subtitle.as_str()),
			next_title: field(next, |e| e.title.as_str()),
			next_presenter: field(next, |e| e.presenter.as_str()),
			next_subtitle: field(next, |e| e.subtitle.as_str()),
		}
	}

	pub fn get(&self, token: &str) -> Option<&str> {
		let value = match token {
			"timer" => &self.timer,
			"title" => &self.title,
			"presenter" => &self.presenter,
			"subtitle" => &self.subtitle,
			"next-title" => &self.next_title,
			"next-presenter" => &self.next_presenter,
			"next-subtitle" => &self.next_subtitle,
			_ => return None,
		};
		Some(value)
	}
}

fn field(event: Option<&EventEntry>, pick: impl Fn(&EventEntry) -> &str) -> String {
	event.map(|e| pick(e).to_owned()).unwrap_or_default()
}

/// Replace every known `$token` in `template`; unknown tokens are kept as written
pub fn resolve_placeholders(template: &str, values: &PlaceholderValues) -> String {
	let mut out = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(at) = rest.find('$') {
		out.push_str(&rest[..at]);
		let after = &rest[at + 1..];
		let len = after.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-')).unwrap_or(after.len());
		// a trailing dash belongs to the surrounding text
		let token = after[..len].trim_end_matches('-');

		match values.get(token) {
			Some(value) if !token.is_empty() => out.push_str(value),
			_ => {
				out.push('$');
				out.push_str(token);
			}
		}
		rest = &after[token.len()..];
	}
	out.push_str(rest);
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn values() -> PlaceholderValues {
		let now = EventEntry::new("a", 0, 1000).titled("Keynote").presented_by("Ada");
		let next = EventEntry::new("b", 1000, 2000).titled("Panel");
		PlaceholderValues::new(Some(-65_000), Some(&now), Some(&next))
	}

	#[test]
	fn known_tokens_are_replaced() {
		let message = resolve_placeholders("/show/$title by $presenter, next $next-title at $timer", &values());
		assert_eq!(message, "/show/Keynote by Ada, next Panel at -00:01:05");
	}

	#[test]
	fn unknown_tokens_stay_verbatim() {
		assert_eq!(resolve_placeholders("$title costs $5 and $mystery-", &values()), "Keynote costs $5 and $mystery-");
		assert_eq!(resolve_placeholders("$$title$", &values()), "$Keynote$");
	}

	#[test]
	fn missing_event_gives_empty_values() {
		let values = PlaceholderValues::new(None, None, None);
		assert_eq!(resolve_placeholders("[$title|$timer]", &values), "[|]");
	}
}
