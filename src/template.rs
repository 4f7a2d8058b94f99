use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::error::Error;
use crate::request::NotificationRequest;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placeholder {
	Hostname,
	Topic,
	Body,
}

impl Placeholder {
	const ALL: [Self; 3] = [Self::Hostname, Self::Topic, Self::Body];

	fn from_name(name: &str) -> Option<Self> {
		Some(match name {
			"hostname" => Self::Hostname,
			"topic" => Self::Topic,
			"body" => Self::Body,
			_ => return None,
		})
	}

	fn token(self) -> &'static str {
		match self {
			Self::Hostname => "@hostname@",
			Self::Topic => "@topic@",
			Self::Body => "@body@",
		}
	}

	fn value(self, request: &NotificationRequest) -> &str {
		match self {
			Self::Hostname => &request.host,
			Self::Topic => &request.topic,
			Self::Body => &request.body,
		}
	}
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
	Text(&'a str),
	Placeholder(Placeholder),
}

/// Splits template text into literal runs and known `@name@` tokens.
///
/// An `@` that does not open a known token is literal text, so addresses like `ops@example.com` pass through.
struct Segments<'a> {
	rest: &'a str,
	pending: Option<Placeholder>,
}

impl<'a> Segments<'a> {
	fn new(text: &'a str) -> Self {
		Self {
			rest: text,
			pending: None,
		}
	}
}

impl<'a> Iterator for Segments<'a> {
	type Item = Segment<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		if let Some(placeholder) = self.pending.take() {
			return Some(Segment::Placeholder(placeholder));
		}
		if self.rest.is_empty() {
			return None;
		}

		let mut search_from = 0;
		while let Some(offset) = self.rest[search_from..].find('@') {
			let start = search_from + offset;
			let after = &self.rest[start + 1..];
			let token = after
				.find('@')
				.and_then(|end| Some((Placeholder::from_name(&after[..end])?, end)));

			if let Some((placeholder, end)) = token {
				let text = &self.rest[..start];
				self.rest = &after[end + 1..];
				if text.is_empty() {
					return Some(Segment::Placeholder(placeholder));
				}
				self.pending = Some(placeholder);
				return Some(Segment::Text(text));
			}

			search_from = start + 1;
		}

		let text = std::mem::take(&mut self.rest);
		Some(Segment::Text(text))
	}
}

/// An operator-edited message template carrying `@hostname@`, `@topic@` and `@body@`.
#[derive(Debug)]
pub struct Template {
	text: String,
}

impl Template {
	pub fn load(path: &Path) -> Result<Self, Error> {
		if !path.is_file() {
			return Err(Error::TemplateNotFound(path.to_owned()));
		}
		let text = std::fs::read_to_string(path).with_context(|| format!("reading template {path:?}"))?;
		Self::parse(path.to_owned(), text)
	}

	fn parse(path: PathBuf, text: String) -> Result<Self, Error> {
		let mut seen = [false; Placeholder::ALL.len()];
		for segment in Segments::new(&text) {
			if let Segment::Placeholder(placeholder) = segment {
				seen[placeholder as usize] = true;
			}
		}

		let missing: Vec<_> = Placeholder::ALL
			.into_iter()
			.filter(|placeholder| !seen[*placeholder as usize])
			.map(Placeholder::token)
			.collect();
		if !missing.is_empty() {
			return Err(Error::InvalidTemplate { path, missing });
		}

		Ok(Self { text })
	}

	/// Substitutes every placeholder in one pass.
	///
	/// Values are copied into the output and never rescanned, so a body containing `@topic@` stays as written.
	pub fn render(&self, request: &NotificationRequest) -> String {
		let mut message = String::with_capacity(
			self.text.len() + request.host.len() + request.topic.len() + request.body.len(),
		);
		for segment in Segments::new(&self.text) {
			match segment {
				Segment::Text(text) => message.push_str(text),
				Segment::Placeholder(placeholder) => message.push_str(placeholder.value(request)),
			}
		}
		message
	}
}
