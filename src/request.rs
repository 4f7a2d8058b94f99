use crate::error::Error;

const FALLBACK_HOSTNAME: &str = "unknown-host";

/// A single notification, built from the command line and used for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
	pub host: String,
	pub topic: String,
	pub body: String,
}

impl NotificationRequest {
	/// Validates the required fields and resolves the host label.
	///
	/// `host` falls back to [`local_hostname`] when not given.
	pub fn new(host: Option<String>, topic: Option<String>, body: Option<String>) -> Result<Self, Error> {
		let topic = require("topic", topic)?;
		let body = require("body", body)?;
		let host = host.unwrap_or_else(local_hostname);
		Ok(Self { host, topic, body })
	}
}

fn require(name: &'static str, value: Option<String>) -> Result<String, Error> {
	match value {
		Some(value) if !value.is_empty() => Ok(value),
		_ => Err(Error::MissingArgument(name)),
	}
}

/// The kernel hostname, then `$COMPUTERNAME`, then a fixed placeholder.
pub fn local_hostname() -> String {
	match nix::unistd::gethostname() {
		Ok(name) => match name.into_string() {
			Ok(name) if !name.is_empty() => return name,
			Ok(_) => {}
			Err(name) => eprintln!("warning: hostname {name:?} is not valid UTF-8"),
		},
		Err(error) => eprintln!("warning: gethostname failed: {error}"),
	}

	std::env::var("COMPUTERNAME")
		.ok()
		.filter(|name| !name.is_empty())
		.unwrap_or_else(|| FALLBACK_HOSTNAME.to_owned())
}

#[cfg(test)]
mod tests {
	use super::NotificationRequest;
	use crate::error::Error;

	fn some(s: &str) -> Option<String> {
		Some(s.to_owned())
	}

	#[test]
	fn explicit_host_is_kept() {
		let request = NotificationRequest::new(some("srv1"), some("Alert"), some("Disk full")).unwrap();
		assert_eq!(
			request,
			NotificationRequest {
				host: "srv1".into(),
				topic: "Alert".into(),
				body: "Disk full".into(),
			}
		);
	}

	#[test]
	fn host_defaults_to_something() {
		let request = NotificationRequest::new(None, some("Alert"), some("Disk full")).unwrap();
		assert!(!request.host.is_empty());
	}

	#[test]
	fn missing_or_empty_topic() {
		for topic in [None, some("")] {
			let error = NotificationRequest::new(None, topic, some("body")).unwrap_err();
			assert!(matches!(error, Error::MissingArgument("topic")), "{error:?}");
		}
	}

	#[test]
	fn missing_or_empty_body() {
		for body in [None, some("")] {
			let error = NotificationRequest::new(None, some("topic"), body).unwrap_err();
			assert!(matches!(error, Error::MissingArgument("body")), "{error:?}");
		}
	}

	#[test]
	fn multiline_body_is_untouched() {
		let request = NotificationRequest::new(None, some("t"), some("line1\nline2\n")).unwrap();
		assert_eq!(request.body, "line1\nline2\n");
	}
}
