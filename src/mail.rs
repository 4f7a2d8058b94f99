use std::ffi::{OsStr, OsString};
use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use anyhow::Context as _;

use crate::error::Error;

/// Something that can hand a fully formed message to a mail transfer agent.
pub trait Mailer {
	fn deliver(&self, message: &str) -> Result<ExitStatus, Error>;
}

/// Delivers by piping the message into an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
	program: OsString,
	args: Vec<OsString>,
}

impl Command {
	pub fn new(program: impl Into<OsString>, args: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
		Self {
			program: program.into(),
			args: args.into_iter().map(Into::into).collect(),
		}
	}
}

/// `msmtp`, taking the envelope sender and recipients from the message headers.
///
/// The configuration file is checked at delivery time, so a missing template is reported first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Msmtp {
	config: Option<PathBuf>,
}

impl Msmtp {
	/// `config` of `None` means the home directory could not be determined.
	pub fn new(config: Option<PathBuf>) -> Self {
		Self { config }
	}

	fn command(&self) -> Result<Command, Error> {
		let config = self
			.config
			.as_deref()
			.ok_or_else(|| Error::MailerConfigNotFound("~/.msmtprc".into()))?;
		if !config.is_file() {
			return Err(Error::MailerConfigNotFound(config.to_owned()));
		}
		Ok(Command::new(
			"msmtp",
			[
				OsStr::new("--file"),
				config.as_os_str(),
				OsStr::new("--read-envelope-from"),
				OsStr::new("--read-recipients"),
			],
		))
	}
}

impl Mailer for Msmtp {
	fn deliver(&self, message: &str) -> Result<ExitStatus, Error> {
		self.command()?.deliver(message)
	}
}

/// `~/.msmtprc`, if the home directory is known.
pub fn default_msmtp_config() -> Option<PathBuf> {
	std::env::var_os("HOME")
		.filter(|home| !home.is_empty())
		.map(|home| PathBuf::from(home).join(".msmtprc"))
}

impl Mailer for Command {
	fn deliver(&self, message: &str) -> Result<ExitStatus, Error> {
		let program = &self.program;
		let mut process = std::process::Command::new(program)
			.args(&self.args)
			.stdin(Stdio::piped())
			.spawn()
			.with_context(|| format!("spawning {program:?}"))?;

		// dropped at the end of the block so the agent sees EOF
		let written = {
			let mut stdin = process.stdin.take().context("mail agent stdin was not captured")?;
			stdin.write_all(message.as_bytes())
		};

		let status = process
			.wait()
			.with_context(|| format!("waiting for {program:?}"))?;

		match written {
			Ok(()) => Ok(status),
			// the agent quit without reading everything; its status says why
			Err(error) if error.kind() == io::ErrorKind::BrokenPipe && !status.success() => Ok(status),
			Err(error) => Err(anyhow::Error::new(error)
				.context(format!("writing to {program:?}"))
				.into()),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::ffi::OsStr;
	use std::io::Write as _;

	use super::{Command, Mailer as _, Msmtp};
	use crate::error::Error;

	#[test]
	fn msmtp_requires_config() {
		let dir = tempfile::tempdir().unwrap();
		let config = dir.path().join(".msmtprc");
		let error = Msmtp::new(Some(config.clone())).deliver("x").unwrap_err();
		assert!(matches!(error, Error::MailerConfigNotFound(ref path) if *path == config), "{error:?}");
	}

	#[test]
	fn msmtp_reads_envelope_from_headers() {
		let mut config = tempfile::NamedTempFile::new().unwrap();
		writeln!(config, "account default").unwrap();
		let command = Msmtp::new(Some(config.path().to_owned())).command().unwrap();
		assert_eq!(command.program, "msmtp");
		assert_eq!(
			command.args,
			[
				OsStr::new("--file"),
				config.path().as_os_str(),
				OsStr::new("--read-envelope-from"),
				OsStr::new("--read-recipients"),
			]
		);
	}

	#[test]
	fn msmtp_without_home() {
		let error = Msmtp::new(None).deliver("x").unwrap_err();
		assert!(matches!(error, Error::MailerConfigNotFound(_)), "{error:?}");
	}

	#[test]
	fn pipes_message_to_program() {
		let dir = tempfile::tempdir().unwrap();
		let out = dir.path().join("message");
		let command = Command::new("sh", ["-c".into(), format!("cat > '{}'", out.display())]);

		let status = command.deliver("Subject: hi\n\nline1\nline2\n").unwrap();

		assert!(status.success());
		assert_eq!(std::fs::read_to_string(&out).unwrap(), "Subject: hi\n\nline1\nline2\n");
	}

	#[test]
	fn relays_exit_status() {
		let command = Command::new("sh", ["-c", "cat > /dev/null; exit 7"]);
		let status = command.deliver("x").unwrap();
		assert_eq!(status.code(), Some(7));
	}

	#[test]
	fn status_survives_agent_that_never_reads() {
		// larger than any pipe buffer, so the write hits a closed pipe
		let message = "x".repeat(1 << 20);
		let command = Command::new("sh", ["-c", "exit 78"]);
		let status = command.deliver(&message).unwrap();
		assert_eq!(status.code(), Some(78));
	}

	#[test]
	fn spawn_failure_is_an_error() {
		let command = Command::new("/nonexistent/notify-mail-agent", Vec::<String>::new());
		let error = command.deliver("x").unwrap_err();
		assert!(matches!(error, Error::Other(_)), "{error:?}");
	}
}
