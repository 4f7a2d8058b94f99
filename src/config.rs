use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::error::Error;
use crate::mail::{self, Mailer};

/// Looked up next to the executable when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "notify-mail.json";
pub const TEMPLATE_FILE_NAME: &str = "template.txt";

#[derive(Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// Relative paths resolve against the executable's directory.
	#[serde(default)]
	pub template: Option<PathBuf>,
	#[serde(default)]
	pub mailer: MailerConfig,
}

#[derive(Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MailerConfig {
	Msmtp {
		/// Defaults to `~/.msmtprc`.
		#[serde(default)]
		config: Option<PathBuf>,
	},
	Command {
		program: PathBuf,
		#[serde(default)]
		args: Vec<String>,
	},
}

impl Default for MailerConfig {
	fn default() -> Self {
		Self::Msmtp { config: None }
	}
}

/// The directory holding the running executable.
pub fn program_dir() -> Result<PathBuf, Error> {
	let exe = std::env::current_exe().context("locating the running executable")?;
	let exe = exe.canonicalize().unwrap_or(exe);
	let dir = exe
		.parent()
		.with_context(|| format!("executable path {exe:?} has no parent"))?;
	Ok(dir.to_owned())
}

impl Config {
	/// Reads `explicit` if given, otherwise the optional config file in `program_dir`.
	pub fn load(explicit: Option<&Path>, program_dir: &Path) -> Result<Self, Error> {
		let (path, required) = match explicit {
			Some(path) => (path.to_owned(), true),
			None => (program_dir.join(CONFIG_FILE_NAME), false),
		};

		let text = match std::fs::read_to_string(&path) {
			Ok(text) => text,
			Err(error) if !required && error.kind() == std::io::ErrorKind::NotFound => {
				return Ok(Self::default());
			}
			Err(error) => {
				return Err(Error::Config {
					path,
					message: error.to_string(),
				})
			}
		};

		Self::parse(&path, &text)
	}

	fn parse(path: &Path, text: &str) -> Result<Self, Error> {
		serde_json::from_str(text).map_err(|error| Error::Config {
			path: path.to_owned(),
			message: error.to_string(),
		})
	}

	pub fn template_path(&self, program_dir: &Path) -> PathBuf {
		program_dir.join(self.template.as_deref().unwrap_or(Path::new(TEMPLATE_FILE_NAME)))
	}

	pub fn mailer(&self) -> Box<dyn Mailer> {
		match &self.mailer {
			MailerConfig::Msmtp { config } => Box::new(mail::Msmtp::new(
				config.clone().or_else(mail::default_msmtp_config),
			)),
			MailerConfig::Command { program, args } => Box::new(mail::Command::new(program, args)),
		}
	}
}
