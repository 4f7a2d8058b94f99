use std::path::PathBuf;
use std::process::ExitStatus;

/// Exit code for invocations that are missing a required argument.
pub const USAGE_EXIT_CODE: i32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("missing required argument `{0}`")]
	MissingArgument(&'static str),
	#[error("template not found at {0:?}")]
	TemplateNotFound(PathBuf),
	#[error("template {path:?} is missing placeholders: {}", .missing.join(", "))]
	InvalidTemplate {
		path: PathBuf,
		missing: Vec<&'static str>,
	},
	#[error("invalid configuration in {path:?}: {message}")]
	Config { path: PathBuf, message: String },
	#[error("mail agent configuration not found at {0:?}")]
	MailerConfigNotFound(PathBuf),
	#[error("mail agent exited with {0}")]
	DeliveryFailure(ExitStatus),
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl Error {
	/// The process exit code this error maps to.
	///
	/// A failed delivery relays the agent's own code; an agent killed by a signal has none, so it maps to 1.
	pub fn exit_code(&self) -> i32 {
		match self {
			Self::MissingArgument(_) => USAGE_EXIT_CODE,
			Self::DeliveryFailure(status) => status.code().unwrap_or(1),
			_ => 1,
		}
	}
}
