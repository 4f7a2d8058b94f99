#![deny(
	absolute_paths_not_starting_with_crate,
	keyword_idents,
	macro_use_extern_crate,
	meta_variable_misuse,
	missing_abi,
	missing_copy_implementations,
	non_ascii_idents,
	nonstandard_style,
	noop_method_call,
	rust_2018_idioms,
	unused_qualifications
)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use argh::FromArgs as _;

use crate::config::Config;
use crate::error::{Error, USAGE_EXIT_CODE};
use crate::request::NotificationRequest;

mod config;
mod error;
mod mail;
mod notifier;
mod request;
mod template;

const USAGE: &str = "usage: notify-mail -t TOPIC -b BODY [-h HOSTNAME] [--output mail|stdout] [--template PATH] [--config PATH]";

/// Options that consume the following argument, so a value of `-h` is not mistaken for the flag.
const VALUE_OPTIONS: &[&str] = &[
	"-t",
	"--topic",
	"-b",
	"--body",
	"--hostname",
	"--output",
	"--template",
	"--config",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
	Mail,
	Stdout,
}

impl std::str::FromStr for Output {
	type Err = &'static str;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s {
			"mail" => Self::Mail,
			"stdout" => Self::Stdout,
			_ => return Err("valid outputs are `mail` and `stdout`"),
		})
	}
}

/// Send an email notification rendered from a template.
#[derive(argh::FromArgs)]
struct Args {
	/// subject of the notification
	#[argh(option, short = 't')]
	topic: Option<String>,
	/// body of the notification, may span several lines
	#[argh(option, short = 'b')]
	body: Option<String>,
	/// label for the sending machine, also `-h` (default: the system hostname)
	#[argh(option)]
	hostname: Option<String>,
	/// where to send the message, `mail` or `stdout` (default: mail)
	#[argh(option, default = "Output::Mail")]
	output: Output,
	/// template file (default: template.txt next to the executable)
	#[argh(option)]
	template: Option<PathBuf>,
	/// configuration file (default: notify-mail.json next to the executable, if present)
	#[argh(option)]
	config: Option<PathBuf>,
}

/// Rewrites `-h VALUE` to `--hostname VALUE`; help stays available as `--help`.
fn expand_short_hostname(args: Vec<String>) -> Vec<String> {
	let mut expanded = Vec::with_capacity(args.len());
	let mut args = args.into_iter();
	while let Some(arg) = args.next() {
		if arg == "--" {
			expanded.push(arg);
			expanded.extend(args.by_ref());
			break;
		}

		let takes_value = arg == "-h" || VALUE_OPTIONS.contains(&arg.as_str());
		expanded.push(if arg == "-h" { "--hostname".to_owned() } else { arg });
		if takes_value {
			expanded.extend(args.next());
		}
	}
	expanded
}

/// Parses the command line, or returns the exit code to stop with.
fn parse_args() -> Result<Args, i32> {
	let mut raw = Vec::new();
	for arg in std::env::args_os() {
		match arg.into_string() {
			Ok(arg) => raw.push(arg),
			Err(arg) => {
				eprintln!("error: argument {arg:?} is not valid UTF-8");
				return Err(USAGE_EXIT_CODE);
			}
		}
	}

	let command = if raw.is_empty() {
		"notify-mail".to_owned()
	} else {
		raw.remove(0)
	};
	let rest = expand_short_hostname(raw);
	let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

	Args::from_args(&[command.as_str()], &rest).map_err(|early_exit| match early_exit.status {
		Ok(()) => {
			println!("{}", early_exit.output);
			0
		}
		Err(()) => {
			eprintln!("{}", early_exit.output);
			eprintln!("{USAGE}");
			USAGE_EXIT_CODE
		}
	})
}

fn run(args: Args) -> Result<(), Error> {
	let request = NotificationRequest::new(args.hostname, args.topic, args.body)?;

	let program_dir = config::program_dir()?;
	let config = Config::load(args.config.as_deref(), &program_dir)?;
	let template_path = args
		.template
		.unwrap_or_else(|| config.template_path(&program_dir));

	match args.output {
		Output::Mail => {
			let mailer = config.mailer();
			notifier::send_notification(&template_path, &request, mailer.as_ref())
		}
		Output::Stdout => {
			let message = notifier::render(&template_path, &request)?;
			let mut stdout = std::io::stdout().lock();
			stdout
				.write_all(message.as_bytes())
				.and_then(|()| stdout.flush())
				.context("writing message to stdout")?;
			Ok(())
		}
	}
}

fn main() {
	let args = match parse_args() {
		Ok(args) => args,
		Err(code) => std::process::exit(code),
	};

	if let Err(error) = run(args) {
		eprintln!("error: {error:#}");
		if matches!(error, Error::MissingArgument(_)) {
			eprintln!("{USAGE}");
		}
		std::process::exit(error.exit_code());
	}
}
