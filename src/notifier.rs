use std::path::Path;

use crate::error::Error;
use crate::mail::Mailer;
use crate::request::NotificationRequest;
use crate::template::Template;

/// Loads the template at `template_path` and substitutes `request` into it.
pub fn render(template_path: &Path, request: &NotificationRequest) -> Result<String, Error> {
	Ok(Template::load(template_path)?.render(request))
}

/// Renders the message and hands it to `mailer`.
///
/// Nothing is delivered unless the template loads. A non-zero exit from the agent comes back as [`Error::DeliveryFailure`].
pub fn send_notification(
	template_path: &Path,
	request: &NotificationRequest,
	mailer: &dyn Mailer,
) -> Result<(), Error> {
	let message = render(template_path, request)?;
	let status = mailer.deliver(&message)?;
	if !status.success() {
		return Err(Error::DeliveryFailure(status));
	}
	Ok(())
}
