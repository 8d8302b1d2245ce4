use serde::Serialize;
use serde_json::Value;

use jb_config::MailerConfig;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
	pub to: String,
	pub subject: String,
	pub text: String,
}

/// Posts one message to the transactional mail API and returns the provider's message id.
pub async fn send(cfg: &MailerConfig, email: &OutgoingEmail) -> Result<String> {
	if email.to.trim().is_empty() {
		return Err(Error::InvalidConfig { message: "Recipient address is empty.".to_string() });
	}

	let client = crate::client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"from": cfg.from,
		"to": [email.to],
		"subject": email.subject,
		"text": email.text,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let id = json.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string();

	tracing::debug!(provider = %cfg.provider_id, message_id = %id, "Email accepted.");

	Ok(id)
}
