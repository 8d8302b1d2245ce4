use reqwest::header::{InvalidHeaderName, InvalidHeaderValue};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Provider request failed: {0}")]
	Http(#[from] reqwest::Error),
	#[error("Provider header name is invalid: {0}")]
	HeaderName(#[from] InvalidHeaderName),
	#[error("Provider header value is invalid: {0}")]
	HeaderValue(#[from] InvalidHeaderValue),
	#[error("Provider config is invalid: {message}")]
	InvalidConfig { message: String },
	/// The provider answered, but not with something the caller can use.
	#[error("Provider response is invalid: {message}")]
	InvalidResponse { message: String },
}
