pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Unauthorized: {message}")]
	Unauthorized { message: String },
	#[error("Forbidden: {message}")]
	Forbidden { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Quota exceeded: {message}")]
	QuotaExceeded { message: String },
	#[error("Vector search error: {message}")]
	VectorSearch { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Invalid model output: {message}")]
	InvalidModelOutput { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<jb_storage::Error> for Error {
	fn from(err: jb_storage::Error) -> Self {
		match err {
			jb_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			jb_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			jb_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}

impl From<jb_providers::Error> for Error {
	fn from(err: jb_providers::Error) -> Self {
		match err {
			jb_providers::Error::InvalidResponse { message } => Self::InvalidModelOutput { message },
			other => Self::Provider { message: other.to_string() },
		}
	}
}
