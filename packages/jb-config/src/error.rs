use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures while loading the job board TOML config.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read job board config {}: {source}", path.display())]
	ReadConfig { path: PathBuf, source: io::Error },
	#[error("Job board config {} is not valid TOML: {source}", path.display())]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	#[error("Invalid job board config: {message}")]
	Validation { message: String },
}
