mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Digest, LlmProviderConfig, MailerConfig, Postgres, Providers, Rerank, Search, Security,
	Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.embedding_dim == 0 {
		return Err(Error::Validation {
			message: "storage.embedding_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_page_size == 0 {
		return Err(Error::Validation {
			message: "search.default_page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_page_size < cfg.search.default_page_size {
		return Err(Error::Validation {
			message: "search.max_page_size must be at least search.default_page_size.".to_string(),
		});
	}
	if !cfg.search.match_threshold.is_finite() {
		return Err(Error::Validation {
			message: "search.match_threshold must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.search.match_threshold) {
		return Err(Error::Validation {
			message: "search.match_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.search.match_count <= cfg.search.default_page_size {
		return Err(Error::Validation {
			message: "search.match_count must be greater than search.default_page_size."
				.to_string(),
		});
	}
	if cfg.search.match_count < cfg.search.max_page_size {
		return Err(Error::Validation {
			message: "search.match_count must be at least search.max_page_size.".to_string(),
		});
	}
	if cfg.search.filter_cache_ttl_secs == 0 {
		return Err(Error::Validation {
			message: "search.filter_cache_ttl_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.rerank.max_batch == 0 {
		return Err(Error::Validation {
			message: "rerank.max_batch must be greater than zero.".to_string(),
		});
	}

	if let Some(limit) = cfg.rerank.usage_limit
		&& limit <= 0
	{
		return Err(Error::Validation {
			message: "rerank.usage_limit must be greater than zero when set.".to_string(),
		});
	}

	if cfg.digest.jobs_per_digest == 0 {
		return Err(Error::Validation {
			message: "digest.jobs_per_digest must be greater than zero.".to_string(),
		});
	}
	if cfg.digest.concurrency == 0 {
		return Err(Error::Validation {
			message: "digest.concurrency must be greater than zero.".to_string(),
		});
	}
	if cfg.digest.interval_secs == 0 {
		return Err(Error::Validation {
			message: "digest.interval_secs must be greater than zero.".to_string(),
		});
	}

	let temperature = cfg.providers.llm_rerank.temperature;

	if !temperature.is_finite() || temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.llm_rerank.temperature must be a finite number, zero or greater."
				.to_string(),
		});
	}

	for (label, key) in [
		("llm_rerank", &cfg.providers.llm_rerank.api_key),
		("mailer", &cfg.providers.mailer.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	if cfg.providers.mailer.from.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.mailer.from must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.security.api_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.api_auth_token = None;
	}
	if cfg.digest.subject.trim().is_empty() {
		cfg.digest.subject = Digest::default().subject;
	}
}
