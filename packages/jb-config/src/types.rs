use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub rerank: Rerank,
	#[serde(default)]
	pub digest: Digest,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	/// Dimension of the pgvector columns holding user and job embeddings.
	pub embedding_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub llm_rerank: LlmProviderConfig,
	pub mailer: MailerConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct MailerConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	/// Sender address, e.g. `Jobs <digest@example.com>`.
	pub from: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_page_size: u32,
	pub max_page_size: u32,
	/// Minimum cosine similarity a row needs to be returned by the match functions.
	pub match_threshold: f32,
	/// Candidate ids fetched per similarity pass. Must cover the largest page.
	pub match_count: u32,
	pub filter_cache_ttl_secs: u64,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_page_size: 20,
			max_page_size: 50,
			match_threshold: 0.5,
			match_count: 50,
			filter_cache_ttl_secs: 300,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Rerank {
	pub max_batch: u32,
	/// Optional lifetime cap on successful rerank calls per user.
	pub usage_limit: Option<i64>,
}
impl Default for Rerank {
	fn default() -> Self {
		Self { max_batch: 20, usage_limit: None }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Digest {
	pub jobs_per_digest: u32,
	pub concurrency: u32,
	pub interval_secs: u64,
	pub subject: String,
}
impl Default for Digest {
	fn default() -> Self {
		Self {
			jobs_per_digest: 10,
			concurrency: 4,
			interval_secs: 86_400,
			subject: "Your top job matches".to_string(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	pub api_auth_token: Option<String>,
}
