pub mod digest;
pub mod error;
pub mod filters;
pub mod listing;
pub mod rerank;
pub mod time_serde;
pub mod vector;

use std::{future::Future, pin::Pin, sync::Arc};

use time::OffsetDateTime;
use uuid::Uuid;

pub use digest::DigestSummary;
pub use error::{Error, Result};
pub use filters::{FilterOptionsCache, FilterOptionsResponse, TtlCache};
use jb_config::{Config, LlmProviderConfig, MailerConfig};
use jb_domain::rerank::RerankDecision;
use jb_providers::{
	mailer::{self, OutgoingEmail},
	rerank::{self as rerank_api, RerankCandidate},
};
use jb_storage::{db::Db, queries};
pub use listing::{
	ResultPage, companies::CompanyItem, jobs::JobItem, profiles::ProfileItem,
};
pub use rerank::{RerankRequest, RerankResponse};
pub use vector::{MatchTarget, PgSimilaritySearch, SimilaritySearch};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait RerankProvider
where
	Self: Send + Sync,
{
	fn rerank<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		profile: &'a str,
		items: &'a [RerankCandidate],
	) -> BoxFuture<'a, jb_providers::Result<RerankDecision>>;
}

pub trait Mailer
where
	Self: Send + Sync,
{
	fn send<'a>(
		&'a self,
		cfg: &'a MailerConfig,
		email: &'a OutgoingEmail,
	) -> BoxFuture<'a, jb_providers::Result<String>>;
}

/// Per-user count of successful rerank calls.
pub trait UsageLedger
where
	Self: Send + Sync,
{
	fn current(&self, user_id: Uuid) -> BoxFuture<'_, jb_storage::Result<i64>>;

	/// Adds one call and returns the new total.
	fn increment(&self, user_id: Uuid, now: OffsetDateTime) -> BoxFuture<'_, jb_storage::Result<i64>>;
}

#[derive(Clone)]
pub struct Providers {
	pub rerank: Arc<dyn RerankProvider>,
	pub mailer: Arc<dyn Mailer>,
}

pub struct PgUsageLedger {
	db: Db,
}
impl PgUsageLedger {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}

pub struct JobBoardService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
	pub similarity: Arc<dyn SimilaritySearch>,
	pub usage: Arc<dyn UsageLedger>,
}

struct DefaultProviders;

impl RerankProvider for DefaultProviders {
	fn rerank<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		profile: &'a str,
		items: &'a [RerankCandidate],
	) -> BoxFuture<'a, jb_providers::Result<RerankDecision>> {
		Box::pin(rerank_api::rerank(cfg, profile, items))
	}
}

impl Mailer for DefaultProviders {
	fn send<'a>(
		&'a self,
		cfg: &'a MailerConfig,
		email: &'a OutgoingEmail,
	) -> BoxFuture<'a, jb_providers::Result<String>> {
		Box::pin(mailer::send(cfg, email))
	}
}

impl UsageLedger for PgUsageLedger {
	fn current(&self, user_id: Uuid) -> BoxFuture<'_, jb_storage::Result<i64>> {
		Box::pin(queries::usage_count(&self.db, user_id))
	}

	fn increment(&self, user_id: Uuid, now: OffsetDateTime) -> BoxFuture<'_, jb_storage::Result<i64>> {
		Box::pin(queries::increment_usage(&self.db, user_id, now))
	}
}

impl Providers {
	pub fn new(rerank: Arc<dyn RerankProvider>, mailer: Arc<dyn Mailer>) -> Self {
		Self { rerank, mailer }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { rerank: provider.clone(), mailer: provider }
	}
}

impl JobBoardService {
	pub fn new(cfg: Config, db: Db) -> Self {
		let similarity = Arc::new(PgSimilaritySearch::new(db.clone()));
		let usage = Arc::new(PgUsageLedger::new(db.clone()));

		Self { cfg, db, providers: Providers::default(), similarity, usage }
	}

	pub fn with_providers(mut self, providers: Providers) -> Self {
		self.providers = providers;

		self
	}

	pub fn with_similarity(mut self, similarity: Arc<dyn SimilaritySearch>) -> Self {
		self.similarity = similarity;

		self
	}

	pub fn with_usage(mut self, usage: Arc<dyn UsageLedger>) -> Self {
		self.usage = usage;

		self
	}
}
