use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, JobBoardService, RerankProvider, Result, UsageLedger};
use jb_config::LlmProviderConfig;
use jb_domain::rerank::{self, RerankOutcome};
use jb_providers::rerank::RerankCandidate;
use jb_storage::{models::ProfilePreferences, queries};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerankRequest {
	pub user_id: String,
	pub items: Vec<RerankCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RerankResponse {
	pub reranked_ids: Vec<String>,
	pub filtered_out_ids: Vec<String>,
	/// Successful rerank calls for this user, including this one.
	pub usage_count: i64,
}

pub(crate) struct RerankArgs<'a> {
	pub(crate) cfg: &'a LlmProviderConfig,
	pub(crate) limits: &'a jb_config::Rerank,
	pub(crate) provider: &'a dyn RerankProvider,
	pub(crate) usage: &'a dyn UsageLedger,
	pub(crate) user_id: Uuid,
	pub(crate) profile: &'a str,
	pub(crate) items: &'a [RerankCandidate],
}

impl JobBoardService {
	/// Reranks one batch of jobs for the signed-in caller.
	pub async fn rerank(&self, caller: Uuid, req: RerankRequest) -> Result<RerankResponse> {
		let user_id = parse_user_id(&req.user_id)?;

		if user_id != caller {
			return Err(Error::Forbidden {
				message: "Jobs can only be reranked for the signed-in user.".to_string(),
			});
		}

		self.rerank_for_user(user_id, &req.items).await
	}

	pub async fn rerank_for_user(
		&self,
		user_id: Uuid,
		items: &[RerankCandidate],
	) -> Result<RerankResponse> {
		validate_batch(items, self.cfg.rerank.max_batch)?;

		let Some(preferences) = queries::profile_preferences(&self.db, user_id).await? else {
			return Err(Error::NotFound { message: format!("No profile for user {user_id}.") });
		};
		let profile = describe_preferences(&preferences);

		rerank_batch(RerankArgs {
			cfg: &self.cfg.providers.llm_rerank,
			limits: &self.cfg.rerank,
			provider: self.providers.rerank.as_ref(),
			usage: self.usage.as_ref(),
			user_id,
			profile: &profile,
			items,
		})
		.await
	}
}

/// Sends one batch to the model and merges its decision.
///
/// The usage counter moves only after a decision was received and merged, so a failed call
/// never consumes quota.
pub(crate) async fn rerank_batch(args: RerankArgs<'_>) -> Result<RerankResponse> {
	let RerankArgs { cfg, limits, provider, usage, user_id, profile, items } = args;

	validate_batch(items, limits.max_batch)?;

	if let Some(limit) = limits.usage_limit {
		let used = usage.current(user_id).await?;

		if used >= limit {
			return Err(Error::QuotaExceeded {
				message: format!("Rerank limit of {limit} calls reached."),
			});
		}
	}

	let decision = provider.rerank(cfg, profile, items).await?;
	let batch_ids = items.iter().map(|item| item.id.clone()).collect::<Vec<_>>();
	let outcome = rerank::merge(&batch_ids, &decision);
	let dropped = decision.reranked_ids.len() + decision.filtered_out_ids.len()
		- outcome.ranked_ids.len()
		- outcome.filtered_out_ids.len();

	if dropped > 0 {
		tracing::warn!(%user_id, dropped, "Rerank decision contained unknown or repeated ids.");
	}

	let usage_count = usage.increment(user_id, OffsetDateTime::now_utc()).await?;

	tracing::info!(
		%user_id,
		batch = items.len(),
		ranked = outcome.ranked_ids.len(),
		filtered_out = outcome.filtered_out_ids.len(),
		usage_count,
		"Rerank completed."
	);

	Ok(RerankResponse {
		reranked_ids: outcome.ranked_ids,
		filtered_out_ids: outcome.filtered_out_ids,
		usage_count,
	})
}

/// Keeps a usable order when the model reply could not be used.
///
/// Malformed output and an exhausted quota fall back to the batch order. Transport and storage
/// failures are returned to the caller.
pub fn rerank_or_fallback(
	result: Result<RerankResponse>,
	batch_ids: &[String],
) -> Result<RerankOutcome> {
	match result {
		Ok(response) => Ok(RerankOutcome {
			ranked_ids: response.reranked_ids,
			filtered_out_ids: response.filtered_out_ids,
		}),
		Err(err @ (Error::InvalidModelOutput { .. } | Error::QuotaExceeded { .. })) => {
			tracing::warn!(error = %err, "Rerank unavailable. Keeping input order.");

			Ok(rerank::fallback(batch_ids))
		},
		Err(err) => Err(err),
	}
}

/// Plain-text summary of what a user is looking for, sent to the model with each batch.
pub fn describe_preferences(profile: &ProfilePreferences) -> String {
	let mut lines = vec![format!("Name: {}", profile.full_name)];

	if let Some(headline) = non_blank(profile.headline.as_deref()) {
		lines.push(format!("Headline: {headline}"));
	}
	if let Some(title) = non_blank(profile.job_title.as_deref()) {
		lines.push(format!("Current title: {title}"));
	}
	if !profile.desired_roles.is_empty() {
		lines.push(format!("Desired roles: {}", profile.desired_roles.join(", ")));
	}
	if !profile.skills.is_empty() {
		lines.push(format!("Skills: {}", profile.skills.join(", ")));
	}
	if !profile.preferred_locations.is_empty() {
		lines.push(format!("Preferred locations: {}", profile.preferred_locations.join(", ")));
	}
	if let Some(years) = profile.years_of_experience {
		lines.push(format!("Years of experience: {years}"));
	}
	if let Some(bio) = non_blank(profile.bio.as_deref()) {
		lines.push(format!("About: {bio}"));
	}

	lines.join("\n")
}

fn parse_user_id(raw: &str) -> Result<Uuid> {
	let raw = raw.trim();

	if raw.is_empty() {
		return Err(Error::InvalidRequest { message: "userId is required.".to_string() });
	}

	Uuid::parse_str(raw)
		.map_err(|_| Error::InvalidRequest { message: "userId must be a UUID.".to_string() })
}

fn validate_batch(items: &[RerankCandidate], max_batch: u32) -> Result<()> {
	if items.is_empty() {
		return Err(Error::InvalidRequest { message: "items must not be empty.".to_string() });
	}
	if items.len() > max_batch as usize {
		return Err(Error::InvalidRequest {
			message: format!("items must contain at most {max_batch} jobs."),
		});
	}

	let mut seen = HashSet::new();

	for item in items {
		if item.id.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "Every item needs an id.".to_string() });
		}
		if !seen.insert(item.id.as_str()) {
			return Err(Error::InvalidRequest {
				message: format!("Item id {} appears more than once.", item.id),
			});
		}
	}

	Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

	use serde_json::Map;

	use super::*;
	use crate::BoxFuture;
	use jb_domain::rerank::RerankDecision;

	struct FakeProvider {
		calls: AtomicUsize,
		reply: fn() -> jb_providers::Result<RerankDecision>,
	}
	impl RerankProvider for FakeProvider {
		fn rerank<'a>(
			&'a self,
			_cfg: &'a LlmProviderConfig,
			_profile: &'a str,
			_items: &'a [RerankCandidate],
		) -> BoxFuture<'a, jb_providers::Result<RerankDecision>> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			Box::pin(async move { (self.reply)() })
		}
	}

	#[derive(Default)]
	struct MemoryLedger {
		count: AtomicI64,
	}
	impl UsageLedger for MemoryLedger {
		fn current(&self, _user_id: Uuid) -> BoxFuture<'_, jb_storage::Result<i64>> {
			Box::pin(async move { Ok(self.count.load(Ordering::SeqCst)) })
		}

		fn increment(
			&self,
			_user_id: Uuid,
			_now: OffsetDateTime,
		) -> BoxFuture<'_, jb_storage::Result<i64>> {
			Box::pin(async move { Ok(self.count.fetch_add(1, Ordering::SeqCst) + 1) })
		}
	}

	fn llm_cfg() -> LlmProviderConfig {
		LlmProviderConfig {
			provider_id: "test".to_string(),
			api_base: "http://127.0.0.1:1".to_string(),
			api_key: "key".to_string(),
			path: "/v1/chat/completions".to_string(),
			model: "m".to_string(),
			temperature: 0.0,
			timeout_ms: 1_000,
			default_headers: Map::new(),
		}
	}

	fn items(ids: &[&str]) -> Vec<RerankCandidate> {
		ids.iter()
			.map(|id| RerankCandidate {
				id: id.to_string(),
				title: format!("Job {id}"),
				description: String::new(),
				requirements: String::new(),
				location: None,
				salary: None,
			})
			.collect()
	}

	fn hallucinating_reply() -> jb_providers::Result<RerankDecision> {
		Ok(RerankDecision {
			reranked_ids: vec!["B".to_string(), "A".to_string(), "D".to_string()],
			filtered_out_ids: vec!["C".to_string()],
		})
	}

	fn malformed_reply() -> jb_providers::Result<RerankDecision> {
		Err(jb_providers::Error::InvalidResponse { message: "not json".to_string() })
	}

	fn unreachable_reply() -> jb_providers::Result<RerankDecision> {
		Err(jb_providers::Error::InvalidConfig { message: "connection refused".to_string() })
	}

	async fn run(
		provider: &FakeProvider,
		ledger: &MemoryLedger,
		limits: &jb_config::Rerank,
		batch: &[RerankCandidate],
	) -> Result<RerankResponse> {
		let cfg = llm_cfg();

		rerank_batch(RerankArgs {
			cfg: &cfg,
			limits,
			provider,
			usage: ledger,
			user_id: Uuid::nil(),
			profile: "Rust backend roles.",
			items: batch,
		})
		.await
	}

	#[tokio::test]
	async fn drops_ids_outside_the_batch_and_counts_once() {
		let provider = FakeProvider { calls: AtomicUsize::new(0), reply: hallucinating_reply };
		let ledger = MemoryLedger::default();
		let response = run(&provider, &ledger, &jb_config::Rerank::default(), &items(&["A", "B", "C"]))
			.await
			.expect("rerank failed");

		assert_eq!(response.reranked_ids, vec!["B".to_string(), "A".to_string()]);
		assert_eq!(response.filtered_out_ids, vec!["C".to_string()]);
		assert_eq!(response.usage_count, 1);
		assert_eq!(ledger.count.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn malformed_output_does_not_consume_quota() {
		let provider = FakeProvider { calls: AtomicUsize::new(0), reply: malformed_reply };
		let ledger = MemoryLedger::default();
		let err = run(&provider, &ledger, &jb_config::Rerank::default(), &items(&["A"]))
			.await
			.expect_err("Expected invalid model output.");

		assert!(matches!(err, Error::InvalidModelOutput { .. }));
		assert_eq!(ledger.count.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn provider_failure_does_not_consume_quota() {
		let provider = FakeProvider { calls: AtomicUsize::new(0), reply: unreachable_reply };
		let ledger = MemoryLedger::default();
		let err = run(&provider, &ledger, &jb_config::Rerank::default(), &items(&["A", "B"]))
			.await
			.expect_err("Expected provider error.");

		assert!(matches!(err, Error::Provider { .. }));
		assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
		assert_eq!(ledger.count.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn exhausted_quota_skips_the_model() {
		let provider = FakeProvider { calls: AtomicUsize::new(0), reply: hallucinating_reply };
		let ledger = MemoryLedger { count: AtomicI64::new(3) };
		let limits = jb_config::Rerank { max_batch: 20, usage_limit: Some(3) };
		let err = run(&provider, &ledger, &limits, &items(&["A"]))
			.await
			.expect_err("Expected quota error.");

		assert!(matches!(err, Error::QuotaExceeded { .. }));
		assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
		assert_eq!(ledger.count.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn rejects_invalid_batches_before_calling_the_model() {
		let provider = FakeProvider { calls: AtomicUsize::new(0), reply: hallucinating_reply };
		let ledger = MemoryLedger::default();
		let limits = jb_config::Rerank { max_batch: 2, usage_limit: None };

		for batch in [items(&[]), items(&["A", "B", "C"]), items(&["A", "A"]), items(&[" "])] {
			let err = run(&provider, &ledger, &limits, &batch)
				.await
				.expect_err("Expected invalid request.");

			assert!(matches!(err, Error::InvalidRequest { .. }), "batch {batch:?}");
		}

		assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn falls_back_to_input_order_on_malformed_output() {
		let batch = vec!["A".to_string(), "B".to_string()];
		let outcome = rerank_or_fallback(
			Err(Error::InvalidModelOutput { message: "bad".to_string() }),
			&batch,
		)
		.expect("fallback expected");

		assert_eq!(outcome.ranked_ids, batch);
		assert!(outcome.filtered_out_ids.is_empty());

		let err = rerank_or_fallback(Err(Error::Provider { message: "timeout".to_string() }), &batch)
			.expect_err("Transport errors propagate.");

		assert!(matches!(err, Error::Provider { .. }));
	}

	#[test]
	fn user_id_must_be_a_uuid() {
		assert!(matches!(parse_user_id(""), Err(Error::InvalidRequest { .. })));
		assert!(matches!(parse_user_id("abc"), Err(Error::InvalidRequest { .. })));
		assert_eq!(parse_user_id(&Uuid::nil().to_string()).expect("uuid"), Uuid::nil());
	}

	#[test]
	fn describes_preferences_without_blank_fields() {
		let profile = ProfilePreferences {
			user_id: Uuid::nil(),
			full_name: "Ada".to_string(),
			headline: Some("  ".to_string()),
			bio: Some("Builds databases.".to_string()),
			job_title: Some("Engineer".to_string()),
			skills: vec!["rust".to_string(), "sql".to_string()],
			desired_roles: Vec::new(),
			preferred_locations: vec!["Remote".to_string()],
			years_of_experience: Some(7),
		};
		let text = describe_preferences(&profile);

		assert_eq!(
			text,
			"Name: Ada\nCurrent title: Engineer\nSkills: rust, sql\nPreferred locations: Remote\n\
			 Years of experience: 7\nAbout: Builds databases."
		);
	}
}
