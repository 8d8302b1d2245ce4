use std::{future::Future, sync::Arc};

use serde::Serialize;
use tokio::{sync::Semaphore, task::JoinSet};

use crate::{
	Error, JobBoardService, Result,
	listing::jobs::JobItem,
	rerank,
	vector,
};
use jb_domain::{
	criteria::JobCriteria,
	page::Pagination,
	rerank as rerank_merge,
	sort::{RELEVANCE, SortSpec},
};
use jb_providers::mailer::OutgoingEmail;
use jb_storage::{models::DigestRecipient, queries};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DigestSummary {
	pub attempted: usize,
	pub sent: usize,
	/// Recipients with no matching jobs; nothing was sent to them.
	pub skipped: usize,
	pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
	Sent,
	Skipped,
}

/// Runs `deliver` for every recipient with at most `concurrency` deliveries in flight.
///
/// A failed or panicked delivery is counted and logged; it never stops the batch.
pub async fn run_batch<F, Fut>(
	recipients: Vec<DigestRecipient>,
	concurrency: usize,
	deliver: F,
) -> DigestSummary
where
	F: Fn(DigestRecipient) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Delivery>> + Send + 'static,
{
	let mut summary = DigestSummary { attempted: recipients.len(), ..Default::default() };
	let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
	let deliver = Arc::new(deliver);
	let mut tasks = JoinSet::new();

	for recipient in recipients {
		let semaphore = semaphore.clone();
		let deliver = deliver.clone();

		tasks.spawn(async move {
			let _permit = semaphore.acquire_owned().await;
			let user_id = recipient.user_id;

			(user_id, deliver(recipient).await)
		});
	}

	while let Some(joined) = tasks.join_next().await {
		match joined {
			Ok((_, Ok(Delivery::Sent))) => summary.sent += 1,
			Ok((_, Ok(Delivery::Skipped))) => summary.skipped += 1,
			Ok((user_id, Err(err))) => {
				summary.failed += 1;

				tracing::warn!(%user_id, error = %err, "Digest delivery failed.");
			},
			Err(err) => {
				summary.failed += 1;

				tracing::error!(error = %err, "Digest task did not complete.");
			},
		}
	}

	summary
}

/// Sends the digest to every opted-in user.
pub async fn run_digest(service: Arc<JobBoardService>) -> Result<DigestSummary> {
	let recipients = queries::digest_recipients(&service.db).await?;
	let concurrency = service.cfg.digest.concurrency as usize;

	tracing::info!(recipients = recipients.len(), concurrency, "Digest run started.");

	let summary = run_batch(recipients, concurrency, move |recipient| {
		let service = service.clone();

		async move { service.send_digest(&recipient).await }
	})
	.await;

	tracing::info!(
		attempted = summary.attempted,
		sent = summary.sent,
		skipped = summary.skipped,
		failed = summary.failed,
		"Digest run finished."
	);

	Ok(summary)
}

impl JobBoardService {
	/// Picks, reranks, and mails the top jobs for one recipient.
	pub async fn send_digest(&self, recipient: &DigestRecipient) -> Result<Delivery> {
		let digest = &self.cfg.digest;
		let size = digest.jobs_per_digest.min(self.cfg.rerank.max_batch);
		let criteria = JobCriteria {
			sort: SortSpec { key: Some(RELEVANCE.to_string()), order: None },
			pagination: Pagination::new(1, size.max(self.cfg.search.match_count)),
			..Default::default()
		};
		let page = self.list_jobs(Some(recipient.user_id), &criteria).await?;

		if let Some(message) = page.error {
			return Err(Error::Storage { message });
		}

		let jobs = top_jobs(page.data, page.matched_ids.as_deref(), size as usize);

		if jobs.is_empty() {
			return Ok(Delivery::Skipped);
		}

		let candidates = jobs.iter().map(JobItem::to_candidate).collect::<Vec<_>>();
		let batch_ids = candidates.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
		let outcome = rerank::rerank_or_fallback(
			self.rerank_for_user(recipient.user_id, &candidates).await,
			&batch_ids,
		)?;
		let jobs = rerank_merge::order_by_ids(jobs, &outcome.ranked_ids, |job| job.id.to_string());

		if jobs.is_empty() {
			return Ok(Delivery::Skipped);
		}

		let email = compose_digest(recipient, &jobs, &digest.subject);
		let message_id = self.providers.mailer.send(&self.cfg.providers.mailer, &email).await?;

		tracing::info!(
			user_id = %recipient.user_id,
			jobs = jobs.len(),
			%message_id,
			"Digest sent."
		);

		Ok(Delivery::Sent)
	}
}

/// Keeps the `size` best jobs: similarity order when the listing was ranked, listing order
/// otherwise.
pub fn top_jobs(jobs: Vec<JobItem>, matched_ids: Option<&[String]>, size: usize) -> Vec<JobItem> {
	let mut jobs = match matched_ids {
		Some(matched_ids) => vector::order_by_matches(jobs, matched_ids, |job| job.id.to_string()),
		None => jobs,
	};

	jobs.truncate(size);

	jobs
}

pub fn compose_digest(
	recipient: &DigestRecipient,
	jobs: &[JobItem],
	subject: &str,
) -> OutgoingEmail {
	let mut text = format!("Hi {},\n\nHere are jobs picked for you:\n", recipient.full_name);

	for (rank, job) in jobs.iter().enumerate() {
		text.push_str(&format!("\n{}. {} at {}", rank + 1, job.title, job.company_name));

		if let Some(location) = &job.location {
			text.push_str(&format!(" ({location})"));
		}
		if job.is_remote {
			text.push_str(" [remote]");
		}
		if let Some(salary) = job.salary_label() {
			text.push_str(&format!(", salary {salary}"));
		}
	}

	text.push_str("\n\nUpdate your profile to change what we send.\n");

	OutgoingEmail { to: recipient.email.clone(), subject: subject.to_string(), text }
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use time::OffsetDateTime;
	use uuid::Uuid;

	use super::*;

	fn recipients(count: usize) -> Vec<DigestRecipient> {
		(0..count)
			.map(|i| DigestRecipient {
				user_id: Uuid::from_u128(i as u128 + 1),
				email: format!("user{i}@example.com"),
				full_name: format!("User {i}"),
			})
			.collect()
	}

	fn job_item(title: &str, remote: bool) -> JobItem {
		JobItem {
			id: Uuid::new_v4(),
			company_id: Uuid::nil(),
			company_name: "Acme".to_string(),
			title: title.to_string(),
			description: String::new(),
			requirements: String::new(),
			location: Some("Berlin".to_string()),
			job_type: None,
			industry: None,
			is_remote: remote,
			salary_min: Some(80_000),
			salary_max: None,
			experience_years: None,
			skills: Vec::new(),
			created_at: OffsetDateTime::UNIX_EPOCH,
		}
	}

	#[tokio::test]
	async fn one_failure_does_not_stop_the_batch() {
		let failing = Uuid::from_u128(2);
		let summary = run_batch(recipients(5), 2, move |recipient| async move {
			if recipient.user_id == failing {
				return Err(Error::Provider { message: "mailer returned 500".to_string() });
			}

			Ok(Delivery::Sent)
		})
		.await;

		assert_eq!(summary, DigestSummary { attempted: 5, sent: 4, skipped: 0, failed: 1 });
	}

	#[tokio::test]
	async fn concurrency_is_bounded() {
		let in_flight = Arc::new(AtomicUsize::new(0));
		let peak = Arc::new(AtomicUsize::new(0));
		let tracker = (in_flight.clone(), peak.clone());
		let summary = run_batch(recipients(8), 3, move |_| {
			let (in_flight, peak) = tracker.clone();

			async move {
				let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;

				peak.fetch_max(now, Ordering::SeqCst);
				tokio::time::sleep(std::time::Duration::from_millis(10)).await;
				in_flight.fetch_sub(1, Ordering::SeqCst);

				Ok(Delivery::Skipped)
			}
		})
		.await;

		assert_eq!(summary.skipped, 8);
		assert!(peak.load(Ordering::SeqCst) <= 3);
	}

	#[test]
	fn digest_lists_jobs_in_rank_order() {
		let recipient = DigestRecipient {
			user_id: Uuid::nil(),
			email: "ada@example.com".to_string(),
			full_name: "Ada".to_string(),
		};
		let email = compose_digest(
			&recipient,
			&[job_item("Rust Engineer", true), job_item("SRE", false)],
			"Your top job matches",
		);

		assert_eq!(email.to, "ada@example.com");
		assert!(email.text.contains(
			"\n1. Rust Engineer at Acme (Berlin) [remote], salary from 80000\n2. SRE at Acme (Berlin)"
		));
	}

	#[test]
	fn most_similar_jobs_survive_the_cut_regardless_of_listing_order() {
		let newest = job_item("Newest", false);
		let middle = job_item("Middle", false);
		let oldest = job_item("Oldest", false);
		let matched_ids = vec![oldest.id.to_string(), middle.id.to_string(), newest.id.to_string()];
		let picked = top_jobs(
			vec![newest.clone(), middle.clone(), oldest.clone()],
			Some(&matched_ids[..]),
			2,
		);

		assert_eq!(picked.iter().map(|job| job.id).collect::<Vec<_>>(), vec![oldest.id, middle.id]);

		let unranked = top_jobs(vec![newest.clone(), middle, oldest], None, 1);

		assert_eq!(unranked.iter().map(|job| job.id).collect::<Vec<_>>(), vec![newest.id]);
	}
}
