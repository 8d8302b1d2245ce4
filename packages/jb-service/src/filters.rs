use std::{
	collections::HashMap,
	hash::Hash,
	sync::Mutex,
	time::{Duration, Instant},
};

use serde::Serialize;

use crate::{JobBoardService, Result};
use jb_storage::{models::FilterOptions, queries};

const JOB_FILTERS_KEY: &str = "jobs";

/// Distinct facet values offered by the job listing filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptionsResponse {
	pub job_types: Vec<String>,
	pub locations: Vec<String>,
	pub industries: Vec<String>,
	pub skills: Vec<String>,
}
impl From<FilterOptions> for FilterOptionsResponse {
	fn from(options: FilterOptions) -> Self {
		Self {
			job_types: options.job_types,
			locations: options.locations,
			industries: options.industries,
			skills: options.skills,
		}
	}
}

/// Key-value cache whose entries expire `ttl` after insertion.
pub struct TtlCache<K, V> {
	ttl: Duration,
	entries: Mutex<HashMap<K, (Instant, V)>>,
}
impl<K, V> TtlCache<K, V>
where
	K: Eq + Hash,
	V: Clone,
{
	pub fn new(ttl: Duration) -> Self {
		Self { ttl, entries: Mutex::new(HashMap::new()) }
	}

	pub fn get(&self, key: &K, now: Instant) -> Option<V> {
		let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
		let (inserted_at, value) = entries.get(key)?;

		if now.saturating_duration_since(*inserted_at) < self.ttl {
			return Some(value.clone());
		}

		entries.remove(key);

		None
	}

	pub fn insert(&self, key: K, value: V, now: Instant) {
		let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());

		entries.insert(key, (now, value));
	}
}

pub type FilterOptionsCache = TtlCache<&'static str, FilterOptionsResponse>;

impl JobBoardService {
	pub fn filter_options_cache(&self) -> FilterOptionsCache {
		TtlCache::new(Duration::from_secs(self.cfg.search.filter_cache_ttl_secs))
	}

	/// Job filter values, served from `cache` until its entry expires.
	pub async fn job_filter_options(
		&self,
		cache: &FilterOptionsCache,
	) -> Result<FilterOptionsResponse> {
		if let Some(options) = cache.get(&JOB_FILTERS_KEY, Instant::now()) {
			return Ok(options);
		}

		let options = FilterOptionsResponse::from(queries::filter_options(&self.db).await?);

		cache.insert(JOB_FILTERS_KEY, options.clone(), Instant::now());

		tracing::debug!(
			job_types = options.job_types.len(),
			locations = options.locations.len(),
			"Refreshed job filter options."
		);

		Ok(options)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn entries_expire_after_ttl() {
		let cache = TtlCache::new(Duration::from_secs(300));
		let start = Instant::now();

		cache.insert("jobs", vec!["remote".to_string()], start);

		assert_eq!(
			cache.get(&"jobs", start + Duration::from_secs(299)),
			Some(vec!["remote".to_string()])
		);
		assert_eq!(cache.get(&"jobs", start + Duration::from_secs(300)), None);
		assert_eq!(cache.get(&"jobs", start), None);
	}

	#[test]
	fn keys_are_independent() {
		let cache = TtlCache::new(Duration::from_secs(60));
		let now = Instant::now();

		cache.insert("jobs", 1, now);

		assert_eq!(cache.get(&"jobs", now), Some(1));
		assert_eq!(cache.get(&"companies", now), None);
	}
}
