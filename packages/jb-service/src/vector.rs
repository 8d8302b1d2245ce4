use crate::{BoxFuture, Error, Result};
use jb_domain::{rerank, sort::SortSpec};
use jb_storage::{
	db::Db,
	vector::{self, VectorMatch},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTarget {
	Jobs,
	Profiles,
}

/// Nearest-neighbour lookup behind the relevance sort.
pub trait SimilaritySearch
where
	Self: Send + Sync,
{
	fn find_similar<'a>(
		&'a self,
		target: MatchTarget,
		embedding: &'a [f32],
		match_threshold: f32,
		match_count: u32,
	) -> BoxFuture<'a, jb_storage::Result<Vec<VectorMatch>>>;
}

/// Calls the `match_jobs` and `match_profiles` database functions.
pub struct PgSimilaritySearch {
	db: Db,
}
impl PgSimilaritySearch {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl SimilaritySearch for PgSimilaritySearch {
	fn find_similar<'a>(
		&'a self,
		target: MatchTarget,
		embedding: &'a [f32],
		match_threshold: f32,
		match_count: u32,
	) -> BoxFuture<'a, jb_storage::Result<Vec<VectorMatch>>> {
		Box::pin(async move {
			match target {
				MatchTarget::Jobs =>
					vector::match_jobs(&self.db, embedding, match_threshold, match_count).await,
				MatchTarget::Profiles =>
					vector::match_profiles(&self.db, embedding, match_threshold, match_count).await,
			}
		})
	}
}

/// Similarity matches that restrict a relevance-sorted listing.
///
/// Returns `None` when the sort is not relevance or no embedding is available, in which case
/// the listing is not restricted. A failed lookup is an error; the listing never silently
/// widens to unranked rows.
pub async fn similarity_matches(
	search: &dyn SimilaritySearch,
	target: MatchTarget,
	sort: &SortSpec,
	embedding: Option<&[f32]>,
	cfg: &jb_config::Search,
) -> Result<Option<Vec<VectorMatch>>> {
	if !sort.is_relevance() {
		return Ok(None);
	}

	let Some(embedding) = embedding.filter(|embedding| !embedding.is_empty()) else {
		tracing::debug!(?target, "Relevance sort requested without an embedding.");

		return Ok(None);
	};
	let matches = search
		.find_similar(target, embedding, cfg.match_threshold, cfg.match_count)
		.await
		.map_err(|err| Error::VectorSearch { message: err.to_string() })?;

	tracing::debug!(?target, matches = matches.len(), "Similarity search completed.");

	Ok(Some(matches))
}

/// Reorders listing rows by descending similarity.
pub fn order_by_matches<T, F>(items: Vec<T>, matched_ids: &[String], id_of: F) -> Vec<T>
where
	F: Fn(&T) -> String,
{
	rerank::order_by_ids(items, matched_ids, id_of)
}
