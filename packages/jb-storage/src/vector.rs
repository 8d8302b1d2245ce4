use uuid::Uuid;

use crate::{Error, Result, db::Db};

#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
	pub id: Uuid,
	pub similarity: f32,
}

/// Calls `match_jobs`; ids come back in descending similarity.
pub async fn match_jobs(
	db: &Db,
	embedding: &[f32],
	match_threshold: f32,
	match_count: u32,
) -> Result<Vec<VectorMatch>> {
	call_match_function(db, "match_jobs", embedding, match_threshold, match_count).await
}

/// Calls `match_profiles`; ids are profile user ids in descending similarity.
pub async fn match_profiles(
	db: &Db,
	embedding: &[f32],
	match_threshold: f32,
	match_count: u32,
) -> Result<Vec<VectorMatch>> {
	call_match_function(db, "match_profiles", embedding, match_threshold, match_count).await
}

async fn call_match_function(
	db: &Db,
	function: &'static str,
	embedding: &[f32],
	match_threshold: f32,
	match_count: u32,
) -> Result<Vec<VectorMatch>> {
	if embedding.is_empty() {
		return Err(Error::InvalidArgument("Embedding must not be empty.".to_string()));
	}

	let count = i32::try_from(match_count)
		.map_err(|_| Error::InvalidArgument("match_count exceeds supported range.".to_string()))?;
	let sql = format!("SELECT id, similarity FROM {function}($1::text::vector, $2, $3)");
	let rows: Vec<(Uuid, f32)> = sqlx::query_as(&sql)
		.bind(vector_to_pg(embedding))
		.bind(match_threshold)
		.bind(count)
		.fetch_all(&db.pool)
		.await?;

	Ok(rows.into_iter().map(|(id, similarity)| VectorMatch { id, similarity }).collect())
}

pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

pub fn parse_pg_vector(text: &str) -> Result<Vec<f32>> {
	let trimmed = text.trim();
	let without_brackets = trimmed
		.strip_prefix('[')
		.and_then(|s| s.strip_suffix(']'))
		.ok_or_else(|| Error::InvalidArgument("Vector text is not bracketed.".to_string()))?;

	if without_brackets.trim().is_empty() {
		return Ok(Vec::new());
	}

	let mut vec = Vec::new();

	for part in without_brackets.split(',') {
		let value: f32 = part.trim().parse().map_err(|_| {
			Error::InvalidArgument("Vector text contains a non-numeric value.".to_string())
		})?;

		vec.push(value);
	}

	Ok(vec)
}
