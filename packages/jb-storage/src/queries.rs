use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Result,
	db::Db,
	models::{DigestRecipient, FilterOptions, JobEmbedding, ProfilePreferences},
	vector,
};

/// The caller's own profile embedding, if one has been computed.
pub async fn user_embedding(db: &Db, user_id: Uuid) -> Result<Option<Vec<f32>>> {
	let text: Option<Option<String>> =
		sqlx::query_scalar("SELECT embedding::text FROM profiles WHERE user_id = $1")
			.bind(user_id)
			.fetch_optional(&db.pool)
			.await?;

	text.flatten().map(|text| vector::parse_pg_vector(&text)).transpose()
}

pub async fn job_embedding(db: &Db, job_id: Uuid) -> Result<Option<JobEmbedding>> {
	let row: Option<(Uuid, Uuid, Option<String>)> =
		sqlx::query_as("SELECT id, company_id, embedding::text FROM jobs WHERE id = $1")
			.bind(job_id)
			.fetch_optional(&db.pool)
			.await?;
	let Some((job_id, company_id, text)) = row else {
		return Ok(None);
	};
	let embedding = text.map(|text| vector::parse_pg_vector(&text)).transpose()?;

	Ok(Some(JobEmbedding { job_id, company_id, embedding }))
}

pub async fn is_company_member(db: &Db, company_id: Uuid, user_id: Uuid) -> Result<bool> {
	let exists: bool = sqlx::query_scalar(
		"\
SELECT EXISTS (
	SELECT 1
	FROM company_members
	WHERE company_id = $1 AND user_id = $2
)",
	)
	.bind(company_id)
	.bind(user_id)
	.fetch_one(&db.pool)
	.await?;

	Ok(exists)
}

pub async fn profile_preferences(db: &Db, user_id: Uuid) -> Result<Option<ProfilePreferences>> {
	let row = sqlx::query_as::<_, ProfilePreferences>(
		"\
SELECT
	user_id,
	full_name,
	headline,
	bio,
	job_title,
	skills,
	desired_roles,
	preferred_locations,
	years_of_experience
FROM profiles
WHERE user_id = $1",
	)
	.bind(user_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}

pub async fn usage_count(db: &Db, user_id: Uuid) -> Result<i64> {
	let count: Option<i64> =
		sqlx::query_scalar("SELECT call_count FROM ai_usage WHERE user_id = $1")
			.bind(user_id)
			.fetch_optional(&db.pool)
			.await?;

	Ok(count.unwrap_or(0))
}

/// Adds one call to the user's counter and returns the new total.
pub async fn increment_usage(db: &Db, user_id: Uuid, now: OffsetDateTime) -> Result<i64> {
	let count: i64 = sqlx::query_scalar(
		"\
INSERT INTO ai_usage (user_id, call_count, updated_at)
VALUES ($1, 1, $2)
ON CONFLICT (user_id) DO UPDATE
SET call_count = ai_usage.call_count + 1, updated_at = EXCLUDED.updated_at
RETURNING call_count",
	)
	.bind(user_id)
	.bind(now)
	.fetch_one(&db.pool)
	.await?;

	Ok(count)
}

pub async fn digest_recipients(db: &Db) -> Result<Vec<DigestRecipient>> {
	let rows = sqlx::query_as::<_, DigestRecipient>(
		"\
SELECT user_id, email, full_name
FROM profiles
WHERE digest_enabled AND email IS NOT NULL AND btrim(email) <> ''
ORDER BY user_id",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn filter_options(db: &Db) -> Result<FilterOptions> {
	let job_types = distinct_values(
		db,
		"SELECT DISTINCT job_type FROM jobs WHERE job_type IS NOT NULL ORDER BY job_type",
	)
	.await?;
	let locations = distinct_values(
		db,
		"SELECT DISTINCT location FROM jobs WHERE location IS NOT NULL ORDER BY location",
	)
	.await?;
	let industries = distinct_values(
		db,
		"SELECT DISTINCT industry FROM jobs WHERE industry IS NOT NULL ORDER BY industry",
	)
	.await?;
	let skills =
		distinct_values(db, "SELECT DISTINCT unnest(skills) AS skill FROM jobs ORDER BY skill")
			.await?;

	Ok(FilterOptions { job_types, locations, industries, skills })
}

async fn distinct_values(db: &Db, sql: &'static str) -> Result<Vec<String>> {
	let values: Vec<String> = sqlx::query_scalar(sql).fetch_all(&db.pool).await?;

	Ok(values)
}
