use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	JobBoardService, Result,
	listing::{self, ResultPage, Scope, Select},
	vector::{self, MatchTarget},
};
use jb_domain::{criteria::JobCriteria, sort::JobSort};
use jb_providers::rerank::RerankCandidate;
use jb_storage::{
	models::{JOB_COLUMNS, JobRow},
	queries,
};

const DEFAULT_ORDER: &str = "j.created_at DESC, j.id ASC";
const SEARCH_COLUMNS: &[&str] = &["j.title", "j.description", "j.company_name"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobItem {
	pub id: Uuid,
	pub company_id: Uuid,
	pub company_name: String,
	pub title: String,
	pub description: String,
	pub requirements: String,
	pub location: Option<String>,
	pub job_type: Option<String>,
	pub industry: Option<String>,
	pub is_remote: bool,
	pub salary_min: Option<i64>,
	pub salary_max: Option<i64>,
	pub experience_years: Option<i32>,
	pub skills: Vec<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl JobItem {
	pub fn salary_label(&self) -> Option<String> {
		match (self.salary_min, self.salary_max) {
			(Some(min), Some(max)) if min == max => Some(min.to_string()),
			(Some(min), Some(max)) => Some(format!("{min}-{max}")),
			(Some(min), None) => Some(format!("from {min}")),
			(None, Some(max)) => Some(format!("up to {max}")),
			(None, None) => None,
		}
	}

	pub fn to_candidate(&self) -> RerankCandidate {
		RerankCandidate {
			id: self.id.to_string(),
			title: self.title.clone(),
			description: self.description.clone(),
			requirements: self.requirements.clone(),
			location: self.location.clone(),
			salary: self.salary_label(),
		}
	}
}
impl From<JobRow> for JobItem {
	fn from(row: JobRow) -> Self {
		Self {
			id: row.id,
			company_id: row.company_id,
			company_name: row.company_name,
			title: row.title,
			description: row.description,
			requirements: row.requirements,
			location: row.location,
			job_type: row.job_type,
			industry: row.industry,
			is_remote: row.is_remote,
			salary_min: row.salary_min,
			salary_max: row.salary_max,
			experience_years: row.experience_years,
			skills: row.skills,
			created_at: row.created_at,
		}
	}
}

impl JobBoardService {
	/// Lists jobs matching `criteria`.
	///
	/// A relevance sort with a signed-in caller whose profile has an embedding restricts the
	/// page to jobs similar to that profile. Otherwise the relevance key is treated like any
	/// unrecognized sort key.
	pub async fn list_jobs(
		&self,
		caller: Option<Uuid>,
		criteria: &JobCriteria,
	) -> Result<ResultPage<JobItem>> {
		let favorites_of = listing::favorites_scope(criteria.favorites_only, caller)?;
		let embedding = match caller {
			Some(user_id) if criteria.sort.is_relevance() =>
				match queries::user_embedding(&self.db, user_id).await {
					Ok(embedding) => embedding,
					Err(err) => return Ok(ResultPage::failed("Failed to load profile embedding.", err)),
				},
			_ => None,
		};
		let matches = vector::similarity_matches(
			self.similarity.as_ref(),
			MatchTarget::Jobs,
			&criteria.sort,
			embedding.as_deref(),
			&self.cfg.search,
		)
		.await?;
		let scope = Scope::new(favorites_of, matches.as_deref());
		let page = listing::fetch_page::<JobRow>(
			&self.db,
			"jobs",
			build_query(criteria, &scope, Select::Count),
			build_query(criteria, &scope, Select::Page),
		)
		.await;

		Ok(page.map(JobItem::from).with_matches(matches.as_deref()))
	}
}

pub(crate) fn build_query(
	criteria: &JobCriteria,
	scope: &Scope,
	select: Select,
) -> QueryBuilder<'static, Postgres> {
	let mut builder = QueryBuilder::new("SELECT ");

	match select {
		Select::Count => builder.push("COUNT(*)"),
		Select::Page => builder.push(JOB_COLUMNS),
	};

	builder.push(" FROM jobs j");

	if let Some(user_id) = scope.favorites_of {
		builder.push(" JOIN favorite_jobs f ON f.job_id = j.id AND f.user_id = ");
		builder.push_bind(user_id);
	}

	builder.push(" WHERE TRUE");

	listing::push_any(&mut builder, "j.job_type", &criteria.job_types);
	listing::push_any(&mut builder, "j.location", &criteria.locations);
	listing::push_any(&mut builder, "j.company_name", &criteria.companies);
	listing::push_any(&mut builder, "j.industry", &criteria.industries);
	listing::push_overlap(&mut builder, "j.skills", &criteria.skills);
	listing::push_bound(&mut builder, "j.salary_min", ">=", criteria.min_salary);
	listing::push_bound(&mut builder, "j.salary_max", "<=", criteria.max_salary);
	listing::push_bound(&mut builder, "j.experience_years", ">=", criteria.min_experience);
	listing::push_bound(&mut builder, "j.experience_years", "<=", criteria.max_experience);

	if criteria.remote_only {
		builder.push(" AND j.is_remote");
	}

	listing::push_search(&mut builder, SEARCH_COLUMNS, criteria.search.as_deref());
	listing::push_restrict(&mut builder, "j.id", scope);

	if select == Select::Page {
		listing::push_order::<JobSort>(&mut builder, &criteria.sort, DEFAULT_ORDER, "j.id ASC");
		listing::push_page(&mut builder, criteria.pagination);
	}

	builder
}
