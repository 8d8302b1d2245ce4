use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, JobBoardService, Result,
	listing::{self, ResultPage, Scope, Select},
	vector::{self, MatchTarget},
};
use jb_domain::{criteria::ProfileCriteria, sort::ProfileSort};
use jb_storage::{
	models::{PROFILE_COLUMNS, ProfileRow},
	queries,
};

const DEFAULT_ORDER: &str = "p.years_of_experience DESC NULLS LAST, p.user_id ASC";
const SEARCH_COLUMNS: &[&str] = &["p.full_name", "p.headline", "p.job_title"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileItem {
	pub user_id: Uuid,
	pub full_name: String,
	pub headline: Option<String>,
	pub job_title: Option<String>,
	pub location: Option<String>,
	pub skills: Vec<String>,
	pub years_of_experience: Option<i32>,
	pub open_to_work: bool,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl From<ProfileRow> for ProfileItem {
	fn from(row: ProfileRow) -> Self {
		Self {
			user_id: row.user_id,
			full_name: row.full_name,
			headline: row.headline,
			job_title: row.job_title,
			location: row.location,
			skills: row.skills,
			years_of_experience: row.years_of_experience,
			open_to_work: row.open_to_work,
			created_at: row.created_at,
		}
	}
}

impl JobBoardService {
	/// Lists candidate profiles.
	///
	/// With `jobId` the listing is scoped to that job's company: the caller must be signed in and
	/// a member of the company. A relevance sort then ranks profiles against the job embedding.
	/// Storage failures while checking access are reported on the page, like any listing query.
	pub async fn list_profiles(
		&self,
		caller: Option<Uuid>,
		criteria: &ProfileCriteria,
	) -> Result<ResultPage<ProfileItem>> {
		let embedding = match criteria.job_id.as_deref() {
			Some(raw) => match self.job_embedding_for(caller, raw).await {
				Ok(embedding) => embedding,
				Err(err @ Error::Storage { .. }) =>
					return Ok(ResultPage::failed("Failed to load job for ranking.", err)),
				Err(err) => return Err(err),
			},
			None => None,
		};
		let matches = vector::similarity_matches(
			self.similarity.as_ref(),
			MatchTarget::Profiles,
			&criteria.sort,
			embedding.as_deref(),
			&self.cfg.search,
		)
		.await?;
		let scope = Scope::new(None, matches.as_deref());
		let page = listing::fetch_page::<ProfileRow>(
			&self.db,
			"profiles",
			build_query(criteria, &scope, Select::Count),
			build_query(criteria, &scope, Select::Page),
		)
		.await;

		Ok(page.map(ProfileItem::from).with_matches(matches.as_deref()))
	}

	async fn job_embedding_for(
		&self,
		caller: Option<Uuid>,
		raw_job_id: &str,
	) -> Result<Option<Vec<f32>>> {
		let job_id = Uuid::parse_str(raw_job_id.trim()).map_err(|_| Error::InvalidRequest {
			message: "jobId must be a UUID.".to_string(),
		})?;
		let Some(user_id) = caller else {
			return Err(Error::Unauthorized {
				message: "Sign in to rank candidates for a job.".to_string(),
			});
		};
		let Some(job) = queries::job_embedding(&self.db, job_id).await? else {
			return Err(Error::NotFound { message: format!("Job {job_id} does not exist.") });
		};

		if !queries::is_company_member(&self.db, job.company_id, user_id).await? {
			return Err(Error::Forbidden {
				message: "Only members of the hiring company can rank candidates for this job."
					.to_string(),
			});
		}

		Ok(job.embedding)
	}
}

pub(crate) fn build_query(
	criteria: &ProfileCriteria,
	scope: &Scope,
	select: Select,
) -> QueryBuilder<'static, Postgres> {
	let mut builder = QueryBuilder::new("SELECT ");

	match select {
		Select::Count => builder.push("COUNT(*)"),
		Select::Page => builder.push(PROFILE_COLUMNS),
	};

	builder.push(" FROM profiles p WHERE TRUE");

	listing::push_any(&mut builder, "p.location", &criteria.locations);
	listing::push_any(&mut builder, "p.job_title", &criteria.job_titles);
	listing::push_contains_all(&mut builder, "p.skills", &criteria.skills);
	listing::push_bound(&mut builder, "p.years_of_experience", ">=", criteria.min_experience);
	listing::push_bound(&mut builder, "p.years_of_experience", "<=", criteria.max_experience);

	if criteria.open_to_work {
		builder.push(" AND p.open_to_work");
	}

	listing::push_search(&mut builder, SEARCH_COLUMNS, criteria.search.as_deref());
	listing::push_restrict(&mut builder, "p.user_id", scope);

	if select == Select::Page {
		listing::push_order::<ProfileSort>(
			&mut builder,
			&criteria.sort,
			DEFAULT_ORDER,
			"p.user_id ASC",
		);
		listing::push_page(&mut builder, criteria.pagination);
	}

	builder
}
