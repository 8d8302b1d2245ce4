use crate::{page::Pagination, params::QueryParams, sort::SortSpec};

/// Job listing facets. Every field is optional; an empty list means no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobCriteria {
	pub job_types: Vec<String>,
	pub locations: Vec<String>,
	pub companies: Vec<String>,
	pub industries: Vec<String>,
	pub skills: Vec<String>,
	pub min_salary: Option<i64>,
	pub max_salary: Option<i64>,
	pub min_experience: Option<i32>,
	pub max_experience: Option<i32>,
	pub remote_only: bool,
	pub search: Option<String>,
	pub favorites_only: bool,
	pub sort: SortSpec,
	pub pagination: Pagination,
}
impl JobCriteria {
	pub fn from_params(params: &QueryParams, cfg: &jb_config::Search) -> Self {
		Self {
			job_types: params.multi("jobType"),
			locations: params.multi("location"),
			companies: params.multi("company"),
			industries: params.multi("industry"),
			skills: params.multi("skills"),
			min_salary: params.number("minSalary"),
			max_salary: params.number("maxSalary"),
			min_experience: params.number("minExperience"),
			max_experience: params.number("maxExperience"),
			remote_only: params.flag("remote"),
			search: params.text("search"),
			favorites_only: params.flag("favorites"),
			sort: SortSpec::parse(params.get("sortBy"), params.get("sortOrder")),
			pagination: Pagination::from_params(params, cfg),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyCriteria {
	pub names: Vec<String>,
	pub industries: Vec<String>,
	pub sizes: Vec<String>,
	pub locations: Vec<String>,
	pub tech_stack: Vec<String>,
	pub search: Option<String>,
	pub favorites_only: bool,
	pub sort: SortSpec,
	pub pagination: Pagination,
}
impl CompanyCriteria {
	pub fn from_params(params: &QueryParams, cfg: &jb_config::Search) -> Self {
		Self {
			names: params.multi("name"),
			industries: params.multi("industry"),
			sizes: params.multi("size"),
			locations: params.multi("location"),
			tech_stack: params.multi("techStack"),
			search: params.text("search"),
			favorites_only: params.flag("favorites"),
			sort: SortSpec::parse(params.get("sortBy"), params.get("sortOrder")),
			pagination: Pagination::from_params(params, cfg),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileCriteria {
	pub locations: Vec<String>,
	pub job_titles: Vec<String>,
	/// A profile must list every requested skill.
	pub skills: Vec<String>,
	pub min_experience: Option<i32>,
	pub max_experience: Option<i32>,
	pub open_to_work: bool,
	pub search: Option<String>,
	/// Job whose embedding drives the relevance sort. Parsed as a UUID by the service.
	pub job_id: Option<String>,
	pub sort: SortSpec,
	pub pagination: Pagination,
}
impl ProfileCriteria {
	pub fn from_params(params: &QueryParams, cfg: &jb_config::Search) -> Self {
		Self {
			locations: params.multi("location"),
			job_titles: params.multi("jobTitle"),
			skills: params.multi("skills"),
			min_experience: params.number("minExperience"),
			max_experience: params.number("maxExperience"),
			open_to_work: params.flag("openToWork"),
			search: params.text("search"),
			job_id: params.text("jobId"),
			sort: SortSpec::parse(params.get("sortBy"), params.get("sortOrder")),
			pagination: Pagination::from_params(params, cfg),
		}
	}
}
