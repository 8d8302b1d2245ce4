use time::OffsetDateTime;
use uuid::Uuid;

/// Select list matching [`JobRow`] for queries aliasing `jobs` as `j`.
pub const JOB_COLUMNS: &str = "j.id, j.company_id, j.company_name, j.title, j.description, \
	j.requirements, j.location, j.job_type, j.industry, j.is_remote, j.salary_min, j.salary_max, \
	j.experience_years, j.skills, j.created_at";

/// Select list matching [`CompanyRow`] for queries aliasing `companies` as `c`.
pub const COMPANY_COLUMNS: &str = "c.id, c.name, c.industry, c.size, c.location, c.tech_stack, \
	c.employee_count, c.founded_year, c.description, c.created_at";

/// Select list matching [`ProfileRow`] for queries aliasing `profiles` as `p`.
pub const PROFILE_COLUMNS: &str = "p.user_id, p.full_name, p.headline, p.job_title, p.location, \
	p.skills, p.years_of_experience, p.open_to_work, p.created_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobRow {
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
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompanyRow {
	pub id: Uuid,
	pub name: String,
	pub industry: Option<String>,
	pub size: Option<String>,
	pub location: Option<String>,
	pub tech_stack: Vec<String>,
	pub employee_count: Option<i32>,
	pub founded_year: Option<i32>,
	pub description: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
	pub user_id: Uuid,
	pub full_name: String,
	pub headline: Option<String>,
	pub job_title: Option<String>,
	pub location: Option<String>,
	pub skills: Vec<String>,
	pub years_of_experience: Option<i32>,
	pub open_to_work: bool,
	pub created_at: OffsetDateTime,
}

/// Profile fields that describe what a user is looking for.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfilePreferences {
	pub user_id: Uuid,
	pub full_name: String,
	pub headline: Option<String>,
	pub bio: Option<String>,
	pub job_title: Option<String>,
	pub skills: Vec<String>,
	pub desired_roles: Vec<String>,
	pub preferred_locations: Vec<String>,
	pub years_of_experience: Option<i32>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DigestRecipient {
	pub user_id: Uuid,
	pub email: String,
	pub full_name: String,
}

/// Job owner and embedding, used when a job drives profile relevance.
#[derive(Debug, Clone)]
pub struct JobEmbedding {
	pub job_id: Uuid,
	pub company_id: Uuid,
	pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
	pub job_types: Vec<String>,
	pub locations: Vec<String>,
	pub industries: Vec<String>,
	pub skills: Vec<String>,
}
