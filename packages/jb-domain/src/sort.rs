use serde::{Deserialize, Serialize};

/// Sort key that asks for vector-similarity restriction instead of a column order.
pub const RELEVANCE: &str = "relevance";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	Asc,
	Desc,
}
impl SortOrder {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim() {
			value if value.eq_ignore_ascii_case("asc") => Some(Self::Asc),
			value if value.eq_ignore_ascii_case("desc") => Some(Self::Desc),
			_ => None,
		}
	}

	pub fn as_sql(self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}
}

/// Requested ordering as received. The key is only resolved against an entity's allow-list
/// when the query is built, so unknown keys never reach SQL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
	pub key: Option<String>,
	pub order: Option<SortOrder>,
}
impl SortSpec {
	pub fn parse(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
		let key = sort_by.map(str::trim).filter(|key| !key.is_empty()).map(str::to_string);
		let order = sort_order.and_then(SortOrder::parse);

		Self { key, order }
	}

	pub fn is_relevance(&self) -> bool {
		self.key.as_deref() == Some(RELEVANCE)
	}

	/// Column order when both a recognized key and an order were given.
	pub fn resolve<C>(&self) -> Option<(C, SortOrder)>
	where
		C: SortColumn,
	{
		if self.is_relevance() {
			return None;
		}

		let column = C::from_key(self.key.as_deref()?)?;

		Some((column, self.order?))
	}
}

pub trait SortColumn
where
	Self: Sized + Copy,
{
	fn from_key(key: &str) -> Option<Self>;

	fn column(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSort {
	CreatedAt,
	Title,
	SalaryMin,
	SalaryMax,
	ExperienceYears,
	Company,
	Location,
}
impl SortColumn for JobSort {
	fn from_key(key: &str) -> Option<Self> {
		match key {
			"createdAt" | "created_at" => Some(Self::CreatedAt),
			"title" => Some(Self::Title),
			"salaryMin" | "salary_min" => Some(Self::SalaryMin),
			"salaryMax" | "salary_max" => Some(Self::SalaryMax),
			"experienceYears" | "experience_years" => Some(Self::ExperienceYears),
			"company" | "companyName" | "company_name" => Some(Self::Company),
			"location" => Some(Self::Location),
			_ => None,
		}
	}

	fn column(self) -> &'static str {
		match self {
			Self::CreatedAt => "j.created_at",
			Self::Title => "j.title",
			Self::SalaryMin => "j.salary_min",
			Self::SalaryMax => "j.salary_max",
			Self::ExperienceYears => "j.experience_years",
			Self::Company => "j.company_name",
			Self::Location => "j.location",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanySort {
	CreatedAt,
	Name,
	EmployeeCount,
	FoundedYear,
}
impl SortColumn for CompanySort {
	fn from_key(key: &str) -> Option<Self> {
		match key {
			"createdAt" | "created_at" => Some(Self::CreatedAt),
			"name" => Some(Self::Name),
			"employeeCount" | "employee_count" => Some(Self::EmployeeCount),
			"foundedYear" | "founded_year" => Some(Self::FoundedYear),
			_ => None,
		}
	}

	fn column(self) -> &'static str {
		match self {
			Self::CreatedAt => "c.created_at",
			Self::Name => "c.name",
			Self::EmployeeCount => "c.employee_count",
			Self::FoundedYear => "c.founded_year",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSort {
	CreatedAt,
	FullName,
	YearsOfExperience,
}
impl SortColumn for ProfileSort {
	fn from_key(key: &str) -> Option<Self> {
		match key {
			"createdAt" | "created_at" => Some(Self::CreatedAt),
			"fullName" | "full_name" => Some(Self::FullName),
			"yearsOfExperience" | "years_of_experience" | "experience" =>
				Some(Self::YearsOfExperience),
			_ => None,
		}
	}

	fn column(self) -> &'static str {
		match self {
			Self::CreatedAt => "p.created_at",
			Self::FullName => "p.full_name",
			Self::YearsOfExperience => "p.years_of_experience",
		}
	}
}
