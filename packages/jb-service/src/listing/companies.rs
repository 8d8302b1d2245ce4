use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	JobBoardService, Result,
	listing::{self, ResultPage, Scope, Select},
};
use jb_domain::{criteria::CompanyCriteria, sort::CompanySort};
use jb_storage::models::{COMPANY_COLUMNS, CompanyRow};

const DEFAULT_ORDER: &str = "c.created_at DESC, c.id ASC";
const SEARCH_COLUMNS: &[&str] = &["c.name", "c.description"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyItem {
	pub id: Uuid,
	pub name: String,
	pub industry: Option<String>,
	pub size: Option<String>,
	pub location: Option<String>,
	pub tech_stack: Vec<String>,
	pub employee_count: Option<i32>,
	pub founded_year: Option<i32>,
	pub description: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl From<CompanyRow> for CompanyItem {
	fn from(row: CompanyRow) -> Self {
		Self {
			id: row.id,
			name: row.name,
			industry: row.industry,
			size: row.size,
			location: row.location,
			tech_stack: row.tech_stack,
			employee_count: row.employee_count,
			founded_year: row.founded_year,
			description: row.description,
			created_at: row.created_at,
		}
	}
}

impl JobBoardService {
	pub async fn list_companies(
		&self,
		caller: Option<Uuid>,
		criteria: &CompanyCriteria,
	) -> Result<ResultPage<CompanyItem>> {
		let favorites_of = listing::favorites_scope(criteria.favorites_only, caller)?;
		let scope = Scope::new(favorites_of, None);
		let page = listing::fetch_page::<CompanyRow>(
			&self.db,
			"companies",
			build_query(criteria, &scope, Select::Count),
			build_query(criteria, &scope, Select::Page),
		)
		.await;

		Ok(page.map(CompanyItem::from))
	}
}

pub(crate) fn build_query(
	criteria: &CompanyCriteria,
	scope: &Scope,
	select: Select,
) -> QueryBuilder<'static, Postgres> {
	let mut builder = QueryBuilder::new("SELECT ");

	match select {
		Select::Count => builder.push("COUNT(*)"),
		Select::Page => builder.push(COMPANY_COLUMNS),
	};

	builder.push(" FROM companies c");

	if let Some(user_id) = scope.favorites_of {
		builder.push(" JOIN favorite_companies f ON f.company_id = c.id AND f.user_id = ");
		builder.push_bind(user_id);
	}

	builder.push(" WHERE TRUE");

	listing::push_any(&mut builder, "c.name", &criteria.names);
	listing::push_any(&mut builder, "c.industry", &criteria.industries);
	listing::push_any(&mut builder, "c.size", &criteria.sizes);
	listing::push_any(&mut builder, "c.location", &criteria.locations);
	listing::push_overlap(&mut builder, "c.tech_stack", &criteria.tech_stack);
	listing::push_search(&mut builder, SEARCH_COLUMNS, criteria.search.as_deref());

	if select == Select::Page {
		listing::push_order::<CompanySort>(&mut builder, &criteria.sort, DEFAULT_ORDER, "c.id ASC");
		listing::push_page(&mut builder, criteria.pagination);
	}

	builder
}
