pub mod companies;
pub mod jobs;
pub mod profiles;

use serde::Serialize;
use sqlx::{Encode, Postgres, QueryBuilder, Type, postgres::PgRow};
use uuid::Uuid;

use crate::{Error, Result};
use jb_domain::{
	page::Pagination,
	sort::{SortColumn, SortSpec},
};
use jb_storage::{db::Db, vector::VectorMatch};

/// One page of listing results.
///
/// Database failures do not surface as `Err`; they produce an empty page whose `error` is set so
/// callers can render an empty state. The error text names the failed step only; driver detail
/// goes to the log. `count` is the number of rows matching the filters before pagination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage<T> {
	pub data: Vec<T>,
	pub count: i64,
	/// Similarity-ordered ids when the page was restricted by a relevance search.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub matched_ids: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}
impl<T> ResultPage<T> {
	pub fn new(data: Vec<T>, count: i64) -> Self {
		Self { data, count, matched_ids: None, error: None }
	}

	pub fn failed(context: &str, err: impl std::fmt::Display) -> Self {
		tracing::error!(error = %err, "{context}");

		Self { data: Vec::new(), count: 0, matched_ids: None, error: Some(context.to_string()) }
	}

	pub fn map<U, F>(self, f: F) -> ResultPage<U>
	where
		F: FnMut(T) -> U,
	{
		ResultPage {
			data: self.data.into_iter().map(f).collect(),
			count: self.count,
			matched_ids: self.matched_ids,
			error: self.error,
		}
	}

	pub fn with_matches(mut self, matches: Option<&[VectorMatch]>) -> Self {
		self.matched_ids = matches.map(|matches| matches.iter().map(|m| m.id.to_string()).collect());

		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Select {
	Count,
	Page,
}

/// Row restrictions that come from the caller rather than from the query string.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
	pub(crate) favorites_of: Option<Uuid>,
	pub(crate) restrict_ids: Option<Vec<Uuid>>,
}
impl Scope {
	pub(crate) fn new(favorites_of: Option<Uuid>, matches: Option<&[VectorMatch]>) -> Self {
		Self { favorites_of, restrict_ids: matches.map(|matches| matches.iter().map(|m| m.id).collect()) }
	}
}

pub(crate) fn favorites_scope(favorites_only: bool, caller: Option<Uuid>) -> Result<Option<Uuid>> {
	if !favorites_only {
		return Ok(None);
	}

	let Some(user_id) = caller else {
		return Err(Error::Unauthorized {
			message: "Sign in to list favorites.".to_string(),
		});
	};

	Ok(Some(user_id))
}

pub(crate) async fn fetch_page<R>(
	db: &Db,
	entity: &str,
	mut count: QueryBuilder<'static, Postgres>,
	mut page: QueryBuilder<'static, Postgres>,
) -> ResultPage<R>
where
	R: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
	let total = match count.build_query_scalar::<i64>().fetch_one(&db.pool).await {
		Ok(total) => total,
		Err(err) => return ResultPage::failed(&format!("Failed to count {entity}."), err),
	};

	match page.build_query_as::<R>().fetch_all(&db.pool).await {
		Ok(rows) => ResultPage::new(rows, total),
		Err(err) => ResultPage::failed(&format!("Failed to list {entity}."), err),
	}
}

pub(crate) fn push_any(
	builder: &mut QueryBuilder<'static, Postgres>,
	column: &str,
	values: &[String],
) {
	if values.is_empty() {
		return;
	}

	builder.push(" AND ");
	builder.push(column);
	builder.push(" = ANY(");
	builder.push_bind(values.to_vec());
	builder.push(")");
}

/// Array column shares at least one value with `values`.
pub(crate) fn push_overlap(
	builder: &mut QueryBuilder<'static, Postgres>,
	column: &str,
	values: &[String],
) {
	if values.is_empty() {
		return;
	}

	builder.push(" AND ");
	builder.push(column);
	builder.push(" && ");
	builder.push_bind(values.to_vec());
}

/// Array column contains every value in `values`.
pub(crate) fn push_contains_all(
	builder: &mut QueryBuilder<'static, Postgres>,
	column: &str,
	values: &[String],
) {
	if values.is_empty() {
		return;
	}

	builder.push(" AND ");
	builder.push(column);
	builder.push(" @> ");
	builder.push_bind(values.to_vec());
}

pub(crate) fn push_bound<T>(
	builder: &mut QueryBuilder<'static, Postgres>,
	column: &str,
	op: &str,
	value: Option<T>,
) where
	T: 'static + Encode<'static, Postgres> + Type<Postgres>,
{
	let Some(value) = value else {
		return;
	};

	builder.push(" AND ");
	builder.push(column);
	builder.push(" ");
	builder.push(op);
	builder.push(" ");
	builder.push_bind(value);
}

/// Case-insensitive substring match against any of `columns`.
pub(crate) fn push_search(
	builder: &mut QueryBuilder<'static, Postgres>,
	columns: &[&str],
	search: Option<&str>,
) {
	let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) else {
		return;
	};
	let pattern = format!("%{}%", escape_like(term));

	builder.push(" AND (");

	for (i, column) in columns.iter().enumerate() {
		if i > 0 {
			builder.push(" OR ");
		}

		builder.push(*column);
		builder.push(" ILIKE ");
		builder.push_bind(pattern.clone());
	}

	builder.push(")");
}

pub(crate) fn push_restrict(
	builder: &mut QueryBuilder<'static, Postgres>,
	column: &str,
	scope: &Scope,
) {
	let Some(ids) = &scope.restrict_ids else {
		return;
	};

	builder.push(" AND ");
	builder.push(column);
	builder.push(" = ANY(");
	builder.push_bind(ids.clone());
	builder.push(")");
}

/// Appends `ORDER BY` from an allow-listed column, or `default_order` when the sort is unset,
/// unknown, or lacks a direction. `tiebreak` keeps paging stable.
pub(crate) fn push_order<C>(
	builder: &mut QueryBuilder<'static, Postgres>,
	sort: &SortSpec,
	default_order: &str,
	tiebreak: &str,
) where
	C: SortColumn,
{
	builder.push(" ORDER BY ");

	match sort.resolve::<C>() {
		Some((column, order)) => {
			builder.push(column.column());
			builder.push(" ");
			builder.push(order.as_sql());
			builder.push(" NULLS LAST, ");
			builder.push(tiebreak);
		},
		None => {
			builder.push(default_order);
		},
	}
}

pub(crate) fn push_page(builder: &mut QueryBuilder<'static, Postgres>, pagination: Pagination) {
	let range = pagination.range();

	builder.push(" LIMIT ");
	builder.push_bind(range.limit());
	builder.push(" OFFSET ");
	builder.push_bind(range.offset());
}

fn escape_like(term: &str) -> String {
	let mut out = String::with_capacity(term.len());

	for ch in term.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out
}
