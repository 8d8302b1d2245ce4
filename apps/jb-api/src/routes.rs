use std::collections::HashMap;

use axum::{
	Json, Router,
	extract::{FromRequestParts, Query, Request, State, rejection::JsonRejection},
	http::{StatusCode, header::AUTHORIZATION, request::Parts},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use uuid::Uuid;

use crate::state::AppState;
use jb_domain::{
	criteria::{CompanyCriteria, JobCriteria, ProfileCriteria},
	params::QueryParams,
};
use jb_service::{
	CompanyItem, Error, FilterOptionsResponse, JobItem, ProfileItem, RerankRequest,
	RerankResponse, ResultPage,
};

/// Header carrying the signed-in user id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

pub fn router(state: AppState) -> Router {
	let api = Router::new()
		.route("/v1/jobs", get(list_jobs))
		.route("/v1/jobs/filters", get(job_filters))
		.route("/v1/companies", get(list_companies))
		.route("/v1/profiles", get(list_profiles))
		.route("/v1/rerank", post(rerank))
		.route_layer(middleware::from_fn_with_state(state.clone(), require_api_token));

	Router::new().route("/health", get(health)).merge(api).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_jobs(
	State(state): State<AppState>,
	Caller(caller): Caller,
	Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ResultPage<JobItem>>, ApiError> {
	let criteria = JobCriteria::from_params(&QueryParams::new(params), &state.service.cfg.search);
	let response = state.service.list_jobs(caller, &criteria).await?;

	Ok(Json(response))
}

async fn job_filters(
	State(state): State<AppState>,
) -> Result<Json<FilterOptionsResponse>, ApiError> {
	let response = state.service.job_filter_options(&state.filters).await?;

	Ok(Json(response))
}

async fn list_companies(
	State(state): State<AppState>,
	Caller(caller): Caller,
	Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ResultPage<CompanyItem>>, ApiError> {
	let criteria =
		CompanyCriteria::from_params(&QueryParams::new(params), &state.service.cfg.search);
	let response = state.service.list_companies(caller, &criteria).await?;

	Ok(Json(response))
}

async fn list_profiles(
	State(state): State<AppState>,
	Caller(caller): Caller,
	Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ResultPage<ProfileItem>>, ApiError> {
	let criteria =
		ProfileCriteria::from_params(&QueryParams::new(params), &state.service.cfg.search);
	let response = state.service.list_profiles(caller, &criteria).await?;

	Ok(Json(response))
}

async fn rerank(
	State(state): State<AppState>,
	Caller(caller): Caller,
	payload: Result<Json<RerankRequest>, JsonRejection>,
) -> Result<Json<RerankResponse>, ApiError> {
	let Some(user_id) = caller else {
		return Err(Error::Unauthorized { message: "Sign in to rerank jobs.".to_string() }.into());
	};
	let Json(payload) = payload.map_err(|rejection| {
		json_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text())
	})?;
	let response = state.service.rerank(user_id, payload).await?;

	Ok(Json(response))
}

async fn require_api_token(
	State(state): State<AppState>,
	req: Request,
	next: Next,
) -> Result<Response, ApiError> {
	if let Some(expected) = state.service.cfg.security.api_auth_token.as_deref() {
		let presented = req
			.headers()
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.strip_prefix("Bearer "));

		if presented != Some(expected) {
			return Err(json_error(
				StatusCode::UNAUTHORIZED,
				"unauthorized",
				"A valid bearer token is required.",
			));
		}
	}

	Ok(next.run(req).await)
}

/// Signed-in user taken from [`USER_ID_HEADER`]; `None` for anonymous requests.
pub struct Caller(pub Option<Uuid>);
impl<S> FromRequestParts<S> for Caller
where
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let Some(value) = parts.headers.get(USER_ID_HEADER) else {
			return Ok(Self(None));
		};
		let user_id = value
			.to_str()
			.ok()
			.and_then(|raw| Uuid::parse_str(raw.trim()).ok())
			.ok_or_else(|| {
				json_error(
					StatusCode::BAD_REQUEST,
					"invalid_request",
					format!("{USER_ID_HEADER} must be a UUID."),
				)
			})?;

		Ok(Self(Some(user_id)))
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: String,
	error_code: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message),
			Error::Unauthorized { message } =>
				json_error(StatusCode::UNAUTHORIZED, "unauthorized", message),
			Error::Forbidden { message } => json_error(StatusCode::FORBIDDEN, "forbidden", message),
			Error::NotFound { message } => json_error(StatusCode::NOT_FOUND, "not_found", message),
			Error::QuotaExceeded { message } =>
				json_error(StatusCode::TOO_MANY_REQUESTS, "quota_exceeded", message),
			Error::VectorSearch { message } => {
				tracing::error!(error = %message, "Similarity search failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"vector_search_failed",
					"Similarity search failed.",
				)
			},
			Error::Storage { message } => {
				tracing::error!(error = %message, "Storage request failed.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "Storage request failed.")
			},
			Error::Provider { message } => {
				tracing::error!(error = %message, "Rerank provider request failed.");

				json_error(StatusCode::BAD_GATEWAY, "provider_error", "Rerank provider request failed.")
			},
			Error::InvalidModelOutput { message } => {
				tracing::warn!(error = %message, "Rerank model returned unusable output.");

				json_error(
					StatusCode::BAD_GATEWAY,
					"invalid_model_output",
					"Rerank model returned an invalid response.",
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error: self.message, error_code: self.error_code };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}
