use serde::Serialize;
use serde_json::Value;

use jb_config::LlmProviderConfig;
use jb_domain::rerank::RerankDecision;

use crate::{Error, Result};

const SYSTEM_PROMPT: &str = "You rank job postings for one candidate. \
You receive the candidate's preferences and a list of jobs, each with an id. \
Return every job id exactly once: in reranked_ids ordered from most to least relevant, \
or in filtered_out_ids when the job clearly does not fit the candidate. \
Only use ids from the input.";

/// Matching-relevant slice of a job sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct RerankCandidate {
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub requirements: String,
	#[serde(default)]
	pub location: Option<String>,
	#[serde(default)]
	pub salary: Option<String>,
}

pub async fn rerank(
	cfg: &LlmProviderConfig,
	profile: &str,
	items: &[RerankCandidate],
) -> Result<RerankDecision> {
	let client = crate::client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = request_body(cfg, profile, items);
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_rerank_response(json)
}

fn request_body(cfg: &LlmProviderConfig, profile: &str, items: &[RerankCandidate]) -> Value {
	let user_content = serde_json::json!({ "candidate": profile, "jobs": items }).to_string();

	serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [
			{ "role": "system", "content": SYSTEM_PROMPT },
			{ "role": "user", "content": user_content },
		],
		"response_format": {
			"type": "json_schema",
			"json_schema": {
				"name": "rerank_decision",
				"strict": true,
				"schema": {
					"type": "object",
					"properties": {
						"reranked_ids": { "type": "array", "items": { "type": "string" } },
						"filtered_out_ids": { "type": "array", "items": { "type": "string" } },
					},
					"required": ["reranked_ids", "filtered_out_ids"],
					"additionalProperties": false,
				},
			},
		},
	})
}

fn parse_rerank_response(json: Value) -> Result<RerankDecision> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Rerank response is missing message content.".to_string(),
		})?;

	serde_json::from_str(content).map_err(|err| Error::InvalidResponse {
		message: format!("Rerank content does not match the decision schema: {err}."),
	})
}
