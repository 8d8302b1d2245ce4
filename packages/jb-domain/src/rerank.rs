use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Model reply for one rerank batch. Both lists are required and nothing else is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RerankDecision {
	pub reranked_ids: Vec<String>,
	pub filtered_out_ids: Vec<String>,
}

/// Final order after merging a decision against the batch that was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RerankOutcome {
	pub ranked_ids: Vec<String>,
	pub filtered_out_ids: Vec<String>,
}

/// Applies a decision to the batch ids.
///
/// - Repeated ids in `reranked_ids` keep their first position.
/// - An id listed in `filtered_out_ids` is excluded even if it was also ranked.
/// - Ids that were not part of the batch are dropped from both lists.
pub fn merge(batch_ids: &[String], decision: &RerankDecision) -> RerankOutcome {
	let batch: HashSet<&str> = batch_ids.iter().map(String::as_str).collect();
	let mut filtered = HashSet::new();
	let mut filtered_out_ids = Vec::new();

	for id in &decision.filtered_out_ids {
		if batch.contains(id.as_str()) && filtered.insert(id.as_str()) {
			filtered_out_ids.push(id.clone());
		}
	}

	let mut ranked = HashSet::new();
	let mut ranked_ids = Vec::new();

	for id in &decision.reranked_ids {
		if !batch.contains(id.as_str()) || filtered.contains(id.as_str()) {
			continue;
		}
		if ranked.insert(id.as_str()) {
			ranked_ids.push(id.clone());
		}
	}

	RerankOutcome { ranked_ids, filtered_out_ids }
}

/// Unranked input order, used when the model reply cannot be trusted.
pub fn fallback(batch_ids: &[String]) -> RerankOutcome {
	let mut seen = HashSet::new();
	let mut ranked_ids = Vec::with_capacity(batch_ids.len());

	for id in batch_ids {
		if seen.insert(id.as_str()) {
			ranked_ids.push(id.clone());
		}
	}

	RerankOutcome { ranked_ids, filtered_out_ids: Vec::new() }
}

/// Reorders `items` by the position of their id in `ranked_ids`; items not listed are removed.
pub fn order_by_ids<T, F>(items: Vec<T>, ranked_ids: &[String], id_of: F) -> Vec<T>
where
	F: Fn(&T) -> String,
{
	let mut slots: Vec<Option<T>> = Vec::new();

	slots.resize_with(ranked_ids.len(), || None);

	for item in items {
		let id = id_of(&item);

		if let Some(position) = ranked_ids.iter().position(|ranked| *ranked == id)
			&& slots[position].is_none()
		{
			slots[position] = Some(item);
		}
	}

	slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ids(values: &[&str]) -> Vec<String> {
		values.iter().map(|value| value.to_string()).collect()
	}

	#[test]
	fn drops_hallucinated_and_filtered_ids() {
		let decision = RerankDecision {
			reranked_ids: ids(&["B", "A", "D"]),
			filtered_out_ids: ids(&["C"]),
		};
		let outcome = merge(&ids(&["A", "B", "C"]), &decision);

		assert_eq!(outcome.ranked_ids, ids(&["B", "A"]));
		assert_eq!(outcome.filtered_out_ids, ids(&["C"]));
	}

	#[test]
	fn filtered_out_wins_over_ranked() {
		let decision =
			RerankDecision { reranked_ids: ids(&["A", "B"]), filtered_out_ids: ids(&["A"]) };
		let outcome = merge(&ids(&["A", "B"]), &decision);

		assert_eq!(outcome.ranked_ids, ids(&["B"]));
	}

	#[test]
	fn duplicate_ranked_ids_keep_first_position() {
		let decision = RerankDecision {
			reranked_ids: ids(&["C", "A", "C", "B", "A"]),
			filtered_out_ids: Vec::new(),
		};
		let outcome = merge(&ids(&["A", "B", "C"]), &decision);

		assert_eq!(outcome.ranked_ids, ids(&["C", "A", "B"]));
	}

	#[test]
	fn decision_rejects_unknown_fields() {
		let raw = serde_json::json!({
			"reranked_ids": ["A"],
			"filtered_out_ids": [],
			"reasoning": "A fits best."
		});

		assert!(serde_json::from_value::<RerankDecision>(raw).is_err());

		let missing = serde_json::json!({ "reranked_ids": ["A"] });

		assert!(serde_json::from_value::<RerankDecision>(missing).is_err());
	}

	#[test]
	fn fallback_keeps_input_order() {
		assert_eq!(fallback(&ids(&["C", "A", "C"])).ranked_ids, ids(&["C", "A"]));
	}

	#[test]
	fn orders_items_by_ranked_ids() {
		let items = vec![("A", 1), ("B", 2), ("C", 3)];
		let ordered = order_by_ids(items, &ids(&["C", "A"]), |item| item.0.to_string());

		assert_eq!(ordered, vec![("C", 3), ("A", 1)]);
	}
}
