use std::{collections::HashMap, str::FromStr};

/// Separator used by multi-select query parameters, e.g. `location=Berlin|Remote`.
pub const MULTI_VALUE_SEPARATOR: char = '|';

/// Raw query-string parameters as received by a listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
	values: HashMap<String, String>,
}
impl QueryParams {
	pub fn new(values: HashMap<String, String>) -> Self {
		Self { values }
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.values.get(key).map(String::as_str)
	}

	pub fn multi(&self, key: &str) -> Vec<String> {
		split_multi(self.get(key))
	}

	pub fn number<T>(&self, key: &str) -> Option<T>
	where
		T: FromStr,
	{
		parse_number(self.get(key))
	}

	pub fn flag(&self, key: &str) -> bool {
		parse_flag(self.get(key))
	}

	/// Trimmed non-empty text value.
	pub fn text(&self, key: &str) -> Option<String> {
		self.get(key).map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
	}
}
impl<K, V> FromIterator<(K, V)> for QueryParams
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self { values: iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect() }
	}
}

pub fn split_multi(raw: Option<&str>) -> Vec<String> {
	let Some(raw) = raw else {
		return Vec::new();
	};

	raw.split(MULTI_VALUE_SEPARATOR)
		.map(str::trim)
		.filter(|token| !token.is_empty())
		.map(str::to_string)
		.collect()
}

/// Missing or unparsable input leaves the constraint absent.
pub fn parse_number<T>(raw: Option<&str>) -> Option<T>
where
	T: FromStr,
{
	raw.map(str::trim).filter(|value| !value.is_empty()).and_then(|value| value.parse().ok())
}

/// Only the literal `"true"` enables a boolean facet.
pub fn parse_flag(raw: Option<&str>) -> bool {
	raw == Some("true")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_trims_and_drops_empty_tokens() {
		assert_eq!(split_multi(Some("a| b ||c")), vec!["a", "b", "c"]);
		assert_eq!(split_multi(Some(" | |")), Vec::<String>::new());
		assert_eq!(split_multi(None), Vec::<String>::new());
	}

	#[test]
	fn numbers_parse_or_stay_absent() {
		assert_eq!(parse_number::<i64>(Some(" 120000 ")), Some(120_000));
		assert_eq!(parse_number::<i64>(Some("lots")), None);
		assert_eq!(parse_number::<i64>(Some("")), None);
		assert_eq!(parse_number::<i64>(None), None);
	}

	#[test]
	fn only_literal_true_is_true() {
		assert!(parse_flag(Some("true")));
		assert!(!parse_flag(Some("TRUE")));
		assert!(!parse_flag(Some("1")));
		assert!(!parse_flag(Some("yes")));
		assert!(!parse_flag(None));
	}
}
