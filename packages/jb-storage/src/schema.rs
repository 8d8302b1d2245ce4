pub fn render_schema(vector_dim: u32) -> String {
	let init = include_str!("../../../sql/init.sql");
	let expanded = expand_includes(init);

	expanded.replace("<VECTOR_DIM>", &vector_dim.to_string())
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"00_extensions.sql" => out.push_str(include_str!("../../../sql/00_extensions.sql")),
				"tables/001_companies.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_companies.sql")),
				"tables/002_jobs.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_jobs.sql")),
				"tables/003_profiles.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_profiles.sql")),
				"tables/004_company_members.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_company_members.sql")),
				"tables/005_favorite_jobs.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_favorite_jobs.sql")),
				"tables/006_favorite_companies.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_favorite_companies.sql")),
				"tables/007_ai_usage.sql" =>
					out.push_str(include_str!("../../../sql/tables/007_ai_usage.sql")),
				"functions/001_match_jobs.sql" =>
					out.push_str(include_str!("../../../sql/functions/001_match_jobs.sql")),
				"functions/002_match_profiles.sql" =>
					out.push_str(include_str!("../../../sql/functions/002_match_profiles.sql")),
				_ => {},
			}

			out.push('\n');

			continue;
		}

		out.push_str(line);
		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn expands_every_include_and_substitutes_dimension() {
		let sql = render_schema(1_536);

		assert!(!sql.contains("\\ir "));
		assert!(!sql.contains("<VECTOR_DIM>"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS jobs"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS ai_usage"));
		assert!(sql.contains("embedding vector(1536)"));
		assert!(sql.contains("CREATE OR REPLACE FUNCTION match_profiles"));
	}

	#[test]
	fn function_bodies_survive_statement_splitting() {
		let sql = render_schema(8);
		let function_statements = sql
			.split(';')
			.filter(|statement| statement.contains("CREATE OR REPLACE FUNCTION"))
			.collect::<Vec<_>>();

		assert_eq!(function_statements.len(), 2);

		for statement in function_statements {
			assert_eq!(statement.matches("$$").count(), 2, "Unbalanced body: {statement}");
		}
	}
}
