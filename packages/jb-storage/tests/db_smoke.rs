use time::OffsetDateTime;
use uuid::Uuid;

use jb_config::Postgres;
use jb_storage::{db::Db, queries, vector};
use jb_testkit::TestDatabase;

async fn bootstrap(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(3).await.expect("Failed to ensure schema.");

	db
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set JB_PG_DSN to run."]
async fn db_connects_and_bootstraps_twice() {
	let Some(base_dsn) = jb_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps_twice; set JB_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	db.ensure_schema(3).await.expect("Schema bootstrap must be idempotent.");

	for table in ["companies", "jobs", "profiles", "favorite_jobs", "ai_usage"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "Missing table {table}.");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set JB_PG_DSN to run."]
async fn usage_counter_increments_by_one() {
	let Some(base_dsn) = jb_testkit::env_dsn() else {
		eprintln!("Skipping usage_counter_increments_by_one; set JB_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let user_id = Uuid::new_v4();
	let now = OffsetDateTime::now_utc();

	assert_eq!(queries::usage_count(&db, user_id).await.expect("count failed"), 0);
	assert_eq!(queries::increment_usage(&db, user_id, now).await.expect("increment failed"), 1);
	assert_eq!(queries::increment_usage(&db, user_id, now).await.expect("increment failed"), 2);
	assert_eq!(queries::usage_count(&db, user_id).await.expect("count failed"), 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set JB_PG_DSN to run."]
async fn match_jobs_applies_threshold_and_order() {
	let Some(base_dsn) = jb_testkit::env_dsn() else {
		eprintln!("Skipping match_jobs_applies_threshold_and_order; set JB_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let company_id = Uuid::new_v4();

	sqlx::query("INSERT INTO companies (id, name) VALUES ($1, 'Acme')")
		.bind(company_id)
		.execute(&db.pool)
		.await
		.expect("Failed to insert company.");

	let close = Uuid::new_v4();
	let near = Uuid::new_v4();
	let far = Uuid::new_v4();

	for (id, embedding) in [(close, "[1,0,0]"), (near, "[1,1,0]"), (far, "[0,0,1]")] {
		sqlx::query(
			"INSERT INTO jobs (id, company_id, company_name, title, embedding) \
			 VALUES ($1, $2, 'Acme', 'Engineer', $3::text::vector)",
		)
		.bind(id)
		.bind(company_id)
		.bind(embedding)
		.execute(&db.pool)
		.await
		.expect("Failed to insert job.");
	}

	let matches =
		vector::match_jobs(&db, &[1.0, 0.0, 0.0], 0.5, 10).await.expect("match_jobs failed");
	let ids = matches.iter().map(|m| m.id).collect::<Vec<_>>();

	assert_eq!(ids, vec![close, near]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
