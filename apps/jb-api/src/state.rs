use std::sync::Arc;

use jb_service::{FilterOptionsCache, JobBoardService};
use jb_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<JobBoardService>,
	pub filters: Arc<FilterOptionsCache>,
}
impl AppState {
	pub async fn new(config: jb_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.storage.embedding_dim).await?;

		Ok(Self::from_service(JobBoardService::new(config, db)))
	}

	pub fn from_service(service: JobBoardService) -> Self {
		let filters = Arc::new(service.filter_options_cache());

		Self { service: Arc::new(service), filters }
	}
}
