pub mod error;
pub mod worker;

pub use error::{Error, Result};

use std::sync::Arc;

use clap::Parser;

use jb_cli::ConfigArg;
use jb_service::JobBoardService;
use jb_storage::db::Db;

use crate::worker::Schedule;

#[derive(Debug, Parser)]
#[command(
	version = jb_cli::VERSION,
	rename_all = "kebab",
	styles = jb_cli::styles(),
)]
pub struct Args {
	#[command(flatten)]
	pub config: ConfigArg,
	/// Send one digest round and exit instead of repeating on `digest.interval_secs`.
	#[arg(long)]
	pub once: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = jb_config::load(&args.config.config)?;

	jb_cli::init_tracing(&config.service.log_level);

	let schedule = Schedule::new(args.once, config.digest.interval_secs);
	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(config.storage.embedding_dim).await?;

	let service = Arc::new(JobBoardService::new(config, db));

	worker::run_worker(service, schedule).await?;

	Ok(())
}
