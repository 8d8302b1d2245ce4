pub mod routes;
pub mod state;

use std::net::SocketAddr;

use clap::Parser;
use color_eyre::eyre;
use tokio::net::TcpListener;

use crate::state::AppState;
use jb_cli::ConfigArg;

#[derive(Debug, Parser)]
#[command(
	version = jb_cli::VERSION,
	rename_all = "kebab",
	styles = jb_cli::styles(),
)]
pub struct Args {
	#[command(flatten)]
	pub config: ConfigArg,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = jb_config::load(&args.config.config)?;

	jb_cli::init_tracing(&config.service.log_level);

	let http_addr: SocketAddr = config.service.http_bind.parse()?;

	if config.security.bind_localhost_only && !http_addr.ip().is_loopback() {
		return Err(eyre::eyre!(
			"http_bind must be a loopback address when bind_localhost_only is true."
		));
	}

	let state = AppState::new(config).await?;
	let app = routes::router(state);
	let listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, "HTTP server listening.");

	axum::serve(listener, app).await?;

	Ok(())
}
