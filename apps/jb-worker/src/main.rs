use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = jb_worker::Args::parse();

	jb_worker::run(args).await
}
