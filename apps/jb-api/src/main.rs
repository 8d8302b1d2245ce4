use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = jb_api::Args::parse();

	jb_api::run(args).await
}
