use clap::Parser;
use sdgs_harvest::cli::{self, PatchArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = PatchArgs::parse();
    cli::init_tracing(args.common.log_level());
    cli::patch(args).await?;
    Ok(())
}
