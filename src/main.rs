use clap::Parser;
use sdgs_harvest::cli::{self, ScanArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ScanArgs::parse();
    cli::init_tracing(args.common.log_level());
    cli::scan(args).await?;
    Ok(())
}
