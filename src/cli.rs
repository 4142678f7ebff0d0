use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser};
use tracing::{info, warn};
use tracing_subscriber::{filter::LevelFilter, fmt};
use url::Url;

use crate::{
    config::{
        BASE_DELAY_MS, DEFAULT_END_PAGE, DEFAULT_START_PAGE, FETCH_RETRIES, FetchConfig,
        HarvestConfig, JITTER_MS, LISTING_URL, OUTPUT_FILE, PATCH_PAGES, ProxyConfig,
        REQUEST_TIMEOUT_SECS,
    },
    error::HarvestError,
    fetch::Fetcher,
    harvest::{Harvester, RunSummary},
    store::FileStore,
};

/// Flags shared by both entry points. Every default is the compiled-in
/// constant, so a bare invocation needs no flags.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Output table, read and rewritten after every page (.csv for CSV, otherwise xlsx)
    #[arg(short, long, default_value = OUTPUT_FILE)]
    pub output: PathBuf,

    /// Listing endpoint, without the page parameter
    #[arg(long, default_value = LISTING_URL)]
    pub listing_url: String,

    /// Attempts per request
    #[arg(long, default_value_t = FETCH_RETRIES)]
    pub retries: u32,

    /// Base delay before every request, in milliseconds
    #[arg(long, default_value_t = BASE_DELAY_MS)]
    pub delay_ms: u64,

    /// Upper bound of the random extra delay, in milliseconds
    #[arg(long, default_value_t = JITTER_MS)]
    pub jitter_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Proxy for plain HTTP requests
    #[arg(long, env = "HTTP_PROXY")]
    pub http_proxy: Option<String>,

    /// Proxy for HTTPS requests
    #[arg(long, env = "HTTPS_PROXY")]
    pub https_proxy: Option<String>,

    /// Skip the robots.txt check
    #[arg(long)]
    pub ignore_robots: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl CommonArgs {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::WARN;
        }
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::default()
            .with_retries(self.retries)
            .with_delays(
                Duration::from_millis(self.delay_ms),
                Duration::from_millis(self.jitter_ms),
            )
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_proxy(ProxyConfig {
                http: self.http_proxy.clone(),
                https: self.https_proxy.clone(),
            })
    }

    pub fn harvest_config(&self) -> HarvestConfig {
        HarvestConfig::default()
            .with_listing_url(&self.listing_url)
            .with_output(&self.output)
    }
}

/// Scan a contiguous range of listing pages.
#[derive(Debug, Parser)]
#[command(name = "sdgs-harvest", version, about)]
pub struct ScanArgs {
    /// First page (1-based)
    #[arg(long, default_value_t = DEFAULT_START_PAGE)]
    pub start: u32,

    /// Last page, inclusive
    #[arg(long, default_value_t = DEFAULT_END_PAGE)]
    pub end: u32,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Re-scan specific listing pages missed by an earlier range scan.
#[derive(Debug, Parser)]
#[command(name = "sdgs-patch", version, about)]
pub struct PatchArgs {
    /// Pages to process, in order
    #[arg(value_delimiter = ',', default_values_t = PATCH_PAGES.to_vec())]
    pub pages: Vec<u32>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn init_tracing(level: LevelFilter) {
    let subscriber = fmt().with_max_level(level).with_target(false).finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("Tracing subscriber already set; skipping re-initialization.");
    }
}

pub async fn scan(args: ScanArgs) -> Result<RunSummary> {
    if args.start > args.end {
        bail!("start page {} is after end page {}", args.start, args.end);
    }
    let harvester = build(&args.common).await?;
    info!(start = args.start, end = args.end, "range scan");
    let summary = harvester.run_range(args.start, args.end).await?;
    report(&summary)?;
    Ok(summary)
}

pub async fn patch(args: PatchArgs) -> Result<RunSummary> {
    let harvester = build(&args.common).await?;
    info!(pages = ?args.pages, "patch scan");
    let summary = harvester.run_pages(&args.pages).await?;
    report(&summary)?;
    Ok(summary)
}

async fn build(common: &CommonArgs) -> Result<Harvester<FileStore>> {
    let cfg = common.harvest_config();
    let fetcher = Fetcher::new(common.fetch_config()).context("building HTTP client")?;

    if common.ignore_robots {
        warn!("robots.txt check disabled");
    } else {
        let url = Url::parse(&cfg.listing_url).context("invalid listing url")?;
        if !fetcher.allowed_by_robots(&url).await {
            return Err(HarvestError::Disallowed {
                url: cfg.listing_url.clone(),
            }
            .into());
        }
    }

    let store = FileStore::for_path(&cfg.output);
    info!(output = %store.path().display(), "writing table");
    Harvester::new(fetcher, store, &cfg.listing_url).context("invalid listing url")
}

fn report(summary: &RunSummary) -> Result<()> {
    info!(
        pages = summary.pages.len(),
        rows = summary.rows_appended,
        skipped = summary.links_skipped,
        stopped_at = ?summary.stopped_at,
        "run finished"
    );
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}
