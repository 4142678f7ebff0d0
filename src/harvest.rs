use scraper::Html;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::{
    error::{HarvestError, Result},
    extract::extract,
    fetch::Fetcher,
    links::{enumerate_links, listing_url},
    record::ActionRecord,
    store::TableStore,
};

/// What a completed page contributed to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub page: u32,
    pub links: usize,
    pub appended: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub pages: Vec<PageReport>,
    pub rows_appended: usize,
    pub links_skipped: usize,
    /// Page whose listing could not be fetched, ending a range scan.
    pub stopped_at: Option<u32>,
}

impl RunSummary {
    fn record(&mut self, report: PageReport) {
        self.rows_appended += report.appended;
        self.links_skipped += report.skipped;
        self.pages.push(report);
    }
}

/// Drives listing pages through fetch, link enumeration, extraction and
/// persistence, one page at a time.
pub struct Harvester<S> {
    fetcher: Fetcher,
    store: S,
    listing_base: Url,
}

impl<S: TableStore> Harvester<S> {
    pub fn new(fetcher: Fetcher, store: S, listing_url: &str) -> Result<Self> {
        let listing_base =
            Url::parse(listing_url).map_err(|e| HarvestError::invalid_url(listing_url, e))?;
        Ok(Self {
            fetcher,
            store,
            listing_base,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Range scan over `start..=end`. An unavailable listing page stops the
    /// whole run; pages saved so far stay saved.
    pub async fn run_range(&self, start: u32, end: u32) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for page in start..=end {
            match self.harvest_page(page).await? {
                Some(report) => summary.record(report),
                None => {
                    warn!(page, "listing unavailable, stopping run");
                    summary.stopped_at = Some(page);
                    break;
                }
            }
        }
        Ok(summary)
    }

    /// Re-scan an explicit list of pages. There is no skip-ahead here: an
    /// unavailable listing page fails the run.
    pub async fn run_pages(&self, pages: &[u32]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for &page in pages {
            let report = self
                .harvest_page(page)
                .await?
                .ok_or(HarvestError::ListingUnavailable { page })?;
            summary.record(report);
        }
        Ok(summary)
    }

    /// Process one listing page and save once. `None` when the listing page
    /// itself could not be fetched; nothing is written then.
    pub async fn harvest_page(&self, page: u32) -> Result<Option<PageReport>> {
        let url = listing_url(&self.listing_base, page);
        let Some(body) = self.fetcher.fetch_html(&url).await else {
            return Ok(None);
        };

        let mut table = self.store.load()?;
        info!(page, %url, "processing page");

        let links = enumerate_links(&Html::parse_document(&body), &url);

        let mut records = Vec::with_capacity(links.len());
        let mut skipped = 0usize;
        for link in &links {
            match self.harvest_action(link, page).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(page, url = %link, error = %e, "error processing action");
                    skipped += 1;
                }
            }
        }

        let report = PageReport {
            page,
            links: links.len(),
            appended: records.len(),
            skipped,
        };
        self.store.append_and_save(&mut table, records)?;
        info!(
            page,
            appended = report.appended,
            skipped = report.skipped,
            total_rows = table.len(),
            "page saved"
        );
        Ok(Some(report))
    }

    async fn harvest_action(&self, url: &Url, page: u32) -> Result<ActionRecord> {
        let doc = self
            .fetcher
            .fetch(url)
            .await
            .ok_or_else(|| HarvestError::DetailUnavailable {
                url: url.to_string(),
            })?;
        let mut record = extract(&doc);
        record.page = page;
        Ok(record)
    }
}
