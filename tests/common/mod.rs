#![allow(dead_code)]

use std::{cell::Cell, time::Duration};

use sdgs_harvest::{
    ActionRecord, CsvTableStore, Fetcher, Harvester, Result, Table, TableStore,
    config::FetchConfig,
};
use wiremock::MockServer;

pub const LISTING_PATH: &str = "/partnerships/browse";

/// Three attempts, 10 ms apart, no jitter, 200 ms timeout.
pub fn fast_fetch_config() -> FetchConfig {
    FetchConfig::default()
        .with_retries(3)
        .with_delays(Duration::from_millis(10), Duration::ZERO)
        .with_timeout(Duration::from_millis(200))
}

pub fn fast_fetcher() -> Fetcher {
    Fetcher::new(fast_fetch_config()).expect("failed to build fetcher")
}

pub fn harvester<S: TableStore>(server: &MockServer, store: S) -> Harvester<S> {
    let listing = format!("{}{}", server.uri(), LISTING_PATH);
    Harvester::new(fast_fetcher(), store, &listing).expect("failed to build harvester")
}

/// Listing page whose rows link to `hrefs`.
pub fn listing_html(hrefs: &[&str]) -> String {
    let rows: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<div class="views-row"><div class="views-field">
                   <span class="field-content"><a href="{href}">Action</a></span>
                   </div></div>"#
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html><html><body>
           <div class="view-content row">{rows}</div>
           </body></html>"#
    )
}

/// Detail page with every field present.
pub fn detail_html(id: u32) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><body>
  <h1 class="separator-bottom mt-5">Action {id}</h1>
  <div class="place"><h6>Initiator {id}</h6><h6>SDGAction{id}</h6></div>
  <div class="row">
    <h5>Type of initiative</h5>
    <div class="content">Partnership</div>
  </div>
  <h5>Timeline</h5>
  <div class="content">
    <div class="views-field views-field-field-start-date"><div class="field-content">2020</div></div>
    <div class="views-field views-field-field-date-of-completion"><div class="field-content">2030</div></div>
  </div>
  <div class="views-field views-field-field-location"><div class="field-content">Global</div></div>
  <span class="good-practices-goal-wrapper"><a href="/goals/goal{id}">{id}</a></span>
  <h5>Region</h5>
  <div class="content"><ul><li class="list-group-item">Africa</li></ul></div>
  <h5>Countries</h5>
  <div class="content-block"><span class="field-content">Kenya</span><span class="field-content">Chad</span></div>
</body></html>"#
    )
}

/// Store wrapper that counts saves.
pub struct CountingStore<S = CsvTableStore> {
    pub inner: S,
    saves: Cell<usize>,
}

impl<S: TableStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            saves: Cell::new(0),
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.get()
    }

    pub fn records(&self) -> Vec<ActionRecord> {
        self.inner
            .load()
            .expect("table should load")
            .records()
            .expect("rows should parse")
    }
}

impl<S: TableStore> TableStore for CountingStore<S> {
    fn load(&self) -> Result<Table> {
        self.inner.load()
    }

    fn append_and_save(&self, table: &mut Table, records: Vec<ActionRecord>) -> Result<()> {
        self.saves.set(self.saves.get() + 1);
        self.inner.append_and_save(table, records)
    }
}
