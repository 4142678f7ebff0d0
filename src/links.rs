use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

static LISTING_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.view-content.row").unwrap());
static LISTING_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.views-row").unwrap());
static ROW_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.field-content").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Resolve the detail link of one listing row against the listing URL.
pub fn resolve_row_link(row: &ElementRef, base: &Url) -> Option<Url> {
    let Some(content) = row.select(&ROW_CONTENT).next() else {
        warn!("row has no span.field-content");
        return None;
    };

    let Some(href) = content
        .select(&ANCHOR)
        .next()
        .and_then(|a| a.value().attr("href"))
    else {
        warn!("row has no anchor with href");
        return None;
    };

    match base.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(href, error = %e, "unresolvable row link");
            None
        }
    }
}

/// Detail links of a listing page, in row order.
pub fn enumerate_links(listing: &Html, base: &Url) -> Vec<Url> {
    let Some(content) = listing.select(&LISTING_CONTENT).next() else {
        warn!(url = %base, "listing has no div.view-content.row");
        return Vec::new();
    };

    content
        .select(&LISTING_ROW)
        .filter_map(|row| resolve_row_link(&row, base))
        .collect()
}

/// Listing URL for a 1-based page number; the site counts pages from zero.
pub fn listing_url(base: &Url, page: u32) -> Url {
    let mut u = base.clone();
    let qp: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    u.query_pairs_mut()
        .clear()
        .extend_pairs(qp.iter().map(|(k, v)| (&**k, &**v)))
        .append_pair("page", &page.saturating_sub(1).to_string());
    u
}
