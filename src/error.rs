use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = HarvestError> = std::result::Result<T, E>;

/// Errors surfaced by the harvester. Fetch failures never show up here; the
/// fetcher reports them as an absent document.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid proxy `{url}`: {source}")]
    Proxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("robots.txt disallows {url}")]
    Disallowed { url: String },
    #[error("listing page {page} unavailable")]
    ListingUnavailable { page: u32 },
    #[error("detail page unavailable: {url}")]
    DetailUnavailable { url: String },
    #[error("malformed row: {0}")]
    MalformedRow(String),
    #[error("table file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("table file {} is not valid CSV: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("table file {} is not a readable workbook: {source}", .path.display())]
    XlsxRead {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },
    #[error("failed to write workbook {}: {source}", .path.display())]
    XlsxWrite {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
    #[error("table file {} is corrupt: {message}", .path.display())]
    Corrupt { path: PathBuf, message: String },
}

impl HarvestError {
    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn xlsx_read(path: impl Into<PathBuf>, source: calamine::XlsxError) -> Self {
        Self::XlsxRead {
            path: path.into(),
            source,
        }
    }

    pub fn xlsx_write(path: impl Into<PathBuf>, source: rust_xlsxwriter::XlsxError) -> Self {
        Self::XlsxWrite {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            message: message.into(),
        }
    }
}
