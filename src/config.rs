use std::{path::PathBuf, time::Duration};

// -------------------------
// Compiled-in defaults
// -------------------------

pub const LISTING_URL: &str = "https://sdgs.un.org/partnerships/browse";
pub const OUTPUT_FILE: &str = "results.xlsx";

pub const DEFAULT_START_PAGE: u32 = 429;
pub const DEFAULT_END_PAGE: u32 = 450;

/// Pages skipped or failed during earlier range scans.
pub const PATCH_PAGES: &[u32] = &[234, 245, 428];

pub const FETCH_RETRIES: u32 = 3;
pub const BASE_DELAY_MS: u64 = 1000;
pub const JITTER_MS: u64 = 500;
pub const REQUEST_TIMEOUT_SECS: u64 = 25;

pub const ROBOTS_AGENT: &str = "Mozilla";

pub const DESKTOP_UAS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
];

// -------------------------
// Transport
// -------------------------

/// Forward proxies, one per scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxyConfig {
    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Total attempts per URL, not extra retries.
    pub retries: u32,
    pub base_delay: Duration,
    /// Upper bound (exclusive) of the random delay added before each attempt.
    pub jitter: Duration,
    pub timeout: Duration,
    pub proxy: ProxyConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retries: FETCH_RETRIES,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
            jitter: Duration::from_millis(JITTER_MS),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            proxy: ProxyConfig::default(),
        }
    }
}

impl FetchConfig {
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    pub fn with_delays(mut self, base_delay: Duration, jitter: Duration) -> Self {
        self.base_delay = base_delay;
        self.jitter = jitter;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = proxy;
        self
    }
}

// -------------------------
// Run
// -------------------------

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Listing endpoint without the `page` query parameter.
    pub listing_url: String,
    pub output: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            listing_url: LISTING_URL.to_string(),
            output: PathBuf::from(OUTPUT_FILE),
        }
    }
}

impl HarvestConfig {
    pub fn with_listing_url(mut self, listing_url: impl Into<String>) -> Self {
        self.listing_url = listing_url.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }
}
