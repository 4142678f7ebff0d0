use std::time::Duration;

use rand::{Rng, rng};
use reqwest::{
    Client, Proxy, StatusCode,
    header::{
        ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, DNT, HeaderMap, HeaderValue, PRAGMA,
        UPGRADE_INSECURE_REQUESTS, USER_AGENT,
    },
};
use robotstxt::DefaultMatcher;
use scraper::Html;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::{DESKTOP_UAS, FetchConfig, ROBOTS_AGENT},
    error::{HarvestError, Result},
};

/// Polite, retrying GET client. Every failure path yields `None`.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(8))
            .timeout(config.timeout)
            .no_proxy();

        if let Some(url) = &config.proxy.http {
            let proxy = Proxy::http(url).map_err(|source| HarvestError::Proxy {
                url: url.clone(),
                source,
            })?;
            builder = builder.proxy(proxy);
        }
        if let Some(url) = &config.proxy.https {
            let proxy = Proxy::https(url).map_err(|source| HarvestError::Proxy {
                url: url.clone(),
                source,
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(HarvestError::Client)?;
        Ok(Self { client, config })
    }

    /// Fetch and parse `url`.
    pub async fn fetch(&self, url: &Url) -> Option<Html> {
        self.fetch_html(url)
            .await
            .map(|body| Html::parse_document(&body))
    }

    /// Fetch the raw body of `url`. Transport errors retry up to the attempt
    /// budget; a non-200 status ends the call at once.
    pub async fn fetch_html(&self, url: &Url) -> Option<String> {
        let attempts = self.config.retries.max(1);

        for attempt in 1..=attempts {
            sleep(self.config.base_delay + self.jitter()).await;

            let result = self
                .client
                .get(url.as_str())
                .headers(base_headers())
                .send()
                .await;

            let err = match result {
                Ok(rsp) => {
                    let status = rsp.status();
                    if status != StatusCode::OK {
                        warn!(%url, status = status.as_u16(), "request failed");
                        return None;
                    }
                    match rsp.text().await {
                        Ok(body) => {
                            debug!(%url, attempt, len = body.len(), "fetched");
                            return Some(body);
                        }
                        Err(e) => e,
                    }
                }
                Err(e) => e,
            };

            warn!(%url, attempt, error = %err, "request failed");
            if attempt < attempts {
                info!(%url, retry = attempt, "retrying");
                sleep(self.config.base_delay).await;
            } else {
                warn!(%url, attempts, "giving up after max retries");
            }
        }

        None
    }

    /// Check `url` against its host's robots.txt. An unreachable robots file
    /// counts as empty, which allows everything.
    pub async fn allowed_by_robots(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let robots_url = format!("{}://{}/robots.txt", url.scheme(), authority);

        let robots_txt = match self.client.get(&robots_url).send().await {
            Ok(rsp) if rsp.status().is_success() => rsp.text().await.unwrap_or_default(),
            Ok(_) => String::new(),
            Err(e) => {
                debug!(url = %robots_url, error = %e, "robots.txt unreachable");
                String::new()
            }
        };

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&robots_txt, ROBOTS_AGENT, url.as_str())
    }

    fn jitter(&self) -> Duration {
        let max = self.config.jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rng().random_range(0..max))
    }
}

fn base_headers() -> HeaderMap {
    let mut h = HeaderMap::new();
    if let Ok(ua) = HeaderValue::from_str(random_desktop_ua()) {
        h.insert(USER_AGENT, ua);
    }
    h.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    h.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));
    h.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    h.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    h.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    h.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    h.insert(DNT, HeaderValue::from_static("1"));
    h
}

fn random_desktop_ua() -> &'static str {
    DESKTOP_UAS[rng().random_range(0..DESKTOP_UAS.len())]
}
