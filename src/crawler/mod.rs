pub mod scope;


use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use ureq::Agent;
use url::Url;

use self::scope::{ScopePolicy, resolve_link, should_follow};
use crate::SiteQaError;
use crate::extractor;

/// Configuration for the frontier crawler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrawlerConfig {
    /// User agent string to use for requests.
    pub user_agent: String,
    /// Timeout for HTTP requests in seconds.
    pub timeout_seconds: u64,
    /// Politeness delay between successive page fetches in milliseconds.
    pub fetch_delay_ms: u64,
    /// Hard cap on pages fetched in one crawl session.
    pub max_pages: usize,
    /// Maximum number of retry attempts for retryable errors.
    pub max_retries: u32,
    /// Delay between retry attempts in seconds.
    pub retry_delay_seconds: u64,
    /// Link admission policy for the frontier.
    pub scope: ScopePolicy,
}

impl Default for CrawlerConfig {
    #[inline]
    fn default() -> Self {
        Self {
            user_agent: "siteqa/0.1.0 (Site Indexer)".to_string(),
            timeout_seconds: 30,
            fetch_delay_ms: 500,
            max_pages: 50,
            max_retries: 2,
            retry_delay_seconds: 5,
            scope: ScopePolicy::default(),
        }
    }
}

/// HTTP client wrapper with rate limiting and retry logic.
#[derive(Debug)]
pub struct HttpClient {
    agent: Agent,
    config: CrawlerConfig,
    last_request_time: Option<Instant>,
}

impl HttpClient {
    #[inline]
    pub fn new(config: CrawlerConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .user_agent(&config.user_agent)
            .build()
            .into();

        Self {
            agent,
            config,
            last_request_time: None,
        }
    }

    /// Perform an HTTP GET request with rate limiting and retry logic.
    #[inline]
    pub async fn get(&mut self, url: &str) -> Result<String> {
        self.apply_rate_limit().await;

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!("Retrying request to {} (attempt {})", url, attempt + 1);
                sleep(Duration::from_secs(self.config.retry_delay_seconds)).await;
            }

            match self.try_get(url) {
                Ok(response) => {
                    debug!("Successfully fetched {} (attempt {})", url, attempt + 1);
                    return Ok(response);
                }
                Err(e) if is_retryable_error(&e) && attempt < self.config.max_retries => {
                    warn!("Retryable error for {}: {}", url, e);
                    last_error = Some(e);
                }
                Err(e) => {
                    debug!("Non-retryable error for {}: {}", url, e);
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("All retry attempts failed")))
    }

    /// Honor the politeness delay between successive fetches.
    async fn apply_rate_limit(&mut self) {
        if let Some(last_time) = self.last_request_time {
            let elapsed = last_time.elapsed();
            let delay = Duration::from_millis(self.config.fetch_delay_ms);

            if elapsed < delay {
                let sleep_duration = delay - elapsed;
                debug!("Rate limiting: sleeping for {:?}", sleep_duration);
                sleep(sleep_duration).await;
            }
        }

        self.last_request_time = Some(Instant::now());
    }

    fn try_get(&self, url: &str) -> Result<String> {
        debug!("Making HTTP GET request to: {}", url);

        match self.agent.get(url).call() {
            Ok(mut response) => {
                let text = response
                    .body_mut()
                    .read_to_string()
                    .with_context(|| format!("Failed to read response body from {}", url))?;
                debug!("Successfully read {} bytes from {}", text.len(), url);
                Ok(text)
            }
            Err(ureq::Error::StatusCode(code)) => Err(anyhow!("HTTP error {}", code)),
            Err(e) => Err(anyhow::Error::from(e))
                .with_context(|| format!("Failed to make HTTP request to {}", url)),
        }
    }
}

impl Default for HttpClient {
    #[inline]
    fn default() -> Self {
        Self::new(CrawlerConfig::default())
    }
}

/// Check if an error is retryable (network timeouts, 5xx errors, 429).
fn is_retryable_error(error: &anyhow::Error) -> bool {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("timeout")
        || error_str.contains("connection")
        || error_str.contains("network")
    {
        return true;
    }

    if error_str.contains("http error 5") {
        return true;
    }

    if error_str.contains("http error 429") {
        return true;
    }

    false
}

/// Validate and normalize a seed URL.
#[inline]
pub fn validate_url(url_str: &str) -> crate::Result<Url> {
    let url = Url::parse(url_str)
        .map_err(|e| SiteQaError::Input(format!("Invalid URL '{}': {}", url_str, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(SiteQaError::Input(format!(
            "URL must use HTTP or HTTPS scheme: {}",
            url_str
        )));
    }

    if url.host_str().is_none() {
        return Err(SiteQaError::Input(format!(
            "URL must have a valid host: {}",
            url_str
        )));
    }

    Ok(url)
}

/// One fetched page: its URL and the normalized plain text (possibly empty).
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub url: Url,
    pub text: String,
}

/// Breadth-first crawler bounded by origin, path descent, and a page cap.
pub struct FrontierCrawler {
    client: HttpClient,
    config: CrawlerConfig,
}

impl FrontierCrawler {
    #[inline]
    pub fn new(config: CrawlerConfig) -> Self {
        let client = HttpClient::new(config.clone());
        Self { client, config }
    }

    /// Crawl from `seed`, returning pages in fetch order.
    ///
    /// Individual fetch or parse failures are logged and skipped; the crawl
    /// as a whole fails only when no visited page yields any text.
    #[inline]
    pub async fn crawl(&mut self, seed: &Url) -> crate::Result<Vec<PageRecord>> {
        let mut seed = seed.clone();
        seed.set_fragment(None);

        info!("Starting crawl from {}", seed);

        let mut frontier: VecDeque<Url> = VecDeque::new();
        let mut enqueued: HashSet<String> = HashSet::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut pages: Vec<PageRecord> = Vec::new();

        frontier.push_back(seed.clone());
        enqueued.insert(seed.as_str().to_string());

        let bar = if console::user_attended_stderr() {
            ProgressBar::new_spinner().with_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] Crawling {msg}")
                    .expect("style template is valid"),
            )
        } else {
            ProgressBar::hidden()
        };
        bar.set_length(1);

        while let Some(url) = frontier.pop_front() {
            if visited.len() >= self.config.max_pages {
                info!(
                    "Page cap of {} reached, stopping crawl",
                    self.config.max_pages
                );
                break;
            }
            visited.insert(url.as_str().to_string());

            bar.set_message(url.to_string());
            let html = match self.client.get(url.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    bar.set_position(visited.len() as u64);
                    continue;
                }
            };

            let text = extractor::normalize(&html);
            debug!("Visited {} ({} chars of text)", url, text.chars().count());

            for link in extract_content_links(&html, &url) {
                if !should_follow(&self.config.scope, &seed, &url, &link) {
                    continue;
                }
                let key = link.as_str().to_string();
                if enqueued.contains(&key) {
                    continue;
                }
                enqueued.insert(key);
                frontier.push_back(link);
                bar.set_length(enqueued.len() as u64);
            }

            pages.push(PageRecord {
                url: url.clone(),
                text,
            });
            bar.set_position(visited.len() as u64);
        }

        bar.finish_and_clear();

        info!(
            "Crawl of {} finished: {} pages fetched, {} URLs discovered",
            seed,
            pages.len(),
            enqueued.len()
        );

        if pages.iter().all(|p| p.text.trim().is_empty()) {
            return Err(SiteQaError::NoContent(format!(
                "Crawl of {} produced no text",
                seed
            )));
        }

        Ok(pages)
    }
}

/// Extract candidate links from the page's content region only, so frontier
/// growth never comes from navigation or footer boilerplate.
#[inline]
pub fn extract_content_links(html: &str, page_url: &Url) -> Vec<Url> {
    let fragment = extractor::content_fragment(html);
    let link_selector = Selector::parse("a[href]").expect("valid selector");

    let mut links = Vec::new();
    let mut seen = HashSet::new();

    for element in fragment.select(&link_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_link(page_url, href) else {
            continue;
        };
        if seen.insert(resolved.as_str().to_string()) {
            links.push(resolved);
        }
    }

    debug!("Extracted {} candidate links from {}", links.len(), page_url);
    links
}
