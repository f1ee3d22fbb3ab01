//! Thin wrapper around one WebDriver session. No heuristics live here; the
//! contract upward is "navigate, let the page settle, hand back a snapshot".

use std::time::{Duration, Instant};

use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::BrowserConfig;
use crate::constants::{PROBE_BUTTON_SELECTOR, PROBE_KEYWORDS};
use crate::error::{Result, ScraperError};
use crate::types::PageSnapshot;

const SETTLE_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);
/// Identical length samples in a row before the page counts as settled.
const SETTLE_STABLE_SAMPLES: u32 = 3;

const PAGE_PROPS_SCRIPT: &str = "return { title: document.title, \
     lastModified: document.lastModified, \
     contentLength: document.documentElement.innerHTML.length };";

const PAGE_LENGTH_SCRIPT: &str = "return document.documentElement.innerHTML.length;";

/// One live browser session. Owned by the pipeline for the duration of an
/// invocation and released exactly once via [`BrowserSession::close`].
pub struct BrowserSession {
    client: Client,
}

impl BrowserSession {
    /// Opens a WebDriver session with the provider-tuned Chrome options.
    pub async fn acquire(config: &BrowserConfig) -> Result<Self> {
        let caps = chrome_capabilities(config);
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| {
                ScraperError::Navigation(format!(
                    "failed to open WebDriver session at '{}': {e}",
                    config.webdriver_url
                ))
            })?;
        info!(webdriver = %config.webdriver_url, headless = config.headless, "browser session opened");
        Ok(Self { client })
    }

    /// Drives the page load under a hard timeout.
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        info!(url, "navigating");
        match tokio::time::timeout(timeout, self.client.goto(url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ScraperError::Navigation(format!(
                "failed to load '{url}': {e}"
            ))),
            Err(_) => Err(ScraperError::Navigation(format!(
                "navigation to '{url}' timed out after {}s",
                timeout.as_secs()
            ))),
        }
    }

    /// Waits for the client-side render to go quiet: samples the document
    /// length every 500 ms and settles after three identical samples,
    /// bounded by `budget`. A failing sample degrades to sleeping out the
    /// remaining budget. Never fails.
    pub async fn settle(&self, budget: Duration) {
        let started = Instant::now();
        let mut previous: Option<u64> = None;
        let mut run = 1u32;

        loop {
            let remaining = budget.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(SETTLE_SAMPLE_INTERVAL.min(remaining)).await;

            let length = match self.client.execute(PAGE_LENGTH_SCRIPT, vec![]).await {
                Ok(value) => value.as_u64(),
                Err(e) => {
                    debug!(error = %e, "settle sampling failed; sleeping out the budget");
                    tokio::time::sleep(budget.saturating_sub(started.elapsed())).await;
                    return;
                }
            };

            match (length, previous) {
                (Some(current), Some(before)) if current == before => {
                    run += 1;
                    if run >= SETTLE_STABLE_SAMPLES {
                        debug!(
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            length = current,
                            "page settled"
                        );
                        return;
                    }
                }
                _ => run = 1,
            }
            previous = length;
        }
        debug!("settle budget exhausted without quiescence");
    }

    /// Clicks every visible control whose text carries a loader keyword,
    /// waiting `wait` after each activation so triggered content can land.
    /// Nothing here is fatal; returns the number of activations.
    pub async fn probe_loaders(&self, wait: Duration) -> usize {
        let candidates = match self.client.find_all(Locator::Css(PROBE_BUTTON_SELECTOR)).await {
            Ok(elements) => elements,
            Err(e) => {
                debug!(error = %e, "loader control lookup failed");
                return 0;
            }
        };

        let mut activated = 0usize;
        for element in candidates {
            // A prior click may have replaced the DOM under us; stale
            // elements just get skipped.
            let text = match element.text().await {
                Ok(text) => text.to_lowercase(),
                Err(_) => continue,
            };
            if !PROBE_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
                continue;
            }
            match element.click().await {
                Ok(()) => {
                    info!(control = %text.trim(), "activated loader control");
                    activated += 1;
                    tokio::time::sleep(wait).await;
                }
                Err(e) => debug!(error = %e, "loader control click failed"),
            }
        }
        activated
    }

    /// Captures the settled page. URL and source are required; title,
    /// `document.lastModified` and the content length are best-effort.
    pub async fn snapshot(&self) -> Result<PageSnapshot> {
        let url = self
            .client
            .current_url()
            .await
            .map_err(|e| ScraperError::Extraction(format!("failed to read current url: {e}")))?
            .to_string();
        let html = self
            .client
            .source()
            .await
            .map_err(|e| ScraperError::Extraction(format!("failed to read page source: {e}")))?;

        let (title, last_modified, content_length) =
            match self.client.execute(PAGE_PROPS_SCRIPT, vec![]).await {
                Ok(value) => (
                    value
                        .get("title")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    value
                        .get("lastModified")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    value
                        .get("contentLength")
                        .and_then(Value::as_u64)
                        .unwrap_or(html.len() as u64),
                ),
                Err(e) => {
                    debug!(error = %e, "page property script failed; using fallbacks");
                    (String::new(), String::new(), html.len() as u64)
                }
            };

        Ok(PageSnapshot {
            url,
            title,
            html,
            last_modified,
            content_length,
        })
    }

    /// Releases the browser. Close failures are logged, never propagated
    /// over a primary result.
    pub async fn close(self) {
        if let Err(e) = self.client.close().await {
            warn!(error = %e, "browser session did not close cleanly");
        }
    }
}

fn chrome_capabilities(config: &BrowserConfig) -> serde_json::Map<String, Value> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--no-first-run".to_string(),
        format!("--window-size={},{}", config.window_width, config.window_height),
        format!("--user-agent={}", config.user_agent),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }

    let mut caps = serde_json::Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        serde_json::json!({ "args": args }),
    );
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg_list(caps: &serde_json::Map<String, Value>) -> Vec<String> {
        caps["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn capabilities_carry_hardening_flags_and_window_size() {
        let config = BrowserConfig::default();
        let args = arg_list(&chrome_capabilities(&config));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-dev-shm-usage".to_string()));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
        assert!(args.contains(&"--headless=new".to_string()));
    }

    #[test]
    fn headed_mode_drops_the_headless_flag() {
        let config = BrowserConfig {
            headless: false,
            ..BrowserConfig::default()
        };
        let args = arg_list(&chrome_capabilities(&config));
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
    }
}
