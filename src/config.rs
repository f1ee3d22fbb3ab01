use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, ScraperError};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Runtime configuration. Every field has a default tuned to the provider,
/// so the scraper runs without a config file; `config.toml` and CLI flags
/// override selectively.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub timing: TimingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver endpoint the session is created against.
    pub webdriver_url: String,
    pub user_agent: String,
    pub window_width: u32,
    pub window_height: u32,
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            window_width: 1920,
            window_height: 1080,
            headless: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Upper bound for the whole navigation; once it fires the invocation fails.
    pub navigation_timeout_secs: u64,
    /// Budget for the post-navigation settle wait.
    pub settle_delay_ms: u64,
    /// Wait after each activated UI element during probing.
    pub probe_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: 60,
            settle_delay_ms: 5000,
            probe_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory both JSON artifacts are written into.
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "data".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration. An explicitly given path must be readable and
    /// parse; the implicit `config.toml` is optional and falls back to
    /// defaults when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => Self::from_file(explicit),
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_PATH);
                if implicit.exists() {
                    Self::from_file(implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("failed to read config file '{}': {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            ScraperError::Config(format!("failed to parse config file '{}': {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_sections() {
        let config = Config::default();
        assert_eq!(config.browser.webdriver_url, "http://localhost:9515");
        assert!(config.browser.headless);
        assert_eq!(config.timing.navigation_timeout_secs, 60);
        assert_eq!(config.timing.settle_delay_ms, 5000);
        assert_eq!(config.timing.probe_delay_ms, 2000);
        assert_eq!(config.output.dir, "data");
    }

    #[test]
    fn partial_toml_keeps_defaults_elsewhere() {
        let config: Config = toml::from_str(
            r#"
            [timing]
            settle_delay_ms = 250

            [output]
            dir = "out"
            "#,
        )
        .unwrap();
        assert_eq!(config.timing.settle_delay_ms, 250);
        assert_eq!(config.timing.navigation_timeout_secs, 60);
        assert_eq!(config.output.dir, "out");
        assert_eq!(config.browser.window_width, 1920);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/schedule.toml"))).unwrap_err();
        assert!(matches!(err, ScraperError::Config(_)));
    }
}
