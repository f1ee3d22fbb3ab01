//! One-invocation orchestration: acquire a browser, walk the page through
//! the extraction stages, persist the artifact pair, release the browser.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::{Result, ScraperError};
use crate::serializer::{self, WrittenArtifacts};
use crate::types::ScheduleSnapshot;
use crate::{extractor, normalizer};

/// Stages of one scrape invocation, strictly linear, no loops back. A
/// failure while navigating or extracting jumps straight to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Navigating,
    Settling,
    Probing,
    Extracting,
    Normalizing,
    Serialized,
    Closed,
}

/// Everything a finished run hands back to the caller.
#[derive(Debug)]
pub struct RunReport {
    pub snapshot: ScheduleSnapshot,
    pub artifacts: WrittenArtifacts,
    pub activated_controls: usize,
}

impl RunReport {
    pub fn day_count(&self) -> usize {
        self.snapshot.days.len()
    }

    pub fn slot_count(&self) -> usize {
        self.snapshot.days.iter().map(|day| day.lessons.len()).sum()
    }

    pub fn lesson_count(&self) -> usize {
        self.snapshot
            .days
            .iter()
            .flat_map(|day| &day.lessons)
            .map(|entry| entry.lessons.len())
            .sum()
    }
}

pub struct SchedulePipeline {
    config: Config,
    skip_probe: bool,
}

impl SchedulePipeline {
    pub fn new(config: Config, skip_probe: bool) -> Self {
        Self { config, skip_probe }
    }

    /// Runs one scrape of `url`. The browser session is owned here and
    /// released exactly once, whether the stages succeed or not.
    pub async fn run(&self, url: &str) -> Result<RunReport> {
        validate_url(url)?;

        let mut stage = Stage::Idle;
        let session = BrowserSession::acquire(&self.config.browser).await?;

        let outcome = self.drive(&session, url, &mut stage).await;

        session.close().await;
        transition(&mut stage, Stage::Closed);

        if let Ok(report) = &outcome {
            info!(
                days = report.day_count(),
                time_slots = report.slot_count(),
                lessons = report.lesson_count(),
                activated = report.activated_controls,
                "scrape complete"
            );
        }
        outcome
    }

    async fn drive(
        &self,
        session: &BrowserSession,
        url: &str,
        stage: &mut Stage,
    ) -> Result<RunReport> {
        let timing = &self.config.timing;

        transition(stage, Stage::Navigating);
        session
            .navigate(url, Duration::from_secs(timing.navigation_timeout_secs))
            .await?;

        transition(stage, Stage::Settling);
        session
            .settle(Duration::from_millis(timing.settle_delay_ms))
            .await;

        let activated_controls = if self.skip_probe {
            0
        } else {
            transition(stage, Stage::Probing);
            session
                .probe_loaders(Duration::from_millis(timing.probe_delay_ms))
                .await
        };

        transition(stage, Stage::Extracting);
        let page = session.snapshot().await?;
        let raw = extractor::extract(&page)?;

        transition(stage, Stage::Normalizing);
        let snapshot = normalizer::normalize(&raw, &page);
        let simplified = normalizer::simplify(&snapshot);

        let artifacts =
            serializer::write_artifacts(&snapshot, &simplified, Path::new(&self.config.output.dir))?;
        transition(stage, Stage::Serialized);

        Ok(RunReport {
            snapshot,
            artifacts,
            activated_controls,
        })
    }
}

fn transition(stage: &mut Stage, next: Stage) {
    debug!(from = ?stage, to = ?next, "pipeline stage");
    *stage = next;
}

/// The target must be an absolute http(s) URL; anything else is rejected
/// before any browser resource is acquired.
pub fn validate_url(raw: &str) -> Result<()> {
    let parsed = Url::parse(raw)
        .map_err(|e| ScraperError::Config(format!("invalid url '{raw}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ScraperError::Config(format!(
            "unsupported url scheme '{other}' in '{raw}'; expected http or https"
        ))),
    }
}
