use thiserror::Error;

/// Fatal failure classes of a scrape invocation.
///
/// Field- and row-level misses inside the page are not errors: they degrade
/// to empty strings or dropped rows. Only failures that prevent locating the
/// page's overall structure, reaching the page, or writing the artifacts end
/// up here.
#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("navigation error: {0}")]
    Navigation(String),

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, ScraperError>;
