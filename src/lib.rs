pub mod browser;
pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod normalizer;
pub mod pipeline;
pub mod serializer;
pub mod types;
