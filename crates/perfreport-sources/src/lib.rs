//! perfreport-sources — data source integrations.
//!
//! Implements the collaborator traits of `perfreport-core` for a JSON
//! dataset file and for a REST API, and loads the `perfreport.toml`
//! configuration that selects between them.

pub mod config;
pub mod dataset;
pub mod error;
pub mod http;

pub use config::{create_sources, load_config, load_config_from, PerfreportConfig, SourceConfig};
pub use dataset::{Dataset, DatasetStore};
pub use error::SourceError;
pub use http::HttpStore;
