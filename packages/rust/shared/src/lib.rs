//! Shared types, error model, and configuration for TrendLens.
//!
//! This crate is the foundation depended on by all other TrendLens crates.
//! It provides:
//! - [`TrendLensError`] — the unified error type
//! - Domain types ([`TrendItem`], [`SearchResult`], [`EnrichedRecord`], [`Snapshot`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, PipelineConfig, ProviderConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_api_keys,
};
pub use error::{Result, TrendLensError};
pub use types::{EnrichedRecord, Popularity, Reference, SearchResult, Snapshot, TrendItem};
