//! Shared types, error model, and configuration for docsearch.
//!
//! This crate is the foundation depended on by all other docsearch crates.
//! It provides:
//! - [`DocSearchError`], the unified error type
//! - Domain types ([`ContentRecord`], [`SectionRecord`], [`SiteContent`], [`GlobalData`])
//! - Configuration ([`AppConfig`], [`CloudConfig`], [`CloudCredentials`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CloudConfig, CloudCredentials, DEFAULT_BASE_URL, PRIVATE_API_KEY_ENV,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{DocSearchError, Result};
pub use types::{
    AnalyticsConfig, BlogSource, CategorizedRecord, ContentCategory, ContentRecord, DocsSource,
    DocsVersion, Endpoint, GlobalData, PagesSource, SectionRecord, SiteContent, VersionContent,
    VersionName,
};
