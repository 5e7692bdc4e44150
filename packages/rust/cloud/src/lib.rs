//! Remote search index client.
//!
//! A remote index is published in two phases: a full-replacement snapshot is
//! staged first, then a deploy promotes it live. A failure between the two
//! leaves the previously deployed data serving queries.

mod client;

use async_trait::async_trait;

use docsearch_shared::{Result, SectionRecord};

pub use client::CloudClient;

/// Query-time credentials returned by a successful access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub endpoint: String,
    pub api_key: String,
}

/// The three operations the publish step needs from a remote index.
#[async_trait]
pub trait RemoteIndex: Send + Sync {
    /// Confirm the private key grants access to `index_id` and fetch query credentials.
    async fn check_access(&self, index_id: &str) -> Result<AccessGrant>;

    /// Stage `documents` as a full replacement of the index contents.
    async fn snapshot(&self, index_id: &str, documents: &[SectionRecord]) -> Result<()>;

    /// Promote the staged snapshot live.
    async fn deploy(&self, index_id: &str) -> Result<()>;
}
